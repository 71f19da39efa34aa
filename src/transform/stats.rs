use super::blank_lines::is_blank;
use serde::Serialize;

/// Descriptive line counts, used for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub max_consecutive_blank: usize,
    /// Runs longer than the threshold, including a run at end of file.
    pub excessive_blank_runs: usize,
}

impl FileStats {
    pub fn has_excessive_runs(&self) -> bool {
        self.excessive_blank_runs > 0
    }
}

pub fn file_stats(content: &str, max_blank: usize) -> FileStats {
    let mut stats = FileStats::default();
    let mut run = 0usize;

    for line in content.split('\n') {
        stats.total_lines += 1;
        if is_blank(line) {
            stats.blank_lines += 1;
            run += 1;
            stats.max_consecutive_blank = stats.max_consecutive_blank.max(run);
        } else {
            if run > max_blank {
                stats.excessive_blank_runs += 1;
            }
            run = 0;
        }
    }
    if run > max_blank {
        stats.excessive_blank_runs += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines_and_runs() {
        let s = file_stats("a\n\n\n\n\nb\n\n", 2);
        assert_eq!(s.total_lines, 8);
        assert_eq!(s.blank_lines, 6);
        assert_eq!(s.max_consecutive_blank, 4);
        assert_eq!(s.excessive_blank_runs, 1);
    }

    #[test]
    fn trailing_run_counts_as_excessive() {
        let s = file_stats("a\n\n\n\n", 2);
        assert_eq!(s.max_consecutive_blank, 4);
        assert_eq!(s.excessive_blank_runs, 1);
    }

    #[test]
    fn clean_file_has_no_excessive_runs() {
        let s = file_stats("a\n\nb\n", 2);
        assert_eq!(s.blank_lines, 2);
        assert!(!s.has_excessive_runs());
    }

    #[test]
    fn empty_content_is_one_blank_line() {
        let s = file_stats("", 2);
        assert_eq!(s.total_lines, 1);
        assert_eq!(s.blank_lines, 1);
    }
}
