/// Blank runs longer than this are cut down to it.
pub const DEFAULT_MAX_BLANK_LINES: usize = 2;

/// A line is blank when nothing but whitespace remains after trimming.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Collapse blank-line runs to at most `max_blank` lines, strip trailing
/// whitespace from every line and end the document with exactly one `\n`.
///
/// Lines are split on `\n` only; a trailing `\r` counts as whitespace, so
/// CRLF input comes out with LF endings.
pub fn collapse_blank_lines(content: &str, max_blank: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut run = 0usize;

    for line in content.split('\n') {
        let trimmed = line.trim_end();
        if is_blank(line) {
            run += 1;
            if run <= max_blank {
                kept.push(trimmed);
            }
        } else {
            run = 0;
            kept.push(trimmed);
        }
    }

    let mut out = kept.join("\n").trim_end().to_string();
    out.push('\n');
    out
}
