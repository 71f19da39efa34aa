use super::{display_name, load_config, print_encoding_note, print_failures, print_header, print_json};
use crate::runner::{FileStatus, Pass, RunOutcome, Runner};
use anyhow::Result;
use std::path::Path;

/// Execute the format command
pub fn format(config: Option<&str>, root: Option<&Path>, dry_run: bool, json: bool) -> Result<()> {
    let cfg = load_config(config, root)?;
    tracing::info!(root = %cfg.root.display(), max_blank_lines = cfg.max_blank_lines, "format start");

    let outcome = Runner::new(&cfg.root, cfg.file_filter()?, Pass::format(&cfg))
        .dry_run(dry_run)
        .run()?;

    if json {
        print_json(&outcome)
    } else {
        report(&outcome, cfg.max_blank_lines);
        Ok(())
    }
}

fn report(outcome: &RunOutcome, max_blank_lines: usize) {
    print_header(outcome);

    println!("=== ANALYZING FILES ===");
    for file in &outcome.files {
        if let Some(before) = &file.before {
            if before.max_consecutive_blank > max_blank_lines {
                println!(
                    "{}: {} lines, {} blank, max consecutive: {}",
                    display_name(file),
                    before.total_lines,
                    before.blank_lines,
                    before.max_consecutive_blank
                );
            }
        }
    }

    println!("\n=== FORMATTING FILES ===");
    for file in &outcome.files {
        println!("Processing: {}", file.path.display());
        match &file.status {
            FileStatus::Changed => {
                println!("  - Formatted successfully");
                if file.blank_lines_removed > 0 {
                    println!("  - Removed {} excessive blank lines", file.blank_lines_removed);
                }
            }
            FileStatus::Failed(err) => println!("  - Failed: {}", err),
            _ => println!("  - No changes needed"),
        }
    }

    let t = &outcome.totals;
    println!("\n=== SUMMARY ===");
    println!(
        "Formatted {} files out of {} total files.",
        t.changed, t.scanned
    );
    println!("Total blank lines removed: {}", t.blank_lines_removed);
    println!("Excessive blank sections found: {}", t.excessive_blank_runs);
    if t.failed > 0 {
        println!("Failed: {} files", t.failed);
        print_failures(outcome);
    }
    print_encoding_note(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_with_root_override() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("default.php");
        fs::write(&file, "<?php\n\n\n\n\necho 1;   \n\n").unwrap();

        let missing_config = temp_dir.path().join("none.toml");
        // An explicit config that does not exist is an error...
        assert!(
            format(
                Some(&missing_config.to_string_lossy()),
                Some(temp_dir.path()),
                false,
                true
            )
            .is_err()
        );

        // ...while a real one with a root override works.
        let config = temp_dir.path().join("sweep.toml");
        fs::write(&config, "[sweep]\nroot = \"does-not-matter\"\n").unwrap();
        format(
            Some(&config.to_string_lossy()),
            Some(temp_dir.path()),
            false,
            true,
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "<?php\n\n\necho 1;\n");
    }

    #[test]
    fn test_format_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("sweep.toml");
        fs::write(&config, "").unwrap();
        let err = format(
            Some(&config.to_string_lossy()),
            Some(&temp_dir.path().join("absent")),
            false,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("directory not found"));
    }
}
