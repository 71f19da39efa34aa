use super::{load_config, print_json};
use crate::runner::{FileStatus, Pass, RunOutcome, Runner};
use anyhow::{Result, bail};
use std::path::Path;

/// Execute the check command: both passes, nothing written.
pub fn check(config: Option<&str>, root: Option<&Path>, json: bool) -> Result<()> {
    let cfg = load_config(config, root)?;
    let filter = cfg.file_filter()?;

    let formatted = Runner::new(&cfg.root, filter.clone(), Pass::format(&cfg))
        .dry_run(true)
        .run()?;
    let migrated = Runner::new(&cfg.root, filter, Pass::migrate(&cfg)?)
        .dry_run(true)
        .run()?;

    if json {
        print_json(&[&formatted, &migrated])?;
    } else {
        list_pending("needs formatting", &formatted);
        list_pending("needs migration", &migrated);
    }

    let pending = formatted.totals.changed + migrated.totals.changed;
    let failed = formatted.totals.failed + migrated.totals.failed;
    if pending > 0 || failed > 0 {
        bail!("check failed: {} pending rewrites, {} unreadable files", pending, failed);
    }
    tracing::info!("all {} files are clean", formatted.totals.scanned);
    Ok(())
}

fn list_pending(label: &str, outcome: &RunOutcome) {
    for file in &outcome.files {
        match &file.status {
            FileStatus::Changed => println!("{}: {}", file.path.display(), label),
            FileStatus::Failed(err) => println!("{}: {}", file.path.display(), err),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config_file(dir: &Path) -> String {
        let config_file = dir.join("sweep.toml");
        fs::write(&config_file, "[sweep]\nextensions = [\"php\"]\n").unwrap();
        config_file.to_string_lossy().to_string()
    }

    #[test]
    fn test_check_invalid_config() {
        let result = check(Some("nonexistent_config.toml"), None, false);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("failed to load config")
        );
    }

    #[test]
    fn test_check_clean_tree() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config_file(temp_dir.path());
        fs::write(temp_dir.path().join("ok.php"), "<?php\necho Text::_('X');\n").unwrap();
        assert!(check(Some(&config), Some(temp_dir.path()), false).is_ok());
    }

    #[test]
    fn test_check_reports_pending_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config_file(temp_dir.path());
        let file = temp_dir.path().join("legacy.php");
        let src = "<?php\necho JText::_('X');\n\n\n\n\n";
        fs::write(&file, src).unwrap();

        let err = check(Some(&config), Some(temp_dir.path()), false).unwrap_err();
        assert!(err.to_string().contains("2 pending rewrites"));
        assert_eq!(fs::read_to_string(&file).unwrap(), src);
    }
}
