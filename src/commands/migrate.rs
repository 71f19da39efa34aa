use super::{injection_label, load_config, print_encoding_note, print_failures, print_header, print_json};
use crate::runner::{FileStatus, Pass, RunOutcome, Runner};
use crate::transform::imports::Injection;
use anyhow::Result;
use std::path::Path;

/// Execute the migrate command
pub fn migrate(config: Option<&str>, root: Option<&Path>, dry_run: bool, json: bool) -> Result<()> {
    let cfg = load_config(config, root)?;
    let pass = Pass::migrate(&cfg)?;
    if let Pass::Migrate(m) = &pass {
        for rule in m.rewriter().table().excluded() {
            tracing::debug!(legacy = %rule.legacy, modern = %rule.modern, "left for manual review");
        }
    }
    tracing::info!(root = %cfg.root.display(), "migrate start");

    let outcome = Runner::new(&cfg.root, cfg.file_filter()?, pass)
        .dry_run(dry_run)
        .run()?;

    if json {
        print_json(&outcome)
    } else {
        report(&outcome);
        Ok(())
    }
}

fn report(outcome: &RunOutcome) {
    print_header(outcome);

    for file in &outcome.files {
        println!("Processing: {}", file.path.display());
        match &file.status {
            FileStatus::Skipped => println!("  - No legacy names found, skipping"),
            FileStatus::Changed => println!(
                "  - Updated: {} names replaced, {} import calls removed, {}",
                file.identifiers_replaced,
                file.import_calls_removed,
                injection_label(file.injection)
            ),
            FileStatus::Unchanged => {
                println!("  - No changes needed, {}", injection_label(file.injection))
            }
            FileStatus::Failed(err) => println!("  - Failed: {}", err),
        }
    }

    let t = &outcome.totals;
    println!("\nProcess completed!");
    println!("Updated {} files out of {} total files.", t.changed, t.scanned);
    println!(
        "Replaced {} legacy names, removed {} import calls.",
        t.identifiers_replaced, t.import_calls_removed
    );
    if t.anchor_not_found > 0 {
        println!(
            "Guard line missing, imports not added in {} files:",
            t.anchor_not_found
        );
        for file in &outcome.files {
            if file.injection == Some(Injection::AnchorNotFound) {
                println!("  ? {}", file.path.display());
            }
        }
    }
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
    fn test_migrate_default_rules() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("sweep.toml");
        fs::write(&config, "").unwrap();
        let file = temp_dir.path().join("default.php");
        fs::write(
            &file,
            "<?php\ndefined('_JEXEC') or die;\njimport('joomla.html.html');\n?>\n<?php echo JHtml::_('date'); ?>\n",
        )
        .unwrap();

        migrate(Some(&config.to_string_lossy()), Some(temp_dir.path()), false, true).unwrap();

        let out = fs::read_to_string(&file).unwrap();
        assert!(out.starts_with("<?php\ndefined('_JEXEC') or die;\n\nuse Joomla\\CMS\\Factory;\n"));
        assert!(out.contains("<?php echo HTMLHelper::_('date'); ?>"));
        assert!(!out.contains("jimport"));
    }

    #[test]
    fn test_migrate_rejects_bad_rules() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("sweep.toml");
        fs::write(
            &config,
            "[[rewrite.rules]]\nlegacy = \"JA\"\nmodern = \"JB\"\n\n[[rewrite.rules]]\nlegacy = \"JB\"\nmodern = \"B\"\n",
        )
        .unwrap();
        let err = migrate(Some(&config.to_string_lossy()), Some(temp_dir.path()), false, true)
            .unwrap_err();
        assert!(err.to_string().contains("invalid rewrite configuration"));
    }
}
