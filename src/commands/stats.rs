use super::{display_name, load_config, print_encoding_note, print_failures, print_header, print_json};
use crate::runner::{Pass, Runner};
use anyhow::Result;
use std::path::Path;

/// Execute the stats command
pub fn stats(config: Option<&str>, root: Option<&Path>, json: bool) -> Result<()> {
    let cfg = load_config(config, root)?;
    let outcome = Runner::new(&cfg.root, cfg.file_filter()?, Pass::stats(&cfg)).run()?;
    if json {
        return print_json(&outcome);
    }

    print_header(&outcome);
    println!("{:<40} {:>7} {:>7} {:>9}", "file", "lines", "blank", "max run");
    for file in &outcome.files {
        if let Some(s) = &file.before {
            let flag = if s.has_excessive_runs() { " *" } else { "" };
            println!(
                "{:<40} {:>7} {:>7} {:>9}{}",
                display_name(file),
                s.total_lines,
                s.blank_lines,
                s.max_consecutive_blank,
                flag
            );
        }
    }
    println!(
        "\n{} blank runs longer than {} lines",
        outcome.totals.excessive_blank_runs, cfg.max_blank_lines
    );
    print_failures(&outcome);
    print_encoding_note(&outcome);
    Ok(())
}
