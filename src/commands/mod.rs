mod check;
mod format;
mod migrate;
mod stats;

pub use check::check;
pub use format::format;
pub use migrate::migrate;
pub use stats::stats;

use crate::config::AppConfig;
use crate::runner::{FileOutcome, FileStatus, RunOutcome};
use crate::transform::imports::Injection;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub(crate) fn load_config(config: Option<&str>, root: Option<&Path>) -> Result<AppConfig> {
    let cfg = AppConfig::load(config.map(Path::new)).context("failed to load config")?;
    Ok(cfg.with_root(root.map(PathBuf::from)))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(outcome: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("failed to serialize outcome")?;
    println!("{}", json);
    Ok(())
}

pub(crate) fn print_header(outcome: &RunOutcome) {
    println!("Processing directory: {}", outcome.root.display());
    if outcome.dry_run {
        println!("Dry run: no files will be written");
    }
    println!("Found {} files\n", outcome.totals.scanned);
}

pub(crate) fn display_name(file: &FileOutcome) -> String {
    file.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.path.display().to_string())
}

pub(crate) fn print_failures(outcome: &RunOutcome) {
    for file in &outcome.files {
        if let FileStatus::Failed(err) = &file.status {
            println!("  ! {}: {}", file.path.display(), err);
        }
    }
}

pub(crate) fn print_encoding_note(outcome: &RunOutcome) {
    if outcome.totals.latin1 > 0 {
        println!(
            "{} files are not valid UTF-8 and were handled as Latin-1.",
            outcome.totals.latin1
        );
    }
}

pub(crate) fn injection_label(injection: Option<Injection>) -> &'static str {
    match injection {
        Some(Injection::Injected) => "imports added",
        Some(Injection::AlreadyPresent) => "imports already present",
        Some(Injection::AnchorNotFound) => "guard line not found, imports NOT added",
        None => "",
    }
}
