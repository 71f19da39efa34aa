use crate::config::AppConfig;
use crate::discovery::{FileFilter, find_files};
use crate::transform::Migrator;
use crate::transform::blank_lines::collapse_blank_lines;
use crate::transform::imports::Injection;
use crate::transform::stats::{FileStats, file_stats};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    Format,
    Migrate,
    Stats,
}

/// A configured pass, ready to run over file contents.
#[derive(Debug, Clone)]
pub enum Pass {
    Format { max_blank_lines: usize },
    Migrate(Box<Migrator>),
    Stats { max_blank_lines: usize },
}

impl Pass {
    pub fn format(cfg: &AppConfig) -> Self {
        Pass::Format {
            max_blank_lines: cfg.max_blank_lines,
        }
    }

    pub fn migrate(cfg: &AppConfig) -> Result<Self> {
        let migrator = cfg.migrator().context("invalid rewrite configuration")?;
        Ok(Pass::Migrate(Box::new(migrator)))
    }

    pub fn stats(cfg: &AppConfig) -> Self {
        Pass::Stats {
            max_blank_lines: cfg.max_blank_lines,
        }
    }

    pub fn kind(&self) -> PassKind {
        match self {
            Pass::Format { .. } => PassKind::Format,
            Pass::Migrate(_) => PassKind::Migrate,
            Pass::Stats { .. } => PassKind::Stats,
        }
    }

    /// Transform one file's text. Pure: never touches the filesystem.
    pub fn apply(&self, path: &Path, content: &str) -> FileOutcome {
        let mut outcome = FileOutcome::new(path);
        match self {
            Pass::Format { max_blank_lines } => {
                let before = file_stats(content, *max_blank_lines);
                let formatted = collapse_blank_lines(content, *max_blank_lines);
                let after = file_stats(&formatted, *max_blank_lines);
                outcome.blank_lines_removed = before.blank_lines.saturating_sub(after.blank_lines);
                outcome.before = Some(before);
                outcome.after = Some(after);
                outcome.settle(content, formatted);
            }
            Pass::Migrate(migrator) => match migrator.migrate(content) {
                Some(m) => {
                    outcome.import_calls_removed = m.import_calls_removed;
                    outcome.identifiers_replaced = m.identifiers_replaced;
                    outcome.injection = Some(m.injection);
                    outcome.settle(content, m.content);
                }
                None => outcome.status = FileStatus::Skipped,
            },
            Pass::Stats { max_blank_lines } => {
                outcome.before = Some(file_stats(content, *max_blank_lines));
            }
        }
        outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Changed,
    Unchanged,
    /// The trigger check found nothing to migrate.
    Skipped,
    Failed(String),
}

/// How a file's bytes were turned into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Not valid UTF-8: each byte is read as one Latin-1 character and
    /// written back the same way.
    Latin1,
}

impl TextEncoding {
    pub fn decode(bytes: Vec<u8>) -> (String, Self) {
        match String::from_utf8(bytes) {
            Ok(text) => (text, TextEncoding::Utf8),
            Err(err) => {
                let text = err.into_bytes().into_iter().map(char::from).collect();
                (text, TextEncoding::Latin1)
            }
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(c).map_err(|_| {
                        anyhow::anyhow!("character {:?} cannot be written back as Latin-1", c)
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub encoding: TextEncoding,
    pub blank_lines_removed: usize,
    pub import_calls_removed: usize,
    pub identifiers_replaced: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injection: Option<Injection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<FileStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<FileStats>,
    #[serde(skip)]
    new_content: Option<String>,
}

impl FileOutcome {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
            encoding: TextEncoding::Utf8,
            blank_lines_removed: 0,
            import_calls_removed: 0,
            identifiers_replaced: 0,
            injection: None,
            before: None,
            after: None,
            new_content: None,
        }
    }

    fn failed(path: &Path, err: &anyhow::Error) -> Self {
        Self {
            status: FileStatus::Failed(format!("{:#}", err)),
            ..Self::new(path)
        }
    }

    // Any byte-level difference counts as a change.
    fn settle(&mut self, original: &str, updated: String) {
        if updated != original {
            self.status = FileStatus::Changed;
            self.new_content = Some(updated);
        }
    }

    pub fn is_changed(&self) -> bool {
        self.status == FileStatus::Changed
    }

    /// Replacement text for a changed file.
    pub fn new_content(&self) -> Option<&str> {
        self.new_content.as_deref()
    }
}

/// Everything a report needs about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub root: PathBuf,
    pub pass: PassKind,
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub scanned: usize,
    pub changed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub anchor_not_found: usize,
    pub blank_lines_removed: usize,
    pub import_calls_removed: usize,
    pub identifiers_replaced: usize,
    pub excessive_blank_runs: usize,
    pub latin1: usize,
}

impl Totals {
    fn add(&mut self, f: &FileOutcome) {
        self.scanned += 1;
        match f.status {
            FileStatus::Changed => self.changed += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Failed(_) => self.failed += 1,
            FileStatus::Unchanged => {}
        }
        if f.injection == Some(Injection::AnchorNotFound) {
            self.anchor_not_found += 1;
        }
        if f.encoding == TextEncoding::Latin1 {
            self.latin1 += 1;
        }
        self.blank_lines_removed += f.blank_lines_removed;
        self.import_calls_removed += f.import_calls_removed;
        self.identifiers_replaced += f.identifiers_replaced;
        if let Some(before) = &f.before {
            self.excessive_blank_runs += before.excessive_blank_runs;
        }
    }
}

/// Drives discovery and one pass over every file.
#[derive(Debug)]
pub struct Runner {
    root: PathBuf,
    filter: FileFilter,
    pass: Pass,
    dry_run: bool,
}

impl Runner {
    pub fn new(root: &Path, filter: FileFilter, pass: Pass) -> Self {
        Self {
            root: root.to_path_buf(),
            filter,
            pass,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fails only when the root is missing; per-file errors are recorded.
    pub fn run(&self) -> Result<RunOutcome> {
        let files = find_files(&self.root, &self.filter)?;
        tracing::info!(
            root = %self.root.display(),
            pass = ?self.pass.kind(),
            "found {} files",
            files.len()
        );

        let mut outcome = RunOutcome {
            root: self.root.clone(),
            pass: self.pass.kind(),
            dry_run: self.dry_run,
            files: Vec::with_capacity(files.len()),
            totals: Totals::default(),
        };

        for path in &files {
            let file = match self.process(path) {
                Ok(file) => file,
                Err(err) => {
                    tracing::warn!(path = %path.display(), "{:#}", err);
                    FileOutcome::failed(path, &err)
                }
            };
            outcome.totals.add(&file);
            outcome.files.push(file);
        }

        tracing::info!(
            scanned = outcome.totals.scanned,
            changed = outcome.totals.changed,
            failed = outcome.totals.failed,
            "run complete"
        );
        Ok(outcome)
    }

    fn process(&self, path: &Path) -> Result<FileOutcome> {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let (content, encoding) = TextEncoding::decode(bytes);
        if encoding == TextEncoding::Latin1 {
            tracing::debug!(path = %path.display(), "not valid UTF-8, reading as Latin-1");
        }
        let mut outcome = self.pass.apply(path, &content);
        outcome.encoding = encoding;

        if let Some(updated) = outcome.new_content() {
            let bytes = encoding
                .encode(updated)
                .with_context(|| format!("failed to encode {}", path.display()))?;
            if self.dry_run {
                tracing::info!(path = %path.display(), "would change");
            } else {
                fs::write(path, bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "updated");
            }
        } else {
            tracing::debug!(path = %path.display(), status = ?outcome.status, "no changes needed");
        }
        if outcome.injection == Some(Injection::AnchorNotFound) {
            tracing::warn!(path = %path.display(), "guard line not found, imports not added");
        }
        Ok(outcome)
    }
}
