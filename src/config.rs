use crate::discovery::FileFilter;
use crate::error::SweepError;
use crate::transform::Migrator;
use crate::transform::blank_lines::DEFAULT_MAX_BLANK_LINES;
use crate::transform::imports::{GuardMarker, ImportBlock, ImportInjector};
use crate::transform::rewrite::IdentifierRewriter;
use crate::transform::rules::{MappingTable, RewriteRule};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "sweep.toml";
pub const DEFAULT_ROOT: &str = "templates/html";
pub const DEFAULT_IMPORT_CALL: &str = "jimport";
pub const DEFAULT_GUARD: &str = r#"defined\s*\(\s*['"]_JEXEC['"]\s*\)\s*or\s*die\s*;?\s*\n"#;
pub const DEFAULT_PRESENCE_SIGNATURE: &str = r"use Joomla\CMS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub max_blank_lines: usize,
    pub rewrite: RewriteSettings,
}

#[derive(Debug, Clone)]
pub struct RewriteSettings {
    pub import_call: String,
    pub guard: String,
    pub presence_signature: String,
    pub imports: Vec<String>,
    pub rules: Vec<RewriteRule>,
}

// --- Raw TOML structures ---
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SweepFile {
    sweep: Option<SweepToml>,
    rewrite: Option<RewriteToml>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SweepToml {
    root: Option<String>,
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    max_blank_lines: Option<usize>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RewriteToml {
    import_call: Option<String>,
    guard: Option<String>,
    presence_signature: Option<String>,
    imports: Option<Vec<String>>,
    rules: Option<Vec<RewriteRule>>,
}

/// The legacy `J`-prefixed classes and their namespaced successors.
/// Factory-call forms need a human to pick the right call and are excluded.
pub fn default_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule::new("JFactory", "Factory"),
        RewriteRule::new("JText", "Text"),
        RewriteRule::new("JHtml", "HTMLHelper"),
        RewriteRule::new("JLayoutHelper", "LayoutHelper"),
        RewriteRule::new("JLayoutFile", "FileLayout"),
        RewriteRule::new("JModuleHelper", "ModuleHelper"),
        RewriteRule::new("JLanguageAssociations", "Associations"),
        RewriteRule::new("JUri", "Uri"),
        RewriteRule::new("JRoute", "Route"),
        RewriteRule::new("JRegistry", "Registry"),
        RewriteRule::manual("JApplication", "Factory::getApplication()"),
        RewriteRule::manual("JUser", "Factory::getUser()"),
        RewriteRule::manual(
            "JDatabase",
            r#"Factory::getContainer()->get("DatabaseDriver")"#,
        ),
    ]
}

pub fn default_imports() -> Vec<String> {
    [
        r"use Joomla\CMS\Factory;",
        r"use Joomla\CMS\HTML\HTMLHelper;",
        r"use Joomla\CMS\Language\Text;",
        r"use Joomla\CMS\Layout\FileLayout;",
        r"use Joomla\Registry\Registry;",
        r"use Joomla\CMS\Helper\ModuleHelper;",
        r"use Joomla\CMS\Language\Associations;",
        r"use Joomla\CMS\Layout\LayoutHelper;",
        r"use Joomla\CMS\Router\Route;",
        r"use Joomla\CMS\Uri\Uri;",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(SweepFile::default())
    }
}

impl AppConfig {
    /// Load `path`, or `sweep.toml` in the current directory when `path` is
    /// `None`. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            tracing::debug!("{} not found, using built-in defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: SweepFile = toml::from_str(content)?;
        let cfg = Self::from_raw(raw);
        if cfg.extensions.is_empty() {
            bail!("sweep.extensions must not be empty");
        }
        Ok(cfg)
    }

    fn from_raw(raw: SweepFile) -> Self {
        let sweep = raw.sweep.unwrap_or_default();
        let rw = raw.rewrite.unwrap_or_default();

        let rewrite = RewriteSettings {
            import_call: rw
                .import_call
                .unwrap_or_else(|| DEFAULT_IMPORT_CALL.to_string()),
            guard: rw.guard.unwrap_or_else(|| DEFAULT_GUARD.to_string()),
            presence_signature: rw
                .presence_signature
                .unwrap_or_else(|| DEFAULT_PRESENCE_SIGNATURE.to_string()),
            imports: rw.imports.unwrap_or_else(default_imports),
            rules: rw.rules.unwrap_or_else(default_rules),
        };

        Self {
            root: sweep
                .root
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            extensions: sweep.extensions.unwrap_or_else(|| vec!["php".into()]),
            exclude: sweep.exclude.unwrap_or_default(),
            max_blank_lines: sweep.max_blank_lines.unwrap_or(DEFAULT_MAX_BLANK_LINES),
            rewrite,
        }
    }

    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.root = root;
        }
        self
    }

    pub fn file_filter(&self) -> Result<FileFilter> {
        FileFilter::new(&self.extensions, &self.exclude)
    }

    /// Build the rewriter and injector, validating rules and patterns.
    pub fn migrator(&self) -> Result<Migrator> {
        let rw = &self.rewrite;
        let table = MappingTable::new(rw.rules.clone())?;
        let block = ImportBlock::new(rw.imports.iter().cloned(), &rw.presence_signature);
        for decl in block.declarations() {
            if let Some(legacy) = table.legacy_token_in(decl) {
                return Err(SweepError::InvalidRule {
                    legacy: legacy.to_string(),
                    reason: format!("import declaration '{}' uses it", decl),
                }
                .into());
            }
        }
        let rewriter = IdentifierRewriter::new(table, &rw.import_call)?;
        let guard = GuardMarker::new(&rw.guard)?;
        Ok(Migrator::new(rewriter, ImportInjector::new(block, guard)))
    }
}
