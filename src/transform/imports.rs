use crate::error::SweepError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

/// What happened when the import block was offered to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Injection {
    Injected,
    AlreadyPresent,
    /// No guard line to anchor on; the file was left without imports.
    AnchorNotFound,
}

/// Ordered, de-duplicated import declarations plus the text whose presence
/// means they were injected already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    declarations: Vec<String>,
    presence_signature: String,
}

impl ImportBlock {
    pub fn new<I, S>(declarations: I, presence_signature: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let declarations = declarations
            .into_iter()
            .map(Into::<String>::into)
            .filter(|d| seen.insert(d.clone()))
            .collect();
        Self {
            declarations,
            presence_signature: presence_signature.to_string(),
        }
    }

    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    pub fn is_present_in(&self, content: &str) -> bool {
        !self.presence_signature.is_empty() && content.contains(&self.presence_signature)
    }

    /// The block as inserted: a separating blank line, then one declaration per line.
    pub fn render(&self) -> String {
        let mut out = String::from("\n");
        for decl in &self.declarations {
            out.push_str(decl);
            out.push('\n');
        }
        out
    }
}

/// The boilerplate statement near the top of a file that anchors the block.
#[derive(Debug, Clone)]
pub struct GuardMarker {
    pattern: Regex,
}

impl GuardMarker {
    pub fn new(pattern: &str) -> Result<Self, SweepError> {
        let pattern = Regex::new(pattern).map_err(|source| SweepError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Byte offset just past the first guard match and its line break.
    pub fn locate(&self, content: &str) -> Option<usize> {
        self.pattern.find(content).map(|m| m.end())
    }
}

#[derive(Debug, Clone)]
pub struct ImportInjector {
    block: ImportBlock,
    guard: GuardMarker,
}

impl ImportInjector {
    pub fn new(block: ImportBlock, guard: GuardMarker) -> Self {
        Self { block, guard }
    }

    pub fn block(&self) -> &ImportBlock {
        &self.block
    }

    /// Where the block would go, or why it will not be inserted.
    pub fn anchor(&self, content: &str) -> Result<usize, Injection> {
        if self.block.is_present_in(content) {
            return Err(Injection::AlreadyPresent);
        }
        self.guard.locate(content).ok_or(Injection::AnchorNotFound)
    }

    /// Place the block after the guard, or report why nothing was inserted.
    pub fn inject(&self, content: &str) -> (String, Injection) {
        match self.anchor(content) {
            Ok(at) => (self.splice(&content[..at], &content[at..]), Injection::Injected),
            Err(status) => (content.to_string(), status),
        }
    }

    /// Join text split at an anchor with the block between the halves.
    pub fn splice(&self, head: &str, tail: &str) -> String {
        let block = self.block.render();
        let mut out = String::with_capacity(head.len() + block.len() + tail.len());
        out.push_str(head);
        out.push_str(&block);
        out.push_str(tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUARD: &str = r#"defined\s*\(\s*['"]_JEXEC['"]\s*\)\s*or\s*die\s*;?\s*\n"#;

    fn injector() -> ImportInjector {
        let block = ImportBlock::new(
            [
                r"use Joomla\CMS\Factory;",
                r"use Joomla\CMS\Language\Text;",
                r"use Joomla\CMS\Factory;",
            ],
            r"use Joomla\CMS",
        );
        ImportInjector::new(block, GuardMarker::new(GUARD).unwrap())
    }

    #[test]
    fn block_is_deduplicated_in_order() {
        let inj = injector();
        assert_eq!(
            inj.block().declarations(),
            &[
                r"use Joomla\CMS\Factory;".to_string(),
                r"use Joomla\CMS\Language\Text;".to_string()
            ]
        );
    }

    #[test]
    fn injects_right_after_guard_line() {
        let src = "<?php\ndefined('_JEXEC') or die;\n\necho Text::_('X');\n";
        let (out, status) = injector().inject(src);
        assert_eq!(status, Injection::Injected);
        assert_eq!(
            out,
            "<?php\ndefined('_JEXEC') or die;\n\n\nuse Joomla\\CMS\\Factory;\nuse Joomla\\CMS\\Language\\Text;\necho Text::_('X');\n"
        );
        assert_eq!(out.matches(r"use Joomla\CMS\Factory;").count(), 1);
    }

    #[test]
    fn guard_variants_are_recognised() {
        for guard in [
            "defined(\"_JEXEC\") or die;\n",
            "defined( '_JEXEC' )  or  die\n",
            "defined('_JEXEC') or die ;\r\n",
        ] {
            let src = format!("<?php\n{guard}?>\n");
            let (out, status) = injector().inject(&src);
            assert_eq!(status, Injection::Injected, "guard {:?}", guard);
            assert!(out.starts_with(&format!("<?php\n{guard}\nuse Joomla")));
        }
    }

    #[test]
    fn injection_is_idempotent() {
        let src = "<?php\ndefined('_JEXEC') or die;\necho 1;\n";
        let (once, _) = injector().inject(src);
        let (twice, status) = injector().inject(&once);
        assert_eq!(status, Injection::AlreadyPresent);
        assert_eq!(twice, once);
    }

    #[test]
    fn existing_signature_means_no_change() {
        let src = "<?php\ndefined('_JEXEC') or die;\nuse Joomla\\CMS\\Router\\Route;\n";
        let (out, status) = injector().inject(src);
        assert_eq!(status, Injection::AlreadyPresent);
        assert_eq!(out, src);
    }

    #[test]
    fn missing_guard_is_reported_not_swallowed() {
        let src = "<?php\necho JText::_('X');\n";
        let (out, status) = injector().inject(src);
        assert_eq!(status, Injection::AnchorNotFound);
        assert_eq!(out, src);
    }

    #[test]
    fn guard_without_line_break_is_not_an_anchor() {
        let src = "<?php defined('_JEXEC') or die;";
        assert_eq!(injector().anchor(src), Err(Injection::AnchorNotFound));
    }

    #[test]
    fn invalid_guard_pattern_is_an_error() {
        assert!(matches!(
            GuardMarker::new("defined("),
            Err(SweepError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn invalid_pattern_cause_is_reported_once() {
        let err = anyhow::Error::from(GuardMarker::new("defined(").unwrap_err());
        let chain = format!("{:#}", err);
        assert!(chain.starts_with("invalid pattern 'defined('"), "{}", chain);
        assert_eq!(chain.matches("unclosed group").count(), 1, "{}", chain);
    }
}
