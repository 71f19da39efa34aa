pub mod blank_lines;
pub mod imports;
pub mod rewrite;
pub mod rules;
pub mod stats;

use imports::{ImportInjector, Injection};
use rewrite::IdentifierRewriter;

/// Result of migrating one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub content: String,
    pub import_calls_removed: usize,
    pub identifiers_replaced: usize,
    pub injection: Injection,
}

/// Identifier rewriting plus import injection, run as one step per file.
#[derive(Debug, Clone)]
pub struct Migrator {
    rewriter: IdentifierRewriter,
    injector: ImportInjector,
}

impl Migrator {
    pub fn new(rewriter: IdentifierRewriter, injector: ImportInjector) -> Self {
        Self { rewriter, injector }
    }

    pub fn rewriter(&self) -> &IdentifierRewriter {
        &self.rewriter
    }

    pub fn injector(&self) -> &ImportInjector {
        &self.injector
    }

    /// `None` when the trigger check finds nothing to migrate.
    ///
    /// The guard is located in the untouched input and the text on each side
    /// of it is rewritten separately, so the block always lands after the
    /// original guard line and is never itself rewritten.
    pub fn migrate(&self, content: &str) -> Option<Migration> {
        if !self.rewriter.needs_rewrite(content) {
            return None;
        }

        let migration = match self.injector.anchor(content) {
            Ok(at) => {
                let head = self.rewriter.rewrite(&content[..at]);
                let tail = self.rewriter.rewrite(&content[at..]);
                Migration {
                    content: self.injector.splice(&head.content, &tail.content),
                    import_calls_removed: head.import_calls_removed + tail.import_calls_removed,
                    identifiers_replaced: head.identifiers_replaced + tail.identifiers_replaced,
                    injection: Injection::Injected,
                }
            }
            Err(injection) => {
                let body = self.rewriter.rewrite(content);
                Migration {
                    content: body.content,
                    import_calls_removed: body.import_calls_removed,
                    identifiers_replaced: body.identifiers_replaced,
                    injection,
                }
            }
        };
        Some(migration)
    }
}
