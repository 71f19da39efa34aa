use super::rules::MappingTable;
use crate::error::SweepError;
use regex::Regex;

/// Characters that can continue an identifier.
pub fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_token_at(haystack: &str, start: usize, len: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[start + len..].chars().next();
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

/// Byte offsets of every whole-token occurrence of `token`.
fn token_offsets<'a>(haystack: &'a str, token: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack
        .match_indices(token)
        .map(|(i, _)| i)
        .filter(move |&i| is_token_at(haystack, i, token.len()))
}

pub fn contains_token(haystack: &str, token: &str) -> bool {
    !token.is_empty() && token_offsets(haystack, token).next().is_some()
}

/// Replace whole-token occurrences of `token`, returning the count.
pub fn replace_token(haystack: &str, token: &str, with: &str) -> (String, usize) {
    if token.is_empty() {
        return (haystack.to_string(), 0);
    }
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0usize;
    let mut hits = 0usize;
    for i in token_offsets(haystack, token) {
        out.push_str(&haystack[last..i]);
        out.push_str(with);
        last = i + token.len();
        hits += 1;
    }
    out.push_str(&haystack[last..]);
    (out, hits)
}

/// Result of rewriting one chunk of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub import_calls_removed: usize,
    pub identifiers_replaced: usize,
}

/// Rewrites legacy identifiers and strips legacy import calls such as
/// `jimport('joomla.html.html');`.
#[derive(Debug, Clone)]
pub struct IdentifierRewriter {
    table: MappingTable,
    import_call: Regex,
}

impl IdentifierRewriter {
    pub fn new(table: MappingTable, import_call_name: &str) -> Result<Self, SweepError> {
        let name = regex::escape(import_call_name);
        // One string literal, quotes matched. The statement owns its line
        // when it starts one: take the indentation, the separator and the
        // line break with it.
        let call = format!(
            r#"(?m)(?:^[ \t]*)?\b{name}\s*\(\s*(?:'[^']*'|"[^"]*")\s*\)(?:\s*;[ \t]*(?:\r?\n)?)?"#
        );
        Ok(Self {
            table,
            import_call: compile(&call)?,
        })
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Trigger check: does `content` use any active legacy name or import call?
    pub fn needs_rewrite(&self, content: &str) -> bool {
        self.import_call.is_match(content) || self.table.legacy_token_in(content).is_some()
    }

    pub fn rewrite(&self, content: &str) -> Rewrite {
        let import_calls_removed = self.import_call.find_iter(content).count();
        let mut out = if import_calls_removed > 0 {
            self.import_call.replace_all(content, "").into_owned()
        } else {
            content.to_string()
        };

        let mut identifiers_replaced = 0usize;
        for rule in self.table.active() {
            let (next, hits) = replace_token(&out, &rule.legacy, &rule.modern);
            if hits > 0 {
                tracing::trace!(legacy = %rule.legacy, modern = %rule.modern, hits, "rule applied");
                identifiers_replaced += hits;
                out = next;
            }
        }

        Rewrite {
            content: out,
            import_calls_removed,
            identifiers_replaced,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, SweepError> {
    Regex::new(pattern).map_err(|source| SweepError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
