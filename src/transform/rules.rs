use super::rewrite::{contains_token, is_ident_char};
use crate::error::SweepError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One legacy name and what it becomes.
///
/// `excluded` rules are still recognised as legacy but never rewritten
/// automatically: their modern form needs a human to pick the right call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub legacy: String,
    pub modern: String,
    #[serde(default)]
    pub excluded: bool,
}

impl RewriteRule {
    pub fn new(legacy: &str, modern: &str) -> Self {
        Self {
            legacy: legacy.to_string(),
            modern: modern.to_string(),
            excluded: false,
        }
    }

    pub fn manual(legacy: &str, modern: &str) -> Self {
        Self {
            excluded: true,
            ..Self::new(legacy, modern)
        }
    }
}

/// Ordered rewrite rules. The order is fixed once built.
#[derive(Debug, Clone)]
pub struct MappingTable {
    rules: Vec<RewriteRule>,
}

impl MappingTable {
    pub fn new(rules: Vec<RewriteRule>) -> Result<Self, SweepError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if rule.legacy.is_empty() || !rule.legacy.chars().all(is_ident_char) {
                return Err(invalid(rule, "legacy name must be a single identifier"));
            }
            if !seen.insert(rule.legacy.as_str()) {
                return Err(invalid(rule, "duplicate legacy name"));
            }
        }

        let table = Self { rules };
        // A replacement that re-introduces a legacy token would make the
        // result depend on rule order and break idempotence.
        for rule in table.active() {
            if let Some(hit) = table.legacy_token_in(&rule.modern) {
                return Err(invalid(
                    rule,
                    &format!("replacement '{}' contains legacy name '{}'", rule.modern, hit),
                ));
            }
        }
        Ok(table)
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Rules applied automatically, in table order.
    pub fn active(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().filter(|r| !r.excluded)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().filter(|r| r.excluded)
    }

    /// First active legacy name found in `text` as a whole token.
    pub fn legacy_token_in(&self, text: &str) -> Option<&str> {
        self.active()
            .map(|r| r.legacy.as_str())
            .find(|legacy| contains_token(text, legacy))
    }
}

fn invalid(rule: &RewriteRule, reason: &str) -> SweepError {
    SweepError::InvalidRule {
        legacy: rule.legacy.clone(),
        reason: reason.to_string(),
    }
}
