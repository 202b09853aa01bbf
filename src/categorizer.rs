use serde::{Deserialize, Serialize};

use crate::models::Rule;

/// Which rule wins when several match the same description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMatch {
    First,
    #[default]
    Last,
}

fn matches(description: &str, pattern: &str) -> bool {
    description
        .to_lowercase()
        .contains(&pattern.to_lowercase())
}

pub struct Categorizer<'a> {
    rules: &'a [Rule],
    policy: RuleMatch,
}

impl<'a> Categorizer<'a> {
    pub fn new(rules: &'a [Rule], policy: RuleMatch) -> Self {
        Self { rules, policy }
    }

    /// Case-insensitive substring match of every rule, in declaration order.
    /// `None` means the description stays uncategorized.
    pub fn categorize(&self, description: &str) -> Option<&'a Rule> {
        let mut hits = self
            .rules
            .iter()
            .filter(|rule| matches(description, &rule.match_text));
        match self.policy {
            RuleMatch::First => hits.next(),
            RuleMatch::Last => hits.last(),
        }
    }
}
