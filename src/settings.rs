use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::categorizer::RuleMatch;
use crate::error::{AccountancyError, Result};
use crate::models::{Category, Direction, Rule};

pub const DEFAULT_RULES_FILE: &str = "pico-accountancy.json";

const MAX_SHORT_TEXT: usize = 60;

/// Categories and categorization rules, validated and with every rule
/// pointing at its declared category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub categories: Vec<Category>,
    pub rules: Vec<Rule>,
    #[serde(rename = "ruleMatch", default)]
    pub rule_match: RuleMatch,
}

impl Config {
    pub fn categories_by(&self, direction: Direction) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.direction == direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn legacy_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pico-accountancy").join("conf.json"))
}

/// Pick the configuration file: an explicit path wins, then the file in the
/// working directory, then the per-user legacy location.
pub fn resolve_rules_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(DEFAULT_RULES_FILE);
    if local.exists() {
        return local;
    }
    match legacy_config_path() {
        Some(legacy) if legacy.exists() => {
            debug!("using legacy configuration {}", legacy.display());
            legacy
        }
        _ => local,
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let label = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|_| AccountancyError::ConfigNotFound(label.clone()))?;
    let config = parse_config(&content, &label)?;
    debug!(
        "loaded {} categories and {} rules from {label}",
        config.categories.len(),
        config.rules.len()
    );
    Ok(config)
}

pub fn parse_config(content: &str, label: &str) -> Result<Config> {
    let config: Config =
        serde_json::from_str(content).map_err(|source| AccountancyError::ConfigParse {
            path: label.to_string(),
            source,
        })?;
    validate(config).map_err(|errors| AccountancyError::InvalidConfig {
        path: label.to_string(),
        errors,
    })
}

fn check_short_text(path: String, value: &str, allow_empty: bool, errors: &mut Vec<ValidationError>) {
    if !allow_empty && value.trim().is_empty() {
        errors.push(ValidationError::new(path, "should not be empty"));
        return;
    }
    if value.chars().count() > MAX_SHORT_TEXT {
        errors.push(ValidationError::new(
            path,
            format!("should be at most {MAX_SHORT_TEXT} characters"),
        ));
        return;
    }
    if value.contains(['\n', '\r']) {
        errors.push(ValidationError::new(path, "should be a single line"));
    }
}

/// Check every category and rule, collecting all issues. Rules are rewritten
/// to share the declared category so later lookups compare like with like.
pub fn validate(mut config: Config) -> std::result::Result<Config, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, cat) in config.categories.iter().enumerate() {
        check_short_text(format!("categories.{i}.name"), &cat.name, false, &mut errors);
        check_short_text(format!("categories.{i}.title"), &cat.title, false, &mut errors);
        if !seen.insert(cat.name.as_str()) {
            errors.push(ValidationError::new(
                format!("categories.{i}.name"),
                format!("duplicate category name {}", cat.name),
            ));
        }
    }

    for (i, rule) in config.rules.iter_mut().enumerate() {
        check_short_text(format!("rules.{i}.ifContains"), &rule.match_text, false, &mut errors);
        check_short_text(format!("rules.{i}.about"), &rule.label, true, &mut errors);
        match config.categories.iter().find(|c| c.name == rule.category.name) {
            None => errors.push(ValidationError::new(
                format!("rules.{i}.category"),
                format!("unknown category {}", rule.category.name),
            )),
            Some(declared) if declared != &rule.category => errors.push(ValidationError::new(
                format!("rules.{i}.category"),
                format!("does not match the declared category {}", declared.name),
            )),
            Some(declared) => rule.category = declared.clone(),
        }
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
pub(crate) fn sample_config() -> Config {
    parse_config(include_str!("../tests/fixtures/pico-accountancy.json"), "sample").unwrap()
}
