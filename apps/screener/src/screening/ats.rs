//! ATS Compliance Scorer: pass/fail rubric of labels, sections, and a date-format pattern.
//!
//! Every required label, every mandatory section, and the date pattern are one criterion each.
//! Score = passed / total × 100, and 0 when there are no criteria.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::screening::keywords::percentage;

/// "MM YYYY", optionally without the space.
pub const DEFAULT_DATE_PATTERN: &str = r"\b(0[1-9]|1[0-2])\s?\d{4}\b";

fn default_date_pattern() -> String {
    DEFAULT_DATE_PATTERN.to_string()
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("ATS rules file '{path}' could not be read: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ATS rules in '{origin}' are not valid JSON: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid date_pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// On-disk shape of the rule file. Unknown fields are ignored.
///
/// An absent `date_pattern` falls back to `DEFAULT_DATE_PATTERN`; an empty one disables the
/// date criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsRuleConfig {
    #[serde(default)]
    pub required_labels: Vec<String>,
    #[serde(default)]
    pub mandatory_sections: Vec<String>,
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
}

impl Default for AtsRuleConfig {
    fn default() -> Self {
        Self {
            required_labels: vec![],
            mandatory_sections: vec![],
            date_pattern: default_date_pattern(),
        }
    }
}

/// Validated, compiled rule set. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct AtsRuleSet {
    config: AtsRuleConfig,
    date_regex: Option<Regex>,
}

impl AtsRuleSet {
    pub fn compile(config: AtsRuleConfig) -> Result<Self, RulesError> {
        let date_regex = if config.date_pattern.trim().is_empty() {
            None
        } else {
            Some(
                Regex::new(&config.date_pattern).map_err(|source| RulesError::Pattern {
                    pattern: config.date_pattern.clone(),
                    source,
                })?,
            )
        };
        Ok(Self { config, date_regex })
    }

    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, RulesError> {
        let config: AtsRuleConfig =
            serde_json::from_str(json).map_err(|source| RulesError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        Self::compile(config)
    }

    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let json = std::fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    pub fn config(&self) -> &AtsRuleConfig {
        &self.config
    }

    pub fn criteria_count(&self) -> usize {
        self.config.required_labels.len()
            + self.config.mandatory_sections.len()
            + usize::from(self.date_regex.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub percentage: f64,
    pub passed: usize,
    pub total: usize,
    /// Failed criteria as `label:<x>`, `section:<x>`, or `date_pattern`.
    pub failed: Vec<String>,
}

pub fn check_ats_compliance(text: &str, rules: &AtsRuleSet) -> AtsReport {
    let text_lower = text.to_lowercase();
    let mut passed = 0;
    let mut failed = Vec::new();

    let labels = rules.config.required_labels.iter().map(|l| ("label", l));
    let sections = rules.config.mandatory_sections.iter().map(|s| ("section", s));

    for (kind, needle) in labels.chain(sections) {
        if text_lower.contains(&needle.to_lowercase()) {
            passed += 1;
        } else {
            failed.push(format!("{kind}:{needle}"));
        }
    }

    if let Some(date_regex) = &rules.date_regex {
        if date_regex.is_match(text) {
            passed += 1;
        } else {
            failed.push("date_pattern".to_string());
        }
    }

    let total = rules.criteria_count();
    AtsReport {
        percentage: percentage(passed, total),
        passed,
        total,
        failed,
    }
}
