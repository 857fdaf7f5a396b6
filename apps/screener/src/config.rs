use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::screening::aggregate::ShortlistPolicy;
use crate::screening::sections::DEFAULT_HEADINGS;

const MAX_EXTRACTION_ATTEMPTS: u32 = 5;

/// Which text extraction engine to run.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrEngine {
    /// Embedded PDF text via pdf-extract, plus plain TXT.
    PdfText,
    /// External OCR program; holds the `OCR_COMMAND` command line.
    Command(String),
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ats_rules_path: PathBuf,
    pub ocr_engine: OcrEngine,
    pub extraction_timeout: Duration,
    pub extraction_max_attempts: u32,
    pub shortlist: ShortlistPolicy,
    pub section_headings: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ocr_engine = match lookup("OCR_ENGINE").as_deref().unwrap_or("pdf-text") {
            "pdf-text" => OcrEngine::PdfText,
            "command" => OcrEngine::Command(require(&lookup, "OCR_COMMAND")?),
            other => bail!("OCR_ENGINE must be 'pdf-text' or 'command', got '{other}'"),
        };

        let timeout_secs: u64 = parse_or(&lookup, "EXTRACTION_TIMEOUT_SECS", 60)?;
        if timeout_secs == 0 {
            bail!("EXTRACTION_TIMEOUT_SECS must be greater than 0");
        }

        let extraction_max_attempts: u32 = parse_or(&lookup, "EXTRACTION_MAX_ATTEMPTS", 1)?;
        if !(1..=MAX_EXTRACTION_ATTEMPTS).contains(&extraction_max_attempts) {
            bail!("EXTRACTION_MAX_ATTEMPTS must be between 1 and {MAX_EXTRACTION_ATTEMPTS}");
        }

        let defaults = ShortlistPolicy::default();
        let shortlist = ShortlistPolicy {
            min_skill_match: parse_percent(&lookup, "SHORTLIST_MIN_SKILL_MATCH", defaults.min_skill_match)?,
            min_ats_compliance: parse_percent(
                &lookup,
                "SHORTLIST_MIN_ATS_COMPLIANCE",
                defaults.min_ats_compliance,
            )?,
        };

        let section_headings = match lookup("SECTION_HEADINGS") {
            Some(raw) => {
                let headings: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from)
                    .collect();
                if headings.is_empty() {
                    bail!("SECTION_HEADINGS must list at least one heading");
                }
                headings
            }
            None => DEFAULT_HEADINGS.iter().map(|h| h.to_string()).collect(),
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ats_rules_path: lookup("ATS_RULES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("ats_rules.json")),
            ocr_engine,
            extraction_timeout: Duration::from_secs(timeout_secs),
            extraction_max_attempts,
            shortlist,
            section_headings,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_percent(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> Result<f64> {
    let value: f64 = parse_or(lookup, key, default)?;
    if !(0.0..=100.0).contains(&value) {
        bail!("{key} must be between 0 and 100, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.ats_rules_path, PathBuf::from("ats_rules.json"));
        assert_eq!(config.ocr_engine, OcrEngine::PdfText);
        assert_eq!(config.extraction_timeout, Duration::from_secs(60));
        assert_eq!(config.extraction_max_attempts, 1);
        assert_eq!(config.shortlist, ShortlistPolicy::default());
        assert_eq!(config.section_headings.len(), DEFAULT_HEADINGS.len());
    }

    #[test]
    fn test_command_engine_requires_command() {
        let err = config(&[("OCR_ENGINE", "command")]).unwrap_err();
        assert!(err.to_string().contains("OCR_COMMAND"));

        let config = config(&[
            ("OCR_ENGINE", "command"),
            ("OCR_COMMAND", "tesseract {input} stdout"),
        ])
        .unwrap();
        assert_eq!(
            config.ocr_engine,
            OcrEngine::Command("tesseract {input} stdout".to_string())
        );
    }

    #[test]
    fn test_unknown_engine_rejected() {
        assert!(config(&[("OCR_ENGINE", "doctr")]).is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("EXTRACTION_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("EXTRACTION_MAX_ATTEMPTS", "9")]).is_err());
        assert!(config(&[("SHORTLIST_MIN_ATS_COMPLIANCE", "120")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SHORTLIST_MIN_ATS_COMPLIANCE", "70"),
            ("EXTRACTION_MAX_ATTEMPTS", "3"),
            ("SECTION_HEADINGS", "Experience, Internships,"),
            ("ATS_RULES_PATH", "/etc/screener/rules.json"),
        ])
        .unwrap();
        assert_eq!(config.shortlist.min_ats_compliance, 70.0);
        assert_eq!(config.shortlist.min_skill_match, 70.0);
        assert_eq!(config.extraction_max_attempts, 3);
        assert_eq!(config.section_headings, vec!["Experience", "Internships"]);
        assert_eq!(config.ats_rules_path, PathBuf::from("/etc/screener/rules.json"));
    }
}
