//! Scoring Aggregator: combines keyword, ATS, and experience scores into one result record.

use serde::{Deserialize, Serialize, Serializer};

use crate::screening::ats::AtsReport;
use crate::screening::experience::ExperienceMap;
use crate::screening::keywords::{KeywordCounts, KeywordMatch};

/// Sentinel written into every score field of a resume that could not be processed.
pub const ERROR_SENTINEL: &str = "Error";

/// Shortlist thresholds. Both must be met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortlistPolicy {
    pub min_skill_match: f64,
    pub min_ats_compliance: f64,
}

impl Default for ShortlistPolicy {
    fn default() -> Self {
        Self {
            min_skill_match: 70.0,
            min_ats_compliance: 75.0,
        }
    }
}

impl ShortlistPolicy {
    pub fn verdict(&self, skill_match: f64, ats_compliance: f64) -> Verdict {
        if skill_match >= self.min_skill_match && ats_compliance >= self.min_ats_compliance {
            Verdict::Shortlisted
        } else {
            Verdict::NotShortlisted
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Shortlisted,
    #[serde(rename = "Not Shortlisted")]
    NotShortlisted,
    Error,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Shortlisted => "Shortlisted",
            Verdict::NotShortlisted => "Not Shortlisted",
            Verdict::Error => ERROR_SENTINEL,
        }
    }
}

/// A score field holding either a computed value or the error sentinel.
/// Serializes as the value itself, or as the string `"Error"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scored<T> {
    Value(T),
    Error,
}

impl<T> Scored<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Scored::Value(v) => Some(v),
            Scored::Error => None,
        }
    }
}

impl<T: Serialize> Serialize for Scored<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scored::Value(v) => v.serialize(serializer),
            Scored::Error => serializer.serialize_str(ERROR_SENTINEL),
        }
    }
}

/// Per-component scores for one successfully extracted resume.
#[derive(Debug, Clone)]
pub struct ResumeScores {
    pub keywords: KeywordMatch,
    pub ats: AtsReport,
    pub experience: ExperienceMap,
}

/// One row of screening output. Built once per resume and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub profile_name: String,
    pub skills_required: Scored<String>,
    pub skills_matched: Scored<String>,
    pub skills_missing: Scored<String>,
    pub skill_match: Scored<f64>,
    pub keyword_occurrences: Scored<KeywordCounts>,
    pub ats_compliance: Scored<f64>,
    pub ats_failed_criteria: Scored<Vec<String>>,
    pub experience_match: Scored<f64>,
    pub experience_months: Scored<ExperienceMap>,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreResult {
    pub fn scored(
        profile_name: &str,
        keywords: &[String],
        scores: ResumeScores,
        experience_required_years: f64,
        policy: &ShortlistPolicy,
    ) -> Self {
        let skill_match = scores.keywords.percentage;
        let ats_compliance = scores.ats.percentage;
        let experience_match =
            experience_match(scores.experience.total_months(), experience_required_years);

        Self {
            profile_name: profile_name.to_string(),
            skills_required: Scored::Value(keywords.join(", ")),
            skills_matched: Scored::Value(scores.keywords.found.join(", ")),
            skills_missing: Scored::Value(scores.keywords.missing.join(", ")),
            skill_match: Scored::Value(skill_match),
            keyword_occurrences: Scored::Value(scores.keywords.occurrences),
            ats_compliance: Scored::Value(ats_compliance),
            ats_failed_criteria: Scored::Value(scores.ats.failed),
            experience_match: Scored::Value(experience_match),
            experience_months: Scored::Value(scores.experience),
            verdict: policy.verdict(skill_match, ats_compliance),
            error: None,
        }
    }

    pub fn failed(profile_name: &str, message: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.to_string(),
            skills_required: Scored::Error,
            skills_matched: Scored::Error,
            skills_missing: Scored::Error,
            skill_match: Scored::Error,
            keyword_occurrences: Scored::Error,
            ats_compliance: Scored::Error,
            ats_failed_criteria: Scored::Error,
            experience_match: Scored::Error,
            experience_months: Scored::Error,
            verdict: Verdict::Error,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::Error
    }
}

/// Total relevant months against the required years, capped at 100. 0 when nothing is required.
/// Reported alongside the verdict but does not affect it.
pub fn experience_match(total_months: u64, required_years: f64) -> f64 {
    let required_months = required_years * 12.0;
    if required_months <= 0.0 {
        return 0.0;
    }
    (total_months as f64 / required_months * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::keywords::match_keywords;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ats(percentage: f64) -> AtsReport {
        AtsReport {
            percentage,
            passed: 0,
            total: 0,
            failed: vec!["label:email".to_string()],
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        let policy = ShortlistPolicy::default();
        assert_eq!(policy.verdict(70.0, 75.0), Verdict::Shortlisted);
        assert_eq!(policy.verdict(69.99, 100.0), Verdict::NotShortlisted);
        assert_eq!(policy.verdict(100.0, 74.9), Verdict::NotShortlisted);
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = ShortlistPolicy {
            min_skill_match: 70.0,
            min_ats_compliance: 70.0,
        };
        assert_eq!(policy.verdict(70.0, 72.0), Verdict::Shortlisted);
    }

    #[test]
    fn test_experience_match() {
        assert_eq!(experience_match(12, 2.0), 50.0);
        assert_eq!(experience_match(48, 2.0), 100.0);
        assert_eq!(experience_match(12, 0.0), 0.0);
        assert_eq!(experience_match(u64::MAX, 1.0), 100.0);
    }

    #[test]
    fn test_scored_record() {
        let keywords = kws(&["Rust", "SQL", "Go", "Java"]);
        let scores = ResumeScores {
            keywords: match_keywords("rust sql go", &keywords),
            ats: ats(80.0),
            experience: ExperienceMap::zeroed(&keywords),
        };

        let result = ScoreResult::scored("jane_doe", &keywords, scores, 1.0, &Default::default());
        assert_eq!(result.profile_name, "jane_doe");
        assert_eq!(
            result.skills_required,
            Scored::Value("Rust, SQL, Go, Java".to_string())
        );
        assert_eq!(result.skills_matched, Scored::Value("Rust, SQL, Go".to_string()));
        assert_eq!(result.skills_missing, Scored::Value("Java".to_string()));
        assert_eq!(result.skill_match, Scored::Value(75.0));
        assert_eq!(result.verdict, Verdict::Shortlisted);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failed_record_uses_sentinel_everywhere() {
        let result = ScoreResult::failed("broken", "Text extraction timed out");
        assert!(result.is_error());

        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "skills_required",
            "skills_matched",
            "skill_match",
            "keyword_occurrences",
            "ats_compliance",
            "experience_match",
            "experience_months",
            "verdict",
        ] {
            assert_eq!(json[field], "Error", "field {field}");
        }
        assert_eq!(json["error"], "Text extraction timed out");
    }

    #[test]
    fn test_successful_record_omits_error_field() {
        let keywords = kws(&["Rust"]);
        let scores = ResumeScores {
            keywords: match_keywords("", &keywords),
            ats: ats(0.0),
            experience: ExperienceMap::zeroed(&keywords),
        };
        let result = ScoreResult::scored("x", &keywords, scores, 0.0, &Default::default());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["skill_match"], 0.0);
        assert_eq!(json["verdict"], "Not Shortlisted");
        assert_eq!(json["experience_months"]["Rust"], 0);
    }
}
