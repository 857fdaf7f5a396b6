//! Screening pipeline: runs every scorer over each resume of a batch, one resume at a time.
//!
//! A failure while extracting one resume becomes an error-tagged `ScoreResult` for that resume;
//! the remaining resumes are still processed.

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::{Document, ExtractionService};
use crate::screening::aggregate::{ResumeScores, ScoreResult, ShortlistPolicy};
use crate::screening::ats::{check_ats_compliance, AtsRuleSet};
use crate::screening::dates::DateRules;
use crate::screening::experience::estimate_experience;
use crate::screening::keywords::{match_keywords, parse_job_description};
use crate::screening::sections::SectionLocator;

/// Validated batch inputs shared read-only by every resume in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRequest {
    pub keywords: Vec<String>,
    pub experience_required_years: f64,
}

impl ScreeningRequest {
    /// Validates the raw form fields. Any problem rejects the whole batch.
    pub fn parse(
        job_description: Option<&str>,
        experience_required: Option<&str>,
    ) -> Result<Self, AppError> {
        let job_description = job_description
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("Missing required field: job_description".into()))?;
        let experience_required = experience_required
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::Validation("Missing required field: experience_required".into())
            })?;

        let experience_required_years: f64 = experience_required.parse().map_err(|_| {
            AppError::Validation("Experience required must be a valid number".into())
        })?;
        if !experience_required_years.is_finite() || experience_required_years < 0.0 {
            return Err(AppError::Validation(
                "Experience required must be a non-negative number".into(),
            ));
        }

        let keywords = parse_job_description(job_description);
        if keywords.is_empty() {
            return Err(AppError::Validation(
                "Job description must contain at least one keyword".into(),
            ));
        }

        Ok(Self {
            keywords,
            experience_required_years,
        })
    }
}

/// The text-analysis core: read-only rules built once at startup.
#[derive(Debug, Clone)]
pub struct Screener {
    pub date_rules: DateRules,
    pub sections: SectionLocator,
    pub ats_rules: AtsRuleSet,
    pub policy: ShortlistPolicy,
}

impl Screener {
    /// Scores one resume's extracted text.
    pub fn score_text(
        &self,
        profile_name: &str,
        text: &str,
        request: &ScreeningRequest,
    ) -> ScoreResult {
        let employment_text = self.sections.locate(text);
        let experience = estimate_experience(&self.date_rules, &employment_text, &request.keywords);
        let keywords = match_keywords(text, &request.keywords);
        let ats = check_ats_compliance(text, &self.ats_rules);

        debug!(
            "Scored '{}': skill {:.2}%, ats {:.2}%, {} relevant months",
            profile_name,
            keywords.percentage,
            ats.percentage,
            experience.total_months()
        );

        ScoreResult::scored(
            profile_name,
            &request.keywords,
            ResumeScores {
                keywords,
                ats,
                experience,
            },
            request.experience_required_years,
            &self.policy,
        )
    }

    /// Extracts and scores every document in order. Never fails as a whole.
    pub async fn screen_batch(
        &self,
        extraction: &ExtractionService,
        documents: &[Document],
        request: &ScreeningRequest,
    ) -> Vec<ScoreResult> {
        info!(
            "Screening {} resume(s) against {} keyword(s)",
            documents.len(),
            request.keywords.len()
        );

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            let profile_name = document.profile_name();
            let result = match extraction.extract(document).await {
                Ok(text) => self.score_text(&profile_name, &text, request),
                Err(e) => {
                    warn!("Resume '{}' could not be processed: {e}", document.name);
                    ScoreResult::failed(&profile_name, e.to_string())
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(
            "Screening finished: {} scored, {} failed",
            results.len() - failed,
            failed
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::extraction::testing::ScriptedExtractor;
    use crate::extraction::ExtractionSettings;
    use crate::screening::aggregate::{Scored, Verdict};
    use crate::screening::ats::AtsRuleConfig;

    const STRONG_RESUME: &str = "\
JANE DOE
Email: jane@example.com  Phone: +1 555 0100

EMPLOYMENT HISTORY
Frontend Developer, Acme Corp
Jan 2020 - Dec 2021
React.js, Redux and TypeScript dashboards.

EDUCATION
B.Sc. Computer Science 09 2015 - 06 2019

SKILLS
React.js, Redux, TypeScript, CSS
";

    fn screener() -> Screener {
        Screener {
            date_rules: DateRules::standard().unwrap(),
            sections: SectionLocator::standard().unwrap(),
            ats_rules: AtsRuleSet::compile(AtsRuleConfig {
                required_labels: vec!["email".into(), "phone".into()],
                mandatory_sections: vec!["Education".into(), "Skills".into()],
                ..AtsRuleConfig::default()
            })
            .unwrap(),
            policy: ShortlistPolicy::default(),
        }
    }

    fn request(keywords: &str, years: &str) -> ScreeningRequest {
        ScreeningRequest::parse(Some(keywords), Some(years)).unwrap()
    }

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            ScreeningRequest::parse(None, Some("2")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ScreeningRequest::parse(Some("Rust"), Some("  ")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ScreeningRequest::parse(Some("Rust"), Some("two")),
            Err(AppError::Validation(msg)) if msg.contains("valid number")
        ));
        assert!(matches!(
            ScreeningRequest::parse(Some("Rust"), Some("-1")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ScreeningRequest::parse(Some(" , ,"), Some("1")),
            Err(AppError::Validation(_))
        ));

        let ok = request("React.js, Redux", "1.5");
        assert_eq!(ok.keywords, vec!["React.js", "Redux"]);
        assert_eq!(ok.experience_required_years, 1.5);
    }

    #[test]
    fn test_strong_resume_is_shortlisted() {
        let req = request("React.js, Redux, TypeScript, CSS", "2");
        let result = screener().score_text("jane_doe", STRONG_RESUME, &req);

        assert_eq!(result.skill_match, Scored::Value(100.0));
        assert_eq!(result.ats_compliance, Scored::Value(100.0));
        assert_eq!(result.verdict, Verdict::Shortlisted);

        let experience = result.experience_months.value().unwrap();
        assert_eq!(experience.get("React.js"), Some(23));
        assert_eq!(experience.get("Redux"), Some(23));
        // CSS appears only under SKILLS, outside the employment section.
        assert_eq!(experience.get("CSS"), Some(0));
    }

    #[test]
    fn test_keyword_occurrences_reported() {
        let req = request("React.js, CSS, Kotlin", "2");
        let result = screener().score_text("jane_doe", STRONG_RESUME, &req);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json["keyword_occurrences"],
            serde_json::json!({"React.js": 2, "CSS": 1})
        );
    }

    #[test]
    fn test_weak_resume_not_shortlisted() {
        let req = request("Kotlin, Swift, GraphQL", "3");
        let result = screener().score_text("jane_doe", STRONG_RESUME, &req);
        assert_eq!(result.skill_match, Scored::Value(0.0));
        assert_eq!(result.verdict, Verdict::NotShortlisted);
        assert_eq!(result.experience_match, Scored::Value(0.0));
    }

    #[test]
    fn test_no_employment_heading_means_zero_experience() {
        let req = request("Rust", "1");
        let result = screener().score_text("x", "Rust Jan 2020 - Jan 2022", &req);
        let experience = result.experience_months.value().unwrap();
        assert_eq!(experience.get("Rust"), Some(0));
    }

    #[tokio::test]
    async fn test_failed_extraction_is_isolated() {
        let engine = Arc::new(ScriptedExtractor::new(&[
            ("first.pdf", Ok(STRONG_RESUME)),
            ("broken.pdf", Err("OCR model crashed")),
            ("last.txt", Ok(STRONG_RESUME)),
        ]));
        let extraction = ExtractionService::initialize(engine, ExtractionSettings::default())
            .await
            .unwrap();

        let documents = vec![
            Document::new("first.pdf", "/tmp/1"),
            Document::new("broken.pdf", "/tmp/2"),
            Document::new("resume.docx", "/tmp/3"),
            Document::new("last.txt", "/tmp/4"),
        ];
        let req = request("React.js, Redux", "1");
        let results = screener().screen_batch(&extraction, &documents, &req).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].profile_name, "first");
        assert_eq!(results[0].verdict, Verdict::Shortlisted);

        assert_eq!(results[1].profile_name, "broken");
        assert_eq!(results[1].verdict, Verdict::Error);
        assert_eq!(results[1].skill_match, Scored::Error);
        assert!(results[1].error.as_deref().unwrap().contains("OCR model crashed"));

        assert_eq!(results[2].verdict, Verdict::Error);
        assert!(results[2].error.as_deref().unwrap().contains("docx"));

        assert_eq!(results[3].profile_name, "last");
        assert_eq!(results[3].verdict, Verdict::Shortlisted);
    }
}
