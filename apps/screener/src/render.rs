//! HTML rendering of screening results: the upload form and the results table.

use askama::Template;

use crate::screening::aggregate::{ScoreResult, Scored, ERROR_SENTINEL};

const COLUMNS: &[&str] = &[
    "Profile Name",
    "Skills Required",
    "Skills Matched",
    "Skill Match",
    "Keyword Occurrences",
    "ATS Compliance",
    "Experience Match",
    "Relevant Experience in Months",
    "Result",
    "Error",
];

/// Upload form, followed by the results table when there are results.
#[derive(Template)]
#[template(path = "screener.html")]
pub struct ScreenerPage {
    pub columns: &'static [&'static str],
    pub rows: Vec<ResultRow>,
}

impl ScreenerPage {
    pub fn form() -> Self {
        Self::with_results(&[])
    }

    pub fn with_results(results: &[ScoreResult]) -> Self {
        Self {
            columns: COLUMNS,
            rows: results.iter().map(ResultRow::from).collect(),
        }
    }
}

/// Display strings for one table row. Escaping is left to the template.
pub struct ResultRow {
    pub profile_name: String,
    pub skills_required: String,
    pub skills_matched: String,
    pub skill_match: String,
    pub occurrences: Vec<String>,
    pub ats_compliance: String,
    pub experience_match: String,
    pub experience: Vec<String>,
    pub verdict: &'static str,
    pub error: String,
}

impl From<&ScoreResult> for ResultRow {
    fn from(result: &ScoreResult) -> Self {
        Self {
            profile_name: result.profile_name.clone(),
            skills_required: text_cell(&result.skills_required),
            skills_matched: text_cell(&result.skills_matched),
            skill_match: percent_cell(&result.skill_match),
            occurrences: match &result.keyword_occurrences {
                Scored::Value(counts) => counts
                    .iter()
                    .map(|(keyword, count)| format!("{keyword}: {count}"))
                    .collect(),
                Scored::Error => vec![ERROR_SENTINEL.to_string()],
            },
            ats_compliance: percent_cell(&result.ats_compliance),
            experience_match: percent_cell(&result.experience_match),
            experience: match &result.experience_months {
                Scored::Value(map) => map
                    .iter()
                    .map(|(keyword, months)| format!("{keyword}: {months}"))
                    .collect(),
                Scored::Error => vec![ERROR_SENTINEL.to_string()],
            },
            verdict: result.verdict.label(),
            error: result.error.clone().unwrap_or_default(),
        }
    }
}

fn text_cell(value: &Scored<String>) -> String {
    value
        .value()
        .cloned()
        .unwrap_or_else(|| ERROR_SENTINEL.to_string())
}

fn percent_cell(value: &Scored<f64>) -> String {
    match value {
        Scored::Value(p) => format!("{p:.2}%"),
        Scored::Error => ERROR_SENTINEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::aggregate::{ResumeScores, ShortlistPolicy};
    use crate::screening::ats::AtsReport;
    use crate::screening::experience::ExperienceMap;
    use crate::screening::keywords::match_keywords;

    fn scored(name: &str) -> ScoreResult {
        let keywords = vec!["C++".to_string(), "Rust".to_string()];
        ScoreResult::scored(
            name,
            &keywords,
            ResumeScores {
                keywords: match_keywords("c++ only, more c++", &keywords),
                ats: AtsReport {
                    percentage: 66.666,
                    passed: 2,
                    total: 3,
                    failed: vec![],
                },
                experience: ExperienceMap::zeroed(&keywords),
            },
            2.0,
            &ShortlistPolicy::default(),
        )
    }

    fn render(results: &[ScoreResult]) -> String {
        ScreenerPage::with_results(results).render().unwrap()
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let html = render(&[scored("alice"), ScoreResult::failed("bob", "timed out")]);
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("<th>Relevant Experience in Months</th>"));
        assert!(html.contains("<td>alice</td>"));
        assert!(html.contains("<td>50.00%</td>"));
        assert!(html.contains("<td>66.67%</td>"));
        assert!(html.contains("<td>Not Shortlisted</td>"));
        assert!(html.contains("<td>C++: 2</td>"));
        assert!(html.contains("C++: 0<br>Rust: 0"));
        assert!(html.contains("<td>timed out</td>"));
    }

    #[test]
    fn test_error_row_uses_sentinel() {
        let html = render(&[ScoreResult::failed("bob", "boom")]);
        assert_eq!(html.matches("<td>Error</td>").count(), 8);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render(&[ScoreResult::failed("<script>", "a & b")]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_form_without_results_has_no_table() {
        let page = ScreenerPage::form().render().unwrap();
        assert!(page.contains("name=\"resumes\""));
        assert!(page.contains("name=\"job_description\""));
        assert!(page.contains("name=\"experience_required\""));
        assert!(!page.contains("<table"));
    }
}
