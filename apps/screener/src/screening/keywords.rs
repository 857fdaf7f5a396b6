use serde::ser::{Serialize, SerializeMap, Serializer};

/// Result of matching a keyword list against one resume.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    /// found / total × 100. 0 when there are no keywords.
    pub percentage: f64,
    /// Keywords present in the text, in input order.
    pub found: Vec<String>,
    /// Keywords absent from the text, in input order.
    pub missing: Vec<String>,
    /// Non-overlapping occurrence count per found keyword.
    pub occurrences: KeywordCounts,
}

/// Keyword → occurrence count, in first-occurrence order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    entries: Vec<(String, usize)>,
}

impl KeywordCounts {
    /// Repeated keywords keep their first entry.
    fn insert(&mut self, keyword: &str, count: usize) {
        if !self.entries.iter().any(|(k, _)| k == keyword) {
            self.entries.push((keyword.to_string(), count));
        }
    }

    #[cfg(test)]
    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }
}

impl Serialize for KeywordCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (keyword, count) in &self.entries {
            map.serialize_entry(keyword, count)?;
        }
        map.end()
    }
}

/// Splits a comma-separated job description into trimmed, non-empty keywords.
pub fn parse_job_description(job_description: &str) -> Vec<String> {
    job_description
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// `text_lower` must already be lowercased. Blank keywords never match.
pub fn contains_keyword(text_lower: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    !keyword.is_empty() && text_lower.contains(&keyword.to_lowercase())
}

pub fn match_keywords(text: &str, keywords: &[String]) -> KeywordMatch {
    let text_lower = text.to_lowercase();

    let mut found = Vec::new();
    let mut missing = Vec::new();
    let mut occurrences = KeywordCounts::default();

    for keyword in keywords {
        if contains_keyword(&text_lower, keyword) {
            let count = text_lower.matches(&keyword.trim().to_lowercase()).count();
            occurrences.insert(keyword, count);
            found.push(keyword.clone());
        } else {
            missing.push(keyword.clone());
        }
    }

    KeywordMatch {
        percentage: percentage(found.len(), keywords.len()),
        found,
        missing,
        occurrences,
    }
}

/// part / whole × 100, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
}
