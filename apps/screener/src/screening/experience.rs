//! Experience Estimator: turns date ranges in the employment sections into months per keyword.
//!
//! Algorithm:
//! 1. Extract dates from the section text in order of appearance.
//! 2. Pair them positionally: (d0, d1), (d2, d3), … An odd trailing date is ignored.
//! 3. Each pair is ordered chronologically and contributes `Δyears × 12 + Δmonths` (never negative).
//! 4. Every keyword present anywhere in the section text accrues every pair's months.
//!
//! Step 4 over-counts when a section lists unrelated jobs: a keyword mentioned once still collects
//! the duration of every range. That is the expected heuristic, not a bug.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::screening::dates::{DateRules, DateSpan};
use crate::screening::keywords::contains_keyword;

/// Keyword → accumulated whole months, in first-occurrence order of the input keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperienceMap {
    entries: Vec<(String, u64)>,
}

impl ExperienceMap {
    /// One zeroed entry per distinct keyword.
    pub fn zeroed(keywords: &[String]) -> Self {
        let mut entries: Vec<(String, u64)> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            if !entries.iter().any(|(k, _)| k == keyword) {
                entries.push((keyword.clone(), 0));
            }
        }
        Self { entries }
    }

    #[cfg(test)]
    pub fn get(&self, keyword: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, months)| *months)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), *m))
    }

    /// Sum over all keywords. Saturates instead of overflowing on absurd date ranges.
    pub fn total_months(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, (_, months)| total.saturating_add(*months))
    }
}

impl Serialize for ExperienceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (keyword, months) in &self.entries {
            map.serialize_entry(keyword, months)?;
        }
        map.end()
    }
}

/// Months covered by a date pair, regardless of the order the dates were written in.
pub fn interval_months(a: DateSpan, b: DateSpan) -> u64 {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    start.months_until(&end).max(0) as u64
}

pub fn estimate_experience(
    rules: &DateRules,
    employment_text: &str,
    keywords: &[String],
) -> ExperienceMap {
    let mut experience = ExperienceMap::zeroed(keywords);

    let dates: Vec<DateSpan> = rules.extract(employment_text).collect();
    if dates.len() < 2 {
        return experience;
    }

    let text_lower = employment_text.to_lowercase();
    let present: Vec<bool> = experience
        .entries
        .iter()
        .map(|(keyword, _)| contains_keyword(&text_lower, keyword))
        .collect();

    for pair in dates.chunks_exact(2) {
        let months = interval_months(pair[0], pair[1]);
        for ((_, total), _) in experience
            .entries
            .iter_mut()
            .zip(&present)
            .filter(|(_, present)| **present)
        {
            *total = total.saturating_add(months);
        }
    }

    experience
}
