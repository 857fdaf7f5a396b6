//! Date Extractor: finds date-like substrings in free text and parses them into calendar values.
//!
//! Extraction is driven by a `DateRules` table: an ordered list of regex patterns (priority order)
//! and an ordered list of chrono format strings. Each raw match is tried against every format in
//! order; the first one that parses wins. Matches that parse under no format are dropped.

use std::iter::Peekable;

use chrono::{Datelike, NaiveDate};
use regex::{Matches, Regex};
use serde::{Deserialize, Serialize};

/// A calendar value parsed out of resume text. `month` is always within 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

impl DateSpan {
    #[cfg(test)]
    pub fn month_of(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            month,
            day: None,
        })
    }

    fn from_date(date: NaiveDate, with_day: bool) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: with_day.then(|| date.day()),
        }
    }

    /// Whole months from `self` to `later`. Negative when `later` is actually earlier.
    pub fn months_until(&self, later: &DateSpan) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + (later.month as i64 - self.month as i64)
    }
}

/// Built-in patterns, highest priority first.
pub const STANDARD_PATTERNS: &[(&str, &str)] = &[
    ("dd/mm/yyyy", r"\b\d{1,2}/\d{1,2}/\d{4}\b"),
    ("yyyy-mm-dd", r"\b\d{4}-\d{2}-\d{2}\b"),
    ("yyyy/mm/dd", r"\b\d{4}/\d{2}/\d{2}\b"),
    ("yyyy/mm", r"\b\d{4}/\d{2}\b"),
    ("dd month yyyy", r"\b\d{1,2}\s[A-Za-z]{3,9}\.?\s\d{4}\b"),
    ("month yyyy", r"\b[A-Za-z]{3,9}\.?\s?\d{4}\b"),
    ("mm/yyyy", r"\b\d{1,2}/\d{4}\b"),
    ("mm yyyy", r"\b(?:0[1-9]|1[0-2])\s\d{4}\b"),
];

/// Built-in chrono formats, tried in order for every raw match.
/// Day-first numeric dates win over month-first ones.
pub const STANDARD_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%Y/%m", "%d %b %Y", "%b %Y", "%m/%Y",
    "%m %Y",
];

#[derive(Debug, Clone)]
pub struct DatePattern {
    pub name: String,
    regex: Regex,
}

#[derive(Debug, Clone)]
struct DateFormat {
    pattern: String,
    has_day: bool,
}

impl DateFormat {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            has_day: pattern.contains("%d"),
        }
    }

    fn parse(&self, raw: &str) -> Option<DateSpan> {
        if self.has_day {
            return NaiveDate::parse_from_str(raw, &self.pattern)
                .ok()
                .map(|d| DateSpan::from_date(d, true));
        }
        // chrono needs a day to build a date; pin it to the 1st and drop it afterwards.
        NaiveDate::parse_from_str(&format!("1 {raw}"), &format!("%d {}", self.pattern))
            .ok()
            .map(|d| DateSpan::from_date(d, false))
    }
}

/// Prioritized (pattern, format) table used by the extractor.
#[derive(Debug, Clone)]
pub struct DateRules {
    patterns: Vec<DatePattern>,
    formats: Vec<DateFormat>,
}

impl DateRules {
    pub fn new(patterns: &[(&str, &str)], formats: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|(name, pattern)| {
                Ok(DatePattern {
                    name: name.to_string(),
                    regex: Regex::new(pattern)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            patterns,
            formats: formats.iter().map(|f| DateFormat::new(f)).collect(),
        })
    }

    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(STANDARD_PATTERNS, STANDARD_FORMATS)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Parses a single raw date string with the first matching format.
    pub fn parse(&self, raw: &str) -> Option<DateSpan> {
        let cleaned = normalize(raw);
        self.formats.iter().find_map(|f| f.parse(&cleaned))
    }

    /// Lazily yields every parseable date in `text`, in order of appearance.
    pub fn extract<'r, 't>(&'r self, text: &'t str) -> DateSpans<'r, 't> {
        DateSpans {
            rules: self,
            cursors: self
                .patterns
                .iter()
                .map(|p| p.regex.find_iter(text).peekable())
                .collect(),
            consumed_to: 0,
            rejected_to: 0,
        }
    }
}

/// Drops abbreviation dots, collapses whitespace, and splits "Jan2020" into "Jan 2020".
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    let mut prev: Option<char> = None;
    for c in raw.trim().chars().filter(|&c| c != '.') {
        if c.is_whitespace() {
            if prev.is_some_and(|p| !p.is_whitespace()) {
                out.push(' ');
            }
            prev = Some(' ');
            continue;
        }
        if c.is_ascii_digit() && prev.is_some_and(|p| p.is_alphabetic()) {
            out.push(' ');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Single-pass iterator over the dates of one text span.
///
/// Runs every pattern in parallel and always takes the earliest match; on an identical start the
/// higher-priority pattern is taken first. Matches overlapping an already yielded date are skipped,
/// and so are matches lying inside one that failed to parse: "31/02/2020" is not a date, so
/// neither is its "02/2020" tail.
pub struct DateSpans<'r, 't> {
    rules: &'r DateRules,
    cursors: Vec<Peekable<Matches<'r, 't>>>,
    consumed_to: usize,
    rejected_to: usize,
}

impl<'r, 't> Iterator for DateSpans<'r, 't> {
    type Item = DateSpan;

    fn next(&mut self) -> Option<DateSpan> {
        loop {
            let (index, _) = self
                .cursors
                .iter_mut()
                .enumerate()
                .filter_map(|(i, cursor)| cursor.peek().map(|m| (i, m.start())))
                .min_by_key(|&(i, start)| (start, i))?;

            let candidate = self.cursors[index].next()?;
            if candidate.start() < self.consumed_to || candidate.end() <= self.rejected_to {
                continue;
            }

            match self.rules.parse(candidate.as_str()) {
                Some(span) => {
                    self.consumed_to = candidate.end();
                    return Some(span);
                }
                None => self.rejected_to = self.rejected_to.max(candidate.end()),
            }
        }
    }
}
