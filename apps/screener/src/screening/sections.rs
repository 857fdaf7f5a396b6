//! Section Locator: pulls the text that follows known resume headings.

use regex::Regex;

/// Headings whose bodies carry employment date ranges.
pub const DEFAULT_HEADINGS: &[&str] = &[
    "Employment History",
    "Work Experience",
    "Professional Experience",
    "Projects",
];

/// Punctuation allowed inside an ALL-CAPS heading line besides letters and spaces.
const HEADING_PUNCTUATION: &[char] = &['&', '/', '-', ':', ','];

#[derive(Debug, Clone)]
struct Heading {
    label: String,
    matcher: Regex,
}

#[derive(Debug, Clone)]
pub struct SectionLocator {
    headings: Vec<Heading>,
}

impl SectionLocator {
    pub fn new<I, S>(headings: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headings = headings
            .into_iter()
            .filter(|h| !h.as_ref().trim().is_empty())
            .map(|h| {
                let label = h.as_ref().trim().to_string();
                // Words may be split by any run of whitespace, including OCR line breaks.
                let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
                let matcher = Regex::new(&format!("(?i){}", words.join(r"\s+")))?;
                Ok(Heading { label, matcher })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { headings })
    }

    #[cfg(test)]
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_HEADINGS)
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.headings.iter().map(|h| h.label.as_str())
    }

    /// Concatenates the body of every heading found in `text`, in heading-list order.
    /// Returns an empty string when no heading is present.
    pub fn locate(&self, text: &str) -> String {
        self.headings
            .iter()
            .filter_map(|h| h.matcher.find(text))
            .map(|m| section_body(text, m.end()).trim())
            .filter(|body| !body.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text from `from` up to (not including) the next ALL-CAPS heading line, or to the end.
/// The remainder of the line the heading sits on is always part of the body.
fn section_body(text: &str, from: usize) -> &str {
    let rest = &text[from..];
    let mut offset = match rest.find('\n') {
        Some(i) => i + 1,
        None => return rest,
    };

    for line in rest[offset..].split_inclusive('\n') {
        if is_heading_line(line) {
            return &rest[..offset];
        }
        offset += line.len();
    }
    rest
}

pub fn is_heading_line(line: &str) -> bool {
    let line = line.trim();
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 3
        && line.chars().all(|c| {
            (c.is_alphabetic() && !c.is_lowercase())
                || c == ' '
                || HEADING_PUNCTUATION.contains(&c)
        })
}
