use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

static DEADLINE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:applications due|deadline|closes|due(?: date)?)[:\s-]*([^.]+)")
        .expect("valid deadline keyword regex")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:",
        r"\d{4}-\d{1,2}-\d{1,2}|",
        r"\d{1,2}[\s/-]+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[\s/,-]+\d{2,4}|",
        r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s/-]+\d{1,2}(?:st|nd|rd|th)?[,\s/-]+\d{2,4}|",
        r"\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}",
        r")\b",
    ))
    .expect("valid date regex")
});

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

static SEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("valid sept regex"));

// Two-digit years are tried first: `%Y` would read "27" as year 27.
const NUMERIC_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y"];
const TEXTUAL_FORMATS: &[&str] = &["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y"];

/// Longest free-text hint kept when a deadline keyword is not followed by a date.
const MAX_HINT_CHARS: usize = 25;

/// An application deadline, or the absence of a parseable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "date")]
pub enum Deadline {
    Known(NaiveDate),
    Unknown,
}

impl Deadline {
    #[must_use]
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Deadline::Known(d) => Some(d),
            Deadline::Unknown => None,
        }
    }
}

impl From<Option<NaiveDate>> for Deadline {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Deadline::Unknown, Deadline::Known)
    }
}

/// Parse a single date string in any of the common listing formats.
///
/// Returns [`Deadline::Unknown`] rather than an error when nothing matches.
#[must_use]
pub fn parse_deadline(text: &str) -> Deadline {
    let trimmed = text.trim().trim_end_matches(['.', ',', ';', ')']);
    if trimmed.is_empty() {
        return Deadline::Unknown;
    }

    for fmt in NUMERIC_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Deadline::Known(date);
        }
    }

    let cleaned = ORDINAL.replace_all(trimmed, "$1");
    let cleaned = SEPT.replace_all(&cleaned, "Sep");
    let cleaned = cleaned
        .replace([',', '.', '/', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for fmt in TEXTUAL_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Deadline::Known(date);
        }
    }

    Deadline::Unknown
}

/// Find the text that most likely names a deadline in a listing snippet.
///
/// A deadline keyword ("deadline", "closes", "due", "applications due") wins:
/// the first date after it, or a short excerpt when no date follows. Without a
/// keyword, the first date anywhere in the text is used.
#[must_use]
pub fn find_deadline_text(text: &str) -> Option<String> {
    if let Some(caps) = DEADLINE_KEYWORD.captures(text) {
        let tail = caps.get(1).map_or("", |m| m.as_str()).trim();
        if let Some(date) = DATE.find(tail) {
            return Some(date.as_str().trim().to_string());
        }
        if !tail.is_empty() {
            return Some(tail.chars().take(MAX_HINT_CHARS).collect::<String>().trim().to_string());
        }
    }

    DATE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Locate and parse a deadline in free text.
#[must_use]
pub fn extract_deadline(text: &str) -> Deadline {
    match find_deadline_text(text) {
        Some(hint) => match parse_deadline(&hint) {
            Deadline::Known(d) => Deadline::Known(d),
            // The keyword excerpt may not be a date; fall back to any date.
            Deadline::Unknown => DATE
                .find(text)
                .map_or(Deadline::Unknown, |m| parse_deadline(m.as_str())),
        },
        None => Deadline::Unknown,
    }
}

/// The range of deadlines a run will store: from `today` to
/// `today + max_days`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineWindow {
    pub today: NaiveDate,
    pub max_days: u32,
}

impl DeadlineWindow {
    #[must_use]
    pub fn new(today: NaiveDate, max_days: u32) -> Self {
        Self { today, max_days }
    }

    /// Last admissible date. Saturates at the calendar maximum.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(u64::from(self.max_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Unknown deadlines are admitted; known ones must fall inside the window.
    #[must_use]
    pub fn admits(&self, deadline: Deadline) -> bool {
        match deadline {
            Deadline::Unknown => true,
            Deadline::Known(d) => d >= self.today && d <= self.last_day(),
        }
    }
}

#[cfg(test)]
#[path = "deadline_test.rs"]
mod tests;
