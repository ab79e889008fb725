//! Prompt text sent to the model for one listing.

use std::fmt::Write as _;

use chrono::NaiveDate;
use granthub_core::{RawListing, SchoolConfig};

/// Build the screening prompt for one listing and one school profile.
#[must_use]
pub fn build_prompt(listing: &RawListing, school: &SchoolConfig, today: NaiveDate) -> String {
    let mut p = String::with_capacity(1024);

    p.push_str(
        "You screen grant opportunities for a school. Decide whether the listing \
         below is a grant this school could realistically apply for, and extract \
         the details you can find.\n\n",
    );

    let _ = writeln!(p, "School: {}", school_label(school));
    if let Some(description) = &school.description {
        let _ = writeln!(p, "Profile: {description}");
    }
    if !school.priority_keywords.is_empty() {
        let _ = writeln!(p, "Mission keywords: {}", school.priority_keywords.join(", "));
    }
    if !school.exclude_keywords.is_empty() {
        let _ = writeln!(p, "Not interested in: {}", school.exclude_keywords.join(", "));
    }
    if let Some(notes) = &school.eligibility_notes {
        let _ = writeln!(p, "Eligibility notes: {notes}");
    }

    p.push_str("\nListing:\n");
    let _ = writeln!(p, "Title: {}", listing.title);
    let _ = writeln!(p, "Snippet: {}", listing.snippet);
    let _ = writeln!(p, "URL: {}", listing.link);
    let _ = writeln!(p, "Source: {}", listing.source);
    let _ = writeln!(p, "Funder hint: {}", listing.funder);
    if let Some(hint) = &listing.deadline_hint {
        let _ = writeln!(p, "Deadline hint: {hint}");
    }

    let _ = write!(
        p,
        "\nToday is {today}. Reply with one JSON object and nothing else:\n\
         {{\"relevant\": true or false, \
         \"score\": integer 0-5 (5 = ideal fit), \
         \"deadline\": \"YYYY-MM-DD\" or null, \
         \"amount\": award amount as written or null, \
         \"eligibility\": who may apply or null, \
         \"funder\": funding organization or null, \
         \"reason\": one short sentence}}\n",
        today = today.format("%Y-%m-%d"),
    );

    p
}

fn school_label(school: &SchoolConfig) -> String {
    match &school.abbreviation {
        Some(abbr) => format!("{} ({abbr})", school.name),
        None => school.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school() -> SchoolConfig {
        SchoolConfig {
            name: "Lincoln High".to_string(),
            abbreviation: Some("LHS".to_string()),
            description: Some("Public high school".to_string()),
            priority_keywords: vec!["stem".to_string(), "robotics".to_string()],
            exclude_keywords: vec!["loan".to_string()],
            eligibility_notes: None,
            queries: vec!["STEM grants 2025".to_string()],
            result_limit: 5,
            engine: "google".to_string(),
        }
    }

    fn listing() -> RawListing {
        RawListing {
            title: "STEM grants 2025".to_string(),
            snippet: "Funding for robotics clubs".to_string(),
            link: "https://grants.example.org/stem".to_string(),
            source: "grants.example.org".to_string(),
            funder: "Unknown".to_string(),
            deadline_hint: None,
            position: 1,
        }
    }

    #[test]
    fn prompt_includes_profile_and_listing() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let prompt = build_prompt(&listing(), &school(), today);

        assert!(prompt.contains("School: Lincoln High (LHS)"));
        assert!(prompt.contains("Mission keywords: stem, robotics"));
        assert!(prompt.contains("Not interested in: loan"));
        assert!(prompt.contains("Title: STEM grants 2025"));
        assert!(prompt.contains("URL: https://grants.example.org/stem"));
        assert!(prompt.contains("Today is 2026-10-19"));
        assert!(prompt.contains("\"relevant\""));
        assert!(!prompt.contains("Eligibility notes"));
        assert!(!prompt.contains("Deadline hint"));
    }
}
