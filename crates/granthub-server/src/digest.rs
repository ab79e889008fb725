//! Plain-text grant digests for a school. Rendered only; delivery is left to
//! whoever calls the API.

use std::fmt::Write as _;

use chrono::NaiveDate;
use granthub_db::GrantRow;
use serde::Serialize;

const NO_DEADLINE: &str = "Check link for deadline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub grant_count: usize,
}

/// Render a digest of `grants` addressed to `school_email`.
///
/// Grants keep the order they are given in.
#[must_use]
pub fn render_digest(
    school_email: &str,
    school_name: &str,
    grants: &[GrantRow],
    generated_on: NaiveDate,
) -> Digest {
    let count = grants.len();
    let noun = if count == 1 { "opportunity" } else { "opportunities" };
    let subject = format!("{count} grant {noun} for {school_name}");

    let mut body = String::new();
    // Writing into a String cannot fail.
    let _ = write_body(&mut body, school_name, grants, generated_on, noun);

    Digest {
        to: school_email.to_string(),
        subject,
        body,
        grant_count: count,
    }
}

fn write_body(
    out: &mut String,
    school_name: &str,
    grants: &[GrantRow],
    generated_on: NaiveDate,
    noun: &str,
) -> std::fmt::Result {
    writeln!(out, "Grant digest for {school_name}")?;
    writeln!(out, "Prepared {generated_on}")?;
    writeln!(out)?;
    writeln!(out, "{} grant {noun}:", grants.len())?;

    for (index, grant) in grants.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{}. {}", index + 1, grant.title)?;
        writeln!(out, "   Funder: {}", grant.funder)?;
        match grant.deadline {
            Some(deadline) => writeln!(out, "   Deadline: {}", deadline.format("%B %-d, %Y"))?,
            None => writeln!(out, "   Deadline: {NO_DEADLINE}")?,
        }
        if let Some(amount) = &grant.amount_text {
            writeln!(out, "   Amount: {amount}")?;
        }
        if let Some(eligibility) = &grant.eligibility {
            writeln!(out, "   Eligibility: {eligibility}")?;
        }
        if !grant.description.is_empty() {
            writeln!(out, "   {}", grant.description)?;
        }
        writeln!(out, "   Link: {}", grant.source_url)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn row(title: &str, deadline: Option<NaiveDate>, amount: Option<&str>) -> GrantRow {
        GrantRow {
            id: 1,
            public_id: Uuid::new_v4(),
            school_id: 1,
            school_name: "Lincoln High".to_string(),
            title: title.to_string(),
            description: String::new(),
            source_url: format!("https://example.org/{}", title.len()),
            funder: "NSF".to_string(),
            deadline,
            amount_text: amount.map(ToString::to_string),
            amount_value: None,
            eligibility: None,
            relevance_score: 4,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_grant_uses_singular_subject() {
        let digest = render_digest(
            "office@lincoln.edu",
            "Lincoln High",
            &[row("STEM Lab Grant", Some(day(2026, 11, 18)), Some("$5,000"))],
            day(2026, 10, 19),
        );
        assert_eq!(digest.to, "office@lincoln.edu");
        assert_eq!(digest.subject, "1 grant opportunity for Lincoln High");
        assert_eq!(digest.grant_count, 1);
        assert!(digest.body.contains("1. STEM Lab Grant"));
        assert!(digest.body.contains("Deadline: November 18, 2026"));
        assert!(digest.body.contains("Amount: $5,000"));
        assert!(digest.body.contains("Prepared 2026-10-19"));
    }

    #[test]
    fn unknown_deadline_points_to_link() {
        let digest = render_digest(
            "office@lincoln.edu",
            "Lincoln High",
            &[row("Arts Fund", None, None), row("Robotics Award", None, None)],
            day(2026, 10, 19),
        );
        assert_eq!(digest.subject, "2 grant opportunities for Lincoln High");
        assert!(digest.body.contains("Deadline: Check link for deadline"));
        assert!(!digest.body.contains("Amount:"));
        assert!(digest.body.contains("2. Robotics Award"));
    }
}
