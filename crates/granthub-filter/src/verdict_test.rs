use chrono::NaiveDate;

use super::*;

fn listing() -> RawListing {
    RawListing {
        title: "STEM grants 2025".to_string(),
        snippet: "Classroom STEM funding. Apply by 01/15/2027.".to_string(),
        link: "https://grants.example.org/stem".to_string(),
        source: "grants.example.org".to_string(),
        funder: "National Science Foundation".to_string(),
        deadline_hint: Some("March 15, 2027".to_string()),
        position: 1,
    }
}

fn assessment(relevant: bool, score: f64) -> ModelAssessment {
    ModelAssessment {
        relevant,
        score,
        deadline: Some("2027-02-01".to_string()),
        amount: Some("Up to $5,000".to_string()),
        eligibility: Some("K-12 public schools".to_string()),
        funder: Some("NSF".to_string()),
        reason: Some("Matches STEM mission".to_string()),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn parse_plain_json() {
    let parsed = parse_model_text(r#"{"relevant": true, "score": 4, "reason": "fits"}"#).unwrap();
    assert!(parsed.relevant);
    assert!((parsed.score - 4.0).abs() < f64::EPSILON);
    assert_eq!(parsed.reason.as_deref(), Some("fits"));
    assert!(parsed.deadline.is_none());
}

#[test]
fn parse_fenced_json() {
    let text = "```json\n{\"relevant\": false, \"score\": 1, \"deadline\": null}\n```";
    let parsed = parse_model_text(text).unwrap();
    assert!(!parsed.relevant);
    assert!(parsed.deadline.is_none());
}

#[test]
fn parse_json_surrounded_by_prose() {
    let text = "Here is my answer: {\"relevant\": true, \"score\": 3} Hope that helps.";
    let parsed = parse_model_text(text).unwrap();
    assert!(parsed.relevant);
}

#[test]
fn parse_rejects_non_json() {
    let err = parse_model_text("I think this grant is relevant.").unwrap_err();
    assert!(matches!(err, FilterError::MalformedResponse(_)));
}

#[test]
fn parse_rejects_missing_required_fields() {
    let err = parse_model_text(r#"{"score": 4}"#).unwrap_err();
    assert!(matches!(err, FilterError::MalformedResponse(_)));
}

#[test]
fn decide_accepts_at_threshold() {
    let verdict = decide(&assessment(true, 2.0), &listing(), 2);
    let Verdict::Accepted { fields, score } = verdict else {
        panic!("expected Accepted, got {verdict:?}");
    };
    assert_eq!(score, 2);
    assert_eq!(fields.deadline, Deadline::Known(ymd(2027, 2, 1)));
    assert_eq!(fields.amount_text.as_deref(), Some("Up to $5,000"));
    assert_eq!(fields.amount_value, Some(Decimal::new(5000, 0)));
    assert_eq!(fields.eligibility.as_deref(), Some("K-12 public schools"));
    assert_eq!(fields.funder.as_deref(), Some("NSF"));
}

#[test]
fn decide_rejects_below_threshold() {
    let verdict = decide(&assessment(true, 1.0), &listing(), 2);
    assert_eq!(
        verdict,
        Verdict::Rejected {
            reason: "score 1 below threshold 2".to_string()
        }
    );
}

#[test]
fn decide_rejects_irrelevant_even_with_high_score() {
    let mut a = assessment(false, 5.0);
    a.reason = Some("not relevant".to_string());
    assert_eq!(
        decide(&a, &listing(), 2),
        Verdict::Rejected {
            reason: "not relevant".to_string()
        }
    );
}

#[test]
fn decide_irrelevant_without_reason_gets_default() {
    let mut a = assessment(false, 0.0);
    a.reason = None;
    assert_eq!(
        decide(&a, &listing(), 2),
        Verdict::Rejected {
            reason: "not relevant".to_string()
        }
    );
}

#[test]
fn decide_clamps_out_of_range_scores() {
    let Verdict::Accepted { score, .. } = decide(&assessment(true, 9.0), &listing(), 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(score, 5);

    let verdict = decide(&assessment(true, -3.0), &listing(), 0);
    assert!(matches!(verdict, Verdict::Accepted { score: 0, .. }));
}

#[test]
fn decide_falls_back_to_deadline_hint() {
    let mut a = assessment(true, 4.0);
    a.deadline = Some("unknown".to_string());
    let Verdict::Accepted { fields, .. } = decide(&a, &listing(), 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(fields.deadline, Deadline::Known(ymd(2027, 3, 15)));
}

#[test]
fn decide_falls_back_to_snippet_date() {
    let mut a = assessment(true, 4.0);
    a.deadline = None;
    let mut l = listing();
    l.deadline_hint = None;
    let Verdict::Accepted { fields, .. } = decide(&a, &l, 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(fields.deadline, Deadline::Known(ymd(2027, 1, 15)));
}

#[test]
fn decide_unknown_deadline_when_nothing_parses() {
    let mut a = assessment(true, 4.0);
    a.deadline = None;
    let mut l = listing();
    l.deadline_hint = Some("rolling".to_string());
    l.snippet = "Rolling applications".to_string();
    let Verdict::Accepted { fields, .. } = decide(&a, &l, 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(fields.deadline, Deadline::Unknown);
}

#[test]
fn decide_drops_placeholder_values() {
    let mut a = assessment(true, 4.0);
    a.amount = Some("N/A".to_string());
    a.funder = Some(" unknown ".to_string());
    let Verdict::Accepted { fields, .. } = decide(&a, &listing(), 2) else {
        panic!("expected Accepted");
    };
    assert!(fields.amount_text.is_none());
    assert!(fields.amount_value.is_none());
    assert!(fields.funder.is_none());
}

#[test]
fn amount_text_without_figure_keeps_text_only() {
    let mut a = assessment(true, 4.0);
    a.amount = Some("Varies by project".to_string());
    let Verdict::Accepted { fields, .. } = decide(&a, &listing(), 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(fields.amount_text.as_deref(), Some("Varies by project"));
    assert!(fields.amount_value.is_none());
}

#[test]
fn parse_tolerates_numeric_amount() {
    let text = r#"{"relevant":true,"score":4,"deadline":"2026-11-30","amount":5000,"eligibility":"K-12","funder":"NSF","reason":"fits"}"#;
    let parsed = parse_model_text(text).unwrap();
    assert_eq!(parsed.amount.as_deref(), Some("5000"));

    let Verdict::Accepted { fields, score } = decide(&parsed, &listing(), 2) else {
        panic!("expected Accepted");
    };
    assert_eq!(score, 4);
    assert_eq!(fields.amount_text.as_deref(), Some("5000"));
    assert_eq!(fields.amount_value, Some(Decimal::new(5000, 0)));
    assert_eq!(fields.deadline, Deadline::Known(ymd(2026, 11, 30)));
}

#[test]
fn parse_tolerates_quoted_score_and_list_fields() {
    let text = r#"{"relevant":true,"score":"3","eligibility":["Public schools","Grades 6-12"],"funder":null,"amount":false}"#;
    let parsed = parse_model_text(text).unwrap();
    assert!((parsed.score - 3.0).abs() < f64::EPSILON);
    assert_eq!(parsed.eligibility.as_deref(), Some("Public schools, Grades 6-12"));
    assert!(parsed.funder.is_none());
    assert!(parsed.amount.is_none());
}

#[test]
fn parse_rejects_non_numeric_score() {
    let err = parse_model_text(r#"{"relevant":true,"score":"high"}"#).unwrap_err();
    assert!(matches!(err, FilterError::MalformedResponse(_)));
}
