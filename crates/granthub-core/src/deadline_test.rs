use chrono::NaiveDate;

use super::*;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn parses_long_month_format() {
    assert_eq!(parse_deadline("March 15, 2027"), Deadline::Known(ymd(2027, 3, 15)));
}

#[test]
fn parses_day_first_short_month() {
    assert_eq!(parse_deadline("25 Oct 2026"), Deadline::Known(ymd(2026, 10, 25)));
}

#[test]
fn parses_us_numeric_format() {
    assert_eq!(parse_deadline("01/15/2027"), Deadline::Known(ymd(2027, 1, 15)));
}

#[test]
fn parses_iso_format() {
    assert_eq!(parse_deadline("2027-02-01"), Deadline::Known(ymd(2027, 2, 1)));
}

#[test]
fn parses_ordinals_and_abbreviations() {
    assert_eq!(parse_deadline("Sept 5th, 2026"), Deadline::Known(ymd(2026, 9, 5)));
    assert_eq!(parse_deadline("Jan. 3, 2027"), Deadline::Known(ymd(2027, 1, 3)));
}

#[test]
fn unparseable_text_is_unknown() {
    assert_eq!(parse_deadline("rolling basis"), Deadline::Unknown);
    assert_eq!(parse_deadline(""), Deadline::Unknown);
    assert_eq!(parse_deadline("13/45/2027"), Deadline::Unknown);
}

#[test]
fn find_prefers_date_after_keyword() {
    let snippet = "Opened January 1, 2026. Applications due: March 15, 2027 for all schools";
    assert_eq!(find_deadline_text(snippet).as_deref(), Some("March 15, 2027"));
}

#[test]
fn find_falls_back_to_any_date() {
    let snippet = "Awards announced 25 Oct 2026 for robotics programs";
    assert_eq!(find_deadline_text(snippet).as_deref(), Some("25 Oct 2026"));
}

#[test]
fn find_keeps_short_excerpt_when_keyword_has_no_date() {
    let snippet = "Deadline: rolling, reviewed monthly by the committee";
    assert_eq!(
        find_deadline_text(snippet).as_deref(),
        Some("rolling, reviewed monthly")
    );
}

#[test]
fn find_returns_none_without_dates() {
    assert_eq!(find_deadline_text("Funding for science labs"), None);
}

#[test]
fn extract_parses_keyword_date() {
    assert_eq!(
        extract_deadline("Deadline - 01/15/2027. Apply online."),
        Deadline::Known(ymd(2027, 1, 15))
    );
}

#[test]
fn extract_without_date_is_unknown() {
    assert_eq!(extract_deadline("Deadline: rolling"), Deadline::Unknown);
}

#[test]
fn window_excludes_past_dates() {
    let window = DeadlineWindow::new(ymd(2026, 10, 19), 365);
    assert!(!window.admits(Deadline::Known(ymd(2026, 10, 18))));
}

#[test]
fn window_admits_today_and_last_day() {
    let window = DeadlineWindow::new(ymd(2026, 10, 19), 30);
    assert!(window.admits(Deadline::Known(ymd(2026, 10, 19))));
    assert!(window.admits(Deadline::Known(ymd(2026, 11, 18))));
    assert!(!window.admits(Deadline::Known(ymd(2026, 11, 19))));
}

#[test]
fn window_admits_unknown_deadline() {
    let window = DeadlineWindow::new(ymd(2026, 10, 19), 0);
    assert!(window.admits(Deadline::Unknown));
}

#[test]
fn deadline_from_option() {
    assert_eq!(Deadline::from(None), Deadline::Unknown);
    assert_eq!(
        Deadline::from(Some(ymd(2027, 1, 1))).date(),
        Some(ymd(2027, 1, 1))
    );
}
