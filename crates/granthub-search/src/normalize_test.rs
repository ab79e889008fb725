use super::*;

fn result(title: &str, snippet: &str, link: &str) -> OrganicResult {
    OrganicResult {
        position: Some(1),
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        snippet: Some(snippet.to_string()),
        source: None,
        displayed_link: Some("https://grants.example.org › stem".to_string()),
    }
}

#[test]
fn funder_found_in_snippet() {
    let funder = extract_funder(
        "STEM Classroom Grants",
        "Grants from the National Science Foundation support K-12 labs.",
        "",
    );
    assert_eq!(funder, "National Science Foundation");
}

#[test]
fn funder_snippet_wins_over_title() {
    let funder = extract_funder(
        "Ford Family Trust Fund awards",
        "Offered by the Spencer Arts Council this spring",
        "",
    );
    assert_eq!(funder, "Spencer Arts Council");
}

#[test]
fn funder_falls_back_to_title() {
    let funder = extract_funder("American Chemical Society Teacher Grants", "Apply now", "");
    assert_eq!(funder, "American Chemical Society");
}

#[test]
fn funder_falls_back_to_source_then_unknown() {
    assert_eq!(extract_funder("grants", "apply now", "Edutopia"), "Edutopia");
    assert_eq!(extract_funder("grants", "apply now", "  "), "Unknown");
}

#[test]
fn to_listing_maps_fields() {
    let r = result(
        "STEM grants 2025",
        "Deadline: March 15, 2027. Funded by the Gates Family Foundation.",
        "https://grants.example.org/stem",
    );
    let listing = to_listing(&r, 9).expect("listing");
    assert_eq!(listing.title, "STEM grants 2025");
    assert_eq!(listing.link, "https://grants.example.org/stem");
    assert_eq!(listing.source, "https://grants.example.org › stem");
    assert_eq!(listing.funder, "Gates Family Foundation");
    assert_eq!(listing.deadline_hint.as_deref(), Some("March 15, 2027"));
    assert_eq!(listing.position, 1);
}

#[test]
fn to_listing_skips_missing_link() {
    let mut r = result("t", "s", "  ");
    assert!(to_listing(&r, 1).is_none());
    r.link = None;
    assert!(to_listing(&r, 1).is_none());
}

#[test]
fn to_listing_fills_defaults() {
    let r = OrganicResult {
        link: Some("https://foundation.example/apply?x=1".to_string()),
        ..OrganicResult::default()
    };
    let listing = to_listing(&r, 4).expect("listing");
    assert_eq!(listing.title, "No title available");
    assert_eq!(listing.snippet, "");
    assert_eq!(listing.source, "foundation.example");
    assert_eq!(listing.funder, "Unknown");
    assert_eq!(listing.deadline_hint, None);
    assert_eq!(listing.position, 4);
}
