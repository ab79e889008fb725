use std::path::Path;

use super::*;

fn school(name: &str) -> SchoolConfig {
    SchoolConfig {
        name: name.to_string(),
        abbreviation: None,
        description: None,
        priority_keywords: vec!["stem".to_string()],
        exclude_keywords: vec![],
        eligibility_notes: None,
        queries: vec!["STEM grants 2025".to_string()],
        result_limit: DEFAULT_RESULT_LIMIT,
        engine: DEFAULT_SEARCH_ENGINE.to_string(),
    }
}

#[test]
fn yaml_defaults_are_applied() {
    let yaml = r"
schools:
  - name: Lincoln High
    queries:
      - STEM grants 2025
";
    let file: SchoolsFile = serde_yaml::from_str(yaml).expect("parse");
    let s = &file.schools[0];
    assert_eq!(s.result_limit, 5);
    assert_eq!(s.engine, "google");
    assert!(s.priority_keywords.is_empty());
    assert!(s.abbreviation.is_none());
    assert!(validate_schools(&file).is_ok());
}

#[test]
fn yaml_full_profile_parses() {
    let yaml = r"
schools:
  - name: Daystar Academy
    abbreviation: DSA
    description: K-12 international school
    priority_keywords: [bilingual, stem, arts]
    exclude_keywords: [university only]
    eligibility_notes: Registered nonprofit
    queries:
      - education grants for schools
      - bilingual education funding
    result_limit: 10
    engine: bing
";
    let file: SchoolsFile = serde_yaml::from_str(yaml).expect("parse");
    let s = &file.schools[0];
    assert_eq!(s.abbreviation.as_deref(), Some("DSA"));
    assert_eq!(s.priority_keywords.len(), 3);
    assert_eq!(s.exclude_keywords, vec!["university only".to_string()]);
    assert_eq!(s.result_limit, 10);
    assert_eq!(s.engine, "bing");
    assert_eq!(file.unit_count(), 2);
}

#[test]
fn validate_rejects_empty_name() {
    let file = SchoolsFile {
        schools: vec![school("   ")],
    };
    let err = validate_schools(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_name_case_insensitive() {
    let file = SchoolsFile {
        schools: vec![school("Lincoln High"), school("lincoln high")],
    };
    let err = validate_schools(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate school name"));
}

#[test]
fn validate_rejects_missing_queries() {
    let mut s = school("Lincoln High");
    s.queries = vec![" ".to_string()];
    let file = SchoolsFile { schools: vec![s] };
    let err = validate_schools(&file).unwrap_err();
    assert!(err.to_string().contains("at least one search query"));
}

#[test]
fn validate_rejects_out_of_range_result_limit() {
    for limit in [0, 101] {
        let mut s = school("Lincoln High");
        s.result_limit = limit;
        let file = SchoolsFile { schools: vec![s] };
        let err = validate_schools(&file).unwrap_err();
        assert!(err.to_string().contains("result_limit"), "limit {limit}");
    }
}

#[test]
fn load_schools_reports_missing_file() {
    let err = load_schools(Path::new("/definitely/not/here/schools.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SchoolsFileIo { .. }));
}

#[test]
fn load_schools_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("schools.yaml");
    assert!(path.exists(), "schools.yaml missing at {path:?}");
    let file = load_schools(&path).expect("failed to load schools.yaml");
    assert!(!file.schools.is_empty());
    assert!(file.unit_count() >= file.schools.len());
}
