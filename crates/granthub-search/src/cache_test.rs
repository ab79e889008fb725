use super::*;

fn sample() -> Vec<OrganicResult> {
    vec![OrganicResult {
        position: Some(1),
        title: Some("STEM grants 2025".to_string()),
        link: Some("https://grants.example.org/stem".to_string()),
        snippet: Some("Deadline: March 15, 2027".to_string()),
        source: None,
        displayed_link: None,
    }]
}

#[test]
fn key_is_stable_and_distinguishes_inputs() {
    let a = ResponseCache::key("google", "STEM grants 2025", 5);
    assert_eq!(a, ResponseCache::key("google", "  stem grants 2025 ", 5));
    assert_eq!(a.len(), 64);
    assert_ne!(a, ResponseCache::key("google", "STEM grants 2025", 10));
    assert_ne!(a, ResponseCache::key("bing", "STEM grants 2025", 5));
}

#[tokio::test]
async fn miss_then_hit() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path().join("search"), 24);
    let key = ResponseCache::key("google", "STEM grants 2025", 5);

    assert!(cache.get(&key).await.unwrap().is_none());
    cache
        .put(&key, "google", "STEM grants 2025", &sample())
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(sample()));
}

#[tokio::test]
async fn expired_entry_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path(), 24);
    let key = ResponseCache::key("google", "old query", 5);

    let stale = CachedSearch {
        captured_at: Utc::now() - TimeDelta::hours(48),
        engine: "google".to_string(),
        query: "old query".to_string(),
        organic_results: sample(),
    };
    cache.write_entry(&key, &stale).await.unwrap();

    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn zero_ttl_never_hits() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path(), 0);
    let key = ResponseCache::key("google", "q", 5);
    cache.put(&key, "google", "q", &sample()).await.unwrap();
    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_entry_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path(), 24);
    let key = ResponseCache::key("google", "q", 5);
    tokio::fs::write(dir.path().join(format!("{key}.json")), b"{not json")
        .await
        .unwrap();
    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn clear_removes_all_entries() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path(), 24);
    for q in ["a", "b", "c"] {
        let key = ResponseCache::key("google", q, 5);
        cache.put(&key, "google", q, &sample()).await.unwrap();
    }

    assert_eq!(cache.clear().await.unwrap(), 3);
    assert_eq!(cache.clear().await.unwrap(), 0);
    let key = ResponseCache::key("google", "a", 5);
    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn clear_on_missing_dir_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path().join("never-created"), 24);
    assert_eq!(cache.clear().await.unwrap(), 0);
}
