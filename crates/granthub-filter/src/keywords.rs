//! Keyword pre-screen over a listing's title and snippet.

/// Points added per matching priority keyword.
pub const PRIORITY_WEIGHT: i32 = 2;
/// Points subtracted per matching exclude keyword.
pub const EXCLUDE_WEIGHT: i32 = 2;

/// Score `text` against a school's keyword lists.
///
/// Matching is a case-insensitive substring test; each keyword counts once
/// no matter how often it appears. Blank keywords are ignored.
#[must_use]
pub fn keyword_score(text: &str, priority: &[String], exclude: &[String]) -> i32 {
    let haystack = text.to_lowercase();
    let hits = |words: &[String]| -> i32 {
        let count = words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty() && haystack.contains(w.as_str()))
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    };

    hits(priority).saturating_mul(PRIORITY_WEIGHT) - hits(exclude).saturating_mul(EXCLUDE_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn no_keywords_scores_zero() {
        assert_eq!(keyword_score("STEM grant", &[], &[]), 0);
    }

    #[test]
    fn priority_hits_add_two_each() {
        let score = keyword_score(
            "STEM Robotics grant for Science labs",
            &words(&["stem", "science", "arts"]),
            &[],
        );
        assert_eq!(score, 4);
    }

    #[test]
    fn exclude_hits_subtract_two_each() {
        let score = keyword_score(
            "Student loan program for university students",
            &words(&["stem"]),
            &words(&["loan", "university"]),
        );
        assert_eq!(score, -4);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        assert_eq!(
            keyword_score("stem stem stem", &words(&["STEM"]), &[]),
            2
        );
    }

    #[test]
    fn blank_keywords_are_ignored() {
        assert_eq!(keyword_score("anything", &words(&["", "  "]), &words(&[""])), 0);
    }
}
