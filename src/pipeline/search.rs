//! Mock "web search" for recency questions.
//!
//! There is no network lookup: a fixed table answers questions about
//! upcoming events, news, blog posts and meetups.

/// Queries containing any of these (substring, case-insensitive) consult search.
const TRIGGER_KEYWORDS: &[&str] =
    &["latest", "upcoming", "current", "recent", "new", "today", "this week"];

const RESULTS: &[(&str, &str)] = &[
    (
        "upcoming events",
        "AI Learning Series - Nov 5th, Mentorship Matching - Nov 12th, Career Workshop - Nov 19th",
    ),
    (
        "latest news",
        "WCC AI Learning Series launched! 12 sessions covering AI fundamentals to advanced topics.",
    ),
    (
        "recent blog",
        "Latest blog post: 'Building Your First AI Application' by community members",
    ),
    ("meetups", "Monthly meetups in London, Manchester, and virtual sessions every Wednesday"),
];

const NO_RESULTS: &str =
    "No specific WCC information found. Please check our website or Slack for the latest updates.";

#[derive(Debug, Clone, Default)]
pub struct MockSearch;

impl MockSearch {
    pub fn needs_search(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        TRIGGER_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// First table entry sharing any word with `query` (substring match),
    /// or a fixed "nothing found" line.
    pub fn search(&self, query: &str) -> String {
        let lower = query.to_lowercase();
        let hit = RESULTS
            .iter()
            .find(|(key, _)| key.split_whitespace().any(|word| lower.contains(word)))
            .map(|(_, result)| *result)
            .unwrap_or(NO_RESULTS);
        format!("Search results for '{query}': {hit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_words_trigger() {
        let s = MockSearch;
        assert!(s.needs_search("What UPCOMING events do you have?"));
        assert!(s.needs_search("anything on this week?"));
        assert!(!s.needs_search("How do I volunteer?"));
    }

    #[test]
    fn table_lookup_by_word() {
        let out = MockSearch.search("Any events soon?");
        assert!(out.starts_with("Search results for 'Any events soon?': AI Learning Series"));
        assert!(MockSearch.search("latest blog").contains("WCC AI Learning Series launched"));
    }

    #[test]
    fn no_match_falls_back() {
        assert!(MockSearch.search("volunteer").ends_with(NO_RESULTS));
    }
}
