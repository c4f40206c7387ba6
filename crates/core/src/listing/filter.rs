use std::fmt;

use super::Listing;

/// Sentinel token that disables category filtering.
pub const ALL_TOKEN: &str = "all";

/// Platform/category restriction applied before search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category passes.
    #[default]
    All,
    /// Only entities whose category equals this lowercase token.
    Only(String),
}

impl CategoryFilter {
    /// Parse a filter token; `all` in any case is the sentinel.
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        if token.is_empty() || token == ALL_TOKEN {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(token)
        }
    }

    /// Token form, `all` for the sentinel.
    pub fn token(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_TOKEN,
            CategoryFilter::Only(token) => token,
        }
    }

    /// Case-insensitive exact comparison. Entities without a category only pass `All`.
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(token) => category
                .map(|value| value.to_lowercase() == *token)
                .unwrap_or(false),
        }
    }

    /// Step through `All` followed by `options`, wrapping back to `All`.
    pub fn cycle(&self, options: &[String]) -> Self {
        let next = match self {
            CategoryFilter::All => options.first(),
            CategoryFilter::Only(token) => options
                .iter()
                .position(|option| option.to_lowercase() == *token)
                .and_then(|idx| options.get(idx + 1)),
        };
        next.map(|option| CategoryFilter::parse(option))
            .unwrap_or_default()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Free-text search, matched as a case-insensitive substring of the title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    /// Query for `raw`, matched case-insensitively.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// Text as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Append a typed character.
    pub fn push(&mut self, ch: char) {
        self.raw.push(ch);
        self.needle = self.raw.to_lowercase();
    }

    /// Remove the last character, as Backspace does.
    pub fn pop(&mut self) -> Option<char> {
        let popped = self.raw.pop();
        self.needle = self.raw.to_lowercase();
        popped
    }

    /// Drop the whole query.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.needle.clear();
    }

    /// An empty query matches everything, including entities without a title.
    pub fn matches(&self, title: Option<&str>) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        title
            .map(|value| value.to_lowercase().contains(&self.needle))
            .unwrap_or(false)
    }
}

/// Entities passing both predicates, in source order.
pub fn filter_listings<'a, T>(
    items: &'a [T],
    category: &CategoryFilter,
    query: &SearchQuery,
) -> Vec<&'a T>
where
    T: Listing,
{
    items
        .iter()
        .filter(|item| category.matches(item.category()) && query.matches(item.title()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contest, Hackathon};

    fn contest(name: &str, platform: &str) -> Contest {
        Contest {
            name: Some(name.to_string()),
            platform: Some(platform.to_string()),
            ..Contest::default()
        }
    }

    fn sample() -> Vec<Contest> {
        vec![
            contest("Weekly Contest 380", "LeetCode"),
            contest("Codeforces Round 918 (Div. 2)", "codeforces"),
            contest("Starters 115", "CodeChef"),
            contest("Biweekly Contest 121", "leetcode"),
        ]
    }

    fn names<'a>(items: &[&'a Contest]) -> Vec<&'a str> {
        items.iter().map(|c| c.display_name()).collect()
    }

    #[test]
    fn all_with_empty_query_returns_everything_in_order() {
        let contests = sample();
        let filtered = filter_listings(&contests, &CategoryFilter::All, &SearchQuery::default());
        assert_eq!(filtered.len(), contests.len());
        for (kept, original) in filtered.iter().zip(contests.iter()) {
            assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn category_matches_case_insensitively() {
        let contests = sample();
        let filtered = filter_listings(
            &contests,
            &CategoryFilter::parse("LEETCODE"),
            &SearchQuery::default(),
        );
        assert_eq!(
            names(&filtered),
            vec!["Weekly Contest 380", "Biweekly Contest 121"]
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let contests = sample();
        let filtered = filter_listings(&contests, &CategoryFilter::All, &SearchQuery::new("WEEKLY"));
        assert_eq!(
            names(&filtered),
            vec!["Weekly Contest 380", "Biweekly Contest 121"]
        );
    }

    #[test]
    fn predicates_are_anded() {
        let contests = sample();
        let filtered = filter_listings(
            &contests,
            &CategoryFilter::parse("codechef"),
            &SearchQuery::new("weekly"),
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn missing_fields_never_panic() {
        let contests = vec![Contest::default(), contest("Named", "leetcode")];
        let by_platform = filter_listings(
            &contests,
            &CategoryFilter::parse("leetcode"),
            &SearchQuery::default(),
        );
        assert_eq!(names(&by_platform), vec!["Named"]);

        let by_name = filter_listings(&contests, &CategoryFilter::All, &SearchQuery::new("n"));
        assert_eq!(names(&by_name), vec!["Named"]);

        let everything = filter_listings(&contests, &CategoryFilter::All, &SearchQuery::default());
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn hackathons_search_by_title() {
        let hackathons = vec![
            Hackathon {
                id: Some("1".into()),
                title: Some("AI for Good".into()),
                ..Hackathon::default()
            },
            Hackathon {
                id: Some("2".into()),
                title: Some("Web3 Buildathon".into()),
                ..Hackathon::default()
            },
        ];
        let filtered = filter_listings(&hackathons, &CategoryFilter::All, &SearchQuery::new("ai"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].display_title(), "AI for Good");
    }

    #[test]
    fn all_token_is_sentinel() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("all").token(), "all");
        assert_eq!(CategoryFilter::parse("CodeChef").token(), "codechef");
    }

    #[test]
    fn cycle_walks_options_and_wraps() {
        let options = vec![
            "leetcode".to_string(),
            "codeforces".to_string(),
            "codechef".to_string(),
        ];
        let mut filter = CategoryFilter::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter = filter.cycle(&options);
            seen.push(filter.token().to_string());
        }
        assert_eq!(seen, vec!["leetcode", "codeforces", "codechef", "all"]);
        assert_eq!(
            CategoryFilter::parse("atcoder").cycle(&options),
            CategoryFilter::All
        );
    }

    #[test]
    fn query_editing_tracks_needle() {
        let mut query = SearchQuery::default();
        for ch in "DiV".chars() {
            query.push(ch);
        }
        assert!(query.matches(Some("Round 918 (div. 2)")));
        assert_eq!(query.pop(), Some('V'));
        assert_eq!(query.as_str(), "Di");
        query.clear();
        assert!(query.is_empty());
        assert!(query.matches(None));
    }
}
