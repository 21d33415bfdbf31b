use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::merge::recency;
use crate::models::Repository;

/// How many leading records "pinned only" keeps
///
/// Membership is approximated by position in the merged order; see the
/// `pinned` flag on [`Repository`] for the exact provenance.
pub const PINNED_ONLY_LIMIT: usize = 10;

/// Sort choices offered by the control panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Keep the merge-time order
    #[default]
    Pinned,
    Stars,
    Updated,
    Az,
}

impl SortMode {
    pub fn all() -> [SortMode; 4] {
        [SortMode::Pinned, SortMode::Stars, SortMode::Updated, SortMode::Az]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Pinned => "pinned",
            SortMode::Stars => "stars",
            SortMode::Updated => "updated",
            SortMode::Az => "az",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Pinned => "Pinned first",
            SortMode::Stars => "Most stars",
            SortMode::Updated => "Recently updated",
            SortMode::Az => "A-Z",
        }
    }

    /// Next mode, wrapping around
    pub fn cycle(&self) -> SortMode {
        match self {
            SortMode::Pinned => SortMode::Stars,
            SortMode::Stars => SortMode::Updated,
            SortMode::Updated => SortMode::Az,
            SortMode::Az => SortMode::Pinned,
        }
    }

    /// Reorder `repos` in place; stable, so ties keep the merge order
    pub fn apply(&self, repos: &mut [Repository]) {
        match self {
            SortMode::Pinned => {}
            SortMode::Stars => repos.sort_by(|a, b| b.stars.cmp(&a.stars)),
            SortMode::Updated => repos.sort_by(recency),
            SortMode::Az => repos.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            }),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pinned" | "" => Ok(SortMode::Pinned),
            "stars" => Ok(SortMode::Stars),
            "updated" => Ok(SortMode::Updated),
            "az" | "a-z" | "name" => Ok(SortMode::Az),
            other => Err(format!(
                "unknown sort mode '{}', expected one of: pinned, stars, updated, az",
                other
            )),
        }
    }
}

/// Current values of every gallery control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub query: String,
    /// `None` means "all languages"
    pub language: Option<String>,
    /// `None` means "all topics"
    pub topic: Option<String>,
    pub sort: SortMode,
    pub pinned_only: bool,
}

impl Controls {
    pub fn is_default(&self) -> bool {
        *self == Controls::default()
    }

    /// Whether a single record passes the query, language and topic filters
    pub fn matches(&self, repo: &Repository) -> bool {
        let query = self.query.trim().to_lowercase();
        if !query.is_empty() && !repo.search_text().contains(&query) {
            return false;
        }

        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            if repo.language.to_lowercase() != language.to_lowercase() {
                return false;
            }
        }

        if let Some(topic) = self.topic.as_deref().filter(|t| !t.is_empty()) {
            if !repo.topics.iter().any(|t| t == topic) {
                return false;
            }
        }

        true
    }
}

/// Filter then sort the full record set for display
///
/// `all` stays untouched; the result is a fresh, reordered copy.
pub fn apply_controls(all: &[Repository], controls: &Controls) -> Vec<Repository> {
    let pool = if controls.pinned_only {
        &all[..all.len().min(PINNED_ONLY_LIMIT)]
    } else {
        all
    };

    let mut visible: Vec<Repository> = pool
        .iter()
        .filter(|repo| controls.matches(repo))
        .cloned()
        .collect();

    controls.sort.apply(&mut visible);
    visible
}

/// Language and topic choices derived from the full record set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub languages: Vec<String>,
    pub topics: Vec<String>,
}

impl FilterOptions {
    pub fn from_repos(repos: &[Repository]) -> Self {
        let languages: BTreeSet<&str> = repos
            .iter()
            .map(|r| r.language.as_str())
            .filter(|l| !l.is_empty())
            .collect();
        let topics: BTreeSet<&str> = repos
            .iter()
            .flat_map(|r| r.topics.iter().map(String::as_str))
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            languages: languages.into_iter().map(str::to_string).collect(),
            topics: topics.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn repo(name: &str, language: &str, topics: &[&str]) -> Repository {
        Repository {
            name: name.to_string(),
            description: String::new(),
            url: format!("https://github.com/octo/{}", name),
            homepage: None,
            stars: 0,
            forks: 0,
            updated: None,
            language: language.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            pinned: false,
        }
    }

    fn sample() -> Vec<Repository> {
        vec![repo("foo", "Go", &["cli"]), repo("bar", "Rust", &["web"])]
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_query_only() {
        let controls = Controls {
            query: "foo".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&sample(), &controls)), vec!["foo"]);
    }

    #[test]
    fn test_language_only_ignores_case() {
        let controls = Controls {
            language: Some("rust".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&sample(), &controls)), vec!["bar"]);
    }

    #[test]
    fn test_language_ignores_non_ascii_case() {
        let repos = vec![repo("rocq", "Ÿorick", &[]), repo("other", "Rust", &[])];
        let controls = Controls {
            language: Some("ÿorick".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&repos, &controls)), vec!["rocq"]);
    }

    #[test]
    fn test_impossible_combination_is_empty() {
        let controls = Controls {
            query: "foo".to_string(),
            language: Some("Rust".to_string()),
            ..Default::default()
        };
        assert!(apply_controls(&sample(), &controls).is_empty());
    }

    #[test]
    fn test_query_hits_description_and_topics() {
        let mut repos = sample();
        repos[1].description = "A tiny HTTP Server".to_string();

        let by_description = Controls {
            query: "http server".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&repos, &by_description)), vec!["bar"]);

        let by_topic = Controls {
            query: "CLI".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&repos, &by_topic)), vec!["foo"]);
    }

    #[test]
    fn test_topic_membership() {
        let controls = Controls {
            topic: Some("web".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&apply_controls(&sample(), &controls)), vec!["bar"]);
    }

    #[test]
    fn test_pinned_only_keeps_first_ten() {
        let repos: Vec<_> = (0..15).map(|i| repo(&format!("r{}", i), "Rust", &[])).collect();
        let controls = Controls {
            pinned_only: true,
            ..Default::default()
        };
        let visible = apply_controls(&repos, &controls);
        assert_eq!(visible.len(), PINNED_ONLY_LIMIT);
        assert_eq!(visible[0].name, "r0");
        assert_eq!(visible[9].name, "r9");
    }

    #[test]
    fn test_sort_modes() {
        let mut a = repo("beta", "Rust", &[]);
        a.stars = 5;
        a.updated = Some(Utc::now() - Duration::days(10));
        let mut b = repo("Alpha", "Rust", &[]);
        b.stars = 1;
        b.updated = Some(Utc::now());
        let mut c = repo("gamma", "Rust", &[]);
        c.stars = 9;
        let all = vec![a, b, c];

        let sorted = |sort| names(&apply_controls(&all, &Controls { sort, ..Default::default() }))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        assert_eq!(sorted(SortMode::Pinned), vec!["beta", "Alpha", "gamma"]);
        assert_eq!(sorted(SortMode::Stars), vec!["gamma", "beta", "Alpha"]);
        assert_eq!(sorted(SortMode::Updated), vec!["Alpha", "beta", "gamma"]);
        assert_eq!(sorted(SortMode::Az), vec!["Alpha", "beta", "gamma"]);

        // The stored set keeps its order
        assert_eq!(names(&all), vec!["beta", "Alpha", "gamma"]);
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("stars".parse::<SortMode>(), Ok(SortMode::Stars));
        assert_eq!("AZ".parse::<SortMode>(), Ok(SortMode::Az));
        assert_eq!("".parse::<SortMode>(), Ok(SortMode::Pinned));
        assert!("forks".parse::<SortMode>().is_err());
        assert_eq!(SortMode::Az.cycle(), SortMode::Pinned);
    }

    #[test]
    fn test_filter_options_are_sorted_and_unique() {
        let mut repos = sample();
        repos.push(repo("baz", "Go", &["cli", "api"]));
        let options = FilterOptions::from_repos(&repos);
        assert_eq!(options.languages, vec!["Go", "Rust"]);
        assert_eq!(options.topics, vec!["api", "cli", "web"]);
    }
}
