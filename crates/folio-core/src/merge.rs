use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::Repository;

/// Combine pinned and listed repositories into the gallery order
///
/// Pinned records go first so they survive deduplication, then the whole
/// set is ordered by [`gallery_order`].
pub fn merge(pinned: Vec<Repository>, listed: Vec<Repository>, pinned_first: bool) -> Vec<Repository> {
    let mut merged = dedupe(pinned.into_iter().chain(listed));
    merged.sort_by(|a, b| gallery_order(a, b, pinned_first));
    merged
}

/// Keep the first record for every name
pub fn dedupe(repos: impl IntoIterator<Item = Repository>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    repos
        .into_iter()
        .filter(|repo| seen.insert(repo.name.clone()))
        .collect()
}

/// Pinned first (when enabled), then more stars, then most recent push
pub fn gallery_order(a: &Repository, b: &Repository, pinned_first: bool) -> Ordering {
    let pinned = if pinned_first {
        b.pinned.cmp(&a.pinned)
    } else {
        Ordering::Equal
    };

    pinned
        .then_with(|| b.stars.cmp(&a.stars))
        .then_with(|| recency(a, b))
}

/// Most recent first; `None` is older than any timestamp
pub fn recency(a: &Repository, b: &Repository) -> Ordering {
    b.updated.cmp(&a.updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn repo(name: &str, stars: u32, days_ago: Option<i64>) -> Repository {
        Repository {
            name: name.to_string(),
            description: String::new(),
            url: format!("https://github.com/octo/{}", name),
            homepage: None,
            stars,
            forks: 0,
            updated: days_ago.map(|d| Utc::now() - Duration::days(d)),
            language: "Rust".to_string(),
            topics: Vec::new(),
            pinned: false,
        }
    }

    fn pinned(name: &str, stars: u32) -> Repository {
        Repository {
            pinned: true,
            ..repo(name, stars, Some(1))
        }
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_stars_then_recency() {
        let a = repo("a", 10, Some(5));
        let b = repo("b", 10, Some(1));
        let c = repo("c", 5, Some(0));

        for pinned_first in [true, false] {
            let merged = merge(Vec::new(), vec![a.clone(), c.clone(), b.clone()], pinned_first);
            assert_eq!(names(&merged), vec!["b", "a", "c"]);
        }
    }

    #[test]
    fn test_missing_timestamp_sorts_last() {
        let merged = merge(
            Vec::new(),
            vec![repo("never", 3, None), repo("old", 3, Some(900))],
            true,
        );
        assert_eq!(names(&merged), vec!["old", "never"]);
    }

    #[test]
    fn test_pinned_wins_duplicates() {
        let mut listed_twin = repo("folio", 99, Some(0));
        listed_twin.description = "from listing".to_string();
        let mut pinned_twin = pinned("folio", 1);
        pinned_twin.description = "from pinned".to_string();

        let merged = merge(vec![pinned_twin], vec![listed_twin, repo("other", 2, None)], true);

        assert_eq!(merged.len(), 2);
        let folio = merged.iter().find(|r| r.name == "folio").unwrap();
        assert_eq!(folio.description, "from pinned");
        assert!(folio.pinned);
    }

    #[test]
    fn test_pinned_first_toggle() {
        let listed = vec![repo("popular", 500, Some(1))];
        let pins = vec![pinned("pet-project", 2)];

        let merged = merge(pins.clone(), listed.clone(), true);
        assert_eq!(names(&merged), vec!["pet-project", "popular"]);

        let merged = merge(pins, listed, false);
        assert_eq!(names(&merged), vec!["popular", "pet-project"]);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let deduped = dedupe(vec![repo("x", 1, None), repo("y", 1, None), repo("x", 9, None)]);
        assert_eq!(names(&deduped), vec!["x", "y"]);
        assert_eq!(deduped[0].stars, 1);
    }
}
