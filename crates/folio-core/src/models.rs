use chrono::{DateTime, Utc};
use folio_api::{GitHubRepo, PinnedRepo};
use serde::{Deserialize, Serialize};

/// Language shown when GitHub has not detected one
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Name of the record shown when nothing could be fetched or cached
pub const PLACEHOLDER_NAME: &str = "profile";

/// Repository record - the only thing the gallery shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    /// Last push; `None` sorts as the oldest
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default = "unknown_language")]
    pub language: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Came from the profile's pinned items
    #[serde(default)]
    pub pinned: bool,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

impl Repository {
    /// Stand-in card so a failed first load never renders an empty gallery
    pub fn placeholder(profile_url: &str) -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            description: "Projects could not be loaded right now. Visit the profile for the full list."
                .to_string(),
            url: profile_url.to_string(),
            homepage: None,
            stars: 0,
            forks: 0,
            updated: None,
            language: unknown_language(),
            topics: Vec::new(),
            pinned: false,
        }
    }

    /// Text the free-text query is matched against
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.topics.join(" ")).to_lowercase()
    }
}

/// A repository in whichever shape GitHub handed it to us
#[derive(Debug, Clone)]
pub enum SourceRepo {
    /// REST `/users/{user}/repos` listing
    Rest(GitHubRepo),
    /// GraphQL `pinnedItems` node
    Pinned(PinnedRepo),
}

impl SourceRepo {
    /// Forks and archived repositories stay out of the gallery
    pub fn is_listable(&self) -> bool {
        match self {
            SourceRepo::Rest(repo) => !repo.fork && !repo.archived,
            SourceRepo::Pinned(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_when_deserializing() {
        let repo: Repository =
            serde_json::from_str(r#"{"name":"folio","url":"https://github.com/octo/folio"}"#)
                .unwrap();
        assert_eq!(repo.language, UNKNOWN_LANGUAGE);
        assert_eq!(repo.stars, 0);
        assert!(repo.topics.is_empty());
        assert!(repo.updated.is_none());
        assert!(!repo.pinned);
    }

    #[test]
    fn test_placeholder() {
        let repo = Repository::placeholder("https://github.com/octo");
        assert_eq!(repo.name, "profile");
        assert_eq!(repo.url, "https://github.com/octo");
        assert_eq!(repo.language, "Unknown");
    }

    #[test]
    fn test_search_text_includes_topics() {
        let mut repo = Repository::placeholder("https://github.com/octo");
        repo.topics = vec!["CLI".to_string()];
        assert!(repo.search_text().contains("cli"));
    }
}
