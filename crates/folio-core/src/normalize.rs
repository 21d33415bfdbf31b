// Maps both GitHub shapes onto the one record the gallery works with
use folio_api::{GitHubRepo, PinnedRepo};

use crate::models::{Repository, SourceRepo, UNKNOWN_LANGUAGE};

/// Convert a source repository into a gallery record
///
/// Total over well-typed input: anything GitHub leaves out falls back to a
/// default instead of an error.
pub fn normalize(source: SourceRepo) -> Repository {
    match source {
        SourceRepo::Rest(repo) => rest_to_repo(repo),
        SourceRepo::Pinned(repo) => pinned_to_repo(repo),
    }
}

fn rest_to_repo(gh: GitHubRepo) -> Repository {
    Repository {
        name: gh.name,
        description: gh.description.unwrap_or_default(),
        url: gh.html_url,
        homepage: non_empty(gh.homepage),
        stars: gh.stargazers_count.unwrap_or(0),
        forks: gh.forks_count.unwrap_or(0),
        updated: gh.pushed_at.or(gh.updated_at),
        language: language_or_unknown(gh.language),
        topics: gh.topics.unwrap_or_default(),
        pinned: false,
    }
}

fn pinned_to_repo(gh: PinnedRepo) -> Repository {
    let topics = gh
        .repository_topics
        .map(|t| {
            t.nodes
                .into_iter()
                .filter_map(|node| node.topic.and_then(|topic| topic.name))
                .collect()
        })
        .unwrap_or_default();

    Repository {
        url: gh.url.unwrap_or_default(),
        name: gh.name,
        description: gh.description.unwrap_or_default(),
        homepage: non_empty(gh.homepage_url),
        stars: gh.stargazers.map(|c| c.total_count).unwrap_or(0),
        forks: gh.forks.map(|c| c.total_count).unwrap_or(0),
        updated: gh.pushed_at,
        language: language_or_unknown(gh.primary_language.and_then(|l| l.name)),
        topics,
        pinned: true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn language_or_unknown(language: Option<String>) -> String {
    non_empty(language).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}
