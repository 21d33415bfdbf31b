// API client for GitHub's REST and GraphQL endpoints
pub mod github;

pub use github::{GitHubClient, GitHubError, GitHubRepo, PinnedRepo};
