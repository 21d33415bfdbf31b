// GitHub provider - bridges the API client with the RepoSource trait
use async_trait::async_trait;
use folio_api::GitHubClient;

use crate::{gallery::RepoSource, models::SourceRepo, Result};

/// Wrapper around GitHubClient that implements RepoSource
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(token)?,
        })
    }

    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::with_base_url(token, base_url)?,
        })
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }
}

#[async_trait]
impl RepoSource for GitHubProvider {
    async fn list_repos(&self, username: &str, per_page: u32) -> Result<Vec<SourceRepo>> {
        let repos = self.client.list_user_repos(username, per_page).await?;
        Ok(repos.into_iter().map(SourceRepo::Rest).collect())
    }

    async fn pinned_repos(&self, username: &str) -> Result<Option<Vec<SourceRepo>>> {
        let pinned = self.client.pinned_repos(username).await?;
        Ok(pinned.map(|repos| repos.into_iter().map(SourceRepo::Pinned).collect()))
    }
}
