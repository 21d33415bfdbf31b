use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Maximum number of pinned items GitHub lets a profile show
pub const PINNED_LIMIT: u32 = 6;

const PINNED_QUERY: &str = r#"
query($login: String!, $first: Int!) {
  user(login: $login) {
    pinnedItems(first: $first, types: REPOSITORY) {
      nodes {
        ... on Repository {
          name
          description
          url
          homepageUrl
          pushedAt
          stargazers { totalCount }
          forks { totalCount }
          primaryLanguage { name }
          repositoryTopics(first: 10) { nodes { topic { name } } }
        }
      }
    }
  }
}
"#;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise or a local stand-in server
    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("folio/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether pinned repositories can be requested at all
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn user_repos_url(&self, username: &str) -> String {
        format!("{}/users/{}/repos", self.base_url, username)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// List repositories owned by `username`, most recently updated first
    pub async fn list_user_repos(&self, username: &str, per_page: u32) -> Result<Vec<GitHubRepo>> {
        let url = self.user_repos_url(username);
        let request = self.client.get(&url).query(&[
            ("per_page", per_page.to_string().as_str()),
            ("type", "owner"),
            ("sort", "updated"),
        ]);

        let response = self.authorize(request).send().await?;

        if response.status() == 404 {
            return Err(GitHubError::NotFound(username.to_string()));
        }

        if response.status() == 401 {
            return Err(GitHubError::AuthRequired);
        }

        if response.status() == 403 || response.status() == 429 {
            let exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "0")
                .unwrap_or(response.status() == 429);
            if exhausted {
                return Err(GitHubError::RateLimitExceeded);
            }
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let repos: Vec<GitHubRepo> = serde_json::from_str(&body)?;
        debug!("Fetched {} repositories for {}", repos.len(), username);
        Ok(repos)
    }

    /// Fetch the profile's pinned repositories through GraphQL
    ///
    /// Returns `Ok(None)` without touching the network when no token is
    /// configured, since the GraphQL API rejects anonymous requests.
    pub async fn pinned_repos(&self, username: &str) -> Result<Option<Vec<PinnedRepo>>> {
        let Some(token) = &self.token else {
            debug!("No token configured, skipping pinned repositories");
            return Ok(None);
        };

        let url = format!("{}/graphql", self.base_url);
        let payload = serde_json::json!({
            "query": PINNED_QUERY,
            "variables": { "login": username, "first": PINNED_LIMIT },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        if response.status() == 401 {
            return Err(GitHubError::AuthRequired);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        parse_pinned_response(&body).map(Some)
    }
}

/// Pull the pinned repository nodes out of a GraphQL response body
pub fn parse_pinned_response(body: &str) -> Result<Vec<PinnedRepo>> {
    let envelope: GraphQlResponse = serde_json::from_str(body)?;

    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(GitHubError::GraphQl(messages.join("; ")));
    }

    let user = envelope
        .data
        .and_then(|d| d.user)
        .ok_or_else(|| GitHubError::GraphQl("user missing from response".to_string()))?;

    // Non-repository pinned items (gists) come back as empty objects
    Ok(user
        .pinned_items
        .nodes
        .into_iter()
        .flatten()
        .filter(|node| !node.name.is_empty())
        .collect())
}

/// Repository as returned by the REST listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub stargazers_count: Option<u32>,
    pub forks_count: Option<u32>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Repository as returned by the pinned-items GraphQL query
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PinnedRepo {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub homepage_url: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub stargazers: Option<CountConnection>,
    pub forks: Option<CountConnection>,
    pub primary_language: Option<NamedNode>,
    pub repository_topics: Option<TopicConnection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CountConnection {
    #[serde(default)]
    pub total_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NamedNode {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicConnection {
    #[serde(default)]
    pub nodes: Vec<TopicNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicNode {
    pub topic: Option<NamedNode>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    user: Option<GraphQlUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlUser {
    pinned_items: PinnedConnection,
}

#[derive(Debug, Deserialize)]
struct PinnedConnection {
    #[serde(default)]
    nodes: Vec<Option<PinnedRepo>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}
