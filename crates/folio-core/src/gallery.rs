// Fetch -> normalize -> merge -> cache pipeline with graceful fallback
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_cache::{SnapshotCache, SnapshotStore};
use tracing::{debug, info, warn};

use crate::exclude::ExcludeList;
use crate::merge::merge;
use crate::models::{Repository, SourceRepo};
use crate::normalize::normalize;
use crate::resolver::resolve_username;
use crate::{Error, Result};

/// Upper bound on pinned repositories merged into the gallery
pub const MAX_PINNED: usize = 6;

/// Where repositories come from
///
/// The GitHub provider is the real implementation; tests swap in mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Owned repositories, most recently updated first
    async fn list_repos(&self, username: &str, per_page: u32) -> Result<Vec<SourceRepo>>;

    /// Pinned repositories, or `None` when the source can't provide them
    async fn pinned_repos(&self, username: &str) -> Result<Option<Vec<SourceRepo>>>;
}

/// Settings recognized at initialization
#[derive(Debug, Clone)]
pub struct GalleryOptions {
    pub profile_url: String,
    pub exclude: Vec<String>,
    pub pinned_first: bool,
    pub per_page: u32,
    /// Skip the fresh-cache shortcut and always hit the network
    pub refresh: bool,
}

impl GalleryOptions {
    pub fn new(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
            exclude: Vec::new(),
            pinned_first: true,
            per_page: 100,
            refresh: false,
        }
    }
}

/// How a load cycle produced its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fresh cache entry, no request made
    Cache,
    /// Fetched and written back to the cache
    Network,
    /// Fetch failed; served the last cached set regardless of age
    StaleCache,
    /// Fetch failed with nothing cached
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub repos: Vec<Repository>,
    pub origin: Origin,
}

/// The projects gallery data pipeline
pub struct ProjectsGallery<P, S> {
    source: P,
    cache: SnapshotCache<S>,
    username: String,
    profile_url: String,
    exclude: ExcludeList,
    pinned_first: bool,
    per_page: u32,
    refresh: bool,
}

impl<P: RepoSource, S: SnapshotStore> ProjectsGallery<P, S> {
    /// Validate the options; an unresolvable profile URL is fatal
    pub fn new(options: GalleryOptions, source: P, cache: SnapshotCache<S>) -> Result<Self> {
        let username = resolve_username(&options.profile_url).ok_or_else(|| {
            Error::ConfigError(format!(
                "Could not resolve a username from profile URL '{}'",
                options.profile_url
            ))
        })?;

        Ok(Self {
            source,
            cache,
            username,
            profile_url: options.profile_url,
            exclude: ExcludeList::new(&options.exclude)?,
            pinned_first: options.pinned_first,
            per_page: options.per_page.max(1),
            refresh: options.refresh,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    pub fn cache(&self) -> &SnapshotCache<S> {
        &self.cache
    }

    pub async fn load(&self) -> Loaded {
        self.load_at(Utc::now()).await
    }

    /// Run one load cycle as of `now`
    ///
    /// Never fails: a fetch error degrades to the cached set (however old)
    /// or to a single placeholder record.
    pub async fn load_at(&self, now: DateTime<Utc>) -> Loaded {
        let previous = self.cache.load::<Repository>();

        if let Some(snapshot) = &previous {
            if !self.refresh && snapshot.is_fresh(now, self.cache.ttl()) {
                info!("Cache hit! Serving {} cached projects", snapshot.data.len());
                return Loaded {
                    repos: snapshot.data.clone(),
                    origin: Origin::Cache,
                };
            }
            debug!("Cached projects are stale or refresh was requested");
        }

        match self.fetch().await {
            Ok(repos) => {
                self.cache.write(&repos, now);
                info!("Fetched and cached {} projects for {}", repos.len(), self.username);
                Loaded {
                    repos,
                    origin: Origin::Network,
                }
            }
            Err(e) => match previous {
                Some(snapshot) => {
                    warn!("Fetching projects failed, using cached copy: {}", e);
                    Loaded {
                        repos: snapshot.data,
                        origin: Origin::StaleCache,
                    }
                }
                None => {
                    warn!("Fetching projects failed and nothing is cached: {}", e);
                    Loaded {
                        repos: vec![Repository::placeholder(&self.profile_url)],
                        origin: Origin::Placeholder,
                    }
                }
            },
        }
    }

    /// Primary listing then pinned listing, normalized and merged
    pub async fn fetch(&self) -> Result<Vec<Repository>> {
        let listed = self
            .source
            .list_repos(&self.username, self.per_page)
            .await?;
        let listed = self.keep(listed);

        let pinned = match self.source.pinned_repos(&self.username).await {
            Ok(Some(pinned)) => {
                let mut pinned = self.keep(pinned);
                pinned.truncate(MAX_PINNED);
                pinned
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!("Pinned repositories unavailable: {}", e);
                Vec::new()
            }
        };

        debug!("{} listed and {} pinned projects", listed.len(), pinned.len());
        Ok(merge(pinned, listed, self.pinned_first))
    }

    fn keep(&self, sources: Vec<SourceRepo>) -> Vec<Repository> {
        sources
            .into_iter()
            .filter(SourceRepo::is_listable)
            .map(normalize)
            .filter(|repo| !self.exclude.is_excluded(&repo.name))
            .collect()
    }
}
