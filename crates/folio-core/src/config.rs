use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gallery::GalleryOptions;

/// Main configuration structure
///
/// Loaded from the config file, then overridden by CLI flags and env vars.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path; a missing file means defaults
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// `<config dir>/folio/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?;
        Ok(config_dir.join("folio").join("config.toml"))
    }

    /// Pipeline options, failing if no profile URL is configured
    pub fn gallery_options(&self, refresh: bool) -> crate::Result<GalleryOptions> {
        let profile_url = self
            .gallery
            .profile_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                crate::Error::ConfigError(
                    "profile_url is required (set it in config.toml or pass --profile-url)".into(),
                )
            })?;

        Ok(GalleryOptions {
            profile_url,
            exclude: self.gallery.exclude.clone(),
            pinned_first: self.gallery.pinned_first,
            per_page: self.gallery.per_page,
            refresh,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Profile whose repositories are shown, e.g. https://github.com/octocat
    pub profile_url: Option<String>,

    /// Name patterns to hide; `*` is a wildcard
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_pinned_first")]
    pub pinned_first: bool,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// GitHub personal access token, only needed for pinned repositories
    pub github_token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_pinned_first() -> bool {
    true
}

fn default_per_page() -> u32 {
    100
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            profile_url: None,
            exclude: Vec::new(),
            pinned_first: default_pinned_first(),
            per_page: default_per_page(),
            github_token: None,
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cached projects are reused without a request for this long
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: i64,

    /// SQLite database holding the cache slot
    pub path: Option<PathBuf>,
}

fn default_cache_ttl() -> i64 {
    folio_cache::DEFAULT_TTL_SECS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            path: None,
        }
    }
}

impl CacheConfig {
    /// Configured time-to-live, rejecting negative or out-of-range values
    pub fn ttl(&self) -> crate::Result<chrono::Duration> {
        if self.ttl_secs < 0 {
            return Err(crate::Error::ConfigError(format!(
                "cache ttl_secs must not be negative (got {})",
                self.ttl_secs
            )));
        }
        chrono::Duration::try_seconds(self.ttl_secs).ok_or_else(|| {
            crate::Error::ConfigError(format!(
                "cache ttl_secs is out of range (got {})",
                self.ttl_secs
            ))
        })
    }

    /// Configured path, else `<cache dir>/folio/cache.db`
    pub fn db_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find cache directory".into()))?;
        Ok(cache_dir.join("folio").join("cache.db"))
    }
}
