use thiserror::Error;

/// All the ways the gallery can fail
///
/// Only configuration problems are fatal to callers; fetch failures are
/// recovered inside the pipeline and show up here mostly so they can be
/// logged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("GitHub request failed: {0}")]
    GitHub(#[from] folio_api::GitHubError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Required page element is missing: {0}")]
    MissingElement(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
