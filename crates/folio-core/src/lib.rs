// Projects gallery core: fetch, normalize, merge, cache, filter and render
pub mod config;
pub mod error;
pub mod exclude;
pub mod filter;
pub mod gallery;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod page;
pub mod panel;
pub mod providers;
pub mod render;
pub mod resolver;

pub use config::Config;
pub use error::Error;
pub use filter::{apply_controls, Controls, FilterOptions, SortMode};
pub use gallery::{GalleryOptions, Loaded, Origin, ProjectsGallery, RepoSource};
pub use models::{Repository, SourceRepo};
pub use page::HtmlPage;
pub use panel::{Gallery, GalleryView};
pub use providers::GitHubProvider;
pub use resolver::resolve_username;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
