// Repository sources backed by real APIs
pub mod github;

pub use github::GitHubProvider;
