// Terminal UI implementation using ratatui
// Browse the gallery with the same filter and sort controls as the page

pub mod app;
pub mod runner;
pub mod ui;

pub use app::{App, Focus, InputMode};
pub use runner::run_tui;
