// Static HTML page host for the gallery
use chrono::{DateTime, Datelike, Utc};

use crate::filter::{Controls, FilterOptions, SortMode};
use crate::models::Repository;
use crate::panel::GalleryView;
use crate::render::{escape_html, render_grid, render_options};
use crate::{Error, Result};

/// Built-in page used when no template is supplied
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/index.html");

/// Slot the card grid is rendered into
pub const GRID_SLOT: &str = "{{projects}}";

const LANGUAGE_SLOT: &str = "{{language_options}}";
const TOPIC_SLOT: &str = "{{topic_options}}";
const SORT_SLOT: &str = "{{sort_options}}";
const QUERY_SLOT: &str = "{{query}}";
const PINNED_SLOT: &str = "{{pinned_checked}}";
const YEAR_SLOT: &str = "{{year}}";
const TITLE_SLOT: &str = "{{title}}";
const USERNAME_SLOT: &str = "{{username}}";
const PROFILE_SLOT: &str = "{{profile_url}}";

/// A page template with the gallery mounted into its slots
///
/// The template must contain the grid slot; the control slots are filled
/// when present and skipped otherwise.
pub struct HtmlPage {
    template: String,
    controls: Controls,
    options: FilterOptions,
    grid: String,
    username: String,
    profile_url: String,
    now: DateTime<Utc>,
}

impl HtmlPage {
    pub fn mount(template: impl Into<String>, controls: Controls) -> Result<Self> {
        let template = template.into();
        if !template.contains(GRID_SLOT) {
            return Err(Error::MissingElement(format!(
                "page template has no {} slot for the projects grid",
                GRID_SLOT
            )));
        }

        Ok(Self::from_checked(template, controls))
    }

    pub fn with_default_template(controls: Controls) -> Self {
        Self::from_checked(DEFAULT_TEMPLATE.to_string(), controls)
    }

    fn from_checked(template: String, controls: Controls) -> Self {
        Self {
            template,
            controls,
            options: FilterOptions::default(),
            grid: String::new(),
            username: String::new(),
            profile_url: String::new(),
            now: Utc::now(),
        }
    }

    /// Owner details shown in the page chrome
    pub fn with_profile(mut self, username: &str, profile_url: &str) -> Self {
        self.username = username.to_string();
        self.profile_url = profile_url.to_string();
        self
    }

    /// Clock used for relative update times and the footer year
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// The finished page
    pub fn to_html(&self) -> String {
        let sort_options: String = SortMode::all()
            .iter()
            .map(|mode| {
                let selected = if *mode == self.controls.sort { " selected" } else { "" };
                format!(
                    "<option value=\"{}\"{}>{}</option>",
                    mode.as_str(),
                    selected,
                    mode.label()
                )
            })
            .collect();

        let title = if self.username.is_empty() {
            "Projects".to_string()
        } else {
            format!("{} - Projects", self.username)
        };

        let language_options = render_options(
            "All languages",
            &self.options.languages,
            self.controls.language.as_deref(),
        );
        let topic_options = render_options(
            "All topics",
            &self.options.topics,
            self.controls.topic.as_deref(),
        );
        let year = self.now.year().to_string();
        let title = escape_html(&title);
        let username = escape_html(&self.username);
        let profile_url = escape_html(&self.profile_url);
        let query = escape_html(&self.controls.query);

        fill_slots(
            &self.template,
            &[
                (TITLE_SLOT, title.as_str()),
                (USERNAME_SLOT, username.as_str()),
                (PROFILE_SLOT, profile_url.as_str()),
                (QUERY_SLOT, query.as_str()),
                (LANGUAGE_SLOT, language_options.as_str()),
                (TOPIC_SLOT, topic_options.as_str()),
                (SORT_SLOT, sort_options.as_str()),
                (
                    PINNED_SLOT,
                    if self.controls.pinned_only { " checked" } else { "" },
                ),
                (YEAR_SLOT, year.as_str()),
                (GRID_SLOT, self.grid.as_str()),
            ],
        )
    }
}

/// Substitute every known slot in one left-to-right pass
///
/// Inserted values are never scanned again, so text that happens to look
/// like a slot stays literal. Unknown slots are kept as written.
fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match slots.iter().find(|(slot, _)| candidate.starts_with(slot)) {
            Some((slot, value)) => {
                out.push_str(value);
                rest = &candidate[slot.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

impl GalleryView for HtmlPage {
    fn populate_options(&mut self, options: &FilterOptions) {
        self.options = options.clone();
    }

    fn controls(&self) -> Controls {
        self.controls.clone()
    }

    fn show(&mut self, repos: &[Repository]) {
        self.grid = render_grid(repos, self.now);
    }
}
