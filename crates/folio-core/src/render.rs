// HTML card grid for the projects gallery
use chrono::{DateTime, Utc};

use crate::models::Repository;

/// Descriptions longer than this are cut and get an ellipsis
pub const DESCRIPTION_LIMIT: usize = 120;

/// Topic chips shown per card
pub const MAX_TOPIC_CHIPS: usize = 3;

pub const EMPTY_STATE: &str = "No projects match your filters.";

const ELLIPSIS: char = '…';

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Hard cut at [`DESCRIPTION_LIMIT`] characters, ellipsis included
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_LIMIT {
        return description.to_string();
    }
    let mut cut: String = description.chars().take(DESCRIPTION_LIMIT - 1).collect();
    cut.push(ELLIPSIS);
    cut
}

/// Compact "time since" label using the largest unit that is at least 1
///
/// Months are 30 days and years 12 months, so 400 days reads as `1y`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = months / 12;

    if years >= 1 {
        format!("{}y", years)
    } else if months >= 1 {
        format!("{}mo", months)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else if minutes >= 1 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

/// Update label for a record, `"unknown"` when GitHub had no push date
pub fn updated_label(repo: &Repository, now: DateTime<Utc>) -> String {
    repo.updated
        .map(|ts| relative_time(ts, now))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_card(repo: &Repository, now: DateTime<Utc>) -> String {
    let mut html = String::new();

    html.push_str(if repo.pinned {
        "<article class=\"project-card is-pinned\">\n"
    } else {
        "<article class=\"project-card\">\n"
    });

    html.push_str(&format!(
        "  <h3 class=\"project-title\">{}</h3>\n",
        escape_html(&repo.name)
    ));

    if !repo.topics.is_empty() {
        html.push_str("  <ul class=\"project-topics\">");
        for topic in repo.topics.iter().take(MAX_TOPIC_CHIPS) {
            html.push_str(&format!("<li class=\"chip\">{}</li>", escape_html(topic)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(&format!(
        "  <p class=\"project-description\">{}</p>\n",
        escape_html(&truncate_description(&repo.description))
    ));

    html.push_str(&format!(
        "  <div class=\"project-meta\"><span class=\"stars\">★ {}</span><span class=\"forks\">⑂ {}</span><span class=\"updated\">{}</span><span class=\"language\">{}</span></div>\n",
        repo.stars,
        repo.forks,
        escape_html(&updated_label(repo, now)),
        escape_html(&repo.language),
    ));

    html.push_str("  <div class=\"project-links\">");
    html.push_str(&format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Source</a>",
        escape_html(&repo.url)
    ));
    if let Some(homepage) = &repo.homepage {
        html.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Live demo</a>",
            escape_html(homepage)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("</article>\n");
    html
}

/// Grid markup, or the empty-state message when nothing is visible
pub fn render_grid(repos: &[Repository], now: DateTime<Utc>) -> String {
    if repos.is_empty() {
        return format!("<p class=\"projects-empty\">{}</p>\n", EMPTY_STATE);
    }

    let mut html = String::from("<div class=\"projects-grid\">\n");
    for repo in repos {
        html.push_str(&render_card(repo, now));
    }
    html.push_str("</div>\n");
    html
}

/// `<option>` list for a select control, with an "all" entry first
pub fn render_options(all_label: &str, values: &[String], selected: Option<&str>) -> String {
    let mut html = format!("<option value=\"\">{}</option>", escape_html(all_label));
    for value in values {
        let marker = if selected == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(value),
            marker,
            escape_html(value)
        ));
    }
    html
}
