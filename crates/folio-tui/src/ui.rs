// UI rendering logic
use crate::app::Focus;
use crate::{App, InputMode};
use chrono::Utc;
use folio_core::render::{truncate_description, updated_label, MAX_TOPIC_CHIPS};
use folio_core::Origin;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Search input
            Constraint::Length(3), // Selectors
            Constraint::Min(5),    // Cards
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_search_input(frame, app, chunks[1]);
    render_controls(frame, app, chunks[2]);
    render_results_list(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let origin = match app.origin {
        Some(Origin::Network) => Span::styled("live", Style::default().fg(Color::Green)),
        Some(Origin::Cache) => Span::styled("cached", Style::default().fg(Color::Cyan)),
        Some(Origin::StaleCache) => Span::styled("offline (stale cache)", Style::default().fg(Color::Yellow)),
        Some(Origin::Placeholder) => Span::styled("offline", Style::default().fg(Color::Red)),
        None => Span::raw(""),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.username),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Projects  "),
        Span::styled(
            format!("{} of {}", app.results.len(), app.total),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  •  "),
        origin,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default(),
    };

    let input = Paragraph::new(app.search_input.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search (/ to type, ESC to navigate)")
                .border_style(input_style),
        );

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        frame.set_cursor_position((
            area.x + app.search_input.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}

fn render_controls(frame: &mut Frame, app: &App, area: Rect) {
    let label_style = |focus: Focus| {
        if app.focus == focus && app.input_mode == InputMode::Normal {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let value_style = Style::default().fg(Color::Cyan);

    let line = Line::from(vec![
        Span::styled("Language: ", label_style(Focus::Language)),
        Span::styled(app.selected_language().unwrap_or("all"), value_style),
        Span::raw("   "),
        Span::styled("Topic: ", label_style(Focus::Topic)),
        Span::styled(app.selected_topic().unwrap_or("all"), value_style),
        Span::raw("   "),
        Span::styled("Sort: ", label_style(Focus::Sort)),
        Span::styled(app.sort.label(), value_style),
        Span::raw("   "),
        Span::styled("Pinned only: ", label_style(Focus::PinnedOnly)),
        Span::styled(if app.pinned_only { "on" } else { "off" }, value_style),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filters (TAB: next, ←/→: change, x: clear)"),
    );
    frame.render_widget(paragraph, area);
}

fn render_results_list(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.results.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                folio_core::render::EMPTY_STATE,
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Projects (0)"))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Utc::now();
    let selected = app.list_state.selected();

    let items: Vec<ListItem> = app
        .results
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let name_style = if selected == Some(i) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };

            // Line 1: pin + stats + name
            let line1 = Line::from(vec![
                Span::styled(
                    if repo.pinned { "📌" } else { "  " },
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("★{}", format_number(repo.stars)),
                    Style::default().fg(Color::Rgb(255, 215, 0)),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("⑂{}", format_number(repo.forks)),
                    Style::default().fg(Color::Rgb(100, 149, 237)),
                ),
                Span::raw("  "),
                Span::styled(repo.name.as_str(), name_style),
            ]);

            // Line 2: language, update time, topics
            let mut line2_spans = vec![
                Span::raw("     "),
                Span::styled("●", Style::default().fg(Color::Rgb(147, 112, 219))),
                Span::raw(" "),
                Span::styled(
                    repo.language.as_str(),
                    Style::default().fg(Color::Rgb(147, 112, 219)),
                ),
                Span::raw("  •  "),
                Span::styled(
                    format!("updated {}", updated_label(repo, now)),
                    Style::default().fg(Color::Rgb(128, 128, 128)),
                ),
            ];
            if !repo.topics.is_empty() {
                line2_spans.push(Span::raw("  •  "));
                line2_spans.push(Span::styled(
                    topics_label(&repo.topics),
                    Style::default().fg(Color::Green),
                ));
            }

            // Line 3: description
            let description = if repo.description.is_empty() {
                "     No description".to_string()
            } else {
                format!("     {}", truncate_description(&repo.description))
            };
            let line3 = Line::from(Span::styled(
                description,
                Style::default().fg(Color::Rgb(105, 105, 105)),
            ));

            let mut lines = vec![line1, Line::from(line2_spans), line3];

            // Line 4: live demo link, when there is one
            if let Some(homepage) = &repo.homepage {
                lines.push(Line::from(vec![
                    Span::raw("     "),
                    Span::styled("Live demo: ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        homepage.as_str(),
                        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }

            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Projects ({})", app.results.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error_message {
        Span::styled(error.as_str(), Style::default().fg(Color::Red))
    } else {
        match app.input_mode {
            InputMode::Searching => Span::styled(
                "SEARCH MODE | type to filter | ESC/ENTER: back to cards",
                Style::default().fg(Color::Yellow),
            ),
            InputMode::Normal => Span::raw(
                "j/k: navigate | /: search | TAB: next filter | ←/→: change | p: pinned only | x: clear | ENTER: open | q: quit",
            ),
        }
    };

    frame.render_widget(Paragraph::new(Line::from(status)), area);
}

/// Same topic chips as the HTML card, comma separated
fn topics_label(topics: &[String]) -> String {
    topics
        .iter()
        .take(MAX_TOPIC_CHIPS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_number(num: u32) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}k", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}
