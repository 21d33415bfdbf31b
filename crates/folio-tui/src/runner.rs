// TUI event loop and terminal management
use crate::{App, InputMode};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use folio_core::{Gallery, Loaded};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

/// Idle wake-up interval when no debounced render is pending
const TICK: Duration = Duration::from_millis(500);

pub fn run_tui(loaded: Loaded, username: &str) -> anyhow::Result<()> {
    let mut gallery = mount(loaded, username);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut gallery);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Host the loaded records in a fresh app
pub fn mount(loaded: Loaded, username: &str) -> Gallery<App> {
    let total = loaded.repos.len();
    let app = App::new(username).with_origin(loaded.origin);
    let mut gallery = Gallery::mount(loaded.repos, app);
    gallery.view_mut().total = total;
    gallery
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    gallery: &mut Gallery<App>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| crate::ui::render(f, gallery.view_mut()))?;

        let timeout = gallery.next_deadline(Instant::now()).unwrap_or(TICK);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(gallery, key, Instant::now());
                }
            }
        }

        if gallery.poll(Instant::now()) {
            debug!("Debounced search applied");
        }

        if gallery.view().should_quit {
            break;
        }
    }

    Ok(())
}

/// Apply one key press to the gallery
pub fn handle_key(gallery: &mut Gallery<App>, key: KeyEvent, now: Instant) {
    gallery.view_mut().error_message = None;

    match gallery.view().input_mode {
        InputMode::Searching => match key.code {
            KeyCode::Char(c) => {
                gallery.view_mut().search_input.push(c);
                gallery.on_query_input(now);
            }
            KeyCode::Backspace => {
                if gallery.view_mut().search_input.pop().is_some() {
                    gallery.on_query_input(now);
                }
            }
            KeyCode::Esc | KeyCode::Enter => {
                gallery.view_mut().enter_normal_mode();
            }
            _ => {}
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => {
                gallery.view_mut().should_quit = true;
            }
            KeyCode::Char('/') => {
                gallery.view_mut().enter_search_mode();
            }
            KeyCode::Tab => {
                gallery.view_mut().next_focus();
            }
            KeyCode::BackTab => {
                gallery.view_mut().previous_focus();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if gallery.view_mut().cycle_focused(true) {
                    gallery.on_control_change();
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if gallery.view_mut().cycle_focused(false) {
                    gallery.on_control_change();
                }
            }
            KeyCode::Char('p') => {
                let app = gallery.view_mut();
                app.pinned_only = !app.pinned_only;
                gallery.on_control_change();
            }
            KeyCode::Char('x') => {
                if gallery.view_mut().clear_filters() {
                    gallery.on_control_change();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                gallery.view_mut().next_result();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                gallery.view_mut().previous_result();
            }
            KeyCode::Enter => {
                if let Some(repo) = gallery.view().selected_repository() {
                    // Open in browser
                    let url = repo.url.clone();
                    if let Err(e) = open::that(&url) {
                        gallery.view_mut().error_message =
                            Some(format!("Failed to open browser: {}", e));
                    }
                }
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use folio_core::{Origin, Repository};

    fn repo(name: &str, language: &str) -> Repository {
        Repository {
            name: name.to_string(),
            description: String::new(),
            url: format!("https://github.com/octo/{}", name),
            homepage: None,
            stars: 0,
            forks: 0,
            updated: None,
            language: language.to_string(),
            topics: Vec::new(),
            pinned: false,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn gallery() -> Gallery<App> {
        mount(
            Loaded {
                repos: vec![repo("alpha", "Go"), repo("beta", "Rust")],
                origin: Origin::Network,
            },
            "octo",
        )
    }

    #[test]
    fn test_mount_records_total_and_origin() {
        let g = gallery();
        assert_eq!(g.view().total, 2);
        assert_eq!(g.view().origin, Some(Origin::Network));
        assert_eq!(g.view().username, "octo");
    }

    #[test]
    fn test_typing_is_debounced() {
        let mut g = gallery();
        let start = Instant::now();

        handle_key(&mut g, press(KeyCode::Char('/')), start);
        assert_eq!(g.view().input_mode, InputMode::Searching);
        handle_key(&mut g, press(KeyCode::Char('b')), start);
        handle_key(&mut g, press(KeyCode::Char('e')), start + Duration::from_millis(100));

        // Nothing re-rendered while typing
        assert_eq!(g.view().results.len(), 2);
        assert!(!g.poll(start + Duration::from_millis(200)));

        assert!(g.poll(start + Duration::from_millis(400)));
        assert_eq!(g.view().results.len(), 1);
        assert_eq!(g.view().results[0].name, "beta");
    }

    #[test]
    fn test_selector_changes_render_immediately() {
        let mut g = gallery();
        let now = Instant::now();

        handle_key(&mut g, press(KeyCode::Right), now);
        assert_eq!(g.view().results.len(), 1);
        assert_eq!(g.view().results[0].language, "Go");

        handle_key(&mut g, press(KeyCode::Char('x')), now);
        assert_eq!(g.view().results.len(), 2);

        handle_key(&mut g, press(KeyCode::Char('p')), now);
        assert!(g.view().pinned_only);
        assert_eq!(g.view().results.len(), 2);
    }

    #[test]
    fn test_quit() {
        let mut g = gallery();
        handle_key(&mut g, press(KeyCode::Char('q')), Instant::now());
        assert!(g.view().should_quit);
    }
}
