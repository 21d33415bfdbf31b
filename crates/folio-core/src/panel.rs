use std::time::{Duration, Instant};

use tracing::debug;

use crate::filter::{apply_controls, Controls, FilterOptions};
use crate::models::Repository;

/// Delay between the last keystroke in the search box and the re-render
pub const QUERY_DEBOUNCE: Duration = Duration::from_millis(250);

/// Whatever hosts the gallery: a page template, a terminal, a test double
///
/// The panel never looks controls up on its own; the view hands over the
/// current control values and receives option lists and visible records.
pub trait GalleryView {
    /// Fill the language and topic selectors
    fn populate_options(&mut self, options: &FilterOptions);

    /// Current values of every control
    fn controls(&self) -> Controls;

    /// Replace the grid with `repos` (empty means "show the empty state")
    fn show(&mut self, repos: &[Repository]);
}

/// Trailing-edge debounce driven by caller-supplied instants
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Push the deadline back to `now + delay`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending deadline, if any
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

/// Interactive gallery: a fixed record set plus a view and its controls
pub struct Gallery<V> {
    repos: Vec<Repository>,
    options: FilterOptions,
    view: V,
    debounce: Debouncer,
    visible: usize,
}

impl<V: GalleryView> Gallery<V> {
    /// Derive option lists once, fill the view and render the first pass
    pub fn mount(repos: Vec<Repository>, view: V) -> Self {
        Self::mount_with_delay(repos, view, QUERY_DEBOUNCE)
    }

    pub fn mount_with_delay(repos: Vec<Repository>, mut view: V, delay: Duration) -> Self {
        let options = FilterOptions::from_repos(&repos);
        view.populate_options(&options);

        let mut gallery = Self {
            repos,
            options,
            view,
            debounce: Debouncer::new(delay),
            visible: 0,
        };
        gallery.refresh();
        gallery
    }

    /// Filter, sort and render with the view's current controls
    pub fn refresh(&mut self) {
        let controls = self.view.controls();
        let visible = apply_controls(&self.repos, &controls);
        debug!(
            "Rendering {} of {} projects (sort: {})",
            visible.len(),
            self.repos.len(),
            controls.sort
        );
        self.visible = visible.len();
        self.view.show(&visible);
    }

    /// The search text changed; render once typing settles
    pub fn on_query_input(&mut self, now: Instant) {
        self.debounce.schedule(now);
    }

    /// A selector or toggle changed; render right away
    pub fn on_control_change(&mut self) {
        self.debounce.cancel();
        self.refresh();
    }

    /// Drive pending debounced renders; returns true if one happened
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debounce.fire(now) {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.debounce.remaining(now)
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortMode;

    #[derive(Default)]
    struct RecordingView {
        controls: Controls,
        options: Option<FilterOptions>,
        populate_calls: usize,
        renders: Vec<Vec<String>>,
    }

    impl GalleryView for RecordingView {
        fn populate_options(&mut self, options: &FilterOptions) {
            self.populate_calls += 1;
            self.options = Some(options.clone());
        }

        fn controls(&self) -> Controls {
            self.controls.clone()
        }

        fn show(&mut self, repos: &[Repository]) {
            self.renders
                .push(repos.iter().map(|r| r.name.clone()).collect());
        }
    }

    fn repo(name: &str, language: &str, stars: u32) -> Repository {
        Repository {
            name: name.to_string(),
            description: String::new(),
            url: String::new(),
            homepage: None,
            stars,
            forks: 0,
            updated: None,
            language: language.to_string(),
            topics: vec![format!("{}-topic", name)],
            pinned: false,
        }
    }

    fn gallery() -> Gallery<RecordingView> {
        Gallery::mount(
            vec![repo("foo", "Go", 1), repo("bar", "Rust", 5)],
            RecordingView::default(),
        )
    }

    #[test]
    fn test_mount_populates_and_renders() {
        let g = gallery();
        let view = g.view();
        assert_eq!(view.populate_calls, 1);
        assert_eq!(
            view.options.as_ref().unwrap().languages,
            vec!["Go".to_string(), "Rust".to_string()]
        );
        assert_eq!(view.renders, vec![vec!["foo".to_string(), "bar".to_string()]]);
    }

    #[test]
    fn test_query_input_is_debounced() {
        let mut g = gallery();
        let start = Instant::now();

        g.view_mut().controls.query = "fo".to_string();
        g.on_query_input(start);
        g.view_mut().controls.query = "foo".to_string();
        g.on_query_input(start + Duration::from_millis(100));

        // Still inside the window of the second keystroke
        assert!(!g.poll(start + Duration::from_millis(300)));
        assert_eq!(g.view().renders.len(), 1);

        assert!(g.poll(start + Duration::from_millis(350)));
        assert_eq!(g.view().renders.last().unwrap(), &vec!["foo".to_string()]);

        // Fires once
        assert!(!g.poll(start + Duration::from_secs(5)));
        assert_eq!(g.view().renders.len(), 2);
    }

    #[test]
    fn test_discrete_changes_render_immediately() {
        let mut g = gallery();
        g.view_mut().controls.sort = SortMode::Stars;
        g.on_control_change();
        assert_eq!(
            g.view().renders.last().unwrap(),
            &vec!["bar".to_string(), "foo".to_string()]
        );

        g.view_mut().controls.language = Some("Go".to_string());
        g.on_control_change();
        assert_eq!(g.view().renders.last().unwrap(), &vec!["foo".to_string()]);
        assert_eq!(g.visible_count(), 1);

        // Options are derived once, never per filter pass
        assert_eq!(g.view().populate_calls, 1);
    }

    #[test]
    fn test_control_change_flushes_pending_query() {
        let mut g = gallery();
        let start = Instant::now();
        g.view_mut().controls.query = "bar".to_string();
        g.on_query_input(start);
        g.on_control_change();

        assert_eq!(g.view().renders.last().unwrap(), &vec!["bar".to_string()]);
        assert!(!g.poll(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_impossible_filters_show_empty() {
        let mut g = gallery();
        g.view_mut().controls = Controls {
            query: "foo".to_string(),
            language: Some("Rust".to_string()),
            ..Default::default()
        };
        g.on_control_change();
        assert!(g.view().renders.last().unwrap().is_empty());
        assert_eq!(g.repos().len(), 2);
    }

    #[test]
    fn test_debouncer_remaining() {
        let mut d = Debouncer::new(Duration::from_millis(250));
        let now = Instant::now();
        assert_eq!(d.remaining(now), None);
        d.schedule(now);
        assert!(d.is_pending());
        assert_eq!(
            d.remaining(now + Duration::from_millis(100)),
            Some(Duration::from_millis(150))
        );
        assert_eq!(d.remaining(now + Duration::from_secs(1)), Some(Duration::ZERO));
    }
}
