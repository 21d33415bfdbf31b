// TUI application state - doubles as the gallery's view
use folio_core::{Controls, FilterOptions, GalleryView, Origin, Repository, SortMode};
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating cards
    Searching, // Typing in the search box
}

/// Which control the selector keys act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Language,
    Topic,
    Sort,
    PinnedOnly,
}

impl Focus {
    pub fn next(&self) -> Focus {
        match self {
            Focus::Language => Focus::Topic,
            Focus::Topic => Focus::Sort,
            Focus::Sort => Focus::PinnedOnly,
            Focus::PinnedOnly => Focus::Language,
        }
    }

    pub fn previous(&self) -> Focus {
        match self {
            Focus::Language => Focus::PinnedOnly,
            Focus::Topic => Focus::Language,
            Focus::Sort => Focus::Topic,
            Focus::PinnedOnly => Focus::Sort,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub search_input: String,
    /// Index into `languages`; `None` is "all"
    pub language: Option<usize>,
    /// Index into `topics`; `None` is "all"
    pub topic: Option<usize>,
    pub sort: SortMode,
    pub pinned_only: bool,
    pub languages: Vec<String>,
    pub topics: Vec<String>,
    pub results: Vec<Repository>,
    pub total: usize,
    pub list_state: ListState,
    pub username: String,
    pub origin: Option<Origin>,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(username: impl Into<String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: Focus::Language,
            search_input: String::new(),
            language: None,
            topic: None,
            sort: SortMode::default(),
            pinned_only: false,
            languages: Vec::new(),
            topics: Vec::new(),
            results: Vec::new(),
            total: 0,
            list_state,
            username: username.into(),
            origin: None,
            error_message: None,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn previous_focus(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Step the focused control forward (or back); returns true if it changed
    pub fn cycle_focused(&mut self, forward: bool) -> bool {
        match self.focus {
            Focus::Language => {
                let next = cycle_index(self.language, self.languages.len(), forward);
                let changed = next != self.language;
                self.language = next;
                changed
            }
            Focus::Topic => {
                let next = cycle_index(self.topic, self.topics.len(), forward);
                let changed = next != self.topic;
                self.topic = next;
                changed
            }
            Focus::Sort => {
                self.sort = if forward {
                    self.sort.cycle()
                } else {
                    // Three steps forward is one step back
                    self.sort.cycle().cycle().cycle()
                };
                true
            }
            Focus::PinnedOnly => {
                self.pinned_only = !self.pinned_only;
                true
            }
        }
    }

    /// Reset every control; returns true if anything changed
    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.controls().is_default();
        self.search_input.clear();
        self.language = None;
        self.topic = None;
        self.sort = SortMode::default();
        self.pinned_only = false;
        changed
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.language
            .and_then(|i| self.languages.get(i))
            .map(String::as_str)
    }

    pub fn selected_topic(&self) -> Option<&str> {
        self.topic.and_then(|i| self.topics.get(i)).map(String::as_str)
    }

    pub fn next_result(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.results.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous_result(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.results.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_repository(&self) -> Option<&Repository> {
        self.list_state.selected().and_then(|i| self.results.get(i))
    }
}

/// `None` -> 0 -> 1 -> ... -> len-1 -> `None`, or the reverse
fn cycle_index(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (current, forward) {
        (None, true) => Some(0),
        (Some(i), true) if i + 1 < len => Some(i + 1),
        (Some(_), true) => None,
        (None, false) => Some(len - 1),
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    }
}

impl GalleryView for App {
    fn populate_options(&mut self, options: &FilterOptions) {
        self.languages = options.languages.clone();
        self.topics = options.topics.clone();
        self.language = None;
        self.topic = None;
    }

    fn controls(&self) -> Controls {
        Controls {
            query: self.search_input.clone(),
            language: self.selected_language().map(str::to_string),
            topic: self.selected_topic().map(str::to_string),
            sort: self.sort,
            pinned_only: self.pinned_only,
        }
    }

    fn show(&mut self, repos: &[Repository]) {
        self.results = repos.to_vec();
        self.list_state
            .select(if self.results.is_empty() { None } else { Some(0) });
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new("")
    }
}
