use ratatui::widgets::ListState;

use crate::config::TextScale;
use crate::domain::{FetchState, Headline};
use crate::orchestrator::RefreshOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Headlines,
    Detail,
}

impl ActivePane {
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Headlines => ActivePane::Detail,
            ActivePane::Detail => ActivePane::Headlines,
        }
    }
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    pub active_pane: ActivePane,
    /// Latest snapshot from the orchestrator
    pub state: FetchState<Headline>,
    pub index: usize,
    pub list_state: ListState,
    pub detail_scroll: u16,
    pub text_scale: TextScale,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub show_about: bool,
}

impl TuiApp {
    pub fn new(text_scale: TextScale) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Headlines,
            state: FetchState::new(),
            index: 0,
            list_state,
            detail_scroll: 0,
            text_scale,
            should_quit: false,
            status_message: None,
            show_about: false,
        }
    }

    pub fn headlines(&self) -> &[Headline] {
        &self.state.items
    }

    pub fn selected(&self) -> Option<&Headline> {
        self.state.items.get(self.index)
    }

    /// Take a new snapshot. Ids are positional, so a new list resets the
    /// selection rather than trying to follow the old record.
    pub fn apply(&mut self, state: FetchState<Headline>) {
        let replaced = !std::sync::Arc::ptr_eq(&self.state.items, &state.items);
        self.state = state;

        if replaced {
            self.index = 0;
            self.detail_scroll = 0;
        } else if self.index >= self.state.items.len() {
            self.index = self.state.items.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.index));
    }

    /// Status text for a finished trigger.
    pub fn on_outcome(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Loaded { count } => {
                self.set_status(format!("Loaded {} headlines", count));
            }
            RefreshOutcome::AlreadyLoading => {
                self.set_status("Already refreshing".to_string());
            }
            // Failures show through the snapshot's error message
            RefreshOutcome::Failed { .. }
            | RefreshOutcome::TimedOut
            | RefreshOutcome::Cancelled
            | RefreshOutcome::Debounced => self.clear_status(),
        }
    }

    fn select(&mut self, index: usize) {
        if index != self.index {
            self.index = index;
            self.list_state.select(Some(index));
            self.detail_scroll = 0;
        }
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Headlines => self.select(self.index.saturating_sub(1)),
            ActivePane::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Headlines => {
                let last = self.state.items.len().saturating_sub(1);
                self.select((self.index + 1).min(last));
            }
            ActivePane::Detail => self.detail_scroll = self.detail_scroll.saturating_add(1),
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Headlines => {
                let last = self.state.items.len().saturating_sub(1);
                self.select((self.index + PAGE_SIZE).min(last));
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SIZE as u16);
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Headlines => self.select(self.index.saturating_sub(PAGE_SIZE)),
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SIZE as u16);
            }
        }
    }

    /// Returns true if the scale changed.
    pub fn scale_up(&mut self) -> bool {
        self.rescale(self.text_scale.step_up())
    }

    pub fn scale_down(&mut self) -> bool {
        self.rescale(self.text_scale.step_down())
    }

    fn rescale(&mut self, scale: TextScale) -> bool {
        if scale == self.text_scale {
            return false;
        }
        self.text_scale = scale;
        self.set_status(format!("Text size {}", scale));
        true
    }

    pub fn toggle_about(&mut self) {
        self.show_about = !self.show_about;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
