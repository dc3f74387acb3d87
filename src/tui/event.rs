use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Waits up to one tick for a key press.
    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Windows reports releases too
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    SwitchPane,
    OpenInBrowser,
    Refresh,
    CancelRefresh,
    TextLarger,
    TextSmaller,
    ToggleAbout,
    None,
}

impl From<KeyEvent> for Action {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Char('n') | KeyCode::PageDown => Action::NextPage,
            KeyCode::Char('p') | KeyCode::PageUp => Action::PrevPage,
            KeyCode::Tab | KeyCode::BackTab => Action::SwitchPane,
            KeyCode::Char('o') | KeyCode::Enter => Action::OpenInBrowser,
            KeyCode::Char('R') | KeyCode::Char('r') => Action::Refresh,
            KeyCode::Esc => Action::CancelRefresh,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::TextLarger,
            KeyCode::Char('-') => Action::TextSmaller,
            KeyCode::Char('?') | KeyCode::Char('i') => Action::ToggleAbout,
            _ => Action::None,
        }
    }
}
