pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{AppContext, Result};
use crate::client::HeadlineClient;
use crate::config::Preferences;
use crate::orchestrator::{Orchestrator, RefreshOutcome};

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let orchestrator = ctx.headlines()?;
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &ctx, &orchestrator).await;
    orchestrator.cancel();
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Forwards trigger outcomes to the draw loop.
type Outcomes = mpsc::UnboundedSender<RefreshOutcome>;

fn spawn_initial_load(orchestrator: &Orchestrator<HeadlineClient>, outcomes: &Outcomes) {
    let orchestrator = orchestrator.clone();
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let outcome = orchestrator.refresh_with_deadline().await;
        let _ = outcomes.send(outcome);
    });
}

fn spawn_debounced(orchestrator: &Orchestrator<HeadlineClient>, outcomes: &Outcomes) {
    let handle = orchestrator.debounced_refresh();
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        match handle.await {
            Ok(outcome) => {
                let _ = outcomes.send(outcome);
            }
            Err(e) => tracing::error!(error = %e, "Debounced refresh task failed"),
        }
    });
}

async fn run_app(
    terminal: &mut Tui,
    ctx: &AppContext,
    orchestrator: &Orchestrator<HeadlineClient>,
) -> Result<()> {
    let mut tui_app = TuiApp::new(ctx.load_preferences().text_scale);
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let mut state_rx = orchestrator.subscribe();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    spawn_initial_load(orchestrator, &outcome_tx);

    loop {
        if state_rx.has_changed().unwrap_or(false) {
            let state = state_rx.borrow_and_update().clone();
            tui_app.apply(state);
        }
        while let Ok(outcome) = outcome_rx.try_recv() {
            tracing::debug!(?outcome, "Refresh finished");
            tui_app.on_outcome(outcome);
        }

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &ctx.config.colors))?;

        // Blocking poll; fetches progress on the runtime's worker threads
        let key = match event_handler.next()? {
            AppEvent::Key(key) => key,
            AppEvent::Tick => continue,
        };

        let action = Action::from(key);

        // Any key but quit dismisses the overlay
        if tui_app.show_about && action != Action::Quit {
            tui_app.show_about = false;
            continue;
        }

        match action {
            Action::Quit => {
                tui_app.should_quit = true;
            }
            Action::MoveUp => tui_app.move_up(),
            Action::MoveDown => tui_app.move_down(),
            Action::NextPage => tui_app.next_page(),
            Action::PrevPage => tui_app.prev_page(),
            Action::SwitchPane => {
                tui_app.active_pane = tui_app.active_pane.toggle();
            }
            Action::OpenInBrowser => {
                if let Some(headline) = tui_app.selected() {
                    let url = headline.url.clone();
                    if let Err(e) = open::that(&url) {
                        tracing::warn!(%url, error = %e, "Failed to open browser");
                        tui_app.set_status(format!("Failed to open browser: {}", e));
                    }
                }
            }
            Action::Refresh => {
                tui_app.set_status("Refreshing shortly...".to_string());
                spawn_debounced(orchestrator, &outcome_tx);
            }
            Action::CancelRefresh => {
                if orchestrator.cancel() {
                    tui_app.set_status("Refresh cancelled".to_string());
                }
            }
            Action::TextLarger => {
                if tui_app.scale_up() {
                    persist_scale(ctx, &mut tui_app);
                }
            }
            Action::TextSmaller => {
                if tui_app.scale_down() {
                    persist_scale(ctx, &mut tui_app);
                }
            }
            Action::ToggleAbout => tui_app.toggle_about(),
            Action::None => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn persist_scale(ctx: &AppContext, tui_app: &mut TuiApp) {
    let prefs = Preferences {
        text_scale: tui_app.text_scale,
    };
    if let Err(e) = ctx.save_preferences(&prefs) {
        tracing::warn!(error = %e, "Failed to save preferences");
        tui_app.set_status(format!("Could not save text size: {}", e));
    }
}
