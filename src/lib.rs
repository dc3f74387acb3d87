//! # newsum
//!
//! A terminal reader for a news-summary API.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Source (client + decoder) → Orchestrator → CLI / TUI
//! ```
//!
//! - [`fetcher`]: HTTP GET with cancellation and status checking
//! - [`decoder`]: JSON payloads into domain records
//! - [`orchestrator`]: fetch state machine with debounce, timeout and
//!   cancellation
//! - [`tui`]: list/detail view built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # List current headlines
//! newsum headlines
//!
//! # Read one in full
//! newsum show 0
//!
//! # Against another server
//! newsum --base-url https://news.example/api tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together config,
/// transport and endpoint, and builds orchestrators.
pub mod app;

/// Command-line interface using clap.
///
/// - `headlines [--json]` - Fetch and list headlines
/// - `show <index>` - Print one headline in full
/// - `latest` - Fetch and list the latest summaries
/// - `prefs text-scale [value]` - Show or set the text size
/// - `tui` - Launch the TUI
pub mod cli;

/// Endpoint-bound sources the orchestrator loads from.
pub mod client;

/// Configuration and stored preferences.
///
/// Loads from `~/.config/newsum/config.toml`, supporting:
/// - API base URL and request timeout
/// - Refresh policy (debounce, deadline, error and empty-list handling)
/// - Custom colors (named or hex)
pub mod config;

/// JSON decoding with lenient ISO-8601 timestamps.
pub mod decoder;

/// Core domain models.
///
/// - [`Headline`](domain::Headline): one summarized news item
/// - [`NewsSummary`](domain::NewsSummary): one latest-summaries record
/// - [`FetchState`](domain::FetchState): what presentation renders
pub mod domain;

/// HTTP transport.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for cancellable GETs
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`Endpoint`](fetcher::Endpoint): validated API base URL
pub mod fetcher;

/// Fetch orchestration.
pub mod orchestrator;

/// Terminal user interface.
///
/// Two-pane layout built with ratatui: headline list and detail.
///
/// Keybindings: j/k navigate, Tab switches pane, o opens in browser,
/// R refreshes, Esc cancels, +/- change text size, q quits.
pub mod tui;
