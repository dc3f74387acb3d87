use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// What `refresh()` does while a fetch is already in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Ignore the new trigger; the in-flight fetch wins.
    #[default]
    Coalesce,
    /// Cancel the in-flight fetch and start over.
    Supersede,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Quiet interval for `debounced_refresh`
    pub debounce: Duration,
    /// Default limit for `refresh_with_timeout`
    pub deadline: Duration,
    /// Drop the last good items when a fetch fails
    pub clear_on_error: bool,
    /// Keep the last good items when the server returns an empty list
    pub keep_on_empty: bool,
    pub on_busy: BusyPolicy,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            deadline: DEFAULT_DEADLINE,
            clear_on_error: false,
            keep_on_empty: false,
            on_busy: BusyPolicy::Coalesce,
        }
    }
}
