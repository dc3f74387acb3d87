use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsumError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Unexpected HTTP status {status}")]
    InvalidResponse { status: u16, body: Option<String> },

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for NewsumError {
    fn from(e: url::ParseError) -> Self {
        NewsumError::InvalidEndpoint(e.to_string())
    }
}

impl From<crate::config::ConfigError> for NewsumError {
    fn from(e: crate::config::ConfigError) -> Self {
        NewsumError::Config(e.to_string())
    }
}

impl NewsumError {
    /// Cancellation is never surfaced to the user as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, NewsumError::Cancelled)
    }

    /// Message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            NewsumError::InvalidEndpoint(_) => "Internal error: Invalid API endpoint URL.".into(),
            NewsumError::Transport(e) if e.is_timeout() => {
                "The request timed out. Please try again.".into()
            }
            NewsumError::Transport(e) if e.is_connect() => {
                "Could not reach the server. Please try again later.".into()
            }
            NewsumError::Transport(e) => format!("A network error occurred: {}", e),
            NewsumError::Cancelled => "Request cancelled.".into(),
            NewsumError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again later.".into()
            }
            NewsumError::Decoding(_) => "Failed to process data from the server.".into(),
            NewsumError::TimedOut(_) => "The request timed out. Please try again.".into(),
            other => format!("An unexpected error occurred: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsumError>;
