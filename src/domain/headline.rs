use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Client-local identity for list rendering.
///
/// Assigned at decode time from the record's position in the response, so it
/// is only meaningful within a single fetch. Never use it to correlate
/// records across refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HeadlineId(pub usize);

impl fmt::Display for HeadlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub id: HeadlineId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub summary_generated_at: Option<DateTime<Utc>>,
    pub source_name: String,
    pub source_url: String,
}

impl Headline {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Best available body text for the detail view
    pub fn display_content(&self) -> &str {
        if !self.summary.trim().is_empty() {
            &self.summary
        } else {
            &self.description
        }
    }
}
