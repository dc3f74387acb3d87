pub mod date;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::app::{NewsumError, Result};
use crate::domain::{Headline, HeadlineId, NewsSummary};

/// Headline as it appears on the wire
#[derive(Debug, Deserialize)]
struct WireHeadline {
    title: String,
    description: String,
    url: String,
    #[serde(default)]
    image_url: Option<String>,
    summary: String,
    #[serde(deserialize_with = "date::deserialize_required")]
    published_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "date::deserialize_lenient")]
    summary_generated_at: Option<DateTime<Utc>>,
    source_name: String,
    source_url: String,
}

impl WireHeadline {
    fn into_headline(self, id: HeadlineId) -> Headline {
        Headline {
            id,
            title: self.title,
            description: self.description,
            url: self.url,
            image_url: self.image_url,
            summary: self.summary,
            published_at: self.published_at,
            summary_generated_at: self.summary_generated_at,
            source_name: self.source_name,
            source_url: self.source_url,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode_headlines(&self, body: &[u8]) -> Result<Vec<Headline>> {
        let wire: Vec<WireHeadline> = decode_array(body)?;

        Ok(wire
            .into_iter()
            .enumerate()
            .map(|(index, w)| w.into_headline(HeadlineId(index)))
            .collect())
    }

    pub fn decode_summaries(&self, body: &[u8]) -> Result<Vec<NewsSummary>> {
        decode_array(body)
    }
}

/// Decode a top-level JSON array, reporting the path of the first violation.
fn decode_array<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let items: Vec<T> = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        let detail = format!("{}: {}", e.path(), e.inner());
        tracing::error!(%detail, "Payload does not match the expected shape");
        NewsumError::Decoding(detail)
    })?;

    deserializer.end().map_err(|e| {
        tracing::error!(error = %e, "Trailing data after payload");
        NewsumError::Decoding(e.to_string())
    })?;

    Ok(items)
}
