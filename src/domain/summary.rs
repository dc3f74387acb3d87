use serde::{Deserialize, Serialize};

/// One record of the latest-summaries feed.
///
/// Unlike [`Headline`](super::Headline) this carries a stable server id and
/// keeps its dates as the server sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSummary {
    pub article_id: String,
    pub title: String,
    pub reference_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub source_name: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
    pub summary: String,
    pub summary_generated_at: String,
    #[serde(default)]
    pub publication_date: Option<String>,
}

impl NewsSummary {
    pub fn keyword_line(&self) -> Option<String> {
        self.keywords
            .as_ref()
            .filter(|k| !k.is_empty())
            .map(|k| k.join(", "))
    }
}
