use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of characters kept from a scraped reference page.
pub const REFERENCE_CONTENT_CAP: usize = 5000;

/// Article record as served by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub enhanced_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// The excerpt, treating a blank value the same as a missing one.
    pub fn excerpt_text(&self) -> Option<&str> {
        self.excerpt.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Partial update sent back to the persistence service.
///
/// Only the title and the enhanced content can ever be written; the excerpt,
/// url and publish date are owned by the ingestion side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_content: Option<String>,
}

impl ArticleUpdate {
    pub fn enhancement(title: impl Into<String>, enhanced_content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            enhanced_content: Some(enhanced_content.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: None,
        }
    }
}

/// A scraped page used as a style exemplar and cited in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceArticle {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
}

impl ReferenceArticle {
    pub fn new(url: impl Into<String>, title: Option<String>, content: &str) -> Self {
        Self {
            url: url.into(),
            title: title.filter(|t| !t.trim().is_empty()),
            content: truncate_chars(content, REFERENCE_CONTENT_CAP).to_string(),
        }
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_datetime(&s)))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
