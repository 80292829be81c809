use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use up_core::{Error, Result, SearchCredentials, SearchProvider, SearchResult};

/// The Custom Search JSON API never returns more than 10 items per request.
const MAX_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Google Programmable Search (Custom Search JSON API).
pub struct GoogleCustomSearch {
    client: Client,
    credentials: SearchCredentials,
    endpoint: String,
}

impl GoogleCustomSearch {
    pub fn new(credentials: SearchCredentials, endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            credentials,
            endpoint: endpoint.to_string(),
        })
    }
}

impl fmt::Debug for GoogleCustomSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCustomSearch")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Turns the API's error payload into something an operator can act on.
fn explain_api_error(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    let hint = if message.contains("has not been used") || message.contains("is disabled") {
        Some("enable the Custom Search API for the project")
    } else if message.contains("API key not valid") || message.contains("invalid API key") {
        Some("check GOOGLE_SEARCH_API_KEY")
    } else if message.contains("invalid cx") || message.contains("Search Engine ID") {
        Some("check GOOGLE_SEARCH_ENGINE_ID")
    } else {
        None
    };

    match hint {
        Some(hint) => format!("{} ({})", message, hint),
        None => message,
    }
}

#[async_trait]
impl SearchProvider for GoogleCustomSearch {
    fn name(&self) -> &str {
        "google-custom-search"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let num = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        debug!("🔍 Custom Search API query: \"{}\"", query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let explained = explain_api_error(&body);
            warn!("Google Custom Search API error: {}", explained);
            return Err(Error::Rejected { status: status.as_u16(), body: explained });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .items
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .take(limit)
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
