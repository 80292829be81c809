use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use up_core::retry::{with_retry, RetryPolicy};
use up_core::{Article, ArticleStore, ArticleUpdate, Error, Result};

/// `{success, data, message}` wrapper used by every endpoint of the article API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> Result<T> {
        if !self.success {
            let detail = self
                .errors
                .map(|e| e.to_string())
                .or(self.message)
                .unwrap_or_else(|| "success: false".to_string());
            return Err(Error::Storage(format!("{} failed: {}", what, detail)));
        }
        self.data
            .ok_or_else(|| Error::Storage(format!("{} returned no data", what)))
    }
}

/// Client for the article REST resource (`/articles`, `/articles/{id}`).
#[derive(Clone)]
pub struct RestArticleStore {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RestArticleStore {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            retry,
        })
    }

    fn articles_url(&self) -> String {
        format!("{}/articles", self.base_url)
    }

    fn article_url(&self, id: u64) -> String {
        format!("{}/articles/{}", self.base_url, id)
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::Rejected { status: status.as_u16(), body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: &str) -> Result<Envelope<T>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}

impl fmt::Debug for RestArticleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestArticleStore")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl ArticleStore for RestArticleStore {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        let url = self.articles_url();
        info!("📰 Fetching articles from {}", url);
        let url = url.as_str();
        let envelope: Envelope<Vec<Article>> =
            with_retry(self.retry, "article listing", move || self.get_envelope(url)).await?;
        envelope.into_data("article listing")
    }

    async fn get_article(&self, id: u64) -> Result<Article> {
        let url = self.article_url(id);
        info!("📰 Fetching article {} from {}", id, url);
        let url = url.as_str();
        let envelope: Envelope<Article> =
            with_retry(self.retry, "article fetch", move || self.get_envelope(url)).await?;
        envelope.into_data("article fetch")
    }

    async fn update_article(&self, id: u64, update: &ArticleUpdate) -> Result<Article> {
        let url = self.article_url(id);
        debug!("PUT {}", url);
        let response = self
            .client
            .put(&url)
            .header("Accept", "application/json")
            .json(update)
            .send()
            .await?;
        let envelope: Envelope<Article> = Self::read_envelope(response).await?;
        if let Some(message) = &envelope.message {
            debug!("Article API says: {}", message);
        }
        envelope.into_data("article update")
    }
}
