use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No references found: {0}")]
    NoReferencesFound(String),

    #[error("No reference content could be scraped: {0}")]
    NoScrapedContent(String),

    #[error("Original article content is too short or missing ({0} chars)")]
    InsufficientSourceContent(usize),

    #[error("Enhancement failed: {0}")]
    PipelineFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),
}

impl Error {
    /// Transport level failures that are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Error::Rejected {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        if err.is_decode() {
            return Error::Scraping(format!("Failed to decode response: {}", err));
        }
        if err.is_builder() {
            return Error::InvalidUrl(err.to_string());
        }
        // Timeouts, refused connections and broken bodies all land here.
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
