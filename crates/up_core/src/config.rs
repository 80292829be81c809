use std::fmt;
use std::time::Duration;
use url::Url;
use crate::retry::RetryPolicy;
use crate::{Error, Result};

pub const DEFAULT_MODEL_IDS: [&str; 3] = [
    "models/gemini-1.5-flash",
    "gemini-2.0-flash",
    "models/gemini-2.0-flash",
];
pub const DEFAULT_MODEL_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SEARCH_API_URL: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_FALLBACK_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Dummy,
}

impl std::str::FromStr for ModelProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "" => Ok(Self::Gemini),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Configuration(format!(
                "Unknown model provider '{}'. Available providers: gemini, dummy",
                other
            ))),
        }
    }
}

/// Credentials for the structured search API.
#[derive(Clone, PartialEq)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_base_url: String,
    pub model_api_key: Option<String>,
    pub model_provider: ModelProvider,
    pub model_ids: Vec<String>,
    pub search: Option<SearchCredentials>,
    pub article_id: Option<u64>,
    pub http_timeout: Duration,
    pub model_timeout: Duration,
    pub retry: RetryPolicy,
    pub model_api_url: String,
    pub search_api_url: String,
    pub fallback_search_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            model_api_key: None,
            model_provider: ModelProvider::Gemini,
            model_ids: DEFAULT_MODEL_IDS.iter().map(|s| s.to_string()).collect(),
            search: None,
            article_id: None,
            http_timeout: Duration::from_secs(10),
            model_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            model_api_url: DEFAULT_MODEL_API_URL.to_string(),
            search_api_url: DEFAULT_SEARCH_API_URL.to_string(),
            fallback_search_url: DEFAULT_FALLBACK_SEARCH_URL.to_string(),
        }
    }
}

impl Config {
    pub fn new(api_base_url: impl Into<String>, model_api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            model_api_key: Some(model_api_key.into()),
            ..Self::default()
        }
    }

    /// Pairs up the two halves of the search credentials. Supplying only one
    /// of them is a configuration mistake rather than "search disabled".
    pub fn with_search(mut self, api_key: Option<String>, engine_id: Option<String>) -> Result<Self> {
        let api_key = api_key.filter(|s| !s.trim().is_empty());
        let engine_id = engine_id.filter(|s| !s.trim().is_empty());
        self.search = match (api_key, engine_id) {
            (Some(api_key), Some(engine_id)) => Some(SearchCredentials { api_key, engine_id }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::Configuration(
                    "GOOGLE_SEARCH_ENGINE_ID must be set together with GOOGLE_SEARCH_API_KEY".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::Configuration(
                    "GOOGLE_SEARCH_API_KEY must be set together with GOOGLE_SEARCH_ENGINE_ID".to_string(),
                ))
            }
        };
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Configuration("ARTICLES_API_BASE_URL is not set".to_string()));
        }
        Url::parse(self.api_base_url.trim())
            .map_err(|e| Error::Configuration(format!("ARTICLES_API_BASE_URL is not a valid URL: {}", e)))?;

        if self.model_provider == ModelProvider::Gemini
            && self.model_api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(Error::Configuration("GEMINI_API_KEY is not set".to_string()));
        }

        if self.model_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(Error::Configuration("at least one model identifier is required".to_string()));
        }

        for (name, value) in [
            ("model API", &self.model_api_url),
            ("search API", &self.search_api_url),
            ("fallback search", &self.fallback_search_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Configuration(format!("{} URL '{}' is invalid: {}", name, value, e)))?;
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path joining.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("model_api_key", &self.model_api_key.as_deref().map(mask_secret))
            .field("model_provider", &self.model_provider)
            .field("model_ids", &self.model_ids)
            .field("search", &self.search)
            .field("article_id", &self.article_id)
            .field("http_timeout", &self.http_timeout)
            .field("model_timeout", &self.model_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Keeps the first few characters of a secret so operators can tell keys apart.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::new("http://localhost:8000/api/", "secret-key");
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base(), "http://localhost:8000/api");
        assert_eq!(config.model_ids.len(), 3);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_missing_base_url() {
        let config = Config::new("", "secret-key");
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_model_key() {
        let mut config = Config::new("http://localhost:8000/api", "   ");
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        config.model_provider = ModelProvider::Dummy;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_queue() {
        let mut config = Config::new("http://localhost:8000/api", "key");
        config.model_ids = vec![" ".to_string()];
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_search_credentials_pairing() {
        let base = Config::new("http://localhost:8000/api", "key");
        let config = base.clone().with_search(Some("k".into()), Some("cx".into())).unwrap();
        assert_eq!(config.search.unwrap().engine_id, "cx");

        let config = base.clone().with_search(None, Some("".into())).unwrap();
        assert!(config.search.is_none());

        assert!(base.clone().with_search(Some("k".into()), None).is_err());
        assert!(base.with_search(None, Some("cx".into())).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("http://localhost:8000/api", "AIzaSyVerySecret")
            .with_search(Some("search-secret".into()), Some("cx".into()))
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("VerySecret"));
        assert!(!debug.contains("search-secret"));
        assert!(debug.contains("AIza****"));
    }

    #[test]
    fn test_model_provider_from_str() {
        assert_eq!("Gemini".parse::<ModelProvider>().unwrap(), ModelProvider::Gemini);
        assert_eq!("dummy".parse::<ModelProvider>().unwrap(), ModelProvider::Dummy);
        assert!("ollama".parse::<ModelProvider>().is_err());
    }
}
