pub mod duckduckgo;
pub mod filter;
pub mod google;

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use up_core::fallback::{first_success, FailedAttempt};
use up_core::{Config, Error, Result, SearchProvider, SearchResult};

pub use duckduckgo::DuckDuckGoSearch;
pub use filter::{is_candidate_link, select_references, MAX_REFERENCES};
pub use google::GoogleCustomSearch;

pub const PRIMARY_LIMIT: usize = 10;
pub const SECONDARY_LIMIT: usize = 20;
pub const SIMPLIFIED_LIMIT: usize = 10;

const GENERIC_QUERY_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Primary,
    Secondary,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Primary => write!(f, "primary"),
            Backend::Secondary => write!(f, "secondary"),
        }
    }
}

/// One entry of the discovery plan: which backend to ask, with what, and how
/// many results to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStrategy {
    pub backend: Backend,
    pub query: String,
    pub limit: usize,
}

impl SearchStrategy {
    fn new(backend: Backend, query: impl Into<String>, limit: usize) -> Self {
        Self {
            backend,
            query: query.into(),
            limit,
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} search \"{}\" (limit {})", self.backend, self.query, self.limit)
    }
}

/// First three words longer than three characters.
pub fn simplified_query(topic: &str) -> String {
    topic
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First five words of the topic.
pub fn generic_query(topic: &str) -> String {
    topic
        .split_whitespace()
        .take(GENERIC_QUERY_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The full, ordered fallback chain for `topic`, without duplicates.
pub fn plan_strategies(topic: &str, with_primary: bool) -> Vec<SearchStrategy> {
    let topic = topic.trim();
    let simplified = simplified_query(topic);
    let generic = generic_query(topic);

    let mut candidates = Vec::new();
    if with_primary {
        candidates.push(SearchStrategy::new(Backend::Primary, topic, PRIMARY_LIMIT));
    }
    candidates.push(SearchStrategy::new(Backend::Secondary, topic, SECONDARY_LIMIT));
    if !simplified.is_empty() && simplified != topic {
        candidates.push(SearchStrategy::new(Backend::Secondary, simplified, SIMPLIFIED_LIMIT));
    }
    if !generic.is_empty() && generic != topic {
        if with_primary {
            candidates.push(SearchStrategy::new(Backend::Primary, generic.clone(), PRIMARY_LIMIT));
        }
        candidates.push(SearchStrategy::new(Backend::Secondary, generic, SECONDARY_LIMIT));
    }

    let mut plan: Vec<SearchStrategy> = Vec::with_capacity(candidates.len());
    for strategy in candidates {
        if !plan.contains(&strategy) {
            plan.push(strategy);
        }
    }
    plan
}

/// Structured search (only with a credential pair) and the keyless fallback.
pub fn create_search_providers(
    config: &Config,
) -> Result<(Option<Arc<dyn SearchProvider>>, Arc<dyn SearchProvider>)> {
    let primary: Option<Arc<dyn SearchProvider>> = match &config.search {
        Some(credentials) => Some(Arc::new(GoogleCustomSearch::new(
            credentials.clone(),
            &config.search_api_url,
            config.http_timeout,
        )?)),
        None => None,
    };
    let secondary: Arc<dyn SearchProvider> =
        Arc::new(DuckDuckGoSearch::new(&config.fallback_search_url, config.http_timeout)?);
    info!(
        "🔎 Search providers: {}{}",
        primary.as_ref().map(|p| format!("{} + ", p.name())).unwrap_or_default(),
        secondary.name()
    );
    Ok((primary, secondary))
}

#[derive(Debug)]
pub struct Discovery {
    /// At most [`MAX_REFERENCES`] links, in provider order.
    pub results: Vec<SearchResult>,
    pub strategy: SearchStrategy,
    pub failures: Vec<FailedAttempt>,
}

/// Finds reference links for a topic by walking the strategy plan.
pub struct ReferenceDiscovery {
    primary: Option<Arc<dyn SearchProvider>>,
    secondary: Arc<dyn SearchProvider>,
}

impl ReferenceDiscovery {
    pub fn new(primary: Option<Arc<dyn SearchProvider>>, secondary: Arc<dyn SearchProvider>) -> Self {
        Self { primary, secondary }
    }

    pub fn plan(&self, topic: &str) -> Vec<SearchStrategy> {
        plan_strategies(topic, self.primary.is_some())
    }

    pub async fn discover(&self, topic: &str) -> Result<Discovery> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::NoReferencesFound("article has no title to search for".to_string()));
        }
        info!("🔍 Searching for references on: \"{}\"", topic);
        if self.primary.is_none() {
            debug!("Structured search not configured, using {} only", self.secondary.name());
        }

        let outcome = first_success(self.plan(topic), move |strategy| async move {
            let results = self.run(&strategy).await?;
            Ok::<_, Error>((strategy, results))
        })
        .await;

        match outcome {
            Ok(success) => {
                let (strategy, results) = success.value;
                info!("✅ Found {} relevant article link(s) via {}", results.len(), strategy);
                for (i, result) in results.iter().enumerate() {
                    info!("   {}. {}", i + 1, result.link);
                }
                Ok(Discovery {
                    results,
                    strategy,
                    failures: success.failures,
                })
            }
            Err(exhausted) => {
                if self.primary.is_none() {
                    warn!("⚠️ No usable results. Configure GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID for structured search");
                }
                Err(Error::NoReferencesFound(exhausted.summary()))
            }
        }
    }

    async fn run(&self, strategy: &SearchStrategy) -> Result<Vec<SearchResult>> {
        let provider = match strategy.backend {
            Backend::Primary => self
                .primary
                .as_ref()
                .ok_or_else(|| Error::Search("structured search is not configured".to_string()))?,
            Backend::Secondary => &self.secondary,
        };

        debug!("Trying {} via {}", strategy, provider.name());
        let raw = provider.search(&strategy.query, strategy.limit).await?;
        if raw.is_empty() {
            return Err(Error::Search(format!("{} returned no results", provider.name())));
        }

        let selected = select_references(&raw);
        if selected.is_empty() {
            debug!("All {} results were filtered out. First raw links:", raw.len());
            for (i, result) in raw.iter().take(10).enumerate() {
                debug!("   {}. {}", i + 1, result.link);
            }
            return Err(Error::Search(format!("all {} results were filtered out", raw.len())));
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers each query from a fixed table and records what was asked.
    struct ScriptedSearch {
        name: &'static str,
        answers: Vec<(&'static str, Vec<SearchResult>)>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedSearch {
        fn new(name: &'static str, answers: Vec<(&'static str, Vec<SearchResult>)>) -> Arc<Self> {
            Arc::new(Self {
                name,
                answers,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedSearch {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            Ok(self
                .answers
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, r)| r.clone())
                .unwrap_or_default())
        }
    }

    const TITLE: &str = "How chatbots are changing customer support today";

    #[test]
    fn test_plan_with_primary() {
        let plan = plan_strategies(TITLE, true);
        let labels: Vec<_> = plan.iter().map(|s| (s.backend, s.query.as_str(), s.limit)).collect();
        assert_eq!(
            labels,
            vec![
                (Backend::Primary, TITLE, 10),
                (Backend::Secondary, TITLE, 20),
                (Backend::Secondary, "chatbots changing customer", 10),
                (Backend::Primary, "How chatbots are changing customer", 10),
                (Backend::Secondary, "How chatbots are changing customer", 20),
            ]
        );
    }

    #[test]
    fn test_plan_short_title_deduplicates() {
        let plan = plan_strategies("Rust", false);
        assert_eq!(plan, vec![SearchStrategy::new(Backend::Secondary, "Rust", 20)]);
        assert!(plan_strategies("a b c", false).iter().all(|s| s.query == "a b c"));
    }

    #[tokio::test]
    async fn test_primary_wins_when_it_has_links() {
        let primary = ScriptedSearch::new(
            "primary",
            vec![(TITLE, vec![SearchResult::new("A", "https://a.example/blog/foo")])],
        );
        let secondary = ScriptedSearch::new("secondary", vec![]);
        let discovery = ReferenceDiscovery::new(Some(primary.clone()), secondary.clone());

        let found = discovery.discover(TITLE).await.unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.strategy.backend, Backend::Primary);
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_falls_through_to_simplified_query() {
        let secondary = ScriptedSearch::new(
            "secondary",
            vec![
                (TITLE, vec![SearchResult::new("Video", "https://youtube.com/watch?v=123456789")]),
                (
                    "chatbots changing customer",
                    vec![
                        SearchResult::new("A", "https://a.example/blog/foo"),
                        SearchResult::new("B", "https://b.example/2023/11/bar"),
                        SearchResult::new("C", "https://c.example/news/baz"),
                    ],
                ),
            ],
        );
        let discovery = ReferenceDiscovery::new(None, secondary.clone());

        let found = discovery.discover(TITLE).await.unwrap();
        let links: Vec<_> = found.results.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://a.example/blog/foo", "https://b.example/2023/11/bar"]);
        assert_eq!(found.failures.len(), 1);
        assert_eq!(
            secondary.calls(),
            vec![(TITLE.to_string(), 20), ("chatbots changing customer".to_string(), 10)]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_is_no_references_found() {
        let primary = ScriptedSearch::new("primary", vec![]);
        let secondary = ScriptedSearch::new("secondary", vec![]);
        let discovery = ReferenceDiscovery::new(Some(primary.clone()), secondary.clone());

        let err = discovery.discover(TITLE).await.unwrap_err();
        assert!(matches!(err, Error::NoReferencesFound(_)));
        assert_eq!(primary.calls().len(), 2);
        assert_eq!(secondary.calls().len(), 3);
    }

    #[test]
    fn test_create_search_providers() {
        let config = Config::new("http://localhost:8000/api", "key");
        let (primary, secondary) = create_search_providers(&config).unwrap();
        assert!(primary.is_none());
        assert_eq!(secondary.name(), "duckduckgo");

        let config = config
            .with_search(Some("search-key".to_string()), Some("cx".to_string()))
            .unwrap();
        let (primary, _) = create_search_providers(&config).unwrap();
        assert_eq!(primary.map(|p| p.name().to_string()), Some("google-custom-search".to_string()));
    }

    #[tokio::test]
    async fn test_empty_topic() {
        let discovery = ReferenceDiscovery::new(None, ScriptedSearch::new("secondary", vec![]));
        assert!(matches!(discovery.discover("   ").await, Err(Error::NoReferencesFound(_))));
    }
}
