use std::sync::Arc;
use tracing::{info, warn};
use up_core::retry::with_retry;
use up_core::{Article, Error, PageFetcher, ReferenceArticle, Result, RetryPolicy};
use up_inference::{build_enhancement_prompt, ModelQueue};

use crate::extractor;

/// The original article must offer at least this much text to rewrite.
pub const MIN_SOURCE_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub text: String,
    pub model_id: String,
    pub shape: &'static str,
}

/// Rewrites the original article using the references as exemplars.
pub struct Synthesizer {
    queue: ModelQueue,
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
}

impl Synthesizer {
    pub fn new(queue: ModelQueue, fetcher: Arc<dyn PageFetcher>, retry: RetryPolicy) -> Self {
        Self { queue, fetcher, retry }
    }

    /// The excerpt when present, otherwise the text behind the article URL.
    async fn source_text(&self, article: &Article) -> String {
        if let Some(excerpt) = article.excerpt_text() {
            return excerpt.trim().to_string();
        }
        let Some(url) = article.source_url() else {
            return String::new();
        };

        info!("📄 Article has no excerpt, fetching {}", url);
        match with_retry(self.retry, "source article fetch", || self.fetcher.fetch(url)).await {
            Ok(html) => extractor::extract(&html),
            Err(e) => {
                warn!("⚠️ Could not fetch content from article URL: {}", e);
                String::new()
            }
        }
    }

    pub async fn synthesize(&self, article: &Article, references: &[ReferenceArticle]) -> Result<Synthesis> {
        let original = self.source_text(article).await;
        let length = original.chars().count();
        if length < MIN_SOURCE_CHARS {
            return Err(Error::InsufficientSourceContent(length));
        }
        info!("✍️ Using original content ({} chars) for enhancement", length);

        let prompt = build_enhancement_prompt(&article.title, &original, references);
        let generation = self.queue.generate(&prompt).await?;
        let text = generation.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::PipelineFailed(format!("{} returned only whitespace", generation.model_id)));
        }

        Ok(Synthesis {
            text,
            model_id: generation.model_id,
            shape: generation.shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use up_inference::models::DummyModel;

    const BODY: &str = "Chatbots answer routine questions so support teams can focus on hard cases.";

    struct CountingFetcher {
        page: Result<String>,
        calls: AtomicU32,
    }

    impl CountingFetcher {
        fn new(page: Result<String>) -> Arc<Self> {
            Arc::new(Self { page, calls: AtomicU32::new(0) })
        }
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.page {
                Ok(html) => Ok(html.clone()),
                Err(e) => Err(Error::Network(e.to_string())),
            }
        }
    }

    fn article(excerpt: Option<&str>, url: Option<&str>) -> Article {
        Article {
            id: 7,
            title: "Chatbots".to_string(),
            slug: None,
            excerpt: excerpt.map(str::to_string),
            url: url.map(str::to_string),
            enhanced_content: None,
            published_at: None,
        }
    }

    fn synthesizer(model: DummyModel, fetcher: Arc<CountingFetcher>) -> Synthesizer {
        let queue = ModelQueue::new(Arc::new(model), vec!["m1".to_string(), "m2".to_string()]);
        Synthesizer::new(queue, fetcher, RetryPolicy::fixed(2, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_uses_excerpt_without_fetching() {
        let fetcher = CountingFetcher::new(Ok(String::new()));
        let model = DummyModel::with_replies(vec![("m1", Ok(json!({"text": "  Hello world \n"})))]);
        let synthesis = synthesizer(model, fetcher.clone())
            .synthesize(&article(Some(BODY), Some("https://src.example/a")), &[])
            .await
            .unwrap();
        assert_eq!(synthesis.text, "Hello world");
        assert_eq!(synthesis.model_id, "m1");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetches_source_when_excerpt_missing() {
        let fetcher = CountingFetcher::new(Ok(format!("<article>{}</article>", BODY)));
        let synthesis = synthesizer(DummyModel::new(), fetcher.clone())
            .synthesize(&article(Some("   "), Some("https://src.example/a")), &[])
            .await
            .unwrap();
        assert!(synthesis.text.starts_with("## Overview"));
        assert!(synthesis.text.contains("Chatbots answer routine questions"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_source_fetch_is_insufficient_content() {
        let fetcher = CountingFetcher::new(Err(Error::Network("timed out".to_string())));
        let err = synthesizer(DummyModel::new(), fetcher.clone())
            .synthesize(&article(None, Some("https://src.example/a")), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientSourceContent(0)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_short_excerpt_rejected() {
        let fetcher = CountingFetcher::new(Ok(String::new()));
        let err = synthesizer(DummyModel::new(), fetcher)
            .synthesize(&article(Some("too short"), None), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientSourceContent(9)));
    }

    #[tokio::test]
    async fn test_exhausted_models_fail_pipeline() {
        let fetcher = CountingFetcher::new(Ok(String::new()));
        let model = DummyModel::with_replies(vec![("m1", Ok(json!({"unexpected": true})))]);
        let err = synthesizer(model, fetcher)
            .synthesize(&article(Some(BODY), None), &[])
            .await
            .unwrap_err();
        match err {
            Error::PipelineFailed(message) => assert!(message.contains("unexpected")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
