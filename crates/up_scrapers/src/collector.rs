use std::sync::Arc;
use tracing::debug;
use up_core::fallback::FailedAttempt;
use up_core::{Error, PageFetcher, ReferenceArticle, Result, SearchResult};

use crate::extractor;

/// Below this many characters a scraped reference is suspicious but still used.
pub const SHORT_CONTENT_CHARS: usize = 100;

#[derive(Debug)]
pub struct Collected {
    /// In candidate order, failed candidates skipped.
    pub references: Vec<ReferenceArticle>,
    pub failures: Vec<FailedAttempt>,
}

/// Downloads and extracts every discovered candidate, one at a time.
pub struct ReferenceCollector {
    fetcher: Arc<dyn PageFetcher>,
}

impl ReferenceCollector {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    async fn scrape(&self, candidate: &SearchResult) -> Result<ReferenceArticle> {
        let html = self.fetcher.fetch(&candidate.link).await?;
        let content = extractor::extract(&html);
        let length = content.chars().count();
        if length == 0 {
            return Err(Error::Scraping("no text could be extracted".to_string()));
        }
        debug!("Scraped {} characters from {}", length, candidate.link);
        Ok(ReferenceArticle::new(&candidate.link, Some(candidate.title.clone()), &content))
    }

    pub async fn collect(&self, candidates: &[SearchResult]) -> Result<Collected> {
        let mut references = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        for candidate in candidates {
            debug!("Scraping article from: {}", candidate.link);
            match self.scrape(candidate).await {
                Ok(reference) => references.push(reference),
                Err(e) => {
                    debug!("Error scraping {}: {}", candidate.link, e);
                    failures.push(FailedAttempt {
                        label: candidate.link.clone(),
                        error: e,
                    });
                }
            }
        }

        if references.is_empty() {
            let reason = if failures.is_empty() {
                "no candidates to scrape".to_string()
            } else {
                failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            };
            return Err(Error::NoScrapedContent(reason));
        }
        Ok(Collected { references, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use up_core::types::REFERENCE_CONTENT_CAP;

    struct MapFetcher(HashMap<&'static str, Result<String>>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            match self.0.get(url) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(e)) => Err(Error::Network(e.to_string())),
                None => Err(Error::Rejected { status: 404, body: url.to_string() }),
            }
        }
    }

    fn collector(pages: Vec<(&'static str, Result<String>)>) -> ReferenceCollector {
        ReferenceCollector::new(Arc::new(MapFetcher(pages.into_iter().collect())))
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_order() {
        let collector = collector(vec![
            ("https://a.example/blog/a", Ok("<article>First page</article>".to_string())),
            ("https://b.example/blog/b", Err(Error::Network("timed out".to_string()))),
            ("https://c.example/blog/c", Ok("<article>Third page</article>".to_string())),
        ]);
        let candidates = vec![
            SearchResult::new("A", "https://a.example/blog/a"),
            SearchResult::new("B", "https://b.example/blog/b"),
            SearchResult::new("", "https://c.example/blog/c"),
        ];

        let collected = collector.collect(&candidates).await.unwrap();
        assert_eq!(collected.references.len(), 2);
        assert_eq!(collected.references[0].url, "https://a.example/blog/a");
        assert_eq!(collected.references[0].title.as_deref(), Some("A"));
        assert_eq!(collected.references[0].content, "First page");
        assert_eq!(collected.references[1].title, None);
        assert_eq!(collected.failures.len(), 1);
        assert_eq!(collected.failures[0].label, "https://b.example/blog/b");
    }

    #[tokio::test]
    async fn test_content_truncated() {
        let long = "word ".repeat(2000);
        let collector = collector(vec![("https://a.example/blog/a", Ok(format!("<article>{}</article>", long)))]);
        let collected = collector
            .collect(&[SearchResult::new("A", "https://a.example/blog/a")])
            .await
            .unwrap();
        assert_eq!(collected.references[0].content.chars().count(), REFERENCE_CONTENT_CAP);
    }

    #[tokio::test]
    async fn test_empty_extraction_counts_as_failure() {
        let collector = collector(vec![("https://a.example/blog/a", Ok("<html><body></body></html>".to_string()))]);
        let err = collector
            .collect(&[SearchResult::new("A", "https://a.example/blog/a")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoScrapedContent(_)));
    }

    #[tokio::test]
    async fn test_all_failed() {
        let collector = collector(vec![]);
        let err = collector
            .collect(&[SearchResult::new("A", "https://a.example/blog/a")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoScrapedContent(_)));
        assert!(matches!(collector.collect(&[]).await, Err(Error::NoScrapedContent(_))));
    }
}
