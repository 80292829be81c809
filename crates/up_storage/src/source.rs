use std::fmt;
use std::sync::Arc;
use tracing::debug;
use up_core::{Article, ArticleStore, Error, Result};

/// Which article a run should enhance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleTarget {
    /// Most recently published article.
    Latest,
    Id(u64),
}

impl From<Option<u64>> for ArticleTarget {
    fn from(id: Option<u64>) -> Self {
        id.map_or(ArticleTarget::Latest, ArticleTarget::Id)
    }
}

impl fmt::Display for ArticleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleTarget::Latest => write!(f, "latest article"),
            ArticleTarget::Id(id) => write!(f, "article {}", id),
        }
    }
}

pub struct ArticleSource {
    store: Arc<dyn ArticleStore>,
}

impl ArticleSource {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn fetch(&self, target: ArticleTarget) -> Result<Article> {
        let article = match target {
            ArticleTarget::Id(id) => self.store.get_article(id).await?,
            ArticleTarget::Latest => self
                .store
                .list_articles()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| Error::Storage("No articles found in the API".to_string()))?,
        };
        debug!("Found {}: \"{}\"", target, article.title);
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStorage;
    use chrono::{TimeZone, Utc};

    fn article(id: u64, day: u32) -> Article {
        Article {
            id,
            title: format!("Article {}", id),
            slug: None,
            excerpt: None,
            url: None,
            enhanced_content: None,
            published_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_latest_article() {
        let store = InMemoryStorage::with_articles(vec![article(1, 1), article(2, 9)]);
        let source = ArticleSource::new(Arc::new(store));
        assert_eq!(source.fetch(ArticleTarget::Latest).await.unwrap().id, 2);
        assert_eq!(source.fetch(ArticleTarget::Id(1)).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let source = ArticleSource::new(Arc::new(InMemoryStorage::new()));
        let err = source.fetch(ArticleTarget::Latest).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_target_from_option() {
        assert_eq!(ArticleTarget::from(None), ArticleTarget::Latest);
        assert_eq!(ArticleTarget::from(Some(4)), ArticleTarget::Id(4));
        assert_eq!(ArticleTarget::Id(4).to_string(), "article 4");
    }
}
