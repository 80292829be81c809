use std::sync::Arc;
use tracing::debug;
use up_core::{Article, ArticleStore, ArticleUpdate, Error, Result};

/// Writes the enhanced text back to the article record.
pub struct ResultPublisher {
    store: Arc<dyn ArticleStore>,
}

impl ResultPublisher {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Partial update carrying only `title` and `enhanced_content`. Any
    /// failure is reported as `PublishFailed` and is not retried.
    pub async fn publish(&self, article_id: u64, title: &str, enhanced_content: &str) -> Result<Article> {
        debug!("Updating article (ID: {})", article_id);
        let update = ArticleUpdate::enhancement(title, enhanced_content);
        let updated = self
            .store
            .update_article(article_id, &update)
            .await
            .map_err(|e| Error::PublishFailed(format!("article {}: {}", article_id, e)))?;

        debug!("Article updated: \"{}\" ({})", updated.title, updated.url.as_deref().unwrap_or("N/A"));
        Ok(updated)
    }
}
