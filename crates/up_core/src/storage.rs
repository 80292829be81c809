use async_trait::async_trait;
use crate::types::{Article, ArticleUpdate};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// List all articles, newest first
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Get a single article by id
    async fn get_article(&self, id: u64) -> Result<Article>;

    /// Apply a partial update and return the stored record
    async fn update_article(&self, id: u64, update: &ArticleUpdate) -> Result<Article>;
}
