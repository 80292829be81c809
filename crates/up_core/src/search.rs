use async_trait::async_trait;
use crate::types::SearchResult;
use crate::Result;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs and strategy labels
    fn name(&self) -> &str;

    /// Returns up to `limit` results in provider ranking order
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}
