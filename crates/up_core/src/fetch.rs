use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Downloads the raw markup behind `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}
