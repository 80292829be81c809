use std::sync::Arc;
use up_core::{ArticleStore, Config, Result};

pub mod backends;
pub mod publisher;
pub mod source;

pub use backends::*;
pub use publisher::ResultPublisher;
pub use source::{ArticleSource, ArticleTarget};

/// Builds the article store described by `config`.
pub fn create_store(config: &Config) -> Result<Arc<dyn ArticleStore>> {
    let store = RestArticleStore::new(config.api_base(), config.http_timeout, config.retry)?;
    Ok(Arc::new(store))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{ArticleSource, ArticleTarget, ResultPublisher};
}
