pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod models;
pub mod retry;
pub mod search;
pub mod storage;
pub mod types;

pub use config::{Config, ModelProvider, SearchCredentials};
pub use error::{Error, Result};
pub use fetch::PageFetcher;
pub use models::TextModel;
pub use retry::RetryPolicy;
pub use search::SearchProvider;
pub use storage::ArticleStore;
pub use types::{Article, ArticleUpdate, ReferenceArticle, SearchResult};
