pub mod citations;
pub mod collector;
pub mod extractor;
pub mod fetcher;
pub mod observer;
pub mod pipeline;
pub mod search;
pub mod synthesizer;

pub use citations::append_citations;
pub use collector::{Collected, ReferenceCollector};
pub use fetcher::HttpFetcher;
pub use observer::{PipelineEvent, PipelineObserver, RecordingObserver, TracingObserver};
pub use pipeline::{Outcome, Pipeline, PipelineError, Stage};
pub use search::{create_search_providers, Discovery, ReferenceDiscovery, SearchStrategy};
pub use synthesizer::{Synthesis, Synthesizer};

pub mod prelude {
    pub use super::{Pipeline, PipelineEvent, PipelineObserver, Stage};
    pub use up_core::{Article, Error, ReferenceArticle, Result, SearchResult};
    pub use up_storage::ArticleTarget;
}
