//! The enhancement run: one article, six stages, strictly in order.
//!
//! A stage only starts once its predecessor produced a value, and the store
//! is written exactly once, by the last stage. Any error ends the run in
//! `Failed(stage, reason)` with the article record untouched.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use up_core::{
    Article, ArticleStore, Config, Error, PageFetcher, ReferenceArticle, SearchProvider, TextModel,
};
use up_inference::ModelQueue;
use up_storage::{ArticleSource, ArticleTarget, ResultPublisher};

use crate::citations::append_citations;
use crate::collector::{ReferenceCollector, SHORT_CONTENT_CHARS};
use crate::observer::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::search::{ReferenceDiscovery, MAX_REFERENCES};
use crate::synthesizer::Synthesizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetching,
    Discovering,
    Scraping,
    Synthesizing,
    Citing,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Fetching => "Fetching article",
            Stage::Discovering => "Discovering references",
            Stage::Scraping => "Scraping references",
            Stage::Synthesizing => "Synthesizing content",
            Stage::Citing => "Appending citations",
            Stage::Publishing => "Publishing",
            Stage::Done => "Done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub article: Article,
    pub references: Vec<ReferenceArticle>,
    pub enhanced_content: String,
    pub model_id: String,
}

pub struct Pipeline {
    source: ArticleSource,
    discovery: ReferenceDiscovery,
    collector: ReferenceCollector,
    synthesizer: Synthesizer,
    publisher: ResultPublisher,
    observer: Arc<dyn PipelineObserver>,
}

impl Pipeline {
    pub fn new(
        source: ArticleSource,
        discovery: ReferenceDiscovery,
        collector: ReferenceCollector,
        synthesizer: Synthesizer,
        publisher: ResultPublisher,
    ) -> Self {
        Self {
            source,
            discovery,
            collector,
            synthesizer,
            publisher,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Wires every stage from `config` and the given collaborators.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ArticleStore>,
        model: Arc<dyn TextModel>,
        fetcher: Arc<dyn PageFetcher>,
        primary_search: Option<Arc<dyn SearchProvider>>,
        secondary_search: Arc<dyn SearchProvider>,
    ) -> Self {
        let queue = ModelQueue::new(model, config.model_ids.clone());
        Self::new(
            ArticleSource::new(store.clone()),
            ReferenceDiscovery::new(primary_search, secondary_search),
            ReferenceCollector::new(fetcher.clone()),
            Synthesizer::new(queue, fetcher, config.retry),
            ResultPublisher::new(store),
        )
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
    }

    async fn stage<T, Fut>(&self, stage: Stage, work: Fut) -> Result<T, PipelineError>
    where
        Fut: Future<Output = up_core::Result<T>>,
    {
        self.emit(PipelineEvent::StageStarted(stage));
        work.await.map_err(|source| {
            self.emit(PipelineEvent::Failed {
                stage,
                reason: source.to_string(),
            });
            PipelineError { stage, source }
        })
    }

    pub async fn run(&self, target: ArticleTarget) -> Result<Outcome, PipelineError> {
        let article = self.stage(Stage::Fetching, self.source.fetch(target)).await?;
        self.emit(PipelineEvent::ArticleLoaded {
            id: article.id,
            title: article.title.clone(),
        });

        let discovery = self
            .stage(Stage::Discovering, self.discovery.discover(&article.title))
            .await?;
        self.emit(PipelineEvent::ReferencesDiscovered {
            strategy: discovery.strategy.to_string(),
            links: discovery.results.iter().map(|r| r.link.clone()).collect(),
        });
        if discovery.results.len() < MAX_REFERENCES {
            self.emit(PipelineEvent::Warning(format!(
                "Found only {} article link(s), proceeding with available links",
                discovery.results.len()
            )));
        }

        let collected = self
            .stage(Stage::Scraping, self.collector.collect(&discovery.results))
            .await?;
        for failure in &collected.failures {
            self.emit(PipelineEvent::ReferenceFailed {
                url: failure.label.clone(),
                reason: failure.error.to_string(),
            });
        }
        for reference in &collected.references {
            let chars = reference.content.chars().count();
            self.emit(PipelineEvent::ReferenceScraped {
                url: reference.url.clone(),
                chars,
            });
            if chars < SHORT_CONTENT_CHARS {
                self.emit(PipelineEvent::Warning(format!(
                    "Content from {} seems too short ({} chars)",
                    reference.url, chars
                )));
            }
        }
        let references = collected.references;

        let synthesis = self
            .stage(Stage::Synthesizing, self.synthesizer.synthesize(&article, &references))
            .await?;
        self.emit(PipelineEvent::Synthesized {
            model_id: synthesis.model_id.clone(),
            chars: synthesis.text.chars().count(),
        });

        self.emit(PipelineEvent::StageStarted(Stage::Citing));
        let enhanced_content = append_citations(&synthesis.text, &references);
        self.emit(PipelineEvent::CitationsAppended { count: references.len() });

        let updated = self
            .stage(
                Stage::Publishing,
                self.publisher.publish(article.id, &article.title, &enhanced_content),
            )
            .await?;
        self.emit(PipelineEvent::Published {
            id: updated.id,
            title: updated.title.clone(),
            url: updated.url.clone(),
        });

        self.emit(PipelineEvent::StageStarted(Stage::Done));
        self.emit(PipelineEvent::Finished);
        Ok(Outcome {
            article: updated,
            references,
            enhanced_content,
            model_id: synthesis.model_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Discovering.to_string(), "Discovering references");
        let err = PipelineError {
            stage: Stage::Scraping,
            source: Error::NoScrapedContent("all failed".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Scraping references failed: No reference content could be scraped: all failed"
        );
    }
}
