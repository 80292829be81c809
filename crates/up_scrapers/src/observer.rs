use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::pipeline::Stage;

/// Everything the pipeline reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    ArticleLoaded { id: u64, title: String },
    ReferencesDiscovered { strategy: String, links: Vec<String> },
    ReferenceScraped { url: String, chars: usize },
    ReferenceFailed { url: String, reason: String },
    Synthesized { model_id: String, chars: usize },
    CitationsAppended { count: usize },
    Published { id: u64, title: String, url: Option<String> },
    Warning(String),
    Failed { stage: Stage, reason: String },
    Finished,
}

pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Writes each event as a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted(stage) => info!("▶️ {}", stage),
            PipelineEvent::ArticleLoaded { id, title } => {
                info!("📰 Loaded article {} \"{}\"", id, title)
            }
            PipelineEvent::ReferencesDiscovered { strategy, links } => {
                info!("🔗 {} reference link(s) from {}", links.len(), strategy)
            }
            PipelineEvent::ReferenceScraped { url, chars } => info!("📖 {} ({} chars)", url, chars),
            PipelineEvent::ReferenceFailed { url, reason } => warn!("⚠️ Skipped {}: {}", url, reason),
            PipelineEvent::Synthesized { model_id, chars } => {
                info!("✨ Enhanced content generated by {} ({} chars)", model_id, chars)
            }
            PipelineEvent::CitationsAppended { count } => info!("📚 Appended {} citation(s)", count),
            PipelineEvent::Published { id, title, url } => {
                info!("📤 Article {} updated: \"{}\"", id, title);
                info!("📝 Enhanced article is now live at: {}", url.as_deref().unwrap_or("N/A"));
            }
            PipelineEvent::Warning(message) => warn!("⚠️ {}", message),
            PipelineEvent::Failed { stage, reason } => error!("❌ {} failed: {}", stage, reason),
            PipelineEvent::Finished => info!("✅ Content upgrade completed"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::StageStarted(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
