use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use up_core::fallback::{first_success, FailedAttempt};
use up_core::{Error, Result, TextModel};
use crate::response::{describe_shape, ModelResponse};

/// Text produced by the first model identifier that answered usefully.
#[derive(Debug)]
pub struct Generation {
    pub text: String,
    pub model_id: String,
    pub shape: &'static str,
    pub failures: Vec<FailedAttempt>,
}

/// Model identifiers tried in fixed priority order against one backend.
pub struct ModelQueue {
    model: Arc<dyn TextModel>,
    identifiers: Vec<String>,
}

impl ModelQueue {
    pub fn new(model: Arc<dyn TextModel>, identifiers: Vec<String>) -> Self {
        let identifiers = identifiers
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        Self { model, identifiers }
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    async fn attempt(&self, model_id: &str, prompt: &str) -> Result<(String, &'static str)> {
        info!("🤖 Asking {} model {}...", self.model.name(), model_id);
        let raw = self.model.generate(model_id, prompt).await?;
        match ModelResponse::parse(&raw) {
            Some(parsed) => {
                let shape = parsed.shape();
                Ok((parsed.into_text(), shape))
            }
            None => {
                warn!("⚠️ Unexpected response structure from {}", model_id);
                Err(Error::Inference(format!(
                    "could not extract text from response: {}",
                    describe_shape(&raw)
                )))
            }
        }
    }

    /// Walks the queue until one identifier yields non-empty text.
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let outcome = first_success(self.identifiers.iter(), move |model_id| async move {
            self.attempt(model_id, prompt).await
        })
        .await
        .map_err(|exhausted| Error::PipelineFailed(format!("every model attempt failed: {}", exhausted.summary())))?;

        let (text, shape) = outcome.value;
        info!("✨ {} produced {} chars ({} response)", outcome.label, text.chars().count(), shape);
        Ok(Generation {
            text,
            model_id: outcome.label,
            shape,
            failures: outcome.failures,
        })
    }
}

impl fmt::Debug for ModelQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelQueue")
            .field("model", &self.model.name())
            .field("identifiers", &self.identifiers)
            .finish()
    }
}
