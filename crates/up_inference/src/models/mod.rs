use std::sync::Arc;
use tracing::info;
use up_core::{Config, ModelProvider, Result, TextModel};

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Builds the model backend selected in `config`.
pub fn create_model(config: &Config) -> Result<Arc<dyn TextModel>> {
    let model: Arc<dyn TextModel> = match config.model_provider {
        ModelProvider::Gemini => Arc::new(GeminiModel::new(
            config.model_api_key.clone(),
            &config.model_api_url,
            config.model_timeout,
        )?),
        ModelProvider::Dummy => Arc::new(DummyModel::new()),
    };
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let mut config = Config::new("http://localhost:8000/api", "key");
        assert_eq!(create_model(&config).unwrap().name(), "Gemini");

        config.model_provider = ModelProvider::Dummy;
        config.model_api_key = None;
        assert_eq!(create_model(&config).unwrap().name(), "Dummy");

        config.model_provider = ModelProvider::Gemini;
        assert!(create_model(&config).is_err());
    }
}
