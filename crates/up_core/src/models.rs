use std::fmt;
use async_trait::async_trait;
use serde_json::Value;
use crate::Result;

#[async_trait]
pub trait TextModel: Send + Sync + fmt::Debug {
    /// Human readable name of the backing service
    fn name(&self) -> &str;

    /// Sends `prompt` to the model identified by `model_id` and returns the raw,
    /// unnormalised response body.
    async fn generate(&self, model_id: &str, prompt: &str) -> Result<Value>;
}
