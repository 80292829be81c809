use std::collections::HashMap;
use std::fmt;
use serde_json::{json, Value};
use up_core::{Error, Result, TextModel};

/// Offline model. Without scripted replies it answers every identifier with a
/// Gemini-shaped response built from the prompt's original article section.
pub struct DummyModel {
    replies: Option<HashMap<String, std::result::Result<Value, String>>>,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("scripted", &self.replies.is_some())
            .finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self { replies: None }
    }

    /// Canned reply per model identifier; identifiers not listed answer 404.
    pub fn with_replies(replies: Vec<(&str, Result<Value>)>) -> Self {
        let replies = replies
            .into_iter()
            .map(|(id, reply)| (id.to_string(), reply.map_err(|e| e.to_string())))
            .collect();
        Self { replies: Some(replies) }
    }

    fn echo(prompt: &str) -> Value {
        let original = prompt
            .split_once("Content:\n")
            .map(|(_, rest)| rest.split("\n\nREFERENCE ARTICLES").next().unwrap_or(rest))
            .unwrap_or(prompt);
        // Take first 60 words and join them
        let words: Vec<&str> = original.split_whitespace().take(60).collect();
        json!({
            "candidates": [{
                "content": {"parts": [{"text": format!("## Overview\n\n{}", words.join(" "))}]}
            }]
        })
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, model_id: &str, prompt: &str) -> Result<Value> {
        let Some(replies) = &self.replies else {
            return Ok(Self::echo(prompt));
        };
        match replies.get(model_id) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(Error::Inference(message.clone())),
            None => Err(Error::Rejected {
                status: 404,
                body: format!("model {} not found", model_id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ModelResponse;

    #[tokio::test]
    async fn test_dummy_model_echoes_original_section() {
        let model = DummyModel::new();
        let prompt = "Intro\nContent:\nThis is the original article text.\n\nREFERENCE ARTICLES (x):\nother";
        let value = model.generate("anything", prompt).await.unwrap();
        let text = ModelResponse::parse(&value).unwrap().into_text();
        assert_eq!(text, "## Overview\n\nThis is the original article text.");
    }

    #[tokio::test]
    async fn test_scripted_replies() {
        let model = DummyModel::with_replies(vec![
            ("a", Ok(json!({"text": "hi"}))),
            ("b", Err(Error::Network("timed out".to_string()))),
        ]);
        assert_eq!(model.generate("a", "p").await.unwrap(), json!({"text": "hi"}));
        assert!(matches!(model.generate("b", "p").await, Err(Error::Inference(_))));
        assert!(matches!(model.generate("c", "p").await, Err(Error::Rejected { status: 404, .. })));
    }
}
