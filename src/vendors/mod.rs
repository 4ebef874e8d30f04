//! Generative model backends.
//!
//! The bot only needs "prompt in, text out", so every backend sits behind
//! [`TextModel`]:
//! - `gemini` - Google Generative Language API (API key)
//! - [`CannedModel`] - offline stand-in that answers in the bear's happy voice

pub mod gemini;

pub use gemini::GeminiClient;

use crate::error::Result;
use crate::lang::{Lang, Localized};
use async_trait::async_trait;

/// A text-completion model
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Model identifier used in logs and metrics
    fn name(&self) -> &str;

    /// Complete `prompt` and return the model's text
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Offline model: replies with a fixed line in the prompt's language
pub struct CannedModel {
    replies: Localized<String>,
}

impl CannedModel {
    pub fn new(replies: Localized<String>) -> Self {
        Self { replies }
    }
}

#[async_trait]
impl TextModel for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.replies.get(Lang::detect(prompt)).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_model_follows_prompt_language() {
        let model = CannedModel::new(Localized::text("好的", "okay"));
        assert_eq!(model.generate("plant a tree").await.unwrap(), "okay");
        assert_eq!(model.generate("种一棵树吧").await.unwrap(), "好的");
        assert_eq!(model.name(), "canned");
    }
}
