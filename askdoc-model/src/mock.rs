//! Mock language model for testing.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{ModelError, Result};
use crate::model::LanguageModel;

/// A deterministic [`LanguageModel`] for tests.
///
/// Returns a fixed response, or fails every call when constructed with
/// [`MockLlm::failing`]. Records the prompts it received so tests can assert
/// on what the pipeline sent.
pub struct MockLlm {
    response: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Create a mock that answers every prompt with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), fail: false, prompts: Mutex::new(Vec::new()) }
    }

    /// Create a mock whose every call fails with [`ModelError::Http`].
    pub fn failing() -> Self {
        Self { response: String::new(), fail: true, prompts: Mutex::new(Vec::new()) }
    }

    /// The prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn generate(&self, _system: Option<&str>, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());
        if self.fail {
            return Err(ModelError::Http {
                model: "mock".to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
