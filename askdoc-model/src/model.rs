//! The generation trait the pipeline talks to.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation model behind a uniform prompt-in, text-out contract.
///
/// The pipeline assembles the full prompt (retrieved context plus the user
/// question) and passes an optional system instruction separately; the
/// implementation decides how its backend represents the two.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt`, steered by an optional `system`
    /// instruction. Blocks its caller until the backend finishes.
    async fn generate(&self, system: Option<&str>, prompt: &str) -> Result<String>;

    /// The identifier of the underlying model, for logging.
    fn model_name(&self) -> &str;
}
