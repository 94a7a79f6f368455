//! Ollama client using the local `/api/generate` endpoint.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::model::LanguageModel;
use async_trait::async_trait;

/// The default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Configuration for an [`OllamaClient`].
///
/// Defaults mirror a conservative QA setup: temperature 0, a 2048-token
/// context window, and a short keep-alive so the model is unloaded between
/// idle sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model name as known to Ollama (e.g. `llama3.2:1b`).
    pub model: String,
    /// Sampling temperature. Zero for reproducible answers.
    pub temperature: f32,
    /// Maximum number of tokens to generate (`num_predict`).
    pub max_tokens: u32,
    /// Context window size in tokens (`num_ctx`).
    pub context_window: u32,
    /// How long the server keeps the model loaded after the call.
    pub keep_alive: String,
}

impl OllamaConfig {
    /// Create a configuration for the given model with default parameters.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: 2000,
            context_window: 2048,
            keep_alive: "1m".to_string(),
        }
    }

    /// Point the client at a non-default server address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the context window size in tokens.
    pub fn with_context_window(mut self, context_window: u32) -> Self {
        self.context_window = context_window;
        self
    }

    /// Set the keep-alive duration string (e.g. `"1m"`, `"5m"`, `"0"`).
    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = keep_alive.into();
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    keep_alive: &'a str,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    num_ctx: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// A [`LanguageModel`] backed by a local Ollama server.
///
/// Calls `POST /api/generate` with `stream: false` and returns the completed
/// response text in one piece.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_model::{OllamaClient, OllamaConfig};
///
/// let client = OllamaClient::new(OllamaConfig::new("llama3.2:1b"))?;
/// let text = client.generate(None, "Say hello.").await?;
/// ```
#[derive(Debug)]
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the model name or base URL is empty.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.model.is_empty() {
            return Err(ModelError::Config("model name must not be empty".into()));
        }
        if config.base_url.is_empty() {
            return Err(ModelError::Config("base URL must not be empty".into()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    /// Return the active configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "generating completion"
        );

        let request_body = GenerateRequest {
            model: &self.config.model,
            prompt,
            system,
            stream: false,
            keep_alive: &self.config.keep_alive,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
                num_ctx: self.config.context_window,
            },
        };

        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let response =
            self.client.post(&url).json(&request_body).send().await.map_err(|e| {
                error!(model = %self.config.model, error = %e, "generate request failed");
                ModelError::Http { model: self.config.model.clone(), message: e.to_string() }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(model = %self.config.model, %status, "Ollama API error");
            return Err(ModelError::Api {
                model: self.config.model.clone(),
                status: status.as_u16(),
                message: detail,
            });
        }

        let generate_response: GenerateResponse = response.json().await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "failed to parse response");
            ModelError::InvalidResponse(e.to_string())
        })?;

        Ok(generate_response.response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_model_options() {
        let request = GenerateRequest {
            model: "llama3.2:1b",
            prompt: "What is the refund window?",
            system: Some("Answer from context only."),
            stream: false,
            keep_alive: "1m",
            options: GenerateOptions { temperature: 0.0, num_predict: 2000, num_ctx: 2048 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:1b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["system"], "Answer from context only.");
        assert_eq!(json["options"]["num_predict"], 2000);
        assert_eq!(json["options"]["num_ctx"], 2048);
    }

    #[test]
    fn system_field_omitted_when_absent() {
        let request = GenerateRequest {
            model: "llama3.2:1b",
            prompt: "hello",
            system: None,
            stream: false,
            keep_alive: "1m",
            options: GenerateOptions { temperature: 0.0, num_predict: 16, num_ctx: 512 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn empty_model_name_rejected() {
        let err = OllamaClient::new(OllamaConfig::new("")).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }
}
