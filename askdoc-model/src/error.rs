//! Error types for the `askdoc-model` crate.

use thiserror::Error;

/// Errors that can occur when calling a language model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The HTTP request to the model server failed before a response arrived.
    #[error("Model request error ({model}): {message}")]
    Http {
        /// The model the request was addressed to.
        model: String,
        /// A description of the transport failure.
        message: String,
    },

    /// The model server answered with a non-success status.
    #[error("Model API error ({model}, status {status}): {message}")]
    Api {
        /// The model the request was addressed to.
        model: String,
        /// The HTTP status code returned by the server.
        status: u16,
        /// The error detail extracted from the response body.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// A configuration validation error.
    #[error("Model configuration error: {0}")]
    Config(String),
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
