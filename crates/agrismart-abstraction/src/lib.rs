//! Model abstraction layer for AgriSmart.
//!
//! This module defines the core traits and types for talking to a hosted
//! text/multimodal generation endpoint. Agents only ever see `dyn Model`, so
//! tests can swap the real client for a stub without touching global state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when interacting with an AI model.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// An error occurred during the API request (e.g., network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The model returned an error (e.g., invalid input, empty candidate list).
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The model provider is not supported, configured, or refused our credentials.
    #[error("Unsupported Model Provider: {0}")]
    UnsupportedModelProvider(String),

    /// Provider quota exceeded or rate limit hit.
    #[error("Provider '{provider}' quota exceeded{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    QuotaExceeded {
        /// The provider name (e.g., "gemini").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A media payload could not be turned into a request part.
    #[error("Invalid media source '{media_source}': {reason}")]
    InvalidMediaSource {
        /// Short description of the offending source (never the full payload).
        media_source: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Other unexpected errors.
    #[error("Other Model Error: {0}")]
    Other(String),
}

/// One part of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Raw bytes sent inline with the request.
    InlineData {
        /// MIME type of the payload (e.g., "image/jpeg").
        mime_type: String,
        /// Decoded payload bytes.
        data: Vec<u8>,
    },
    /// A remote resource the provider fetches itself.
    FileUri {
        /// MIME type of the remote resource.
        mime_type: String,
        /// Locator of the resource.
        uri: String,
    },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Parameters for controlling the model's generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// What sampling temperature to use, between 0 and 2.
    pub temperature: Option<f32>,

    /// Nucleus sampling probability mass.
    pub top_p: Option<f32>,

    /// The maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sequences where the API will stop generating further tokens.
    pub stop_sequences: Option<Vec<String>>,
}

impl ModelParameters {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.max_tokens.is_none()
            && self.stop_sequences.is_none()
    }
}

/// The response from a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated content.
    pub content: String,

    /// Optional: The ID of the model used to generate the response.
    pub model_id: Option<String>,

    /// Optional: Usage statistics for the request.
    pub usage: Option<ModelUsage>,
}

/// Usage statistics for a model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// A trait for interacting with a generation endpoint.
///
/// All models must be `Send + Sync`: one handle is shared read-only by every
/// agent and every in-flight request.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates text from a single prompt.
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Generates text from an ordered list of parts (text, inline bytes, remote URIs).
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_content(
        &self,
        parts: &[ContentPart],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_display() {
        let err = ModelError::QuotaExceeded {
            provider: "gemini".to_string(),
            message: Some("RESOURCE_EXHAUSTED".to_string()),
        };
        assert_eq!(err.to_string(), "Provider 'gemini' quota exceeded: RESOURCE_EXHAUSTED");

        let err = ModelError::QuotaExceeded { provider: "gemini".to_string(), message: None };
        assert_eq!(err.to_string(), "Provider 'gemini' quota exceeded");
    }

    #[test]
    fn test_invalid_media_source_display() {
        let err = ModelError::InvalidMediaSource {
            media_source: "inline image (12 chars)".to_string(),
            reason: "Invalid symbol 33, offset 4.".to_string(),
        };
        assert!(err.to_string().contains("inline image"));
        assert!(err.to_string().contains("Invalid symbol"));
    }

    #[test]
    fn test_content_part_text_accessor() {
        assert_eq!(ContentPart::text("hello").as_text(), Some("hello"));
        let part = ContentPart::FileUri {
            mime_type: "image/jpeg".to_string(),
            uri: "https://example.com/leaf.jpg".to_string(),
        };
        assert_eq!(part.as_text(), None);
    }

    #[test]
    fn test_model_parameters_is_empty() {
        assert!(ModelParameters::default().is_empty());
        let params = ModelParameters { temperature: Some(0.4), ..Default::default() };
        assert!(!params.is_empty());
    }
}
