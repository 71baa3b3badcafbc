//! Google Gemini model implementation.
//!
//! This module provides an implementation of the `Model` trait for Google's
//! `generateContent` REST endpoint, covering plain text prompts and
//! multimodal part lists (inline bytes or remote file URIs).

use agrismart_abstraction::{
    ContentPart, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used by every agent.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash-exp";

/// Google Gemini model implementation.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    /// The model ID (e.g., "gemini-2.0-flash-exp").
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// The base URL for the Gemini API.
    base_url: String,
    /// HTTP client for making requests.
    client: Client,
}

impl GeminiModel {
    /// Creates a new `GeminiModel` with an explicit API key.
    ///
    /// # Arguments
    /// * `model_id` - The Gemini model ID to use
    /// * `api_key` - The API key for authentication
    #[must_use]
    pub fn with_api_key(model_id: String, api_key: String) -> Self {
        Self { model_id, api_key, base_url: DEFAULT_BASE_URL.to_string(), client: Client::new() }
    }

    /// Points the client at a different endpoint (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Converts an abstract part into Gemini's wire format.
    fn to_gemini_part(part: &ContentPart) -> GeminiPart {
        match part {
            ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
            ContentPart::InlineData { mime_type, data } => GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                },
            },
            ContentPart::FileUri { mime_type, uri } => GeminiPart::FileData {
                file_data: GeminiFileData { mime_type: mime_type.clone(), file_uri: uri.clone() },
            },
        }
    }

    fn build_request(parts: &[ContentPart], parameters: Option<ModelParameters>) -> GeminiRequest {
        let generation_config = parameters.filter(|p| !p.is_empty()).map(|params| {
            GeminiGenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                max_output_tokens: params.max_tokens,
                stop_sequences: params.stop_sequences,
            }
        });

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: parts.iter().map(Self::to_gemini_part).collect(),
            }],
            generation_config,
        }
    }

    /// Maps a non-success HTTP status to a `ModelError`.
    fn map_error_status(status: StatusCode, error_text: String) -> ModelError {
        match status.as_u16() {
            402 | 429 => ModelError::QuotaExceeded {
                provider: "gemini".to_string(),
                message: Some(error_text),
            },
            401 | 403 => ModelError::UnsupportedModelProvider(format!(
                "Authentication failed ({}): {}",
                status, error_text
            )),
            500..=599 => {
                ModelError::ModelResponseError(format!("Server error ({}): {}", status, error_text))
            }
            _ => ModelError::ModelResponseError(format!("API error ({}): {}", status, error_text)),
        }
    }

    /// Joins the text of every text part in the first candidate.
    fn extract_text(response: &GeminiResponse) -> Result<String, ModelError> {
        let candidate = response.candidates.first().ok_or_else(|| {
            error!("No candidates in Gemini API response");
            ModelError::ModelResponseError("No content in API response".to_string())
        })?;

        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            error!(finish_reason = ?candidate.finish_reason, "No text in Gemini API response");
            return Err(ModelError::ModelResponseError(format!(
                "No content in API response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl Model for GeminiModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            parameters = ?parameters,
            "GeminiModel generating text"
        );

        self.generate_content(&[ContentPart::text(prompt)], parameters).await
    }

    async fn generate_content(
        &self,
        parts: &[ContentPart],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            part_count = parts.len(),
            "GeminiModel generating content"
        );

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model_id, self.api_key
        );
        let request_body = Self::build_request(parts, parameters);

        let response = self.client.post(&url).json(&request_body).send().await.map_err(|e| {
            error!(error = %e, "Failed to send request to Gemini API");
            ModelError::RequestError(format!("Network error: {}", e.without_url()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Gemini API returned error status");
            return Err(Self::map_error_status(status, error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Gemini API response");
            ModelError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        let content = Self::extract_text(&gemini_response)?;

        let usage = gemini_response.usage_metadata.map(|meta| ModelUsage {
            prompt_tokens: meta.prompt_token_count.unwrap_or(0),
            completion_tokens: meta.candidates_token_count.unwrap_or(0),
            total_tokens: meta.total_token_count.unwrap_or(0),
        });

        Ok(ModelResponse { content, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
    FileData { file_data: GeminiFileData },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default = "empty_content")]
    content: GeminiContent,
    finish_reason: Option<String>,
}

fn empty_content() -> GeminiContent {
    GeminiContent { role: None, parts: Vec::new() }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)] // Matches API naming
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

/// MIME type detection for inline image payloads.
pub mod mime_utils {
    /// MIME type assumed when the magic bytes are not recognised.
    pub const FALLBACK_IMAGE_TYPE: &str = "image/jpeg";

    /// Detect MIME type from file content using magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some("image/png")
        } else if data.starts_with(b"\xff\xd8\xff") {
            Some("image/jpeg")
        } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP".as_slice()) {
            Some("image/webp")
        } else if data.starts_with(b"GIF8") {
            Some("image/gif")
        } else {
            None
        }
    }

    /// Detected MIME type, or `image/jpeg` when unknown.
    pub fn image_mime_type(data: &[u8]) -> &'static str {
        detect_mime_type(data).unwrap_or(FALLBACK_IMAGE_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn model_for(server: &mockito::Server) -> GeminiModel {
        GeminiModel::with_api_key("test-model".to_string(), "test-key".to_string())
            .with_base_url(server.url())
    }

    #[test]
    fn test_gemini_model_creation_with_api_key() {
        let model = GeminiModel::with_api_key("gemini-pro".to_string(), "test-key".to_string());
        assert_eq!(model.model_id(), "gemini-pro");
        assert_eq!(model.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let model = GeminiModel::with_api_key("m".to_string(), "k".to_string())
            .with_base_url("http://localhost:1234/");
        assert_eq!(model.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_request_serialization_parts() {
        let parts = vec![
            ContentPart::InlineData { mime_type: "image/png".to_string(), data: vec![1, 2, 3] },
            ContentPart::FileUri {
                mime_type: "image/jpeg".to_string(),
                uri: "https://example.com/leaf.jpg".to_string(),
            },
            ContentPart::text("Analyze"),
        ];
        let request = GeminiModel::build_request(&parts, None);
        let json = serde_json::to_value(&request).unwrap();

        let wire_parts = &json["contents"][0]["parts"];
        assert_eq!(wire_parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(wire_parts[0]["inline_data"]["data"], "AQID");
        assert_eq!(wire_parts[1]["file_data"]["file_uri"], "https://example.com/leaf.jpg");
        assert_eq!(wire_parts[2]["text"], "Analyze");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_serialization_generation_config() {
        let params = ModelParameters {
            temperature: Some(0.5),
            max_tokens: Some(2048),
            ..Default::default()
        };
        let request = GeminiModel::build_request(&[ContentPart::text("hi")], Some(params));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert!(json["generationConfig"].get("topP").is_none());

        // Empty parameters are not sent at all
        let request =
            GeminiModel::build_request(&[ContentPart::text("hi")], Some(ModelParameters::default()));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_generate_text_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::UrlEncoded("key".to_string(), "test-key".to_string()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Say hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "farmer!"}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 4, "totalTokenCount": 7}
                }"#,
            )
            .create_async()
            .await;

        let model = model_for(&server);
        let response = model.generate_text("Say hello", None).await.unwrap();

        assert_eq!(response.content, "Hello, farmer!");
        assert_eq!(response.model_id, Some("test-model".to_string()));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 3);
        assert_eq!(usage.total_tokens, 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_content_sends_file_uri() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [
                    {"file_data": {"mime_type": "image/jpeg", "file_uri": "https://example.com/a.jpg"}},
                    {"text": "Describe"}
                ]}]
            })))
            .with_status(200)
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "A leaf"}]}}]}"#)
            .create_async()
            .await;

        let model = model_for(&server);
        let parts = vec![
            ContentPart::FileUri {
                mime_type: "image/jpeg".to_string(),
                uri: "https://example.com/a.jpg".to_string(),
            },
            ContentPart::text("Describe"),
        ];
        let response = model.generate_content(&parts, None).await.unwrap();
        assert_eq!(response.content, "A leaf");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_quota_error_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let err = model_for(&server).generate_text("hi", None).await.unwrap_err();
        match err {
            ModelError::QuotaExceeded { provider, message } => {
                assert_eq!(provider, "gemini");
                assert!(message.unwrap().contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("Expected QuotaExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_auth_and_server_error_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _auth = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let err = model_for(&server).generate_text("hi", None).await.unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedModelProvider(_)));

        server.reset_async().await;
        let _boom = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = model_for(&server).generate_text("hi", None).await.unwrap_err();
        match err {
            ModelError::ModelResponseError(msg) => assert!(msg.contains("Server error")),
            other => panic!("Expected ModelResponseError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
            .create_async()
            .await;

        let err = model_for(&server).generate_text("hi", None).await.unwrap_err();
        match err {
            ModelError::ModelResponseError(msg) => assert!(msg.contains("SAFETY")),
            other => panic!("Expected ModelResponseError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = model_for(&server).generate_text("hi", None).await.unwrap_err();
        assert!(matches!(err, ModelError::SerializationError(_)));
    }

    #[test]
    fn test_mime_type_detection() {
        assert_eq!(mime_utils::detect_mime_type(b"\x89PNG\r\n\x1a\nrest"), Some("image/png"));
        assert_eq!(mime_utils::detect_mime_type(b"\xff\xd8\xff\xe0"), Some("image/jpeg"));
        assert_eq!(mime_utils::detect_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(mime_utils::detect_mime_type(b"RIFF"), None);
        assert_eq!(mime_utils::image_mime_type(b"plain bytes"), "image/jpeg");
    }
}
