//! Model implementations for AgriSmart.
//!
//! This crate provides concrete implementations of the `Model` trait.
//!
//! # Supported Providers
//!
//! - **Mock**: Testing and development (scriptable replies, call recording)
//! - **Gemini**: Google's Gemini models (API key required)

pub mod factory;
pub mod gemini;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use agrismart_abstraction::{ContentPart, Model, ModelError, ModelParameters, ModelResponse, ModelUsage};
use async_trait::async_trait;
use tracing::debug;

pub use factory::{ModelConfig, ModelFactory, ModelType};
pub use gemini::{mime_utils, GeminiModel};

/// What a `MockModel` answers once its scripted replies run out.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with a summary of the prompt text.
    Echo,
    /// Reply with the same text every time.
    Fixed(String),
    /// Fail every call with the given error.
    Fail(ModelError),
}

/// A mock implementation of the `Model` trait for testing and demonstration.
///
/// Every request is recorded so tests can inspect the rendered prompts and
/// count how many generation calls an operation made.
#[derive(Debug)]
pub struct MockModel {
    id: String,
    behavior: MockBehavior,
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<Vec<ContentPart>>>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("mock-model".to_string())
    }
}

impl MockModel {
    /// Creates a new echoing `MockModel` with the given ID.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            behavior: MockBehavior::Echo,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always answers `reply`.
    #[must_use]
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::default().behavior(MockBehavior::Fixed(reply.into()))
    }

    /// A mock that always fails with `error`.
    #[must_use]
    pub fn failing(error: ModelError) -> Self {
        Self::default().behavior(MockBehavior::Fail(error))
    }

    /// Replaces the fallback behavior.
    #[must_use]
    pub fn behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Queues replies consumed in order before the fallback behavior applies.
    #[must_use]
    pub fn with_script(self, replies: impl IntoIterator<Item = Result<String, ModelError>>) -> Self {
        lock(&self.script).extend(replies);
        self
    }

    /// Number of generation calls made so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// All recorded requests, in call order.
    pub fn requests(&self) -> Vec<Vec<ContentPart>> {
        lock(&self.calls).clone()
    }

    /// The text parts of each recorded request, joined per call.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .map(|parts| parts.iter().filter_map(ContentPart::as_text).collect::<Vec<_>>().join("\n"))
            .collect()
    }

    /// The most recent prompt text, if any call was made.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }

    fn next_reply(&self, prompt: &str) -> Result<String, ModelError> {
        if let Some(scripted) = lock(&self.script).pop_front() {
            return scripted;
        }
        match &self.behavior {
            MockBehavior::Echo => Ok(format!("Mock response for: {prompt}\nModel ID: {}", self.id)),
            MockBehavior::Fixed(reply) => Ok(reply.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Model for MockModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.generate_content(&[ContentPart::text(prompt)], parameters).await
    }

    async fn generate_content(
        &self,
        parts: &[ContentPart],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.id,
            part_count = parts.len(),
            parameters = ?parameters,
            "MockModel generating content"
        );

        lock(&self.calls).push(parts.to_vec());

        let prompt = parts.iter().filter_map(ContentPart::as_text).collect::<Vec<_>>().join("\n");
        let content = self.next_reply(&prompt)?;

        let prompt_tokens = count_tokens(&prompt);
        let completion_tokens = count_tokens(&content);

        Ok(ModelResponse {
            content,
            model_id: Some(self.id.clone()),
            usage: Some(ModelUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

/// Count tokens in a string (simplified: word count).
#[allow(clippy::cast_possible_truncation)]
fn count_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_echoes_prompt() {
        let model = MockModel::new("test-model".to_string());
        let response = model.generate_text("Hello, world!", None).await.unwrap();

        assert!(response.content.contains("Mock response for: Hello, world!"));
        assert_eq!(response.model_id, Some("test-model".to_string()));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 2);
        assert_eq!(usage.total_tokens, usage.prompt_tokens + usage.completion_tokens);
    }

    #[tokio::test]
    async fn test_fixed_reply_and_recording() {
        let model = MockModel::with_reply("OK");
        let first = model.generate_text("one", None).await.unwrap();
        let second = model.generate_text("two", None).await.unwrap();

        assert_eq!(first.content, "OK");
        assert_eq!(second.content, "OK");
        assert_eq!(model.call_count(), 2);
        assert_eq!(model.prompts(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(model.last_prompt().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_failing_model() {
        let model = MockModel::failing(ModelError::RequestError("down".to_string()));
        let err = model.generate_text("hi", None).await.unwrap_err();
        assert_eq!(err, ModelError::RequestError("down".to_string()));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_script_runs_before_fallback() {
        let model = MockModel::with_reply("fallback").with_script(vec![
            Ok("first".to_string()),
            Err(ModelError::Other("second failed".to_string())),
        ]);

        assert_eq!(model.generate_text("a", None).await.unwrap().content, "first");
        assert!(model.generate_text("b", None).await.is_err());
        assert_eq!(model.generate_text("c", None).await.unwrap().content, "fallback");
    }

    #[tokio::test]
    async fn test_multimodal_request_recorded_in_order() {
        let model = MockModel::with_reply("seen");
        let parts = vec![
            ContentPart::InlineData { mime_type: "image/png".to_string(), data: vec![0x89] },
            ContentPart::text("describe"),
        ];
        model.generate_content(&parts, None).await.unwrap();

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], parts);
        assert_eq!(model.prompts(), vec!["describe".to_string()]);
    }
}
