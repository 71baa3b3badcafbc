//! Model factory for creating model instances from configuration.
//!
//! Credentials are never read from the process environment here; callers
//! pass them in through `ModelConfig`.

use crate::{GeminiModel, MockModel};
use agrismart_abstraction::{Model, ModelError};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// Model type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Mock model for testing.
    Mock,
    /// Google Gemini model.
    Gemini,
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "gemini" | "google" => Ok(Self::Gemini),
            other => {
                error!(model_type = %other, "Unrecognized model type");
                Err(ModelError::UnsupportedModelProvider(format!(
                    "Unrecognized model type: {}",
                    other
                )))
            }
        }
    }
}

/// Model configuration.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// The type of model to create.
    pub model_type: ModelType,
    /// The model ID (e.g., "gemini-2.0-flash-exp").
    pub model_id: String,
    /// API key, required for Gemini.
    pub api_key: Option<String>,
    /// Optional endpoint override.
    pub base_url: Option<String>,
}

impl ModelConfig {
    /// Creates a new `ModelConfig` with the given type and model ID.
    #[must_use]
    pub fn new(model_type: ModelType, model_id: String) -> Self {
        Self { model_type, model_id, api_key: None, base_url: None }
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the endpoint override for this configuration.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }
}

/// Factory for creating model instances.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a model instance from the given configuration.
    ///
    /// # Errors
    /// Returns `ModelError::UnsupportedModelProvider` when a Gemini model is
    /// requested without a non-empty API key. No network call is made.
    pub fn create(config: ModelConfig) -> Result<Arc<dyn Model>, ModelError> {
        debug!(
            model_type = ?config.model_type,
            model_id = %config.model_id,
            "Creating model instance"
        );

        match config.model_type {
            ModelType::Mock => Ok(Arc::new(MockModel::new(config.model_id))),
            ModelType::Gemini => {
                let api_key = config
                    .api_key
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        error!("Gemini model requested without an API key");
                        ModelError::UnsupportedModelProvider(
                            "Gemini API key is required (set model.api_key or GOOGLE_API_KEY)"
                                .to_string(),
                        )
                    })?;

                let mut model = GeminiModel::with_api_key(config.model_id, api_key);
                if let Some(base_url) = config.base_url {
                    model = model.with_base_url(base_url);
                }
                Ok(Arc::new(model))
            }
        }
    }

    /// Creates a model instance from a model type string and model ID.
    ///
    /// # Errors
    /// Returns a `ModelError` if the model type is unrecognized or creation fails.
    pub fn create_from_str(
        model_type_str: &str,
        model_id: String,
        api_key: Option<String>,
    ) -> Result<Arc<dyn Model>, ModelError> {
        let model_type = ModelType::from_str(model_type_str)?;
        let mut config = ModelConfig::new(model_type, model_id);
        config.api_key = api_key;
        Self::create(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_str() {
        assert_eq!(ModelType::from_str("mock").unwrap(), ModelType::Mock);
        assert_eq!(ModelType::from_str("Gemini").unwrap(), ModelType::Gemini);
        assert_eq!(ModelType::from_str("google").unwrap(), ModelType::Gemini);
        assert!(ModelType::from_str("claude").is_err());
    }

    #[test]
    fn test_create_mock_model() {
        let config = ModelConfig::new(ModelType::Mock, "mock-1".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "mock-1");
    }

    #[test]
    fn test_create_gemini_requires_api_key() {
        let config = ModelConfig::new(ModelType::Gemini, "gemini-2.0-flash-exp".to_string());
        let err = ModelFactory::create(config).err().unwrap();
        assert!(matches!(err, ModelError::UnsupportedModelProvider(_)));

        let config = ModelConfig::new(ModelType::Gemini, "gemini-2.0-flash-exp".to_string())
            .with_api_key("   ".to_string());
        assert!(ModelFactory::create(config).is_err());
    }

    #[test]
    fn test_create_gemini_with_api_key() {
        let config = ModelConfig::new(ModelType::Gemini, "gemini-2.0-flash-exp".to_string())
            .with_api_key("test-key".to_string())
            .with_base_url("http://localhost:9999".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "gemini-2.0-flash-exp");
    }

    #[test]
    fn test_create_from_str() {
        let model = ModelFactory::create_from_str("mock", "m".to_string(), None).unwrap();
        assert_eq!(model.model_id(), "m");
        assert!(ModelFactory::create_from_str("unknown", "m".to_string(), None).is_err());
    }
}
