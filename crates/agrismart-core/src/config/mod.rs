//! Configuration module for AgriSmart Core.
//!
//! Values are layered in this order, later sources winning:
//! struct defaults, an optional TOML file, `AGRISMART_*` environment
//! variables (nested keys separated by `__`), and finally the platform
//! variables `GOOGLE_API_KEY`, `PORT` and `CORS_ORIGINS`.

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use agrismart_abstraction::ModelParameters;
use agrismart_models::{ModelConfig, ModelType, gemini::DEFAULT_MODEL_ID};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Default config file looked up in the working directory (extension optional).
pub const DEFAULT_CONFIG_FILE: &str = "agrismart";

/// Server configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// The address to bind the HTTP server to.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Allowed CORS origins; `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: default_address(), cors_origins: default_cors_origins() }
    }
}

/// Model configuration section in config file.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ModelSection {
    /// The type of model (gemini, mock).
    #[serde(default = "default_model_type")]
    pub model_type: String,
    /// The model ID.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// API key for the generation endpoint.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Endpoint override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sampling temperature forwarded with every call.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Output token cap forwarded with every call.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_model_type() -> String {
    "gemini".to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            model_type: default_model_type(),
            model_id: default_model_id(),
            api_key: None,
            base_url: None,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

// Hand-written so the credential never reaches the logs.
impl std::fmt::Debug for ModelSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSection")
            .field("model_type", &self.model_type)
            .field("model_id", &self.model_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl ModelSection {
    /// A section that builds the in-process mock model.
    #[must_use]
    pub fn mock() -> Self {
        Self { model_type: "mock".to_string(), ..Self::default() }
    }

    /// Converts the section into a factory configuration.
    ///
    /// # Errors
    /// Returns `CoreError::Config` for an unknown model type or a Gemini
    /// section without a usable API key.
    pub fn to_model_config(&self) -> Result<ModelConfig> {
        let model_type = ModelType::from_str(&self.model_type)
            .map_err(|e| CoreError::Config(e.to_string()))?;

        let api_key = self.api_key.clone().filter(|key| !key.trim().is_empty());
        if model_type == ModelType::Gemini && api_key.is_none() {
            return Err(CoreError::Config(
                "GOOGLE_API_KEY is not set and model.api_key is empty".to_string(),
            ));
        }

        let mut config = ModelConfig::new(model_type, self.model_id.clone());
        config.api_key = api_key;
        config.base_url = self.base_url.clone();
        Ok(config)
    }

    /// Generation parameters sent with every call, if any are configured.
    pub fn parameters(&self) -> Option<ModelParameters> {
        let params = ModelParameters {
            temperature: self.temperature,
            max_tokens: self.max_output_tokens,
            ..ModelParameters::default()
        };
        (!params.is_empty()).then_some(params)
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// SQLite file path; in-memory when absent.
    #[serde(default)]
    pub path: Option<String>,
}

/// Root configuration for AgriSmart.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Model configuration.
    #[serde(default)]
    pub model: ModelSection,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text, without environment overrides.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load configuration from an optional file and the process environment.
    ///
    /// Without `path`, `agrismart.toml` in the working directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("AGRISMART")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?
            .try_deserialize()?;

        config.apply_platform_env(|key| std::env::var(key).ok())?;
        debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Applies `GOOGLE_API_KEY`, `PORT` and `CORS_ORIGINS` using `lookup`.
    ///
    /// `GOOGLE_API_KEY` only fills an unset key; the other two always win.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if `PORT` is not a valid port number.
    pub fn apply_platform_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.model.api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
            if let Some(key) = lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty()) {
                self.model.api_key = Some(key);
            }
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("PORT is not a valid port: {port}")))?;
            self.server.address.set_port(port);
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
            if !origins.is_empty() {
                self.server.cors_origins = origins;
            }
        }

        Ok(())
    }
}
