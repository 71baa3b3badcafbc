//! Templated operations and the executor shared by every agent.
//!
//! An agent is a table of [`Operation`] declarations plus an
//! [`OperationExecutor`]. Executing an operation:
//!
//! 1. fills declared defaults and rejects missing required fields,
//! 2. runs the optional derive hook (computed prompt values),
//! 3. renders exactly one template,
//! 4. makes exactly one model call (image part first when declared),
//! 5. wraps the text, or the failure, in a [`ResponseEnvelope`].

use std::fmt;
use std::sync::Arc;

use agrismart_abstraction::{ContentPart, Model, ModelError, ModelParameters};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::envelope::{Fields, ResponseEnvelope};
use super::identity::AgentIdentity;
use super::media;
use crate::prompts::{PromptContext, PromptTemplate};

/// Errors in the shape of a request. Raised before any model call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// A required field is absent or `null`.
    #[error("Missing required field '{field}' for operation '{operation}'")]
    MissingField { operation: String, field: String },

    /// The agent has no operation with this name.
    #[error("Unknown operation '{operation}' for agent '{agent}'")]
    UnknownOperation { agent: AgentIdentity, operation: String },

    /// A field is present but unusable.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// No agent with this name.
    #[error("Unknown agent '{0}'")]
    UnknownAgent(String),
}

/// Hook computing extra prompt and envelope values from the request fields.
pub type DeriveFn = fn(&mut Fields) -> Result<(), OperationError>;

/// One key of a success envelope, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKey {
    /// Copy a request field under its own name. Skipped when absent.
    Echo(&'static str),
    /// Copy a request field under another name. Skipped when absent.
    EchoAs { key: &'static str, field: &'static str },
    /// A fixed string.
    Constant { key: &'static str, value: &'static str },
    /// The generated text.
    Payload(&'static str),
}

/// Declaration of one templated operation.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Name used by [`CapabilityRequest::operation`].
    pub name: &'static str,
    /// HTTP path below the agent's route prefix.
    pub route: &'static str,
    pub template: PromptTemplate,
    pub required: &'static [&'static str],
    /// Values filled in when a field is absent or `null`.
    pub defaults: &'static [(&'static str, &'static str)],
    pub layout: &'static [EnvelopeKey],
    /// Wrap the envelope keys in one object under this name.
    pub nest: Option<&'static str>,
    /// Field holding an image (remote locator or base64).
    pub image_field: Option<&'static str>,
    pub derive: Option<DeriveFn>,
}

impl Operation {
    /// Key holding the generated text.
    pub fn payload_key(&self) -> Option<&'static str> {
        self.layout.iter().find_map(|key| match key {
            EnvelopeKey::Payload(name) => Some(*name),
            _ => None,
        })
    }

    /// Applies defaults, checks required fields and runs the derive hook.
    ///
    /// # Errors
    /// Returns `OperationError` when the fields cannot satisfy the operation.
    pub fn prepare(&self, fields: &mut Fields) -> Result<(), OperationError> {
        for (field, default) in self.defaults {
            if is_absent(fields.get(*field)) {
                fields.insert((*field).to_string(), Value::from(*default));
            }
        }

        if let Some(field) = self.required.iter().find(|field| is_absent(fields.get(**field))) {
            return Err(OperationError::MissingField {
                operation: self.name.to_string(),
                field: (*field).to_string(),
            });
        }

        if let Some(derive) = self.derive {
            derive(fields)?;
        }
        Ok(())
    }

    /// Builds the success keys from the prepared fields and the generated text.
    pub fn envelope_fields(&self, fields: &Fields, text: String) -> Fields {
        let mut text = Some(text);
        let mut out = Fields::new();
        for key in self.layout {
            match *key {
                EnvelopeKey::Echo(field) => {
                    if let Some(value) = fields.get(field) {
                        out.insert(field.to_string(), value.clone());
                    }
                }
                EnvelopeKey::EchoAs { key, field } => {
                    if let Some(value) = fields.get(field) {
                        out.insert(key.to_string(), value.clone());
                    }
                }
                EnvelopeKey::Constant { key, value } => {
                    out.insert(key.to_string(), Value::from(value));
                }
                EnvelopeKey::Payload(key) => {
                    out.insert(key.to_string(), Value::from(text.take().unwrap_or_default()));
                }
            }
        }

        match self.nest {
            Some(name) => {
                let mut nested = Fields::new();
                nested.insert(name.to_string(), Value::Object(out));
                nested
            }
            None => out,
        }
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// A named operation plus its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    pub operation: String,
    #[serde(default)]
    pub fields: Fields,
}

impl CapabilityRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), fields: Fields::new() }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Sets `key` only when a value is given.
    #[must_use]
    pub fn with_optional<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }
}

/// Runs operations from a static table against one shared model handle.
#[derive(Clone)]
pub struct OperationExecutor {
    agent: AgentIdentity,
    model: Arc<dyn Model>,
    parameters: Option<ModelParameters>,
    operations: &'static [Operation],
}

impl fmt::Debug for OperationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationExecutor")
            .field("agent", &self.agent)
            .field("model", &self.model.model_id())
            .field("parameters", &self.parameters)
            .field("operations", &self.operations.iter().map(|op| op.name).collect::<Vec<_>>())
            .finish()
    }
}

impl OperationExecutor {
    pub fn new(agent: AgentIdentity, model: Arc<dyn Model>, operations: &'static [Operation]) -> Self {
        Self { agent, model, parameters: None, operations }
    }

    /// Generation parameters sent with every call.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<ModelParameters>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn agent(&self) -> AgentIdentity {
        self.agent
    }

    pub fn operations(&self) -> &'static [Operation] {
        self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&'static Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    /// Executes the named operation.
    ///
    /// # Errors
    /// Returns `OperationError` for an unknown operation or unusable fields.
    /// Generation failures are returned as error envelopes.
    pub async fn execute(&self, request: CapabilityRequest) -> Result<ResponseEnvelope, OperationError> {
        let operation = self.operation(&request.operation).ok_or_else(|| OperationError::UnknownOperation {
            agent: self.agent,
            operation: request.operation.clone(),
        })?;
        self.run(operation, request.fields).await
    }

    /// Executes a declared operation.
    ///
    /// # Errors
    /// Returns `OperationError` when the fields cannot satisfy the operation.
    pub async fn run(&self, operation: &Operation, mut fields: Fields) -> Result<ResponseEnvelope, OperationError> {
        operation.prepare(&mut fields)?;

        let mut parts = Vec::with_capacity(2);
        if let Some(field) = operation.image_field {
            let image = fields.get(field).and_then(Value::as_str).ok_or_else(|| OperationError::InvalidField {
                field: field.to_string(),
                reason: "expected a string".to_string(),
            })?;
            match media::image_part(image) {
                Ok(part) => parts.push(part),
                Err(e) => return Ok(self.failure(operation.name, &e)),
            }
        }

        let context = PromptContext::from_fields(fields);
        let prompt = operation.template.render(&context);
        debug!(
            agent = %self.agent,
            operation = operation.name,
            prompt_len = prompt.len(),
            multimodal = !parts.is_empty(),
            "Rendered prompt"
        );
        parts.push(ContentPart::text(prompt));

        match self.generate(&parts).await {
            Ok(text) => {
                let fields = operation.envelope_fields(context.values(), text);
                Ok(ResponseEnvelope::success(self.agent, fields))
            }
            Err(e) => Ok(self.failure(operation.name, &e)),
        }
    }

    /// One model call; returns the generated text.
    ///
    /// # Errors
    /// Returns the model's error unchanged.
    pub async fn generate(&self, parts: &[ContentPart]) -> Result<String, ModelError> {
        let response = self.model.generate_content(parts, self.parameters.clone()).await?;
        debug!(
            agent = %self.agent,
            model = self.model.model_id(),
            response_len = response.content.len(),
            "Model call completed"
        );
        Ok(response.content)
    }

    /// Logs a generation failure and converts it into an error envelope.
    pub fn failure(&self, operation: &str, error: &ModelError) -> ResponseEnvelope {
        warn!(agent = %self.agent, operation, error = %error, "Operation failed");
        ResponseEnvelope::failure(self.agent, error.to_string())
    }
}

/// Common surface of every agent.
#[async_trait]
pub trait Agent: Send + Sync {
    fn identity(&self) -> AgentIdentity;

    /// Operations reachable through [`Agent::dispatch`].
    fn operations(&self) -> &'static [Operation];

    /// HTTP paths served for this agent, below `/api`.
    fn endpoints(&self) -> Vec<String> {
        let prefix = self.identity().route_prefix();
        self.operations().iter().map(|op| format!("{prefix}{}", op.route)).collect()
    }

    /// Executes an operation by name.
    ///
    /// # Errors
    /// Returns `OperationError` for an unknown operation or unusable fields.
    async fn dispatch(&self, request: CapabilityRequest) -> Result<ResponseEnvelope, OperationError>;
}
