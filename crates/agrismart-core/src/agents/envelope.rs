//! The uniform response envelope.
//!
//! ```json
//! {"status": "success", "agent": "climate_monitor", "location": "...", "analysis": "..."}
//! {"status": "error", "agent": "climate_monitor", "error": "..."}
//! ```
//!
//! A success carries operation keys and never `error`; a failure carries
//! only `error`. The split is enforced by [`Outcome`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::identity::AgentIdentity;

/// Ordered operation keys of a successful envelope.
pub type Fields = Map<String, Value>;

/// Result of one agent operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { fields: Fields },
    Failure { error: String },
}

/// Response returned by every agent operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    agent: AgentIdentity,
    outcome: Outcome,
}

impl ResponseEnvelope {
    pub fn success(agent: AgentIdentity, fields: Fields) -> Self {
        // Reserved keys would shadow the header.
        let fields = fields
            .into_iter()
            .filter(|(key, _)| !matches!(key.as_str(), "status" | "agent" | "error"))
            .collect();
        Self { agent, outcome: Outcome::Success { fields } }
    }

    pub fn failure(agent: AgentIdentity, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".to_string();
        }
        Self { agent, outcome: Outcome::Failure { error } }
    }

    pub fn agent(&self) -> AgentIdentity {
        self.agent
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// `"success"` or `"error"`.
    pub fn status(&self) -> &'static str {
        if self.is_success() { "success" } else { "error" }
    }

    /// An operation key of a successful envelope.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success { fields } => fields.get(key),
            Outcome::Failure { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    /// The envelope as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("status".to_string(), Value::from(self.status()));
        map.insert("agent".to_string(), Value::from(self.agent.as_str()));
        match &self.outcome {
            Outcome::Success { fields } => {
                map.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Outcome::Failure { error } => {
                map.insert("error".to_string(), Value::from(error.as_str()));
            }
        }
        Value::Object(map)
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = match &self.outcome {
            Outcome::Success { fields } => fields.len(),
            Outcome::Failure { .. } => 1,
        };
        let mut map = serializer.serialize_map(Some(2 + extra))?;
        map.serialize_entry("status", self.status())?;
        map.serialize_entry("agent", &self.agent)?;
        match &self.outcome {
            Outcome::Success { fields } => {
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
            }
            Outcome::Failure { error } => map.serialize_entry("error", error)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    #[test]
    fn test_success_serialization_keeps_order() {
        let envelope = ResponseEnvelope::success(
            AgentIdentity::ClimateMonitor,
            fields(json!({"location": "Londrina", "analysis": "OK", "data": {"temperature": 32}})),
        );
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"status":"success","agent":"climate_monitor","location":"Londrina","analysis":"OK","data":{"temperature":32}}"#
        );
        assert_eq!(serde_json::to_value(&envelope).unwrap(), envelope.to_value());
    }

    #[test]
    fn test_failure_has_only_error() {
        let envelope = ResponseEnvelope::failure(AgentIdentity::CropAnalyzer, "quota exceeded");
        assert_eq!(
            envelope.to_value(),
            json!({"status": "error", "agent": "crop_analyzer", "error": "quota exceeded"})
        );
        assert!(!envelope.is_success());
        assert_eq!(envelope.get("analysis"), None);
    }

    #[test]
    fn test_empty_error_message_is_replaced() {
        let envelope = ResponseEnvelope::failure(AgentIdentity::FarmManager, "  ");
        assert_eq!(envelope.error(), Some("unknown error"));
    }

    #[test]
    fn test_reserved_keys_are_dropped() {
        let envelope = ResponseEnvelope::success(
            AgentIdentity::WaterOptimizer,
            fields(json!({"status": "hijack", "error": "nope", "metrics": "m"})),
        );
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "water_optimizer", "metrics": "m"})
        );
    }
}
