//! Climate monitoring agent.

use std::sync::Arc;

use agrismart_abstraction::{Model, ModelParameters};
use async_trait::async_trait;
use serde_json::Value;

use super::envelope::{Fields, ResponseEnvelope};
use super::identity::AgentIdentity;
use super::operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
use crate::prompts::climate as prompts;

/// Crop assumed by the frost and drought assessments when none is given.
pub const DEFAULT_CROP: &str = "Soja";

pub static OPERATIONS: [Operation; 5] = [
    Operation {
        name: "analyze_climate",
        route: "/analyze",
        template: prompts::ANALYZE_CLIMATE,
        required: &["location", "climate_data"],
        defaults: &[],
        layout: &[
            EnvelopeKey::Echo("location"),
            EnvelopeKey::Payload("analysis"),
            EnvelopeKey::EchoAs { key: "data", field: "climate_data" },
        ],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "get_irrigation_recommendation",
        route: "/irrigation-recommendation",
        template: prompts::IRRIGATION_RECOMMENDATION,
        required: &["climate_data", "crop_type"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Payload("recommendation")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "predict_weather_impact",
        route: "/weather-impact",
        template: prompts::WEATHER_IMPACT,
        required: &["forecast_data", "crop_stage"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("prediction"), EnvelopeKey::Echo("crop_stage")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "get_frost_risk",
        route: "/frost-risk",
        template: prompts::FROST_RISK,
        required: &["location", "min_temp_forecast", "crop_stage"],
        defaults: &[("crop_type", DEFAULT_CROP)],
        layout: &[
            EnvelopeKey::Echo("location"),
            EnvelopeKey::Echo("min_temp_forecast"),
            EnvelopeKey::Echo("crop_type"),
            EnvelopeKey::Echo("crop_stage"),
            EnvelopeKey::Payload("analysis"),
        ],
        nest: Some("frost_risk"),
        image_field: None,
        derive: None,
    },
    Operation {
        name: "drought_assessment",
        route: "/drought-assessment",
        template: prompts::DROUGHT_ASSESSMENT,
        required: &["location", "rainfall_history", "soil_moisture"],
        defaults: &[("crop_type", DEFAULT_CROP)],
        layout: &[
            EnvelopeKey::Echo("location"),
            EnvelopeKey::Echo("total_rainfall"),
            EnvelopeKey::Echo("days_tracked"),
            EnvelopeKey::Echo("avg_rainfall"),
            EnvelopeKey::Echo("soil_moisture"),
            EnvelopeKey::Echo("crop_type"),
            EnvelopeKey::Payload("analysis"),
        ],
        nest: Some("drought_assessment"),
        image_field: None,
        derive: Some(rainfall_totals),
    },
];

/// Sums the rainfall history into `total_rainfall`, `days_tracked`,
/// `avg_rainfall` and the one-decimal `avg_rainfall_text`.
///
/// The total stays an integer when every reading is one.
fn rainfall_totals(fields: &mut Fields) -> Result<(), OperationError> {
    let invalid = || OperationError::InvalidField {
        field: "rainfall_history".to_string(),
        reason: "expected a list of numbers".to_string(),
    };

    let Some(Value::Array(history)) = fields.get("rainfall_history") else {
        return Err(invalid());
    };

    let mut total = 0.0;
    let mut integer_total = Some(0_i64);
    for reading in history {
        total += reading.as_f64().ok_or_else(invalid)?;
        integer_total = integer_total.zip(reading.as_i64()).and_then(|(sum, value)| sum.checked_add(value));
    }
    let days_tracked = history.len();
    let avg_rainfall = if days_tracked > 0 { total / days_tracked as f64 } else { 0.0 };

    let total_rainfall = integer_total.map_or_else(|| Value::from(total), Value::from);
    fields.insert("total_rainfall".to_string(), total_rainfall);
    fields.insert("days_tracked".to_string(), Value::from(days_tracked));
    fields.insert("avg_rainfall".to_string(), Value::from(avg_rainfall));
    fields.insert("avg_rainfall_text".to_string(), Value::from(format!("{avg_rainfall:.1}")));
    Ok(())
}

/// Weather analysis, irrigation timing, frost and drought risk.
#[derive(Debug, Clone)]
pub struct ClimateMonitor {
    executor: OperationExecutor,
}

impl ClimateMonitor {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { executor: OperationExecutor::new(AgentIdentity::ClimateMonitor, model, &OPERATIONS) }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<ModelParameters>) -> Self {
        self.executor = self.executor.with_parameters(parameters);
        self
    }

    /// Analyzes current conditions at `location`.
    pub async fn analyze_climate(
        &self,
        location: &str,
        climate_data: Value,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("analyze_climate")
            .with("location", location)
            .with("climate_data", climate_data);
        self.executor.execute(request).await
    }

    pub async fn get_irrigation_recommendation(
        &self,
        climate_data: Value,
        crop_type: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("get_irrigation_recommendation")
            .with("climate_data", climate_data)
            .with("crop_type", crop_type);
        self.executor.execute(request).await
    }

    pub async fn predict_weather_impact(
        &self,
        forecast_data: Value,
        crop_stage: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("predict_weather_impact")
            .with("forecast_data", forecast_data)
            .with("crop_stage", crop_stage);
        self.executor.execute(request).await
    }

    /// Frost risk for the coming nights. `crop_type` defaults to soybean.
    pub async fn get_frost_risk(
        &self,
        location: &str,
        min_temp_forecast: f64,
        crop_stage: &str,
        crop_type: Option<&str>,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("get_frost_risk")
            .with("location", location)
            .with("min_temp_forecast", min_temp_forecast)
            .with("crop_stage", crop_stage)
            .with_optional("crop_type", crop_type);
        self.executor.execute(request).await
    }

    /// Drought assessment from daily rainfall readings (mm).
    pub async fn drought_assessment(
        &self,
        location: &str,
        rainfall_history: &[f64],
        soil_moisture: f64,
        crop_type: Option<&str>,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("drought_assessment")
            .with("location", location)
            .with("rainfall_history", rainfall_history.to_vec())
            .with("soil_moisture", soil_moisture)
            .with_optional("crop_type", crop_type);
        self.executor.execute(request).await
    }
}

#[async_trait]
impl Agent for ClimateMonitor {
    fn identity(&self) -> AgentIdentity {
        AgentIdentity::ClimateMonitor
    }

    fn operations(&self) -> &'static [Operation] {
        &OPERATIONS
    }

    async fn dispatch(&self, request: CapabilityRequest) -> Result<ResponseEnvelope, OperationError> {
        self.executor.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrismart_abstraction::ModelError;
    use agrismart_models::MockModel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn monitor(reply: &str) -> (ClimateMonitor, Arc<MockModel>) {
        let model = Arc::new(MockModel::with_reply(reply));
        (ClimateMonitor::new(model.clone()), model)
    }

    #[tokio::test]
    async fn test_londrina_analysis_envelope() {
        let (agent, _) = monitor("OK");
        let envelope =
            agent.analyze_climate("Londrina", json!({"temperature": 32, "humidity": 40})).await.unwrap();
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"status":"success","agent":"climate_monitor","location":"Londrina","analysis":"OK","data":{"temperature":32,"humidity":40}}"#
        );
    }

    #[tokio::test]
    async fn test_missing_climate_values_render_placeholder() {
        let (agent, model) = monitor("OK");
        agent.analyze_climate("Londrina", json!({"temperature": 32})).await.unwrap();
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Londrina"));
        assert!(prompt.contains("32"));
        assert!(prompt.contains("N/A"));
    }

    #[tokio::test]
    async fn test_irrigation_and_weather_keys() {
        let (agent, _) = monitor("text");
        let envelope = agent.get_irrigation_recommendation(json!({}), "Milho").await.unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "climate_monitor", "crop_type": "Milho", "recommendation": "text"})
        );

        let envelope = agent.predict_weather_impact(json!({"rain": "heavy"}), "flowering").await.unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "climate_monitor", "prediction": "text", "crop_stage": "flowering"})
        );
    }

    #[tokio::test]
    async fn test_frost_risk_defaults_to_soja() {
        let (agent, model) = monitor("risk");
        let envelope = agent.get_frost_risk("Guarapuava", -1.5, "vegetative", None).await.unwrap();
        assert_eq!(
            envelope.get("frost_risk"),
            Some(&json!({
                "location": "Guarapuava",
                "min_temp_forecast": -1.5,
                "crop_type": "Soja",
                "crop_stage": "vegetative",
                "analysis": "risk"
            }))
        );
        assert!(model.last_prompt().unwrap().contains("Soja"));
    }

    #[tokio::test]
    async fn test_drought_totals() {
        let (agent, model) = monitor("dry");
        let envelope = agent.drought_assessment("Petrolina", &[2.0, 0.0, 1.5], 18.0, Some("Milho")).await.unwrap();
        assert_eq!(
            envelope.get("drought_assessment"),
            Some(&json!({
                "location": "Petrolina",
                "total_rainfall": 3.5,
                "days_tracked": 3,
                "avg_rainfall": 3.5 / 3.0,
                "soil_moisture": 18.0,
                "crop_type": "Milho",
                "analysis": "dry"
            }))
        );
        assert!(model.last_prompt().unwrap().contains("1.2"));
    }

    #[tokio::test]
    async fn test_drought_integer_history_and_empty_history() {
        let (agent, model) = monitor("dry");
        let request = CapabilityRequest::new("drought_assessment")
            .with("location", "Sorriso")
            .with("rainfall_history", json!([3, 4, 5]))
            .with("soil_moisture", 20);
        let envelope = agent.dispatch(request).await.unwrap();
        let summary = envelope.get("drought_assessment").unwrap();
        assert_eq!(summary["total_rainfall"], json!(12));
        assert_eq!(summary["avg_rainfall"], json!(4.0));

        let envelope = agent.drought_assessment("Sorriso", &[], 20.0, None).await.unwrap();
        let summary = envelope.get("drought_assessment").unwrap();
        assert_eq!(summary["days_tracked"], json!(0));
        assert_eq!(summary["avg_rainfall"], json!(0.0));
        assert!(model.last_prompt().unwrap().contains("0.0"));
    }

    #[tokio::test]
    async fn test_drought_rejects_non_numeric_history() {
        let (agent, model) = monitor("dry");
        let request = CapabilityRequest::new("drought_assessment")
            .with("location", "Sorriso")
            .with("rainfall_history", json!(["lots"]))
            .with("soil_moisture", 20);
        assert!(matches!(agent.dispatch(request).await, Err(OperationError::InvalidField { .. })));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_envelope_for_every_operation() {
        let model = Arc::new(MockModel::failing(ModelError::QuotaExceeded {
            provider: "gemini".to_string(),
            message: None,
        }));
        let agent = ClimateMonitor::new(model);
        let envelopes = vec![
            agent.analyze_climate("Londrina", json!({})).await.unwrap(),
            agent.get_irrigation_recommendation(json!({}), "Soja").await.unwrap(),
            agent.predict_weather_impact(json!({}), "harvest").await.unwrap(),
            agent.get_frost_risk("Londrina", 2.0, "flowering", None).await.unwrap(),
            agent.drought_assessment("Londrina", &[1.0], 30.0, None).await.unwrap(),
        ];
        for envelope in envelopes {
            assert_eq!(envelope.status(), "error");
            assert_eq!(envelope.agent(), AgentIdentity::ClimateMonitor);
            assert!(envelope.error().unwrap().contains("quota exceeded"));
        }
    }

    #[tokio::test]
    async fn test_identical_requests_are_byte_identical() {
        let (agent, _) = monitor("stable");
        let first = agent.analyze_climate("Londrina", json!({"temperature": 30})).await.unwrap();
        let second = agent.analyze_climate("Londrina", json!({"temperature": 30})).await.unwrap();
        assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    }
}
