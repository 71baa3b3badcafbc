//! Yield forecasting and market timing agent.

use std::sync::Arc;

use agrismart_abstraction::{Model, ModelParameters};
use async_trait::async_trait;
use serde_json::Value;

use super::envelope::{Fields, ResponseEnvelope};
use super::identity::AgentIdentity;
use super::operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
use crate::prompts::{MISSING_VALUE, render_value, yields as prompts};

const NO_HISTORY: &str = "No historical data provided";

pub static OPERATIONS: [Operation; 4] = [
    Operation {
        name: "predict_yield",
        route: "/predict",
        template: prompts::PREDICT_YIELD,
        required: &["crop_type", "field_size", "planting_date", "current_conditions"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Payload("prediction")],
        nest: None,
        image_field: None,
        derive: Some(historical_summary),
    },
    Operation {
        name: "analyze_yield_gaps",
        route: "/gap-analysis",
        template: prompts::YIELD_GAPS,
        required: &["actual_yield", "potential_yield", "crop_type", "farming_practices"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("analysis")],
        nest: None,
        image_field: None,
        derive: Some(yield_gap),
    },
    Operation {
        name: "forecast_market_timing",
        route: "/market-timing",
        template: prompts::MARKET_TIMING,
        required: &["crop_type", "expected_harvest_date", "expected_quantity", "market_data"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("forecast")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "optimize_planting_schedule",
        route: "/planting-schedule",
        template: prompts::PLANTING_SCHEDULE,
        required: &["crops", "field_size", "climate_zone", "objectives"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("schedule")],
        nest: None,
        image_field: None,
        derive: None,
    },
];

/// One `Year Y: X tons/ha` line per past season.
fn historical_summary(fields: &mut Fields) -> Result<(), OperationError> {
    let summary = match fields.get("historical_data") {
        None | Some(Value::Null) => NO_HISTORY.to_string(),
        Some(Value::Array(seasons)) if seasons.is_empty() => NO_HISTORY.to_string(),
        Some(Value::Array(seasons)) => seasons
            .iter()
            .map(|season| {
                let year = season.get("year").and_then(render_value);
                let harvested = season.get("yield").and_then(render_value);
                format!(
                    "Year {}: {} tons/ha",
                    year.as_deref().unwrap_or(MISSING_VALUE),
                    harvested.as_deref().unwrap_or(MISSING_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => {
            return Err(OperationError::InvalidField {
                field: "historical_data".to_string(),
                reason: "expected a list of seasons".to_string(),
            });
        }
    };
    fields.insert("historical_summary".to_string(), Value::from(summary));
    Ok(())
}

/// `potential - actual`, and the gap as a share of potential when potential is non-zero.
fn yield_gap(fields: &mut Fields) -> Result<(), OperationError> {
    let number = |field: &str| {
        fields.get(field).and_then(Value::as_f64).ok_or_else(|| OperationError::InvalidField {
            field: field.to_string(),
            reason: "expected a number".to_string(),
        })
    };
    let actual = number("actual_yield")?;
    let potential = number("potential_yield")?;

    let gap = potential - actual;
    fields.insert("yield_gap".to_string(), Value::from(format!("{gap:.2}")));
    if potential != 0.0 {
        let percent = gap / potential * 100.0;
        fields.insert("yield_gap_percent".to_string(), Value::from(format!("{percent:.1}")));
    }
    Ok(())
}

/// Yield forecasts, gap analysis, market timing, planting windows.
#[derive(Debug, Clone)]
pub struct YieldPredictor {
    executor: OperationExecutor,
}

impl YieldPredictor {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { executor: OperationExecutor::new(AgentIdentity::YieldPredictor, model, &OPERATIONS) }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<ModelParameters>) -> Self {
        self.executor = self.executor.with_parameters(parameters);
        self
    }

    /// `historical_data` entries are objects with `year` and `yield` keys.
    pub async fn predict_yield(
        &self,
        crop_type: &str,
        field_size: f64,
        planting_date: &str,
        current_conditions: Value,
        historical_data: Option<Vec<Value>>,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("predict_yield")
            .with("crop_type", crop_type)
            .with("field_size", field_size)
            .with("planting_date", planting_date)
            .with("current_conditions", current_conditions)
            .with_optional("historical_data", historical_data);
        self.executor.execute(request).await
    }

    pub async fn analyze_yield_gaps(
        &self,
        actual_yield: f64,
        potential_yield: f64,
        crop_type: &str,
        farming_practices: Value,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("analyze_yield_gaps")
            .with("actual_yield", actual_yield)
            .with("potential_yield", potential_yield)
            .with("crop_type", crop_type)
            .with("farming_practices", farming_practices);
        self.executor.execute(request).await
    }

    pub async fn forecast_market_timing(
        &self,
        crop_type: &str,
        expected_harvest_date: &str,
        expected_quantity: f64,
        market_data: Value,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("forecast_market_timing")
            .with("crop_type", crop_type)
            .with("expected_harvest_date", expected_harvest_date)
            .with("expected_quantity", expected_quantity)
            .with("market_data", market_data);
        self.executor.execute(request).await
    }

    pub async fn optimize_planting_schedule(
        &self,
        crops: &[String],
        field_size: f64,
        climate_zone: &str,
        objectives: &[String],
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("optimize_planting_schedule")
            .with("crops", crops.to_vec())
            .with("field_size", field_size)
            .with("climate_zone", climate_zone)
            .with("objectives", objectives.to_vec());
        self.executor.execute(request).await
    }
}

#[async_trait]
impl Agent for YieldPredictor {
    fn identity(&self) -> AgentIdentity {
        AgentIdentity::YieldPredictor
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

    fn predictor(reply: &str) -> (YieldPredictor, Arc<MockModel>) {
        let model = Arc::new(MockModel::with_reply(reply));
        (YieldPredictor::new(model.clone()), model)
    }

    #[tokio::test]
    async fn test_prediction_with_history() {
        let (agent, model) = predictor("3.4 t/ha");
        let history = vec![json!({"year": 2022, "yield": 3.1}), json!({"year": 2023})];
        let envelope = agent
            .predict_yield("Soja", 80.0, "2024-10-15", json!({"growth_stage": "R3"}), Some(history))
            .await
            .unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "yield_predictor", "crop_type": "Soja", "prediction": "3.4 t/ha"})
        );
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Year 2022: 3.1 tons/ha\nYear 2023: N/A tons/ha"));
        assert!(prompt.contains("R3"));
    }

    #[tokio::test]
    async fn test_prediction_without_history() {
        let (agent, model) = predictor("ok");
        agent.predict_yield("Milho", 10.0, "2024-09-01", json!({}), None).await.unwrap();
        assert!(model.last_prompt().unwrap().contains(NO_HISTORY));

        agent.predict_yield("Milho", 10.0, "2024-09-01", json!({}), Some(vec![])).await.unwrap();
        assert!(model.last_prompt().unwrap().contains(NO_HISTORY));
    }

    #[tokio::test]
    async fn test_yield_gap_figures() {
        let (agent, model) = predictor("gap");
        let envelope = agent.analyze_yield_gaps(3.0, 4.0, "Soja", json!({"seed_variety": "BRS 1010"})).await.unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "yield_predictor", "analysis": "gap"})
        );
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Yield gap: 1.00 tons/ha (25.0%)"));
        assert!(prompt.contains("BRS 1010"));
    }

    #[tokio::test]
    async fn test_zero_potential_renders_placeholder() {
        let (agent, model) = predictor("gap");
        let envelope = agent.analyze_yield_gaps(0.0, 0.0, "Soja", json!({})).await.unwrap();
        assert!(envelope.is_success());
        assert!(model.last_prompt().unwrap().contains("(N/A%)"));
    }

    #[tokio::test]
    async fn test_market_and_planting() {
        let (agent, model) = predictor("sell in May");
        let forecast = agent
            .forecast_market_timing("Café", "2025-05-20", 300.0, json!({"current_price": 1450}))
            .await
            .unwrap();
        assert_eq!(forecast.get("forecast"), Some(&json!("sell in May")));

        let schedule = agent
            .optimize_planting_schedule(
                &["Soja".to_string(), "Milho safrinha".to_string()],
                500.0,
                "tropical",
                &["maximize profit".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(schedule.get("schedule"), Some(&json!("sell in May")));
        assert!(model.last_prompt().unwrap().contains("Soja, Milho safrinha"));
    }

    #[tokio::test]
    async fn test_failure_drops_payload() {
        let agent = YieldPredictor::new(Arc::new(MockModel::failing(ModelError::Other("boom".to_string()))));
        let envelope = agent.forecast_market_timing("Soja", "2025-03-01", 10.0, json!({})).await.unwrap();
        assert_eq!(envelope.error(), Some("Other Model Error: boom"));
        assert_eq!(envelope.get("forecast"), None);
    }
}
