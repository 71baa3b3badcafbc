//! Water and irrigation agent.

use std::sync::Arc;

use agrismart_abstraction::{Model, ModelParameters};
use async_trait::async_trait;
use serde_json::Value;

use super::envelope::ResponseEnvelope;
use super::identity::AgentIdentity;
use super::operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
use crate::prompts::water as prompts;

pub static OPERATIONS: [Operation; 4] = [
    Operation {
        name: "create_irrigation_schedule",
        route: "/irrigation-schedule",
        template: prompts::IRRIGATION_SCHEDULE,
        required: &["crop_type", "field_size", "soil_type", "climate_data", "water_availability"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Echo("field_size"), EnvelopeKey::Payload("schedule")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "calculate_water_efficiency",
        route: "/efficiency",
        template: prompts::WATER_EFFICIENCY,
        required: &["water_used", "field_size", "crop_yield", "crop_type"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("metrics")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "detect_irrigation_issues",
        route: "/detect-issues",
        template: prompts::IRRIGATION_ISSUES,
        required: &["sensor_data", "irrigation_system"],
        defaults: &[],
        layout: &[
            EnvelopeKey::EchoAs { key: "system_type", field: "irrigation_system" },
            EnvelopeKey::Payload("analysis"),
        ],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "recommend_irrigation_technology",
        route: "/technology-recommendation",
        template: prompts::IRRIGATION_TECHNOLOGY,
        required: &["farm_details", "budget", "water_source"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("recommendations")],
        nest: None,
        image_field: None,
        derive: None,
    },
];

/// Irrigation scheduling, water efficiency, system diagnostics.
#[derive(Debug, Clone)]
pub struct WaterOptimizer {
    executor: OperationExecutor,
}

impl WaterOptimizer {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { executor: OperationExecutor::new(AgentIdentity::WaterOptimizer, model, &OPERATIONS) }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<ModelParameters>) -> Self {
        self.executor = self.executor.with_parameters(parameters);
        self
    }

    /// Seven-day schedule for a field of `field_size` hectares.
    pub async fn create_irrigation_schedule(
        &self,
        crop_type: &str,
        field_size: f64,
        soil_type: &str,
        climate_data: Value,
        water_availability: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("create_irrigation_schedule")
            .with("crop_type", crop_type)
            .with("field_size", field_size)
            .with("soil_type", soil_type)
            .with("climate_data", climate_data)
            .with("water_availability", water_availability);
        self.executor.execute(request).await
    }

    pub async fn calculate_water_efficiency(
        &self,
        water_used: f64,
        field_size: f64,
        crop_yield: f64,
        crop_type: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("calculate_water_efficiency")
            .with("water_used", water_used)
            .with("field_size", field_size)
            .with("crop_yield", crop_yield)
            .with("crop_type", crop_type);
        self.executor.execute(request).await
    }

    pub async fn detect_irrigation_issues(
        &self,
        sensor_data: Value,
        irrigation_system: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("detect_irrigation_issues")
            .with("sensor_data", sensor_data)
            .with("irrigation_system", irrigation_system);
        self.executor.execute(request).await
    }

    pub async fn recommend_irrigation_technology(
        &self,
        farm_details: Value,
        budget: &str,
        water_source: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("recommend_irrigation_technology")
            .with("farm_details", farm_details)
            .with("budget", budget)
            .with("water_source", water_source);
        self.executor.execute(request).await
    }
}

#[async_trait]
impl Agent for WaterOptimizer {
    fn identity(&self) -> AgentIdentity {
        AgentIdentity::WaterOptimizer
    }

    fn operations(&self) -> &'static [Operation] {
        &OPERATIONS
    }

    async fn dispatch(&self, request: CapabilityRequest) -> Result<ResponseEnvelope, OperationError> {
        self.executor.execute(request).await
    }
}
