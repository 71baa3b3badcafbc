//! The coordinator.
//!
//! `FarmManager` owns the four capability agents and answers free-form
//! queries with two sequential model calls: an advisory routing call that
//! names the relevant agents, then an independent comprehensive answer.
//! The routing text is returned as metadata and never gates what runs.

use std::sync::Arc;

use agrismart_abstraction::{ContentPart, Model, ModelError, ModelParameters};
use agrismart_models::ModelFactory;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::climate::ClimateMonitor;
use super::crop::CropAnalyzer;
use super::envelope::{Fields, ResponseEnvelope};
use super::identity::AgentIdentity;
use super::operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
use super::water::WaterOptimizer;
use super::yield_predictor::YieldPredictor;
use crate::config::ModelSection;
use crate::error::Result;
use crate::prompts::{PromptContext, farm as prompts};

/// Operation name of the routed query, served at `/farm/query`.
pub const COORDINATE_OPERATION: &str = "coordinate_agents";
const COORDINATE_ROUTE: &str = "/query";

pub static OPERATIONS: [Operation; 4] = [
    Operation {
        name: "get_daily_briefing",
        route: "/daily-briefing",
        template: prompts::DAILY_BRIEFING,
        required: &["farm_data"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("briefing_date"), EnvelopeKey::Payload("briefing")],
        nest: None,
        image_field: None,
        derive: Some(briefing_date),
    },
    Operation {
        name: "create_action_plan",
        route: "/action-plan",
        template: prompts::ACTION_PLAN,
        required: &["goal", "timeframe", "farm_status"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("goal"), EnvelopeKey::Payload("action_plan")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "analyze_farm_performance",
        route: "/performance",
        template: prompts::FARM_PERFORMANCE,
        required: &["performance_data", "period"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("period"), EnvelopeKey::Payload("analysis")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "handle_emergency",
        route: "/emergency",
        template: prompts::EMERGENCY,
        required: &["emergency_type", "details"],
        defaults: &[],
        layout: &[
            EnvelopeKey::Echo("emergency_type"),
            EnvelopeKey::Constant { key: "priority", value: "URGENT" },
            EnvelopeKey::Payload("response_plan"),
        ],
        nest: None,
        image_field: None,
        derive: None,
    },
];

/// `farm_data.date` when given, otherwise `"today"`.
fn briefing_date(fields: &mut Fields) -> std::result::Result<(), OperationError> {
    let date = fields
        .get("farm_data")
        .and_then(|data| data.get("date"))
        .filter(|date| !date.is_null())
        .cloned()
        .unwrap_or_else(|| Value::from("today"));
    fields.insert("briefing_date".to_string(), date);
    Ok(())
}

/// One `- name: topics` line per capability agent.
pub fn agent_catalogue() -> String {
    AgentIdentity::SPECIALISTS
        .iter()
        .map(|agent| format!("- {}: {}", agent.as_str(), agent.routing_hint()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Agents named by a routing answer, in order of first mention.
///
/// Parsed leniently: a JSON array of names (optionally in a code fence) is
/// preferred, otherwise the text is scanned for known identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingDecision {
    agents: Vec<AgentIdentity>,
}

impl RoutingDecision {
    pub fn parse(text: &str) -> Self {
        let body = strip_code_fence(text);
        let mut agents = Vec::new();

        if let Ok(names) = serde_json::from_str::<Vec<String>>(body) {
            for identity in names.iter().filter_map(|name| name.trim().parse::<AgentIdentity>().ok()) {
                if !agents.contains(&identity) {
                    agents.push(identity);
                }
            }
            return Self { agents };
        }

        let mut mentions: Vec<(usize, AgentIdentity)> = AgentIdentity::ALL
            .into_iter()
            .filter_map(|identity| text.find(identity.as_str()).map(|position| (position, identity)))
            .collect();
        mentions.sort_by_key(|(position, _)| *position);
        agents.extend(mentions.into_iter().map(|(_, identity)| identity));
        Self { agents }
    }

    pub fn agents(&self) -> &[AgentIdentity] {
        &self.agents
    }

    pub fn contains(&self, identity: AgentIdentity) -> bool {
        self.agents.contains(&identity)
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Coordinates the capability agents and owns the farm-wide operations.
#[derive(Debug, Clone)]
pub struct FarmManager {
    executor: OperationExecutor,
    climate: ClimateMonitor,
    crop: CropAnalyzer,
    water: WaterOptimizer,
    yields: YieldPredictor,
}

impl FarmManager {
    /// All five agents share `model`.
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self {
            executor: OperationExecutor::new(AgentIdentity::FarmManager, model.clone(), &OPERATIONS),
            climate: ClimateMonitor::new(model.clone()),
            crop: CropAnalyzer::new(model.clone()),
            water: WaterOptimizer::new(model.clone()),
            yields: YieldPredictor::new(model),
        }
    }

    /// Builds the model from configuration.
    ///
    /// # Errors
    /// Returns `CoreError::Config` when the credential is missing. No network
    /// call is made here.
    pub fn from_config(section: &ModelSection) -> Result<Self> {
        let model = ModelFactory::create(section.to_model_config()?)?;
        info!(model = model.model_id(), model_type = %section.model_type, "Farm manager ready");
        Ok(Self::new(model).with_parameters(section.parameters()))
    }

    /// Applies generation parameters to every agent.
    #[must_use]
    pub fn with_parameters(self, parameters: Option<ModelParameters>) -> Self {
        Self {
            executor: self.executor.with_parameters(parameters.clone()),
            climate: self.climate.with_parameters(parameters.clone()),
            crop: self.crop.with_parameters(parameters.clone()),
            water: self.water.with_parameters(parameters.clone()),
            yields: self.yields.with_parameters(parameters),
        }
    }

    pub fn climate(&self) -> &ClimateMonitor {
        &self.climate
    }

    pub fn crop(&self) -> &CropAnalyzer {
        &self.crop
    }

    pub fn water(&self) -> &WaterOptimizer {
        &self.water
    }

    pub fn yields(&self) -> &YieldPredictor {
        &self.yields
    }

    pub fn model_id(&self) -> &str {
        self.executor.model().model_id()
    }

    /// The agent answering to `identity`.
    pub fn agent(&self, identity: AgentIdentity) -> &dyn Agent {
        match identity {
            AgentIdentity::ClimateMonitor => &self.climate,
            AgentIdentity::CropAnalyzer => &self.crop,
            AgentIdentity::WaterOptimizer => &self.water,
            AgentIdentity::YieldPredictor => &self.yields,
            AgentIdentity::FarmManager => self,
        }
    }

    /// Answers a free-form query.
    ///
    /// Exactly two model calls: routing, then the answer. A failure in either
    /// discards both and yields one error envelope.
    pub async fn coordinate_agents(
        &self,
        query: &str,
        context: Value,
    ) -> std::result::Result<ResponseEnvelope, OperationError> {
        let mut prompt_context = PromptContext::new();
        prompt_context.set("query", query);
        if !context.is_null() {
            let rendered = serde_json::to_string_pretty(&context).unwrap_or_else(|_| context.to_string());
            prompt_context.set("context", rendered);
        }
        prompt_context.set("agent_catalogue", agent_catalogue());

        let routing_prompt = prompts::ROUTING.render(&prompt_context);
        let answer_prompt = prompts::COMPREHENSIVE_ANSWER.render(&prompt_context);

        match self.route_and_answer(routing_prompt, answer_prompt).await {
            Ok((routing, response)) => {
                let mut fields = Fields::new();
                fields.insert("query".to_string(), Value::from(query));
                fields.insert("response".to_string(), Value::from(response));
                fields.insert("routing".to_string(), Value::from(routing));
                Ok(ResponseEnvelope::success(AgentIdentity::FarmManager, fields))
            }
            Err(e) => Ok(self.executor.failure(COORDINATE_OPERATION, &e)),
        }
    }

    async fn route_and_answer(
        &self,
        routing_prompt: String,
        answer_prompt: String,
    ) -> std::result::Result<(String, String), ModelError> {
        let routing = self.executor.generate(&[ContentPart::text(routing_prompt)]).await?;
        let decision = RoutingDecision::parse(&routing);
        debug!(agents = ?decision.agents(), "Advisory routing decision");

        let response = self.executor.generate(&[ContentPart::text(answer_prompt)]).await?;
        Ok((routing, response))
    }

    /// Daily briefing. `farm_data.date` is echoed as `briefing_date`.
    pub async fn get_daily_briefing(&self, farm_data: Value) -> std::result::Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("get_daily_briefing").with("farm_data", farm_data);
        self.executor.execute(request).await
    }

    pub async fn create_action_plan(
        &self,
        goal: &str,
        timeframe: &str,
        farm_status: Value,
        constraints: Option<&[String]>,
    ) -> std::result::Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("create_action_plan")
            .with("goal", goal)
            .with("timeframe", timeframe)
            .with("farm_status", farm_status)
            .with_optional("constraints", constraints.map(<[String]>::to_vec));
        self.executor.execute(request).await
    }

    pub async fn analyze_farm_performance(
        &self,
        performance_data: Value,
        period: &str,
    ) -> std::result::Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("analyze_farm_performance")
            .with("performance_data", performance_data)
            .with("period", period);
        self.executor.execute(request).await
    }

    pub async fn handle_emergency(
        &self,
        emergency_type: &str,
        details: Value,
    ) -> std::result::Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("handle_emergency")
            .with("emergency_type", emergency_type)
            .with("details", details);
        self.executor.execute(request).await
    }
}

#[async_trait]
impl Agent for FarmManager {
    fn identity(&self) -> AgentIdentity {
        AgentIdentity::FarmManager
    }

    fn operations(&self) -> &'static [Operation] {
        &OPERATIONS
    }

    fn endpoints(&self) -> Vec<String> {
        let prefix = self.identity().route_prefix();
        std::iter::once(format!("{prefix}{COORDINATE_ROUTE}"))
            .chain(OPERATIONS.iter().map(|op| format!("{prefix}{}", op.route)))
            .collect()
    }

    async fn dispatch(&self, request: CapabilityRequest) -> std::result::Result<ResponseEnvelope, OperationError> {
        if request.operation != COORDINATE_OPERATION {
            return self.executor.execute(request).await;
        }

        let CapabilityRequest { mut fields, .. } = request;
        let query = match fields.remove("query") {
            Some(Value::String(query)) => query,
            Some(Value::Null) | None => {
                return Err(OperationError::MissingField {
                    operation: COORDINATE_OPERATION.to_string(),
                    field: "query".to_string(),
                });
            }
            Some(_) => {
                return Err(OperationError::InvalidField {
                    field: "query".to_string(),
                    reason: "expected a string".to_string(),
                });
            }
        };
        let context = fields.remove("context").unwrap_or(Value::Null);
        self.coordinate_agents(&query, context).await
    }
}
