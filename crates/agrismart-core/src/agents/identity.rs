//! Agent identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::operation::OperationError;

/// The fixed set of agents. Serialized in snake_case; used as the routing
/// key and as the `agent` tag of every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentIdentity {
    ClimateMonitor,
    CropAnalyzer,
    WaterOptimizer,
    YieldPredictor,
    FarmManager,
}

impl AgentIdentity {
    /// Every identity, coordinator last.
    pub const ALL: [Self; 5] = [
        Self::ClimateMonitor,
        Self::CropAnalyzer,
        Self::WaterOptimizer,
        Self::YieldPredictor,
        Self::FarmManager,
    ];

    /// The capability agents the coordinator can route to.
    pub const SPECIALISTS: [Self; 4] =
        [Self::ClimateMonitor, Self::CropAnalyzer, Self::WaterOptimizer, Self::YieldPredictor];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClimateMonitor => "climate_monitor",
            Self::CropAnalyzer => "crop_analyzer",
            Self::WaterOptimizer => "water_optimizer",
            Self::YieldPredictor => "yield_predictor",
            Self::FarmManager => "farm_manager",
        }
    }

    /// One-line description for the agent catalogue.
    pub fn description(self) -> &'static str {
        match self {
            Self::ClimateMonitor => "Monitors weather and climate conditions",
            Self::CropAnalyzer => "Analyzes crop health and diseases",
            Self::WaterOptimizer => "Optimizes water usage and irrigation",
            Self::YieldPredictor => "Predicts yields and optimizes market timing",
            Self::FarmManager => "Coordinates all agents for comprehensive farm management",
        }
    }

    /// Topics the routing prompt lists for this agent.
    pub fn routing_hint(self) -> &'static str {
        match self {
            Self::ClimateMonitor => "Weather, climate analysis, irrigation timing",
            Self::CropAnalyzer => "Crop health, diseases, nutrient analysis",
            Self::WaterOptimizer => "Irrigation scheduling, water efficiency",
            Self::YieldPredictor => "Yield forecasting, market timing, planting schedules",
            Self::FarmManager => "Daily briefings, action plans, performance, emergencies",
        }
    }

    /// Path prefix of the agent's HTTP routes, below `/api`.
    pub fn route_prefix(self) -> &'static str {
        match self {
            Self::ClimateMonitor => "/climate",
            Self::CropAnalyzer => "/crop",
            Self::WaterOptimizer => "/water",
            Self::YieldPredictor => "/yield",
            Self::FarmManager => "/farm",
        }
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentIdentity {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|identity| identity.as_str() == s)
            .ok_or_else(|| OperationError::UnknownAgent(s.to_string()))
    }
}
