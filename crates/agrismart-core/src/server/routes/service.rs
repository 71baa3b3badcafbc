//! Service metadata: `/`, `/health` and the agent catalogue.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Value, json};

use crate::agents::{Agent, AgentIdentity};
use crate::server::AppState;

pub const SERVICE_NAME: &str = "AgriSmart Brasil API";
pub const HEALTH_SERVICE: &str = "agrismart-brasil";

/// One entry of `GET /api/agents`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentCatalogue {
    pub agents: Vec<AgentInfo>,
}

pub async fn root() -> Json<Value> {
    let agents: Vec<&str> = AgentIdentity::ALL.iter().map(|identity| identity.as_str()).collect();
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "docs": "/api/agents",
        "agents": agents,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": HEALTH_SERVICE }))
}

pub async fn list_agents(State(state): State<AppState>) -> Json<AgentCatalogue> {
    let agents = AgentIdentity::ALL
        .iter()
        .map(|&identity| AgentInfo {
            name: identity.as_str(),
            description: identity.description(),
            endpoints: state.farm_manager.agent(identity).endpoints(),
        })
        .collect();
    Json(AgentCatalogue { agents })
}
