//! Route tables. Agent routes take JSON bodies and answer with the
//! agent's response envelope; record routes front the document store.

pub mod climate;
pub mod crop;
pub mod farm;
pub mod records;
pub mod service;
pub mod water;
pub mod yields;

use axum::Router;
use axum::routing::get;

use super::AppState;
use crate::agents::AgentIdentity;

/// Everything mounted below `/api`.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/agents", get(service::list_agents))
        .nest(AgentIdentity::ClimateMonitor.route_prefix(), climate::router())
        .nest(AgentIdentity::CropAnalyzer.route_prefix(), crop::router())
        .nest(AgentIdentity::WaterOptimizer.route_prefix(), water::router())
        .nest(AgentIdentity::YieldPredictor.route_prefix(), yields::router())
        .nest(AgentIdentity::FarmManager.route_prefix(), farm::router())
        .merge(records::router())
}
