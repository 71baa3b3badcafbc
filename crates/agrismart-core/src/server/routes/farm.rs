//! `/api/farm/*`

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::agents::ResponseEnvelope;
use crate::server::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct DailyBriefingRequest {
    pub farm_data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct AgentQueryRequest {
    pub query: String,
    pub context: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ActionPlanRequest {
    pub goal: String,
    pub timeframe: String,
    pub farm_status: Map<String, Value>,
    #[serde(default)]
    pub constraints: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceAnalysisRequest {
    pub performance_data: Map<String, Value>,
    pub period: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyRequest {
    pub emergency_type: String,
    pub details: Map<String, Value>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily-briefing", post(daily_briefing))
        .route("/query", post(query))
        .route("/action-plan", post(action_plan))
        .route("/performance", post(performance))
        .route("/emergency", post(emergency))
}

async fn daily_briefing(
    State(state): State<AppState>,
    Json(req): Json<DailyBriefingRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state.farm_manager.get_daily_briefing(Value::Object(req.farm_data)).await?;
    Ok(Json(envelope))
}

async fn query(State(state): State<AppState>, Json(req): Json<AgentQueryRequest>) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state.farm_manager.coordinate_agents(&req.query, Value::Object(req.context)).await?;
    Ok(Json(envelope))
}

async fn action_plan(
    State(state): State<AppState>,
    Json(req): Json<ActionPlanRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .create_action_plan(&req.goal, &req.timeframe, Value::Object(req.farm_status), req.constraints.as_deref())
        .await?;
    Ok(Json(envelope))
}

async fn performance(
    State(state): State<AppState>,
    Json(req): Json<PerformanceAnalysisRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope =
        state.farm_manager.analyze_farm_performance(Value::Object(req.performance_data), &req.period).await?;
    Ok(Json(envelope))
}

async fn emergency(
    State(state): State<AppState>,
    Json(req): Json<EmergencyRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state.farm_manager.handle_emergency(&req.emergency_type, Value::Object(req.details)).await?;
    Ok(Json(envelope))
}
