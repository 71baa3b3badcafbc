//! `/api/water/*`

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::agents::ResponseEnvelope;
use crate::server::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct IrrigationScheduleRequest {
    pub crop_type: String,
    pub field_size: f64,
    pub soil_type: String,
    pub climate_data: Map<String, Value>,
    pub water_availability: String,
}

#[derive(Debug, Deserialize)]
pub struct WaterEfficiencyRequest {
    pub water_used: f64,
    pub field_size: f64,
    pub crop_yield: f64,
    pub crop_type: String,
}

#[derive(Debug, Deserialize)]
pub struct IrrigationIssuesRequest {
    pub sensor_data: Map<String, Value>,
    pub irrigation_system: String,
}

#[derive(Debug, Deserialize)]
pub struct IrrigationTechnologyRequest {
    pub farm_details: Map<String, Value>,
    pub budget: String,
    pub water_source: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/irrigation-schedule", post(irrigation_schedule))
        .route("/efficiency", post(efficiency))
        .route("/detect-issues", post(detect_issues))
        .route("/technology-recommendation", post(technology_recommendation))
}

async fn irrigation_schedule(
    State(state): State<AppState>,
    Json(req): Json<IrrigationScheduleRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .water()
        .create_irrigation_schedule(
            &req.crop_type,
            req.field_size,
            &req.soil_type,
            Value::Object(req.climate_data),
            &req.water_availability,
        )
        .await?;
    Ok(Json(envelope))
}

async fn efficiency(
    State(state): State<AppState>,
    Json(req): Json<WaterEfficiencyRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .water()
        .calculate_water_efficiency(req.water_used, req.field_size, req.crop_yield, &req.crop_type)
        .await?;
    Ok(Json(envelope))
}

async fn detect_issues(
    State(state): State<AppState>,
    Json(req): Json<IrrigationIssuesRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .water()
        .detect_irrigation_issues(Value::Object(req.sensor_data), &req.irrigation_system)
        .await?;
    Ok(Json(envelope))
}

async fn technology_recommendation(
    State(state): State<AppState>,
    Json(req): Json<IrrigationTechnologyRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .water()
        .recommend_irrigation_technology(Value::Object(req.farm_details), &req.budget, &req.water_source)
        .await?;
    Ok(Json(envelope))
}
