//! `/api/climate/*`

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::agents::ResponseEnvelope;
use crate::server::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ClimateAnalysisRequest {
    pub location: String,
    pub climate_data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct IrrigationRecommendationRequest {
    pub climate_data: Map<String, Value>,
    pub crop_type: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherImpactRequest {
    pub forecast_data: Map<String, Value>,
    pub crop_stage: String,
}

#[derive(Debug, Deserialize)]
pub struct FrostRiskRequest {
    pub location: String,
    pub min_temp_forecast: f64,
    pub crop_stage: String,
    #[serde(default)]
    pub crop_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DroughtAssessmentRequest {
    pub location: String,
    pub rainfall_history: Vec<f64>,
    pub soil_moisture: f64,
    #[serde(default)]
    pub crop_type: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/irrigation-recommendation", post(irrigation_recommendation))
        .route("/weather-impact", post(weather_impact))
        .route("/frost-risk", post(frost_risk))
        .route("/drought-assessment", post(drought_assessment))
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<ClimateAnalysisRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope =
        state.farm_manager.climate().analyze_climate(&req.location, Value::Object(req.climate_data)).await?;
    Ok(Json(envelope))
}

async fn irrigation_recommendation(
    State(state): State<AppState>,
    Json(req): Json<IrrigationRecommendationRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .climate()
        .get_irrigation_recommendation(Value::Object(req.climate_data), &req.crop_type)
        .await?;
    Ok(Json(envelope))
}

async fn weather_impact(
    State(state): State<AppState>,
    Json(req): Json<WeatherImpactRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .climate()
        .predict_weather_impact(Value::Object(req.forecast_data), &req.crop_stage)
        .await?;
    Ok(Json(envelope))
}

async fn frost_risk(State(state): State<AppState>, Json(req): Json<FrostRiskRequest>) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .climate()
        .get_frost_risk(&req.location, req.min_temp_forecast, &req.crop_stage, req.crop_type.as_deref())
        .await?;
    Ok(Json(envelope))
}

async fn drought_assessment(
    State(state): State<AppState>,
    Json(req): Json<DroughtAssessmentRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .climate()
        .drought_assessment(&req.location, &req.rainfall_history, req.soil_moisture, req.crop_type.as_deref())
        .await?;
    Ok(Json(envelope))
}
