//! `/api/yield/*`

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::agents::ResponseEnvelope;
use crate::server::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct YieldPredictionRequest {
    pub crop_type: String,
    pub field_size: f64,
    pub planting_date: String,
    pub current_conditions: Map<String, Value>,
    #[serde(default)]
    pub historical_data: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Deserialize)]
pub struct YieldGapAnalysisRequest {
    pub actual_yield: f64,
    pub potential_yield: f64,
    pub crop_type: String,
    pub farming_practices: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct MarketTimingRequest {
    pub crop_type: String,
    pub expected_harvest_date: String,
    pub expected_quantity: f64,
    pub market_data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PlantingScheduleRequest {
    pub crops: Vec<String>,
    pub field_size: f64,
    pub climate_zone: String,
    pub objectives: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/gap-analysis", post(gap_analysis))
        .route("/market-timing", post(market_timing))
        .route("/planting-schedule", post(planting_schedule))
}

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<YieldPredictionRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let history = req.historical_data.map(|seasons| seasons.into_iter().map(Value::Object).collect());
    let envelope = state
        .farm_manager
        .yields()
        .predict_yield(
            &req.crop_type,
            req.field_size,
            &req.planting_date,
            Value::Object(req.current_conditions),
            history,
        )
        .await?;
    Ok(Json(envelope))
}

async fn gap_analysis(
    State(state): State<AppState>,
    Json(req): Json<YieldGapAnalysisRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .yields()
        .analyze_yield_gaps(
            req.actual_yield,
            req.potential_yield,
            &req.crop_type,
            Value::Object(req.farming_practices),
        )
        .await?;
    Ok(Json(envelope))
}

async fn market_timing(
    State(state): State<AppState>,
    Json(req): Json<MarketTimingRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .yields()
        .forecast_market_timing(
            &req.crop_type,
            &req.expected_harvest_date,
            req.expected_quantity,
            Value::Object(req.market_data),
        )
        .await?;
    Ok(Json(envelope))
}

async fn planting_schedule(
    State(state): State<AppState>,
    Json(req): Json<PlantingScheduleRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .yields()
        .optimize_planting_schedule(&req.crops, req.field_size, &req.climate_zone, &req.objectives)
        .await?;
    Ok(Json(envelope))
}
