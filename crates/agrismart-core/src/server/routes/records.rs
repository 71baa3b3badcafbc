//! Farm records: farms, crops, analyses, sensor readings, irrigation
//! schedules and alerts, backed by the document store.

// Handlers are async for axum even though the store is synchronous.
#![allow(clippy::unused_async)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::storage::documents::{Body, DEFAULT_ANALYSES_LIMIT, DEFAULT_SENSOR_HOURS};
use crate::storage::{Collection, DocumentRepository};

#[derive(Debug, Default, Deserialize)]
pub struct FarmListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysesQuery {
    #[serde(rename = "type")]
    pub analysis_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SensorQuery {
    pub sensor_type: Option<String>,
    pub hours: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Body of `POST /api/farms/:farm_id/analyses`.
#[derive(Debug, Deserialize)]
pub struct NewAnalysis {
    #[serde(rename = "type")]
    pub analysis_type: String,
    #[serde(flatten)]
    pub data: Body,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farms", post(create_farm).get(list_farms))
        .route("/farms/:farm_id", get(get_farm).patch(update_farm))
        .route("/farms/:farm_id/crops", post(add_crop).get(get_crops))
        .route("/crops/:crop_id", patch(update_crop))
        .route("/farms/:farm_id/analyses", post(save_analysis).get(get_analyses))
        .route("/farms/:farm_id/sensor-data", post(save_sensor_data).get(get_sensor_data))
        .route("/farms/:farm_id/irrigation-schedules", post(save_irrigation_schedule))
        .route("/farms/:farm_id/irrigation-schedules/active", get(get_active_irrigation_schedule))
        .route("/farms/:farm_id/alerts", post(create_alert).get(get_alerts))
        .route("/alerts/:alert_id/read", post(mark_alert_read))
}

fn created(id: String) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

async fn create_farm(State(state): State<AppState>, Json(mut body): Json<Body>) -> ApiResult<(StatusCode, Json<Value>)> {
    let farm_id = match body.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(Value::String(_)) | None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(other) => return Err(ApiError::BadRequest(format!("Farm id must be a string, got {other}"))),
    };
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).create_farm(&farm_id, body)?;
    Ok(created(id))
}

async fn list_farms(State(state): State<AppState>, Query(query): Query<FarmListQuery>) -> ApiResult<Json<Vec<Body>>> {
    let db = state.lock_db()?;
    Ok(Json(DocumentRepository::new(&db).list_farms(query.user_id.as_deref())?))
}

async fn get_farm(State(state): State<AppState>, Path(farm_id): Path<String>) -> ApiResult<Json<Body>> {
    let db = state.lock_db()?;
    DocumentRepository::new(&db)
        .get_farm(&farm_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Farm {farm_id} not found")))
}

async fn update_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(updates): Json<Body>,
) -> ApiResult<Json<Body>> {
    let db = state.lock_db()?;
    let repo = DocumentRepository::new(&db);
    repo.update_farm(&farm_id, updates)?;
    repo.get_farm(&farm_id)?.map(Json).ok_or_else(|| ApiError::NotFound(format!("Farm {farm_id} not found")))
}

async fn add_crop(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(body): Json<Body>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).add_crop(&farm_id, body)?;
    Ok(created(id))
}

async fn get_crops(State(state): State<AppState>, Path(farm_id): Path<String>) -> ApiResult<Json<Vec<Body>>> {
    let db = state.lock_db()?;
    Ok(Json(DocumentRepository::new(&db).get_crops(&farm_id)?))
}

async fn update_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<String>,
    Json(updates): Json<Body>,
) -> ApiResult<Json<Body>> {
    let db = state.lock_db()?;
    let repo = DocumentRepository::new(&db);
    repo.update_crop(&crop_id, updates)?;
    repo.get(Collection::Crops, &crop_id)?
        .map(|doc| Json(doc.into_json()))
        .ok_or_else(|| ApiError::NotFound(format!("Crop {crop_id} not found")))
}

async fn save_analysis(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(analysis): Json<NewAnalysis>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut data = analysis.data;
    data.insert("farm_id".to_string(), Value::String(farm_id));
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).save_analysis(&analysis.analysis_type, data)?;
    Ok(created(id))
}

async fn get_analyses(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Query(query): Query<AnalysesQuery>,
) -> ApiResult<Json<Vec<Body>>> {
    let limit = query.limit.unwrap_or(DEFAULT_ANALYSES_LIMIT);
    let db = state.lock_db()?;
    Ok(Json(DocumentRepository::new(&db).get_analyses(&farm_id, query.analysis_type.as_deref(), limit)?))
}

async fn save_sensor_data(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(body): Json<Body>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).save_sensor_data(&farm_id, body)?;
    Ok(created(id))
}

async fn get_sensor_data(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Query(query): Query<SensorQuery>,
) -> ApiResult<Json<Vec<Body>>> {
    let hours = query.hours.unwrap_or(DEFAULT_SENSOR_HOURS);
    let db = state.lock_db()?;
    Ok(Json(DocumentRepository::new(&db).get_sensor_data(&farm_id, query.sensor_type.as_deref(), hours)?))
}

async fn save_irrigation_schedule(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(body): Json<Body>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).save_irrigation_schedule(&farm_id, body)?;
    Ok(created(id))
}

async fn get_active_irrigation_schedule(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
) -> ApiResult<Json<Body>> {
    let db = state.lock_db()?;
    DocumentRepository::new(&db)
        .get_active_irrigation_schedule(&farm_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No active irrigation schedule for farm {farm_id}")))
}

async fn create_alert(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Json(body): Json<Body>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let db = state.lock_db()?;
    let id = DocumentRepository::new(&db).create_alert(&farm_id, body)?;
    Ok(created(id))
}

async fn get_alerts(
    State(state): State<AppState>,
    Path(farm_id): Path<String>,
    Query(query): Query<AlertsQuery>,
) -> ApiResult<Json<Vec<Body>>> {
    let db = state.lock_db()?;
    Ok(Json(DocumentRepository::new(&db).get_alerts(&farm_id, query.unread_only)?))
}

async fn mark_alert_read(State(state): State<AppState>, Path(alert_id): Path<String>) -> ApiResult<StatusCode> {
    let db = state.lock_db()?;
    DocumentRepository::new(&db).mark_alert_read(&alert_id)?;
    Ok(StatusCode::NO_CONTENT)
}
