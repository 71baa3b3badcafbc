//! `/api/crop/*`

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::agents::ResponseEnvelope;
use crate::agents::crop::UPLOAD_ROUTE;
use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};

/// Largest accepted image upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Body limit of the JSON image route: a base64 image of `MAX_UPLOAD_BYTES`
/// plus room for the other fields.
pub const MAX_INLINE_IMAGE_BODY_BYTES: usize = MAX_UPLOAD_BYTES.div_ceil(3) * 4 + 64 * 1024;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct CropImageAnalysisRequest {
    pub image_data: String,
    pub crop_type: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default = "unknown_crop")]
    pub crop_type: String,
}

fn unknown_crop() -> String {
    "unknown".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DiseaseIdentificationRequest {
    pub symptoms: String,
    pub crop_type: String,
}

#[derive(Debug, Deserialize)]
pub struct NutrientAssessmentRequest {
    pub observations: Map<String, Value>,
    pub crop_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CropRotationRequest {
    pub current_crop: String,
    pub soil_condition: String,
    pub previous_crops: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze-image", post(analyze_image).layer(DefaultBodyLimit::max(MAX_INLINE_IMAGE_BODY_BYTES)))
        .route(UPLOAD_ROUTE, post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
        .route("/identify-disease", post(identify_disease))
        .route("/nutrient-assessment", post(nutrient_assessment))
        .route("/rotation-recommendation", post(rotation_recommendation))
}

async fn analyze_image(
    State(state): State<AppState>,
    Json(req): Json<CropImageAnalysisRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .crop()
        .analyze_crop_image(&req.image_data, &req.crop_type, req.additional_info.as_deref())
        .await?;
    Ok(Json(envelope))
}

/// Multipart upload: the `file` part is base64-encoded and analyzed.
async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<ResponseEnvelope>> {
    let mut contents = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::BadRequest(e.body_text()))? {
        if field.name() == Some(UPLOAD_FIELD) {
            contents = Some(field.bytes().await.map_err(|e| ApiError::BadRequest(e.body_text()))?);
            break;
        }
    }
    let contents =
        contents.ok_or_else(|| ApiError::BadRequest(format!("Missing multipart field '{UPLOAD_FIELD}'")))?;
    debug!(bytes = contents.len(), crop_type = %query.crop_type, "Received crop image upload");

    let encoded = STANDARD.encode(&contents);
    let envelope = state.farm_manager.crop().analyze_crop_image(&encoded, &query.crop_type, None).await?;
    Ok(Json(envelope))
}

async fn identify_disease(
    State(state): State<AppState>,
    Json(req): Json<DiseaseIdentificationRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state.farm_manager.crop().identify_disease(&req.symptoms, &req.crop_type).await?;
    Ok(Json(envelope))
}

async fn nutrient_assessment(
    State(state): State<AppState>,
    Json(req): Json<NutrientAssessmentRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .crop()
        .assess_nutrient_deficiency(Value::Object(req.observations), &req.crop_type)
        .await?;
    Ok(Json(envelope))
}

async fn rotation_recommendation(
    State(state): State<AppState>,
    Json(req): Json<CropRotationRequest>,
) -> ApiResult<Json<ResponseEnvelope>> {
    let envelope = state
        .farm_manager
        .crop()
        .recommend_crop_rotation(&req.current_crop, &req.soil_condition, &req.previous_crops)
        .await?;
    Ok(Json(envelope))
}
