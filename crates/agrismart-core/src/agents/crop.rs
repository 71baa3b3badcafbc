//! Crop health agent.

use std::sync::Arc;

use agrismart_abstraction::{Model, ModelParameters};
use async_trait::async_trait;
use serde_json::Value;

use super::envelope::ResponseEnvelope;
use super::identity::AgentIdentity;
use super::operation::{Agent, CapabilityRequest, EnvelopeKey, Operation, OperationError, OperationExecutor};
use crate::prompts::crop as prompts;

/// Multipart variant of `analyze_crop_image`, served by the transport.
pub const UPLOAD_ROUTE: &str = "/upload-image";

pub static OPERATIONS: [Operation; 4] = [
    Operation {
        name: "analyze_crop_image",
        route: "/analyze-image",
        template: prompts::ANALYZE_CROP_IMAGE,
        required: &["image_data", "crop_type"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Payload("analysis")],
        nest: None,
        image_field: Some("image_data"),
        derive: None,
    },
    Operation {
        name: "identify_disease",
        route: "/identify-disease",
        template: prompts::IDENTIFY_DISEASE,
        required: &["symptoms", "crop_type"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Payload("diagnosis")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "assess_nutrient_deficiency",
        route: "/nutrient-assessment",
        template: prompts::NUTRIENT_DEFICIENCY,
        required: &["observations", "crop_type"],
        defaults: &[],
        layout: &[EnvelopeKey::Echo("crop_type"), EnvelopeKey::Payload("assessment")],
        nest: None,
        image_field: None,
        derive: None,
    },
    Operation {
        name: "recommend_crop_rotation",
        route: "/rotation-recommendation",
        template: prompts::CROP_ROTATION,
        required: &["current_crop", "soil_condition", "previous_crops"],
        defaults: &[],
        layout: &[EnvelopeKey::Payload("recommendations")],
        nest: None,
        image_field: None,
        derive: None,
    },
];

/// Crop health: image diagnosis, diseases, nutrients, rotation.
#[derive(Debug, Clone)]
pub struct CropAnalyzer {
    executor: OperationExecutor,
}

impl CropAnalyzer {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { executor: OperationExecutor::new(AgentIdentity::CropAnalyzer, model, &OPERATIONS) }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<ModelParameters>) -> Self {
        self.executor = self.executor.with_parameters(parameters);
        self
    }

    /// Analyzes a crop photo.
    ///
    /// `image_data` is either a remote locator (`http...`) or base64 bytes,
    /// optionally as a `data:` URL. Undecodable bytes produce an error envelope.
    pub async fn analyze_crop_image(
        &self,
        image_data: &str,
        crop_type: &str,
        additional_info: Option<&str>,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("analyze_crop_image")
            .with("image_data", image_data)
            .with("crop_type", crop_type)
            .with_optional("additional_info", additional_info);
        self.executor.execute(request).await
    }

    pub async fn identify_disease(&self, symptoms: &str, crop_type: &str) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("identify_disease")
            .with("symptoms", symptoms)
            .with("crop_type", crop_type);
        self.executor.execute(request).await
    }

    pub async fn assess_nutrient_deficiency(
        &self,
        observations: Value,
        crop_type: &str,
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("assess_nutrient_deficiency")
            .with("observations", observations)
            .with("crop_type", crop_type);
        self.executor.execute(request).await
    }

    pub async fn recommend_crop_rotation(
        &self,
        current_crop: &str,
        soil_condition: &str,
        previous_crops: &[String],
    ) -> Result<ResponseEnvelope, OperationError> {
        let request = CapabilityRequest::new("recommend_crop_rotation")
            .with("current_crop", current_crop)
            .with("soil_condition", soil_condition)
            .with("previous_crops", previous_crops.to_vec());
        self.executor.execute(request).await
    }
}

#[async_trait]
impl Agent for CropAnalyzer {
    fn identity(&self) -> AgentIdentity {
        AgentIdentity::CropAnalyzer
    }

    fn operations(&self) -> &'static [Operation] {
        &OPERATIONS
    }

    fn endpoints(&self) -> Vec<String> {
        let prefix = self.identity().route_prefix();
        let mut endpoints: Vec<String> = OPERATIONS.iter().map(|op| format!("{prefix}{}", op.route)).collect();
        endpoints.insert(1, format!("{prefix}{UPLOAD_ROUTE}"));
        endpoints
    }

    async fn dispatch(&self, request: CapabilityRequest) -> Result<ResponseEnvelope, OperationError> {
        self.executor.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrismart_abstraction::{ContentPart, ModelError};
    use agrismart_models::MockModel;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn analyzer(reply: &str) -> (CropAnalyzer, Arc<MockModel>) {
        let model = Arc::new(MockModel::with_reply(reply));
        (CropAnalyzer::new(model.clone()), model)
    }

    #[tokio::test]
    async fn test_remote_image_uses_file_uri() {
        let (agent, model) = analyzer("healthy");
        let envelope =
            agent.analyze_crop_image("https://cdn.example.com/talhao.jpg", "Soja", None).await.unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({"status": "success", "agent": "crop_analyzer", "crop_type": "Soja", "analysis": "healthy"})
        );

        let parts = model.requests().pop().unwrap();
        assert_eq!(
            parts[0],
            ContentPart::FileUri {
                mime_type: "image/jpeg".to_string(),
                uri: "https://cdn.example.com/talhao.jpg".to_string()
            }
        );
        assert!(parts[1].as_text().unwrap().contains("None provided"));
    }

    #[tokio::test]
    async fn test_inline_image_is_decoded() {
        let (agent, model) = analyzer("rust spots");
        let encoded = STANDARD.encode(b"\xFF\xD8\xFF\xE0 jpeg body");
        agent.analyze_crop_image(&encoded, "Café", Some("folhas amareladas")).await.unwrap();

        let parts = model.requests().pop().unwrap();
        match &parts[0] {
            ContentPart::InlineData { mime_type, data } => {
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(data.as_slice(), b"\xFF\xD8\xFF\xE0 jpeg body");
            }
            other => panic!("Expected inline data, got {other:?}"),
        }
        assert!(parts[1].as_text().unwrap().contains("folhas amareladas"));
    }

    #[tokio::test]
    async fn test_malformed_image_is_error_envelope() {
        let (agent, model) = analyzer("unused");
        let envelope = agent.analyze_crop_image("not base64 at all ###", "Soja", None).await.unwrap();
        assert_eq!(envelope.status(), "error");
        assert!(envelope.error().unwrap().contains("inline image"));
        assert_eq!(envelope.get("analysis"), None);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_operations() {
        let (agent, model) = analyzer("result");
        let diagnosis = agent.identify_disease("manchas marrons", "Soja").await.unwrap();
        assert_eq!(diagnosis.get("diagnosis"), Some(&json!("result")));

        let assessment = agent.assess_nutrient_deficiency(json!({"leaf_color": "yellow"}), "Milho").await.unwrap();
        assert_eq!(assessment.get("assessment"), Some(&json!("result")));
        assert!(model.last_prompt().unwrap().contains("yellow"));

        let rotation = agent
            .recommend_crop_rotation("Soja", "argiloso", &["Milho".to_string(), "Trigo".to_string()])
            .await
            .unwrap();
        assert_eq!(
            rotation.to_value(),
            json!({"status": "success", "agent": "crop_analyzer", "recommendations": "result"})
        );
        assert!(model.last_prompt().unwrap().contains("Milho, Trigo"));
    }

    #[tokio::test]
    async fn test_empty_previous_crops_render_none() {
        let (agent, model) = analyzer("result");
        agent.recommend_crop_rotation("Soja", "arenoso", &[]).await.unwrap();
        assert!(model.last_prompt().unwrap().contains("None"));
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let agent = CropAnalyzer::new(Arc::new(MockModel::failing(ModelError::ModelResponseError(
            "no candidates".to_string(),
        ))));
        let envelope = agent.identify_disease("wilting", "Feijão").await.unwrap();
        assert_eq!(
            envelope.to_value(),
            json!({
                "status": "error",
                "agent": "crop_analyzer",
                "error": "Model Response Error: no candidates"
            })
        );
    }
}
