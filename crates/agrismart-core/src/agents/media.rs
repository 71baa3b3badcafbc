//! Image sources for multimodal operations.

use agrismart_abstraction::{ContentPart, ModelError};
use agrismart_models::mime_utils;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type sent for remote images; the provider fetches and sniffs them itself.
pub const REMOTE_IMAGE_MIME: &str = "image/jpeg";

/// Where an image payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// A locator the provider fetches (`http...`).
    Remote(&'a str),
    /// Base64 text, optionally wrapped in a `data:` URL.
    Inline(&'a str),
}

impl<'a> ImageSource<'a> {
    /// Classifies a caller-supplied image string.
    ///
    /// Surrounding whitespace is ignored, so `" https://..."` is still remote.
    pub fn classify(image_data: &'a str) -> Self {
        let trimmed = image_data.trim();
        if trimmed.starts_with("http") {
            Self::Remote(trimmed)
        } else {
            Self::Inline(trimmed)
        }
    }

    /// Builds the request part for this source.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidMediaSource` when inline data is not valid base64.
    pub fn into_part(self) -> Result<ContentPart, ModelError> {
        match self {
            Self::Remote(uri) => {
                Ok(ContentPart::FileUri { mime_type: REMOTE_IMAGE_MIME.to_string(), uri: uri.to_string() })
            }
            Self::Inline(encoded) => {
                let payload = strip_data_url(encoded);
                let data = STANDARD.decode(payload).map_err(|e| ModelError::InvalidMediaSource {
                    media_source: format!("inline image ({} chars)", payload.len()),
                    reason: e.to_string(),
                })?;
                if data.is_empty() {
                    return Err(ModelError::InvalidMediaSource {
                        media_source: "inline image (0 chars)".to_string(),
                        reason: "image data is empty".to_string(),
                    });
                }
                let mime_type = mime_utils::image_mime_type(&data).to_string();
                Ok(ContentPart::InlineData { mime_type, data })
            }
        }
    }
}

/// `data:image/png;base64,AAAA` -> `AAAA`.
fn strip_data_url(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        if let Some((_, payload)) = encoded.split_once(";base64,") {
            return payload;
        }
    }
    encoded
}

/// Builds the request part for a caller-supplied image string.
///
/// # Errors
/// Returns `ModelError::InvalidMediaSource` when inline data is not valid base64.
pub fn image_part(image_data: &str) -> Result<ContentPart, ModelError> {
    ImageSource::classify(image_data).into_part()
}
