use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::VisionConfig;

/// Errors from the OCR vendor
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Vision request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Vision API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Vision API rejected the image: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<AnnotateItem<'a>>,
}

#[derive(Debug, Serialize)]
struct AnnotateItem<'a> {
    image: ImageContent<'a>,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize, Default)]
struct AnnotateResult {
    #[serde(rename = "fullTextAnnotation")]
    full_text: Option<FullTextAnnotation>,
    error: Option<VendorError>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    message: String,
}

/// OCR client: base64 image in, recognised text out
pub struct VisionClient {
    client: Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.api.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Run document text detection over a base64-encoded image
    pub async fn extract_text(&self, image_base64: &str) -> Result<String, VisionError> {
        let url = format!(
            "{}/images:annotate?key={}",
            self.config.api.base_url, self.config.api.api_key
        );

        let request = AnnotateRequest {
            requests: vec![AnnotateItem {
                image: ImageContent {
                    content: image_base64,
                },
                features: vec![Feature {
                    feature_type: "DOCUMENT_TEXT_DETECTION",
                }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(VisionError::Status(response.status()));
        }

        let body: AnnotateResponse = response.json().await?;
        let result = body.responses.into_iter().next().unwrap_or_default();

        if let Some(error) = result.error {
            return Err(VisionError::Rejected(error.message));
        }

        Ok(result.full_text.map(|t| t.text).unwrap_or_default())
    }
}
