/// Remote OCR client.
///
/// Text recognition is delegated to an external OCR service: the screenshot
/// is POSTed as a base64 payload and the service returns candidate text
/// regions with bounding polygons, recognized strings, and confidences.
use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use crate::config::OcrConfig;
use crate::detect::traits::TextRecognizer;
use crate::detect::types::TextRegion;
use crate::errors::{ScreenLensError, ScreenLensResult};

#[derive(Debug, Deserialize)]
struct OcrResponse {
    regions: Vec<TextRegion>,
}

pub struct RemoteTextRecognizer {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteTextRecognizer {
    /// Returns `None` when no endpoint is configured — recognition is then
    /// disabled and the pipeline runs with zero text regions.
    pub fn from_config(cfg: &OcrConfig) -> Option<Self> {
        let endpoint = match &cfg.endpoint {
            Some(url) => url.clone(),
            None => {
                tracing::warn!("no OCR endpoint configured — text recognition disabled");
                return None;
            }
        };

        let client = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "failed to build OCR client — text recognition disabled");
                return None;
            }
        };

        tracing::info!(endpoint = %endpoint, "OCR client ready");
        Some(Self { endpoint, client })
    }
}

#[async_trait]
impl TextRecognizer for RemoteTextRecognizer {
    async fn recognize(&self, image_bytes: &[u8]) -> ScreenLensResult<Vec<TextRegion>> {
        let payload = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image_bytes),
        });

        tracing::debug!(endpoint = %self.endpoint, bytes = image_bytes.len(), "sending OCR request");

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScreenLensError::Recognition(format!("{status}: {body}")));
        }

        let parsed: OcrResponse = response.json().await?;
        tracing::debug!(regions = parsed.regions.len(), "OCR regions received");
        Ok(parsed.regions)
    }
}
