use async_trait::async_trait;

use crate::detect::types::{ShapeRegion, TextRegion};
use crate::errors::ScreenLensResult;

/// Strategy trait for shape detection engines.
/// Given raw screenshot bytes, return candidate shape regions with
/// pixel-space bounding boxes and confidences.
#[async_trait]
pub trait ShapeDetector: Send + Sync {
    async fn detect(&self, image_bytes: &[u8]) -> ScreenLensResult<Vec<ShapeRegion>>;
}

/// Strategy trait for text recognition engines.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image_bytes: &[u8]) -> ScreenLensResult<Vec<TextRegion>>;
}
