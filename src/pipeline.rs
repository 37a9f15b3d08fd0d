/// Analysis pipeline — integrates image decoding, the detection engines,
/// component classification, relationship mapping, and aggregation into a
/// single flow.
///
/// The pipeline never returns an error: a hard failure (unreadable image)
/// degrades to the confused sentinel layout, and an engine soft-failure
/// (missing model, unreachable OCR service) degrades to zero regions for
/// that engine.
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::detect::color;
use crate::detect::onnx_shapes::OnnxShapeDetector;
use crate::detect::remote_ocr::RemoteTextRecognizer;
use crate::detect::traits::{ShapeDetector, TextRecognizer};
use crate::detect::types::{ShapeRegion, TextRegion};
use crate::errors::ScreenLensResult;
use crate::layout::aggregator;
use crate::layout::classifier;
use crate::layout::mapper;
use crate::layout::types::Layout;

pub struct Analyzer {
    shape_detector: Option<Arc<dyn ShapeDetector>>,
    text_recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl Analyzer {
    pub fn new(
        shape_detector: Option<Arc<dyn ShapeDetector>>,
        text_recognizer: Option<Arc<dyn TextRecognizer>>,
    ) -> Self {
        Self {
            shape_detector,
            text_recognizer,
        }
    }

    /// Build an analyzer with whichever engines the config makes
    /// available. Either engine may be absent; the pipeline still runs.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let shape_detector = OnnxShapeDetector::try_new(&cfg.detection)
            .map(|d| Arc::new(d) as Arc<dyn ShapeDetector>);
        let text_recognizer = RemoteTextRecognizer::from_config(&cfg.ocr)
            .map(|r| Arc::new(r) as Arc<dyn TextRecognizer>);
        Self::new(shape_detector, text_recognizer)
    }

    /// Analyze a screenshot file. Always returns a layout; failures yield
    /// the confused sentinel instead of an error.
    pub async fn analyze_file(&self, path: &Path) -> Layout {
        match self.try_analyze_file(path).await {
            Ok(layout) => layout,
            Err(e) => {
                tracing::error!(error = %e, "analysis failed");
                Layout::confused(format!("Error analyzing screen: {e}"))
            }
        }
    }

    /// Analyze in-memory screenshot bytes (PNG or JPEG).
    pub async fn analyze_bytes(&self, image_bytes: &[u8]) -> Layout {
        match self.try_analyze_bytes(image_bytes).await {
            Ok(layout) => layout,
            Err(e) => {
                tracing::error!(error = %e, "analysis failed");
                Layout::confused(format!("Error analyzing screen: {e}"))
            }
        }
    }

    async fn try_analyze_file(&self, path: &Path) -> ScreenLensResult<Layout> {
        let image_bytes = tokio::fs::read(path).await?;
        self.try_analyze_bytes(&image_bytes).await
    }

    async fn try_analyze_bytes(&self, image_bytes: &[u8]) -> ScreenLensResult<Layout> {
        let image = image::load_from_memory(image_bytes)?;
        let screen_dimensions = (image.width(), image.height());

        let text_regions = self.recognize_text(image_bytes).await;
        let shape_regions = self.detect_shapes(image_bytes).await;

        tracing::debug!(
            text = text_regions.len(),
            shapes = shape_regions.len(),
            "raw detections"
        );

        let components = classifier::classify(&text_regions, &shape_regions, |bbox| {
            color::sample_dominant(&image, bbox)
        });
        let relationships = mapper::map_relationships(&components);

        Ok(aggregator::aggregate(
            components,
            relationships,
            screen_dimensions,
        ))
    }

    async fn detect_shapes(&self, image_bytes: &[u8]) -> Vec<ShapeRegion> {
        let Some(detector) = &self.shape_detector else {
            return Vec::new();
        };
        match detector.detect(image_bytes).await {
            Ok(regions) => {
                tracing::debug!(count = regions.len(), "shape regions");
                regions
            }
            Err(e) => {
                tracing::warn!(error = %e, "shape detection failed — continuing without");
                Vec::new()
            }
        }
    }

    async fn recognize_text(&self, image_bytes: &[u8]) -> Vec<TextRegion> {
        let Some(recognizer) = &self.text_recognizer else {
            return Vec::new();
        };
        match recognizer.recognize(image_bytes).await {
            Ok(regions) => {
                tracing::debug!(count = regions.len(), "text regions");
                regions
            }
            Err(e) => {
                tracing::warn!(error = %e, "text recognition failed — continuing without");
                Vec::new()
            }
        }
    }
}
