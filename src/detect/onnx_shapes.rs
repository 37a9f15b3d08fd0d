/// ONNX inference for shape-region detection.
///
/// Loads a YOLO-style model trained on UI shape primitives (rectangles and
/// circles) and runs it on screenshot bytes. Detection is disabled
/// gracefully when the model file is missing.
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::config::DetectionConfig;
use crate::detect::traits::ShapeDetector;
use crate::detect::types::{ShapeKind, ShapeRegion};
use crate::errors::{ScreenLensError, ScreenLensResult};
use crate::layout::geometry::BoundingBox;

/// Class order the shape model was trained with.
const CLASS_KINDS: [ShapeKind; 2] = [ShapeKind::Rectangle, ShapeKind::Circle];

/// Raw detection before NMS, in original pixel space.
#[derive(Debug, Clone)]
struct RawDetection {
    bbox: [f32; 4], // [x1, y1, x2, y2]
    confidence: f32,
    class_id: usize,
}

/// Holds the ONNX Runtime session and inference configuration.
/// The session is behind a mutex because `run` needs exclusive access.
pub struct OnnxShapeDetector {
    session: Mutex<Session>,
    input_size: u32,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl OnnxShapeDetector {
    /// Try to construct a detector. Returns `None` if the model file does
    /// not exist — the pipeline then runs with zero shape regions.
    pub fn try_new(cfg: &DetectionConfig) -> Option<Self> {
        if !Path::new(&cfg.model_path).exists() {
            tracing::warn!(path = %cfg.model_path, "shape model not found — detection disabled");
            return None;
        }
        match Self::build(cfg) {
            Ok(det) => {
                tracing::info!(path = %cfg.model_path, "shape model loaded");
                Some(det)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load shape model");
                None
            }
        }
    }

    fn build(cfg: &DetectionConfig) -> ScreenLensResult<Self> {
        let session = Session::builder()
            .map_err(|e| ScreenLensError::Detection(format!("ort session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ScreenLensError::Detection(format!("ort opt-level: {e}")))?
            .commit_from_file(&cfg.model_path)
            .map_err(|e| ScreenLensError::Detection(format!("ort load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
            input_size: 640,
            conf_threshold: cfg.conf_threshold,
            iou_threshold: cfg.iou_threshold,
        })
    }

    fn detect_sync(&self, image_bytes: &[u8]) -> ScreenLensResult<Vec<ShapeRegion>> {
        let img = image::load_from_memory(image_bytes)
            .map_err(|e| ScreenLensError::Detection(format!("image load: {e}")))?;
        let (orig_w, orig_h) = (img.width(), img.height());

        let (input_tensor, pad_x, pad_y, scale) = self.preprocess(&img);

        let input_value = Tensor::from_array(input_tensor)
            .map_err(|e| ScreenLensError::Detection(format!("ort tensor: {e}")))?;

        let output_owned = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ScreenLensError::Detection("session lock poisoned".into()))?;
            let outputs = session
                .run(ort::inputs![input_value])
                .map_err(|e| ScreenLensError::Detection(format!("ort run: {e}")))?;

            outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| ScreenLensError::Detection(format!("extract tensor: {e}")))?
                .to_owned()
        };

        let raw = self.postprocess(&output_owned.view(), orig_w, orig_h, pad_x, pad_y, scale)?;
        tracing::debug!(count = raw.len(), "shape detections after NMS");
        Ok(raw.into_iter().map(to_region).collect())
    }

    // ── Pre-processing ──────────────────────────────────────────────────────

    /// Resize + letterbox + normalise → NCHW f32 tensor.
    fn preprocess(&self, img: &image::DynamicImage) -> (Array4<f32>, f32, f32, f32) {
        let sz = self.input_size;
        let (ow, oh) = (img.width() as f32, img.height() as f32);
        let scale = (sz as f32 / ow).min(sz as f32 / oh);
        let nw = (ow * scale).round() as u32;
        let nh = (oh * scale).round() as u32;
        let pad_x = (sz - nw) as f32 / 2.0;
        let pad_y = (sz - nh) as f32 / 2.0;

        let resized = img.resize_exact(nw, nh, image::imageops::FilterType::CatmullRom);
        let rgb = resized.to_rgb8();

        let mut canvas = image::RgbImage::from_pixel(sz, sz, image::Rgb([114, 114, 114]));
        image::imageops::overlay(&mut canvas, &rgb, pad_x.round() as i64, pad_y.round() as i64);

        // HWC → NCHW normalised [0, 1]
        let mut tensor = Array4::<f32>::zeros((1, 3, sz as usize, sz as usize));
        for y in 0..sz {
            for x in 0..sz {
                let p = canvas.get_pixel(x, y);
                tensor[[0, 0, y as usize, x as usize]] = p[0] as f32 / 255.0;
                tensor[[0, 1, y as usize, x as usize]] = p[1] as f32 / 255.0;
                tensor[[0, 2, y as usize, x as usize]] = p[2] as f32 / 255.0;
            }
        }

        (tensor, pad_x, pad_y, scale)
    }

    // ── Post-processing ─────────────────────────────────────────────────────

    fn postprocess(
        &self,
        output: &ndarray::ArrayViewD<f32>,
        orig_w: u32,
        orig_h: u32,
        pad_x: f32,
        pad_y: f32,
        scale: f32,
    ) -> ScreenLensResult<Vec<RawDetection>> {
        // YOLO output layout: [1, 4 + num_classes, num_proposals]
        let shape = output.shape();
        if shape.len() < 3 {
            return Err(ScreenLensError::Detection(format!(
                "unexpected output shape: {:?}",
                shape
            )));
        }
        let num_classes = shape[1] - 4;
        let num_preds = shape[2];

        let mut detections: Vec<RawDetection> = Vec::new();

        for i in 0..num_preds {
            let cx = output[[0, 0, i]];
            let cy = output[[0, 1, i]];
            let w = output[[0, 2, i]];
            let h = output[[0, 3, i]];

            let mut max_score = 0.0f32;
            let mut max_class = 0usize;
            for c in 0..num_classes {
                let s = output[[0, 4 + c, i]];
                if s > max_score {
                    max_score = s;
                    max_class = c;
                }
            }
            if max_score < self.conf_threshold {
                continue;
            }

            // Undo letterbox → original pixel space, clamped to image bounds
            let x1 = (((cx - w / 2.0) - pad_x) / scale).clamp(0.0, orig_w as f32);
            let y1 = (((cy - h / 2.0) - pad_y) / scale).clamp(0.0, orig_h as f32);
            let x2 = (((cx + w / 2.0) - pad_x) / scale).clamp(0.0, orig_w as f32);
            let y2 = (((cy + h / 2.0) - pad_y) / scale).clamp(0.0, orig_h as f32);

            detections.push(RawDetection {
                bbox: [x1, y1, x2, y2],
                confidence: max_score,
                class_id: max_class,
            });
        }

        let kept = nms(&detections, self.iou_threshold);
        Ok(kept.into_iter().map(|i| detections[i].clone()).collect())
    }
}

#[async_trait]
impl ShapeDetector for OnnxShapeDetector {
    async fn detect(&self, image_bytes: &[u8]) -> ScreenLensResult<Vec<ShapeRegion>> {
        // Inference is CPU-bound; keep it off the async reactor.
        tokio::task::block_in_place(|| self.detect_sync(image_bytes))
    }
}

// ── Utilities ────────────────────────────────────────────────────────────────

/// Greedy per-class NMS. Returns indices of kept detections.
fn nms(dets: &[RawDetection], iou_threshold: f32) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..dets.len()).collect();
    indices.sort_by(|&a, &b| {
        dets[b]
            .confidence
            .partial_cmp(&dets[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for &i in &indices {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &indices {
            if suppressed[j] || i == j {
                continue;
            }
            if dets[i].class_id == dets[j].class_id
                && box_iou(&dets[i].bbox, &dets[j].bbox) > iou_threshold
            {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn box_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

fn to_region(det: RawDetection) -> ShapeRegion {
    let [x1, y1, x2, y2] = det.bbox;
    ShapeRegion {
        bbox: BoundingBox::new(x1 as i32, y1 as i32, (x2 - x1) as i32, (y2 - y1) as i32),
        shape: CLASS_KINDS
            .get(det.class_id)
            .copied()
            .unwrap_or(ShapeKind::Other),
        confidence: det.confidence as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(bbox: [f32; 4], confidence: f32, class_id: usize) -> RawDetection {
        RawDetection {
            bbox,
            confidence,
            class_id,
        }
    }

    #[test]
    fn nms_keeps_the_higher_confidence_overlap() {
        let dets = vec![
            det([0.0, 0.0, 100.0, 100.0], 0.9, 0),
            det([2.0, 2.0, 102.0, 102.0], 0.6, 0),
        ];
        let kept = nms(&dets, 0.45);
        assert_eq!(kept, vec![0]);
    }

    #[test]
    fn nms_ignores_overlap_across_classes() {
        let dets = vec![
            det([0.0, 0.0, 100.0, 100.0], 0.9, 0),
            det([0.0, 0.0, 100.0, 100.0], 0.6, 1),
        ];
        let kept = nms(&dets, 0.45);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn unknown_class_id_becomes_other() {
        let region = to_region(det([0.0, 0.0, 10.0, 10.0], 0.5, 7));
        assert_eq!(region.shape, ShapeKind::Other);
    }

    #[test]
    fn region_bbox_is_pixel_space_width_height() {
        let region = to_region(det([10.0, 20.0, 110.0, 60.0], 0.5, 0));
        assert_eq!(region.bbox, BoundingBox::new(10, 20, 100, 40));
        assert_eq!(region.shape, ShapeKind::Rectangle);
    }
}
