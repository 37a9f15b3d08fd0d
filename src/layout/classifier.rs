/// Component classification — turns raw shape/text regions into typed,
/// deduplicated `Component` records.
use uuid::Uuid;

use crate::detect::types::{ShapeKind, ShapeRegion, TextRegion};
use crate::layout::geometry::{iou, BoundingBox};
use crate::layout::types::{ColorInfo, Component, ComponentType};

/// Words that mark a text region as an actionable button.
const BUTTON_TRIGGER_WORDS: [&str; 4] = ["click", "submit", "cancel", "ok"];

/// Text wider than this many times its height is treated as an input field.
const TEXT_INPUT_ASPECT: i32 = 3;

/// Circles narrower than this are icons rather than round buttons.
const ICON_MAX_WIDTH: i32 = 50;

/// Boxes overlapping beyond this IoU are duplicate candidates.
const DEDUP_IOU_THRESHOLD: f64 = 0.8;

/// Classify raw detections into components. Text regions first, then shape
/// regions; empty inputs yield an empty result, never an error.
///
/// `sample_color` is the external dominant-color routine — it must return
/// the gray sentinel rather than fail for unsampleable regions.
pub fn classify<F>(
    text_regions: &[TextRegion],
    shape_regions: &[ShapeRegion],
    sample_color: F,
) -> Vec<Component>
where
    F: Fn(&BoundingBox) -> ColorInfo,
{
    let mut components = Vec::with_capacity(text_regions.len() + shape_regions.len());

    for region in text_regions {
        components.push(text_component(region, &sample_color));
    }
    for region in shape_regions {
        components.push(shape_component(region, &sample_color));
    }

    let kept = remove_duplicates(components);
    tracing::debug!(count = kept.len(), "components after dedup");
    kept
}

fn text_component<F>(region: &TextRegion, sample_color: &F) -> Component
where
    F: Fn(&BoundingBox) -> ColorInfo,
{
    let bbox = region.bounding_box();

    Component {
        id: Uuid::new_v4().to_string(),
        component_type: classify_text(&region.text, &bbox),
        bounding_box: bbox,
        text_content: Some(region.text.clone()),
        color_info: Some(sample_color(&bbox)),
        confidence: region.confidence,
        attributes: serde_json::Map::new(),
    }
}

fn shape_component<F>(region: &ShapeRegion, sample_color: &F) -> Component
where
    F: Fn(&BoundingBox) -> ColorInfo,
{
    let bbox = region.bbox;

    let mut attributes = serde_json::Map::new();
    attributes.insert(
        "shape".to_string(),
        serde_json::Value::String(region.shape.as_str().to_string()),
    );

    Component {
        id: Uuid::new_v4().to_string(),
        component_type: classify_shape(region.shape, &bbox),
        bounding_box: bbox,
        text_content: None,
        color_info: Some(sample_color(&bbox)),
        confidence: region.confidence,
        attributes,
    }
}

/// Wide text reads as an input field; trigger words mark a button; the
/// rest are labels.
fn classify_text(text: &str, bbox: &BoundingBox) -> ComponentType {
    if bbox.width > bbox.height * TEXT_INPUT_ASPECT {
        ComponentType::TextInput
    } else {
        let lower = text.to_lowercase();
        if BUTTON_TRIGGER_WORDS.iter().any(|w| lower.contains(w)) {
            ComponentType::Button
        } else {
            ComponentType::TextLabel
        }
    }
}

fn classify_shape(shape: ShapeKind, bbox: &BoundingBox) -> ComponentType {
    match shape {
        ShapeKind::Circle => {
            if bbox.width < ICON_MAX_WIDTH {
                ComponentType::Icon
            } else {
                ComponentType::Button
            }
        }
        ShapeKind::Rectangle => {
            // f64 so a degenerate zero-height box yields +inf, not a panic
            let aspect = bbox.width as f64 / bbox.height as f64;
            if aspect > 3.0 {
                ComponentType::TextInput
            } else if aspect > 0.5 && aspect < 2.0 {
                ComponentType::Button
            } else {
                ComponentType::Container
            }
        }
        ShapeKind::Other => ComponentType::Unknown,
    }
}

/// Drop components that heavily overlap a strictly more confident one.
/// The comparison is strict `<`: equal-confidence overlaps both survive,
/// and that tie behavior is observable contract. Survivors keep
/// first-seen order.
fn remove_duplicates(components: Vec<Component>) -> Vec<Component> {
    let mut kept = Vec::with_capacity(components.len());

    for (i, comp1) in components.iter().enumerate() {
        let is_duplicate = components.iter().enumerate().any(|(j, comp2)| {
            i != j
                && iou(&comp1.bounding_box, &comp2.bounding_box) > DEDUP_IOU_THRESHOLD
                && comp1.confidence < comp2.confidence
        });
        if !is_duplicate {
            kept.push(comp1.clone());
        }
    }

    kept
}
