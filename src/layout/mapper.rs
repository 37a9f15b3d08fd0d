/// Spatial relationship mapping across classified components.
use crate::layout::types::{Component, RelationType, Relationship};

/// Fixed confidence for directional relations — geometry always yields a
/// definite primary direction; the uncertainty lives in the detections.
const RELATION_CONFIDENCE: f64 = 0.8;

/// Compute relationships over all ordered pairs `(i, j)`, `i != j`, in
/// input enumeration order: `n` components yield `n * (n - 1)`
/// relationships, zero for `n <= 1`.
pub fn map_relationships(components: &[Component]) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for (i, comp1) in components.iter().enumerate() {
        for (j, comp2) in components.iter().enumerate() {
            if i != j {
                relationships.push(analyze_pair(comp1, comp2));
            }
        }
    }

    tracing::debug!(count = relationships.len(), "relationships mapped");
    relationships
}

fn analyze_pair(comp1: &Component, comp2: &Component) -> Relationship {
    let (cx1, cy1) = comp1.bounding_box.center();
    let (cx2, cy2) = comp2.bounding_box.center();

    let dx = (cx2 - cx1) as f64;
    let dy = (cy2 - cy1) as f64;
    let distance = (dx * dx + dy * dy).sqrt();

    let relation_type = primary_direction(dx, dy);

    Relationship {
        component1_id: comp1.id.clone(),
        component2_id: comp2.id.clone(),
        relation_type,
        distance,
        confidence: RELATION_CONFIDENCE,
        description: describe(comp1, comp2, relation_type),
    }
}

/// Primary direction by the dominant center-to-center axis. Coincident
/// centers (dx = dy = 0) fall through to `Above` — a degenerate tie kept
/// intentionally, pinned by a test.
fn primary_direction(dx: f64, dy: f64) -> RelationType {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            RelationType::RightOf
        } else {
            RelationType::LeftOf
        }
    } else if dy > 0.0 {
        RelationType::Below
    } else {
        RelationType::Above
    }
}

fn describe(comp1: &Component, comp2: &Component, relation_type: RelationType) -> String {
    let phrase = match relation_type {
        RelationType::Above => "above",
        RelationType::Below => "below",
        RelationType::LeftOf => "to the left of",
        RelationType::RightOf => "to the right of",
        // Reserved kinds have no directional phrase
        _ => {
            return format!(
                "{} relates to {}",
                component_phrase(comp1),
                component_phrase(comp2)
            )
        }
    };

    format!(
        "{} is {} {}",
        component_phrase(comp1),
        phrase,
        component_phrase(comp2)
    )
}

/// "button with text 'OK'" — text suffix only for non-empty content.
fn component_phrase(component: &Component) -> String {
    let mut desc = component.component_type.as_str().to_string();
    if let Some(text) = &component.text_content {
        if !text.is_empty() {
            desc.push_str(&format!(" with text '{text}'"));
        }
    }
    desc
}
