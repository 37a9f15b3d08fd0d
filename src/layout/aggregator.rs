/// Layout aggregation — assembles components and relationships into the
/// final immutable snapshot with confidence and ambiguity signals.
use crate::layout::types::{Component, Layout, Relationship};

/// Components below this confidence count toward the low-confidence
/// ambiguity signal.
const LOW_CONFIDENCE: f64 = 0.5;

pub fn aggregate(
    components: Vec<Component>,
    relationships: Vec<Relationship>,
    screen_dimensions: (u32, u32),
) -> Layout {
    let ambiguities = detect_ambiguities(&components);
    let confidence_score = overall_confidence(&components);

    tracing::debug!(
        components = components.len(),
        relationships = relationships.len(),
        confidence = confidence_score,
        "layout aggregated"
    );

    Layout::new(
        components,
        relationships,
        screen_dimensions,
        ambiguities,
        confidence_score,
    )
}

fn detect_ambiguities(components: &[Component]) -> Vec<String> {
    let mut ambiguities = Vec::new();

    let low = components
        .iter()
        .filter(|c| c.confidence < LOW_CONFIDENCE)
        .count();
    if low > 0 {
        ambiguities.push(format!("Low confidence detection for {low} components"));
    }

    ambiguities
}

/// Mean component confidence rounded to two decimals. Exactly 0.0 for an
/// empty component set — the sentinel consumers use to detect a failed run.
fn overall_confidence(components: &[Component]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let mean = components.iter().map(|c| c.confidence).sum::<f64>() / components.len() as f64;
    (mean * 100.0).round() / 100.0
}
