/// Rule-dispatch query engine over an analyzed layout.
///
/// Classifies a free-text query by intent (count, location, relationship,
/// general), first match wins, then runs the matching handler. Every
/// failure degrades to a "confused - ..." string; the query surface never
/// raises and never mutates the layout.
use std::collections::HashMap;

use regex::Regex;

use crate::errors::{ScreenLensError, ScreenLensResult};
use crate::layout::types::{Component, ComponentType, Layout};

/// Ordered color lookup table: name → substring patterns matched against a
/// component's lower-cased dominant hex string.
const COLOR_PATTERNS: [(&str, &[&str]); 7] = [
    ("red", &["#ff", "#f00", "rgb(255", "red", "#ff0000"]),
    ("blue", &["#00f", "#0000ff", "rgb(0", "blue", "#0066cc", "#4169e1"]),
    ("green", &["#0f0", "#00ff00", "rgb(0", "green"]),
    ("black", &["#000", "#000000", "rgb(0,0,0)", "black"]),
    ("white", &["#fff", "#ffffff", "rgb(255,255,255)", "white"]),
    ("orange", &["#ffa500", "#ff8c00", "orange", "#ff6600"]),
    ("yellow", &["#ffff00", "#ffd700", "yellow", "#fff200"]),
];

const LOCATION_WORDS: [&str; 4] = ["where", "position", "find", "locate"];
const RELATION_WORDS: [&str; 4] = ["above", "below", "left", "right"];

pub fn answer(layout: &Layout, query: &str) -> String {
    let query = query.trim().to_lowercase();

    tracing::debug!(query = %query, components = layout.components().len(), "processing query");

    let result = if query.contains("how many") {
        handle_count(layout)
    } else if LOCATION_WORDS.iter().any(|w| query.contains(w)) {
        handle_location(layout, &query)
    } else if RELATION_WORDS.iter().any(|w| query.contains(w)) {
        Ok(handle_relationship(layout))
    } else {
        Ok(handle_general(layout, &query))
    };

    result.unwrap_or_else(|e| format!("confused - Could not parse query: {e}"))
}

// ── Count ────────────────────────────────────────────────────────────────────

fn handle_count(layout: &Layout) -> ScreenLensResult<String> {
    if layout.components().is_empty() {
        return Ok("No components found in the layout".to_string());
    }

    // Group by type string, keyed in first-seen order
    let mut order: Vec<&'static str> = Vec::new();
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for component in layout.components() {
        let name = component.component_type.as_str();
        if !counts.contains_key(name) {
            order.push(name);
        }
        *counts.entry(name).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    let breakdown = order
        .iter()
        .map(|name| {
            let count = counts[name];
            let plural = if count > 1 { "s" } else { "" };
            format!("{count} {name}{plural}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("Total components: {total}. Breakdown: {breakdown}"))
}

// ── Location ─────────────────────────────────────────────────────────────────

fn handle_location(layout: &Layout, query: &str) -> ScreenLensResult<String> {
    if layout.components().is_empty() {
        return Ok("No components found in the layout".to_string());
    }

    // Specific text content, quoted in the query
    if query.contains("text") {
        let pattern = Regex::new(r#"'([^']+)'|"([^"]+)""#)
            .map_err(|e| ScreenLensError::Query(e.to_string()))?;
        if let Some(target) = pattern
            .captures(query)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        {
            return Ok(find_text(layout, target.as_str()));
        }
    }

    // Color names, in fixed table order
    for (name, patterns) in COLOR_PATTERNS {
        if query.contains(name) {
            if let Some(found) = find_by_color(layout, name, patterns) {
                return Ok(found);
            }
        }
    }

    // Component types
    if query.contains("button") {
        if let Some(found) = find_first_button(layout) {
            return Ok(found);
        }
    }

    Ok("confused - Could not find the specified component".to_string())
}

/// First component (iteration order) whose text contains the target,
/// case-insensitively; otherwise up to 5 available texts as a hint.
fn find_text(layout: &Layout, target: &str) -> String {
    let target_lower = target.to_lowercase();
    let hit = layout.components().iter().find(|c| {
        c.text_content
            .as_ref()
            .is_some_and(|t| t.to_lowercase().contains(&target_lower))
    });

    match hit {
        Some(component) => format!(
            "Found text '{target}' at position ({}, {}) in a {}",
            component.bounding_box.x,
            component.bounding_box.y,
            component.component_type.as_str()
        ),
        None => {
            let available: Vec<&str> = layout
                .components()
                .iter()
                .filter_map(|c| c.text_content.as_deref())
                .filter(|t| !t.is_empty())
                .take(5)
                .collect();
            format!("Text '{target}' not found. Available texts: {available:?}")
        }
    }
}

/// Up to 3 components whose dominant hex matches one of the color's
/// substring patterns; `None` when nothing matches so the caller can keep
/// scanning.
fn find_by_color(layout: &Layout, name: &str, patterns: &[&str]) -> Option<String> {
    let matches: Vec<&Component> = layout
        .components()
        .iter()
        .filter(|c| {
            c.color_info.as_ref().is_some_and(|info| {
                let hex = info.dominant_hex.to_lowercase();
                patterns.iter().any(|p| hex.contains(&p.to_lowercase()))
            })
        })
        .take(3)
        .collect();

    if matches.is_empty() {
        return None;
    }

    let descriptions: Vec<String> = matches
        .iter()
        .map(|c| {
            let mut desc = c.component_type.as_str().to_string();
            if let Some(text) = &c.text_content {
                if !text.is_empty() {
                    desc.push_str(&format!(" with text '{text}'"));
                }
            }
            desc.push_str(&format!(
                " at ({}, {})",
                c.bounding_box.x, c.bounding_box.y
            ));
            desc
        })
        .collect();

    Some(format!(
        "Found {name} elements: {}",
        descriptions.join("; ")
    ))
}

fn find_first_button(layout: &Layout) -> Option<String> {
    let button = layout
        .components()
        .iter()
        .find(|c| c.component_type == ComponentType::Button)?;

    let mut desc = format!(
        "Found button at position ({}, {})",
        button.bounding_box.x, button.bounding_box.y
    );
    if let Some(text) = &button.text_content {
        if !text.is_empty() {
            desc.push_str(&format!(" with text '{text}'"));
        }
    }
    Some(desc)
}

// ── Relationship ─────────────────────────────────────────────────────────────

fn handle_relationship(layout: &Layout) -> String {
    let descriptions: Vec<&str> = layout
        .relationships
        .iter()
        .take(5)
        .map(|r| r.description.as_str())
        .collect();

    if descriptions.is_empty() {
        "No clear relationships found between components".to_string()
    } else {
        format!("Found relationships: {}", descriptions.join("; "))
    }
}

// ── General ──────────────────────────────────────────────────────────────────

fn handle_general(layout: &Layout, query: &str) -> String {
    if query.contains("confused") || query.contains("ambiguities") {
        if layout.ambiguities.is_empty() {
            "No significant ambiguities detected".to_string()
        } else {
            format!("Identified ambiguities: {}", layout.ambiguities.join("; "))
        }
    } else {
        "confused - Could not understand the query".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::BoundingBox;
    use crate::layout::types::{ColorInfo, Component, RelationType, Relationship};

    fn component(
        id: &str,
        component_type: ComponentType,
        x: i32,
        y: i32,
        text: Option<&str>,
        hex: Option<&str>,
    ) -> Component {
        Component {
            id: id.to_string(),
            component_type,
            bounding_box: BoundingBox::new(x, y, 40, 20),
            text_content: text.map(String::from),
            color_info: hex.map(|h| ColorInfo {
                dominant_rgb: String::new(),
                dominant_hex: h.to_string(),
            }),
            confidence: 0.9,
            attributes: serde_json::Map::new(),
        }
    }

    fn empty_layout() -> Layout {
        Layout::new(Vec::new(), Vec::new(), (800, 600), Vec::new(), 0.0)
    }

    fn sample_layout() -> Layout {
        let components = vec![
            component("b1", ComponentType::Button, 10, 10, Some("Submit Now"), Some("#ff0000")),
            component("b2", ComponentType::Button, 10, 50, None, None),
            component("b3", ComponentType::Button, 10, 90, Some("Cancel"), None),
            component("l1", ComponentType::TextLabel, 200, 10, Some("Name"), None),
            component("l2", ComponentType::TextLabel, 200, 50, Some("Email"), None),
        ];
        let relationships = vec![Relationship {
            component1_id: "b1".to_string(),
            component2_id: "b2".to_string(),
            relation_type: RelationType::Above,
            distance: 40.0,
            confidence: 0.8,
            description: "button with text 'Submit Now' is above button".to_string(),
        }];
        Layout::new(components, relationships, (800, 600), Vec::new(), 0.9)
    }

    #[test]
    fn count_query_reports_totals_and_breakdown() {
        let response = answer(&sample_layout(), "how many components?");
        assert!(response.contains("Total components: 5"));
        assert!(response.contains("3 buttons"));
        assert!(response.contains("2 text_labels"));
    }

    #[test]
    fn count_query_on_empty_layout_has_exact_message() {
        assert_eq!(
            answer(&empty_layout(), "how many components?"),
            "No components found in the layout"
        );
    }

    #[test]
    fn count_breakdown_singular_has_no_plural_s() {
        let layout = Layout::new(
            vec![component("b1", ComponentType::Button, 0, 0, None, None)],
            Vec::new(),
            (800, 600),
            Vec::new(),
            0.9,
        );
        assert_eq!(
            answer(&layout, "how many components?"),
            "Total components: 1. Breakdown: 1 button"
        );
    }

    #[test]
    fn location_query_finds_quoted_text_case_insensitively() {
        let response = answer(&sample_layout(), "where is the text 'Submit'?");
        assert!(response.contains("(10, 10)"));
        assert!(response.contains("button"));
    }

    #[test]
    fn location_query_lists_available_texts_on_miss() {
        let response = answer(&sample_layout(), "where is the text 'Logout'?");
        assert!(response.starts_with("Text 'logout' not found."));
        assert!(response.contains("Submit Now"));
    }

    #[test]
    fn location_query_matches_colors() {
        let response = answer(&sample_layout(), "find the red element");
        assert!(response.starts_with("Found red elements:"));
        assert!(response.contains("button with text 'Submit Now' at (10, 10)"));
    }

    #[test]
    fn location_query_falls_back_to_button_type() {
        let response = answer(&sample_layout(), "where is the button?");
        assert_eq!(
            response,
            "Found button at position (10, 10) with text 'Submit Now'"
        );
    }

    #[test]
    fn location_query_without_a_match_is_confused() {
        let response = answer(&sample_layout(), "where is the avatar?");
        assert_eq!(response, "confused - Could not find the specified component");
    }

    #[test]
    fn relationship_query_joins_first_descriptions() {
        let response = answer(&sample_layout(), "what is above the button?");
        assert_eq!(
            response,
            "Found relationships: button with text 'Submit Now' is above button"
        );
    }

    #[test]
    fn relationship_query_with_no_relationships() {
        let layout = Layout::new(
            vec![component("b1", ComponentType::Button, 0, 0, None, None)],
            Vec::new(),
            (800, 600),
            Vec::new(),
            0.9,
        );
        assert_eq!(
            answer(&layout, "what is to the left?"),
            "No clear relationships found between components"
        );
    }

    #[test]
    fn general_query_reports_ambiguities() {
        let layout = Layout::confused("Error analyzing screen: boom");
        assert_eq!(
            answer(&layout, "why are you confused?"),
            "Identified ambiguities: Error analyzing screen: boom"
        );
    }

    #[test]
    fn general_query_without_ambiguities() {
        assert_eq!(
            answer(&sample_layout(), "any ambiguities?"),
            "No significant ambiguities detected"
        );
    }

    #[test]
    fn unrecognized_query_is_confused() {
        assert_eq!(
            answer(&sample_layout(), "tell me a joke"),
            "confused - Could not understand the query"
        );
    }

    #[test]
    fn count_intent_wins_over_location_intent() {
        // "how many" is checked before "where"
        let response = answer(&sample_layout(), "how many buttons and where are they?");
        assert!(response.starts_with("Total components:"));
    }
}
