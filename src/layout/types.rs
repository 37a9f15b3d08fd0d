use serde::{Deserialize, Serialize};

use crate::layout::geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Button,
    TextInput,
    TextLabel,
    Image,
    Icon,
    Checkbox,
    RadioButton,
    Dropdown,
    Menu,
    Container,
    Unknown,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Button => "button",
            ComponentType::TextInput => "text_input",
            ComponentType::TextLabel => "text_label",
            ComponentType::Image => "image",
            ComponentType::Icon => "icon",
            ComponentType::Checkbox => "checkbox",
            ComponentType::RadioButton => "radio_button",
            ComponentType::Dropdown => "dropdown",
            ComponentType::Menu => "menu",
            ComponentType::Container => "container",
            ComponentType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Above,
    Below,
    LeftOf,
    RightOf,
    // Reserved relation kinds: valid vocabulary for downstream consumers
    // that match exhaustively, not yet produced by the mapper.
    Inside,
    Contains,
    Overlaps,
    Adjacent,
    AlignedHorizontal,
    AlignedVertical,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Above => "above",
            RelationType::Below => "below",
            RelationType::LeftOf => "left_of",
            RelationType::RightOf => "right_of",
            RelationType::Inside => "inside",
            RelationType::Contains => "contains",
            RelationType::Overlaps => "overlaps",
            RelationType::Adjacent => "adjacent",
            RelationType::AlignedHorizontal => "aligned_horizontal",
            RelationType::AlignedVertical => "aligned_vertical",
        }
    }
}

/// Dominant color of a sampled pixel region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub dominant_rgb: String,
    pub dominant_hex: String,
}

impl ColorInfo {
    /// Neutral gray returned whenever a region cannot be sampled.
    pub fn neutral_gray() -> Self {
        Self {
            dominant_rgb: "rgb(128, 128, 128)".to_string(),
            dominant_hex: "#808080".to_string(),
        }
    }
}

/// A classified, positioned UI element extracted from a screenshot.
/// Created once by the classifier; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub component_type: ComponentType,
    pub bounding_box: BoundingBox,
    pub text_content: Option<String>,
    pub color_info: Option<ColorInfo>,
    pub confidence: f64,
    /// Free-form attributes. Constructed fresh per component, never a
    /// shared map, never null.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// A directed spatial association between two components, referencing them
/// by id. `(A, B)` and `(B, A)` are computed independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub component1_id: String,
    pub component2_id: String,
    pub relation_type: RelationType,
    pub distance: f64,
    pub confidence: f64,
    pub description: String,
}

/// The full structured snapshot of one analysis. Immutable after
/// construction; safe to share read-only across concurrent queries.
#[derive(Debug, Clone)]
pub struct Layout {
    components: Vec<Component>,
    pub relationships: Vec<Relationship>,
    pub screen_dimensions: (u32, u32),
    pub ambiguities: Vec<String>,
    pub confidence_score: f64,
}

impl Layout {
    /// Panics when a relationship references an unknown component id —
    /// that is a programming-contract violation, not an operational
    /// failure, and must fail loudly rather than degrade.
    pub fn new(
        components: Vec<Component>,
        relationships: Vec<Relationship>,
        screen_dimensions: (u32, u32),
        ambiguities: Vec<String>,
        confidence_score: f64,
    ) -> Self {
        let ids: std::collections::HashSet<&str> =
            components.iter().map(|c| c.id.as_str()).collect();
        for rel in &relationships {
            assert!(
                ids.contains(rel.component1_id.as_str()),
                "relationship references unknown component id {}",
                rel.component1_id
            );
            assert!(
                ids.contains(rel.component2_id.as_str()),
                "relationship references unknown component id {}",
                rel.component2_id
            );
        }

        Self {
            components,
            relationships,
            screen_dimensions,
            ambiguities,
            confidence_score,
        }
    }

    /// Components in first-seen order (the dedup survivor order).
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// The terminal failure layout: zero confidence, no components, one
    /// explanatory ambiguity. Produced in place of an error whenever the
    /// analysis fails upstream.
    pub fn confused(reason: impl Into<String>) -> Self {
        Self {
            components: Vec::new(),
            relationships: Vec::new(),
            screen_dimensions: (0, 0),
            ambiguities: vec![reason.into()],
            confidence_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str) -> Component {
        Component {
            id: id.to_string(),
            component_type: ComponentType::Button,
            bounding_box: BoundingBox::new(0, 0, 10, 10),
            text_content: None,
            color_info: None,
            confidence: 0.9,
            attributes: serde_json::Map::new(),
        }
    }

    #[test]
    fn component_lookup_by_id() {
        let layout = Layout::new(
            vec![component("a"), component("b")],
            Vec::new(),
            (100, 100),
            Vec::new(),
            0.9,
        );
        assert!(layout.component("a").is_some());
        assert!(layout.component("missing").is_none());
    }

    #[test]
    #[should_panic(expected = "unknown component id")]
    fn dangling_relationship_id_panics() {
        let rel = Relationship {
            component1_id: "a".to_string(),
            component2_id: "ghost".to_string(),
            relation_type: RelationType::Above,
            distance: 1.0,
            confidence: 0.8,
            description: String::new(),
        };
        Layout::new(vec![component("a")], vec![rel], (100, 100), Vec::new(), 0.9);
    }

    #[test]
    fn confused_layout_is_the_sentinel() {
        let layout = Layout::confused("Error analyzing screen: boom");
        assert_eq!(layout.confidence_score, 0.0);
        assert!(layout.components().is_empty());
        assert_eq!(layout.ambiguities.len(), 1);
        assert_eq!(layout.screen_dimensions, (0, 0));
    }

    #[test]
    fn relation_type_covers_reserved_variants() {
        assert_eq!(RelationType::AlignedHorizontal.as_str(), "aligned_horizontal");
        assert_eq!(RelationType::Contains.as_str(), "contains");
        assert_eq!(
            serde_json::to_string(&RelationType::LeftOf).unwrap(),
            "\"left_of\""
        );
    }
}
