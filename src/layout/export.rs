/// Structured JSON export of a layout analysis — the only externally
/// consumed artifact. All numeric fields serialize as plain numbers.
use serde::{Deserialize, Serialize};

use crate::errors::ScreenLensResult;
use crate::layout::types::{ColorInfo, ComponentType, Layout, RelationType};

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub screen_analysis: ScreenAnalysis,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScreenAnalysis {
    pub dimensions: Dimensions,
    pub confidence_score: f64,
    pub components: Vec<ComponentRecord>,
    pub relationships: Vec<RelationshipRecord>,
    pub ambiguities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub position: Position,
    pub text_content: Option<String>,
    pub color_info: Option<ColorInfo>,
    pub confidence: f64,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub center: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub from_component: String,
    pub to_component: String,
    pub relationship: RelationType,
    pub distance: f64,
    pub confidence: f64,
    pub description: String,
}

pub fn report(layout: &Layout) -> AnalysisReport {
    let components = layout
        .components()
        .iter()
        .map(|comp| {
            let bbox = comp.bounding_box;
            let (cx, cy) = bbox.center();
            ComponentRecord {
                id: comp.id.clone(),
                component_type: comp.component_type,
                position: Position {
                    x: bbox.x,
                    y: bbox.y,
                    width: bbox.width,
                    height: bbox.height,
                    center: [cx, cy],
                },
                text_content: comp.text_content.clone(),
                color_info: comp.color_info.clone(),
                confidence: comp.confidence,
                attributes: comp.attributes.clone(),
            }
        })
        .collect();

    let relationships = layout
        .relationships
        .iter()
        .map(|rel| RelationshipRecord {
            from_component: rel.component1_id.clone(),
            to_component: rel.component2_id.clone(),
            relationship: rel.relation_type,
            distance: rel.distance,
            confidence: rel.confidence,
            description: rel.description.clone(),
        })
        .collect();

    AnalysisReport {
        screen_analysis: ScreenAnalysis {
            dimensions: Dimensions {
                width: layout.screen_dimensions.0,
                height: layout.screen_dimensions.1,
            },
            confidence_score: layout.confidence_score,
            components,
            relationships,
            ambiguities: layout.ambiguities.clone(),
        },
    }
}

pub fn to_json(layout: &Layout, pretty: bool) -> ScreenLensResult<String> {
    let report = report(layout);
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::BoundingBox;
    use crate::layout::types::{Component, Relationship};

    fn layout() -> Layout {
        let mut attributes = serde_json::Map::new();
        attributes.insert(
            "shape".to_string(),
            serde_json::Value::String("rectangle".to_string()),
        );
        let comp_a = Component {
            id: "a".to_string(),
            component_type: ComponentType::Button,
            bounding_box: BoundingBox::new(10, 20, 31, 40),
            text_content: Some("OK".to_string()),
            color_info: Some(ColorInfo::neutral_gray()),
            confidence: 0.9,
            attributes,
        };
        let comp_b = Component {
            id: "b".to_string(),
            component_type: ComponentType::TextLabel,
            bounding_box: BoundingBox::new(10, 120, 30, 40),
            text_content: None,
            color_info: None,
            confidence: 0.75,
            attributes: serde_json::Map::new(),
        };
        let rel = Relationship {
            component1_id: "a".to_string(),
            component2_id: "b".to_string(),
            relation_type: RelationType::Above,
            distance: 100.0,
            confidence: 0.8,
            description: "button with text 'OK' is above text_label".to_string(),
        };
        Layout::new(
            vec![comp_a, comp_b],
            vec![rel],
            (800, 600),
            vec!["Low confidence detection for 1 components".to_string()],
            0.82,
        )
    }

    #[test]
    fn numeric_fields_round_trip_exactly() {
        let json = to_json(&layout(), true).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        let analysis = parsed.screen_analysis;

        assert_eq!(analysis.dimensions.width, 800);
        assert_eq!(analysis.dimensions.height, 600);
        assert_eq!(analysis.confidence_score, 0.82);
        assert_eq!(analysis.components[0].position.x, 10);
        assert_eq!(analysis.components[0].position.width, 31);
        assert_eq!(analysis.components[0].position.center, [25, 40]);
        assert_eq!(analysis.components[0].confidence, 0.9);
        assert_eq!(analysis.relationships[0].distance, 100.0);
    }

    #[test]
    fn enums_serialize_as_snake_case_strings() {
        let json = to_json(&layout(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let analysis = &value["screen_analysis"];

        assert_eq!(analysis["components"][0]["type"], "button");
        assert_eq!(analysis["components"][1]["type"], "text_label");
        assert_eq!(analysis["relationships"][0]["relationship"], "above");
        assert_eq!(analysis["relationships"][0]["from_component"], "a");
        assert_eq!(analysis["relationships"][0]["to_component"], "b");
    }

    #[test]
    fn attributes_and_colors_survive_export() {
        let json = to_json(&layout(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let component = &value["screen_analysis"]["components"][0];

        assert_eq!(component["attributes"]["shape"], "rectangle");
        assert_eq!(component["color_info"]["dominant_hex"], "#808080");
    }
}
