use serde::{Deserialize, Serialize};

use crate::layout::geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    /// Any tag the detection engine reports that we do not model.
    #[serde(other)]
    Other,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Other => "other",
        }
    }
}

/// One candidate region from the shape detection engine.
/// Missing required keys fail the record's deserialization rather than
/// producing a partial value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRegion {
    pub bbox: BoundingBox,
    pub shape: ShapeKind,
    pub confidence: f64,
}

/// One candidate region from the text recognition engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRegion {
    /// Four corner points, clockwise from top-left.
    pub polygon: [(f64, f64); 4],
    pub text: String,
    pub confidence: f64,
}

impl TextRegion {
    /// Axis-aligned box over the polygon extremes, truncated to integers.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for (x, y) in self.polygon {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        BoundingBox::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x) as i32,
            (max_y - min_y) as i32,
        )
    }
}
