use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates, top-left origin.
/// Width and height are non-negative. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point; integer division truncates toward zero.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Intersection-over-union of two boxes. Defined as 0.0 when the union
/// area is zero.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let ix1 = a.x.max(b.x);
    let iy1 = a.y.max(b.y);
    let ix2 = (a.x + a.width).min(b.x + b.width);
    let iy2 = (a.y + a.height).min(b.y + b.height);

    let inter = (ix2 - ix1).max(0) as i64 * (iy2 - iy1).max(0) as i64;
    let union = a.area() + b.area() - inter;

    if union <= 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}
