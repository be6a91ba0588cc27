use serde::{Deserialize, Serialize};

/// Pixel coordinate `(x, y)`.
pub type Point = (i32, i32);

/// Axis-aligned bounding box in pixel coordinates, `x1 < x2`, `y1 < y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Integer midpoint, truncated toward zero.
    pub fn center(&self) -> Point {
        (midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }
}

/// Summed in `i64` so extreme coordinates cannot overflow; the halved value
/// always fits back into `i32`.
fn midpoint(a: i32, b: i32) -> i32 {
    ((a as i64 + b as i64) / 2) as i32
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}
