/// A single landmark coordinate in frame pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned face bounding box in frame pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Model confidence in [0, 1].
    pub score: f32,
}

impl BoundingBox {
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x) as f64;
        let iy1 = self.y.max(other.y) as f64;
        let ix2 = ((self.x + self.width).min(other.x + other.width)) as f64;
        let iy2 = ((self.y + self.height).min(other.y + other.height)) as f64;

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }

    /// Clamps the box to `[0, w] x [0, h]`, shrinking width/height as needed.
    pub fn clamped_to(&self, w: u32, h: u32) -> BoundingBox {
        let x = self.x.clamp(0.0, w as f32);
        let y = self.y.clamp(0.0, h as f32);
        BoundingBox {
            x,
            y,
            width: self.width.min(w as f32 - x).max(0.0),
            height: self.height.min(h as f32 - y).max(0.0),
            score: self.score,
        }
    }
}

/// One geometric result from a single inference call.
///
/// Shape depends on the model variant: the short-range detector produces
/// boxes, the mesh model produces an ordered landmark list with a
/// model-fixed point count. Immutable once produced; consumed solely by
/// the overlay renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    Box(BoundingBox),
    Landmarks(Vec<Point>),
}

impl Detection {
    /// The tightest box enclosing this detection's geometry.
    ///
    /// `None` for an empty landmark list (a degenerate model output).
    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Detection::Box(b) => Some(b.clone()),
            Detection::Landmarks(points) => {
                let first = points.first()?;
                let mut min_x = first.x;
                let mut min_y = first.y;
                let mut max_x = first.x;
                let mut max_y = first.y;
                for p in &points[1..] {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Some(BoundingBox {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                    score: 1.0,
                })
            }
        }
    }
}
