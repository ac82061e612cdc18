use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::overlay::infrastructure::LIME;
use crate::overlay::surface::OverlaySurface;
use crate::shared::detection::Detection;

const DEFAULT_DOT_RADIUS: f32 = 1.5;
const BOX_FALLBACK_THICKNESS: u32 = 2;

/// Draws landmark detections as one dot per point.
///
/// Box detections (from the short-range model) have no points to plot and
/// fall back to a plain outline.
pub struct MeshRenderer {
    color: [u8; 4],
    dot_radius: f32,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self {
            color: LIME,
            dot_radius: DEFAULT_DOT_RADIUS,
        }
    }

    pub fn with_style(color: [u8; 4], dot_radius: f32) -> Self {
        Self { color, dot_radius }
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer for MeshRenderer {
    fn render(&self, surface: &mut OverlaySurface, detections: &[Detection]) {
        if !surface.is_ready() {
            return;
        }
        surface.clear();
        for detection in detections {
            match detection {
                Detection::Landmarks(points) => {
                    for p in points {
                        surface.fill_dot(p.x, p.y, self.dot_radius, self.color);
                    }
                }
                Detection::Box(b) => {
                    surface.stroke_rect(
                        b.x,
                        b.y,
                        b.width,
                        b.height,
                        BOX_FALLBACK_THICKNESS,
                        self.color,
                    );
                }
            }
        }
    }
}
