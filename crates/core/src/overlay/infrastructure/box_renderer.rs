use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::overlay::infrastructure::LIME;
use crate::overlay::surface::OverlaySurface;
use crate::shared::detection::Detection;

const DEFAULT_THICKNESS: u32 = 2;

/// Draws each detection as a stroked bounding rectangle.
///
/// Landmark detections are outlined by the box enclosing their points, so
/// this renderer works with either model variant.
pub struct BoxRenderer {
    color: [u8; 4],
    thickness: u32,
}

impl BoxRenderer {
    pub fn new() -> Self {
        Self {
            color: LIME,
            thickness: DEFAULT_THICKNESS,
        }
    }

    pub fn with_style(color: [u8; 4], thickness: u32) -> Self {
        Self { color, thickness }
    }
}

impl Default for BoxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer for BoxRenderer {
    fn render(&self, surface: &mut OverlaySurface, detections: &[Detection]) {
        if !surface.is_ready() {
            return;
        }
        surface.clear();
        for detection in detections {
            if let Some(b) = detection.bounds() {
                surface.stroke_rect(b.x, b.y, b.width, b.height, self.thickness, self.color);
            }
        }
    }
}
