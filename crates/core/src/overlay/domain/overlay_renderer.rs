use crate::overlay::surface::OverlaySurface;
use crate::shared::detection::Detection;

/// Domain interface for painting detections onto the overlay.
///
/// A render call owns the whole surface content for that cycle: it clears
/// first and then repaints, so an empty detection list leaves a fully
/// transparent surface. Rendering a not-ready (zero-sized) surface is a
/// no-op.
pub trait OverlayRenderer: Send {
    fn render(&self, surface: &mut OverlaySurface, detections: &[Detection]);
}
