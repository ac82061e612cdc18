pub mod box_renderer;
pub mod mesh_renderer;
pub mod snapshot;

/// CSS `lime`, the stroke color used for face geometry.
pub const LIME: [u8; 4] = [0, 255, 0, 255];
