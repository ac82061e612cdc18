/// A transparent RGBA drawing surface aligned with the video frame.
///
/// Starts zero-sized ("not ready") and is lazily resized once the capture
/// source's native dimensions are known. Resizing clears; renderers always
/// repaint from scratch, so no stale geometry survives a cycle.
#[derive(Clone, Debug)]
pub struct OverlaySurface {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl OverlaySurface {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    /// A zero-sized surface is "renderer not ready": drawing is skipped.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Resize to the video's native size if it differs; resizing clears.
    pub fn ensure_size(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::with_size(width, height);
        }
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Out-of-bounds coordinates are silently dropped; detections may
    /// extend past frame edges.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.data[i..i + 4].copy_from_slice(&color);
    }

    /// Outline a rectangle with the given stroke thickness (inward).
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: u32, color: [u8; 4]) {
        let x0 = x.round() as i32;
        let y0 = y.round() as i32;
        let x1 = (x + w).round() as i32;
        let y1 = (y + h).round() as i32;
        let t = thickness as i32;

        for ty in 0..t {
            for px in x0..=x1 {
                self.set_pixel(px, y0 + ty, color);
                self.set_pixel(px, y1 - ty, color);
            }
        }
        for tx in 0..t {
            for py in y0..=y1 {
                self.set_pixel(x0 + tx, py, color);
                self.set_pixel(x1 - tx, py, color);
            }
        }
    }

    /// Paint a filled dot centered at `(cx, cy)`.
    pub fn fill_dot(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
        let r = radius.max(0.5);
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }
}

impl Default for OverlaySurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_new_surface_is_not_ready() {
        let s = OverlaySurface::new();
        assert!(!s.is_ready());
        assert!(s.is_blank());
    }

    #[test]
    fn test_ensure_size_makes_ready_and_clear() {
        let mut s = OverlaySurface::new();
        s.ensure_size(320, 240);
        assert!(s.is_ready());
        assert_eq!((s.width(), s.height()), (320, 240));
        assert!(s.is_blank());
    }

    #[test]
    fn test_ensure_size_same_size_preserves_content() {
        let mut s = OverlaySurface::with_size(10, 10);
        s.set_pixel(5, 5, RED);
        s.ensure_size(10, 10);
        assert_eq!(s.pixel(5, 5), Some(RED));
    }

    #[test]
    fn test_ensure_size_new_size_clears() {
        let mut s = OverlaySurface::with_size(10, 10);
        s.set_pixel(5, 5, RED);
        s.ensure_size(20, 10);
        assert!(s.is_blank());
        assert_eq!((s.width(), s.height()), (20, 10));
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut s = OverlaySurface::with_size(4, 4);
        s.set_pixel(1, 1, RED);
        assert!(!s.is_blank());
        s.clear();
        assert!(s.is_blank());
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_dropped() {
        let mut s = OverlaySurface::with_size(4, 4);
        s.set_pixel(-1, 0, RED);
        s.set_pixel(0, -1, RED);
        s.set_pixel(4, 0, RED);
        s.set_pixel(0, 4, RED);
        assert!(s.is_blank());
    }

    #[test]
    fn test_stroke_rect_paints_border_not_interior() {
        let mut s = OverlaySurface::with_size(20, 20);
        s.stroke_rect(2.0, 2.0, 10.0, 10.0, 1, RED);
        assert_eq!(s.pixel(2, 2), Some(RED)); // corner
        assert_eq!(s.pixel(7, 2), Some(RED)); // top edge
        assert_eq!(s.pixel(2, 7), Some(RED)); // left edge
        assert_eq!(s.pixel(12, 12), Some(RED)); // opposite corner
        assert_eq!(s.pixel(7, 7), Some([0, 0, 0, 0])); // interior untouched
    }

    #[test]
    fn test_stroke_rect_clips_at_edges() {
        let mut s = OverlaySurface::with_size(10, 10);
        s.stroke_rect(-5.0, -5.0, 30.0, 30.0, 2, RED);
        // No panic and the visible top-left corner region stays interior-empty
        assert_eq!(s.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_dot_covers_center() {
        let mut s = OverlaySurface::with_size(10, 10);
        s.fill_dot(5.0, 5.0, 1.5, RED);
        assert_eq!(s.pixel(5, 5), Some(RED));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
