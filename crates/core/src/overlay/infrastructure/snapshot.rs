use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::overlay::surface::OverlaySurface;
use crate::shared::frame::Frame;

/// Composite the overlay on top of the camera frame.
///
/// Straight source-over blending; the overlay is transparent everywhere a
/// renderer didn't paint. Dimensions are taken from the frame; an overlay
/// of a different size (mid-resize) is ignored.
pub fn composite(frame: &Frame, overlay: &OverlaySurface) -> RgbaImage {
    let w = frame.width();
    let h = frame.height();
    let rgb = frame.data();

    let overlay_matches = overlay.width() == w && overlay.height() == h;

    let mut out = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let i = ((y * w + x) * 3) as usize;
            let mut px = [rgb[i], rgb[i + 1], rgb[i + 2], 255u8];

            if overlay_matches {
                if let Some([or, og, ob, oa]) = overlay.pixel(x, y) {
                    let a = oa as u32;
                    for (dst, src) in px.iter_mut().take(3).zip([or, og, ob]) {
                        *dst = ((src as u32 * a + *dst as u32 * (255 - a)) / 255) as u8;
                    }
                }
            }
            out.put_pixel(x, y, Rgba(px));
        }
    }
    out
}

/// Write a composited snapshot PNG for one cycle.
pub fn save_snapshot(
    frame: &Frame,
    overlay: &OverlaySurface,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    composite(frame, overlay).save(path)?;
    log::debug!("snapshot written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![100u8; (w * h * 3) as usize], w, h, 0, 0)
    }

    #[test]
    fn test_composite_without_overlay_content_is_the_frame() {
        let frame = gray_frame(4, 4);
        let overlay = OverlaySurface::with_size(4, 4);
        let img = composite(&frame, &overlay);
        assert_eq!(img.get_pixel(2, 2).0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_composite_opaque_overlay_pixel_wins() {
        let frame = gray_frame(4, 4);
        let mut overlay = OverlaySurface::with_size(4, 4);
        overlay.set_pixel(1, 1, [0, 255, 0, 255]);
        let img = composite(&frame, &overlay);
        assert_eq!(img.get_pixel(1, 1).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_composite_mismatched_overlay_is_ignored() {
        let frame = gray_frame(4, 4);
        let mut overlay = OverlaySurface::with_size(8, 8);
        overlay.set_pixel(1, 1, [0, 255, 0, 255]);
        let img = composite(&frame, &overlay);
        assert_eq!(img.get_pixel(1, 1).0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_save_snapshot_writes_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cycle_0.png");
        let frame = gray_frame(4, 4);
        let overlay = OverlaySurface::with_size(4, 4);
        save_snapshot(&frame, &overlay, &path).unwrap();
        assert!(path.exists());
    }
}
