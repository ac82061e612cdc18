use thiserror::Error;

use crate::shared::frame::Frame;

/// Desired capture parameters. Audio is never captured; the hint is a
/// resolution request the device may adjust.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Acquisition and per-frame capture failures.
///
/// The three acquisition variants are deliberately distinct: the loop
/// surfaces each as a separate user-visible status so the user can
/// self-diagnose. None of them is retried automatically.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera permission denied for {device}")]
    PermissionDenied { device: String },
    #[error("no camera device found at {device}")]
    DeviceNotFound { device: String },
    #[error("camera device {device} is busy")]
    DeviceBusy { device: String },
    #[error("camera backend error: {0}")]
    Backend(String),
}

/// Domain interface for a live camera feed.
///
/// One source is owned by exactly one detection loop. `open` acquires an
/// exclusive device handle; `stop` must release it so other consumers can
/// use the camera, and must be safe to call more than once.
pub trait CaptureSource: Send {
    /// Acquire the device and start streaming.
    fn open(&mut self, constraints: CaptureConstraints) -> Result<(), CaptureError>;

    /// Whether the first frame has arrived and dimensions are known.
    fn is_ready(&self) -> bool;

    /// Native dimensions, once known.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// The current frame, or `None` while the source is not ready yet.
    fn frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the device. Idempotent.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints() {
        let c = CaptureConstraints::default();
        assert_eq!((c.width, c.height), (640, 480));
    }

    #[test]
    fn test_error_messages_are_distinguishable() {
        let device = "/dev/video0".to_string();
        let denied = CaptureError::PermissionDenied {
            device: device.clone(),
        }
        .to_string();
        let missing = CaptureError::DeviceNotFound {
            device: device.clone(),
        }
        .to_string();
        let busy = CaptureError::DeviceBusy { device }.to_string();
        assert!(denied.contains("permission denied"));
        assert!(missing.contains("no camera device found"));
        assert!(busy.contains("busy"));
        assert_ne!(denied, missing);
        assert_ne!(missing, busy);
    }
}
