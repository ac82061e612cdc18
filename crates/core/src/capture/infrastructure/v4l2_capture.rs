use std::pin::Pin;
use std::time::Instant;

use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

use crate::capture::domain::capture_source::{CaptureConstraints, CaptureError, CaptureSource};
use crate::shared::frame::Frame;

const STREAM_BUFFERS: u32 = 4;

/// Webcam capture over Video4Linux2.
///
/// The device negotiates YUYV and conversion to RGB happens here, at the
/// capture boundary. The `v4l` Stream borrows the Device, so the device is
/// pinned on the heap and the stream's lifetime is erased; `streaming` is
/// always dropped before `device` (field order + `stop`).
pub struct V4l2Capture {
    device_path: String,
    streaming: Option<Stream<'static>>,
    device: Option<Pin<Box<Device>>>,
    width: u32,
    height: u32,
    frame_index: u64,
    started_at: Option<Instant>,
}

impl V4l2Capture {
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            streaming: None,
            device: None,
            width: 0,
            height: 0,
            frame_index: 0,
            started_at: None,
        }
    }

    fn map_io_error(&self, e: std::io::Error) -> CaptureError {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied {
                device: self.device_path.clone(),
            },
            std::io::ErrorKind::NotFound => CaptureError::DeviceNotFound {
                device: self.device_path.clone(),
            },
            _ if e.raw_os_error() == Some(libc_ebusy()) => CaptureError::DeviceBusy {
                device: self.device_path.clone(),
            },
            _ => CaptureError::Backend(e.to_string()),
        }
    }
}

/// EBUSY on every Linux target.
const fn libc_ebusy() -> i32 {
    16
}

impl CaptureSource for V4l2Capture {
    fn open(&mut self, constraints: CaptureConstraints) -> Result<(), CaptureError> {
        if self.streaming.is_some() {
            return Ok(());
        }

        let device = Box::pin(
            Device::with_path(&self.device_path).map_err(|e| self.map_io_error(e))?,
        );

        let mut format = device.format().map_err(|e| self.map_io_error(e))?;
        format.width = constraints.width;
        format.height = constraints.height;
        format.fourcc = FourCC::new(b"YUYV");
        let format = device.set_format(&format).map_err(|e| self.map_io_error(e))?;

        self.width = format.width;
        self.height = format.height;

        // SAFETY: the device lives on the heap, so its address is stable
        // when the box moves into `self.device` below. `stop` and `Drop`
        // both take the stream before releasing the device.
        let stream = unsafe {
            let device_static: &'static Device = std::mem::transmute::<&Device, _>(&device);
            Stream::with_buffers(device_static, Type::VideoCapture, STREAM_BUFFERS)
                .map_err(|e| self.map_io_error(e))?
        };

        self.device = Some(device);
        self.streaming = Some(stream);
        self.started_at = Some(Instant::now());
        log::info!(
            "camera {} streaming at {}x{}",
            self.device_path,
            self.width,
            self.height
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.streaming.is_some() && self.width > 0 && self.height > 0
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        if self.width > 0 && self.height > 0 {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    fn frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let Some(stream) = self.streaming.as_mut() else {
            return Ok(None);
        };

        let (buffer, _meta) = stream
            .next()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let rgb = yuyv_to_rgb(buffer, self.width, self.height);
        let timestamp_ms = self
            .started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        let frame = Frame::new(rgb, self.width, self.height, self.frame_index, timestamp_ms);
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn stop(&mut self) {
        // Stream must go before the device it borrows.
        self.streaming.take();
        self.device.take();
        if self.started_at.take().is_some() {
            log::info!("camera {} released", self.device_path);
        }
    }
}

impl Drop for V4l2Capture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Expand packed YUYV 4:2:2 into RGB24.
fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);

    for chunk in yuyv.chunks(4) {
        if chunk.len() < 4 {
            break;
        }
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_to_rgb_length() {
        // 2x2 image = 4 pixels = 8 YUYV bytes -> 12 RGB bytes
        let yuyv = vec![128u8; 8];
        let rgb = yuyv_to_rgb(&yuyv, 2, 2);
        assert_eq!(rgb.len(), 12);
    }

    #[test]
    fn test_yuyv_gray_maps_to_gray() {
        // Y=128, U=V=128 (no chroma) -> R=G=B=128
        let yuyv = vec![128u8, 128, 128, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1);
        assert_eq!(rgb, vec![128, 128, 128, 128, 128, 128]);
    }

    #[test]
    fn test_yuyv_truncated_chunk_ignored() {
        let yuyv = vec![128u8, 128, 128]; // not a full macropixel
        let rgb = yuyv_to_rgb(&yuyv, 2, 1);
        assert!(rgb.is_empty());
    }

    #[test]
    fn test_unopened_source_yields_no_frame() {
        let mut cap = V4l2Capture::new("/dev/video9");
        assert!(!cap.is_ready());
        assert!(cap.dimensions().is_none());
        assert!(cap.frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_device_maps_to_not_found() {
        let mut cap = V4l2Capture::new("/dev/video-does-not-exist");
        let err = cap.open(CaptureConstraints::default()).unwrap_err();
        assert!(matches!(err, CaptureError::DeviceNotFound { .. }));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut cap = V4l2Capture::new("/dev/video9");
        cap.stop();
        cap.stop();
        assert!(!cap.is_ready());
    }
}
