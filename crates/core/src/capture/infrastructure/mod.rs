#[cfg(target_os = "linux")]
pub mod v4l2_capture;
