use thiserror::Error;

use crate::capture::domain::capture_source::CaptureError;
use crate::session::domain::model_session::SessionError;

/// Lifecycle of one detection loop instance.
///
/// Idle -> Initializing (start), Initializing -> Ready (model + camera
/// acquired) or -> Error (fatal failure), Ready -> Running (first frame
/// submitted), Running -> Running (steady state), any -> Idle (explicit
/// stop). Transient per-cycle failures never leave Running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Initializing,
    Ready,
    Running,
    Error,
}

/// Fatal initialization failures; the only errors that change loop state.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
