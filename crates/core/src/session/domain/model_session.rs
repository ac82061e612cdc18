use thiserror::Error;

use crate::session::infrastructure::model_resolver::ModelResolveError;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Which pretrained face model a session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelVariant {
    /// BlazeFace short-range: bounding boxes, fast, near-field faces.
    ShortRange,
    /// FaceMesh: 468 landmark points for a single dominant face.
    Mesh,
}

/// Load configuration for a model session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub variant: ModelVariant,
    /// Detections beyond this count are dropped (model order).
    pub max_detections: usize,
    /// Confidence threshold in [0, 1].
    pub confidence: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: ModelVariant::ShortRange,
            max_detections: 10,
            confidence: 0.5,
        }
    }
}

/// Failures while acquiring the inference backend or its weights.
///
/// All of these are fatal for the session being created; the detection
/// loop surfaces them and halts in its Error state.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Resolve(#[from] ModelResolveError),
    #[error("model load failed: {0}")]
    Model(String),
    #[error("inference backend initialization failed: {0}")]
    Backend(String),
}

/// A long-lived handle to a loaded inference model.
///
/// Created once per loop lifetime and reused across frames. Implementations
/// may hold backend device memory, so `dispose` must be called when the
/// loop stops; after `dispose`, `infer` fails.
///
/// An empty result list means "no faces", not an error. Result order is
/// model-defined and not guaranteed stable across calls.
pub trait ModelSession: Send {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;

    /// Release backend resources. Idempotent.
    fn dispose(&mut self);
}

/// Builds a `ModelSession` from a configuration.
///
/// This is the boundary to the inference library: everything behind it
/// (weight files, execution providers, tensors) is opaque to the loop.
pub trait SessionLoader: Send {
    fn load(&self, config: &SessionConfig) -> Result<Box<dyn ModelSession>, SessionError>;
}
