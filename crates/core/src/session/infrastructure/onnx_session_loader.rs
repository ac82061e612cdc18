use std::path::PathBuf;

use crate::session::domain::model_session::{
    ModelSession, ModelVariant, SessionConfig, SessionError, SessionLoader,
};
use crate::session::infrastructure::model_resolver::{self, ProgressFn};
use crate::session::infrastructure::onnx_blazeface_session::OnnxBlazefaceSession;
use crate::session::infrastructure::onnx_facemesh_session::OnnxFacemeshSession;
use crate::shared::constants::{
    BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL, FACEMESH_MODEL_NAME, FACEMESH_MODEL_URL,
};

/// Resolves model weights and builds the ONNX session for a variant.
pub struct OnnxSessionLoader {
    bundled_dir: Option<PathBuf>,
    download_progress: Option<fn(u64, u64)>,
}

impl OnnxSessionLoader {
    pub fn new() -> Self {
        Self {
            bundled_dir: None,
            download_progress: None,
        }
    }

    /// Directory checked for pre-packaged weights before downloading.
    pub fn with_bundled_dir(mut self, dir: PathBuf) -> Self {
        self.bundled_dir = Some(dir);
        self
    }

    pub fn with_download_progress(mut self, progress: fn(u64, u64)) -> Self {
        self.download_progress = Some(progress);
        self
    }
}

impl Default for OnnxSessionLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLoader for OnnxSessionLoader {
    fn load(&self, config: &SessionConfig) -> Result<Box<dyn ModelSession>, SessionError> {
        let (name, url) = match config.variant {
            ModelVariant::ShortRange => (BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL),
            ModelVariant::Mesh => (FACEMESH_MODEL_NAME, FACEMESH_MODEL_URL),
        };

        log::info!("resolving model: {name}");
        let progress: Option<ProgressFn> = self.download_progress.map(|f| Box::new(f) as _);
        let model_path = model_resolver::resolve(name, url, self.bundled_dir.as_deref(), progress)?;

        match config.variant {
            ModelVariant::ShortRange => Ok(Box::new(OnnxBlazefaceSession::new(
                &model_path,
                config.confidence,
                config.max_detections,
            )?)),
            ModelVariant::Mesh => Ok(Box::new(OnnxFacemeshSession::new(
                &model_path,
                config.confidence,
            )?)),
        }
    }
}
