//! FaceMesh landmark session backed by ONNX Runtime via `ort`.
//!
//! The model predicts 468 3D landmarks for the single dominant face in
//! the frame, plus a face-presence score. The z coordinate is discarded;
//! the overlay is a 2D surface.

use std::path::Path;

use crate::session::domain::model_session::{ModelSession, SessionError};
use crate::session::infrastructure::onnx_blazeface_session::{preprocess, sigmoid};
use crate::shared::detection::{Detection, Point};
use crate::shared::frame::Frame;

/// FaceMesh model input resolution.
const INPUT_SIZE: u32 = 192;

/// Landmark count fixed by the model.
pub const LANDMARK_COUNT: usize = 468;

pub struct OnnxFacemeshSession {
    session: Option<ort::session::Session>,
    confidence: f64,
}

impl OnnxFacemeshSession {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, SessionError> {
        let session = ort::session::Session::builder()
            .map_err(|e| SessionError::Backend(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| SessionError::Model(e.to_string()))?;
        Ok(Self {
            session: Some(session),
            confidence,
        })
    }
}

impl ModelSession for OnnxFacemeshSession {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let session = self
            .session
            .as_mut()
            .ok_or("session already disposed")?;

        let fw = frame.width() as f32;
        let fh = frame.height() as f32;

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = session.run(ort::inputs![input_value])?;

        // Two output tensors: landmarks [1, 1404] (468 x xyz in input-pixel
        // space) and face presence [1, 1].
        if outputs.len() < 2 {
            return Err(
                format!("FaceMesh model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }
        let landmarks = outputs[0].try_extract_array::<f32>()?;
        let presence = outputs[1].try_extract_array::<f32>()?;
        let lm_data = landmarks.as_slice().ok_or("Cannot get landmark slice")?;
        let presence_raw = *presence
            .as_slice()
            .and_then(|s| s.first())
            .ok_or("Cannot get presence score")?;

        if (sigmoid(presence_raw) as f64) < self.confidence {
            return Ok(Vec::new());
        }
        if lm_data.len() < LANDMARK_COUNT * 3 {
            return Err(format!(
                "FaceMesh landmark tensor too short: {} < {}",
                lm_data.len(),
                LANDMARK_COUNT * 3
            )
            .into());
        }

        let points = lm_data
            .chunks_exact(3)
            .take(LANDMARK_COUNT)
            .map(|xyz| Point {
                x: xyz[0] / INPUT_SIZE as f32 * fw,
                y: xyz[1] / INPUT_SIZE as f32 * fh,
            })
            .collect();

        Ok(vec![Detection::Landmarks(points)])
    }

    fn dispose(&mut self) {
        if self.session.take().is_some() {
            log::debug!("FaceMesh session disposed");
        }
    }
}
