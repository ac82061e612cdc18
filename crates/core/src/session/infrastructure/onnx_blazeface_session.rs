//! BlazeFace short-range session backed by ONNX Runtime via `ort`.
//!
//! Produces bounding boxes only; landmark output comes from the mesh
//! session instead.

use std::path::Path;

use crate::session::domain::model_session::{ModelSession, SessionError};
use crate::shared::detection::{BoundingBox, Detection};
use crate::shared::frame::Frame;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

pub struct OnnxBlazefaceSession {
    session: Option<ort::session::Session>,
    confidence: f64,
    max_detections: usize,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceSession {
    pub fn new(
        model_path: &Path,
        confidence: f64,
        max_detections: usize,
    ) -> Result<Self, SessionError> {
        let session = ort::session::Session::builder()
            .map_err(|e| SessionError::Backend(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| SessionError::Model(e.to_string()))?;
        Ok(Self {
            session: Some(session),
            confidence,
            max_detections,
            anchors: generate_anchors(),
        })
    }
}

impl ModelSession for OnnxBlazefaceSession {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let session = self
            .session
            .as_mut()
            .ok_or("session already disposed")?;

        let fw = frame.width();
        let fh = frame.height();

        // Resize to 128x128, normalize to [0,1], NCHW.
        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = session.run(ort::inputs![input_value])?;

        // Two output tensors: regressors [1, 896, 16] and scores [1, 896, 1].
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        // Decode anchor boxes and filter by confidence.
        let mut raw = Vec::new();
        let num_anchors = self.anchors.len().min(NUM_ANCHORS);
        for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
            let score = sigmoid(raw_score);
            if (score as f64) < self.confidence {
                continue;
            }

            let anchor = &self.anchors[i];
            let reg_offset = i * 16;
            if reg_offset + 4 > reg_data.len() {
                break;
            }

            // Box center + size relative to the anchor, in model space.
            let cx = anchor[0] + reg_data[reg_offset] / INPUT_SIZE as f32;
            let cy = anchor[1] + reg_data[reg_offset + 1] / INPUT_SIZE as f32;
            let w = reg_data[reg_offset + 2] / INPUT_SIZE as f32;
            let h = reg_data[reg_offset + 3] / INPUT_SIZE as f32;

            raw.push(BoundingBox {
                x: (cx - w / 2.0) * fw as f32,
                y: (cy - h / 2.0) * fh as f32,
                width: w * fw as f32,
                height: h * fh as f32,
                score,
            });
        }

        let mut kept = nms(&mut raw, NMS_IOU_THRESH);
        kept.truncate(self.max_detections);

        Ok(kept
            .into_iter()
            .map(|b| Detection::Box(b.clamped_to(fw, fh)))
            .collect())
    }

    fn dispose(&mut self) {
        if self.session.take().is_some() {
            log::debug!("BlazeFace session disposed");
        }
    }
}

/// Resize frame to `size x size` and normalize to [0,1] NCHW float32.
pub(crate) fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Generate BlazeFace anchors for the short-range model: 16x16 and 8x8
/// feature maps with 2 and 6 anchors per cell.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }
    anchors
}

/// Greedy NMS: highest score first, suppress overlaps above the threshold.
fn nms(boxes: &mut [BoundingBox], iou_thresh: f64) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<BoundingBox> = Vec::new();
    for candidate in boxes.iter() {
        if keep.iter().all(|k| k.iou(candidate) <= iou_thresh) {
            keep.push(candidate.clone());
        }
    }
    keep
}

pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, w: f32, h: f32, score: f32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width: w,
            height: h,
            score,
        }
    }

    #[test]
    fn test_preprocess_shape() {
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 0, 0);
        let tensor = preprocess(&frame, 128);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
    }

    #[test]
    fn test_preprocess_normalized() {
        let frame = Frame::new(vec![255u8; 50 * 50 * 3], 50, 50, 0, 0);
        let tensor = preprocess(&frame, 128);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_generate_anchors_count() {
        // 16x16 grid x 2 anchors + 8x8 grid x 6 anchors = 512 + 384 = 896
        assert_eq!(generate_anchors().len(), NUM_ANCHORS);
    }

    #[test]
    fn test_anchors_in_unit_range() {
        for a in generate_anchors() {
            assert!(a[0] > 0.0 && a[0] < 1.0);
            assert!(a[1] > 0.0 && a[1] < 1.0);
        }
    }

    #[test]
    fn test_sigmoid_midpoint_and_tails() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!((sigmoid(10.0) - 1.0).abs() < 0.001);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut boxes = vec![
            bbox(0.0, 0.0, 100.0, 100.0, 0.9),
            bbox(5.0, 5.0, 100.0, 100.0, 0.7),
        ];
        let kept = nms(&mut boxes, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_nms_keeps_separate() {
        let mut boxes = vec![
            bbox(0.0, 0.0, 50.0, 50.0, 0.9),
            bbox(200.0, 200.0, 50.0, 50.0, 0.8),
        ];
        let kept = nms(&mut boxes, 0.3);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_orders_by_score() {
        let mut boxes = vec![
            bbox(200.0, 200.0, 50.0, 50.0, 0.6),
            bbox(0.0, 0.0, 50.0, 50.0, 0.95),
        ];
        let kept = nms(&mut boxes, 0.3);
        assert!((kept[0].score - 0.95).abs() < f32::EPSILON);
    }
}
