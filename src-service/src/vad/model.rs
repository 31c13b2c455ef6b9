//! Neural speech-probability model.
//!
//! The ONNX model is recurrent: every call consumes and replaces an LSTM
//! state tensor, so frames must be fed strictly in stream order and the
//! state must never be shared. `SileroModel` owns that state exclusively
//! and moves a fresh tensor in on every inference.

use crate::error::VadError;
use crate::vad::framer::FRAME_SAMPLES;
use ndarray::{Array1, Array2, Array3};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;

/// LSTM state shape: two layers, batch of one, 128 hidden units.
const STATE_SHAPE: (usize, usize, usize) = (2, 1, 128);

/// Per-frame inference. The pipeline is generic over this so tests can
/// drive it with a scripted probability trace.
pub trait SpeechModel {
    /// Compute the speech probability for one 512-sample frame.
    fn infer(&mut self, frame: &[i16]) -> Result<f32, VadError>;
}

pub struct SileroModel {
    session: Session,
    state: Array3<f32>,
    sample_rate: i64,
}

impl SileroModel {
    /// Load the model once at pipeline start. The hidden state begins at
    /// zero and is threaded through every subsequent call.
    pub fn load(path: &Path, sample_rate: u32) -> Result<Self, VadError> {
        if !path.is_file() {
            return Err(VadError::ModelUnavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(model_load)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_load)?
            .with_intra_threads(1)
            .map_err(model_load)?
            .with_inter_threads(1)
            .map_err(model_load)?
            .commit_from_file(path)
            .map_err(model_load)?;

        Ok(Self {
            session,
            state: Array3::zeros(STATE_SHAPE),
            sample_rate: i64::from(sample_rate),
        })
    }
}

impl SpeechModel for SileroModel {
    fn infer(&mut self, frame: &[i16]) -> Result<f32, VadError> {
        if frame.len() != FRAME_SAMPLES {
            return Err(VadError::InferenceFailed(format!(
                "frame size mismatch (got {}, expected {})",
                frame.len(),
                FRAME_SAMPLES
            )));
        }

        let normalized: Vec<f32> = frame.iter().map(|&s| f32::from(s) / 32_768.0).collect();
        let audio = Array2::from_shape_vec((1, FRAME_SAMPLES), normalized).map_err(inference)?;
        let sr = Array1::from_vec(vec![self.sample_rate]);

        let input_tensor = TensorRef::from_array_view(&audio).map_err(inference)?;
        let sr_tensor = TensorRef::from_array_view(&sr).map_err(inference)?;
        let state_tensor = TensorRef::from_array_view(&self.state).map_err(inference)?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input" => input_tensor,
                "sr" => sr_tensor,
                "state" => state_tensor
            ])
            .map_err(inference)?;

        let (_, probabilities) = outputs["output"]
            .try_extract_tensor::<f32>()
            .map_err(inference)?;
        let probability = probabilities.first().copied().unwrap_or(0.0);

        let (_, next_state) = outputs["stateN"]
            .try_extract_tensor::<f32>()
            .map_err(inference)?;
        let next_state = next_state.to_vec();
        drop(outputs);
        self.state = Array3::from_shape_vec(STATE_SHAPE, next_state).map_err(inference)?;

        Ok(probability.clamp(0.0, 1.0))
    }
}

fn model_load(err: impl std::fmt::Display) -> VadError {
    VadError::ModelUnavailable(err.to_string())
}

fn inference(err: impl std::fmt::Display) -> VadError {
    VadError::InferenceFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_reported() {
        let err = SileroModel::load(Path::new("/nonexistent/model.onnx"), 16_000).unwrap_err();
        match err {
            VadError::ModelUnavailable(msg) => assert!(msg.contains("not found")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
