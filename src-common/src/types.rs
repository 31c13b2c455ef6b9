//! Option and status types for the VAD service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sample rate the neural model was trained for. Input at any other rate is
/// rejected at start.
pub const REQUIRED_SAMPLE_RATE: u32 = 16_000;

/// Configuration for a VAD run. Immutable while a pipeline is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VadOptions {
    /// Sample rate of the incoming PCM stream in Hz.
    pub rate: u32,
    /// Directory where segment WAV files are written.
    pub out_dir: PathBuf,
    /// Path to the VAD model artifact (ONNX).
    pub model_path: PathBuf,
    /// Smoothed-probability threshold to arm a speech start.
    pub speech_threshold: f32,
    /// Smoothed-probability threshold to arm a speech end.
    pub silence_threshold: f32,
    /// Consecutive frames above the speech threshold to confirm a start.
    pub required_speech_frames: u32,
    /// Consecutive frames below the silence threshold to confirm an end.
    pub required_silence_frames: u32,
}

impl Default for VadOptions {
    fn default() -> Self {
        Self {
            rate: REQUIRED_SAMPLE_RATE,
            out_dir: default_out_dir(),
            model_path: PathBuf::from("models/silero_vad.onnx"),
            speech_threshold: 0.35,
            silence_threshold: 0.05,
            required_speech_frames: 2,
            required_silence_frames: 20,
        }
    }
}

impl VadOptions {
    /// Check that the options describe a runnable configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.rate != REQUIRED_SAMPLE_RATE {
            return Err(format!(
                "unsupported sample rate {} (the model requires {})",
                self.rate, REQUIRED_SAMPLE_RATE
            ));
        }
        if !(0.0..=1.0).contains(&self.speech_threshold)
            || !(0.0..=1.0).contains(&self.silence_threshold)
        {
            return Err("thresholds must be within [0, 1]".to_string());
        }
        if self.silence_threshold >= self.speech_threshold {
            return Err(format!(
                "silenceThreshold ({}) must be below speechThreshold ({})",
                self.silence_threshold, self.speech_threshold
            ));
        }
        if self.required_speech_frames == 0 || self.required_silence_frames == 0 {
            return Err("frame requirements must be at least 1".to_string());
        }
        Ok(())
    }

    /// Merge a partial update into these options. Absent fields are left
    /// untouched.
    pub fn apply(&mut self, patch: &VadOptionsPatch) {
        if let Some(rate) = patch.rate {
            self.rate = rate;
        }
        if let Some(ref out_dir) = patch.out_dir {
            self.out_dir = out_dir.clone();
        }
        if let Some(ref model_path) = patch.model_path {
            self.model_path = model_path.clone();
        }
        if let Some(speech_threshold) = patch.speech_threshold {
            self.speech_threshold = speech_threshold;
        }
        if let Some(silence_threshold) = patch.silence_threshold {
            self.silence_threshold = silence_threshold;
        }
        if let Some(required_speech_frames) = patch.required_speech_frames {
            self.required_speech_frames = required_speech_frames;
        }
        if let Some(required_silence_frames) = patch.required_silence_frames {
            self.required_silence_frames = required_silence_frames;
        }
    }
}

/// Partial options update. Every field is optional; unknown keys are
/// rejected because the recognized option set is closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VadOptionsPatch {
    pub rate: Option<u32>,
    pub out_dir: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub speech_threshold: Option<f32>,
    pub silence_threshold: Option<f32>,
    pub required_speech_frames: Option<u32>,
    pub required_silence_frames: Option<u32>,
}

impl VadOptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.rate.is_none()
            && self.out_dir.is_none()
            && self.model_path.is_none()
            && self.speech_threshold.is_none()
            && self.silence_threshold.is_none()
            && self.required_speech_frames.is_none()
            && self.required_silence_frames.is_none()
    }
}

/// Snapshot of the service state, as reported by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VadStatus {
    /// Whether a capture/inference pipeline is active.
    pub running: bool,
    /// WAV segments written since the service started.
    pub segments_saved: u64,
    /// Most recently written segment, absent until the first flush.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_segment_path: Option<String>,
}

/// Default segment directory: the user's music folder if one exists,
/// otherwise a relative `segments` directory.
fn default_out_dir() -> PathBuf {
    if let Some(dirs) = directories::UserDirs::new() {
        if let Some(audio) = dirs.audio_dir() {
            return audio.join("vadrec");
        }
        return dirs.home_dir().join("vadrec").join("segments");
    }
    PathBuf::from("segments")
}
