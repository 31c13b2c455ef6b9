//! Speech segment accumulation and WAV flushing.

use crate::error::VadError;
use crate::state::SharedStatus;
use crate::vad::framer::FRAME_SAMPLES;
use crate::vad::wav;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Accumulates frames between speech-start and speech-end, then writes the
/// merged samples as one WAV file. The recorder owns its buffer outright;
/// appended frames are copied in because the upstream frame storage is
/// reused.
pub struct SegmentRecorder {
    out_dir: PathBuf,
    rate: u32,
    samples: Vec<i16>,
    recording: bool,
    started_at: Option<DateTime<Local>>,
    /// 1-based index of the next segment written by this pipeline.
    segment_index: u64,
    status: SharedStatus,
}

impl SegmentRecorder {
    pub fn new(out_dir: PathBuf, rate: u32, status: SharedStatus) -> Self {
        Self {
            out_dir,
            rate,
            samples: Vec::new(),
            recording: false,
            started_at: None,
            segment_index: 0,
            status,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Open a new segment. No-op while one is already open.
    pub fn begin_segment(&mut self) {
        if self.recording {
            return;
        }
        self.recording = true;
        self.samples.clear();
        self.started_at = Some(Local::now());
    }

    pub fn append_frame(&mut self, frame: &[i16]) {
        self.samples.extend_from_slice(frame);
    }

    /// Close the open segment and write it out. No-op when no segment is
    /// open. On a write failure the buffered audio is dropped; status is
    /// only updated once the file is durably in place.
    pub fn end_segment(&mut self) -> Result<Option<PathBuf>, VadError> {
        if !self.recording {
            return Ok(None);
        }
        self.recording = false;
        let started_at = self.started_at.take();
        let samples = std::mem::take(&mut self.samples);
        debug_assert!(samples.len() >= FRAME_SAMPLES);

        let index = self.segment_index + 1;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = self.out_dir.join(format!("segment_{}_{}.wav", stamp, index));

        let bytes = wav::encode(&samples, self.rate)?;
        write_atomic(&path, &bytes)?;

        self.segment_index = index;
        self.status.record_segment(&path);

        let seconds = samples.len() as f64 / f64::from(self.rate);
        if let Some(started_at) = started_at {
            info!(
                "saved segment {} ({:.2}s, started {})",
                path.display(),
                seconds,
                started_at.format("%H:%M:%S")
            );
        }
        Ok(Some(path))
    }
}

/// Write via a temp file and rename so a crash never leaves a torn WAV.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), VadError> {
    let tmp = path.with_extension("wav.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
