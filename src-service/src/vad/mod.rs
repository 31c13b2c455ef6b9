//! The streaming VAD pipeline.
//!
//! Bytes from the recorder child flow one way: framer → model → smoother →
//! detector → segment recorder. A single task drives the whole chain in
//! arrival order, so the recurrent model state is never reordered and
//! segment N+1 cannot start before segment N has been flushed.

mod detector;
mod framer;
mod model;
mod recorder;
mod smoother;
mod wav;

pub use model::{SileroModel, SpeechModel};

use framer::FRAME_SAMPLES;

use crate::error::VadError;
use crate::state::SharedStatus;
use detector::{SpeechDetector, SpeechEdge};
use framer::PcmFramer;
use recorder::SegmentRecorder;
use smoother::ProbabilitySmoother;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::ChildStdout;
use tracing::{error, info, warn};
use vadrec_common::VadOptions;

/// Queued samples above which the pipeline is falling behind real time.
/// Nothing is dropped; the condition is only logged.
const QUEUE_WARN_SAMPLES: usize = FRAME_SAMPLES * 32;

/// Per-frame processing chain. Generic over the model so the segmentation
/// behavior can be exercised with a scripted probability trace.
pub struct VadPipeline<M: SpeechModel> {
    framer: PcmFramer,
    model: M,
    smoother: ProbabilitySmoother,
    detector: SpeechDetector,
    recorder: SegmentRecorder,
    queue_warned: bool,
}

impl<M: SpeechModel> VadPipeline<M> {
    pub fn new(model: M, options: &VadOptions, status: SharedStatus) -> Self {
        Self {
            framer: PcmFramer::new(),
            model,
            smoother: ProbabilitySmoother::new(),
            detector: SpeechDetector::new(options),
            recorder: SegmentRecorder::new(options.out_dir.clone(), options.rate, status),
            queue_warned: false,
        }
    }

    /// Absorb one chunk from the byte stream and process every complete
    /// frame it makes available.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<(), VadError> {
        self.framer.extend(chunk);

        let queued = self.framer.queued_samples();
        if queued > QUEUE_WARN_SAMPLES {
            if !self.queue_warned {
                warn!(
                    "sample queue depth {} exceeds {}; inference is not keeping up",
                    queued, QUEUE_WARN_SAMPLES
                );
                self.queue_warned = true;
            }
        } else {
            self.queue_warned = false;
        }

        while let Some(frame) = self.framer.next_frame() {
            self.process_frame(&frame)?;
        }
        Ok(())
    }

    fn process_frame(&mut self, frame: &[i16]) -> Result<(), VadError> {
        let raw = self.model.infer(frame)?;
        let smoothed = self.smoother.push(raw);

        // While recording, every frame belongs to the segment, including the
        // one that ends up confirming silence below.
        if self.detector.is_recording() {
            self.recorder.append_frame(frame);
        }

        match self.detector.process(smoothed) {
            Some(SpeechEdge::Start) => {
                self.recorder.begin_segment();
                // the confirming frame is part of the segment
                self.recorder.append_frame(frame);
            }
            Some(SpeechEdge::End) => self.flush_segment(),
            None => {}
        }
        Ok(())
    }

    /// Flush any in-progress segment. Safe on every exit path; a no-op when
    /// nothing is being recorded.
    pub fn finish(&mut self) {
        self.flush_segment();
    }

    fn flush_segment(&mut self) {
        if let Err(err) = self.recorder.end_segment() {
            warn!("segment write failed, audio lost: {}", err);
        }
    }
}

/// Drive the pipeline from the recorder child's stdout until end-of-stream,
/// an error, or the abort flag. Every exit path flushes the open segment
/// and clears `running`.
pub async fn run<M: SpeechModel>(
    mut stdout: ChildStdout,
    mut pipeline: VadPipeline<M>,
    abort: Arc<AtomicBool>,
    status: SharedStatus,
) {
    let mut buf = vec![0u8; 4096];
    let mut first_error: Option<VadError> = None;

    loop {
        if abort.load(Ordering::SeqCst) {
            info!("pipeline abort requested");
            break;
        }
        match stdout.read(&mut buf).await {
            Ok(0) => {
                info!("recorder stream ended");
                break;
            }
            Ok(n) => {
                if let Err(err) = pipeline.push_bytes(&buf[..n]) {
                    first_error = Some(err);
                    break;
                }
            }
            Err(err) => {
                first_error = Some(err.into());
                break;
            }
        }
    }

    pipeline.finish();
    status.set_running(false);

    match first_error {
        Some(err) => error!("pipeline terminated: {}", err),
        None => info!("pipeline exited cleanly"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    /// Returns one probability per frame, in order; 0.0 once exhausted.
    struct ScriptedModel {
        probabilities: Vec<f32>,
        cursor: usize,
    }

    impl ScriptedModel {
        fn new(probabilities: Vec<f32>) -> Self {
            Self {
                probabilities,
                cursor: 0,
            }
        }
    }

    impl SpeechModel for ScriptedModel {
        fn infer(&mut self, frame: &[i16]) -> Result<f32, VadError> {
            assert_eq!(frame.len(), FRAME_SAMPLES);
            let p = self.probabilities.get(self.cursor).copied().unwrap_or(0.0);
            self.cursor += 1;
            Ok(p)
        }
    }

    struct FailingModel;

    impl SpeechModel for FailingModel {
        fn infer(&mut self, _frame: &[i16]) -> Result<f32, VadError> {
            Err(VadError::InferenceFailed("scripted failure".to_string()))
        }
    }

    fn trace(spans: &[(usize, f32)]) -> Vec<f32> {
        spans
            .iter()
            .flat_map(|&(count, p)| std::iter::repeat(p).take(count))
            .collect()
    }

    fn frame_bytes(count: usize) -> Vec<u8> {
        // arbitrary non-zero samples; probabilities come from the script
        let mut bytes = Vec::with_capacity(count * FRAME_SAMPLES * 2);
        for i in 0..count * FRAME_SAMPLES {
            bytes.extend_from_slice(&((i % 251) as i16).to_le_bytes());
        }
        bytes
    }

    fn pipeline_for(
        dir: &Path,
        probabilities: Vec<f32>,
        status: SharedStatus,
    ) -> VadPipeline<ScriptedModel> {
        let mut options = VadOptions::default();
        options.out_dir = dir.to_path_buf();
        VadPipeline::new(ScriptedModel::new(probabilities), &options, status)
    }

    fn wav_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn wav_sample_count(path: &Path) -> usize {
        hound::WavReader::open(path).unwrap().len() as usize
    }

    #[test]
    fn silence_writes_nothing() {
        // ~10 seconds of silence
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(dir.path(), trace(&[(312, 0.0)]), status.clone());

        pipeline.push_bytes(&frame_bytes(312)).unwrap();
        pipeline.finish();

        assert!(wav_names(dir.path()).is_empty());
        assert_eq!(status.snapshot().segments_saved, 0);
        assert!(status.snapshot().last_segment_path.is_none());
    }

    #[test]
    fn one_clean_segment() {
        // 50 silent frames, 100 speech frames, 50 silent frames.
        //
        // With defaults and the 5-frame smoother: the smoothed value first
        // clears 0.35 on the second speech frame, so the start is confirmed
        // on the third; the silence run reaches 20 on the 24th trailing
        // frame. The segment therefore spans frames 53..=174 of the trace:
        // 122 frames.
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(
            dir.path(),
            trace(&[(50, 0.0), (100, 0.9), (50, 0.0)]),
            status.clone(),
        );

        pipeline.push_bytes(&frame_bytes(200)).unwrap();
        pipeline.finish();

        let names = wav_names(dir.path());
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("segment_"));
        assert!(names[0].ends_with("_1.wav"));
        assert_eq!(
            wav_sample_count(&dir.path().join(&names[0])),
            122 * FRAME_SAMPLES
        );
        assert_eq!(status.snapshot().segments_saved, 1);
    }

    #[test]
    fn stray_spike_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(
            dir.path(),
            trace(&[(100, 0.0), (1, 0.9), (100, 0.0)]),
            status.clone(),
        );

        pipeline.push_bytes(&frame_bytes(201)).unwrap();
        pipeline.finish();

        assert!(wav_names(dir.path()).is_empty());
        assert_eq!(status.snapshot().segments_saved, 0);
    }

    #[test]
    fn two_segments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(
            dir.path(),
            trace(&[(100, 0.9), (40, 0.0), (100, 0.9), (50, 0.0)]),
            status.clone(),
        );

        pipeline.push_bytes(&frame_bytes(290)).unwrap();
        pipeline.finish();

        let names = wav_names(dir.path());
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("_1.wav"));
        assert!(names[1].ends_with("_2.wav"));
        assert_eq!(status.snapshot().segments_saved, 2);
    }

    #[test]
    fn finish_flushes_open_segment() {
        // stopped mid-speech: everything since the confirmed start lands in
        // exactly one file
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(
            dir.path(),
            trace(&[(50, 0.0), (30, 0.9)]),
            status.clone(),
        );

        pipeline.push_bytes(&frame_bytes(80)).unwrap();
        pipeline.finish();

        let names = wav_names(dir.path());
        assert_eq!(names.len(), 1);
        // start confirmed on the third speech frame → 28 frames captured
        assert_eq!(
            wav_sample_count(&dir.path().join(&names[0])),
            28 * FRAME_SAMPLES
        );
        assert_eq!(status.snapshot().segments_saved, 1);

        // a second finish must not write anything else
        pipeline.finish();
        assert_eq!(wav_names(dir.path()).len(), 1);
    }

    #[test]
    fn chunked_delivery_matches_bulk_delivery() {
        let dir = tempfile::tempdir().unwrap();
        let status = SharedStatus::default();
        let mut pipeline = pipeline_for(
            dir.path(),
            trace(&[(10, 0.0), (30, 0.9), (30, 0.0)]),
            status.clone(),
        );

        // drip the same stream through in uneven, odd-sized chunks
        let bytes = frame_bytes(70);
        for chunk in bytes.chunks(997) {
            pipeline.push_bytes(chunk).unwrap();
        }
        pipeline.finish();

        assert_eq!(wav_names(dir.path()).len(), 1);
        assert_eq!(status.snapshot().segments_saved, 1);
    }

    #[test]
    fn inference_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = VadOptions::default();
        options.out_dir = dir.path().to_path_buf();
        let mut pipeline = VadPipeline::new(FailingModel, &options, SharedStatus::default());

        let err = pipeline.push_bytes(&frame_bytes(1)).unwrap_err();
        assert!(matches!(err, VadError::InferenceFailed(_)));
    }
}
