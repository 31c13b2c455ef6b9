//! Hysteresis state machine over smoothed speech probabilities.
//!
//! Two stable states, two thresholds: the smoothed probability must sit
//! above the speech threshold for `required_speech_frames` consecutive
//! frames to confirm a start, and below the (lower) silence threshold for
//! `required_silence_frames` consecutive frames to confirm an end. Values
//! between the thresholds extend whatever state is current.

use tracing::debug;
use vadrec_common::VadOptions;

/// Edge emitted when the machine changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEdge {
    Start,
    End,
}

#[derive(Debug)]
pub struct SpeechDetector {
    speech_threshold: f32,
    silence_threshold: f32,
    required_speech_frames: u32,
    required_silence_frames: u32,
    recording: bool,
    speech_run: u32,
    silence_run: u32,
}

impl SpeechDetector {
    pub fn new(options: &VadOptions) -> Self {
        Self {
            speech_threshold: options.speech_threshold,
            silence_threshold: options.silence_threshold,
            required_speech_frames: options.required_speech_frames,
            required_silence_frames: options.required_silence_frames,
            recording: false,
            speech_run: 0,
            silence_run: 0,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Advance the machine by one frame's smoothed probability.
    pub fn process(&mut self, smoothed: f32) -> Option<SpeechEdge> {
        if self.recording {
            if smoothed < self.silence_threshold {
                self.silence_run += 1;
                if self.silence_run >= self.required_silence_frames {
                    self.recording = false;
                    self.silence_run = 0;
                    debug!("speech ended");
                    return Some(SpeechEdge::End);
                }
            } else {
                self.silence_run = 0;
            }
        } else if smoothed > self.speech_threshold {
            self.speech_run += 1;
            if self.speech_run >= self.required_speech_frames {
                self.recording = true;
                self.speech_run = 0;
                debug!("speech started");
                return Some(SpeechEdge::Start);
            }
        } else {
            self.speech_run = 0;
        }
        None
    }
}
