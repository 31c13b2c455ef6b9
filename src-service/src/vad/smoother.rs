//! Trailing-window smoothing of raw speech probabilities.

use std::collections::VecDeque;

/// Window length in frames (~160 ms at 32 ms per frame).
pub const SMOOTHING_WINDOW: usize = 5;

/// Raw per-frame probabilities are spiky; averaging the last few suppresses
/// spurious transitions while staying responsive.
pub struct ProbabilitySmoother {
    window: VecDeque<f32>,
}

impl ProbabilitySmoother {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(SMOOTHING_WINDOW),
        }
    }

    /// Append a raw probability and return the mean of the current window.
    pub fn push(&mut self, raw: f32) -> f32 {
        if self.window.len() == SMOOTHING_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(raw);
        self.window.iter().sum::<f32>() / self.window.len() as f32
    }
}

impl Default for ProbabilitySmoother {
    fn default() -> Self {
        Self::new()
    }
}
