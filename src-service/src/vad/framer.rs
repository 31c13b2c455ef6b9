//! Byte-accurate framing of the raw PCM stream.
//!
//! Chunks arrive from the recorder's stdout at arbitrary sizes with no
//! alignment guarantee, so a read can end mid-sample. The framer pairs
//! little-endian bytes into i16 samples, carrying at most one trailing byte
//! to the next chunk, and hands out exact 512-sample frames in arrival
//! order.

use std::collections::VecDeque;

/// Samples per analysis frame (~32 ms at 16 kHz).
pub const FRAME_SAMPLES: usize = 512;

pub struct PcmFramer {
    /// Low byte of a sample split across chunk boundaries.
    leftover: Option<u8>,
    queue: VecDeque<i16>,
}

impl PcmFramer {
    pub fn new() -> Self {
        Self {
            leftover: None,
            queue: VecDeque::with_capacity(FRAME_SAMPLES * 4),
        }
    }

    /// Absorb a chunk of raw bytes. Empty chunks are valid no-ops.
    pub fn extend(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let data = match self.leftover.take() {
            Some(low) => {
                self.queue.push_back(i16::from_le_bytes([low, chunk[0]]));
                &chunk[1..]
            }
            None => chunk,
        };

        let mut pairs = data.chunks_exact(2);
        for pair in &mut pairs {
            self.queue.push_back(i16::from_le_bytes([pair[0], pair[1]]));
        }
        if let Some(&byte) = pairs.remainder().first() {
            self.leftover = Some(byte);
        }
    }

    /// Pop the next complete frame, or `None` if fewer than 512 samples are
    /// queued. A trailing partial frame is never emitted.
    pub fn next_frame(&mut self) -> Option<Vec<i16>> {
        if self.queue.len() < FRAME_SAMPLES {
            return None;
        }
        Some(self.queue.drain(..FRAME_SAMPLES).collect())
    }

    pub fn queued_samples(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    fn has_leftover(&self) -> bool {
        self.leftover.is_some()
    }
}

impl Default for PcmFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_frames(framer: &mut PcmFramer) -> Vec<Vec<i16>> {
        let mut frames = Vec::new();
        while let Some(frame) = framer.next_frame() {
            frames.push(frame);
        }
        frames
    }

    fn test_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn emits_floor_of_total_samples() {
        // 10_000 bytes = 5_000 samples = 9 full frames + 392 queued
        let mut framer = PcmFramer::new();
        framer.extend(&test_bytes(10_000));
        let frames = drain_frames(&mut framer);
        assert_eq!(frames.len(), 9);
        assert!(frames.iter().all(|f| f.len() == FRAME_SAMPLES));
        assert_eq!(framer.queued_samples(), 5_000 - 9 * FRAME_SAMPLES);
        assert!(!framer.has_leftover());
    }

    #[test]
    fn empty_chunks_produce_nothing() {
        let mut framer = PcmFramer::new();
        framer.extend(&[]);
        assert!(framer.next_frame().is_none());
        assert_eq!(framer.queued_samples(), 0);
    }

    #[test]
    fn split_chunks_match_single_chunk() {
        let bytes = test_bytes(4 * FRAME_SAMPLES + 3);
        let mut whole = PcmFramer::new();
        whole.extend(&bytes);
        let expected = drain_frames(&mut whole);

        // every split point, including ones landing mid-sample
        for split in [1, 2, 511, 512, 513, 1023, 1024, 2049] {
            let mut framer = PcmFramer::new();
            framer.extend(&bytes[..split]);
            let mut frames = drain_frames(&mut framer);
            framer.extend(&bytes[split..]);
            frames.extend(drain_frames(&mut framer));
            assert_eq!(frames, expected, "split at {}", split);
        }
    }

    #[test]
    fn odd_byte_carries_across_reads() {
        let mut framer = PcmFramer::new();
        framer.extend(&[0x34]);
        assert!(framer.has_leftover());
        assert_eq!(framer.queued_samples(), 0);
        framer.extend(&[0x12]);
        assert!(!framer.has_leftover());
        assert_eq!(framer.queued_samples(), 1);
    }

    #[test]
    fn samples_are_little_endian() {
        let mut framer = PcmFramer::new();
        framer.extend(&[0x01, 0x02]); // 0x0201
        framer.extend(&[0xFF, 0xFF]); // -1
        framer.extend(&vec![0u8; (FRAME_SAMPLES - 2) * 2]);
        let frame = framer.next_frame().unwrap();
        assert_eq!(frame[0], 0x0201);
        assert_eq!(frame[1], -1);
    }

    #[test]
    fn odd_then_single_byte_completes_one_frame() {
        // 1023 bytes: 511 samples queued plus a carried byte, no frame yet.
        let mut framer = PcmFramer::new();
        framer.extend(&test_bytes(1023));
        assert!(framer.next_frame().is_none());
        assert_eq!(framer.queued_samples(), 511);
        assert!(framer.has_leftover());

        // The pairing byte closes sample 512: exactly one frame, empty queue.
        framer.extend(&[0x7F]);
        let frame = framer.next_frame().unwrap();
        assert_eq!(frame.len(), FRAME_SAMPLES);
        assert!(framer.next_frame().is_none());
        assert_eq!(framer.queued_samples(), 0);
        assert!(!framer.has_leftover());
    }
}
