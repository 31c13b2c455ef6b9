//! WAV encoding for segment files.
//!
//! Segments are mono 16-bit PCM, so the output is the canonical 44-byte
//! RIFF header followed by the little-endian sample payload.

use crate::error::VadError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Encode samples into a complete in-memory WAV file.
pub fn encode(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, VadError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_err)?;
        for &sample in samples {
            writer.write_sample(sample).map_err(encode_err)?;
        }
        writer.finalize().map_err(encode_err)?;
    }
    Ok(cursor.into_inner())
}

fn encode_err(err: hound::Error) -> VadError {
    VadError::Io(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn header_layout_is_canonical() {
        let samples: Vec<i16> = (0..600).map(|i| (i * 13) as i16).collect();
        let bytes = encode(&samples, 16_000).unwrap();
        let data_size = (samples.len() * 2) as u32;

        assert_eq!(bytes.len(), 44 + samples.len() * 2);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + data_size);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16); // fmt chunk size
        assert_eq!(u16_at(&bytes, 20), 1); // PCM
        assert_eq!(u16_at(&bytes, 22), 1); // mono
        assert_eq!(u32_at(&bytes, 24), 16_000); // sample rate
        assert_eq!(u32_at(&bytes, 28), 32_000); // byte rate
        assert_eq!(u16_at(&bytes, 32), 2); // block align
        assert_eq!(u16_at(&bytes, 34), 16); // bits per sample
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), data_size);
    }

    #[test]
    fn samples_roundtrip() {
        let samples: Vec<i16> = vec![0, 1, -1, i16::MAX, i16::MIN, 12345, -12345];
        let bytes = encode(&samples, 16_000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn empty_payload_is_header_only() {
        let bytes = encode(&[], 16_000).unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(u32_at(&bytes, 40), 0);
    }

    #[test]
    fn payload_bytes_are_little_endian() {
        let bytes = encode(&[0x0201], 16_000).unwrap();
        assert_eq!(bytes[44], 0x01);
        assert_eq!(bytes[45], 0x02);
    }
}
