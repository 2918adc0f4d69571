use std::fmt;

use crate::samples::AudioSamples;

pub mod compressed;
pub mod wav;

pub use compressed::SymphoniaDecoder;
pub use wav::WavDecoder;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported audio format: {0}")]
    Unsupported(String),

    #[error("malformed audio data: {0}")]
    Malformed(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("invalid stream parameters: {0}")]
    InvalidSpec(String),
}

/// Turns raw file bytes into a single-channel sample buffer.
pub trait AudioDecoder: Send + fmt::Debug {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSamples, DecodeError>;
}

/// Picks the WAV reader for RIFF/WAVE payloads and symphonia for the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyDecoder {
    wav: WavDecoder,
    compressed: SymphoniaDecoder,
}

impl AnyDecoder {
    pub const fn new() -> Self {
        Self {
            wav: WavDecoder,
            compressed: SymphoniaDecoder,
        }
    }
}

impl AudioDecoder for AnyDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSamples, DecodeError> {
        if is_riff_wave(bytes) {
            log::debug!("decoding {} bytes as WAV", bytes.len());
            self.wav.decode(bytes)
        } else {
            log::debug!("decoding {} bytes with symphonia", bytes.len());
            self.compressed.decode(bytes)
        }
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}


#[cfg(test)]
mod decode_tests {
    use super::*;

    #[test]
    fn wav_payload_is_routed_to_wav_reader() {
        let bytes = fixtures::wav_bytes_f32(1, 8, &[0.25, -0.25, 0.5, -0.5]);
        let decoded = AnyDecoder::new().decode(&bytes).unwrap();
        assert_eq!(decoded.samples(), &[0.25, -0.25, 0.5, -0.5]);
        assert!((decoded.duration() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let bytes = b"definitely not an audio container".to_vec();
        assert!(AnyDecoder::new().decode(&bytes).is_err());
    }

    #[test]
    fn empty_input_fails_to_decode() {
        assert!(AnyDecoder::new().decode(&[]).is_err());
    }
}
