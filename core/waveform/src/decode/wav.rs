use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::{
    decode::{AudioDecoder, DecodeError},
    samples::AudioSamples,
};

/// `WavDecoder` reads RIFF/WAVE payloads through hound.
///
/// Supports:
/// - any channel count (only the first channel is kept)
/// - 8/16/24/32-bit integer or 32-bit float samples (converted to `f32`)
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    fn decode_first_channel<R: std::io::Read>(
        reader: WavReader<R>,
    ) -> Result<AudioSamples, DecodeError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(DecodeError::InvalidSpec("WAV declares zero channels".into()));
        }
        if spec.sample_rate == 0 {
            return Err(DecodeError::InvalidSpec("WAV declares a zero sample rate".into()));
        }

        let channels = usize::from(spec.channels);
        let interleaved = match spec.sample_format {
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(DecodeError::InvalidSpec(format!(
                        "unsupported bit depth {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()
            }
            SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<f32>, _>>(),
        }
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        Ok(AudioSamples::from_interleaved(
            &interleaved,
            channels,
            spec.sample_rate,
        ))
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSamples, DecodeError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| DecodeError::Unsupported(format!("failed to parse WAV stream: {e}")))?;
        Self::decode_first_channel(reader)
    }
}
