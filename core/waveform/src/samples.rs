/// Decoded single-channel audio, ready to be drawn.
///
/// Amplitudes are expected in `[-1.0, 1.0]`. The buffer is never mutated
/// after decoding; a new file produces a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    samples: Vec<f32>,
    sample_rate: u32,
    duration: f64,
}

impl AudioSamples {
    /// Builds a buffer from one channel of frames. Duration is derived from
    /// the frame count; a zero sample rate yields a zero duration.
    pub fn from_channel(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / f64::from(sample_rate)
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Takes the first channel out of interleaved frames.
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let first = interleaved.iter().step_by(channels).copied().collect();
        Self::from_channel(first, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
