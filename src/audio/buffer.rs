/// In-memory PCM audio, interleaved f32 samples in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        debug_assert!(channels > 0);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// An empty buffer sharing this buffer's format.
    pub fn empty_like(&self) -> Self {
        Self {
            samples: Vec::new(),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append another buffer's samples. Caller guarantees matching format.
    pub fn extend_from(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(self.channels, other.channels);
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Cut the buffer down to at most `seconds` of audio.
    pub fn truncate_to_seconds(&mut self, seconds: f64) {
        let max_frames = (seconds * self.sample_rate as f64).round() as usize;
        let max_samples = max_frames * self.channels as usize;
        if self.samples.len() > max_samples {
            self.samples.truncate(max_samples);
        }
    }

    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}
