//! The named audio transformations applied by variation profiles.
//!
//! Every transformation is a pure function over an [`AudioBuffer`]. Fixed
//! parameters (cutoffs, fade length, stutter window, shift amount) are
//! module constants; changing them changes every render deterministically.

use std::f64::consts::PI;

use tracing::warn;

use super::AudioBuffer;

/// Peak amplitude targeted by `normalize`. Applying normalize twice is
/// equivalent to applying it once.
const NORMALIZE_PEAK: f32 = 0.99;
/// Low-pass cutoff in Hz.
const LOW_PASS_CUTOFF_HZ: f64 = 500.0;
/// High-pass cutoff in Hz.
const HIGH_PASS_CUTOFF_HZ: f64 = 250.0;
/// Butterworth Q for both filters.
const FILTER_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;
/// Linear fade length in milliseconds, clamped to the buffer length.
const FADE_MS: u32 = 1000;
/// Stutter slice window in milliseconds.
const STUTTER_WINDOW_MS: u32 = 125;
/// Pitch shift amount in semitones; the resample rate is 2^(semitones/12).
const PITCH_SHIFT_SEMITONES: f64 = 2.0;

/// A single named audio effect.
///
/// Unrecognized wire names parse to `Unknown` and pass audio through
/// unchanged; the pass-through is logged so typos in style tables are
/// observable rather than silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    Normalize,
    LowPassFilter,
    HighPass,
    FadeIn,
    FadeOut,
    Reverse,
    PitchShiftUp,
    PitchShiftDown,
    Stutter,
    Unknown(String),
}

impl Transformation {
    pub fn from_name(name: &str) -> Self {
        match name {
            "normalize" => Transformation::Normalize,
            "low_pass_filter" => Transformation::LowPassFilter,
            "high_pass" | "highpass" => Transformation::HighPass,
            "fade_in" => Transformation::FadeIn,
            "fade_out" => Transformation::FadeOut,
            "reverse" => Transformation::Reverse,
            "pitch_shift_up" => Transformation::PitchShiftUp,
            "pitch_shift_down" => Transformation::PitchShiftDown,
            "stutter" => Transformation::Stutter,
            other => Transformation::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Transformation::Normalize => "normalize",
            Transformation::LowPassFilter => "low_pass_filter",
            Transformation::HighPass => "high_pass",
            Transformation::FadeIn => "fade_in",
            Transformation::FadeOut => "fade_out",
            Transformation::Reverse => "reverse",
            Transformation::PitchShiftUp => "pitch_shift_up",
            Transformation::PitchShiftDown => "pitch_shift_down",
            Transformation::Stutter => "stutter",
            Transformation::Unknown(name) => name,
        }
    }

    /// Apply this transformation, producing a new buffer.
    pub fn apply(&self, buffer: &AudioBuffer) -> AudioBuffer {
        if buffer.is_empty() {
            return buffer.clone();
        }
        match self {
            Transformation::Normalize => normalize(buffer),
            Transformation::LowPassFilter => {
                biquad_filter(buffer, BiquadCoeffs::lowpass(LOW_PASS_CUTOFF_HZ, buffer))
            }
            Transformation::HighPass => {
                biquad_filter(buffer, BiquadCoeffs::highpass(HIGH_PASS_CUTOFF_HZ, buffer))
            }
            Transformation::FadeIn => fade(buffer, FadeDirection::In),
            Transformation::FadeOut => fade(buffer, FadeDirection::Out),
            Transformation::Reverse => reverse(buffer),
            Transformation::PitchShiftUp => resample(buffer, semitones_to_rate(PITCH_SHIFT_SEMITONES)),
            Transformation::PitchShiftDown => {
                resample(buffer, semitones_to_rate(-PITCH_SHIFT_SEMITONES))
            }
            Transformation::Stutter => stutter(buffer),
            Transformation::Unknown(name) => {
                warn!("Unknown transformation {:?}, passing audio through", name);
                buffer.clone()
            }
        }
    }
}

/// Scale so the peak hits [`NORMALIZE_PEAK`]. Silent buffers are untouched.
fn normalize(buffer: &AudioBuffer) -> AudioBuffer {
    let peak = buffer.peak();
    if peak <= f32::EPSILON {
        return buffer.clone();
    }
    let gain = NORMALIZE_PEAK / peak;
    let samples = buffer.samples.iter().map(|s| s * gain).collect();
    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}

/// Biquad coefficients per the Audio EQ Cookbook, pre-divided by a0.
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    fn lowpass(cutoff: f64, buffer: &AudioBuffer) -> Self {
        let omega = 2.0 * PI * cutoff / buffer.sample_rate as f64;
        let alpha = omega.sin() / (2.0 * FILTER_Q);
        let cos_omega = omega.cos();

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        Self::divided(b0, b1, b2, cos_omega, alpha)
    }

    fn highpass(cutoff: f64, buffer: &AudioBuffer) -> Self {
        let omega = 2.0 * PI * cutoff / buffer.sample_rate as f64;
        let alpha = omega.sin() / (2.0 * FILTER_Q);
        let cos_omega = omega.cos();

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        Self::divided(b0, b1, b2, cos_omega, alpha)
    }

    fn divided(b0: f64, b1: f64, b2: f64, cos_omega: f64, alpha: f64) -> Self {
        let a0 = 1.0 + alpha;
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: (-2.0 * cos_omega) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

/// Run the biquad over each channel independently.
fn biquad_filter(buffer: &AudioBuffer, coeffs: BiquadCoeffs) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let mut samples = buffer.samples.clone();

    for channel in 0..channels {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        let mut index = channel;
        while index < samples.len() {
            let x0 = samples[index] as f64;
            let y0 = coeffs.b0 * x0 + coeffs.b1 * x1 + coeffs.b2 * x2
                - coeffs.a1 * y1
                - coeffs.a2 * y2;
            samples[index] = y0 as f32;
            x2 = x1;
            x1 = x0;
            y2 = y1;
            y1 = y0;
            index += channels;
        }
    }

    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}

enum FadeDirection {
    In,
    Out,
}

fn fade(buffer: &AudioBuffer, direction: FadeDirection) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let frames = buffer.frames();
    let fade_frames = ((FADE_MS as u64 * buffer.sample_rate as u64) / 1000) as usize;
    let fade_frames = fade_frames.min(frames).max(1);

    let mut samples = buffer.samples.clone();
    for i in 0..fade_frames {
        let gain = i as f32 / fade_frames as f32;
        let frame = match direction {
            FadeDirection::In => i,
            FadeDirection::Out => frames - 1 - i,
        };
        for channel in 0..channels {
            samples[frame * channels + channel] *= gain;
        }
    }

    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}

/// Frame-wise reversal, keeping each frame's channel ordering intact.
fn reverse(buffer: &AudioBuffer) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let mut samples = Vec::with_capacity(buffer.samples.len());
    for frame in buffer.samples.chunks_exact(channels).rev() {
        samples.extend_from_slice(frame);
    }
    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}

fn semitones_to_rate(semitones: f64) -> f64 {
    2.0f64.powf(semitones / 12.0)
}

/// Resample at `rate` and relabel at the original sample rate. This is how
/// pitch shift is implemented: a rate above 1.0 raises pitch and shortens
/// the buffer, below 1.0 lowers pitch and lengthens it. The tempo change is
/// an accepted side effect.
fn resample(buffer: &AudioBuffer, rate: f64) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let src_frames = buffer.frames();
    let out_frames = ((src_frames as f64) / rate).floor() as usize;

    let mut samples = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let src_pos = i as f64 * rate;
        let i0 = src_pos.floor() as usize;
        let frac = (src_pos - i0 as f64) as f32;
        let i1 = (i0 + 1).min(src_frames - 1);
        for channel in 0..channels {
            let a = buffer.samples[i0 * channels + channel];
            let b = buffer.samples[i1 * channels + channel];
            samples.push(a + (b - a) * frac);
        }
    }

    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}

/// Slice into fixed windows, play each twice, then trim back to the
/// original length.
fn stutter(buffer: &AudioBuffer) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let window_frames =
        (((STUTTER_WINDOW_MS as u64 * buffer.sample_rate as u64) / 1000) as usize).max(1);
    let window_samples = window_frames * channels;

    let mut samples = Vec::with_capacity(buffer.samples.len() * 2);
    for window in buffer.samples.chunks(window_samples) {
        samples.extend_from_slice(window);
        samples.extend_from_slice(window);
    }
    // Doubling always meets or exceeds the original length, so trimming is
    // enough to restore it
    samples.truncate(buffer.samples.len());

    AudioBuffer::new(samples, buffer.channels, buffer.sample_rate)
}
