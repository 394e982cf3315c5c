//! 16-bit PCM WAV encoding via hound.

use std::io::Cursor;
use std::path::Path;

use super::{AudioBuffer, AudioError};

/// Encode a buffer as a complete 16-bit PCM WAV file in memory. Samples
/// outside [-1.0, 1.0] are clipped.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
        for &sample in &buffer.samples {
            let clipped = sample.clamp(-1.0, 1.0);
            let pcm = (clipped * i16::MAX as f32).round() as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

/// Read a 16-bit PCM WAV file back into a buffer. Used by tests to check
/// export round trips; runtime decoding goes through symphonia.
pub fn read_wav(path: &Path) -> Result<AudioBuffer, AudioError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();
    let samples: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
        .collect::<Result<_, _>>()
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    Ok(AudioBuffer::new(samples, spec.channels, spec.sample_rate))
}
