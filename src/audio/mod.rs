//! Audio buffers, codec glue and the transformation engine.

mod buffer;
mod decoder;
mod transform;
mod wav;

pub use buffer::AudioBuffer;
pub use decoder::decode_file;
pub use transform::Transformation;
pub use wav::{encode_wav, read_wav};

use thiserror::Error;

/// Errors from the audio layer. Wrapped into the API taxonomy at handler
/// boundaries: decode failures become ResourceUnavailable, encode/effect
/// failures become TransformationFailure.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("No audio track found in {0}")]
    NoAudioTrack(String),

    #[error("Failed to encode audio: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
