//! Common test infrastructure
//!
//! Provides the harness for end-to-end tests: an isolated server with a
//! temp-dir database and media directory, and a thin HTTP client.
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!     let response = client.get("/api/v1/health").await;
//!     assert_eq!(response.status(), reqwest::StatusCode::OK);
//! }
//! ```

mod client;
mod server;

pub use client::TestClient;
pub use server::TestServer;

/// A one-second 440 Hz mono tone as a complete WAV file.
#[allow(dead_code)] // Not every suite uploads audio
pub fn test_wav_bytes() -> Vec<u8> {
    let seconds = 1.0f64;
    let sample_rate = 22050u32;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    let frames = (seconds * sample_rate as f64) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let value = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}
