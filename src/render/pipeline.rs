//! The render pipeline: loop lookup → audio resolution → per-profile
//! tiling/transformation → WAV export → file-store persistence.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::audio::{decode_file, encode_wav, AudioBuffer};
use crate::error::ApiError;
use crate::file_store::{FileStore, FileStoreError};
use crate::loop_store::LoopStore;

use super::profiles::{compute_profiles, RenderConfig, VariationProfile};

/// One rendered variation, ready to hand back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct VariationResult {
    pub name: String,
    pub style_hint: Option<String>,
    pub url: String,
}

pub struct Renderer {
    loop_store: Arc<dyn LoopStore>,
    file_store: Arc<dyn FileStore>,
}

impl Renderer {
    pub fn new(loop_store: Arc<dyn LoopStore>, file_store: Arc<dyn FileStore>) -> Self {
        Self {
            loop_store,
            file_store,
        }
    }

    /// Render every planned variation of a loop. Any single variation's
    /// failure aborts the whole render; no partial result list is returned.
    pub async fn render(
        &self,
        loop_id: i64,
        config: &RenderConfig,
    ) -> Result<Vec<VariationResult>, ApiError> {
        if !(config.length_seconds > 0.0) {
            return Err(ApiError::Validation(
                "length_seconds must be greater than zero".to_string(),
            ));
        }

        let stored_loop = self
            .loop_store
            .get(loop_id)
            .map_err(ApiError::storage)?
            .ok_or_else(|| ApiError::NotFound(format!("Loop {} not found", loop_id)))?;

        let file_url = stored_loop.file_url.as_deref().ok_or_else(|| {
            ApiError::PreconditionFailed(format!(
                "Loop {} has no audio file; upload one before rendering",
                loop_id
            ))
        })?;

        let audio_path = match self.file_store.resolve(file_url).await {
            Ok(path) => path,
            Err(FileStoreError::NotFound(url)) => {
                return Err(ApiError::ResourceUnavailable(format!(
                    "Audio file {} is missing",
                    url
                )))
            }
            Err(e) => return Err(ApiError::storage(e)),
        };

        let source = decode_file(&audio_path)
            .map_err(|e| ApiError::ResourceUnavailable(e.to_string()))?;
        debug!(
            "Loaded source loop {}: {:.2}s at {} Hz, {} channel(s)",
            loop_id,
            source.duration_seconds(),
            source.sample_rate,
            source.channels
        );

        let profiles = compute_profiles(config);
        let mut results = Vec::with_capacity(profiles.len());

        for profile in &profiles {
            let rendered = render_variation(&source, profile, config.length_seconds);
            let bytes =
                encode_wav(&rendered).map_err(|e| ApiError::Transformation(e.to_string()))?;

            let key = output_key(loop_id, &profile.name);
            let url = self
                .file_store
                .store(bytes, &key, "audio/wav")
                .await
                .map_err(ApiError::storage)?;

            results.push(VariationResult {
                name: profile.name.clone(),
                style_hint: profile.style_hint.clone(),
                url,
            });
        }

        info!(
            "Rendered {} variation(s) of loop {} at {:.1}s",
            results.len(),
            loop_id,
            config.length_seconds
        );
        Ok(results)
    }
}

/// Tile the transformed source until it reaches the target duration, then
/// truncate to exactly that duration. The chain is applied to the source
/// once; every appended copy is identical because transformations are pure.
fn render_variation(
    source: &AudioBuffer,
    profile: &VariationProfile,
    target_seconds: f64,
) -> AudioBuffer {
    let transformed = profile
        .transformations
        .iter()
        .fold(source.clone(), |buffer, transformation| {
            transformation.apply(&buffer)
        });

    let mut output = transformed.empty_like();
    if transformed.is_empty() {
        return output;
    }
    while output.duration_seconds() < target_seconds {
        output.extend_from(&transformed);
    }
    output.truncate_to_seconds(target_seconds);
    output
}

/// Collision-resistant output key: loop id, slugified profile name and a
/// random suffix. Uniqueness comes from the suffix, not from name dedup.
fn output_key(loop_id: i64, profile_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "renders/loop{}-{}-{}.wav",
        loop_id,
        slugify(profile_name),
        &suffix[..8]
    )
}

/// Lowercase, alphanumeric runs joined by single dashes.
fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_was_dash = true;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("variation");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Transformation;

    fn tone(seconds: f64, sample_rate: u32) -> AudioBuffer {
        let frames = (seconds * sample_rate as f64) as usize;
        let samples = (0..frames).map(|i| (i as f32 * 0.02).sin() * 0.4).collect();
        AudioBuffer::new(samples, 1, sample_rate)
    }

    fn profile(transformations: Vec<Transformation>) -> VariationProfile {
        VariationProfile {
            name: "Test".to_string(),
            style_hint: None,
            transformations,
        }
    }

    #[test]
    fn tiles_short_loops_up_to_the_target_duration() {
        let source = tone(1.0, 8000);
        let rendered = render_variation(&source, &profile(vec![Transformation::Normalize]), 5.0);
        assert!((rendered.duration_seconds() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn truncates_long_loops_down_to_the_target_duration() {
        let source = tone(10.0, 8000);
        let rendered = render_variation(&source, &profile(vec![]), 3.0);
        assert!((rendered.duration_seconds() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn pitch_shifted_tiles_still_fill_the_target() {
        let source = tone(1.0, 8000);
        let rendered = render_variation(
            &source,
            &profile(vec![Transformation::PitchShiftUp]),
            4.0,
        );
        assert!((rendered.duration_seconds() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn slugify_flattens_punctuation_and_case() {
        assert_eq!(slugify("Atlanta Trap"), "atlanta-trap");
        assert_eq!(slugify("Lo-Fi  Chill!"), "lo-fi-chill");
        assert_eq!(slugify("___"), "variation");
        assert_eq!(slugify("Custom"), "custom");
    }

    #[test]
    fn output_keys_are_distinct_for_identical_names() {
        let a = output_key(5, "Commercial");
        let b = output_key(5, "Commercial");
        assert_ne!(a, b);
        assert!(a.starts_with("renders/loop5-commercial-"));
        assert!(a.ends_with(".wav"));
    }

    use crate::file_store::FileStoreError;
    use crate::loop_store::{NewLoop, SqliteLoopStore};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// File store that records how often it is touched.
    #[derive(Default)]
    struct RecordingFileStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FileStore for RecordingFileStore {
        async fn store(
            &self,
            _data: Vec<u8>,
            key: &str,
            _content_type: &str,
        ) -> Result<String, FileStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("/{}", key))
        }

        async fn resolve(&self, url: &str) -> Result<PathBuf, FileStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FileStoreError::NotFound(url.to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), FileStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn store_with_loop(file_url: Option<&str>) -> (Arc<SqliteLoopStore>, i64) {
        let store = Arc::new(SqliteLoopStore::in_memory().unwrap());
        let created = store
            .create(NewLoop {
                name: "fixture".to_string(),
                tempo: None,
                key: None,
                genre: None,
                file_url: file_url.map(|s| s.to_string()),
            })
            .unwrap();
        (store, created.id)
    }

    #[tokio::test]
    async fn render_of_unknown_loop_is_not_found() {
        let (store, _) = store_with_loop(None);
        let files = Arc::new(RecordingFileStore::default());
        let renderer = Renderer::new(store, files.clone());

        let result = renderer.render(9999, &RenderConfig::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(files.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn render_without_audio_fails_precondition_before_any_storage_call() {
        let (store, id) = store_with_loop(None);
        let files = Arc::new(RecordingFileStore::default());
        let renderer = Renderer::new(store, files.clone());

        let result = renderer.render(id, &RenderConfig::default()).await;
        assert!(matches!(result, Err(ApiError::PreconditionFailed(_))));
        assert_eq!(files.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn render_with_missing_audio_file_is_resource_unavailable() {
        let (store, id) = store_with_loop(Some("/uploads/gone.wav"));
        let files = Arc::new(RecordingFileStore::default());
        let renderer = Renderer::new(store, files.clone());

        let result = renderer.render(id, &RenderConfig::default()).await;
        assert!(matches!(result, Err(ApiError::ResourceUnavailable(_))));
    }

    #[tokio::test]
    async fn invalid_length_is_rejected_before_lookup() {
        let (store, id) = store_with_loop(Some("/uploads/a.wav"));
        let files = Arc::new(RecordingFileStore::default());
        let renderer = Renderer::new(store, files.clone());

        let config = RenderConfig {
            length_seconds: 0.0,
            ..Default::default()
        };
        let result = renderer.render(id, &config).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(files.calls.load(Ordering::SeqCst), 0);
    }
}
