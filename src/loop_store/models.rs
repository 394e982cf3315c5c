use serde::{Deserialize, Serialize};

/// A stored audio loop's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub id: i64,
    pub name: String,
    pub tempo: Option<f64>,
    pub key: Option<String>,
    pub genre: Option<String>,
    pub file_url: Option<String>,
    /// Unix seconds, set once at insert time.
    pub created_at: i64,
}

/// Payload for creating a loop.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLoop {
    pub name: String,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Partial-update payload. Only fields present in the request are applied;
/// a field cannot be cleared back to NULL through a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoopPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl LoopPatch {
    /// Merge the patch into an existing loop, field by field. The merge is
    /// explicit so a schema change that adds a column fails to compile here
    /// instead of silently skipping the new field.
    pub fn apply_to(&self, existing: &mut Loop) {
        if let Some(name) = &self.name {
            existing.name = name.clone();
        }
        if let Some(tempo) = self.tempo {
            existing.tempo = Some(tempo);
        }
        if let Some(key) = &self.key {
            existing.key = Some(key.clone());
        }
        if let Some(genre) = &self.genre {
            existing.genre = Some(genre.clone());
        }
        if let Some(file_url) = &self.file_url {
            existing.file_url = Some(file_url.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.tempo.is_none()
            && self.key.is_none()
            && self.genre.is_none()
            && self.file_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_loop() -> Loop {
        Loop {
            id: 7,
            name: "Dusty break".to_string(),
            tempo: Some(92.0),
            key: Some("F minor".to_string()),
            genre: Some("breakbeat".to_string()),
            file_url: Some("/uploads/dusty.wav".to_string()),
            created_at: 1700000000,
        }
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut existing = sample_loop();
        let patch = LoopPatch {
            tempo: Some(128.0),
            ..Default::default()
        };
        patch.apply_to(&mut existing);

        assert_eq!(existing.tempo, Some(128.0));
        assert_eq!(existing.name, "Dusty break");
        assert_eq!(existing.key.as_deref(), Some("F minor"));
        assert_eq!(existing.genre.as_deref(), Some("breakbeat"));
        assert_eq!(existing.created_at, 1700000000);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut existing = sample_loop();
        let before = existing.clone();
        LoopPatch::default().apply_to(&mut existing);
        assert_eq!(existing, before);
        assert!(LoopPatch::default().is_empty());
    }

    #[test]
    fn patch_deserializes_absent_fields_as_none() {
        let patch: LoopPatch = serde_json::from_str(r#"{"tempo": 140.5}"#).unwrap();
        assert_eq!(patch.tempo, Some(140.5));
        assert!(patch.name.is_none());
        assert!(patch.file_url.is_none());
    }
}
