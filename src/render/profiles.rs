//! Variation profile planning.
//!
//! A profile names one output variation and carries the transformation chain
//! used to produce it. Planning is deterministic: the same config always
//! yields the same profiles, in the same order.

use serde::Deserialize;

use crate::audio::Transformation;

fn default_length_seconds() -> f64 {
    30.0
}

fn default_variations() -> usize {
    3
}

/// Input to a render request. `genre` and `energy` are informational only;
/// they do not currently affect transformation choice.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default = "default_length_seconds")]
    pub length_seconds: f64,
    #[serde(default)]
    pub energy: Option<String>,
    #[serde(default = "default_variations")]
    pub variations: usize,
    #[serde(default)]
    pub variation_styles: Option<Vec<String>>,
    #[serde(default)]
    pub custom_style: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            genre: None,
            length_seconds: default_length_seconds(),
            energy: None,
            variations: default_variations(),
            variation_styles: None,
            custom_style: None,
        }
    }
}

/// The planned configuration for one variation.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationProfile {
    pub name: String,
    pub style_hint: Option<String>,
    pub transformations: Vec<Transformation>,
}

fn default_chain() -> Vec<Transformation> {
    vec![
        Transformation::Normalize,
        Transformation::FadeIn,
        Transformation::FadeOut,
    ]
}

/// Keyword → chain table for named styles, matched by case-insensitive
/// substring containment. "Atlanta Trap" hits "trap", "Lofi Chill" hits
/// "lofi".
fn style_chain(style: &str) -> Vec<Transformation> {
    let lowered = style.to_lowercase();
    if lowered.contains("trap") {
        vec![
            Transformation::Normalize,
            Transformation::HighPass,
            Transformation::Stutter,
            Transformation::FadeIn,
            Transformation::FadeOut,
        ]
    } else if lowered.contains("lofi") || lowered.contains("lo-fi") {
        vec![
            Transformation::Normalize,
            Transformation::LowPassFilter,
            Transformation::FadeIn,
            Transformation::FadeOut,
        ]
    } else if lowered.contains("techno") || lowered.contains("edm") {
        vec![
            Transformation::Normalize,
            Transformation::HighPass,
            Transformation::FadeIn,
            Transformation::FadeOut,
        ]
    } else if lowered.contains("ambient") {
        vec![
            Transformation::Normalize,
            Transformation::Reverse,
            Transformation::LowPassFilter,
            Transformation::FadeIn,
            Transformation::FadeOut,
        ]
    } else if lowered.contains("drill") {
        vec![
            Transformation::Normalize,
            Transformation::PitchShiftDown,
            Transformation::HighPass,
            Transformation::FadeIn,
            Transformation::FadeOut,
        ]
    } else {
        default_chain()
    }
}

/// Fixed generic fallbacks, in order.
fn fallback_profiles() -> Vec<VariationProfile> {
    vec![
        VariationProfile {
            name: "Commercial".to_string(),
            style_hint: None,
            transformations: default_chain(),
        },
        VariationProfile {
            name: "Creative".to_string(),
            style_hint: None,
            transformations: vec![
                Transformation::Normalize,
                Transformation::HighPass,
                Transformation::FadeIn,
                Transformation::FadeOut,
            ],
        },
        VariationProfile {
            name: "Experimental".to_string(),
            style_hint: None,
            transformations: vec![
                Transformation::Normalize,
                Transformation::LowPassFilter,
                Transformation::FadeIn,
                Transformation::FadeOut,
            ],
        },
    ]
}

/// Compute the ordered variation profiles for a render request.
///
/// Explicit styles win outright: the caller gets exactly those profiles (up
/// to `variations`) and no generic filler. A custom style yields one
/// "Custom" profile, then generic fallbacks fill the remaining slots. With
/// neither, the fallback list alone fills up to `variations` slots and the
/// result simply runs short once it is exhausted; the count is an upper
/// bound, never a guarantee.
pub fn compute_profiles(config: &RenderConfig) -> Vec<VariationProfile> {
    let styles: Vec<&str> = config
        .variation_styles
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if !styles.is_empty() {
        return styles
            .into_iter()
            .take(config.variations)
            .map(|style| VariationProfile {
                name: style.to_string(),
                style_hint: Some(style.to_string()),
                transformations: style_chain(style),
            })
            .collect();
    }

    let mut profiles = Vec::new();
    if let Some(custom) = config
        .custom_style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        if config.variations > 0 {
            profiles.push(VariationProfile {
                name: "Custom".to_string(),
                style_hint: Some(custom.to_string()),
                transformations: default_chain(),
            });
        }
    }

    for fallback in fallback_profiles() {
        if profiles.len() >= config.variations {
            break;
        }
        profiles.push(fallback);
    }
    profiles
}
