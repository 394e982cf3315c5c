//! Structural arrangement planning.
//!
//! Produces a plan of named sections covering a target duration. The plan is
//! metadata for the caller; rendering never consumes it.

use serde::{Deserialize, Serialize};

fn default_length_seconds() -> f64 {
    30.0
}

fn default_structure() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrangementConfig {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default = "default_length_seconds")]
    pub length_seconds: f64,
    #[serde(default = "default_structure")]
    pub structure: String,
    #[serde(default)]
    pub energy: Option<String>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            genre: None,
            length_seconds: default_length_seconds(),
            structure: default_structure(),
            energy: None,
            bpm: None,
            key: None,
        }
    }
}

/// One named span of the arrangement, in both bars and seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub start_bar: usize,
    pub end_bar: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrangementPlan {
    pub structure: String,
    pub length_seconds: f64,
    pub bars: usize,
    pub sections: Vec<Section>,
}

/// Two seconds per bar heuristic: a 30 s target is 15 bars.
fn bar_count(length_seconds: f64) -> usize {
    ((length_seconds / 2.0).floor() as usize).max(1)
}

/// The "default" structure's section names and bar-count fractions. Sums
/// to 1.
const DEFAULT_SECTIONS: &[(&str, f64)] = &[
    ("intro", 1.0 / 8.0),
    ("verse", 3.0 / 8.0),
    ("chorus", 1.0 / 4.0),
    ("outro", 1.0 / 4.0),
];

/// Generate contiguous, non-overlapping sections exactly covering
/// `[0, bars)` and `[0, length_seconds)`.
pub fn generate_sections(structure: &str, length_seconds: f64) -> Vec<Section> {
    let bars = bar_count(length_seconds);
    let seconds_per_bar = length_seconds / bars as f64;

    if structure != "default" {
        return vec![Section {
            name: "main".to_string(),
            start_bar: 0,
            end_bar: bars,
            start_seconds: 0.0,
            end_seconds: length_seconds,
        }];
    }

    let mut sections = Vec::with_capacity(DEFAULT_SECTIONS.len());
    let mut cumulative = 0.0;
    let mut start_bar = 0;
    for (index, (name, fraction)) in DEFAULT_SECTIONS.iter().enumerate() {
        cumulative += fraction;
        // Boundaries come from the cumulative fraction so rounding never
        // introduces a gap or overlap; the last section lands on `bars`
        let end_bar = if index == DEFAULT_SECTIONS.len() - 1 {
            bars
        } else {
            (bars as f64 * cumulative).round() as usize
        };
        if end_bar > start_bar {
            sections.push(Section {
                name: name.to_string(),
                start_bar,
                end_bar,
                start_seconds: start_bar as f64 * seconds_per_bar,
                end_seconds: if end_bar == bars {
                    length_seconds
                } else {
                    end_bar as f64 * seconds_per_bar
                },
            });
            start_bar = end_bar;
        }
    }
    sections
}

pub fn plan_arrangement(config: &ArrangementConfig) -> ArrangementPlan {
    let sections = generate_sections(&config.structure, config.length_seconds);
    ArrangementPlan {
        structure: config.structure.clone(),
        length_seconds: config.length_seconds,
        bars: bar_count(config.length_seconds),
        sections,
    }
}
