//! Variation planning, arrangement planning and the render pipeline.

mod arrangement;
mod pipeline;
mod profiles;

pub use arrangement::{plan_arrangement, ArrangementConfig, ArrangementPlan, Section};
pub use pipeline::{Renderer, VariationResult};
pub use profiles::{compute_profiles, RenderConfig, VariationProfile};
