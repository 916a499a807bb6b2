//! Survey schema, raw answers, and normalization.

mod normalizer;
mod schema;

pub use normalizer::{normalize, ValidationError, SCALE_MAX, SCALE_MIN};
pub use schema::{Answer, CategoricalMap, CategoricalValue, FeatureVector, SlotType, SurveySchema};
