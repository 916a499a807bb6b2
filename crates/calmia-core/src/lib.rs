//! # calmia-core
//!
//! Deterministic decision core for questionnaire-driven therapy
//! recommendation.
//!
//! The crate answers three questions about a wellness survey submission:
//! - What does the raw answer array mean as model input?
//! - Which condition does the classifier place the respondent in?
//! - Which therapy environment should be recommended, with what content?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: the same submission against collaborators giving
//!    the same answers produces the same result
//! 2. **Stateless**: nothing is carried between requests and no
//!    collaborator is ever mutated
//! 3. **Typed rejection**: every invalid answer is a positional error,
//!    never a silent coercion or a default score
//! 4. **One fallback**: a missing environment document is substituted with
//!    the fixed fallback id exactly once, and the returned id always names
//!    the document actually served
//!
//! ## Example
//!
//! ```rust
//! use calmia_core::{
//!     classify_survey, Answer, CapabilityError, CategoricalMap, ConditionClassifier,
//!     ConditionSet, FeatureVector, SlotType, SurveySchema,
//! };
//!
//! struct Threshold;
//!
//! impl ConditionClassifier for Threshold {
//!     fn predict(&self, features: &FeatureVector) -> Result<i64, CapabilityError> {
//!         Ok(if features.values()[0] > 5.0 { 0 } else { 1 })
//!     }
//! }
//!
//! let schema = SurveySchema::new(vec![SlotType::Scale, SlotType::Binary]);
//! let categories = CategoricalMap::new(vec![]);
//! let conditions = ConditionSet::new(vec![
//!     "Stress & Anxiety".to_string(),
//!     "Burnout".to_string(),
//! ])
//! .unwrap();
//!
//! let answers = vec![Answer::Number(8.0), Answer::Text("Yes".to_string())];
//! let condition =
//!     classify_survey(&answers, &schema, &categories, &Threshold, &conditions).unwrap();
//! assert_eq!(condition.label(), "Stress & Anxiety");
//! ```

pub mod capabilities;
pub mod conditions;
pub mod environment;
pub mod pipeline;
pub mod profile;
pub mod survey;

pub use capabilities::{
    CapabilityError, ConditionClassifier, EnvironmentClassifier, EnvironmentStore, IndexDecoder,
    StoreError,
};
pub use conditions::{Condition, ConditionSet, ConditionSetError};
pub use environment::{
    CatalogEntry, CatalogError, EnvironmentCatalog, EnvironmentId, EnvironmentRecord,
    FALLBACK_ENVIRONMENT,
};
pub use pipeline::{
    resolve_condition, resolve_environment, PredictionError, Resolution, ResolutionError,
};
pub use profile::{validate_profile_schema, Profile, ProfileError, SurveySection};
pub use survey::{
    normalize, Answer, CategoricalMap, CategoricalValue, FeatureVector, SlotType, SurveySchema,
    ValidationError,
};

use thiserror::Error;

/// Failure of the submission-to-condition half of the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// The submission failed normalization; the classifier was never called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Normalization succeeded but condition resolution failed.
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Classify a raw survey submission into a condition.
///
/// Composes [`normalize`] and [`resolve_condition`]; a rejection at the
/// normalization stage returns before the classifier is consulted.
pub fn classify_survey(
    answers: &[Answer],
    schema: &SurveySchema,
    categories: &CategoricalMap,
    classifier: &dyn ConditionClassifier,
    conditions: &ConditionSet,
) -> Result<Condition, ClassifyError> {
    let features = normalize(answers, schema, categories)?;
    let condition = resolve_condition(&features, classifier, conditions)?;
    Ok(condition)
}
