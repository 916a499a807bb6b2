//! The two-stage recommendation pipeline.
//!
//! Per request the flow is linear and stateless: normalized features go to
//! the condition classifier, the resulting condition is one-hot encoded and
//! goes to the environment classifier, the predicted index is decoded to a
//! document id and the store is consulted. A store miss triggers exactly
//! one substitution with the fixed fallback id; there is no second
//! substitution and no retry of any other stage.
//!
//! Nothing here mutates a collaborator, so two calls with the same inputs
//! and the same collaborator behavior produce the same output.

use crate::capabilities::{
    CapabilityError, ConditionClassifier, EnvironmentClassifier, EnvironmentStore, IndexDecoder,
    StoreError,
};
use crate::conditions::{Condition, ConditionSet};
use crate::environment::{EnvironmentId, EnvironmentRecord};
use crate::survey::FeatureVector;
use thiserror::Error;

/// Failure while resolving a condition from features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The condition classifier failed.
    #[error("Model prediction error: {0}")]
    ClassifierFailure(#[from] CapabilityError),

    /// The classifier emitted an index outside the condition set. Negative
    /// indexes land here too.
    #[error("Prediction index {index} out of range for {known} known conditions")]
    IndexOutOfRange { index: i64, known: usize },
}

/// Failure while resolving an environment for a condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// The environment classifier failed.
    #[error("Environment prediction error: {0}")]
    ClassifierFailure(CapabilityError),

    /// The predicted index decodes to no known environment id.
    #[error("Predicted environment index {0} has no known environment")]
    UnknownIndex(i64),

    /// Neither the predicted document nor the fallback document exists.
    #[error("No valid environment found")]
    NoFallbackAvailable,

    /// The store itself failed; distinct from a clean miss.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful environment resolution.
///
/// `environment_id` always names the document `record` was read under, so a
/// fallback substitution is visible in the id as well as in `fell_back`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Id the record was fetched under
    pub environment_id: EnvironmentId,

    /// The content document
    pub record: EnvironmentRecord,

    /// True when the fixed fallback replaced the predicted id
    pub fell_back: bool,
}

/// Resolve a feature vector to a condition.
///
/// The classifier's raw output is bounds-checked against the ordered
/// condition set before a label is minted; a healthy model never trips
/// this, a mismatched artifact does.
pub fn resolve_condition(
    features: &FeatureVector,
    classifier: &dyn ConditionClassifier,
    conditions: &ConditionSet,
) -> Result<Condition, PredictionError> {
    let index = classifier.predict(features)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| conditions.condition_at(i))
        .ok_or(PredictionError::IndexOutOfRange {
            index,
            known: conditions.len(),
        })
}

/// Resolve a condition to an environment id and its content document.
///
/// Store misses on the predicted id are substituted with the fixed
/// fallback, tried once. A miss on the fallback itself is terminal: the
/// deployment's seed data is broken and the caller should hear about it.
pub fn resolve_environment(
    condition: &Condition,
    classifier: &dyn EnvironmentClassifier,
    decoder: &dyn IndexDecoder,
    store: &dyn EnvironmentStore,
    conditions: &ConditionSet,
) -> Result<Resolution, ResolutionError> {
    let encoded = conditions.one_hot(condition);
    let index = classifier
        .predict(&encoded)
        .map_err(ResolutionError::ClassifierFailure)?;

    let predicted = decoder
        .decode(index)
        .ok_or(ResolutionError::UnknownIndex(index))?;

    if let Some(record) = store.get(&predicted)? {
        return Ok(Resolution {
            environment_id: predicted,
            record,
            fell_back: false,
        });
    }

    let fallback = EnvironmentId::fallback();
    tracing::warn!(
        predicted = %predicted,
        fallback = %fallback,
        "Predicted environment has no document, substituting fallback"
    );
    match store.get(&fallback)? {
        Some(record) => Ok(Resolution {
            environment_id: fallback,
            record,
            fell_back: true,
        }),
        None => {
            tracing::error!(fallback = %fallback, "Fallback environment missing from store");
            Err(ResolutionError::NoFallbackAvailable)
        }
    }
}
