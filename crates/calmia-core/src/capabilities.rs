//! Capability seams for the pipeline's injected collaborators.
//!
//! The pipeline consumes four narrow capabilities and owns none of them:
//! two classifiers, an index decoder, and a content store. Implementations
//! live outside this crate (model artifacts, in-memory stores, remote
//! backends) and are injected by reference. All of them must tolerate
//! concurrent readers; the pipeline holds no state and never mutates a
//! collaborator.

use crate::environment::{EnvironmentId, EnvironmentRecord};
use crate::survey::FeatureVector;
use thiserror::Error;

/// Failure surfaced by a classifier implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// The input width does not match what the model was trained on.
    #[error("Input shape mismatch: expected {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The implementation's backend could not be reached or used.
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    /// Any other implementation-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Failure surfaced by an environment store lookup.
///
/// Distinct from an absent document: `get` returning `Ok(None)` means the
/// store answered and the document is not there.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Environment store error: {0}")]
pub struct StoreError(pub String);

/// First-stage model: feature vector in, condition class index out.
pub trait ConditionClassifier: Send + Sync {
    /// Predict the condition class index for a normalized feature vector.
    fn predict(&self, features: &FeatureVector) -> Result<i64, CapabilityError>;
}

/// Second-stage model: one-hot condition encoding in, environment index out.
pub trait EnvironmentClassifier: Send + Sync {
    /// Predict the environment class index for a one-hot condition encoding.
    fn predict(&self, encoded: &[f64]) -> Result<i64, CapabilityError>;
}

/// Decodes a raw environment model output into a document id.
pub trait IndexDecoder: Send + Sync {
    /// The id for a model output index, or `None` when the index is outside
    /// the known output space.
    fn decode(&self, index: i64) -> Option<EnvironmentId>;
}

/// Read access to environment content documents.
pub trait EnvironmentStore: Send + Sync {
    /// Fetch the document for an id. `Ok(None)` is a clean miss.
    fn get(&self, id: &EnvironmentId) -> Result<Option<EnvironmentRecord>, StoreError>;
}
