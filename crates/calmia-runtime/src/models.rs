//! Pretrained model artifacts.
//!
//! Calmia never trains models; it serves ones trained offline and exported
//! as JSON artifacts. A [`LinearClassifier`] holds the weight matrix and
//! intercepts of a linear multi-class model and predicts by argmax over the
//! decision scores, so one artifact type serves both pipeline stages. A
//! [`LabelEncoding`] is the exported class-label list of a fitted encoder.
//!
//! Artifacts are validated on load: a weight matrix that disagrees with
//! its declared width fails at startup, not on the first request.

use calmia_core::{
    CapabilityError, ConditionClassifier, ConditionSet, EnvironmentClassifier, EnvironmentId,
    FeatureVector, IndexDecoder,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a model artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse model JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Model validation failed: {0}")]
    ValidationError(String),
}

/// A linear multi-class classifier exported as weights and intercepts.
///
/// Prediction computes one decision score per class and returns the argmax.
/// Ties break toward the lowest class index, matching how the training
/// stack resolves them, so serving stays bit-compatible with training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    /// Input width the model was trained on
    pub n_features: usize,

    /// Per-class weight rows, `classes x n_features`
    pub weights: Vec<Vec<f64>>,

    /// Per-class intercepts
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    /// Parse an artifact from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: LinearClassifier = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Load an artifact from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate artifact consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.weights.is_empty() {
            return Err(ModelError::ValidationError(
                "Model declares no classes".to_string(),
            ));
        }
        if self.weights.len() != self.intercepts.len() {
            return Err(ModelError::ValidationError(format!(
                "{} weight rows but {} intercepts",
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        for (class, row) in self.weights.iter().enumerate() {
            if row.len() != self.n_features {
                return Err(ModelError::ValidationError(format!(
                    "Weight row {} has {} columns, expected {}",
                    class,
                    row.len(),
                    self.n_features
                )));
            }
        }
        Ok(())
    }

    /// Number of output classes.
    pub fn classes(&self) -> usize {
        self.weights.len()
    }

    /// Argmax over per-class decision scores. First maximum wins, so ties
    /// go to the lowest class index.
    fn decision(&self, features: &[f64]) -> Result<usize, CapabilityError> {
        if features.len() != self.n_features {
            return Err(CapabilityError::ShapeMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        let mut best = 0usize;
        let mut best_score = f64::NEG_INFINITY;
        for (class, (row, intercept)) in self.weights.iter().zip(&self.intercepts).enumerate() {
            let score: f64 =
                intercept + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>();
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        Ok(best)
    }
}

impl ConditionClassifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, CapabilityError> {
        self.decision(features.values()).map(|class| class as i64)
    }
}

impl EnvironmentClassifier for LinearClassifier {
    fn predict(&self, encoded: &[f64]) -> Result<i64, CapabilityError> {
        self.decision(encoded).map(|class| class as i64)
    }
}

/// The exported class list of a fitted label encoder.
///
/// Position in `classes` is the class index, so this type can both rebuild
/// the condition label space and act as a trained decoder for environment
/// indexes in deployments that derive ids from the encoder instead of a
/// profile catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    /// Ordered class labels as the encoder saw them at fit time
    pub classes: Vec<String>,
}

impl LabelEncoding {
    /// Parse an encoding from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let encoding: LabelEncoding = serde_json::from_str(json)?;
        encoding.validate()?;
        Ok(encoding)
    }

    /// Load an encoding from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate encoding consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.classes.is_empty() {
            return Err(ModelError::ValidationError(
                "Label encoding declares no classes".to_string(),
            ));
        }
        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].contains(class) {
                return Err(ModelError::ValidationError(format!(
                    "Duplicate class label: {class}"
                )));
            }
        }
        Ok(())
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Rebuild the ordered condition set this encoding was fitted on.
    pub fn condition_set(&self) -> Result<ConditionSet, ModelError> {
        ConditionSet::new(self.classes.clone())
            .map_err(|e| ModelError::ValidationError(e.to_string()))
    }
}

impl IndexDecoder for LabelEncoding {
    fn decode(&self, index: i64) -> Option<EnvironmentId> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(|class| EnvironmentId::from(class.as_str()))
    }
}
