//! The closed, ordered condition label space.
//!
//! The condition classifier's output space is an ordered list of labels
//! fixed at training time. A [`Condition`] can only be obtained through a
//! [`ConditionSet`], so holding one proves membership: downstream code
//! never re-validates labels it receives.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Rejections raised while constructing a condition set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionSetError {
    /// The label list was empty.
    #[error("Condition set is empty")]
    Empty,

    /// The same label appeared at two positions.
    #[error("Duplicate condition label: {0}")]
    DuplicateLabel(String),
}

/// One known condition: its label and its position in the ordered set.
///
/// Only a [`ConditionSet`] can mint these, which makes set membership an
/// invariant carried by the type instead of a check repeated at each use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    index: usize,
    label: String,
}

impl Condition {
    /// Position in the ordered set; doubles as the classifier class index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The label as the deployment spells it.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Display name of the associated therapy ("Burnout" -> "Burnout Therapy").
    pub fn therapy_label(&self) -> String {
        format!("{} Therapy", self.label)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

// Serializes as the bare label; payloads carry condition names, not indices.
impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label)
    }
}

/// The ordered set of labels a condition classifier can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    labels: Vec<String>,
}

impl ConditionSet {
    /// Build a set from ordered labels, rejecting empties and duplicates.
    pub fn new(labels: Vec<String>) -> Result<Self, ConditionSetError> {
        if labels.is_empty() {
            return Err(ConditionSetError::Empty);
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(ConditionSetError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    /// Number of conditions in the set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; empty sets are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The ordered labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The condition at a classifier output position.
    pub fn condition_at(&self, index: usize) -> Option<Condition> {
        self.labels.get(index).map(|label| Condition {
            index,
            label: label.clone(),
        })
    }

    /// Resolve a label to its condition. Exact match; the set's spelling is
    /// the contract and near-misses are rejections, not suggestions.
    pub fn resolve(&self, label: &str) -> Option<Condition> {
        self.labels
            .iter()
            .position(|known| known == label)
            .map(|index| Condition {
                index,
                label: label.to_string(),
            })
    }

    /// One-hot encode a condition over the full ordered set.
    ///
    /// The vector width equals the set size; exactly one slot is 1.0. This
    /// is the input shape the environment classifier was trained on.
    pub fn one_hot(&self, condition: &Condition) -> Vec<f64> {
        debug_assert_eq!(
            self.labels.get(condition.index()).map(String::as_str),
            Some(condition.label()),
        );
        let mut encoded = vec![0.0; self.labels.len()];
        if let Some(slot) = encoded.get_mut(condition.index()) {
            *slot = 1.0;
        }
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ConditionSet {
        ConditionSet::new(vec![
            "Stress & Anxiety".to_string(),
            "Depression".to_string(),
            "Burnout".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_set_rejected() {
        assert_eq!(ConditionSet::new(vec![]).unwrap_err(), ConditionSetError::Empty);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = ConditionSet::new(vec![
            "Burnout".to_string(),
            "PTSD".to_string(),
            "Burnout".to_string(),
        ])
        .unwrap_err();
        assert_eq!(err, ConditionSetError::DuplicateLabel("Burnout".to_string()));
    }

    #[test]
    fn test_condition_at_bounds() {
        let set = sample_set();

        let condition = set.condition_at(1).unwrap();
        assert_eq!(condition.index(), 1);
        assert_eq!(condition.label(), "Depression");
        assert!(set.condition_at(3).is_none());
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let set = sample_set();

        assert_eq!(set.resolve("Burnout").unwrap().index(), 2);
        assert!(set.resolve("burnout").is_none());
        assert!(set.resolve("Burn out").is_none());
    }

    #[test]
    fn test_one_hot_shape() {
        let set = sample_set();
        let condition = set.resolve("Depression").unwrap();

        let encoded = set.one_hot(&condition);
        assert_eq!(encoded, vec![0.0, 1.0, 0.0]);
        assert_eq!(encoded.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_therapy_label() {
        let set = sample_set();
        let condition = set.resolve("Stress & Anxiety").unwrap();
        assert_eq!(condition.therapy_label(), "Stress & Anxiety Therapy");
    }

    #[test]
    fn test_condition_serializes_as_label() {
        let set = sample_set();
        let condition = set.resolve("Burnout").unwrap();
        assert_eq!(serde_json::to_string(&condition).unwrap(), "\"Burnout\"");
    }
}
