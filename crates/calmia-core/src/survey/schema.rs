//! Survey slot schema and raw answer representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared semantic type of one questionnaire slot.
///
/// The slot layout is fixed per deployment; every submitted answer is
/// interpreted against the type declared at its position, never against
/// the shape of the value that happened to arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// A 1-10 rating. Sliders and free numeric entries are the same kind;
    /// profiles may spell this `numeric` as well as `scale`.
    #[serde(alias = "numeric")]
    Scale,

    /// A yes/no question.
    Binary,

    /// A fixed-vocabulary choice (High/Medium/Low, Good/Poor, ...).
    Categorical,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Scale => write!(f, "scale"),
            SlotType::Binary => write!(f, "binary"),
            SlotType::Categorical => write!(f, "categorical"),
        }
    }
}

/// One raw questionnaire answer as it arrives at the input boundary.
///
/// A submission body is a heterogeneous JSON array (`[10, "Yes", "High",
/// true, ...]`); the untagged union keeps that dynamic shape explicit so
/// downstream code pattern-matches on it instead of sniffing types ad hoc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// JSON boolean. Only meaningful in binary slots.
    Bool(bool),

    /// JSON number.
    Number(f64),

    /// JSON string.
    Text(String),
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Bool(value)
    }
}

impl From<f64> for Answer {
    fn from(value: f64) -> Self {
        Answer::Number(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Answer::Text(value)
    }
}

/// The fixed positional slot layout of a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveySchema {
    slots: Vec<SlotType>,
}

impl SurveySchema {
    /// Create a schema from an ordered slot list.
    pub fn new(slots: Vec<SlotType>) -> Self {
        Self { slots }
    }

    /// Number of slots (and therefore of expected answers).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema declares no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The ordered slot types.
    pub fn slots(&self) -> &[SlotType] {
        &self.slots
    }
}

/// A single categorical spelling and the numeric score it normalizes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalValue {
    /// Canonical spelling ("High", "Poor", ...)
    pub value: String,

    /// The score this spelling maps to
    pub score: f64,
}

/// Ordered categorical value table with case-insensitive lookup.
///
/// Constructed once at startup and passed by reference; never mutated at
/// runtime. Declaration order is preserved so rejection messages can list
/// the canonical spellings the way the deployment wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoricalMap {
    entries: Vec<CategoricalValue>,
}

impl CategoricalMap {
    /// Create a map from ordered entries.
    ///
    /// Uniqueness of spellings is a profile-level invariant and is checked
    /// by profile validation, not here.
    pub fn new(entries: Vec<CategoricalValue>) -> Self {
        Self { entries }
    }

    /// Look up the score for a spelling, case-insensitively.
    pub fn score(&self, value: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.value.eq_ignore_ascii_case(value))
            .map(|entry| entry.score)
    }

    /// Canonical spellings in declaration order.
    pub fn allowed_values(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }

    /// The ordered entries.
    pub fn entries(&self) -> &[CategoricalValue] {
        &self.entries
    }

    /// Number of declared spellings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map declares no spellings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fixed-width numeric feature vector produced by normalization.
///
/// Length always equals the schema length of the survey it was normalized
/// from; that is the width the condition classifier was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap an ordered value vector.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The ordered feature values.
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
