//! Environment identity, content records, and the index catalog.

use crate::capabilities::IndexDecoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Document id substituted exactly once when a predicted environment has no
/// content document. Deployments are expected to keep this document seeded.
pub const FALLBACK_ENVIRONMENT: &str = "forest";

/// Identifier of an environment content document.
///
/// Ids are opaque to the pipeline; the set in circulation mixes snake_case,
/// spaced and capitalized spellings, so no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Wrap a raw document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fixed fallback id.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ENVIRONMENT)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EnvironmentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EnvironmentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// An environment content document as the store carries it.
///
/// The typed fields are the ones every document is expected to have; the
/// content team adds fields over time (extra video variants, guidance
/// audio), so anything unrecognized is kept verbatim in `extra` and travels
/// through to the response untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    /// Display title
    pub title: String,

    /// Long-form description shown on the environment screen
    pub description: String,

    /// Bullet-point benefits
    #[serde(default)]
    pub benefits: Vec<String>,

    /// Preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Suggested session duration ("15 mins")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Primary session video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Everything else the document carries (videoUrl1.., guidanceAudioUrl, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Rejection raised while constructing an environment catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog declared no entries.
    #[error("Environment catalog is empty")]
    Empty,

    /// A model output index appeared twice.
    #[error("Duplicate environment index: {0}")]
    DuplicateIndex(i64),

    /// Model outputs are non-negative class positions.
    #[error("Negative environment index: {0}")]
    NegativeIndex(i64),
}

/// One catalog row: a model output index and the document id it decodes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Environment classifier output index
    pub index: i64,

    /// Environment document id
    pub id: EnvironmentId,
}

/// Immutable index-to-id table for decoding environment predictions.
///
/// This is the static-table decoder: the mapping is configuration, fixed at
/// startup. Two indexes may share an id; two rows may not share an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentCatalog {
    entries: Vec<CatalogEntry>,
}

impl EnvironmentCatalog {
    /// Build a catalog from rows, rejecting empties and duplicate indexes.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.index < 0 {
                return Err(CatalogError::NegativeIndex(entry.index));
            }
            if entries[..i].iter().any(|prior| prior.index == entry.index) {
                return Err(CatalogError::DuplicateIndex(entry.index));
            }
        }
        Ok(Self { entries })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; empty catalogs are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The rows in declaration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// The id a model output index decodes to, if the index is known.
    pub fn id_for(&self, index: i64) -> Option<&EnvironmentId> {
        self.entries
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| &entry.id)
    }
}

impl IndexDecoder for EnvironmentCatalog {
    fn decode(&self, index: i64) -> Option<EnvironmentId> {
        self.id_for(index).cloned()
    }
}
