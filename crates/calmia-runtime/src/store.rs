//! In-memory environment content store.
//!
//! The production content store is an external document database that other
//! systems write to; this service only reads it. [`MemoryStore`] is the
//! in-process stand-in with the same read contract, seedable from the same
//! JSON document map the seeding scripts push, and safe to mutate from an
//! admin path while requests are being served.

use calmia_core::{EnvironmentId, EnvironmentRecord, EnvironmentStore, StoreError};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while seeding a store.
#[derive(Error, Debug)]
pub enum StoreSeedError {
    #[error("Failed to read seed file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse seed JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Thread-safe in-memory document map keyed by environment id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, EnvironmentRecord>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the given documents.
    pub fn with_documents(docs: BTreeMap<String, EnvironmentRecord>) -> Self {
        Self { docs: RwLock::new(docs) }
    }

    /// Seed a store from a JSON document map, `{"<id>": {<record>}, ...}`.
    pub fn seed_from_json(json: &str) -> Result<Self, StoreSeedError> {
        let docs: BTreeMap<String, EnvironmentRecord> = serde_json::from_str(json)?;
        for id in docs.keys() {
            tracing::debug!(id = %id, "Seeded environment document");
        }
        tracing::info!(count = docs.len(), "Seeded environment store");
        Ok(Self::with_documents(docs))
    }

    /// Seed a store from a JSON file.
    pub fn seed_from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreSeedError> {
        let content = std::fs::read_to_string(path)?;
        Self::seed_from_json(&content)
    }

    /// Insert or replace a document.
    pub fn insert(&self, id: EnvironmentId, record: EnvironmentRecord) {
        self.docs.write().insert(id.as_str().to_string(), record);
    }

    /// Remove a document, returning it if present.
    pub fn remove(&self, id: &EnvironmentId) -> Option<EnvironmentRecord> {
        self.docs.write().remove(id.as_str())
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Ids of all documents, in sorted order.
    pub fn ids(&self) -> Vec<EnvironmentId> {
        self.docs
            .read()
            .keys()
            .map(|id| EnvironmentId::from(id.as_str()))
            .collect()
    }
}

impl EnvironmentStore for MemoryStore {
    fn get(&self, id: &EnvironmentId) -> Result<Option<EnvironmentRecord>, StoreError> {
        Ok(self.docs.read().get(id.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "forest": {
            "title": "Mystical Forest",
            "description": "A paradise for relaxation.",
            "benefits": ["Calms the mind", "Reduces stress"],
            "imageUrl": "https://cdn.example.com/forest.jpg",
            "duration": "15 mins",
            "videoUrl": "https://cdn.example.com/forest.mp4",
            "videoUrl1": "https://cdn.example.com/forest-winter.mp4"
        },
        "Starry Night": {
            "title": "Starry Night",
            "description": "A calm night sky.",
            "benefits": ["Eases sleep"],
            "guidanceAudioUrl": "https://cdn.example.com/starry-guide.mp3"
        }
    }"#;

    #[test]
    fn test_seed_and_get() {
        let store = MemoryStore::seed_from_json(SEED).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.ids(),
            vec![EnvironmentId::from("Starry Night"), EnvironmentId::from("forest")]
        );

        let record = store.get(&EnvironmentId::from("forest")).unwrap().unwrap();
        assert_eq!(record.title, "Mystical Forest");
        assert_eq!(record.benefits.len(), 2);
        assert!(record.extra.contains_key("videoUrl1"));
    }

    #[test]
    fn test_get_miss_is_clean() {
        let store = MemoryStore::seed_from_json(SEED).unwrap();
        assert_eq!(store.get(&EnvironmentId::from("meadow")).unwrap(), None);
    }

    #[test]
    fn test_ids_with_spaces_are_preserved() {
        let store = MemoryStore::seed_from_json(SEED).unwrap();
        let record = store.get(&EnvironmentId::from("Starry Night")).unwrap().unwrap();
        assert_eq!(record.title, "Starry Night");
    }

    #[test]
    fn test_insert_and_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let record = EnvironmentRecord {
            title: "Beach".to_string(),
            description: "Waves.".to_string(),
            benefits: vec![],
            image_url: None,
            duration: None,
            video_url: None,
            extra: BTreeMap::new(),
        };
        store.insert(EnvironmentId::from("beach"), record.clone());
        assert_eq!(store.get(&EnvironmentId::from("beach")).unwrap(), Some(record.clone()));

        assert_eq!(store.remove(&EnvironmentId::from("beach")), Some(record));
        assert!(store.is_empty());
    }

    #[test]
    fn test_bad_seed_json_rejected() {
        let err = MemoryStore::seed_from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, StoreSeedError::JsonError(_)));
    }
}
