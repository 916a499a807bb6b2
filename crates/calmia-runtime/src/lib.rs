//! # calmia-runtime
//!
//! Collaborator implementations and the request facade for Calmia.
//!
//! [`calmia-core`](calmia_core) decides; this crate supplies everything the
//! decision core consumes and the async surface that serves it:
//! - Pretrained model artifacts loaded from JSON ([`models`])
//! - An in-memory environment content store ([`store`])
//! - A TTL-bounded therapy plan cache ([`cache`])
//! - The [`RecommendationService`] facade an HTTP layer mounts ([`service`])
//!
//! The pipeline itself stays synchronous and deterministic; async appears
//! only here, at the request boundary and the cache.

pub mod cache;
pub mod config;
pub mod models;
pub mod service;
pub mod store;

pub use cache::RecommendationCache;
pub use config::{CacheConfig, ServiceConfig};
pub use models::{LabelEncoding, LinearClassifier, ModelError};
pub use service::{
    RecommendationService, RecommendationServiceBuilder, ServiceError, SurveyOutcome, TherapyPlan,
};
pub use store::{MemoryStore, StoreSeedError};
