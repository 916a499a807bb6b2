//! Recommendation service facade.
//!
//! The surface an HTTP layer mounts. It owns the deployment profile's
//! derived state, the injected model and store capabilities, and a
//! TTL-bounded plan cache, and it implements the three request shapes:
//! - `classify`: raw answers -> condition
//! - `recommend`: condition label -> therapy plan
//! - `run`: raw answers -> condition + therapy plan
//!
//! Errors are classified into client-caused and server-caused so a
//! transport can pick status codes without matching on every variant.

use std::sync::Arc;
use thiserror::Error;

use calmia_core::{
    classify_survey, resolve_environment, Answer, CategoricalMap, ClassifyError, Condition,
    ConditionClassifier, ConditionSet, EnvironmentClassifier, EnvironmentId, EnvironmentRecord,
    EnvironmentStore, IndexDecoder, PredictionError, Profile, ProfileError, Resolution,
    ResolutionError, SurveySchema, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::RecommendationCache;
use crate::config::ServiceConfig;

/// Errors from the recommendation service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Condition '{0}' not valid")]
    UnknownCondition(String),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl ServiceError {
    /// True when the caller sent something unserviceable; false when the
    /// deployment itself failed. Transports map this to 400 vs 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::UnknownCondition(_)
        )
    }
}

impl From<ClassifyError> for ServiceError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Validation(e) => ServiceError::Validation(e),
            ClassifyError::Prediction(e) => ServiceError::Prediction(e),
        }
    }
}

/// The resolved recommendation for a condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyPlan {
    /// Display name of the recommended therapy ("Burnout Therapy")
    pub therapy: String,

    /// Id of the environment document actually served
    pub environment_id: EnvironmentId,

    /// The environment content document
    pub environment: EnvironmentRecord,

    /// True when the fixed fallback replaced the predicted environment
    pub fell_back: bool,

    /// When this plan was resolved
    pub resolved_at: DateTime<Utc>,
}

impl TherapyPlan {
    /// Assemble a plan from a condition and its resolution, stamped now.
    pub fn from_resolution(condition: &Condition, resolution: Resolution) -> Self {
        Self {
            therapy: condition.therapy_label(),
            environment_id: resolution.environment_id,
            environment: resolution.record,
            fell_back: resolution.fell_back,
            resolved_at: Utc::now(),
        }
    }
}

/// Result of running the full pipeline on a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyOutcome {
    /// The predicted condition label
    pub condition: Condition,

    /// The resolved therapy plan
    pub plan: TherapyPlan,
}

/// The recommendation service.
///
/// # Architecture
/// - Derived profile state (schema, vocabulary, labels) is built once at
///   construction and shared immutably
/// - Models, decoder, and store are injected behind their capability traits
/// - Plans are cached per condition label with a TTL, because the content
///   store is written by external systems
pub struct RecommendationService {
    /// Survey slot layout
    schema: SurveySchema,

    /// Categorical vocabulary
    categories: CategoricalMap,

    /// Ordered condition label space
    conditions: ConditionSet,

    /// First-stage model: features -> condition index
    condition_model: Arc<dyn ConditionClassifier>,

    /// Second-stage model: one-hot condition -> environment index
    environment_model: Arc<dyn EnvironmentClassifier>,

    /// Decodes environment model outputs to document ids
    decoder: Arc<dyn IndexDecoder>,

    /// Environment content documents
    store: Arc<dyn EnvironmentStore>,

    /// Plan cache keyed by condition label
    cache: RecommendationCache,
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService").finish_non_exhaustive()
    }
}

impl RecommendationService {
    /// Start building a service.
    pub fn builder() -> RecommendationServiceBuilder {
        RecommendationServiceBuilder::new()
    }

    /// Classify a raw survey submission into a condition.
    pub async fn classify(&self, answers: &[Answer]) -> Result<Condition, ServiceError> {
        tracing::info!(count = answers.len(), "Received survey submission");

        let condition = classify_survey(
            answers,
            &self.schema,
            &self.categories,
            self.condition_model.as_ref(),
            &self.conditions,
        )?;

        tracing::info!(condition = %condition.label(), index = condition.index(), "Predicted condition");
        Ok(condition)
    }

    /// Resolve the therapy plan for a condition label.
    ///
    /// The label must match the deployment's spelling exactly; anything
    /// else is a client error, mirroring how submissions are rejected.
    pub async fn recommend(&self, condition_label: &str) -> Result<TherapyPlan, ServiceError> {
        let condition = self
            .conditions
            .resolve(condition_label)
            .ok_or_else(|| ServiceError::UnknownCondition(condition_label.to_string()))?;

        if let Some(plan) = self.cache.get(condition.label()).await {
            tracing::debug!(condition = %condition.label(), "Serving cached therapy plan");
            return Ok(plan);
        }

        let resolution = resolve_environment(
            &condition,
            self.environment_model.as_ref(),
            self.decoder.as_ref(),
            self.store.as_ref(),
            &self.conditions,
        )?;

        let plan = TherapyPlan::from_resolution(&condition, resolution);
        tracing::info!(
            condition = %condition.label(),
            environment = %plan.environment_id,
            fell_back = plan.fell_back,
            "Resolved therapy plan"
        );

        self.cache.insert(condition.label().to_string(), plan.clone()).await;
        Ok(plan)
    }

    /// Run the full pipeline: answers to condition to therapy plan.
    pub async fn run(&self, answers: &[Answer]) -> Result<SurveyOutcome, ServiceError> {
        let condition = self.classify(answers).await?;
        let plan = self.recommend(condition.label()).await?;
        Ok(SurveyOutcome { condition, plan })
    }

    /// Drop all cached plans. Useful after out-of-band store edits.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

/// Builder for [`RecommendationService`].
pub struct RecommendationServiceBuilder {
    profile: Option<Profile>,
    config: ServiceConfig,
    condition_model: Option<Arc<dyn ConditionClassifier>>,
    environment_model: Option<Arc<dyn EnvironmentClassifier>>,
    decoder: Option<Arc<dyn IndexDecoder>>,
    store: Option<Arc<dyn EnvironmentStore>>,
}

impl RecommendationServiceBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            profile: None,
            config: ServiceConfig::default(),
            condition_model: None,
            environment_model: None,
            decoder: None,
            store: None,
        }
    }

    /// Set the deployment profile. Defaults to [`Profile::baseline`].
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set the service configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the condition model.
    pub fn condition_model(mut self, model: Arc<dyn ConditionClassifier>) -> Self {
        self.condition_model = Some(model);
        self
    }

    /// Set the environment model.
    pub fn environment_model(mut self, model: Arc<dyn EnvironmentClassifier>) -> Self {
        self.environment_model = Some(model);
        self
    }

    /// Set the index decoder. Defaults to the profile's environment catalog.
    pub fn decoder(mut self, decoder: Arc<dyn IndexDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Set the environment store.
    pub fn store(mut self, store: Arc<dyn EnvironmentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<RecommendationService, ServiceError> {
        let profile = self.profile.unwrap_or_else(|| Profile::baseline().clone());
        profile.validate()?;

        let condition_model = self
            .condition_model
            .ok_or_else(|| ServiceError::NotConfigured("No condition model set".to_string()))?;
        let environment_model = self
            .environment_model
            .ok_or_else(|| ServiceError::NotConfigured("No environment model set".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| ServiceError::NotConfigured("No environment store set".to_string()))?;

        let decoder = match self.decoder {
            Some(decoder) => decoder,
            None => Arc::new(profile.catalog()?),
        };

        let cache =
            RecommendationCache::new(self.config.cache.max_entries, self.config.cache.ttl);

        Ok(RecommendationService {
            schema: profile.schema(),
            categories: profile.categories().clone(),
            conditions: profile.condition_set()?,
            condition_model,
            environment_model,
            decoder,
            store,
            cache,
        })
    }
}

impl Default for RecommendationServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
