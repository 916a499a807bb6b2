//! Profile parsing and validation.

use crate::conditions::ConditionSet;
use crate::environment::{CatalogEntry, EnvironmentCatalog, EnvironmentId};
use crate::survey::{CategoricalMap, CategoricalValue, SlotType, SurveySchema};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a profile.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Profile validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Survey section of a profile: the positional slot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySection {
    /// Ordered slot types, one per question
    pub slots: Vec<SlotType>,
}

/// A deployment profile.
///
/// Everything request handling needs to know about a deployment in one
/// immutable document: the survey layout, the categorical vocabulary, the
/// ordered condition labels the first model emits, and the environment
/// index table the second model's outputs decode through. Loaded once at
/// startup and shared by reference; there is no mutable lookup state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Version of this profile (semver format)
    pub profile_version: String,

    /// Human-readable name
    pub name: String,

    /// Optional description of the deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Survey slot layout
    pub survey: SurveySection,

    /// Categorical spellings and their scores, in declaration order
    pub categorical_values: CategoricalMap,

    /// Ordered condition labels (the first classifier's output space)
    pub conditions: Vec<String>,

    /// Environment index table (the second classifier's output space)
    pub environments: Vec<CatalogEntry>,
}

impl Profile {
    /// Parse a profile from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load a profile from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate profile consistency.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.profile_version.is_empty() {
            return Err(ProfileError::MissingField("profile_version".to_string()));
        }
        if self.name.is_empty() {
            return Err(ProfileError::MissingField("name".to_string()));
        }
        if self.survey.slots.is_empty() {
            return Err(ProfileError::ValidationError(
                "Survey declares no slots".to_string(),
            ));
        }
        if self.categorical_values.is_empty() {
            return Err(ProfileError::ValidationError(
                "Categorical value table is empty".to_string(),
            ));
        }

        // Spellings must be unique under the same case folding the
        // normalizer matches with.
        let entries = self.categorical_values.entries();
        for (i, entry) in entries.iter().enumerate() {
            let clash = entries[..i]
                .iter()
                .any(|prior| prior.value.eq_ignore_ascii_case(&entry.value));
            if clash {
                return Err(ProfileError::ValidationError(format!(
                    "Duplicate categorical value: {}",
                    entry.value
                )));
            }
        }

        self.condition_set()?;
        self.catalog()?;
        Ok(())
    }

    /// The survey slot layout as a schema.
    pub fn schema(&self) -> SurveySchema {
        SurveySchema::new(self.survey.slots.clone())
    }

    /// The categorical vocabulary.
    pub fn categories(&self) -> &CategoricalMap {
        &self.categorical_values
    }

    /// Build the ordered condition set this profile declares.
    pub fn condition_set(&self) -> Result<ConditionSet, ProfileError> {
        ConditionSet::new(self.conditions.clone())
            .map_err(|e| ProfileError::ValidationError(e.to_string()))
    }

    /// Build the environment index catalog this profile declares.
    pub fn catalog(&self) -> Result<EnvironmentCatalog, ProfileError> {
        EnvironmentCatalog::new(self.environments.clone())
            .map_err(|e| ProfileError::ValidationError(e.to_string()))
    }

    /// The built-in baseline profile: a 15-question wellness survey over 14
    /// conditions and 18 environments.
    pub fn baseline() -> &'static Profile {
        &BASELINE
    }
}

const BASELINE_SLOTS: [SlotType; 15] = [
    SlotType::Scale,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Categorical,
    SlotType::Categorical,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Binary,
    SlotType::Scale,
    SlotType::Binary,
    SlotType::Scale,
    SlotType::Scale,
];

const BASELINE_CATEGORIES: [(&str, f64); 9] = [
    ("High", 3.0),
    ("Medium", 2.0),
    ("Low", 1.0),
    ("No", 0.0),
    ("Yes", 1.0),
    ("Poor", 1.0),
    ("Good", 3.0),
    ("True", 1.0),
    ("False", 0.0),
];

const BASELINE_CONDITIONS: [&str; 14] = [
    "Stress & Anxiety",
    "Social Anxiety",
    "Fear of Failure",
    "Depression",
    "Decision Paralysis",
    "Agoraphobia",
    "Emotional Loneliness",
    "Burnout",
    "PTSD",
    "Sleep Anxiety",
    "Severe Stress",
    "Panic Disorder",
    "OCD",
    "Bipolar Disorder",
];

const BASELINE_ENVIRONMENTS: [(i64, &str); 18] = [
    (0, "forest"),
    (1, "social exposure"),
    (2, "beach"),
    (3, "mountains"),
    (4, "Rainforest"),
    (5, "garden"),
    (6, "Self Affirmation"),
    (7, "sunlight therapy"),
    (8, "Decision Making"),
    (9, "Emotional Bonding"),
    (10, "Guided Nature Walk"),
    (11, "Starry Night"),
    (12, "virtual_room"),
    (13, "meadow"),
    (14, "virtual_city"),
    (15, "cozy_cabin"),
    (16, "forest_path"),
    (17, "ocean_shore"),
];

lazy_static! {
    static ref BASELINE: Profile = Profile {
        profile_version: "1.0.0".to_string(),
        name: "Wellness baseline".to_string(),
        description: Some(
            "15-question mental wellness survey with 14 conditions and 18 environments"
                .to_string()
        ),
        survey: SurveySection { slots: BASELINE_SLOTS.to_vec() },
        categorical_values: CategoricalMap::new(
            BASELINE_CATEGORIES
                .iter()
                .map(|(value, score)| CategoricalValue {
                    value: value.to_string(),
                    score: *score,
                })
                .collect()
        ),
        conditions: BASELINE_CONDITIONS.iter().map(|s| s.to_string()).collect(),
        environments: BASELINE_ENVIRONMENTS
            .iter()
            .map(|(index, id)| CatalogEntry {
                index: *index,
                id: EnvironmentId::from(*id),
            })
            .collect(),
    };
}
