//! Deployment profile loading and validation.
//!
//! A profile binds together everything a deployment fixes at startup: the
//! survey slot layout, the categorical vocabulary, the condition label
//! space, and the environment index table. Profiles are parsed from YAML or
//! JSON, checked structurally against an embedded JSON Schema, and checked
//! semantically for duplicates and empties.

mod parser;
mod schema;

pub use parser::{Profile, ProfileError, SurveySection};
pub use schema::{validate_profile_schema, SchemaError};
