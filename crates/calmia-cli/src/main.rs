//! Calmia command line interface.
//!
//! Runs the recommendation pipeline against local artifact files: a
//! deployment profile, linear model artifacts exported as JSON, and an
//! environment document seed. Success output is JSON on stdout in the same
//! shapes the HTTP surface serves; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use calmia_core::{
    classify_survey, resolve_environment, validate_profile_schema, Answer, Profile,
};
use calmia_runtime::{
    LinearClassifier, MemoryStore, RecommendationService, ServiceError, TherapyPlan,
};

#[derive(Parser)]
#[command(name = "calmia")]
#[command(about = "Survey classification and therapy environment recommendation", long_about = None)]
#[command(version)]
struct Cli {
    /// Deployment profile (YAML or JSON); defaults to the built-in baseline
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify survey answers into a condition
    Classify {
        /// JSON array of answers ("-" reads stdin)
        #[arg(long)]
        answers: PathBuf,

        /// Condition model artifact (JSON)
        #[arg(long)]
        condition_model: PathBuf,
    },

    /// Resolve the therapy plan for a condition
    Recommend {
        /// Condition label, spelled exactly as the profile does
        #[arg(long)]
        condition: String,

        /// Environment model artifact (JSON)
        #[arg(long)]
        environment_model: PathBuf,

        /// Environment document seed (JSON map)
        #[arg(long)]
        store: PathBuf,
    },

    /// Run the full pipeline: answers to condition to therapy plan
    Run {
        /// JSON array of answers ("-" reads stdin)
        #[arg(long)]
        answers: PathBuf,

        /// Condition model artifact (JSON)
        #[arg(long)]
        condition_model: PathBuf,

        /// Environment model artifact (JSON)
        #[arg(long)]
        environment_model: PathBuf,

        /// Environment document seed (JSON map)
        #[arg(long)]
        store: PathBuf,
    },

    /// Validate a profile file against the schema and consistency rules
    Validate {
        /// Profile file (YAML or JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(body) => {
            println!("{body:#}");
            ExitCode::SUCCESS
        }
        Err(err) => report_failure(err),
    }
}

async fn execute(cli: Cli) -> Result<serde_json::Value> {
    let Cli { profile, command } = cli;

    match command {
        Commands::Classify { answers, condition_model } => {
            let profile = load_profile(profile.as_deref())?;
            let answers = read_answers(&answers)?;
            let model = load_model(&condition_model)?;
            let conditions = profile.condition_set()?;
            warn_on_class_mismatch(&model, conditions.len());

            let condition = classify_survey(
                &answers,
                &profile.schema(),
                profile.categories(),
                &model,
                &conditions,
            )
            .map_err(|e| anyhow::Error::new(ServiceError::from(e)))?;

            Ok(serde_json::json!({ "condition": condition }))
        }

        Commands::Recommend { condition, environment_model, store } => {
            let profile = load_profile(profile.as_deref())?;
            let model = load_model(&environment_model)?;
            let store = load_store(&store)?;
            let conditions = profile.condition_set()?;
            let catalog = profile.catalog()?;

            let resolved = conditions.resolve(&condition).ok_or_else(|| {
                anyhow::Error::new(ServiceError::UnknownCondition(condition.clone()))
            })?;
            let resolution =
                resolve_environment(&resolved, &model, &catalog, &store, &conditions)
                    .map_err(|e| anyhow::Error::new(ServiceError::from(e)))?;

            let plan = TherapyPlan::from_resolution(&resolved, resolution);
            Ok(serde_json::to_value(&plan)?)
        }

        Commands::Run { answers, condition_model, environment_model, store } => {
            let profile = load_profile(profile.as_deref())?;
            let answers = read_answers(&answers)?;
            let condition_model = load_model(&condition_model)?;
            warn_on_class_mismatch(&condition_model, profile.conditions.len());

            let service = RecommendationService::builder()
                .profile(profile)
                .condition_model(Arc::new(condition_model))
                .environment_model(Arc::new(load_model(&environment_model)?))
                .store(Arc::new(load_store(&store)?))
                .build()
                .map_err(anyhow::Error::new)?;

            let outcome = service.run(&answers).await.map_err(anyhow::Error::new)?;
            Ok(serde_json::to_value(&outcome)?)
        }

        Commands::Validate { file } => {
            let report = validate_profile_file(&file)?;
            Ok(serde_json::to_value(&report)?)
        }
    }
}

/// Pipeline failures print the same error body the HTTP surface emits and
/// split the exit code by who caused them: 1 for the caller, 2 for the
/// deployment. Everything else is a plain stderr failure.
fn report_failure(err: anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ServiceError>() {
        Some(service_err) => {
            println!("{}", serde_json::json!({ "error": service_err.to_string() }));
            if service_err.is_client_error() {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
        None => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[derive(Serialize)]
struct ValidationReport {
    profile: String,
    version: String,
    slots: Vec<String>,
    conditions: usize,
    environments: usize,
    valid: bool,
}

fn validate_profile_file(path: &Path) -> Result<ValidationReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile from {}", path.display()))?;

    // Schema validation runs on the raw document, so a file that would not
    // even deserialize still gets path-level violation messages.
    let document: serde_json::Value = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    if let Err(errors) = validate_profile_schema(&document) {
        anyhow::bail!("Profile failed schema validation:\n  {}", errors.join("\n  "));
    }

    let profile = if is_json(path) {
        Profile::from_json(&content)?
    } else {
        Profile::from_yaml(&content)?
    };

    Ok(ValidationReport {
        profile: profile.name.clone(),
        version: profile.profile_version.clone(),
        slots: profile.survey.slots.iter().map(|slot| slot.to_string()).collect(),
        conditions: profile.conditions.len(),
        environments: profile.environments.len(),
        valid: true,
    })
}

fn load_profile(path: Option<&Path>) -> Result<Profile> {
    let profile = match path {
        None => Profile::baseline().clone(),
        Some(path) => {
            let profile = if is_json(path) {
                Profile::from_json_file(path)
            } else {
                Profile::from_yaml_file(path)
            };
            profile.with_context(|| format!("Failed to load profile from {}", path.display()))?
        }
    };
    tracing::debug!(
        name = %profile.name,
        slots = profile.schema().len(),
        "Loaded deployment profile"
    );
    Ok(profile)
}

/// A model trained against a different condition list still loads; its
/// out-of-range predictions only surface per request. Warn about the skew
/// at load time.
fn warn_on_class_mismatch(model: &LinearClassifier, conditions: usize) {
    let classes = model.classes();
    if classes != conditions {
        tracing::warn!(
            model_classes = classes,
            profile_conditions = conditions,
            "Condition model class count differs from profile condition count"
        );
    }
}

fn load_model(path: &Path) -> Result<LinearClassifier> {
    LinearClassifier::from_json_file(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    MemoryStore::seed_from_json_file(path)
        .with_context(|| format!("Failed to seed environment store from {}", path.display()))
}

fn read_answers(path: &Path) -> Result<Vec<Answer>> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read answers from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers from {}", path.display()))?
    };
    serde_json::from_str(&text)
        .context("Answers must be a JSON array of numbers, strings, and booleans")
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
