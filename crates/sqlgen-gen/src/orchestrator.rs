//! Generate-validate-repair loop
//!
//! Every artifact goes through the same bounded loop: the oracle drafts a
//! reply, the reply is parsed and validated, and any failure is turned into
//! a feedback message appended to the conversation before the next draft.
//! Oracle transport errors are not part of the loop and propagate at once.

use crate::config::GenerationConfig;
use crate::dataset::Dataset;
use crate::exercise::{Assignment, Exercise};
use crate::oracle::{GenerationOracle, Message, ResponseFormat};
use crate::prompts;
use crate::refinement::refine_request;
use serde::Deserialize;
use sqlgen_constraint::{
    Constraint, ConstraintSet, MisconceptionProfile, MisconceptionRegistry, QueryConstraint,
    SchemaConstraint, ValidationReport,
};
use sqlgen_core::{ConstraintViolation, Difficulty, Language, Result, SqlGenError};
use sqlgen_query::{build_catalog, insert_row_counts, parse, Catalog, Dialect, Query};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Result of one draft
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The reply or one of its SQL fragments could not be parsed
    ParseFailure(String),
    /// The reply parsed but broke at least one constraint
    ValidationFailure(Vec<ConstraintViolation>),
    Success(T),
}

/// Where an artifact is in the generation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Drafting,
    Validating,
    Repairing,
    Accepted,
    Exhausted,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationState::Drafting => "drafting",
            GenerationState::Validating => "validating",
            GenerationState::Repairing => "repairing",
            GenerationState::Accepted => "accepted",
            GenerationState::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// Knobs shared by every generator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub max_attempts: usize,
    pub dialect: Dialect,
    pub language: Language,
    pub refine_requests: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl GenerationSettings {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            dialect: config.dialect,
            language: config.language,
            refine_requests: config.refine_requests,
        }
    }
}

/// Drive one artifact through the bounded repair loop
fn run_attempts<T, F>(
    oracle: &dyn GenerationOracle,
    artifact: &str,
    settings: &GenerationSettings,
    mut conversation: Vec<Message>,
    format: &ResponseFormat,
    mut validate: F,
) -> Result<T>
where
    F: FnMut(&str) -> AttemptOutcome<T>,
{
    let run_id = Uuid::new_v4();
    let mut failures = Vec::new();

    for attempt in 1..=settings.max_attempts {
        tracing::info!(artifact, attempt, run_id = %run_id, state = %GenerationState::Drafting, oracle = oracle.name());
        let reply = oracle.complete(&conversation, format)?;

        tracing::debug!(artifact, attempt, run_id = %run_id, state = %GenerationState::Validating);
        let feedback = match validate(&reply) {
            AttemptOutcome::Success(value) => {
                tracing::info!(artifact, attempt, run_id = %run_id, state = %GenerationState::Accepted);
                return Ok(value);
            }
            AttemptOutcome::ParseFailure(message) => {
                tracing::warn!(artifact, attempt, run_id = %run_id, error = %message, "unparseable reply");
                let feedback = prompts::parse_error_feedback(&message, settings.language);
                failures = vec![message];
                feedback
            }
            AttemptOutcome::ValidationFailure(violations) => {
                tracing::warn!(artifact, attempt, run_id = %run_id, violations = violations.len(), "constraints not satisfied");
                let report = ValidationReport { violations };
                failures = report.failures();
                report.feedback(settings.language)
            }
        };

        conversation.push(Message::assistant(reply));
        if attempt < settings.max_attempts {
            tracing::debug!(artifact, attempt, run_id = %run_id, state = %GenerationState::Repairing);
            conversation.push(Message::user(feedback));
        }
    }

    tracing::error!(artifact, attempts = settings.max_attempts, run_id = %run_id, state = %GenerationState::Exhausted);
    Err(SqlGenError::Generation {
        artifact: artifact.to_string(),
        attempts: settings.max_attempts,
        failures,
    })
}

fn decode_reply<'de, R: Deserialize<'de>>(reply: &'de str) -> std::result::Result<R, String> {
    serde_json::from_str(prompts::strip_code_fence(reply))
        .map_err(|e| format!("the reply is not valid JSON for the requested format: {}", e))
}

/// What to generate for a dataset
#[derive(Debug, Clone, Default)]
pub struct DatasetRequest {
    pub domain: String,
    pub extra_details: Vec<String>,
    pub constraints: Vec<SchemaConstraint>,
}

#[derive(Debug, Deserialize)]
struct DatasetReply {
    schema_tables: Vec<String>,
    insert_commands: Vec<String>,
}

struct AcceptedDataset {
    create_commands: Vec<String>,
    insert_commands: Vec<String>,
    catalog: Catalog,
}

/// Generates datasets that satisfy schema constraints
pub struct DatasetGenerator<'a> {
    oracle: &'a dyn GenerationOracle,
    settings: GenerationSettings,
}

impl<'a> DatasetGenerator<'a> {
    pub fn new(oracle: &'a dyn GenerationOracle, settings: GenerationSettings) -> Self {
        Self { oracle, settings }
    }

    pub fn generate(&self, request: &DatasetRequest) -> Result<Dataset> {
        let language = self.settings.language;
        let dialect = self.settings.dialect;
        let requirements: Vec<String> = request
            .constraints
            .iter()
            .map(|c| c.description(language))
            .collect();

        let conversation = vec![
            Message::system(prompts::system_prompt(language, dialect)),
            Message::user(prompts::dataset_prompt(
                &request.domain,
                &request.extra_details,
                &requirements,
                dialect,
            )),
        ];

        let accepted = run_attempts(
            self.oracle,
            "dataset",
            &self.settings,
            conversation,
            &prompts::dataset_format(),
            |reply| self.check(reply, request),
        )?;

        Ok(Dataset::with_catalog(
            request.domain.clone(),
            accepted.create_commands,
            accepted.insert_commands,
            dialect,
            Arc::new(accepted.catalog),
        ))
    }

    fn check(&self, reply: &str, request: &DatasetRequest) -> AttemptOutcome<AcceptedDataset> {
        let reply: DatasetReply = match decode_reply(reply) {
            Ok(reply) => reply,
            Err(message) => return AttemptOutcome::ParseFailure(message),
        };
        if reply.schema_tables.is_empty() {
            return AttemptOutcome::ParseFailure(
                "`schema_tables` contains no CREATE TABLE statement".to_string(),
            );
        }

        let dialect = self.settings.dialect;
        let catalog = match build_catalog(&reply.schema_tables, dialect) {
            Ok(catalog) => catalog,
            Err(e) => return AttemptOutcome::ParseFailure(e.to_string()),
        };
        let rows = match insert_row_counts(&reply.insert_commands, dialect) {
            Ok(rows) => rows,
            Err(e) => return AttemptOutcome::ParseFailure(e.to_string()),
        };
        let unknown: Vec<&str> = rows
            .keys()
            .filter(|table| catalog.table(table).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return AttemptOutcome::ParseFailure(format!(
                "INSERT statements target undeclared tables: {}",
                unknown.join(", ")
            ));
        }

        let mut report = ValidationReport::new();
        for constraint in &request.constraints {
            report.record(constraint.validate(&catalog, &rows, self.settings.language));
        }
        if !report.is_valid() {
            return AttemptOutcome::ValidationFailure(report.violations);
        }

        AttemptOutcome::Success(AcceptedDataset {
            create_commands: reply.schema_tables,
            insert_commands: reply.insert_commands,
            catalog,
        })
    }
}

/// What to generate for one exercise
#[derive(Debug, Clone)]
pub struct ExerciseRequest {
    pub title: String,
    pub misconception_id: String,
    pub misconception_description: String,
    pub difficulty: Difficulty,
    pub extra_details: Vec<String>,
    pub constraints: Vec<QueryConstraint>,
}

impl ExerciseRequest {
    pub fn from_profile(profile: &MisconceptionProfile) -> Self {
        let extra_details = if profile.extra_details.trim().is_empty() {
            Vec::new()
        } else {
            vec![profile.extra_details.clone()]
        };
        Self {
            title: profile.title.clone(),
            misconception_id: profile.misconception_id.clone(),
            misconception_description: profile.description.clone(),
            difficulty: profile.difficulty,
            extra_details,
            constraints: profile.query.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExerciseReply {
    request: String,
    solution: String,
}

/// Generates exercises over an accepted dataset
pub struct ExerciseGenerator<'a> {
    oracle: &'a dyn GenerationOracle,
    settings: GenerationSettings,
}

impl<'a> ExerciseGenerator<'a> {
    pub fn new(oracle: &'a dyn GenerationOracle, settings: GenerationSettings) -> Self {
        Self { oracle, settings }
    }

    pub fn generate(&self, dataset: &Dataset, request: &ExerciseRequest) -> Result<Exercise> {
        let language = self.settings.language;
        let catalog = dataset.catalog()?;
        let requirements: Vec<String> = request
            .constraints
            .iter()
            .map(|c| c.description(language))
            .collect();

        let conversation = vec![
            Message::system(prompts::system_prompt(language, dataset.dialect())),
            Message::user(prompts::exercise_prompt(
                dataset.domain(),
                dataset.create_commands(),
                &request.title,
                &request.misconception_description,
                request.difficulty,
                &request.extra_details,
                &requirements,
                language,
            )),
        ];

        let (text, solution) = run_attempts(
            self.oracle,
            "exercise",
            &self.settings,
            conversation,
            &prompts::exercise_format(),
            |reply| self.check(reply, request, &catalog, dataset.dialect()),
        )?;

        let mut exercise = Exercise {
            title: request.title.clone(),
            difficulty: request.difficulty,
            misconception_id: request.misconception_id.clone(),
            request: text,
            solution,
        };

        if self.settings.refine_requests {
            exercise.request = refine_request(
                self.oracle,
                &exercise.request,
                exercise.solution.sql(),
                &exercise.solution_aliases(),
                language,
            )?;
        }

        Ok(exercise)
    }

    fn check(
        &self,
        reply: &str,
        request: &ExerciseRequest,
        catalog: &Catalog,
        dialect: Dialect,
    ) -> AttemptOutcome<(String, Query)> {
        let reply: ExerciseReply = match decode_reply(reply) {
            Ok(reply) => reply,
            Err(message) => return AttemptOutcome::ParseFailure(message),
        };
        if reply.request.trim().is_empty() {
            return AttemptOutcome::ParseFailure("`request` is empty".to_string());
        }

        let query = match parse(prompts::strip_code_fence(&reply.solution), dialect) {
            Ok(query) => query,
            Err(e) => return AttemptOutcome::ParseFailure(e.to_string()),
        };
        let unknown: Vec<&str> = query
            .tables()
            .iter()
            .filter(|table| catalog.table(table).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return AttemptOutcome::ParseFailure(format!(
                "the solution references tables that are not in the schema: {}",
                unknown.join(", ")
            ));
        }

        let mut report = ValidationReport::new();
        for constraint in &request.constraints {
            report.record(constraint.validate(&query, catalog, self.settings.language));
        }
        if !report.is_valid() {
            return AttemptOutcome::ValidationFailure(report.violations);
        }

        AttemptOutcome::Success((reply.request.trim().to_string(), query))
    }
}

/// Generates a dataset plus one exercise per misconception pick
pub struct AssignmentGenerator<'a> {
    oracle: &'a dyn GenerationOracle,
    registry: &'a MisconceptionRegistry,
    settings: GenerationSettings,
    dataset_details: Vec<String>,
}

impl<'a> AssignmentGenerator<'a> {
    pub fn new(
        oracle: &'a dyn GenerationOracle,
        registry: &'a MisconceptionRegistry,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            oracle,
            registry,
            settings,
            dataset_details: Vec::new(),
        }
    }

    /// Extra characteristics requested for the shared dataset
    pub fn with_dataset_details(mut self, details: Vec<String>) -> Self {
        self.dataset_details = details;
        self
    }

    pub fn generate(&self, domain: &str, picks: &[(String, Difficulty)]) -> Result<Assignment> {
        let profiles = picks
            .iter()
            .map(|(id, difficulty)| self.registry.profile(id, *difficulty))
            .collect::<Result<Vec<_>>>()?;
        let constraints = ConstraintSet::from_profiles(&profiles)?;

        tracing::info!(
            domain,
            picks = picks.len(),
            schema_constraints = constraints.schema.len(),
            "generating assignment"
        );

        let dataset = DatasetGenerator::new(self.oracle, self.settings.clone()).generate(
            &DatasetRequest {
                domain: domain.to_string(),
                extra_details: self.dataset_details.clone(),
                constraints: constraints.schema,
            },
        )?;

        let exercise_generator = ExerciseGenerator::new(self.oracle, self.settings.clone());
        let exercises = profiles
            .iter()
            .map(|profile| {
                exercise_generator.generate(&dataset, &ExerciseRequest::from_profile(profile))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Assignment { dataset, exercises })
    }
}
