//! sqlgen Gen - Oracle-driven generation of datasets and exercises
//!
//! Provides a pluggable oracle framework (OpenAI, scripted mock), layered
//! configuration, and the generate-validate-repair loop that turns oracle
//! replies into datasets and exercises satisfying their constraints.

pub mod config;
pub mod dataset;
pub mod exercise;
pub mod oracle;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod refinement;

pub use config::{GenerationConfig, ProviderConfig, SqlGenConfig};
pub use dataset::{Dataset, DatasetRecord};
pub use exercise::{Assignment, AssignmentRecord, Exercise, ExerciseRecord};
pub use oracle::{GenerationOracle, Message, OracleStatus, ResponseFormat, Role};
pub use orchestrator::{
    AssignmentGenerator, AttemptOutcome, DatasetGenerator, DatasetRequest, ExerciseGenerator,
    ExerciseRequest, GenerationSettings, GenerationState,
};
pub use refinement::refine_request;
