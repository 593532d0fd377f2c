//! Error types for sqlgen

use std::fmt;
use thiserror::Error;

/// A single constraint that did not hold for a generated artifact.
///
/// The description is the same text that was sent to the oracle as an
/// instruction, so it can be echoed back verbatim as repair feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Snake-case constraint name (e.g. `repeated_column_conditions`)
    pub constraint: String,
    /// Human-readable requirement in the active language
    pub description: String,
    /// What was actually found in the artifact
    pub observed: String,
}

impl ConstraintViolation {
    pub fn new(
        constraint: impl Into<String>,
        description: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        Self {
            constraint: constraint.into(),
            description: description.into(),
            observed: observed.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (observed: {})", self.description, self.observed)
    }
}

impl std::error::Error for ConstraintViolation {}

/// The main error type for sqlgen operations
#[derive(Debug, Error)]
pub enum SqlGenError {
    #[error("Parse error: {message} in `{fragment}`")]
    Parsing { fragment: String, message: String },

    #[error("Constraint violation: {0}")]
    ConstraintValidation(#[from] ConstraintViolation),

    #[error("Cannot merge constraint '{left}' with constraint '{right}'")]
    ConstraintMerge { left: String, right: String },

    #[error("Generation of {artifact} failed after {attempts} attempt(s): {}", .failures.join("; "))]
    Generation {
        artifact: String,
        attempts: usize,
        failures: Vec<String>,
    },

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

impl SqlGenError {
    /// Build a parsing error, keeping at most a short prefix of the offending SQL
    pub fn parsing(fragment: &str, message: impl Into<String>) -> Self {
        const MAX_FRAGMENT: usize = 160;
        let fragment = fragment.trim();
        let fragment = match fragment.char_indices().nth(MAX_FRAGMENT) {
            Some((idx, _)) => format!("{}...", &fragment[..idx]),
            None => fragment.to_string(),
        };
        SqlGenError::Parsing {
            fragment,
            message: message.into(),
        }
    }
}

/// Result type alias for sqlgen operations
pub type Result<T> = std::result::Result<T, SqlGenError>;

impl From<toml::de::Error> for SqlGenError {
    fn from(err: toml::de::Error) -> Self {
        SqlGenError::TomlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for SqlGenError {
    fn from(err: serde_json::Error) -> Self {
        SqlGenError::JsonError(err.to_string())
    }
}
