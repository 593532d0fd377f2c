//! Generation oracle trait and conversation types

use serde::{Deserialize, Serialize};
use sqlgen_core::Result;
use std::fmt;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Shape the oracle is asked to reply in
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free text
    Text,
    /// A JSON object matching `schema`
    Json {
        name: String,
        schema: serde_json::Value,
    },
}

/// Status returned by an oracle health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

/// Trait implemented by each text generation backend (OpenAI, Mock)
pub trait GenerationOracle: Send {
    /// Provider name (e.g. "openai", "mock")
    fn name(&self) -> &str;

    /// Check if the oracle is usable (API key set, service configured)
    fn health_check(&self) -> Result<OracleStatus>;

    /// Send the whole conversation and return the reply text
    ///
    /// Transport failures are returned as `SqlGenError::Oracle`.
    fn complete(&self, conversation: &[Message], format: &ResponseFormat) -> Result<String>;
}
