//! Misconception registry loaded from TOML

use crate::query::QueryConstraint;
use crate::schema::SchemaConstraint;
use serde::{Deserialize, Serialize};
use sqlgen_core::{Difficulty, Result, SqlGenError};
use std::fs;
use std::path::Path;

const BUILTIN: &str = include_str!("misconceptions.toml");

/// Constraints and hints for one difficulty level of a misconception
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Free-text characteristics appended to the prompt
    #[serde(default)]
    pub extra_details: String,
    #[serde(default)]
    pub schema: Vec<SchemaConstraint>,
    #[serde(default)]
    pub query: Vec<QueryConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Levels {
    #[serde(default)]
    pub easy: Option<Level>,
    #[serde(default)]
    pub medium: Option<Level>,
    #[serde(default)]
    pub hard: Option<Level>,
}

impl Levels {
    pub fn get(&self, difficulty: Difficulty) -> Option<&Level> {
        match difficulty {
            Difficulty::Easy => self.easy.as_ref(),
            Difficulty::Medium => self.medium.as_ref(),
            Difficulty::Hard => self.hard.as_ref(),
        }
    }

    /// Difficulties with a defined level
    pub fn available(&self) -> Vec<Difficulty> {
        Difficulty::ALL
            .iter()
            .copied()
            .filter(|d| self.get(*d).is_some())
            .collect()
    }
}

/// A misconception a generated exercise should target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misconception {
    pub id: String,
    pub title: String,
    /// Explanation given to the oracle
    pub description: String,
    #[serde(default)]
    pub levels: Levels,
}

/// Constraints resolved for one (misconception, difficulty) pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisconceptionProfile {
    pub misconception_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub schema: Vec<SchemaConstraint>,
    pub query: Vec<QueryConstraint>,
    pub extra_details: String,
}

/// TOML file format for misconception definitions
#[derive(Debug, Deserialize)]
pub struct MisconceptionFile {
    pub misconception: Vec<Misconception>,
}

/// Registry of known misconceptions, in load order
#[derive(Debug, Default)]
pub struct MisconceptionRegistry {
    misconceptions: Vec<Misconception>,
}

impl MisconceptionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the definitions shipped with the crate
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.load_string(BUILTIN)?;
        Ok(registry)
    }

    /// Load misconceptions from a TOML file
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let content = fs::read_to_string(path)?;
        self.load_string(&content)
    }

    /// Load misconceptions from a TOML string
    ///
    /// A definition whose id is already registered replaces the earlier one.
    pub fn load_string(&mut self, content: &str) -> Result<()> {
        let file: MisconceptionFile = toml::from_str(content).map_err(|e| {
            SqlGenError::Registry(format!("Failed to parse misconception TOML: {}", e))
        })?;

        for misconception in file.misconception {
            self.register(misconception);
        }
        Ok(())
    }

    /// Register a misconception directly
    pub fn register(&mut self, misconception: Misconception) {
        match self
            .misconceptions
            .iter_mut()
            .find(|m| m.id == misconception.id)
        {
            Some(existing) => {
                tracing::debug!(id = %misconception.id, "replacing misconception definition");
                *existing = misconception;
            }
            None => self.misconceptions.push(misconception),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Misconception> {
        self.misconceptions.iter().find(|m| m.id == id)
    }

    pub fn all(&self) -> &[Misconception] {
        &self.misconceptions
    }

    /// Resolve the constraints of a misconception at a difficulty
    pub fn profile(&self, id: &str, difficulty: Difficulty) -> Result<MisconceptionProfile> {
        let misconception = self
            .get(id)
            .ok_or_else(|| SqlGenError::Registry(format!("Unknown misconception '{}'", id)))?;
        let level = misconception.levels.get(difficulty).ok_or_else(|| {
            SqlGenError::Registry(format!(
                "Misconception '{}' has no {} level",
                id, difficulty
            ))
        })?;

        Ok(MisconceptionProfile {
            misconception_id: misconception.id.clone(),
            title: misconception.title.clone(),
            description: misconception.description.clone(),
            difficulty,
            schema: level.schema.clone(),
            query: level.query.clone(),
            extra_details: level.extra_details.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.misconceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.misconceptions.is_empty()
    }
}
