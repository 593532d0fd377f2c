//! sqlgen Core - Foundational types for the exercise generator
//!
//! This crate provides the types that all other sqlgen crates depend on:
//! - `SqlGenError` and the `Result` alias
//! - `ConstraintViolation` - a failed predicate with its observed values
//! - `ContentHash` - SHA-256 based content hashing
//! - `Difficulty`, `Language` - exercise tiers and description languages

mod error;
mod hash;
mod types;

pub use error::{ConstraintViolation, Result, SqlGenError};
pub use hash::ContentHash;
pub use types::{Difficulty, Language};
