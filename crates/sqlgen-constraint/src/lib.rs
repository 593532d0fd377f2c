//! sqlgen Constraint - Structural predicates over generated SQL
//!
//! Schema constraints check a catalog and its inserted rows, query
//! constraints check a parsed solution. Both are closed serde-tagged enums so
//! misconception profiles can be written as plain TOML data.

mod merge;
mod query;
mod registry;
mod report;
mod schema;
mod set;
mod types;

pub use merge::{merge_max, merge_min, merge_schema_constraints};
pub use query::{guarantees_unique, pattern_length, QueryConstraint};
pub use registry::{Level, Levels, Misconception, MisconceptionProfile, MisconceptionRegistry};
pub use report::ValidationReport;
pub use schema::SchemaConstraint;
pub use set::ConstraintSet;
pub use types::{within, Constraint, DuplicateMode, Nesting, Presence};
