//! sqlgen Query - Structural model of parsed SQL
//!
//! Wraps `sqlparser` and exposes the pieces the constraint library needs:
//! select blocks with their nesting depth, output columns with alias
//! resolution, set operations, LIKE patterns, AND/OR condition
//! decomposition, and a catalog of tables and keys built from CREATE TABLE
//! statements.

mod catalog;
mod condition;
mod dialect;
mod parser;
mod query;
mod walk;

pub use catalog::{build_catalog, Catalog, Column, ForeignKey, Table};
pub use condition::{ConditionChunk, ConditionTree};
pub use dialect::Dialect;
pub use parser::{insert_row_counts, parse, parse_statements};
pub use query::{
    JoinKind, OutputColumn, Query, SelectBlock, SetOperation, SetOperationKind, TableRef,
};

/// Re-export of the underlying AST for callers that need raw access
pub use sqlparser::ast;
