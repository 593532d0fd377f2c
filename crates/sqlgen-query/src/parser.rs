//! Entry points wrapping the `sqlparser` parser

use crate::dialect::Dialect;
use crate::query::Query;
use crate::walk::object_name;
use sqlgen_core::{Result, SqlGenError};
use sqlparser::ast::{SetExpr, Statement, Visit, Visitor};
use sqlparser::parser::Parser;
use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// Parse one or more statements
pub fn parse_statements(sql: &str, dialect: Dialect) -> Result<Vec<Statement>> {
    let parser_dialect = dialect.parser_dialect();
    let statements = Parser::parse_sql(parser_dialect.as_ref(), sql)
        .map_err(|e| SqlGenError::parsing(sql, e.to_string()))?;
    if statements.is_empty() {
        return Err(SqlGenError::parsing(sql, "no SQL statement found"));
    }
    Ok(statements)
}

/// Parse a single query statement into the structural model
pub fn parse(sql: &str, dialect: Dialect) -> Result<Query> {
    let mut statements = parse_statements(sql, dialect)?;
    if statements.len() > 1 {
        return Err(SqlGenError::parsing(
            sql,
            format!("expected a single query, found {} statements", statements.len()),
        ));
    }
    let statement = statements.remove(0);
    if !matches!(statement, Statement::Query(_)) {
        return Err(SqlGenError::parsing(sql, "expected a SELECT query"));
    }
    Ok(Query::from_statement(sql.trim(), dialect, statement))
}

struct ValuesRowCounter {
    depth: usize,
    rows: usize,
}

impl Visitor for ValuesRowCounter {
    type Break = ();

    fn pre_visit_query(&mut self, query: &sqlparser::ast::Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            self.rows += match query.body.as_ref() {
                SetExpr::Values(values) => values.rows.len(),
                _ => 1,
            };
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &sqlparser::ast::Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }
}


/// Count inserted rows per target table.
///
/// A multi-row `VALUES` list counts one row per tuple; `INSERT ... SELECT`
/// counts as a single row since its size is unknown without executing it.
pub fn insert_row_counts<S: AsRef<str>>(
    insert_statements: &[S],
    dialect: Dialect,
) -> Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();

    for sql in insert_statements {
        let sql = sql.as_ref();
        for statement in parse_statements(sql, dialect)? {
            let Statement::Insert { table_name, .. } = &statement else {
                return Err(SqlGenError::parsing(
                    &statement.to_string(),
                    "expected an INSERT statement",
                ));
            };
            let mut counter = ValuesRowCounter { depth: 0, rows: 0 };
            let _ = statement.visit(&mut counter);
            *counts.entry(object_name(table_name)).or_insert(0) += counter.rows;
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        let query = parse("SELECT id FROM t;", Dialect::Postgres).unwrap();
        assert_eq!(query.sql(), "SELECT id FROM t;");
        assert_eq!(query.select_count(), 1);
    }

    #[test]
    fn test_parse_error_carries_fragment() {
        let err = parse("SELEC id FROM t", Dialect::Postgres).unwrap_err();
        match err {
            SqlGenError::Parsing { fragment, .. } => assert_eq!(fragment, "SELEC id FROM t"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_query() {
        assert!(parse("DELETE FROM t", Dialect::Postgres).is_err());
        assert!(parse("SELECT 1; SELECT 2", Dialect::Postgres).is_err());
        assert!(parse("   ", Dialect::Postgres).is_err());
    }

    #[test]
    fn test_insert_row_counts() {
        let counts = insert_row_counts(
            &[
                "INSERT INTO author (id, name) VALUES (1, 'Ann'), (2, 'Bob')",
                "INSERT INTO Author VALUES (3, 'Cid')",
                "INSERT INTO book (isbn) VALUES ('x')",
            ],
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(counts.get("author"), Some(&3));
        assert_eq!(counts.get("book"), Some(&1));
    }

    #[test]
    fn test_insert_row_counts_rejects_select() {
        assert!(insert_row_counts(&["SELECT 1"], Dialect::Postgres).is_err());
    }
}
