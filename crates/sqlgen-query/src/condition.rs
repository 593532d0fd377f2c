//! AND/OR decomposition of WHERE and HAVING predicates

use crate::walk::{for_each_shallow_expr, shallow_column_refs};
use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator};
use std::collections::{BTreeMap, BTreeSet};

/// One operand of the top-level AND of a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionChunk {
    /// SQL text of the chunk
    pub text: String,
    /// Number of atomic comparisons mentioning each column, keyed
    /// `table.column` when the reference resolves to a table
    pub comparisons: BTreeMap<String, usize>,
    /// Whether the chunk contains an OR
    pub has_or: bool,
}

impl ConditionChunk {
    /// Columns compared at least twice inside this chunk
    pub fn repeated_columns(&self) -> impl Iterator<Item = &str> {
        self.comparisons
            .iter()
            .filter(|(_, count)| **count >= 2)
            .map(|(name, _)| name.as_str())
    }
}

/// A predicate split on its top-level AND
///
/// `a=1 AND (b=1 OR b=2) AND c=1` gives three chunks; the second one
/// compares `b` twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTree {
    chunks: Vec<ConditionChunk>,
    connectives: usize,
}

impl ConditionTree {
    /// Decompose a predicate expression, keying qualified columns on their
    /// qualifier as written
    pub fn from_expr(expr: &Expr) -> Self {
        Self::from_expr_resolved(expr, |qualifier| qualifier.map(str::to_string))
    }

    /// Decompose a predicate, keying each column on the table `resolve`
    /// returns for its qualifier (`None` for an unqualified column)
    pub fn from_expr_resolved<F>(expr: &Expr, resolve: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<String>,
    {
        let mut parts = Vec::new();
        split_conjuncts(expr, &mut parts);

        let chunks = parts
            .into_iter()
            .map(|part| {
                let mut comparisons = BTreeMap::new();
                let mut has_or = false;
                count_comparisons(part, &resolve, &mut comparisons, &mut has_or);
                ConditionChunk {
                    text: part.to_string(),
                    comparisons,
                    has_or,
                }
            })
            .collect();

        let mut connectives = 0;
        for_each_shallow_expr(expr, |e| {
            if let Expr::BinaryOp {
                op: BinaryOperator::And | BinaryOperator::Or,
                ..
            } = e
            {
                connectives += 1;
            }
        });

        Self {
            chunks,
            connectives,
        }
    }

    /// Decompose an optional predicate; `None` gives an empty tree
    pub fn from_optional(expr: Option<&Expr>) -> Self {
        expr.map(Self::from_expr).unwrap_or_default()
    }

    pub fn from_optional_resolved<F>(expr: Option<&Expr>, resolve: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<String>,
    {
        expr.map(|e| Self::from_expr_resolved(e, resolve))
            .unwrap_or_default()
    }

    pub fn chunks(&self) -> &[ConditionChunk] {
        &self.chunks
    }

    /// Number of AND/OR connectives
    pub fn connectives(&self) -> usize {
        self.connectives
    }

    /// Number of logical conditions: one more than the connectives, or zero
    /// when there is no predicate at all
    pub fn total_conditions(&self) -> usize {
        if self.chunks.is_empty() {
            0
        } else {
            self.connectives + 1
        }
    }

    /// Columns compared more than once within a single chunk
    pub fn repeated_columns(&self) -> BTreeSet<String> {
        self.chunks
            .iter()
            .flat_map(|c| c.repeated_columns().map(str::to_string))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn split_conjuncts<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            split_conjuncts(left, out);
            split_conjuncts(right, out);
        }
        Expr::Nested(inner) if is_and(inner) => split_conjuncts(inner, out),
        other => out.push(other),
    }
}

fn is_and(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::BinaryOp {
            op: BinaryOperator::And,
            ..
        }
    )
}

fn count_comparisons<F>(
    expr: &Expr,
    resolve: &F,
    counts: &mut BTreeMap<String, usize>,
    has_or: &mut bool,
) where
    F: Fn(Option<&str>) -> Option<String>,
{
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            count_comparisons(left, resolve, counts, has_or);
            count_comparisons(right, resolve, counts, has_or);
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right,
        } => {
            *has_or = true;
            count_comparisons(left, resolve, counts, has_or);
            count_comparisons(right, resolve, counts, has_or);
        }
        Expr::Nested(inner) => count_comparisons(inner, resolve, counts, has_or),
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr,
        } => count_comparisons(expr, resolve, counts, has_or),
        atomic => {
            let keys: BTreeSet<String> = shallow_column_refs(atomic)
                .into_iter()
                .map(|(qualifier, column)| match resolve(qualifier.as_deref()) {
                    Some(table) => format!("{}.{}", table, column),
                    None => column,
                })
                .collect();
            for key in keys {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::{SetExpr, Statement};
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    fn where_of(sql: &str) -> Expr {
        let stmt = Parser::parse_sql(&GenericDialect {}, sql)
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        let Statement::Query(q) = stmt else {
            panic!("not a query")
        };
        let SetExpr::Select(select) = *q.body else {
            panic!("not a select")
        };
        select.selection.unwrap()
    }

    #[test]
    fn test_chunks_split_on_top_level_and() {
        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM t WHERE a=1 AND (b=1 OR b=2) AND c=1",
        ));
        assert_eq!(tree.chunks().len(), 3);
        assert_eq!(tree.total_conditions(), 4);
        assert!(tree.chunks()[1].has_or);
    }

    #[test]
    fn test_repeated_column_is_only_b() {
        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM t WHERE a=1 AND (b=1 OR b=2) AND c=1",
        ));
        let repeated = tree.repeated_columns();
        assert!(repeated.contains("b"));
        assert!(!repeated.contains("a"));
        assert!(!repeated.contains("c"));
    }

    #[test]
    fn test_same_column_in_separate_chunks_not_repeated() {
        let tree =
            ConditionTree::from_expr(&where_of("SELECT * FROM t WHERE city='x' AND city='y'"));
        assert_eq!(tree.chunks().len(), 2);
        assert!(tree.repeated_columns().is_empty());
    }

    #[test]
    fn test_nested_and_is_flattened() {
        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM t WHERE (a=1 AND b=2) AND c=3",
        ));
        assert_eq!(tree.chunks().len(), 3);
        assert_eq!(tree.total_conditions(), 3);
    }

    #[test]
    fn test_subquery_connectives_not_counted() {
        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM t WHERE a IN (SELECT x FROM u WHERE y=1 AND z=2)",
        ));
        assert_eq!(tree.total_conditions(), 1);
        assert!(tree.repeated_columns().is_empty());
    }

    #[test]
    fn test_qualified_columns_of_different_tables_are_distinct() {
        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM customer c JOIN orders o ON o.customer_id = c.id WHERE c.id = 1 OR o.id = 2",
        ));
        assert!(tree.repeated_columns().is_empty());

        let tree = ConditionTree::from_expr(&where_of(
            "SELECT * FROM customer c WHERE c.city = 'x' OR c.city = 'y'",
        ));
        assert!(tree.repeated_columns().contains("c.city"));
    }

    #[test]
    fn test_empty_tree() {
        let tree = ConditionTree::from_optional(None);
        assert!(tree.is_empty());
        assert_eq!(tree.total_conditions(), 0);
    }
}
