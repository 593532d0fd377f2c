//! Structural model of a parsed SELECT statement

use crate::condition::ConditionTree;
use crate::dialect::Dialect;
use crate::walk::{
    column_name, column_qualifier, direct_subqueries, for_each_shallow_expr, object_name,
};
use serde::{Deserialize, Serialize};
use sqlparser::ast::{
    self, visit_expressions, visit_relations, Expr, GroupByExpr, JoinOperator, SelectItem,
    SetExpr, SetOperator, SetQuantifier, Statement, TableFactor, Value, Visit, Visitor,
};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::ControlFlow;

const AGGREGATE_FUNCTIONS: &[&str] = &[
    "count",
    "sum",
    "avg",
    "min",
    "max",
    "group_concat",
    "string_agg",
    "array_agg",
];

/// Kind of a join between two FROM items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    /// Comma-separated FROM items
    Implicit,
    /// Semi/anti joins and APPLY
    Other,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Implicit => "implicit join",
            JoinKind::Other => "other join",
        };
        f.write_str(name)
    }
}

impl JoinKind {
    fn from_operator(op: &JoinOperator) -> Self {
        match op {
            JoinOperator::Inner(_) => JoinKind::Inner,
            JoinOperator::LeftOuter(_) => JoinKind::Left,
            JoinOperator::RightOuter(_) => JoinKind::Right,
            JoinOperator::FullOuter(_) => JoinKind::Full,
            JoinOperator::CrossJoin => JoinKind::Cross,
            _ => JoinKind::Other,
        }
    }
}

/// A base table referenced in a FROM clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Lowercase table name
    pub name: String,
    /// Lowercase alias, when one is given
    pub alias: Option<String>,
}

impl TableRef {
    fn matches(&self, qualifier: &str) -> bool {
        self.alias.as_deref() == Some(qualifier) || self.name == qualifier
    }
}

/// One column of a block's result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    /// Name shown in the result set (the alias when given)
    pub name: String,
    /// Explicit alias, as written
    pub alias: Option<String>,
    /// Underlying column when the expression is a plain column reference
    pub real_name: Option<String>,
    /// Table of the column, resolved through FROM aliases
    pub table: Option<String>,
    /// `*` or `t.*`
    pub is_wildcard: bool,
}

impl OutputColumn {
    /// Whether the display name differs from the underlying column name
    pub fn is_aliased(&self) -> bool {
        match (&self.alias, &self.real_name) {
            (Some(alias), Some(real)) => alias.to_lowercase() != *real,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Kind of a set operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOperationKind {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetOperationKind::Union => "UNION",
            SetOperationKind::Intersect => "INTERSECT",
            SetOperationKind::Except => "EXCEPT",
        };
        f.write_str(name)
    }
}

/// A UNION/INTERSECT/EXCEPT node with the tables read by each side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOperation {
    pub kind: SetOperationKind,
    /// `ALL` quantifier present
    pub all: bool,
    pub left_tables: BTreeSet<String>,
    pub right_tables: BTreeSet<String>,
}

impl fmt::Display for SetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.all {
            write!(f, " ALL")?;
        }
        write!(
            f,
            " of {{{}}} and {{{}}}",
            join(&self.left_tables),
            join(&self.right_tables)
        )
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// A single `SELECT` block: the main query or one subquery
#[derive(Debug, Clone)]
pub struct SelectBlock {
    select: ast::Select,
    order_by: Vec<Expr>,
    depth: usize,
    parent: Option<usize>,
    tables: Vec<TableRef>,
    joins: Vec<JoinKind>,
    output_columns: Vec<OutputColumn>,
}

impl SelectBlock {
    fn new(select: &ast::Select, depth: usize, parent: Option<usize>) -> Self {
        let mut tables = Vec::new();
        let mut joins = Vec::new();

        for (i, item) in select.from.iter().enumerate() {
            if i > 0 {
                joins.push(JoinKind::Implicit);
            }
            collect_table_factor(&item.relation, &mut tables, &mut joins);
            for join in &item.joins {
                joins.push(JoinKind::from_operator(&join.join_operator));
                collect_table_factor(&join.relation, &mut tables, &mut joins);
            }
        }

        let output_columns = select
            .projection
            .iter()
            .map(|item| output_column(item, &tables))
            .collect();

        Self {
            select: select.clone(),
            order_by: Vec::new(),
            depth,
            parent,
            tables,
            joins,
            output_columns,
        }
    }

    /// Nesting depth: 1 for the main query, 2 for a flat subquery, 3+ when nested
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index of the enclosing block, `None` for main-level blocks
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn select(&self) -> &ast::Select {
        &self.select
    }

    /// Base tables in the FROM clause (joined tables included)
    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn joins(&self) -> &[JoinKind] {
        &self.joins
    }

    pub fn output_columns(&self) -> &[OutputColumn] {
        &self.output_columns
    }

    pub fn where_clause(&self) -> Option<&Expr> {
        self.select.selection.as_ref()
    }

    pub fn having(&self) -> Option<&Expr> {
        self.select.having.as_ref()
    }

    /// GROUP BY expressions; empty for `GROUP BY ALL`
    pub fn group_by(&self) -> &[Expr] {
        match &self.select.group_by {
            GroupByExpr::Expressions(exprs) => exprs,
            GroupByExpr::All => &[],
        }
    }

    pub fn has_group_by(&self) -> bool {
        match &self.select.group_by {
            GroupByExpr::Expressions(exprs) => !exprs.is_empty(),
            GroupByExpr::All => true,
        }
    }

    pub fn order_by(&self) -> &[Expr] {
        &self.order_by
    }

    pub fn is_distinct(&self) -> bool {
        self.select.distinct.is_some()
    }

    /// Resolve a qualifier (table name or alias) to a table of this block
    pub fn resolve_table(&self, qualifier: &str) -> Option<&TableRef> {
        let qualifier = qualifier.to_lowercase();
        self.tables.iter().find(|t| t.matches(&qualifier))
    }

    /// WHERE predicate split into chunks, with each qualified column keyed on
    /// the table its qualifier resolves to. Columns of a single-table block
    /// are keyed by name alone.
    pub fn where_conditions(&self) -> ConditionTree {
        ConditionTree::from_optional_resolved(self.where_clause(), |qualifier| {
            if self.tables.len() <= 1 {
                return None;
            }
            qualifier.map(|q| {
                self.resolve_table(q)
                    .map_or_else(|| q.to_string(), |t| t.name.clone())
            })
        })
    }

    /// Aggregate function calls in the projection, HAVING and ORDER BY
    /// (lowercase function names, subqueries excluded)
    pub fn aggregate_calls(&self) -> Vec<String> {
        let mut calls = Vec::new();
        let mut record = |expr: &Expr| {
            if let Expr::Function(function) = expr {
                if let Some(name) = function.name.0.last() {
                    let name = name.value.to_lowercase();
                    if AGGREGATE_FUNCTIONS.contains(&name.as_str()) {
                        calls.push(name);
                    }
                }
            }
        };
        for_each_shallow_expr(&self.select.projection, &mut record);
        for_each_shallow_expr(&self.select.having, &mut record);
        for_each_shallow_expr(&self.order_by, &mut record);
        calls
    }

    /// IS NULL / IS NOT NULL tests in WHERE and HAVING
    pub fn null_checks(&self) -> usize {
        let mut count = 0;
        let mut record = |expr: &Expr| {
            if matches!(expr, Expr::IsNull(_) | Expr::IsNotNull(_)) {
                count += 1;
            }
        };
        for_each_shallow_expr(&self.select.selection, &mut record);
        for_each_shallow_expr(&self.select.having, &mut record);
        count
    }
}


fn collect_table_factor(factor: &TableFactor, tables: &mut Vec<TableRef>, joins: &mut Vec<JoinKind>) {
    match factor {
        TableFactor::Table { name, alias, .. } => tables.push(TableRef {
            name: object_name(name),
            alias: alias.as_ref().map(|a| a.name.value.to_lowercase()),
        }),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            collect_table_factor(&table_with_joins.relation, tables, joins);
            for join in &table_with_joins.joins {
                joins.push(JoinKind::from_operator(&join.join_operator));
                collect_table_factor(&join.relation, tables, joins);
            }
        }
        _ => {}
    }
}

fn output_column(item: &SelectItem, tables: &[TableRef]) -> OutputColumn {
    let resolve = |qualifier: Option<String>| -> Option<String> {
        match qualifier {
            Some(q) => tables
                .iter()
                .find(|t| t.matches(&q))
                .map(|t| t.name.clone())
                .or(Some(q)),
            None if tables.len() == 1 => Some(tables[0].name.clone()),
            None => None,
        }
    };

    match item {
        SelectItem::UnnamedExpr(expr) => {
            let real_name = column_name(expr);
            OutputColumn {
                name: real_name.clone().unwrap_or_else(|| expr.to_string()),
                alias: None,
                table: real_name.as_ref().and_then(|_| resolve(column_qualifier(expr))),
                real_name,
                is_wildcard: false,
            }
        }
        SelectItem::ExprWithAlias { expr, alias } => {
            let real_name = column_name(expr);
            OutputColumn {
                name: alias.value.clone(),
                alias: Some(alias.value.clone()),
                table: real_name.as_ref().and_then(|_| resolve(column_qualifier(expr))),
                real_name,
                is_wildcard: false,
            }
        }
        SelectItem::QualifiedWildcard(name, _) => OutputColumn {
            name: format!("{}.*", name),
            alias: None,
            real_name: None,
            table: resolve(Some(object_name(name))),
            is_wildcard: true,
        },
        SelectItem::Wildcard(_) => OutputColumn {
            name: "*".to_string(),
            alias: None,
            real_name: None,
            table: None,
            is_wildcard: true,
        },
    }
}

/// A parsed SQL query with its select blocks
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
    dialect: Dialect,
    statement: Statement,
    blocks: Vec<SelectBlock>,
    tables: BTreeSet<String>,
}

impl Query {
    pub(crate) fn from_statement(sql: &str, dialect: Dialect, statement: Statement) -> Self {
        let mut blocks = Vec::new();
        if let Statement::Query(query) = &statement {
            collect_query(query, 1, None, &mut blocks);
        }
        let tables = referenced_tables(&statement);

        Self {
            sql: sql.to_string(),
            dialect,
            statement,
            blocks,
            tables,
        }
    }

    /// Raw SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Handle to the abstract syntax
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Every select block: main query first, subqueries after their parent
    pub fn blocks(&self) -> &[SelectBlock] {
        &self.blocks
    }

    /// Main-level blocks only (every branch of a top-level set operation)
    pub fn strip_subqueries(&self) -> Vec<&SelectBlock> {
        self.blocks.iter().filter(|b| b.depth == 1).collect()
    }

    /// The first main-level block
    pub fn main_block(&self) -> Option<&SelectBlock> {
        self.blocks.iter().find(|b| b.depth == 1)
    }

    pub fn select_count(&self) -> usize {
        self.blocks.len()
    }

    /// Subqueries at any depth
    pub fn subquery_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.depth >= 2).count()
    }

    /// Subqueries directly inside a main-level block
    pub fn top_level_subquery_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.depth == 2).count()
    }

    /// Maximum select nesting depth (1 when there are no subqueries)
    pub fn max_depth(&self) -> usize {
        self.blocks.iter().map(|b| b.depth).max().unwrap_or(0)
    }

    /// Whether some subquery is nested inside another subquery
    pub fn has_nested_subqueries(&self) -> bool {
        self.subquery_count() > self.top_level_subquery_count()
    }

    /// Lowercase names of every table read anywhere in the query
    pub fn tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    /// Output columns of the main query
    pub fn output_columns(&self) -> &[OutputColumn] {
        self.main_block()
            .map(|b| b.output_columns())
            .unwrap_or(&[])
    }

    /// Every set operation node, outermost first
    pub fn set_operations(&self) -> Vec<SetOperation> {
        let mut collector = SetOperationCollector {
            ctes: cte_names(&self.statement),
            found: Vec::new(),
        };
        let _ = self.statement.visit(&mut collector);
        collector.found
    }

    /// Literal patterns of every LIKE / ILIKE predicate
    pub fn like_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();
        let _ = visit_expressions(&self.statement, |expr| {
            if let Expr::Like { pattern, .. } | Expr::ILike { pattern, .. } = expr {
                if let Expr::Value(
                    Value::SingleQuotedString(s)
                    | Value::DoubleQuotedString(s)
                    | Value::EscapedStringLiteral(s),
                ) = pattern.as_ref()
                {
                    patterns.push(s.clone());
                }
            }
            ControlFlow::<()>::Continue(())
        });
        patterns
    }
}

fn collect_query(query: &ast::Query, depth: usize, parent: Option<usize>, blocks: &mut Vec<SelectBlock>) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            collect_query(&cte.query, depth + 1, parent, blocks);
        }
    }

    let first = blocks.len();
    collect_set_expr(&query.body, depth, parent, blocks);

    if let Some(block) = blocks.get_mut(first) {
        block.order_by = query.order_by.iter().map(|o| o.expr.clone()).collect();
    }
}

fn collect_set_expr(body: &SetExpr, depth: usize, parent: Option<usize>, blocks: &mut Vec<SelectBlock>) {
    match body {
        SetExpr::Select(select) => {
            let index = blocks.len();
            blocks.push(SelectBlock::new(select, depth, parent));
            for subquery in direct_subqueries(select.as_ref()) {
                collect_query(&subquery, depth + 1, Some(index), blocks);
            }
        }
        SetExpr::Query(inner) => collect_query(inner, depth, parent, blocks),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_expr(left, depth, parent, blocks);
            collect_set_expr(right, depth, parent, blocks);
        }
        _ => {}
    }
}

#[derive(Default)]
struct CteNames {
    names: BTreeSet<String>,
}

impl Visitor for CteNames {
    type Break = ();

    fn pre_visit_query(&mut self, query: &ast::Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.names.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }
}

fn cte_names<V: Visit>(node: &V) -> BTreeSet<String> {
    let mut ctes = CteNames::default();
    let _ = node.visit(&mut ctes);
    ctes.names
}

fn relations_except<V: Visit>(node: &V, ctes: &BTreeSet<String>) -> BTreeSet<String> {
    let mut tables = BTreeSet::new();
    let _ = visit_relations(node, |relation| {
        let name = object_name(relation);
        if !ctes.contains(&name) {
            tables.insert(name);
        }
        ControlFlow::<()>::Continue(())
    });
    tables
}

fn referenced_tables<V: Visit>(node: &V) -> BTreeSet<String> {
    relations_except(node, &cte_names(node))
}

struct SetOperationCollector {
    ctes: BTreeSet<String>,
    found: Vec<SetOperation>,
}

impl SetOperationCollector {
    fn collect(&mut self, body: &SetExpr) {
        if let SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } = body
        {
            let kind = match op {
                SetOperator::Union => SetOperationKind::Union,
                SetOperator::Intersect => SetOperationKind::Intersect,
                SetOperator::Except => SetOperationKind::Except,
            };
            self.found.push(SetOperation {
                kind,
                all: matches!(set_quantifier, SetQuantifier::All | SetQuantifier::AllByName),
                left_tables: relations_except(left.as_ref(), &self.ctes),
                right_tables: relations_except(right.as_ref(), &self.ctes),
            });
            // Parenthesised branches are queries of their own and get visited separately
            self.collect(left);
            self.collect(right);
        }
    }
}

impl Visitor for SetOperationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &ast::Query) -> ControlFlow<Self::Break> {
        self.collect(&query.body);
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, Dialect};

    use super::*;

    fn q(sql: &str) -> Query {
        parse(sql, Dialect::Postgres).unwrap()
    }

    #[test]
    fn test_flat_subquery_depth() {
        let query = q("SELECT * FROM t WHERE x IN (SELECT y FROM u)");
        assert_eq!(query.select_count(), 2);
        assert_eq!(query.subquery_count(), 1);
        assert_eq!(query.top_level_subquery_count(), 1);
        assert_eq!(query.max_depth(), 2);
        assert!(!query.has_nested_subqueries());
    }

    #[test]
    fn test_nested_subquery_depth() {
        let query = q("SELECT * FROM t WHERE x IN (SELECT y FROM u WHERE y IN (SELECT z FROM v))");
        assert_eq!(query.select_count(), 3);
        assert_eq!(query.subquery_count(), 2);
        assert_eq!(query.top_level_subquery_count(), 1);
        assert_eq!(query.max_depth(), 3);
        assert!(query.has_nested_subqueries());
        assert_eq!(query.blocks()[2].parent(), Some(1));
    }

    #[test]
    fn test_sibling_subqueries_are_flat() {
        let query = q("SELECT * FROM t WHERE a IN (SELECT a FROM u) AND EXISTS (SELECT 1 FROM v)");
        assert_eq!(query.subquery_count(), 2);
        assert_eq!(query.top_level_subquery_count(), 2);
        assert_eq!(query.max_depth(), 2);
    }

    #[test]
    fn test_derived_table_and_cte_are_subqueries() {
        let query = q("WITH big AS (SELECT * FROM orders WHERE total > 100)
                       SELECT s.id FROM (SELECT id FROM big) s");
        assert_eq!(query.subquery_count(), 2);
        assert_eq!(query.tables().iter().collect::<Vec<_>>(), vec!["orders"]);
    }

    #[test]
    fn test_union_branches_are_main_level() {
        let query = q("SELECT name FROM a UNION SELECT name FROM b");
        assert_eq!(query.strip_subqueries().len(), 2);
        assert_eq!(query.subquery_count(), 0);
        assert_eq!(query.max_depth(), 1);
    }

    #[test]
    fn test_tables_and_joins() {
        let query = q("SELECT c.name, o.total FROM customer c
                       JOIN orders o ON o.customer_id = c.id
                       LEFT JOIN item i ON i.order_id = o.id, region");
        let block = query.main_block().unwrap();
        assert_eq!(
            block.joins(),
            &[JoinKind::Inner, JoinKind::Left, JoinKind::Implicit]
        );
        assert_eq!(block.tables().len(), 4);
        assert_eq!(block.resolve_table("O").unwrap().name, "orders");
        assert_eq!(query.tables().len(), 4);
    }

    #[test]
    fn test_output_column_alias_resolution() {
        let query = q("SELECT c.name AS customer, c.id, COUNT(*) AS n, city AS city FROM customer c");
        let cols = query.output_columns();
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0].name, "customer");
        assert_eq!(cols[0].real_name.as_deref(), Some("name"));
        assert_eq!(cols[0].table.as_deref(), Some("customer"));
        assert!(cols[0].is_aliased());
        assert!(!cols[1].is_aliased());
        assert!(cols[2].is_aliased());
        assert!(!cols[3].is_aliased());
    }

    #[test]
    fn test_wildcards() {
        let query = q("SELECT o.*, * FROM orders o");
        let cols = query.output_columns();
        assert!(cols.iter().all(|c| c.is_wildcard));
        assert_eq!(cols[0].table.as_deref(), Some("orders"));
    }

    #[test]
    fn test_aggregates_are_not_double_counted() {
        let query = q("SELECT dept, MAX(salary) FROM emp GROUP BY dept
                       HAVING COUNT(*) > (SELECT AVG(n) FROM (SELECT COUNT(*) AS n FROM emp GROUP BY dept) x)");
        let main = query.strip_subqueries();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].aggregate_calls(), vec!["max".to_string(), "count".to_string()]);
        assert!(main[0].has_group_by());
        assert_eq!(main[0].group_by().len(), 1);
    }

    #[test]
    fn test_order_by_attached_to_block() {
        let query = q("SELECT name FROM t ORDER BY name DESC, id");
        assert_eq!(query.main_block().unwrap().order_by().len(), 2);
    }

    #[test]
    fn test_set_operations() {
        let query = q("SELECT name FROM a UNION ALL SELECT name FROM b UNION SELECT name FROM a");
        let ops = query.set_operations();
        assert_eq!(ops.len(), 2);
        // Left-associative: ((a UNION ALL b) UNION a)
        assert!(!ops[0].all);
        assert_eq!(ops[0].left_tables.len(), 2);
        assert!(ops[1].all);
        assert_eq!(ops[1].kind, SetOperationKind::Union);
    }

    #[test]
    fn test_like_patterns() {
        let query = q("SELECT * FROM t WHERE name LIKE 'A_%' OR name ILIKE '%son' OR code NOT LIKE 'x%'");
        assert_eq!(
            query.like_patterns(),
            vec!["A_%".to_string(), "%son".to_string(), "x%".to_string()]
        );
    }

    #[test]
    fn test_null_checks() {
        let query = q("SELECT * FROM t WHERE a IS NULL OR b IS NOT NULL");
        assert_eq!(query.main_block().unwrap().null_checks(), 2);
    }

    #[test]
    fn test_distinct() {
        assert!(q("SELECT DISTINCT a FROM t").main_block().unwrap().is_distinct());
        assert!(!q("SELECT a FROM t").main_block().unwrap().is_distinct());
    }

    #[test]
    fn test_where_conditions_resolve_aliases() {
        let joined = q("SELECT * FROM customer c JOIN orders o ON o.customer_id = c.id \
                        WHERE c.id = 1 OR o.id = 2");
        let block = joined.main_block().unwrap();
        assert!(block.where_conditions().repeated_columns().is_empty());

        let same_table = q("SELECT * FROM customer c JOIN orders o ON o.customer_id = c.id \
                            WHERE c.city = 'a' OR customer.city = 'b'");
        let repeated = same_table.main_block().unwrap().where_conditions().repeated_columns();
        assert!(repeated.contains("customer.city"));

        let single = q("SELECT * FROM t WHERE t.b = 1 OR b = 2");
        assert!(single.main_block().unwrap().where_conditions().repeated_columns().contains("b"));
    }
}
