//! AST walking helpers built on the `sqlparser` visitor
//!
//! Every helper here is shallow: it stops at the boundary of a nested query,
//! so a select block never sees the expressions of its subqueries.

use sqlparser::ast::{Expr, ObjectName, Query, Visit, Visitor};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

struct ShallowExprs<F> {
    depth: usize,
    f: F,
}

impl<F: FnMut(&Expr)> Visitor for ShallowExprs<F> {
    type Break = ();

    fn pre_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            (self.f)(expr);
        }
        ControlFlow::Continue(())
    }
}

/// Call `f` for every expression reachable from `node` outside nested queries.
///
/// The subquery expression itself (`Expr::Subquery`, `Expr::InSubquery`,
/// `Expr::Exists`) is reported; its contents are not.
pub(crate) fn for_each_shallow_expr<V, F>(node: &V, f: F)
where
    V: Visit,
    F: FnMut(&Expr),
{
    let mut visitor = ShallowExprs { depth: 0, f };
    let _ = node.visit(&mut visitor);
}

struct SubqueryCollector {
    depth: usize,
    found: Vec<Query>,
}

impl Visitor for SubqueryCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            self.found.push(query.clone());
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }
}

/// Queries nested directly below `node`, in source order.
///
/// `node` must not itself be a `Query`, otherwise it is returned as its own
/// only child.
pub(crate) fn direct_subqueries<V: Visit>(node: &V) -> Vec<Query> {
    let mut collector = SubqueryCollector {
        depth: 0,
        found: Vec::new(),
    };
    let _ = node.visit(&mut collector);
    collector.found
}

/// Lowercased last part of a possibly schema-qualified name
pub(crate) fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.to_lowercase())
        .unwrap_or_default()
}

/// Lowercased name of the column an identifier expression refers to
pub(crate) fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.to_lowercase()),
        _ => None,
    }
}

/// Lowercased qualifier of a compound identifier (`o.id` -> `o`)
pub(crate) fn column_qualifier(expr: &Expr) -> Option<String> {
    match expr {
        Expr::CompoundIdentifier(parts) if parts.len() >= 2 => {
            parts.get(parts.len() - 2).map(|p| p.value.to_lowercase())
        }
        _ => None,
    }
}

/// Distinct `(qualifier, column)` references in `node` outside nested queries
pub(crate) fn shallow_column_refs<V: Visit>(node: &V) -> BTreeSet<(Option<String>, String)> {
    let mut columns = BTreeSet::new();
    for_each_shallow_expr(node, |expr| {
        if let Some(name) = column_name(expr) {
            columns.insert((column_qualifier(expr), name));
        }
    });
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::{SetExpr, Statement};
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    fn first_select(sql: &str) -> sqlparser::ast::Select {
        let stmt = Parser::parse_sql(&GenericDialect {}, sql)
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        match stmt {
            Statement::Query(q) => match *q.body {
                SetExpr::Select(s) => *s,
                other => panic!("unexpected body: {other}"),
            },
            other => panic!("unexpected statement: {other}"),
        }
    }

    #[test]
    fn test_shallow_column_refs_skip_subqueries() {
        let select = first_select("SELECT a FROM t WHERE b = 1 AND c IN (SELECT d FROM u WHERE e = 2)");
        let columns: Vec<String> = shallow_column_refs(&select)
            .into_iter()
            .map(|(_, column)| column)
            .collect();
        assert_eq!(columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_direct_subqueries_only_one_level() {
        let select = first_select(
            "SELECT a FROM t WHERE a IN (SELECT b FROM u WHERE b IN (SELECT c FROM v))",
        );
        let subs = direct_subqueries(&select);
        assert_eq!(subs.len(), 1);
        assert_eq!(direct_subqueries(&*subs[0].body).len(), 1);
    }

    #[test]
    fn test_object_name_keeps_last_part_lowercased() {
        use sqlparser::ast::Ident;
        let name = ObjectName(vec![Ident::new("Shop"), Ident::new("Orders")]);
        assert_eq!(object_name(&name), "orders");
        assert_eq!(object_name(&ObjectName(Vec::new())), "");
    }

    #[test]
    fn test_column_qualifier() {
        let select = first_select("SELECT o.id FROM orders o");
        let mut qualifiers = Vec::new();
        for_each_shallow_expr(&select.projection, |e| {
            if let Some(q) = column_qualifier(e) {
                qualifiers.push(q);
            }
        });
        assert_eq!(qualifiers, vec!["o".to_string()]);
    }
}
