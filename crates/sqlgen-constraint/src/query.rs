//! Constraints over a generated solution query

use crate::types::{bound_phrase, within, Constraint, DuplicateMode, Nesting, Presence};
use serde::{Deserialize, Serialize};
use sqlgen_core::{ConstraintViolation, Language};
use sqlgen_query::ast::{SetExpr, SetQuantifier, Statement};
use sqlgen_query::{
    Catalog, ConditionTree, JoinKind, Query, SelectBlock, SetOperationKind,
};
use std::collections::{BTreeMap, BTreeSet};

/// A structural requirement on a solution query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryConstraint {
    /// Distinct tables referenced anywhere
    Tables {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Joins in the main query, optionally restricted to some kinds
    Joins {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        kinds: Vec<JoinKind>,
    },
    /// Logical conditions in the main WHERE clause
    Conditions {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Columns compared more than once inside one AND operand of a WHERE
    RepeatedColumnConditions {
        #[serde(default)]
        min: usize,
    },
    /// Aggregate function calls in the main query
    Aggregations {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        functions: Vec<String>,
    },
    GroupBy {
        state: Presence,
        #[serde(default)]
        min_columns: usize,
    },
    Having {
        state: Presence,
        #[serde(default)]
        min_conditions: usize,
    },
    OrderBy {
        state: Presence,
        #[serde(default)]
        min_columns: usize,
    },
    Distinct {
        state: Presence,
    },
    /// Subquery count and nesting shape
    Subqueries {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        nesting: Nesting,
    },
    /// Duplicate rows in the result set
    Duplicates {
        mode: DuplicateMode,
    },
    /// Output columns renamed with an alias
    ColumnAliases {
        #[serde(default)]
        min: usize,
    },
    /// Output columns of the main query, wildcards expanded
    SelectedColumns {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// LIKE patterns and their length without `%`
    WildcardLength {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Characters some LIKE pattern must contain, with multiplicity
    WildcardCharacters {
        required: String,
    },
    /// UNION ALL between different tables, plain UNION on the same tables
    UnionBalance,
    SetOperations {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        kinds: Vec<SetOperationKind>,
    },
    /// Whether the main query projects only foreign key columns
    ForeignKeyProjection {
        state: Presence,
    },
    /// IS NULL / IS NOT NULL predicates
    NullChecks {
        state: Presence,
    },
}

impl Constraint for QueryConstraint {
    fn name(&self) -> &'static str {
        match self {
            QueryConstraint::Tables { .. } => "tables",
            QueryConstraint::Joins { .. } => "joins",
            QueryConstraint::Conditions { .. } => "conditions",
            QueryConstraint::RepeatedColumnConditions { .. } => "repeated_column_conditions",
            QueryConstraint::Aggregations { .. } => "aggregations",
            QueryConstraint::GroupBy { .. } => "group_by",
            QueryConstraint::Having { .. } => "having",
            QueryConstraint::OrderBy { .. } => "order_by",
            QueryConstraint::Distinct { .. } => "distinct",
            QueryConstraint::Subqueries { .. } => "subqueries",
            QueryConstraint::Duplicates { .. } => "duplicates",
            QueryConstraint::ColumnAliases { .. } => "column_aliases",
            QueryConstraint::SelectedColumns { .. } => "selected_columns",
            QueryConstraint::WildcardLength { .. } => "wildcard_length",
            QueryConstraint::WildcardCharacters { .. } => "wildcard_characters",
            QueryConstraint::UnionBalance => "union_balance",
            QueryConstraint::SetOperations { .. } => "set_operations",
            QueryConstraint::ForeignKeyProjection { .. } => "foreign_key_projection",
            QueryConstraint::NullChecks { .. } => "null_checks",
        }
    }

    fn description(&self, language: Language) -> String {
        let l = language;
        match self {
            QueryConstraint::Tables { min, max } => format!(
                "{} {} {}",
                l.pick("The query must reference", "La query deve usare"),
                bound_phrase(l, *min, *max),
                l.pick("distinct tables", "tabelle distinte"),
            ),
            QueryConstraint::Joins { min, max, kinds } => {
                let mut text = format!(
                    "{} {} {}",
                    l.pick("The main query must contain", "La query principale deve contenere"),
                    bound_phrase(l, *min, *max),
                    l.pick("joins", "join"),
                );
                if !kinds.is_empty() {
                    let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                    text.push_str(&format!(
                        " {} {}",
                        l.pick("using only", "usando solo"),
                        names.join(", ")
                    ));
                }
                text
            }
            QueryConstraint::Conditions { min, max } => format!(
                "{} {} {}",
                l.pick(
                    "The WHERE clause of the main query must contain",
                    "La clausola WHERE della query principale deve contenere"
                ),
                bound_phrase(l, *min, *max),
                l.pick(
                    "conditions combined with AND/OR",
                    "condizioni combinate con AND/OR"
                ),
            ),
            QueryConstraint::RepeatedColumnConditions { min } => format!(
                "{} {} {}",
                l.pick("In the WHERE clause,", "Nella clausola WHERE,"),
                bound_phrase(l, *min, None),
                l.pick(
                    "columns must be compared more than once within the same group of OR-ed conditions (e.g. city = 'A' OR city = 'B')",
                    "colonne devono essere confrontate più volte nello stesso gruppo di condizioni in OR (es. city = 'A' OR city = 'B')"
                ),
            ),
            QueryConstraint::Aggregations { min, max, functions } => {
                let mut text = format!(
                    "{} {} {}",
                    l.pick("The main query must use", "La query principale deve usare"),
                    bound_phrase(l, *min, *max),
                    l.pick("aggregate functions", "funzioni di aggregazione"),
                );
                if !functions.is_empty() {
                    let names: Vec<String> = functions.iter().map(|f| f.to_uppercase()).collect();
                    text.push_str(&format!(" ({})", names.join(", ")));
                }
                text
            }
            QueryConstraint::GroupBy { state, min_columns } => clause_text(
                l,
                *state,
                "GROUP BY",
                *min_columns,
                l.pick("grouping columns", "colonne di raggruppamento"),
            ),
            QueryConstraint::Having { state, min_conditions } => clause_text(
                l,
                *state,
                "HAVING",
                *min_conditions,
                l.pick("conditions", "condizioni"),
            ),
            QueryConstraint::OrderBy { state, min_columns } => clause_text(
                l,
                *state,
                "ORDER BY",
                *min_columns,
                l.pick("sort columns", "colonne di ordinamento"),
            ),
            QueryConstraint::Distinct { state } => format!(
                "{} {} {}",
                l.pick("The main query", "La query principale"),
                state.word(l),
                l.pick("use DISTINCT", "usare DISTINCT"),
            ),
            QueryConstraint::Subqueries { min, max, nesting } => {
                let mut text = format!(
                    "{} {} {}",
                    l.pick("The query must contain", "La query deve contenere"),
                    bound_phrase(l, *min, *max),
                    l.pick("subqueries", "sottoquery"),
                );
                match nesting {
                    Nesting::Any => {}
                    Nesting::Flat => text.push_str(l.pick(
                        ", none of them nested inside another subquery",
                        ", nessuna annidata dentro un'altra sottoquery",
                    )),
                    Nesting::Nested => text.push_str(l.pick(
                        ", with at least one subquery nested inside another",
                        ", con almeno una sottoquery annidata dentro un'altra",
                    )),
                }
                text
            }
            QueryConstraint::Duplicates { mode } => match mode {
                DuplicateMode::Allowed => l
                    .pick(
                        "The result may contain duplicate rows: do not select a full key and do not use DISTINCT or GROUP BY",
                        "Il risultato può contenere righe duplicate: non selezionare una chiave completa e non usare DISTINCT o GROUP BY",
                    )
                    .to_string(),
                DuplicateMode::Unique => l
                    .pick(
                        "The result must not contain duplicate rows",
                        "Il risultato non deve contenere righe duplicate",
                    )
                    .to_string(),
                DuplicateMode::DistinctRequired => l
                    .pick(
                        "The query must need DISTINCT: without it the result would contain duplicate rows",
                        "La query deve richiedere DISTINCT: senza di esso il risultato conterrebbe righe duplicate",
                    )
                    .to_string(),
            },
            QueryConstraint::ColumnAliases { min } => format!(
                "{} {} {}",
                l.pick("Rename", "Rinomina"),
                bound_phrase(l, *min, None),
                l.pick(
                    "selected columns with an alias (AS)",
                    "colonne selezionate con un alias (AS)"
                ),
            ),
            QueryConstraint::SelectedColumns { min, max } => format!(
                "{} {} {}",
                l.pick("The main query must select", "La query principale deve selezionare"),
                bound_phrase(l, *min, *max),
                l.pick("columns", "colonne"),
            ),
            QueryConstraint::WildcardLength { min, max } => format!(
                "{} {} {}",
                l.pick(
                    "Use LIKE patterns, each with",
                    "Usa pattern LIKE, ognuno con"
                ),
                bound_phrase(l, *min, *max),
                l.pick(
                    "characters besides '%'",
                    "caratteri oltre a '%'"
                ),
            ),
            QueryConstraint::WildcardCharacters { required } => format!(
                "{} '{}'",
                l.pick(
                    "A LIKE pattern must contain the characters",
                    "Un pattern LIKE deve contenere i caratteri"
                ),
                required
            ),
            QueryConstraint::UnionBalance => l
                .pick(
                    "Use UNION ALL to combine results from different tables and plain UNION for results from the same tables",
                    "Usa UNION ALL per combinare risultati di tabelle diverse e UNION per risultati delle stesse tabelle",
                )
                .to_string(),
            QueryConstraint::SetOperations { min, kinds } => {
                let what = if kinds.is_empty() {
                    "UNION/INTERSECT/EXCEPT".to_string()
                } else {
                    kinds
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join("/")
                };
                format!(
                    "{} {} {} {}",
                    l.pick("The query must use", "La query deve usare"),
                    bound_phrase(l, *min, None),
                    l.pick("set operations of type", "operazioni insiemistiche di tipo"),
                    what
                )
            }
            QueryConstraint::ForeignKeyProjection { state } => match state {
                Presence::Present => l
                    .pick(
                        "The main query must select only foreign key columns",
                        "La query principale deve selezionare solo colonne chiave esterna",
                    )
                    .to_string(),
                Presence::Absent => l
                    .pick(
                        "The main query must select at least one column that is not a foreign key",
                        "La query principale deve selezionare almeno una colonna che non sia chiave esterna",
                    )
                    .to_string(),
            },
            QueryConstraint::NullChecks { state } => format!(
                "{} {} {}",
                l.pick("The query", "La query"),
                state.word(l),
                l.pick(
                    "test for NULL with IS NULL or IS NOT NULL",
                    "verificare NULL con IS NULL o IS NOT NULL"
                ),
            ),
        }
    }
}

fn clause_text(l: Language, state: Presence, clause: &str, min: usize, unit: &str) -> String {
    let mut text = format!(
        "{} {} {} {}",
        l.pick("The main query", "La query principale"),
        state.word(l),
        l.pick("use", "usare"),
        clause
    );
    if state == Presence::Present && min > 0 {
        text.push_str(&format!(
            " {} {} {}",
            l.pick("with", "con"),
            bound_phrase(l, min, None),
            unit
        ));
    }
    text
}

impl QueryConstraint {
    /// Check the constraint against a solution query
    ///
    /// The catalog supplies key and column information for wildcard
    /// expansion and duplicate-row inference.
    pub fn validate(
        &self,
        query: &Query,
        catalog: &Catalog,
        language: Language,
    ) -> Result<(), ConstraintViolation> {
        let outcome = match self {
            QueryConstraint::Tables { min, max } => check_tables(query, *min, *max),
            QueryConstraint::Joins { min, max, kinds } => check_joins(query, *min, *max, kinds),
            QueryConstraint::Conditions { min, max } => check_conditions(query, *min, *max),
            QueryConstraint::RepeatedColumnConditions { min } => {
                check_repeated_column_conditions(query, *min)
            }
            QueryConstraint::Aggregations {
                min,
                max,
                functions,
            } => check_aggregations(query, *min, *max, functions),
            QueryConstraint::GroupBy { state, min_columns } => {
                check_group_by(query, *state, *min_columns)
            }
            QueryConstraint::Having {
                state,
                min_conditions,
            } => check_having(query, *state, *min_conditions),
            QueryConstraint::OrderBy { state, min_columns } => {
                check_order_by(query, *state, *min_columns)
            }
            QueryConstraint::Distinct { state } => check_distinct(query, *state),
            QueryConstraint::Subqueries { min, max, nesting } => {
                check_subqueries(query, *min, *max, *nesting)
            }
            QueryConstraint::Duplicates { mode } => check_duplicates(query, catalog, *mode),
            QueryConstraint::ColumnAliases { min } => check_column_aliases(query, *min),
            QueryConstraint::SelectedColumns { min, max } => {
                check_selected_columns(query, catalog, *min, *max)
            }
            QueryConstraint::WildcardLength { min, max } => {
                check_wildcard_length(query, *min, *max)
            }
            QueryConstraint::WildcardCharacters { required } => {
                check_wildcard_characters(query, required)
            }
            QueryConstraint::UnionBalance => check_union_balance(query),
            QueryConstraint::SetOperations { min, kinds } => {
                check_set_operations(query, *min, kinds)
            }
            QueryConstraint::ForeignKeyProjection { state } => {
                check_foreign_key_projection(query, catalog, *state)
            }
            QueryConstraint::NullChecks { state } => check_null_checks(query, *state),
        };

        outcome.map_err(|observed| {
            ConstraintViolation::new(self.name(), self.description(language), observed)
        })
    }
}

type Check = Result<(), String>;

fn count_in_range(count: usize, min: usize, max: Option<usize>, what: &str) -> Check {
    if within(count, min, max) {
        Ok(())
    } else {
        Err(format!("{count} {what}"))
    }
}

pub fn check_tables(query: &Query, min: usize, max: Option<usize>) -> Check {
    let tables = query.tables();
    if within(tables.len(), min, max) {
        Ok(())
    } else {
        let names: Vec<&str> = tables.iter().map(String::as_str).collect();
        Err(format!("{} tables ({})", tables.len(), names.join(", ")))
    }
}

pub fn check_joins(query: &Query, min: usize, max: Option<usize>, kinds: &[JoinKind]) -> Check {
    let joins: Vec<JoinKind> = query
        .strip_subqueries()
        .iter()
        .flat_map(|b| b.joins().iter().copied())
        .collect();

    if !kinds.is_empty() {
        let disallowed: Vec<String> = joins
            .iter()
            .filter(|k| !kinds.contains(k))
            .map(|k| k.to_string())
            .collect();
        if !disallowed.is_empty() {
            return Err(format!("disallowed joins: {}", disallowed.join(", ")));
        }
    }
    count_in_range(joins.len(), min, max, "joins")
}

pub fn check_conditions(query: &Query, min: usize, max: Option<usize>) -> Check {
    let count = query
        .strip_subqueries()
        .iter()
        .map(|b| ConditionTree::from_optional(b.where_clause()).total_conditions())
        .sum();
    count_in_range(count, min, max, "conditions")
}

pub fn check_repeated_column_conditions(query: &Query, min: usize) -> Check {
    let repeated: BTreeSet<String> = query
        .blocks()
        .iter()
        .flat_map(|b| b.where_conditions().repeated_columns())
        .collect();
    if repeated.len() >= min {
        Ok(())
    } else if repeated.is_empty() {
        Err("no column is compared more than once within the same condition group".to_string())
    } else {
        let names: Vec<&str> = repeated.iter().map(String::as_str).collect();
        Err(format!(
            "only {} repeated: {}",
            repeated.len(),
            names.join(", ")
        ))
    }
}

pub fn check_aggregations(
    query: &Query,
    min: usize,
    max: Option<usize>,
    functions: &[String],
) -> Check {
    let allowed: Vec<String> = functions.iter().map(|f| f.to_lowercase()).collect();
    let calls: Vec<String> = query
        .strip_subqueries()
        .iter()
        .flat_map(|b| b.aggregate_calls())
        .filter(|name| allowed.is_empty() || allowed.contains(name))
        .collect();
    if within(calls.len(), min, max) {
        Ok(())
    } else if calls.is_empty() {
        Err("no aggregate function".to_string())
    } else {
        Err(format!("{} aggregates ({})", calls.len(), calls.join(", ")))
    }
}

/// Presence check shared by the clause constraints
///
/// `sizes` holds the clause size of every main block that has the clause.
fn check_clause(clause: &str, state: Presence, sizes: &[usize], min: usize, unit: &str) -> Check {
    let present = !sizes.is_empty();
    if !state.holds(present) {
        return Err(if present {
            format!("{clause} is used")
        } else {
            format!("no {clause}")
        });
    }
    if state == Presence::Present {
        let largest = sizes.iter().copied().max().unwrap_or(0);
        if largest < min {
            return Err(format!("{clause} with {largest} {unit}"));
        }
    }
    Ok(())
}

pub fn check_group_by(query: &Query, state: Presence, min_columns: usize) -> Check {
    let sizes: Vec<usize> = query
        .strip_subqueries()
        .iter()
        .filter(|b| b.has_group_by())
        .map(|b| b.group_by().len())
        .collect();
    check_clause("GROUP BY", state, &sizes, min_columns, "columns")
}

pub fn check_having(query: &Query, state: Presence, min_conditions: usize) -> Check {
    let sizes: Vec<usize> = query
        .strip_subqueries()
        .iter()
        .filter(|b| b.having().is_some())
        .map(|b| ConditionTree::from_optional(b.having()).total_conditions())
        .collect();
    check_clause("HAVING", state, &sizes, min_conditions, "conditions")
}

pub fn check_order_by(query: &Query, state: Presence, min_columns: usize) -> Check {
    let sizes: Vec<usize> = query
        .strip_subqueries()
        .iter()
        .filter(|b| !b.order_by().is_empty())
        .map(|b| b.order_by().len())
        .collect();
    check_clause("ORDER BY", state, &sizes, min_columns, "columns")
}

pub fn check_distinct(query: &Query, state: Presence) -> Check {
    let present = query.strip_subqueries().iter().any(|b| b.is_distinct());
    if state.holds(present) {
        Ok(())
    } else if present {
        Err("DISTINCT is used".to_string())
    } else {
        Err("no DISTINCT".to_string())
    }
}

pub fn check_subqueries(query: &Query, min: usize, max: Option<usize>, nesting: Nesting) -> Check {
    let total = query.subquery_count();
    count_in_range(total, min, max, "subqueries")?;
    match nesting {
        Nesting::Any => Ok(()),
        Nesting::Flat if query.has_nested_subqueries() => Err(format!(
            "{} of {} subqueries are nested (max depth {})",
            total - query.top_level_subquery_count(),
            total,
            query.max_depth()
        )),
        Nesting::Nested if query.max_depth() < 3 => Err(format!(
            "no nested subquery (max depth {})",
            query.max_depth()
        )),
        _ => Ok(()),
    }
}

/// A projected column resolved to its table
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedColumn {
    table: Option<String>,
    column: Option<String>,
}

/// Resolve the output columns of a block, expanding wildcards through the catalog
fn resolve_output(block: &SelectBlock, catalog: &Catalog) -> Vec<ResolvedColumn> {
    let mut resolved = Vec::new();
    let expand = |table: &str, out: &mut Vec<ResolvedColumn>| match catalog.table(table) {
        Some(t) => out.extend(t.column_names().map(|c| ResolvedColumn {
            table: Some(t.name.clone()),
            column: Some(c.to_string()),
        })),
        None => out.push(ResolvedColumn {
            table: Some(table.to_string()),
            column: None,
        }),
    };

    for output in block.output_columns() {
        if output.is_wildcard {
            match &output.table {
                Some(table) => expand(table, &mut resolved),
                None => {
                    for table in block.tables() {
                        expand(&table.name, &mut resolved);
                    }
                }
            }
            continue;
        }

        let table = output.table.clone().or_else(|| {
            let column = output.real_name.as_deref()?;
            let owners: Vec<&str> = block
                .tables()
                .iter()
                .filter(|t| catalog.table(&t.name).is_some_and(|tab| tab.has_column(column)))
                .map(|t| t.name.as_str())
                .collect();
            match owners.as_slice() {
                [only] => Some(only.to_string()),
                _ => None,
            }
        });
        resolved.push(ResolvedColumn {
            table,
            column: output.real_name.clone(),
        });
    }
    resolved
}

/// Whether the rows produced by a block are guaranteed to be distinct
///
/// True when the block groups, uses DISTINCT (if `honor_distinct`),
/// computes a single aggregate row, or selects every column of a declared
/// primary or unique key of one of its FROM tables.
pub fn guarantees_unique(block: &SelectBlock, catalog: &Catalog, honor_distinct: bool) -> bool {
    if honor_distinct && block.is_distinct() {
        return true;
    }
    if block.has_group_by() {
        return true;
    }
    let only_aggregates = block
        .output_columns()
        .iter()
        .all(|c| c.real_name.is_none() && !c.is_wildcard);
    if only_aggregates && !block.aggregate_calls().is_empty() {
        return true;
    }

    let resolved = resolve_output(block, catalog);
    block.tables().iter().any(|from| {
        let Some(table) = catalog.table(&from.name) else {
            return false;
        };
        let selected: BTreeSet<&str> = resolved
            .iter()
            .filter(|r| r.table.as_deref() == Some(table.name.as_str()))
            .filter_map(|r| r.column.as_deref())
            .collect();
        table
            .candidate_keys()
            .iter()
            .any(|key| !key.is_empty() && key.iter().all(|k| selected.contains(k.as_str())))
    })
}

/// A top-level set operation without ALL removes duplicates by itself
fn deduplicating_set_operation(query: &Query) -> bool {
    let Statement::Query(q) = query.statement() else {
        return false;
    };
    matches!(
        q.body.as_ref(),
        SetExpr::SetOperation { set_quantifier, .. }
            if !matches!(set_quantifier, SetQuantifier::All | SetQuantifier::AllByName)
    )
}

pub fn check_duplicates(query: &Query, catalog: &Catalog, mode: DuplicateMode) -> Check {
    let main = query.strip_subqueries();
    let unique = deduplicating_set_operation(query)
        || (!main.is_empty() && main.iter().all(|b| guarantees_unique(b, catalog, true)));

    match mode {
        DuplicateMode::Allowed if unique => {
            Err("rows are guaranteed unique (key selected, DISTINCT or GROUP BY)".to_string())
        }
        DuplicateMode::Unique if !unique => {
            Err("no selected key, DISTINCT or GROUP BY prevents duplicate rows".to_string())
        }
        DuplicateMode::DistinctRequired => {
            let distinct: Vec<&&SelectBlock> = main.iter().filter(|b| b.is_distinct()).collect();
            if distinct.is_empty() {
                Err("no DISTINCT".to_string())
            } else if distinct
                .iter()
                .all(|b| guarantees_unique(b, catalog, false))
            {
                Err("DISTINCT is redundant: rows are already unique".to_string())
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

pub fn check_column_aliases(query: &Query, min: usize) -> Check {
    let aliased: Vec<&str> = query
        .output_columns()
        .iter()
        .filter(|c| c.is_aliased())
        .map(|c| c.name.as_str())
        .collect();
    if aliased.len() >= min {
        Ok(())
    } else {
        Err(format!("{} aliased columns", aliased.len()))
    }
}

pub fn check_selected_columns(
    query: &Query,
    catalog: &Catalog,
    min: usize,
    max: Option<usize>,
) -> Check {
    let count = query
        .main_block()
        .map(|b| resolve_output(b, catalog).len())
        .unwrap_or(0);
    count_in_range(count, min, max, "selected columns")
}

/// Length of a LIKE pattern without `%` and escape characters
pub fn pattern_length(pattern: &str) -> usize {
    pattern.chars().filter(|c| *c != '%' && *c != '\\').count()
}

pub fn check_wildcard_length(query: &Query, min: usize, max: Option<usize>) -> Check {
    let patterns = query.like_patterns();
    if patterns.is_empty() {
        return Err("no LIKE pattern".to_string());
    }
    let offending: Vec<String> = patterns
        .iter()
        .filter(|p| !within(pattern_length(p), min, max))
        .map(|p| format!("'{}' has length {}", p, pattern_length(p)))
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(offending.join(", "))
    }
}

fn char_counts(text: &str) -> BTreeMap<char, usize> {
    let mut counts = BTreeMap::new();
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

pub fn check_wildcard_characters(query: &Query, required: &str) -> Check {
    let needed = char_counts(required);
    let patterns = query.like_patterns();
    let satisfied = patterns.iter().any(|p| {
        let have = char_counts(p);
        needed
            .iter()
            .all(|(c, n)| have.get(c).copied().unwrap_or(0) >= *n)
    });
    if satisfied {
        Ok(())
    } else if patterns.is_empty() {
        Err("no LIKE pattern".to_string())
    } else {
        let quoted: Vec<String> = patterns.iter().map(|p| format!("'{p}'")).collect();
        Err(format!("patterns {}", quoted.join(", ")))
    }
}

pub fn check_union_balance(query: &Query) -> Check {
    let offending: Vec<String> = query
        .set_operations()
        .into_iter()
        .filter(|op| op.kind == SetOperationKind::Union)
        .filter(|op| op.all == (op.left_tables == op.right_tables))
        .map(|op| op.to_string())
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(offending.join("; "))
    }
}

pub fn check_set_operations(query: &Query, min: usize, kinds: &[SetOperationKind]) -> Check {
    let count = query
        .set_operations()
        .iter()
        .filter(|op| kinds.is_empty() || kinds.contains(&op.kind))
        .count();
    count_in_range(count, min, None, "set operations")
}

pub fn check_foreign_key_projection(query: &Query, catalog: &Catalog, state: Presence) -> Check {
    let Some(block) = query.main_block() else {
        return Err("no main query".to_string());
    };
    let mut foreign = Vec::new();
    let mut other = Vec::new();
    for column in resolve_output(block, catalog) {
        let is_fk = match (&column.table, &column.column) {
            (Some(t), Some(c)) => catalog
                .table(t)
                .and_then(|t| t.column(c))
                .is_some_and(|c| c.is_foreign_key),
            _ => false,
        };
        let label = match (&column.table, &column.column) {
            (Some(t), Some(c)) => format!("{t}.{c}"),
            (None, Some(c)) => c.clone(),
            _ => "expression".to_string(),
        };
        if is_fk {
            foreign.push(label);
        } else {
            other.push(label);
        }
    }

    match state {
        Presence::Present if foreign.is_empty() => Err("no foreign key column selected".to_string()),
        Presence::Present if !other.is_empty() => {
            Err(format!("non foreign key columns selected: {}", other.join(", ")))
        }
        Presence::Absent if other.is_empty() => Err(format!(
            "only foreign key columns selected: {}",
            foreign.join(", ")
        )),
        _ => Ok(()),
    }
}

pub fn check_null_checks(query: &Query, state: Presence) -> Check {
    let count: usize = query.blocks().iter().map(|b| b.null_checks()).sum();
    if state.holds(count > 0) {
        Ok(())
    } else if count > 0 {
        Err(format!("{count} NULL checks"))
    } else {
        Err("no IS NULL / IS NOT NULL check".to_string())
    }
}
