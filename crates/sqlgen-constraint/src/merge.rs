//! Merging of overlapping schema constraints

use crate::schema::SchemaConstraint;
use crate::types::Constraint;
use sqlgen_core::{Result, SqlGenError};

/// The larger of two lower bounds
pub fn merge_min(a: usize, b: usize) -> usize {
    a.max(b)
}

/// The smaller of two upper bounds; a missing bound is unbounded
pub fn merge_max(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

impl SchemaConstraint {
    /// Combine two instances of the same variant into the most restrictive one
    pub fn merge(&self, other: &SchemaConstraint) -> Result<SchemaConstraint> {
        use SchemaConstraint::*;

        let merged = match (self, other) {
            (Tables { min: a, max: x }, Tables { min: b, max: y }) => Tables {
                min: merge_min(*a, *b),
                max: merge_max(*x, *y),
            },
            (ColumnsPerTable { min: a, max: x }, ColumnsPerTable { min: b, max: y }) => {
                ColumnsPerTable {
                    min: merge_min(*a, *b),
                    max: merge_max(*x, *y),
                }
            }
            (ForeignKeys { min: a, max: x }, ForeignKeys { min: b, max: y }) => ForeignKeys {
                min: merge_min(*a, *b),
                max: merge_max(*x, *y),
            },
            (RowsPerTable { min: a }, RowsPerTable { min: b }) => RowsPerTable {
                min: merge_min(*a, *b),
            },
            (UniqueKeys { min: a }, UniqueKeys { min: b }) => UniqueKeys {
                min: merge_min(*a, *b),
            },
            (CompositeKeys { min: a }, CompositeKeys { min: b }) => CompositeKeys {
                min: merge_min(*a, *b),
            },
            (SharedColumnNames { min: a }, SharedColumnNames { min: b }) => SharedColumnNames {
                min: merge_min(*a, *b),
            },
            (NullableColumns { min: a }, NullableColumns { min: b }) => NullableColumns {
                min: merge_min(*a, *b),
            },
            _ => {
                return Err(SqlGenError::ConstraintMerge {
                    left: self.name().to_string(),
                    right: other.name().to_string(),
                })
            }
        };

        if let Some(max) = merged.max() {
            if merged.min() > max {
                tracing::warn!(
                    constraint = merged.name(),
                    min = merged.min(),
                    max,
                    "merged constraint is unsatisfiable"
                );
            }
        }
        Ok(merged)
    }
}

/// Merge a list of schema constraints variant by variant
///
/// The output keeps one instance per variant, in first-seen order.
pub fn merge_schema_constraints<'a, I>(constraints: I) -> Result<Vec<SchemaConstraint>>
where
    I: IntoIterator<Item = &'a SchemaConstraint>,
{
    let mut merged: Vec<SchemaConstraint> = Vec::new();
    for constraint in constraints {
        match merged.iter_mut().find(|c| c.name() == constraint.name()) {
            Some(existing) => *existing = existing.merge(constraint)?,
            None => merged.push(constraint.clone()),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tables_min_takes_the_larger() {
        let merged = SchemaConstraint::Tables { min: 4, max: None }
            .merge(&SchemaConstraint::Tables { min: 6, max: None })
            .unwrap();
        assert_eq!(merged, SchemaConstraint::Tables { min: 6, max: None });
    }

    #[test]
    fn test_max_keeps_whichever_is_set() {
        let merged = SchemaConstraint::ForeignKeys { min: 1, max: None }
            .merge(&SchemaConstraint::ForeignKeys { min: 0, max: Some(3) })
            .unwrap();
        assert_eq!(merged, SchemaConstraint::ForeignKeys { min: 1, max: Some(3) });
    }

    #[test]
    fn test_different_variants_do_not_merge() {
        let err = SchemaConstraint::Tables { min: 1, max: None }
            .merge(&SchemaConstraint::UniqueKeys { min: 1 })
            .unwrap_err();
        match err {
            SqlGenError::ConstraintMerge { left, right } => {
                assert_eq!(left, "tables");
                assert_eq!(right, "unique_keys");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsatisfiable_merge_is_kept() {
        let merged = SchemaConstraint::Tables { min: 5, max: None }
            .merge(&SchemaConstraint::Tables { min: 0, max: Some(3) })
            .unwrap();
        assert_eq!(merged, SchemaConstraint::Tables { min: 5, max: Some(3) });
    }

    #[test]
    fn test_merge_list_keeps_first_seen_order() {
        let list = vec![
            SchemaConstraint::RowsPerTable { min: 3 },
            SchemaConstraint::Tables { min: 4, max: None },
            SchemaConstraint::RowsPerTable { min: 5 },
            SchemaConstraint::Tables { min: 6, max: Some(8) },
        ];
        let merged = merge_schema_constraints(&list).unwrap();
        assert_eq!(
            merged,
            vec![
                SchemaConstraint::RowsPerTable { min: 5 },
                SchemaConstraint::Tables { min: 6, max: Some(8) },
            ]
        );
    }

    fn arb_bounds() -> impl Strategy<Value = (usize, Option<usize>)> {
        (0usize..20, proptest::option::of(0usize..20))
    }

    proptest! {
        #[test]
        fn merge_is_commutative((a, x) in arb_bounds(), (b, y) in arb_bounds()) {
            let left = SchemaConstraint::Tables { min: a, max: x };
            let right = SchemaConstraint::Tables { min: b, max: y };
            prop_assert_eq!(left.merge(&right).unwrap(), right.merge(&left).unwrap());
        }

        #[test]
        fn merge_is_at_least_as_restrictive((a, x) in arb_bounds(), (b, y) in arb_bounds()) {
            let merged = SchemaConstraint::ColumnsPerTable { min: a, max: x }
                .merge(&SchemaConstraint::ColumnsPerTable { min: b, max: y })
                .unwrap();
            prop_assert!(merged.min() >= a && merged.min() >= b);
            if let Some(m) = merged.max() {
                prop_assert!(x.map_or(true, |x| m <= x));
                prop_assert!(y.map_or(true, |y| m <= y));
            } else {
                prop_assert!(x.is_none() && y.is_none());
            }
        }

        #[test]
        fn merge_is_idempotent(a in 0usize..20) {
            let c = SchemaConstraint::SharedColumnNames { min: a };
            prop_assert_eq!(c.merge(&c).unwrap(), c);
        }
    }
}
