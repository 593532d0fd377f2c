//! Constraint sets assembled from misconception profiles

use crate::merge::merge_schema_constraints;
use crate::query::QueryConstraint;
use crate::registry::MisconceptionProfile;
use crate::report::ValidationReport;
use crate::schema::SchemaConstraint;
use crate::types::Constraint;
use sqlgen_core::{Language, Result};
use sqlgen_query::{Catalog, Query};
use std::collections::BTreeMap;

/// The active constraints of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    pub schema: Vec<SchemaConstraint>,
    pub query: Vec<QueryConstraint>,
}

impl ConstraintSet {
    pub fn new(schema: Vec<SchemaConstraint>, query: Vec<QueryConstraint>) -> Self {
        Self { schema, query }
    }

    /// Merge the schema constraints of every profile and concatenate their
    /// query constraints
    pub fn from_profiles<'a, I>(profiles: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a MisconceptionProfile>,
    {
        let profiles: Vec<&MisconceptionProfile> = profiles.into_iter().collect();
        let schema = merge_schema_constraints(profiles.iter().flat_map(|p| p.schema.iter()))?;
        let query = profiles
            .iter()
            .flat_map(|p| p.query.iter().cloned())
            .collect();
        Ok(Self { schema, query })
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty() && self.query.is_empty()
    }

    /// Prompt lines for the schema constraints
    pub fn schema_descriptions(&self, language: Language) -> Vec<String> {
        self.schema.iter().map(|c| c.description(language)).collect()
    }

    /// Prompt lines for the query constraints
    pub fn query_descriptions(&self, language: Language) -> Vec<String> {
        self.query.iter().map(|c| c.description(language)).collect()
    }

    /// Run every schema constraint, collecting all violations
    pub fn validate_schema(
        &self,
        catalog: &Catalog,
        inserted_rows: &BTreeMap<String, usize>,
        language: Language,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();
        for constraint in &self.schema {
            report.record(constraint.validate(catalog, inserted_rows, language));
        }
        report
    }

    /// Run every query constraint, collecting all violations
    pub fn validate_query(&self, query: &Query, catalog: &Catalog, language: Language) -> ValidationReport {
        let mut report = ValidationReport::new();
        for constraint in &self.query {
            report.record(constraint.validate(query, catalog, language));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen_core::Difficulty;
    use sqlgen_query::{build_catalog, parse, Dialect};

    fn profile(schema: Vec<SchemaConstraint>, query: Vec<QueryConstraint>) -> MisconceptionProfile {
        MisconceptionProfile {
            misconception_id: "test".to_string(),
            title: "Test".to_string(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            schema,
            query,
            extra_details: String::new(),
        }
    }

    #[test]
    fn test_from_profiles_merges_schema_and_concatenates_query() {
        let a = profile(
            vec![SchemaConstraint::Tables { min: 4, max: None }],
            vec![QueryConstraint::UnionBalance],
        );
        let b = profile(
            vec![
                SchemaConstraint::Tables { min: 6, max: None },
                SchemaConstraint::UniqueKeys { min: 1 },
            ],
            vec![QueryConstraint::Distinct {
                state: crate::Presence::Absent,
            }],
        );
        let set = ConstraintSet::from_profiles([&a, &b]).unwrap();
        assert_eq!(
            set.schema,
            vec![
                SchemaConstraint::Tables { min: 6, max: None },
                SchemaConstraint::UniqueKeys { min: 1 },
            ]
        );
        assert_eq!(set.query.len(), 2);
    }

    #[test]
    fn test_end_to_end_solution_is_valid() {
        let catalog = build_catalog(
            &[
                "CREATE TABLE a(id INT PRIMARY KEY)",
                "CREATE TABLE b(id INT, a_id INT REFERENCES a(id))",
            ],
            Dialect::Postgres,
        )
        .unwrap();
        let set = ConstraintSet::new(
            vec![SchemaConstraint::Tables { min: 2, max: None }],
            vec![QueryConstraint::Conditions { min: 2, max: None }],
        );
        assert!(set
            .validate_schema(&catalog, &BTreeMap::new(), Language::En)
            .is_valid());

        let solution = parse("SELECT b.id FROM b WHERE b.a_id=1 AND b.id>0", Dialect::Postgres).unwrap();
        let report = set.validate_query(&solution, &catalog, Language::En);
        assert!(report.is_valid(), "{}", report.summary());
    }

    #[test]
    fn test_validation_collects_every_violation() {
        let catalog = build_catalog(&["CREATE TABLE a(id INT)"], Dialect::Postgres).unwrap();
        let set = ConstraintSet::new(
            vec![],
            vec![
                QueryConstraint::Tables { min: 2, max: None },
                QueryConstraint::Distinct {
                    state: crate::Presence::Present,
                },
                QueryConstraint::ColumnAliases { min: 0 },
            ],
        );
        let query = parse("SELECT id FROM a", Dialect::Postgres).unwrap();
        let report = set.validate_query(&query, &catalog, Language::En);
        assert_eq!(report.len(), 2);
        assert_eq!(report.violations[0].constraint, "tables");
        assert_eq!(report.violations[1].constraint, "distinct");
    }

    #[test]
    fn test_descriptions() {
        let set = ConstraintSet::new(
            vec![SchemaConstraint::Tables { min: 2, max: Some(2) }],
            vec![],
        );
        assert_eq!(
            set.schema_descriptions(Language::En),
            vec!["The schema must contain exactly 2 tables".to_string()]
        );
        assert!(set.query_descriptions(Language::En).is_empty());
    }
}
