//! Constraints over a generated schema and its data

use crate::types::{bound_phrase, within, Constraint};
use serde::{Deserialize, Serialize};
use sqlgen_core::{ConstraintViolation, Language};
use sqlgen_query::Catalog;
use std::collections::BTreeMap;

/// A structural requirement on the tables, keys and rows of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaConstraint {
    /// Number of tables
    Tables {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Column count of every table
    ColumnsPerTable {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Inserted rows for every table
    RowsPerTable {
        #[serde(default)]
        min: usize,
    },
    /// Total declared foreign keys
    ForeignKeys {
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Declared unique keys, primary keys excluded
    UniqueKeys {
        #[serde(default)]
        min: usize,
    },
    /// Tables with a multi-column primary key
    CompositeKeys {
        #[serde(default)]
        min: usize,
    },
    /// Column names used by two or more tables
    SharedColumnNames {
        #[serde(default)]
        min: usize,
    },
    /// Nullable columns outside primary keys
    NullableColumns {
        #[serde(default)]
        min: usize,
    },
}

impl Constraint for SchemaConstraint {
    fn name(&self) -> &'static str {
        match self {
            SchemaConstraint::Tables { .. } => "tables",
            SchemaConstraint::ColumnsPerTable { .. } => "columns_per_table",
            SchemaConstraint::RowsPerTable { .. } => "rows_per_table",
            SchemaConstraint::ForeignKeys { .. } => "foreign_keys",
            SchemaConstraint::UniqueKeys { .. } => "unique_keys",
            SchemaConstraint::CompositeKeys { .. } => "composite_keys",
            SchemaConstraint::SharedColumnNames { .. } => "shared_column_names",
            SchemaConstraint::NullableColumns { .. } => "nullable_columns",
        }
    }

    fn description(&self, language: Language) -> String {
        let l = language;
        match self {
            SchemaConstraint::Tables { min, max } => format!(
                "{} {} {}",
                l.pick("The schema must contain", "Lo schema deve contenere"),
                bound_phrase(l, *min, *max),
                l.pick("tables", "tabelle"),
            ),
            SchemaConstraint::ColumnsPerTable { min, max } => format!(
                "{} {} {}",
                l.pick("Every table must have", "Ogni tabella deve avere"),
                bound_phrase(l, *min, *max),
                l.pick("columns", "colonne"),
            ),
            SchemaConstraint::RowsPerTable { min } => format!(
                "{} {} {}",
                l.pick(
                    "Insert into every table",
                    "Inserisci in ogni tabella"
                ),
                bound_phrase(l, *min, None),
                l.pick("rows", "righe"),
            ),
            SchemaConstraint::ForeignKeys { min, max } => format!(
                "{} {} {}",
                l.pick("The schema must declare", "Lo schema deve dichiarare"),
                bound_phrase(l, *min, *max),
                l.pick("foreign keys", "chiavi esterne"),
            ),
            SchemaConstraint::UniqueKeys { min } => format!(
                "{} {} {}",
                l.pick("The schema must declare", "Lo schema deve dichiarare"),
                bound_phrase(l, *min, None),
                l.pick(
                    "UNIQUE constraints besides the primary keys",
                    "vincoli UNIQUE oltre alle chiavi primarie"
                ),
            ),
            SchemaConstraint::CompositeKeys { min } => format!(
                "{} {} {}",
                l.pick("The schema must contain", "Lo schema deve contenere"),
                bound_phrase(l, *min, None),
                l.pick(
                    "tables whose primary key spans two or more columns",
                    "tabelle con una chiave primaria composta da due o più colonne"
                ),
            ),
            SchemaConstraint::SharedColumnNames { min } => format!(
                "{} {} {}",
                l.pick("Use", "Usa"),
                bound_phrase(l, *min, None),
                l.pick(
                    "column names that appear in two or more tables",
                    "nomi di colonna presenti in due o più tabelle"
                ),
            ),
            SchemaConstraint::NullableColumns { min } => format!(
                "{} {} {}",
                l.pick("The schema must contain", "Lo schema deve contenere"),
                bound_phrase(l, *min, None),
                l.pick(
                    "nullable columns that are not part of a primary key, with some NULL values inserted",
                    "colonne che ammettono NULL e non fanno parte di una chiave primaria, con alcuni valori NULL inseriti"
                ),
            ),
        }
    }
}

impl SchemaConstraint {
    /// Check the constraint against a catalog and the row counts of its inserts
    pub fn validate(
        &self,
        catalog: &Catalog,
        inserted_rows: &BTreeMap<String, usize>,
        language: Language,
    ) -> Result<(), ConstraintViolation> {
        let outcome = match self {
            SchemaConstraint::Tables { min, max } => check_table_count(catalog, *min, *max),
            SchemaConstraint::ColumnsPerTable { min, max } => {
                check_columns_per_table(catalog, *min, *max)
            }
            SchemaConstraint::RowsPerTable { min } => {
                check_rows_per_table(catalog, inserted_rows, *min)
            }
            SchemaConstraint::ForeignKeys { min, max } => {
                check_foreign_keys(catalog, *min, *max)
            }
            SchemaConstraint::UniqueKeys { min } => check_unique_keys(catalog, *min),
            SchemaConstraint::CompositeKeys { min } => check_composite_keys(catalog, *min),
            SchemaConstraint::SharedColumnNames { min } => {
                check_shared_column_names(catalog, *min)
            }
            SchemaConstraint::NullableColumns { min } => check_nullable_columns(catalog, *min),
        };

        outcome.map_err(|observed| {
            ConstraintViolation::new(self.name(), self.description(language), observed)
        })
    }

    /// Lower bound of the constraint
    pub fn min(&self) -> usize {
        match self {
            SchemaConstraint::Tables { min, .. }
            | SchemaConstraint::ColumnsPerTable { min, .. }
            | SchemaConstraint::RowsPerTable { min }
            | SchemaConstraint::ForeignKeys { min, .. }
            | SchemaConstraint::UniqueKeys { min }
            | SchemaConstraint::CompositeKeys { min }
            | SchemaConstraint::SharedColumnNames { min }
            | SchemaConstraint::NullableColumns { min } => *min,
        }
    }

    /// Upper bound of the constraint, for the variants that have one
    pub fn max(&self) -> Option<usize> {
        match self {
            SchemaConstraint::Tables { max, .. }
            | SchemaConstraint::ColumnsPerTable { max, .. }
            | SchemaConstraint::ForeignKeys { max, .. } => *max,
            _ => None,
        }
    }
}

/// Predicate result: `Err` carries a description of what was observed
type Check = Result<(), String>;

fn count_in_range(count: usize, min: usize, max: Option<usize>, what: &str) -> Check {
    if within(count, min, max) {
        Ok(())
    } else {
        Err(format!("{count} {what}"))
    }
}

pub fn check_table_count(catalog: &Catalog, min: usize, max: Option<usize>) -> Check {
    count_in_range(catalog.len(), min, max, "tables")
}

pub fn check_columns_per_table(catalog: &Catalog, min: usize, max: Option<usize>) -> Check {
    let offending: Vec<String> = catalog
        .tables()
        .filter(|t| !within(t.columns.len(), min, max))
        .map(|t| format!("{} has {} columns", t.name, t.columns.len()))
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(offending.join(", "))
    }
}

pub fn check_rows_per_table(
    catalog: &Catalog,
    inserted_rows: &BTreeMap<String, usize>,
    min: usize,
) -> Check {
    let offending: Vec<String> = catalog
        .table_names()
        .filter_map(|name| {
            let rows = inserted_rows.get(name).copied().unwrap_or(0);
            (rows < min).then(|| format!("{name} has {rows} rows"))
        })
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(offending.join(", "))
    }
}

pub fn check_foreign_keys(catalog: &Catalog, min: usize, max: Option<usize>) -> Check {
    count_in_range(catalog.foreign_key_count(), min, max, "foreign keys")
}

pub fn check_unique_keys(catalog: &Catalog, min: usize) -> Check {
    let count = catalog.tables().map(|t| t.unique_keys.len()).sum();
    count_in_range(count, min, None, "unique keys")
}

pub fn check_composite_keys(catalog: &Catalog, min: usize) -> Check {
    let count = catalog
        .tables()
        .filter(|t| t.primary_key.len() >= 2)
        .count();
    count_in_range(count, min, None, "tables with a composite primary key")
}

pub fn check_shared_column_names(catalog: &Catalog, min: usize) -> Check {
    let shared = catalog.shared_column_names();
    if shared.len() >= min {
        Ok(())
    } else if shared.is_empty() {
        Err("no column name is shared between tables".to_string())
    } else {
        Err(format!("only {} shared: {}", shared.len(), shared.join(", ")))
    }
}

pub fn check_nullable_columns(catalog: &Catalog, min: usize) -> Check {
    let count = catalog
        .tables()
        .flat_map(|t| t.columns.iter())
        .filter(|c| c.nullable && !c.is_primary_key)
        .count();
    count_in_range(count, min, None, "nullable columns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen_query::{build_catalog, insert_row_counts, Dialect};

    fn shop() -> Catalog {
        build_catalog(
            &[
                "CREATE TABLE customer (id INT PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE, city TEXT)",
                "CREATE TABLE orders (id INT PRIMARY KEY, customer_id INT REFERENCES customer(id), total NUMERIC)",
                "CREATE TABLE order_line (order_id INT, line INT, qty INT NOT NULL,
                    PRIMARY KEY (order_id, line), FOREIGN KEY (order_id) REFERENCES orders(id))",
            ],
            Dialect::Postgres,
        )
        .unwrap()
    }

    fn no_rows() -> BTreeMap<String, usize> {
        BTreeMap::new()
    }

    #[test]
    fn test_table_count() {
        let catalog = shop();
        let ok = SchemaConstraint::Tables { min: 3, max: Some(5) };
        assert!(ok.validate(&catalog, &no_rows(), Language::En).is_ok());

        let too_many = SchemaConstraint::Tables { min: 4, max: None };
        let violation = too_many
            .validate(&catalog, &no_rows(), Language::En)
            .unwrap_err();
        assert_eq!(violation.constraint, "tables");
        assert_eq!(violation.observed, "3 tables");
        assert!(violation.description.contains("at least 4"));
    }

    #[test]
    fn test_columns_per_table() {
        let catalog = shop();
        assert!(check_columns_per_table(&catalog, 3, Some(4)).is_ok());
        let err = check_columns_per_table(&catalog, 4, None).unwrap_err();
        assert!(err.contains("orders has 3 columns"));
        assert!(err.contains("order_line has 3 columns"));
    }

    #[test]
    fn test_rows_per_table_counts_multi_row_values() {
        let catalog = shop();
        let rows = insert_row_counts(
            &[
                "INSERT INTO customer VALUES (1, 'a', 'a@x', NULL), (2, 'b', 'b@x', 'Rome')",
                "INSERT INTO orders VALUES (1, 1, 10), (2, 1, 20)",
                "INSERT INTO order_line VALUES (1, 1, 3)",
            ],
            Dialect::Postgres,
        )
        .unwrap();
        assert!(check_rows_per_table(&catalog, &rows, 1).is_ok());
        let err = check_rows_per_table(&catalog, &rows, 2).unwrap_err();
        assert_eq!(err, "order_line has 1 rows");
    }

    #[test]
    fn test_key_counts() {
        let catalog = shop();
        assert!(check_foreign_keys(&catalog, 2, Some(2)).is_ok());
        assert!(check_foreign_keys(&catalog, 0, Some(1)).is_err());
        assert!(check_unique_keys(&catalog, 1).is_ok());
        assert!(check_unique_keys(&catalog, 2).is_err());
        assert!(check_composite_keys(&catalog, 1).is_ok());
        assert!(check_composite_keys(&catalog, 2).is_err());
    }

    #[test]
    fn test_shared_column_names() {
        let catalog = shop();
        // `id` appears in customer and orders
        assert!(check_shared_column_names(&catalog, 1).is_ok());
        let err = check_shared_column_names(&catalog, 2).unwrap_err();
        assert_eq!(err, "only 1 shared: id");
    }

    #[test]
    fn test_nullable_columns() {
        let catalog = shop();
        // email, city, customer_id, total
        assert!(check_nullable_columns(&catalog, 4).is_ok());
        assert!(check_nullable_columns(&catalog, 5).is_err());
    }

    #[test]
    fn test_italian_description() {
        let c = SchemaConstraint::ForeignKeys { min: 1, max: None };
        assert_eq!(
            c.description(Language::It),
            "Lo schema deve dichiarare almeno 1 chiavi esterne"
        );
    }

    #[test]
    fn test_parse_from_toml() {
        #[derive(Deserialize)]
        struct File {
            schema: Vec<SchemaConstraint>,
        }
        let file: File = toml::from_str(
            r#"
[[schema]]
type = "tables"
min = 3

[[schema]]
type = "columns_per_table"
min = 2
max = 6
"#,
        )
        .unwrap();
        assert_eq!(
            file.schema,
            vec![
                SchemaConstraint::Tables { min: 3, max: None },
                SchemaConstraint::ColumnsPerTable { min: 2, max: Some(6) },
            ]
        );
        assert_eq!(file.schema[1].name(), "columns_per_table");
    }
}
