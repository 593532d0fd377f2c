//! Structural schema model built from CREATE TABLE statements

use crate::dialect::Dialect;
use crate::parser::parse_statements;
use crate::walk::object_name;
use sqlgen_core::{Result, SqlGenError};
use sqlparser::ast::{ColumnOption, ObjectName, Statement, TableConstraint};
use std::collections::BTreeMap;

/// A column and its key memberships
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_foreign_key: bool,
}

/// A foreign key declared on a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// A table with its columns and key constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub unique_keys: Vec<Vec<String>>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        let name = name.to_lowercase();
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column sets guaranteed to identify a row: the primary key (if any)
    /// followed by every unique key
    pub fn candidate_keys(&self) -> Vec<&[String]> {
        let mut keys: Vec<&[String]> = Vec::new();
        if !self.primary_key.is_empty() {
            keys.push(&self.primary_key);
        }
        keys.extend(self.unique_keys.iter().map(|k| k.as_slice()));
        keys
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Tables of a schema, keyed by lowercase name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of foreign keys across all tables
    pub fn foreign_key_count(&self) -> usize {
        self.tables.values().map(|t| t.foreign_keys.len()).sum()
    }

    /// Tables that declare a column with the given name
    pub fn tables_with_column(&self, column: &str) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|t| t.has_column(column))
            .collect()
    }

    /// Column names declared by two or more tables
    pub fn shared_column_names(&self) -> Vec<String> {
        let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
        for table in self.tables.values() {
            for column in &table.columns {
                *owners.entry(column.name.as_str()).or_insert(0) += 1;
            }
        }
        owners
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn insert(&mut self, table: Table) {
        if self.tables.contains_key(&table.name) {
            tracing::warn!(table = %table.name, "duplicate CREATE TABLE, keeping the last definition");
        }
        self.tables.insert(table.name.clone(), table);
    }
}

/// Build a catalog from CREATE TABLE statements.
///
/// Each entry may hold one or more statements. Anything that is not a
/// CREATE TABLE is rejected as a parsing error.
pub fn build_catalog<S: AsRef<str>>(create_statements: &[S], dialect: Dialect) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for sql in create_statements {
        let sql = sql.as_ref();
        for statement in parse_statements(sql, dialect)? {
            match statement {
                Statement::CreateTable {
                    name,
                    columns,
                    constraints,
                    ..
                } => {
                    let table = table_from_definition(&name, &columns, &constraints);
                    catalog.insert(table);
                }
                other => {
                    return Err(SqlGenError::parsing(
                        &other.to_string(),
                        "expected a CREATE TABLE statement",
                    ));
                }
            }
        }
    }

    Ok(catalog)
}


fn table_from_definition(
    name: &ObjectName,
    column_defs: &[sqlparser::ast::ColumnDef],
    constraints: &[TableConstraint],
) -> Table {
    let mut primary_key: Vec<String> = Vec::new();
    let mut unique_keys: Vec<Vec<String>> = Vec::new();
    let mut foreign_keys: Vec<ForeignKey> = Vec::new();
    let mut not_null: Vec<String> = Vec::new();

    // Inline column options
    for def in column_defs {
        let column = def.name.value.to_lowercase();
        for option in &def.options {
            match &option.option {
                ColumnOption::NotNull => not_null.push(column.clone()),
                ColumnOption::Unique { is_primary, .. } => {
                    if *is_primary {
                        if !primary_key.contains(&column) {
                            primary_key.push(column.clone());
                        }
                    } else {
                        unique_keys.push(vec![column.clone()]);
                    }
                }
                ColumnOption::ForeignKey {
                    foreign_table,
                    referred_columns,
                    ..
                } => foreign_keys.push(ForeignKey {
                    columns: vec![column.clone()],
                    referenced_table: object_name(foreign_table),
                    referenced_columns: referred_columns
                        .iter()
                        .map(|c| c.value.to_lowercase())
                        .collect(),
                }),
                _ => {}
            }
        }
    }

    // Table-level constraint clauses
    for constraint in constraints {
        match constraint {
            TableConstraint::Unique {
                columns,
                is_primary,
                ..
            } => {
                let cols: Vec<String> = columns.iter().map(|c| c.value.to_lowercase()).collect();
                if *is_primary {
                    primary_key = cols;
                } else {
                    unique_keys.push(cols);
                }
            }
            TableConstraint::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
                ..
            } => foreign_keys.push(ForeignKey {
                columns: columns.iter().map(|c| c.value.to_lowercase()).collect(),
                referenced_table: object_name(foreign_table),
                referenced_columns: referred_columns
                    .iter()
                    .map(|c| c.value.to_lowercase())
                    .collect(),
            }),
            _ => {}
        }
    }

    let columns = column_defs
        .iter()
        .map(|def| {
            let name = def.name.value.to_lowercase();
            let is_primary_key = primary_key.contains(&name);
            Column {
                data_type: def.data_type.to_string(),
                nullable: !is_primary_key && !not_null.contains(&name),
                is_primary_key,
                is_unique: unique_keys.iter().any(|k| k.contains(&name)),
                is_foreign_key: foreign_keys.iter().any(|fk| fk.columns.contains(&name)),
                name,
            }
        })
        .collect();

    Table {
        name: object_name(name),
        columns,
        primary_key,
        unique_keys,
        foreign_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Catalog {
        build_catalog(
            &[
                "CREATE TABLE author (id INT PRIMARY KEY, name VARCHAR(80) NOT NULL, email TEXT UNIQUE)",
                "CREATE TABLE book (
                    isbn CHAR(13),
                    title TEXT NOT NULL,
                    author_id INT REFERENCES author(id),
                    PRIMARY KEY (isbn)
                )",
                "CREATE TABLE loan (
                    isbn CHAR(13),
                    member_id INT,
                    name TEXT,
                    PRIMARY KEY (isbn, member_id),
                    FOREIGN KEY (isbn) REFERENCES book(isbn)
                )",
            ],
            Dialect::Postgres,
        )
        .unwrap()
    }

    #[test]
    fn test_tables_are_loaded() {
        let catalog = library();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.table_names().collect::<Vec<_>>(),
            vec!["author", "book", "loan"]
        );
    }

    #[test]
    fn test_inline_keys() {
        let catalog = library();
        let author = catalog.table("AUTHOR").unwrap();
        assert_eq!(author.primary_key, vec!["id".to_string()]);
        assert_eq!(author.unique_keys, vec![vec!["email".to_string()]]);
        assert!(author.column("id").unwrap().is_primary_key);
        assert!(!author.column("id").unwrap().nullable);
        assert!(!author.column("name").unwrap().nullable);
        assert!(author.column("email").unwrap().is_unique);
    }

    #[test]
    fn test_table_level_keys() {
        let catalog = library();
        let loan = catalog.table("loan").unwrap();
        assert_eq!(loan.primary_key, vec!["isbn".to_string(), "member_id".to_string()]);
        assert_eq!(loan.foreign_keys.len(), 1);
        assert_eq!(loan.foreign_keys[0].referenced_table, "book");
        assert!(loan.column("isbn").unwrap().is_foreign_key);
        assert!(!loan.column("member_id").unwrap().is_foreign_key);
    }

    #[test]
    fn test_inline_foreign_key() {
        let catalog = library();
        let book = catalog.table("book").unwrap();
        assert_eq!(book.foreign_keys[0].columns, vec!["author_id".to_string()]);
        assert_eq!(book.foreign_keys[0].referenced_columns, vec!["id".to_string()]);
        assert_eq!(catalog.foreign_key_count(), 2);
    }

    #[test]
    fn test_candidate_keys_and_shared_names() {
        let catalog = library();
        let author = catalog.table("author").unwrap();
        assert_eq!(author.candidate_keys().len(), 2);
        assert_eq!(
            catalog.shared_column_names(),
            vec!["isbn".to_string(), "name".to_string()]
        );
        assert_eq!(catalog.tables_with_column("name").len(), 2);
    }

    #[test]
    fn test_non_create_statement_is_rejected() {
        let err = build_catalog(&["INSERT INTO t VALUES (1)"], Dialect::Postgres).unwrap_err();
        assert!(matches!(err, SqlGenError::Parsing { .. }));
    }

    #[test]
    fn test_invalid_sql_is_rejected() {
        let err = build_catalog(&["CREATE TABLE (id INT"], Dialect::Postgres).unwrap_err();
        assert!(matches!(err, SqlGenError::Parsing { .. }));
    }
}
