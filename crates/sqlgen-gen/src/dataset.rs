//! Generated datasets
//!
//! A dataset owns its CREATE and INSERT statements. The catalog derived from
//! the CREATE statements is memoized together with the content hash that
//! produced it, so it is rebuilt only when the statements change.

use serde::{Deserialize, Serialize};
use sqlgen_core::{ContentHash, Result};
use sqlgen_query::{build_catalog, insert_row_counts, Catalog, Dialect};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A schema plus sample data for one domain
#[derive(Debug)]
pub struct Dataset {
    domain: String,
    create_commands: Vec<String>,
    insert_commands: Vec<String>,
    dialect: Dialect,
    catalog_cache: RefCell<Option<(ContentHash, Arc<Catalog>)>>,
}

impl Dataset {
    pub fn new(
        domain: impl Into<String>,
        create_commands: Vec<String>,
        insert_commands: Vec<String>,
        dialect: Dialect,
    ) -> Self {
        Self {
            domain: domain.into(),
            create_commands,
            insert_commands,
            dialect,
            catalog_cache: RefCell::new(None),
        }
    }

    /// Build a dataset whose catalog was already computed during validation
    pub(crate) fn with_catalog(
        domain: impl Into<String>,
        create_commands: Vec<String>,
        insert_commands: Vec<String>,
        dialect: Dialect,
        catalog: Arc<Catalog>,
    ) -> Self {
        let hash = ContentHash::from_parts(&create_commands);
        let dataset = Self::new(domain, create_commands, insert_commands, dialect);
        *dataset.catalog_cache.borrow_mut() = Some((hash, catalog));
        dataset
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn create_commands(&self) -> &[String] {
        &self.create_commands
    }

    pub fn insert_commands(&self) -> &[String] {
        &self.insert_commands
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Catalog of the current CREATE statements, rebuilt on content change
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        let hash = ContentHash::from_parts(&self.create_commands);
        if let Some((cached_hash, catalog)) = self.catalog_cache.borrow().as_ref() {
            if *cached_hash == hash {
                return Ok(Arc::clone(catalog));
            }
        }

        tracing::debug!(domain = %self.domain, hash = %hash, "building catalog");
        let catalog = Arc::new(build_catalog(&self.create_commands, self.dialect)?);
        *self.catalog_cache.borrow_mut() = Some((hash, Arc::clone(&catalog)));
        Ok(catalog)
    }

    /// Replace the CREATE statements and drop the cached catalog
    pub fn set_create_commands(&mut self, create_commands: Vec<String>) {
        self.create_commands = create_commands;
        self.catalog_cache.get_mut().take();
    }

    /// Rows inserted per table
    pub fn inserted_rows(&self) -> Result<BTreeMap<String, usize>> {
        insert_row_counts(&self.insert_commands, self.dialect)
    }

    /// Render a self-contained script that recreates the dataset in `schema_name`
    pub fn to_sql(&self, schema_name: &str) -> String {
        let mut statements = vec![
            "BEGIN".to_string(),
            format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name),
            format!("CREATE SCHEMA {}", schema_name),
            format!("SET search_path TO {}", schema_name),
        ];
        statements.extend(self.create_commands.iter().cloned());
        statements.extend(self.insert_commands.iter().cloned());
        statements.push("COMMIT".to_string());

        let mut script = String::new();
        for statement in statements {
            let statement = statement.trim().trim_end_matches(';').trim_end();
            if statement.is_empty() {
                continue;
            }
            script.push_str(statement);
            script.push_str(";\n");
        }
        script
    }

    pub fn to_record(&self) -> DatasetRecord {
        DatasetRecord {
            domain: self.domain.clone(),
            dialect: self.dialect,
            create_commands: self.create_commands.clone(),
            insert_commands: self.insert_commands.clone(),
        }
    }
}

/// Serializable form of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub domain: String,
    pub dialect: Dialect,
    pub create_commands: Vec<String>,
    pub insert_commands: Vec<String>,
}

impl From<DatasetRecord> for Dataset {
    fn from(record: DatasetRecord) -> Self {
        Dataset::new(
            record.domain,
            record.create_commands,
            record.insert_commands,
            record.dialect,
        )
    }
}
