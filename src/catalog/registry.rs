use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    DatabaseError,
    db::table::{column_def::is_identifier, normalize_name, schema::Schema},
};

/// The catalog of every table in the database.
///
/// Maps normalized table names to their schemas, in creation order. This
/// is the one document shared by all tables; it is persisted as a JSON
/// object of table name -> column name -> type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    tables: IndexMap<String, Schema>,
}

/// Result of listing the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableListing {
    /// No table has been created yet.
    Empty,
    /// Table names in creation order.
    Tables(Vec<String>),
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` (normalized) is a known table.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(&normalize_name(name))
    }

    /// Looks up the schema of a known table.
    pub fn get(&self, name: &str) -> Result<&Schema, DatabaseError> {
        let name = normalize_name(name);
        self.tables
            .get(&name)
            .ok_or(DatabaseError::UnknownTable(name))
    }

    /// Validates and registers a new table.
    ///
    /// The registry is left unchanged on any error. Only the registry is
    /// touched; creating the table document is up to the caller.
    pub fn register<S: AsRef<str>>(
        &mut self,
        name: &str,
        column_specs: &[S],
    ) -> Result<&Schema, DatabaseError> {
        let name = normalize_name(name);

        if self.tables.contains_key(&name) {
            return Err(DatabaseError::DuplicateTable(name));
        }

        if !is_identifier(&name) {
            return Err(DatabaseError::InvalidTableName(name));
        }

        let schema = Schema::from_specs(column_specs)?;
        let entry = self.tables.entry(name).or_insert(schema);
        Ok(entry)
    }

    /// Removes a table, returning its schema.
    pub fn unregister(&mut self, name: &str) -> Result<Schema, DatabaseError> {
        let name = normalize_name(name);
        self.tables
            .shift_remove(&name)
            .ok_or(DatabaseError::UnknownTable(name))
    }

    /// Puts back a schema taken out by [`SchemaRegistry::unregister`].
    pub(crate) fn restore(&mut self, name: String, schema: Schema) {
        self.tables.insert(name, schema);
    }

    pub fn list_tables(&self) -> TableListing {
        if self.tables.is_empty() {
            TableListing::Empty
        } else {
            TableListing::Tables(self.tables.keys().cloned().collect())
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
