use std::collections::HashMap;

use crate::{
    DatabaseError,
    catalog::registry::SchemaRegistry,
    db::table::document::TableDocument,
};

/// Where the registry and the table documents live.
///
/// Every call reads or writes a whole document; there are no partial
/// writes. Implementations are free to fail with
/// [`DatabaseError::BackendIo`] or [`DatabaseError::CorruptDocument`].
pub trait Backend {
    /// Loads the schema registry. A backend that has never been written to
    /// returns an empty registry.
    fn load_registry(&mut self) -> Result<SchemaRegistry, DatabaseError>;

    fn save_registry(&mut self, registry: &SchemaRegistry) -> Result<(), DatabaseError>;

    /// Loads one table document. A missing document is an error.
    fn load_table(&mut self, table: &str) -> Result<TableDocument, DatabaseError>;

    fn save_table(&mut self, table: &str, document: &TableDocument) -> Result<(), DatabaseError>;

    /// Deletes a table document. Returns `false` if there was nothing to
    /// delete.
    fn remove_table(&mut self, table: &str) -> Result<bool, DatabaseError>;
}

/// A backend that keeps everything in memory.
///
/// Handy for tests and for embedding the engine without touching disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    registry: SchemaRegistry,
    tables: HashMap<String, TableDocument>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored document for `table`, if any.
    pub fn table(&self, table: &str) -> Option<&TableDocument> {
        self.tables.get(table)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }
}

impl Backend for MemoryBackend {
    fn load_registry(&mut self) -> Result<SchemaRegistry, DatabaseError> {
        Ok(self.registry.clone())
    }

    fn save_registry(&mut self, registry: &SchemaRegistry) -> Result<(), DatabaseError> {
        self.registry = registry.clone();
        Ok(())
    }

    fn load_table(&mut self, table: &str) -> Result<TableDocument, DatabaseError> {
        self.tables.get(table).cloned().ok_or_else(|| {
            DatabaseError::io(
                format!("memory://{table}"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such table document"),
            )
        })
    }

    fn save_table(&mut self, table: &str, document: &TableDocument) -> Result<(), DatabaseError> {
        self.tables.insert(table.to_string(), document.clone());
        Ok(())
    }

    fn remove_table(&mut self, table: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.remove(table).is_some())
    }
}
