use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use super::backend::Backend;
use crate::{
    DatabaseError, catalog::registry::SchemaRegistry, db::table::document::TableDocument,
};

/// Extension of table document files.
pub const TABLE_EXTENSION: &str = "json";

/// Subdirectory of the data directory holding table documents.
pub const TABLES_DIR: &str = "tables";

/// Stores the registry and each table as a JSON file.
///
/// Layout:
/// - `<data_dir>/<registry_file>`: table name -> column name -> type name
/// - `<data_dir>/tables/<table>.json`: column name -> array of values
///
/// Table documents live in their own directory so no table name can map
/// onto the registry file. Files are always rewritten whole.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
    tables_dir: PathBuf,
    registry_path: PathBuf,
}

impl JsonFileBackend {
    /// Opens a backend rooted at `data_dir`, creating it and its tables
    /// directory if they don't exist.
    pub fn open<P: AsRef<Path>>(data_dir: P, registry_file: &str) -> Result<Self, DatabaseError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let tables_dir = data_dir.join(TABLES_DIR);
        std::fs::create_dir_all(&tables_dir).map_err(|e| DatabaseError::io(&tables_dir, e))?;

        Ok(Self {
            registry_path: data_dir.join(registry_file),
            tables_dir,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.tables_dir.join(format!("{table}.{TABLE_EXTENSION}"))
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatabaseError> {
        let content = std::fs::read_to_string(path).map_err(|e| DatabaseError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| DatabaseError::corrupt(path, e))
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DatabaseError> {
        let content =
            serde_json::to_string_pretty(value).map_err(|e| DatabaseError::corrupt(path, e))?;
        std::fs::write(path, content).map_err(|e| DatabaseError::io(path, e))?;
        debug!(path = %path.display(), "document written");
        Ok(())
    }
}

impl Backend for JsonFileBackend {
    fn load_registry(&mut self) -> Result<SchemaRegistry, DatabaseError> {
        if !self.registry_path.exists() {
            debug!(path = %self.registry_path.display(), "no registry yet, creating an empty one");
            let registry = SchemaRegistry::default();
            Self::write_json(&self.registry_path, &registry)?;
            return Ok(registry);
        }

        Self::read_json(&self.registry_path)
    }

    fn save_registry(&mut self, registry: &SchemaRegistry) -> Result<(), DatabaseError> {
        Self::write_json(&self.registry_path, registry)
    }

    fn load_table(&mut self, table: &str) -> Result<TableDocument, DatabaseError> {
        let path = self.table_path(table);
        let document: TableDocument = Self::read_json(&path)?;
        document
            .check_lengths()
            .map_err(|reason| DatabaseError::corrupt(&path, reason))?;
        Ok(document)
    }

    fn save_table(&mut self, table: &str, document: &TableDocument) -> Result<(), DatabaseError> {
        Self::write_json(&self.table_path(table), document)
    }

    fn remove_table(&mut self, table: &str) -> Result<bool, DatabaseError> {
        let path = self.table_path(table);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DatabaseError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{core::types::Value, db::table::schema::Schema};

    fn backend(tmp: &TempDir) -> JsonFileBackend {
        JsonFileBackend::open(tmp.path().join("data"), "db_meta.json").unwrap()
    }

    #[test]
    fn test_open_creates_directory_and_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);
        assert!(backend.data_dir().is_dir());
        assert!(backend.data_dir().join(TABLES_DIR).is_dir());

        let registry = backend.load_registry().unwrap();
        assert!(registry.is_empty());
        assert_eq!(
            std::fs::read_to_string(backend.registry_path()).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_table_document_is_whole_file_json() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);

        let schema = Schema::from_specs(&["x:int"]).unwrap();
        let mut doc = TableDocument::empty(&schema);
        doc.push_row(vec![Value::Integer(1), Value::Integer(5)]);
        backend.save_table("t", &doc).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(backend.table_path("t")).unwrap())
                .unwrap();
        assert_eq!(raw, serde_json::json!({"id": [1], "x": [5]}));
        assert_eq!(backend.load_table("t").unwrap(), doc);
    }

    #[test]
    fn test_load_missing_table_is_backend_io() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);
        let err = backend.load_table("ghost").unwrap_err();
        assert!(matches!(err, DatabaseError::BackendIo { .. }));
    }

    #[test]
    fn test_load_ragged_table_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);
        std::fs::write(backend.table_path("t"), r#"{"id":[1,2],"x":[5]}"#).unwrap();
        let err = backend.load_table("t").unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptDocument { .. }));
    }

    #[test]
    fn test_remove_missing_table_reports_false() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);
        assert!(!backend.remove_table("ghost").unwrap());

        backend
            .save_table("t", &TableDocument::default())
            .unwrap();
        assert!(backend.remove_table("t").unwrap());
        assert!(!backend.table_path("t").exists());
    }

    #[test]
    fn test_table_named_like_registry_keeps_its_own_file() {
        let tmp = TempDir::new().unwrap();
        let mut backend = backend(&tmp);
        let mut registry = SchemaRegistry::new();
        registry.register("db_meta", &["x:int"]).unwrap();

        assert_ne!(backend.table_path("db_meta"), backend.registry_path());

        let schema = Schema::from_specs(&["x:int"]).unwrap();
        backend.save_table("db_meta", &TableDocument::empty(&schema)).unwrap();
        backend.save_registry(&registry).unwrap();

        assert_eq!(backend.load_registry().unwrap(), registry);
        assert_eq!(backend.load_table("db_meta").unwrap(), TableDocument::empty(&schema));

        assert!(backend.remove_table("db_meta").unwrap());
        assert!(backend.registry_path().exists());
    }
}
