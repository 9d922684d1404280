use std::{sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    DatabaseError,
    cache::{CacheStats, Fingerprint, ResultCache},
    catalog::{SchemaRegistry, TableListing},
    common::error::{MatchPolicy, Warning},
    core::types::Value,
    db::{
        predicate::Predicate,
        table::{ID_COLUMN, column_def::ColumnDef, document::TableDocument, normalize_name, schema::Schema},
        validate,
    },
    storage::Backend,
};

/// Rows returned by [`Database::select`].
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The normalized table name.
    pub table: String,

    /// The `where` clause, if one was given.
    pub predicate: Option<Predicate>,

    /// Matching rows, every column included. Shared with the result cache.
    pub rows: Arc<TableDocument>,

    /// Whether the rows came from the cache rather than a scan.
    pub cache_hit: bool,
}

/// Outcome of [`Database::drop_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub table: String,
    pub warnings: Vec<Warning>,
}

/// Outcome of [`Database::insert`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub table: String,
    /// The id assigned to the new row.
    pub id: i64,
}

/// Outcome of [`Database::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub table: String,
    /// Id of the updated row; `None` when nothing matched.
    pub updated_id: Option<i64>,
    pub warnings: Vec<Warning>,
}

/// Outcome of [`Database::delete`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub table: String,
    /// Ids of the removed rows, in the order they were removed (highest
    /// row position first).
    pub deleted_ids: Vec<i64>,
    pub warnings: Vec<Warning>,
}

/// Outcome of [`Database::info`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub row_count: usize,
}

/// The main database handle.
///
/// `Database` owns the schema registry, the result cache and a storage
/// [`Backend`]. Each operation follows the same cycle:
/// 1. **Validate** the arguments against the registry
/// 2. **Load** the table document from the backend
/// 3. **Apply** the operation to the in-memory copy
/// 4. **Persist** the document (and registry) only if every step succeeded
/// 5. **Invalidate** the table's cached reads after any mutation
///
/// An error at any step leaves the stored documents untouched.
#[derive(Debug)]
pub struct Database<B: Backend> {
    registry: SchemaRegistry,
    cache: ResultCache<TableDocument>,
    backend: B,
}

impl<B: Backend> Database<B> {
    /// Opens a database over `backend`, loading its registry.
    pub fn open(mut backend: B) -> Result<Self, DatabaseError> {
        let registry = backend.load_registry()?;
        debug!(tables = registry.len(), "registry loaded");

        Ok(Self {
            registry,
            cache: ResultCache::new(),
            backend,
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Creates a table and its empty document.
    ///
    /// `column_specs` are `name:type` strings. An `id:integer` column is
    /// always first. Nothing is persisted if any spec is invalid or the
    /// table already exists.
    pub fn create_table<S: AsRef<str>>(
        &mut self,
        name: &str,
        column_specs: &[S],
    ) -> Result<Schema, DatabaseError> {
        let table = normalize_name(name);
        let schema = self.registry.register(&table, column_specs)?.clone();

        let document = TableDocument::empty(&schema);
        if let Err(err) = self.backend.save_table(&table, &document) {
            self.registry.unregister(&table)?;
            return Err(err);
        }

        if let Err(err) = self.backend.save_registry(&self.registry) {
            self.registry.unregister(&table)?;
            if let Err(cleanup) = self.backend.remove_table(&table) {
                warn!(table, error = %cleanup, "could not remove orphaned table document");
            }
            return Err(err);
        }

        self.cache.invalidate(&table);
        info!(
            table,
            columns = %schema.columns.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "table created"
        );

        Ok(schema)
    }

    /// Removes a table and its document.
    ///
    /// A missing document is only a warning: the goal, no data for this
    /// table, already holds. Callers that want a confirmation step must
    /// ask before calling.
    pub fn drop_table(&mut self, name: &str) -> Result<DropOutcome, DatabaseError> {
        let table = normalize_name(name);
        self.registry.get(&table)?;

        let mut warnings = Vec::new();
        if !self.backend.remove_table(&table)? {
            let warning = Warning::MissingTableFile(table.clone());
            warn!(table, "{warning}");
            warnings.push(warning);
        }

        let schema = self.registry.unregister(&table)?;
        if let Err(err) = self.backend.save_registry(&self.registry) {
            // The document is already gone; keep memory matching the
            // registry that is still on disk.
            self.registry.restore(table, schema);
            return Err(err);
        }

        self.cache.invalidate(&table);
        info!(table, "table dropped");

        Ok(DropOutcome { table, warnings })
    }

    pub fn list_tables(&self) -> TableListing {
        self.registry.list_tables()
    }

    /// Appends a row built from `values`, one per non-id column in schema
    /// order, and returns the id assigned to it.
    ///
    /// Validation happens in this order: the table exists, the number of
    /// values matches, each value has its column's type. Nothing is
    /// appended unless all of them pass.
    pub fn insert(&mut self, name: &str, values: Vec<Value>) -> Result<InsertOutcome, DatabaseError> {
        let started = Instant::now();
        let table = normalize_name(name);
        let schema = self.registry.get(&table)?.clone();

        validate::insert_tuple(&table, &schema, &values)?;

        let mut document = self.load_document(&table, &schema)?;
        let id = document.next_id();

        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(Value::Integer(id));
        row.extend(values);
        document.push_row(row);

        self.backend.save_table(&table, &document)?;
        self.cache.invalidate(&table);

        info!(table, id, "row inserted");
        debug!(table, elapsed = ?started.elapsed(), "insert finished");

        Ok(InsertOutcome { table, id })
    }

    /// Reads rows, optionally filtered by one equality predicate.
    ///
    /// Results are served from the cache when the same table and predicate
    /// were read since the table last changed. Zero matches is an empty
    /// result with every column present, not an error.
    pub fn select(
        &mut self,
        name: &str,
        predicate: Option<Predicate>,
    ) -> Result<QueryResult, DatabaseError> {
        let started = Instant::now();
        let table = normalize_name(name);
        let schema = self.registry.get(&table)?.clone();

        if let Some(predicate) = &predicate {
            validate::columns_exist(&table, &schema, &[&predicate.column])?;
            validate::predicate_type(&schema, predicate)?;
        }

        let document = self.load_document(&table, &schema)?;

        let key = match &predicate {
            Some(predicate) => Fingerprint::filtered(&table, predicate),
            None => Fingerprint::table(&table),
        };

        let misses_before = self.cache.stats().misses;
        let rows = self.cache.get_or_compute(key, || match &predicate {
            Some(p) => document.project(&document.find_indices(&p.column, &p.value)),
            None => document.clone(),
        });
        let cache_hit = self.cache.stats().misses == misses_before;

        debug!(
            table,
            rows = rows.row_count(),
            cache_hit,
            elapsed = ?started.elapsed(),
            "select finished"
        );

        Ok(QueryResult {
            table,
            predicate,
            rows,
            cache_hit,
        })
    }

    /// Sets `set.column` to `set.value` on the first row where `filter`
    /// holds.
    ///
    /// Only the lowest-positioned match is changed; when several rows
    /// match a [`Warning::MultipleMatch`] says how many. No match is a
    /// [`Warning::NoMatch`] and leaves the table as it was.
    pub fn update(
        &mut self,
        name: &str,
        set: Predicate,
        filter: Predicate,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let table = normalize_name(name);
        let schema = self.registry.get(&table)?.clone();

        validate::columns_exist(&table, &schema, &[&set.column, &filter.column])?;
        if set.column == ID_COLUMN {
            return Err(DatabaseError::ReadOnlyColumn(set.column));
        }
        validate::predicate_type(&schema, &set)?;
        validate::predicate_type(&schema, &filter)?;

        let mut document = self.load_document(&table, &schema)?;
        let matches = document.find_indices(&filter.column, &filter.value);

        let mut warnings = Vec::new();
        let Some(&first) = matches.first() else {
            warnings.push(no_match(&table, &filter));
            return Ok(UpdateOutcome {
                table,
                updated_id: None,
                warnings,
            });
        };

        if matches.len() > 1 {
            let warning = Warning::MultipleMatch {
                count: matches.len(),
                policy: MatchPolicy::FirstOnly,
            };
            warn!(table, "{warning}");
            warnings.push(warning);
        }

        document.set_value(&set.column, first, set.value);
        let updated_id = document.id_at(first);

        self.backend.save_table(&table, &document)?;
        self.cache.invalidate(&table);
        info!(table, id = ?updated_id, "row updated");

        Ok(UpdateOutcome {
            table,
            updated_id,
            warnings,
        })
    }

    /// Removes every row where `filter` holds.
    ///
    /// Unlike [`Database::update`] this acts on all matches. Rows are
    /// removed from the highest position down so pending positions stay
    /// valid. Callers that want a confirmation step must ask before
    /// calling.
    pub fn delete(&mut self, name: &str, filter: Predicate) -> Result<DeleteOutcome, DatabaseError> {
        let table = normalize_name(name);
        let schema = self.registry.get(&table)?.clone();

        validate::columns_exist(&table, &schema, &[&filter.column])?;
        validate::predicate_type(&schema, &filter)?;

        let mut document = self.load_document(&table, &schema)?;
        let matches = document.find_indices(&filter.column, &filter.value);

        let mut warnings = Vec::new();
        if matches.is_empty() {
            warnings.push(no_match(&table, &filter));
            return Ok(DeleteOutcome {
                table,
                deleted_ids: Vec::new(),
                warnings,
            });
        }

        if matches.len() > 1 {
            let warning = Warning::MultipleMatch {
                count: matches.len(),
                policy: MatchPolicy::All,
            };
            warn!(table, "{warning}");
            warnings.push(warning);
        }

        let mut deleted_ids = Vec::with_capacity(matches.len());
        for &idx in matches.iter().rev() {
            if let Some(id) = document.id_at(idx) {
                info!(table, id, "row deleted");
                deleted_ids.push(id);
            }
            document.remove_row(idx);
        }

        self.backend.save_table(&table, &document)?;
        self.cache.invalidate(&table);

        Ok(DeleteOutcome {
            table,
            deleted_ids,
            warnings,
        })
    }

    /// Describes a table: its columns in order and how many rows it holds.
    pub fn info(&mut self, name: &str) -> Result<TableInfo, DatabaseError> {
        let table = normalize_name(name);
        let schema = self.registry.get(&table)?.clone();
        let document = self.load_document(&table, &schema)?;

        Ok(TableInfo {
            row_count: document.row_count(),
            columns: schema.columns,
            table,
        })
    }

    /// Loads a table document and checks it still fits the schema.
    fn load_document(&mut self, table: &str, schema: &Schema) -> Result<TableDocument, DatabaseError> {
        let document = self.backend.load_table(table)?;
        document
            .check_against(schema)
            .map_err(|reason| DatabaseError::DocumentMismatch {
                table: table.to_string(),
                reason,
            })?;
        debug!(table, rows = document.row_count(), "table loaded");
        Ok(document)
    }
}

fn no_match(table: &str, filter: &Predicate) -> Warning {
    let warning = Warning::NoMatch {
        table: table.to_string(),
        column: filter.column.clone(),
        value: filter.value.to_literal(),
    };
    warn!(table, "{warning}");
    warning
}
