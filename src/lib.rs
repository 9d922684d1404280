//! Skiff DB: a small file-backed tabular store.
//!
//! Tables have a fixed, typed schema kept in a registry; rows live in one
//! column-oriented JSON document per table. Reads are memoized in a result
//! cache that every mutation of a table invalidates.

pub mod cache;
pub mod catalog;
pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod shell;
pub mod sql;
pub mod storage;

pub use catalog::{SchemaRegistry, TableListing};
pub use common::error::{DatabaseError, MatchPolicy, Warning};
pub use config::Config;
pub use crate::core::types::{DataType, Value};
pub use db::{
    database::{Database, DeleteOutcome, DropOutcome, InsertOutcome, QueryResult, TableInfo, UpdateOutcome},
    predicate::Predicate,
    table::{column_def::ColumnDef, document::TableDocument, row::Row, schema::Schema},
};
pub use shell::{AlwaysConfirm, Confirm, Response, Session};
pub use storage::{Backend, JsonFileBackend, MemoryBackend};
