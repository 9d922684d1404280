use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ID_COLUMN, column_def::ColumnDef};
use crate::{DatabaseError, core::types::DataType};

/// A table schema defining the structure of rows.
///
/// A schema is an ordered list of column definitions whose first entry is
/// always `id:integer`. On disk it is a JSON object mapping column name to
/// type name, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, DataType>",
    into = "IndexMap<String, DataType>"
)]
pub struct Schema {
    /// The ordered list of column definitions.
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Builds a schema from `name:type` specs.
    ///
    /// Every spec is parsed first, so a malformed spec or unknown type is
    /// reported before duplicate names are. An `id` column is injected at
    /// the front when missing and moved there when declared elsewhere. A
    /// table needs at least one column besides `id`.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, DatabaseError> {
        let mut columns = specs
            .iter()
            .map(|spec| ColumnDef::parse_spec(spec.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DatabaseError::DuplicateColumn(column.name.clone()));
            }
        }

        match columns.iter().position(|c| c.name == ID_COLUMN) {
            Some(idx) => {
                let id = columns.remove(idx);
                if id.data_type != DataType::Integer {
                    return Err(DatabaseError::InvalidColumnSpec {
                        spec: id.to_string(),
                        reason: "the `id` column must be an integer".to_string(),
                    });
                }
                columns.insert(0, id);
            }
            None => columns.insert(0, ColumnDef::id()),
        }

        if columns.len() < 2 {
            let given: Vec<&str> = specs.iter().map(|spec| spec.as_ref()).collect();
            return Err(DatabaseError::InvalidColumnSpec {
                spec: given.join(" "),
                reason: "a table needs at least one column besides `id`".to_string(),
            });
        }

        Ok(Self { columns })
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// The columns a user supplies values for, i.e. everything but `id`.
    pub fn data_columns(&self) -> &[ColumnDef] {
        self.columns.get(1..).unwrap_or_default()
    }

    /// Number of values an insert must supply.
    pub fn arity(&self) -> usize {
        self.data_columns().len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl TryFrom<IndexMap<String, DataType>> for Schema {
    type Error = String;

    fn try_from(map: IndexMap<String, DataType>) -> Result<Self, Self::Error> {
        match map.first() {
            Some((name, DataType::Integer)) if name == ID_COLUMN => {}
            _ => return Err("first column must be `id` of type integer".to_string()),
        }

        let columns = map
            .into_iter()
            .map(|(name, data_type)| ColumnDef { name, data_type })
            .collect();

        Ok(Self { columns })
    }
}

impl From<Schema> for IndexMap<String, DataType> {
    fn from(schema: Schema) -> Self {
        schema
            .columns
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect()
    }
}
