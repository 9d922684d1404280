use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ID_COLUMN, row::Row, schema::Schema};
use crate::core::types::Value;

/// Column-oriented storage for one table.
///
/// Maps each column name to the sequence of its values. Every sequence has
/// the same length; row `i` is the tuple of the `i`-th value of each
/// column. The methods here keep that invariant, so callers never touch
/// the sequences directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableDocument {
    columns: IndexMap<String, Vec<Value>>,
}

impl TableDocument {
    /// An empty document shaped like `schema`: one empty sequence per
    /// column.
    pub fn empty(schema: &Schema) -> Self {
        let columns = schema
            .column_names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

        Self { columns }
    }

    /// Number of rows. All columns share this length.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Iterates the `(column, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// The id of the row at `index`, if the row exists.
    pub fn id_at(&self, index: usize) -> Option<i64> {
        self.columns
            .get(ID_COLUMN)
            .and_then(|ids| ids.get(index))
            .and_then(Value::as_integer)
    }

    /// The id the next inserted row receives: one past the largest id
    /// present, or 1 for an empty table.
    pub fn next_id(&self) -> i64 {
        self.columns
            .get(ID_COLUMN)
            .into_iter()
            .flatten()
            .filter_map(Value::as_integer)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Indices of every row whose `column` equals `value`, ascending.
    ///
    /// An unknown column matches nothing.
    pub fn find_indices(&self, column: &str, value: &Value) -> Vec<usize> {
        self.columns
            .get(column)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| *v == value)
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A new document holding the rows at `indices`, in the order given.
    pub fn project(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let picked = indices
                    .iter()
                    .filter_map(|&idx| values.get(idx).cloned())
                    .collect();
                (name.clone(), picked)
            })
            .collect();

        Self { columns }
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count()).then(|| Row::new(self, index))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.row_count()).map(move |index| Row::new(self, index))
    }

    /// Appends one value to every column.
    ///
    /// `values` must already be validated against the schema and be in
    /// column order, id first.
    pub(crate) fn push_row(&mut self, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.columns.len());
        for (column, value) in self.columns.values_mut().zip(values) {
            column.push(value);
        }
    }

    /// Replaces one cell. Returns false if the column or row is missing.
    pub(crate) fn set_value(&mut self, column: &str, index: usize, value: Value) -> bool {
        match self.columns.get_mut(column).and_then(|c| c.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Removes the row at `index` from every column.
    pub(crate) fn remove_row(&mut self, index: usize) {
        for values in self.columns.values_mut() {
            if index < values.len() {
                values.remove(index);
            }
        }
    }

    /// Checks the structural invariant: all columns are the same length.
    pub fn check_lengths(&self) -> Result<(), String> {
        let expected = self.row_count();
        match self.columns.iter().find(|(_, v)| v.len() != expected) {
            Some((name, values)) => Err(format!(
                "column `{name}` has {} value(s), expected {expected}",
                values.len()
            )),
            None => Ok(()),
        }
    }

    /// Checks that the document has exactly the schema's columns, in order,
    /// with values of the declared types.
    pub fn check_against(&self, schema: &Schema) -> Result<(), String> {
        self.check_lengths()?;

        if !self.column_names().eq(schema.column_names()) {
            return Err(format!(
                "columns [{}] do not match the schema [{}]",
                self.column_names().collect::<Vec<_>>().join(", "),
                schema.column_names().collect::<Vec<_>>().join(", "),
            ));
        }

        for (column, (name, values)) in schema.columns.iter().zip(self.columns()) {
            if let Some(bad) = values.iter().find(|v| !v.is_compatible_with(column.data_type)) {
                return Err(format!(
                    "column `{name}` holds {} which is not {}",
                    bad.to_literal(),
                    column.data_type
                ));
            }
        }

        Ok(())
    }
}
