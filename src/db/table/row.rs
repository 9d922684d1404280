use super::document::TableDocument;
use crate::core::types::Value;

/// One row of a [`TableDocument`].
///
/// Documents keep their values column by column, so a row is only a
/// position shared by every column. Values are read in schema order, `id`
/// first.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    document: &'a TableDocument,
    index: usize,
}

impl<'a> Row<'a> {
    pub(crate) fn new(document: &'a TableDocument, index: usize) -> Self {
        Self { document, index }
    }

    /// Position of the row within its document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value stored under `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.document.column(column)?.get(self.index)
    }

    pub fn values(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let index = self.index;
        self.document
            .columns()
            .filter_map(move |(_, values)| values.get(index))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.values().cloned().collect()
    }
}
