use crate::core::types::Value;

/// A single `column = value` equality condition.
///
/// Used as the `where` clause of select, update and delete, and as the
/// `set` assignment of update. The column name is already normalized and
/// the value already typed; checking both against a schema is the
/// engine's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.column, self.value.to_literal())
    }
}
