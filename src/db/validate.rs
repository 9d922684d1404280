//! Checks shared by the engine operations.
//!
//! Each returns the first problem found and never touches a document, so
//! an operation can run all of them before mutating anything.

use crate::{
    DatabaseError,
    core::types::{DataType, Value},
    db::{predicate::Predicate, table::schema::Schema},
};

/// Every named column must exist in `schema`. All missing names are
/// reported together.
pub(crate) fn columns_exist(
    table: &str,
    schema: &Schema,
    columns: &[&str],
) -> Result<(), DatabaseError> {
    let mut missing: Vec<String> = Vec::new();
    for column in columns {
        if schema.column(column).is_none() && !missing.iter().any(|m| m == *column) {
            missing.push((*column).to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::UnknownColumn {
            table: table.to_string(),
            columns: missing,
        })
    }
}

/// The predicate's value must have the type of its column.
///
/// Assumes the column exists; run [`columns_exist`] first.
pub(crate) fn predicate_type(schema: &Schema, predicate: &Predicate) -> Result<(), DatabaseError> {
    match schema.column(&predicate.column) {
        Some(column) => value_type(&column.name, column.data_type, &predicate.value),
        None => Ok(()),
    }
}

/// An insert tuple must supply exactly one value per non-id column, each
/// of that column's type.
pub(crate) fn insert_tuple(
    table: &str,
    schema: &Schema,
    values: &[Value],
) -> Result<(), DatabaseError> {
    if values.len() != schema.arity() {
        return Err(DatabaseError::ArityMismatch {
            table: table.to_string(),
            expected: schema.arity(),
            found: values.len(),
        });
    }

    for (column, value) in schema.data_columns().iter().zip(values) {
        value_type(&column.name, column.data_type, value)?;
    }

    Ok(())
}

fn value_type(
    column: &str,
    expected: DataType,
    value: &Value,
) -> Result<(), DatabaseError> {
    if value.is_compatible_with(expected) {
        Ok(())
    } else {
        Err(DatabaseError::TypeMismatch {
            column: column.to_string(),
            value: value.to_literal(),
            expected,
            found: value.data_type(),
        })
    }
}
