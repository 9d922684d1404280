use std::str::FromStr;

use crate::{DatabaseError, core::types::DataType};

/// Definition of a single column in a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// The column name, always lowercase.
    pub name: String,

    /// The data type for values in this column.
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_owned(),
            data_type,
        }
    }

    /// The implicit row identifier column every table starts with.
    pub fn id() -> Self {
        Self::new(super::ID_COLUMN, DataType::Integer)
    }

    /// Parses a `name:type` column spec.
    ///
    /// The spec is trimmed and lowercased first. The name must be an
    /// identifier and the type one of the supported type names.
    pub fn parse_spec(spec: &str) -> Result<Self, DatabaseError> {
        let normalized = spec.trim().to_lowercase();

        let invalid = |reason: &str| DatabaseError::InvalidColumnSpec {
            spec: normalized.clone(),
            reason: reason.to_string(),
        };

        let Some((name, type_name)) = normalized.split_once(':') else {
            return Err(invalid("missing `:` between name and type"));
        };

        if type_name.contains(':') {
            return Err(invalid("expected exactly one `:`"));
        }

        if !is_identifier(name) {
            return Err(invalid("column names must start with a letter or `_`"));
        }

        if type_name.is_empty() {
            return Err(invalid("missing type"));
        }

        let data_type = DataType::from_str(type_name)
            .map_err(|_| DatabaseError::UnsupportedType(type_name.to_string()))?;

        Ok(Self::new(name, data_type))
    }
}

impl std::fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.data_type)
    }
}

/// Returns true for ASCII identifiers: a letter or `_`, then letters,
/// digits or `_`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spec_normalizes() {
        let col = ColumnDef::parse_spec("  Age:INT ").unwrap();
        assert_eq!(col, ColumnDef::new("age", DataType::Integer));
    }

    #[test]
    fn test_parse_spec_rejects_missing_colon() {
        let err = ColumnDef::parse_spec("age").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidColumnSpec { .. }));
    }

    #[test]
    fn test_parse_spec_rejects_extra_colon() {
        let err = ColumnDef::parse_spec("age:int:int").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidColumnSpec { .. }));
    }

    #[test]
    fn test_parse_spec_rejects_bad_name() {
        let err = ColumnDef::parse_spec("1st:int").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidColumnSpec { .. }));

        let err = ColumnDef::parse_spec(":int").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidColumnSpec { .. }));
    }

    #[test]
    fn test_parse_spec_rejects_unknown_type() {
        let err = ColumnDef::parse_spec("price:float").unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedType(t) if t == "float"));
    }

    #[test]
    fn test_display_uses_canonical_type() {
        let col = ColumnDef::parse_spec("name:str").unwrap();
        assert_eq!(col.to_string(), "name:string");
    }
}
