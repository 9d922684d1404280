use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Column types supported by Skiff DB.
///
/// The persisted spelling is the lowercase long form (`string`, `integer`,
/// `boolean`). When parsing a column spec the short forms `str`, `int` and
/// `bool` are accepted as well, in any case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// UTF-8 text.
    #[strum(to_string = "string", serialize = "str", serialize = "text")]
    #[serde(rename = "string", alias = "str", alias = "text")]
    Text,

    /// 64-bit signed integer.
    #[strum(to_string = "integer", serialize = "int")]
    #[serde(alias = "int")]
    Integer,

    /// Boolean true/false value.
    #[strum(to_string = "boolean", serialize = "bool")]
    #[serde(alias = "bool")]
    Boolean,
}

/// A value that can be stored in a table column.
///
/// Serialized untagged so a table document holds plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Boolean(bool),

    /// A 64-bit signed integer value.
    Integer(i64),

    /// A UTF-8 text string.
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl Value {
    /// Returns the column type this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Checks if this value can be stored in a column of the given type.
    ///
    /// There is no coercion between types: `5` is not a string and `'5'` is
    /// not an integer.
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        self.data_type() == data_type
    }

    /// Renders the value the way it would be typed in a command.
    ///
    /// Text is quoted so `'5'` and `5` stay distinguishable in messages.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Text(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}
