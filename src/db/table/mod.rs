pub mod column_def;
pub mod document;
pub mod row;
pub mod schema;

/// Name of the row identifier column every table starts with.
pub const ID_COLUMN: &str = "id";

/// Normalizes a user-supplied table or column name: trimmed and lowercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
