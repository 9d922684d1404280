use crate::{core::types::Value, db::predicate::Predicate};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        table: String,
        /// Raw `name:type` specs, validated by the registry.
        columns: Vec<String>,
    },
    DropTable {
        table: String,
    },
    ListTables,
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Select {
        table: String,
        filter: Option<Predicate>,
    },
    Update {
        table: String,
        set: Predicate,
        filter: Predicate,
    },
    Delete {
        table: String,
        filter: Predicate,
    },
    Info {
        table: String,
    },
    Help,
    Exit,
}

impl Command {
    /// Whether the command destroys data and should be confirmed first.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Command::DropTable { .. } | Command::Delete { .. })
    }
}
