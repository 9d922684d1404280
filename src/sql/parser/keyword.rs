use strum::{Display, EnumString};

/// Words with a fixed meaning in a command line.
///
/// Matched case-insensitively; anything else is a table name, a column
/// spec or a literal depending on where it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum Keyword {
    CreateTable,
    DropTable,
    ListTables,
    Info,

    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,

    Help,
    #[strum(to_string = "exit", serialize = "quit")]
    Exit,
}

impl Keyword {
    /// How the command started by this keyword is written.
    pub fn usage(self) -> &'static str {
        match self {
            Self::CreateTable => "create_table <table> <column>:<type> ...",
            Self::DropTable => "drop_table <table>",
            Self::ListTables => "list_tables",
            Self::Info => "info <table>",
            Self::Insert => "insert into <table> values (<value>, ...)",
            Self::Select => "select from <table> [where <column> = <value>]",
            Self::Update => "update <table> set <column> = <value> where <column> = <value>",
            Self::Delete => "delete from <table> where <column> = <value>",
            Self::Help => "help",
            Self::Exit => "exit",
            Self::Into | Self::Values | Self::From | Self::Where | Self::Set => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Keyword::from_str("CREATE_TABLE").unwrap(), Keyword::CreateTable);
        assert_eq!(Keyword::from_str("Where").unwrap(), Keyword::Where);
        assert_eq!(Keyword::from_str("quit").unwrap(), Keyword::Exit);
        assert!(Keyword::from_str("users").is_err());
    }

    #[test]
    fn test_keyword_display_is_snake_case() {
        assert_eq!(Keyword::ListTables.to_string(), "list_tables");
        assert_eq!(Keyword::Exit.to_string(), "exit");
    }
}
