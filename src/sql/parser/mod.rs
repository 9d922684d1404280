use std::{iter::Peekable, str::FromStr, vec};

use crate::{
    DatabaseError,
    core::types::Value,
    db::{predicate::Predicate, table::normalize_name},
    sql::lexer::{Lexer, Token},
};

pub use command::Command;
pub use keyword::Keyword;
pub use literal::resolve_literal;

pub mod command;
pub mod keyword;
pub mod literal;

/// Parser that turns one command line into a [`Command`].
///
/// The whole line is tokenized up front; the parser then walks the tokens
/// with one token of lookahead.
pub struct CommandParser<'src> {
    tokens: Peekable<vec::IntoIter<Token<'src>>>,
    /// Keyword of the command being parsed, for usage hints in errors.
    command: Option<Keyword>,
}

impl<'src> CommandParser<'src> {
    pub fn new(line: &'src str) -> Result<Self, DatabaseError> {
        Ok(Self {
            tokens: Lexer::tokenize(line)?.into_iter().peekable(),
            command: None,
        })
    }

    /// Parses a full command. Returns `None` for a blank line.
    pub fn parse(&mut self) -> Result<Option<Command>, DatabaseError> {
        if self.tokens.peek().is_none() {
            return Ok(None);
        }

        let keyword = match self.next_token()? {
            Token::Word(word) => Keyword::from_str(word)
                .map_err(|_| DatabaseError::InvalidCommand(format!("unknown command `{word}`")))?,
            other => {
                return Err(DatabaseError::InvalidCommand(format!(
                    "expected a command, found {other}"
                )));
            }
        };
        self.command = Some(keyword);

        let command = match keyword {
            Keyword::CreateTable => self.parse_create_table()?,
            Keyword::DropTable => Command::DropTable {
                table: self.expect_table()?,
            },
            Keyword::ListTables => Command::ListTables,
            Keyword::Info => Command::Info {
                table: self.expect_table()?,
            },
            Keyword::Insert => self.parse_insert()?,
            Keyword::Select => self.parse_select()?,
            Keyword::Update => self.parse_update()?,
            Keyword::Delete => self.parse_delete()?,
            Keyword::Help => Command::Help,
            Keyword::Exit => Command::Exit,
            Keyword::Into | Keyword::Values | Keyword::From | Keyword::Where | Keyword::Set => {
                return Err(DatabaseError::InvalidCommand(format!(
                    "`{keyword}` cannot start a command"
                )));
            }
        };

        if let Some(extra) = self.tokens.next() {
            return Err(self.error(format!("unexpected {extra} after the command")));
        }

        Ok(Some(command))
    }

    fn parse_create_table(&mut self) -> Result<Command, DatabaseError> {
        let table = self.expect_table()?;

        let mut columns = Vec::new();
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Word(spec) => columns.push(spec.to_string()),
                Token::Comma => {}
                other => return Err(self.error(format!("expected a column spec, found {other}"))),
            }
        }

        Ok(Command::CreateTable { table, columns })
    }

    fn parse_insert(&mut self) -> Result<Command, DatabaseError> {
        self.expect_keyword(Keyword::Into)?;
        let table = self.expect_table()?;
        self.expect_keyword(Keyword::Values)?;

        Ok(Command::Insert {
            table,
            values: self.parse_tuple()?,
        })
    }

    fn parse_select(&mut self) -> Result<Command, DatabaseError> {
        // `select * from t` reads naturally; the star is accepted and ignored.
        if matches!(self.tokens.peek(), Some(Token::Word("*"))) {
            self.tokens.next();
        }
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_table()?;

        let filter = if self.tokens.peek().is_some() {
            self.expect_keyword(Keyword::Where)?;
            Some(self.parse_clause()?)
        } else {
            None
        };

        Ok(Command::Select { table, filter })
    }

    fn parse_update(&mut self) -> Result<Command, DatabaseError> {
        let table = self.expect_table()?;
        self.expect_keyword(Keyword::Set)?;
        let set = self.parse_clause()?;
        self.expect_keyword(Keyword::Where)?;
        let filter = self.parse_clause()?;

        Ok(Command::Update { table, set, filter })
    }

    fn parse_delete(&mut self) -> Result<Command, DatabaseError> {
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_table()?;
        self.expect_keyword(Keyword::Where)?;

        Ok(Command::Delete {
            table,
            filter: self.parse_clause()?,
        })
    }

    /// `( literal {, literal} )`
    fn parse_tuple(&mut self) -> Result<Vec<Value>, DatabaseError> {
        self.expect_token(Token::LeftParen)?;

        let mut values = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::RightParen && values.is_empty() {
                return Err(self.error("an insert needs at least one value"));
            }
            values.push(resolve_literal(&token)?);

            match self.next_token()? {
                Token::Comma => continue,
                Token::RightParen => break,
                other => return Err(self.error(format!("expected `,` or `)`, found {other}"))),
            }
        }

        Ok(values)
    }

    /// `column = literal`
    fn parse_clause(&mut self) -> Result<Predicate, DatabaseError> {
        let column = match self.next_token()? {
            Token::Word(word) => normalize_name(word),
            other => return Err(self.error(format!("expected a column name, found {other}"))),
        };
        self.expect_token(Token::Equal)?;
        let value = resolve_literal(&self.next_token()?)?;

        Ok(Predicate::new(column, value))
    }

    fn next_token(&mut self) -> Result<Token<'src>, DatabaseError> {
        self.tokens
            .next()
            .ok_or_else(|| self.error("unexpected end of command"))
    }

    fn expect_token(&mut self, expected: Token<'src>) -> Result<(), DatabaseError> {
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected}, found {token}")))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<(), DatabaseError> {
        match self.next_token()? {
            Token::Word(word) if Keyword::from_str(word).ok() == Some(expected) => Ok(()),
            other => Err(self.error(format!("expected `{expected}`, found {other}"))),
        }
    }

    fn expect_table(&mut self) -> Result<String, DatabaseError> {
        match self.next_token()? {
            Token::Word(word) => Ok(word.to_string()),
            other => Err(self.error(format!("expected a table name, found {other}"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> DatabaseError {
        let message = message.into();
        match self.command {
            Some(keyword) => {
                DatabaseError::InvalidCommand(format!("{message}; usage: {}", keyword.usage()))
            }
            None => DatabaseError::InvalidCommand(message),
        }
    }
}

/// Parses one command line. Returns `None` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, DatabaseError> {
    CommandParser::new(line)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line)
            .expect("Failed to parse command")
            .expect("Expected a command")
    }

    fn parse_err(line: &str) -> DatabaseError {
        parse_command(line).expect_err("Expected a parse error")
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_create_table() {
        assert_eq!(
            parse("create_table users name:str, age:int"),
            Command::CreateTable {
                table: "users".to_string(),
                columns: vec!["name:str".to_string(), "age:int".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("LIST_TABLES"), Command::ListTables);
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("quit"), Command::Exit);
        assert_eq!(
            parse("drop_table users"),
            Command::DropTable { table: "users".to_string() }
        );
        assert_eq!(
            parse("info users"),
            Command::Info { table: "users".to_string() }
        );
    }

    #[test]
    fn test_parse_insert() {
        assert_eq!(
            parse("insert into users values ('ann', 30, TRUE)"),
            Command::Insert {
                table: "users".to_string(),
                values: vec![text("ann"), Value::Integer(30), Value::Boolean(true)],
            }
        );
        assert_eq!(
            parse("insert into t values (1)"),
            Command::Insert {
                table: "t".to_string(),
                values: vec![Value::Integer(1)],
            }
        );
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            parse("select from users"),
            Command::Select { table: "users".to_string(), filter: None }
        );
        assert_eq!(
            parse("SELECT * FROM users WHERE Age = 30"),
            Command::Select {
                table: "users".to_string(),
                filter: Some(Predicate::new("age", Value::Integer(30))),
            }
        );
    }

    #[test]
    fn test_parse_update_and_delete() {
        assert_eq!(
            parse("update users set name = 'zed' where id = 2"),
            Command::Update {
                table: "users".to_string(),
                set: Predicate::new("name", text("zed")),
                filter: Predicate::new("id", Value::Integer(2)),
            }
        );
        assert_eq!(
            parse("delete from users where active = false"),
            Command::Delete {
                table: "users".to_string(),
                filter: Predicate::new("active", Value::Boolean(false)),
            }
        );
    }

    #[test]
    fn test_parse_errors_carry_usage() {
        let err = parse_err("delete users where id = 1");
        assert!(matches!(
            err,
            DatabaseError::InvalidCommand(msg) if msg.contains("usage: delete from <table>")
        ));

        let err = parse_err("update users set name = 'a'");
        assert!(matches!(err, DatabaseError::InvalidCommand(msg) if msg.contains("end of command")));
    }

    #[test]
    fn test_parse_rejects_unknown_and_trailing() {
        assert!(matches!(parse_err("frobnicate"), DatabaseError::InvalidCommand(_)));
        assert!(matches!(parse_err("where x = 1"), DatabaseError::InvalidCommand(_)));
        assert!(matches!(parse_err("list_tables now"), DatabaseError::InvalidCommand(_)));
        assert!(matches!(parse_err("insert into t values ()"), DatabaseError::InvalidCommand(_)));
    }

    #[test]
    fn test_parse_literal_errors_pass_through() {
        assert!(matches!(
            parse_err("select from t where x = 1.5"),
            DatabaseError::UnsupportedType(_)
        ));
        assert!(matches!(
            parse_err("select from t where name = ann"),
            DatabaseError::InvalidCommand(_)
        ));
    }
}
