//! An interactive session over a [`Database`].
//!
//! The session parses one line at a time, asks for confirmation before
//! destructive commands and turns each outcome into printable text. It does
//! no I/O of its own; the binary decides where lines come from and where
//! the text goes.

use tracing::{debug, info};

use crate::{
    DatabaseError,
    common::error::Warning,
    db::{database::Database, table::normalize_name},
    sql::{Command, parse_command, parser::Keyword},
    storage::Backend,
};

pub mod render;

/// Asks the user to approve a destructive command.
pub trait Confirm {
    /// Returns `true` to go ahead.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves everything. Used with `--yes` and in scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// What executing one line produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The command ran. `text` is ready to print; `warnings` are the
    /// non-fatal conditions it ran into.
    Output { text: String, warnings: Vec<Warning> },
    /// The user declined the confirmation; nothing changed.
    Cancelled,
    /// The user asked to leave.
    Exit,
}

impl Response {
    fn text(text: String) -> Self {
        Response::Output {
            text,
            warnings: Vec::new(),
        }
    }
}

const COMMANDS: [(Keyword, &str); 10] = [
    (Keyword::CreateTable, "create a table; an `id:integer` column is added first"),
    (Keyword::DropTable, "delete a table and all of its rows"),
    (Keyword::ListTables, "list every table"),
    (Keyword::Info, "show a table's columns and row count"),
    (Keyword::Insert, "add a row; the id is assigned automatically"),
    (Keyword::Select, "show rows, optionally only those matching the clause"),
    (Keyword::Update, "change the first row matching the clause"),
    (Keyword::Delete, "remove every row matching the clause"),
    (Keyword::Help, "show this help"),
    (Keyword::Exit, "leave the shell"),
];

/// Help text listing every command with its usage.
pub fn help_text() -> String {
    let mut text = String::from("Commands:\n");
    for (keyword, description) in COMMANDS {
        text.push_str(&format!("  {}\n      {description}\n", keyword.usage()));
    }
    text.push_str("Types: string (str), integer (int), boolean (bool). Quote text values.");
    text
}

/// A command session bound to one database.
pub struct Session<B: Backend, C: Confirm> {
    db: Database<B>,
    confirm: C,
    confirm_destructive: bool,
}

impl<B: Backend, C: Confirm> Session<B, C> {
    /// A session that asks `confirm` before `drop_table` and `delete`.
    pub fn new(db: Database<B>, confirm: C) -> Self {
        Self {
            db,
            confirm,
            confirm_destructive: true,
        }
    }

    /// Turns the confirmation step on or off.
    pub fn with_confirmation(mut self, enabled: bool) -> Self {
        self.confirm_destructive = enabled;
        self
    }

    pub fn database(&self) -> &Database<B> {
        &self.db
    }

    /// Parses and runs one line.
    ///
    /// Blank lines and lines starting with `#` produce `None`.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<Response>, DatabaseError> {
        let line = line.trim();
        if line.starts_with('#') {
            return Ok(None);
        }

        match parse_command(line)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Response, DatabaseError> {
        debug!(?command, "executing command");

        if command.is_destructive() && self.confirm_destructive {
            let prompt = match &command {
                Command::DropTable { table } => {
                    self.db.registry().get(table)?;
                    format!("Drop table `{table}` and all of its rows?")
                }
                Command::Delete { table, filter } => {
                    self.db.registry().get(table)?;
                    format!("Delete every row of `{table}` where {filter}?")
                }
                _ => String::new(),
            };

            if !self.confirm.confirm(&prompt) {
                info!("command cancelled by user");
                return Ok(Response::Cancelled);
            }
        }

        let response = match command {
            Command::CreateTable { table, columns } => {
                let schema = self.db.create_table(&table, &columns)?;
                Response::text(render::created(&normalize_name(&table), &schema))
            }
            Command::DropTable { table } => {
                let outcome = self.db.drop_table(&table)?;
                Response::Output {
                    text: render::dropped(&outcome),
                    warnings: outcome.warnings,
                }
            }
            Command::ListTables => Response::text(render::listing(&self.db.list_tables())),
            Command::Insert { table, values } => {
                let outcome = self.db.insert(&table, values)?;
                Response::text(render::inserted(&outcome))
            }
            Command::Select { table, filter } => {
                let result = self.db.select(&table, filter)?;
                Response::text(render::rows(&result.rows))
            }
            Command::Update { table, set, filter } => {
                let outcome = self.db.update(&table, set, filter)?;
                Response::Output {
                    text: render::updated(&outcome),
                    warnings: outcome.warnings,
                }
            }
            Command::Delete { table, filter } => {
                let outcome = self.db.delete(&table, filter)?;
                Response::Output {
                    text: render::deleted(&outcome),
                    warnings: outcome.warnings,
                }
            }
            Command::Info { table } => Response::text(render::info(&self.db.info(&table)?)),
            Command::Help => Response::text(help_text()),
            Command::Exit => Response::Exit,
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::storage::MemoryBackend;

    fn session<C: Confirm>(confirm: C) -> Session<MemoryBackend, C> {
        let db = Database::open(MemoryBackend::new()).unwrap();
        let mut session = Session::new(db, confirm);
        for line in [
            "create_table users name:str age:int",
            "insert into users values ('ann', 30)",
            "insert into users values ('bob', 25)",
        ] {
            session.execute_line(line).unwrap();
        }
        session
    }

    fn output(response: Option<Response>) -> (String, Vec<Warning>) {
        match response {
            Some(Response::Output { text, warnings }) => (text, warnings),
            other => panic!("Expected output, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_and_comment_lines_do_nothing() {
        let mut session = session(AlwaysConfirm);
        assert_eq!(session.execute_line("").unwrap(), None);
        assert_eq!(session.execute_line("  # a comment").unwrap(), None);
    }

    #[test]
    fn test_declined_delete_changes_nothing() {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&prompts);
        let mut session = session(move |prompt: &str| {
            seen.borrow_mut().push(prompt.to_string());
            false
        });

        let response = session.execute_line("delete from users where age = 30").unwrap();
        assert_eq!(response, Some(Response::Cancelled));
        assert_eq!(
            prompts.borrow().as_slice(),
            ["Delete every row of `users` where age = 30?"]
        );
        assert_eq!(
            session.database().backend().table("users").unwrap().row_count(),
            2
        );
    }

    #[test]
    fn test_confirmation_can_be_disabled() {
        let mut session = session(|_: &str| false).with_confirmation(false);
        let (text, _) = output(session.execute_line("drop_table users").unwrap());
        assert_eq!(text, "Dropped table `users`");
    }

    #[test]
    fn test_unknown_table_fails_before_asking() {
        let mut session = session(|_: &str| -> bool { panic!("should not ask") });
        let err = session.execute_line("drop_table nope").unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownTable(_)));
    }

    #[test]
    fn test_update_reports_warning() {
        let mut session = session(AlwaysConfirm);
        let (text, warnings) =
            output(session.execute_line("update users set age = 1 where name = 'zed'").unwrap());
        assert_eq!(text, "No rows updated in `users`");
        assert!(matches!(warnings[..], [Warning::NoMatch { .. }]));
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut session = session(AlwaysConfirm);
        let (text, _) = output(session.execute_line("HELP").unwrap());
        for (keyword, _) in COMMANDS {
            assert!(text.contains(keyword.usage()));
        }
    }

    #[test]
    fn test_exit() {
        let mut session = session(AlwaysConfirm);
        assert_eq!(session.execute_line("exit").unwrap(), Some(Response::Exit));
    }
}
