//! The line-oriented command language.

pub mod lexer;
pub mod parser;

pub use parser::{Command, CommandParser, parse_command};
