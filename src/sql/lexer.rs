use std::fmt;

use crate::DatabaseError;

/// One token of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// A run of characters up to whitespace or punctuation: keywords, table
    /// names, column specs and unquoted literals alike.
    Word(&'a str),
    /// The contents of a `'...'` or `"..."` literal, without the quotes.
    Quoted(&'a str),

    Comma,
    Equal,
    LeftParen,
    RightParen,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "`{word}`"),
            Token::Quoted(text) => write!(f, "'{text}'"),
            Token::Comma => write!(f, "`,`"),
            Token::Equal => write!(f, "`=`"),
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
        }
    }
}

fn is_punctuation(c: char) -> bool {
    matches!(c, ',' | '=' | '(' | ')' | '\'' | '"')
}

pub struct Lexer<'a> {
    rest: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: 0,
        }
    }

    /// Tokenizes the whole input, stopping at the first error.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token<'a>>, DatabaseError> {
        Lexer::new(input).collect()
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let consumed = &self.rest[..len];
        self.position += len;
        self.rest = &self.rest[len..];
        consumed
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn consume_word(&mut self) -> &'a str {
        let word_end = self
            .rest
            .find(|c: char| c.is_whitespace() || is_punctuation(c))
            .unwrap_or(self.rest.len());

        self.advance(word_end)
    }

    fn consume_string(&mut self, closing: char) -> Result<&'a str, DatabaseError> {
        let start = self.position;
        let body = &self.rest[1..];

        let Some(end) = body.find(closing) else {
            return Err(DatabaseError::InvalidCommand(format!(
                "unterminated string starting at position {start}"
            )));
        };

        self.advance(1);
        let text = self.advance(end);
        self.advance(closing.len_utf8());

        Ok(text)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, DatabaseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let char = self.rest.chars().next()?;

        let token = match char {
            ',' => {
                self.advance(1);
                Ok(Token::Comma)
            }
            '=' => {
                self.advance(1);
                Ok(Token::Equal)
            }
            '(' => {
                self.advance(1);
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance(1);
                Ok(Token::RightParen)
            }
            '\'' | '"' => self.consume_string(char).map(Token::Quoted),
            _ => Ok(Token::Word(self.consume_word())),
        };

        Some(token)
    }
}
