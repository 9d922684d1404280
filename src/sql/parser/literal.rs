use crate::{
    DatabaseError,
    core::types::Value,
    sql::lexer::Token,
};

/// Turns a literal token into a typed value.
///
/// Quoted text is a string. An unquoted word is a boolean if it reads
/// `true` or `false` in any case, otherwise an integer if it is a base-10
/// signed whole number. Floats and null literals are recognized only to be
/// rejected with [`DatabaseError::UnsupportedType`].
pub fn resolve_literal(token: &Token<'_>) -> Result<Value, DatabaseError> {
    let word = match token {
        Token::Quoted(text) => return Ok(Value::Text(text.to_string())),
        Token::Word(word) => *word,
        other => {
            return Err(DatabaseError::InvalidCommand(format!(
                "expected a value, found {other}"
            )));
        }
    };

    if word.eq_ignore_ascii_case("true") {
        return Ok(Value::Boolean(true));
    }
    if word.eq_ignore_ascii_case("false") {
        return Ok(Value::Boolean(false));
    }

    if let Ok(int) = word.parse::<i64>() {
        return Ok(Value::Integer(int));
    }

    if word.eq_ignore_ascii_case("null") || word.eq_ignore_ascii_case("none") {
        return Err(DatabaseError::UnsupportedType(format!("null ({word})")));
    }

    if is_number_like(word) {
        if word.contains(['.', 'e', 'E']) && word.parse::<f64>().is_ok() {
            return Err(DatabaseError::UnsupportedType(format!("float ({word})")));
        }
        return Err(DatabaseError::InvalidCommand(format!(
            "`{word}` is not a valid integer"
        )));
    }

    Err(DatabaseError::InvalidCommand(format!(
        "`{word}` is not a value; quote text, e.g. '{word}'"
    )))
}

fn is_number_like(word: &str) -> bool {
    let digits = word.strip_prefix(['-', '+']).unwrap_or(word);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits.contains(|c: char| c.is_ascii_digit())
}
