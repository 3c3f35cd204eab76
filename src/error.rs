use std::fmt;

use crate::lexer::LexError;

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Raised by the scanner
    Lexical(LexError),

    /// Malformed input: mismatched brackets, wrong arity to a built-in,
    /// an unexpected token, an incomplete expression, or an invalid `.`
    Syntax(String),

    /// The parser's stacks ended up in an impossible state
    Internal(String),
}

impl ParseError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        ParseError::Syntax(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        ParseError::Internal(msg.into())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lexical(e) => write!(f, "Lexical error: {}", e),
            ParseError::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            ParseError::Internal(msg) => write!(f, "Internal parser error: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lexical(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lexical(e)
    }
}

pub type PResult<T> = Result<T, ParseError>;
