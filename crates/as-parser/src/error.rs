//! Parse error types.

use source_map::Span;
use thiserror::Error;

/// An error found while parsing, with the span it was reported at.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("invalid token {text:?}")]
    InvalidToken { text: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("class member {name} is declared more than once")]
    DuplicateMember { name: String },

    #[error("{message}")]
    SyntaxError { message: String },
}
