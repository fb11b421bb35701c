//! ActionScript front end for asjs.
//!
//! This crate turns source text into a resolved [`CompilationUnit`]:
//! - Lexer (tokenizer) using `logos`
//! - Recursive descent parser with error recovery
//! - A resolver that attaches static types and bindings to identifiers
//!
//! Every node carries a [`SourceLocation`](source_map::SourceLocation) with
//! zero-based lines and character columns.
//!
//! # Example
//!
//! ```
//! use as_parser::{parse, ParseOptions};
//!
//! let result = parse("var a:int = 42;", &ParseOptions::new("Main.as"));
//! assert!(result.errors.is_empty());
//! assert_eq!(result.unit.body.len(), 1);
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod resolve;
mod types;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use types::{StaticType, TypeAnnotation};

use smol_str::SmolStr;

/// Options for parsing one unit.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Path recorded in every location of the unit.
    pub path: SmolStr,
}

impl ParseOptions {
    pub fn new(path: impl Into<SmolStr>) -> Self {
        Self { path: path.into() }
    }
}

/// The result of parsing a unit.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    /// Errors encountered; the unit is still usable.
    pub errors: Vec<ParseError>,
}

/// Parses and resolves a unit, recovering from errors where possible.
pub fn parse(source: &str, options: &ParseOptions) -> ParseResult {
    let mut result = parser::Parser::new(source, options).parse();
    resolve::resolve(&mut result.unit);
    tracing::debug!(
        path = %options.path,
        statements = result.unit.body.len(),
        errors = result.errors.len(),
        "parsed unit"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("", &ParseOptions::default());
        assert!(result.errors.is_empty());
        assert!(result.unit.body.is_empty());
    }

    #[test]
    fn test_locations_carry_path() {
        let result = parse("x;", &ParseOptions::new("src/Main.as"));
        assert_eq!(result.unit.body[0].loc.path, "src/Main.as");
        assert_eq!(result.unit.stem(), "Main");
    }
}
