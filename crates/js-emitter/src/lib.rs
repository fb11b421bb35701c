//! ActionScript to JavaScript emission with integrated source maps.
//!
//! This crate walks a resolved [`CompilationUnit`](as_parser::CompilationUnit)
//! depth-first and writes JavaScript, recording a mapping before every token
//! that has a meaning in the source. It handles:
//! - Expressions and statements with per-token mappings
//! - Closure-style classes (`goog.provide`, `goog.inherits`, prototype members)
//! - `for each` loops and `&&=`/`||=`, rewritten into plain JavaScript
//! - Compile-time `int`/`uint` coercion of constant initializers
//!
//! # Example
//!
//! ```
//! use as_parser::{parse, ParseOptions};
//! use js_emitter::{emit_unit, EmitOptions};
//!
//! let parsed = parse("a % b;", &ParseOptions::new("Main.as"));
//! let result = emit_unit(&parsed.unit, &EmitOptions::default());
//! assert_eq!(result.files[0].name, "Main.js");
//! assert_eq!(result.files[0].code, "a % b;\n");
//! ```

mod coercion;
mod declarations;
mod desugar;
mod diagnostic;
mod doc;
mod emit;
mod expressions;
mod statements;
mod writer;

pub use coercion::{to_int32, to_uint32};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use emit::{emit_expression, emit_statement, emit_unit, EmitOptions, EmitResult, EmittedFile};
