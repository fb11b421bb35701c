//! Unit-level emission: output files, headers and the public entry points.

use crate::diagnostic::{Diagnostic, Severity};
use crate::writer::Emitter;
use as_parser::{ClassDecl, CompilationUnit, Expr, Stmt, StmtKind};
use source_map::{MappingTable, SourceMapV3};

/// Options for emitting one unit. Immutable for the duration of a unit.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Extension of generated files, without the dot.
    pub target_file_extension: String,
    /// Precede declarations with `// path:line` comments and document
    /// functions with JSDoc.
    pub emit_debug_comments: bool,
    /// Write every class to its own file.
    pub output_isolated_per_class: bool,
    /// `sourceRoot` of the generated maps.
    pub source_root: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target_file_extension: "js".to_string(),
            emit_debug_comments: false,
            output_isolated_per_class: false,
            source_root: String::new(),
        }
    }
}

impl EmitOptions {
    /// `<stem>.<ext>`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.target_file_extension)
    }
}

/// One generated file with its mappings.
#[derive(Debug, Clone)]
pub struct EmittedFile {
    /// File name relative to the output directory.
    pub name: String,
    pub code: String,
    pub mappings: MappingTable,
    pub source_map: SourceMapV3,
}

/// The result of emitting a unit.
#[derive(Debug, Default)]
pub struct EmitResult {
    pub files: Vec<EmittedFile>,
    /// Problems found while emitting; the files are written regardless.
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, (file, diagnostics): (EmittedFile, Vec<Diagnostic>)) {
        self.files.push(file);
        self.diagnostics.extend(diagnostics);
    }
}

/// Emits a resolved unit as JavaScript with source maps.
pub fn emit_unit(unit: &CompilationUnit, options: &EmitOptions) -> EmitResult {
    let _span = tracing::debug_span!("emit_unit", path = %unit.path).entered();
    let mut result = EmitResult::default();

    if options.output_isolated_per_class {
        for class in unit.classes() {
            let mut emitter = Emitter::new(unit, options);
            emitter.emit_header(&[class]);
            emitter.write_debug_comment(class.loc.start_line);
            emitter.emit_class(class);
            emitter.write("\n");
            result.push(emitter.finish(options.file_name(&class.qualified_name)));
        }

        let rest: Vec<&Stmt> = unit
            .body
            .iter()
            .filter(|stmt| !matches!(stmt.kind, StmtKind::Class(_) | StmtKind::Import(_)))
            .collect();
        if !rest.is_empty() {
            let mut emitter = Emitter::new(unit, options);
            emitter.emit_top_level(rest);
            result.push(emitter.finish(options.file_name(unit.stem())));
        }
    } else {
        let classes: Vec<&ClassDecl> = unit.classes().collect();
        let mut emitter = Emitter::new(unit, options);
        emitter.emit_header(&classes);
        emitter.emit_top_level(unit.body.iter());
        result.push(emitter.finish(options.file_name(unit.stem())));
    }

    tracing::debug!(
        files = result.files.len(),
        diagnostics = result.diagnostics.len(),
        "emitted unit"
    );
    result
}

/// Emits a single expression of `unit` into a file of its own.
pub fn emit_expression(unit: &CompilationUnit, expr: &Expr, options: &EmitOptions) -> EmitResult {
    let mut emitter = Emitter::new(unit, options);
    emitter.emit_expr(expr);
    let mut result = EmitResult::default();
    result.push(emitter.finish(options.file_name(unit.stem())));
    result
}

/// Emits a single statement of `unit` into a file of its own.
pub fn emit_statement(unit: &CompilationUnit, stmt: &Stmt, options: &EmitOptions) -> EmitResult {
    let mut emitter = Emitter::new(unit, options);
    emitter.emit_stmt(stmt);
    let mut result = EmitResult::default();
    result.push(emitter.finish(options.file_name(unit.stem())));
    result
}

impl Emitter<'_> {
    /// `goog.provide` for each class and `goog.require` for each import,
    /// followed by a blank line. Nothing when there are no classes.
    fn emit_header(&mut self, classes: &[&ClassDecl]) {
        if classes.is_empty() {
            return;
        }
        for class in classes {
            self.write(&format!("goog.provide('{}');\n", class.qualified_name));
        }
        let unit = self.unit;
        for stmt in &unit.body {
            if let StmtKind::Import(import) = &stmt.kind {
                if !import.name.ends_with('*') {
                    self.write_mapped("goog.require(", &import.loc);
                    self.write(&format!("'{}');\n", import.name));
                }
            }
        }
        self.write("\n");
    }

    /// Top-level statements, each terminated by a line break.
    fn emit_top_level<'s>(&mut self, stmts: impl IntoIterator<Item = &'s Stmt>) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Import(_) => continue,
                StmtKind::Class(_) | StmtKind::Function(_) | StmtKind::Var(_) => {
                    self.write_debug_comment(stmt.loc.start_line)
                }
                _ => {}
            }
            self.emit_stmt(stmt);
            self.write("\n");
        }
    }
}
