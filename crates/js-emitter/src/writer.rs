//! Per-unit emission state.

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::emit::{EmitOptions, EmittedFile};
use as_parser::CompilationUnit;
use smol_str::SmolStr;
use source_map::{MappingRecorder, SourceLocation, SourceMapV3, TextSink};

/// Writes generated text and records a mapping before every token that has a
/// meaning in the source.
///
/// One emitter produces one output file. It is never shared between units or
/// threads.
pub(crate) struct Emitter<'a> {
    pub(crate) unit: &'a CompilationUnit,
    pub(crate) options: &'a EmitOptions,
    sink: TextSink,
    recorder: MappingRecorder,
    indent: usize,
    /// For-each counters, innermost function last.
    foreach_counters: Vec<u32>,
    /// Qualified name of the class being emitted.
    pub(crate) class: Option<SmolStr>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(unit: &'a CompilationUnit, options: &'a EmitOptions) -> Self {
        Self {
            unit,
            options,
            sink: TextSink::new(),
            recorder: MappingRecorder::new(),
            indent: 0,
            foreach_counters: vec![0],
            class: None,
            diagnostics: Vec::new(),
        }
    }

    /// A scratch emitter for rendering a node a second time. Its mappings and
    /// diagnostics are discarded.
    pub(crate) fn detached(&self) -> Emitter<'a> {
        let mut scratch = Emitter::new(self.unit, self.options);
        scratch.class = self.class.clone();
        scratch
    }

    /// Writes unmapped text.
    #[inline]
    pub(crate) fn write(&mut self, text: &str) {
        self.sink.write(text);
    }

    /// Records the current position against the start of `original`, then
    /// writes `text`.
    pub(crate) fn write_mapped(&mut self, text: &str, original: &SourceLocation) {
        self.recorder.record_range(original, self.sink.position());
        self.sink.write(text);
    }

    /// Like [`Emitter::write_mapped`] for a token whose text differs from the
    /// source name it stands for.
    pub(crate) fn write_named(&mut self, text: &str, original: &SourceLocation, name: &str) {
        let generated = self.sink.position();
        let name = (text != name).then_some(name);
        self.recorder.record(generated, original, name);
        self.sink.write(text);
    }

    /// Starts a new line at the current indentation.
    pub(crate) fn newline(&mut self) {
        self.sink.write("\n");
        for _ in 0..self.indent {
            self.sink.write("  ");
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn enter_function(&mut self) {
        self.foreach_counters.push(0);
    }

    pub(crate) fn exit_function(&mut self) {
        if self.foreach_counters.len() > 1 {
            self.foreach_counters.pop();
        }
    }

    /// Next `foreachiter<N>` name of the enclosing function.
    pub(crate) fn next_foreach_name(&mut self) -> String {
        let n = match self.foreach_counters.last_mut() {
            Some(counter) => {
                let n = *counter;
                *counter += 1;
                n
            }
            None => {
                self.foreach_counters.push(1);
                0
            }
        };
        format!("foreachiter{}", n)
    }

    pub(crate) fn report(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: &SourceLocation,
    ) {
        let diagnostic = Diagnostic::new(code, message, location.clone());
        tracing::debug!(code = %diagnostic.code, message = %diagnostic.message, "emit diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Reports a missing child and writes an expression placeholder.
    pub(crate) fn malformed(&mut self, what: &str, location: &SourceLocation) {
        self.report(
            DiagnosticCode::MalformedNode,
            format!("{} is missing", what),
            location,
        );
        self.write_mapped("undefined", location);
    }

    /// Reports a node kind with no rendering. Statements get a comment
    /// placeholder, expressions `undefined`.
    pub(crate) fn unsupported(&mut self, kind: &str, location: &SourceLocation, statement: bool) {
        self.report(
            DiagnosticCode::UnsupportedNode,
            format!("{} is not supported", kind),
            location,
        );
        if statement {
            self.write_mapped(&format!("/* unsupported: {} */", kind), location);
        } else {
            self.write_mapped("undefined", location);
        }
    }

    /// Generated text of a detached render.
    pub(crate) fn into_text(self) -> String {
        self.sink.into_string()
    }

    /// Freezes the output into a file named `name`.
    pub(crate) fn finish(self, name: String) -> (EmittedFile, Vec<Diagnostic>) {
        let mappings = self.recorder.finish();
        let source_map = SourceMapV3::from_table(&name, &self.options.source_root, &mappings);
        let file = EmittedFile {
            name,
            code: self.sink.into_string(),
            mappings,
            source_map,
        };
        (file, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as_parser::{parse, ParseOptions};

    #[test]
    fn test_write_mapped_records_position_before_token() {
        let unit = parse("", &ParseOptions::new("A.as")).unit;
        let options = EmitOptions::default();
        let mut emitter = Emitter::new(&unit, &options);
        emitter.write("ab");
        emitter.write_mapped("c", &SourceLocation::point(SmolStr::new("A.as"), 3, 7));
        let (file, diagnostics) = emitter.finish("A.js".to_string());
        assert!(diagnostics.is_empty());
        let entry = &file.mappings.entries()[0];
        assert_eq!((entry.generated.line, entry.generated.column), (0, 2));
        assert_eq!((entry.original_line, entry.original_column), (3, 7));
    }

    #[test]
    fn test_foreach_counter_is_per_function() {
        let unit = parse("", &ParseOptions::new("A.as")).unit;
        let options = EmitOptions::default();
        let mut emitter = Emitter::new(&unit, &options);
        assert_eq!(emitter.next_foreach_name(), "foreachiter0");
        emitter.enter_function();
        assert_eq!(emitter.next_foreach_name(), "foreachiter0");
        assert_eq!(emitter.next_foreach_name(), "foreachiter1");
        emitter.exit_function();
        assert_eq!(emitter.next_foreach_name(), "foreachiter1");
    }

    #[test]
    fn test_named_only_when_text_differs() {
        let unit = parse("", &ParseOptions::new("A.as")).unit;
        let options = EmitOptions::default();
        let mut emitter = Emitter::new(&unit, &options);
        let loc = SourceLocation::point(SmolStr::new("A.as"), 0, 0);
        emitter.write_named("x", &loc, "x");
        emitter.write_named("A_y", &loc, "y");
        let (file, _) = emitter.finish("A.js".to_string());
        assert_eq!(file.mappings.entries()[0].name, None);
        assert_eq!(file.mappings.entries()[1].name.as_deref(), Some("y"));
    }
}
