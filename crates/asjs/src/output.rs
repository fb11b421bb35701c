//! Output formatting.

use crate::cli::OutputFormat;
use js_emitter::{Diagnostic, Severity};
use serde::Serialize;
use source_map::SourceLocation;

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error or Warning).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The source file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl Position {
    fn start(loc: &SourceLocation) -> Self {
        Self::new(loc.start_line, loc.start_column, loc.start)
    }

    fn end(loc: &SourceLocation) -> Self {
        Self::new(loc.end_line, loc.end_column, loc.end)
    }

    fn new(line: i32, column: i32, offset: i32) -> Self {
        Self {
            line: u32::try_from(line).map_or(1, |l| l + 1),
            column: u32::try_from(column).map_or(1, |c| c + 1),
            offset: u32::try_from(offset).ok(),
        }
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a collection of diagnostics. JSON output is produced once for
    /// the whole run by [`Formatter::format_json`].
    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(diagnostics),
            OutputFormat::Json => Self::format_json(diagnostics),
            OutputFormat::Machine => Self::format_machine(diagnostics),
        }
    }

    /// Formats as human-readable output.
    fn format_human(diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();
        for diag in diagnostics {
            let start = Position::start(&diag.location);
            output.push_str(&format!(
                "{}:{}:{}\n{}: {} ({})\n\n",
                diag.location.path,
                start.line,
                start.column,
                severity_label(diag.severity),
                diag.message,
                diag.code
            ));
        }
        output
    }

    /// Formats as a pretty-printed JSON array.
    pub fn format_json(diagnostics: &[Diagnostic]) -> String {
        let formatted = Self::format_json_diagnostics(diagnostics);
        serde_json::to_string_pretty(&formatted).unwrap_or_default()
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(diagnostics: &[Diagnostic]) -> Vec<FormattedDiagnostic> {
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                diagnostic_type: severity_label(diag.severity).to_string(),
                filename: diag.location.path.to_string(),
                start: Position::start(&diag.location),
                end: Position::end(&diag.location),
                message: diag.message.clone(),
                code: diag.code.to_string(),
            })
            .collect()
    }

    /// Formats as machine-readable output.
    fn format_machine(diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();
        for diag in diagnostics {
            let start = Position::start(&diag.location);
            let end = Position::end(&diag.location);
            let severity = match diag.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
            };
            output.push_str(&format!(
                "{} {}:{}:{}:{}:{} {} ({})\n",
                severity,
                diag.location.path,
                start.line,
                start.column,
                end.line,
                end.column,
                diag.message,
                diag.code
            ));
        }
        output
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
    }
}

/// Summary of a compile run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    /// Number of units compiled.
    pub file_count: usize,
    /// Number of generated files written.
    pub written_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
}

impl CompileSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        format!(
            "====================================\nasjs compiled {} {} into {} {} with {} {} and {} {}",
            self.file_count,
            plural(self.file_count, "unit", "units"),
            self.written_count,
            plural(self.written_count, "file", "files"),
            self.error_count,
            plural(self.error_count, "error", "errors"),
            self.warning_count,
            plural(self.warning_count, "warning", "warnings"),
        )
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_emitter::DiagnosticCode;
    use smol_str::SmolStr;

    fn overflow() -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::CoercionOverflow,
            "-1 does not fit in uint",
            SourceLocation::new(SmolStr::new("src/Main.as"), (13, 15), (0, 13), (0, 15)),
        )
    }

    #[test]
    fn test_format_human() {
        let output = Formatter::new(OutputFormat::Human).format(&[overflow()]);
        assert_eq!(
            output,
            "src/Main.as:1:14\nWarning: -1 does not fit in uint (coercion-overflow)\n\n"
        );
    }

    #[test]
    fn test_format_machine() {
        let output = Formatter::new(OutputFormat::Machine).format(&[overflow()]);
        assert_eq!(
            output,
            "WARNING src/Main.as:1:14:1:16 -1 does not fit in uint (coercion-overflow)\n"
        );
    }

    #[test]
    fn test_format_json() {
        let output = Formatter::format_json(&[overflow()]);
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value[0]["type"], "Warning");
        assert_eq!(value[0]["filename"], "src/Main.as");
        assert_eq!(value[0]["start"]["line"], 1);
        assert_eq!(value[0]["start"]["offset"], 13);
        assert_eq!(value[0]["code"], "coercion-overflow");
    }

    #[test]
    fn test_unknown_offset_is_omitted() {
        let diag = Diagnostic::new(
            DiagnosticCode::UnsupportedNode,
            "getter is not supported",
            SourceLocation::point(SmolStr::new("A.as"), 4, 0),
        );
        let formatted = Formatter::format_json_diagnostics(&[diag]);
        assert_eq!(formatted[0].start.line, 5);
        assert!(formatted[0].start.offset.is_none());
    }

    #[test]
    fn test_summary() {
        let summary = CompileSummary {
            file_count: 1,
            written_count: 3,
            error_count: 2,
            warning_count: 1,
        };
        let output = summary.format();
        assert!(output.contains("1 unit into 3 files"));
        assert!(output.contains("2 errors"));
        assert!(output.contains("1 warning"));
        assert!(summary.has_errors());
    }
}
