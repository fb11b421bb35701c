//! Diagnostic types shared by the emitter and the driver.

use source_map::SourceLocation;
use std::fmt;

/// A problem found in a unit, reported with the node or span it concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// Location of the offending node.
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            location,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.path,
            self.location.start_line + 1,
            self.location.start_column + 1,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Emission continued with the value the source most likely meant.
    Warning,
    /// Emission continued with a placeholder.
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic codes reported by the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `malformed-node`: a required child is missing
    MalformedNode,
    /// `unsupported-node`: no JavaScript rendering exists for the node
    UnsupportedNode,
    /// `coercion-overflow`: an `int`/`uint` initializer was wrapped
    CoercionOverflow,
    /// `constant-cycle`: constants refer to each other
    ConstantCycle,
    /// `parse-error`: the front end could not parse the unit
    ParseError,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::MalformedNode
            | DiagnosticCode::UnsupportedNode
            | DiagnosticCode::ParseError => Severity::Error,
            DiagnosticCode::CoercionOverflow | DiagnosticCode::ConstantCycle => Severity::Warning,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MalformedNode => "malformed-node",
            DiagnosticCode::UnsupportedNode => "unsupported-node",
            DiagnosticCode::CoercionOverflow => "coercion-overflow",
            DiagnosticCode::ConstantCycle => "constant-cycle",
            DiagnosticCode::ParseError => "parse-error",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    #[test]
    fn test_default_severity() {
        assert_eq!(
            DiagnosticCode::UnsupportedNode.default_severity(),
            Severity::Error
        );
        assert_eq!(
            DiagnosticCode::CoercionOverflow.default_severity(),
            Severity::Warning
        );
    }

    #[test]
    fn test_display_is_one_based() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::MalformedNode,
            "right operand is missing",
            SourceLocation::point(SmolStr::new("Main.as"), 2, 4),
        );
        assert!(diagnostic.is_error());
        assert_eq!(
            diagnostic.to_string(),
            "Main.as:3:5: error [malformed-node] right operand is missing"
        );
    }
}
