//! Original-source locations carried by syntax nodes.

use crate::{LineIndex, Span};
use smol_str::SmolStr;

/// Marker for an absent line, column or offset.
pub const UNKNOWN: i32 = -1;

/// Where a node came from in its source file.
///
/// All values are zero-based. Any of them may be [`UNKNOWN`] for synthesized
/// nodes; such locations are still accepted by the
/// [`MappingRecorder`](crate::MappingRecorder) but produce no segment in the
/// serialized map. The path is a [`SmolStr`], so every node of a unit shares
/// one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub path: SmolStr,
    pub start: i32,
    pub end: i32,
    pub start_line: i32,
    pub start_column: i32,
    pub end_line: i32,
    pub end_column: i32,
}

impl SourceLocation {
    pub fn new(
        path: SmolStr,
        (start, end): (i32, i32),
        (start_line, start_column): (i32, i32),
        (end_line, end_column): (i32, i32),
    ) -> Self {
        Self {
            path,
            start,
            end,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A location with every position unknown.
    pub fn unknown(path: SmolStr) -> Self {
        Self::new(path, (UNKNOWN, UNKNOWN), (UNKNOWN, UNKNOWN), (UNKNOWN, UNKNOWN))
    }

    /// A zero-width location at a known line and column with unknown offsets.
    pub fn point(path: SmolStr, line: i32, column: i32) -> Self {
        Self::new(path, (UNKNOWN, UNKNOWN), (line, column), (line, column))
    }

    /// Builds a location from a byte span of `text`.
    pub fn from_span(path: &SmolStr, span: Span, text: &str, index: &LineIndex) -> Self {
        let start = index.line_col(text, span.start);
        let end = index.line_col(text, span.end);
        let (start_line, start_column) = start.map_or((UNKNOWN, UNKNOWN), |lc| {
            (lc.line as i32, lc.col as i32)
        });
        let (end_line, end_column) =
            end.map_or((UNKNOWN, UNKNOWN), |lc| (lc.line as i32, lc.col as i32));
        Self::new(
            path.clone(),
            (u32::from(span.start) as i32, u32::from(span.end) as i32),
            (start_line, start_column),
            (end_line, end_column),
        )
    }

    /// True when the start line and column are both known.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.start_line != UNKNOWN && self.start_column != UNKNOWN
    }

    /// Zero-width location at this location's start.
    pub fn at_start(&self) -> Self {
        Self::new(
            self.path.clone(),
            (self.start, self.start),
            (self.start_line, self.start_column),
            (self.start_line, self.start_column),
        )
    }

    /// Zero-width location just past this location's last character.
    pub fn at_end(&self) -> Self {
        Self::new(
            self.path.clone(),
            (self.end, self.end),
            (self.end_line, self.end_column),
            (self.end_line, self.end_column),
        )
    }

    /// Location of the last character, i.e. the closing bracket of a literal
    /// or call. Unknown components stay unknown.
    pub fn before_end(&self) -> Self {
        let step = |v: i32| if v > 0 { v - 1 } else { v };
        Self::new(
            self.path.clone(),
            (step(self.end), self.end),
            (self.end_line, step(self.end_column)),
            (self.end_line, self.end_column),
        )
    }

    /// True when `(line, column)` lies within `[start, end]`.
    pub fn contains(&self, line: i32, column: i32) -> bool {
        let pos = (line, column);
        (self.start_line, self.start_column) <= pos && pos <= (self.end_line, self.end_column)
    }
}
