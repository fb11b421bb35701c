//! Byte offset to line/column conversion.

use crate::ByteOffset;
use text_size::TextSize;

/// A zero-based line and character column.
///
/// Columns count characters, not bytes, so they agree with the generated
/// side where the [`PositionTracker`](crate::PositionTracker) counts
/// characters as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Line start table for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<ByteOffset>,
    /// Every line is pure ASCII, so byte and character columns agree.
    ascii: bool,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }
        Self {
            line_starts,
            ascii: text.is_ascii(),
        }
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line number containing `offset`.
    pub fn line_of(&self, offset: ByteOffset) -> u32 {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        line as u32
    }

    /// Converts a byte offset to a line and character column.
    ///
    /// Returns `None` when `offset` lies past the end of `text` or inside a
    /// multi-byte character.
    pub fn line_col(&self, text: &str, offset: ByteOffset) -> Option<LineCol> {
        if usize::from(offset) > text.len() {
            return None;
        }
        let line = self.line_of(offset);
        let start = self.line_starts[line as usize];
        let col = if self.ascii {
            u32::from(offset) - u32::from(start)
        } else {
            text.get(usize::from(start)..usize::from(offset))?
                .chars()
                .count() as u32
        };
        Some(LineCol { line, col })
    }

    /// Byte offset where `line` begins.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }

    /// The text of `line` without its line terminator.
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> Option<&'a str> {
        let start = usize::from(self.line_start(line)?);
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|&next| usize::from(next) - 1)
            .unwrap_or(text.len());
        text.get(start..end).map(|s| s.trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_multiple_lines() {
        let text = "var a;\nvar b;\nc";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(text, TextSize::from(0)), Some(LineCol::new(0, 0)));
        assert_eq!(index.line_col(text, TextSize::from(5)), Some(LineCol::new(0, 5)));
        assert_eq!(index.line_col(text, TextSize::from(7)), Some(LineCol::new(1, 0)));
        assert_eq!(index.line_col(text, TextSize::from(14)), Some(LineCol::new(2, 0)));
        assert_eq!(index.line_col(text, TextSize::from(99)), None);
    }

    #[test]
    fn test_columns_count_characters() {
        let text = "s = \"äö\"; x";
        let index = LineIndex::new(text);
        // 'x' sits at byte 12 but character 10.
        assert_eq!(index.line_col(text, TextSize::from(12)), Some(LineCol::new(0, 10)));
    }

    #[test]
    fn test_line_text() {
        let text = "first\r\nsecond\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_text(text, 0), Some("first"));
        assert_eq!(index.line_text(text, 1), Some("second"));
        assert_eq!(index.line_text(text, 2), Some(""));
        assert_eq!(index.line_text(text, 3), None);
    }
}
