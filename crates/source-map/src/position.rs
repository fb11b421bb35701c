//! Generated-side position tracking.

/// A zero-based position in generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GeneratedPosition {
    pub line: u32,
    pub column: u32,
}

impl GeneratedPosition {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Follows the line and column where the next generated character lands.
///
/// Columns count characters. A `\n` moves to the next line and resets the
/// column; nothing else is special, so multi-line string or comment text is
/// handled the same way as any other text.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    position: GeneratedPosition,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn position(&self) -> GeneratedPosition {
        self.position
    }

    pub fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last) => {
                self.position.line += text.matches('\n').count() as u32;
                self.position.column = text[last + 1..].chars().count() as u32;
            }
            None => self.position.column += text.chars().count() as u32,
        }
    }
}
