//! Append-only buffer for generated text.

use crate::{GeneratedPosition, PositionTracker};

/// Generated text of one output file.
///
/// Every write updates the position tracker, so [`TextSink::position`] is
/// always where the next character will land.
#[derive(Debug, Default)]
pub struct TextSink {
    buffer: String,
    tracker: PositionTracker,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.tracker.advance(text);
    }

    #[inline]
    pub fn position(&self) -> GeneratedPosition {
        self.tracker.position()
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_follows_writes() {
        let mut sink = TextSink::new();
        assert_eq!(sink.position(), GeneratedPosition::new(0, 0));
        sink.write("a");
        sink.write(" % ");
        assert_eq!(sink.position(), GeneratedPosition::new(0, 4));
        sink.write("b;\n");
        assert_eq!(sink.position(), GeneratedPosition::new(1, 0));
        assert_eq!(sink.into_string(), "a % b;\n");
    }
}
