//! Recording generated-to-original correspondences during emission.

use crate::{GeneratedPosition, SourceLocation, UNKNOWN};
use smol_str::SmolStr;

/// One recorded correspondence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub generated: GeneratedPosition,
    pub source: SmolStr,
    pub original_line: i32,
    pub original_column: i32,
    pub original_end_line: i32,
    pub original_end_column: i32,
    /// Source-level name when the generated token differs from it, e.g. a
    /// mangled private member.
    pub name: Option<SmolStr>,
}

impl MappingEntry {
    /// True when the entry can be represented in a serialized map.
    #[inline]
    pub fn has_original(&self) -> bool {
        self.original_line != UNKNOWN && self.original_column != UNKNOWN
    }
}

/// Collects [`MappingEntry`]s for one output file in emission order.
#[derive(Debug, Default)]
pub struct MappingRecorder {
    entries: Vec<MappingEntry>,
}

impl MappingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the token written at `generated` came from the start of
    /// `original`.
    ///
    /// Synthesized locations are accepted as is and unknown positions are
    /// kept verbatim; the serializer decides what to drop.
    pub fn record(
        &mut self,
        generated: GeneratedPosition,
        original: &SourceLocation,
        name: Option<&str>,
    ) {
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |last| last.generated <= generated),
            "generated positions must not decrease"
        );
        self.entries.push(MappingEntry {
            generated,
            source: original.path.clone(),
            original_line: original.start_line,
            original_column: original.start_column,
            original_end_line: original.end_line,
            original_end_column: original.end_column,
            name: name.map(SmolStr::new),
        });
    }

    /// Records a node as a whole: the generated position maps to the node's
    /// start and the entry remembers the node's full range.
    pub fn record_range(&mut self, node: &SourceLocation, generated: GeneratedPosition) {
        self.record(generated, node, None);
    }

    #[inline]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> MappingTable {
        MappingTable {
            entries: self.entries,
        }
    }
}

/// The frozen mapping table of one output file, ordered by generated position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    #[inline]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries on one generated line.
    pub fn entries_at_line(&self, line: u32) -> &[MappingEntry] {
        let lo = self.entries.partition_point(|e| e.generated.line < line);
        let hi = self.entries.partition_point(|e| e.generated.line <= line);
        &self.entries[lo..hi]
    }

    /// The entry in effect at a generated position: the last one on the same
    /// line whose column is not after `column`.
    pub fn original_position(&self, line: u32, column: u32) -> Option<&MappingEntry> {
        let target = GeneratedPosition::new(line, column);
        let idx = self.entries.partition_point(|e| e.generated <= target);
        let entry = self.entries[..idx].last()?;
        (entry.generated.line == line).then_some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(line: i32, column: i32) -> SourceLocation {
        SourceLocation::point(SmolStr::new("A.as"), line, column)
    }

    #[test]
    fn test_record_keeps_order_and_names() {
        let mut recorder = MappingRecorder::new();
        recorder.record(GeneratedPosition::new(0, 0), &at(0, 0), None);
        recorder.record(GeneratedPosition::new(0, 4), &at(0, 9), Some("foo"));
        let table = recorder.finish();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[1].name.as_deref(), Some("foo"));
        assert_eq!(table.entries()[1].original_column, 9);
    }

    #[test]
    fn test_record_range_keeps_node_extent() {
        let node = SourceLocation::new(SmolStr::new("A.as"), (20, 27), (1, 4), (2, 3));
        let mut recorder = MappingRecorder::new();
        recorder.record_range(&node, GeneratedPosition::new(5, 2));
        let entry = &recorder.entries()[0];
        assert_eq!(entry.generated, GeneratedPosition::new(5, 2));
        assert_eq!((entry.original_line, entry.original_column), (1, 4));
        assert_eq!((entry.original_end_line, entry.original_end_column), (2, 3));
        assert_eq!(entry.name, None);
    }

    #[test]
    fn test_unknown_preserved() {
        let mut recorder = MappingRecorder::new();
        recorder.record(
            GeneratedPosition::new(0, 0),
            &SourceLocation::unknown(SmolStr::new("A.as")),
            None,
        );
        let entry = &recorder.entries()[0];
        assert_eq!(entry.original_line, UNKNOWN);
        assert!(!entry.has_original());
    }

    #[test]
    fn test_original_position_lookup() {
        let mut recorder = MappingRecorder::new();
        recorder.record(GeneratedPosition::new(0, 0), &at(3, 0), None);
        recorder.record(GeneratedPosition::new(0, 5), &at(3, 5), None);
        recorder.record(GeneratedPosition::new(2, 2), &at(4, 2), None);
        let table = recorder.finish();

        assert_eq!(table.original_position(0, 3).map(|e| e.original_column), Some(0));
        assert_eq!(table.original_position(0, 7).map(|e| e.original_column), Some(5));
        assert_eq!(table.original_position(1, 0), None);
        assert_eq!(table.original_position(2, 1), None);
        assert_eq!(table.original_position(2, 2).map(|e| e.original_line), Some(4));
        assert_eq!(table.entries_at_line(0).len(), 2);
        assert!(table.entries_at_line(1).is_empty());
    }
}
