//! Source positions, generated-position tracking and v3 source maps for asjs.
//!
//! The emitter writes target text through a [`TextSink`], which keeps a
//! [`PositionTracker`] in step with every appended character. Before each
//! meaningful token it asks the sink for its [`GeneratedPosition`] and hands it,
//! together with the originating [`SourceLocation`], to a [`MappingRecorder`].
//! At the end of a unit the recorder is frozen into a [`MappingTable`] and
//! serialized with [`SourceMapV3::from_table`].

mod error;
mod line_index;
mod location;
mod position;
mod recorder;
mod sink;
mod span;
mod v3;
pub mod vlq;

pub use error::SourceMapError;
pub use line_index::{LineCol, LineIndex};
pub use location::{SourceLocation, UNKNOWN};
pub use position::{GeneratedPosition, PositionTracker};
pub use recorder::{MappingEntry, MappingRecorder, MappingTable};
pub use sink::TextSink;
pub use span::{ByteOffset, Span};
pub use v3::{DecodedSegment, OriginalPosition, SourceMapV3};
