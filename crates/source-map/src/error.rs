//! Errors raised while reading source maps.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("invalid base64 character {0:?} in mappings")]
    InvalidBase64(char),

    #[error("mappings end inside a VLQ value")]
    UnexpectedEnd,

    #[error("VLQ value does not fit in 64 bits")]
    Overflow,

    #[error("segment with {0} fields; expected 1, 4 or 5")]
    SegmentArity(usize),

    #[error("segment refers to missing {kind} index {index}")]
    IndexOutOfRange { kind: &'static str, index: i64 },

    #[error("unsupported source map version {0}")]
    Version(u32),

    #[error("malformed source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}
