//! Tracing configuration.
//!
//! The subscriber is only installed when `ASJS_LOG` (or `RUST_LOG`) is set.
//! `ASJS_LOG_FORMAT=json` switches to one JSON object per event.
//!
//! ```bash
//! ASJS_LOG=debug asjs --workspace src
//! ASJS_LOG="js_emitter=trace" ASJS_LOG_FORMAT=json asjs
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("ASJS_LOG_FORMAT").unwrap_or_default())
    }
}

/// `ASJS_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("ASJS_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialises the global tracing subscriber. Output goes to stderr so it
/// never mixes with diagnostics on stdout.
pub fn init_tracing() {
    if std::env::var("ASJS_LOG").is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
