//! asjs: compiles ActionScript sources to JavaScript with v3 source maps.
//!
//! The binary is a thin wrapper over [`orchestrator::run`]; the pieces are
//! public so the pipeline can be driven from tests or other tools.

pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod output;
pub mod tracing_config;

pub use cli::{Args, OutputFormat};
pub use config::{AsjsConfig, ConfigError, Settings};
pub use orchestrator::{compile, run, CompileReport, DriverError};
pub use output::{CompileSummary, Formatter};
