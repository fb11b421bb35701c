//! asjs: ActionScript to JavaScript compiler.

use asjs::tracing_config::init_tracing;
use asjs::Args;
use clap::Parser;
use miette::{IntoDiagnostic, Result};

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let summary = asjs::run(&args).into_diagnostic()?;
    if summary.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
