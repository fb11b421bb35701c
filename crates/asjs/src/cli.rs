//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Compiles ActionScript sources to JavaScript with source maps.
#[derive(Debug, Clone, Parser)]
#[command(name = "asjs")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory searched for `.as` files
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Output directory (defaults to `outDir` from the config, then `out`)
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Path to asjsconfig.json (defaults to the one in the workspace)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Extension of generated files, without the dot
    #[arg(long)]
    pub ext: Option<String>,

    /// `sourceRoot` written into every source map
    #[arg(long = "source-root")]
    pub source_root: Option<String>,

    /// Precede declarations with `// path:line` comments
    #[arg(long = "debug-comments")]
    pub debug_comments: bool,

    /// Write every class to its own file
    #[arg(long = "isolate-classes")]
    pub isolate_classes: bool,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Do not write `.map` files or `sourceMappingURL` comments
    #[arg(long = "no-source-maps")]
    pub no_source_maps: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
    /// Machine-readable (one line per diagnostic)
    Machine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["asjs"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert_eq!(args.output, OutputFormat::Human);
        assert!(args.out_dir.is_none());
        assert!(!args.debug_comments);
        assert!(!args.no_source_maps);
    }

    #[test]
    fn test_emit_flags() {
        let args = Args::parse_from([
            "asjs",
            "--workspace",
            "/path/to/project",
            "--out-dir",
            "build",
            "--ext",
            "mjs",
            "--source-root",
            "../src",
            "--debug-comments",
            "--isolate-classes",
        ]);
        assert_eq!(args.workspace.as_str(), "/path/to/project");
        assert_eq!(args.out_dir.as_deref().map(|p| p.as_str()), Some("build"));
        assert_eq!(args.ext.as_deref(), Some("mjs"));
        assert_eq!(args.source_root.as_deref(), Some("../src"));
        assert!(args.debug_comments);
        assert!(args.isolate_classes);
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["asjs", "--output", "json"]);
        assert_eq!(args.output, OutputFormat::Json);

        let args = Args::parse_from(["asjs", "--output", "machine"]);
        assert_eq!(args.output, OutputFormat::Machine);
    }
}
