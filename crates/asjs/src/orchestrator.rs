//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{AsjsConfig, ConfigError, Settings};
use crate::output::{CompileSummary, Formatter};
use as_parser::{parse, ParseOptions};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use js_emitter::{emit_unit, Diagnostic, DiagnosticCode, EmittedFile, Severity};
use rayon::prelude::*;
use source_map::{LineIndex, SourceLocation};
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of ActionScript sources.
const SOURCE_EXTENSION: &str = "as";

const DEFAULT_EXCLUDES: [&str; 3] = ["**/node_modules/**", "**/.git/**", "**/.svn/**"];

/// Driver errors. Problems inside a unit are diagnostics, not errors.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// The workspace directory cannot be used.
    #[error("invalid workspace {path}: {reason}")]
    Workspace { path: Utf8PathBuf, reason: String },

    /// Failed to read a source file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a generated file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a compile run produced.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub summary: CompileSummary,
    /// Parse errors and emitter diagnostics, ordered by unit.
    pub diagnostics: Vec<Diagnostic>,
    /// Paths of the generated files, source maps included.
    pub written: Vec<Utf8PathBuf>,
}

/// Resolves the workspace and configuration, compiles every unit and prints
/// the diagnostics in the requested format.
pub fn run(args: &Args) -> Result<CompileSummary, DriverError> {
    let workspace = resolve_workspace(&args.workspace)?;
    let config = AsjsConfig::find(&workspace, args.config.as_deref())?;
    let settings = Settings::resolve(config, args, &workspace);

    let report = compile(&workspace, &settings)?;

    if args.output == OutputFormat::Json {
        println!("{}", Formatter::format_json(&report.diagnostics));
    } else {
        print!("{}", Formatter::new(args.output).format(&report.diagnostics));
        println!("{}", report.summary.format());
    }

    Ok(report.summary)
}

fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, DriverError> {
    let workspace = if workspace.is_relative() {
        let cwd = std::env::current_dir().map_err(|e| DriverError::Workspace {
            path: workspace.to_owned(),
            reason: e.to_string(),
        })?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| DriverError::Workspace {
            path: workspace.to_owned(),
            reason: e.to_string(),
        })?;
        cwd.join(workspace)
    } else {
        workspace.to_owned()
    };

    if !workspace.is_dir() {
        return Err(DriverError::Workspace {
            path: workspace,
            reason: "not a directory".to_string(),
        });
    }
    Ok(workspace)
}

/// Compiles every `.as` file under `workspace` into `settings.out_dir`.
pub fn compile(workspace: &Utf8Path, settings: &Settings) -> Result<CompileReport, DriverError> {
    let _span = tracing::info_span!("compile", %workspace).entered();

    let exclude = build_exclude_set(&settings.exclude)?;
    let files = discover_sources(workspace, &settings.out_dir, &exclude);
    tracing::debug!(files = files.len(), "discovered sources");

    // Units are independent; each gets its own parser and emitter.
    let units: Vec<UnitOutput> = files
        .par_iter()
        .map(|relative| compile_unit(workspace, relative, settings))
        .collect::<Result<_, _>>()?;

    let mut report = CompileReport::default();
    report.summary.file_count = units.len();
    for unit in units {
        report.written.extend(unit.written);
        report.diagnostics.extend(unit.diagnostics);
    }
    report.summary.written_count = report.written.len();
    for diag in &report.diagnostics {
        match diag.severity {
            Severity::Error => report.summary.error_count += 1,
            Severity::Warning => report.summary.warning_count += 1,
        }
    }

    tracing::info!(
        units = report.summary.file_count,
        written = report.summary.written_count,
        errors = report.summary.error_count,
        warnings = report.summary.warning_count,
        "compile finished"
    );
    Ok(report)
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet, DriverError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DriverError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    for pattern in DEFAULT_EXCLUDES {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder
        .build()
        .map_err(|e| DriverError::InvalidGlob(e.to_string()))
}

/// Source files relative to `workspace`, sorted, skipping excluded paths and
/// the output directory.
fn discover_sources(workspace: &Utf8Path, out_dir: &Utf8Path, exclude: &GlobSet) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(workspace)
        .into_iter()
        .filter_entry(|e| e.path() != out_dir.as_std_path())
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| p.extension() == Some(SOURCE_EXTENSION))
        .filter_map(|p| p.strip_prefix(workspace).ok().map(Utf8Path::to_path_buf))
        .filter(|relative| !exclude.is_match(relative.as_str()))
        .collect();
    files.sort();
    files
}

struct UnitOutput {
    diagnostics: Vec<Diagnostic>,
    written: Vec<Utf8PathBuf>,
}

fn compile_unit(
    workspace: &Utf8Path,
    relative: &Utf8Path,
    settings: &Settings,
) -> Result<UnitOutput, DriverError> {
    let path = workspace.join(relative);
    let source = fs::read_to_string(&path).map_err(|source| DriverError::Read {
        path: path.clone(),
        source,
    })?;

    // Locations carry the workspace-relative path with forward slashes.
    let unit_path = relative.as_str().replace('\\', "/");
    let parsed = parse(&source, &ParseOptions::new(unit_path.as_str()));

    let mut diagnostics = Vec::new();
    if !parsed.errors.is_empty() {
        let index = LineIndex::new(&source);
        for error in &parsed.errors {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ParseError,
                error.to_string(),
                SourceLocation::from_span(&parsed.unit.path, error.span, &source, &index),
            ));
        }
    }

    let result = emit_unit(&parsed.unit, &settings.emit);
    diagnostics.extend(result.diagnostics);

    let target_dir = match relative.parent() {
        Some(parent) => settings.out_dir.join(parent),
        None => settings.out_dir.clone(),
    };
    fs::create_dir_all(&target_dir).map_err(|source| DriverError::Write {
        path: target_dir.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(result.files.len() * 2);
    for file in &result.files {
        written.extend(write_output(&target_dir, file, settings.source_maps)?);
    }

    tracing::debug!(
        unit = %relative,
        files = result.files.len(),
        diagnostics = diagnostics.len(),
        "compiled unit"
    );
    Ok(UnitOutput {
        diagnostics,
        written,
    })
}

/// Writes a generated file and, when enabled, its map beside it.
fn write_output(
    dir: &Utf8Path,
    file: &EmittedFile,
    source_maps: bool,
) -> Result<Vec<Utf8PathBuf>, DriverError> {
    let code_path = dir.join(&file.name);
    if !source_maps {
        write_file(&code_path, &file.code)?;
        return Ok(vec![code_path]);
    }

    let map_name = format!("{}.map", file.name);
    let map_path = dir.join(&map_name);
    let code = format!("{}//# sourceMappingURL={}\n", file.code, map_name);
    write_file(&code_path, &code)?;
    write_file(&map_path, &file.source_map.to_json())?;
    Ok(vec![code_path, map_path])
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), DriverError> {
    fs::write(path, contents).map_err(|source| DriverError::Write {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes() {
        let set = build_exclude_set(&["gen/**".to_string()]).expect("valid globs");
        assert!(set.is_match("gen/A.as"));
        assert!(set.is_match("lib/node_modules/x/B.as"));
        assert!(!set.is_match("src/Main.as"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_exclude_set(&["a[".to_string()]).unwrap_err();
        assert!(matches!(err, DriverError::InvalidGlob(_)));
    }
}
