//! Configuration loading.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use js_emitter::EmitOptions;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Name of the config file looked up in the workspace root.
pub const CONFIG_FILE: &str = "asjsconfig.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`AsjsConfig`].
    #[error("invalid config {path}: {source}")]
    Invalid {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(Utf8PathBuf),
}

/// Contents of `asjsconfig.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AsjsConfig {
    pub out_dir: Option<Utf8PathBuf>,
    pub source_root: Option<String>,
    pub target_file_extension: Option<String>,
    #[serde(default)]
    pub emit_debug_comments: bool,
    #[serde(default)]
    pub output_isolated_per_class: bool,
    /// Glob patterns, relative to the workspace, that are never compiled.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl AsjsConfig {
    /// Loads configuration from a config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_owned(),
            source,
        })
    }

    /// Loads `explicit` when given, otherwise the workspace's config file if
    /// there is one.
    pub fn find(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_owned()));
            }
            return Self::load(path);
        }

        let path = workspace.join(CONFIG_FILE);
        if path.exists() {
            tracing::debug!(%path, "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Effective settings of a run: the config file overridden by CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub out_dir: Utf8PathBuf,
    pub emit: EmitOptions,
    pub exclude: Vec<String>,
    pub source_maps: bool,
}

impl Settings {
    pub fn resolve(config: AsjsConfig, args: &Args, workspace: &Utf8Path) -> Self {
        let out_dir = args
            .out_dir
            .clone()
            .or(config.out_dir)
            .unwrap_or_else(|| Utf8PathBuf::from("out"));
        let out_dir = if out_dir.is_relative() {
            workspace.join(out_dir)
        } else {
            out_dir
        };

        let defaults = EmitOptions::default();
        let emit = EmitOptions {
            target_file_extension: args
                .ext
                .clone()
                .or(config.target_file_extension)
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or(defaults.target_file_extension),
            emit_debug_comments: args.debug_comments || config.emit_debug_comments,
            output_isolated_per_class: args.isolate_classes || config.output_isolated_per_class,
            source_root: args
                .source_root
                .clone()
                .or(config.source_root)
                .unwrap_or(defaults.source_root),
        };

        Self {
            out_dir,
            emit,
            exclude: config.exclude,
            source_maps: !args.no_source_maps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn temp_workspace() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 path");
        (dir, path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (_dir, workspace) = temp_workspace();
        let config = AsjsConfig::find(&workspace, None).expect("defaults");
        assert!(config.out_dir.is_none());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_load_camel_case() {
        let (_dir, workspace) = temp_workspace();
        fs::write(
            workspace.join(CONFIG_FILE),
            r#"{
                "outDir": "bin-debug",
                "sourceRoot": "../src",
                "targetFileExtension": "mjs",
                "emitDebugComments": true,
                "exclude": ["**/generated/**"]
            }"#,
        )
        .expect("write config");

        let config = AsjsConfig::find(&workspace, None).expect("valid config");
        assert_eq!(config.out_dir.as_deref().map(|p| p.as_str()), Some("bin-debug"));
        assert_eq!(config.source_root.as_deref(), Some("../src"));
        assert_eq!(config.target_file_extension.as_deref(), Some("mjs"));
        assert!(config.emit_debug_comments);
        assert!(!config.output_isolated_per_class);
        assert_eq!(config.exclude, vec!["**/generated/**".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (_dir, workspace) = temp_workspace();
        fs::write(workspace.join(CONFIG_FILE), "{ \"outDir\": 3 }").expect("write config");
        let err = AsjsConfig::find(&workspace, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{}", err);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let (_dir, workspace) = temp_workspace();
        let missing = workspace.join("nope.json");
        let err = AsjsConfig::find(&workspace, Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = AsjsConfig {
            out_dir: Some(Utf8PathBuf::from("from-config")),
            target_file_extension: Some("mjs".to_string()),
            source_root: Some("cfg".to_string()),
            ..AsjsConfig::default()
        };
        let args = Args::parse_from(["asjs", "--out-dir", "from-cli", "--ext", ".cjs"]);
        let settings = Settings::resolve(config, &args, Utf8Path::new("/ws"));
        assert_eq!(settings.out_dir.as_str(), "/ws/from-cli");
        assert_eq!(settings.emit.target_file_extension, "cjs");
        assert_eq!(settings.emit.source_root, "cfg");
        assert!(settings.source_maps);
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Args::parse_from(["asjs", "--no-source-maps"]);
        let settings = Settings::resolve(AsjsConfig::default(), &args, Utf8Path::new("/ws"));
        assert_eq!(settings.out_dir.as_str(), "/ws/out");
        assert_eq!(settings.emit.target_file_extension, "js");
        assert!(!settings.emit.emit_debug_comments);
        assert!(!settings.source_maps);
    }
}
