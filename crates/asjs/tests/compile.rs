//! Integration tests for the compile pipeline.
//!
//! Each test lays out a workspace in a temporary directory, compiles it and
//! inspects the generated files on disk.

use asjs::{compile, AsjsConfig, Args, Formatter, OutputFormat, Settings};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use js_emitter::{DiagnosticCode, Severity};
use pretty_assertions::assert_eq;
use source_map::SourceMapV3;
use std::fs;

// ============================================================================
// SHARED TEST INFRASTRUCTURE
// ============================================================================

struct Workspace {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp dir");
        Self { _dir: dir, root }
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, contents).expect("write file");
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative))
            .unwrap_or_else(|e| panic!("reading {}: {}", relative, e))
    }

    fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }

    fn settings(&self, flags: &[&str]) -> Settings {
        let mut argv = vec!["asjs"];
        argv.extend_from_slice(flags);
        let args = Args::parse_from(argv);
        let config = AsjsConfig::find(&self.root, None).expect("config");
        Settings::resolve(config, &args, &self.root)
    }
}

fn relative(root: &Utf8Path, paths: &[Utf8PathBuf]) -> Vec<String> {
    let mut paths: Vec<String> = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).as_str().replace('\\', "/"))
        .collect();
    paths.sort();
    paths
}

const MAIN: &str = r#"package app
{
    public class Main
    {
        public static const MASK:uint = -1;

        public function run(items:Array):void
        {
            for each (var item:String in items) trace(item);
        }
    }
}"#;

// ============================================================================
// OUTPUT LAYOUT
// ============================================================================

#[test]
fn test_writes_code_and_map_mirroring_directories() {
    let ws = Workspace::new();
    ws.write("src/app/Main.as", MAIN);

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    assert_eq!(report.summary.file_count, 1);
    assert_eq!(
        relative(&ws.root, &report.written),
        vec!["out/src/app/Main.js", "out/src/app/Main.js.map"]
    );

    let code = ws.read("out/src/app/Main.js");
    assert!(code.starts_with("goog.provide('app.Main');\n"), "{}", code);
    assert!(code.contains("app.Main.MASK = 4294967295;"), "{}", code);
    assert!(code.contains("var foreachiter0_target = items;"), "{}", code);
    assert!(code.ends_with("//# sourceMappingURL=Main.js.map\n"), "{}", code);

    let map = SourceMapV3::from_json(&ws.read("out/src/app/Main.js.map")).expect("valid map");
    assert_eq!(map.file, "Main.js");
    assert_eq!(map.sources, vec!["src/app/Main.as".to_string()]);
    assert!(!map.mappings.is_empty());
}

#[test]
fn test_map_points_back_to_source() {
    let ws = Workspace::new();
    ws.write("Main.as", "var total:int = 0;\ntotal += 2;");

    compile(&ws.root, &ws.settings(&[])).expect("compile");

    let code = ws.read("out/Main.js");
    let map = SourceMapV3::from_json(&ws.read("out/Main.js.map")).expect("valid map");
    let line = code.lines().position(|l| l.starts_with("total")).expect("second statement") as u32;
    let found = map
        .lookup(line, 0)
        .expect("decodable")
        .expect("mapped");
    assert_eq!((found.line, found.column), (1, 0));
}

#[test]
fn test_no_source_maps_and_custom_extension() {
    let ws = Workspace::new();
    ws.write("Main.as", "trace(1);");

    let report = compile(&ws.root, &ws.settings(&["--no-source-maps", "--ext", "mjs"]))
        .expect("compile");
    assert_eq!(relative(&ws.root, &report.written), vec!["out/Main.mjs"]);
    assert_eq!(ws.read("out/Main.mjs"), "trace(1);\n");
}

#[test]
fn test_isolated_classes_from_config() {
    let ws = Workspace::new();
    ws.write(
        "asjsconfig.json",
        r#"{ "outDir": "build", "outputIsolatedPerClass": true }"#,
    );
    ws.write("lib/Shapes.as", "class Shape {}\nclass Circle extends Shape {}\n");

    let report = compile(&ws.root, &ws.settings(&["--no-source-maps"])).expect("compile");
    assert_eq!(
        relative(&ws.root, &report.written),
        vec!["build/lib/Circle.js", "build/lib/Shape.js"]
    );
    assert!(ws.read("build/lib/Circle.js").contains("goog.inherits(Circle, Shape);"));
}

// ============================================================================
// DISCOVERY
// ============================================================================

#[test]
fn test_excludes_and_output_directory_are_skipped() {
    let ws = Workspace::new();
    ws.write("asjsconfig.json", r#"{ "exclude": ["vendor/**"] }"#);
    ws.write("Main.as", "trace(1);");
    ws.write("vendor/Lib.as", "trace(2);");
    ws.write("out/Stale.as", "trace(3);");
    ws.write("node_modules/pkg/Dep.as", "trace(4);");
    ws.write("notes.txt", "not a source");

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    assert_eq!(report.summary.file_count, 1);
    assert!(ws.exists("out/Main.js"));
    assert!(!ws.exists("out/vendor"));
    assert!(!ws.exists("out/out"));
}

#[test]
fn test_invalid_exclude_glob_fails() {
    let ws = Workspace::new();
    ws.write("asjsconfig.json", r#"{ "exclude": ["src/[" ] }"#);
    let err = compile(&ws.root, &ws.settings(&[])).unwrap_err();
    assert!(err.to_string().contains("invalid glob"), "{}", err);
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_parse_errors_are_reported_and_output_still_written() {
    let ws = Workspace::new();
    ws.write("src/Broken.as", "a + ;");

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    assert!(report.summary.has_errors());
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::ParseError);
    assert_eq!(report.diagnostics[0].location.path, "src/Broken.as");
    assert_eq!(report.diagnostics[0].location.start_line, 0);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::MalformedNode));
    assert!(ws.read("out/src/Broken.js").starts_with("a + undefined;\n"));
}

#[test]
fn test_warnings_do_not_count_as_errors() {
    let ws = Workspace::new();
    ws.write("Main.as", "var mask:uint = -1;");

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    assert_eq!(report.summary.warning_count, 1);
    assert_eq!(report.summary.error_count, 0);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    assert!(!report.summary.has_errors());
}

#[test]
fn test_units_are_reported_in_path_order() {
    let ws = Workspace::new();
    ws.write("b/B.as", "var b:uint = -1;");
    ws.write("a/A.as", "var a:uint = -1;");

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    let paths: Vec<&str> = report
        .diagnostics
        .iter()
        .map(|d| d.location.path.as_str())
        .collect();
    assert_eq!(paths, vec!["a/A.as", "b/B.as"]);
}

#[test]
fn test_human_report() {
    let ws = Workspace::new();
    ws.write("src/Main.as", "var mask:uint = -1;\nuse namespace ns;");

    let report = compile(&ws.root, &ws.settings(&[])).expect("compile");
    let output = Formatter::new(OutputFormat::Human).format(&report.diagnostics);
    insta::assert_snapshot!(output.trim_end(), @r###"
src/Main.as:1:17
Warning: -1 does not fit in uint; emitted 4294967295 (coercion-overflow)

src/Main.as:2:1
Error: use namespace is not supported (unsupported-node)
"###);
    insta::assert_snapshot!(report.summary.format(), @r###"
====================================
asjs compiled 1 unit into 2 files with 1 error and 1 warning
"###);
}
