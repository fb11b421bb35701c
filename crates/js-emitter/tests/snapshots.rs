//! Snapshot tests for the JavaScript emitter.
//!
//! These tests verify the generated code against known-good output.

use as_parser::{parse, ParseOptions};
use js_emitter::{emit_unit, DiagnosticCode, EmitOptions, EmitResult};

fn emit_with(source: &str, options: &EmitOptions) -> EmitResult {
    let parsed = parse(source, &ParseOptions::new("src/Main.as"));
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    emit_unit(&parsed.unit, options)
}

fn emit(source: &str) -> EmitResult {
    emit_with(source, &EmitOptions::default())
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[test]
fn test_control_flow_layout() {
    let result = emit(
        r#"if (a) b(); else { c(); }
while (i < 3) i++;
do { i--; } while (i > 0);
for (var j:int = 0; j < 2; j++) {}
switch (k) { case 1: { x(); } default: break; }
try { f(); } catch (e:Error) { g(); } finally { h(); }"#,
    );
    assert!(result.diagnostics.is_empty());
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
if (a)
  b();
else {
  c();
}
while (i < 3)
  i++;
do {
  i--;
} while (i > 0);
for (var /** @type {number} */ j = 0; j < 2; j++) {
}
switch (k) {
  case 1:
    x();
  default:
    break;
}
try {
  f();
} catch (e) {
  g();
} finally {
  h();
}
"###);
}

#[test]
fn test_operators() {
    let result = emit("trace(typeof x, y is String, new Foo(1, 'a'), - -z, !done);");
    pretty_assertions::assert_eq!(
        result.files[0].code,
        "trace(typeof(x), Language.is(y, String), new Foo(1, 'a'), - -z, !done);\n"
    );
}

#[test]
fn test_labeled_for_each() {
    let result = emit("outer: for each (var v in list) { continue outer; }");
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
var foreachiter0_target = list;
outer: for (var foreachiter0 in foreachiter0_target) {
  var /** @type {*} */ v = foreachiter0_target[foreachiter0];
  continue outer;
}
"###);
}

#[test]
fn test_for_each_over_existing_variable_in_if() {
    let result = emit("var v;\nif (ok) for each (v in items) use(v);");
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
var /** @type {*} */ v;
if (ok) {
  var foreachiter0_target = items;
  for (var foreachiter0 in foreachiter0_target) {
    v = foreachiter0_target[foreachiter0];
    use(v);
  }
}
"###);
}

#[test]
fn test_labeled_for_each_as_if_body_keeps_else_attached() {
    let result = emit("if (c) outer: for each (var v in list) { continue outer; } else x();");
    assert!(result.diagnostics.is_empty());
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
if (c) {
  var foreachiter0_target = list;
  outer: for (var foreachiter0 in foreachiter0_target) {
    var /** @type {*} */ v = foreachiter0_target[foreachiter0];
    continue outer;
  }
} else
  x();
"###);
}

// ============================================================================
// CLASSES
// ============================================================================

const POINT: &str = r#"package a.b
{
    public class Point extends Base
    {
        private var _x:int;
        public static const ORIGIN:uint = -1;

        public function Point(x:int)
        {
            super(x);
            _x = x;
        }

        public function move(dx:Number):void
        {
            this._x += dx;
        }
    }
}"#;

#[test]
fn test_class_emission() {
    let result = emit(POINT);
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
goog.provide('a.b.Point');

/**
 * @constructor
 * @extends {Base}
 * @param {number} x
 */
a.b.Point = function(x) {
  a.b.Point.base(this, 'constructor', x);
  this.a_b_Point__x = x;
};
goog.inherits(a.b.Point, Base);

/**
 * @private
 * @type {number}
 */
a.b.Point.prototype.a_b_Point__x = 0;

/**
 * @export
 * @const
 * @type {number}
 */
a.b.Point.ORIGIN = 4294967295;

/**
 * @export
 * @param {number} dx
 */
a.b.Point.prototype.move = function(dx) {
  this.a_b_Point__x += dx;
};
"###);
    assert_eq!(result.files[0].name, "Main.js");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::CoercionOverflow);
}

#[test]
fn test_debug_comments() {
    let options = EmitOptions {
        emit_debug_comments: true,
        ..EmitOptions::default()
    };
    let result = emit_with("var x:int = 1;\n\nfunction f(a:String):int { return 1; }", &options);
    insta::assert_snapshot!(result.files[0].code.trim_end(), @r###"
// src/Main.as:1
var /** @type {number} */ x = 1;
// src/Main.as:3
/**
 * @param {string} a
 * @return {number}
 */
function f(a) {
  return 1;
}
"###);
}

#[test]
fn test_isolated_classes() {
    let options = EmitOptions {
        output_isolated_per_class: true,
        target_file_extension: "mjs".to_string(),
        ..EmitOptions::default()
    };
    let result = emit_with("class A {}\nclass B extends A {}\ntrace(1);", &options);
    let names: Vec<&str> = result.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["A.mjs", "B.mjs", "Main.mjs"]);

    insta::assert_snapshot!(result.files[1].code.trim_end(), @r###"
goog.provide('B');

/**
 * @constructor
 * @extends {A}
 */
B = function() {
};
goog.inherits(B, A);
"###);
    assert_eq!(result.files[2].code, "trace(1);\n");
    assert_eq!(result.files[1].source_map.file, "B.mjs");
}

#[test]
fn test_isolated_without_loose_statements() {
    let options = EmitOptions {
        output_isolated_per_class: true,
        ..EmitOptions::default()
    };
    let result = emit_with("class A {}", &options);
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].name, "A.js");
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_unsupported_nodes_get_placeholders() {
    let result = emit(
        "class A {\n    public function get n():int { return 1; }\n}\nx = doc..item;\nuse namespace ns;",
    );
    let code = &result.files[0].code;
    assert!(code.contains("/* unsupported: getter */"), "{}", code);
    assert!(code.contains("x = undefined;"), "{}", code);
    assert!(code.contains("/* unsupported: use namespace */"), "{}", code);
    assert_eq!(result.diagnostics.len(), 3);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::UnsupportedNode));
    assert!(result.has_errors());
}

#[test]
fn test_malformed_operand_is_reported() {
    let parsed = parse("a + ;", &ParseOptions::new("Main.as"));
    assert!(!parsed.errors.is_empty());
    let result = emit_unit(&parsed.unit, &EmitOptions::default());
    assert_eq!(result.files[0].code, "a + undefined;\n");
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::MalformedNode);
}
