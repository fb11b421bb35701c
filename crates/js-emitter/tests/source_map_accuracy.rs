//! Tests for source map accuracy.
//!
//! These tests verify that tokens in the generated JavaScript map back to the
//! positions they came from in the ActionScript source, both through the
//! recorded mapping table and through the serialized v3 map.

use as_parser::{parse, CompilationUnit, Expr, ParseOptions, StmtKind};
use js_emitter::{
    emit_expression, emit_statement, emit_unit, DiagnosticCode, EmitOptions, EmittedFile,
};
use pretty_assertions::assert_eq;
use source_map::{MappingEntry, SourceMapV3};

fn unit(source: &str) -> CompilationUnit {
    let parsed = parse(source, &ParseOptions::new("Main.as"));
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    parsed.unit
}

fn first_expression(unit: &CompilationUnit) -> &Expr {
    match &unit.body[0].kind {
        StmtKind::Expr(expr) => expr,
        other => panic!("expected an expression statement, found {}", other.name()),
    }
}

fn emit_first_expression(source: &str) -> EmittedFile {
    let unit = unit(source);
    let result = emit_expression(&unit, first_expression(&unit), &EmitOptions::default());
    result.files.into_iter().next().expect("one file")
}

fn emit_source(source: &str) -> EmittedFile {
    let unit = unit(source);
    let result = emit_unit(&unit, &EmitOptions::default());
    result.files.into_iter().next().expect("one file")
}

/// `(generated column, original line, original column)` of every entry on the
/// first generated line.
fn columns(file: &EmittedFile) -> Vec<(u32, i32, i32)> {
    file.mappings
        .entries_at_line(0)
        .iter()
        .map(|e: &MappingEntry| (e.generated.column, e.original_line, e.original_column))
        .collect()
}

/// Looks `needle` up in the generated code and resolves it through the
/// serialized map.
fn lookup(file: &EmittedFile, needle: &str) -> (u32, u32) {
    let offset = file
        .code
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, file.code));
    let before = &file.code[..offset];
    let line = before.matches('\n').count() as u32;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) as u32;

    let json = file.source_map.to_json();
    let map = SourceMapV3::from_json(&json).expect("valid map");
    let found = map
        .lookup(line, column)
        .expect("decodable mappings")
        .unwrap_or_else(|| panic!("no mapping for '{}' at {}:{}", needle, line, column));
    (found.line, found.column)
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[test]
fn test_binary_operator_columns() {
    let file = emit_first_expression("a % b;");
    assert_eq!(file.code, "a % b");
    assert_eq!(columns(&file), vec![(0, 0, 0), (1, 0, 1), (4, 0, 4)]);
}

#[test]
fn test_leaf_maps_to_node_start() {
    let file = emit_first_expression("    foo;");
    assert_eq!(file.code, "foo");
    assert_eq!(columns(&file), vec![(0, 0, 4)]);
}

#[test]
fn test_member_and_index_chain() {
    let file = emit_first_expression("a.b[c];");
    assert_eq!(file.code, "a.b[c]");
    assert_eq!(
        columns(&file),
        vec![(0, 0, 0), (1, 0, 1), (2, 0, 2), (3, 0, 3), (4, 0, 4), (5, 0, 5)]
    );
}

#[test]
fn test_ternary_has_five_tokens() {
    let file = emit_first_expression("c ? x : y;");
    assert_eq!(file.code, "c ? x : y");
    assert_eq!(
        columns(&file),
        vec![(0, 0, 0), (1, 0, 1), (4, 0, 4), (5, 0, 5), (8, 0, 8)]
    );
}

#[test]
fn test_call_closing_paren_maps_to_last_character() {
    let file = emit_first_expression("f(x,  y);");
    assert_eq!(file.code, "f(x, y)");
    assert_eq!(
        columns(&file),
        vec![(0, 0, 0), (1, 0, 1), (2, 0, 2), (3, 0, 3), (5, 0, 6), (6, 0, 7)]
    );
}

#[test]
fn test_typeof_maps_both_parens_to_node_start() {
    let file = emit_first_expression("typeof x;");
    assert_eq!(file.code, "typeof(x)");
    assert_eq!(columns(&file), vec![(0, 0, 0), (7, 0, 7), (8, 0, 0)]);
}

#[test]
fn test_object_and_array_literals_survive_serialization() {
    let file = emit_source("var o = {a: 1,\n  b: [2,\n    3]};");
    assert_eq!(file.code, "var /** @type {*} */ o = {a:1, b:[2, 3]};\n");
    assert_eq!(lookup(&file, "a:"), (0, 9));
    assert_eq!(lookup(&file, "1,"), (0, 12));
    assert_eq!(lookup(&file, "b:"), (1, 2));
    assert_eq!(lookup(&file, "2,"), (1, 6));
    assert_eq!(lookup(&file, "3]"), (2, 4));
    assert_eq!(lookup(&file, "]}"), (2, 5));
    assert_eq!(lookup(&file, "};"), (2, 6));
}

#[test]
fn test_single_statement_keeps_unit_positions() {
    let unit = unit("var x:int = 1;\nif (x) y();");
    let result = emit_statement(&unit, &unit.body[1], &EmitOptions::default());
    assert!(result.diagnostics.is_empty());
    let file = &result.files[0];
    assert_eq!(file.name, "Main.js");
    assert_eq!(file.code, "if (x)\n  y();");
    assert_eq!(columns(file), vec![(0, 1, 0), (4, 1, 4), (5, 1, 5)]);
}

#[test]
fn test_single_unsupported_statement_reports() {
    let unit = unit("use namespace ns;");
    let result = emit_statement(&unit, &unit.body[0], &EmitOptions::default());
    assert_eq!(result.files[0].code, "/* unsupported: use namespace */");
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::UnsupportedNode);
}

// ============================================================================
// LOGICAL ASSIGNMENT
// ============================================================================

#[test]
fn test_logical_and_assignment() {
    let file = emit_first_expression("a &&= b;");
    assert_eq!(file.code, "a = a && b");
    assert_eq!(
        columns(&file),
        vec![(0, 0, 0), (1, 0, 1), (4, 0, 0), (5, 0, 1), (9, 0, 6)]
    );
}

#[test]
fn test_logical_assignment_stays_within_expression() {
    let file = emit_first_expression("value ||= fallback;");
    assert_eq!(file.code, "value = value || fallback");
    assert_eq!(file.mappings.len(), 5);
    for entry in file.mappings.entries() {
        assert_eq!(entry.original_line, 0);
        assert!((0..=19).contains(&entry.original_column), "{:?}", entry);
    }
}

#[test]
fn test_logical_assignment_with_member_target() {
    let file = emit_first_expression("a.b ||= c;");
    assert_eq!(file.code, "a.b = a.b || c");
    let repeated = file.mappings.original_position(0, 6).expect("mapped");
    assert_eq!((repeated.original_line, repeated.original_column), (0, 0));
}

// ============================================================================
// DECLARATIONS AND COERCION
// ============================================================================

#[test]
fn test_var_tokens() {
    let file = emit_source("var count:int = 7;");
    assert_eq!(file.code, "var /** @type {number} */ count = 7;\n");
    assert_eq!(
        columns(&file),
        vec![(0, 0, 0), (4, 0, 9), (26, 0, 4), (31, 0, 13), (34, 0, 16), (35, 0, 17)]
    );
}

#[test]
fn test_uint_literal_is_reduced() {
    let unit = unit("var a:uint = -123;");
    let result = emit_unit(&unit, &EmitOptions::default());
    let file = &result.files[0];
    assert_eq!(file.code, "var /** @type {number} */ a = 4294967173;\n");

    let literal = file.mappings.original_position(0, 30).expect("mapped");
    assert_eq!(
        (literal.original_line, literal.original_column),
        (0, 13)
    );
    assert_eq!(literal.original_end_column, 17);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::CoercionOverflow);
}

#[test]
fn test_wide_hex_literal_is_reduced() {
    let unit = unit("var a:uint = 0x1FFFFFFFFFFFFFFFF;");
    let result = emit_unit(&unit, &EmitOptions::default());
    assert_eq!(result.files[0].code, "var /** @type {number} */ a = 0;\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, DiagnosticCode::CoercionOverflow);
}

#[test]
fn test_int_assignment_is_truncated() {
    let file = emit_source("var n:int;\nn = 123.2;");
    assert_eq!(
        file.code,
        "var /** @type {number} */ n = 0;\nn = 123;\n"
    );
    assert_eq!(lookup(&file, "123"), (1, 4));
}

#[test]
fn test_constants_fold_into_coercion() {
    let unit = unit("const BASE:int = 0x10;\nvar mask:uint = ~BASE;");
    let result = emit_unit(&unit, &EmitOptions::default());
    assert_eq!(
        result.files[0].code,
        "var /** @const {number} */ BASE = 16;\nvar /** @type {number} */ mask = 4294967279;\n"
    );
}

#[test]
fn test_constant_cycle_is_reported() {
    let unit = unit("const A:int = B;\nconst B:int = A;");
    let result = emit_unit(&unit, &EmitOptions::default());
    assert_eq!(
        result.files[0].code,
        "var /** @const {number} */ A = B;\nvar /** @const {number} */ B = A;\n"
    );
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::ConstantCycle));
    assert_eq!(result.diagnostics.len(), 2);
}

#[test]
fn test_private_field_records_source_name() {
    let source = "class A {\n    private var count:int = 1;\n}";
    let file = emit_source(source);
    assert!(file.code.contains("A.prototype.A_count = 1;"), "{}", file.code);
    assert_eq!(lookup(&file, "A.prototype."), (1, 16));
    assert_eq!(lookup(&file, "A_count"), (1, 16));
    assert!(file.source_map.names.contains(&"count".to_string()));
}

#[test]
fn test_private_static_keeps_its_name() {
    let source = "class A {\n    private static var foo;\n    public function f():void { foo = 1; }\n}";
    let file = emit_source(source);
    assert!(file.code.contains("\nA.foo;\n"), "{}", file.code);
    assert!(file.code.contains("A.foo = 1;"), "{}", file.code);
    assert!(!file.code.contains("A_foo"), "{}", file.code);
    assert_eq!(lookup(&file, "A.foo;"), (1, 23));
    assert_eq!(lookup(&file, "foo;"), (1, 23));
    assert!(file.source_map.names.is_empty());
}

// ============================================================================
// FOR EACH
// ============================================================================

#[test]
fn test_for_each_target_maps_to_expression() {
    let file = emit_source("for each(var i:int in obj) { break; }");
    assert_eq!(
        file.code,
        "var foreachiter0_target = obj;\n\
         for (var foreachiter0 in foreachiter0_target) {\n  \
         var /** @type {number} */ i = foreachiter0_target[foreachiter0];\n  \
         break;\n\
         }\n"
    );
    assert_eq!(lookup(&file, "var foreachiter0_target"), (0, 22));
    assert_eq!(lookup(&file, "obj;"), (0, 22));
    assert_eq!(lookup(&file, "for ("), (0, 0));
    assert_eq!(lookup(&file, " in "), (0, 22));
    assert_eq!(lookup(&file, ") {"), (0, 25));
    assert_eq!(lookup(&file, "i = "), (0, 13));
    assert_eq!(lookup(&file, "break"), (0, 29));
}

#[test]
fn test_for_each_over_existing_variable_maps_assignment_to_binding() {
    let file = emit_source("var i:int;\nfor each(i in obj) break;");
    let assignment = file
        .code
        .lines()
        .position(|l| l.trim_start().starts_with("i = "))
        .expect("element assignment") as u32;
    let columns: Vec<(u32, i32, i32)> = file
        .mappings
        .entries_at_line(assignment)
        .iter()
        .map(|e| (e.generated.column, e.original_line, e.original_column))
        .collect();
    assert_eq!(columns, vec![(2, 1, 9), (3, 1, 9), (6, 1, 14)]);
}

#[test]
fn test_for_each_names_are_unique_per_function() {
    let source = "function f(o) {\n\
                  for each (var a in o) {\n\
                  for each (var b in a) {}\n\
                  }\n\
                  for each (var c in o) {}\n\
                  }\n\
                  function g(o) {\n\
                  for each (var d in o) {}\n\
                  }";
    let file = emit_source(source);
    for expected in [
        "var foreachiter0_target = o;",
        "var foreachiter1_target = a;",
        "var foreachiter2_target = o;",
        "for (var foreachiter2 in foreachiter2_target)",
    ] {
        assert!(file.code.contains(expected), "missing {}:\n{}", expected, file.code);
    }
    assert_eq!(file.code.matches("var foreachiter0_target").count(), 2);
    assert!(!file.code.contains("foreachiter3"));
}
