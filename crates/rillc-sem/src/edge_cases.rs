//! Integration tests for semantic analysis.

use rillc_lex::ScalarTy;
use rillc_par::parse_source;
use rillc_util::Handler;

use crate::{analyze, Analysis, ExternSig};

fn run(source: &str) -> (Analysis, Handler) {
    run_with_externs(source, &[])
}

fn run_with_externs(source: &str, externs: &[ExternSig]) -> (Analysis, Handler) {
    let mut handler = Handler::new();
    let ast = parse_source(source, &mut handler);
    assert!(
        !handler.has_errors(),
        "source must parse cleanly: {:?}",
        handler.diagnostics()
    );
    let analysis = analyze(&ast, externs, &mut handler);
    (analysis, handler)
}

fn assert_clean(source: &str) -> Analysis {
    let (analysis, handler) = run(source);
    assert!(
        !handler.has_errors(),
        "unexpected errors for {:?}: {:?}",
        source,
        handler.diagnostics()
    );
    analysis
}

fn assert_error_containing(source: &str, needle: &str) {
    let (_, handler) = run(source);
    assert!(
        handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains(needle)),
        "expected an error containing {:?}, got {:?}",
        needle,
        handler.diagnostics()
    );
}

#[test]
fn test_simple_function_types() {
    assert_clean("fn add(x: i32, y: i32) -> i32 { return x + y; }");
}

#[test]
fn test_every_expression_has_a_type() {
    let source = "fn f(x: i32) -> i32 { let y: i32 = x * 2i32; if y > 0i32 { y } else { x } }";
    let mut handler = Handler::new();
    let ast = parse_source(source, &mut handler);
    let analysis = analyze(&ast, &[], &mut handler);
    assert!(!handler.has_errors());
    // Walk the only function body and confirm the side-table is total.
    let rillc_par::Item::Fn(f) = &ast[0] else {
        panic!("expected fn");
    };
    let body = f.body.as_ref().unwrap();
    let tail = body.tail.as_ref().unwrap();
    assert!(analysis.type_of(tail.id).is_some());
}

#[test]
fn test_forward_reference_between_items() {
    assert_clean(
        "fn first() -> i32 { second() }\n\
         fn second() -> i32 { 1i32 }",
    );
}

#[test]
fn test_struct_member_access() {
    assert_clean(
        "struct P { x: i32, y: i32 }\n\
         fn f(p: P) -> i32 { p.x + p.y }",
    );
}

#[test]
fn test_tuple_struct_access_and_construction() {
    assert_clean(
        "struct Pair(i32, i32);\n\
         fn f() -> i32 { let p = Pair(1i32, 2i32); p.0 + p.1 }",
    );
}

#[test]
fn test_struct_literal_checks() {
    assert_clean(
        "struct P { x: i32, y: i32 }\n\
         fn f() -> i32 { let p = P { x: 1i32, y: 2i32 }; p.x }",
    );
    assert_error_containing(
        "struct P { x: i32 }\nfn f() { let p = P { x: 1i32, z: 2i32 }; }",
        "no field `z`",
    );
    assert_error_containing(
        "struct P { x: i32, y: i32 }\nfn f() { let p = P { x: 1i32 }; }",
        "missing field `y`",
    );
    assert_error_containing(
        "struct P { x: i32 }\nfn f() { let p = P { x: true }; }",
        "mismatched type for field `x`",
    );
}

#[test]
fn test_if_arms_must_agree() {
    assert_error_containing(
        "fn f() -> u32 { if true { 1 } else { 1u32 } }",
        "if arms differ in type",
    );
}

#[test]
fn test_if_condition_must_be_bool() {
    assert_error_containing("fn f() { if 1 { } }", "`if` condition must be `bool`");
}

#[test]
fn test_if_without_else_must_be_void() {
    assert_error_containing(
        "fn f() { if true { 1i32 } }",
        "`if` without `else` must have type `void`",
    );
}

#[test]
fn test_unknown_identifier() {
    assert_error_containing("fn f() -> i32 { missing }", "unknown identifier `missing`");
}

#[test]
fn test_unknown_type() {
    assert_error_containing("fn f(x: Widget) { }", "unknown type `Widget`");
}

#[test]
fn test_assignment_to_immutable() {
    assert_error_containing(
        "fn f() { let x = 1i32; x = 2i32; }",
        "cannot assign to immutable binding `x`",
    );
}

#[test]
fn test_assignment_to_mutable_is_fine() {
    assert_clean("fn f() { let mut x = 1i32; x = 2i32; x += 3i32; }");
}

#[test]
fn test_assignment_type_mismatch() {
    assert_error_containing(
        "fn f() { let mut x = 1i32; x = true; }",
        "mismatched types in assignment",
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_error_containing("fn f() { 1i32 = 2i32; }", "invalid assignment target");
}

#[test]
fn test_operator_operand_sets() {
    assert_error_containing("fn f() { let x = true + false; }", "cannot be applied");
    assert_error_containing("fn f() { let x = 1.5 % 2.5; }", "cannot be applied");
    assert_error_containing("fn f() { let x = 1i32 && 2i32; }", "cannot be applied");
}

#[test]
fn test_operands_must_share_a_type() {
    assert_error_containing(
        "fn f() { let x = 1i32 + 1i64; }",
        "mismatched operand types",
    );
}

#[test]
fn test_comparison_yields_bool() {
    assert_clean("fn f(x: i32) -> bool { x < 10i32 }");
}

#[test]
fn test_cast_rules() {
    assert_clean("fn f(x: i32) -> i64 { x as i64 }");
    assert_error_containing("fn f(x: bool) -> i32 { x as i32 }", "`as` requires numeric");
}

#[test]
fn test_unary_rules() {
    assert_clean("fn f(x: i32) -> i32 { -x }");
    assert_error_containing("fn f(x: u32) -> u32 { -x }", "signed numeric");
    assert_clean("fn f(x: bool) -> bool { !x }");
}

#[test]
fn test_references() {
    assert_clean("fn f(x: i32) -> i32 { let r = &x; *r }");
    assert_error_containing("fn f(x: i32) { let y = *x; }", "cannot dereference");
}

#[test]
fn test_reference_type_equality_is_structural() {
    assert_clean("fn f(r: &i32) -> i32 { let s: &i32 = r; *s }");
    assert_error_containing(
        "fn f(r: &i32) { let s: &mut i32 = r; }",
        "mismatched types in `let`",
    );
}

#[test]
fn test_call_arity_and_argument_types() {
    assert_error_containing(
        "fn g(x: i32) { }\nfn f() { g(); }",
        "expects 1 arguments, found 0",
    );
    assert_error_containing(
        "fn g(x: i32) { }\nfn f() { g(true); }",
        "mismatched type in argument 1",
    );
}

#[test]
fn test_loop_break_value_typing() {
    let analysis = assert_clean("fn f() -> i32 { loop { break 7i32; } }");
    drop(analysis);
    assert_error_containing(
        "fn f() { loop { if true { break 1i32; } else { break 2u32; } } }",
        "`break` values differ in type",
    );
}

#[test]
fn test_break_value_only_in_loop() {
    assert_error_containing(
        "fn f() { while true { break 1i32; } }",
        "can only `break` with a value inside `loop`",
    );
}

#[test]
fn test_break_outside_loop() {
    assert_error_containing("fn f() { break; }", "`break` outside of a loop");
    assert_error_containing("fn f() { continue; }", "`continue` outside of a loop");
}

#[test]
fn test_while_scenario() {
    assert_clean("fn f() { let mut x: i32 = 0i32; while x < 10i32 { x = x + 1i32; } }");
}

#[test]
fn test_return_type_checking() {
    assert_clean("fn f() -> i32 { return 1i32; }");
    assert_error_containing(
        "fn f() -> i32 { return true; }",
        "mismatched return type",
    );
    assert_error_containing("fn f() { return 1i32; }", "mismatched return type");
}

#[test]
fn test_let_annotation_mismatch() {
    assert_error_containing(
        "fn f() { let x: bool = 1i32; }",
        "mismatched types in `let`",
    );
}

#[test]
fn test_let_without_type_or_init() {
    assert_error_containing("fn f() { let x; }", "type annotation needed");
}

#[test]
fn test_duplicate_definitions() {
    assert_error_containing(
        "fn f() { }\nfn f() { }",
        "duplicate definition of `f`",
    );
    assert_error_containing(
        "fn g() { let x = 1i32; let x = 2i32; }",
        "duplicate definition of `x`",
    );
}

#[test]
fn test_shadowing_in_inner_block_is_fine() {
    assert_clean("fn f() { let x = 1i32; { let x = 2i32; let y = x; } }");
}

#[test]
fn test_binding_visible_only_after_let() {
    assert_error_containing("fn f() { let x = y; let y = 1i32; }", "unknown identifier `y`");
}

#[test]
fn test_arrays_and_indexing() {
    assert_clean("fn f() -> i32 { let a = [1i32, 2i32, 3i32]; a[0usize] }");
    assert_error_containing(
        "fn f() -> i32 { let a = [1i32, 2i32]; a[0i32] }",
        "array index must be `usize`",
    );
    assert_error_containing(
        "fn f() { let a = [1i32, true]; }",
        "array elements differ in type",
    );
}

#[test]
fn test_array_repeat_form() {
    assert_clean("fn f() -> i32 { let a = [0i32; 4usize]; a[1usize] }");
    assert_error_containing(
        "fn f() { let a = [0i32; 4i32]; }",
        "array length must be `usize`",
    );
}

#[test]
fn test_for_over_array() {
    assert_clean("fn f() { let a = [1i32, 2i32]; for x in a { let y = x + 1i32; } }");
    assert_error_containing("fn f() { for x in 1i32 { } }", "`for` expects an array");
}

#[test]
fn test_tuple_member_bounds() {
    assert_clean("fn f() -> i32 { let t = (1i32, true); t.0 }");
    assert_error_containing(
        "fn f() -> i32 { let t = (1i32, true); t.2 }",
        "tuple index 2 out of range",
    );
}

#[test]
fn test_extern_functions_resolve() {
    let externs = [ExternSig {
        name: "print".to_string(),
        params: vec![ScalarTy::I32],
        ret: ScalarTy::Void,
    }];
    let (_, handler) = run_with_externs("fn f() { print(42i32); }", &externs);
    assert!(!handler.has_errors(), "{:?}", handler.diagnostics());

    let (_, handler) = run_with_externs("fn f() { print(true); }", &externs);
    assert!(handler.has_errors());
}

#[test]
fn test_errors_do_not_stop_analysis() {
    let (_, handler) = run(
        "fn f() { let a = missing1; let b = missing2; let c: bool = 1i32; }",
    );
    assert!(handler.error_count() >= 3, "{:?}", handler.diagnostics());
}

#[test]
fn test_const_item_typing() {
    assert_clean("const LIMIT: i32 = 100i32;\nfn f() -> i32 { LIMIT }");
    assert_error_containing("const LIMIT: bool = 1i32;", "constant `LIMIT` declared as");
}

#[test]
fn test_fn_locals_collects_nested_bindings() {
    let source = "fn f(a: i32) { let b = 1i32; { let c = 2i32; } }";
    let mut handler = Handler::new();
    let ast = parse_source(source, &mut handler);
    let analysis = analyze(&ast, &[], &mut handler);
    assert!(!handler.has_errors());
    let rillc_par::Item::Fn(f) = &ast[0] else {
        panic!("expected fn");
    };
    let locals = &analysis.fn_locals[&f.id];
    // Parameter a plus bindings b and c.
    assert_eq!(locals.len(), 3);
}
