//! Edge case tests for rillc-par.

use crate::{parse_source, Ast, Item};
use rillc_util::Handler;

fn parse(source: &str) -> (Ast, Handler) {
    let mut handler = Handler::new();
    let ast = parse_source(source, &mut handler);
    (ast, handler)
}

#[test]
fn test_empty_translation_unit() {
    let (ast, handler) = parse("");
    assert!(ast.is_empty());
    assert!(!handler.has_errors());
}

#[test]
fn test_parser_determinism() {
    // Same token stream must produce a structurally identical AST,
    // node ids included.
    let source = "struct P { x: i32, y: i32 }\n\
                  fn f(p: P) -> i32 { let q = p.x * 2; if q > 3 { q } else { 0 } }";
    let (first, h1) = parse(source);
    let (second, h2) = parse(source);
    assert!(!h1.has_errors() && !h2.has_errors());
    assert_eq!(first, second);
}

#[test]
fn test_deeply_nested_expression() {
    let mut source = String::from("fn f() -> i32 { ");
    source.push_str(&"(".repeat(64));
    source.push('1');
    source.push_str(&")".repeat(64));
    source.push_str(" }");
    let (_, handler) = parse(&source);
    assert!(!handler.has_errors());
}

#[test]
fn test_unclosed_brace_reported_by_parser() {
    let (_, handler) = parse("fn f() { 1 + 2");
    assert!(handler.has_errors());
}

#[test]
fn test_garbage_between_items() {
    let (ast, handler) = parse("fn a() { } ??? fn b() { }");
    assert!(handler.has_errors());
    let fns = ast.iter().filter(|i| matches!(i, Item::Fn(_))).count();
    assert_eq!(fns, 2);
}

#[test]
fn test_error_in_one_function_does_not_hide_the_next() {
    let (ast, handler) = parse("fn bad() { let = ; } fn good() { let x = 1; }");
    assert!(handler.has_errors());
    assert_eq!(ast.len(), 2);
}

#[test]
fn test_scenario_program_parses() {
    let source = "struct P { x: i32, y: i32 }\n\
                  fn f() -> i32 { let p = P { x: 1, y: 2 }; return p.x + p.y; }";
    let (ast, handler) = parse(source);
    assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    assert_eq!(ast.len(), 2);
}

#[test]
fn test_while_loop_program() {
    let source = "fn f() { let mut x: i32 = 0; while x < 10 { x = x + 1; } }";
    let (_, handler) = parse(source);
    assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
}
