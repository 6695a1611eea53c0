//! Edge case and property tests for rillc-lex.

use proptest::prelude::*;

use crate::keyword;
use crate::token::{ScalarValue, Token, TokenKind};
use crate::Lexer;
use rillc_util::Handler;

fn lex_all(source: &str) -> Vec<Token> {
    let mut handler = Handler::new();
    Lexer::new(source, &mut handler).collect()
}

#[test]
fn test_edge_empty_source() {
    assert!(lex_all("").is_empty());
}

#[test]
fn test_edge_whitespace_only() {
    assert!(lex_all("  \t\n  ").is_empty());
}

#[test]
fn test_edge_long_identifier() {
    let name = "a".repeat(10_000);
    let tokens = lex_all(&name);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].ident_name(), Some(name.as_str()));
}

#[test]
fn test_edge_adjacent_literals_and_operators() {
    let kinds: Vec<_> = lex_all("1+2*3").iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Literal,
            TokenKind::Plus,
            TokenKind::Literal,
            TokenKind::Star,
            TokenKind::Literal,
        ]
    );
}

#[test]
fn test_edge_deeply_nested_comments() {
    let mut source = String::new();
    for _ in 0..100 {
        source.push_str("/*");
    }
    source.push('x');
    for _ in 0..100 {
        source.push_str("*/");
    }
    assert!(lex_all(&source).is_empty());
}

#[test]
fn test_edge_full_program_token_count() {
    let source = "fn add(x: i32, y: i32) -> i32 { return x + y; }";
    let mut handler = Handler::new();
    let tokens = Lexer::tokenize(source, &mut handler);
    assert!(!handler.has_errors());
    // fn add ( x : i32 , y : i32 ) -> i32 { return x + y ; } eof
    assert_eq!(tokens.len(), 21);
}

#[test]
fn test_edge_errors_do_not_stop_the_stream() {
    let tokens = lex_all("1 ~~ 2");
    // The stray characters become error tokens, the literals survive.
    assert_eq!(tokens.first().unwrap().kind, TokenKind::Literal);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Literal);
}

proptest! {
    /// Any identifier-shaped string that is not a keyword lexes to exactly
    /// one identifier token whose payload is the input.
    #[test]
    fn prop_identifier_round_trip(s in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
        prop_assume!(!keyword::is_strict_or_reserved(&s));
        prop_assume!(s != "_");
        prop_assume!(s != "true" && s != "false");

        let tokens = lex_all(&s);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Identifier);
        prop_assert_eq!(tokens[0].ident_name(), Some(s.as_str()));
    }

    /// `to_string(n) + "i64"` always lexes back to n.
    #[test]
    fn prop_i64_round_trip(n in 0i64..=i64::MAX) {
        let source = format!("{}i64", n);
        let tokens = lex_all(&source);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].scalar(), Some(&ScalarValue::I64(n)));
    }

    /// Unsuffixed integers pick the smallest unsigned width that fits.
    #[test]
    fn prop_smallest_fit(n in 0u64..=u64::MAX) {
        let source = n.to_string();
        let tokens = lex_all(&source);
        prop_assert_eq!(tokens.len(), 1);
        let value = tokens[0].scalar().unwrap();
        let expected = if n <= u8::MAX as u64 {
            ScalarValue::U8(n as u8)
        } else if n <= u16::MAX as u64 {
            ScalarValue::U16(n as u16)
        } else if n <= u32::MAX as u64 {
            ScalarValue::U32(n as u32)
        } else {
            ScalarValue::U64(n)
        };
        prop_assert_eq!(value, &expected);
    }

    /// Lexing never panics on arbitrary input.
    #[test]
    fn prop_lexer_total(s in "\\PC{0,64}") {
        let _ = lex_all(&s);
    }
}
