//! rillc-par - Syntax Analysis
//!
//! Consumes the token stream and produces the AST of a translation unit: a
//! sequence of function, struct, and constant items. Expressions are parsed
//! with a Pratt (top-down operator precedence) parser; items, statements,
//! patterns, and types use plain recursive descent.
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `=` `+=` `-=` `*=` `/=` `%=` `&=` `\|=` `^=` `<<=` `>>=` | right |
//! | 2 | `\|\|` | left |
//! | 3 | `&&` | left |
//! | 4 | `==` `!=` `<` `>` `<=` `>=` | none |
//! | 5 | `\|` | left |
//! | 6 | `^` | left |
//! | 7 | `&` | left |
//! | 8 | `<<` `>>` | left |
//! | 9 | `+` `-` | left |
//! | 10 | `*` `/` `%` | left |
//! | 11 | `as` | left |
//! | 12 | prefix `-` `!` `*` `&` `&&` | right |
//! | 13 | postfix `.x` `.0` `(...)` `[...]` | left |
//!
//! # Error recovery
//!
//! On a syntactic mismatch the parser records a diagnostic, attaches an
//! `Error` node to the nearest enclosing construct, and resynchronizes at a
//! statement or item boundary (the next `;`, a matching closing bracket, or
//! a leading item keyword). One bad statement never hides the rest of the
//! file.

pub mod ast;
#[cfg(test)]
mod edge_cases;
mod expr;
mod items;
mod pattern;
mod stmt;
mod types;

pub use ast::*;

use rillc_lex::{Token, TokenKind, TokenValue};
use rillc_util::{Handler, Idx, Span, Stage};

/// The rill parser.
///
/// Operates on the full token vector produced by [`rillc_lex::Lexer::tokenize`]
/// (terminated by an end-of-file token).
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a mut Handler,
    next_node_id: u32,
    /// While true, `IDENT {` does not begin a struct literal. Set inside the
    /// condition of `if`/`while`/`for`, cleared inside any nested brackets.
    no_struct_literal: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `tokens`.
    ///
    /// The vector must end with an end-of-file token; `tokenize` guarantees
    /// this.
    pub fn new(tokens: Vec<Token>, handler: &'a mut Handler) -> Self {
        debug_assert!(tokens.last().map(|t| t.is_eof()).unwrap_or(false));
        Self {
            tokens,
            pos: 0,
            handler,
            next_node_id: 0,
            no_struct_literal: false,
        }
    }

    /// Parses a whole translation unit.
    pub fn parse(&mut self) -> Ast {
        let mut items = Vec::new();
        while !self.at_eof() {
            items.push(self.parse_item());
        }
        items
    }

    /// Parses a single expression; used by the expression test harness and
    /// the `-e` style tooling.
    pub fn parse_expression(&mut self) -> Expr {
        self.parse_expr_bp(0)
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes `kind` or reports what was found instead.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self.describe_current();
        let span = self.peek().span;
        self.error(format!("expected `{}`, found {}", kind.text(), found), span);
        false
    }

    /// Consumes an identifier token, returning its text.
    pub(crate) fn expect_ident(&mut self) -> Option<(String, Span)> {
        if self.check(TokenKind::Identifier) {
            let token = self.bump();
            let name = token.ident_name().unwrap_or_default().to_string();
            return Some((name, token.span));
        }
        let found = self.describe_current();
        let span = self.peek().span;
        self.error(format!("expected identifier, found {}", found), span);
        None
    }

    pub(crate) fn describe_current(&self) -> String {
        let token = self.peek();
        match (&token.kind, &token.value) {
            (TokenKind::Identifier, TokenValue::Ident(name)) => format!("identifier `{}`", name),
            (TokenKind::Literal, _) => "literal".to_string(),
            (TokenKind::Eof, _) => "end of file".to_string(),
            (TokenKind::Unknown, _) => "invalid token".to_string(),
            (kind, _) => format!("`{}`", kind.text()),
        }
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    pub(crate) fn node_id(&mut self) -> NodeId {
        let id = NodeId::from_usize(self.next_node_id as usize);
        self.next_node_id += 1;
        id
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.handler.error(Stage::Parse, message, span);
    }

    pub(crate) fn error_expr(&mut self, message: impl Into<String>, span: Span) -> Expr {
        let message = message.into();
        self.error(message.clone(), span);
        Expr {
            id: self.node_id(),
            span,
            kind: ExprKind::Error(message),
        }
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Skips forward to the next statement boundary: past the next `;`, or
    /// to a closing brace, an item keyword, or end of file.
    pub(crate) fn recover_to_stmt_boundary(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::Fn | TokenKind::Struct | TokenKind::Const | TokenKind::Let => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skips forward to the next item keyword or end of file.
    pub(crate) fn recover_to_item(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::Fn | TokenKind::Struct | TokenKind::Const => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Struct-literal context flag
    // ------------------------------------------------------------------

    /// Runs `f` with struct literals forbidden (loop and `if` headers).
    pub(crate) fn without_struct_literal<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.no_struct_literal;
        self.no_struct_literal = true;
        let result = f(self);
        self.no_struct_literal = saved;
        result
    }

    /// Runs `f` with struct literals allowed again (inside brackets).
    pub(crate) fn with_struct_literal<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.no_struct_literal;
        self.no_struct_literal = false;
        let result = f(self);
        self.no_struct_literal = saved;
        result
    }

    pub(crate) fn struct_literal_allowed(&self) -> bool {
        !self.no_struct_literal
    }
}

/// Convenience wrapper: lex and parse a translation unit.
pub fn parse_source(source: &str, handler: &mut Handler) -> Ast {
    let tokens = rillc_lex::Lexer::tokenize(source, handler);
    Parser::new(tokens, handler).parse()
}
