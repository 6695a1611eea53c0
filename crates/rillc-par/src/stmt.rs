//! Block and statement parsing.

use rillc_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses `{ stmt* tail-expr? }`.
    ///
    /// An expression at the end of the block without a terminating semicolon
    /// becomes the block's trailing expression and so its value. Block-like
    /// expressions (`if`, loops, plain blocks) may stand as statements
    /// without a semicolon.
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.peek().span;
        let id = self.node_id();

        if !self.expect(TokenKind::LBrace) {
            return Block {
                id,
                stmts: Vec::new(),
                tail: None,
                span: start,
            };
        }

        let mut stmts = Vec::new();
        let mut tail = None;

        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    let span = self.bump().span;
                    stmts.push(Stmt::Semi(span));
                }
                TokenKind::Let => {
                    stmts.push(self.parse_let_stmt());
                }
                _ => {
                    let expr = self.with_struct_literal(|p| p.parse_expr_bp(0));
                    if self.eat(TokenKind::Semicolon) {
                        stmts.push(Stmt::Expr(expr));
                    } else if self.check(TokenKind::RBrace) {
                        tail = Some(Box::new(expr));
                    } else if is_block_like(&expr) {
                        // Control-flow expressions stand as statements
                        // without a semicolon.
                        stmts.push(Stmt::Expr(expr));
                    } else {
                        let span = self.peek().span;
                        let found = self.describe_current();
                        self.error(format!("expected `;`, found {}", found), span);
                        stmts.push(Stmt::Expr(expr));
                        self.recover_to_stmt_boundary();
                    }
                }
            }
        }

        let end = self.peek().span;
        self.expect(TokenKind::RBrace);

        Block {
            id,
            stmts,
            tail,
            span: start.merge(end),
        }
    }

    /// `let pattern (: Type)? (= expr)? ;`
    fn parse_let_stmt(&mut self) -> Stmt {
        let start = self.peek().span;
        let id = self.node_id();
        self.bump();

        let pattern = self.parse_pattern();

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };

        let init = if self.eat(TokenKind::Eq) {
            Some(self.with_struct_literal(|p| p.parse_expr_bp(0)))
        } else {
            None
        };

        let end = self.peek().span;
        if !self.expect(TokenKind::Semicolon) {
            self.recover_to_stmt_boundary();
        }

        Stmt::Let(LetStmt {
            id,
            pattern,
            ty,
            init,
            span: start.merge(end),
        })
    }
}

/// Expressions whose statement form does not require a semicolon.
fn is_block_like(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Block(_)
            | ExprKind::If(_)
            | ExprKind::Loop(_)
            | ExprKind::While(..)
            | ExprKind::For(_)
    )
}
