//! Expression parsing (Pratt / top-down operator precedence).
//!
//! Each infix operator owns a left binding power; left-associative operators
//! parse their right side one level tighter, the right-associative
//! assignments one level looser, and the comparison family is
//! non-associative so chains like `a < b < c` are rejected.

use rillc_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

/// Binding power levels. Higher binds tighter.
pub(crate) mod bp {
    /// Assignment family, right-associative.
    pub const ASSIGN: u8 = 2;
    /// `||`
    pub const OR: u8 = 4;
    /// `&&`
    pub const AND: u8 = 6;
    /// `==` `!=` `<` `>` `<=` `>=`, non-associative.
    pub const COMPARISON: u8 = 8;
    /// `|`
    pub const BIT_OR: u8 = 10;
    /// `^`
    pub const BIT_XOR: u8 = 12;
    /// `&`
    pub const BIT_AND: u8 = 14;
    /// `<<` `>>`
    pub const SHIFT: u8 = 16;
    /// `+` `-`
    pub const ADDITIVE: u8 = 18;
    /// `*` `/` `%`
    pub const MULTIPLICATIVE: u8 = 20;
    /// `as`
    pub const CAST: u8 = 22;
    /// Prefix `-` `!` `*` `&` `&&`
    pub const PREFIX: u8 = 24;
}

/// Infix operator of the current token, with its left binding power.
fn binary_op(kind: TokenKind) -> Option<(BinOp, u8)> {
    Some(match kind {
        TokenKind::OrOr => (BinOp::Or, bp::OR),
        TokenKind::AndAnd => (BinOp::And, bp::AND),
        TokenKind::EqEq => (BinOp::Eq, bp::COMPARISON),
        TokenKind::NotEq => (BinOp::Ne, bp::COMPARISON),
        TokenKind::Lt => (BinOp::Lt, bp::COMPARISON),
        TokenKind::Gt => (BinOp::Gt, bp::COMPARISON),
        TokenKind::LtEq => (BinOp::Le, bp::COMPARISON),
        TokenKind::GtEq => (BinOp::Ge, bp::COMPARISON),
        TokenKind::Pipe => (BinOp::BitOr, bp::BIT_OR),
        TokenKind::Caret => (BinOp::BitXor, bp::BIT_XOR),
        TokenKind::Ampersand => (BinOp::BitAnd, bp::BIT_AND),
        TokenKind::Shl => (BinOp::Shl, bp::SHIFT),
        TokenKind::Shr => (BinOp::Shr, bp::SHIFT),
        TokenKind::Plus => (BinOp::Add, bp::ADDITIVE),
        TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE),
        TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE),
        TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE),
        TokenKind::Percent => (BinOp::Rem, bp::MULTIPLICATIVE),
        _ => return None,
    })
}

/// Assignment operator of the current token.
fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Rem,
        TokenKind::AmpersandEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Core Pratt loop: parse an expression whose operators all have left
    /// binding power at least `min_bp`.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix();

        loop {
            let kind = self.peek_kind();

            if let Some(op) = assign_op(kind) {
                if bp::ASSIGN < min_bp {
                    break;
                }
                self.bump();
                // Right-associative: recurse at one level looser.
                let rhs = self.parse_expr_bp(bp::ASSIGN - 1);
                let span = lhs.span.merge(rhs.span);
                lhs = Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Assign(op, Box::new(lhs), Box::new(rhs)),
                };
                continue;
            }

            if kind == TokenKind::As {
                if bp::CAST < min_bp {
                    break;
                }
                self.bump();
                let ty = self.parse_type();
                let span = lhs.span.merge(ty.span);
                lhs = Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Cast(Box::new(lhs), ty),
                };
                continue;
            }

            if let Some((op, lbp)) = binary_op(kind) {
                if lbp < min_bp {
                    break;
                }
                if op.is_comparison() {
                    if let ExprKind::Binary(prev, ..) = &lhs.kind {
                        if prev.is_comparison() {
                            let span = self.peek().span;
                            self.error(
                                format!(
                                    "comparison operator `{}` cannot be chained",
                                    op.text()
                                ),
                                span,
                            );
                        }
                    }
                }
                self.bump();
                let rhs = self.parse_expr_bp(lbp + 1);
                let span = lhs.span.merge(rhs.span);
                lhs = Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                };
                continue;
            }

            break;
        }

        lhs
    }

    /// Prefix operators, then a primary with its postfix chain.
    fn parse_prefix(&mut self) -> Expr {
        let start = self.peek().span;
        match self.peek_kind() {
            TokenKind::Minus => {
                self.bump();
                let operand = self.parse_expr_bp(bp::PREFIX);
                self.unary(UnOp::Neg, operand, start)
            }
            TokenKind::Bang => {
                self.bump();
                let operand = self.parse_expr_bp(bp::PREFIX);
                self.unary(UnOp::Not, operand, start)
            }
            TokenKind::Star => {
                self.bump();
                let operand = self.parse_expr_bp(bp::PREFIX);
                self.unary(UnOp::Deref, operand, start)
            }
            TokenKind::Ampersand => {
                self.bump();
                let mutable = self.eat(TokenKind::Mut);
                let operand = self.parse_expr_bp(bp::PREFIX);
                self.unary(UnOp::Ref { mutable }, operand, start)
            }
            // `&&expr` is a double borrow in prefix position.
            TokenKind::AndAnd => {
                self.bump();
                let mutable = self.eat(TokenKind::Mut);
                let operand = self.parse_expr_bp(bp::PREFIX);
                let inner = self.unary(UnOp::Ref { mutable }, operand, start);
                self.unary(UnOp::Ref { mutable: false }, inner, start)
            }
            _ => {
                let primary = self.parse_primary();
                self.parse_postfix(primary)
            }
        }
    }

    fn unary(&mut self, op: UnOp, operand: Expr, start: rillc_util::Span) -> Expr {
        let span = start.merge(operand.span);
        Expr {
            id: self.node_id(),
            span,
            kind: ExprKind::Unary(op, Box::new(operand)),
        }
    }

    /// Postfix chain: member access, calls, indexing.
    fn parse_postfix(&mut self, mut expr: Expr) -> Expr {
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.bump();
                    let member = if self.check(TokenKind::Identifier) {
                        let (name, span) = self.expect_ident().unwrap();
                        (MemberName::Named(name), span)
                    } else if self.check(TokenKind::Literal) {
                        let token = self.bump();
                        match token.scalar().and_then(|s| s.as_unsigned()) {
                            Some(index) => (MemberName::Index(index), token.span),
                            None => {
                                self.error(
                                    "expected field name or tuple index after `.`",
                                    token.span,
                                );
                                (MemberName::Index(0), token.span)
                            }
                        }
                    } else {
                        let span = self.peek().span;
                        let found = self.describe_current();
                        self.error(format!("expected member name, found {}", found), span);
                        return expr;
                    };
                    let span = expr.span.merge(member.1);
                    expr = Expr {
                        id: self.node_id(),
                        span,
                        kind: ExprKind::Member(Box::new(expr), member.0),
                    };
                }
                TokenKind::LParen => {
                    self.bump();
                    let args = self.with_struct_literal(|p| p.parse_call_args());
                    let end = self.peek().span;
                    self.expect(TokenKind::RParen);
                    let span = expr.span.merge(end);
                    expr = Expr {
                        id: self.node_id(),
                        span,
                        kind: ExprKind::Call(Box::new(expr), args),
                    };
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.with_struct_literal(|p| p.parse_expr_bp(0));
                    let end = self.peek().span;
                    self.expect(TokenKind::RBracket);
                    let span = expr.span.merge(end);
                    expr = Expr {
                        id: self.node_id(),
                        span,
                        kind: ExprKind::Index(Box::new(expr), Box::new(index)),
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_eof() {
            args.push(self.parse_expr_bp(0));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    /// Primary expressions: literals, identifiers, grouping, collections,
    /// blocks, and control flow.
    fn parse_primary(&mut self) -> Expr {
        let start = self.peek().span;
        match self.peek_kind() {
            TokenKind::Literal => {
                let token = self.bump();
                let value = token.scalar().cloned().expect("literal token has payload");
                Expr {
                    id: self.node_id(),
                    span: token.span,
                    kind: ExprKind::Literal(value),
                }
            }
            TokenKind::Identifier => {
                if self.peek_ahead(1).kind == TokenKind::LBrace && self.struct_literal_allowed() {
                    return self.parse_struct_literal();
                }
                let token = self.bump();
                let name = token.ident_name().unwrap_or_default().to_string();
                Expr {
                    id: self.node_id(),
                    span: token.span,
                    kind: ExprKind::Identifier(name),
                }
            }
            TokenKind::LParen => self.parse_paren_expr(),
            TokenKind::LBracket => self.parse_array_expr(),
            TokenKind::LBrace => {
                let block = self.with_struct_literal(|p| p.parse_block());
                Expr {
                    id: self.node_id(),
                    span: block.span,
                    kind: ExprKind::Block(block),
                }
            }
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Loop => {
                self.bump();
                let body = self.with_struct_literal(|p| p.parse_block());
                let span = start.merge(body.span);
                Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Loop(body),
                }
            }
            TokenKind::While => {
                self.bump();
                let cond = self.without_struct_literal(|p| p.parse_expr_bp(0));
                let body = self.with_struct_literal(|p| p.parse_block());
                let span = start.merge(body.span);
                Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::While(Box::new(cond), body),
                }
            }
            TokenKind::For => {
                self.bump();
                let pattern = self.parse_pattern();
                self.expect(TokenKind::In);
                let iter = self.without_struct_literal(|p| p.parse_expr_bp(0));
                let body = self.with_struct_literal(|p| p.parse_block());
                let span = start.merge(body.span);
                Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::For(ForExpr {
                        pattern: Box::new(pattern),
                        iter: Box::new(iter),
                        body,
                    }),
                }
            }
            TokenKind::Break => {
                self.bump();
                let value = if self.expr_can_start_here() {
                    Some(Box::new(self.parse_expr_bp(0)))
                } else {
                    None
                };
                let span = match &value {
                    Some(v) => start.merge(v.span),
                    None => start,
                };
                Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Break(value),
                }
            }
            TokenKind::Continue => {
                let token = self.bump();
                Expr {
                    id: self.node_id(),
                    span: token.span,
                    kind: ExprKind::Continue,
                }
            }
            TokenKind::Return => {
                self.bump();
                let value = if self.expr_can_start_here() {
                    Some(Box::new(self.parse_expr_bp(0)))
                } else {
                    None
                };
                let span = match &value {
                    Some(v) => start.merge(v.span),
                    None => start,
                };
                Expr {
                    id: self.node_id(),
                    span,
                    kind: ExprKind::Return(value),
                }
            }
            TokenKind::Unknown => {
                // The lexer already reported this; carry it as an error node.
                let token = self.bump();
                let message = match token.value {
                    rillc_lex::TokenValue::Invalid(message) => message,
                    _ => "invalid token".to_string(),
                };
                Expr {
                    id: self.node_id(),
                    span: token.span,
                    kind: ExprKind::Error(message),
                }
            }
            _ => {
                let span = self.peek().span;
                let found = self.describe_current();
                let expr = self.error_expr(format!("expected expression, found {}", found), span);
                if !matches!(
                    self.peek_kind(),
                    TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::Eof
                ) {
                    self.bump();
                }
                expr
            }
        }
    }

    /// True if the current token can begin an expression; used by `break`
    /// and `return` to decide whether a value follows.
    fn expr_can_start_here(&self) -> bool {
        !matches!(
            self.peek_kind(),
            TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Eof
        )
    }

    /// `(expr)`, `()`, or `(a, b, ...)`.
    fn parse_paren_expr(&mut self) -> Expr {
        let start = self.peek().span;
        self.bump();

        self.with_struct_literal(|p| {
            if p.check(TokenKind::RParen) {
                let end = p.bump().span;
                return Expr {
                    id: p.node_id(),
                    span: start.merge(end),
                    kind: ExprKind::Tuple(Vec::new()),
                };
            }

            let first = p.parse_expr_bp(0);

            if p.eat(TokenKind::Comma) {
                let mut elems = vec![first];
                while !p.check(TokenKind::RParen) && !p.at_eof() {
                    elems.push(p.parse_expr_bp(0));
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
                let end = p.peek().span;
                p.expect(TokenKind::RParen);
                return Expr {
                    id: p.node_id(),
                    span: start.merge(end),
                    kind: ExprKind::Tuple(elems),
                };
            }

            p.expect(TokenKind::RParen);
            first
        })
    }

    /// `[a, b, c]` or `[value; count]`.
    fn parse_array_expr(&mut self) -> Expr {
        let start = self.peek().span;
        self.bump();

        self.with_struct_literal(|p| {
            if p.check(TokenKind::RBracket) {
                let end = p.bump().span;
                return Expr {
                    id: p.node_id(),
                    span: start.merge(end),
                    kind: ExprKind::Array(ArrayExpr::List(Vec::new())),
                };
            }

            let first = p.parse_expr_bp(0);

            if p.eat(TokenKind::Semicolon) {
                let count = p.parse_expr_bp(0);
                let end = p.peek().span;
                p.expect(TokenKind::RBracket);
                return Expr {
                    id: p.node_id(),
                    span: start.merge(end),
                    kind: ExprKind::Array(ArrayExpr::Repeat(Box::new(first), Box::new(count))),
                };
            }

            let mut elems = vec![first];
            while p.eat(TokenKind::Comma) {
                if p.check(TokenKind::RBracket) {
                    break;
                }
                elems.push(p.parse_expr_bp(0));
            }
            let end = p.peek().span;
            p.expect(TokenKind::RBracket);
            Expr {
                id: p.node_id(),
                span: start.merge(end),
                kind: ExprKind::Array(ArrayExpr::List(elems)),
            }
        })
    }

    fn parse_if_expr(&mut self) -> Expr {
        let start = self.peek().span;
        self.bump();

        let cond = self.without_struct_literal(|p| p.parse_expr_bp(0));
        let then_block = self.with_struct_literal(|p| p.parse_block());

        let else_branch = if self.eat(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if_expr()))
            } else {
                let block = self.with_struct_literal(|p| p.parse_block());
                Some(Box::new(Expr {
                    id: self.node_id(),
                    span: block.span,
                    kind: ExprKind::Block(block),
                }))
            }
        } else {
            None
        };

        let end = else_branch
            .as_ref()
            .map(|e| e.span)
            .unwrap_or(then_block.span);
        Expr {
            id: self.node_id(),
            span: start.merge(end),
            kind: ExprKind::If(IfExpr {
                cond: Box::new(cond),
                then_block,
                else_branch,
            }),
        }
    }

    /// `Name { field: value, shorthand, 0: value }`.
    fn parse_struct_literal(&mut self) -> Expr {
        let (name, start) = self.expect_ident().expect("caller checked identifier");
        self.expect(TokenKind::LBrace);

        let fields = self.with_struct_literal(|p| {
            let mut fields = Vec::new();
            while !p.check(TokenKind::RBrace) && !p.at_eof() {
                if p.check(TokenKind::Identifier) {
                    let (field_name, field_span) = p.expect_ident().unwrap();
                    if p.eat(TokenKind::Colon) {
                        let value = p.parse_expr_bp(0);
                        let span = field_span.merge(value.span);
                        fields.push(FieldInit::Named {
                            name: field_name,
                            value,
                            span,
                        });
                    } else {
                        fields.push(FieldInit::Shorthand {
                            name: field_name,
                            span: field_span,
                        });
                    }
                } else if p.check(TokenKind::Literal) {
                    let token = p.bump();
                    let index = token.scalar().and_then(|s| s.as_unsigned());
                    p.expect(TokenKind::Colon);
                    let value = p.parse_expr_bp(0);
                    match index {
                        Some(index) => {
                            let span = token.span.merge(value.span);
                            fields.push(FieldInit::Positional { index, value, span });
                        }
                        None => {
                            p.error("tuple field index must be an unsigned integer", token.span);
                        }
                    }
                } else {
                    let span = p.peek().span;
                    let found = p.describe_current();
                    p.error(format!("expected field initializer, found {}", found), span);
                    p.recover_to_stmt_boundary();
                    break;
                }

                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            fields
        });

        let end = self.peek().span;
        self.expect(TokenKind::RBrace);
        Expr {
            id: self.node_id(),
            span: start.merge(end),
            kind: ExprKind::StructLiteral(StructLiteralExpr { name, fields }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_lex::{Lexer, ScalarValue};
    use rillc_util::Handler;

    fn parse_expr(source: &str) -> (Expr, Handler) {
        let mut handler = Handler::new();
        let tokens = Lexer::tokenize(source, &mut handler);
        let mut parser = Parser::new(tokens, &mut handler);
        let expr = parser.parse_expression();
        (expr, handler)
    }

    fn parse_expr_ok(source: &str) -> Expr {
        let (expr, handler) = parse_expr(source);
        assert!(
            !handler.has_errors(),
            "unexpected errors for {:?}: {:?}",
            source,
            handler.diagnostics()
        );
        expr
    }

    fn binary_parts(expr: &Expr) -> (BinOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Binary(op, lhs, rhs) => (*op, lhs, rhs),
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_literal() {
        let expr = parse_expr_ok("42");
        assert!(matches!(expr.kind, ExprKind::Literal(ScalarValue::U8(42))));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse_expr_ok("1 + 2 * 3");
        let (op, lhs, rhs) = binary_parts(&expr);
        assert_eq!(op, BinOp::Add);
        assert!(matches!(lhs.kind, ExprKind::Literal(ScalarValue::U8(1))));
        let (op, lhs, rhs) = binary_parts(rhs);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(lhs.kind, ExprKind::Literal(ScalarValue::U8(2))));
        assert!(matches!(rhs.kind, ExprKind::Literal(ScalarValue::U8(3))));
    }

    #[test]
    fn test_left_associativity() {
        // a - b - c parses as (a - b) - c
        let expr = parse_expr_ok("a - b - c");
        let (op, lhs, _) = binary_parts(&expr);
        assert_eq!(op, BinOp::Sub);
        let (inner_op, ..) = binary_parts(lhs);
        assert_eq!(inner_op, BinOp::Sub);
    }

    #[test]
    fn test_paren_grouping_with_prefix() {
        // (a + b) * -c
        let expr = parse_expr_ok("(a + b) * -c");
        let (op, lhs, rhs) = binary_parts(&expr);
        assert_eq!(op, BinOp::Mul);
        let (inner, ..) = binary_parts(lhs);
        assert_eq!(inner, BinOp::Add);
        match &rhs.kind {
            ExprKind::Unary(UnOp::Neg, operand) => {
                assert!(matches!(&operand.kind, ExprKind::Identifier(n) if n == "c"));
            }
            other => panic!("expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_right_associative() {
        // a = b = c parses as a = (b = c)
        let expr = parse_expr_ok("a = b = c");
        match &expr.kind {
            ExprKind::Assign(AssignOp::Assign, _, rhs) => {
                assert!(matches!(rhs.kind, ExprKind::Assign(AssignOp::Assign, ..)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_assignment() {
        let expr = parse_expr_ok("x += 1");
        assert!(matches!(expr.kind, ExprKind::Assign(AssignOp::Add, ..)));
        let expr = parse_expr_ok("x <<= 2");
        assert!(matches!(expr.kind, ExprKind::Assign(AssignOp::Shl, ..)));
    }

    #[test]
    fn test_comparison_not_chainable() {
        let (_, handler) = parse_expr("a < b < c");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_comparison_result_usable() {
        let expr = parse_expr_ok("a < b && c < d");
        let (op, ..) = binary_parts(&expr);
        assert_eq!(op, BinOp::And);
    }

    #[test]
    fn test_cast() {
        let expr = parse_expr_ok("x as i64");
        match &expr.kind {
            ExprKind::Cast(_, ty) => {
                assert!(matches!(&ty.kind, TypeKind::Named(n) if n == "i64"));
            }
            other => panic!("expected cast, got {:?}", other),
        }
    }

    #[test]
    fn test_cast_binds_tighter_than_mul() {
        // a * b as i64 parses as a * (b as i64)
        let expr = parse_expr_ok("a * b as i64");
        let (op, _, rhs) = binary_parts(&expr);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(rhs.kind, ExprKind::Cast(..)));
    }

    #[test]
    fn test_prefix_operators() {
        assert!(matches!(
            parse_expr_ok("!flag").kind,
            ExprKind::Unary(UnOp::Not, _)
        ));
        assert!(matches!(
            parse_expr_ok("*ptr").kind,
            ExprKind::Unary(UnOp::Deref, _)
        ));
        assert!(matches!(
            parse_expr_ok("&x").kind,
            ExprKind::Unary(UnOp::Ref { mutable: false }, _)
        ));
        assert!(matches!(
            parse_expr_ok("&mut x").kind,
            ExprKind::Unary(UnOp::Ref { mutable: true }, _)
        ));
    }

    #[test]
    fn test_double_borrow() {
        let expr = parse_expr_ok("&&x");
        match expr.kind {
            ExprKind::Unary(UnOp::Ref { mutable: false }, inner) => {
                assert!(matches!(inner.kind, ExprKind::Unary(UnOp::Ref { .. }, _)));
            }
            other => panic!("expected double borrow, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_and_still_binary() {
        let expr = parse_expr_ok("a && b");
        let (op, ..) = binary_parts(&expr);
        assert_eq!(op, BinOp::And);
    }

    #[test]
    fn test_call_and_args() {
        let expr = parse_expr_ok("f(1, 2, 3)");
        match &expr.kind {
            ExprKind::Call(callee, args) => {
                assert!(matches!(&callee.kind, ExprKind::Identifier(n) if n == "f"));
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_member_access() {
        let expr = parse_expr_ok("p.x");
        assert!(matches!(
            &expr.kind,
            ExprKind::Member(_, MemberName::Named(n)) if n == "x"
        ));

        let expr = parse_expr_ok("t.0");
        assert!(matches!(
            &expr.kind,
            ExprKind::Member(_, MemberName::Index(0))
        ));
    }

    #[test]
    fn test_index() {
        let expr = parse_expr_ok("a[i]");
        assert!(matches!(expr.kind, ExprKind::Index(..)));
    }

    #[test]
    fn test_postfix_chain() {
        let expr = parse_expr_ok("p.pos[0].x");
        assert!(matches!(
            &expr.kind,
            ExprKind::Member(_, MemberName::Named(n)) if n == "x"
        ));
    }

    #[test]
    fn test_tuple_expressions() {
        assert!(matches!(
            parse_expr_ok("()").kind,
            ExprKind::Tuple(ref elems) if elems.is_empty()
        ));
        assert!(matches!(
            parse_expr_ok("(1,)").kind,
            ExprKind::Tuple(ref elems) if elems.len() == 1
        ));
        assert!(matches!(
            parse_expr_ok("(1, 2)").kind,
            ExprKind::Tuple(ref elems) if elems.len() == 2
        ));
        // A parenthesized expression is not a tuple.
        assert!(matches!(
            parse_expr_ok("(1)").kind,
            ExprKind::Literal(ScalarValue::U8(1))
        ));
    }

    #[test]
    fn test_array_expressions() {
        assert!(matches!(
            parse_expr_ok("[1, 2, 3]").kind,
            ExprKind::Array(ArrayExpr::List(ref elems)) if elems.len() == 3
        ));
        assert!(matches!(
            parse_expr_ok("[0; 8]").kind,
            ExprKind::Array(ArrayExpr::Repeat(..))
        ));
    }

    #[test]
    fn test_struct_literal() {
        let expr = parse_expr_ok("Point { x: 1, y: 2 }");
        match &expr.kind {
            ExprKind::StructLiteral(lit) => {
                assert_eq!(lit.name, "Point");
                assert_eq!(lit.fields.len(), 2);
            }
            other => panic!("expected struct literal, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literal_shorthand() {
        let expr = parse_expr_ok("Point { x, y: 2 }");
        match &expr.kind {
            ExprKind::StructLiteral(lit) => {
                assert!(matches!(lit.fields[0], FieldInit::Shorthand { .. }));
                assert!(matches!(lit.fields[1], FieldInit::Named { .. }));
            }
            other => panic!("expected struct literal, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literal_excluded_in_while_condition() {
        // `limit { }` is a condition identifier followed by the body block,
        // not a struct literal.
        let expr = parse_expr_ok("while limit { }");
        match &expr.kind {
            ExprKind::While(cond, _) => {
                assert!(matches!(&cond.kind, ExprKind::Identifier(n) if n == "limit"));
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literal_allowed_in_parens_inside_condition() {
        let expr = parse_expr_ok("if (Point { x: 1, y: 2 }).x == 1 { }");
        match &expr.kind {
            ExprKind::If(if_expr) => {
                let (op, ..) = binary_parts(&if_expr.cond);
                assert_eq!(op, BinOp::Eq);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let expr = parse_expr_ok("if a { 1 } else if b { 2 } else { 3 }");
        match &expr.kind {
            ExprKind::If(if_expr) => {
                let else_branch = if_expr.else_branch.as_ref().unwrap();
                assert!(matches!(else_branch.kind, ExprKind::If(_)));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_break_with_value() {
        let expr = parse_expr_ok("loop { break 42; }");
        match &expr.kind {
            ExprKind::Loop(body) => match &body.stmts[0] {
                Stmt::Expr(e) => assert!(matches!(&e.kind, ExprKind::Break(Some(_)))),
                other => panic!("expected break statement, got {:?}", other),
            },
            other => panic!("expected loop, got {:?}", other),
        }
    }

    #[test]
    fn test_return_without_value() {
        let expr = parse_expr_ok("{ return; }");
        match &expr.kind {
            ExprKind::Block(block) => match &block.stmts[0] {
                Stmt::Expr(e) => assert!(matches!(e.kind, ExprKind::Return(None))),
                other => panic!("expected return statement, got {:?}", other),
            },
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_error_recovery_produces_error_node() {
        let (expr, handler) = parse_expr("1 + ;");
        assert!(handler.has_errors());
        let (_, _, rhs) = binary_parts(&expr);
        assert!(matches!(rhs.kind, ExprKind::Error(_)));
    }
}
