//! Pattern parsing.
//!
//! Patterns appear in `let` bindings, function parameters, and `for` loops.
//! The single grammar ambiguity, `(p)` versus `(p,)`, is resolved by looking
//! for the trailing comma.

use rillc_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_pattern(&mut self) -> Pattern {
        let start = self.peek().span;
        match self.peek_kind() {
            TokenKind::Literal => {
                let token = self.bump();
                let value = token.scalar().cloned().expect("literal token has payload");
                Pattern {
                    id: self.node_id(),
                    span: token.span,
                    kind: PatternKind::Literal(value),
                }
            }
            TokenKind::Underscore => {
                let token = self.bump();
                Pattern {
                    id: self.node_id(),
                    span: token.span,
                    kind: PatternKind::Wildcard,
                }
            }
            TokenKind::DotDot => {
                let token = self.bump();
                Pattern {
                    id: self.node_id(),
                    span: token.span,
                    kind: PatternKind::Rest,
                }
            }
            TokenKind::Ampersand | TokenKind::AndAnd => {
                let double = self.peek_kind() == TokenKind::AndAnd;
                self.bump();
                let mutable = self.eat(TokenKind::Mut);
                let inner = self.parse_pattern();
                let span = start.merge(inner.span);
                Pattern {
                    id: self.node_id(),
                    span,
                    kind: PatternKind::Reference {
                        mutable,
                        double,
                        inner: Box::new(inner),
                    },
                }
            }
            TokenKind::LParen => self.parse_tuple_or_grouped_pattern(),
            TokenKind::Ref | TokenKind::Mut | TokenKind::Identifier => {
                self.parse_binding_or_struct_pattern()
            }
            _ => {
                let span = self.peek().span;
                let found = self.describe_current();
                let message = format!("expected pattern, found {}", found);
                self.error(message.clone(), span);
                if !matches!(
                    self.peek_kind(),
                    TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::Semicolon
                        | TokenKind::Colon
                        | TokenKind::Eof
                ) {
                    self.bump();
                }
                Pattern {
                    id: self.node_id(),
                    span,
                    kind: PatternKind::Error(message),
                }
            }
        }
    }

    /// `(p)` grouped, `()` empty tuple, `(p,)` and `(a, b)` tuples.
    fn parse_tuple_or_grouped_pattern(&mut self) -> Pattern {
        let start = self.peek().span;
        self.bump();

        if self.check(TokenKind::RParen) {
            let end = self.bump().span;
            return Pattern {
                id: self.node_id(),
                span: start.merge(end),
                kind: PatternKind::Tuple(Vec::new()),
            };
        }

        let first = self.parse_pattern();

        if self.eat(TokenKind::Comma) {
            let mut elems = vec![first];
            while !self.check(TokenKind::RParen) && !self.at_eof() {
                elems.push(self.parse_pattern());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let end = self.peek().span;
            self.expect(TokenKind::RParen);
            return Pattern {
                id: self.node_id(),
                span: start.merge(end),
                kind: PatternKind::Tuple(elems),
            };
        }

        let end = self.peek().span;
        self.expect(TokenKind::RParen);
        Pattern {
            id: self.node_id(),
            span: start.merge(end),
            kind: PatternKind::Grouped(Box::new(first)),
        }
    }

    /// `ref? mut? IDENT (@ pattern)?`, `Name { fields }`, `Name(elems)`.
    fn parse_binding_or_struct_pattern(&mut self) -> Pattern {
        let start = self.peek().span;
        let is_ref = self.eat(TokenKind::Ref);
        let is_mut = self.eat(TokenKind::Mut);

        let Some((name, name_span)) = self.expect_ident() else {
            let message = "expected identifier in pattern".to_string();
            return Pattern {
                id: self.node_id(),
                span: start,
                kind: PatternKind::Error(message),
            };
        };

        // Struct and tuple-struct patterns only apply to a bare name.
        if !is_ref && !is_mut {
            if self.check(TokenKind::LBrace) {
                return self.parse_struct_pattern(name, start);
            }
            if self.check(TokenKind::LParen) {
                return self.parse_tuple_struct_pattern(name, start);
            }
        }

        let sub = if self.eat(TokenKind::At) {
            Some(Box::new(self.parse_pattern()))
        } else {
            None
        };

        let end = sub.as_ref().map(|s| s.span).unwrap_or(name_span);
        Pattern {
            id: self.node_id(),
            span: start.merge(end),
            kind: PatternKind::Identifier {
                name,
                is_ref,
                is_mut,
                sub,
            },
        }
    }

    fn parse_struct_pattern(&mut self, name: String, start: rillc_util::Span) -> Pattern {
        self.bump();

        let mut fields = Vec::new();
        let mut has_rest = false;

        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            if self.eat(TokenKind::DotDot) {
                has_rest = true;
                break;
            }
            let Some((field_name, field_span)) = self.expect_ident() else {
                self.recover_to_stmt_boundary();
                break;
            };
            let pattern = if self.eat(TokenKind::Colon) {
                Some(self.parse_pattern())
            } else {
                None
            };
            let end = pattern.as_ref().map(|p| p.span).unwrap_or(field_span);
            fields.push(FieldPattern {
                name: field_name,
                pattern,
                span: field_span.merge(end),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let end = self.peek().span;
        self.expect(TokenKind::RBrace);
        Pattern {
            id: self.node_id(),
            span: start.merge(end),
            kind: PatternKind::Struct {
                name,
                fields,
                has_rest,
            },
        }
    }

    fn parse_tuple_struct_pattern(&mut self, name: String, start: rillc_util::Span) -> Pattern {
        self.bump();

        let mut elems = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_eof() {
            elems.push(self.parse_pattern());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let end = self.peek().span;
        self.expect(TokenKind::RParen);
        Pattern {
            id: self.node_id(),
            span: start.merge(end),
            kind: PatternKind::TupleStruct { name, elems },
        }
    }
}
