//! Item parsing: functions, structs, constants.
//!
//! Grammar:
//!
//! ```text
//! item     := function | structure | constant
//! function := 'const'? 'fn' IDENT '(' params? ')' ('->' type)? (block | ';')
//! params   := param (',' param)* ','?
//! param    := pattern ':' type
//! structure := 'struct' IDENT '{' fields '}' | 'struct' IDENT '(' types ')' ';'
//! constant := 'const' IDENT ':' type ('=' expr)? ';'
//! ```

use rillc_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses one top-level item, resynchronizing at the next item keyword
    /// on failure.
    pub(crate) fn parse_item(&mut self) -> Item {
        match self.peek_kind() {
            TokenKind::Fn => self.parse_fn_item(false),
            TokenKind::Const => {
                if self.peek_ahead(1).kind == TokenKind::Fn {
                    self.bump();
                    self.parse_fn_item(true)
                } else {
                    self.parse_const_item()
                }
            }
            TokenKind::Struct => self.parse_struct_item(),
            _ => {
                let span = self.peek().span;
                let found = self.describe_current();
                let message = format!("expected item, found {}", found);
                self.error(message.clone(), span);
                self.bump();
                self.recover_to_item();
                Item::Error(ErrorNode { message, span })
            }
        }
    }

    fn parse_fn_item(&mut self, is_const: bool) -> Item {
        let start = self.peek().span;
        let id = self.node_id();
        self.bump();

        let Some((name, _)) = self.expect_ident() else {
            self.recover_to_item();
            return Item::Error(ErrorNode {
                message: "function without a name".to_string(),
                span: start,
            });
        };

        self.expect(TokenKind::LParen);
        let params = self.parse_params();
        self.expect(TokenKind::RParen);

        let ret_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type())
        } else {
            None
        };

        let (body, end) = if self.check(TokenKind::Semicolon) {
            let end = self.bump().span;
            (None, end)
        } else if self.check(TokenKind::LBrace) {
            let block = self.parse_block();
            let end = block.span;
            (Some(block), end)
        } else {
            let span = self.peek().span;
            let found = self.describe_current();
            self.error(format!("expected function body or `;`, found {}", found), span);
            self.recover_to_item();
            (None, span)
        };

        Item::Fn(FnItem {
            id,
            name,
            is_const,
            params,
            ret_type,
            body,
            span: start.merge(end),
        })
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_eof() {
            let start = self.peek().span;
            let id = self.node_id();
            let pattern = self.parse_pattern();
            self.expect(TokenKind::Colon);
            let ty = self.parse_type();
            let span = start.merge(ty.span);
            params.push(Param {
                id,
                pattern,
                ty,
                span,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    fn parse_struct_item(&mut self) -> Item {
        let start = self.peek().span;
        let id = self.node_id();
        self.bump();

        let Some((name, _)) = self.expect_ident() else {
            self.recover_to_item();
            return Item::Error(ErrorNode {
                message: "struct without a name".to_string(),
                span: start,
            });
        };

        match self.peek_kind() {
            TokenKind::LBrace => {
                self.bump();
                let mut fields = Vec::new();
                while !self.check(TokenKind::RBrace) && !self.at_eof() {
                    let Some((field_name, field_span)) = self.expect_ident() else {
                        self.recover_to_stmt_boundary();
                        break;
                    };
                    self.expect(TokenKind::Colon);
                    let ty = self.parse_type();
                    let span = field_span.merge(ty.span);
                    fields.push(FieldDef {
                        name: field_name,
                        ty,
                        span,
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.peek().span;
                self.expect(TokenKind::RBrace);
                Item::Struct(StructItem {
                    id,
                    name,
                    fields: StructFields::Record(fields),
                    span: start.merge(end),
                })
            }
            TokenKind::LParen => {
                self.bump();
                let mut elems = Vec::new();
                while !self.check(TokenKind::RParen) && !self.at_eof() {
                    elems.push(self.parse_type());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen);
                let end = self.peek().span;
                self.expect(TokenKind::Semicolon);
                Item::Struct(StructItem {
                    id,
                    name,
                    fields: StructFields::Tuple(elems),
                    span: start.merge(end),
                })
            }
            _ => {
                let span = self.peek().span;
                let found = self.describe_current();
                let message = format!("expected `{{` or `(` after struct name, found {}", found);
                self.error(message.clone(), span);
                self.recover_to_item();
                Item::Error(ErrorNode { message, span })
            }
        }
    }

    fn parse_const_item(&mut self) -> Item {
        let start = self.peek().span;
        let id = self.node_id();
        self.bump();

        let Some((name, _)) = self.expect_ident() else {
            self.recover_to_item();
            return Item::Error(ErrorNode {
                message: "constant without a name".to_string(),
                span: start,
            });
        };

        self.expect(TokenKind::Colon);
        let ty = self.parse_type();

        let value = if self.eat(TokenKind::Eq) {
            Some(self.with_struct_literal(|p| p.parse_expr_bp(0)))
        } else {
            None
        };

        let end = self.peek().span;
        if !self.expect(TokenKind::Semicolon) {
            self.recover_to_item();
        }

        Item::Const(ConstItem {
            id,
            name,
            ty,
            value,
            span: start.merge(end),
        })
    }
}
