//! Type parsing.

use rillc_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> TypeAst {
        let start = self.peek().span;
        match self.peek_kind() {
            TokenKind::Identifier => {
                let token = self.bump();
                let name = token.ident_name().unwrap_or_default().to_string();
                TypeAst {
                    id: self.node_id(),
                    span: token.span,
                    kind: TypeKind::Named(name),
                }
            }
            TokenKind::Ampersand | TokenKind::AndAnd => {
                // `&&T` is a reference to a reference.
                let double = self.peek_kind() == TokenKind::AndAnd;
                self.bump();
                let mutable = self.eat(TokenKind::Mut);
                let inner = self.parse_type();
                let span = start.merge(inner.span);
                let reference = TypeAst {
                    id: self.node_id(),
                    span,
                    kind: TypeKind::Reference {
                        mutable,
                        inner: Box::new(inner),
                    },
                };
                if double {
                    TypeAst {
                        id: self.node_id(),
                        span,
                        kind: TypeKind::Reference {
                            mutable: false,
                            inner: Box::new(reference),
                        },
                    }
                } else {
                    reference
                }
            }
            TokenKind::LParen => {
                self.bump();
                if self.check(TokenKind::RParen) {
                    let end = self.bump().span;
                    return TypeAst {
                        id: self.node_id(),
                        span: start.merge(end),
                        kind: TypeKind::Tuple(Vec::new()),
                    };
                }

                let first = self.parse_type();

                if self.eat(TokenKind::Comma) {
                    let mut elems = vec![first];
                    while !self.check(TokenKind::RParen) && !self.at_eof() {
                        elems.push(self.parse_type());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.peek().span;
                    self.expect(TokenKind::RParen);
                    return TypeAst {
                        id: self.node_id(),
                        span: start.merge(end),
                        kind: TypeKind::Tuple(elems),
                    };
                }

                let end = self.peek().span;
                self.expect(TokenKind::RParen);
                TypeAst {
                    id: self.node_id(),
                    span: start.merge(end),
                    kind: TypeKind::Paren(Box::new(first)),
                }
            }
            TokenKind::LBracket => {
                self.bump();
                let elem = self.parse_type();
                self.expect(TokenKind::Semicolon);
                let len = self.with_struct_literal(|p| p.parse_expr_bp(0));
                let end = self.peek().span;
                self.expect(TokenKind::RBracket);
                TypeAst {
                    id: self.node_id(),
                    span: start.merge(end),
                    kind: TypeKind::Array {
                        elem: Box::new(elem),
                        len: Box::new(len),
                    },
                }
            }
            _ => {
                let span = self.peek().span;
                let found = self.describe_current();
                let message = format!("expected type, found {}", found);
                self.error(message.clone(), span);
                if !matches!(
                    self.peek_kind(),
                    TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::LBrace
                        | TokenKind::Eof
                ) {
                    self.bump();
                }
                TypeAst {
                    id: self.node_id(),
                    span,
                    kind: TypeKind::Error(message),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rillc_lex::Lexer;
    use rillc_util::Handler;

    fn parse_type_source(source: &str) -> (TypeAst, Handler) {
        let mut handler = Handler::new();
        let tokens = Lexer::tokenize(source, &mut handler);
        let mut parser = Parser::new(tokens, &mut handler);
        let ty = parser.parse_type();
        (ty, handler)
    }

    fn parse_type_ok(source: &str) -> TypeAst {
        let (ty, handler) = parse_type_source(source);
        assert!(
            !handler.has_errors(),
            "unexpected errors: {:?}",
            handler.diagnostics()
        );
        ty
    }

    #[test]
    fn test_named_type() {
        assert!(matches!(
            parse_type_ok("i32").kind,
            TypeKind::Named(ref n) if n == "i32"
        ));
        assert!(matches!(
            parse_type_ok("Point").kind,
            TypeKind::Named(ref n) if n == "Point"
        ));
    }

    #[test]
    fn test_unit_type() {
        assert!(matches!(
            parse_type_ok("()").kind,
            TypeKind::Tuple(ref elems) if elems.is_empty()
        ));
    }

    #[test]
    fn test_tuple_type() {
        assert!(matches!(
            parse_type_ok("(i32, bool)").kind,
            TypeKind::Tuple(ref elems) if elems.len() == 2
        ));
    }

    #[test]
    fn test_paren_type() {
        assert!(matches!(parse_type_ok("(i32)").kind, TypeKind::Paren(_)));
    }

    #[test]
    fn test_reference_types() {
        assert!(matches!(
            parse_type_ok("&i32").kind,
            TypeKind::Reference { mutable: false, .. }
        ));
        assert!(matches!(
            parse_type_ok("&mut i32").kind,
            TypeKind::Reference { mutable: true, .. }
        ));
        // `&&T` nests two references.
        match parse_type_ok("&&i32").kind {
            TypeKind::Reference { inner, .. } => {
                assert!(matches!(inner.kind, TypeKind::Reference { .. }));
            }
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn test_array_type() {
        match parse_type_ok("[u8; 16]").kind {
            TypeKind::Array { elem, .. } => {
                assert!(matches!(elem.kind, TypeKind::Named(ref n) if n == "u8"));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_types() {
        assert!(matches!(
            parse_type_ok("&(i32, &mut bool)").kind,
            TypeKind::Reference { .. }
        ));
    }

    #[test]
    fn test_invalid_type() {
        let (ty, handler) = parse_type_source("123");
        assert!(handler.has_errors());
        assert!(matches!(ty.kind, TypeKind::Error(_)));
    }
}
