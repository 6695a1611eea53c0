//! Identifier, raw identifier, and keyword lexing.

use crate::keyword::{self, KeywordCat};
use crate::token::{ScalarValue, Token, TokenKind};
use crate::Lexer;

use super::is_ident_continue;

/// Raw-identifier spellings that collide with path roots and are rejected.
const FORBIDDEN_RAW: [&str; 4] = ["crate", "self", "super", "Self"];

impl<'a> Lexer<'a> {
    /// Lexes an identifier, raw identifier, or keyword.
    ///
    /// `true` and `false` become boolean literal tokens. Strict and reserved
    /// keywords become their keyword kind; weak keywords lex as identifiers
    /// and are recognized contextually by the parser.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        let is_raw = self.cursor.peek(0) == 'r' && self.cursor.peek(1) == '#';
        if is_raw {
            self.cursor.skip(2);
        }

        let start = self.cursor.position();
        while is_ident_continue(self.cursor.peek(0)) {
            self.cursor.bump();
        }
        let text = self.cursor.slice_from(start).to_string();

        if is_raw {
            if FORBIDDEN_RAW.contains(&text.as_str()) {
                return self.error_token(format!("`r#{}` is not a valid raw identifier", text));
            }
            return Token::ident(text, self.span());
        }

        match keyword::find(&text) {
            Some(k) if k.kind == TokenKind::True => {
                Token::literal(ScalarValue::Bool(true), self.span())
            }
            Some(k) if k.kind == TokenKind::False => {
                Token::literal(ScalarValue::Bool(false), self.span())
            }
            Some(k) if matches!(k.cat, KeywordCat::Strict | KeywordCat::Reserved) => {
                self.make(k.kind)
            }
            _ => Token::ident(text, self.span()),
        }
    }
}
