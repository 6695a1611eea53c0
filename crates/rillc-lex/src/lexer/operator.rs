//! Operator and punctuation lexing.
//!
//! Multi-character operators are disambiguated by longest match, so `<<=`
//! wins over `<<` which wins over `<`.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    pub(crate) fn lex_operator(&mut self) -> Token {
        let c = self.cursor.peek(0);
        self.cursor.bump();

        match c {
            '+' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::PlusEq)
                } else {
                    self.make(TokenKind::Plus)
                }
            }
            '-' => {
                if self.cursor.eat('>') {
                    self.make(TokenKind::Arrow)
                } else if self.cursor.eat('=') {
                    self.make(TokenKind::MinusEq)
                } else {
                    self.make(TokenKind::Minus)
                }
            }
            '*' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::StarEq)
                } else if self.cursor.peek(0) == '/' {
                    self.cursor.bump();
                    self.error_token("unmatched block comment terminator `*/`")
                } else {
                    self.make(TokenKind::Star)
                }
            }
            // Comments were consumed as trivia, so a slash here is division.
            '/' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::SlashEq)
                } else {
                    self.make(TokenKind::Slash)
                }
            }
            '%' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::PercentEq)
                } else {
                    self.make(TokenKind::Percent)
                }
            }
            '^' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::CaretEq)
                } else {
                    self.make(TokenKind::Caret)
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::EqEq)
                } else if self.cursor.eat('>') {
                    self.make(TokenKind::FatArrow)
                } else {
                    self.make(TokenKind::Eq)
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::NotEq)
                } else {
                    self.make(TokenKind::Bang)
                }
            }
            '<' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::LtEq)
                } else if self.cursor.eat('<') {
                    if self.cursor.eat('=') {
                        self.make(TokenKind::ShlEq)
                    } else {
                        self.make(TokenKind::Shl)
                    }
                } else {
                    self.make(TokenKind::Lt)
                }
            }
            '>' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::GtEq)
                } else if self.cursor.eat('>') {
                    if self.cursor.eat('=') {
                        self.make(TokenKind::ShrEq)
                    } else {
                        self.make(TokenKind::Shr)
                    }
                } else {
                    self.make(TokenKind::Gt)
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    self.make(TokenKind::AndAnd)
                } else if self.cursor.eat('=') {
                    self.make(TokenKind::AmpersandEq)
                } else {
                    self.make(TokenKind::Ampersand)
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    self.make(TokenKind::OrOr)
                } else if self.cursor.eat('=') {
                    self.make(TokenKind::PipeEq)
                } else {
                    self.make(TokenKind::Pipe)
                }
            }
            ':' => {
                if self.cursor.eat(':') {
                    self.make(TokenKind::ColonColon)
                } else {
                    self.make(TokenKind::Colon)
                }
            }
            '.' => {
                if self.cursor.eat('.') {
                    if self.cursor.eat('=') {
                        self.make(TokenKind::DotDotEq)
                    } else if self.cursor.eat('.') {
                        self.make(TokenKind::DotDotDot)
                    } else {
                        self.make(TokenKind::DotDot)
                    }
                } else {
                    self.make(TokenKind::Dot)
                }
            }
            ',' => self.make(TokenKind::Comma),
            ';' => self.make(TokenKind::Semicolon),
            '@' => self.make(TokenKind::At),
            '#' => self.make(TokenKind::Pound),
            '$' => self.make(TokenKind::Dollar),
            '?' => self.make(TokenKind::Question),
            '_' => self.make(TokenKind::Underscore),
            '(' => self.open_delim(TokenKind::LParen),
            '[' => self.open_delim(TokenKind::LBracket),
            '{' => self.open_delim(TokenKind::LBrace),
            ')' => self.close_delim(TokenKind::RParen),
            ']' => self.close_delim(TokenKind::RBracket),
            '}' => self.close_delim(TokenKind::RBrace),
            c => self.error_token(format!("unexpected character `{}`", c)),
        }
    }
}
