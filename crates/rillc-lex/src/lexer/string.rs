//! Character, string, byte, byte-string, and raw literal lexing.
//!
//! Escape sequences: `\n \r \t \\ \0 \' \"`, `\xNN` (two hex digits, at most
//! 0x7F in char/string context and 0xFF in byte context), and `\u{...}` (one
//! to six hex digits naming a Unicode scalar value, never in byte context).
//! Raw strings carry `r` plus n `#` delimiters and end at a quote followed by
//! the same number of `#`. Byte strings hold ASCII-only content.

use crate::token::{ScalarValue, Token, TokenKind};
use crate::Lexer;

use super::{is_ident_continue, is_ident_start};

impl<'a> Lexer<'a> {
    /// Lexes a character literal or the `'static` lifetime keyword.
    pub(crate) fn lex_char_or_lifetime(&mut self) -> Token {
        self.cursor.bump();

        // An identifier char not closed by a quote is a lifetime.
        if is_ident_start(self.cursor.peek(0)) && self.cursor.peek(1) != '\'' {
            let start = self.cursor.position();
            while is_ident_continue(self.cursor.peek(0)) {
                self.cursor.bump();
            }
            let name = self.cursor.slice_from(start);
            if name == "static" {
                return self.make(TokenKind::StaticLifetime);
            }
            let name = name.to_string();
            return self.error_token(format!("unexpected lifetime `'{}`", name));
        }

        let c = match self.cursor.peek(0) {
            _ if self.cursor.is_at_end() => {
                return self.error_token("unterminated character literal");
            }
            '\'' => {
                self.cursor.bump();
                return self.error_token("empty character literal");
            }
            '\n' => {
                return self.error_token("unterminated character literal");
            }
            '\\' => {
                self.cursor.bump();
                match self.scan_escape(false) {
                    Ok(code) => char::from_u32(code).unwrap_or('\u{FFFD}'),
                    Err(message) => {
                        self.recover_to_quote('\'');
                        return self.error_token(message);
                    }
                }
            }
            c => {
                self.cursor.bump();
                c
            }
        };

        if !self.cursor.eat('\'') {
            self.recover_to_quote('\'');
            return self.error_token("unterminated character literal");
        }

        Token::literal(ScalarValue::Char(c), self.span())
    }

    /// Lexes a string literal with escape processing.
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor.bump();

        let mut content = String::new();
        let mut first_error: Option<String> = None;

        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated string literal");
            }

            let c = self.cursor.peek(0);
            if c == '"' {
                self.cursor.bump();
                break;
            }

            if c == '\\' {
                self.cursor.bump();
                match self.scan_escape(false) {
                    Ok(code) => content.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                    Err(message) => {
                        if first_error.is_none() {
                            first_error = Some(message);
                        }
                    }
                }
            } else {
                content.push(c);
                self.cursor.bump();
            }
        }

        match first_error {
            Some(message) => self.error_token(message),
            None => Token::literal(ScalarValue::Str(content), self.span()),
        }
    }

    /// Lexes a byte literal `b'x'`.
    pub(crate) fn lex_byte_char(&mut self) -> Token {
        self.cursor.skip(2);

        let byte = match self.cursor.peek(0) {
            '\'' => {
                self.cursor.bump();
                return self.error_token("empty byte literal");
            }
            '\\' => {
                self.cursor.bump();
                match self.scan_escape(true) {
                    Ok(code) => code as u8,
                    Err(message) => {
                        self.recover_to_quote('\'');
                        return self.error_token(message);
                    }
                }
            }
            c if c.is_ascii() && c != '\n' && !self.cursor.is_at_end() => {
                self.cursor.bump();
                c as u8
            }
            _ => {
                self.recover_to_quote('\'');
                return self.error_token("byte literal must be ASCII");
            }
        };

        if !self.cursor.eat('\'') {
            self.recover_to_quote('\'');
            return self.error_token("unterminated byte literal");
        }

        Token::literal(ScalarValue::U8(byte), self.span())
    }

    /// Lexes a byte-string literal `b"..."`.
    pub(crate) fn lex_byte_string(&mut self) -> Token {
        self.cursor.skip(2);

        let mut bytes = Vec::new();
        let mut first_error: Option<String> = None;

        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated byte string literal");
            }

            let c = self.cursor.peek(0);
            if c == '"' {
                self.cursor.bump();
                break;
            }

            if c == '\\' {
                self.cursor.bump();
                match self.scan_escape(true) {
                    Ok(code) => bytes.push(code as u8),
                    Err(message) => {
                        if first_error.is_none() {
                            first_error = Some(message);
                        }
                    }
                }
            } else if c.is_ascii() {
                bytes.push(c as u8);
                self.cursor.bump();
            } else {
                if first_error.is_none() {
                    first_error = Some("byte string literal must be ASCII".to_string());
                }
                self.cursor.bump();
            }
        }

        match first_error {
            Some(message) => self.error_token(message),
            None => Token::literal(ScalarValue::ByteStr(bytes), self.span()),
        }
    }

    /// Lexes a raw string `r#"..."#` or raw byte string `br#"..."#` with any
    /// number of `#` delimiters.
    pub(crate) fn lex_raw_string(&mut self, byte: bool) -> Token {
        if byte {
            self.cursor.bump();
        }
        self.cursor.bump();

        let mut hashes = 0usize;
        while self.cursor.peek(0) == '#' {
            hashes += 1;
            self.cursor.bump();
        }

        if !self.cursor.eat('"') {
            return self.error_token("expected `\"` after raw string prefix");
        }

        let content_start = self.cursor.position();
        let content_end;
        loop {
            if self.cursor.is_at_end() {
                return self.error_token("unterminated raw string literal");
            }
            if self.cursor.peek(0) == '"' {
                let mut all = true;
                for i in 0..hashes {
                    if self.cursor.peek(1 + i) != '#' {
                        all = false;
                        break;
                    }
                }
                if all {
                    content_end = self.cursor.position();
                    self.cursor.skip(1 + hashes);
                    break;
                }
            }
            self.cursor.bump();
        }

        let content = &self.cursor.slice_from(content_start)[..content_end - content_start];

        if byte {
            if !content.is_ascii() {
                return self.error_token("raw byte string literal must be ASCII");
            }
            Token::literal(ScalarValue::ByteStr(content.as_bytes().to_vec()), self.span())
        } else {
            Token::literal(ScalarValue::Str(content.to_string()), self.span())
        }
    }

    /// Decodes one escape sequence after the backslash. Returns the code
    /// point (or byte value in byte context).
    fn scan_escape(&mut self, byte_context: bool) -> Result<u32, String> {
        let c = self.cursor.peek(0);
        self.cursor.bump();

        match c {
            'n' => Ok(0x0A),
            'r' => Ok(0x0D),
            't' => Ok(0x09),
            '\\' => Ok(0x5C),
            '0' => Ok(0x00),
            '\'' => Ok(0x27),
            '"' => Ok(0x22),
            'x' => {
                let hi = self.cursor.peek(0);
                let lo = self.cursor.peek(1);
                if !hi.is_ascii_hexdigit() || !lo.is_ascii_hexdigit() {
                    return Err("invalid hex escape: expected two hex digits".to_string());
                }
                self.cursor.skip(2);
                let value = (hi.to_digit(16).unwrap() << 4) | lo.to_digit(16).unwrap();
                let limit = if byte_context { 0xFF } else { 0x7F };
                if value > limit {
                    return Err(format!("hex escape `\\x{}{}` out of range", hi, lo));
                }
                Ok(value)
            }
            'u' => {
                if byte_context {
                    return Err("unicode escapes are not allowed in byte literals".to_string());
                }
                if !self.cursor.eat('{') {
                    return Err("expected `{` after `\\u`".to_string());
                }
                let mut value: u32 = 0;
                let mut count = 0usize;
                while self.cursor.peek(0).is_ascii_hexdigit() {
                    if count == 6 {
                        return Err("unicode escape is too long".to_string());
                    }
                    value = (value << 4) | self.cursor.peek(0).to_digit(16).unwrap();
                    count += 1;
                    self.cursor.bump();
                }
                if count == 0 || !self.cursor.eat('}') {
                    return Err("malformed unicode escape".to_string());
                }
                if char::from_u32(value).is_none() {
                    return Err(format!("`\\u{{{:x}}}` is not a Unicode scalar value", value));
                }
                Ok(value)
            }
            _ => Err(format!("unknown escape sequence `\\{}`", c)),
        }
    }

    /// Skips ahead to a closing quote or line end after a malformed literal.
    fn recover_to_quote(&mut self, quote: char) {
        while !self.cursor.is_at_end() {
            let c = self.cursor.peek(0);
            if c == '\n' {
                break;
            }
            self.cursor.bump();
            if c == quote {
                break;
            }
        }
    }
}
