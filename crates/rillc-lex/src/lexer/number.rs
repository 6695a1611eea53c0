//! Numeric literal lexing.
//!
//! Grammar:
//!
//! ```text
//! NUM    := ('0b' | '0o' | '0x')? DIGITS ('.' DIGITS?)? ([eE][+-]? DIGITS)? SUFFIX?
//! DIGITS := DIGIT ('_' | DIGIT)*
//! SUFFIX := ('u' | 'i') ('8' | '16' | '32' | '64') | 'usize' | 'isize' | 'f32' | 'f64'
//! ```
//!
//! A base prefix forces the base and forbids fraction and exponent. A
//! fraction or exponent forces a floating result. Unsuffixed integers take
//! the smallest unsigned width that holds the value; a suffix that cannot
//! hold the value is an error.

use crate::token::{ScalarValue, Token};
use crate::Lexer;

use super::{is_digit_in_base, is_ident_continue, is_ident_start};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_number(&mut self) -> Token {
        let mut base = 10u32;
        let mut has_prefix = false;

        if self.cursor.peek(0) == '0' {
            match self.cursor.peek(1) {
                'b' => base = 2,
                'o' => base = 8,
                'x' => base = 16,
                _ => {}
            }
            if base != 10 {
                has_prefix = true;
                self.cursor.skip(2);
            }
        }

        let mut digits = String::new();
        let mut digit_seen = false;
        loop {
            let c = self.cursor.peek(0);
            if c == '_' {
                self.cursor.bump();
            } else if is_digit_in_base(c, base) {
                digits.push(c);
                digit_seen = true;
                self.cursor.bump();
            } else {
                break;
            }
        }

        if !digit_seen {
            return self.error_token(format!("no digits after base-{} prefix", base));
        }

        let mut is_float = false;
        let mut float_text = digits.clone();

        if !has_prefix {
            // A '.' starts a fraction unless it begins a range operator.
            if self.cursor.peek(0) == '.' && self.cursor.peek(1) != '.' {
                self.cursor.bump();
                is_float = true;
                float_text.push('.');

                let mut fraction_seen = false;
                loop {
                    let c = self.cursor.peek(0);
                    if c == '_' {
                        self.cursor.bump();
                    } else if c.is_ascii_digit() {
                        float_text.push(c);
                        fraction_seen = true;
                        self.cursor.bump();
                    } else {
                        break;
                    }
                }

                if !fraction_seen
                    && !self.cursor.check_seq(0, "f32")
                    && !self.cursor.check_seq(0, "f64")
                {
                    return self.error_token("expected digits after decimal point");
                }
            }

            if matches!(self.cursor.peek(0), 'e' | 'E') {
                self.cursor.bump();
                is_float = true;
                float_text.push('e');

                let sign = self.cursor.peek(0);
                if sign == '+' || sign == '-' {
                    float_text.push(sign);
                    self.cursor.bump();
                }

                let mut exponent_seen = false;
                loop {
                    let c = self.cursor.peek(0);
                    if c == '_' {
                        self.cursor.bump();
                    } else if c.is_ascii_digit() {
                        float_text.push(c);
                        exponent_seen = true;
                        self.cursor.bump();
                    } else {
                        break;
                    }
                }

                if !exponent_seen {
                    return self.error_token("no digits in float exponent");
                }
            }
        }

        let suffix_start = self.cursor.position();
        if is_ident_start(self.cursor.peek(0)) {
            while is_ident_continue(self.cursor.peek(0)) {
                self.cursor.bump();
            }
        }
        let suffix = self.cursor.slice_from(suffix_start).to_string();

        match suffix.as_str() {
            "" => {
                if is_float {
                    self.float_literal::<f64>(&float_text)
                } else {
                    self.smallest_fit(&digits, base)
                }
            }
            "f32" | "f64" => {
                if has_prefix {
                    return self
                        .error_token(format!("suffix `{}` not allowed on a base-prefixed literal", suffix));
                }
                if suffix == "f32" {
                    self.float_literal::<f32>(&float_text)
                } else {
                    self.float_literal::<f64>(&float_text)
                }
            }
            _ if is_float => {
                self.error_token(format!("invalid suffix `{}` for float literal", suffix))
            }
            _ => self.integer_with_suffix(&digits, base, &suffix),
        }
    }

    /// Unsuffixed integer: smallest unsigned width that holds the value.
    fn smallest_fit(&mut self, digits: &str, base: u32) -> Token {
        let value = match u64::from_str_radix(digits, base) {
            Ok(v) => v,
            Err(_) => return self.error_token("integer literal too large"),
        };

        let value = if value <= u8::MAX as u64 {
            ScalarValue::U8(value as u8)
        } else if value <= u16::MAX as u64 {
            ScalarValue::U16(value as u16)
        } else if value <= u32::MAX as u64 {
            ScalarValue::U32(value as u32)
        } else {
            ScalarValue::U64(value)
        };

        Token::literal(value, self.span())
    }

    /// Integer with an explicit width suffix; the value must fit.
    fn integer_with_suffix(&mut self, digits: &str, base: u32, suffix: &str) -> Token {
        let value = match u64::from_str_radix(digits, base) {
            Ok(v) => v,
            Err(_) => return self.error_token("integer literal too large"),
        };

        let scalar = match suffix {
            "u8" if value <= u8::MAX as u64 => ScalarValue::U8(value as u8),
            "u16" if value <= u16::MAX as u64 => ScalarValue::U16(value as u16),
            "u32" if value <= u32::MAX as u64 => ScalarValue::U32(value as u32),
            "u64" | "usize" => ScalarValue::U64(value),
            "i8" if value <= i8::MAX as u64 => ScalarValue::I8(value as i8),
            "i16" if value <= i16::MAX as u64 => ScalarValue::I16(value as i16),
            "i32" if value <= i32::MAX as u64 => ScalarValue::I32(value as i32),
            "i64" | "isize" if value <= i64::MAX as u64 => ScalarValue::I64(value as i64),
            "u8" | "u16" | "u32" | "i8" | "i16" | "i32" | "i64" | "isize" => {
                return self.error_token(format!("literal {} does not fit in {}", value, suffix));
            }
            _ => {
                return self.error_token(format!("invalid numeric literal suffix `{}`", suffix));
            }
        };

        Token::literal(scalar, self.span())
    }

    fn float_literal<F: FloatWidth>(&mut self, text: &str) -> Token {
        match F::parse(text) {
            Some(value) => Token::literal(value, self.span()),
            None => self.error_token(format!("invalid floating point literal `{}`", text)),
        }
    }
}

/// Helper to share the float construction between the two widths.
trait FloatWidth {
    fn parse(text: &str) -> Option<ScalarValue>;
}

impl FloatWidth for f32 {
    fn parse(text: &str) -> Option<ScalarValue> {
        text.parse::<f32>().ok().filter(|v| v.is_finite()).map(ScalarValue::F32)
    }
}

impl FloatWidth for f64 {
    fn parse(text: &str) -> Option<ScalarValue> {
        text.parse::<f64>().ok().filter(|v| v.is_finite()).map(ScalarValue::F64)
    }
}
