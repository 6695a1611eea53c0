//! Whitespace and comment skipping.
//!
//! Runs before every token. Line comments extend to the next newline; block
//! comments nest. An unterminated block comment produces an error token
//! anchored at the comment opener.

use crate::token::Token;
use crate::Lexer;

/// Whitespace per the language definition: ASCII whitespace plus NEL, the
/// directional marks, and the Unicode line/paragraph separators.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{200E}' || c == '\u{200F}'
}

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments. Returns an error token if an
    /// unterminated block comment swallowed the rest of the input.
    pub(crate) fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            let c = self.cursor.peek(0);

            if is_whitespace(c) && !self.cursor.is_at_end() {
                self.cursor.bump();
                continue;
            }

            if c == '/' && self.cursor.peek(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.peek(0) != '\n' {
                    self.cursor.bump();
                }
                continue;
            }

            if c == '/' && self.cursor.peek(1) == '*' {
                self.mark_start();
                if !self.skip_block_comment() {
                    return Some(self.error_token("unterminated block comment"));
                }
                continue;
            }

            return None;
        }
    }

    /// Consumes a block comment, honouring nesting. Returns false if the
    /// input ended before the comment closed.
    fn skip_block_comment(&mut self) -> bool {
        self.cursor.skip(2);
        let mut depth = 1u32;

        while depth > 0 {
            if self.cursor.is_at_end() {
                return false;
            }
            if self.cursor.peek(0) == '/' && self.cursor.peek(1) == '*' {
                depth += 1;
                self.cursor.skip(2);
            } else if self.cursor.peek(0) == '*' && self.cursor.peek(1) == '/' {
                depth -= 1;
                self.cursor.skip(2);
            } else {
                self.cursor.bump();
            }
        }

        true
    }
}
