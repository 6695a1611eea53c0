//! Core lexer struct and dispatch.

use rillc_util::{Handler, Span, Stage};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

use super::{is_ident_continue, is_ident_start};

/// The rill lexer.
///
/// Transforms source text into a stream of [`Token`]s. Lexical errors are
/// reported to the shared [`Handler`] and surface in the stream as error
/// tokens; the lexer never stops early.
///
/// # Example
///
/// ```
/// use rillc_lex::{Lexer, TokenKind};
/// use rillc_util::Handler;
///
/// let mut handler = Handler::new();
/// let mut lexer = Lexer::new("let x = 1;", &mut handler);
/// assert_eq!(lexer.next().kind, TokenKind::Let);
/// assert_eq!(lexer.next().kind, TokenKind::Identifier);
/// ```
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,

    /// Shared diagnostic sink.
    pub(crate) handler: &'a mut Handler,

    /// Byte offset where the current token started.
    token_start_offset: usize,

    /// Line where the current token started (1-based).
    token_start_line: u32,

    /// Column where the current token started (1-based).
    token_start_column: u32,

    /// Open-delimiter balances for `()`, `[]`, and `{}`.
    paren_depth: u32,
    bracket_depth: u32,
    brace_depth: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start_offset: 0,
            token_start_line: 1,
            token_start_column: 1,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
        }
    }

    /// Returns whether more input remains.
    ///
    /// Trailing whitespace still counts as input; the stream ends with a
    /// single end-of-file token either way.
    pub fn has_next(&self) -> bool {
        !self.cursor.is_at_end()
    }

    /// Produces the next token, advancing the stream.
    pub fn next(&mut self) -> Token {
        if let Some(error) = self.skip_trivia() {
            return error;
        }

        self.mark_start();

        if self.cursor.is_at_end() {
            return self.make(TokenKind::Eof);
        }

        let c = self.cursor.peek(0);
        let c1 = self.cursor.peek(1);
        let c2 = self.cursor.peek(2);

        match c {
            c if c.is_ascii_digit() => self.lex_number(),
            '_' if is_ident_continue(c1) => self.lex_identifier(),
            'r' if c1 == '"' || (c1 == '#' && (c2 == '"' || c2 == '#')) => self.lex_raw_string(false),
            'b' if c1 == '\'' => self.lex_byte_char(),
            'b' if c1 == '"' => self.lex_byte_string(),
            'b' if c1 == 'r' && (c2 == '"' || c2 == '#') => self.lex_raw_string(true),
            c if is_ident_start(c) && c != '_' => self.lex_identifier(),
            '\'' => self.lex_char_or_lifetime(),
            '"' => self.lex_string(),
            _ => self.lex_operator(),
        }
    }

    /// Records the start coordinates of the token about to be lexed.
    pub(crate) fn mark_start(&mut self) {
        self.token_start_offset = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
    }

    /// Span from the marked token start to the current cursor position.
    pub(crate) fn span(&self) -> Span {
        Span::new(
            self.token_start_line,
            self.token_start_column,
            self.token_start_offset,
            self.cursor.line(),
            self.cursor.column(),
            self.cursor.position(),
        )
    }

    /// Token of the given kind over the current span.
    pub(crate) fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }

    /// Reports a lexical error and returns the matching error token.
    pub(crate) fn error_token(&mut self, message: impl Into<String>) -> Token {
        let message = message.into();
        let span = self.span();
        self.handler.error(Stage::Lex, message.clone(), span);
        Token::invalid(message, span)
    }

    /// Bumps the delimiter balance for an opening bracket.
    pub(crate) fn open_delim(&mut self, kind: TokenKind) -> Token {
        match kind {
            TokenKind::LParen => self.paren_depth += 1,
            TokenKind::LBracket => self.bracket_depth += 1,
            TokenKind::LBrace => self.brace_depth += 1,
            _ => unreachable!("not an opening delimiter"),
        }
        self.make(kind)
    }

    /// Checks the delimiter balance for a closing bracket. A closer with no
    /// matching opener is a lexical error; unclosed openers at end of file
    /// are left for the parser to report.
    pub(crate) fn close_delim(&mut self, kind: TokenKind) -> Token {
        let depth = match kind {
            TokenKind::RParen => &mut self.paren_depth,
            TokenKind::RBracket => &mut self.bracket_depth,
            TokenKind::RBrace => &mut self.brace_depth,
            _ => unreachable!("not a closing delimiter"),
        };
        if *depth == 0 {
            let text = kind.text();
            return self.error_token(format!("unmatched closing delimiter `{}`", text));
        }
        *depth -= 1;
        self.make(kind)
    }

    /// Lexes the whole input into a vector ending with the end-of-file token.
    pub fn tokenize(source: &str, handler: &mut Handler) -> Vec<Token> {
        let mut lexer = Lexer::new(source, handler);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next();
            let eof = token.is_eof();
            tokens.push(token);
            if eof {
                break;
            }
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = Lexer::next(self);
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}
