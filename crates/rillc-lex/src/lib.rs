//! rillc-lex - Lexical Analysis
//!
//! Turns UTF-8 source text into a stream of position-tagged [`Token`]s.
//! The lexer skips whitespace and comments (including properly nested block
//! comments) before every token, disambiguates multi-character operators by
//! longest match, and decodes the full literal zoo of the language: numbers
//! with base prefixes and width suffixes, characters, strings, raw strings,
//! bytes, and byte strings.
//!
//! Errors never abort the stream. Malformed input produces an error token in
//! place and a diagnostic in the shared [`rillc_util::Handler`], and lexing
//! continues at the next character.

pub mod cursor;
#[cfg(test)]
mod edge_cases;
mod keyword;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use keyword::{Keyword, KeywordCat};
pub use lexer::Lexer;
pub use token::{ScalarTy, ScalarValue, Token, TokenKind, TokenValue};
