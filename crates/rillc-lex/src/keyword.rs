//! Keyword table.
//!
//! A fixed, immutable table associating keyword texts with token kinds and a
//! category. Strict and reserved keywords can never be used as identifiers;
//! weak keywords only have meaning in specific positions and otherwise lex as
//! plain identifiers.

use crate::token::TokenKind;

/// Keyword category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordCat {
    /// Always a keyword.
    Strict,
    /// Not usable yet, but withheld from the identifier space.
    Reserved,
    /// Contextual; lexes as an identifier outside its special position.
    Weak,
}

/// One keyword table entry.
#[derive(Debug)]
pub struct Keyword {
    pub text: &'static str,
    pub kind: TokenKind,
    pub cat: KeywordCat,
}

const fn kw(text: &'static str, kind: TokenKind, cat: KeywordCat) -> Keyword {
    Keyword { text, kind, cat }
}

/// The complete keyword table.
pub static KEYWORDS: &[Keyword] = &[
    kw("as", TokenKind::As, KeywordCat::Strict),
    kw("break", TokenKind::Break, KeywordCat::Strict),
    kw("const", TokenKind::Const, KeywordCat::Strict),
    kw("continue", TokenKind::Continue, KeywordCat::Strict),
    kw("crate", TokenKind::Crate, KeywordCat::Strict),
    kw("else", TokenKind::Else, KeywordCat::Strict),
    kw("enum", TokenKind::Enum, KeywordCat::Strict),
    kw("extern", TokenKind::Extern, KeywordCat::Strict),
    kw("false", TokenKind::False, KeywordCat::Strict),
    kw("fn", TokenKind::Fn, KeywordCat::Strict),
    kw("for", TokenKind::For, KeywordCat::Strict),
    kw("if", TokenKind::If, KeywordCat::Strict),
    kw("impl", TokenKind::Impl, KeywordCat::Strict),
    kw("in", TokenKind::In, KeywordCat::Strict),
    kw("let", TokenKind::Let, KeywordCat::Strict),
    kw("loop", TokenKind::Loop, KeywordCat::Strict),
    kw("match", TokenKind::Match, KeywordCat::Strict),
    kw("mod", TokenKind::Mod, KeywordCat::Strict),
    kw("move", TokenKind::Move, KeywordCat::Strict),
    kw("mut", TokenKind::Mut, KeywordCat::Strict),
    kw("pub", TokenKind::Pub, KeywordCat::Strict),
    kw("ref", TokenKind::Ref, KeywordCat::Strict),
    kw("return", TokenKind::Return, KeywordCat::Strict),
    kw("self", TokenKind::SelfValue, KeywordCat::Strict),
    kw("Self", TokenKind::SelfType, KeywordCat::Strict),
    kw("static", TokenKind::Static, KeywordCat::Strict),
    kw("struct", TokenKind::Struct, KeywordCat::Strict),
    kw("super", TokenKind::Super, KeywordCat::Strict),
    kw("trait", TokenKind::Trait, KeywordCat::Strict),
    kw("true", TokenKind::True, KeywordCat::Strict),
    kw("type", TokenKind::Type, KeywordCat::Strict),
    kw("unsafe", TokenKind::Unsafe, KeywordCat::Strict),
    kw("use", TokenKind::Use, KeywordCat::Strict),
    kw("where", TokenKind::Where, KeywordCat::Strict),
    kw("while", TokenKind::While, KeywordCat::Strict),
    kw("async", TokenKind::Async, KeywordCat::Strict),
    kw("await", TokenKind::Await, KeywordCat::Strict),
    kw("dyn", TokenKind::Dyn, KeywordCat::Strict),
    kw("abstract", TokenKind::Abstract, KeywordCat::Reserved),
    kw("become", TokenKind::Become, KeywordCat::Reserved),
    kw("box", TokenKind::Box, KeywordCat::Reserved),
    kw("do", TokenKind::Do, KeywordCat::Reserved),
    kw("final", TokenKind::Final, KeywordCat::Reserved),
    kw("macro", TokenKind::Macro, KeywordCat::Reserved),
    kw("override", TokenKind::Override, KeywordCat::Reserved),
    kw("priv", TokenKind::Priv, KeywordCat::Reserved),
    kw("typeof", TokenKind::Typeof, KeywordCat::Reserved),
    kw("unsized", TokenKind::Unsized, KeywordCat::Reserved),
    kw("virtual", TokenKind::Virtual, KeywordCat::Reserved),
    kw("yield", TokenKind::Yield, KeywordCat::Reserved),
    kw("try", TokenKind::Try, KeywordCat::Reserved),
    kw("union", TokenKind::Union, KeywordCat::Weak),
    kw("'static", TokenKind::StaticLifetime, KeywordCat::Weak),
];

/// Look up a keyword by its text.
pub fn find(text: &str) -> Option<&'static Keyword> {
    KEYWORDS.iter().find(|k| k.text == text)
}

/// Returns true if `text` can never be an identifier.
pub fn is_strict_or_reserved(text: &str) -> bool {
    matches!(
        find(text),
        Some(Keyword {
            cat: KeywordCat::Strict | KeywordCat::Reserved,
            ..
        })
    )
}
