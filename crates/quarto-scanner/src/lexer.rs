//! # Fallback Lexer
//!
//! When the external scanner declines, a host parser falls back to its own
//! internal lexer. This module is a small stand-in for that lexer so the
//! scanner can be driven end to end without a grammar: see
//! [`crate::session`].
//!
//! Like any lexer feeding a lossless tree, it never skips input. Every byte
//! lands in exactly one token:
//!
//! ```
//! use quarto_scanner::lexer::lex;
//!
//! let input = "a *b* \\_c\n";
//! let text: String = lex(input).iter().map(|(_, span)| &input[span.clone()]).collect();
//! assert_eq!(text, input);
//! ```
//!
//! Tokens are context-free. Whether a `*` opens emphasis is the scanner's
//! call; here it is always a lone [`FallbackKind::Star`].

use std::ops::Range;

use logos::Logos;

/// Token kinds produced when the scanner has nothing to say.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    /// A `*` the scanner left as literal text
    #[token("*")]
    Star,

    /// A `_` the scanner left as literal text
    #[token("_")]
    Underscore,

    /// A backslash that did not start an escape
    #[token("\\")]
    Backslash,

    /// Everything else, grouped into runs
    #[regex(r"[^\s*_\\]+")]
    Text,
}

/// Lex the whole input into kinds and byte spans.
pub fn lex(input: &str) -> Vec<(FallbackKind, Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = FallbackKind::lexer(input);

    while let Some(result) = lexer.next() {
        // unrecognized characters (lone `\r`, other whitespace) become text
        let kind = result.unwrap_or(FallbackKind::Text);
        tokens.push((kind, lexer.span()));
    }

    tokens
}

/// Lex a single token starting at byte offset `at`.
///
/// Returns `None` at the end of input.
pub fn lex_one(source: &str, at: usize) -> Option<(FallbackKind, Range<usize>)> {
    let rest = source.get(at..)?;
    let mut lexer = FallbackKind::lexer(rest);
    let kind = lexer.next()?.unwrap_or(FallbackKind::Text);
    let span = lexer.span();
    if span.is_empty() {
        return None;
    }
    Some((kind, at + span.start..at + span.end))
}
