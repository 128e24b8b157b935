//! External token vocabulary shared with the host grammar.
//!
//! The host declares these symbols in its `externals` list, in exactly this
//! order, and hands the scanner a [`ValidSymbols`] set on every call. The
//! `repr(u16)` discriminant is the symbol's index in that list.

use crate::delimiter::DelimiterChar;
use crate::stack::SpanKind;

/// All external token kinds, in grammar declaration order.
///
/// We use SCREAMING_CASE for the variants, the same convention the grammar
/// uses for its `externals`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum TokenKind {
    /// Zero-width marker at the first content byte of a line
    LINE_START,
    /// Newline, possibly followed by collapsed blank lines
    LINE_END,
    /// `*` opening emphasis
    EMPH_STAR_START,
    /// `*` closing emphasis
    EMPH_STAR_END,
    /// `_` opening emphasis
    EMPH_UNDER_START,
    /// `_` closing emphasis
    EMPH_UNDER_END,
    /// `**` opening strong
    STRONG_STAR_START,
    /// `**` closing strong
    STRONG_STAR_END,
    /// `__` opening strong
    STRONG_UNDER_START,
    /// `__` closing strong
    STRONG_UNDER_END,
    /// Backslash escape, always two bytes
    NO_PARSE,
    /// Diagnostic escape hatch, never emitted speculatively
    UNUSED_ERROR,
}

impl TokenKind {
    pub const COUNT: usize = TokenKind::UNUSED_ERROR as usize + 1;

    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::LINE_START,
        TokenKind::LINE_END,
        TokenKind::EMPH_STAR_START,
        TokenKind::EMPH_STAR_END,
        TokenKind::EMPH_UNDER_START,
        TokenKind::EMPH_UNDER_END,
        TokenKind::STRONG_STAR_START,
        TokenKind::STRONG_STAR_END,
        TokenKind::STRONG_UNDER_START,
        TokenKind::STRONG_UNDER_END,
        TokenKind::NO_PARSE,
        TokenKind::UNUSED_ERROR,
    ];

    /// The start token for a span of `kind` delimited by `delim`.
    pub fn span_start(kind: SpanKind, delim: DelimiterChar) -> Self {
        match (kind, delim) {
            (SpanKind::Emph, DelimiterChar::Star) => TokenKind::EMPH_STAR_START,
            (SpanKind::Emph, DelimiterChar::Underscore) => TokenKind::EMPH_UNDER_START,
            (SpanKind::Strong, DelimiterChar::Star) => TokenKind::STRONG_STAR_START,
            (SpanKind::Strong, DelimiterChar::Underscore) => TokenKind::STRONG_UNDER_START,
        }
    }

    /// The end token for a span of `kind` delimited by `delim`.
    pub fn span_end(kind: SpanKind, delim: DelimiterChar) -> Self {
        match (kind, delim) {
            (SpanKind::Emph, DelimiterChar::Star) => TokenKind::EMPH_STAR_END,
            (SpanKind::Emph, DelimiterChar::Underscore) => TokenKind::EMPH_UNDER_END,
            (SpanKind::Strong, DelimiterChar::Star) => TokenKind::STRONG_STAR_END,
            (SpanKind::Strong, DelimiterChar::Underscore) => TokenKind::STRONG_UNDER_END,
        }
    }

    /// Returns true for the eight emphasis/strong delimiters.
    pub fn is_span_delimiter(self) -> bool {
        (TokenKind::EMPH_STAR_START..=TokenKind::STRONG_UNDER_END).contains(&self)
    }

    /// Grammar-facing symbol name.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::LINE_START => "line_start",
            TokenKind::LINE_END => "line_end",
            TokenKind::EMPH_STAR_START => "emph_star_start",
            TokenKind::EMPH_STAR_END => "emph_star_end",
            TokenKind::EMPH_UNDER_START => "emph_under_start",
            TokenKind::EMPH_UNDER_END => "emph_under_end",
            TokenKind::STRONG_STAR_START => "strong_star_start",
            TokenKind::STRONG_STAR_END => "strong_star_end",
            TokenKind::STRONG_UNDER_START => "strong_under_start",
            TokenKind::STRONG_UNDER_END => "strong_under_end",
            TokenKind::NO_PARSE => "no_parse",
            TokenKind::UNUSED_ERROR => "unused_error",
        }
    }
}

/// The set of token kinds acceptable at the host's current parse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValidSymbols(u16);

impl ValidSymbols {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self((1u16 << TokenKind::COUNT) - 1)
    }

    /// Everything except the diagnostic `unused_error`.
    pub const fn all_but_error() -> Self {
        Self(Self::all().0 & !(1 << TokenKind::UNUSED_ERROR as u16))
    }

    pub fn from_kinds(kinds: &[TokenKind]) -> Self {
        kinds.iter().fold(Self::none(), |set, &kind| set.with(kind))
    }

    /// Builds the set from the host's `valid_symbols` array.
    pub fn from_flags(flags: &[bool]) -> Self {
        TokenKind::ALL
            .iter()
            .zip(flags)
            .filter(|(_, on)| **on)
            .fold(Self::none(), |set, (&kind, _)| set.with(kind))
    }

    #[must_use]
    pub fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1 << kind as u16))
    }

    #[must_use]
    pub fn without(self, kind: TokenKind) -> Self {
        Self(self.0 & !(1 << kind as u16))
    }

    pub fn contains(self, kind: TokenKind) -> bool {
        self.0 & (1 << kind as u16) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `kind` is the one and only valid symbol.
    pub fn is_only(self, kind: TokenKind) -> bool {
        self.0 == 1 << kind as u16
    }

    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |&kind| self.contains(kind))
    }
}

/// One scanner result.
///
/// `skipped` counts horizontal whitespace passed over before the token; it is
/// not part of the token. The host advances its cursor by `skipped + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub len: usize,
    pub skipped: usize,
}

impl Token {
    pub fn new(kind: TokenKind, len: usize, skipped: usize) -> Self {
        Self { kind, len, skipped }
    }

    /// Bytes the host cursor moves past for this token.
    pub fn advance(&self) -> usize {
        self.skipped + self.len
    }
}
