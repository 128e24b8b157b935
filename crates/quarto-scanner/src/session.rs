//! # Scan Session
//!
//! Drives a [`Scanner`] over a whole document the way a host parser would:
//! ask the scanner first, fall back to [`crate::lexer`] when it declines,
//! and keep one [`ScannerState`] per parse path.
//!
//! A session is an iterator of [`Lexeme`]s that together cover every byte
//! of the source exactly once. Whitespace the scanner skipped before a
//! token comes out as its own [`LexemeKind::Skipped`] lexeme.
//!
//! ```
//! use quarto_scanner::session::tokenize;
//!
//! let source = "*a*\n";
//! let names: Vec<String> = tokenize(source).iter().map(|l| l.kind.to_string()).collect();
//! assert_eq!(names, ["line_start", "emph_star_start", "text", "emph_star_end", "line_end"]);
//! ```

use std::fmt;
use std::ops::Range;

use log::warn;

use crate::codec::CodecError;
use crate::delimiter::DelimiterChar;
use crate::lexer::{FallbackKind, lex_one};
use crate::scanner::{Input, Scanner};
use crate::stack::SpanKind;
use crate::state::ScannerState;
use crate::token::{TokenKind, ValidSymbols};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    /// A token the scanner produced
    External(TokenKind),
    /// Blanks the scanner stepped over before a token
    Skipped,
    /// A token from the fallback lexer after the scanner declined
    Fallback(FallbackKind),
}

impl fmt::Display for LexemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexemeKind::External(kind) => f.write_str(kind.name()),
            LexemeKind::Skipped => f.write_str("skipped"),
            LexemeKind::Fallback(kind) => f.write_str(match kind {
                FallbackKind::Whitespace => "whitespace",
                FallbackKind::Newline => "newline",
                FallbackKind::Star => "star",
                FallbackKind::Underscore => "underscore",
                FallbackKind::Backslash => "backslash",
                FallbackKind::Text => "text",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub range: Range<usize>,
}

impl Lexeme {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range.clone()]
    }
}

/// One parse path over one source.
///
/// Cloning a session (see [`ScanSession::fork`]) copies its scanner state;
/// the source and scanner are shared.
#[derive(Debug, Clone)]
pub struct ScanSession<'a> {
    scanner: &'a Scanner,
    source: &'a str,
    pos: usize,
    state: ScannerState,
    /// Token waiting to be yielded after its skipped whitespace.
    queued: Option<Lexeme>,
    /// Last zero-length token, so it is not produced twice in place.
    last_empty: Option<(usize, TokenKind)>,
    valid_override: Option<ValidSymbols>,
}

impl<'a> ScanSession<'a> {
    pub fn new(scanner: &'a Scanner, source: &'a str) -> Self {
        Self {
            scanner,
            source,
            pos: 0,
            state: ScannerState::new(),
            queued: None,
            last_empty: None,
            valid_override: None,
        }
    }

    /// Restores a session at `offset` from a stored snapshot.
    ///
    /// A snapshot that does not decode is discarded and the state is rebuilt
    /// by scanning from the start of the source. The rebuilt session resumes
    /// at the first lexeme boundary at or after `offset`.
    pub fn resume(scanner: &'a Scanner, source: &'a str, offset: usize, snapshot: &[u8]) -> Self {
        match scanner.deserialize(snapshot) {
            Ok(state) => Self {
                pos: offset.min(source.len()),
                state,
                ..Self::new(scanner, source)
            },
            Err(err) => {
                warn!("discarding scanner snapshot at {offset}: {err}; re-scanning");
                Self::rebuild(scanner, source, offset)
            }
        }
    }

    fn rebuild(scanner: &'a Scanner, source: &'a str, offset: usize) -> Self {
        let mut session = Self::new(scanner, source);
        while session.pos < offset || session.queued.is_some() {
            if session.next().is_none() {
                break;
            }
        }
        session
    }

    /// Uses `valid` at every position instead of the computed set.
    pub fn with_valid_symbols(mut self, valid: ValidSymbols) -> Self {
        self.valid_override = Some(valid);
        self
    }

    /// An independent copy for a speculative parse path.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Encodes the current state for storage at this boundary.
    pub fn snapshot(&self) -> Result<Vec<u8>, CodecError> {
        self.scanner.serialize(&self.state)
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Byte offset of the next unscanned byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The symbols a simple inline grammar would accept here.
    pub fn valid_symbols(&self) -> ValidSymbols {
        if let Some(valid) = self.valid_override {
            return valid;
        }
        let mut valid = ValidSymbols::all_but_error();
        if !self.state.at_line_start {
            valid = valid.without(TokenKind::LINE_START);
        }
        for kind in [SpanKind::Emph, SpanKind::Strong] {
            for delim in [DelimiterChar::Star, DelimiterChar::Underscore] {
                if !self.state.stack.contains(kind, delim) {
                    valid = valid.without(TokenKind::span_end(kind, delim));
                }
            }
        }
        valid
    }

    fn scan_external(&mut self) -> Option<Lexeme> {
        let valid = self.valid_symbols();
        let token = self
            .scanner
            .scan(&mut self.state, Input::new(self.source, self.pos), valid)?;

        let start = self.pos + token.skipped;
        if token.len == 0 {
            if self.last_empty == Some((start, token.kind)) {
                return None;
            }
            self.last_empty = Some((start, token.kind));
        } else {
            self.last_empty = None;
        }

        let lexeme = Lexeme {
            kind: LexemeKind::External(token.kind),
            range: start..start + token.len,
        };
        self.pos += token.advance();
        if token.skipped == 0 {
            return Some(lexeme);
        }
        self.queued = Some(lexeme);
        Some(Lexeme {
            kind: LexemeKind::Skipped,
            range: start - token.skipped..start,
        })
    }

    fn scan_fallback(&mut self) -> Option<Lexeme> {
        let (kind, range) = lex_one(self.source, self.pos)?;
        self.pos = range.end;
        self.last_empty = None;
        // the host consumed this itself, so a partly used run is over
        self.state.partial = None;
        if !matches!(kind, FallbackKind::Whitespace | FallbackKind::Newline) {
            self.state.at_line_start = false;
        }
        Some(Lexeme {
            kind: LexemeKind::Fallback(kind),
            range,
        })
    }
}

impl Iterator for ScanSession<'_> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Lexeme> {
        if let Some(lexeme) = self.queued.take() {
            return Some(lexeme);
        }
        if let Some(lexeme) = self.scan_external() {
            return Some(lexeme);
        }
        self.scan_fallback()
    }
}

/// Scans `source` with the default configuration.
pub fn tokenize(source: &str) -> Vec<Lexeme> {
    let scanner = Scanner::default();
    ScanSession::new(&scanner, source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn externals(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .filter_map(|l| match l.kind {
                LexemeKind::External(kind) => Some((kind, l.text(source))),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn simple_emphasis_line() {
        assert_eq!(
            externals("*a*\n"),
            vec![
                (TokenKind::LINE_START, ""),
                (TokenKind::EMPH_STAR_START, "*"),
                (TokenKind::EMPH_STAR_END, "*"),
                (TokenKind::LINE_END, "\n"),
            ]
        );
    }

    #[test]
    fn unterminated_last_line_gets_empty_line_end() {
        let lexemes = tokenize("a");
        assert_eq!(
            lexemes.last(),
            Some(&Lexeme {
                kind: LexemeKind::External(TokenKind::LINE_END),
                range: 1..1,
            })
        );
    }

    #[test]
    fn skipped_indentation_precedes_line_start() {
        let lexemes = tokenize("  a");
        assert_eq!(
            lexemes[..2].to_vec(),
            vec![
                Lexeme {
                    kind: LexemeKind::Skipped,
                    range: 0..2,
                },
                Lexeme {
                    kind: LexemeKind::External(TokenKind::LINE_START),
                    range: 2..2,
                },
            ]
        );
    }

    #[test]
    fn lexemes_cover_source() {
        let source = "  *a* __b__ \\_c_\n\n  snake_case **x*y**\r\nend";
        let mut expected = 0;
        for lexeme in tokenize(source) {
            assert_eq!(lexeme.range.start, expected);
            expected = lexeme.range.end;
        }
        assert_eq!(expected, source.len());
    }

    #[test]
    fn sole_unused_error_is_produced_once_per_position() {
        let scanner = Scanner::default();
        let only_error = ValidSymbols::none().with(TokenKind::UNUSED_ERROR);
        let kinds: Vec<LexemeKind> = ScanSession::new(&scanner, "ab")
            .with_valid_symbols(only_error)
            .map(|l| l.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                LexemeKind::External(TokenKind::UNUSED_ERROR),
                LexemeKind::Fallback(FallbackKind::Text),
                LexemeKind::External(TokenKind::UNUSED_ERROR),
            ]
        );
    }

    #[test]
    fn forks_diverge_independently() {
        let scanner = Scanner::default();
        let source = "*a* b";
        let mut main = ScanSession::new(&scanner, source);
        main.next(); // line_start
        main.next(); // emph open

        let mut fork = main.fork();
        assert_eq!(fork.state(), main.state());
        while fork.next().is_some() {}

        assert!(fork.state().stack.is_empty());
        assert_eq!(main.state().stack.depth(), 1);
    }

    #[test]
    fn resume_from_snapshot_continues_identically() {
        let scanner = Scanner::default();
        let source = "**a _b_ c**\nd";
        let mut first = ScanSession::new(&scanner, source);
        let head: Vec<Lexeme> = first.by_ref().take(3).collect();
        let snapshot = first.snapshot().unwrap();
        let offset = first.position();
        let rest: Vec<Lexeme> = first.collect();

        let resumed: Vec<Lexeme> = ScanSession::resume(&scanner, source, offset, &snapshot).collect();
        assert!(!head.is_empty());
        assert_eq!(resumed, rest);
    }

    #[test]
    fn corrupt_snapshot_rebuilds_by_rescanning() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scanner = Scanner::default();
        let source = "*a b*";
        let full = tokenize(source);

        let resumed = ScanSession::resume(&scanner, source, 3, &[0xff, 0, 0]);
        assert_eq!(resumed.state().stack.depth(), 1);

        let boundary = resumed.position();
        let tail: Vec<Lexeme> = resumed.collect();
        let expected: Vec<Lexeme> = full.into_iter().filter(|l| l.range.start >= boundary).collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn end_tokens_only_valid_while_open() {
        let scanner = Scanner::default();
        let mut session = ScanSession::new(&scanner, "*a");
        assert!(!session.valid_symbols().contains(TokenKind::EMPH_STAR_END));
        session.next();
        session.next();
        let valid = session.valid_symbols();
        assert!(valid.contains(TokenKind::EMPH_STAR_END));
        assert!(!valid.contains(TokenKind::STRONG_STAR_END));
        assert!(!valid.contains(TokenKind::LINE_START));
    }
}
