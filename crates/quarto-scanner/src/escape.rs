//! # Escape Handler
//!
//! `\` followed by an escapable punctuation character is a two-byte
//! `no_parse` token. The escaped character is never seen by the delimiter
//! classifier, so `\*` can neither open nor close a span. A backslash
//! before anything else is left to the host's default lexer.

use log::trace;
use quarto_scanner_config::ScannerConfig;

use crate::cursor::Cursor;
use crate::state::ScannerState;
use crate::token::{Token, TokenKind, ValidSymbols};

/// Width of every escape token.
pub const ESCAPE_LEN: usize = 2;

pub(crate) fn scan_escape(
    state: &mut ScannerState,
    cur: Cursor<'_>,
    skipped: usize,
    valid: ValidSymbols,
    config: &ScannerConfig,
) -> Option<Token> {
    if !valid.contains(TokenKind::NO_PARSE) || cur.peek() != Some(b'\\') {
        return None;
    }
    // a backslash that is itself escaped starts nothing
    if cur.is_escaped(cur.pos(), config) {
        return None;
    }
    let escaped = cur.peek_at(1)?;
    if !config.is_escapable(escaped) {
        return None;
    }

    trace!("escape {:?} at {}", escaped as char, cur.pos());
    state.at_line_start = false;
    state.partial = None;
    Some(Token::new(TokenKind::NO_PARSE, ESCAPE_LEN, skipped))
}
