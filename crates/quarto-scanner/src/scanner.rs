//! # Scanner Entry Point
//!
//! [`Scanner::scan`] is called by the host at every position where at least
//! one external symbol is acceptable. It returns one [`Token`] or declines.
//!
//! Checks run in a fixed order, first match wins:
//!
//! ```text
//! unused_error guard → skip blanks → line_start → line_end → escape → delimiter
//! ```
//!
//! The scanner holds only configuration. All per-parse data lives in the
//! [`ScannerState`] the host passes in, which is left untouched whenever
//! `scan` declines.

use log::trace;
use quarto_scanner_config::{ConfigError, ScannerConfig};

use crate::codec::{self, CodecError};
use crate::cursor::Cursor;
use crate::emphasis::scan_delimiter;
use crate::escape::scan_escape;
use crate::line::{scan_line_end, scan_line_start};
use crate::state::ScannerState;
use crate::token::{Token, TokenKind, ValidSymbols};

/// The immutable source plus the host's current byte offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input<'a> {
    pub source: &'a str,
    pub offset: usize,
}

impl<'a> Input<'a> {
    pub fn new(source: &'a str, offset: usize) -> Self {
        Self { source, offset }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    /// Creates a scanner, rejecting configurations the state format cannot hold.
    pub fn new(config: ScannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Produces the token at `input`, or `None` to let the host lex it.
    pub fn scan(
        &self,
        state: &mut ScannerState,
        input: Input<'_>,
        valid: ValidSymbols,
    ) -> Option<Token> {
        if valid.contains(TokenKind::UNUSED_ERROR) {
            if valid.is_only(TokenKind::UNUSED_ERROR) {
                trace!("unused_error requested alone at {}", input.offset);
                return Some(Token::new(TokenKind::UNUSED_ERROR, 0, 0));
            }
            trace!("host in error recovery at {}, declining", input.offset);
            return None;
        }
        if valid.is_empty() || !input.source.is_char_boundary(input.offset) {
            return None;
        }

        let mut cur = Cursor::new(input.source, input.offset);
        let skipped = cur.skip_blanks();

        let token = scan_line_start(state, cur, skipped, valid)
            .or_else(|| scan_line_end(state, cur, skipped, valid, &self.config))
            .or_else(|| scan_escape(state, cur, skipped, valid, &self.config))
            .or_else(|| scan_delimiter(state, cur, skipped, valid, &self.config));

        match token {
            Some(token) => trace!(
                "{} at {} (len {}, skipped {})",
                token.kind.name(),
                cur.pos(),
                token.len,
                token.skipped
            ),
            None => trace!("declined at {}", input.offset),
        }
        token
    }

    /// Encodes `state` for the host to store at a tree boundary.
    pub fn serialize(&self, state: &ScannerState) -> Result<Vec<u8>, CodecError> {
        codec::serialize(state)
    }

    /// Writes `state` into the host's fixed buffer, returning bytes used.
    pub fn serialize_into(
        &self,
        state: &ScannerState,
        buf: &mut [u8],
    ) -> Result<usize, CodecError> {
        codec::serialize_into(state, buf)
    }

    pub fn deserialize(&self, buf: &[u8]) -> Result<ScannerState, CodecError> {
        codec::deserialize(buf)
    }
}
