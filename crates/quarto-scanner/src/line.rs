//! # Line Boundary Tracker
//!
//! Emits `line_start` at the first content byte of a line and `line_end` on
//! newlines. A newline followed by blank lines is one `line_end` covering
//! all of them; the number of blank lines folded in is remembered so the
//! grammar can tell a soft break from a paragraph break.
//!
//! ```text
//! "one\ntwo"       line_end covers "\n"            soft break
//! "one\n  \ntwo"   line_end covers "\n  \n"        paragraph break
//! ```

use log::{debug, trace};
use quarto_scanner_config::ScannerConfig;

use crate::cursor::Cursor;
use crate::state::ScannerState;
use crate::token::{Token, TokenKind, ValidSymbols};

/// Tries `line_start` at `cur`. `skipped` is the indentation already passed.
pub(crate) fn scan_line_start(
    state: &mut ScannerState,
    cur: Cursor<'_>,
    skipped: usize,
    valid: ValidSymbols,
) -> Option<Token> {
    if !state.at_line_start || !valid.contains(TokenKind::LINE_START) || cur.at_line_end() {
        return None;
    }
    state.at_line_start = false;
    state.pending_blank_lines = 0;
    Some(Token::new(TokenKind::LINE_START, 0, skipped))
}

/// Tries `line_end` at `cur`, folding blank lines when configured to.
pub(crate) fn scan_line_end(
    state: &mut ScannerState,
    cur: Cursor<'_>,
    skipped: usize,
    valid: ValidSymbols,
    config: &ScannerConfig,
) -> Option<Token> {
    if !valid.contains(TokenKind::LINE_END) {
        return None;
    }

    if cur.eof() {
        // close the last line of a file without a trailing newline
        if state.at_line_start {
            return None;
        }
        state.at_line_start = true;
        state.pending_blank_lines = 0;
        state.partial = None;
        return Some(Token::new(TokenKind::LINE_END, 0, skipped));
    }

    let newline = cur.newline_len()?;
    let mut end = cur;
    end.bump_n(newline);

    let mut blank_lines: u16 = 0;
    if config.collapse_blank_lines {
        loop {
            let mut look = end;
            look.skip_blanks();
            match look.newline_len() {
                Some(n) => {
                    look.bump_n(n);
                    end = look;
                    blank_lines = blank_lines.saturating_add(1);
                }
                None => break,
            }
        }
    }

    state.at_line_start = true;
    state.pending_blank_lines = blank_lines;
    state.partial = None;
    if blank_lines > 0 {
        let dropped = state.stack.clear();
        if dropped > 0 {
            debug!("paragraph break at {} drops {dropped} open span(s)", cur.pos());
        }
    }

    let len = end.pos() - cur.pos();
    trace!("line_end at {} spanning {len} byte(s), {blank_lines} blank", cur.pos());
    Some(Token::new(TokenKind::LINE_END, len, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::DelimiterChar;
    use crate::stack::{OpenDelimiter, SpanKind};
    use pretty_assertions::assert_eq;

    fn all() -> ValidSymbols {
        ValidSymbols::all_but_error()
    }

    fn mid_line() -> ScannerState {
        ScannerState {
            at_line_start: false,
            ..ScannerState::new()
        }
    }

    fn with_open_emph() -> ScannerState {
        let mut state = mid_line();
        state.stack.push(OpenDelimiter {
            kind: SpanKind::Emph,
            delim: DelimiterChar::Star,
            run_len: 1,
            run_start: 0,
        });
        state
    }

    #[test]
    fn line_start_fires_at_content() {
        let mut state = ScannerState {
            pending_blank_lines: 2,
            ..ScannerState::new()
        };
        let token = scan_line_start(&mut state, Cursor::new("  abc", 2), 2, all());
        assert_eq!(token, Some(Token::new(TokenKind::LINE_START, 0, 2)));
        assert!(!state.at_line_start);
        assert_eq!(state.pending_blank_lines, 0);
    }

    #[test]
    fn line_start_never_fires_mid_line() {
        let mut state = mid_line();
        assert_eq!(scan_line_start(&mut state, Cursor::new("abc", 1), 0, all()), None);
    }

    #[test]
    fn line_start_skips_blank_lines() {
        let mut state = ScannerState::new();
        assert_eq!(scan_line_start(&mut state, Cursor::new("\nabc", 0), 0, all()), None);
        assert!(state.at_line_start);
    }

    #[test]
    fn line_start_requires_valid_symbol() {
        let mut state = ScannerState::new();
        let valid = all().without(TokenKind::LINE_START);
        assert_eq!(scan_line_start(&mut state, Cursor::new("abc", 0), 0, valid), None);
        assert!(state.at_line_start);
    }

    #[test]
    fn single_newline_is_soft_break() {
        let mut state = with_open_emph();
        let config = ScannerConfig::default();
        let token = scan_line_end(&mut state, Cursor::new("a\nb", 1), 0, all(), &config);

        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 1, 0)));
        assert!(state.at_line_start);
        assert!(!state.at_paragraph_break());
        assert_eq!(state.stack.depth(), 1);
    }

    #[test]
    fn blank_lines_collapse_into_paragraph_break() {
        let mut state = with_open_emph();
        let config = ScannerConfig::default();
        let source = "a\n \t\n\nb";
        let token = scan_line_end(&mut state, Cursor::new(source, 1), 0, all(), &config);

        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 5, 0)));
        assert_eq!(state.pending_blank_lines, 2);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn no_collapse_keeps_each_newline() {
        let mut state = with_open_emph();
        let config = ScannerConfig {
            collapse_blank_lines: false,
            ..ScannerConfig::default()
        };
        let token = scan_line_end(&mut state, Cursor::new("a\n\nb", 1), 0, all(), &config);

        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 1, 0)));
        assert_eq!(state.pending_blank_lines, 0);
        assert_eq!(state.stack.depth(), 1);
    }

    #[test]
    fn crlf_line_endings() {
        let mut state = mid_line();
        let config = ScannerConfig::default();
        let token = scan_line_end(&mut state, Cursor::new("a\r\n\r\nb", 1), 0, all(), &config);
        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 4, 0)));
        assert_eq!(state.pending_blank_lines, 1);
    }

    #[test]
    fn trailing_blanks_at_eof_are_not_a_blank_line() {
        let mut state = mid_line();
        let config = ScannerConfig::default();
        let token = scan_line_end(&mut state, Cursor::new("a\n  ", 1), 0, all(), &config);
        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 1, 0)));
    }

    #[test]
    fn eof_closes_unterminated_line_once() {
        let mut state = with_open_emph();
        let config = ScannerConfig::default();
        let token = scan_line_end(&mut state, Cursor::new("a", 1), 0, all(), &config);

        assert_eq!(token, Some(Token::new(TokenKind::LINE_END, 0, 0)));
        // dangling openers survive the end of input
        assert_eq!(state.stack.depth(), 1);
        assert_eq!(scan_line_end(&mut state, Cursor::new("a", 1), 0, all(), &config), None);
    }

    #[test]
    fn not_at_newline_declines() {
        let mut state = mid_line();
        let config = ScannerConfig::default();
        let before = state.clone();
        assert_eq!(scan_line_end(&mut state, Cursor::new("ab", 1), 0, all(), &config), None);
        assert_eq!(state, before);
    }
}
