//! # Delimiter Stack Machine
//!
//! Turns classified delimiter runs into `*_start` / `*_end` tokens in a
//! single forward pass over the stack of unmatched openers.
//!
//! ## Resolution order
//!
//! At the first character of a run:
//!
//! 1. If the run can close and the stack holds a compatible opener (same
//!    character, same span kind), close it. Openers above it are dropped.
//! 2. Otherwise, if the run can open, push an opener. A run that could also
//!    close (e.g. `a*b`) only opens when a matching closer exists later in
//!    the same paragraph; without one it stays literal.
//! 3. Otherwise decline, and the host lexes the run as plain text.
//!
//! ## Span kind by remaining length
//!
//! | remaining | opening          | closing                          |
//! |-----------|------------------|----------------------------------|
//! | 1         | emph             | emph                             |
//! | 2         | strong           | strong                           |
//! | 3         | strong, then emph| nearest same-character opener's kind first |
//!
//! One token is emitted per call, so a run of three is handled over two
//! calls; the state's [`PartialRun`] carries the first call's decision to
//! the second. Any other position inside a run is literal.

use log::{debug, trace};
use quarto_scanner_config::ScannerConfig;

use crate::cursor::Cursor;
use crate::delimiter::DelimiterRun;
use crate::stack::{OpenDelimiter, SpanKind};
use crate::state::{PartialRun, RunRole, ScannerState};
use crate::token::{Token, TokenKind, ValidSymbols};

pub(crate) fn scan_delimiter(
    state: &mut ScannerState,
    cur: Cursor<'_>,
    skipped: usize,
    valid: ValidSymbols,
    config: &ScannerConfig,
) -> Option<Token> {
    let pos = cur.pos();
    let run = DelimiterRun::around(cur.s, pos, config)?;

    if run.len > config.max_run_length {
        trace!("run of {} at {} is too long, literal", run.len, run.start);
        return None;
    }

    let remaining = run.end() - pos;
    let mut ctx = Resolve {
        state,
        run,
        pos,
        remaining,
        skipped,
        valid,
        config,
    };

    if pos > run.start {
        let partial = ctx.state.partial;
        return match partial {
            Some(p) if p.run_start == run.start && p.resume_at == pos => match p.role {
                RunRole::Opening => ctx.open(),
                RunRole::Closing => ctx.try_close(),
            },
            _ => {
                trace!("inside a declined run at {pos}, literal");
                None
            }
        };
    }

    if run.can_close {
        if let Some(token) = ctx.try_close() {
            return Some(token);
        }
    }
    if run.can_open {
        if run.is_ambiguous() && !closer_ahead(cur.s, &run, config) {
            trace!("ambiguous run at {pos} has no closer ahead, literal");
            return None;
        }
        return ctx.open();
    }

    trace!("run at {pos} can neither open nor close");
    None
}

/// One resolution attempt. Only a returned token commits changes to `state`.
struct Resolve<'s, 'c> {
    state: &'s mut ScannerState,
    run: DelimiterRun,
    pos: usize,
    remaining: usize,
    skipped: usize,
    valid: ValidSymbols,
    config: &'c ScannerConfig,
}

impl Resolve<'_, '_> {
    /// The opener index and kind a closing token here would match.
    fn closing_target(&self) -> Option<(usize, SpanKind)> {
        let delim = self.run.delim;
        let kind = match SpanKind::for_len(self.remaining) {
            Some(kind) => kind,
            None => self.state.stack.nearest(delim)?.kind,
        };
        let index = self.state.stack.find(kind, delim)?;
        self.valid
            .contains(TokenKind::span_end(kind, delim))
            .then_some((index, kind))
    }

    fn try_close(&mut self) -> Option<Token> {
        let (index, kind) = self.closing_target()?;
        let opener = self.state.stack.close(index);
        trace!(
            "{} closes {:?} opened at {}",
            self.pos, opener.kind, opener.run_start
        );
        Some(self.commit(TokenKind::span_end(kind, self.run.delim), kind, RunRole::Closing))
    }

    fn open(&mut self) -> Option<Token> {
        let delim = self.run.delim;
        let kind = match SpanKind::for_len(self.remaining) {
            Some(kind) => kind,
            None if self
                .valid
                .contains(TokenKind::span_start(SpanKind::Strong, delim)) =>
            {
                SpanKind::Strong
            }
            None => SpanKind::Emph,
        };
        let token = TokenKind::span_start(kind, delim);
        if !self.valid.contains(token) {
            return None;
        }
        if self.state.stack.depth() >= self.config.max_nesting_depth {
            debug!(
                "nesting depth {} reached at {}, opener stays literal",
                self.config.max_nesting_depth, self.pos
            );
            return None;
        }

        self.state.stack.push(OpenDelimiter {
            kind,
            delim,
            run_len: self.run.len,
            run_start: self.run.start,
        });
        trace!("{:?} opens {kind:?} at {}", delim, self.pos);
        Some(self.commit(token, kind, RunRole::Opening))
    }

    /// Finishes a token: records any unconsumed remainder of the run.
    fn commit(&mut self, token: TokenKind, kind: SpanKind, role: RunRole) -> Token {
        let width = kind.width();
        self.state.at_line_start = false;
        self.state.partial = (width < self.remaining).then_some(PartialRun {
            run_start: self.run.start,
            run_len: self.run.len,
            resume_at: self.pos + width,
            role,
        });
        Token::new(token, width, self.skipped)
    }
}

/// Looks for a run later in the paragraph that could close `run`.
///
/// Closing-capable runs of the same character whose length does not fit the
/// opener's span kind are passed over. A paragraph break or the end of input
/// ends the search.
fn closer_ahead(source: &str, run: &DelimiterRun, config: &ScannerConfig) -> bool {
    let mut cur = Cursor::new(source, run.end());
    let target = run.delim.byte();

    while let Some(b) = cur.peek() {
        if let Some(n) = cur.newline_len() {
            cur.bump_n(n);
            let mut look = cur;
            look.skip_blanks();
            if config.collapse_blank_lines && look.newline_len().is_some() {
                return false;
            }
            continue;
        }
        if b != target {
            cur.bump();
            continue;
        }

        // escaped delimiters have no run
        let Some(candidate) = DelimiterRun::around(source, cur.pos(), config) else {
            cur.bump();
            continue;
        };
        cur = Cursor::new(source, candidate.end());
        if candidate.can_close
            && candidate.len <= config.max_run_length
            && lengths_pair(run.len, candidate.len)
        {
            return true;
        }
    }
    false
}

/// Whether an opener run of `open` characters can be closed by `close`.
fn lengths_pair(open: usize, close: usize) -> bool {
    let fits = |kind: SpanKind| match kind {
        SpanKind::Emph => close % 2 == 1,
        SpanKind::Strong => close >= 2,
    };
    match SpanKind::for_len(open) {
        Some(kind) => fits(kind),
        None => fits(SpanKind::Emph) || fits(SpanKind::Strong),
    }
}
