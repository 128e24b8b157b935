//! The scanner's entire persisted state.
//!
//! A [`ScannerState`] is a plain value. The host keeps one per parse path:
//! forking a speculative path is a `clone()`, abandoning it is a drop, and
//! incremental reparsing stores it as bytes through [`crate::codec`].

use crate::stack::DelimiterStack;

/// Whether a partly consumed run was being used to open or to close spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRole {
    Opening,
    Closing,
}

/// A delimiter run the previous token consumed only part of.
///
/// `***` opens as `**` then `*` (or closes as `*` then `**`), one token per
/// scanner call. This records where the next call must pick the run up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialRun {
    pub run_start: usize,
    pub run_len: usize,
    /// Offset of the first delimiter character not yet consumed.
    pub resume_at: usize,
    pub role: RunRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    pub stack: DelimiterStack,
    pub at_line_start: bool,
    /// Blank lines folded into the most recent `line_end`.
    pub pending_blank_lines: u16,
    pub partial: Option<PartialRun>,
}

impl Default for ScannerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerState {
    /// The state at byte offset 0 of a fresh parse.
    pub fn new() -> Self {
        Self {
            stack: DelimiterStack::new(),
            at_line_start: true,
            pending_blank_lines: 0,
            partial: None,
        }
    }

    /// True if the last `line_end` swallowed at least one blank line.
    pub fn at_paragraph_break(&self) -> bool {
        self.pending_blank_lines > 0
    }
}
