//! The stack of unmatched openers.
//!
//! Entries are kept innermost-last. Matching always searches from the top
//! down for the nearest entry with the same span kind *and* the same
//! delimiter character; a `_` closer never ends a `*` span.

use log::debug;

use crate::delimiter::DelimiterChar;

/// Emphasis (one delimiter character) or strong (two).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Emph,
    Strong,
}

impl SpanKind {
    /// Delimiter characters consumed by one start or end token.
    pub fn width(self) -> usize {
        match self {
            SpanKind::Emph => 1,
            SpanKind::Strong => 2,
        }
    }

    /// The kind a run remainder of `len` characters stands for, if unambiguous.
    pub fn for_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(SpanKind::Emph),
            2 => Some(SpanKind::Strong),
            _ => None,
        }
    }
}

/// An opener waiting for its closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDelimiter {
    pub kind: SpanKind,
    pub delim: DelimiterChar,
    /// Length of the whole run the opener came from.
    pub run_len: usize,
    /// Byte offset where that run starts.
    pub run_start: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimiterStack {
    entries: Vec<OpenDelimiter>,
}

impl DelimiterStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: OpenDelimiter) {
        debug_assert!(
            self.top().is_none_or(|top| top.run_start <= entry.run_start),
            "openers must be pushed in source order"
        );
        self.entries.push(entry);
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OpenDelimiter] {
        &self.entries
    }

    pub fn top(&self) -> Option<&OpenDelimiter> {
        self.entries.last()
    }

    /// Index of the nearest open entry matching `kind` and `delim`.
    pub fn find(&self, kind: SpanKind, delim: DelimiterChar) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|e| e.kind == kind && e.delim == delim)
    }

    /// The nearest open entry using `delim`, whatever its kind.
    pub fn nearest(&self, delim: DelimiterChar) -> Option<&OpenDelimiter> {
        self.entries.iter().rev().find(|e| e.delim == delim)
    }

    pub fn contains(&self, kind: SpanKind, delim: DelimiterChar) -> bool {
        self.find(kind, delim).is_some()
    }

    /// Closes the entry at `index`.
    ///
    /// Openers above it were never closed; they are dropped and their
    /// delimiters stay literal text.
    pub fn close(&mut self, index: usize) -> OpenDelimiter {
        let skipped = self.entries.len() - index - 1;
        if skipped > 0 {
            debug!("discarding {skipped} unmatched opener(s) above closed span");
        }
        self.entries.truncate(index + 1);
        self.entries.remove(index)
    }

    /// Drops every open entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub(crate) fn from_entries(entries: Vec<OpenDelimiter>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open(kind: SpanKind, delim: DelimiterChar, run_start: usize) -> OpenDelimiter {
        OpenDelimiter {
            kind,
            delim,
            run_len: kind.width(),
            run_start,
        }
    }

    #[test]
    fn find_prefers_innermost() {
        let mut stack = DelimiterStack::new();
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 0));
        stack.push(open(SpanKind::Strong, DelimiterChar::Star, 3));
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 8));

        assert_eq!(stack.find(SpanKind::Emph, DelimiterChar::Star), Some(2));
        assert_eq!(stack.find(SpanKind::Strong, DelimiterChar::Star), Some(1));
        assert_eq!(stack.find(SpanKind::Emph, DelimiterChar::Underscore), None);
    }

    #[test]
    fn characters_must_match() {
        let mut stack = DelimiterStack::new();
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 0));

        assert!(!stack.contains(SpanKind::Emph, DelimiterChar::Underscore));
        assert!(stack.nearest(DelimiterChar::Underscore).is_none());
    }

    #[test]
    fn close_discards_openers_above() {
        let mut stack = DelimiterStack::new();
        stack.push(open(SpanKind::Strong, DelimiterChar::Star, 0));
        stack.push(open(SpanKind::Emph, DelimiterChar::Underscore, 4));
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 6));

        let closed = stack.close(0);

        assert_eq!(closed.kind, SpanKind::Strong);
        assert!(stack.is_empty());
    }

    #[test]
    fn close_keeps_openers_below() {
        let mut stack = DelimiterStack::new();
        stack.push(open(SpanKind::Strong, DelimiterChar::Star, 0));
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 2));

        stack.close(1);

        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().map(|e| e.kind), Some(SpanKind::Strong));
    }

    #[test]
    fn nearest_ignores_kind() {
        let mut stack = DelimiterStack::new();
        stack.push(open(SpanKind::Emph, DelimiterChar::Star, 0));
        stack.push(open(SpanKind::Strong, DelimiterChar::Star, 1));
        stack.push(open(SpanKind::Emph, DelimiterChar::Underscore, 5));

        assert_eq!(
            stack.nearest(DelimiterChar::Star).map(|e| e.kind),
            Some(SpanKind::Strong)
        );
    }

    #[test]
    fn kind_for_run_remainder() {
        assert_eq!(SpanKind::for_len(1), Some(SpanKind::Emph));
        assert_eq!(SpanKind::for_len(2), Some(SpanKind::Strong));
        assert_eq!(SpanKind::for_len(3), None);
        assert_eq!(SpanKind::Strong.width(), 2);
    }
}
