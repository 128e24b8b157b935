//! # Delimiter Classifier
//!
//! A *delimiter run* is a maximal sequence of one delimiter character (`*`
//! or `_`). Whether a run may open or close a span depends only on the run
//! itself and the characters immediately around it:
//!
//! ```text
//!   *word*        left-flanking opener, right-flanking closer
//!   a * b         neither: whitespace on both sides
//!   snake_case    `_` is both-flanking inside a word, so it does nothing
//!   a*b*c         `*` is both-flanking but still usable
//! ```
//!
//! Start/end of input and line boundaries count as whitespace. Escaped
//! delimiters (`\*`) are never part of a run.

use quarto_scanner_config::ScannerConfig;

use crate::cursor::Cursor;

/// The two characters that delimit emphasis and strong spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterChar {
    Star,
    Underscore,
}

impl DelimiterChar {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'*' => Some(Self::Star),
            b'_' => Some(Self::Underscore),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Self::Star => b'*',
            Self::Underscore => b'_',
        }
    }
}

/// A classified delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRun {
    pub delim: DelimiterChar,
    /// Byte offset of the first delimiter character.
    pub start: usize,
    /// Number of delimiter characters in the run.
    pub len: usize,
    pub left_flanking: bool,
    pub right_flanking: bool,
    pub can_open: bool,
    pub can_close: bool,
}

impl DelimiterRun {
    /// Finds and classifies the run containing byte offset `at`.
    ///
    /// Returns `None` if `at` is not an unescaped delimiter character.
    pub fn around(source: &str, at: usize, config: &ScannerConfig) -> Option<Self> {
        let cur = Cursor::new(source, at);
        let delim = DelimiterChar::from_byte(cur.peek()?)?;
        if cur.is_escaped(at, config) {
            return None;
        }
        let bytes = source.as_bytes();
        let target = delim.byte();

        let mut start = at;
        while start > 0 && bytes[start - 1] == target && !cur.is_escaped(start - 1, config) {
            start -= 1;
        }
        let mut end = at + 1;
        while bytes.get(end) == Some(&target) {
            end += 1;
        }

        Some(Self::classify(
            delim,
            start,
            end - start,
            cur.char_before(start),
            cur.char_after(end),
            config.intraword_underscore,
        ))
    }

    /// Classifies a run from its neighbouring characters alone.
    ///
    /// `before`/`after` are `None` at the edges of the input.
    pub fn classify(
        delim: DelimiterChar,
        start: usize,
        len: usize,
        before: Option<char>,
        after: Option<char>,
        intraword_underscore: bool,
    ) -> Self {
        let before_space = before.is_none_or(char::is_whitespace);
        let after_space = after.is_none_or(char::is_whitespace);
        let before_punct = before.is_some_and(is_punctuation);
        let after_punct = after.is_some_and(is_punctuation);

        let left_flanking = !after_space && (!after_punct || before_space || before_punct);
        let right_flanking = !before_space && (!before_punct || after_space || after_punct);

        let (can_open, can_close) = match delim {
            DelimiterChar::Underscore if intraword_underscore => (
                left_flanking && !right_flanking,
                right_flanking && !left_flanking,
            ),
            _ => (left_flanking, right_flanking),
        };

        Self {
            delim,
            start,
            len,
            left_flanking,
            right_flanking,
            can_open,
            can_close,
        }
    }

    /// Byte offset one past the last delimiter character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Both an opener and a closer candidate.
    pub fn is_ambiguous(&self) -> bool {
        self.can_open && self.can_close
    }
}

/// ASCII only. Other Unicode punctuation classifies like a letter.
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}
