use quarto_scanner_config::ScannerConfig;

/// A read-only view of the host's source buffer positioned at a byte offset.
///
/// The scanner needs the bytes *before* the cursor as well as after it (the
/// flanking rules look one character back), so the cursor always carries the
/// whole source rather than the unconsumed tail.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    /// The complete source text.
    pub s: &'a str,
    /// Current byte offset into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at byte offset `i` of `s`.
    pub fn new(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    /// Returns the current byte offset.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at end of input.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peeks `n` bytes ahead of the cursor.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// The character ending at byte offset `at`, if any.
    pub fn char_before(&self, at: usize) -> Option<char> {
        self.s.get(..at)?.chars().next_back()
    }

    /// The character starting at byte offset `at`, if any.
    pub fn char_after(&self, at: usize) -> Option<char> {
        self.s.get(at..)?.chars().next()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Skips spaces and tabs, returning how many bytes were skipped.
    pub fn skip_blanks(&mut self) -> usize {
        let start = self.i;
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.i += 1;
        }
        self.i - start
    }

    /// Length of the line terminator at the cursor: 1 for LF, 2 for CRLF.
    pub fn newline_len(&self) -> Option<usize> {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'\n'), _) => Some(1),
            (Some(b'\r'), Some(b'\n')) => Some(2),
            _ => None,
        }
    }

    /// True if the cursor sits on a newline or at end of input.
    pub fn at_line_end(&self) -> bool {
        self.eof() || self.newline_len().is_some()
    }

    /// True if the byte at `at` is taken by a backslash escape before it.
    ///
    /// Only bytes in the configured escapable set can be escaped. When `\`
    /// is itself escapable a run of backslashes pairs up, so only odd runs
    /// escape the byte; otherwise any preceding backslash does.
    pub fn is_escaped(&self, at: usize, config: &ScannerConfig) -> bool {
        let bytes = self.s.as_bytes();
        if !bytes.get(at).is_some_and(|&b| config.is_escapable(b)) {
            return false;
        }
        let slashes = bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count();
        if config.is_escapable(b'\\') {
            slashes % 2 == 1
        } else {
            slashes > 0
        }
    }
}
