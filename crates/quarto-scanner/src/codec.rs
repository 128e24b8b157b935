//! # Scanner State Codec
//!
//! The host stores scanner state as opaque bytes at parse-tree boundaries
//! and hands them back when it reparses an edited region. The format is
//! small, little-endian and versioned:
//!
//! ```text
//! header   12 bytes  version u8 | flags u8 | blank lines u16
//!                    | depth u16 | reserved u16 | resume offset u32
//! partial   8 bytes  run start u32 | run length u32   (flag bit 1 only)
//! record    8 bytes  kind u8 | char u8 | run length u16 | run start u32
//!                    (one per open entry, outermost first)
//! ```
//!
//! An empty buffer is the fresh state. Any other malformed buffer is a
//! [`CodecError`]; callers recover by re-scanning rather than failing.

use quarto_scanner_config::SERIALIZATION_BUFFER_SIZE;
use thiserror::Error;

use crate::delimiter::DelimiterChar;
use crate::stack::{DelimiterStack, OpenDelimiter, SpanKind};
use crate::state::{PartialRun, RunRole, ScannerState};

/// Current format version.
pub const VERSION: u8 = 1;

const HEADER_LEN: usize = 12;
const PARTIAL_LEN: usize = 8;
const RECORD_LEN: usize = 8;

const FLAG_LINE_START: u8 = 0b001;
const FLAG_PARTIAL: u8 = 0b010;
const FLAG_CLOSING: u8 = 0b100;
const KNOWN_FLAGS: u8 = FLAG_LINE_START | FLAG_PARTIAL | FLAG_CLOSING;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unsupported scanner state version {0}")]
    UnknownVersion(u8),

    #[error("scanner state truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("scanner state has {0} unexpected trailing bytes")]
    TrailingBytes(usize),

    #[error("invalid scanner state header: {0}")]
    InvalidHeader(&'static str),

    #[error("invalid {field} in open-delimiter record {index}")]
    InvalidRecord { index: usize, field: &'static str },

    #[error("offset {0} does not fit the 32-bit state format")]
    OffsetOverflow(usize),

    #[error("scanner state needs {0} bytes, over the {max}-byte buffer", max = SERIALIZATION_BUFFER_SIZE)]
    TooLarge(usize),
}

/// Number of bytes [`serialize`] produces for `state`.
pub fn encoded_len(state: &ScannerState) -> usize {
    HEADER_LEN
        + state.partial.map_or(0, |_| PARTIAL_LEN)
        + state.stack.depth() * RECORD_LEN
}

/// Serializes `state` into a new buffer.
pub fn serialize(state: &ScannerState) -> Result<Vec<u8>, CodecError> {
    let mut buf = vec![0; encoded_len(state)];
    let written = serialize_into(state, &mut buf)?;
    buf.truncate(written);
    Ok(buf)
}

/// Serializes `state` into a host-provided buffer, returning the length used.
pub fn serialize_into(state: &ScannerState, buf: &mut [u8]) -> Result<usize, CodecError> {
    let len = encoded_len(state);
    if len > SERIALIZATION_BUFFER_SIZE {
        return Err(CodecError::TooLarge(len));
    }
    if len > buf.len() {
        return Err(CodecError::Truncated {
            expected: len,
            found: buf.len(),
        });
    }

    let mut flags = 0;
    if state.at_line_start {
        flags |= FLAG_LINE_START;
    }
    if let Some(partial) = state.partial {
        flags |= FLAG_PARTIAL;
        if partial.role == RunRole::Closing {
            flags |= FLAG_CLOSING;
        }
    }

    let depth = state.stack.depth() as u16;
    let resume = state.partial.map_or(Ok(0), |p| offset(p.resume_at))?;

    let mut w = Writer { buf, at: 0 };
    w.u8(VERSION);
    w.u8(flags);
    w.u16(state.pending_blank_lines);
    w.u16(depth);
    w.u16(0);
    w.u32(resume);

    if let Some(partial) = state.partial {
        w.u32(offset(partial.run_start)?);
        w.u32(offset(partial.run_len)?);
    }

    for entry in state.stack.entries() {
        w.u8(match entry.kind {
            SpanKind::Emph => 0,
            SpanKind::Strong => 1,
        });
        w.u8(entry.delim.byte());
        let run_len = u16::try_from(entry.run_len)
            .map_err(|_| CodecError::OffsetOverflow(entry.run_len))?;
        w.u16(run_len);
        w.u32(offset(entry.run_start)?);
    }

    Ok(w.at)
}

/// Restores a state from bytes produced by [`serialize`].
pub fn deserialize(buf: &[u8]) -> Result<ScannerState, CodecError> {
    if buf.is_empty() {
        return Ok(ScannerState::new());
    }

    let mut r = Reader { buf, at: 0 };
    let version = r.u8()?;
    if version != VERSION {
        return Err(CodecError::UnknownVersion(version));
    }
    let flags = r.u8()?;
    if flags & !KNOWN_FLAGS != 0 {
        return Err(CodecError::InvalidHeader("unknown flag bits"));
    }
    if flags & FLAG_CLOSING != 0 && flags & FLAG_PARTIAL == 0 {
        return Err(CodecError::InvalidHeader("closing flag without a partial run"));
    }
    let pending_blank_lines = r.u16()?;
    let depth = r.u16()? as usize;
    if r.u16()? != 0 {
        return Err(CodecError::InvalidHeader("reserved bytes are not zero"));
    }
    let resume_at = r.u32()? as usize;

    let expected = HEADER_LEN
        + if flags & FLAG_PARTIAL != 0 { PARTIAL_LEN } else { 0 }
        + depth * RECORD_LEN;
    if buf.len() < expected {
        return Err(CodecError::Truncated {
            expected,
            found: buf.len(),
        });
    }
    if buf.len() > expected {
        return Err(CodecError::TrailingBytes(buf.len() - expected));
    }

    let partial = if flags & FLAG_PARTIAL != 0 {
        let run_start = r.u32()? as usize;
        let run_len = r.u32()? as usize;
        if resume_at <= run_start || resume_at >= run_start + run_len {
            return Err(CodecError::InvalidHeader("resume offset outside its run"));
        }
        let role = if flags & FLAG_CLOSING != 0 {
            RunRole::Closing
        } else {
            RunRole::Opening
        };
        Some(PartialRun {
            run_start,
            run_len,
            resume_at,
            role,
        })
    } else {
        if resume_at != 0 {
            return Err(CodecError::InvalidHeader("resume offset without a partial run"));
        }
        None
    };

    let mut entries = Vec::with_capacity(depth);
    for index in 0..depth {
        let kind = match r.u8()? {
            0 => SpanKind::Emph,
            1 => SpanKind::Strong,
            _ => return Err(CodecError::InvalidRecord { index, field: "kind" }),
        };
        let delim = DelimiterChar::from_byte(r.u8()?)
            .ok_or(CodecError::InvalidRecord { index, field: "char" })?;
        let run_len = r.u16()? as usize;
        if run_len < kind.width() {
            return Err(CodecError::InvalidRecord {
                index,
                field: "run length",
            });
        }
        let run_start = r.u32()? as usize;
        if entries
            .last()
            .is_some_and(|prev: &OpenDelimiter| prev.run_start > run_start)
        {
            return Err(CodecError::InvalidRecord {
                index,
                field: "run start",
            });
        }
        entries.push(OpenDelimiter {
            kind,
            delim,
            run_len,
            run_start,
        });
    }

    Ok(ScannerState {
        stack: DelimiterStack::from_entries(entries),
        at_line_start: flags & FLAG_LINE_START != 0,
        pending_blank_lines,
        partial,
    })
}

fn offset(value: usize) -> Result<u32, CodecError> {
    u32::try_from(value).map_err(|_| CodecError::OffsetOverflow(value))
}

struct Writer<'b> {
    buf: &'b mut [u8],
    at: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.at..self.at + bytes.len()].copy_from_slice(bytes);
        self.at += bytes.len();
    }

    fn u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }
}

struct Reader<'b> {
    buf: &'b [u8],
    at: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let bytes = self
            .buf
            .get(self.at..self.at + N)
            .ok_or(CodecError::Truncated {
                expected: self.at + N,
                found: self.buf.len(),
            })?;
        self.at += N;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take()?))
    }
}
