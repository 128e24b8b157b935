//! # quarto-scanner
//!
//! The external token scanner behind an inline markup grammar: line
//! boundaries, `*`/`_` emphasis and strong delimiters, and backslash
//! escapes. These are the tokens a context-free grammar cannot decide on
//! its own, because whether `*` opens a span depends on its neighbours and
//! on which spans are already open.
//!
//! ## Architecture Overview
//!
//! The host parser calls the scanner once per candidate token boundary:
//!
//! ```text
//! host ──(state, input, valid symbols)──► Scanner::scan ──► Token | decline
//!                                          │
//!                     ┌────────────────────┼────────────────────┐
//!                     ▼                    ▼                    ▼
//!                   line               escape         delimiter + emphasis
//!             (line_start/end)       (no_parse)      (classify, then stack)
//! ```
//!
//! On decline the host lexes the text itself. Everything the scanner
//! remembers between calls lives in a [`ScannerState`] value owned by the
//! host, one per parse path, stored as bytes through [`codec`] when the host
//! wants to reparse incrementally.
//!
//! ## Module Structure
//!
//! ```text
//! quarto-scanner/
//! ├── lib.rs         # This file - public API and token-stream tests
//! ├── token.rs       # External symbol vocabulary and valid-symbol sets
//! ├── cursor.rs      # Byte cursor over the source
//! ├── delimiter.rs   # Flanking classification of `*`/`_` runs
//! ├── stack.rs       # Unmatched openers
//! ├── state.rs       # ScannerState (the whole persisted state)
//! ├── codec.rs       # Versioned binary state format
//! ├── line.rs        # line_start / line_end
//! ├── escape.rs      # no_parse
//! ├── emphasis.rs    # Opener/closer resolution over the stack
//! ├── scanner.rs     # Entry point and check order
//! ├── lexer.rs       # Logos fallback lexer
//! └── session.rs     # Host simulation: drive a whole document
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use quarto_scanner::{Input, Scanner, ScannerState, TokenKind, ValidSymbols};
//!
//! let scanner = Scanner::default();
//! let mut state = ScannerState::new();
//! let source = "*a*";
//!
//! let token = scanner
//!     .scan(&mut state, Input::new(source, 0), ValidSymbols::all_but_error())
//!     .unwrap();
//! assert_eq!(token.kind, TokenKind::LINE_START);
//!
//! let token = scanner
//!     .scan(&mut state, Input::new(source, 0), ValidSymbols::all_but_error())
//!     .unwrap();
//! assert_eq!(token.kind, TokenKind::EMPH_STAR_START);
//! assert_eq!(state.stack.depth(), 1);
//! ```

pub mod codec;
pub mod cursor;
pub mod delimiter;
mod emphasis;
mod escape;
pub mod lexer;
mod line;
pub mod scanner;
pub mod session;
pub mod stack;
pub mod state;
pub mod token;

pub use codec::CodecError;
pub use quarto_scanner_config::{ConfigError, ScannerConfig};
pub use scanner::{Input, Scanner};
pub use session::{Lexeme, LexemeKind, ScanSession, tokenize};
pub use state::ScannerState;
pub use token::{Token, TokenKind, ValidSymbols};
