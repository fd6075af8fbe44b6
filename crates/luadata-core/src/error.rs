//! Error types for tokenizing and parsing Lua data files.
//!
//! Every error carries the byte offset into the source where it was detected.
//! Use [`line_col`] (or [`LuaDataError::line_col`]) to turn that offset into a
//! 1-based line and column for display.

use thiserror::Error;

/// Errors raised while turning source text into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A backslash escape the string grammar does not know (e.g. `\q`), a
    /// decimal escape above 255, or decimal escapes that are not valid UTF-8.
    #[error("invalid escape sequence `\\{escape}` at offset {offset}")]
    InvalidEscape { offset: usize, escape: char },

    /// A malformed numeric literal such as `1.2.3`, `1e` or `12ab`.
    #[error("invalid number literal `{text}` at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    /// A character that cannot start any token.
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedCharacter { offset: usize, ch: char },

    /// A string literal with no closing quote on the same line.
    /// `offset` points at the opening quote.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A `--[[` block comment that is never closed.
    #[error("unterminated block comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::InvalidEscape { offset, .. }
            | LexError::InvalidNumber { offset, .. }
            | LexError::UnexpectedCharacter { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::UnterminatedComment { offset } => *offset,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LexError::InvalidEscape { .. } => "invalid-escape",
            LexError::InvalidNumber { .. } => "invalid-number",
            LexError::UnexpectedCharacter { .. } => "unexpected-character",
            LexError::UnterminatedString { .. } => "unterminated-string",
            LexError::UnterminatedComment { .. } => "unterminated-comment",
        }
    }
}

/// Errors raised while building a value tree from tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is neither a wrapping call like `data:extend({...})`
    /// nor a bare table.
    #[error("expected `name(...)` call or table at offset {offset}")]
    MissingEntryPoint { offset: usize },

    /// A table mixes `key = value` fields with positional values.
    /// `offset` points at the first field whose form differs.
    #[error("table mixes keyed and positional fields at offset {offset}")]
    MixedTableForm { offset: usize },

    #[error("expected {expected}, found {found} at offset {offset}")]
    UnexpectedToken {
        offset: usize,
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of input at offset {offset}, expected {expected}")]
    UnexpectedEndOfInput {
        offset: usize,
        expected: &'static str,
    },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::MissingEntryPoint { offset }
            | ParseError::MixedTableForm { offset }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnexpectedEndOfInput { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MissingEntryPoint { .. } => "missing-entry-point",
            ParseError::MixedTableForm { .. } => "mixed-table-form",
            ParseError::UnexpectedToken { .. } => "unexpected-token",
            ParseError::UnexpectedEndOfInput { .. } => "unexpected-end-of-input",
        }
    }
}

/// Any failure converting one source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LuaDataError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl LuaDataError {
    /// Byte offset into the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            LuaDataError::Lex(e) => e.offset(),
            LuaDataError::Parse(e) => e.offset(),
        }
    }

    /// Stable kebab-case identifier of the error variant, e.g. `mixed-table-form`.
    pub fn kind(&self) -> &'static str {
        match self {
            LuaDataError::Lex(e) => e.kind(),
            LuaDataError::Parse(e) => e.kind(),
        }
    }

    /// 1-based `(line, column)` of [`offset`](Self::offset) within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        line_col(source, self.offset())
    }
}

/// Map a byte offset to a 1-based `(line, column)` pair. Columns count
/// characters, not bytes. Offsets past the end clamp to the end of input.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Convenience alias used throughout luadata-core.
pub type Result<T> = std::result::Result<T, LuaDataError>;
