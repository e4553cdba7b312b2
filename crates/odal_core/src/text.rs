//! Source text spans and line/column lookup.
//!
//! Tokens and diagnostics track where they originate as byte spans into
//! the source text; `LineMap` converts those offsets into the 1-based
//! line/column pairs diagnostics are rendered with.

use std::fmt;
use std::ops::Range;

/// A span of source text, defined by a byte offset and a byte length.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    /// The byte offset where this span starts.
    pub offset: u32,
    /// The length of this span in bytes.
    pub length: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(offset: u32) -> Self {
        Self { offset, length: 0 }
    }

    /// The end offset of this span (exclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.length
    }

    /// Whether this span is empty (zero-length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Convert to a byte range for slicing source text.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.end())
    }
}

/// A 1-based line/column position in source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineCol {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, counted in bytes from the line start.
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A map from byte offsets to line numbers, built once from source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Get the 0-based line index for a byte offset.
    fn line_index(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    /// Get the 1-based line and column for a byte offset.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        LineCol {
            line: line as u32 + 1,
            column: offset - line_start + 1,
        }
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
