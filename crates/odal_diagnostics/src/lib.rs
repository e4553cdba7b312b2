//! odal_diagnostics: Positioned error reporting for the Odal front end.
//!
//! The front end reports every grammar or resource error as a
//! [`Diagnostic`] carrying the file name and a 1-based source position.
//! Rendering is line-oriented and must stay byte-for-byte stable for
//! tooling that scrapes compiler output:
//!
//! ```text
//! <filename>:<line>:<column>: error: <message>
//! ```

use std::fmt;
use std::io;

use odal_core::text::LineCol;

/// A single positioned error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the error was found in.
    pub file: String,
    /// 1-based line/column of the offending token.
    pub position: LineCol,
    /// Human-readable message, without trailing punctuation.
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, position: LineCol, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error: {}",
            self.file, self.position.line, self.position.column, self.message
        )
    }
}

/// Diagnostics accumulated during one parse.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort by position within the file.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| (d.position.line, d.position.column));
    }

    /// Write every diagnostic to the given sink, one buffered write per
    /// diagnostic, in the fixed `file:line:column: error: message` format.
    pub fn emit(&self, out: &mut dyn io::Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            out.write_all(format!("{diagnostic}\n").as_bytes())?;
        }
        Ok(())
    }
}
