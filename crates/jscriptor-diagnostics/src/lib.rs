//! JScriptor Diagnostics - renderer-agnostic error reports for the checker.
//!
//! This crate provides:
//!
//! - `Diagnostic` - a code, severity, message, labelled spans and attached notes
//! - `DiagnosticSeverity` - Error, Warning, Note, and Help levels
//! - [`span::SourceSpan`] and [`span::LineIndex`] for locating errors in a file
//! - [`render::DiagnosticRenderer`] for colored terminal output
//! - [`hints::hint_for_code`] with the fix hints attached to checker codes
//!
//! # Example
//!
//! ```rust
//! use jscriptor_diagnostics::{Diagnostic, DiagnosticSeverity};
//! use jscriptor_diagnostics::span::SourceSpan;
//!
//! let span = SourceSpan::new("src/main.js", 10, 21);
//! let diagnostic = Diagnostic::error("E_BIN_ADD_MISMATCH", "Type mismatch in binary operation")
//!     .with_primary_span(span, "cannot add these operands")
//!     .with_help("both operands of '+' must have the same type");
//!
//! assert_eq!(diagnostic.severity, DiagnosticSeverity::Error);
//! assert_eq!(diagnostic.code.as_deref(), Some("E_BIN_ADD_MISMATCH"));
//! ```

pub mod hints;
pub mod render;
pub mod span;

use span::{Label, SourceSpan};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticSeverity {
    #[default]
    Error,
    Warning,
    /// Informational note, usually attached to another diagnostic.
    Note,
    /// A suggestion for fixing an issue.
    Help,
}

impl DiagnosticSeverity {
    /// Returns the text prefix for this severity level.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Note => "note",
            DiagnosticSeverity::Help => "help",
        }
    }

    /// Returns the underline character for this severity level.
    pub fn underline_char(&self) -> char {
        match self {
            DiagnosticSeverity::Error => '^',
            DiagnosticSeverity::Warning => '~',
            DiagnosticSeverity::Note => '-',
            DiagnosticSeverity::Help => '+',
        }
    }

    /// Returns true if this severity level fails a check run.
    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

/// A checker diagnostic (error, warning, note, or help message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The error code (e.g., "E_TYPECHECK").
    pub code: Option<String>,
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Labelled source locations; the first primary label is the error site.
    pub labels: Vec<Label>,
    /// Child diagnostics (notes, helps attached to this diagnostic).
    pub children: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Creates a new diagnostic with the given severity, code, and message.
    pub fn new(
        severity: DiagnosticSeverity,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            labels: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, Some(code.into()), message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, Some(code.into()), message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Note, None, message)
    }

    pub fn help(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Help, None, message)
    }

    /// Adds a primary span with a label message.
    pub fn with_primary_span(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Adds a child diagnostic (note or help).
    pub fn with_child(mut self, child: Diagnostic) -> Self {
        self.children.push(child);
        self
    }

    /// Shorthand for attaching a `help:` child.
    pub fn with_help(self, message: impl Into<String>) -> Self {
        self.with_child(Diagnostic::help(message))
    }

    /// The span of the first label, if any.
    pub fn primary_span(&self) -> Option<&SourceSpan> {
        self.labels.first().map(|label| &label.span)
    }

    pub fn has_spans(&self) -> bool {
        !self.labels.is_empty()
    }
}
