//! Conversion of checker diagnostics into renderable diagnostics.

use crate::error::TypeDiagnostic;
use jscriptor_diagnostics::hints::hint_for_code;
use jscriptor_diagnostics::span::SourceSpan;
use jscriptor_diagnostics::Diagnostic;
use std::path::Path;

impl TypeDiagnostic {
    /// Build a diagnostic for `file`, labelled at the erroring node and with
    /// the code's fix hint attached.
    pub fn to_diagnostic(&self, file: impl AsRef<Path>) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(self.code(), self.message());

        if let Some(span) = self.span {
            let source_span = SourceSpan::new(file.as_ref(), span.start, span.end);
            diagnostic = diagnostic.with_primary_span(source_span, self.error.label());
        }

        if let Some(hint) = hint_for_code(self.code()) {
            diagnostic = diagnostic.with_help(hint);
        }

        diagnostic
    }
}
