//! Diagnostic rendering for terminal output.
//!
//! The renderer writes to any [`WriteColor`] sink, so the same code drives
//! colored stderr output and plain in-memory buffers in tests:
//!
//! ```text
//! error[E_BIN_ADD_MISMATCH]: Type mismatch in binary operation: cannot add Number to String
//!  --> src/main.js:1:11
//!   |
//! 1 | const x = 5 + "hello";
//!   |           ^^^^^^^^^^^
//!   help: both operands of '+' must have the same type
//! ```

use crate::span::{Label, LineIndex, SourceSpan};
use crate::{Diagnostic, DiagnosticSeverity};
use std::collections::HashMap;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use unicode_width::UnicodeWidthStr;

/// Configuration for the diagnostic renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub use_color: bool,
    /// Source lines longer than this are truncated with `...`.
    pub max_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            max_width: 120,
        }
    }
}

/// Source texts by file name, with their line indexes.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, (String, LineIndex)>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, path: impl Into<String>, source: impl Into<String>) {
        let source = source.into();
        let index = LineIndex::new(&source);
        self.files.insert(path.into(), (source, index));
    }

    fn lookup(&self, span: &SourceSpan) -> Option<(&str, &LineIndex)> {
        let path = span.file.to_string_lossy();
        self.files
            .get(path.as_ref())
            .map(|(source, index)| (source.as_str(), index))
    }
}

/// Terminal renderer for diagnostics.
pub struct DiagnosticRenderer<W: WriteColor> {
    config: RenderConfig,
    out: W,
}

impl DiagnosticRenderer<StandardStream> {
    /// A renderer writing to stderr, colored when the terminal supports it.
    pub fn stderr(config: RenderConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(StandardStream::stderr(choice), config)
    }
}

impl<W: WriteColor> DiagnosticRenderer<W> {
    pub fn new(out: W, config: RenderConfig) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn severity_color(severity: DiagnosticSeverity) -> Color {
        match severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
            DiagnosticSeverity::Note => Color::Cyan,
            DiagnosticSeverity::Help => Color::Green,
        }
    }

    fn write_colored(&mut self, text: &str, color: Color, bold: bool) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        self.out.set_color(&spec)?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    /// Renders one diagnostic with its source context and children.
    pub fn render(&mut self, diagnostic: &Diagnostic, sources: &SourceCache) -> io::Result<()> {
        self.write_header(diagnostic)?;

        let gutter = diagnostic
            .labels
            .iter()
            .filter_map(|label| {
                let (source, index) = sources.lookup(&label.span)?;
                Some(index.line_col(source, label.span.start).line.to_string().len())
            })
            .max()
            .unwrap_or(1);

        let mut located = false;
        for label in &diagnostic.labels {
            let Some((source, index)) = sources.lookup(&label.span) else {
                continue;
            };
            if !located {
                let start = index.line_col(source, label.span.start);
                writeln!(
                    self.out,
                    "{:>width$}--> {}:{}:{}",
                    "",
                    label.span.file.display(),
                    start.line,
                    start.column,
                    width = gutter
                )?;
                self.write_gutter(gutter, None)?;
                writeln!(self.out)?;
                located = true;
            }
            self.write_label(label, source, index, diagnostic.severity, gutter)?;
        }

        for child in &diagnostic.children {
            let color = Self::severity_color(child.severity);
            write!(self.out, "{:>width$} ", "", width = gutter)?;
            self.write_colored(child.severity.prefix(), color, true)?;
            writeln!(self.out, ": {}", child.message)?;
        }
        Ok(())
    }

    /// Renders every diagnostic followed by a one-line summary.
    pub fn render_all(&mut self, diagnostics: &[Diagnostic], sources: &SourceCache) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.render(diagnostic, sources)?;
            writeln!(self.out)?;
        }
        self.render_summary(diagnostics)
    }

    pub fn render_summary(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        let errors = diagnostics.iter().filter(|d| d.severity.is_error()).count();
        if errors == 0 {
            return Ok(());
        }
        self.write_colored("error", Color::Red, true)?;
        let plural = if errors == 1 { "" } else { "s" };
        writeln!(self.out, ": found {} type error{}", errors, plural)
    }

    fn write_header(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let color = Self::severity_color(diagnostic.severity);
        self.write_colored(diagnostic.severity.prefix(), color, true)?;
        if let Some(code) = &diagnostic.code {
            self.write_colored(&format!("[{}]", code), color, true)?;
        }
        write!(self.out, ": ")?;
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        self.out.set_color(&spec)?;
        write!(self.out, "{}", diagnostic.message)?;
        self.out.reset()?;
        writeln!(self.out)
    }

    fn write_gutter(&mut self, width: usize, line: Option<usize>) -> io::Result<()> {
        let number = line.map(|l| l.to_string()).unwrap_or_default();
        self.write_colored(&format!("{:>width$} |", number, width = width), Color::Blue, true)
    }

    fn write_label(
        &mut self,
        label: &Label,
        source: &str,
        index: &LineIndex,
        severity: DiagnosticSeverity,
        gutter: usize,
    ) -> io::Result<()> {
        let start = index.line_col(source, label.span.start);
        let line_text = index.line_text(source, start.line).unwrap_or("");

        let shown = if line_text.width() > self.config.max_width {
            let mut cut = self.config.max_width.saturating_sub(3).min(line_text.len());
            while !line_text.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &line_text[..cut])
        } else {
            line_text.to_string()
        };
        self.write_gutter(gutter, Some(start.line))?;
        writeln!(self.out, " {}", shown)?;

        // Underline runs from the span start to the span end or end of line
        let prefix: String = line_text.chars().take(start.column - 1).collect();
        let covered: String = line_text
            .chars()
            .skip(start.column - 1)
            .scan(label.span.start, |offset, ch| {
                if *offset >= label.span.end {
                    return None;
                }
                *offset += ch.len_utf8();
                Some(ch)
            })
            .collect();
        let color = Self::severity_color(severity);
        let underline = severity
            .underline_char()
            .to_string()
            .repeat(covered.width().max(1));

        self.write_gutter(gutter, None)?;
        write!(self.out, " {:>pad$}", "", pad = prefix.width())?;
        self.write_colored(&underline, color, true)?;
        if !label.message.is_empty() {
            write!(self.out, " ")?;
            self.write_colored(&label.message, color, true)?;
        }
        writeln!(self.out)
    }
}
