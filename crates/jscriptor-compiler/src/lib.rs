//! JScriptor Compiler Library
//!
//! The check pipeline behind the `jscriptor` binary: read a file, parse it,
//! type-check it when parsing succeeded, and summarize what was found.

pub mod json;

use jscriptor_ast::{SmolStr, Span, StmtKind};
use jscriptor_config::{ConfigError, FormatConfig, TypeCheckConfig};
use jscriptor_formatter::{format_source, FormatError, FormatOptions};
use jscriptor_parser::{parse, ParseError};
use jscriptor_types::{CheckResult, CheckerOptions, TypeChecker, TypeDiagnostic};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use jscriptor_ast::Program;

/// Errors that stop a command before any source is checked
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Error reading file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result type for compilation operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Everything learned about one source file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub program: Program,
    pub parse_errors: Vec<ParseError>,
    /// Present only when the file parsed cleanly
    pub check: Option<CheckResult>,
}

/// A top-level `const` and its inferred type
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: SmolStr,
    pub ty: String,
    pub span: Span,
}

impl FileReport {
    pub fn type_errors(&self) -> &[TypeDiagnostic] {
        match &self.check {
            Some(check) => &check.diagnostics,
            None => &[],
        }
    }

    pub fn error_count(&self) -> usize {
        self.parse_errors.len() + self.type_errors().len()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Display name used in reports
    pub fn file_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Top-level declarations with their resolved types
    pub fn bindings(&self) -> Vec<Binding> {
        let Some(check) = &self.check else {
            return Vec::new();
        };

        self.program
            .statements
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Const(decl) => Some(Binding {
                    name: decl.name.name.clone(),
                    ty: check
                        .type_name(decl.name.id)
                        .unwrap_or_else(|| "unknown".to_string()),
                    span: decl.name.span,
                }),
                StmtKind::Return(_) => None,
            })
            .collect()
    }
}

/// Checker options selected by the `[type-check]` section
pub fn checker_options(config: &TypeCheckConfig) -> CheckerOptions {
    CheckerOptions {
        check_return_types: config.check_return_types,
        check_parameter_types: config.check_parameter_types,
    }
}

/// Formatter options selected by the `[format]` section
pub fn format_options(config: &FormatConfig) -> FormatOptions {
    FormatOptions {
        indent_size: config.indent_size,
        use_spaces: config.use_spaces,
        max_line_length: config.max_line_length,
    }
}

pub fn read_source(path: &Path) -> CompileResult<String> {
    fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and type-check source text
///
/// Type checking is skipped when the parser reported errors.
pub fn check_source(path: impl Into<PathBuf>, source: impl Into<String>, options: CheckerOptions) -> FileReport {
    let path = path.into();
    let source = source.into();

    let (program, parse_errors) = parse(&source);
    let check = if parse_errors.is_empty() {
        Some(TypeChecker::with_options(options).check_program(&program))
    } else {
        debug!(file = %path.display(), errors = parse_errors.len(), "skipping type check after parse errors");
        None
    };

    FileReport {
        path,
        source,
        program,
        parse_errors,
        check,
    }
}

/// Read, parse and type-check a file
pub fn check_file(path: &Path, options: CheckerOptions) -> CompileResult<FileReport> {
    let source = read_source(path)?;
    Ok(check_source(path, source, options))
}

/// Format a file's source without writing it
pub fn format_file(path: &Path, options: &FormatOptions) -> CompileResult<String> {
    let source = read_source(path)?;
    Ok(format_source(&source, options)?)
}
