//! JScriptor command-line interface
//!
//! Type checks JavaScript sources written with JScriptor type annotations.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use clap::{ArgAction, Parser, Subcommand};
use jscriptor_ast::{Stmt, StmtKind};
use jscriptor_compiler::json::JsonReport;
use jscriptor_compiler::{
    check_file, checker_options, format_file, format_options, read_source, FileReport,
};
use jscriptor_config::{ConfigLoader, Config as ProjectSettings};
use jscriptor_diagnostics::render::{DiagnosticRenderer, RenderConfig, SourceCache};
use jscriptor_formatter::format_annotation;
use jscriptor_lexer::Lexer;
use jscriptor_parser::{parse, ParseError};
use miette::IntoDiagnostic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jscriptor")]
#[command(version)]
#[command(about = "Type checker for JavaScript with type annotations", long_about = None)]
struct Cli {
    /// Raise the log level (-d info, -dd debug, -ddd trace); JSCRIPTOR_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type check source files
    Check {
        /// Files to check; the project's include patterns when empty
        files: Vec<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
        /// Project configuration file (default: nearest jscriptor.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse source file and display AST
    Parse {
        /// Source file to parse
        file: PathBuf,
        /// Show full AST details
        #[arg(short, long)]
        verbose: bool,
    },
    /// Lex source file and display tokens
    Lex {
        /// Source file to lex
        file: PathBuf,
    },
    /// Pretty-print a source file
    Fmt {
        /// Source file to format
        file: PathBuf,
        /// Rewrite the file in place instead of printing it
        #[arg(short, long)]
        write: bool,
    },
    /// Show the inferred type of each top-level binding
    Types {
        /// Source file to check
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Check {
            files,
            json,
            no_color,
            config,
        } => check_command(files, json, !no_color, config.as_deref()),
        Commands::Parse { file, verbose } => parse_command(&file, verbose),
        Commands::Lex { file } => lex_command(&file),
        Commands::Fmt { file, write } => fmt_command(&file, write),
        Commands::Types { file } => types_command(&file),
    };

    match result {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("JSCRIPTOR_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> miette::Result<ProjectSettings> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.load_from_file(path).into_diagnostic(),
        None => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            loader.load_from_directory(&cwd).into_diagnostic()
        }
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Check files for parse and type errors
fn check_command(
    files: Vec<PathBuf>,
    json: bool,
    use_color: bool,
    config_path: Option<&Path>,
) -> miette::Result<ExitCode> {
    let config = load_config(config_path)?;
    let options = checker_options(&config.project.type_check);

    let files = if files.is_empty() {
        config.resolve_files().into_diagnostic()?
    } else {
        files
    };
    info!(files = files.len(), "checking");

    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        debug!(file = %path.display(), "checking file");
        reports.push(check_file(path, options).into_diagnostic()?);
    }
    let failed = reports.iter().any(FileReport::has_errors);

    if json {
        let output: Vec<JsonReport> = reports.iter().map(JsonReport::from_report).collect();
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else if files.is_empty() {
        eprintln!("No source files found under {}", config.root().display());
    } else {
        report_files(&reports, use_color).into_diagnostic()?;
        if !failed {
            println!("Check passed: {} file(s)", reports.len());
        }
    }

    Ok(exit_code(failed))
}

/// Parse a source file and display the AST
fn parse_command(path: &Path, verbose: bool) -> miette::Result<ExitCode> {
    let source = read_source(path).into_diagnostic()?;
    let filename = path.display().to_string();
    let (program, parse_errors) = parse(&source);

    for error in &parse_errors {
        report_parse_error(&filename, &source, error, true).into_diagnostic()?;
    }

    if verbose {
        println!("{program:#?}");
    } else {
        println!("Parsed {} statements:", program.statements.len());
        for stmt in &program.statements {
            print_stmt_summary(stmt);
        }
    }

    Ok(exit_code(!parse_errors.is_empty()))
}

/// Lex a source file and display tokens
fn lex_command(path: &Path) -> miette::Result<ExitCode> {
    let source = read_source(path).into_diagnostic()?;
    let (tokens, lex_errors) = Lexer::new(&source).tokenize_filtered();

    println!("Tokens ({}):", tokens.len());
    for token in &tokens {
        println!("  {:?} @ {}..{}", token.kind, token.span.start, token.span.end);
    }

    if !lex_errors.is_empty() {
        println!("\nLexer errors ({}):", lex_errors.len());
        for error in &lex_errors {
            println!("  {error}");
        }
    }

    Ok(exit_code(!lex_errors.is_empty()))
}

/// Format a source file to stdout or in place
fn fmt_command(path: &Path, write: bool) -> miette::Result<ExitCode> {
    let config = load_config(None)?;
    let options = format_options(&config.project.format);
    let formatted = format_file(path, &options).into_diagnostic()?;

    if write {
        fs::write(path, format!("{formatted}\n")).into_diagnostic()?;
        info!(file = %path.display(), "formatted");
    } else {
        println!("{formatted}");
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the resolved type of each top-level binding
fn types_command(path: &Path) -> miette::Result<ExitCode> {
    let config = load_config(None)?;
    let report = check_file(path, checker_options(&config.project.type_check)).into_diagnostic()?;

    report_files(std::slice::from_ref(&report), true).into_diagnostic()?;
    for binding in report.bindings() {
        println!("{}: {}", binding.name, binding.ty);
    }

    Ok(exit_code(report.has_errors()))
}

// ============================================================================
// Reporting
// ============================================================================

fn print_stmt_summary(stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Const(decl) => match &decl.ty {
            Some(ty) => println!(
                "  const {}: {} = <{}>",
                decl.name.name,
                format_annotation(ty),
                decl.value.kind_name()
            ),
            None => println!("  const {} = <{}>", decl.name.name, decl.value.kind_name()),
        },
        StmtKind::Return(ret) => match &ret.argument {
            Some(argument) => println!("  return <{}>", argument.kind_name()),
            None => println!("  return"),
        },
    }
}

/// Report parse errors with ariadne and type errors with the diagnostic renderer
fn report_files(reports: &[FileReport], use_color: bool) -> io::Result<()> {
    let mut sources = SourceCache::new();
    let mut diagnostics = Vec::new();

    for report in reports {
        let filename = report.file_name();
        for error in &report.parse_errors {
            report_parse_error(&filename, &report.source, error, use_color)?;
        }
        diagnostics.extend(report.type_errors().iter().map(|d| d.to_diagnostic(&report.path)));
        sources.add_source(filename, report.source.as_str());
    }

    let mut renderer = DiagnosticRenderer::stderr(RenderConfig {
        use_color,
        ..RenderConfig::default()
    });
    renderer.render_all(&diagnostics, &sources)
}

/// Character offset of a byte offset; ariadne labels count characters
fn char_offset(source: &str, byte: usize) -> usize {
    match source.get(..byte) {
        Some(prefix) => prefix.chars().count(),
        None => source.chars().count(),
    }
}

/// Report a parse error using ariadne
fn report_parse_error(filename: &str, source: &str, error: &ParseError, use_color: bool) -> io::Result<()> {
    let span = error.span();
    let start = char_offset(source, span.start);
    let end = char_offset(source, span.end).max(start);

    let (message, label, help) = match error {
        ParseError::UnexpectedToken { expected, found, .. } => (
            "unexpected token".to_string(),
            format!("expected {expected}, found {found}"),
            None,
        ),
        ParseError::UnexpectedEof { expected, .. } => (
            "unexpected end of file".to_string(),
            format!("expected {expected}"),
            None,
        ),
        ParseError::AnyTypeNotSupported { .. } => (
            "the 'any' type is not supported".to_string(),
            "'any' is not allowed here".to_string(),
            Some("use a concrete type such as Number or String"),
        ),
        ParseError::ExpressionBodyNotSupported { .. } => (
            "arrow function without a block body".to_string(),
            "expected '{'".to_string(),
            Some("wrap the body in braces: `(x) => { return x; }`"),
        ),
        ParseError::InvalidNumber { literal, .. } => (
            "invalid number literal".to_string(),
            format!("'{literal}' is not a number"),
            None,
        ),
        ParseError::Lexical(err) => ("lexical error".to_string(), err.to_string(), None),
    };

    let mut report = Report::build(ReportKind::Error, filename, start)
        .with_config(Config::default().with_color(use_color))
        .with_message(message)
        .with_label(
            Label::new((filename, start..end))
                .with_message(label)
                .with_color(Color::Red),
        );
    if let Some(help) = help {
        report = report.with_help(help);
    }

    report.finish().eprint((filename, Source::from(source)))
}
