//! JScriptor source formatter.
//!
//! Prints a parsed [`Program`] back to canonical source text. The parser does
//! not keep grouping parentheses, so the printer re-inserts them wherever
//! the tree would otherwise re-parse differently: a binary right operand that
//! is itself binary, and a conditional nested inside a binary operand or used
//! as a ternary condition.

use jscriptor_ast::{
    ArrowFunction, Block, Expr, ExprKind, Param, Program, Property, Stmt, StmtKind,
    TypeAnnotation, TypeField,
};
use jscriptor_parser::ParseError;
use thiserror::Error;

/// Formatter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Width of one indentation level when indenting with spaces
    pub indent_size: usize,
    /// Indent with spaces; tabs otherwise
    pub use_spaces: bool,
    /// Preferred maximum line length. Carried for configuration, not enforced.
    pub max_line_length: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            use_spaces: true,
            max_line_length: 80,
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(
        "cannot format source with {} parse error(s): {}",
        .0.len(),
        .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
    )]
    Parse(Vec<ParseError>),
}

pub type FormatResult<T> = Result<T, FormatError>;

/// Parse and format `source`; refuses sources that do not parse cleanly.
pub fn format_source(source: &str, options: &FormatOptions) -> FormatResult<String> {
    let (program, errors) = jscriptor_parser::parse(source);
    if !errors.is_empty() {
        return Err(FormatError::Parse(errors));
    }
    Ok(format_program(&program, options))
}

/// Format a program; statements are separated by newlines.
pub fn format_program(program: &Program, options: &FormatOptions) -> String {
    let mut printer = Printer::new(options);
    for (i, stmt) in program.statements.iter().enumerate() {
        if i > 0 {
            printer.newline();
        }
        printer.print_stmt(stmt);
    }
    printer.finish()
}

/// Format a single type annotation
pub fn format_annotation(annotation: &TypeAnnotation) -> String {
    let options = FormatOptions::default();
    let mut printer = Printer::new(&options);
    printer.print_type(annotation);
    printer.finish()
}

// Binding strength of expression forms, loosest first
const PREC_CONDITIONAL: u8 = 1;
const PREC_BINARY: u8 = 2;
const PREC_OPERAND: u8 = 3;

struct Printer<'a> {
    out: String,
    options: &'a FormatOptions,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(options: &'a FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn write_indent(&mut self) {
        if self.options.use_spaces {
            for _ in 0..self.indent * self.options.indent_size {
                self.out.push(' ');
            }
        } else {
            for _ in 0..self.indent {
                self.out.push('\t');
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn print_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Const(decl) => {
                self.write("const ");
                self.write(&decl.name.name);
                if let Some(ty) = &decl.ty {
                    self.write(": ");
                    self.print_type(ty);
                }
                self.write(" = ");
                self.print_expr(&decl.value, 0);
                self.write(";");
            }
            StmtKind::Return(ret) => match &ret.argument {
                Some(argument) => {
                    self.write("return ");
                    self.print_expr(argument, 0);
                    self.write(";");
                }
                None => self.write("return;"),
            },
        }
    }

    fn print_block(&mut self, block: &Block) {
        if block.statements.is_empty() {
            self.write("{}");
            return;
        }

        self.write("{");
        self.indent += 1;
        for stmt in &block.statements {
            self.newline();
            self.write_indent();
            self.print_stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.write_indent();
        self.write("}");
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn print_expr(&mut self, expr: &Expr, parent_prec: u8) {
        match &expr.kind {
            ExprKind::String(value) => self.print_string(value),
            ExprKind::Number(value) => self.write(&value.to_string()),
            ExprKind::Boolean(value) => self.write(if *value { "true" } else { "false" }),
            ExprKind::Identifier(name) => self.write(name),
            ExprKind::Binary { op, left, right } => {
                let parens = parent_prec > PREC_BINARY;
                if parens {
                    self.write("(");
                }
                self.print_expr(left, PREC_BINARY);
                self.write(" ");
                self.write(op.symbol());
                self.write(" ");
                self.print_expr(right, PREC_OPERAND);
                if parens {
                    self.write(")");
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let parens = parent_prec > PREC_CONDITIONAL;
                if parens {
                    self.write("(");
                }
                self.print_expr(test, PREC_BINARY);
                self.write(" ? ");
                self.print_expr(consequent, PREC_CONDITIONAL);
                self.write(" : ");
                self.print_expr(alternate, PREC_CONDITIONAL);
                if parens {
                    self.write(")");
                }
            }
            ExprKind::Call { callee, args } => {
                self.print_expr(callee, PREC_OPERAND);
                self.write("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expr(arg, 0);
                }
                self.write(")");
            }
            ExprKind::ArrowFunction(arrow) => self.print_arrow(arrow),
            ExprKind::Array(elements) => {
                self.write("[");
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expr(el, 0);
                }
                self.write("]");
            }
            ExprKind::Object(properties) => self.print_object(properties),
            ExprKind::Error => self.write("/* error */"),
        }
    }

    fn print_arrow(&mut self, arrow: &ArrowFunction) {
        self.write("(");
        for (i, param) in arrow.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_param(param);
        }
        self.write(")");
        if let Some(ret) = &arrow.return_type {
            self.write(": ");
            self.print_type(ret);
        }
        self.write(" => ");
        self.print_block(&arrow.body);
    }

    fn print_param(&mut self, param: &Param) {
        self.write(&param.name);
        if let Some(ty) = &param.ty {
            self.write(": ");
            self.print_type(ty);
        }
    }

    fn print_object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }

        self.write("{ ");
        for (i, prop) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if is_identifier(&prop.key) {
                self.write(&prop.key);
            } else {
                self.print_string(&prop.key);
            }
            self.write(": ");
            self.print_expr(&prop.value, 0);
        }
        self.write(" }");
    }

    /// Double quotes, unless the text itself contains one
    fn print_string(&mut self, value: &str) {
        let quote = if value.contains('"') { '\'' } else { '"' };
        self.out.push(quote);
        self.out.push_str(value);
        self.out.push(quote);
    }

    // ========================================================================
    // Type annotations
    // ========================================================================

    fn print_type(&mut self, ty: &TypeAnnotation) {
        match ty {
            TypeAnnotation::Named { name, .. } => self.write(name),
            TypeAnnotation::Array { element, .. } => {
                self.write("Array<");
                self.print_type(element);
                self.write(">");
            }
            TypeAnnotation::Function {
                params,
                return_type,
                ..
            } => {
                self.write("(");
                self.print_fields(params);
                self.write(") => ");
                self.print_type(return_type);
            }
            TypeAnnotation::Object { fields, .. } => {
                if fields.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    self.print_fields(fields);
                    self.write(" }");
                }
            }
            TypeAnnotation::Union { types, .. } => {
                for (i, member) in types.iter().enumerate() {
                    if i > 0 {
                        self.write(" | ");
                    }
                    self.print_type(member);
                }
            }
        }
    }

    fn print_fields(&mut self, fields: &[TypeField]) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&field.name);
            self.write(": ");
            self.print_type(&field.ty);
        }
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(source: &str) -> String {
        format_source(source, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_const_declarations() {
        assert_eq!(fmt("const   x:number=3"), "const x: number = 3;");
        assert_eq!(fmt("const s = 'hi';"), "const s = \"hi\";");
        assert_eq!(fmt("const b = true;"), "const b = true;");
        assert_eq!(fmt("const f = 2.5;"), "const f = 2.5;");
    }

    #[test]
    fn test_statements_are_joined_by_newlines() {
        assert_eq!(fmt("const a = 1; const b = a;"), "const a = 1;\nconst b = a;");
    }

    #[test]
    fn test_arrow_function_body_is_indented() {
        let source = "const f = (x: number, y): number => { const z = x + y; return z; };";
        let expected = "\
const f = (x: number, y): number => {
  const z = x + y;
  return z;
};";
        assert_eq!(fmt(source), expected);
    }

    #[test]
    fn test_nested_bodies_indent_further() {
        let source = "const f = () => { const g = () => { return; }; return g; };";
        let expected = "\
const f = () => {
  const g = () => {
    return;
  };
  return g;
};";
        assert_eq!(fmt(source), expected);
    }

    #[test]
    fn test_tab_indentation() {
        let options = FormatOptions {
            use_spaces: false,
            ..FormatOptions::default()
        };
        let out = format_source("const f = () => { return 1; };", &options).unwrap();
        assert_eq!(out, "const f = () => {\n\treturn 1;\n};");
    }

    #[test]
    fn test_empty_block_and_object() {
        assert_eq!(fmt("const f = () => {};"), "const f = () => {};");
        assert_eq!(fmt("const o = {};"), "const o = {};");
    }

    #[test]
    fn test_object_keys() {
        assert_eq!(
            fmt("const o = {a: 1, \"b c\": [1, 2], 'd': x(1)};"),
            "const o = { a: 1, \"b c\": [1, 2], d: x(1) };"
        );
    }

    #[test]
    fn test_grouping_is_restored() {
        assert_eq!(fmt("const x = a + (b * c);"), "const x = a + (b * c);");
        assert_eq!(fmt("const x = (a + b) * c;"), "const x = a + b * c;");
        assert_eq!(fmt("const x = (a ? b : c) ? d : e;"), "const x = (a ? b : c) ? d : e;");
        assert_eq!(fmt("const x = a ? b : c ? d : e;"), "const x = a ? b : c ? d : e;");
        assert_eq!(fmt("const x = 1 + (t ? 1 : 2);"), "const x = 1 + (t ? 1 : 2);");
    }

    #[test]
    fn test_annotations() {
        assert_eq!(
            fmt("const f: (x: number, y: string) => boolean = (x, y) => { return true; };"),
            "const f: (x: number, y: string) => boolean = (x, y) => {\n  return true;\n};"
        );
        assert_eq!(fmt("const a: number[] = [];"), "const a: Array<number> = [];");
        assert_eq!(
            fmt("const p: {a: number, b: Array<string>} = {a: 1, b: []};"),
            "const p: { a: number, b: Array<string> } = { a: 1, b: [] };"
        );
        assert_eq!(
            fmt("const v: number|string|Bool = 1;"),
            "const v: number | string | Bool = 1;"
        );
    }

    #[test]
    fn test_format_annotation_alone() {
        let annotation = |source: &str| {
            let ty = jscriptor_parser::Parser::new(source).parse_type().unwrap();
            format_annotation(&ty)
        };
        assert_eq!(annotation("number | Array<string>"), "number | Array<string>");
        assert_eq!(annotation("string[]"), "Array<string>");
        assert_eq!(annotation("(n: number) => {ok: boolean}"), "(n: number) => { ok: boolean }");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let source = "const f = (x: number): number => { return x * (x + 1); }; const r = f(2) + 3 ? 'a' : \"b\";";
        let once = fmt(source);
        assert_eq!(fmt(&once), once);
    }

    #[test]
    fn test_refuses_sources_with_parse_errors() {
        let err = format_source("const = 1;", &FormatOptions::default()).unwrap_err();
        assert!(matches!(&err, FormatError::Parse(errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("cannot format source with 1 parse error(s)"));
    }

    #[test]
    fn test_quotes_switch_when_text_has_double_quote() {
        insta::assert_snapshot!(fmt("const s = 'say \"hi\"';"), @r###"const s = 'say "hi"';"###);
    }
}
