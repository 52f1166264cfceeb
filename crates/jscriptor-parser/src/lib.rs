//! JScriptor Parser
//!
//! Recursive descent parser with one token of lookahead that produces an AST
//! from the token stream. The only ambiguity in the grammar is a leading `(`,
//! which may open an arrow function parameter list or a grouped expression;
//! it is resolved by a speculative scan that rewinds the cursor.
//!
//! `+` and `*` share a single left-associative tier, so `a + b * c` parses as
//! `(a + b) * c`. The ternary is right-associative.
//!
//! Errors never abort the parse. A failed top-level statement is skipped up to
//! and including the next `;`; inside a function body the skip also stops in
//! front of the closing `}`.

use jscriptor_ast::*;
use jscriptor_lexer::{Lexer, LexerError, Token, TokenKind};
use thiserror::Error;
use tracing::{debug, trace};

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {}", .span.start)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file - expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("The 'any' type is not supported at position {}", .span.start)]
    AnyTypeNotSupported { span: Span },

    #[error("Arrow functions only support block bodies with curly braces (at position {})", .span.start)]
    ExpressionBodyNotSupported { span: Span },

    #[error("Invalid number literal '{literal}' at position {}", .span.start)]
    InvalidNumber { literal: String, span: Span },

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl ParseError {
    /// Source range the error points at
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::AnyTypeNotSupported { span }
            | ParseError::ExpressionBodyNotSupported { span }
            | ParseError::InvalidNumber { span, .. } => *span,
            ParseError::Lexical(err) => Span::new(err.position(), err.position() + 1),
        }
    }
}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    ids: NodeIdGen,
}

impl<'src> Parser<'src> {
    /// Create a new parser from source code
    pub fn new(source: &'src str) -> Self {
        let (tokens, lex_errors) = Lexer::new(source).tokenize_filtered();

        // Bad characters are reported once, as lexical errors, and otherwise
        // dropped from the stream
        let tokens = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Error)
            .collect();

        Self {
            source,
            tokens,
            pos: 0,
            errors: lex_errors.into_iter().map(ParseError::from).collect(),
            ids: NodeIdGen::new(),
        }
    }

    /// Parse the entire program
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.is_eof() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    debug!(error = %e, "recovering at statement level");
                    self.errors.push(e);
                    self.recover_to_next_statement();
                }
            }
        }

        Program {
            statements,
            span: Span::new(0, self.source.len()),
        }
    }

    /// Get collected errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Number of node ids handed out so far
    pub fn node_count(&self) -> u32 {
        self.ids.count()
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.current()
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.source.len(), self.source.len()))
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens
                .get(self.pos - 1)
                .map(|t| t.span)
                .unwrap_or(Span::new(0, 0))
        } else {
            Span::new(0, 0)
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    /// Consume `kind` if it is next
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        match self.current_kind() {
            Some(kind) => ParseError::UnexpectedToken {
                expected: expected.into(),
                found: kind.to_string(),
                span: self.current_span(),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.into(),
                span: self.current_span(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(&kind) {
            self.advance().ok_or_else(|| self.unexpected(kind.to_string()))
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<(SmolStr, Span)> {
        match self.current_kind() {
            Some(TokenKind::Identifier(name)) => {
                let name = name.clone();
                let span = self.current_span();
                self.pos += 1;
                Ok((name, span))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Skip past the next `;`
    fn recover_to_next_statement(&mut self) {
        while !self.is_eof() && !self.check(&TokenKind::Semicolon) {
            self.pos += 1;
        }
        self.eat(&TokenKind::Semicolon);
    }

    /// Skip past the next `;`, or up to the `}` closing the current block
    fn recover_in_block(&mut self) {
        while !self.is_eof()
            && !self.check(&TokenKind::Semicolon)
            && !self.check(&TokenKind::RBrace)
        {
            self.pos += 1;
        }
        self.eat(&TokenKind::Semicolon);
    }

    fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr::new(self.ids.next_id(), kind, span)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            Some(TokenKind::Const) => StmtKind::Const(self.parse_const()?),
            Some(TokenKind::Return) => StmtKind::Return(self.parse_return()?),
            _ => return Err(self.unexpected("'const' or 'return'")),
        };
        let span = start.merge(self.previous_span());

        // The terminating semicolon is optional
        self.eat(&TokenKind::Semicolon);

        Ok(Stmt::new(self.ids.next_id(), kind, span))
    }

    fn parse_const(&mut self) -> ParseResult<ConstDecl> {
        self.expect(TokenKind::Const)?;
        let (name, name_span) = self.expect_identifier("variable name")?;
        let name = Ident {
            id: self.ids.next_id(),
            name,
            span: name_span,
        };

        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        trace!(name = %name.name, "parsed const declaration");

        Ok(ConstDecl { name, ty, value })
    }

    fn parse_return(&mut self) -> ParseResult<ReturnStmt> {
        self.expect(TokenKind::Return)?;

        let argument = if self.is_eof()
            || self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        Ok(ReturnStmt { argument })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut statements = Vec::new();

        while !self.is_eof() && !self.check(&TokenKind::RBrace) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    debug!(error = %e, "recovering inside function body");
                    self.errors.push(e);
                    self.recover_in_block();
                }
            }
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Block {
            id: self.ids.next_id(),
            statements,
            span: start.merge(end),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse an expression, optionally wrapped in a right-associative ternary
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let test = self.parse_binary()?;

        if self.eat(&TokenKind::Question) {
            let consequent = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let alternate = self.parse_expression()?;
            let span = test.span.merge(alternate.span);
            return Ok(self.mk_expr(
                ExprKind::Conditional {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                },
                span,
            ));
        }

        Ok(test)
    }

    /// `+` and `*` bind equally, left to right
    fn parse_binary(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_primary()?;

        loop {
            let op = match self.current_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Star) => BinaryOp::Mul,
                _ => break,
            };
            self.advance();
            let right = self.parse_primary()?;
            let span = left.span.merge(right.span);
            left = self.mk_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.current_span();

        match self.current_kind().cloned() {
            Some(TokenKind::LParen) => {
                if self.is_arrow_function_ahead() {
                    self.parse_arrow_function()
                } else {
                    self.advance();
                    let inner = self.parse_expression()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(inner)
                }
            }
            Some(TokenKind::String(raw)) => {
                self.advance();
                let value = strip_quotes(&raw);
                Ok(self.mk_expr(ExprKind::String(value.into()), span))
            }
            Some(TokenKind::Number(raw)) => {
                self.advance();
                let value = raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    literal: raw.to_string(),
                    span,
                })?;
                Ok(self.mk_expr(ExprKind::Number(value), span))
            }
            Some(TokenKind::Boolean(value)) => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Boolean(value), span))
            }
            Some(TokenKind::Identifier(name)) => {
                self.advance();
                let ident = self.mk_expr(ExprKind::Identifier(name), span);
                if self.check(&TokenKind::LParen) {
                    self.parse_call(ident)
                } else {
                    Ok(ident)
                }
            }
            Some(TokenKind::LBracket) => self.parse_array_literal(),
            Some(TokenKind::LBrace) => self.parse_object_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Speculatively scan `(params): Ret =>` from the current `(` and rewind.
    fn is_arrow_function_ahead(&mut self) -> bool {
        let saved = self.pos;
        let result = self.scan_arrow_head();
        self.pos = saved;
        result.is_ok()
    }

    fn scan_arrow_head(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::LParen)?;

        if !self.check(&TokenKind::RParen) {
            loop {
                self.expect_identifier("parameter name")?;
                if self.eat(&TokenKind::Colon) {
                    match self.parse_type() {
                        // Still a parameter list; the real parse reports it
                        Err(ParseError::AnyTypeNotSupported { .. }) => return Ok(()),
                        other => {
                            other?;
                        }
                    }
                }
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen)?;
        if self.eat(&TokenKind::Colon) {
            self.parse_type()?;
        }
        self.expect(TokenKind::Arrow)?;
        Ok(())
    }

    fn parse_arrow_function(&mut self) -> ParseResult<Expr> {
        let start = self.expect(TokenKind::LParen)?.span;
        let mut params = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                let (name, span) = self.expect_identifier("parameter name")?;
                let ty = if self.eat(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let span = ty.as_ref().map_or(span, |t| span.merge(t.span()));
                params.push(Param {
                    id: self.ids.next_id(),
                    name,
                    ty,
                    span,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen)?;

        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Arrow)?;

        if !self.check(&TokenKind::LBrace) {
            return Err(ParseError::ExpressionBodyNotSupported {
                span: self.current_span(),
            });
        }
        let body = self.parse_block()?;
        let span = start.merge(body.span);

        Ok(self.mk_expr(
            ExprKind::ArrowFunction(ArrowFunction {
                params,
                return_type,
                body,
            }),
            span,
        ))
    }

    fn parse_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self.expect(TokenKind::RParen)?.span;
        let span = callee.span.merge(end);
        Ok(self.mk_expr(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let mut elements = Vec::new();

        // A trailing comma is allowed
        while !self.is_eof() && !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(self.mk_expr(ExprKind::Array(elements), start.merge(end)))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut properties = Vec::new();

        while !self.is_eof() && !self.check(&TokenKind::RBrace) {
            let key_span = self.current_span();
            let key: SmolStr = match self.current_kind() {
                Some(TokenKind::Identifier(name)) => name.clone(),
                Some(TokenKind::String(raw)) => strip_quotes(raw).into(),
                _ => return Err(self.unexpected("object property name")),
            };
            self.advance();
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            let span = key_span.merge(value.span);
            properties.push(Property {
                id: self.ids.next_id(),
                key,
                value,
                span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.mk_expr(ExprKind::Object(properties), start.merge(end)))
    }

    // ========================================================================
    // Type Annotations
    // ========================================================================

    /// Parse a type annotation, folding `|` alternatives into one flat union
    pub fn parse_type(&mut self) -> ParseResult<TypeAnnotation> {
        let mut ty = self.parse_primary_type()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_primary_type()?;
            ty = TypeAnnotation::union(ty, right);
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeAnnotation> {
        let mut ty = self.parse_base_type()?;

        // `T[]`
        while self.check(&TokenKind::LBracket) && self.peek_kind() == Some(&TokenKind::RBracket) {
            self.advance();
            let end = self.expect(TokenKind::RBracket)?.span;
            let span = ty.span().merge(end);
            ty = TypeAnnotation::Array {
                element: Box::new(ty),
                span,
            };
        }

        Ok(ty)
    }

    fn parse_base_type(&mut self) -> ParseResult<TypeAnnotation> {
        let span = self.current_span();

        match self.current_kind().cloned() {
            Some(TokenKind::TypeArray) => {
                self.advance();
                if self.eat(&TokenKind::Lt) {
                    let element = self.parse_type()?;
                    let end = self.expect(TokenKind::Gt)?.span;
                    Ok(TypeAnnotation::Array {
                        element: Box::new(element),
                        span: span.merge(end),
                    })
                } else {
                    Ok(TypeAnnotation::Named {
                        name: "Array".into(),
                        span,
                    })
                }
            }
            Some(kind) if kind.is_type_keyword() => {
                self.advance();
                let name = kind.type_keyword_name().unwrap_or_default();
                Ok(TypeAnnotation::Named {
                    name: name.into(),
                    span,
                })
            }
            Some(TokenKind::Identifier(name)) => {
                if name == "any" {
                    return Err(ParseError::AnyTypeNotSupported { span });
                }
                self.advance();
                Ok(TypeAnnotation::Named { name, span })
            }
            Some(TokenKind::LParen) => self.parse_function_type(),
            Some(TokenKind::LBrace) => self.parse_object_type(),
            _ => Err(self.unexpected("type annotation")),
        }
    }

    /// `(name: Type, ...) => Type`
    fn parse_function_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.expect(TokenKind::LParen)?.span;
        let params = self.parse_type_fields(&TokenKind::RParen, "parameter name")?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_type()?;
        let span = start.merge(return_type.span());

        Ok(TypeAnnotation::Function {
            params,
            return_type: Box::new(return_type),
            span,
        })
    }

    /// `{ name: Type, ... }`
    fn parse_object_type(&mut self) -> ParseResult<TypeAnnotation> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let fields = self.parse_type_fields(&TokenKind::RBrace, "field name")?;
        let end = self.expect(TokenKind::RBrace)?.span;

        Ok(TypeAnnotation::Object {
            fields,
            span: start.merge(end),
        })
    }

    fn parse_type_fields(&mut self, close: &TokenKind, what: &str) -> ParseResult<Vec<TypeField>> {
        let mut fields = Vec::new();

        while !self.is_eof() && !self.check(close) {
            let (name, name_span) = self.expect_identifier(what)?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            let span = name_span.merge(ty.span());
            fields.push(TypeField { name, ty, span });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(fields)
    }
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Parse source code into a program, collecting every error encountered
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    debug!(
        statements = program.statements.len(),
        errors = parser.errors().len(),
        "parsed program"
    );
    (program, parser.errors().to_vec())
}
