//! JScriptor Lexer
//!
//! Tokenizes JScriptor source code: a small typed subset of JavaScript made of
//! `const` declarations, block-bodied arrow functions, `+`/`*`, ternaries,
//! calls, array/object literals and TypeScript-style annotations.
//! Uses the `logos` crate for efficient lexing.

use logos::Logos;
use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;

/// Source span representing a byte range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token with its kind and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Callback to lex block comments: consumes input until the closing `*/`
fn block_comment_callback(lex: &mut logos::Lexer<TokenKind>) -> Option<SmolStr> {
    let remainder = lex.remainder();
    if let Some(end_idx) = remainder.find("*/") {
        let content = &remainder[..end_idx];
        lex.bump(end_idx + 2);
        Some(SmolStr::new(format!("/*{content}*/")))
    } else {
        // Unterminated: swallow the rest, `tokenize` reports it
        let len = remainder.len();
        lex.bump(len);
        Some(SmolStr::new(format!("/*{remainder}")))
    }
}

/// All token types in JScriptor
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("const")]
    Const,
    #[token("return")]
    Return,

    // ========== Type Keywords ==========
    #[token("number")]
    TypeNumber,
    #[token("string")]
    TypeString,
    #[token("boolean")]
    TypeBoolean,
    #[token("Array")]
    TypeArray,
    #[token("void")]
    TypeVoid,
    /// Capitalized `Void`
    #[token("Void")]
    TypeVoidUpper,
    #[token("Float")]
    TypeFloat,
    #[token("Bool")]
    TypeBool,
    #[token("Unit")]
    TypeUnit,

    // ========== Operators and Punctuation ==========
    #[token("=>")]
    Arrow,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("|")]
    Pipe,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    // ========== Literals ==========
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Boolean(bool),

    /// Numeric literal, integral or with a fractional part
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| SmolStr::new(lex.slice()))]
    Number(SmolStr),

    /// String literal in double or single quotes, quotes included
    #[regex(r#""(?:[^"\\\n]|\\.)*""#, |lex| SmolStr::new(lex.slice()))]
    #[regex(r"'(?:[^'\\\n]|\\.)*'", |lex| SmolStr::new(lex.slice()))]
    String(SmolStr),

    // ========== Identifiers ==========
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| SmolStr::new(lex.slice()))]
    Identifier(SmolStr),

    // ========== Comments ==========
    #[regex(r"//[^\n]*", |lex| SmolStr::new(lex.slice()))]
    LineComment(SmolStr),

    #[token("/*", block_comment_callback)]
    BlockComment(SmolStr),

    // ========== Error ==========
    /// Lexer error - unrecognized character
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Const => write!(f, "const"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::TypeNumber => write!(f, "number"),
            TokenKind::TypeString => write!(f, "string"),
            TokenKind::TypeBoolean => write!(f, "boolean"),
            TokenKind::TypeArray => write!(f, "Array"),
            TokenKind::TypeVoid => write!(f, "void"),
            TokenKind::TypeVoidUpper => write!(f, "Void"),
            TokenKind::TypeFloat => write!(f, "Float"),
            TokenKind::TypeBool => write!(f, "Bool"),
            TokenKind::TypeUnit => write!(f, "Unit"),
            TokenKind::Arrow => write!(f, "=>"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Boolean(b) => write!(f, "{}", b),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::String(s) => write!(f, "string {}", s),
            TokenKind::Identifier(s) => write!(f, "identifier {}", s),
            TokenKind::LineComment(_) => write!(f, "comment"),
            TokenKind::BlockComment(_) => write!(f, "block comment"),
            TokenKind::Error => write!(f, "error"),
        }
    }
}

impl TokenKind {
    /// Check if this token is a comment
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LineComment(_) | TokenKind::BlockComment(_))
    }

    /// Check if this token starts a type annotation's primary form
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::TypeNumber
                | TokenKind::TypeString
                | TokenKind::TypeBoolean
                | TokenKind::TypeArray
                | TokenKind::TypeVoid
                | TokenKind::TypeVoidUpper
                | TokenKind::TypeFloat
                | TokenKind::TypeBool
                | TokenKind::TypeUnit
        )
    }

    /// Annotation name spelled by a type keyword, as written in annotations.
    pub fn type_keyword_name(&self) -> Option<&'static str> {
        match self {
            TokenKind::TypeNumber => Some("number"),
            TokenKind::TypeString => Some("string"),
            TokenKind::TypeBoolean => Some("boolean"),
            TokenKind::TypeArray => Some("Array"),
            TokenKind::TypeVoid => Some("void"),
            TokenKind::TypeVoidUpper => Some("Void"),
            TokenKind::TypeFloat => Some("Float"),
            TokenKind::TypeBool => Some("Bool"),
            TokenKind::TypeUnit => Some("Unit"),
            _ => None,
        }
    }
}

/// Lexer error type with detailed error messages
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Unexpected character '{1}' at position {0}")]
    UnexpectedCharacter(usize, char),

    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Unterminated block comment starting at position {0} - expected closing '*/'")]
    UnterminatedBlockComment(usize),
}

impl LexerError {
    /// Byte offset where the error starts
    pub fn position(&self) -> usize {
        match self {
            LexerError::UnexpectedCharacter(pos, _)
            | LexerError::UnterminatedString(pos)
            | LexerError::UnterminatedBlockComment(pos) => *pos,
        }
    }
}

/// Lexer for JScriptor source code
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
        }
    }

    /// Get the source code being lexed
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Tokenize the entire source into a vector of tokens, comments included
    pub fn tokenize(self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for (result, span) in self.inner.spanned() {
            match result {
                Ok(kind) => {
                    if let TokenKind::BlockComment(text) = &kind {
                        if !text.ends_with("*/") || text.len() < 4 {
                            errors.push(LexerError::UnterminatedBlockComment(span.start));
                        }
                    }
                    tokens.push(Token::new(kind, Span::from(span)));
                }
                Err(_) => {
                    let bad_char = self.source[span.clone()].chars().next().unwrap_or('?');
                    let error = match bad_char {
                        '"' | '\'' => LexerError::UnterminatedString(span.start),
                        _ => LexerError::UnexpectedCharacter(span.start, bad_char),
                    };
                    errors.push(error);
                    tokens.push(Token::new(TokenKind::Error, Span::from(span)));
                }
            }
        }

        (tokens, errors)
    }

    /// Tokenize, filtering out comments
    pub fn tokenize_filtered(self) -> (Vec<Token>, Vec<LexerError>) {
        let (tokens, errors) = self.tokenize();
        let filtered: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !t.kind.is_comment())
            .collect();
        (filtered, errors)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = std::result::Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|result| {
            let span = self.inner.span();
            let bad_char = self.source[span.clone()].chars().next().unwrap_or('?');
            result
                .map(|kind| Token::new(kind, Span::from(span.clone())))
                .map_err(|_| LexerError::UnexpectedCharacter(span.start, bad_char))
        })
    }
}
