//! JScriptor Abstract Syntax Tree
//!
//! Defines the AST node types produced by the parser and consumed by the
//! type checker and formatter. Every node that can carry an inferred type has
//! a [`NodeId`]; analyses keep their results in side tables keyed by it, so
//! the tree itself is never mutated after parsing.

// Re-export common types for use by other crates
pub use jscriptor_lexer::Span;
pub use smol_str::SmolStr;

use std::fmt;

/// Identity of a node within one parsed program.
///
/// Ids are dense and assigned by the parser in creation order, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh node ids. The parser owns one; tests that build trees by
/// hand can use one too.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u32 {
        self.next
    }
}

// ============================================================================
// Program Structure
// ============================================================================

/// A complete parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A declared name: the target of a `const`
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub id: NodeId,
    pub name: SmolStr,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(id: NodeId, kind: StmtKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Node kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Const(_) => "ConstDeclaration",
            StmtKind::Return(_) => "ReturnStatement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `const name: Type = value`
    Const(ConstDecl),
    /// `return value?`
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: Ident,
    pub ty: Option<TypeAnnotation>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub argument: Option<Expr>,
}

/// A braced statement list; only appears as an arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        "BlockStatement"
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Node kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Literals
    /// String literal, quotes stripped
    String(SmolStr),
    Number(f64),
    Boolean(bool),

    Identifier(SmolStr),

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    ArrowFunction(ArrowFunction),

    Array(Vec<Expr>),

    Object(Vec<Property>),

    /// Placeholder for a node shape the checker does not know how to type
    Error,
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::String(_) => "StringLiteral",
            ExprKind::Number(_) => "NumericLiteral",
            ExprKind::Boolean(_) => "BooleanLiteral",
            ExprKind::Identifier(_) => "Identifier",
            ExprKind::Binary { .. } => "BinaryExpression",
            ExprKind::Conditional { .. } => "ConditionalExpression",
            ExprKind::Call { .. } => "CallExpression",
            ExprKind::ArrowFunction(_) => "ArrowFunctionExpression",
            ExprKind::Array(_) => "ArrayLiteral",
            ExprKind::Object(_) => "ObjectLiteral",
            ExprKind::Error => "ErrorExpression",
        }
    }
}

/// `(params): ReturnType => { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: SmolStr,
    pub ty: Option<TypeAnnotation>,
    pub span: Span,
}

/// `key: value` inside an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: NodeId,
    pub key: SmolStr,
    pub value: Expr,
    pub span: Span,
}

// ============================================================================
// Operators
// ============================================================================

/// Binary operators. The parser produces `Add` and `Mul`; the remaining
/// variants exist for trees built by other producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Mul,
    Sub,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Mul => "*",
            BinaryOp::Sub => "-",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Type Annotations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// Keyword or named type: `number`, `Void`, `User`
    Named { name: SmolStr, span: Span },

    /// `Array<T>` or `T[]`
    Array {
        element: Box<TypeAnnotation>,
        span: Span,
    },

    /// `(x: number, y: string) => boolean`
    Function {
        params: Vec<TypeField>,
        return_type: Box<TypeAnnotation>,
        span: Span,
    },

    /// `{ a: number, b: string }`
    Object { fields: Vec<TypeField>, span: Span },

    /// `A | B | C`, always flat
    Union {
        types: Vec<TypeAnnotation>,
        span: Span,
    },
}

impl TypeAnnotation {
    pub fn span(&self) -> Span {
        match self {
            TypeAnnotation::Named { span, .. } => *span,
            TypeAnnotation::Array { span, .. } => *span,
            TypeAnnotation::Function { span, .. } => *span,
            TypeAnnotation::Object { span, .. } => *span,
            TypeAnnotation::Union { span, .. } => *span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeAnnotation::Named { .. } => "TypeAnnotation",
            TypeAnnotation::Array { .. } => "ArrayTypeAnnotation",
            TypeAnnotation::Function { .. } => "FunctionTypeAnnotation",
            TypeAnnotation::Object { .. } => "ObjectTypeAnnotation",
            TypeAnnotation::Union { .. } => "UnionTypeAnnotation",
        }
    }

    /// Join two annotations with `|`, flattening unions on either side
    pub fn union(left: TypeAnnotation, right: TypeAnnotation) -> TypeAnnotation {
        let span = left.span().merge(right.span());
        let mut types = match left {
            TypeAnnotation::Union { types, .. } => types,
            other => vec![other],
        };
        match right {
            TypeAnnotation::Union { types: more, .. } => types.extend(more),
            other => types.push(other),
        }
        TypeAnnotation::Union { types, span }
    }
}

/// A named, typed entry: an object type field or a function type parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TypeField {
    pub name: SmolStr,
    pub ty: TypeAnnotation,
    pub span: Span,
}
