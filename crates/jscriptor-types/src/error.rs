//! Checker error categories and the diagnostics the checker records.

use jscriptor_ast::{Expr, NodeId, Span, Stmt};
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// Which side of a binary operator an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operand::Left => "left",
            Operand::Right => "right",
        })
    }
}

/// Type errors found while checking a program.
///
/// Names are concrete type names, or `unknown` where the type was still an
/// unbound variable when the error was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Type mismatch: cannot unify {left} with {right}")]
    Unify { left: SmolStr, right: SmolStr },

    #[error("Type mismatch in binary operation: cannot add {left} to {right}")]
    AddMismatch { left: SmolStr, right: SmolStr },

    #[error("Type mismatch: expected Number for {side} operand of '*' operator, got {found}")]
    MulOperand { side: Operand, found: SmolStr },

    #[error("Type mismatch in binary operation: operands must have the same type, got {left} and {right}")]
    OperandMismatch { left: SmolStr, right: SmolStr },

    #[error("Type mismatch in binary operation: operands must have the same type")]
    OperandUnifyFailed,

    #[error("Type mismatch in ternary: condition must be Boolean, got {found}")]
    TernaryTestNotBool { found: SmolStr },

    #[error("Type mismatch in ternary: branches must have the same type, got {consequent} and {alternate}")]
    TernaryBranchMismatch {
        consequent: SmolStr,
        alternate: SmolStr,
    },

    #[error("Type mismatch in array literal: array elements must have consistent types, found {first} and {found}")]
    ArrayElementMismatch { first: SmolStr, found: SmolStr },

    #[error("Type mismatch in array literal: array elements must have consistent types")]
    ArrayElementUnifyFailed,

    #[error("Type mismatch: missing field '{field}' in object literal")]
    MissingField { field: SmolStr },

    #[error("Type mismatch: value does not match any type in the union")]
    UnionNoMatch,

    #[error("Unknown node type during type checking: {kind}")]
    UnknownNode { kind: &'static str },
}

impl TypeError {
    /// Stable code string for this category
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::Unify { .. } => "E_TYPECHECK",
            TypeError::AddMismatch { .. } => "E_BIN_ADD_MISMATCH",
            TypeError::MulOperand { .. } => "E_BIN_MUL_OPERAND",
            TypeError::OperandMismatch { .. } | TypeError::OperandUnifyFailed => {
                "E_BIN_OPERAND_MISMATCH"
            }
            TypeError::TernaryTestNotBool { .. } => "E_TERNARY_TEST_NOT_BOOL",
            TypeError::TernaryBranchMismatch { .. } => "E_TERNARY_BRANCH_MISMATCH",
            TypeError::ArrayElementMismatch { .. } | TypeError::ArrayElementUnifyFailed => {
                "E_ARRAY_ELEMENT_MISMATCH"
            }
            TypeError::MissingField { .. } => "E_OBJECT_FIELD_MISSING",
            TypeError::UnionNoMatch => "E_UNION_NO_MATCH",
            TypeError::UnknownNode { .. } => "E_UNKNOWN_NODE",
        }
    }

    /// Short text shown under the offending source
    pub fn label(&self) -> String {
        match self {
            TypeError::Unify { left, right } => format!("expected {}, found {}", right, left),
            TypeError::AddMismatch { left, right } => format!("{} + {}", left, right),
            TypeError::MulOperand { found, .. } => format!("this is {}", found),
            TypeError::OperandMismatch { left, right } => format!("{} and {}", left, right),
            TypeError::TernaryTestNotBool { found } => format!("expected Boolean, found {}", found),
            TypeError::TernaryBranchMismatch {
                consequent,
                alternate,
            } => format!("branches are {} and {}", consequent, alternate),
            TypeError::ArrayElementMismatch { first, found } => {
                format!("expected {}, found {}", first, found)
            }
            TypeError::MissingField { field } => format!("`{}` is not set here", field),
            TypeError::UnionNoMatch => "no union member accepts this value".to_string(),
            TypeError::OperandUnifyFailed
            | TypeError::ArrayElementUnifyFailed
            | TypeError::UnknownNode { .. } => String::new(),
        }
    }
}

/// The node an error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub id: NodeId,
    pub kind: &'static str,
    pub span: Span,
}

impl From<&Expr> for NodeRef {
    fn from(expr: &Expr) -> Self {
        Self {
            id: expr.id,
            kind: expr.kind_name(),
            span: expr.span,
        }
    }
}

impl From<&Stmt> for NodeRef {
    fn from(stmt: &Stmt) -> Self {
        Self {
            id: stmt.id,
            kind: stmt.kind_name(),
            span: stmt.span,
        }
    }
}

/// One recorded type error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiagnostic {
    pub error: TypeError,
    /// Kind name of the erroring node, e.g. `BinaryExpression`
    pub node_kind: &'static str,
    pub node: Option<NodeId>,
    pub span: Option<Span>,
}

impl TypeDiagnostic {
    pub fn new(error: TypeError, at: NodeRef) -> Self {
        Self {
            error,
            node_kind: at.kind,
            node: Some(at.id),
            span: Some(at.span),
        }
    }

    pub fn code(&self) -> &'static str {
        self.error.code()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Source byte offset of the erroring node
    pub fn position(&self) -> Option<usize> {
        self.span.map(|span| span.start)
    }
}

impl fmt::Display for TypeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.error)?;
        if let Some(position) = self.position() {
            write!(f, " at position {}", position)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        let err = TypeError::MulOperand {
            side: Operand::Right,
            found: "String".into(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected Number for right operand of '*' operator, got String"
        );
        assert_eq!(err.code(), "E_BIN_MUL_OPERAND");

        let err = TypeError::MissingField { field: "b".into() };
        assert_eq!(err.to_string(), "Type mismatch: missing field 'b' in object literal");
        assert_eq!(err.code(), "E_OBJECT_FIELD_MISSING");
    }

    #[test]
    fn test_dual_path_messages_share_codes() {
        assert_eq!(
            TypeError::OperandUnifyFailed.code(),
            TypeError::OperandMismatch {
                left: "A".into(),
                right: "B".into()
            }
            .code()
        );
        assert_eq!(
            TypeError::ArrayElementUnifyFailed.to_string(),
            "Type mismatch in array literal: array elements must have consistent types"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = TypeDiagnostic {
            error: TypeError::UnionNoMatch,
            node_kind: "ConstDeclaration",
            node: Some(NodeId(3)),
            span: Some(Span::new(0, 30)),
        };
        insta::assert_snapshot!(diag.to_string(), @"[E_UNION_NO_MATCH] Type mismatch: value does not match any type in the union at position 0");
    }
}
