//! JScriptor Type System
//!
//! Type inference and checking for JScriptor programs, in the style of
//! Hindley-Milner inference with unification over a union-find store.
//!
//! ## Design
//!
//! - **Type store**: an append-only table of cells (`Unbound`, `Symlink`,
//!   `Concrete`, `Object`) with path-compressing resolution
//! - **Scopes**: a stack of name to type-id maps, pushed around function
//!   bodies and blocks
//! - **Unification**: links unbound variables toward bound ones and fails
//!   only when two different concrete names meet
//! - **Inference driver**: one visit per node kind; operator, ternary and
//!   array checks compare concrete names first so they can report a precise
//!   message, and fall back to unification otherwise
//!
//! Inferred types are kept in side tables keyed by [`NodeId`](jscriptor_ast::NodeId);
//! the AST is never mutated.
//!
//! ## Leniency
//!
//! Identifiers that are not bound anywhere get a fresh type variable instead
//! of an error, so partial programs can still be checked. A call links its
//! result to its argument only when it has exactly one argument and the
//! callee is a bound name.

pub mod annotation;
pub mod checker;
pub mod error;
mod error_diagnostic;
pub mod scope;
pub mod store;

pub use annotation::{canonical_name, type_from_annotation};
pub use checker::{check_program, CheckResult, CheckerOptions, CheckerState, TypeChecker, Visit};
pub use error::{NodeRef, Operand, TypeDiagnostic, TypeError};
pub use scope::ScopeStack;
pub use store::{FieldMap, TypeCell, TypeId, TypeStore, UnifyError};
