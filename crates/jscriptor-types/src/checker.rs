//! The inference driver: walks a program, allocates type variables, unifies
//! them and records diagnostics.

use crate::annotation::type_from_annotation;
use crate::error::{NodeRef, Operand, TypeDiagnostic, TypeError};
use crate::scope::ScopeStack;
use crate::store::{FieldMap, TypeId, TypeStore};
use jscriptor_ast::{
    ArrowFunction, BinaryOp, Block, ConstDecl, Expr, ExprKind, NodeId, Program, Stmt, StmtKind,
    TypeAnnotation,
};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

const UNKNOWN: &str = "unknown";

/// Switches for the optional annotation checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerOptions {
    /// Unify arrow bodies with their return annotations
    pub check_return_types: bool,
    /// Unify arrow parameters with the parameter types of a function annotation
    pub check_parameter_types: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            check_return_types: true,
            check_parameter_types: true,
        }
    }
}

/// Everything a single checking run owns.
#[derive(Debug, Default)]
pub struct CheckerState {
    pub store: TypeStore,
    pub scopes: ScopeStack,
    pub diagnostics: Vec<TypeDiagnostic>,
    /// Inferred type of each expression, binding and parameter
    pub node_types: FxHashMap<NodeId, TypeId>,
    /// Inferred body type of each arrow function, keyed by the arrow's id
    pub return_types: FxHashMap<NodeId, TypeId>,
}

impl CheckerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.store.clear();
        self.scopes.reset();
        self.diagnostics.clear();
        self.node_types.clear();
        self.return_types.clear();
    }
}

/// Output of [`TypeChecker::check_program`]
#[derive(Debug)]
pub struct CheckResult {
    pub diagnostics: Vec<TypeDiagnostic>,
    pub node_types: FxHashMap<NodeId, TypeId>,
    pub return_types: FxHashMap<NodeId, TypeId>,
    pub store: TypeStore,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    pub fn return_type_of(&self, arrow: NodeId) -> Option<TypeId> {
        self.return_types.get(&arrow).copied()
    }

    /// Human-readable form of a type id
    pub fn resolved_name(&self, ty: TypeId) -> String {
        self.store.display(ty)
    }

    /// Human-readable type of a node, if the checker visited it
    pub fn type_name(&self, node: NodeId) -> Option<String> {
        self.type_of(node).map(|ty| self.resolved_name(ty))
    }
}

/// Nodes the checker can visit
pub trait Visit {
    fn accept(&self, checker: &mut TypeChecker) -> TypeId;
}

impl Visit for Stmt {
    fn accept(&self, checker: &mut TypeChecker) -> TypeId {
        checker.visit_stmt(self)
    }
}

impl Visit for Expr {
    fn accept(&self, checker: &mut TypeChecker) -> TypeId {
        checker.visit_expr(self)
    }
}

impl Visit for Block {
    fn accept(&self, checker: &mut TypeChecker) -> TypeId {
        checker.visit_block(self)
    }
}

/// Hindley-Milner style checker over a parsed [`Program`].
///
/// ```rust
/// use jscriptor_types::TypeChecker;
///
/// let (program, errors) = jscriptor_parser::parse("const x = 5 + \"a\";");
/// assert!(errors.is_empty());
///
/// let result = TypeChecker::new().check_program(&program);
/// assert_eq!(result.diagnostics[0].code(), "E_BIN_ADD_MISMATCH");
/// ```
#[derive(Debug, Default)]
pub struct TypeChecker {
    options: CheckerOptions,
    state: CheckerState,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CheckerOptions) -> Self {
        Self {
            options,
            state: CheckerState::new(),
        }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// State of the current run
    pub fn state(&self) -> &CheckerState {
        &self.state
    }

    /// Check a whole program from a clean state.
    pub fn check_program(&mut self, program: &Program) -> CheckResult {
        self.state.reset();
        debug!(statements = program.statements.len(), "type checking program");

        for stmt in &program.statements {
            self.visit(stmt);
        }

        let state = std::mem::take(&mut self.state);
        debug!(
            errors = state.diagnostics.len(),
            types = state.store.len(),
            "type checking finished"
        );
        CheckResult {
            diagnostics: state.diagnostics,
            node_types: state.node_types,
            return_types: state.return_types,
            store: state.store,
        }
    }

    /// Infer the type of any node
    pub fn visit<N: Visit + ?Sized>(&mut self, node: &N) -> TypeId {
        node.accept(self)
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    fn report(&mut self, error: TypeError, at: impl Into<NodeRef>) {
        let at = at.into();
        trace!(code = error.code(), node = %at.id, "type error");
        self.state.diagnostics.push(TypeDiagnostic::new(error, at));
    }

    /// Unify and report a generic mismatch on failure
    fn unify(&mut self, a: TypeId, b: TypeId, at: impl Into<NodeRef>) -> bool {
        match self.state.store.unify(a, b) {
            Ok(()) => true,
            Err(err) => {
                self.report(
                    TypeError::Unify {
                        left: err.left,
                        right: err.right,
                    },
                    at,
                );
                false
            }
        }
    }

    fn concrete_name(&mut self, ty: TypeId) -> Option<SmolStr> {
        self.state.store.concrete_name(ty)
    }

    fn translate(&mut self, annotation: &TypeAnnotation) -> TypeId {
        type_from_annotation(&mut self.state.store, Some(annotation))
    }

    /// Type recorded for a node that has already been visited
    fn recorded(&mut self, node: NodeId) -> TypeId {
        match self.state.node_types.get(&node) {
            Some(ty) => *ty,
            None => self.state.store.fresh(),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn visit_stmt(&mut self, stmt: &Stmt) -> TypeId {
        match &stmt.kind {
            StmtKind::Const(decl) => self.visit_const(stmt, decl),
            StmtKind::Return(ret) => match &ret.argument {
                Some(argument) => self.visit(argument),
                None => self.state.store.concrete("Void"),
            },
        }
    }

    fn visit_block(&mut self, block: &Block) -> TypeId {
        let mut last = self.state.store.concrete("Void");

        self.state.scopes.push();
        for stmt in &block.statements {
            last = self.visit(stmt);
        }
        self.state.scopes.pop();

        self.state.node_types.insert(block.id, last);
        last
    }

    fn visit_const(&mut self, stmt: &Stmt, decl: &ConstDecl) -> TypeId {
        let init = self.visit(&decl.value);

        self.state.node_types.insert(decl.name.id, init);
        self.state.scopes.define(decl.name.name.clone(), init);
        trace!(name = %decl.name.name, ty = %init, "bound const");

        let Some(annotation) = &decl.ty else {
            return init;
        };

        match (annotation, &decl.value.kind) {
            (
                TypeAnnotation::Function {
                    params,
                    return_type,
                    ..
                },
                ExprKind::ArrowFunction(arrow),
            ) => {
                if self.options.check_return_types {
                    let annotated = self.translate(return_type);
                    if let Some(inferred) = self.state.return_types.get(&decl.value.id).copied() {
                        self.unify(inferred, annotated, stmt);
                    }
                }

                if self.options.check_parameter_types {
                    for (annotated, actual) in params.iter().zip(&arrow.params) {
                        let annotated = self.translate(&annotated.ty);
                        let actual = self.recorded(actual.id);
                        self.unify(actual, annotated, stmt);
                    }
                }

                let function = self.state.store.concrete("Function");
                self.unify(init, function, stmt);
            }

            (TypeAnnotation::Object { fields, .. }, ExprKind::Object(properties)) => {
                let annotated = self.translate(annotation);

                for field in fields {
                    // A repeated key keeps its last value
                    let Some(prop) = properties.iter().rev().find(|p| p.key == field.name) else {
                        self.report(
                            TypeError::MissingField {
                                field: field.name.clone(),
                            },
                            stmt,
                        );
                        continue;
                    };
                    let prop_type = self.recorded(prop.value.id);
                    let field_type = self.translate(&field.ty);
                    self.unify(prop_type, field_type, &prop.value);
                }

                self.unify(init, annotated, stmt);
            }

            (TypeAnnotation::Union { types, .. }, _) => {
                let init_name = self.concrete_name(init);
                let mut chosen = None;
                for option in types {
                    let option_type = self.translate(option);
                    let option_name = self.concrete_name(option_type);
                    if let (Some(init_name), Some(option_name)) = (&init_name, &option_name) {
                        if init_name != option_name {
                            continue;
                        }
                    }
                    chosen = Some(option_type);
                    break;
                }

                match chosen {
                    Some(option_type) => {
                        self.unify(init, option_type, stmt);
                    }
                    None => self.report(TypeError::UnionNoMatch, stmt),
                }
            }

            (TypeAnnotation::Array { element, .. }, ExprKind::Array(elements)) => {
                let element_type = self.translate(element);
                for el in elements {
                    let el_type = self.recorded(el.id);
                    self.unify(el_type, element_type, el);
                }
                let annotated = self.translate(annotation);
                self.unify(init, annotated, stmt);
            }

            _ => {
                let annotated = self.translate(annotation);
                self.unify(init, annotated, stmt);
            }
        }

        init
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn visit_expr(&mut self, expr: &Expr) -> TypeId {
        let ty = match &expr.kind {
            ExprKind::String(_) => self.state.store.concrete("String"),
            ExprKind::Number(_) => self.state.store.concrete("Number"),
            ExprKind::Boolean(_) => self.state.store.concrete("Boolean"),
            ExprKind::Identifier(name) => self.visit_identifier(expr.id, name),
            ExprKind::Binary { op, left, right } => self.visit_binary(expr, *op, left, right),
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => self.visit_conditional(expr, test, consequent, alternate),
            ExprKind::Call { callee, args } => self.visit_call(expr, callee, args),
            ExprKind::ArrowFunction(arrow) => self.visit_arrow(expr, arrow),
            ExprKind::Array(elements) => self.visit_array(elements),
            ExprKind::Object(properties) => {
                let mut fields = FieldMap::with_capacity(properties.len());
                for prop in properties {
                    let ty = self.visit(&prop.value);
                    fields.insert(prop.key.clone(), ty);
                }
                self.state.store.object(fields)
            }
            ExprKind::Error => {
                self.report(
                    TypeError::UnknownNode {
                        kind: expr.kind_name(),
                    },
                    expr,
                );
                self.state.store.fresh()
            }
        };

        self.state.node_types.insert(expr.id, ty);
        ty
    }

    /// Free identifiers get one fresh variable per node, reused on revisits.
    fn visit_identifier(&mut self, id: NodeId, name: &str) -> TypeId {
        if let Some(found) = self.state.scopes.lookup(name) {
            return found;
        }
        match self.state.node_types.get(&id) {
            Some(cached) => *cached,
            None => self.state.store.fresh(),
        }
    }

    fn visit_binary(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr) -> TypeId {
        let left_type = self.visit(left);
        let right_type = self.visit(right);
        let left_name = self.concrete_name(left_type);
        let right_name = self.concrete_name(right_type);

        match op {
            BinaryOp::Add => {
                if let (Some(l), Some(r)) = (&left_name, &right_name) {
                    if l != r {
                        self.report(
                            TypeError::AddMismatch {
                                left: l.clone(),
                                right: r.clone(),
                            },
                            expr,
                        );
                        return self.state.store.concrete("Number");
                    }
                }

                if !self.unify(left_type, right_type, expr) {
                    self.report(
                        TypeError::AddMismatch {
                            left: left_name.unwrap_or_else(|| UNKNOWN.into()),
                            right: right_name.unwrap_or_else(|| UNKNOWN.into()),
                        },
                        expr,
                    );
                    return self.state.store.concrete("Number");
                }

                left_type
            }

            BinaryOp::Mul => {
                let number = self.state.store.concrete("Number");

                for (side, operand, name) in [
                    (Operand::Left, left, &left_name),
                    (Operand::Right, right, &right_name),
                ] {
                    if let Some(found) = name {
                        if found.as_str() != "Number" {
                            self.report(
                                TypeError::MulOperand {
                                    side,
                                    found: found.clone(),
                                },
                                operand,
                            );
                        }
                    }
                }
                if left_name.is_none() {
                    self.unify(left_type, number, left);
                }
                if right_name.is_none() {
                    self.unify(right_type, number, right);
                }

                number
            }

            BinaryOp::Sub | BinaryOp::Div => {
                match (&left_name, &right_name) {
                    (Some(l), Some(r)) if l != r => self.report(
                        TypeError::OperandMismatch {
                            left: l.clone(),
                            right: r.clone(),
                        },
                        expr,
                    ),
                    _ => {
                        if !self.unify(left_type, right_type, expr) {
                            self.report(TypeError::OperandUnifyFailed, expr);
                        }
                    }
                }
                left_type
            }
        }
    }

    fn visit_conditional(
        &mut self,
        expr: &Expr,
        test: &Expr,
        consequent: &Expr,
        alternate: &Expr,
    ) -> TypeId {
        let test_type = self.visit(test);
        let consequent_type = self.visit(consequent);
        let alternate_type = self.visit(alternate);

        let boolean = self.state.store.concrete("Boolean");
        match self.concrete_name(test_type) {
            Some(found) if found.as_str() != "Boolean" => {
                self.report(TypeError::TernaryTestNotBool { found }, test);
            }
            _ => {
                self.unify(test_type, boolean, test);
            }
        }

        let consequent_name = self.concrete_name(consequent_type);
        let alternate_name = self.concrete_name(alternate_type);
        match (consequent_name, alternate_name) {
            (Some(consequent), Some(alternate)) if consequent != alternate => {
                self.report(
                    TypeError::TernaryBranchMismatch {
                        consequent,
                        alternate,
                    },
                    expr,
                );
            }
            _ => {
                self.unify(consequent_type, alternate_type, expr);
            }
        }

        consequent_type
    }

    /// Only a unary call to a bound name links its argument to its result.
    fn visit_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> TypeId {
        self.visit(callee);
        let ret = self.state.store.fresh();

        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.visit(arg)).collect();

        let callee_bound = match &callee.kind {
            ExprKind::Identifier(name) => self.state.scopes.lookup(name).is_some(),
            _ => false,
        };
        if callee_bound && arg_types.len() == 1 {
            self.unify(ret, arg_types[0], expr);
        }

        ret
    }

    fn visit_arrow(&mut self, expr: &Expr, arrow: &ArrowFunction) -> TypeId {
        self.state.scopes.push();

        for param in &arrow.params {
            let ty = match &param.ty {
                Some(annotation) => self.translate(annotation),
                None => self.state.store.fresh(),
            };
            self.state.node_types.insert(param.id, ty);
            self.state.scopes.define(param.name.clone(), ty);
        }

        let body = self.visit(&arrow.body);
        self.state.return_types.insert(expr.id, body);

        if let Some(annotation) = &arrow.return_type {
            if self.options.check_return_types {
                let annotated = self.translate(annotation);
                self.unify(body, annotated, expr);
            }
        }

        self.state.scopes.pop();
        self.state.store.concrete("Function")
    }

    fn visit_array(&mut self, elements: &[Expr]) -> TypeId {
        let Some((first, rest)) = elements.split_first() else {
            return self.state.store.concrete("Array");
        };

        let first_type = self.visit(first);
        let first_name = self.concrete_name(first_type);

        for el in rest {
            let el_type = self.visit(el);
            let el_name = self.concrete_name(el_type);

            if let (Some(first), Some(found)) = (&first_name, el_name) {
                if *first != found {
                    self.report(
                        TypeError::ArrayElementMismatch {
                            first: first.clone(),
                            found,
                        },
                        el,
                    );
                    continue;
                }
            }

            if !self.unify(first_type, el_type, el) {
                self.report(TypeError::ArrayElementUnifyFailed, el);
            }
        }

        self.state.store.concrete("Array")
    }
}

/// Check `program` with default options
pub fn check_program(program: &Program) -> CheckResult {
    TypeChecker::new().check_program(program)
}
