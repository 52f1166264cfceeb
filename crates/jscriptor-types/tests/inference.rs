//! Tests for type inference over parsed programs
//!
//! This module tests:
//! 1. Declarations with and without annotations
//! 2. Operator, ternary and array literal checks
//! 3. Object, union, array and function annotations
//! 4. The unary call approximation
//! 5. Scoping and run-to-run determinism

use jscriptor_ast::{ExprKind, Program, StmtKind};
use jscriptor_types::{check_program, CheckResult, CheckerOptions, TypeChecker};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Program {
    let (program, errors) = jscriptor_parser::parse(source);
    assert!(errors.is_empty(), "parse errors in {:?}: {:?}", source, errors);
    program
}

fn check(source: &str) -> (Program, CheckResult) {
    let program = parse(source);
    let result = check_program(&program);
    (program, result)
}

fn codes(result: &CheckResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.code()).collect()
}

/// Resolved type of the top-level binding `name`
fn binding(program: &Program, result: &CheckResult, name: &str) -> String {
    program
        .statements
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::Const(decl) if decl.name.name == name => result.type_name(decl.name.id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no binding named {}", name))
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_const_with_satisfied_annotation() {
    let (program, result) = check("const x: number = 3;");
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    assert_eq!(binding(&program, &result, "x"), "Number");
}

#[test]
fn test_const_with_conflicting_annotation() {
    let (_, result) = check("const x: string = 5;");
    assert_eq!(codes(&result), vec!["E_TYPECHECK"]);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.message(), "Type mismatch: cannot unify Number with String");
    assert_eq!(diag.node_kind, "ConstDeclaration");
    assert_eq!(diag.position(), Some(0));
}

#[test]
fn test_user_type_names_are_nominal() {
    let (_, result) = check("const u: user = 5;");
    assert_eq!(
        result.diagnostics[0].message(),
        "Type mismatch: cannot unify Number with User"
    );
}

#[test]
fn test_bindings_flow_between_declarations() {
    let (program, result) = check("const a = \"s\"; const b = a; const c = b + \"t\";");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "b"), "String");
    assert_eq!(binding(&program, &result, "c"), "String");
}

#[test]
fn test_free_identifier_gets_fresh_variable() {
    let (program, result) = check("const y = z;");
    assert!(result.is_ok());
    assert!(binding(&program, &result, "y").starts_with("'t"));
}

#[test]
fn test_free_identifier_is_constrained_by_use() {
    let (program, result) = check("const y = z + 1;");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "y"), "Number");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_additive_mismatch() {
    let (_, result) = check("const x = 5 + \"hello\";");
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code(), "E_BIN_ADD_MISMATCH");
    assert!(diag.message().contains("Number"));
    assert!(diag.message().contains("String"));
    assert_eq!(diag.node_kind, "BinaryExpression");
    assert_eq!(diag.position(), Some(10));
}

#[test]
fn test_additive_mismatch_yields_number_placeholder() {
    let (program, result) = check("const x = \"a\" + 1;");
    assert_eq!(binding(&program, &result, "x"), "Number");
}

#[test]
fn test_multiplication_coerces_unknowns_to_number() {
    let (program, result) = check("const f = (a) => { return a * 2; };");
    assert!(result.is_ok());

    let arrow = match &program.statements[0].kind {
        StmtKind::Const(decl) => &decl.value,
        _ => unreachable!(),
    };
    let ExprKind::ArrowFunction(function) = &arrow.kind else {
        panic!("expected arrow function");
    };
    assert_eq!(result.type_name(function.params[0].id).as_deref(), Some("Number"));
    let ret = result.return_type_of(arrow.id).unwrap();
    assert_eq!(result.resolved_name(ret), "Number");
}

#[test]
fn test_multiplication_reports_non_number_operand() {
    let (_, result) = check("const x = 2 * \"b\";");
    assert_eq!(codes(&result), vec!["E_BIN_MUL_OPERAND"]);
    assert_eq!(
        result.diagnostics[0].message(),
        "Type mismatch: expected Number for right operand of '*' operator, got String"
    );
    assert_eq!(result.diagnostics[0].node_kind, "StringLiteral");
}

#[test]
fn test_operators_are_left_associative() {
    // (1 + 2) * "c": the sum is a Number, so only the right operand is wrong
    let (_, result) = check("const x = 1 + 2 * \"c\";");
    assert_eq!(codes(&result), vec!["E_BIN_MUL_OPERAND"]);
}

// ============================================================================
// Ternaries
// ============================================================================

#[test]
fn test_ternary_with_non_boolean_condition() {
    let (_, result) = check("const x = 5 ? \"a\" : \"b\";");
    assert_eq!(codes(&result), vec!["E_TERNARY_TEST_NOT_BOOL"]);
    assert_eq!(
        result.diagnostics[0].message(),
        "Type mismatch in ternary: condition must be Boolean, got Number"
    );
    assert_eq!(result.diagnostics[0].node_kind, "NumericLiteral");
}

#[test]
fn test_ternary_takes_consequent_type() {
    let (program, result) = check("const x = true ? \"a\" : b;");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "x"), "String");
}

// ============================================================================
// Array literals
// ============================================================================

#[test]
fn test_homogeneous_array_has_no_errors() {
    let (program, result) = check("const xs = [1, 2, 3];");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "xs"), "Array");
}

#[test]
fn test_mixed_array_is_reported() {
    let (_, result) = check("const xs = [1, \"a\"];");
    assert_eq!(codes(&result), vec!["E_ARRAY_ELEMENT_MISMATCH"]);
    assert!(result.diagnostics[0]
        .message()
        .contains("array elements must have consistent types"));
}

#[test]
fn test_array_scan_continues_after_mismatch() {
    let (_, result) = check("const xs = [1, \"a\", true, 4];");
    assert_eq!(
        codes(&result),
        vec!["E_ARRAY_ELEMENT_MISMATCH", "E_ARRAY_ELEMENT_MISMATCH"]
    );
    assert_eq!(
        result.diagnostics[1].message(),
        "Type mismatch in array literal: array elements must have consistent types, found Number and Boolean"
    );
}

#[test]
fn test_empty_array() {
    let (program, result) = check("const xs = [];");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "xs"), "Array");
}

// ============================================================================
// Annotations on declarations
// ============================================================================

#[test]
fn test_object_annotation_missing_field() {
    let (_, result) = check("const p: {a: number, b: string} = {a: 1};");
    assert_eq!(codes(&result), vec!["E_OBJECT_FIELD_MISSING"]);
    assert!(result.diagnostics[0].message().contains("'b'"));
}

#[test]
fn test_object_annotation_field_type_mismatch() {
    let (_, result) = check("const p: {a: number} = {a: \"s\"};");
    assert_eq!(codes(&result), vec!["E_TYPECHECK"]);
    assert_eq!(result.diagnostics[0].position(), Some(27));
    assert_eq!(result.diagnostics[0].node_kind, "StringLiteral");
}

#[test]
fn test_object_literal_type_is_structural() {
    let (program, result) = check("const p = {a: 1, b: \"s\", c: {d: true}};");
    assert!(result.is_ok());
    assert_eq!(
        binding(&program, &result, "p"),
        "{a: Number, b: String, c: {d: Boolean}}"
    );
}

#[test]
fn test_union_accepts_matching_member() {
    let (program, result) = check("const v: number | string = \"x\";");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "v"), "String");
}

#[test]
fn test_union_without_matching_member() {
    let (_, result) = check("const v: number | boolean = \"x\";");
    assert_eq!(codes(&result), vec!["E_UNION_NO_MATCH"]);
    assert_eq!(
        result.diagnostics[0].message(),
        "Type mismatch: value does not match any type in the union"
    );
}

#[test]
fn test_union_binds_unknown_value_to_first_member() {
    let (program, result) = check("const v: string | number = y;");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "v"), "String");
}

#[test]
fn test_array_annotation_checks_each_element() {
    let (_, result) = check("const xs: Array<number> = [1, \"a\"];");
    assert_eq!(codes(&result), vec!["E_ARRAY_ELEMENT_MISMATCH", "E_TYPECHECK"]);
    assert_eq!(
        result.diagnostics[1].message(),
        "Type mismatch: cannot unify String with Number"
    );
}

#[test]
fn test_array_annotation_accepts_matching_elements() {
    let (_, result) = check("const xs: number[] = [1, 2];");
    assert!(result.is_ok());
}

#[test]
fn test_function_annotation_matches_arrow() {
    let (_, result) = check("const f: (x: number) => number = (x) => { return x; };");
    assert!(result.is_ok(), "{:?}", result.diagnostics);
}

#[test]
fn test_function_annotation_parameter_mismatch() {
    let source = "const f: (x: string) => number = (x: number) => { return x; };";
    let (_, result) = check(source);
    assert_eq!(codes(&result), vec!["E_TYPECHECK"]);
    assert_eq!(
        result.diagnostics[0].message(),
        "Type mismatch: cannot unify Number with String"
    );

    let options = CheckerOptions {
        check_parameter_types: false,
        ..CheckerOptions::default()
    };
    let result = TypeChecker::with_options(options).check_program(&parse(source));
    assert!(result.is_ok());
}

#[test]
fn test_function_annotation_ignores_extra_parameters() {
    let (_, result) = check("const f: (x: number) => number = (x, y) => { return x; };");
    assert!(result.is_ok());
}

#[test]
fn test_arrow_return_annotation_mismatch() {
    let source = "const f = (x: number): string => { return x; };";
    let (_, result) = check(source);
    assert_eq!(codes(&result), vec!["E_TYPECHECK"]);
    assert_eq!(result.diagnostics[0].node_kind, "ArrowFunctionExpression");
    assert_eq!(result.diagnostics[0].position(), Some(10));

    let options = CheckerOptions {
        check_return_types: false,
        ..CheckerOptions::default()
    };
    let result = TypeChecker::with_options(options).check_program(&parse(source));
    assert!(result.is_ok());
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_unary_call_threads_argument_to_result() {
    let (program, result) = check("const id = (x) => { return x; }; const r = id(5);");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "r"), "Number");
}

#[test]
fn test_unary_call_is_instantiated_per_call() {
    let (program, result) =
        check("const id = (x) => { return x; }; const a = id(5); const b = id(\"s\");");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "a"), "Number");
    assert_eq!(binding(&program, &result, "b"), "String");
}

#[test]
fn test_calls_outside_the_unary_case_stay_unknown() {
    let (program, result) = check(
        "const g = () => { return 1; }; \
         const h = (a, b) => { return a; }; \
         const r0 = g(); \
         const r2 = h(1, 2); \
         const rk = k(1);",
    );
    assert!(result.is_ok());
    for name in ["r0", "r2", "rk"] {
        assert!(
            binding(&program, &result, name).starts_with("'t"),
            "{} should be unbound",
            name
        );
    }
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_parameters_do_not_escape_their_function() {
    let (program, result) = check("const f = (x: number) => { return x; }; const y = x;");
    assert!(result.is_ok());
    assert!(binding(&program, &result, "y").starts_with("'t"));
}

#[test]
fn test_inner_const_shadows_outer() {
    let (program, result) =
        check("const x = 1; const f = () => { const x = \"s\"; return x; };");
    assert!(result.is_ok());
    assert_eq!(binding(&program, &result, "x"), "Number");

    let arrow_id = match &program.statements[1].kind {
        StmtKind::Const(decl) => decl.value.id,
        _ => unreachable!(),
    };
    let ret = result.return_type_of(arrow_id).unwrap();
    assert_eq!(result.resolved_name(ret), "String");
}

#[test]
fn test_errors_do_not_stop_later_statements() {
    let (_, result) = check("const a = 1 + \"x\"; const b: string = 2; const c = [true, 1];");
    assert_eq!(
        codes(&result),
        vec!["E_BIN_ADD_MISMATCH", "E_TYPECHECK", "E_ARRAY_ELEMENT_MISMATCH"]
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_runs_are_identical() {
    let source = "const id = (x) => { return x; }; const r = id(5) + \"a\"; const t = r ? 1 : 2;";
    let mut checker = TypeChecker::new();

    let first = checker.check_program(&parse(source));
    let second = checker.check_program(&parse(source));

    assert!(!first.diagnostics.is_empty());
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.store.len(), second.store.len());
}
