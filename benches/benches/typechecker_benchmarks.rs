//! Type Checker Performance Benchmarks
//!
//! This module benchmarks the JScriptor type checker:
//! - Type inference throughput
//! - Unification over long variable chains
//! - Resolution with path compression

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jscriptor_types::{TypeChecker, TypeStore};

// Include all benchmark fixtures as compile-time strings for reproducibility
const SMALL_PROGRAM: &str = include_str!("../fixtures/small.js");
const MEDIUM_PROGRAM: &str = include_str!("../fixtures/medium.js");

// ============================================================================
// Type Checker Benchmarks
// ============================================================================

fn bench_typechecker_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("typechecker_throughput");

    let programs = [("small", SMALL_PROGRAM), ("medium", MEDIUM_PROGRAM)];

    for (name, source) in programs.iter() {
        // Pre-parse the AST (we want to measure type checking, not parsing)
        let (program, errors) = jscriptor_parser::parse(source);
        if !errors.is_empty() {
            continue;
        }

        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("check_program", name),
            &program,
            |b, program| {
                b.iter(|| {
                    let mut checker = TypeChecker::new();
                    black_box(checker.check_program(black_box(program)))
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Type Inference Stress Tests
// ============================================================================

/// Each binding refers to the previous one, building long symlink chains
fn generate_binding_chain(count: usize) -> String {
    let mut source = String::from("const v0 = 1;\n");
    for i in 1..count {
        source.push_str(&format!("const v{i} = v{} + 1;\n", i - 1));
    }
    source
}

/// Many annotated functions with annotated parameters
fn generate_many_type_annotations(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!(
            "const f{i} = (x: number, y: string, z: {{ a: boolean }}): number | string => {{\n  return x;\n}};\n"
        ));
    }
    source
}

/// Wide array literals of one element type
fn generate_wide_array(len: usize) -> String {
    let elements = (0..len).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    format!("const xs: number[] = [{elements}];\n")
}

fn bench_typechecker_stress(c: &mut Criterion) {
    let mut group = c.benchmark_group("typechecker_stress");

    let cases = [
        ("binding_chain_500", generate_binding_chain(500)),
        ("annotations_200", generate_many_type_annotations(200)),
        ("wide_array_2000", generate_wide_array(2000)),
    ];

    for (name, source) in cases.iter() {
        let (program, _) = jscriptor_parser::parse(source);
        group.bench_with_input(BenchmarkId::from_parameter(name), &program, |b, program| {
            b.iter(|| black_box(jscriptor_types::check_program(black_box(program))))
        });
    }

    group.finish();
}

// ============================================================================
// Unification Benchmarks
// ============================================================================

fn bench_unification(c: &mut Criterion) {
    let mut group = c.benchmark_group("unification");

    for len in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("chain_then_bind", len), &len, |b, &len| {
            b.iter(|| {
                let mut store = TypeStore::new();
                let vars: Vec<_> = (0..len).map(|_| store.fresh()).collect();
                for pair in vars.windows(2) {
                    let _ = store.unify(pair[0], pair[1]);
                }
                let number = store.concrete("Number");
                let _ = store.unify(vars[0], number);
                black_box(store.concrete_name(vars[len - 1]))
            })
        });

        group.bench_with_input(BenchmarkId::new("find_uncompressed", len), &len, |b, &len| {
            let mut store = TypeStore::new();
            let vars: Vec<_> = (0..len).map(|_| store.fresh()).collect();
            for pair in vars.windows(2) {
                let _ = store.unify(pair[0], pair[1]);
            }
            b.iter(|| black_box(store.find(black_box(vars[0]))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_typechecker_throughput,
    bench_typechecker_stress,
    bench_unification,
);

criterion_main!(benches);
