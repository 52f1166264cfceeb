//! Front-End Performance Benchmarks
//!
//! This module benchmarks the JScriptor front end:
//! - Lexer throughput (bytes/second)
//! - Parser throughput
//! - Formatter speed

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jscriptor_formatter::{format_program, FormatOptions};

// Include all benchmark fixtures as compile-time strings for reproducibility
const SMALL_PROGRAM: &str = include_str!("../fixtures/small.js");
const MEDIUM_PROGRAM: &str = include_str!("../fixtures/medium.js");

/// The medium fixture repeated with renamed bindings
fn large_program(copies: usize) -> String {
    (0..copies)
        .map(|i| MEDIUM_PROGRAM.replace("const ", &format!("const c{i}_")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn programs() -> Vec<(&'static str, String)> {
    vec![
        ("small", SMALL_PROGRAM.to_string()),
        ("medium", MEDIUM_PROGRAM.to_string()),
        ("large", large_program(50)),
    ]
}

// ============================================================================
// Lexer Benchmarks
// ============================================================================

fn bench_lexer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_throughput");

    for (name, source) in programs().iter() {
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::new("tokenize", name), source, |b, source| {
            b.iter(|| {
                let lexer = jscriptor_lexer::Lexer::new(black_box(source));
                let (tokens, _errors) = lexer.tokenize();
                black_box(tokens)
            })
        });

        group.bench_with_input(
            BenchmarkId::new("tokenize_filtered", name),
            source,
            |b, source| {
                b.iter(|| {
                    let lexer = jscriptor_lexer::Lexer::new(black_box(source));
                    let (tokens, _errors) = lexer.tokenize_filtered();
                    black_box(tokens)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parser_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_throughput");

    for (name, source) in programs().iter() {
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let (program, errors) = jscriptor_parser::parse(black_box(source));
                black_box((program, errors))
            })
        });
    }

    group.finish();
}

/// Deeply nested ternaries and binary chains
fn bench_parser_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_nesting");

    for depth in [10, 50, 200] {
        let mut expr = String::from("0");
        for i in 0..depth {
            expr = format!("t{i} ? ({expr}) : {i} + x{i} * {i}");
        }
        let source = format!("const deep = {expr};");

        group.bench_with_input(BenchmarkId::from_parameter(depth), &source, |b, source| {
            b.iter(|| black_box(jscriptor_parser::parse(black_box(source))))
        });
    }

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    let options = FormatOptions::default();

    for (name, source) in programs().iter() {
        let (program, _) = jscriptor_parser::parse(source);

        group.bench_with_input(BenchmarkId::from_parameter(name), &program, |b, program| {
            b.iter(|| black_box(format_program(black_box(program), &options)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_throughput,
    bench_parser_throughput,
    bench_parser_nesting,
    bench_formatter,
);

criterion_main!(benches);
