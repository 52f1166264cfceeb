//! Tests for the type store and unification
//!
//! This module tests:
//! 1. Resolution and path compression
//! 2. Unification symmetry
//! 3. Failure leaves the store untouched
//! 4. Concrete cells are never rewritten by a successful unify

use jscriptor_types::{FieldMap, TypeCell, TypeId, TypeStore};
use pretty_assertions::assert_eq;

fn snapshot(store: &TypeStore) -> Vec<TypeCell> {
    (0..store.len())
        .map(|i| store.cell(TypeId(i as u32)).clone())
        .collect()
}

/// Store with a symlink chain `'t0 -> 't1 -> 't2 -> Number`
fn chained() -> (TypeStore, [TypeId; 4]) {
    let mut store = TypeStore::new();
    let a = store.fresh();
    let b = store.fresh();
    let c = store.fresh();
    let n = store.concrete("Number");
    store.unify(a, b).unwrap();
    store.unify(b, c).unwrap();
    store.unify(c, n).unwrap();
    (store, [a, b, c, n])
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_resolve_reaches_representative() {
    let (mut store, [a, b, c, n]) = chained();
    assert_eq!(store.resolve(a), n);
    assert_eq!(store.resolve(b), n);
    assert_eq!(store.resolve(c), n);
    assert_eq!(store.resolve(n), n);
}

#[test]
fn test_second_resolve_is_a_fixed_point() {
    let (mut store, [a, _, _, n]) = chained();

    let first = store.resolve(a);
    let after_first = snapshot(&store);
    let second = store.resolve(a);

    assert_eq!(first, second);
    assert_eq!(snapshot(&store), after_first);
    // Every cell on the chain is now one hop from the representative
    for cell in &after_first[..3] {
        assert_eq!(cell, &TypeCell::Symlink(n));
    }
}

#[test]
fn test_find_does_not_compress() {
    let (store, [a, b, _, n]) = chained();
    assert_eq!(store.find(a), n);
    assert_eq!(store.cell(a), &TypeCell::Symlink(b));
}

// ============================================================================
// Unification
// ============================================================================

#[test]
fn test_unify_symmetry_on_success() {
    let build = || {
        let mut store = TypeStore::new();
        let v = store.fresh();
        let n = store.concrete("String");
        (store, v, n)
    };

    let (mut forward, v1, n1) = build();
    forward.unify(v1, n1).unwrap();
    let (mut backward, v2, n2) = build();
    backward.unify(n2, v2).unwrap();

    assert_eq!(forward.resolve(v1), forward.resolve(n1));
    assert_eq!(backward.resolve(v2), backward.resolve(n2));
    assert_eq!(forward.concrete_name(v1), backward.concrete_name(v2));
}

#[test]
fn test_unify_symmetry_on_failure() {
    let mut store = TypeStore::new();
    let n = store.concrete("Number");
    let s = store.concrete("String");
    let before = snapshot(&store);

    let forward = store.unify(n, s).unwrap_err();
    let backward = store.unify(s, n).unwrap_err();

    assert_eq!(forward.to_string(), "cannot unify Number with String");
    assert_eq!(backward.to_string(), "cannot unify String with Number");
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_failure_through_symlinks_leaves_store_untouched() {
    let (mut store, [a, ..]) = chained();
    store.resolve(a);
    let s = store.concrete("String");
    let before = snapshot(&store);

    assert!(store.unify(a, s).is_err());
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_concrete_survives_unify_with_unbound() {
    let mut store = TypeStore::new();
    let n = store.concrete("Boolean");
    let v = store.fresh();

    store.unify(n, v).unwrap();

    assert_eq!(store.resolve(v), store.resolve(n));
    assert_eq!(store.cell(n), &TypeCell::Concrete("Boolean".into()));
    assert_eq!(store.concrete_name(v).as_deref(), Some("Boolean"));
}

#[test]
fn test_two_variables_share_later_binding() {
    let mut store = TypeStore::new();
    let a = store.fresh();
    let b = store.fresh();
    store.unify(a, b).unwrap();

    let s = store.concrete("String");
    store.unify(b, s).unwrap();

    assert_eq!(store.concrete_name(a).as_deref(), Some("String"));
}

#[test]
fn test_unify_is_a_no_op_for_same_representative() {
    let (mut store, [a, _, c, _]) = chained();
    store.resolve(a);
    let before = snapshot(&store);
    assert!(store.unify(a, c).is_ok());
    assert_eq!(snapshot(&store), before);
}

#[test]
fn test_objects_link_without_field_checks() {
    let mut store = TypeStore::new();
    let n = store.concrete("Number");
    let s = store.concrete("String");
    let mut left = FieldMap::new();
    left.insert("a".into(), n);
    let mut right = FieldMap::new();
    right.insert("a".into(), s);
    let l = store.object(left);
    let r = store.object(right);

    assert!(store.unify(l, r).is_ok());
    assert_eq!(store.resolve(l), r);
}
