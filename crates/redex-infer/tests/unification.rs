//! Tests for unification and constraint solving.

use redex_ast::{Type, TypeError};
use redex_infer::{Constraint, Substitutable, solve, unify};

#[test]
fn test_equal_constants_unify_trivially() {
    assert!(unify(&Type::int(), &Type::int()).unwrap().is_empty());
    assert!(matches!(
        unify(&Type::int(), &Type::bool()),
        Err(TypeError::UnificationFail(_, _))
    ));
}

#[test]
fn test_variables_bind_to_types() {
    let s = unify(&Type::var("a"), &Type::int()).unwrap();
    assert_eq!(Type::var("a").apply(&s), Type::int());

    // Binding a variable to itself produces nothing.
    assert!(unify(&Type::var("a"), &Type::var("a")).unwrap().is_empty());
}

#[test]
fn test_unknown_unifies_with_anything() {
    assert!(unify(&Type::Unknown, &Type::int()).unwrap().is_empty());
    assert!(unify(&Type::fun(Type::int(), Type::bool()), &Type::Unknown).unwrap().is_empty());
}

#[test]
fn test_occurs_check_rejects_infinite_types() {
    let result = unify(&Type::var("a"), &Type::list(Type::var("a")));
    assert!(matches!(result, Err(TypeError::InfiniteType { .. })));
}

#[test]
fn test_arrows_thread_the_substitution() {
    // a -> a  ~  Int -> b  forces both a and b to Int.
    let s = unify(
        &Type::fun(Type::var("a"), Type::var("a")),
        &Type::fun(Type::int(), Type::var("b")),
    )
    .unwrap();
    assert_eq!(Type::var("a").apply(&s), Type::int());
    assert_eq!(Type::var("b").apply(&s), Type::int());
}

#[test]
fn test_structural_mismatches_fail() {
    let pair = Type::Tuple(vec![Type::int(), Type::int()]);
    let triple = Type::Tuple(vec![Type::int(), Type::int(), Type::int()]);
    assert!(unify(&pair, &triple).is_err());

    let maybe = Type::Adt("Maybe".to_string(), vec![Type::int()]);
    let either = Type::Adt("Either".to_string(), vec![Type::int()]);
    assert!(unify(&maybe, &either).is_err());

    assert!(unify(&Type::list(Type::int()), &Type::int()).is_err());
}

#[test]
fn test_solve_threads_substitutions_in_order() {
    let constraints = vec![
        Constraint::Eq { lhs: Type::var("a"), rhs: Type::var("b"), origin: 0 },
        Constraint::Eq { lhs: Type::var("b"), rhs: Type::int(), origin: 1 },
    ];
    let s = solve(&constraints).unwrap();
    assert_eq!(Type::var("a").apply(&s), Type::int());
    assert_eq!(Type::var("b").apply(&s), Type::int());
}

#[test]
fn test_solve_checks_enumerability_last() {
    // The equality resolving a to Int comes after the Enumerable
    // constraint, which must still pass.
    let constraints = vec![
        Constraint::Enumerable { ty: Type::var("a"), origin: 0 },
        Constraint::Eq { lhs: Type::var("a"), rhs: Type::int(), origin: 1 },
    ];
    assert!(solve(&constraints).is_ok());

    let failing = vec![
        Constraint::Enumerable { ty: Type::var("a"), origin: 0 },
        Constraint::Eq { lhs: Type::var("a"), rhs: Type::list(Type::int()), origin: 1 },
    ];
    assert!(matches!(
        solve(&failing),
        Err(TypeError::NoInstanceOfEnum(_))
    ));
}
