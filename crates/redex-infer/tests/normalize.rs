//! Tests for canonical renaming of type variables.

use redex_ast::{Scheme, Type, TypeError};
use redex_infer::{normalize_scheme, normalize_type, normalize_type_error};

#[test]
fn test_renaming_follows_first_appearance() {
    let ty = Type::Tuple(vec![Type::var("t5"), Type::var("t9"), Type::var("t5")]);
    assert_eq!(
        normalize_type(&ty),
        Type::Tuple(vec![Type::var("a"), Type::var("b"), Type::var("a")])
    );
}

#[test]
fn test_renaming_is_deterministic() {
    let ty = Type::fun(Type::var("x"), Type::fun(Type::var("y"), Type::var("x")));
    assert_eq!(normalize_type(&ty), normalize_type(&ty));
    assert_eq!(
        normalize_type(&ty),
        Type::fun(Type::var("a"), Type::fun(Type::var("b"), Type::var("a")))
    );
}

#[test]
fn test_alphabet_rolls_over_past_z() {
    // 28 distinct variables: a..z, aa, ab.
    let vars: Vec<Type> = (0..28).map(|i| Type::var(format!("t{i}"))).collect();
    let Type::Tuple(renamed) = normalize_type(&Type::Tuple(vars)) else {
        panic!("tuple stays a tuple");
    };
    assert_eq!(renamed[0], Type::var("a"));
    assert_eq!(renamed[25], Type::var("z"));
    assert_eq!(renamed[26], Type::var("aa"));
    assert_eq!(renamed[27], Type::var("ab"));
}

#[test]
fn test_constants_are_untouched() {
    let ty = Type::fun(Type::int(), Type::list(Type::bool()));
    assert_eq!(normalize_type(&ty), ty);
}

#[test]
fn test_scheme_renaming_keeps_quantifier_positions() {
    let scheme = Scheme::poly(
        vec!["t3".to_string(), "t1".to_string()],
        Type::fun(Type::var("t3"), Type::var("t1")),
    );
    assert_eq!(
        normalize_scheme(&scheme),
        Scheme::poly(
            vec!["a".to_string(), "b".to_string()],
            Type::fun(Type::var("a"), Type::var("b")),
        )
    );
}

#[test]
fn test_errors_are_renamed_consistently() {
    let err = TypeError::UnificationFail(
        Box::new(Type::var("t7")),
        Box::new(Type::list(Type::var("t7"))),
    );
    assert_eq!(
        normalize_type_error(&err),
        TypeError::UnificationFail(
            Box::new(Type::var("a")),
            Box::new(Type::list(Type::var("a"))),
        )
    );
}
