//! Tests for partial typing: errors are localised onto the nodes that
//! could not be typed while independent subtrees keep their types.

use redex_ast::{Expr, Op, RawBinding, RawExpr, Type, TypeError, TypedExpr};
use redex_infer::{TypeEnv, type_tree, type_tree_partial};

fn root(typed: &TypedExpr) -> &Type {
    typed.meta().as_ref().expect("meta present")
}

fn is_error(ty: &Type) -> bool { matches!(ty, Type::Error(_)) }

#[test]
fn test_partial_agrees_with_full_typing_on_success() {
    let env = TypeEnv::new();
    let expr = RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(2));
    assert_eq!(type_tree_partial(&env, &expr), type_tree(&env, &expr).unwrap());
}

#[test]
fn test_error_lands_on_the_failing_ancestor() {
    let env = TypeEnv::new();
    // The condition is an Int: the if-node fails, its children do not.
    let expr = RawExpr::if_expr(RawExpr::int(1), RawExpr::int(2), RawExpr::int(3));
    let typed = type_tree_partial(&env, &expr);

    assert_eq!(
        root(&typed),
        &Type::Error(Box::new(TypeError::UnificationFail(
            Box::new(Type::int()),
            Box::new(Type::bool()),
        )))
    );
    for child in typed.children() {
        assert_eq!(child.meta().as_ref(), Some(&Type::int()));
    }
}

#[test]
fn test_independent_siblings_keep_their_types() {
    let env = TypeEnv::new();
    // 1 + True fails at the addition; the tuple's other component types.
    let expr = RawExpr::ntuple(vec![
        RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::bool(true)),
        RawExpr::chr('x'),
    ]);
    let typed = type_tree_partial(&env, &expr);

    assert!(is_error(root(&typed)));
    let children = typed.children();
    assert!(is_error(children[0].meta().as_ref().expect("meta")));
    assert_eq!(children[1].meta().as_ref(), Some(&Type::char()));

    // Below the failing addition, the literals are typed.
    let grandchildren = children[0].children();
    assert_eq!(grandchildren[0].meta().as_ref(), Some(&Type::int()));
    assert_eq!(grandchildren[1].meta().as_ref(), Some(&Type::bool()));
}

#[test]
fn test_lambda_binders_survive_into_the_body() {
    let env = TypeEnv::new();
    // \x -> (x, unknown)  fails on the unbound name, but x still types.
    let expr = RawExpr::lambda(
        vec![RawBinding::name("x")],
        RawExpr::ntuple(vec![RawExpr::name("x"), RawExpr::name("unknown")]),
    );
    let typed = type_tree_partial(&env, &expr);
    assert!(is_error(root(&typed)));

    let Expr::Lambda { body, .. } = &typed else {
        panic!("shape preserved");
    };
    let pair = body.children();
    // The bound name resolves to its fresh variable; the unbound one keeps
    // the failure.
    assert!(matches!(pair[0].meta().as_ref(), Some(Type::Var(_))));
    assert!(is_error(pair[1].meta().as_ref().expect("meta")));
}

#[test]
fn test_partial_typing_always_returns_a_tree() {
    let env = TypeEnv::new();
    let exprs = vec![
        RawExpr::name("ghost"),
        RawExpr::app(RawExpr::name("ghost"), vec![RawExpr::int(1)]),
        RawExpr::binary(Op::Append, RawExpr::int(1), RawExpr::bool(true)),
    ];
    for expr in exprs {
        let typed = type_tree_partial(&env, &expr);
        // Shape is preserved even when nothing could be typed.
        assert_eq!(typed.children().len(), expr.children().len());
    }
}
