//! Tests for step-wise evaluation: clause resolution, argument forcing,
//! partial application, primitives, and full normalisation.

use redex_ast::{Definition, Op, PathStep, RawBinding, RawExpr};
use redex_eval::{EvalEnv, EvalError, defs_to_env, eval_all, step};

/// The prelude used throughout:
/// `length [] = 0; length (_:xs) = 1 + length xs;`
/// `map f [] = []; map f (x:xs) = f x : map f xs`
fn prelude() -> EvalEnv {
    defs_to_env(&[
        Definition::new("length", vec![RawBinding::list(vec![])], RawExpr::int(0)),
        Definition::new(
            "length",
            vec![RawBinding::cons(RawBinding::wildcard(), RawBinding::name("xs"))],
            RawExpr::binary(
                Op::Add,
                RawExpr::int(1),
                RawExpr::app(RawExpr::name("length"), vec![RawExpr::name("xs")]),
            ),
        ),
        Definition::new(
            "map",
            vec![RawBinding::name("f"), RawBinding::list(vec![])],
            RawExpr::list(vec![]),
        ),
        Definition::new(
            "map",
            vec![
                RawBinding::name("f"),
                RawBinding::cons(RawBinding::name("x"), RawBinding::name("xs")),
            ],
            RawExpr::binary(
                Op::Colon,
                RawExpr::app(RawExpr::name("f"), vec![RawExpr::name("x")]),
                RawExpr::app(
                    RawExpr::name("map"),
                    vec![RawExpr::name("f"), RawExpr::name("xs")],
                ),
            ),
        ),
    ])
}

fn int_list(items: &[i64]) -> RawExpr {
    RawExpr::list(items.iter().copied().map(RawExpr::int).collect())
}

#[test]
fn test_length_forces_only_the_outermost_cons() {
    let env = prelude();
    let expr = RawExpr::app(RawExpr::name("length"), vec![int_list(&[1, 2, 3])]);

    // The first step only reshapes the argument to expose the cons cell.
    let forced = step(&env, &[], &expr).unwrap();
    assert_eq!(
        forced,
        RawExpr::app(
            RawExpr::name("length"),
            vec![RawExpr::binary(Op::Colon, RawExpr::int(1), int_list(&[2, 3]))],
        )
    );

    // The second step fires the cons clause.
    let fired = step(&env, &[], &forced).unwrap();
    assert_eq!(
        fired,
        RawExpr::binary(
            Op::Add,
            RawExpr::int(1),
            RawExpr::app(RawExpr::name("length"), vec![int_list(&[2, 3])]),
        )
    );
}

#[test]
fn test_length_normalises_to_the_list_length() {
    let env = prelude();
    let expr = RawExpr::app(RawExpr::name("length"), vec![int_list(&[1, 2, 3])]);
    assert_eq!(eval_all(&env, &expr), RawExpr::int(3));
}

#[test]
fn test_map_normalises_pointwise() {
    let env = prelude();
    let succ = RawExpr::lambda(
        vec![RawBinding::name("x")],
        RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::int(1)),
    );
    let expr = RawExpr::app(RawExpr::name("map"), vec![succ, int_list(&[1, 2, 3])]);
    assert_eq!(eval_all(&env, &expr), int_list(&[2, 3, 4]));
}

#[test]
fn test_partial_application_wraps_the_remaining_patterns() {
    let env = prelude();
    let expr = RawExpr::app(
        RawExpr::lambda(
            vec![RawBinding::name("x"), RawBinding::name("y")],
            RawExpr::name("x"),
        ),
        vec![RawExpr::int(1)],
    );
    assert_eq!(
        step(&env, &[], &expr).unwrap(),
        RawExpr::lambda(vec![RawBinding::name("y")], RawExpr::int(1))
    );
}

#[test]
fn test_extra_arguments_are_reapplied() {
    let env = prelude();
    // (\x -> x) (\y -> y) 5  flattens and reduces to 5.
    let id_x = RawExpr::lambda(vec![RawBinding::name("x")], RawExpr::name("x"));
    let id_y = RawExpr::lambda(vec![RawBinding::name("y")], RawExpr::name("y"));
    let expr = RawExpr::app(RawExpr::app(id_x, vec![id_y]), vec![RawExpr::int(5)]);
    assert_eq!(eval_all(&env, &expr), RawExpr::int(5));
}

#[test]
fn test_division_by_zero() {
    let env = prelude();
    let expr = RawExpr::app(RawExpr::name("div"), vec![RawExpr::int(5), RawExpr::int(0)]);
    assert_eq!(step(&env, &[], &expr), Err(EvalError::DivByZero));
}

#[test]
fn test_division_and_remainder() {
    let env = prelude();
    let divided = RawExpr::app(RawExpr::name("div"), vec![RawExpr::int(7), RawExpr::int(2)]);
    assert_eq!(step(&env, &[], &divided).unwrap(), RawExpr::int(3));

    let rem = RawExpr::app(RawExpr::name("mod"), vec![RawExpr::int(7), RawExpr::int(2)]);
    assert_eq!(step(&env, &[], &rem).unwrap(), RawExpr::int(1));
}

#[test]
fn test_unknown_function() {
    let env = prelude();
    let expr = RawExpr::app(RawExpr::name("reverse"), vec![int_list(&[1])]);
    assert_eq!(
        step(&env, &[], &expr),
        Err(EvalError::UnknownFunction("reverse".to_string()))
    );
}

#[test]
fn test_if_selects_a_branch() {
    let env = prelude();
    let expr = RawExpr::if_expr(RawExpr::bool(true), RawExpr::int(1), RawExpr::int(2));
    assert_eq!(step(&env, &[], &expr).unwrap(), RawExpr::int(1));

    let expr = RawExpr::if_expr(RawExpr::bool(false), RawExpr::int(1), RawExpr::int(2));
    assert_eq!(step(&env, &[], &expr).unwrap(), RawExpr::int(2));
}

#[test]
fn test_if_never_evaluates_the_dead_branch() {
    let env = prelude();
    // The else branch would be a division by zero.
    let expr = RawExpr::if_expr(
        RawExpr::binary(Op::Lt, RawExpr::int(1), RawExpr::int(2)),
        RawExpr::int(42),
        RawExpr::app(RawExpr::name("div"), vec![RawExpr::int(1), RawExpr::int(0)]),
    );
    assert_eq!(eval_all(&env, &expr), RawExpr::int(42));
}

#[test]
fn test_composition_rewrites_under_application() {
    let env = prelude();
    let composed = RawExpr::binary(Op::Composition, RawExpr::name("f"), RawExpr::name("g"));
    let expr = RawExpr::app(composed, vec![RawExpr::int(1)]);
    assert_eq!(
        step(&env, &[], &expr).unwrap(),
        RawExpr::app(
            RawExpr::name("f"),
            vec![RawExpr::app(RawExpr::name("g"), vec![RawExpr::int(1)])],
        )
    );
}

#[test]
fn test_sections_compute_when_saturated() {
    let env = prelude();
    let left = RawExpr::app(RawExpr::sect_l(RawExpr::int(10), Op::Sub), vec![RawExpr::int(3)]);
    assert_eq!(step(&env, &[], &left).unwrap(), RawExpr::int(7));

    let right = RawExpr::app(RawExpr::sect_r(Op::Sub, RawExpr::int(3)), vec![RawExpr::int(10)]);
    assert_eq!(step(&env, &[], &right).unwrap(), RawExpr::int(7));

    let prefix = RawExpr::app(
        RawExpr::prefix_op(Op::Mul),
        vec![RawExpr::int(6), RawExpr::int(7)],
    );
    assert_eq!(step(&env, &[], &prefix).unwrap(), RawExpr::int(42));
}

#[test]
fn test_section_falls_back_to_the_infix_form() {
    let env = prelude();
    // The operand still needs reduction, so the section rewrites to the
    // infix application instead of computing.
    let pending = RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(1));
    let expr = RawExpr::app(RawExpr::sect_l(RawExpr::int(2), Op::Mul), vec![pending.clone()]);
    assert_eq!(
        step(&env, &[], &expr).unwrap(),
        RawExpr::binary(Op::Mul, RawExpr::int(2), pending)
    );
}

#[test]
fn test_dollar_applies() {
    let env = prelude();
    let expr = RawExpr::binary(Op::Dollar, RawExpr::name("length"), int_list(&[1, 2]));
    assert_eq!(
        step(&env, &[], &expr).unwrap(),
        RawExpr::app(RawExpr::name("length"), vec![int_list(&[1, 2])])
    );
}

#[test]
fn test_power_quirks() {
    let env = prelude();
    let pow = |b: i64, e: i64| {
        RawExpr::binary(Op::Power, RawExpr::int(b), RawExpr::int(e))
    };
    assert_eq!(step(&env, &[], &pow(2, 10)).unwrap(), RawExpr::int(1024));
    // An empty product is 1, so zero and negative exponents both give 1.
    assert_eq!(step(&env, &[], &pow(2, 0)).unwrap(), RawExpr::int(1));
    assert_eq!(step(&env, &[], &pow(2, -3)).unwrap(), RawExpr::int(1));
}

#[test]
fn test_boolean_operators_absorb_from_either_side() {
    let env = prelude();
    let diverging = RawExpr::app(RawExpr::name("boom"), vec![RawExpr::int(1)]);

    let and = RawExpr::binary(Op::And, RawExpr::bool(false), diverging.clone());
    assert_eq!(step(&env, &[], &and).unwrap(), RawExpr::bool(false));

    let and = RawExpr::binary(Op::And, diverging.clone(), RawExpr::bool(false));
    assert_eq!(step(&env, &[], &and).unwrap(), RawExpr::bool(false));

    let or = RawExpr::binary(Op::Or, diverging.clone(), RawExpr::bool(true));
    assert_eq!(step(&env, &[], &or).unwrap(), RawExpr::bool(true));

    let or = RawExpr::binary(Op::Or, RawExpr::bool(true), diverging);
    assert_eq!(step(&env, &[], &or).unwrap(), RawExpr::bool(true));
}

#[test]
fn test_cons_and_append() {
    let env = prelude();
    let cons = RawExpr::binary(Op::Colon, RawExpr::int(1), int_list(&[2, 3]));
    assert_eq!(step(&env, &[], &cons).unwrap(), int_list(&[1, 2, 3]));

    let append = RawExpr::binary(Op::Append, int_list(&[1]), int_list(&[2, 3]));
    assert_eq!(step(&env, &[], &append).unwrap(), int_list(&[1, 2, 3]));

    // A cons onto something that is not yet a list literal is not ready.
    let pending = RawExpr::binary(Op::Colon, RawExpr::int(1), RawExpr::name("xs"));
    assert!(matches!(
        step(&env, &[], &pending),
        Err(EvalError::BinaryOpError { .. })
    ));
}

#[test]
fn test_comparisons_are_pointwise() {
    let env = prelude();
    let lt = RawExpr::binary(Op::Lt, RawExpr::chr('a'), RawExpr::chr('b'));
    assert_eq!(step(&env, &[], &lt).unwrap(), RawExpr::bool(true));

    let mixed = RawExpr::binary(Op::Equ, RawExpr::int(1), RawExpr::bool(true));
    assert!(matches!(
        step(&env, &[], &mixed),
        Err(EvalError::BinaryOpError { .. })
    ));
}

#[test]
fn test_path_navigation() {
    let env = prelude();
    let expr = RawExpr::binary(
        Op::Add,
        RawExpr::int(1),
        RawExpr::binary(Op::Add, RawExpr::int(2), RawExpr::int(3)),
    );
    // Reduce the inner sum only.
    assert_eq!(
        step(&env, &[PathStep::Snd], &expr).unwrap(),
        RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(5))
    );
}

#[test]
fn test_path_errors() {
    let env = prelude();
    let expr = RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(2));
    assert!(matches!(
        step(&env, &[PathStep::Thrd], &expr),
        Err(EvalError::PathError { .. })
    ));

    let list = int_list(&[1, 2]);
    assert_eq!(
        step(&env, &[PathStep::Nth(5)], &list),
        Err(EvalError::IndexError { index: 5, len: 2 })
    );
}

#[test]
fn test_step_at_a_normal_form_reports_cannot_evaluate() {
    let env = prelude();
    assert!(matches!(
        step(&env, &[], &RawExpr::int(1)),
        Err(EvalError::CannotEvaluate(_))
    ));
}

#[test]
fn test_let_substitutes_into_the_body() {
    let env = prelude();
    let expr = RawExpr::let_expr(
        vec![(RawBinding::name("x"), RawExpr::int(1))],
        RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::name("x")),
    );
    assert_eq!(
        step(&env, &[], &expr).unwrap(),
        RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(1))
    );
}

#[test]
fn test_let_destructures_tuples() {
    let env = prelude();
    let expr = RawExpr::let_expr(
        vec![(
            RawBinding::ntuple(vec![RawBinding::name("a"), RawBinding::name("b")]),
            RawExpr::ntuple(vec![RawExpr::int(1), RawExpr::int(2)]),
        )],
        RawExpr::binary(Op::Add, RawExpr::name("a"), RawExpr::name("b")),
    );
    assert_eq!(eval_all(&env, &expr), RawExpr::int(3));
}

#[test]
fn test_let_bindings_see_earlier_binders() {
    let env = prelude();
    let expr = RawExpr::let_expr(
        vec![
            (RawBinding::name("x"), RawExpr::int(1)),
            (
                RawBinding::name("y"),
                RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::int(1)),
            ),
        ],
        RawExpr::name("y"),
    );
    assert_eq!(eval_all(&env, &expr), RawExpr::int(2));
}

#[test]
fn test_let_rejects_conflicting_binder_names() {
    let env = prelude();
    // let x = 1; x = 2 in x
    let expr = RawExpr::let_expr(
        vec![
            (RawBinding::name("x"), RawExpr::int(1)),
            (RawBinding::name("x"), RawExpr::int(2)),
        ],
        RawExpr::name("x"),
    );
    assert_eq!(
        step(&env, &[], &expr),
        Err(EvalError::conflicting_definitions("x"))
    );

    // The check also catches a duplicate within a single pattern.
    let expr = RawExpr::let_expr(
        vec![(
            RawBinding::ntuple(vec![RawBinding::name("a"), RawBinding::name("a")]),
            RawExpr::ntuple(vec![RawExpr::int(1), RawExpr::int(2)]),
        )],
        RawExpr::name("a"),
    );
    assert_eq!(
        step(&env, &[], &expr),
        Err(EvalError::conflicting_definitions("a"))
    );
}

#[test]
fn test_let_fails_when_a_forced_binder_cannot_match() {
    let env = prelude();
    // The right-hand side forces to the atom 2, which can never take a
    // tuple shape: the step fails rather than surfacing the forced form.
    let expr = RawExpr::let_expr(
        vec![(
            RawBinding::ntuple(vec![RawBinding::name("x"), RawBinding::name("y")]),
            RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(1)),
        )],
        RawExpr::name("x"),
    );
    assert!(matches!(
        step(&env, &[], &expr),
        Err(EvalError::CannotEvaluate(_))
    ));
}

#[test]
fn test_list_comprehension_generates_and_filters() {
    let env = prelude();
    // [x | x <- [1,2,3]]
    let comp = RawExpr::list_comp(
        RawExpr::name("x"),
        vec![redex_ast::Qual::Gen {
            meta: (),
            binding: RawBinding::name("x"),
            expr: int_list(&[1, 2, 3]),
        }],
    );
    assert_eq!(eval_all(&env, &comp), int_list(&[1, 2, 3]));

    // [x | x <- [1,2,3], 2 < x]
    let filtered = RawExpr::list_comp(
        RawExpr::name("x"),
        vec![
            redex_ast::Qual::Gen {
                meta: (),
                binding: RawBinding::name("x"),
                expr: int_list(&[1, 2, 3]),
            },
            redex_ast::Qual::Guard {
                meta: (),
                expr: RawExpr::binary(Op::Lt, RawExpr::int(2), RawExpr::name("x")),
            },
        ],
    );
    assert_eq!(eval_all(&env, &filtered), int_list(&[3]));
}

#[test]
fn test_list_comprehension_let_qualifier() {
    let env = prelude();
    // [y | x <- [1,2], let y = x + x]
    let comp = RawExpr::list_comp(
        RawExpr::name("y"),
        vec![
            redex_ast::Qual::Gen {
                meta: (),
                binding: RawBinding::name("x"),
                expr: int_list(&[1, 2]),
            },
            redex_ast::Qual::Let {
                meta: (),
                binding: RawBinding::name("y"),
                expr: RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::name("x")),
            },
        ],
    );
    assert_eq!(eval_all(&env, &comp), int_list(&[2, 4]));
}

#[test]
fn test_constructor_applications_are_normal_forms() {
    let env = defs_to_env(&[
        // fromJust (Just x) = x
        Definition::new(
            "fromJust",
            vec![RawBinding::constr("Just", vec![RawBinding::name("x")])],
            RawExpr::name("x"),
        ),
    ]);
    let just_five = RawExpr::app(RawExpr::constr("Just"), vec![RawExpr::int(5)]);
    assert!(matches!(
        step(&env, &[], &just_five),
        Err(EvalError::CannotEvaluate(_))
    ));

    let expr = RawExpr::app(RawExpr::name("fromJust"), vec![just_five]);
    assert_eq!(step(&env, &[], &expr).unwrap(), RawExpr::int(5));
}

#[test]
fn test_clause_order_is_source_order() {
    // first _ = 1; first _ = 2  -- the first clause always wins
    let env = defs_to_env(&[
        Definition::new("first", vec![RawBinding::wildcard()], RawExpr::int(1)),
        Definition::new("first", vec![RawBinding::wildcard()], RawExpr::int(2)),
    ]);
    let expr = RawExpr::app(RawExpr::name("first"), vec![RawExpr::int(0)]);
    assert_eq!(step(&env, &[], &expr).unwrap(), RawExpr::int(1));
}

#[test]
fn test_strictness_stops_clause_resolution() {
    // zero 0 = True; zero _ = False  -- applied to an opaque argument
    let env = defs_to_env(&[
        Definition::new(
            "zero",
            vec![RawBinding::lit(redex_ast::Atom::Int(0))],
            RawExpr::bool(true),
        ),
        Definition::new("zero", vec![RawBinding::wildcard()], RawExpr::bool(false)),
    ]);
    // The argument cannot reach weak head normal form, so resolution stops
    // rather than skipping to the catch-all clause.
    let expr = RawExpr::app(RawExpr::name("zero"), vec![RawExpr::name("opaque")]);
    assert!(matches!(
        step(&env, &[], &expr),
        Err(EvalError::NoMatchingFunction { .. })
    ));
}

#[test]
fn test_name_capture_is_detected() {
    // const2 x = \y -> x, applied to the free name y.
    let env = defs_to_env(&[Definition::new(
        "const2",
        vec![RawBinding::name("x")],
        RawExpr::lambda(vec![RawBinding::name("y")], RawExpr::name("x")),
    )]);
    let expr = RawExpr::app(RawExpr::name("const2"), vec![RawExpr::name("y")]);
    assert_eq!(
        step(&env, &[], &expr),
        Err(EvalError::NameCaptureError { names: vec!["y".to_string()] })
    );
}

#[test]
fn test_eval_all_is_a_fixpoint_of_step() {
    let env = prelude();
    let exprs = vec![
        RawExpr::app(RawExpr::name("length"), vec![int_list(&[1, 2, 3])]),
        RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(2)),
        int_list(&[4]),
    ];
    for expr in exprs {
        let normal = eval_all(&env, &expr);
        // A further root step either fails or returns the same tree.
        match step(&env, &[], &normal) {
            Ok(same) => assert_eq!(same, normal),
            Err(_) => {}
        }
    }
}
