//! Tests for type inference: expressions, definition groups, data
//! constructors, and the environment builder.

use redex_ast::{
    AdtDef, DataConstructor, Definition, Op, Qual, RawBinding, RawExpr, Scheme, Type, TypeError,
    TypedExpr,
};
use redex_infer::{TypeEnv, build_type_env, build_type_env_in, type_tree};

fn root(typed: &TypedExpr) -> &Type {
    typed.meta().as_ref().expect("fully typed tree")
}

fn int_list(items: &[i64]) -> RawExpr {
    RawExpr::list(items.iter().copied().map(RawExpr::int).collect())
}

/// `length [] = 0; length (_:xs) = 1 + length xs;`
/// `map f [] = []; map f (x:xs) = f x : map f xs`
fn prelude_defs() -> Vec<Definition> {
    vec![
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
    ]
}

#[test]
fn test_literals() {
    let env = TypeEnv::new();
    assert_eq!(root(&type_tree(&env, &RawExpr::int(1)).unwrap()), &Type::int());
    assert_eq!(root(&type_tree(&env, &RawExpr::bool(true)).unwrap()), &Type::bool());
    assert_eq!(root(&type_tree(&env, &RawExpr::chr('x')).unwrap()), &Type::char());
}

#[test]
fn test_monomorphic_lambda() {
    let env = TypeEnv::new();
    let inc = RawExpr::lambda(
        vec![RawBinding::name("x")],
        RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::int(1)),
    );
    let typed = type_tree(&env, &inc).unwrap();
    assert_eq!(root(&typed), &Type::fun(Type::int(), Type::int()));
}

#[test]
fn test_identity_is_polymorphic() {
    let env = TypeEnv::new();
    let id = RawExpr::lambda(vec![RawBinding::name("x")], RawExpr::name("x"));
    let typed = type_tree(&env, &id).unwrap();
    // Canonically renamed to a -> a.
    assert_eq!(root(&typed), &Type::fun(Type::var("a"), Type::var("a")));
}

#[test]
fn test_every_node_is_annotated() {
    let env = TypeEnv::new();
    let expr = RawExpr::if_expr(
        RawExpr::bool(true),
        RawExpr::int(1),
        RawExpr::binary(Op::Add, RawExpr::int(1), RawExpr::int(1)),
    );
    let typed = type_tree(&env, &expr).unwrap();
    let mut missing = 0_usize;
    let _ = typed.map_meta(&mut |m| {
        if m.is_none() {
            missing += 1;
        }
        m
    });
    assert_eq!(missing, 0);
}

#[test]
fn test_division_operators_are_wired_in() {
    let env = TypeEnv::new();
    let typed = type_tree(&env, &RawExpr::name("div")).unwrap();
    assert_eq!(
        root(&typed),
        &Type::fun(Type::int(), Type::fun(Type::int(), Type::int()))
    );
}

#[test]
fn test_unbound_variable() {
    let env = TypeEnv::new();
    assert_eq!(
        type_tree(&env, &RawExpr::name("nope")),
        Err(TypeError::UnboundVariable("nope".to_string()))
    );
}

#[test]
fn test_sections_type_as_functions() {
    let env = TypeEnv::new();
    let left = RawExpr::sect_l(RawExpr::int(2), Op::Add);
    assert_eq!(
        root(&type_tree(&env, &left).unwrap()),
        &Type::fun(Type::int(), Type::int())
    );

    let right = RawExpr::sect_r(Op::Add, RawExpr::int(2));
    assert_eq!(
        root(&type_tree(&env, &right).unwrap()),
        &Type::fun(Type::int(), Type::int())
    );

    let bare = RawExpr::prefix_op(Op::And);
    assert_eq!(
        root(&type_tree(&env, &bare).unwrap()),
        &Type::fun(Type::bool(), Type::fun(Type::bool(), Type::bool()))
    );
}

#[test]
fn test_if_branches_must_agree() {
    let env = TypeEnv::new();
    let good = RawExpr::if_expr(RawExpr::bool(true), RawExpr::int(1), RawExpr::int(2));
    assert_eq!(root(&type_tree(&env, &good).unwrap()), &Type::int());

    let bad = RawExpr::if_expr(RawExpr::bool(true), RawExpr::int(1), RawExpr::bool(false));
    assert!(type_tree(&env, &bad).is_err());
}

#[test]
fn test_let_types_the_body() {
    let env = TypeEnv::new();
    let expr = RawExpr::let_expr(
        vec![(RawBinding::name("x"), RawExpr::int(1))],
        RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::name("x")),
    );
    assert_eq!(root(&type_tree(&env, &expr).unwrap()), &Type::int());
}

#[test]
fn test_list_comprehension_types_as_a_list_of_heads() {
    let env = TypeEnv::new();
    let comp = RawExpr::list_comp(
        RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::int(1)),
        vec![
            Qual::Gen { meta: (), binding: RawBinding::name("x"), expr: int_list(&[1, 2]) },
            Qual::Guard {
                meta: (),
                expr: RawExpr::binary(Op::Lt, RawExpr::int(1), RawExpr::name("x")),
            },
        ],
    );
    assert_eq!(root(&type_tree(&env, &comp).unwrap()), &Type::list(Type::int()));
}

#[test]
fn test_guards_must_be_boolean() {
    let env = TypeEnv::new();
    let comp = RawExpr::list_comp(
        RawExpr::name("x"),
        vec![
            Qual::Gen { meta: (), binding: RawBinding::name("x"), expr: int_list(&[1]) },
            Qual::Guard { meta: (), expr: RawExpr::int(1) },
        ],
    );
    assert!(type_tree(&env, &comp).is_err());
}

#[test]
fn test_arithmetic_sequences_are_enumerable_lists() {
    let env = TypeEnv::new();
    let ints = RawExpr::arithm_seq(RawExpr::int(1), None, Some(RawExpr::int(5)));
    assert_eq!(root(&type_tree(&env, &ints).unwrap()), &Type::list(Type::int()));

    let chars = RawExpr::arithm_seq(RawExpr::chr('a'), None, None);
    assert_eq!(root(&type_tree(&env, &chars).unwrap()), &Type::list(Type::char()));

    let lists = RawExpr::arithm_seq(int_list(&[1]), None, None);
    assert_eq!(
        type_tree(&env, &lists),
        Err(TypeError::NoInstanceOfEnum(Box::new(Type::list(Type::int()))))
    );
}

#[test]
fn test_sequence_seeds_share_one_type() {
    let env = TypeEnv::new();
    let mixed = RawExpr::arithm_seq(RawExpr::int(1), Some(RawExpr::chr('a')), None);
    assert!(type_tree(&env, &mixed).is_err());
}

#[test]
fn test_prelude_schemes() {
    let env = build_type_env(&prelude_defs()).unwrap();

    assert_eq!(
        env.lookup("length"),
        Some(&Scheme::poly(
            vec!["a".to_string()],
            Type::fun(Type::list(Type::var("a")), Type::int()),
        ))
    );

    assert_eq!(
        env.lookup("map"),
        Some(&Scheme::poly(
            vec!["a".to_string(), "b".to_string()],
            Type::fun(
                Type::fun(Type::var("a"), Type::var("b")),
                Type::fun(Type::list(Type::var("a")), Type::list(Type::var("b"))),
            ),
        ))
    );
}

#[test]
fn test_reduction_preserves_the_type() {
    // length [1,2,3] keeps its type across a reduction step.
    let defs = prelude_defs();
    let env = build_type_env(&defs).unwrap();
    let expr = RawExpr::app(RawExpr::name("length"), vec![int_list(&[1, 2, 3])]);
    let before = type_tree(&env, &expr).unwrap();

    let eval_env = redex_eval::defs_to_env(&defs);
    let stepped = redex_eval::step(&eval_env, &[], &expr).unwrap();
    let after = type_tree(&env, &stepped).unwrap();

    assert_eq!(root(&before), &Type::int());
    assert_eq!(root(&before), root(&after));
}

#[test]
fn test_definition_groups_defer_on_demand() {
    // f is defined before g but needs g's type.
    let defs = vec![
        Definition::new(
            "f",
            vec![RawBinding::name("x")],
            RawExpr::app(RawExpr::name("g"), vec![RawExpr::name("x")]),
        ),
        Definition::new(
            "g",
            vec![RawBinding::name("y")],
            RawExpr::binary(Op::Add, RawExpr::name("y"), RawExpr::int(1)),
        ),
    ];
    let env = build_type_env(&defs).unwrap();
    assert_eq!(
        env.lookup("f"),
        Some(&Scheme::poly(vec![], Type::fun(Type::int(), Type::int())))
    );
}

#[test]
fn test_mutual_recursion_across_groups_is_rejected() {
    let defs = vec![
        Definition::new(
            "f",
            vec![RawBinding::name("x")],
            RawExpr::app(RawExpr::name("g"), vec![RawExpr::name("x")]),
        ),
        Definition::new(
            "g",
            vec![RawBinding::name("x")],
            RawExpr::app(RawExpr::name("f"), vec![RawExpr::name("x")]),
        ),
    ];
    assert!(matches!(
        build_type_env(&defs),
        Err(TypeError::UnboundVariable(_))
    ));
}

#[test]
fn test_conflicting_pattern_variables() {
    let env = TypeEnv::new();
    let lambda = RawExpr::lambda(
        vec![RawBinding::name("x"), RawBinding::name("x")],
        RawExpr::name("x"),
    );
    assert_eq!(
        type_tree(&env, &lambda),
        Err(TypeError::conflicting_definitions("x"))
    );

    let defs = vec![Definition::new(
        "pair",
        vec![RawBinding::name("x"), RawBinding::name("x")],
        RawExpr::name("x"),
    )];
    assert_eq!(build_type_env(&defs), Err(TypeError::conflicting_definitions("x")));
}

fn maybe_env() -> TypeEnv {
    let adt = AdtDef {
        name: "Maybe".to_string(),
        params: vec!["a".to_string()],
        constructors: vec![
            DataConstructor::Prefix { name: "Nothing".to_string(), params: vec![] },
            DataConstructor::Prefix { name: "Just".to_string(), params: vec![Type::var("a")] },
        ],
    };
    let mut env = TypeEnv::new();
    for (def, scheme) in adt.compile() {
        env.extend(def.name, scheme);
    }
    env
}

#[test]
fn test_data_constructors_type_as_their_schemes() {
    let env = maybe_env();
    let just_five = RawExpr::app(RawExpr::constr("Just"), vec![RawExpr::int(5)]);
    assert_eq!(
        root(&type_tree(&env, &just_five).unwrap()),
        &Type::Adt("Maybe".to_string(), vec![Type::int()])
    );

    let unknown = RawExpr::constr("Imaginary");
    assert_eq!(
        type_tree(&env, &unknown),
        Err(TypeError::UnknownDataConstructor("Imaginary".to_string()))
    );
}

#[test]
fn test_constructor_patterns_drive_clause_types() {
    // fromJust (Just x) = x  ::  Maybe a -> a
    let defs = vec![Definition::new(
        "fromJust",
        vec![RawBinding::constr("Just", vec![RawBinding::name("x")])],
        RawExpr::name("x"),
    )];
    let env = build_type_env_in(&maybe_env(), &defs).unwrap();
    assert_eq!(
        env.lookup("fromJust"),
        Some(&Scheme::poly(
            vec!["a".to_string()],
            Type::fun(Type::Adt("Maybe".to_string(), vec![Type::var("a")]), Type::var("a")),
        ))
    );
}

#[test]
fn test_oversaturated_constructor_patterns_are_rejected() {
    let env = maybe_env();
    let lambda = RawExpr::lambda(
        vec![RawBinding::constr(
            "Just",
            vec![RawBinding::name("x"), RawBinding::name("y")],
        )],
        RawExpr::name("x"),
    );
    assert!(matches!(
        type_tree(&env, &lambda),
        Err(TypeError::PatternMismatch { .. })
    ));
}
