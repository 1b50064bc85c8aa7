//! The small-step reducer.
//!
//! `eval1` performs one reduction at the root of an expression; `step`
//! navigates a path first and reduces the selected sub-expression;
//! `eval_all` drives `eval1` to a fixpoint, normalising the sub-positions
//! that block the root as it goes.
//!
//! Laziness lives in `eval_to_binding`: an argument is forced only as far
//! as the pattern inspecting it demands, and only along the pattern's
//! shape.

use log::trace;
use redex_ast::{Atom, Binding, Expr, Op, PathStep, Qual, RawBinding, RawExpr};
use rustc_hash::FxHashSet;

use crate::env::{Clause, EvalEnv};
use crate::error::{EvalError, MatchingError};
use crate::matching::{Matches, is_whnf, match_binding};
use crate::subst::substitute;

/// Reduces the sub-expression selected by `path` by one step, returning
/// the whole tree with that node replaced.
///
/// ## Errors
///
/// Returns a [`EvalError::PathError`] or [`EvalError::IndexError`] for
/// invalid navigation, or whatever error the reduction at the selected
/// node produces; the input expression is left for the caller to keep.
pub fn step(env: &EvalEnv, path: &[PathStep], expr: &RawExpr) -> Result<RawExpr, EvalError> {
    let Some((&token, rest)) = path.split_first() else {
        return eval1(env, expr);
    };
    let mut out = expr.clone();
    let target = navigate(&mut out, token)?;
    *target = step(env, rest, target)?;
    Ok(out)
}

fn navigate(expr: &mut RawExpr, token: PathStep) -> Result<&mut RawExpr, EvalError> {
    match (expr, token) {
        (Expr::Binary { lhs, .. }, PathStep::Fst) => Ok(&mut **lhs),
        (Expr::Binary { rhs, .. }, PathStep::Snd) => Ok(&mut **rhs),
        (Expr::Unary { expr, .. } | Expr::SectL { expr, .. }, PathStep::Fst)
        | (Expr::SectR { expr, .. }, PathStep::Snd) => Ok(&mut **expr),
        (Expr::IfExpr { cond, .. }, PathStep::Fst) => Ok(&mut **cond),
        (Expr::IfExpr { then_branch, .. }, PathStep::Snd) => Ok(&mut **then_branch),
        (Expr::IfExpr { else_branch, .. }, PathStep::Thrd) => Ok(&mut **else_branch),
        (Expr::ArithmSeq { start, .. }, PathStep::Fst) => Ok(&mut **start),
        (Expr::ArithmSeq { step: Some(step), .. }, PathStep::Snd) => Ok(&mut **step),
        (Expr::ArithmSeq { end: Some(end), .. }, PathStep::Thrd) => Ok(&mut **end),
        (Expr::Lambda { body, .. } | Expr::LetExpr { body, .. }, PathStep::Fst) => {
            Ok(&mut **body)
        }
        (Expr::App { func, .. }, PathStep::Fst) => Ok(&mut **func),
        (Expr::App { args, .. }, PathStep::Nth(i)) => {
            let len = args.len();
            args.get_mut(i).ok_or(EvalError::IndexError { index: i, len })
        }
        (Expr::List { items, .. } | Expr::NTuple { items, .. }, PathStep::Nth(i)) => {
            let len = items.len();
            items.get_mut(i).ok_or(EvalError::IndexError { index: i, len })
        }
        (Expr::LetExpr { bindings, .. }, PathStep::Nth(i)) => {
            let len = bindings.len();
            bindings
                .get_mut(i)
                .map(|(_, rhs)| rhs)
                .ok_or(EvalError::IndexError { index: i, len })
        }
        (Expr::ListComp { head, .. }, PathStep::Fst) => Ok(&mut **head),
        (Expr::ListComp { quals, .. }, PathStep::Nth(i)) => {
            let len = quals.len();
            quals
                .get_mut(i)
                .map(Qual::expr_mut)
                .ok_or(EvalError::IndexError { index: i, len })
        }
        (other, token) => {
            Err(EvalError::PathError { step: token, expr: Box::new(other.clone()) })
        }
    }
}

/// Performs one reduction at the root of `expr`.
///
/// ## Errors
///
/// [`EvalError::CannotEvaluate`] when the root admits no step; the other
/// variants report failed primitives, unknown names, and failed clause
/// resolution.
pub fn eval1(env: &EvalEnv, expr: &RawExpr) -> Result<RawExpr, EvalError> {
    match expr {
        Expr::Binary { op, lhs, rhs, .. } => binary(env, &op.op, lhs, rhs),
        Expr::Unary { op, expr: operand, .. } => unary(&op.op, operand),
        Expr::Atom { atom: Atom::Name(name), .. } => apply(env, name, &[]),
        Expr::IfExpr { cond, then_branch, else_branch, .. } => match cond.as_ref() {
            Expr::Atom { atom: Atom::Bool(true), .. } => Ok(then_branch.as_ref().clone()),
            Expr::Atom { atom: Atom::Bool(false), .. } => Ok(else_branch.as_ref().clone()),
            _ => Err(EvalError::cannot_evaluate(expr)),
        },
        Expr::ArithmSeq { start, step, end, .. } => {
            crate::arith::unfold(expr, start, step.as_deref(), end.as_deref())
        }
        Expr::App { func, args, .. } => eval_app(env, expr, func, args),
        Expr::LetExpr { bindings, body, .. } => eval_let(env, expr, bindings, body),
        Expr::ListComp { head, quals, .. } => eval_list_comp(env, expr, head, quals),
        _ => Err(EvalError::cannot_evaluate(expr)),
    }
}

fn eval_app(
    env: &EvalEnv,
    whole: &RawExpr,
    func: &RawExpr,
    args: &[RawExpr],
) -> Result<RawExpr, EvalError> {
    match func {
        // (f . g) x  ==>  f (g x)
        Expr::Binary { op, lhs, rhs, .. }
            if op.op == Op::Composition && args.len() == 1 =>
        {
            let inner = Expr::app(rhs.as_ref().clone(), vec![args[0].clone()]);
            Ok(Expr::app(lhs.as_ref().clone(), vec![inner]))
        }
        Expr::Lambda { params, body, .. } => {
            let clause = Clause { patterns: params.clone(), body: body.as_ref().clone() };
            match try_clauses(env, std::slice::from_ref(&clause), args, "lambda")? {
                Application::Forced(forced) => Ok(Expr::app(func.clone(), forced)),
                Application::Reduced(result) => Ok(result),
            }
        }
        // (e1 op) e2  ==>  e1 op e2, computed if the primitive applies
        Expr::SectL { expr: captured, op, .. } if args.len() == 1 => {
            Ok(binary(env, &op.op, captured, &args[0]).unwrap_or_else(|_| {
                Expr::binary(op.op.clone(), captured.as_ref().clone(), args[0].clone())
            }))
        }
        // (op e2) e1  ==>  e1 op e2
        Expr::SectR { op, expr: captured, .. } if args.len() == 1 => {
            Ok(binary(env, &op.op, &args[0], captured).unwrap_or_else(|_| {
                Expr::binary(op.op.clone(), args[0].clone(), captured.as_ref().clone())
            }))
        }
        Expr::PrefixOp { op, .. } if args.len() == 2 => {
            Ok(binary(env, &op.op, &args[0], &args[1]).unwrap_or_else(|_| {
                Expr::binary(op.op.clone(), args[0].clone(), args[1].clone())
            }))
        }
        Expr::Atom { atom: Atom::Name(name), .. } => apply(env, name, args),
        // Left-associative flattening of curried application.
        Expr::App { func: inner, args: first, .. } => {
            let mut all = first.clone();
            all.extend(args.iter().cloned());
            Ok(Expr::App { meta: (), func: inner.clone(), args: all })
        }
        _ => Err(EvalError::cannot_evaluate(whole)),
    }
}

/// Resolves an application of a named function.
fn apply(env: &EvalEnv, name: &str, args: &[RawExpr]) -> Result<RawExpr, EvalError> {
    if name == "div" || name == "mod" {
        return division(name, args);
    }
    let clauses = env
        .lookup(name)
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
    match try_clauses(env, clauses, args, name)? {
        Application::Forced(forced) => Ok(Expr::app(Expr::name(name), forced)),
        Application::Reduced(result) => {
            trace!("applied '{name}'");
            Ok(result)
        }
    }
}

/// The wired-in integer division primitives.
fn division(name: &str, args: &[RawExpr]) -> Result<RawExpr, EvalError> {
    match args {
        [Expr::Atom { atom: Atom::Int(_), .. }, Expr::Atom { atom: Atom::Int(0), .. }] => {
            Err(EvalError::DivByZero)
        }
        [Expr::Atom { atom: Atom::Int(i), .. }, Expr::Atom { atom: Atom::Int(j), .. }] => {
            let value = if name == "div" { i.wrapping_div(*j) } else { i.wrapping_rem(*j) };
            Ok(Expr::int(value))
        }
        [lhs, rhs] => Err(EvalError::BinaryOpError {
            op: Op::InfixFunc(name.to_string()),
            lhs: Box::new(lhs.clone()),
            rhs: Box::new(rhs.clone()),
        }),
        _ => Err(EvalError::cannot_evaluate(&Expr::app(Expr::name(name), args.to_vec()))),
    }
}

/// The outcome of clause resolution.
enum Application {
    /// Matching forced one or more arguments; the visible step is the
    /// application with the forced arguments in place.
    Forced(Vec<RawExpr>),
    /// A clause fired (or a partial application was wrapped); this is the
    /// reduced expression.
    Reduced(RawExpr),
}

/// Walks the clauses of a definition in source order.
///
/// A `Strictness` failure aborts immediately: arguments are never forced
/// just to try the next clause, which is what keeps evaluation lazy. When
/// every clause wants more arguments than were supplied, the first clause
/// is partially applied and the remainder wrapped in a lambda.
fn try_clauses(
    env: &EvalEnv,
    clauses: &[Clause],
    args: &[RawExpr],
    name: &str,
) -> Result<Application, EvalError> {
    let mut errors: Vec<MatchingError> = Vec::new();
    let mut saturated = false;
    for clause in clauses {
        if args.len() < clause.patterns.len() {
            errors.push(MatchingError::TooFewArguments {
                bindings: clause.patterns.clone(),
                exprs: args.to_vec(),
            });
            continue;
        }
        saturated = true;
        match match_all(env, &clause.patterns, args) {
            Ok((forced, matches)) => {
                if forced != args {
                    return Ok(Application::Forced(forced));
                }
                let body = substitute(&clause.body, &matches)?;
                return Ok(Application::Reduced(wrap_lambda(&clause.patterns, args, body)));
            }
            Err(error @ MatchingError::Strictness { .. }) => {
                errors.push(error);
                return Err(EvalError::NoMatchingFunction { name: name.to_string(), errors });
            }
            Err(error) => errors.push(error),
        }
    }
    if !saturated {
        if let Some(clause) = clauses.first() {
            // Every clause records TooFewArguments: partially apply.
            match match_all(env, &clause.patterns, args) {
                Ok((forced, matches)) => {
                    if forced != args {
                        return Ok(Application::Forced(forced));
                    }
                    let body = substitute(&clause.body, &matches)?;
                    return Ok(Application::Reduced(wrap_lambda(
                        &clause.patterns,
                        args,
                        body,
                    )));
                }
                Err(error) => errors.push(error),
            }
        }
    }
    Err(EvalError::NoMatchingFunction { name: name.to_string(), errors })
}

/// Closes over the unconsumed part of a clause application: the body when
/// arities agree, a lambda over the remaining patterns, or an application
/// to the remaining arguments.
fn wrap_lambda(patterns: &[RawBinding], args: &[RawExpr], body: RawExpr) -> RawExpr {
    use std::cmp::Ordering;
    match patterns.len().cmp(&args.len()) {
        Ordering::Equal => body,
        Ordering::Greater => Expr::lambda(patterns[args.len()..].to_vec(), body),
        Ordering::Less => Expr::app(body, args[patterns.len()..].to_vec()),
    }
}

/// Matches a clause's patterns against the arguments pairwise, forcing
/// each argument only as far as its pattern demands.
///
/// On success, returns the (possibly forced) arguments together with the
/// pattern-variable substitutions; the forced forms only become visible if
/// the clause fires.
pub(crate) fn match_all(
    env: &EvalEnv,
    patterns: &[RawBinding],
    args: &[RawExpr],
) -> Result<(Vec<RawExpr>, Matches), MatchingError> {
    let mut forced = args.to_vec();
    let mut matches = Matches::default();
    for (i, pattern) in patterns.iter().enumerate().take(args.len()) {
        let arg = eval_to_binding(env, &forced[i], pattern);
        let found = match_binding(pattern, &arg)?;
        forced[i] = arg;
        matches.extend(found);
    }
    Ok((forced, matches))
}

/// Forces an expression just far enough to expose the constructor a
/// pattern demands, recursing only along the pattern's shape.
///
/// Reduction errors are swallowed as "no further progress": the caller
/// observes them as a strictness or mismatch failure from the match.
#[must_use]
pub fn eval_to_binding(env: &EvalEnv, expr: &RawExpr, binding: &RawBinding) -> RawExpr {
    match binding {
        // A name takes the expression as-is.
        Binding::Lit { atom: Atom::Name(_), .. } => expr.clone(),
        Binding::Lit { .. } => force_top(env, expr, &is_whnf),
        Binding::ConsLit { head, tail, .. } => {
            let forced = force_top(env, expr, &is_cons_like);
            match forced {
                // Reshape a non-empty list literal into a cons cell so the
                // pattern can take it apart.
                Expr::List { items, .. } if !items.is_empty() => {
                    let mut items = items;
                    let first = items.remove(0);
                    Expr::binary(
                        Op::Colon,
                        eval_to_binding(env, &first, head),
                        eval_to_binding(env, &Expr::list(items), tail),
                    )
                }
                Expr::Binary { meta, op, lhs, rhs } if op.op == Op::Colon => Expr::Binary {
                    meta,
                    op,
                    lhs: Box::new(eval_to_binding(env, &lhs, head)),
                    rhs: Box::new(eval_to_binding(env, &rhs, tail)),
                },
                other => other,
            }
        }
        Binding::ListLit { items: patterns, .. } => {
            let forced = force_top(env, expr, &|e| matches!(e, Expr::List { .. }));
            match forced {
                Expr::List { meta, items } if items.len() == patterns.len() => Expr::List {
                    meta,
                    items: items
                        .into_iter()
                        .zip(patterns)
                        .map(|(item, p)| eval_to_binding(env, &item, p))
                        .collect(),
                },
                other => other,
            }
        }
        Binding::NTupleLit { items: patterns, .. } => {
            let forced = force_top(env, expr, &|e| matches!(e, Expr::NTuple { .. }));
            match forced {
                Expr::NTuple { meta, items } if items.len() == patterns.len() => Expr::NTuple {
                    meta,
                    items: items
                        .into_iter()
                        .zip(patterns)
                        .map(|(item, p)| eval_to_binding(env, &item, p))
                        .collect(),
                },
                other => other,
            }
        }
        Binding::ConstrLit { pattern, .. } => match pattern {
            redex_ast::ConstrPattern::Prefix { name, args } => {
                let forced = force_top(env, expr, &is_constr_headed);
                match forced {
                    Expr::App { meta, func, args: actual }
                        if constr_named(&func, name) && actual.len() == args.len() =>
                    {
                        Expr::App {
                            meta,
                            func,
                            args: actual
                                .into_iter()
                                .zip(args)
                                .map(|(item, p)| eval_to_binding(env, &item, p))
                                .collect(),
                        }
                    }
                    other => other,
                }
            }
            redex_ast::ConstrPattern::Infix { symbol, lhs, rhs } => {
                let forced = force_top(env, expr, &|e| {
                    matches!(e, Expr::Binary { op, .. }
                        if matches!(&op.op, Op::InfixConstr(s) if s == symbol))
                });
                match forced {
                    Expr::Binary { meta, op, lhs: el, rhs: er }
                        if matches!(&op.op, Op::InfixConstr(s) if s == symbol) =>
                    {
                        Expr::Binary {
                            meta,
                            op,
                            lhs: Box::new(eval_to_binding(env, &el, lhs)),
                            rhs: Box::new(eval_to_binding(env, &er, rhs)),
                        }
                    }
                    other => other,
                }
            }
        },
    }
}

fn is_cons_like(expr: &RawExpr) -> bool {
    matches!(expr, Expr::List { .. })
        || matches!(expr, Expr::Binary { op, .. } if op.op == Op::Colon)
}

fn is_constr_headed(expr: &RawExpr) -> bool {
    matches!(expr, Expr::Atom { atom: Atom::Constr(_), .. })
        || matches!(expr, Expr::App { func, .. }
            if matches!(func.as_ref(), Expr::Atom { atom: Atom::Constr(_), .. }))
}

fn constr_named(expr: &RawExpr, name: &str) -> bool {
    matches!(expr, Expr::Atom { atom: Atom::Constr(c), .. } if c == name)
}

/// Reduces the root of an expression until `done` holds, a fixpoint is
/// reached, or reduction fails.
fn force_top(env: &EvalEnv, expr: &RawExpr, done: &dyn Fn(&RawExpr) -> bool) -> RawExpr {
    let mut current = expr.clone();
    loop {
        if done(&current) {
            return current;
        }
        match eval1(env, &current) {
            Ok(next) if next != current => current = next,
            _ => return current,
        }
    }
}

/// Rejects duplicate names across a binder group, the same overlap error
/// the inferencer raises.
fn check_binder_overlap(bindings: &[(RawBinding, RawExpr)]) -> Result<(), EvalError> {
    let mut names = Vec::new();
    for (binding, _) in bindings {
        binding.collect_names(&mut names);
    }
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(EvalError::conflicting_definitions(&name));
        }
    }
    Ok(())
}

/// One step of a let-expression: force and match every binder, then
/// substitute the bound names into the body. Forcing that leaves a match
/// still undecided is itself the visible step; a definite mismatch fails
/// immediately.
fn eval_let(
    env: &EvalEnv,
    whole: &RawExpr,
    bindings: &[(RawBinding, RawExpr)],
    body: &RawExpr,
) -> Result<RawExpr, EvalError> {
    check_binder_overlap(bindings)?;
    let mut map = Matches::default();
    let mut rebuilt: Vec<(RawBinding, RawExpr)> = Vec::with_capacity(bindings.len());
    let mut changed = false;
    for (index, (binding, rhs)) in bindings.iter().enumerate() {
        // Names bound earlier in the group are visible here.
        let scoped = substitute(rhs, &map)?;
        let forced = eval_to_binding(env, &scoped, binding);
        if forced != *rhs {
            changed = true;
        }
        match match_binding(binding, &forced) {
            Ok(found) => map.extend(found),
            Err(MatchingError::Strictness { .. }) if changed => {
                rebuilt.push((binding.clone(), forced));
                rebuilt.extend(bindings[index + 1..].iter().cloned());
                return Ok(Expr::let_expr(rebuilt, body.clone()));
            }
            Err(_) => return Err(EvalError::cannot_evaluate(whole)),
        }
        rebuilt.push((binding.clone(), forced));
    }
    if changed {
        return Ok(Expr::let_expr(rebuilt, body.clone()));
    }
    substitute(body, &map)
}

/// One step of a list comprehension, following the classical lazy
/// translation one qualifier at a time.
fn eval_list_comp(
    env: &EvalEnv,
    whole: &RawExpr,
    head: &RawExpr,
    quals: &[Qual<()>],
) -> Result<RawExpr, EvalError> {
    let Some((first, rest)) = quals.split_first() else {
        return Ok(Expr::list(vec![head.clone()]));
    };
    match first {
        Qual::Guard { expr: cond, .. } => match cond {
            Expr::Atom { atom: Atom::Bool(true), .. } => {
                Ok(Expr::list_comp(head.clone(), rest.to_vec()))
            }
            Expr::Atom { atom: Atom::Bool(false), .. } => Ok(Expr::list(Vec::new())),
            _ => {
                // Force the guard one step in place.
                let next = eval1(env, cond)?;
                let mut quals = rest.to_vec();
                quals.insert(0, Qual::Guard { meta: (), expr: next });
                Ok(Expr::list_comp(head.clone(), quals))
            }
        },
        Qual::Let { binding, expr: rhs, .. } => {
            let forced = eval_to_binding(env, rhs, binding);
            match match_binding(binding, &forced) {
                Ok(found) => {
                    let remainder = Expr::list_comp(head.clone(), rest.to_vec());
                    substitute(&remainder, &found)
                }
                Err(MatchingError::Strictness { .. }) if forced != *rhs => {
                    let mut quals = rest.to_vec();
                    quals.insert(0, Qual::Let { meta: (), binding: binding.clone(), expr: forced });
                    Ok(Expr::list_comp(head.clone(), quals))
                }
                Err(_) => Err(EvalError::cannot_evaluate(whole)),
            }
        }
        Qual::Gen { binding, expr: source, .. } => {
            let forced = force_top(env, source, &is_cons_like);
            let (element, remaining) = match &forced {
                Expr::List { items, .. } if items.is_empty() => {
                    return Ok(Expr::list(Vec::new()));
                }
                Expr::List { items, .. } => {
                    (items[0].clone(), Expr::list(items[1..].to_vec()))
                }
                Expr::Binary { op, lhs, rhs, .. } if op.op == Op::Colon => {
                    (lhs.as_ref().clone(), rhs.as_ref().clone())
                }
                _ if forced != *source => {
                    let mut quals = rest.to_vec();
                    quals.insert(
                        0,
                        Qual::Gen { meta: (), binding: binding.clone(), expr: forced },
                    );
                    return Ok(Expr::list_comp(head.clone(), quals));
                }
                _ => return Err(EvalError::cannot_evaluate(whole)),
            };
            let mut again = rest.to_vec();
            again.insert(0, Qual::Gen { meta: (), binding: binding.clone(), expr: remaining });
            let again = Expr::list_comp(head.clone(), again);
            let element = eval_to_binding(env, &element, binding);
            match match_binding(binding, &element) {
                Ok(found) => {
                    let taken =
                        substitute(&Expr::list_comp(head.clone(), rest.to_vec()), &found)?;
                    Ok(Expr::binary(Op::Append, taken, again))
                }
                // The pattern rejects this element: skip it.
                Err(MatchingError::Mismatch { .. }) => Ok(again),
                Err(_) => Err(EvalError::cannot_evaluate(whole)),
            }
        }
    }
}

/// Reduces an expression to a fixpoint of [`step`] at the root.
///
/// The root is reduced as far as it goes; when it blocks, the sub-position
/// that can unblock it is normalised and the root retried. Divergent
/// programs are the caller's risk: no step limit is imposed here.
#[must_use]
pub fn eval_all(env: &EvalEnv, expr: &RawExpr) -> RawExpr {
    let mut current = expr.clone();
    loop {
        while let Ok(next) = eval1(env, &current) {
            if next == current {
                break;
            }
            current = next;
        }
        match descend(env, &current) {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Normalises the first blocking sub-position that makes progress.
///
/// Positions follow demand: conditionals need only their condition,
/// boolean operators see their left operand first (preserving
/// short-circuits), function values are never entered.
fn descend(env: &EvalEnv, expr: &RawExpr) -> Option<RawExpr> {
    for token in descend_positions(expr) {
        let mut out = expr.clone();
        let Ok(child) = navigate(&mut out, token) else { continue };
        let normalised = eval_all(env, &child.clone());
        if normalised != *child {
            *child = normalised;
            return Some(out);
        }
    }
    None
}

fn descend_positions(expr: &RawExpr) -> Vec<PathStep> {
    match expr {
        Expr::Binary { .. } => vec![PathStep::Fst, PathStep::Snd],
        Expr::Unary { .. } => vec![PathStep::Fst],
        Expr::IfExpr { .. } => vec![PathStep::Fst],
        Expr::App { func, args, .. } => {
            let mut out = Vec::with_capacity(args.len() + 1);
            // A name in head position is resolved by application, not by
            // rewriting it into its own lambda.
            if !matches!(func.as_ref(), Expr::Atom { .. }) {
                out.push(PathStep::Fst);
            }
            out.extend((0..args.len()).map(PathStep::Nth));
            out
        }
        Expr::List { items, .. } | Expr::NTuple { items, .. } => {
            (0..items.len()).map(PathStep::Nth).collect()
        }
        Expr::ArithmSeq { step, end, .. } => {
            let mut out = vec![PathStep::Fst];
            if step.is_some() {
                out.push(PathStep::Snd);
            }
            if end.is_some() {
                out.push(PathStep::Thrd);
            }
            out
        }
        Expr::LetExpr { bindings, .. } => (0..bindings.len()).map(PathStep::Nth).collect(),
        Expr::ListComp { quals, .. } => (0..quals.len()).map(PathStep::Nth).collect(),
        Expr::Atom { .. }
        | Expr::Lambda { .. }
        | Expr::SectL { .. }
        | Expr::SectR { .. }
        | Expr::PrefixOp { .. } => Vec::new(),
    }
}

/// The binary primitive table.
fn binary(env: &EvalEnv, op: &Op, lhs: &RawExpr, rhs: &RawExpr) -> Result<RawExpr, EvalError> {
    let error = || EvalError::BinaryOpError {
        op: op.clone(),
        lhs: Box::new(lhs.clone()),
        rhs: Box::new(rhs.clone()),
    };
    match op {
        Op::Power => match (as_int(lhs), as_int(rhs)) {
            // replicate-and-product semantics: a non-positive exponent
            // multiplies no factors, so the result is 1.
            (Some(base), Some(exp)) => {
                let mut product: i64 = 1;
                for _ in 0..exp.max(0) {
                    product = product.wrapping_mul(base);
                }
                Ok(Expr::int(product))
            }
            _ => Err(error()),
        },
        Op::Mul => int_op(lhs, rhs, i64::wrapping_mul).ok_or_else(error),
        Op::Add => int_op(lhs, rhs, i64::wrapping_add).ok_or_else(error),
        Op::Sub => int_op(lhs, rhs, i64::wrapping_sub).ok_or_else(error),
        Op::Colon => match rhs {
            Expr::List { items, .. } => {
                let mut out = Vec::with_capacity(items.len() + 1);
                out.push(lhs.clone());
                out.extend(items.iter().cloned());
                Ok(Expr::list(out))
            }
            _ => Err(error()),
        },
        Op::Append => match (lhs, rhs) {
            (Expr::List { items: left, .. }, Expr::List { items: right, .. }) => {
                let mut out = left.clone();
                out.extend(right.iter().cloned());
                Ok(Expr::list(out))
            }
            _ => Err(error()),
        },
        Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => {
            comparison(op, lhs, rhs).ok_or_else(error)
        }
        Op::And => match (as_bool(lhs), as_bool(rhs)) {
            // False absorbs from either side without looking at the other
            // operand.
            (Some(false), _) | (_, Some(false)) => Ok(Expr::bool(false)),
            (Some(true), Some(true)) => Ok(Expr::bool(true)),
            _ => Err(error()),
        },
        Op::Or => match (as_bool(lhs), as_bool(rhs)) {
            (Some(true), _) | (_, Some(true)) => Ok(Expr::bool(true)),
            (Some(false), Some(false)) => Ok(Expr::bool(false)),
            _ => Err(error()),
        },
        Op::Dollar => Ok(Expr::app(lhs.clone(), vec![rhs.clone()])),
        Op::InfixFunc(name) => apply(env, name, &[lhs.clone(), rhs.clone()]),
        // Composition reduces only under application; an infix constructor
        // cell is data.
        Op::Composition | Op::InfixConstr(_) => Err(error()),
    }
}

fn as_int(expr: &RawExpr) -> Option<i64> {
    match expr {
        Expr::Atom { atom: Atom::Int(i), .. } => Some(*i),
        _ => None,
    }
}

fn as_bool(expr: &RawExpr) -> Option<bool> {
    match expr {
        Expr::Atom { atom: Atom::Bool(b), .. } => Some(*b),
        _ => None,
    }
}

fn int_op(lhs: &RawExpr, rhs: &RawExpr, op: fn(i64, i64) -> i64) -> Option<RawExpr> {
    Some(Expr::int(op(as_int(lhs)?, as_int(rhs)?)))
}

/// Pointwise comparison of two atoms of the same base type.
fn comparison(op: &Op, lhs: &RawExpr, rhs: &RawExpr) -> Option<RawExpr> {
    let (a, b) = match (lhs, rhs) {
        (Expr::Atom { atom: a, .. }, Expr::Atom { atom: b, .. }) => (a, b),
        _ => return None,
    };
    let comparable = matches!(
        (a, b),
        (Atom::Int(_), Atom::Int(_)) | (Atom::Bool(_), Atom::Bool(_)) | (Atom::Char(_), Atom::Char(_))
    );
    if !comparable {
        return None;
    }
    let result = match op {
        Op::Equ => a == b,
        Op::Neq => a != b,
        Op::Lt => a < b,
        Op::Leq => a <= b,
        Op::Gt => a > b,
        Op::Geq => a >= b,
        _ => return None,
    };
    Some(Expr::bool(result))
}

/// The unary primitive table: only integer negation is defined.
fn unary(op: &Op, operand: &RawExpr) -> Result<RawExpr, EvalError> {
    match (op, as_int(operand)) {
        (Op::Sub, Some(i)) => Ok(Expr::int(i.wrapping_neg())),
        _ => Err(EvalError::UnaryOpError { op: op.clone(), expr: Box::new(operand.clone()) }),
    }
}
