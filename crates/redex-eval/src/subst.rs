//! Capture-avoiding substitution of matched expressions into clause bodies.

use redex_ast::{Atom, Expr, Qual, RawExpr};
use rustc_hash::FxHashSet;

use crate::error::EvalError;
use crate::matching::Matches;

/// The free variables of an expression: names occurring in name atoms that
/// are not bound by an enclosing lambda, let binder, or qualifier.
#[must_use]
pub fn free_variables(expr: &RawExpr) -> FxHashSet<String> {
    let mut free = FxHashSet::default();
    collect_free(expr, &mut Vec::new(), &mut free);
    free
}

fn collect_free(expr: &RawExpr, bound: &mut Vec<String>, free: &mut FxHashSet<String>) {
    match expr {
        Expr::Atom { atom: Atom::Name(n), .. } => {
            if n != "_" && !bound.iter().any(|b| b == n) {
                let _ = free.insert(n.clone());
            }
        }
        Expr::Lambda { params, body, .. } => {
            let depth = bound.len();
            for p in params {
                p.collect_names(bound);
            }
            collect_free(body, bound, free);
            bound.truncate(depth);
        }
        Expr::LetExpr { bindings, body, .. } => {
            // Let-bound names scope over every right-hand side and the body.
            let depth = bound.len();
            for (b, _) in bindings {
                b.collect_names(bound);
            }
            for (_, rhs) in bindings {
                collect_free(rhs, bound, free);
            }
            collect_free(body, bound, free);
            bound.truncate(depth);
        }
        Expr::ListComp { head, quals, .. } => {
            let depth = bound.len();
            for q in quals {
                match q {
                    Qual::Gen { binding, expr, .. } | Qual::Let { binding, expr, .. } => {
                        collect_free(expr, bound, free);
                        binding.collect_names(bound);
                    }
                    Qual::Guard { expr, .. } => collect_free(expr, bound, free),
                }
            }
            collect_free(head, bound, free);
            bound.truncate(depth);
        }
        _ => {
            for child in expr.children() {
                collect_free(child, bound, free);
            }
        }
    }
}

/// Substitutes matched expressions for pattern variables throughout `expr`.
///
/// The map is restricted at every binder, and a binder whose names occur
/// free in any remaining substituted value raises
/// [`EvalError::NameCaptureError`].
pub fn substitute(expr: &RawExpr, map: &Matches) -> Result<RawExpr, EvalError> {
    if map.is_empty() {
        return Ok(expr.clone());
    }
    match expr {
        Expr::Atom { atom: Atom::Name(n), .. } => {
            Ok(map.get(n).cloned().unwrap_or_else(|| expr.clone()))
        }
        Expr::Atom { .. } | Expr::PrefixOp { .. } => Ok(expr.clone()),
        Expr::List { items, .. } => Ok(Expr::list(substitute_all(items, map)?)),
        Expr::NTuple { items, .. } => Ok(Expr::ntuple(substitute_all(items, map)?)),
        Expr::Binary { op, lhs, rhs, .. } => Ok(Expr::binary(
            op.op.clone(),
            substitute(lhs, map)?,
            substitute(rhs, map)?,
        )),
        Expr::Unary { op, expr: e, .. } => Ok(Expr::unary(op.op.clone(), substitute(e, map)?)),
        Expr::SectL { expr: e, op, .. } => Ok(Expr::sect_l(substitute(e, map)?, op.op.clone())),
        Expr::SectR { op, expr: e, .. } => Ok(Expr::sect_r(op.op.clone(), substitute(e, map)?)),
        Expr::IfExpr { cond, then_branch, else_branch, .. } => Ok(Expr::if_expr(
            substitute(cond, map)?,
            substitute(then_branch, map)?,
            substitute(else_branch, map)?,
        )),
        Expr::ArithmSeq { start, step, end, .. } => Ok(Expr::arithm_seq(
            substitute(start, map)?,
            step.as_deref().map(|e| substitute(e, map)).transpose()?,
            end.as_deref().map(|e| substitute(e, map)).transpose()?,
        )),
        Expr::App { func, args, .. } => {
            Ok(Expr::app(substitute(func, map)?, substitute_all(args, map)?))
        }
        Expr::Lambda { params, body, .. } => {
            let mut names = Vec::new();
            for p in params {
                p.collect_names(&mut names);
            }
            let inner = restrict(map, &names);
            check_capture(&inner, &names)?;
            Ok(Expr::lambda(params.clone(), substitute(body, &inner)?))
        }
        Expr::LetExpr { bindings, body, .. } => {
            let mut names = Vec::new();
            for (b, _) in bindings {
                b.collect_names(&mut names);
            }
            let inner = restrict(map, &names);
            check_capture(&inner, &names)?;
            let bindings = bindings
                .iter()
                .map(|(b, rhs)| Ok((b.clone(), substitute(rhs, &inner)?)))
                .collect::<Result<Vec<_>, EvalError>>()?;
            Ok(Expr::let_expr(bindings, substitute(body, &inner)?))
        }
        Expr::ListComp { head, quals, .. } => {
            // Qualifiers scope left to right: each binder shadows the map
            // for everything after it.
            let mut current = map.clone();
            let mut out = Vec::with_capacity(quals.len());
            for q in quals {
                match q {
                    Qual::Gen { binding, expr: e, .. } => {
                        let e = substitute(e, &current)?;
                        let names = binding.bound_names();
                        current = restrict(&current, &names);
                        check_capture(&current, &names)?;
                        out.push(Qual::Gen { meta: (), binding: binding.clone(), expr: e });
                    }
                    Qual::Let { binding, expr: e, .. } => {
                        let e = substitute(e, &current)?;
                        let names = binding.bound_names();
                        current = restrict(&current, &names);
                        check_capture(&current, &names)?;
                        out.push(Qual::Let { meta: (), binding: binding.clone(), expr: e });
                    }
                    Qual::Guard { expr: e, .. } => {
                        out.push(Qual::Guard { meta: (), expr: substitute(e, &current)? });
                    }
                }
            }
            Ok(Expr::list_comp(substitute(head, &current)?, out))
        }
    }
}

fn substitute_all(exprs: &[RawExpr], map: &Matches) -> Result<Vec<RawExpr>, EvalError> {
    exprs.iter().map(|e| substitute(e, map)).collect()
}

fn restrict(map: &Matches, names: &[String]) -> Matches {
    map.iter()
        .filter(|(k, _)| !names.contains(*k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn check_capture(map: &Matches, bound: &[String]) -> Result<(), EvalError> {
    if map.is_empty() || bound.is_empty() {
        return Ok(());
    }
    let mut free = FxHashSet::default();
    for value in map.values() {
        free.extend(free_variables(value));
    }
    let mut captured: Vec<String> =
        bound.iter().filter(|n| free.contains(*n)).cloned().collect();
    if captured.is_empty() {
        Ok(())
    } else {
        captured.sort();
        captured.dedup();
        Err(EvalError::NameCaptureError { names: captured })
    }
}
