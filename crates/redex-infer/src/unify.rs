//! Unification and constraint solving.

use log::debug;
use redex_ast::{Type, TypeError};

use crate::constraint::Constraint;
use crate::subst::{Subst, Substitutable};

/// Unifies two types, producing the most general substitution that makes
/// them equal.
///
/// `Unknown` unifies with anything. Binding a variable to a type that
/// contains it fails the occurs check.
///
/// ## Errors
///
/// [`TypeError::UnificationFail`] on a structural mismatch,
/// [`TypeError::InfiniteType`] when the occurs check fires.
pub fn unify(t1: &Type, t2: &Type) -> Result<Subst, TypeError> {
    match (t1, t2) {
        (Type::Unknown, _) | (_, Type::Unknown) => Ok(Subst::empty()),
        (Type::Var(a), t) | (t, Type::Var(a)) => bind(a, t),
        (Type::Con(a), Type::Con(b)) if a == b => Ok(Subst::empty()),
        (Type::Arr(l1, r1), Type::Arr(l2, r2)) => {
            unify_all(&[(l1.as_ref().clone(), l2.as_ref().clone()), (r1.as_ref().clone(), r2.as_ref().clone())])
        }
        (Type::List(a), Type::List(b)) => unify(a, b),
        (Type::Tuple(ts1), Type::Tuple(ts2)) if ts1.len() == ts2.len() => {
            unify_all(&ts1.iter().cloned().zip(ts2.iter().cloned()).collect::<Vec<_>>())
        }
        (Type::Adt(n1, ts1), Type::Adt(n2, ts2)) if n1 == n2 && ts1.len() == ts2.len() => {
            unify_all(&ts1.iter().cloned().zip(ts2.iter().cloned()).collect::<Vec<_>>())
        }
        _ => Err(TypeError::UnificationFail(Box::new(t1.clone()), Box::new(t2.clone()))),
    }
}

/// Unifies a list of type pairs left to right, threading the substitution
/// through the remaining pairs.
fn unify_all(pairs: &[(Type, Type)]) -> Result<Subst, TypeError> {
    let mut subst = Subst::empty();
    for (a, b) in pairs {
        let step = unify(&a.apply(&subst), &b.apply(&subst))?;
        subst = step.compose(&subst);
    }
    Ok(subst)
}

fn bind(var: &str, ty: &Type) -> Result<Subst, TypeError> {
    if matches!(ty, Type::Var(v) if v == var) {
        return Ok(Subst::empty());
    }
    if ty.free_type_vars().contains(var) {
        return Err(TypeError::InfiniteType { var: var.to_string(), ty: Box::new(ty.clone()) });
    }
    Ok(Subst::singleton(var, ty.clone()))
}

/// Solves a constraint list in order, applying each newly produced
/// substitution to the remaining constraints before continuing.
/// Enumerability is checked once all equalities are solved.
///
/// ## Errors
///
/// The first unification failure, or [`TypeError::NoInstanceOfEnum`] for a
/// sequence over a non-enumerable type.
pub fn solve(constraints: &[Constraint]) -> Result<Subst, TypeError> {
    debug!("solving {} constraints", constraints.len());
    let mut subst = Subst::empty();
    for constraint in constraints {
        if let Constraint::Eq { lhs, rhs, origin } = constraint {
            let step = unify(&lhs.apply(&subst), &rhs.apply(&subst)).map_err(|err| {
                debug!("constraint from node {origin} failed: {err}");
                err
            })?;
            subst = step.compose(&subst);
        }
    }
    for constraint in constraints {
        if let Constraint::Enumerable { ty, .. } = constraint {
            let resolved = ty.apply(&subst);
            if !resolved.is_enumerable() {
                return Err(TypeError::NoInstanceOfEnum(Box::new(resolved)));
            }
        }
    }
    Ok(subst)
}
