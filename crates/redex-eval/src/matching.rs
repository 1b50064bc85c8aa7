//! Matching expressions against binding patterns.

use redex_ast::{Atom, Binding, ConstrPattern, Expr, RawBinding, RawExpr};
use rustc_hash::FxHashMap;

use crate::error::MatchingError;

/// The substitutions a successful match produces: pattern variable name to
/// matched sub-expression.
pub type Matches = FxHashMap<String, RawExpr>;

/// Returns true if the expression is in weak head normal form: its
/// outermost constructor is data (atom literal, constructor cell, list,
/// tuple) or a function value, rather than a reducible form.
#[must_use]
pub fn is_whnf(expr: &RawExpr) -> bool {
    match expr {
        Expr::Atom { atom, .. } => !atom.is_name(),
        Expr::List { .. }
        | Expr::NTuple { .. }
        | Expr::Lambda { .. }
        | Expr::SectL { .. }
        | Expr::SectR { .. }
        | Expr::PrefixOp { .. } => true,
        Expr::Binary { op, .. } => op.op.is_constructor(),
        Expr::App { func, .. } => {
            matches!(func.as_ref(), Expr::Atom { atom: Atom::Constr(_), .. })
        }
        Expr::Unary { .. }
        | Expr::IfExpr { .. }
        | Expr::ArithmSeq { .. }
        | Expr::LetExpr { .. }
        | Expr::ListComp { .. } => false,
    }
}

/// Matches `expr` against `binding`.
///
/// On success, returns the pattern-variable substitutions. A failure is a
/// [`MatchingError::Strictness`] when the expression is not yet in weak
/// head normal form (the caller may force it further and retry), and a
/// [`MatchingError::Mismatch`] when it is WHNF of the wrong shape.
pub fn match_binding(binding: &RawBinding, expr: &RawExpr) -> Result<Matches, MatchingError> {
    match (binding, expr) {
        // A name binds unconditionally; `_` binds nothing.
        (Binding::Lit { atom: Atom::Name(n), .. }, _) => {
            let mut found = Matches::default();
            if n != "_" {
                let _ = found.insert(n.clone(), expr.clone());
            }
            Ok(found)
        }
        (Binding::Lit { atom: a, .. }, Expr::Atom { atom: b, .. }) if a == b => {
            Ok(Matches::default())
        }
        (
            Binding::ConsLit { head, tail, .. },
            Expr::Binary { op, lhs, rhs, .. },
        ) if op.op == redex_ast::Op::Colon => {
            let mut found = match_binding(head, lhs)?;
            found.extend(match_binding(tail, rhs)?);
            Ok(found)
        }
        // A cons pattern also takes a non-empty list literal, seen as
        // `head : [rest…]`.
        (Binding::ConsLit { head, tail, .. }, Expr::List { items, .. })
            if !items.is_empty() =>
        {
            let mut found = match_binding(head, &items[0])?;
            found.extend(match_binding(tail, &Expr::list(items[1..].to_vec()))?);
            Ok(found)
        }
        (Binding::ListLit { items: pats, .. }, Expr::List { items, .. })
            if pats.len() == items.len() =>
        {
            match_pointwise(pats, items)
        }
        (Binding::NTupleLit { items: pats, .. }, Expr::NTuple { items, .. })
            if pats.len() == items.len() =>
        {
            match_pointwise(pats, items)
        }
        (
            Binding::ConstrLit { pattern: ConstrPattern::Prefix { name, args }, .. },
            Expr::Atom { atom: Atom::Constr(c), .. },
        ) if args.is_empty() && name == c => Ok(Matches::default()),
        (
            Binding::ConstrLit { pattern: ConstrPattern::Prefix { name, args }, .. },
            Expr::App { func, args: actual, .. },
        ) if constr_name(func) == Some(name.as_str()) && args.len() == actual.len() => {
            match_pointwise(args, actual)
        }
        (
            Binding::ConstrLit { pattern: ConstrPattern::Infix { symbol, lhs, rhs }, .. },
            Expr::Binary { op, lhs: el, rhs: er, .. },
        ) if matches!(&op.op, redex_ast::Op::InfixConstr(s) if s == symbol) => {
            let mut found = match_binding(lhs, el)?;
            found.extend(match_binding(rhs, er)?);
            Ok(found)
        }
        _ if is_whnf(expr) => Err(MatchingError::mismatch(binding, expr)),
        _ => Err(MatchingError::strictness(binding, expr)),
    }
}

fn match_pointwise(pats: &[RawBinding], exprs: &[RawExpr]) -> Result<Matches, MatchingError> {
    let mut found = Matches::default();
    for (p, e) in pats.iter().zip(exprs) {
        found.extend(match_binding(p, e)?);
    }
    Ok(found)
}

fn constr_name(expr: &RawExpr) -> Option<&str> {
    match expr {
        Expr::Atom { atom: Atom::Constr(c), .. } => Some(c),
        _ => None,
    }
}
