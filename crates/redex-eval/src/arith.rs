//! Lazy unfolding of arithmetic sequences.
//!
//! One unfold step turns `[x..]`, `[x..z]`, `[x,y..]`, or `[x,y..z]` into
//! either a cons cell whose tail is the remaining sequence or a terminating
//! list literal. Only the closed set of enumerable base types takes part:
//! `Int`, `Bool`, and `Char`.

use redex_ast::{Atom, Expr, Op, RawExpr};

use crate::error::EvalError;

/// The enumerable base type of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumKind {
    Int,
    Bool,
    Char,
}

fn kind_of(atom: &Atom) -> Option<EnumKind> {
    match atom {
        Atom::Int(_) => Some(EnumKind::Int),
        Atom::Bool(_) => Some(EnumKind::Bool),
        Atom::Char(_) => Some(EnumKind::Char),
        Atom::Name(_) | Atom::Constr(_) => None,
    }
}

/// The position of an atom in its type's enumeration order. `i128` leaves
/// room for stride arithmetic beyond the `i64` bounds.
fn ordinal(atom: &Atom) -> i128 {
    match atom {
        Atom::Int(i) => i128::from(*i),
        Atom::Bool(b) => i128::from(*b),
        Atom::Char(c) => i128::from(u32::from(*c)),
        Atom::Name(_) | Atom::Constr(_) => 0,
    }
}

const fn bounds(kind: EnumKind) -> (i128, i128) {
    match kind {
        EnumKind::Int => (i64::MIN as i128, i64::MAX as i128),
        EnumKind::Bool => (0, 1),
        EnumKind::Char => (0, char::MAX as u32 as i128),
    }
}

/// Rebuilds an atom from an ordinal. Out-of-bounds ordinals and code points
/// that are not Unicode scalar values yield `None` and terminate the
/// enumeration.
fn from_ordinal(kind: EnumKind, n: i128) -> Option<Atom> {
    let (lo, hi) = bounds(kind);
    if n < lo || n > hi {
        return None;
    }
    match kind {
        EnumKind::Int => Some(Atom::Int(n as i64)),
        EnumKind::Bool => Some(Atom::Bool(n == 1)),
        EnumKind::Char => u32::try_from(n).ok().and_then(char::from_u32).map(Atom::Char),
    }
}

/// The successor of an atom within its type, skipping the surrogate gap
/// for characters.
fn succ(kind: EnumKind, atom: &Atom) -> Option<Atom> {
    let mut n = ordinal(atom) + 1;
    if kind == EnumKind::Char && from_ordinal(kind, n).is_none() && n <= bounds(kind).1 {
        n = 0xE000;
    }
    from_ordinal(kind, n)
}

fn cons(head: Atom, tail: RawExpr) -> RawExpr {
    Expr::binary(Op::Colon, Expr::atom(head), tail)
}

fn seq(start: Atom, step: Option<Atom>, end: Option<Atom>) -> RawExpr {
    Expr::arithm_seq(Expr::atom(start), step.map(Expr::atom), end.map(Expr::atom))
}

/// Performs one unfold step of an arithmetic sequence whose seeds are
/// already atoms.
///
/// Non-atom seeds are `CannotEvaluate` (reduce them first); seeds of
/// mismatched or non-enumerable kinds are `EvalFailure`.
pub(crate) fn unfold(
    whole: &RawExpr,
    start: &RawExpr,
    step: Option<&RawExpr>,
    end: Option<&RawExpr>,
) -> Result<RawExpr, EvalError> {
    let Some(x) = as_atom(start) else {
        return Err(EvalError::cannot_evaluate(whole));
    };
    let Some(kind) = kind_of(x) else {
        return Err(EvalError::EvalFailure(Box::new(whole.clone())));
    };
    let step = match step {
        None => None,
        Some(e) => match as_atom(e) {
            Some(a) if kind_of(a) == Some(kind) => Some(a),
            Some(_) => return Err(EvalError::EvalFailure(Box::new(whole.clone()))),
            None => return Err(EvalError::cannot_evaluate(whole)),
        },
    };
    let end = match end {
        None => None,
        Some(e) => match as_atom(e) {
            Some(a) if kind_of(a) == Some(kind) => Some(a),
            Some(_) => return Err(EvalError::EvalFailure(Box::new(whole.clone()))),
            None => return Err(EvalError::cannot_evaluate(whole)),
        },
    };
    Ok(match (step, end) {
        (None, None) => unfold_from(kind, x),
        (None, Some(z)) => unfold_from_to(kind, x, z),
        (Some(y), None) => unfold_from_then(kind, x, y),
        (Some(y), Some(z)) => unfold_from_then_to(kind, x, y, z),
    })
}

fn as_atom(expr: &RawExpr) -> Option<&Atom> {
    match expr {
        Expr::Atom { atom, .. } => Some(atom),
        _ => None,
    }
}

/// `[x..]`: count upward by one, stopping at the top of the type.
fn unfold_from(kind: EnumKind, x: &Atom) -> RawExpr {
    match succ(kind, x) {
        Some(next) => cons(x.clone(), seq(next, None, None)),
        None => Expr::list(vec![Expr::atom(x.clone())]),
    }
}

/// `[x..z]`: count upward by one, stopping at `z` (empty when `x > z`).
fn unfold_from_to(kind: EnumKind, x: &Atom, z: &Atom) -> RawExpr {
    if ordinal(x) > ordinal(z) {
        return Expr::list(Vec::new());
    }
    if ordinal(x) == ordinal(z) {
        return Expr::list(vec![Expr::atom(x.clone())]);
    }
    match succ(kind, x) {
        Some(next) => cons(x.clone(), seq(next, None, Some(z.clone()))),
        None => Expr::list(vec![Expr::atom(x.clone())]),
    }
}

/// `[x,y..]`: stride `y - x`, stopping past the top (or bottom) of the
/// type. A zero stride emits `[x]` and terminates.
fn unfold_from_then(kind: EnumKind, x: &Atom, y: &Atom) -> RawExpr {
    let stride = ordinal(y) - ordinal(x);
    if stride == 0 {
        return Expr::list(vec![Expr::atom(x.clone())]);
    }
    match from_ordinal(kind, ordinal(y) + stride) {
        Some(after) => cons(x.clone(), seq(y.clone(), Some(after), None)),
        None => cons(x.clone(), Expr::list(vec![Expr::atom(y.clone())])),
    }
}

/// `[x,y..z]`: stride `y - x`, stopping at or past `z` in the stride's
/// direction.
fn unfold_from_then_to(kind: EnumKind, x: &Atom, y: &Atom, z: &Atom) -> RawExpr {
    let stride = ordinal(y) - ordinal(x);
    if stride == 0 {
        return Expr::list(vec![Expr::atom(x.clone())]);
    }
    let past = |n: i128| if stride > 0 { n > ordinal(z) } else { n < ordinal(z) };
    if past(ordinal(x)) {
        return Expr::list(Vec::new());
    }
    if past(ordinal(y)) {
        return Expr::list(vec![Expr::atom(x.clone())]);
    }
    match from_ordinal(kind, ordinal(y) + stride) {
        Some(after) => cons(x.clone(), seq(y.clone(), Some(after), Some(z.clone()))),
        None => cons(x.clone(), Expr::list(vec![Expr::atom(y.clone())])),
    }
}
