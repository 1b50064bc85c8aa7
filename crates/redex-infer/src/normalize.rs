//! Canonical renaming of type variables.
//!
//! Before a type, scheme, error, or typed tree leaves the inferencer, its
//! type variables are renamed to `a, b, …, z, aa, ab, …` in
//! first-appearance order, giving stable and readable diagnostics.

use redex_ast::{Scheme, Type, TypeError, TypedExpr};
use rustc_hash::FxHashMap;

/// The canonical name of the `n`-th distinct variable: a bijective base-26
/// spelling over `a..z`.
fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + u8::try_from(n % 26).unwrap_or(0));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A renaming dictionary keyed by first appearance.
#[derive(Debug, Default)]
struct Renamer {
    map: FxHashMap<String, String>,
    next: usize,
}

impl Renamer {
    fn rename(&mut self, var: &str) -> String {
        if let Some(known) = self.map.get(var) {
            return known.clone();
        }
        let fresh = letters(self.next);
        self.next += 1;
        let _ = self.map.insert(var.to_string(), fresh.clone());
        fresh
    }

    fn rename_type(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => Type::Var(self.rename(v)),
            Type::Con(_) | Type::Unknown => ty.clone(),
            Type::Arr(l, r) => {
                let l = self.rename_type(l);
                Type::Arr(Box::new(l), Box::new(self.rename_type(r)))
            }
            Type::List(t) => Type::List(Box::new(self.rename_type(t))),
            Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| self.rename_type(t)).collect()),
            Type::Adt(name, ts) => {
                Type::Adt(name.clone(), ts.iter().map(|t| self.rename_type(t)).collect())
            }
            Type::Error(err) => Type::Error(Box::new(self.rename_error(err))),
        }
    }

    fn rename_error(&mut self, err: &TypeError) -> TypeError {
        match err {
            TypeError::UnificationFail(a, b) => {
                let a = self.rename_type(a);
                TypeError::UnificationFail(Box::new(a), Box::new(self.rename_type(b)))
            }
            TypeError::InfiniteType { var, ty } => TypeError::InfiniteType {
                var: self.rename(var),
                ty: Box::new(self.rename_type(ty)),
            },
            TypeError::NoInstanceOfEnum(ty) => {
                TypeError::NoInstanceOfEnum(Box::new(self.rename_type(ty)))
            }
            TypeError::PatternMismatch { pattern, ty } => TypeError::PatternMismatch {
                pattern: pattern.clone(),
                ty: Box::new(self.rename_type(ty)),
            },
            TypeError::UnboundVariable(_)
            | TypeError::UnknownDataConstructor(_)
            | TypeError::UnknownError(_) => err.clone(),
        }
    }
}

/// Canonically renames the variables of a type.
#[must_use]
pub fn normalize_type(ty: &Type) -> Type { Renamer::default().rename_type(ty) }

/// Canonically renames a scheme; quantified variables keep their positions
/// in the quantifier but take their canonical names.
#[must_use]
pub fn normalize_scheme(scheme: &Scheme) -> Scheme {
    let mut renamer = Renamer::default();
    let ty = renamer.rename_type(&scheme.ty);
    let vars = scheme.vars.iter().map(|v| renamer.rename(v)).collect();
    Scheme { vars, ty }
}

/// Canonically renames the variables embedded in a type error.
#[must_use]
pub fn normalize_type_error(err: &TypeError) -> TypeError {
    Renamer::default().rename_error(err)
}

/// Canonically renames every type slot of a typed tree with one shared
/// dictionary, so the same variable reads the same everywhere.
#[must_use]
pub fn normalize_typed_expr(expr: TypedExpr) -> TypedExpr {
    let mut renamer = Renamer::default();
    expr.map_meta(&mut |m| m.map(|ty| renamer.rename_type(&ty)))
}
