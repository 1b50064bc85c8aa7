//! Type-variable substitutions.
//!
//! A [`Subst`] is a finite map from type-variable names to type terms.
//! [`Substitutable`] lifts application and free-variable collection
//! uniformly over every syntactic category that carries types: type terms,
//! schemes, environments, sequences, constraints, and decorated trees.

use redex_ast::{Binding, Expr, Qual, Scheme, Type};
use rustc_hash::{FxHashMap, FxHashSet};

/// A finite map from type-variable names to types.
///
/// Composition is left-biased: `s1.compose(&s2)` first applies `s2`, then
/// `s1`, and `s1` wins on colliding keys. The substitution produced by
/// unifying a single constraint is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subst(FxHashMap<String, Type>);

impl Subst {
    /// The empty substitution.
    #[must_use]
    pub fn empty() -> Self { Self::default() }

    /// A substitution binding a single variable.
    #[must_use]
    pub fn singleton(var: impl Into<String>, ty: Type) -> Self {
        let mut map = FxHashMap::default();
        let _ = map.insert(var.into(), ty);
        Self(map)
    }

    /// The type a variable is bound to, if any.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Type> { self.0.get(var) }

    /// Returns true if no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// The number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// `self ∘ other`: applies `self` throughout `other`'s range, then
    /// unions with `self`, so that for every type `t`
    /// `compose(s1, s2).apply(t) == s1.apply(s2.apply(t))`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let mut map = self.0.clone();
        for (k, v) in &other.0 {
            let _ = map.insert(k.clone(), v.apply(self));
        }
        Self(map)
    }

    /// This substitution with the given variables unbound (used to respect
    /// a scheme's quantifier).
    #[must_use]
    pub fn without(&self, vars: &[String]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| !vars.contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Type)> for Subst {
    fn from_iter<I: IntoIterator<Item = (String, Type)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Applying a substitution and collecting free type variables, lifted over
/// a syntactic category.
pub trait Substitutable {
    /// Applies the substitution throughout, returning the rewritten value.
    #[must_use]
    fn apply(&self, subst: &Subst) -> Self;

    /// Adds the free type variables to `out`.
    fn ftv(&self, out: &mut FxHashSet<String>);

    /// The free type variables.
    #[must_use]
    fn free_type_vars(&self) -> FxHashSet<String> {
        let mut out = FxHashSet::default();
        self.ftv(&mut out);
        out
    }
}

impl Substitutable for Type {
    fn apply(&self, subst: &Subst) -> Self {
        match self {
            Self::Var(v) => subst.get(v).cloned().unwrap_or_else(|| self.clone()),
            Self::Con(_) | Self::Unknown | Self::Error(_) => self.clone(),
            Self::Arr(l, r) => Self::Arr(Box::new(l.apply(subst)), Box::new(r.apply(subst))),
            Self::List(t) => Self::List(Box::new(t.apply(subst))),
            Self::Tuple(ts) => Self::Tuple(ts.iter().map(|t| t.apply(subst)).collect()),
            Self::Adt(name, ts) => {
                Self::Adt(name.clone(), ts.iter().map(|t| t.apply(subst)).collect())
            }
        }
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        match self {
            Self::Var(v) => {
                let _ = out.insert(v.clone());
            }
            Self::Con(_) | Self::Unknown | Self::Error(_) => {}
            Self::Arr(l, r) => {
                l.ftv(out);
                r.ftv(out);
            }
            Self::List(t) => t.ftv(out),
            Self::Tuple(ts) | Self::Adt(_, ts) => {
                for t in ts {
                    t.ftv(out);
                }
            }
        }
    }
}

impl Substitutable for Option<Type> {
    fn apply(&self, subst: &Subst) -> Self { self.as_ref().map(|t| t.apply(subst)) }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        if let Some(t) = self {
            t.ftv(out);
        }
    }
}

impl Substitutable for Scheme {
    fn apply(&self, subst: &Subst) -> Self {
        // Quantified variables are untouchable: drop them from the
        // substitution before descending.
        let inner = subst.without(&self.vars);
        Self { vars: self.vars.clone(), ty: self.ty.apply(&inner) }
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        let mut inner = FxHashSet::default();
        self.ty.ftv(&mut inner);
        for v in &self.vars {
            let _ = inner.remove(v);
        }
        out.extend(inner);
    }
}

impl<A: Substitutable, B: Substitutable> Substitutable for (A, B) {
    fn apply(&self, subst: &Subst) -> Self { (self.0.apply(subst), self.1.apply(subst)) }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        self.0.ftv(out);
        self.1.ftv(out);
    }
}

impl<T: Substitutable> Substitutable for Vec<T> {
    fn apply(&self, subst: &Subst) -> Self { self.iter().map(|t| t.apply(subst)).collect() }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        for t in self {
            t.ftv(out);
        }
    }
}

impl<M: Substitutable + Clone> Substitutable for Expr<M> {
    fn apply(&self, subst: &Subst) -> Self {
        self.clone().map_meta(&mut |m: M| m.apply(subst))
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        // Collects over every meta slot, operators and patterns included.
        let mut collect = |m: M| {
            m.ftv(out);
            m
        };
        let _ = self.clone().map_meta(&mut collect);
    }
}

impl<M: Substitutable + Clone> Substitutable for Binding<M> {
    fn apply(&self, subst: &Subst) -> Self {
        self.clone().map_meta(&mut |m: M| m.apply(subst))
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        let mut collect = |m: M| {
            m.ftv(out);
            m
        };
        let _ = self.clone().map_meta(&mut collect);
    }
}

impl<M: Substitutable + Clone> Substitutable for Qual<M> {
    fn apply(&self, subst: &Subst) -> Self {
        self.clone().map_meta(&mut |m: M| m.apply(subst))
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        let mut collect = |m: M| {
            m.ftv(out);
            m
        };
        let _ = self.clone().map_meta(&mut collect);
    }
}

/// Collects the type variables of a type in first-appearance order.
pub(crate) fn type_vars_in_order(ty: &Type, out: &mut Vec<String>) {
    match ty {
        Type::Var(v) => {
            if !out.iter().any(|seen| seen == v) {
                out.push(v.clone());
            }
        }
        Type::Con(_) | Type::Unknown | Type::Error(_) => {}
        Type::Arr(l, r) => {
            type_vars_in_order(l, out);
            type_vars_in_order(r, out);
        }
        Type::List(t) => type_vars_in_order(t, out),
        Type::Tuple(ts) | Type::Adt(_, ts) => {
            for t in ts {
                type_vars_in_order(t, out);
            }
        }
    }
}
