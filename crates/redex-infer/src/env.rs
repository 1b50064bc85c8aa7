//! The type environment.

use redex_ast::{Scheme, Type};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::subst::{Subst, Substitutable, type_vars_in_order};

/// Maps identifier names (values and data constructors alike) to their
/// type schemes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEnv {
    schemes: FxHashMap<String, Scheme>,
}

impl TypeEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The scheme bound to a name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Scheme> { self.schemes.get(name) }

    /// Returns true if the name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool { self.schemes.contains_key(name) }

    /// Binds a name; the last write wins.
    pub fn extend(&mut self, name: impl Into<String>, scheme: Scheme) {
        let _ = self.schemes.insert(name.into(), scheme);
    }

    /// Binds several names at once.
    pub fn extend_many<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, Scheme)>,
    {
        for (name, scheme) in pairs {
            self.extend(name, scheme);
        }
    }

    /// A copy of this environment with one extra binding.
    #[must_use]
    pub fn extended(&self, name: impl Into<String>, scheme: Scheme) -> Self {
        let mut out = self.clone();
        out.extend(name, scheme);
        out
    }

    /// The left-biased union of two environments: bindings in `self` win.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = other.clone();
        for (name, scheme) in &self.schemes {
            out.extend(name.clone(), scheme.clone());
        }
        out
    }

    /// The number of bound names.
    #[must_use]
    pub fn len(&self) -> usize { self.schemes.len() }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.schemes.is_empty() }
}

impl Substitutable for TypeEnv {
    fn apply(&self, subst: &Subst) -> Self {
        Self {
            schemes: self
                .schemes
                .iter()
                .map(|(k, v)| (k.clone(), v.apply(subst)))
                .collect(),
        }
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        for scheme in self.schemes.values() {
            scheme.ftv(out);
        }
    }
}

/// Quantifies a type over the variables free in it but not in the
/// environment, in their first-appearance order within the type.
#[must_use]
pub fn generalize(env: &TypeEnv, ty: &Type) -> Scheme {
    let env_vars = env.free_type_vars();
    let mut ordered = Vec::new();
    type_vars_in_order(ty, &mut ordered);
    ordered.retain(|v| !env_vars.contains(v));
    Scheme::poly(ordered, ty.clone())
}
