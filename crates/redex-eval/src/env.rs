//! The evaluation environment.

use redex_ast::{Definition, RawBinding, RawExpr};
use rustc_hash::FxHashMap;

/// One clause of a definition: its head patterns and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// The clause-head patterns.
    pub patterns: Vec<RawBinding>,
    /// The clause body.
    pub body: RawExpr,
}

/// Maps each defined name to its clauses, in source order.
#[derive(Debug, Clone, Default)]
pub struct EvalEnv {
    defs: FxHashMap<String, Vec<Clause>>,
}

impl EvalEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Appends a definition as the last clause of its name.
    pub fn insert(&mut self, def: &Definition) {
        self.defs
            .entry(def.name.clone())
            .or_default()
            .push(Clause { patterns: def.patterns.clone(), body: def.body.clone() });
    }

    /// The clauses of a name, in source order.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&[Clause]> {
        self.defs.get(name).map(Vec::as_slice)
    }

    /// The number of defined names.
    #[must_use]
    pub fn len(&self) -> usize { self.defs.len() }

    /// Returns true if nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.defs.is_empty() }
}

/// Groups a definition list into an evaluation environment, preserving
/// clause order per name.
#[must_use]
pub fn defs_to_env(defs: &[Definition]) -> EvalEnv {
    let mut env = EvalEnv::new();
    for def in defs {
        env.insert(def);
    }
    env
}
