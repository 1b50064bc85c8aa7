//! Node indexing.
//!
//! Before constraint generation every node of the focus expression (and of
//! each definition under inference) receives a unique, densely numbered
//! index so constraints can be attributed to source positions. The base is
//! caller-chosen: a host can index its top-level definitions and the focus
//! expression in one continuous index space.

use redex_ast::{Binding, Expr, RawBinding, RawExpr, Type, TypedExpr};
use rustc_hash::FxHashSet;

use crate::subst::{Subst, Substitutable};

/// The meta slot of an index-decorated tree: a type slot plus the node's
/// index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    /// The type slot, filled during constraint generation.
    pub ty: Option<Type>,
    /// The node's unique index.
    pub index: usize,
}

/// An expression whose nodes carry indices.
pub type IndexedExpr = Expr<Indexed>;

/// A binding whose nodes carry indices.
pub type IndexedBinding = Binding<Indexed>;

impl Substitutable for Indexed {
    fn apply(&self, subst: &Subst) -> Self {
        Self { ty: self.ty.apply(subst), index: self.index }
    }

    fn ftv(&self, out: &mut FxHashSet<String>) { self.ty.ftv(out); }
}

/// Decorates every node of an expression with a fresh index, counting up
/// from `base`; returns the decorated tree and the next free index.
#[must_use]
pub fn index_expr(expr: &RawExpr, base: usize) -> (IndexedExpr, usize) {
    let mut next = base;
    let indexed = expr.clone().map_meta(&mut |()| {
        let index = next;
        next += 1;
        Indexed { ty: None, index }
    });
    (indexed, next)
}

/// Decorates every node of a binding with a fresh index, counting up from
/// `base`; returns the decorated binding and the next free index.
#[must_use]
pub fn index_binding(binding: &RawBinding, base: usize) -> (IndexedBinding, usize) {
    let mut next = base;
    let indexed = binding.clone().map_meta(&mut |()| {
        let index = next;
        next += 1;
        Indexed { ty: None, index }
    });
    (indexed, next)
}

/// Drops the indices, keeping the type slots. Indexing and immediately
/// stripping is the identity on the underlying type tree.
#[must_use]
pub fn strip_indices(expr: IndexedExpr) -> TypedExpr { expr.map_meta(&mut |m| m.ty) }
