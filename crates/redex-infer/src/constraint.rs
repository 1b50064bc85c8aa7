//! Type constraints collected during inference.

use redex_ast::Type;
use rustc_hash::FxHashSet;

use crate::subst::{Subst, Substitutable};

/// A constraint emitted during generation, tagged with the index of the
/// node it originates from so failures can be traced to source positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The two types must unify.
    Eq {
        /// Left type.
        lhs: Type,
        /// Right type.
        rhs: Type,
        /// Index of the originating node.
        origin: usize,
    },
    /// The type must resolve to an enumerable base type (`Int`, `Bool`,
    /// `Char`); checked once every equality is solved.
    Enumerable {
        /// The constrained type.
        ty: Type,
        /// Index of the originating node.
        origin: usize,
    },
}

impl Substitutable for Constraint {
    fn apply(&self, subst: &Subst) -> Self {
        match self {
            Self::Eq { lhs, rhs, origin } => Self::Eq {
                lhs: lhs.apply(subst),
                rhs: rhs.apply(subst),
                origin: *origin,
            },
            Self::Enumerable { ty, origin } => {
                Self::Enumerable { ty: ty.apply(subst), origin: *origin }
            }
        }
    }

    fn ftv(&self, out: &mut FxHashSet<String>) {
        match self {
            Self::Eq { lhs, rhs, .. } => {
                lhs.ftv(out);
                rhs.ftv(out);
            }
            Self::Enumerable { ty, .. } => ty.ftv(out),
        }
    }
}
