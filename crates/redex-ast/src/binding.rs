//! Binding patterns.
//!
//! Patterns appear in clause heads of definitions, lambda parameter lists,
//! let-expressions, and list-comprehension generators. They carry the same
//! meta slot as expressions so typed trees can decorate them.

use std::fmt;

use crate::atom::Atom;
use crate::ty::Type;

/// A binding without decoration, as produced by the parser.
pub type RawBinding = Binding<()>;

/// A binding decorated with an inferred type.
pub type TypedBinding = Binding<Option<Type>>;

/// A pattern that an expression can be matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding<M> {
    /// A literal atom. A `Name` binds unconditionally (the name `_` binds
    /// nothing); other atoms match only themselves.
    Lit {
        /// Per-node decoration.
        meta: M,
        /// The atom to match or the name to bind.
        atom: Atom,
    },
    /// A cons pattern `(head : tail)`.
    ConsLit {
        /// Per-node decoration.
        meta: M,
        /// Pattern for the first element.
        head: Box<Binding<M>>,
        /// Pattern for the remaining list.
        tail: Box<Binding<M>>,
    },
    /// A fixed-length list pattern `[p1, …, pk]`.
    ListLit {
        /// Per-node decoration.
        meta: M,
        /// Element patterns, matched pointwise.
        items: Vec<Binding<M>>,
    },
    /// A tuple pattern `(p1, …, pk)`.
    NTupleLit {
        /// Per-node decoration.
        meta: M,
        /// Component patterns, matched pointwise.
        items: Vec<Binding<M>>,
    },
    /// A data-constructor pattern.
    ConstrLit {
        /// Per-node decoration.
        meta: M,
        /// The constructor shape to match.
        pattern: ConstrPattern<M>,
    },
}

/// The shape of a data-constructor pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstrPattern<M> {
    /// A prefix constructor applied to argument patterns, `(Just x)`.
    Prefix {
        /// The constructor name.
        name: String,
        /// Patterns for the constructor arguments.
        args: Vec<Binding<M>>,
    },
    /// An infix constructor between two patterns, `(x :+: y)`.
    Infix {
        /// The constructor symbol.
        symbol: String,
        /// Pattern for the left operand.
        lhs: Box<Binding<M>>,
        /// Pattern for the right operand.
        rhs: Box<Binding<M>>,
    },
}

impl<M> Binding<M> {
    /// The decoration of this pattern node.
    pub const fn meta(&self) -> &M {
        match self {
            Self::Lit { meta, .. }
            | Self::ConsLit { meta, .. }
            | Self::ListLit { meta, .. }
            | Self::NTupleLit { meta, .. }
            | Self::ConstrLit { meta, .. } => meta,
        }
    }

    /// Maps the decoration of every pattern node, preserving structure.
    ///
    /// Nodes are visited parent-first, children in source order.
    pub fn map_meta<N>(self, f: &mut impl FnMut(M) -> N) -> Binding<N> {
        match self {
            Self::Lit { meta, atom } => Binding::Lit { meta: f(meta), atom },
            Self::ConsLit { meta, head, tail } => Binding::ConsLit {
                meta: f(meta),
                head: Box::new(head.map_meta(f)),
                tail: Box::new(tail.map_meta(f)),
            },
            Self::ListLit { meta, items } => Binding::ListLit {
                meta: f(meta),
                items: items.into_iter().map(|b| b.map_meta(f)).collect(),
            },
            Self::NTupleLit { meta, items } => Binding::NTupleLit {
                meta: f(meta),
                items: items.into_iter().map(|b| b.map_meta(f)).collect(),
            },
            Self::ConstrLit { meta, pattern } => {
                let pattern = match pattern {
                    ConstrPattern::Prefix { name, args } => ConstrPattern::Prefix {
                        name,
                        args: args.into_iter().map(|b| b.map_meta(f)).collect(),
                    },
                    ConstrPattern::Infix { symbol, lhs, rhs } => ConstrPattern::Infix {
                        symbol,
                        lhs: Box::new(lhs.map_meta(f)),
                        rhs: Box::new(rhs.map_meta(f)),
                    },
                };
                Binding::ConstrLit { meta: f(meta), pattern }
            }
        }
    }

    /// Collects the names this pattern binds, in appearance order.
    ///
    /// The wildcard name `_` binds nothing and is not collected.
    pub fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Self::Lit { atom: Atom::Name(n), .. } => {
                if n != "_" {
                    out.push(n.clone());
                }
            }
            Self::Lit { .. } => {}
            Self::ConsLit { head, tail, .. } => {
                head.collect_names(out);
                tail.collect_names(out);
            }
            Self::ListLit { items, .. } | Self::NTupleLit { items, .. } => {
                for item in items {
                    item.collect_names(out);
                }
            }
            Self::ConstrLit { pattern, .. } => match pattern {
                ConstrPattern::Prefix { args, .. } => {
                    for arg in args {
                        arg.collect_names(out);
                    }
                }
                ConstrPattern::Infix { lhs, rhs, .. } => {
                    lhs.collect_names(out);
                    rhs.collect_names(out);
                }
            },
        }
    }

    /// The names this pattern binds, in appearance order.
    #[must_use]
    pub fn bound_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }
}

impl RawBinding {
    /// A name pattern (binds unconditionally).
    #[must_use]
    pub fn name(n: impl Into<String>) -> Self {
        Self::Lit { meta: (), atom: Atom::Name(n.into()) }
    }

    /// The wildcard pattern `_`.
    #[must_use]
    pub fn wildcard() -> Self { Self::name("_") }

    /// A literal pattern matching exactly the given atom.
    #[must_use]
    pub const fn lit(atom: Atom) -> Self { Self::Lit { meta: (), atom } }

    /// A cons pattern `(head : tail)`.
    #[must_use]
    pub fn cons(head: Self, tail: Self) -> Self {
        Self::ConsLit { meta: (), head: Box::new(head), tail: Box::new(tail) }
    }

    /// A fixed-length list pattern.
    #[must_use]
    pub const fn list(items: Vec<Self>) -> Self { Self::ListLit { meta: (), items } }

    /// A tuple pattern.
    #[must_use]
    pub const fn ntuple(items: Vec<Self>) -> Self { Self::NTupleLit { meta: (), items } }

    /// A prefix data-constructor pattern.
    #[must_use]
    pub fn constr(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::ConstrLit { meta: (), pattern: ConstrPattern::Prefix { name: name.into(), args } }
    }

    /// An infix data-constructor pattern.
    #[must_use]
    pub fn infix_constr(symbol: impl Into<String>, lhs: Self, rhs: Self) -> Self {
        Self::ConstrLit {
            meta: (),
            pattern: ConstrPattern::Infix {
                symbol: symbol.into(),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }
}

impl<M> fmt::Display for Binding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit { atom, .. } => write!(f, "{atom}"),
            Self::ConsLit { head, tail, .. } => write!(f, "({head}:{tail})"),
            Self::ListLit { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::NTupleLit { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::ConstrLit { pattern, .. } => match pattern {
                ConstrPattern::Prefix { name, args } => {
                    if args.is_empty() {
                        write!(f, "{name}")
                    } else {
                        write!(f, "({name}")?;
                        for arg in args {
                            write!(f, " {arg}")?;
                        }
                        write!(f, ")")
                    }
                }
                ConstrPattern::Infix { symbol, lhs, rhs } => {
                    write!(f, "({lhs} {symbol} {rhs})")
                }
            },
        }
    }
}
