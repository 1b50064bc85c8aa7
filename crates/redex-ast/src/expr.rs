//! The expression tree.
//!
//! [`Expr`] is generic over a per-node meta slot `M`, so one tree shape
//! serves every phase: the parser produces `Expr<()>`, the inferencer
//! decorates `Expr<Option<Type>>`, and an index-decorated form ties
//! constraints back to source nodes. Operators and binding patterns carry
//! the same slot through [`OpMeta`] and [`Binding`].

use std::fmt;

use crate::atom::{Atom, Op};
use crate::binding::Binding;
use crate::ty::Type;

/// An expression without decoration, as produced by the parser.
pub type RawExpr = Expr<()>;

/// An expression decorated with inferred types.
///
/// After successful inference every meta is `Some(type)`; `None` and
/// embedded [`Type::Error`]s appear only on the ancestors of a failure
/// during partial typing.
pub type TypedExpr = Expr<Option<Type>>;

/// An operator together with its per-node decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpMeta<M> {
    /// The operator.
    pub op: Op,
    /// Per-node decoration (the operator's own type, once inferred).
    pub meta: M,
}

impl<M> OpMeta<M> {
    /// Maps the decoration.
    pub fn map_meta<N>(self, f: &mut impl FnMut(M) -> N) -> OpMeta<N> {
        OpMeta { op: self.op, meta: f(self.meta) }
    }
}

impl OpMeta<()> {
    /// An undecorated operator.
    #[must_use]
    pub const fn untyped(op: Op) -> Self { Self { op, meta: () } }
}

impl<M> fmt::Display for OpMeta<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.op) }
}

/// A qualifier of a list comprehension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qual<M> {
    /// A generator `pattern <- source`.
    Gen {
        /// Per-node decoration.
        meta: M,
        /// The pattern bound for each element.
        binding: Binding<M>,
        /// The list drawn from.
        expr: Expr<M>,
    },
    /// A local binding `let pattern = expr`.
    Let {
        /// Per-node decoration.
        meta: M,
        /// The pattern bound.
        binding: Binding<M>,
        /// The bound expression.
        expr: Expr<M>,
    },
    /// A boolean filter.
    Guard {
        /// Per-node decoration.
        meta: M,
        /// The filter condition.
        expr: Expr<M>,
    },
}

impl<M> Qual<M> {
    /// The qualifier's expression.
    pub const fn expr(&self) -> &Expr<M> {
        match self {
            Self::Gen { expr, .. } | Self::Let { expr, .. } | Self::Guard { expr, .. } => expr,
        }
    }

    /// Mutable access to the qualifier's expression.
    pub fn expr_mut(&mut self) -> &mut Expr<M> {
        match self {
            Self::Gen { expr, .. } | Self::Let { expr, .. } | Self::Guard { expr, .. } => expr,
        }
    }

    /// Maps the decoration of the qualifier and everything below it.
    pub fn map_meta<N>(self, f: &mut impl FnMut(M) -> N) -> Qual<N> {
        match self {
            Self::Gen { meta, binding, expr } => {
                let meta = f(meta);
                let binding = binding.map_meta(f);
                Qual::Gen { meta, binding, expr: expr.map_meta(f) }
            }
            Self::Let { meta, binding, expr } => {
                let meta = f(meta);
                let binding = binding.map_meta(f);
                Qual::Let { meta, binding, expr: expr.map_meta(f) }
            }
            Self::Guard { meta, expr } => {
                let meta = f(meta);
                Qual::Guard { meta, expr: expr.map_meta(f) }
            }
        }
    }
}

/// An expression of the language, generic over the per-node meta slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<M> {
    /// A leaf atom.
    Atom {
        /// Per-node decoration.
        meta: M,
        /// The atom.
        atom: Atom,
    },
    /// A list literal.
    List {
        /// Per-node decoration.
        meta: M,
        /// The elements.
        items: Vec<Expr<M>>,
    },
    /// A tuple.
    NTuple {
        /// Per-node decoration.
        meta: M,
        /// The components.
        items: Vec<Expr<M>>,
    },
    /// An infix application `lhs op rhs`.
    Binary {
        /// Per-node decoration.
        meta: M,
        /// The operator.
        op: OpMeta<M>,
        /// Left operand.
        lhs: Box<Expr<M>>,
        /// Right operand.
        rhs: Box<Expr<M>>,
    },
    /// A unary operator application (only negation).
    Unary {
        /// Per-node decoration.
        meta: M,
        /// The operator.
        op: OpMeta<M>,
        /// The operand.
        expr: Box<Expr<M>>,
    },
    /// A left operator section `(expr op)`.
    SectL {
        /// Per-node decoration.
        meta: M,
        /// The captured left operand.
        expr: Box<Expr<M>>,
        /// The operator.
        op: OpMeta<M>,
    },
    /// A right operator section `(op expr)`.
    SectR {
        /// Per-node decoration.
        meta: M,
        /// The operator.
        op: OpMeta<M>,
        /// The captured right operand.
        expr: Box<Expr<M>>,
    },
    /// A bare operator `(op)` used as a function.
    PrefixOp {
        /// Per-node decoration.
        meta: M,
        /// The operator.
        op: OpMeta<M>,
    },
    /// A conditional.
    IfExpr {
        /// Per-node decoration.
        meta: M,
        /// The condition.
        cond: Box<Expr<M>>,
        /// Value when the condition holds.
        then_branch: Box<Expr<M>>,
        /// Value otherwise.
        else_branch: Box<Expr<M>>,
    },
    /// An arithmetic sequence `[start, step? .. end?]`.
    ArithmSeq {
        /// Per-node decoration.
        meta: M,
        /// The first element.
        start: Box<Expr<M>>,
        /// The second element, fixing the stride.
        step: Option<Box<Expr<M>>>,
        /// The inclusive upper (or lower) bound.
        end: Option<Box<Expr<M>>>,
    },
    /// A let-expression.
    LetExpr {
        /// Per-node decoration.
        meta: M,
        /// The bound patterns and their right-hand sides, in source order.
        bindings: Vec<(Binding<M>, Expr<M>)>,
        /// The body the bindings scope over.
        body: Box<Expr<M>>,
    },
    /// An anonymous function.
    Lambda {
        /// Per-node decoration.
        meta: M,
        /// The parameter patterns.
        params: Vec<Binding<M>>,
        /// The function body.
        body: Box<Expr<M>>,
    },
    /// Function application.
    App {
        /// Per-node decoration.
        meta: M,
        /// The function position.
        func: Box<Expr<M>>,
        /// The arguments, left to right.
        args: Vec<Expr<M>>,
    },
    /// A list comprehension `[head | quals]`.
    ListComp {
        /// Per-node decoration.
        meta: M,
        /// The element template.
        head: Box<Expr<M>>,
        /// The qualifiers, left to right.
        quals: Vec<Qual<M>>,
    },
}

impl<M> Expr<M> {
    /// The decoration of this node.
    pub const fn meta(&self) -> &M {
        match self {
            Self::Atom { meta, .. }
            | Self::List { meta, .. }
            | Self::NTuple { meta, .. }
            | Self::Binary { meta, .. }
            | Self::Unary { meta, .. }
            | Self::SectL { meta, .. }
            | Self::SectR { meta, .. }
            | Self::PrefixOp { meta, .. }
            | Self::IfExpr { meta, .. }
            | Self::ArithmSeq { meta, .. }
            | Self::LetExpr { meta, .. }
            | Self::Lambda { meta, .. }
            | Self::App { meta, .. }
            | Self::ListComp { meta, .. } => meta,
        }
    }

    /// Replaces the decoration of this node only.
    #[must_use]
    pub fn with_meta(mut self, m: M) -> Self {
        *self.meta_mut() = m;
        self
    }

    /// Mutable access to the decoration of this node.
    pub fn meta_mut(&mut self) -> &mut M {
        match self {
            Self::Atom { meta, .. }
            | Self::List { meta, .. }
            | Self::NTuple { meta, .. }
            | Self::Binary { meta, .. }
            | Self::Unary { meta, .. }
            | Self::SectL { meta, .. }
            | Self::SectR { meta, .. }
            | Self::PrefixOp { meta, .. }
            | Self::IfExpr { meta, .. }
            | Self::ArithmSeq { meta, .. }
            | Self::LetExpr { meta, .. }
            | Self::Lambda { meta, .. }
            | Self::App { meta, .. }
            | Self::ListComp { meta, .. } => meta,
        }
    }

    /// Direct sub-expressions in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Atom { .. } | Self::PrefixOp { .. } => Vec::new(),
            Self::List { items, .. } | Self::NTuple { items, .. } => items.iter().collect(),
            Self::Binary { lhs, rhs, .. } => vec![&**lhs, &**rhs],
            Self::Unary { expr, .. } | Self::SectL { expr, .. } | Self::SectR { expr, .. } => {
                vec![&**expr]
            }
            Self::IfExpr { cond, then_branch, else_branch, .. } => {
                vec![&**cond, &**then_branch, &**else_branch]
            }
            Self::ArithmSeq { start, step, end, .. } => {
                let mut out: Vec<&Self> = vec![start];
                if let Some(step) = step {
                    out.push(step);
                }
                if let Some(end) = end {
                    out.push(end);
                }
                out
            }
            Self::LetExpr { bindings, body, .. } => {
                let mut out: Vec<&Self> = bindings.iter().map(|(_, e)| e).collect();
                out.push(body);
                out
            }
            Self::Lambda { body, .. } => vec![&**body],
            Self::App { func, args, .. } => {
                let mut out: Vec<&Self> = vec![func];
                out.extend(args.iter());
                out
            }
            Self::ListComp { head, quals, .. } => {
                let mut out: Vec<&Self> = vec![head];
                out.extend(quals.iter().map(Qual::expr));
                out
            }
        }
    }

    /// Maps the decoration of every node, operator, and pattern in the tree.
    ///
    /// Visiting order is deterministic: node meta first, then operator meta,
    /// then children in evaluation order (for binders: the pattern before
    /// its expression, the body last). Indexing relies on this order.
    pub fn map_meta<N>(self, f: &mut impl FnMut(M) -> N) -> Expr<N> {
        match self {
            Self::Atom { meta, atom } => Expr::Atom { meta: f(meta), atom },
            Self::List { meta, items } => Expr::List {
                meta: f(meta),
                items: items.into_iter().map(|e| e.map_meta(f)).collect(),
            },
            Self::NTuple { meta, items } => Expr::NTuple {
                meta: f(meta),
                items: items.into_iter().map(|e| e.map_meta(f)).collect(),
            },
            Self::Binary { meta, op, lhs, rhs } => {
                let meta = f(meta);
                let op = op.map_meta(f);
                let lhs = Box::new(lhs.map_meta(f));
                Expr::Binary { meta, op, lhs, rhs: Box::new(rhs.map_meta(f)) }
            }
            Self::Unary { meta, op, expr } => {
                let meta = f(meta);
                let op = op.map_meta(f);
                Expr::Unary { meta, op, expr: Box::new(expr.map_meta(f)) }
            }
            Self::SectL { meta, expr, op } => {
                let meta = f(meta);
                let op = op.map_meta(f);
                Expr::SectL { meta, expr: Box::new(expr.map_meta(f)), op }
            }
            Self::SectR { meta, op, expr } => {
                let meta = f(meta);
                let op = op.map_meta(f);
                Expr::SectR { meta, op, expr: Box::new(expr.map_meta(f)) }
            }
            Self::PrefixOp { meta, op } => {
                let meta = f(meta);
                Expr::PrefixOp { meta, op: op.map_meta(f) }
            }
            Self::IfExpr { meta, cond, then_branch, else_branch } => {
                let meta = f(meta);
                let cond = Box::new(cond.map_meta(f));
                let then_branch = Box::new(then_branch.map_meta(f));
                Expr::IfExpr { meta, cond, then_branch, else_branch: Box::new(else_branch.map_meta(f)) }
            }
            Self::ArithmSeq { meta, start, step, end } => {
                let meta = f(meta);
                let start = Box::new(start.map_meta(f));
                let step = step.map(|e| Box::new(e.map_meta(f)));
                Expr::ArithmSeq { meta, start, step, end: end.map(|e| Box::new(e.map_meta(f))) }
            }
            Self::LetExpr { meta, bindings, body } => {
                let meta = f(meta);
                let bindings = bindings
                    .into_iter()
                    .map(|(b, e)| {
                        let b = b.map_meta(f);
                        (b, e.map_meta(f))
                    })
                    .collect();
                Expr::LetExpr { meta, bindings, body: Box::new(body.map_meta(f)) }
            }
            Self::Lambda { meta, params, body } => {
                let meta = f(meta);
                let params = params.into_iter().map(|b| b.map_meta(f)).collect();
                Expr::Lambda { meta, params, body: Box::new(body.map_meta(f)) }
            }
            Self::App { meta, func, args } => {
                let meta = f(meta);
                let func = Box::new(func.map_meta(f));
                Expr::App { meta, func, args: args.into_iter().map(|e| e.map_meta(f)).collect() }
            }
            Self::ListComp { meta, head, quals } => {
                let meta = f(meta);
                let head = Box::new(head.map_meta(f));
                Expr::ListComp {
                    meta,
                    head,
                    quals: quals.into_iter().map(|q| q.map_meta(f)).collect(),
                }
            }
        }
    }
}

impl RawExpr {
    /// An atom expression.
    #[must_use]
    pub const fn atom(atom: Atom) -> Self { Self::Atom { meta: (), atom } }

    /// An integer literal.
    #[must_use]
    pub const fn int(i: i64) -> Self { Self::atom(Atom::Int(i)) }

    /// A boolean literal.
    #[must_use]
    pub const fn bool(b: bool) -> Self { Self::atom(Atom::Bool(b)) }

    /// A character literal.
    #[must_use]
    pub const fn chr(c: char) -> Self { Self::atom(Atom::Char(c)) }

    /// A name reference.
    #[must_use]
    pub fn name(n: impl Into<String>) -> Self { Self::atom(Atom::Name(n.into())) }

    /// A data-constructor reference.
    #[must_use]
    pub fn constr(n: impl Into<String>) -> Self { Self::atom(Atom::Constr(n.into())) }

    /// A list literal.
    #[must_use]
    pub const fn list(items: Vec<Self>) -> Self { Self::List { meta: (), items } }

    /// A tuple.
    #[must_use]
    pub const fn ntuple(items: Vec<Self>) -> Self { Self::NTuple { meta: (), items } }

    /// An infix application.
    #[must_use]
    pub fn binary(op: Op, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            meta: (),
            op: OpMeta::untyped(op),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// A unary operator application.
    #[must_use]
    pub fn unary(op: Op, expr: Self) -> Self {
        Self::Unary { meta: (), op: OpMeta::untyped(op), expr: Box::new(expr) }
    }

    /// A left operator section `(expr op)`.
    #[must_use]
    pub fn sect_l(expr: Self, op: Op) -> Self {
        Self::SectL { meta: (), expr: Box::new(expr), op: OpMeta::untyped(op) }
    }

    /// A right operator section `(op expr)`.
    #[must_use]
    pub fn sect_r(op: Op, expr: Self) -> Self {
        Self::SectR { meta: (), op: OpMeta::untyped(op), expr: Box::new(expr) }
    }

    /// A bare operator used as a function.
    #[must_use]
    pub const fn prefix_op(op: Op) -> Self {
        Self::PrefixOp { meta: (), op: OpMeta::untyped(op) }
    }

    /// A conditional.
    #[must_use]
    pub fn if_expr(cond: Self, then_branch: Self, else_branch: Self) -> Self {
        Self::IfExpr {
            meta: (),
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// An arithmetic sequence.
    #[must_use]
    pub fn arithm_seq(start: Self, step: Option<Self>, end: Option<Self>) -> Self {
        Self::ArithmSeq {
            meta: (),
            start: Box::new(start),
            step: step.map(Box::new),
            end: end.map(Box::new),
        }
    }

    /// A let-expression.
    #[must_use]
    pub fn let_expr(bindings: Vec<(Binding<()>, Self)>, body: Self) -> Self {
        Self::LetExpr { meta: (), bindings, body: Box::new(body) }
    }

    /// An anonymous function.
    #[must_use]
    pub fn lambda(params: Vec<Binding<()>>, body: Self) -> Self {
        Self::Lambda { meta: (), params, body: Box::new(body) }
    }

    /// Function application.
    #[must_use]
    pub fn app(func: Self, args: Vec<Self>) -> Self {
        Self::App { meta: (), func: Box::new(func), args }
    }

    /// A list comprehension.
    #[must_use]
    pub fn list_comp(head: Self, quals: Vec<Qual<()>>) -> Self {
        Self::ListComp { meta: (), head: Box::new(head), quals }
    }
}

impl<M> Expr<M> {
    // Display helper: atoms, lists and tuples print without parentheses in
    // operand position.
    fn is_aexpr(&self) -> bool {
        matches!(
            self,
            Self::Atom { .. }
                | Self::List { .. }
                | Self::NTuple { .. }
                | Self::PrefixOp { .. }
                | Self::SectL { .. }
                | Self::SectR { .. }
        )
    }
}

struct Operand<'a, M>(&'a Expr<M>);

impl<M> fmt::Display for Operand<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_aexpr() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl<M> fmt::Display for Expr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom { atom, .. } => write!(f, "{atom}"),
            Self::List { items, .. } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::NTuple { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Binary { op, lhs, rhs, .. } => {
                write!(f, "{} {op} {}", Operand(lhs), Operand(rhs))
            }
            Self::Unary { op, expr, .. } => write!(f, "{op}{}", Operand(expr)),
            Self::SectL { expr, op, .. } => write!(f, "({} {op})", Operand(expr)),
            Self::SectR { op, expr, .. } => write!(f, "({op} {})", Operand(expr)),
            Self::PrefixOp { op, .. } => write!(f, "({op})"),
            Self::IfExpr { cond, then_branch, else_branch, .. } => {
                write!(f, "if {cond} then {then_branch} else {else_branch}")
            }
            Self::ArithmSeq { start, step, end, .. } => {
                write!(f, "[{start}")?;
                if let Some(step) = step {
                    write!(f, ", {step}")?;
                }
                write!(f, "..")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                write!(f, "]")
            }
            Self::LetExpr { bindings, body, .. } => {
                write!(f, "let ")?;
                for (i, (b, e)) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{b} = {e}")?;
                }
                write!(f, " in {body}")
            }
            Self::Lambda { params, body, .. } => {
                write!(f, "\\")?;
                for p in params {
                    write!(f, "{p} ")?;
                }
                write!(f, "-> {body}")
            }
            Self::App { func, args, .. } => {
                write!(f, "{}", Operand(func))?;
                for arg in args {
                    write!(f, " {}", Operand(arg))?;
                }
                Ok(())
            }
            Self::ListComp { head, quals, .. } => {
                write!(f, "[{head} | ")?;
                for (i, q) in quals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{q}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<M> fmt::Display for Qual<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gen { binding, expr, .. } => write!(f, "{binding} <- {expr}"),
            Self::Let { binding, expr, .. } => write!(f, "let {binding} = {expr}"),
            Self::Guard { expr, .. } => write!(f, "{expr}"),
        }
    }
}
