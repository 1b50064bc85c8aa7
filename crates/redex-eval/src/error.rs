//! Evaluation and matching error types.

use redex_ast::{Op, PathStep, RawBinding, RawExpr};
use thiserror::Error;

/// Errors produced while matching an expression against a binding pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// The expression is in weak head normal form but has the wrong shape.
    #[error("pattern {binding} does not match {expr}")]
    Mismatch {
        /// The pattern that failed.
        binding: Box<RawBinding>,
        /// The expression it was matched against.
        expr: Box<RawExpr>,
    },

    /// The expression is not reduced far enough to decide the match; the
    /// caller must force it further.
    #[error("{expr} is not reduced far enough to match against {binding}")]
    Strictness {
        /// The pattern that demanded more structure.
        binding: Box<RawBinding>,
        /// The insufficiently reduced expression.
        expr: Box<RawExpr>,
    },

    /// A clause expected more arguments than were supplied.
    #[error("too few arguments: {} patterns but {} arguments", bindings.len(), exprs.len())]
    TooFewArguments {
        /// The clause-head patterns.
        bindings: Vec<RawBinding>,
        /// The supplied arguments.
        exprs: Vec<RawExpr>,
    },
}

impl MatchingError {
    /// A shape mismatch against a WHNF expression.
    #[must_use]
    pub fn mismatch(binding: &RawBinding, expr: &RawExpr) -> Self {
        Self::Mismatch { binding: Box::new(binding.clone()), expr: Box::new(expr.clone()) }
    }

    /// An undecidable match on an insufficiently reduced expression.
    #[must_use]
    pub fn strictness(binding: &RawBinding, expr: &RawExpr) -> Self {
        Self::Strictness { binding: Box::new(binding.clone()), expr: Box::new(expr.clone()) }
    }
}

/// Errors produced by the evaluator.
///
/// `NoError` and `MoreErrors` make the type a monoid so collectors can
/// accumulate: `NoError` is the identity and [`EvalError::combine`] the
/// associative operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The monoid identity; reported by nothing.
    #[error("no error")]
    NoError,

    /// A navigation token does not apply to the node it reached.
    #[error("cannot navigate {step} into {expr}")]
    PathError {
        /// The token that failed.
        step: PathStep,
        /// The node it was applied to.
        expr: Box<RawExpr>,
    },

    /// A numeric navigation token was out of range.
    #[error("index {index} out of range ({len} children)")]
    IndexError {
        /// The requested child index.
        index: usize,
        /// The number of children present.
        len: usize,
    },

    /// Integer division or remainder by zero.
    #[error("division by zero")]
    DivByZero,

    /// An expression could not be evaluated in this position.
    #[error("could not evaluate {0}")]
    EvalFailure(Box<RawExpr>),

    /// A binary primitive was applied to unsuitable operands.
    #[error("operator {op} cannot be applied to {lhs} and {rhs}")]
    BinaryOpError {
        /// The operator.
        op: Op,
        /// Left operand.
        lhs: Box<RawExpr>,
        /// Right operand.
        rhs: Box<RawExpr>,
    },

    /// A unary primitive was applied to an unsuitable operand.
    #[error("unary operator {op} cannot be applied to {expr}")]
    UnaryOpError {
        /// The operator.
        op: Op,
        /// The operand.
        expr: Box<RawExpr>,
    },

    /// Substituting under a lambda would capture free names.
    #[error("substitution would capture {}", names.join(", "))]
    NameCaptureError {
        /// The captured names, sorted.
        names: Vec<String>,
    },

    /// A binder group binds the same name twice.
    #[error("Conflicting definitions for '{0}'")]
    ConflictingDefinitions(String),

    /// A name is not bound in the evaluation environment.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// No clause of a definition accepted the arguments.
    #[error("no matching clause for '{name}'")]
    NoMatchingFunction {
        /// The applied name (or `lambda`).
        name: String,
        /// One matching error per attempted clause.
        errors: Vec<MatchingError>,
    },

    /// The selected node admits no reduction step.
    #[error("cannot evaluate {0} any further")]
    CannotEvaluate(Box<RawExpr>),

    /// Two accumulated errors.
    #[error("{0}; {1}")]
    MoreErrors(Box<EvalError>, Box<EvalError>),
}

impl EvalError {
    /// Associatively combines two errors; `NoError` is the identity.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::NoError, e) | (e, Self::NoError) => e,
            (l, r) => Self::MoreErrors(Box::new(l), Box::new(r)),
        }
    }

    /// The node-admits-no-step error for the given expression.
    #[must_use]
    pub fn cannot_evaluate(expr: &RawExpr) -> Self { Self::CannotEvaluate(Box::new(expr.clone())) }

    /// The conflicting-definitions error raised by the binder overlap check.
    #[must_use]
    pub fn conflicting_definitions(name: &str) -> Self {
        Self::ConflictingDefinitions(name.to_string())
    }
}
