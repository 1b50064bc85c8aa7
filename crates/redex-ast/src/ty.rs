//! Type terms, type schemes, and type errors.

use std::fmt;

use thiserror::Error;

use crate::binding::RawBinding;

/// A type term of the language.
///
/// `Error` embeds a [`TypeError`] as data: partially typed trees carry the
/// failure in the meta slot of the nodes that could not be typed, so a type
/// error never has to abort the decoration of a whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A type variable.
    Var(String),
    /// A base type constant (`Int`, `Bool`, `Char`).
    Con(String),
    /// A function type.
    Arr(Box<Type>, Box<Type>),
    /// A homogeneous list type.
    List(Box<Type>),
    /// A tuple type.
    Tuple(Vec<Type>),
    /// A user-declared type constructor applied to its arguments.
    Adt(String, Vec<Type>),
    /// A localised type error, carried as data.
    Error(Box<TypeError>),
    /// A type that unifies with anything.
    Unknown,
}

impl Type {
    /// The `Int` base type.
    #[must_use]
    pub fn int() -> Self { Self::Con("Int".to_string()) }

    /// The `Bool` base type.
    #[must_use]
    pub fn bool() -> Self { Self::Con("Bool".to_string()) }

    /// The `Char` base type.
    #[must_use]
    pub fn char() -> Self { Self::Con("Char".to_string()) }

    /// A type variable with the given name.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self { Self::Var(name.into()) }

    /// The function type `from -> to`.
    #[must_use]
    pub fn fun(from: Self, to: Self) -> Self { Self::Arr(Box::new(from), Box::new(to)) }

    /// The list type `[elem]`.
    #[must_use]
    pub fn list(elem: Self) -> Self { Self::List(Box::new(elem)) }

    /// Folds a function type over parameter types ending in `result`.
    #[must_use]
    pub fn fun_from(params: Vec<Self>, result: Self) -> Self {
        params.into_iter().rev().fold(result, |acc, p| Self::fun(p, acc))
    }

    /// Returns true if this type admits enumeration in arithmetic sequences.
    ///
    /// Only the closed set of base types `Int`, `Bool`, and `Char` is
    /// enumerable; there is no type-class mechanism to extend it.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        matches!(self, Self::Con(name) if name == "Int" || name == "Bool" || name == "Char")
    }

    /// Returns true if this type contains an embedded error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        match self {
            Self::Error(_) => true,
            Self::Var(_) | Self::Con(_) | Self::Unknown => false,
            Self::Arr(l, r) => l.has_error() || r.has_error(),
            Self::List(t) => t.has_error(),
            Self::Tuple(ts) | Self::Adt(_, ts) => ts.iter().any(Self::has_error),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) | Self::Con(name) => write!(f, "{name}"),
            Self::Arr(l, r) => {
                if matches!(l.as_ref(), Self::Arr(_, _)) {
                    write!(f, "({l}) -> {r}")
                } else {
                    write!(f, "{l} -> {r}")
                }
            }
            Self::List(t) => write!(f, "[{t}]"),
            Self::Tuple(ts) => {
                write!(f, "(")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Self::Adt(name, args) => {
                write!(f, "{name}")?;
                for arg in args {
                    match arg {
                        Self::Arr(_, _) | Self::Adt(_, _) => write!(f, " ({arg})")?,
                        _ => write!(f, " {arg}")?,
                    }
                }
                Ok(())
            }
            Self::Error(err) => write!(f, "<error: {err}>"),
            Self::Unknown => write!(f, "?"),
        }
    }
}

/// A type scheme: a type prefixed by universally quantified variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    /// The quantified type variables.
    pub vars: Vec<String>,
    /// The quantified type.
    pub ty: Type,
}

impl Scheme {
    /// A scheme quantifying over no variables.
    #[must_use]
    pub const fn mono(ty: Type) -> Self { Self { vars: Vec::new(), ty } }

    /// A scheme quantifying over the given variables.
    #[must_use]
    pub const fn poly(vars: Vec<String>, ty: Type) -> Self { Self { vars, ty } }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "forall")?;
            for v in &self.vars {
                write!(f, " {v}")?;
            }
            write!(f, ". {}", self.ty)
        }
    }
}

/// Errors produced by type inference.
///
/// Every error is canonically renamed (type variables mapped to
/// `a, b, c, …` in first-appearance order) before it is returned to a
/// caller or embedded in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Two types could not be unified.
    #[error("could not unify type {0} with type {1}")]
    UnificationFail(Box<Type>, Box<Type>),

    /// The occurs check failed: unification would build an infinite type.
    #[error("cannot construct the infinite type {var} ~ {ty}")]
    InfiniteType {
        /// The variable that occurs in its own solution.
        var: String,
        /// The type the variable would be bound to.
        ty: Box<Type>,
    },

    /// A name was used but is not bound in the type environment.
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    /// A data constructor was used but never declared.
    #[error("unknown data constructor '{0}'")]
    UnknownDataConstructor(String),

    /// An arithmetic sequence was built over a non-enumerable type.
    #[error("no instance for Enum {0}")]
    NoInstanceOfEnum(Box<Type>),

    /// A binding pattern cannot take the required type.
    #[error("pattern {pattern} does not fit type {ty}")]
    PatternMismatch {
        /// The offending pattern.
        pattern: Box<RawBinding>,
        /// The type the pattern was matched against.
        ty: Box<Type>,
    },

    /// A failure that fits no other category.
    #[error("{0}")]
    UnknownError(String),
}

impl TypeError {
    /// The conflicting-definitions error raised by the pattern overlap check.
    #[must_use]
    pub fn conflicting_definitions(name: &str) -> Self {
        Self::UnknownError(format!("Conflicting definitions for '{name}'"))
    }
}
