//! Atoms and operators of the expression language.

use std::fmt;

/// A leaf value of the expression tree.
///
/// Equality and the total order are defined pointwise within a variant;
/// `Name` and `Constr` compare by their string. Comparisons across variants
/// never happen in well-typed programs, so the derived order is only used to
/// keep `Atom` usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    /// An integer literal.
    Int(i64),
    /// A boolean literal.
    Bool(bool),
    /// A character literal.
    Char(char),
    /// A reference to a named value or function.
    Name(String),
    /// A reference to a data constructor.
    Constr(String),
}

impl Atom {
    /// Returns true if this atom is a name reference.
    #[must_use]
    pub const fn is_name(&self) -> bool { matches!(self, Self::Name(_)) }

    /// Returns true if this atom is a literal (not a name or constructor).
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Bool(_) | Self::Char(_))
    }

    /// A short description of the atom's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Char(_) => "character",
            Self::Name(_) => "name",
            Self::Constr(_) => "constructor",
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Name(n) | Self::Constr(n) => write!(f, "{n}"),
        }
    }
}

/// An infix or prefix operator.
///
/// The enumeration is closed except for the two open variants:
/// `InfixFunc` calls a named function in infix position (`` x `div` y ``)
/// and `InfixConstr` is an infix data constructor (`x :+: y`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    /// Function composition, `.`.
    Composition,
    /// Exponentiation, `^`.
    Power,
    /// Multiplication, `*`.
    Mul,
    /// Addition, `+`.
    Add,
    /// Subtraction (and unary negation), `-`.
    Sub,
    /// List construction, `:`.
    Colon,
    /// List concatenation, `++`.
    Append,
    /// Equality, `==`.
    Equ,
    /// Inequality, `/=`.
    Neq,
    /// Less-than, `<`.
    Lt,
    /// Less-or-equal, `<=`.
    Leq,
    /// Greater-than, `>`.
    Gt,
    /// Greater-or-equal, `>=`.
    Geq,
    /// Boolean conjunction, `&&`.
    And,
    /// Boolean disjunction, `||`.
    Or,
    /// Low-precedence application, `$`.
    Dollar,
    /// A named function used in infix position.
    InfixFunc(String),
    /// An infix data constructor.
    InfixConstr(String),
}

impl Op {
    /// Returns true if this operator is one of the comparison operators.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(self, Self::Equ | Self::Neq | Self::Lt | Self::Leq | Self::Gt | Self::Geq)
    }

    /// Returns true if this operator builds data rather than computing.
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        matches!(self, Self::Colon | Self::InfixConstr(_))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composition => write!(f, "."),
            Self::Power => write!(f, "^"),
            Self::Mul => write!(f, "*"),
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Colon => write!(f, ":"),
            Self::Append => write!(f, "++"),
            Self::Equ => write!(f, "=="),
            Self::Neq => write!(f, "/="),
            Self::Lt => write!(f, "<"),
            Self::Leq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Geq => write!(f, ">="),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Dollar => write!(f, "$"),
            Self::InfixFunc(name) => write!(f, "`{name}`"),
            Self::InfixConstr(sym) => write!(f, "{sym}"),
        }
    }
}
