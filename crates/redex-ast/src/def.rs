//! Top-level definitions and algebraic data type declarations.

use std::fmt;

use crate::atom::Atom;
use crate::binding::RawBinding;
use crate::expr::RawExpr;
use crate::ty::{Scheme, Type};

/// A single top-level clause `name p1 … pk = body`.
///
/// A program is an ordered list of definitions; clauses sharing a name are
/// tried in source order when the function is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// The defined name.
    pub name: String,
    /// The clause-head patterns.
    pub patterns: Vec<RawBinding>,
    /// The clause body.
    pub body: RawExpr,
}

impl Definition {
    /// Creates a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, patterns: Vec<RawBinding>, body: RawExpr) -> Self {
        Self { name: name.into(), patterns, body }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for p in &self.patterns {
            write!(f, " {p}")?;
        }
        write!(f, " = {}", self.body)
    }
}

/// Associativity of an infix data constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Left-associative.
    Left,
    /// Right-associative.
    Right,
    /// Non-associative.
    Non,
}

/// One data constructor of an algebraic data type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataConstructor {
    /// A prefix constructor `C t1 … tk`.
    Prefix {
        /// The constructor name.
        name: String,
        /// The parameter types, in order.
        params: Vec<Type>,
    },
    /// An infix constructor `t1 :sym: t2`.
    ///
    /// Associativity and precedence are parsed fixity metadata; only the
    /// operand types participate in checking.
    Infix {
        /// The constructor symbol.
        symbol: String,
        /// Declared associativity.
        assoc: Assoc,
        /// Declared precedence.
        precedence: u8,
        /// Left operand type.
        lhs: Type,
        /// Right operand type.
        rhs: Type,
    },
}

impl DataConstructor {
    /// The constructor's name or symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Prefix { name, .. } => name,
            Self::Infix { symbol, .. } => symbol,
        }
    }

    /// The number of arguments the constructor takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Prefix { params, .. } => params.len(),
            Self::Infix { .. } => 2,
        }
    }

    /// The constructor's type: its parameter types folded into a function
    /// type ending in `result`.
    #[must_use]
    pub fn ty(&self, result: Type) -> Type {
        match self {
            Self::Prefix { params, .. } => Type::fun_from(params.clone(), result),
            Self::Infix { lhs, rhs, .. } => {
                Type::fun_from(vec![lhs.clone(), rhs.clone()], result)
            }
        }
    }
}

/// A user-declared algebraic data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtDef {
    /// The type constructor's name.
    pub name: String,
    /// The type parameters.
    pub params: Vec<String>,
    /// The data constructors.
    pub constructors: Vec<DataConstructor>,
}

impl AdtDef {
    /// The type every constructor of this declaration produces.
    #[must_use]
    pub fn result_type(&self) -> Type {
        Type::Adt(self.name.clone(), self.params.iter().cloned().map(Type::Var).collect())
    }

    /// Compiles each data constructor into an ordinary definition whose body
    /// is the constructor atom, paired with the constructor's type scheme
    /// (quantified over the declaration's type parameters).
    #[must_use]
    pub fn compile(&self) -> Vec<(Definition, Scheme)> {
        let result = self.result_type();
        self.constructors
            .iter()
            .map(|c| {
                let def = Definition::new(
                    c.name(),
                    Vec::new(),
                    RawExpr::atom(Atom::Constr(c.name().to_string())),
                );
                (def, Scheme::poly(self.params.clone(), c.ty(result.clone())))
            })
            .collect()
    }
}
