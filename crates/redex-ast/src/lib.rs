//! Syntax tree and type terms for the redex language.
//!
//! This crate models a small pure lazy functional expression language:
//! atoms, lists, tuples, arithmetic sequences, list comprehensions,
//! let-expressions, lambdas, applications, operator sections, and
//! user-declared algebraic data types. The same tree shape carries the
//! untyped, typed, and index-decorated forms of a program through a
//! per-node meta slot (see [`expr::Expr`]).
//!
//! The crate is deliberately free of evaluation and inference logic: the
//! `redex-eval` and `redex-infer` crates consume these definitions.

pub mod atom;
pub mod binding;
pub mod def;
pub mod expr;
pub mod path;
pub mod ty;

pub use atom::{Atom, Op};
pub use binding::{Binding, ConstrPattern, RawBinding, TypedBinding};
pub use def::{AdtDef, Assoc, DataConstructor, Definition};
pub use expr::{Expr, OpMeta, Qual, RawExpr, TypedExpr};
pub use path::PathStep;
pub use ty::{Scheme, Type, TypeError};
