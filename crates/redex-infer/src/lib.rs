//! Hindley-Milner type inference for the redex language.
//!
//! Inference runs in two phases. Constraint generation walks an
//! index-decorated tree allocating a fresh type variable per node and
//! emitting equality constraints tagged with node indices
//! ([`index_expr`], [`Constraint`]); unification then solves the
//! constraints in order ([`solve`]) and the resulting substitution rebuilds
//! a fully annotated tree. Free type variables are canonically renamed to
//! `a, b, c, …` before anything is handed back.
//!
//! Entry points:
//!
//! - [`build_type_env`] groups a program's clauses by name and infers one
//!   scheme per group, deferring a group that demands a not-yet-typed name;
//! - [`type_tree`] types a focus expression against an environment;
//! - [`type_tree_partial`] never fails: type errors are localised into the
//!   tree as [`redex_ast::Type::Error`] metas on the nodes that could not
//!   be typed, while independent subtrees keep their types.
//!
//! ## Example
//!
//! ```
//! use redex_ast::{RawBinding, RawExpr};
//! use redex_infer::{TypeEnv, type_tree};
//!
//! // \x -> x  ::  a -> a
//! let id = RawExpr::lambda(vec![RawBinding::name("x")], RawExpr::name("x"));
//! let typed = type_tree(&TypeEnv::new(), &id).unwrap();
//! assert_eq!(typed.meta().as_ref().unwrap().to_string(), "a -> a");
//! ```

use std::collections::VecDeque;

use log::debug;
use redex_ast::{Definition, RawExpr, TypeError, TypedExpr};
use rustc_hash::FxHashSet;

pub mod constraint;
pub mod env;
mod infer;
pub mod index;
pub mod normalize;
mod partial;
pub mod subst;
pub mod unify;

pub use constraint::Constraint;
pub use env::{TypeEnv, generalize};
pub use index::{
    Indexed, IndexedBinding, IndexedExpr, index_binding, index_expr, strip_indices,
};
pub use normalize::{
    normalize_scheme, normalize_type, normalize_type_error, normalize_typed_expr,
};
pub use partial::type_tree_partial;
pub use subst::{Subst, Substitutable};
pub use unify::{solve, unify};

use infer::{InferCtx, infer_group, infer_tree};

/// Infers a fully annotated typed tree for an expression: every node,
/// operator, and pattern carries `Some(type)`, canonically renamed.
///
/// ## Errors
///
/// The first [`TypeError`] encountered, canonically renamed. Use
/// [`type_tree_partial`] to localise errors into the tree instead.
pub fn type_tree(env: &TypeEnv, expr: &RawExpr) -> Result<TypedExpr, TypeError> {
    let mut ctx = InferCtx::new();
    match infer_tree(&mut ctx, env, expr) {
        Ok(typed) => Ok(normalize_typed_expr(typed)),
        Err(err) => Err(normalize_type_error(&err)),
    }
}

struct Group<'a> {
    name: String,
    defs: Vec<&'a Definition>,
    deferred: FxHashSet<String>,
}

/// Builds the type environment of a program from scratch.
///
/// ## Errors
///
/// See [`build_type_env_in`].
pub fn build_type_env(defs: &[Definition]) -> Result<TypeEnv, TypeError> {
    build_type_env_in(&TypeEnv::new(), defs)
}

/// Builds the type environment of a program on top of an initial
/// environment (typically the compiled data-constructor schemes).
///
/// Clauses are grouped by name in first-occurrence order and each group is
/// inferred as one unit. A group that fails with an unbound variable
/// naming a later group is deferred: the demanded group is rotated to the
/// head of the queue and the failing group retried right after it, giving
/// a demand-driven topological order. Each group is deferred at most once
/// per missing symbol.
///
/// ## Errors
///
/// The first inference error that deferral cannot resolve, canonically
/// renamed.
pub fn build_type_env_in(initial: &TypeEnv, defs: &[Definition]) -> Result<TypeEnv, TypeError> {
    let mut queue: VecDeque<Group<'_>> = VecDeque::new();
    for def in defs {
        if let Some(group) = queue.iter_mut().find(|g| g.name == def.name) {
            group.defs.push(def);
        } else {
            queue.push_back(Group {
                name: def.name.clone(),
                defs: vec![def],
                deferred: FxHashSet::default(),
            });
        }
    }
    let mut env = initial.clone();
    let mut ctx = InferCtx::new();
    while let Some(mut group) = queue.pop_front() {
        match infer_group(&mut ctx, &env, &group.name, &group.defs) {
            Ok(scheme) => {
                let scheme = normalize_scheme(&scheme);
                debug!("typed '{}' :: {scheme}", group.name);
                env.extend(group.name, scheme);
            }
            Err(TypeError::UnboundVariable(missing))
                if !group.deferred.contains(&missing)
                    && queue.iter().any(|g| g.name == missing) =>
            {
                debug!("deferring '{}' until '{missing}' is typed", group.name);
                if let Some(position) = queue.iter().position(|g| g.name == missing) {
                    let demanded = queue.remove(position);
                    let _ = group.deferred.insert(missing);
                    queue.push_front(group);
                    if let Some(demanded) = demanded {
                        queue.push_front(demanded);
                    }
                }
            }
            Err(err) => return Err(normalize_type_error(&err)),
        }
    }
    Ok(env)
}
