//! Small-step lazy evaluator for the redex language.
//!
//! The evaluator reduces expressions one step at a time so a host can show
//! every intermediate form of a computation:
//!
//! - [`step`] descends a navigation path and reduces the selected
//!   sub-expression by one step;
//! - [`eval_all`] drives the stepper to a fixpoint;
//! - [`defs_to_env`] turns a program's definitions into the clause
//!   environment both of them consult.
//!
//! Laziness is pattern-driven: matching a clause head forces each argument
//! only as far as its pattern inspects it (see [`eval_to_binding`]), and a
//! clause whose match cannot be decided yet aborts resolution rather than
//! forcing more.
//!
//! ## Example
//!
//! ```
//! use redex_ast::{Definition, RawBinding, RawExpr, Op};
//! use redex_eval::{defs_to_env, step};
//!
//! // double x = x + x
//! let defs = vec![Definition::new(
//!     "double",
//!     vec![RawBinding::name("x")],
//!     RawExpr::binary(Op::Add, RawExpr::name("x"), RawExpr::name("x")),
//! )];
//! let env = defs_to_env(&defs);
//!
//! let expr = RawExpr::app(RawExpr::name("double"), vec![RawExpr::int(21)]);
//! let once = step(&env, &[], &expr).unwrap();
//! assert_eq!(once, RawExpr::binary(Op::Add, RawExpr::int(21), RawExpr::int(21)));
//! ```

mod arith;
pub mod env;
pub mod error;
pub mod eval;
pub mod matching;
pub mod subst;

pub use env::{Clause, EvalEnv, defs_to_env};
pub use error::{EvalError, MatchingError};
pub use eval::{eval1, eval_all, eval_to_binding, step};
pub use matching::{Matches, is_whnf, match_binding};
pub use subst::{free_variables, substitute};
