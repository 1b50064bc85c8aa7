//! Partial typing.
//!
//! Partial typing never fails outward: when inference of a node cannot be
//! completed, the error is embedded as that node's meta while every child
//! is typed independently under the same environment (binders in scope are
//! bound to fresh variables so subtrees type as far as possible). The
//! result is always a tree, and error localisation is best-effort visual.

use redex_ast::{
    Atom, Binding, ConstrPattern, Expr, OpMeta, Qual, RawBinding, RawExpr, Scheme, Type,
    TypeError, TypedBinding, TypedExpr,
};

use crate::env::TypeEnv;
use crate::infer::{InferCtx, infer_tree};
use crate::normalize::{normalize_type_error, normalize_typed_expr};

/// Types an expression, localising any failure into the tree instead of
/// reporting it. Always succeeds.
#[must_use]
pub fn type_tree_partial(env: &TypeEnv, expr: &RawExpr) -> TypedExpr {
    let mut ctx = InferCtx::new();
    normalize_typed_expr(partial(&mut ctx, env, expr))
}

fn partial(ctx: &mut InferCtx, env: &TypeEnv, expr: &RawExpr) -> TypedExpr {
    match infer_tree(ctx, env, expr) {
        Ok(typed) => typed,
        Err(err) => spread(ctx, env, expr, &err),
    }
}

/// Rebuilds a failed node: the error becomes its meta and the children are
/// retyped independently.
fn spread(ctx: &mut InferCtx, env: &TypeEnv, expr: &RawExpr, err: &TypeError) -> TypedExpr {
    let meta = Some(Type::Error(Box::new(normalize_type_error(err))));
    match expr {
        Expr::Atom { atom, .. } => Expr::Atom { meta, atom: atom.clone() },
        Expr::List { items, .. } => Expr::List {
            meta,
            items: items.iter().map(|e| partial(ctx, env, e)).collect(),
        },
        Expr::NTuple { items, .. } => Expr::NTuple {
            meta,
            items: items.iter().map(|e| partial(ctx, env, e)).collect(),
        },
        Expr::Binary { op, lhs, rhs, .. } => Expr::Binary {
            meta,
            op: untyped(op),
            lhs: Box::new(partial(ctx, env, lhs)),
            rhs: Box::new(partial(ctx, env, rhs)),
        },
        Expr::Unary { op, expr: operand, .. } => Expr::Unary {
            meta,
            op: untyped(op),
            expr: Box::new(partial(ctx, env, operand)),
        },
        Expr::SectL { expr: captured, op, .. } => Expr::SectL {
            meta,
            expr: Box::new(partial(ctx, env, captured)),
            op: untyped(op),
        },
        Expr::SectR { op, expr: captured, .. } => Expr::SectR {
            meta,
            op: untyped(op),
            expr: Box::new(partial(ctx, env, captured)),
        },
        Expr::PrefixOp { op, .. } => Expr::PrefixOp { meta, op: untyped(op) },
        Expr::IfExpr { cond, then_branch, else_branch, .. } => Expr::IfExpr {
            meta,
            cond: Box::new(partial(ctx, env, cond)),
            then_branch: Box::new(partial(ctx, env, then_branch)),
            else_branch: Box::new(partial(ctx, env, else_branch)),
        },
        Expr::ArithmSeq { start, step, end, .. } => Expr::ArithmSeq {
            meta,
            start: Box::new(partial(ctx, env, start)),
            step: step.as_deref().map(|e| Box::new(partial(ctx, env, e))),
            end: end.as_deref().map(|e| Box::new(partial(ctx, env, e))),
        },
        Expr::LetExpr { bindings, body, .. } => {
            let mut inner = env.clone();
            let mut typed_bindings = Vec::with_capacity(bindings.len());
            for (pattern, rhs) in bindings {
                let rhs = partial(ctx, &inner, rhs);
                let (pattern, mappings) = fresh_pattern(ctx, pattern);
                inner.extend_many(
                    mappings.into_iter().map(|(name, ty)| (name, Scheme::mono(ty))),
                );
                typed_bindings.push((pattern, rhs));
            }
            Expr::LetExpr {
                meta,
                bindings: typed_bindings,
                body: Box::new(partial(ctx, &inner, body)),
            }
        }
        Expr::Lambda { params, body, .. } => {
            let mut inner = env.clone();
            let mut typed_params = Vec::with_capacity(params.len());
            for param in params {
                let (param, mappings) = fresh_pattern(ctx, param);
                inner.extend_many(
                    mappings.into_iter().map(|(name, ty)| (name, Scheme::mono(ty))),
                );
                typed_params.push(param);
            }
            Expr::Lambda {
                meta,
                params: typed_params,
                body: Box::new(partial(ctx, &inner, body)),
            }
        }
        Expr::App { func, args, .. } => Expr::App {
            meta,
            func: Box::new(partial(ctx, env, func)),
            args: args.iter().map(|e| partial(ctx, env, e)).collect(),
        },
        Expr::ListComp { head, quals, .. } => {
            let mut inner = env.clone();
            let mut typed_quals = Vec::with_capacity(quals.len());
            for qual in quals {
                match qual {
                    Qual::Gen { binding, expr: source, .. } => {
                        let source = partial(ctx, &inner, source);
                        let (binding, mappings) = fresh_pattern(ctx, binding);
                        inner.extend_many(
                            mappings.into_iter().map(|(name, ty)| (name, Scheme::mono(ty))),
                        );
                        typed_quals.push(Qual::Gen { meta: None, binding, expr: source });
                    }
                    Qual::Let { binding, expr: rhs, .. } => {
                        let rhs = partial(ctx, &inner, rhs);
                        let (binding, mappings) = fresh_pattern(ctx, binding);
                        inner.extend_many(
                            mappings.into_iter().map(|(name, ty)| (name, Scheme::mono(ty))),
                        );
                        typed_quals.push(Qual::Let { meta: None, binding, expr: rhs });
                    }
                    Qual::Guard { expr: cond, .. } => {
                        typed_quals.push(Qual::Guard {
                            meta: None,
                            expr: partial(ctx, &inner, cond),
                        });
                    }
                }
            }
            let head = partial(ctx, &inner, head);
            Expr::ListComp { meta, head: Box::new(head), quals: typed_quals }
        }
    }
}

fn untyped(op: &OpMeta<()>) -> OpMeta<Option<Type>> {
    OpMeta { op: op.op.clone(), meta: None }
}

/// Decorates a pattern with fresh type variables so the names it binds can
/// participate in typing the surviving subtrees.
fn fresh_pattern(ctx: &mut InferCtx, binding: &RawBinding) -> (TypedBinding, Vec<(String, Type)>) {
    match binding {
        Binding::Lit { atom: atom @ Atom::Name(name), .. } => {
            let tv = ctx.fresh();
            let mappings = if name == "_" {
                Vec::new()
            } else {
                vec![(name.clone(), tv.clone())]
            };
            (Binding::Lit { meta: Some(tv), atom: atom.clone() }, mappings)
        }
        Binding::Lit { atom, .. } => {
            let ty = match atom {
                Atom::Int(_) => Type::int(),
                Atom::Bool(_) => Type::bool(),
                Atom::Char(_) => Type::char(),
                Atom::Constr(_) | Atom::Name(_) => ctx.fresh(),
            };
            (Binding::Lit { meta: Some(ty), atom: atom.clone() }, Vec::new())
        }
        Binding::ConsLit { head, tail, .. } => {
            let (head, mut mappings) = fresh_pattern(ctx, head);
            let (tail, more) = fresh_pattern(ctx, tail);
            mappings.extend(more);
            let ty = head.meta().clone().map(Type::list);
            (Binding::ConsLit { meta: ty, head: Box::new(head), tail: Box::new(tail) }, mappings)
        }
        Binding::ListLit { items, .. } => {
            let mut mappings = Vec::new();
            let typed = items
                .iter()
                .map(|item| {
                    let (item, more) = fresh_pattern(ctx, item);
                    mappings.extend(more);
                    item
                })
                .collect();
            (Binding::ListLit { meta: Some(ctx.fresh()), items: typed }, mappings)
        }
        Binding::NTupleLit { items, .. } => {
            let mut mappings = Vec::new();
            let typed: Vec<TypedBinding> = items
                .iter()
                .map(|item| {
                    let (item, more) = fresh_pattern(ctx, item);
                    mappings.extend(more);
                    item
                })
                .collect();
            let ty = typed
                .iter()
                .map(|item| item.meta().clone().unwrap_or(Type::Unknown))
                .collect();
            (Binding::NTupleLit { meta: Some(Type::Tuple(ty)), items: typed }, mappings)
        }
        Binding::ConstrLit { pattern, .. } => {
            let mut mappings = Vec::new();
            let pattern = match pattern {
                ConstrPattern::Prefix { name, args } => ConstrPattern::Prefix {
                    name: name.clone(),
                    args: args
                        .iter()
                        .map(|arg| {
                            let (arg, more) = fresh_pattern(ctx, arg);
                            mappings.extend(more);
                            arg
                        })
                        .collect(),
                },
                ConstrPattern::Infix { symbol, lhs, rhs } => {
                    let (lhs, more) = fresh_pattern(ctx, lhs);
                    mappings.extend(more);
                    let (rhs, even_more) = fresh_pattern(ctx, rhs);
                    mappings.extend(even_more);
                    ConstrPattern::Infix {
                        symbol: symbol.clone(),
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    }
                }
            };
            (Binding::ConstrLit { meta: Some(ctx.fresh()), pattern }, mappings)
        }
    }
}
