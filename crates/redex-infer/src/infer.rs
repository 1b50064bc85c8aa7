//! Constraint generation.
//!
//! Generation walks an index-decorated tree inside an explicit context
//! (environment by reference, fresh-variable counter by value). Every node
//! receives a fresh type variable as its meta, tied to the node's
//! structural type by an equality constraint tagged with the node's index.

use redex_ast::{
    Atom, Binding, ConstrPattern, Definition, Expr, Op, OpMeta, Qual, RawExpr, Scheme, Type,
    TypeError, TypedExpr,
};
use rustc_hash::FxHashSet;

use crate::constraint::Constraint;
use crate::env::{TypeEnv, generalize};
use crate::index::{Indexed, IndexedBinding, IndexedExpr, index_binding, index_expr, strip_indices};
use crate::subst::Substitutable;
use crate::unify::solve;

/// The mutable state threaded through one inference run: a monotonically
/// increasing counter for fresh type variables.
#[derive(Debug, Default)]
pub(crate) struct InferCtx {
    counter: usize,
}

impl InferCtx {
    pub(crate) fn new() -> Self { Self::default() }

    fn fresh_name(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("t{n}")
    }

    /// A fresh type variable.
    pub(crate) fn fresh(&mut self) -> Type { Type::Var(self.fresh_name()) }

    /// Replaces a scheme's quantified variables with fresh ones.
    pub(crate) fn instantiate(&mut self, scheme: &Scheme) -> Type {
        let fresh: crate::subst::Subst = scheme
            .vars
            .iter()
            .map(|v| (v.clone(), self.fresh()))
            .collect();
        scheme.ty.apply(&fresh)
    }
}

/// The type variable allocated for a generated node.
fn node_ty(expr: &IndexedExpr) -> Type {
    expr.meta().ty.clone().unwrap_or(Type::Unknown)
}

fn int_binop() -> Type {
    Type::fun(Type::int(), Type::fun(Type::int(), Type::int()))
}

/// The type of an operator used as a function, freshly instantiated.
fn infer_op(ctx: &mut InferCtx, env: &TypeEnv, op: &Op) -> Result<Type, TypeError> {
    Ok(match op {
        Op::Composition => {
            let (a, b, c) = (ctx.fresh(), ctx.fresh(), ctx.fresh());
            Type::fun(
                Type::fun(b.clone(), c.clone()),
                Type::fun(Type::fun(a.clone(), b), Type::fun(a, c)),
            )
        }
        Op::Power | Op::Mul | Op::Add | Op::Sub => int_binop(),
        Op::Colon => {
            let a = ctx.fresh();
            Type::fun(a.clone(), Type::fun(Type::list(a.clone()), Type::list(a)))
        }
        Op::Append => {
            let a = Type::list(ctx.fresh());
            Type::fun(a.clone(), Type::fun(a.clone(), a))
        }
        Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => {
            let a = ctx.fresh();
            Type::fun(a.clone(), Type::fun(a, Type::bool()))
        }
        Op::And | Op::Or => {
            Type::fun(Type::bool(), Type::fun(Type::bool(), Type::bool()))
        }
        Op::Dollar => {
            let (a, b) = (ctx.fresh(), ctx.fresh());
            Type::fun(Type::fun(a.clone(), b.clone()), Type::fun(a, b))
        }
        Op::InfixFunc(name) => {
            if name == "div" || name == "mod" {
                int_binop()
            } else {
                let scheme = env
                    .lookup(name)
                    .ok_or_else(|| TypeError::UnboundVariable(name.clone()))?;
                ctx.instantiate(scheme)
            }
        }
        Op::InfixConstr(symbol) => {
            let scheme = env
                .lookup(symbol)
                .ok_or_else(|| TypeError::UnknownDataConstructor(symbol.clone()))?;
            ctx.instantiate(scheme)
        }
    })
}

/// The type of a unary operator: only negation exists.
fn infer_unop(op: &Op) -> Result<Type, TypeError> {
    match op {
        Op::Sub => Ok(Type::fun(Type::int(), Type::int())),
        other => Err(TypeError::UnknownError(format!("no unary operator {other}"))),
    }
}

/// Rejects duplicate pattern variables within one binder group.
fn check_overlap(mappings: &[(String, Type)]) -> Result<(), TypeError> {
    let mut seen = FxHashSet::default();
    for (name, _) in mappings {
        if !seen.insert(name.clone()) {
            return Err(TypeError::conflicting_definitions(name));
        }
    }
    Ok(())
}

fn monomorphic(mappings: Vec<(String, Type)>) -> impl Iterator<Item = (String, Scheme)> {
    mappings.into_iter().map(|(name, ty)| (name, Scheme::mono(ty)))
}

/// Derives a type and a variable environment from a pattern, allocating a
/// fresh variable for every name it binds and filling its type slots.
///
/// Returns the typed pattern, its overall type, and the name-to-type
/// mappings in appearance order.
pub(crate) fn extract_binding(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    binding: &IndexedBinding,
    out: &mut Vec<Constraint>,
) -> Result<(IndexedBinding, Type, Vec<(String, Type)>), TypeError> {
    match binding {
        Binding::Lit { meta, atom: atom @ Atom::Name(name) } => {
            let tv = ctx.fresh();
            let mappings = if name == "_" {
                Vec::new()
            } else {
                vec![(name.clone(), tv.clone())]
            };
            let typed = Binding::Lit {
                meta: Indexed { ty: Some(tv.clone()), index: meta.index },
                atom: atom.clone(),
            };
            Ok((typed, tv, mappings))
        }
        Binding::Lit { meta, atom } => {
            let ty = match atom {
                Atom::Int(_) => Type::int(),
                Atom::Bool(_) => Type::bool(),
                Atom::Char(_) => Type::char(),
                Atom::Constr(c) => {
                    let scheme = env
                        .lookup(c)
                        .ok_or_else(|| TypeError::UnknownDataConstructor(c.clone()))?;
                    ctx.instantiate(scheme)
                }
                Atom::Name(_) => Type::Unknown,
            };
            let typed = Binding::Lit {
                meta: Indexed { ty: Some(ty.clone()), index: meta.index },
                atom: atom.clone(),
            };
            Ok((typed, ty, Vec::new()))
        }
        Binding::ConsLit { meta, head, tail } => {
            let (head, head_ty, mut mappings) = extract_binding(ctx, env, head, out)?;
            let (tail, tail_ty, more) = extract_binding(ctx, env, tail, out)?;
            mappings.extend(more);
            // The tail's element type is the head's type.
            let ty = Type::list(head_ty);
            out.push(Constraint::Eq { lhs: tail_ty, rhs: ty.clone(), origin: meta.index });
            let typed = Binding::ConsLit {
                meta: Indexed { ty: Some(ty.clone()), index: meta.index },
                head: Box::new(head),
                tail: Box::new(tail),
            };
            Ok((typed, ty, mappings))
        }
        Binding::ListLit { meta, items } => {
            let elem = ctx.fresh();
            let mut typed_items = Vec::with_capacity(items.len());
            let mut mappings = Vec::new();
            for item in items {
                let origin = item.meta().index;
                let (typed, ty, more) = extract_binding(ctx, env, item, out)?;
                out.push(Constraint::Eq { lhs: ty, rhs: elem.clone(), origin });
                typed_items.push(typed);
                mappings.extend(more);
            }
            let ty = Type::list(elem);
            let typed = Binding::ListLit {
                meta: Indexed { ty: Some(ty.clone()), index: meta.index },
                items: typed_items,
            };
            Ok((typed, ty, mappings))
        }
        Binding::NTupleLit { meta, items } => {
            let mut typed_items = Vec::with_capacity(items.len());
            let mut item_tys = Vec::with_capacity(items.len());
            let mut mappings = Vec::new();
            for item in items {
                let (typed, ty, more) = extract_binding(ctx, env, item, out)?;
                typed_items.push(typed);
                item_tys.push(ty);
                mappings.extend(more);
            }
            let ty = Type::Tuple(item_tys);
            let typed = Binding::NTupleLit {
                meta: Indexed { ty: Some(ty.clone()), index: meta.index },
                items: typed_items,
            };
            Ok((typed, ty, mappings))
        }
        Binding::ConstrLit { meta, pattern } => {
            let printable = || Box::new(binding.clone().map_meta(&mut |_| ()));
            let (name, args): (&str, Vec<&IndexedBinding>) = match pattern {
                ConstrPattern::Prefix { name, args } => (name, args.iter().collect()),
                ConstrPattern::Infix { symbol, lhs, rhs } => {
                    (symbol, vec![lhs.as_ref(), rhs.as_ref()])
                }
            };
            let scheme = env
                .lookup(name)
                .ok_or_else(|| TypeError::UnknownDataConstructor(name.to_string()))?;
            let mut ctor_ty = ctx.instantiate(scheme);
            let mut typed_args = Vec::with_capacity(args.len());
            let mut mappings = Vec::new();
            for arg in args {
                let (param, rest) = match ctor_ty {
                    Type::Arr(param, rest) => (param, rest),
                    other => {
                        return Err(TypeError::PatternMismatch {
                            pattern: printable(),
                            ty: Box::new(other),
                        });
                    }
                };
                let origin = arg.meta().index;
                let (typed, ty, more) = extract_binding(ctx, env, arg, out)?;
                out.push(Constraint::Eq { lhs: ty, rhs: *param, origin });
                typed_args.push(typed);
                mappings.extend(more);
                ctor_ty = *rest;
            }
            if matches!(ctor_ty, Type::Arr(_, _)) {
                // Unsaturated constructor patterns are not a thing.
                return Err(TypeError::PatternMismatch {
                    pattern: printable(),
                    ty: Box::new(ctor_ty),
                });
            }
            let typed_pattern = match pattern {
                ConstrPattern::Prefix { name, .. } => {
                    ConstrPattern::Prefix { name: name.clone(), args: typed_args }
                }
                ConstrPattern::Infix { symbol, .. } => {
                    let mut drained = typed_args.into_iter();
                    let lhs = drained.next().map(Box::new);
                    let rhs = drained.next().map(Box::new);
                    match (lhs, rhs) {
                        (Some(lhs), Some(rhs)) => {
                            ConstrPattern::Infix { symbol: symbol.clone(), lhs, rhs }
                        }
                        _ => {
                            return Err(TypeError::PatternMismatch {
                                pattern: printable(),
                                ty: Box::new(ctor_ty),
                            });
                        }
                    }
                }
            };
            let typed = Binding::ConstrLit {
                meta: Indexed { ty: Some(ctor_ty.clone()), index: meta.index },
                pattern: typed_pattern,
            };
            Ok((typed, ctor_ty, mappings))
        }
    }
}

/// Generates constraints for an index-decorated expression, filling every
/// type slot with the node's fresh variable.
pub(crate) fn generate(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    expr: IndexedExpr,
    out: &mut Vec<Constraint>,
) -> Result<IndexedExpr, TypeError> {
    match expr {
        Expr::Atom { meta, atom } => {
            let ty = match &atom {
                Atom::Int(_) => Type::int(),
                Atom::Bool(_) => Type::bool(),
                Atom::Char(_) => Type::char(),
                Atom::Name(n) if n == "div" || n == "mod" => int_binop(),
                Atom::Name(n) => {
                    let scheme = env
                        .lookup(n)
                        .ok_or_else(|| TypeError::UnboundVariable(n.clone()))?;
                    ctx.instantiate(scheme)
                }
                Atom::Constr(c) => {
                    let scheme = env
                        .lookup(c)
                        .ok_or_else(|| TypeError::UnknownDataConstructor(c.clone()))?;
                    ctx.instantiate(scheme)
                }
            };
            let tv = ctx.fresh();
            out.push(Constraint::Eq { lhs: tv.clone(), rhs: ty, origin: meta.index });
            Ok(Expr::Atom { meta: Indexed { ty: Some(tv), index: meta.index }, atom })
        }
        Expr::List { meta, items } => {
            let elem = ctx.fresh();
            let mut typed = Vec::with_capacity(items.len());
            for item in items {
                let origin = item.meta().index;
                let item = generate(ctx, env, item, out)?;
                out.push(Constraint::Eq {
                    lhs: node_ty(&item),
                    rhs: elem.clone(),
                    origin,
                });
                typed.push(item);
            }
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::list(elem),
                origin: meta.index,
            });
            Ok(Expr::List { meta: Indexed { ty: Some(tv), index: meta.index }, items: typed })
        }
        Expr::NTuple { meta, items } => {
            let mut typed = Vec::with_capacity(items.len());
            let mut tys = Vec::with_capacity(items.len());
            for item in items {
                let item = generate(ctx, env, item, out)?;
                tys.push(node_ty(&item));
                typed.push(item);
            }
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::Tuple(tys),
                origin: meta.index,
            });
            Ok(Expr::NTuple { meta: Indexed { ty: Some(tv), index: meta.index }, items: typed })
        }
        Expr::Binary { meta, op, lhs, rhs } => {
            let lhs = generate(ctx, env, *lhs, out)?;
            let rhs = generate(ctx, env, *rhs, out)?;
            let op_ty = infer_op(ctx, env, &op.op)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: op_ty.clone(),
                rhs: Type::fun(node_ty(&lhs), Type::fun(node_ty(&rhs), tv.clone())),
                origin: meta.index,
            });
            Ok(Expr::Binary {
                meta: Indexed { ty: Some(tv), index: meta.index },
                op: OpMeta { op: op.op, meta: Indexed { ty: Some(op_ty), index: op.meta.index } },
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            })
        }
        Expr::Unary { meta, op, expr: operand } => {
            let operand = generate(ctx, env, *operand, out)?;
            let op_ty = infer_unop(&op.op)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: op_ty.clone(),
                rhs: Type::fun(node_ty(&operand), tv.clone()),
                origin: meta.index,
            });
            Ok(Expr::Unary {
                meta: Indexed { ty: Some(tv), index: meta.index },
                op: OpMeta { op: op.op, meta: Indexed { ty: Some(op_ty), index: op.meta.index } },
                expr: Box::new(operand),
            })
        }
        Expr::SectL { meta, expr: captured, op } => {
            let captured = generate(ctx, env, *captured, out)?;
            let op_ty = infer_op(ctx, env, &op.op)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: op_ty.clone(),
                rhs: Type::fun(node_ty(&captured), tv.clone()),
                origin: meta.index,
            });
            Ok(Expr::SectL {
                meta: Indexed { ty: Some(tv), index: meta.index },
                expr: Box::new(captured),
                op: OpMeta { op: op.op, meta: Indexed { ty: Some(op_ty), index: op.meta.index } },
            })
        }
        Expr::SectR { meta, op, expr: captured } => {
            let captured = generate(ctx, env, *captured, out)?;
            let op_ty = infer_op(ctx, env, &op.op)?;
            let arg = ctx.fresh();
            let result = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: op_ty.clone(),
                rhs: Type::fun(
                    arg.clone(),
                    Type::fun(node_ty(&captured), result.clone()),
                ),
                origin: meta.index,
            });
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::fun(arg, result),
                origin: meta.index,
            });
            Ok(Expr::SectR {
                meta: Indexed { ty: Some(tv), index: meta.index },
                op: OpMeta { op: op.op, meta: Indexed { ty: Some(op_ty), index: op.meta.index } },
                expr: Box::new(captured),
            })
        }
        Expr::PrefixOp { meta, op } => {
            let op_ty = infer_op(ctx, env, &op.op)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: op_ty.clone(),
                origin: meta.index,
            });
            Ok(Expr::PrefixOp {
                meta: Indexed { ty: Some(tv), index: meta.index },
                op: OpMeta { op: op.op, meta: Indexed { ty: Some(op_ty), index: op.meta.index } },
            })
        }
        Expr::IfExpr { meta, cond, then_branch, else_branch } => {
            let cond = generate(ctx, env, *cond, out)?;
            let then_branch = generate(ctx, env, *then_branch, out)?;
            let else_branch = generate(ctx, env, *else_branch, out)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: node_ty(&cond),
                rhs: Type::bool(),
                origin: cond.meta().index,
            });
            out.push(Constraint::Eq {
                lhs: node_ty(&then_branch),
                rhs: tv.clone(),
                origin: then_branch.meta().index,
            });
            out.push(Constraint::Eq {
                lhs: node_ty(&else_branch),
                rhs: tv.clone(),
                origin: else_branch.meta().index,
            });
            Ok(Expr::IfExpr {
                meta: Indexed { ty: Some(tv), index: meta.index },
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            })
        }
        Expr::ArithmSeq { meta, start, step, end } => {
            let start = generate(ctx, env, *start, out)?;
            let elem = node_ty(&start);
            let step = match step {
                None => None,
                Some(e) => {
                    let e = generate(ctx, env, *e, out)?;
                    out.push(Constraint::Eq {
                        lhs: node_ty(&e),
                        rhs: elem.clone(),
                        origin: e.meta().index,
                    });
                    Some(Box::new(e))
                }
            };
            let end = match end {
                None => None,
                Some(e) => {
                    let e = generate(ctx, env, *e, out)?;
                    out.push(Constraint::Eq {
                        lhs: node_ty(&e),
                        rhs: elem.clone(),
                        origin: e.meta().index,
                    });
                    Some(Box::new(e))
                }
            };
            out.push(Constraint::Enumerable { ty: elem.clone(), origin: meta.index });
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::list(elem),
                origin: meta.index,
            });
            Ok(Expr::ArithmSeq {
                meta: Indexed { ty: Some(tv), index: meta.index },
                start: Box::new(start),
                step,
                end,
            })
        }
        Expr::LetExpr { meta, bindings, body } => {
            let mut inner = env.clone();
            let mut typed_bindings = Vec::with_capacity(bindings.len());
            let mut all_mappings = Vec::new();
            for (pattern, rhs) in bindings {
                let origin = rhs.meta().index;
                let rhs = generate(ctx, &inner, rhs, out)?;
                let (pattern, pattern_ty, mappings) =
                    extract_binding(ctx, &inner, &pattern, out)?;
                out.push(Constraint::Eq { lhs: pattern_ty, rhs: node_ty(&rhs), origin });
                inner.extend_many(monomorphic(mappings.clone()));
                all_mappings.extend(mappings);
                typed_bindings.push((pattern, rhs));
            }
            check_overlap(&all_mappings)?;
            let body = generate(ctx, &inner, *body, out)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: node_ty(&body),
                origin: meta.index,
            });
            Ok(Expr::LetExpr {
                meta: Indexed { ty: Some(tv), index: meta.index },
                bindings: typed_bindings,
                body: Box::new(body),
            })
        }
        Expr::Lambda { meta, params, body } => {
            let mut typed_params = Vec::with_capacity(params.len());
            let mut param_tys = Vec::with_capacity(params.len());
            let mut mappings = Vec::new();
            for param in &params {
                let (typed, ty, more) = extract_binding(ctx, env, param, out)?;
                typed_params.push(typed);
                param_tys.push(ty);
                mappings.extend(more);
            }
            check_overlap(&mappings)?;
            let mut inner = env.clone();
            inner.extend_many(monomorphic(mappings));
            let body = generate(ctx, &inner, *body, out)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::fun_from(param_tys, node_ty(&body)),
                origin: meta.index,
            });
            Ok(Expr::Lambda {
                meta: Indexed { ty: Some(tv), index: meta.index },
                params: typed_params,
                body: Box::new(body),
            })
        }
        Expr::App { meta, func, args } => {
            let func = generate(ctx, env, *func, out)?;
            let mut current = node_ty(&func);
            let mut typed = Vec::with_capacity(args.len());
            for arg in args {
                let arg = generate(ctx, env, arg, out)?;
                let result = ctx.fresh();
                out.push(Constraint::Eq {
                    lhs: current,
                    rhs: Type::fun(node_ty(&arg), result.clone()),
                    origin: meta.index,
                });
                current = result;
                typed.push(arg);
            }
            let tv = ctx.fresh();
            out.push(Constraint::Eq { lhs: tv.clone(), rhs: current, origin: meta.index });
            Ok(Expr::App {
                meta: Indexed { ty: Some(tv), index: meta.index },
                func: Box::new(func),
                args: typed,
            })
        }
        Expr::ListComp { meta, head, quals } => {
            let mut inner = env.clone();
            let mut typed_quals = Vec::with_capacity(quals.len());
            for qual in quals {
                match qual {
                    Qual::Gen { meta: qmeta, binding, expr: source } => {
                        let origin = source.meta().index;
                        let source = generate(ctx, &inner, source, out)?;
                        let (binding, elem_ty, mappings) =
                            extract_binding(ctx, &inner, &binding, out)?;
                        check_overlap(&mappings)?;
                        out.push(Constraint::Eq {
                            lhs: node_ty(&source),
                            rhs: Type::list(elem_ty.clone()),
                            origin,
                        });
                        inner.extend_many(monomorphic(mappings));
                        typed_quals.push(Qual::Gen {
                            meta: Indexed { ty: Some(elem_ty), index: qmeta.index },
                            binding,
                            expr: source,
                        });
                    }
                    Qual::Let { meta: qmeta, binding, expr: rhs } => {
                        let origin = rhs.meta().index;
                        let rhs = generate(ctx, &inner, rhs, out)?;
                        let (binding, pattern_ty, mappings) =
                            extract_binding(ctx, &inner, &binding, out)?;
                        check_overlap(&mappings)?;
                        out.push(Constraint::Eq {
                            lhs: pattern_ty.clone(),
                            rhs: node_ty(&rhs),
                            origin,
                        });
                        inner.extend_many(monomorphic(mappings));
                        typed_quals.push(Qual::Let {
                            meta: Indexed { ty: Some(pattern_ty), index: qmeta.index },
                            binding,
                            expr: rhs,
                        });
                    }
                    Qual::Guard { meta: qmeta, expr: cond } => {
                        let origin = cond.meta().index;
                        let cond = generate(ctx, &inner, cond, out)?;
                        out.push(Constraint::Eq {
                            lhs: node_ty(&cond),
                            rhs: Type::bool(),
                            origin,
                        });
                        typed_quals.push(Qual::Guard {
                            meta: Indexed { ty: Some(Type::bool()), index: qmeta.index },
                            expr: cond,
                        });
                    }
                }
            }
            let head = generate(ctx, &inner, *head, out)?;
            let tv = ctx.fresh();
            out.push(Constraint::Eq {
                lhs: tv.clone(),
                rhs: Type::list(node_ty(&head)),
                origin: meta.index,
            });
            Ok(Expr::ListComp {
                meta: Indexed { ty: Some(tv), index: meta.index },
                head: Box::new(head),
                quals: typed_quals,
            })
        }
    }
}

/// Runs the whole pipeline for one expression: index from zero, generate
/// constraints, solve, apply the substitution, strip the indices.
pub(crate) fn infer_tree(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    expr: &RawExpr,
) -> Result<TypedExpr, TypeError> {
    let (indexed, _) = index_expr(expr, 0);
    let mut out = Vec::new();
    let generated = generate(ctx, env, indexed, &mut out)?;
    let subst = solve(&out)?;
    Ok(strip_indices(generated.apply(&subst)))
}

/// Infers the type of one clause of a definition: its head patterns folded
/// into a function type over the body.
///
/// Returns the clause type, the index of the clause body's root node, and
/// the next free index.
pub(crate) fn infer_clause(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    def: &Definition,
    base: usize,
    out: &mut Vec<Constraint>,
) -> Result<(Type, usize, usize), TypeError> {
    let mut next = base;
    let mut param_tys = Vec::with_capacity(def.patterns.len());
    let mut mappings = Vec::new();
    for pattern in &def.patterns {
        let (indexed, after) = index_binding(pattern, next);
        next = after;
        let (_, ty, more) = extract_binding(ctx, env, &indexed, out)?;
        param_tys.push(ty);
        mappings.extend(more);
    }
    check_overlap(&mappings)?;
    let body_root = next;
    let (indexed_body, after) = index_expr(&def.body, next);
    next = after;
    let mut inner = env.clone();
    inner.extend_many(monomorphic(mappings));
    let body = generate(ctx, &inner, indexed_body, out)?;
    Ok((Type::fun_from(param_tys, node_ty(&body)), body_root, next))
}

/// Infers one scheme for a group of clauses sharing a name.
///
/// The group's name is bound to a single fresh variable while its clauses
/// are inferred, so recursive calls resolve; every clause type is unified
/// with that variable (and hence with the first clause's type).
pub(crate) fn infer_group(
    ctx: &mut InferCtx,
    env: &TypeEnv,
    name: &str,
    defs: &[&Definition],
) -> Result<Scheme, TypeError> {
    let tv = ctx.fresh();
    let inner = env.extended(name, Scheme::mono(tv.clone()));
    let mut out = Vec::new();
    let mut next = 0;
    for def in defs {
        let (clause_ty, body_root, after) = infer_clause(ctx, &inner, def, next, &mut out)?;
        next = after;
        out.push(Constraint::Eq { lhs: tv.clone(), rhs: clause_ty, origin: body_root });
    }
    let subst = solve(&out)?;
    let ty = tv.apply(&subst);
    Ok(generalize(&env.apply(&subst), &ty))
}
