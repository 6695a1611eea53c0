//! Pass 3: expression typing.
//!
//! Computes a type for every expression and enforces the typing rules:
//! operator operand sets, call arity and argument compatibility, place
//! expressions and mutability on assignment, branch agreement for `if`,
//! and `break`-value joining for `loop`. Diagnostics are collected and the
//! walk continues, so one error does not mask the next.

use rillc_par::{
    ArrayExpr, Ast, BinOp, Block, Expr, ExprKind, FieldInit, Item, LetStmt, MemberName, NodeId,
    PatternKind, Stmt, UnOp,
};
use rillc_util::Span;

use crate::analysis::SemanticAnalyzer;
use crate::scope::{ScopeId, SymbolKind};
use crate::types::{Type, TypeId};

/// Typing context for one function body.
struct FnCtx {
    fn_id: NodeId,
    ret: TypeId,
    loops: Vec<LoopCtx>,
}

/// One enclosing loop; `break` values are only legal in infinite loops.
struct LoopCtx {
    infinite: bool,
    break_types: Vec<(TypeId, Span)>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub(crate) fn check_bodies(&mut self, ast: &Ast) {
        for item in ast {
            match item {
                Item::Fn(item) => {
                    let Some(body) = &item.body else { continue };
                    let Some(&symbol) = self.fn_symbols.get(&item.id) else {
                        continue;
                    };
                    let ret = match self.types.get(self.symbols[symbol].type_id()) {
                        Type::Func { ret, .. } => *ret,
                        _ => self.types.void(),
                    };

                    let mut ctx = FnCtx {
                        fn_id: item.id,
                        ret,
                        loops: Vec::new(),
                    };
                    let body_ty = self.type_block(body, &mut ctx);

                    if body.tail.is_some() && !self.types.equal(body_ty, ret) {
                        let expected = self.types.display(ret);
                        let found = self.types.display(body_ty);
                        self.error(
                            format!(
                                "function `{}` returns `{}` but its body has type `{}`",
                                item.name, expected, found
                            ),
                            body.span,
                        );
                    }
                }
                Item::Const(item) => {
                    let Some(value) = &item.value else { continue };
                    let mut ctx = FnCtx {
                        fn_id: item.id,
                        ret: self.types.void(),
                        loops: Vec::new(),
                    };
                    let value_ty = self.type_expr(value, self.scopes.root(), &mut ctx);
                    if let Some(&symbol) = self.resolutions.get(&item.id) {
                        let declared = self.symbols[symbol].type_id();
                        if !self.types.equal(declared, value_ty) {
                            let expected = self.types.display(declared);
                            let found = self.types.display(value_ty);
                            self.error(
                                format!(
                                    "constant `{}` declared as `{}` but initialized with `{}`",
                                    item.name, expected, found
                                ),
                                item.span,
                            );
                        }
                    }
                }
                Item::Struct(_) | Item::Error(_) => {}
            }
        }
    }

    fn type_block(&mut self, block: &Block, ctx: &mut FnCtx) -> TypeId {
        let scope = self
            .scopes_of
            .get(&block.id)
            .copied()
            .unwrap_or_else(|| self.scopes.root());

        for stmt in &block.stmts {
            match stmt {
                Stmt::Let(let_stmt) => self.type_let(let_stmt, scope, ctx),
                Stmt::Expr(expr) => {
                    self.type_expr(expr, scope, ctx);
                }
                Stmt::Semi(_) | Stmt::Error(_) => {}
            }
        }

        match &block.tail {
            Some(tail) => self.type_expr(tail, scope, ctx),
            None => self.types.void(),
        }
    }

    fn type_let(&mut self, let_stmt: &LetStmt, scope: ScopeId, ctx: &mut FnCtx) {
        let init_ty = let_stmt
            .init
            .as_ref()
            .map(|init| self.type_expr(init, scope, ctx));
        let annotated_ty = let_stmt
            .ty
            .as_ref()
            .map(|ty| self.resolve_type(ty, scope));

        if let (Some(annotated), Some(init)) = (annotated_ty, init_ty) {
            if !self.types.equal(annotated, init) {
                let expected = self.types.display(annotated);
                let found = self.types.display(init);
                self.error(
                    format!(
                        "mismatched types in `let`: annotated `{}`, initializer has `{}`",
                        expected, found
                    ),
                    let_stmt.span,
                );
            }
        }

        let binding_ty = match annotated_ty.or(init_ty) {
            Some(ty) => ty,
            None => {
                self.error("type annotation needed for `let` binding", let_stmt.span);
                self.types.error()
            }
        };

        match &let_stmt.pattern.kind {
            PatternKind::Identifier {
                name,
                is_ref: false,
                is_mut,
                sub: None,
            } => {
                let symbol = self.add_symbol(
                    name,
                    SymbolKind::Let {
                        mutable: *is_mut,
                        ty: binding_ty,
                    },
                );
                self.declare(scope, name, symbol, let_stmt.pattern.span);
                self.resolutions.insert(let_stmt.id, symbol);
                self.resolutions.insert(let_stmt.pattern.id, symbol);
                self.fn_locals.entry(ctx.fn_id).or_default().push(symbol);
            }
            PatternKind::Wildcard => {
                // No binding; the initializer value is dropped.
            }
            _ => {
                self.error(
                    "only identifier and wildcard patterns are supported in `let`",
                    let_stmt.pattern.span,
                );
            }
        }
    }

    fn type_expr(&mut self, expr: &Expr, scope: ScopeId, ctx: &mut FnCtx) -> TypeId {
        let ty = self.type_expr_kind(expr, scope, ctx);
        self.expr_types.insert(expr.id, ty);
        ty
    }

    fn type_expr_kind(&mut self, expr: &Expr, scope: ScopeId, ctx: &mut FnCtx) -> TypeId {
        match &expr.kind {
            ExprKind::Literal(value) => self.types.scalar(value.ty()),

            ExprKind::Identifier(name) => match self.scopes.resolve(scope, name) {
                Some(symbol) => {
                    self.resolutions.insert(expr.id, symbol);
                    let kind = self.symbols[symbol].kind.clone();
                    match kind {
                        SymbolKind::Let { ty, .. } | SymbolKind::Func { ty } => ty,
                        SymbolKind::Struct { .. } => {
                            self.error(
                                format!("`{}` is a type, not a value", name),
                                expr.span,
                            );
                            self.types.error()
                        }
                    }
                }
                None => {
                    self.error(format!("unknown identifier `{}`", name), expr.span);
                    self.types.error()
                }
            },

            ExprKind::Call(callee, args) => self.type_call(expr, callee, args, scope, ctx),

            ExprKind::Index(base, index) => {
                let base_ty = self.type_expr(base, scope, ctx);
                let index_ty = self.type_expr(index, scope, ctx);

                let usize_ty = self.types.scalar(rillc_lex::ScalarTy::U64);
                if !self.types.equal(index_ty, usize_ty) {
                    let found = self.types.display(index_ty);
                    self.error(
                        format!("array index must be `usize`, found `{}`", found),
                        index.span,
                    );
                }

                let base = self.types.get(base_ty).clone();
                match base {
                    Type::Array { elem, .. } => elem,
                    Type::Error => self.types.error(),
                    _ => {
                        let found = self.types.display(base_ty);
                        self.error(format!("cannot index a value of type `{}`", found), expr.span);
                        self.types.error()
                    }
                }
            }

            ExprKind::Member(base, member) => {
                let base_ty = self.type_expr(base, scope, ctx);
                self.type_member(base_ty, member, expr.span)
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let lhs_ty = self.type_expr(lhs, scope, ctx);
                let rhs_ty = self.type_expr(rhs, scope, ctx);
                self.type_binary(*op, lhs_ty, rhs_ty, expr.span)
            }

            ExprKind::Unary(op, operand) => {
                let operand_ty = self.type_expr(operand, scope, ctx);
                self.type_unary(*op, operand_ty, expr.span)
            }

            ExprKind::Cast(operand, target) => {
                let source_ty = self.type_expr(operand, scope, ctx);
                let target_ty = self.resolve_type(target, scope);

                let source_numeric = self
                    .types
                    .as_scalar(source_ty)
                    .map(|s| s.is_numeric())
                    .unwrap_or(matches!(self.types.get(source_ty), Type::Error));
                let target_numeric = self
                    .types
                    .as_scalar(target_ty)
                    .map(|s| s.is_numeric())
                    .unwrap_or(matches!(self.types.get(target_ty), Type::Error));

                if !source_numeric || !target_numeric {
                    let source = self.types.display(source_ty);
                    let target = self.types.display(target_ty);
                    self.error(
                        format!("`as` requires numeric types, found `{}` as `{}`", source, target),
                        expr.span,
                    );
                    return self.types.error();
                }
                target_ty
            }

            ExprKind::Block(block) => self.type_block(block, ctx),

            ExprKind::If(if_expr) => {
                let cond_ty = self.type_expr(&if_expr.cond, scope, ctx);
                if !self.types.equal(cond_ty, self.types.bool()) {
                    let found = self.types.display(cond_ty);
                    self.error(
                        format!("`if` condition must be `bool`, found `{}`", found),
                        if_expr.cond.span,
                    );
                }

                let then_ty = self.type_block(&if_expr.then_block, ctx);

                match &if_expr.else_branch {
                    Some(else_branch) => {
                        let else_ty = self.type_expr(else_branch, scope, ctx);
                        if !self.types.equal(then_ty, else_ty) {
                            let then_s = self.types.display(then_ty);
                            let else_s = self.types.display(else_ty);
                            self.error(
                                format!("if arms differ in type: `{}` vs `{}`", then_s, else_s),
                                expr.span,
                            );
                        }
                    }
                    None => {
                        if !self.types.is_void(then_ty)
                            && !matches!(self.types.get(then_ty), Type::Error)
                        {
                            let found = self.types.display(then_ty);
                            self.error(
                                format!(
                                    "`if` without `else` must have type `void`, found `{}`",
                                    found
                                ),
                                expr.span,
                            );
                        }
                    }
                }

                then_ty
            }

            ExprKind::Loop(body) => {
                ctx.loops.push(LoopCtx {
                    infinite: true,
                    break_types: Vec::new(),
                });
                self.type_block(body, ctx);
                let finished = ctx.loops.pop().expect("loop context pushed above");

                let mut break_types = finished.break_types.into_iter();
                match break_types.next() {
                    None => self.types.void(),
                    Some((first, _)) => {
                        for (other, span) in break_types {
                            if !self.types.equal(first, other) {
                                let a = self.types.display(first);
                                let b = self.types.display(other);
                                self.error(
                                    format!("`break` values differ in type: `{}` vs `{}`", a, b),
                                    span,
                                );
                            }
                        }
                        first
                    }
                }
            }

            ExprKind::While(cond, body) => {
                let cond_ty = self.type_expr(cond, scope, ctx);
                if !self.types.equal(cond_ty, self.types.bool()) {
                    let found = self.types.display(cond_ty);
                    self.error(
                        format!("`while` condition must be `bool`, found `{}`", found),
                        cond.span,
                    );
                }

                ctx.loops.push(LoopCtx {
                    infinite: false,
                    break_types: Vec::new(),
                });
                self.type_block(body, ctx);
                ctx.loops.pop();
                self.types.void()
            }

            ExprKind::For(for_expr) => {
                let iter_ty = self.type_expr(&for_expr.iter, scope, ctx);
                let iter = self.types.get(iter_ty).clone();
                let elem_ty = match iter {
                    Type::Array { elem, .. } => elem,
                    Type::Error => self.types.error(),
                    _ => {
                        let found = self.types.display(iter_ty);
                        self.error(
                            format!("`for` expects an array to iterate, found `{}`", found),
                            for_expr.iter.span,
                        );
                        self.types.error()
                    }
                };

                let body_scope = self
                    .scopes_of
                    .get(&for_expr.body.id)
                    .copied()
                    .unwrap_or(scope);
                match &for_expr.pattern.kind {
                    PatternKind::Identifier {
                        name,
                        is_ref: false,
                        is_mut,
                        sub: None,
                    } => {
                        let symbol = self.add_symbol(
                            name,
                            SymbolKind::Let {
                                mutable: *is_mut,
                                ty: elem_ty,
                            },
                        );
                        self.declare(body_scope, name, symbol, for_expr.pattern.span);
                        self.resolutions.insert(for_expr.pattern.id, symbol);
                        self.fn_locals.entry(ctx.fn_id).or_default().push(symbol);
                    }
                    PatternKind::Wildcard => {}
                    _ => {
                        self.error(
                            "only identifier and wildcard patterns are supported in `for`",
                            for_expr.pattern.span,
                        );
                    }
                }

                ctx.loops.push(LoopCtx {
                    infinite: false,
                    break_types: Vec::new(),
                });
                self.type_block(&for_expr.body, ctx);
                ctx.loops.pop();
                self.types.void()
            }

            ExprKind::Break(value) => {
                let value_ty = value
                    .as_ref()
                    .map(|value| self.type_expr(value, scope, ctx));

                match ctx.loops.last_mut() {
                    None => {
                        self.error("`break` outside of a loop", expr.span);
                    }
                    Some(enclosing) => {
                        if let Some(value_ty) = value_ty {
                            if enclosing.infinite {
                                enclosing.break_types.push((value_ty, expr.span));
                            } else {
                                self.error(
                                    "can only `break` with a value inside `loop`",
                                    expr.span,
                                );
                            }
                        }
                    }
                }
                self.types.void()
            }

            ExprKind::Continue => {
                if ctx.loops.is_empty() {
                    self.error("`continue` outside of a loop", expr.span);
                }
                self.types.void()
            }

            ExprKind::Return(value) => {
                let value_ty = match value {
                    Some(value) => self.type_expr(value, scope, ctx),
                    None => self.types.void(),
                };
                if !self.types.equal(value_ty, ctx.ret) {
                    let expected = self.types.display(ctx.ret);
                    let found = self.types.display(value_ty);
                    self.error(
                        format!(
                            "mismatched return type: expected `{}`, found `{}`",
                            expected, found
                        ),
                        expr.span,
                    );
                }
                self.types.void()
            }

            ExprKind::Assign(op, lhs, rhs) => {
                let lhs_ty = self.type_expr(lhs, scope, ctx);
                self.check_place(lhs);

                let rhs_ty = self.type_expr(rhs, scope, ctx);
                if !self.types.equal(lhs_ty, rhs_ty) {
                    let expected = self.types.display(lhs_ty);
                    let found = self.types.display(rhs_ty);
                    self.error(
                        format!(
                            "mismatched types in assignment: expected `{}`, found `{}`",
                            expected, found
                        ),
                        expr.span,
                    );
                }

                if let Some(base) = op.base_op() {
                    // The compound form must also satisfy the base
                    // operator's operand constraints.
                    self.type_binary(base, lhs_ty, rhs_ty, expr.span);
                }
                self.types.void()
            }

            ExprKind::Tuple(elems) => {
                let elem_tys: Vec<_> = elems
                    .iter()
                    .map(|elem| self.type_expr(elem, scope, ctx))
                    .collect();
                if elem_tys.is_empty() {
                    self.types.void()
                } else {
                    self.types.add(Type::Tuple(elem_tys))
                }
            }

            ExprKind::Array(ArrayExpr::List(elems)) => {
                let elem_tys: Vec<_> = elems
                    .iter()
                    .map(|elem| self.type_expr(elem, scope, ctx))
                    .collect();
                match elem_tys.first().copied() {
                    None => {
                        let void = self.types.void();
                        self.types.add(Type::Array { elem: void, len: 0 })
                    }
                    Some(first) => {
                        for (elem_ty, elem) in elem_tys.iter().zip(elems).skip(1) {
                            if !self.types.equal(first, *elem_ty) {
                                let expected = self.types.display(first);
                                let found = self.types.display(*elem_ty);
                                self.error(
                                    format!(
                                        "array elements differ in type: `{}` vs `{}`",
                                        expected, found
                                    ),
                                    elem.span,
                                );
                            }
                        }
                        self.types.add(Type::Array {
                            elem: first,
                            len: elems.len() as u64,
                        })
                    }
                }
            }

            ExprKind::Array(ArrayExpr::Repeat(value, count)) => {
                let value_ty = self.type_expr(value, scope, ctx);
                if self.types.is_void(value_ty) {
                    self.error("array element type cannot be `void`", value.span);
                }

                let count_ty = self.type_expr(count, scope, ctx);
                let usize_ty = self.types.scalar(rillc_lex::ScalarTy::U64);
                if !self.types.equal(count_ty, usize_ty) {
                    let found = self.types.display(count_ty);
                    self.error(
                        format!("array length must be `usize`, found `{}`", found),
                        count.span,
                    );
                }

                let len = match &count.kind {
                    ExprKind::Literal(value) => value.as_unsigned().unwrap_or(0),
                    _ => {
                        self.error("array length must be a constant", count.span);
                        0
                    }
                };

                self.types.add(Type::Array {
                    elem: value_ty,
                    len,
                })
            }

            ExprKind::StructLiteral(lit) => self.type_struct_literal(expr, lit, scope, ctx),

            ExprKind::Error(_) => self.types.error(),
        }
    }

    fn type_call(
        &mut self,
        expr: &Expr,
        callee: &Expr,
        args: &[Expr],
        scope: ScopeId,
        ctx: &mut FnCtx,
    ) -> TypeId {
        let arg_tys: Vec<_> = args
            .iter()
            .map(|arg| self.type_expr(arg, scope, ctx))
            .collect();

        let ExprKind::Identifier(name) = &callee.kind else {
            self.error("call target must be a function or tuple struct name", callee.span);
            return self.types.error();
        };

        let Some(symbol) = self.scopes.resolve(scope, name) else {
            self.error(format!("unknown identifier `{}`", name), callee.span);
            return self.types.error();
        };
        self.resolutions.insert(callee.id, symbol);
        let symbol_ty = self.symbols[symbol].type_id();
        self.expr_types.insert(callee.id, symbol_ty);

        let kind = self.symbols[symbol].kind.clone();
        match kind {
            SymbolKind::Func { ty } => {
                let (params, ret) = match self.types.get(ty).clone() {
                    Type::Func { params, ret } => (params, ret),
                    _ => return self.types.error(),
                };

                if params.len() != arg_tys.len() {
                    self.error(
                        format!(
                            "function `{}` expects {} arguments, found {}",
                            name,
                            params.len(),
                            arg_tys.len()
                        ),
                        expr.span,
                    );
                    return ret;
                }

                for (i, ((_, param_ty), arg_ty)) in params.iter().zip(&arg_tys).enumerate() {
                    if !self.types.equal(*param_ty, *arg_ty) {
                        let expected = self.types.display(*param_ty);
                        let found = self.types.display(*arg_ty);
                        self.error(
                            format!(
                                "mismatched type in argument {} of call to `{}`: expected `{}`, found `{}`",
                                i + 1,
                                name,
                                expected,
                                found
                            ),
                            args[i].span,
                        );
                    }
                }
                ret
            }
            SymbolKind::Struct { ty } => {
                match self.types.get(ty).clone() {
                    Type::TupleStruct { elems, .. } => {
                        if elems.len() != arg_tys.len() {
                            self.error(
                                format!(
                                    "tuple struct `{}` has {} fields, found {} values",
                                    name,
                                    elems.len(),
                                    arg_tys.len()
                                ),
                                expr.span,
                            );
                            return ty;
                        }
                        for (i, (elem_ty, arg_ty)) in elems.iter().zip(&arg_tys).enumerate() {
                            if !self.types.equal(*elem_ty, *arg_ty) {
                                let expected = self.types.display(*elem_ty);
                                let found = self.types.display(*arg_ty);
                                self.error(
                                    format!(
                                        "mismatched type in field {} of `{}`: expected `{}`, found `{}`",
                                        i, name, expected, found
                                    ),
                                    args[i].span,
                                );
                            }
                        }
                        ty
                    }
                    _ => {
                        self.error(
                            format!("struct `{}` must be built with a struct literal", name),
                            expr.span,
                        );
                        self.types.error()
                    }
                }
            }
            SymbolKind::Let { .. } => {
                self.error(format!("`{}` is not callable", name), callee.span);
                self.types.error()
            }
        }
    }

    fn type_member(&mut self, base_ty: TypeId, member: &MemberName, span: Span) -> TypeId {
        let base = self.types.get(base_ty).clone();
        match (base, member) {
            (Type::Tuple(elems), MemberName::Index(n)) => {
                if let Some(&elem) = elems.get(*n as usize) {
                    elem
                } else {
                    self.error(
                        format!("tuple index {} out of range for a {}-tuple", n, elems.len()),
                        span,
                    );
                    self.types.error()
                }
            }
            (Type::TupleStruct { name, elems }, MemberName::Index(n)) => {
                if let Some(&elem) = elems.get(*n as usize) {
                    elem
                } else {
                    self.error(
                        format!(
                            "field index {} out of range for `{}` with {} fields",
                            n,
                            name,
                            elems.len()
                        ),
                        span,
                    );
                    self.types.error()
                }
            }
            (Type::Struct { name, fields }, MemberName::Named(field)) => {
                if let Some(&ty) = fields.get(field) {
                    ty
                } else {
                    self.error(format!("no field `{}` on struct `{}`", field, name), span);
                    self.types.error()
                }
            }
            (Type::Error, _) => self.types.error(),
            (_, member) => {
                let found = self.types.display(base_ty);
                let selector = match member {
                    MemberName::Named(name) => name.clone(),
                    MemberName::Index(n) => n.to_string(),
                };
                self.error(
                    format!("no member `{}` on a value of type `{}`", selector, found),
                    span,
                );
                self.types.error()
            }
        }
    }

    fn type_binary(&mut self, op: BinOp, lhs: TypeId, rhs: TypeId, span: Span) -> TypeId {
        let comparison_result = self.types.bool();

        if matches!(self.types.get(lhs), Type::Error) || matches!(self.types.get(rhs), Type::Error)
        {
            return if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
                comparison_result
            } else {
                self.types.error()
            };
        }

        if !self.types.equal(lhs, rhs) {
            let lhs_s = self.types.display(lhs);
            let rhs_s = self.types.display(rhs);
            self.error(
                format!(
                    "mismatched operand types `{}` and `{}` for `{}`",
                    lhs_s,
                    rhs_s,
                    op.text()
                ),
                span,
            );
            return if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
                comparison_result
            } else {
                self.types.error()
            };
        }

        let scalar = self.types.as_scalar(lhs);
        let ok = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                scalar.map(|s| s.is_numeric()).unwrap_or(false)
            }
            BinOp::Rem | BinOp::Shl | BinOp::Shr | BinOp::BitXor => {
                scalar.map(|s| s.is_integer()).unwrap_or(false)
            }
            BinOp::BitAnd | BinOp::BitOr => scalar
                .map(|s| s.is_integer() || s == rillc_lex::ScalarTy::Bool)
                .unwrap_or(false),
            BinOp::And | BinOp::Or => scalar
                .map(|s| s == rillc_lex::ScalarTy::Bool)
                .unwrap_or(false),
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => scalar
                .map(|s| s.is_numeric() || s == rillc_lex::ScalarTy::Bool || s == rillc_lex::ScalarTy::Char)
                .unwrap_or(false),
        };

        if !ok {
            let found = self.types.display(lhs);
            self.error(
                format!("operator `{}` cannot be applied to `{}`", op.text(), found),
                span,
            );
            return self.types.error();
        }

        if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
            comparison_result
        } else {
            lhs
        }
    }

    fn type_unary(&mut self, op: UnOp, operand: TypeId, span: Span) -> TypeId {
        if matches!(self.types.get(operand), Type::Error) {
            return self.types.error();
        }
        match op {
            UnOp::Neg => {
                let ok = self
                    .types
                    .as_scalar(operand)
                    .map(|s| s.is_signed_integer() || s.is_float())
                    .unwrap_or(false);
                if !ok {
                    let found = self.types.display(operand);
                    self.error(
                        format!("unary `-` requires a signed numeric type, found `{}`", found),
                        span,
                    );
                    return self.types.error();
                }
                operand
            }
            UnOp::Not => {
                let ok = self
                    .types
                    .as_scalar(operand)
                    .map(|s| s.is_integer() || s == rillc_lex::ScalarTy::Bool)
                    .unwrap_or(false);
                if !ok {
                    let found = self.types.display(operand);
                    self.error(
                        format!("unary `!` requires `bool` or an integer, found `{}`", found),
                        span,
                    );
                    return self.types.error();
                }
                operand
            }
            UnOp::Deref => match self.types.get(operand).clone() {
                Type::Ref { inner, .. } => inner,
                _ => {
                    let found = self.types.display(operand);
                    self.error(
                        format!("cannot dereference a value of type `{}`", found),
                        span,
                    );
                    self.types.error()
                }
            },
            UnOp::Ref { mutable } => self.types.add(Type::Ref {
                mutable,
                inner: operand,
            }),
        }
    }

    /// Checks that an assignment target names a storage location and that
    /// identifier targets are mutable bindings.
    fn check_place(&mut self, lhs: &Expr) {
        match &lhs.kind {
            ExprKind::Identifier(name) => {
                if let Some(&symbol) = self.resolutions.get(&lhs.id) {
                    match self.symbols[symbol].kind.clone() {
                        SymbolKind::Let { mutable: true, .. } => {}
                        SymbolKind::Let { mutable: false, .. } => {
                            self.error(
                                format!("cannot assign to immutable binding `{}`", name),
                                lhs.span,
                            );
                        }
                        _ => {
                            self.error(format!("cannot assign to `{}`", name), lhs.span);
                        }
                    }
                }
            }
            ExprKind::Index(..) | ExprKind::Member(..) => {}
            ExprKind::Error(_) => {}
            _ => {
                self.error("invalid assignment target", lhs.span);
            }
        }
    }

    fn type_struct_literal(
        &mut self,
        expr: &Expr,
        lit: &rillc_par::StructLiteralExpr,
        scope: ScopeId,
        ctx: &mut FnCtx,
    ) -> TypeId {
        let Some(symbol) = self.scopes.resolve(scope, &lit.name) else {
            self.error(format!("unknown type `{}`", lit.name), expr.span);
            return self.types.error();
        };

        let SymbolKind::Struct { ty } = self.symbols[symbol].kind.clone() else {
            self.error(format!("`{}` is not a struct", lit.name), expr.span);
            return self.types.error();
        };

        match self.types.get(ty).clone() {
            Type::Struct { name, fields } => {
                let mut seen = Vec::new();
                for field in &lit.fields {
                    match field {
                        FieldInit::Named {
                            name: field_name,
                            value,
                            span,
                        } => {
                            let value_ty = self.type_expr(value, scope, ctx);
                            match fields.get(field_name) {
                                Some(&field_ty) => {
                                    if !self.types.equal(field_ty, value_ty) {
                                        let expected = self.types.display(field_ty);
                                        let found = self.types.display(value_ty);
                                        self.error(
                                            format!(
                                                "mismatched type for field `{}`: expected `{}`, found `{}`",
                                                field_name, expected, found
                                            ),
                                            *span,
                                        );
                                    }
                                }
                                None => {
                                    self.error(
                                        format!("no field `{}` on struct `{}`", field_name, name),
                                        *span,
                                    );
                                }
                            }
                            seen.push(field_name.clone());
                        }
                        FieldInit::Shorthand {
                            name: field_name,
                            span,
                        } => {
                            let binding_ty = match self.scopes.resolve(scope, field_name) {
                                Some(binding) => self.symbols[binding].type_id(),
                                None => {
                                    self.error(
                                        format!("unknown identifier `{}`", field_name),
                                        *span,
                                    );
                                    self.types.error()
                                }
                            };
                            match fields.get(field_name) {
                                Some(&field_ty) => {
                                    if !self.types.equal(field_ty, binding_ty) {
                                        let expected = self.types.display(field_ty);
                                        let found = self.types.display(binding_ty);
                                        self.error(
                                            format!(
                                                "mismatched type for field `{}`: expected `{}`, found `{}`",
                                                field_name, expected, found
                                            ),
                                            *span,
                                        );
                                    }
                                }
                                None => {
                                    self.error(
                                        format!("no field `{}` on struct `{}`", field_name, name),
                                        *span,
                                    );
                                }
                            }
                            seen.push(field_name.clone());
                        }
                        FieldInit::Positional { span, value, .. } => {
                            self.type_expr(value, scope, ctx);
                            self.error(
                                format!("struct `{}` has named fields", name),
                                *span,
                            );
                        }
                    }
                }

                for field_name in fields.keys() {
                    if !seen.contains(field_name) {
                        self.error(
                            format!("missing field `{}` in initializer of `{}`", field_name, name),
                            expr.span,
                        );
                    }
                }
                ty
            }
            Type::TupleStruct { name, elems } => {
                for field in &lit.fields {
                    match field {
                        FieldInit::Positional { index, value, span } => {
                            let value_ty = self.type_expr(value, scope, ctx);
                            match elems.get(*index as usize) {
                                Some(&elem_ty) => {
                                    if !self.types.equal(elem_ty, value_ty) {
                                        let expected = self.types.display(elem_ty);
                                        let found = self.types.display(value_ty);
                                        self.error(
                                            format!(
                                                "mismatched type for field {}: expected `{}`, found `{}`",
                                                index, expected, found
                                            ),
                                            *span,
                                        );
                                    }
                                }
                                None => {
                                    self.error(
                                        format!(
                                            "field index {} out of range for `{}`",
                                            index, name
                                        ),
                                        *span,
                                    );
                                }
                            }
                        }
                        FieldInit::Named { span, .. } | FieldInit::Shorthand { span, .. } => {
                            self.error(
                                format!("tuple struct `{}` has positional fields", name),
                                *span,
                            );
                        }
                    }
                }
                ty
            }
            _ => {
                self.error(format!("`{}` is not a struct", lit.name), expr.span);
                self.types.error()
            }
        }
    }
}
