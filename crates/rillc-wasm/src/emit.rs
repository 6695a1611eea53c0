//! Lowering of the typed AST into module bytes.
//!
//! The emitter walks expressions post-order. Each lowering returns the byte
//! buffer that produces the expression's value together with its net effect
//! on the operand stack; parents compose children and the function epilogue
//! asserts the final shape. Statement values that go unused are dropped at
//! the statement boundary.
//!
//! Loop shapes follow the classic double-label encoding: an outer `block`
//! as the break target wrapping an inner `loop` as the continue target.
//! Because `if` arms introduce labels of their own, the emitter tracks how
//! many are open between a `break`/`continue` and its loop so the branch
//! depth stays correct at any nesting.

use rillc_lex::{ScalarTy, ScalarValue};
use rillc_par::{Ast, Block, Expr, ExprKind, FnItem, Item, Stmt, UnOp};
use rillc_sem::{Analysis, SymbolId, Type};
use rillc_util::{FxHashMap, Span};
use thiserror::Error;

use crate::iet::Iet;
use crate::leb128::{write_sleb, write_uleb};
use crate::opcodes::{binary_opcode, valtype_of, ValType, EMPTY_BLOCK_CODE};
use crate::sections::ModuleBuilder;

// Opcode bytes used directly by the lowering.
const OP_UNREACHABLE: u8 = 0x00;
const OP_BLOCK: u8 = 0x02;
const OP_LOOP: u8 = 0x03;
const OP_IF: u8 = 0x04;
const OP_ELSE: u8 = 0x05;
const OP_END: u8 = 0x0b;
const OP_BR: u8 = 0x0c;
const OP_BR_IF: u8 = 0x0d;
const OP_RETURN: u8 = 0x0f;
const OP_CALL: u8 = 0x10;
const OP_DROP: u8 = 0x1a;
const OP_LOCAL_GET: u8 = 0x20;
const OP_LOCAL_SET: u8 = 0x21;
const OP_I32_CONST: u8 = 0x41;
const OP_I64_CONST: u8 = 0x42;
const OP_F32_CONST: u8 = 0x43;
const OP_F64_CONST: u8 = 0x44;
const OP_I32_EQZ: u8 = 0x45;

/// Errors that abort code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("cannot lower {what}")]
    Unsupported { what: String, span: Span },
    #[error("export `{field}` has no matching function definition")]
    UnmatchedExport { field: String },
    #[error("export `{field}` does not match the signature of `{associate}`")]
    ExportSignatureMismatch { field: String, associate: String },
    #[error("type `{ty}` has no WebAssembly value type")]
    NoValueType { ty: String, span: Span },
}

impl CodegenError {
    /// Source location of the error, where one exists.
    pub fn span(&self) -> Span {
        match self {
            CodegenError::Unsupported { span, .. } | CodegenError::NoValueType { span, .. } => {
                *span
            }
            CodegenError::UnmatchedExport { .. }
            | CodegenError::ExportSignatureMismatch { .. } => Span::DUMMY,
        }
    }
}

/// Emits a complete module for an analyzed translation unit.
pub fn emit(ast: &Ast, analysis: &Analysis, iet: &Iet) -> Result<Vec<u8>, CodegenError> {
    WasmEmitter::new(ast, analysis, iet).run()
}

struct WasmEmitter<'a> {
    ast: &'a Ast,
    analysis: &'a Analysis,
    iet: &'a Iet,
    module: ModuleBuilder,
    /// Function symbol to wasm function index (imports first).
    func_indices: FxHashMap<SymbolId, u32>,
    /// Constant items with literal initializers, inlined at use sites.
    const_values: FxHashMap<SymbolId, ScalarValue>,
    /// Local slot of every `let` symbol in the function being emitted.
    local_slots: FxHashMap<SymbolId, u32>,
    /// Per enclosing loop, the number of `if` labels currently open inside
    /// it; governs `br` depths for `break` and `continue`.
    loop_frames: Vec<u32>,
}

impl<'a> WasmEmitter<'a> {
    fn new(ast: &'a Ast, analysis: &'a Analysis, iet: &'a Iet) -> Self {
        Self {
            ast,
            analysis,
            iet,
            module: ModuleBuilder::new(),
            func_indices: FxHashMap::default(),
            const_values: FxHashMap::default(),
            local_slots: FxHashMap::default(),
            loop_frames: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<u8>, CodegenError> {
        // Imports occupy function indices 0..I-1 in declaration order, each
        // with its own Type entry.
        for (i, import) in self.iet.imports.iter().enumerate() {
            let params = import
                .ty
                .params
                .iter()
                .map(|&tag| scalar_valtype(tag, Span::DUMMY))
                .collect::<Result<Vec<_>, _>>()?;
            let results = match import.ty.ret {
                Some(tag) => vec![scalar_valtype(tag, Span::DUMMY)?],
                None => Vec::new(),
            };
            let type_index = self.module.add_type(&params, &results);
            self.module
                .add_import_func(&import.module, &import.field, type_index);

            let root = self.analysis.scopes.root();
            if let Some(symbol) = self.analysis.scopes.resolve(root, &import.associate) {
                self.func_indices.insert(symbol, i as u32);
            }
        }

        // Constant items with literal initializers are inlined at each use.
        for item in self.ast {
            if let Item::Const(item) = item {
                if let Some(Expr {
                    kind: ExprKind::Literal(value),
                    ..
                }) = &item.value
                {
                    if let Some(&symbol) = self.analysis.resolutions.get(&item.id) {
                        self.const_values.insert(symbol, value.clone());
                    }
                }
            }
        }

        let defined: Vec<&FnItem> = self
            .ast
            .iter()
            .filter_map(|item| match item {
                Item::Fn(item) if item.body.is_some() => Some(item),
                _ => None,
            })
            .collect();

        let import_count = self.iet.imports.len() as u32;
        for (j, item) in defined.iter().enumerate() {
            if let Some(&symbol) = self.analysis.fn_symbols.get(&item.id) {
                self.func_indices.insert(symbol, import_count + j as u32);
            }
        }

        // Every declared export must resolve to a defined function of the
        // same name and signature before any code is generated.
        for export in &self.iet.exports {
            let Some(&item) = defined.iter().find(|f| f.name == export.associate) else {
                return Err(CodegenError::UnmatchedExport {
                    field: export.field.clone(),
                });
            };
            self.check_export_signature(item, export)?;
        }

        for &item in &defined {
            self.emit_fn(item)?;
        }

        for export in &self.iet.exports {
            let item = defined
                .iter()
                .find(|f| f.name == export.associate)
                .expect("checked above");
            let symbol = self.analysis.fn_symbols[&item.id];
            let index = self.func_indices[&symbol];
            self.module.add_export_func(&export.field, index);
        }

        Ok(self.module.finish())
    }

    fn check_export_signature(
        &self,
        item: &FnItem,
        export: &crate::iet::IetExport,
    ) -> Result<(), CodegenError> {
        let mismatch = || CodegenError::ExportSignatureMismatch {
            field: export.field.clone(),
            associate: export.associate.clone(),
        };

        let (params, ret) = self.fn_signature(item)?;

        let declared_params = export
            .ty
            .params
            .iter()
            .map(|&tag| scalar_valtype(tag, Span::DUMMY))
            .collect::<Result<Vec<_>, _>>()?;
        let declared_ret = match export.ty.ret {
            Some(tag) => Some(scalar_valtype(tag, Span::DUMMY)?),
            None => None,
        };

        if params != declared_params || ret != declared_ret {
            return Err(mismatch());
        }
        Ok(())
    }

    /// Parameter and result value types of a defined function.
    fn fn_signature(&self, item: &FnItem) -> Result<(Vec<ValType>, Option<ValType>), CodegenError> {
        let symbol = self.analysis.fn_symbols[&item.id];
        let fn_ty = self.analysis.types.get(self.analysis.symbols[symbol].type_id());
        let (params, ret) = match fn_ty {
            Type::Func { params, ret } => (params.clone(), *ret),
            _ => {
                return Err(CodegenError::Unsupported {
                    what: format!("function `{}` without a signature", item.name),
                    span: item.span,
                })
            }
        };

        let param_vts = params
            .iter()
            .map(|&(_, ty)| self.valtype_of_type(ty, item.span))
            .collect::<Result<Vec<_>, _>>()?;
        let ret_vt = if self.analysis.types.is_void(ret) {
            None
        } else {
            Some(self.valtype_of_type(ret, item.span)?)
        };
        Ok((param_vts, ret_vt))
    }

    fn valtype_of_type(&self, ty: rillc_sem::TypeId, span: Span) -> Result<ValType, CodegenError> {
        let tag = self
            .analysis
            .types
            .as_scalar(ty)
            .ok_or_else(|| CodegenError::NoValueType {
                ty: self.analysis.types.display(ty),
                span,
            })?;
        scalar_valtype(tag, span)
    }

    /// Scalar type of an expression; anything non-scalar cannot be lowered.
    fn scalar_of(&self, expr: &Expr) -> Result<ScalarTy, CodegenError> {
        let ty = self
            .analysis
            .type_of(expr.id)
            .ok_or_else(|| CodegenError::Unsupported {
                what: "an expression the analyzer did not type".to_string(),
                span: expr.span,
            })?;
        self.analysis
            .types
            .as_scalar(ty)
            .ok_or_else(|| CodegenError::Unsupported {
                what: format!(
                    "a value of type `{}`",
                    self.analysis.types.display(ty)
                ),
                span: expr.span,
            })
    }

    /// Result arity of an expression: 1 unless its type is void.
    fn arity_of(&self, expr: &Expr) -> i32 {
        match self.analysis.type_of(expr.id) {
            Some(ty) if !self.analysis.types.is_void(ty) => 1,
            _ => 0,
        }
    }

    // ==================================================================
    // Functions
    // ==================================================================

    fn emit_fn(&mut self, item: &FnItem) -> Result<(), CodegenError> {
        self.local_slots.clear();
        self.loop_frames.clear();

        let (param_vts, ret_vt) = self.fn_signature(item)?;
        let results: Vec<ValType> = ret_vt.into_iter().collect();
        let type_index = self.module.add_type(&param_vts, &results);

        // Slot layout: the raw parameters sit at 0..K-1; every `let` symbol
        // (the parameters' bindings included) gets a fresh slot after them,
        // grouped by value type as the local declarations require. Entry
        // code moves each argument from its parameter slot into its binding
        // slot, and all later references use the binding slot.
        let locals = self
            .analysis
            .fn_locals
            .get(&item.id)
            .cloned()
            .unwrap_or_default();
        let param_count = param_vts.len();

        let mut next_slot = param_count as u32;
        let mut groups: Vec<(ValType, u32)> = Vec::new();
        let mut prologue = Vec::new();

        for vt in ValType::ALL {
            let mut count = 0u32;
            for (pos, &symbol) in locals.iter().enumerate() {
                let ty = self.analysis.symbols[symbol].type_id();
                let symbol_vt = self.valtype_of_type(ty, item.span)?;
                if symbol_vt != vt {
                    continue;
                }
                let slot = next_slot;
                next_slot += 1;
                count += 1;
                self.local_slots.insert(symbol, slot);

                if pos < param_count {
                    prologue.push(OP_LOCAL_GET);
                    write_uleb(&mut prologue, pos as u64);
                    prologue.push(OP_LOCAL_SET);
                    write_uleb(&mut prologue, slot as u64);
                }
            }
            if count > 0 {
                groups.push((vt, count));
            }
        }

        let body = item.body.as_ref().expect("only defined functions are emitted");
        let (code, delta) = self.emit_block(body)?;

        let mut full = prologue;
        full.extend_from_slice(&code);

        let expected = results.len() as i32;
        if delta > expected {
            for _ in 0..(delta - expected) {
                full.push(OP_DROP);
            }
        } else if delta < expected {
            // The body produced no trailing value; it must leave through an
            // explicit `return`, so the fallthrough is unreachable.
            full.push(OP_UNREACHABLE);
        }

        self.module.add_func(type_index, &groups, &full);
        Ok(())
    }

    // ==================================================================
    // Blocks and statements
    // ==================================================================

    fn emit_block(&mut self, block: &Block) -> Result<(Vec<u8>, i32), CodegenError> {
        let mut out = Vec::new();

        for stmt in &block.stmts {
            match stmt {
                Stmt::Let(let_stmt) => {
                    let Some(init) = &let_stmt.init else { continue };
                    let (bytes, delta) = self.emit_expr(init)?;
                    out.extend_from_slice(&bytes);

                    let slot = self
                        .analysis
                        .resolutions
                        .get(&let_stmt.id)
                        .and_then(|symbol| self.local_slots.get(symbol))
                        .copied();

                    match slot {
                        Some(slot) if delta > 0 => {
                            out.push(OP_LOCAL_SET);
                            write_uleb(&mut out, slot as u64);
                            for _ in 0..(delta - 1) {
                                out.push(OP_DROP);
                            }
                        }
                        _ => {
                            // Wildcard binding or void initializer.
                            for _ in 0..delta {
                                out.push(OP_DROP);
                            }
                        }
                    }
                }
                Stmt::Expr(expr) => {
                    let (bytes, delta) = self.emit_expr(expr)?;
                    out.extend_from_slice(&bytes);
                    for _ in 0..delta {
                        out.push(OP_DROP);
                    }
                }
                Stmt::Semi(_) => {}
                Stmt::Error(error) => {
                    return Err(CodegenError::Unsupported {
                        what: "code containing syntax errors".to_string(),
                        span: error.span,
                    })
                }
            }
        }

        match &block.tail {
            Some(tail) => {
                let (bytes, delta) = self.emit_expr(tail)?;
                out.extend_from_slice(&bytes);
                Ok((out, delta))
            }
            None => Ok((out, 0)),
        }
    }

    // ==================================================================
    // Expressions
    // ==================================================================

    fn emit_expr(&mut self, expr: &Expr) -> Result<(Vec<u8>, i32), CodegenError> {
        match &expr.kind {
            ExprKind::Literal(value) => self.emit_literal(value, expr.span),

            ExprKind::Identifier(name) => {
                let Some(&symbol) = self.analysis.resolutions.get(&expr.id) else {
                    return Err(CodegenError::Unsupported {
                        what: format!("an unresolved reference to `{}`", name),
                        span: expr.span,
                    });
                };
                if let Some(&slot) = self.local_slots.get(&symbol) {
                    let mut out = vec![OP_LOCAL_GET];
                    write_uleb(&mut out, slot as u64);
                    return Ok((out, 1));
                }
                if let Some(value) = self.const_values.get(&symbol).cloned() {
                    return self.emit_literal(&value, expr.span);
                }
                Err(CodegenError::Unsupported {
                    what: format!("a reference to `{}` in value position", name),
                    span: expr.span,
                })
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let (lhs_bytes, lhs_delta) = self.emit_expr(lhs)?;
                let (rhs_bytes, rhs_delta) = self.emit_expr(rhs)?;
                let tag = self.scalar_of(lhs)?;
                let opcode = binary_opcode(*op, tag).ok_or_else(|| CodegenError::Unsupported {
                    what: format!("operator `{}` on `{}`", op.text(), tag.name()),
                    span: expr.span,
                })?;

                let mut out = lhs_bytes;
                out.extend_from_slice(&rhs_bytes);
                out.push(opcode);
                Ok((out, lhs_delta + rhs_delta - 1))
            }

            ExprKind::Unary(op, operand) => self.emit_unary(expr, *op, operand),

            ExprKind::Cast(operand, _) => {
                let (mut out, delta) = self.emit_expr(operand)?;
                let src = self.scalar_of(operand)?;
                let dst = self.scalar_of(expr)?;
                emit_conversion(&mut out, src, dst, expr.span)?;
                Ok((out, delta))
            }

            ExprKind::Assign(op, lhs, rhs) => {
                let Some(slot) = (match &lhs.kind {
                    ExprKind::Identifier(_) => self
                        .analysis
                        .resolutions
                        .get(&lhs.id)
                        .and_then(|symbol| self.local_slots.get(symbol))
                        .copied(),
                    _ => None,
                }) else {
                    return Err(CodegenError::Unsupported {
                        what: "assignment to anything but a local binding".to_string(),
                        span: lhs.span,
                    });
                };

                let (rhs_bytes, rhs_delta) = self.emit_expr(rhs)?;
                let mut out = Vec::new();

                match op.base_op() {
                    None => out.extend_from_slice(&rhs_bytes),
                    Some(base) => {
                        let tag = self.scalar_of(lhs)?;
                        let opcode =
                            binary_opcode(base, tag).ok_or_else(|| CodegenError::Unsupported {
                                what: format!("operator `{}` on `{}`", base.text(), tag.name()),
                                span: expr.span,
                            })?;
                        out.push(OP_LOCAL_GET);
                        write_uleb(&mut out, slot as u64);
                        out.extend_from_slice(&rhs_bytes);
                        out.push(opcode);
                    }
                }

                out.push(OP_LOCAL_SET);
                write_uleb(&mut out, slot as u64);
                Ok((out, rhs_delta - 1))
            }

            ExprKind::Call(callee, args) => {
                let Some(&symbol) = self.analysis.resolutions.get(&callee.id) else {
                    return Err(CodegenError::Unsupported {
                        what: "an unresolved call target".to_string(),
                        span: callee.span,
                    });
                };
                let Some(&index) = self.func_indices.get(&symbol) else {
                    return Err(CodegenError::Unsupported {
                        what: "a call to anything but a function".to_string(),
                        span: callee.span,
                    });
                };

                let mut out = Vec::new();
                for arg in args {
                    let (bytes, _) = self.emit_expr(arg)?;
                    out.extend_from_slice(&bytes);
                }
                out.push(OP_CALL);
                write_uleb(&mut out, index as u64);
                Ok((out, self.arity_of(expr)))
            }

            ExprKind::Block(block) => self.emit_block(block),

            ExprKind::If(if_expr) => {
                let (cond_bytes, cond_delta) = self.emit_expr(&if_expr.cond)?;
                let arity = self.arity_of(expr);

                let mut out = cond_bytes;
                out.push(OP_IF);
                self.write_block_type(&mut out, expr)?;

                if let Some(frame) = self.loop_frames.last_mut() {
                    *frame += 1;
                }

                let (then_bytes, then_delta) = self.emit_block(&if_expr.then_block)?;
                out.extend_from_slice(&then_bytes);
                for _ in 0..(then_delta - arity) {
                    out.push(OP_DROP);
                }

                if let Some(else_branch) = &if_expr.else_branch {
                    out.push(OP_ELSE);
                    let (else_bytes, else_delta) = self.emit_expr(else_branch)?;
                    out.extend_from_slice(&else_bytes);
                    for _ in 0..(else_delta - arity) {
                        out.push(OP_DROP);
                    }
                }

                if let Some(frame) = self.loop_frames.last_mut() {
                    *frame -= 1;
                }

                out.push(OP_END);
                Ok((out, cond_delta - 1 + arity))
            }

            ExprKind::Loop(body) => {
                let arity = self.arity_of(expr);

                let mut out = vec![OP_BLOCK];
                self.write_block_type(&mut out, expr)?;
                out.push(OP_LOOP);
                write_sleb(&mut out, EMPTY_BLOCK_CODE);

                self.loop_frames.push(0);
                let (body_bytes, body_delta) = self.emit_block(body)?;
                self.loop_frames.pop();

                out.extend_from_slice(&body_bytes);
                for _ in 0..body_delta {
                    out.push(OP_DROP);
                }
                out.push(OP_BR);
                write_uleb(&mut out, 0);
                out.push(OP_END);
                out.push(OP_END);
                Ok((out, arity))
            }

            ExprKind::While(cond, body) => {
                let mut out = vec![OP_BLOCK];
                write_sleb(&mut out, EMPTY_BLOCK_CODE);
                out.push(OP_LOOP);
                write_sleb(&mut out, EMPTY_BLOCK_CODE);

                self.loop_frames.push(0);

                let (cond_bytes, _) = self.emit_expr(cond)?;
                out.extend_from_slice(&cond_bytes);
                out.push(OP_I32_EQZ);
                out.push(OP_BR_IF);
                write_uleb(&mut out, 1);

                let (body_bytes, body_delta) = self.emit_block(body)?;
                out.extend_from_slice(&body_bytes);
                for _ in 0..body_delta {
                    out.push(OP_DROP);
                }

                self.loop_frames.pop();

                out.push(OP_BR);
                write_uleb(&mut out, 0);
                out.push(OP_END);
                out.push(OP_END);
                Ok((out, 0))
            }

            ExprKind::Break(value) => {
                let Some(&if_depth) = self.loop_frames.last() else {
                    return Err(CodegenError::Unsupported {
                        what: "`break` outside of a loop".to_string(),
                        span: expr.span,
                    });
                };

                let mut out = Vec::new();
                if let Some(value) = value {
                    let (bytes, _) = self.emit_expr(value)?;
                    out.extend_from_slice(&bytes);
                }
                out.push(OP_BR);
                write_uleb(&mut out, u64::from(if_depth) + 1);
                Ok((out, 0))
            }

            ExprKind::Continue => {
                let Some(&if_depth) = self.loop_frames.last() else {
                    return Err(CodegenError::Unsupported {
                        what: "`continue` outside of a loop".to_string(),
                        span: expr.span,
                    });
                };
                let mut out = vec![OP_BR];
                write_uleb(&mut out, u64::from(if_depth));
                Ok((out, 0))
            }

            ExprKind::Return(value) => {
                let mut out = Vec::new();
                if let Some(value) = value {
                    let (bytes, _) = self.emit_expr(value)?;
                    out.extend_from_slice(&bytes);
                }
                out.push(OP_RETURN);
                Ok((out, 0))
            }

            // The unit value has no runtime representation.
            ExprKind::Tuple(elems) if elems.is_empty() => Ok((Vec::new(), 0)),

            ExprKind::Tuple(_) => Err(self.unsupported(expr, "tuple values")),
            ExprKind::Array(_) => Err(self.unsupported(expr, "array values")),
            ExprKind::StructLiteral(_) => Err(self.unsupported(expr, "struct values")),
            ExprKind::Index(..) => Err(self.unsupported(expr, "array indexing")),
            ExprKind::Member(..) => Err(self.unsupported(expr, "member access")),
            ExprKind::For(_) => Err(self.unsupported(expr, "`for` loops")),
            ExprKind::Error(_) => Err(self.unsupported(expr, "code containing syntax errors")),
        }
    }

    fn unsupported(&self, expr: &Expr, what: &str) -> CodegenError {
        CodegenError::Unsupported {
            what: what.to_string(),
            span: expr.span,
        }
    }

    /// Writes the block type of an `if`/`block` construct: empty when the
    /// expression is void, its value type otherwise.
    fn write_block_type(&self, out: &mut Vec<u8>, expr: &Expr) -> Result<(), CodegenError> {
        match self.analysis.type_of(expr.id) {
            Some(ty) if !self.analysis.types.is_void(ty) => {
                let vt = self.valtype_of_type(ty, expr.span)?;
                write_sleb(out, vt.code());
            }
            _ => write_sleb(out, EMPTY_BLOCK_CODE),
        }
        Ok(())
    }

    fn emit_literal(
        &self,
        value: &ScalarValue,
        span: Span,
    ) -> Result<(Vec<u8>, i32), CodegenError> {
        let tag = value.ty();
        let vt = scalar_valtype(tag, span)?;
        let mut out = Vec::new();
        match vt {
            ValType::I32 => {
                let v = value.as_const_i64().unwrap_or(0);
                out.push(OP_I32_CONST);
                write_sleb(&mut out, v as i32 as i64);
            }
            ValType::I64 => {
                let v = value.as_const_i64().unwrap_or(0);
                out.push(OP_I64_CONST);
                write_sleb(&mut out, v);
            }
            ValType::F32 => {
                let v = match value {
                    ScalarValue::F32(v) => *v,
                    _ => 0.0,
                };
                out.push(OP_F32_CONST);
                out.extend_from_slice(&v.to_le_bytes());
            }
            ValType::F64 => {
                let v = match value {
                    ScalarValue::F64(v) => *v,
                    _ => 0.0,
                };
                out.push(OP_F64_CONST);
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        Ok((out, 1))
    }

    fn emit_unary(
        &mut self,
        expr: &Expr,
        op: UnOp,
        operand: &Expr,
    ) -> Result<(Vec<u8>, i32), CodegenError> {
        let (operand_bytes, operand_delta) = self.emit_expr(operand)?;
        let tag = self.scalar_of(operand)?;
        let vt = scalar_valtype(tag, operand.span)?;

        let mut out = Vec::new();
        match op {
            // Integer negation is a subtraction from zero; floats have a
            // dedicated opcode.
            UnOp::Neg => match vt {
                ValType::I32 => {
                    out.push(OP_I32_CONST);
                    write_sleb(&mut out, 0);
                    out.extend_from_slice(&operand_bytes);
                    out.push(0x6b); // i32.sub
                }
                ValType::I64 => {
                    out.push(OP_I64_CONST);
                    write_sleb(&mut out, 0);
                    out.extend_from_slice(&operand_bytes);
                    out.push(0x7d); // i64.sub
                }
                ValType::F32 => {
                    out.extend_from_slice(&operand_bytes);
                    out.push(0x8c); // f32.neg
                }
                ValType::F64 => {
                    out.extend_from_slice(&operand_bytes);
                    out.push(0x9a); // f64.neg
                }
            },
            UnOp::Not => {
                out.extend_from_slice(&operand_bytes);
                if tag == ScalarTy::Bool {
                    out.push(OP_I32_EQZ);
                } else {
                    match vt {
                        ValType::I32 => {
                            out.push(OP_I32_CONST);
                            write_sleb(&mut out, -1);
                            out.push(0x73); // i32.xor
                        }
                        ValType::I64 => {
                            out.push(OP_I64_CONST);
                            write_sleb(&mut out, -1);
                            out.push(0x85); // i64.xor
                        }
                        _ => {
                            return Err(self.unsupported(expr, "`!` on a float"));
                        }
                    }
                }
            }
            UnOp::Deref | UnOp::Ref { .. } => {
                return Err(self.unsupported(expr, "reference operations"));
            }
        }
        Ok((out, operand_delta))
    }
}

fn scalar_valtype(tag: ScalarTy, span: Span) -> Result<ValType, CodegenError> {
    valtype_of(tag).ok_or_else(|| CodegenError::NoValueType {
        ty: tag.name().to_string(),
        span,
    })
}

/// Appends the conversion instructions for `src as dst`.
///
/// Widening follows the signedness of the source; narrowing masks unsigned
/// targets and shift-extends signed ones, so the stored bit pattern always
/// matches the target's range. Float/int conversions use the trapping
/// truncation opcodes.
fn emit_conversion(
    out: &mut Vec<u8>,
    src: ScalarTy,
    dst: ScalarTy,
    span: Span,
) -> Result<(), CodegenError> {
    let src_vt = scalar_valtype(src, span)?;
    let dst_vt = scalar_valtype(dst, span)?;
    let src_signed = src.is_signed_integer();
    let dst_signed = dst.is_signed_integer();

    match (src_vt, dst_vt) {
        (ValType::I32, ValType::I32) => narrow_i32(out, dst),
        (ValType::I32, ValType::I64) => {
            out.push(if src_signed { 0xac } else { 0xad }); // i64.extend_i32_s/u
            narrow_i64(out, dst);
        }
        (ValType::I64, ValType::I32) => {
            out.push(0xa7); // i32.wrap_i64
            narrow_i32(out, dst);
        }
        (ValType::I64, ValType::I64) => narrow_i64(out, dst),
        (ValType::I32, ValType::F32) => out.push(if src_signed { 0xb2 } else { 0xb3 }),
        (ValType::I64, ValType::F32) => out.push(if src_signed { 0xb4 } else { 0xb5 }),
        (ValType::I32, ValType::F64) => out.push(if src_signed { 0xb7 } else { 0xb8 }),
        (ValType::I64, ValType::F64) => out.push(if src_signed { 0xb9 } else { 0xba }),
        (ValType::F32, ValType::I32) => {
            out.push(if dst_signed { 0xa8 } else { 0xa9 }); // i32.trunc_f32_s/u
            narrow_i32(out, dst);
        }
        (ValType::F64, ValType::I32) => {
            out.push(if dst_signed { 0xaa } else { 0xab });
            narrow_i32(out, dst);
        }
        (ValType::F32, ValType::I64) => {
            out.push(if dst_signed { 0xae } else { 0xaf });
            narrow_i64(out, dst);
        }
        (ValType::F64, ValType::I64) => {
            out.push(if dst_signed { 0xb0 } else { 0xb1 });
            narrow_i64(out, dst);
        }
        (ValType::F32, ValType::F64) => out.push(0xbb), // f64.promote_f32
        (ValType::F64, ValType::F32) => out.push(0xb6), // f32.demote_f64
        (ValType::F32, ValType::F32) | (ValType::F64, ValType::F64) => {}
    }
    Ok(())
}

/// Bit width of integer scalars narrower than their value type.
fn narrow_bits(tag: ScalarTy) -> Option<u32> {
    match tag {
        ScalarTy::U8 | ScalarTy::I8 => Some(8),
        ScalarTy::U16 | ScalarTy::I16 => Some(16),
        _ => None,
    }
}

fn narrow_i32(out: &mut Vec<u8>, dst: ScalarTy) {
    let Some(bits) = narrow_bits(dst) else { return };
    if dst.is_signed_integer() {
        let shift = 32 - bits;
        out.push(0x41);
        write_sleb(out, shift as i64);
        out.push(0x74); // i32.shl
        out.push(0x41);
        write_sleb(out, shift as i64);
        out.push(0x75); // i32.shr_s
    } else {
        let mask = (1i64 << bits) - 1;
        out.push(0x41);
        write_sleb(out, mask as i32 as i64);
        out.push(0x71); // i32.and
    }
}

fn narrow_i64(out: &mut Vec<u8>, dst: ScalarTy) {
    let bits = match narrow_bits(dst) {
        Some(bits) => bits,
        None if dst == ScalarTy::U32 => 32,
        None if dst == ScalarTy::I32 => 32,
        None => return,
    };
    if dst.is_signed_integer() {
        let shift = 64 - bits;
        out.push(0x42);
        write_sleb(out, shift as i64);
        out.push(0x86); // i64.shl
        out.push(0x42);
        write_sleb(out, shift as i64);
        out.push(0x87); // i64.shr_s
    } else {
        let mask = if bits == 32 {
            0xFFFF_FFFFi64
        } else {
            (1i64 << bits) - 1
        };
        out.push(0x42);
        write_sleb(out, mask);
        out.push(0x83); // i64.and
    }
}
