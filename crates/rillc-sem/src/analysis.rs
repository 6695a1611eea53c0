//! Analysis driver: pass orchestration, scope building, and signature
//! elaboration.

use indexmap::IndexMap;
use rillc_lex::ScalarTy;
use rillc_par::{
    ArrayExpr, Ast, Block, Expr, ExprKind, FnItem, Item, NodeId, PatternKind, Stmt, StructFields,
    StructItem, TypeAst, TypeKind,
};
use rillc_util::{FxHashMap, Handler, IndexVec, Span, Stage};

use crate::scope::{ScopeId, ScopeKind, ScopeTree, Symbol, SymbolId, SymbolKind};
use crate::types::{Type, TypeId, TypeTable};

/// Signature of a function provided by the host, taken from the
/// import/export table. Imports are declared in the root scope under their
/// `associate` name before analysis begins, so calls to them resolve like
/// calls to any other function.
#[derive(Clone, Debug)]
pub struct ExternSig {
    pub name: String,
    pub params: Vec<ScalarTy>,
    pub ret: ScalarTy,
}

/// Everything semantic analysis learned about one translation unit.
///
/// The AST is untouched; all results are keyed by node identity. After
/// `analyze` returns this value is frozen, and the emitter reads it
/// without further coordination.
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
    pub symbols: IndexVec<SymbolId, Symbol>,
    pub types: TypeTable,
    /// `type_of_expression` for every expression node.
    pub expr_types: FxHashMap<NodeId, TypeId>,
    /// Identifier expressions, call callees, parameters, and `let`
    /// statements to the symbol they bind or reference.
    pub resolutions: FxHashMap<NodeId, SymbolId>,
    /// Function and block nodes to the scope created for them.
    pub scopes_of: FxHashMap<NodeId, ScopeId>,
    /// Function item to its `let` symbols (parameters first, then bindings
    /// in declaration order, nested blocks included).
    pub fn_locals: FxHashMap<NodeId, Vec<SymbolId>>,
    /// Function item to its declared symbol.
    pub fn_symbols: FxHashMap<NodeId, SymbolId>,
}

impl Analysis {
    /// Type of an expression node. Only total for programs that analyzed
    /// without errors.
    pub fn type_of(&self, id: NodeId) -> Option<TypeId> {
        self.expr_types.get(&id).copied()
    }
}

/// Runs all three passes.
pub fn analyze(ast: &Ast, externs: &[ExternSig], handler: &mut Handler) -> Analysis {
    let mut analyzer = SemanticAnalyzer::new(handler);
    analyzer.declare_externs(externs);
    analyzer.declare_items(ast);
    analyzer.elaborate_signatures(ast);
    analyzer.check_bodies(ast);
    analyzer.finish()
}

pub(crate) struct SemanticAnalyzer<'a> {
    pub(crate) handler: &'a mut Handler,
    pub(crate) scopes: ScopeTree,
    pub(crate) symbols: IndexVec<SymbolId, Symbol>,
    pub(crate) types: TypeTable,
    pub(crate) expr_types: FxHashMap<NodeId, TypeId>,
    pub(crate) resolutions: FxHashMap<NodeId, SymbolId>,
    pub(crate) scopes_of: FxHashMap<NodeId, ScopeId>,
    pub(crate) fn_locals: FxHashMap<NodeId, Vec<SymbolId>>,
    pub(crate) fn_symbols: FxHashMap<NodeId, SymbolId>,
}

impl<'a> SemanticAnalyzer<'a> {
    fn new(handler: &'a mut Handler) -> Self {
        Self {
            handler,
            scopes: ScopeTree::new(),
            symbols: IndexVec::new(),
            types: TypeTable::new(),
            expr_types: FxHashMap::default(),
            resolutions: FxHashMap::default(),
            scopes_of: FxHashMap::default(),
            fn_locals: FxHashMap::default(),
            fn_symbols: FxHashMap::default(),
        }
    }

    fn finish(self) -> Analysis {
        Analysis {
            scopes: self.scopes,
            symbols: self.symbols,
            types: self.types,
            expr_types: self.expr_types,
            resolutions: self.resolutions,
            scopes_of: self.scopes_of,
            fn_locals: self.fn_locals,
            fn_symbols: self.fn_symbols,
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.handler.error(Stage::Sem, message, span);
    }

    pub(crate) fn add_symbol(&mut self, name: &str, kind: SymbolKind) -> SymbolId {
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
        })
    }

    /// Declares `symbol` in `scope`, reporting a duplicate-definition error
    /// if the name is taken.
    pub(crate) fn declare(&mut self, scope: ScopeId, name: &str, symbol: SymbolId, span: Span) {
        if self.scopes.declare(scope, name, symbol).is_err() {
            self.error(format!("duplicate definition of `{}`", name), span);
        }
    }

    // ==================================================================
    // Externs
    // ==================================================================

    fn declare_externs(&mut self, externs: &[ExternSig]) {
        for sig in externs {
            let params = sig
                .params
                .iter()
                .enumerate()
                .map(|(i, &tag)| (format!("arg{}", i), self.types.scalar(tag)))
                .collect();
            let ret = self.types.scalar(sig.ret);
            let ty = self.types.add(Type::Func { params, ret });
            let symbol = self.add_symbol(&sig.name, SymbolKind::Func { ty });
            self.declare(self.scopes.root(), &sig.name, symbol, Span::DUMMY);
        }
    }

    // ==================================================================
    // Pass 1: scope build and item declaration
    // ==================================================================

    /// Declares struct and function names before any body is looked at, so
    /// forward references between items at the same level resolve.
    fn declare_items(&mut self, ast: &Ast) {
        let root = self.scopes.root();

        for item in ast {
            match item {
                Item::Struct(item) => self.declare_struct(item),
                Item::Fn(item) => self.declare_fn(item),
                Item::Const(item) => {
                    let placeholder = self.types.error();
                    let symbol = self.add_symbol(
                        &item.name,
                        SymbolKind::Let {
                            mutable: false,
                            ty: placeholder,
                        },
                    );
                    self.declare(root, &item.name, symbol, item.span);
                    self.resolutions.insert(item.id, symbol);
                }
                Item::Error(_) => {}
            }
        }

        // Block scopes are created up front so pass 3 can enter them by id.
        for item in ast {
            if let Item::Fn(item) = item {
                if let Some(body) = &item.body {
                    let fn_scope = self.scopes_of[&item.id];
                    self.build_block_scope(body, fn_scope);
                }
            }
        }
    }

    fn declare_struct(&mut self, item: &StructItem) {
        let placeholder = match item.fields {
            StructFields::Record(_) => Type::Struct {
                name: item.name.clone(),
                fields: IndexMap::new(),
            },
            StructFields::Tuple(_) => Type::TupleStruct {
                name: item.name.clone(),
                elems: Vec::new(),
            },
        };
        let ty = self.types.add(placeholder);
        let symbol = self.add_symbol(&item.name, SymbolKind::Struct { ty });
        self.declare(self.scopes.root(), &item.name, symbol, item.span);
        self.resolutions.insert(item.id, symbol);
    }

    fn declare_fn(&mut self, item: &FnItem) {
        let void = self.types.void();
        let placeholder = self.types.add(Type::Func {
            params: Vec::new(),
            ret: void,
        });
        let symbol = self.add_symbol(&item.name, SymbolKind::Func { ty: placeholder });
        self.declare(self.scopes.root(), &item.name, symbol, item.span);
        self.fn_symbols.insert(item.id, symbol);
        self.fn_locals.insert(item.id, Vec::new());

        let fn_scope = self.scopes.push(self.scopes.root(), ScopeKind::Function);
        self.scopes_of.insert(item.id, fn_scope);
    }

    /// Creates the scope for `block` and recurses into every nested block.
    fn build_block_scope(&mut self, block: &Block, parent: ScopeId) {
        let scope = self.scopes.push(parent, ScopeKind::Block);
        self.scopes_of.insert(block.id, scope);

        for stmt in &block.stmts {
            match stmt {
                Stmt::Let(let_stmt) => {
                    if let Some(init) = &let_stmt.init {
                        self.build_expr_scopes(init, scope);
                    }
                }
                Stmt::Expr(expr) => self.build_expr_scopes(expr, scope),
                Stmt::Semi(_) | Stmt::Error(_) => {}
            }
        }
        if let Some(tail) = &block.tail {
            self.build_expr_scopes(tail, scope);
        }
    }

    fn build_expr_scopes(&mut self, expr: &Expr, scope: ScopeId) {
        match &expr.kind {
            ExprKind::Block(block) => self.build_block_scope(block, scope),
            ExprKind::If(if_expr) => {
                self.build_expr_scopes(&if_expr.cond, scope);
                self.build_block_scope(&if_expr.then_block, scope);
                if let Some(else_branch) = &if_expr.else_branch {
                    self.build_expr_scopes(else_branch, scope);
                }
            }
            ExprKind::Loop(body) => self.build_block_scope(body, scope),
            ExprKind::While(cond, body) => {
                self.build_expr_scopes(cond, scope);
                self.build_block_scope(body, scope);
            }
            ExprKind::For(for_expr) => {
                self.build_expr_scopes(&for_expr.iter, scope);
                self.build_block_scope(&for_expr.body, scope);
            }
            ExprKind::Binary(_, lhs, rhs) | ExprKind::Assign(_, lhs, rhs) => {
                self.build_expr_scopes(lhs, scope);
                self.build_expr_scopes(rhs, scope);
            }
            ExprKind::Unary(_, operand) => self.build_expr_scopes(operand, scope),
            ExprKind::Cast(operand, _) => self.build_expr_scopes(operand, scope),
            ExprKind::Call(callee, args) => {
                self.build_expr_scopes(callee, scope);
                for arg in args {
                    self.build_expr_scopes(arg, scope);
                }
            }
            ExprKind::Index(base, index) => {
                self.build_expr_scopes(base, scope);
                self.build_expr_scopes(index, scope);
            }
            ExprKind::Member(base, _) => self.build_expr_scopes(base, scope),
            ExprKind::Break(value) | ExprKind::Return(value) => {
                if let Some(value) = value {
                    self.build_expr_scopes(value, scope);
                }
            }
            ExprKind::Array(ArrayExpr::List(elems)) | ExprKind::Tuple(elems) => {
                for elem in elems {
                    self.build_expr_scopes(elem, scope);
                }
            }
            ExprKind::Array(ArrayExpr::Repeat(value, count)) => {
                self.build_expr_scopes(value, scope);
                self.build_expr_scopes(count, scope);
            }
            ExprKind::StructLiteral(lit) => {
                for field in &lit.fields {
                    match field {
                        rillc_par::FieldInit::Named { value, .. }
                        | rillc_par::FieldInit::Positional { value, .. } => {
                            self.build_expr_scopes(value, scope)
                        }
                        rillc_par::FieldInit::Shorthand { .. } => {}
                    }
                }
            }
            ExprKind::Literal(_)
            | ExprKind::Identifier(_)
            | ExprKind::Continue
            | ExprKind::Error(_) => {}
        }
    }

    // ==================================================================
    // Pass 2: signature elaboration
    // ==================================================================

    fn elaborate_signatures(&mut self, ast: &Ast) {
        for item in ast {
            match item {
                Item::Struct(item) => self.elaborate_struct(item),
                Item::Fn(item) => self.elaborate_fn(item),
                Item::Const(item) => {
                    let ty = self.resolve_type(&item.ty, self.scopes.root());
                    if let Some(&symbol) = self.resolutions.get(&item.id) {
                        self.symbols[symbol].kind = SymbolKind::Let { mutable: false, ty };
                    }
                }
                Item::Error(_) => {}
            }
        }
    }

    fn elaborate_struct(&mut self, item: &StructItem) {
        let Some(&symbol) = self.resolutions.get(&item.id) else {
            return;
        };
        let type_id = self.symbols[symbol].type_id();
        let root = self.scopes.root();

        match &item.fields {
            StructFields::Record(fields) => {
                let mut map = IndexMap::new();
                for field in fields {
                    let ty = self.resolve_type(&field.ty, root);
                    if map.insert(field.name.clone(), ty).is_some() {
                        self.error(
                            format!("duplicate field `{}` in struct `{}`", field.name, item.name),
                            field.span,
                        );
                    }
                }
                self.types.replace(
                    type_id,
                    Type::Struct {
                        name: item.name.clone(),
                        fields: map,
                    },
                );
            }
            StructFields::Tuple(elems) => {
                let elems = elems.iter().map(|ty| self.resolve_type(ty, root)).collect();
                self.types.replace(
                    type_id,
                    Type::TupleStruct {
                        name: item.name.clone(),
                        elems,
                    },
                );
            }
        }
    }

    fn elaborate_fn(&mut self, item: &FnItem) {
        let Some(&symbol) = self.fn_symbols.get(&item.id) else {
            return;
        };
        let fn_scope = self.scopes_of[&item.id];

        let mut params = Vec::with_capacity(item.params.len());
        for param in &item.params {
            let ty = self.resolve_type(&param.ty, fn_scope);

            let name = match &param.pattern.kind {
                PatternKind::Identifier {
                    name,
                    is_ref: false,
                    is_mut: false,
                    sub: None,
                } => name.clone(),
                _ => {
                    self.error(
                        "function parameters must be plain identifier patterns",
                        param.pattern.span,
                    );
                    continue;
                }
            };

            params.push((name.clone(), ty));

            let param_symbol = self.add_symbol(&name, SymbolKind::Let { mutable: false, ty });
            self.declare(fn_scope, &name, param_symbol, param.span);
            self.resolutions.insert(param.id, param_symbol);
            if let Some(locals) = self.fn_locals.get_mut(&item.id) {
                locals.push(param_symbol);
            }
        }

        let ret = match &item.ret_type {
            Some(ty) => self.resolve_type(ty, fn_scope),
            None => self.types.void(),
        };

        let type_id = self.symbols[symbol].type_id();
        self.types.replace(type_id, Type::Func { params, ret });
    }

    // ==================================================================
    // Type resolution
    // ==================================================================

    /// Resolves a written type to its semantic type. Built-in scalar names
    /// win over user types; the unit type `()` canonicalizes to `void`.
    pub(crate) fn resolve_type(&mut self, ty: &TypeAst, scope: ScopeId) -> TypeId {
        match &ty.kind {
            TypeKind::Named(name) => {
                if let Some(tag) = ScalarTy::from_name(name) {
                    return self.types.scalar(tag);
                }
                match self.scopes.resolve(scope, name) {
                    Some(symbol) => match self.symbols[symbol].kind.clone() {
                        SymbolKind::Struct { ty } => ty,
                        _ => {
                            self.error(format!("`{}` is not a type", name), ty.span);
                            self.types.error()
                        }
                    },
                    None => {
                        self.error(format!("unknown type `{}`", name), ty.span);
                        self.types.error()
                    }
                }
            }
            TypeKind::Paren(inner) => self.resolve_type(inner, scope),
            TypeKind::Tuple(elems) if elems.is_empty() => self.types.void(),
            TypeKind::Tuple(elems) => {
                let elems = elems
                    .iter()
                    .map(|elem| self.resolve_type(elem, scope))
                    .collect();
                self.types.add(Type::Tuple(elems))
            }
            TypeKind::Reference { mutable, inner } => {
                let inner = self.resolve_type(inner, scope);
                self.types.add(Type::Ref {
                    mutable: *mutable,
                    inner,
                })
            }
            TypeKind::Array { elem, len } => {
                let elem = self.resolve_type(elem, scope);
                let len = self.const_array_length(len);
                self.types.add(Type::Array { elem, len })
            }
            TypeKind::Error(_) => self.types.error(),
        }
    }

    /// Array lengths in type position must be integer literals.
    fn const_array_length(&mut self, len: &Expr) -> u64 {
        match &len.kind {
            ExprKind::Literal(value) => match value.as_unsigned() {
                Some(n) => n,
                None => {
                    self.error("array length must be an unsigned integer literal", len.span);
                    0
                }
            },
            _ => {
                self.error("array length must be an integer literal", len.span);
                0
            }
        }
    }
}
