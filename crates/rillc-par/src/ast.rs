//! AST node definitions.
//!
//! Every expression, pattern, and type node carries a [`NodeId`] assigned by
//! the parser in creation order. The tree is immutable after parsing; the
//! semantic analyzer keys its side-tables (expression types, resolutions,
//! scopes) on these ids, so nothing here is ever mutated downstream.
//!
//! Syntax errors surface as `Error` variants inside the tree rather than
//! aborting the parse, which lets later phases report on the parts of the
//! program that did parse.

use rillc_lex::ScalarValue;
use rillc_util::{define_idx, Span};

define_idx!(
    /// Identity of an AST node, unique within one translation unit.
    NodeId
);

/// AST root: a translation unit is a sequence of items.
pub type Ast = Vec<Item>;

/// Top-level item.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Fn(FnItem),
    Struct(StructItem),
    Const(ConstItem),
    Error(ErrorNode),
}

/// A parse error embedded in the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorNode {
    pub message: String,
    pub span: Span,
}

/// Function item.
///
/// `body` is `None` for the declaration form `fn f();`.
#[derive(Clone, Debug, PartialEq)]
pub struct FnItem {
    pub id: NodeId,
    pub name: String,
    pub is_const: bool,
    pub params: Vec<Param>,
    pub ret_type: Option<TypeAst>,
    pub body: Option<Block>,
    pub span: Span,
}

/// Function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub pattern: Pattern,
    pub ty: TypeAst,
    pub span: Span,
}

/// Structure item, record or tuple flavoured.
#[derive(Clone, Debug, PartialEq)]
pub struct StructItem {
    pub id: NodeId,
    pub name: String,
    pub fields: StructFields,
    pub span: Span,
}

/// The two structure flavours.
#[derive(Clone, Debug, PartialEq)]
pub enum StructFields {
    Record(Vec<FieldDef>),
    Tuple(Vec<TypeAst>),
}

/// A named field of a record struct.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeAst,
    pub span: Span,
}

/// Constant item.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstItem {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeAst,
    pub value: Option<Expr>,
    pub span: Span,
}

/// Statement inside a block.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    /// Expression statement; its value is dropped.
    Expr(Expr),
    /// Bare semicolon.
    Semi(Span),
    Error(ErrorNode),
}

/// `let` binding.
#[derive(Clone, Debug, PartialEq)]
pub struct LetStmt {
    pub id: NodeId,
    pub pattern: Pattern,
    pub ty: Option<TypeAst>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Braced block with optional trailing expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(ScalarValue),
    Identifier(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Cast(Box<Expr>, TypeAst),
    Assign(AssignOp, Box<Expr>, Box<Expr>),
    /// `f(args)` - a call or a tuple-struct construction; which one is
    /// decided by the semantic analyzer.
    Call(Box<Expr>, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Member(Box<Expr>, MemberName),
    Block(Block),
    If(IfExpr),
    /// `loop { ... }`
    Loop(Block),
    /// `while cond { ... }`
    While(Box<Expr>, Block),
    /// `for pat in iter { ... }`
    For(ForExpr),
    Break(Option<Box<Expr>>),
    Continue,
    Return(Option<Box<Expr>>),
    Array(ArrayExpr),
    Tuple(Vec<Expr>),
    StructLiteral(StructLiteralExpr),
    Error(String),
}

/// Member access selector: `.name` or `.N`.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberName {
    Named(String),
    Index(u64),
}

/// `if` expression with optional `else` branch (a block or a chained `if`).
#[derive(Clone, Debug, PartialEq)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_block: Block,
    pub else_branch: Option<Box<Expr>>,
}

/// Iterator loop.
#[derive(Clone, Debug, PartialEq)]
pub struct ForExpr {
    pub pattern: Box<Pattern>,
    pub iter: Box<Expr>,
    pub body: Block,
}

/// Array literal in list form or `[value; count]` repeat form.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayExpr {
    List(Vec<Expr>),
    Repeat(Box<Expr>, Box<Expr>),
}

/// `Name { field: value, .. }` struct literal.
#[derive(Clone, Debug, PartialEq)]
pub struct StructLiteralExpr {
    pub name: String,
    pub fields: Vec<FieldInit>,
}

/// A single field initializer inside a struct literal.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldInit {
    /// `name: value`
    Named { name: String, value: Expr, span: Span },
    /// `name` (binds the variable of the same name)
    Shorthand { name: String, span: Span },
    /// `0: value` (tuple-struct field by index)
    Positional { index: u64, value: Expr, span: Span },
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    /// True for `== != < > <= >=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    /// Operator text for diagnostics.
    pub fn text(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

/// Prefix unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `*`
    Deref,
    /// `&` / `&mut`
    Ref { mutable: bool },
}

/// Assignment operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl AssignOp {
    /// The underlying binary operator of a compound assignment.
    pub fn base_op(self) -> Option<BinOp> {
        Some(match self {
            AssignOp::Assign => return None,
            AssignOp::Add => BinOp::Add,
            AssignOp::Sub => BinOp::Sub,
            AssignOp::Mul => BinOp::Mul,
            AssignOp::Div => BinOp::Div,
            AssignOp::Rem => BinOp::Rem,
            AssignOp::BitAnd => BinOp::BitAnd,
            AssignOp::BitOr => BinOp::BitOr,
            AssignOp::BitXor => BinOp::BitXor,
            AssignOp::Shl => BinOp::Shl,
            AssignOp::Shr => BinOp::Shr,
        })
    }
}

/// Pattern node.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub id: NodeId,
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Literal(ScalarValue),
    Identifier {
        name: String,
        is_ref: bool,
        is_mut: bool,
        sub: Option<Box<Pattern>>,
    },
    /// `_`
    Wildcard,
    /// `..`
    Rest,
    /// `&pat`, `&&pat`, with optional `mut`
    Reference {
        mutable: bool,
        double: bool,
        inner: Box<Pattern>,
    },
    Struct {
        name: String,
        fields: Vec<FieldPattern>,
        has_rest: bool,
    },
    TupleStruct {
        name: String,
        elems: Vec<Pattern>,
    },
    Tuple(Vec<Pattern>),
    Grouped(Box<Pattern>),
    Error(String),
}

/// Field inside a struct pattern; `pattern` is `None` for the shorthand
/// binding form.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPattern {
    pub name: String,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

/// Type node as written in source.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAst {
    pub id: NodeId,
    pub span: Span,
    pub kind: TypeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Paren(Box<TypeAst>),
    /// `(A, B)`; the empty list is the unit type.
    Tuple(Vec<TypeAst>),
    Reference {
        mutable: bool,
        inner: Box<TypeAst>,
    },
    Array {
        elem: Box<TypeAst>,
        len: Box<Expr>,
    },
    Named(String),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_op_base() {
        assert_eq!(AssignOp::Assign.base_op(), None);
        assert_eq!(AssignOp::Add.base_op(), Some(BinOp::Add));
        assert_eq!(AssignOp::Shl.base_op(), Some(BinOp::Shl));
    }

    #[test]
    fn test_comparison_classification() {
        assert!(BinOp::Le.is_comparison());
        assert!(!BinOp::Add.is_comparison());
        assert!(!BinOp::And.is_comparison());
    }
}
