//! # Resolved Syntax Tree
//!
//! The tree the type checker consumes. It is produced by the parser and then
//! annotated by binding resolution: every identifier carries the
//! [`SymbolId`] of the declaration it denotes, and every node carries a
//! [`NodeId`] that keys the checker's type table.
//!
//! Node kinds are closed enums so adding a syntactic form forces every match
//! in the checker to handle it.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a tree node. Unique within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a declaration in the [`SymbolTable`](crate::symbols::SymbolTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

/// A name together with the declaration binding resolution linked it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub symbol: SymbolId,
    pub span: Span,
}

/// The root of a compilation unit: a list of global declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: NodeId,
    pub span: Span,
    pub globals: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub id: NodeId,
    pub span: Span,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Var(VarDecl),
    Fn(FnDecl),
    Record(RecordDecl),
}

/// `int x;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: TypeNode,
    pub name: Ident,
}

/// `int add(int a, int b) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: Ident,
    pub formals: Vec<Formal>,
    pub ret: TypeNode,
    pub body: Vec<Stmt>,
}

/// A formal parameter. Typed like a variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formal {
    pub id: NodeId,
    pub span: Span,
    pub decl: VarDecl,
}

/// `record Point { int x; int y; }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub ty: TypeNode,
}

/// A written type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: NodeId,
    pub span: Span,
    pub kind: TypeNodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNodeKind {
    Int,
    Bool,
    String,
    Void,
    /// A reference to a declared record type by name.
    Record(Ident),
    Fn {
        formals: Vec<TypeNode>,
        ret: Box<TypeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    VarDecl(VarDecl),
    /// Holds an [`ExprKind::Assign`] expression.
    Assign(Expr),
    PostInc(Expr),
    PostDec(Expr),
    Receive(Expr),
    Report(Expr),
    If {
        cond: Expr,
        body: Vec<Stmt>,
    },
    IfElse {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    /// Holds an [`ExprKind::Call`] expression.
    Call(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

impl Expr {
    /// True when this expression invokes a function rather than naming one.
    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    IntLit(i64),
    StrLit(String),
    BoolLit(bool),
    Id(Ident),
    FieldAccess {
        base: Box<Expr>,
        field: String,
    },
    Assign {
        dst: Box<Expr>,
        src: Box<Expr>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `Point { x = 1, y = 2 }`
    RecordLit {
        record: Ident,
        fields: Vec<FieldInit>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: String,
    pub span: Span,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    And,
    Or,
    Equals,
    NotEquals,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Program {
    /// Every node id in the program, in preorder.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id];
        for decl in &self.globals {
            collect_decl(decl, &mut ids);
        }
        ids
    }
}

fn collect_decl(decl: &Decl, ids: &mut Vec<NodeId>) {
    ids.push(decl.id);
    match &decl.kind {
        DeclKind::Var(var) => collect_type(&var.ty, ids),
        DeclKind::Fn(func) => {
            for formal in &func.formals {
                ids.push(formal.id);
                collect_type(&formal.decl.ty, ids);
            }
            collect_type(&func.ret, ids);
            for stmt in &func.body {
                collect_stmt(stmt, ids);
            }
        }
        DeclKind::Record(record) => {
            for field in &record.fields {
                ids.push(field.id);
                collect_type(&field.ty, ids);
            }
        }
    }
}

fn collect_type(ty: &TypeNode, ids: &mut Vec<NodeId>) {
    ids.push(ty.id);
    if let TypeNodeKind::Fn { formals, ret } = &ty.kind {
        for formal in formals {
            collect_type(formal, ids);
        }
        collect_type(ret, ids);
    }
}

fn collect_stmt(stmt: &Stmt, ids: &mut Vec<NodeId>) {
    ids.push(stmt.id);
    match &stmt.kind {
        StmtKind::VarDecl(var) => collect_type(&var.ty, ids),
        StmtKind::Assign(e)
        | StmtKind::PostInc(e)
        | StmtKind::PostDec(e)
        | StmtKind::Receive(e)
        | StmtKind::Report(e)
        | StmtKind::Call(e) => collect_expr(e, ids),
        StmtKind::If { cond, body } | StmtKind::While { cond, body } => {
            collect_expr(cond, ids);
            for s in body {
                collect_stmt(s, ids);
            }
        }
        StmtKind::IfElse { cond, then_body, else_body } => {
            collect_expr(cond, ids);
            for s in then_body.iter().chain(else_body) {
                collect_stmt(s, ids);
            }
        }
        StmtKind::Return(exp) => {
            if let Some(e) = exp {
                collect_expr(e, ids);
            }
        }
    }
}

fn collect_expr(expr: &Expr, ids: &mut Vec<NodeId>) {
    ids.push(expr.id);
    match &expr.kind {
        ExprKind::IntLit(_) | ExprKind::StrLit(_) | ExprKind::BoolLit(_) | ExprKind::Id(_) => {}
        ExprKind::FieldAccess { base, .. } => collect_expr(base, ids),
        ExprKind::Assign { dst, src } => {
            collect_expr(dst, ids);
            collect_expr(src, ids);
        }
        ExprKind::Call { args, .. } => {
            for arg in args {
                collect_expr(arg, ids);
            }
        }
        ExprKind::Unary { operand, .. } => collect_expr(operand, ids),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_expr(lhs, ids);
            collect_expr(rhs, ids);
        }
        ExprKind::RecordLit { fields, .. } => {
            for init in fields {
                collect_expr(&init.value, ids);
            }
        }
    }
}
