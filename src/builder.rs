//! Programmatic construction of resolved trees.
//!
//! [`AstBuilder`] hands out fresh node ids and distinct spans, and declares
//! symbols as it goes, so a test can write a program the way binding
//! resolution would have produced it:
//!
//! ```
//! use shanty_typeck::{AstBuilder, BinaryOp, TypeId, TypeRegistry, type_check};
//!
//! let mut registry = TypeRegistry::new();
//! let mut b = AstBuilder::new();
//! let x = b.var("x", TypeId::INT);
//! let main_ty = registry.function(vec![], TypeId::VOID);
//! let main = b.func("main", main_ty);
//!
//! let int_ty = b.int_ty();
//! let local = b.var_decl(int_ty, &x);
//! let local = b.var_stmt(local);
//! let lhs = b.id(&x);
//! let rhs = b.int(1);
//! let sum = b.binary(BinaryOp::Plus, lhs, rhs);
//! let report = b.report(sum);
//! let ret = b.void_ty();
//! let decl = b.fn_decl(&main, vec![], ret, vec![local, report]);
//! let program = b.program(vec![decl]);
//!
//! let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
//! assert!(analysis.passed());
//! ```

use crate::ast::*;
use crate::span::Span;
use crate::symbols::{SymbolKind, SymbolTable};
use crate::types::TypeId;

/// Builds tree nodes with fresh ids and spans, declaring symbols on the way.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_node: u32,
    offset: usize,
    symbols: SymbolTable,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbols declared so far.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Finishes building and keeps only the symbol table.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    fn span(&mut self) -> Span {
        let start = self.offset;
        self.offset += 2;
        Span::new(start, start + 1)
    }

    fn node(&mut self) -> (NodeId, Span) {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        (id, self.span())
    }

    /// Declares a symbol and returns the identifier at its declaration site.
    pub fn declare(&mut self, name: &str, kind: SymbolKind, ty: TypeId) -> Ident {
        let symbol = self.symbols.declare(name, kind, ty);
        Ident {
            name: name.to_string(),
            symbol,
            span: self.span(),
        }
    }

    /// Declares a variable of type `ty`.
    pub fn var(&mut self, name: &str, ty: TypeId) -> Ident {
        self.declare(name, SymbolKind::Var, ty)
    }

    /// Declares a function; `ty` should be a function type.
    pub fn func(&mut self, name: &str, ty: TypeId) -> Ident {
        self.declare(name, SymbolKind::Fn, ty)
    }

    /// Declares a record name bound to the record type `ty`.
    pub fn record(&mut self, name: &str, ty: TypeId) -> Ident {
        self.declare(name, SymbolKind::Record, ty)
    }

    /// Another occurrence of an already declared name.
    pub fn use_of(&mut self, ident: &Ident) -> Ident {
        Ident {
            name: ident.name.clone(),
            symbol: ident.symbol,
            span: self.span(),
        }
    }

    // Type annotations

    pub fn type_node(&mut self, kind: TypeNodeKind) -> TypeNode {
        let (id, span) = self.node();
        TypeNode { id, span, kind }
    }

    pub fn int_ty(&mut self) -> TypeNode {
        self.type_node(TypeNodeKind::Int)
    }

    pub fn bool_ty(&mut self) -> TypeNode {
        self.type_node(TypeNodeKind::Bool)
    }

    pub fn string_ty(&mut self) -> TypeNode {
        self.type_node(TypeNodeKind::String)
    }

    pub fn void_ty(&mut self) -> TypeNode {
        self.type_node(TypeNodeKind::Void)
    }

    /// A record type annotation naming `record`.
    pub fn record_ty(&mut self, record: &Ident) -> TypeNode {
        let name = self.use_of(record);
        self.type_node(TypeNodeKind::Record(name))
    }

    /// `(formals) -> ret`
    pub fn fn_ty(&mut self, formals: Vec<TypeNode>, ret: TypeNode) -> TypeNode {
        self.type_node(TypeNodeKind::Fn {
            formals,
            ret: Box::new(ret),
        })
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        let (id, span) = self.node();
        Expr { id, span, kind }
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::IntLit(value))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::StrLit(value.to_string()))
    }

    pub fn bool(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::BoolLit(value))
    }

    /// A use of `ident` as a value.
    pub fn id(&mut self, ident: &Ident) -> Expr {
        let ident = self.use_of(ident);
        self.expr(ExprKind::Id(ident))
    }

    /// `base.field`
    pub fn field(&mut self, base: Expr, field: &str) -> Expr {
        self.expr(ExprKind::FieldAccess {
            base: Box::new(base),
            field: field.to_string(),
        })
    }

    /// `dst = src` as an expression.
    pub fn assign(&mut self, dst: Expr, src: Expr) -> Expr {
        self.expr(ExprKind::Assign {
            dst: Box::new(dst),
            src: Box::new(src),
        })
    }

    /// `callee(args)`
    pub fn call(&mut self, callee: &Ident, args: Vec<Expr>) -> Expr {
        let callee = self.use_of(callee);
        self.expr(ExprKind::Call { callee, args })
    }

    pub fn neg(&mut self, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        })
    }

    pub fn not(&mut self, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// `Record { name: value, .. }` in the given field order.
    pub fn record_lit(&mut self, record: &Ident, fields: Vec<(&str, Expr)>) -> Expr {
        let record = self.use_of(record);
        let fields = fields
            .into_iter()
            .map(|(name, value)| FieldInit {
                name: name.to_string(),
                span: self.span(),
                value,
            })
            .collect();
        self.expr(ExprKind::RecordLit { record, fields })
    }

    // Statements

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let (id, span) = self.node();
        Stmt { id, span, kind }
    }

    pub fn var_stmt(&mut self, decl: VarDecl) -> Stmt {
        self.stmt(StmtKind::VarDecl(decl))
    }

    /// `dst = src;`
    pub fn assign_stmt(&mut self, dst: Expr, src: Expr) -> Stmt {
        let exp = self.assign(dst, src);
        self.stmt(StmtKind::Assign(exp))
    }

    /// `lval++;`
    pub fn post_inc(&mut self, lval: Expr) -> Stmt {
        self.stmt(StmtKind::PostInc(lval))
    }

    /// `lval--;`
    pub fn post_dec(&mut self, lval: Expr) -> Stmt {
        self.stmt(StmtKind::PostDec(lval))
    }

    /// `receive dst;`
    pub fn receive(&mut self, dst: Expr) -> Stmt {
        self.stmt(StmtKind::Receive(dst))
    }

    /// `report src;`
    pub fn report(&mut self, src: Expr) -> Stmt {
        self.stmt(StmtKind::Report(src))
    }

    pub fn if_stmt(&mut self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::If { cond, body })
    }

    pub fn if_else(&mut self, cond: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::IfElse {
            cond,
            then_body,
            else_body,
        })
    }

    pub fn while_stmt(&mut self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::While { cond, body })
    }

    /// `return;` or `return exp;`
    pub fn ret(&mut self, exp: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(exp))
    }

    /// A call evaluated for its effect.
    pub fn call_stmt(&mut self, call: Expr) -> Stmt {
        self.stmt(StmtKind::Call(call))
    }

    // Declarations

    pub fn var_decl(&mut self, ty: TypeNode, name: &Ident) -> VarDecl {
        VarDecl {
            ty,
            name: self.use_of(name),
        }
    }

    /// A function parameter.
    pub fn formal(&mut self, ty: TypeNode, name: &Ident) -> Formal {
        let decl = self.var_decl(ty, name);
        let (id, span) = self.node();
        Formal { id, span, decl }
    }

    pub fn decl(&mut self, kind: DeclKind) -> Decl {
        let (id, span) = self.node();
        Decl { id, span, kind }
    }

    /// A variable declared at the top level.
    pub fn global_var(&mut self, ty: TypeNode, name: &Ident) -> Decl {
        let var = self.var_decl(ty, name);
        self.decl(DeclKind::Var(var))
    }

    pub fn fn_decl(&mut self, name: &Ident, formals: Vec<Formal>, ret: TypeNode, body: Vec<Stmt>) -> Decl {
        let name = self.use_of(name);
        self.decl(DeclKind::Fn(FnDecl {
            name,
            formals,
            ret,
            body,
        }))
    }

    /// `record Name { ty field; .. }` with one field node per entry.
    pub fn record_decl(&mut self, name: &Ident, fields: Vec<(&str, TypeNode)>) -> Decl {
        let name = self.use_of(name);
        let fields = fields
            .into_iter()
            .map(|(field, ty)| {
                let (id, span) = self.node();
                FieldDecl {
                    id,
                    span,
                    name: field.to_string(),
                    ty,
                }
            })
            .collect();
        self.decl(DeclKind::Record(RecordDecl { name, fields }))
    }

    /// The root node.
    pub fn program(&mut self, globals: Vec<Decl>) -> Program {
        let (id, span) = self.node();
        Program { id, span, globals }
    }
}
