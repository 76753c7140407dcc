//! # Type Checker
//!
//! Walks a resolved [`Program`] once, depth first. Every node's children are
//! checked before the node's own rule runs, and every node's type is recorded
//! exactly once in the [`TypeTable`].
//!
//! Violations are reported to the [`Sink`] and replaced by
//! [`TypeId::ERROR`] so the walk can continue. An operand that is already
//! `ERROR` was explained where it failed; rules never complain about it again.
//!
//! Functions are first-class, but a function-typed operand only takes part in
//! an operator when it is a call whose function type returns what the
//! operator needs.

use crate::ast::*;
use crate::diagnostic::DiagnosticBag;
use crate::error::{CheckError, TypeError};
use crate::sink::{Sink, TypeDiagnostic, TypeTable};
use crate::span::Span;
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::types::{TypeId, TypeRegistry};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug_span, info, trace};

/// The result of a completed run.
#[derive(Debug)]
pub struct TypeAnalysis {
    table: TypeTable,
    sink: Sink,
}

impl TypeAnalysis {
    /// Whether no rule was violated.
    pub fn passed(&self) -> bool {
        self.sink.passed()
    }

    /// Violations in the order they were found.
    pub fn diagnostics(&self) -> &[TypeDiagnostic] {
        self.sink.diagnostics()
    }

    /// The table as computed, including `ERROR` entries on a failed run.
    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// The type recorded for `node`, if the walk reached it.
    pub fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.table.get(node)
    }

    /// Hands the table to later stages. A failed run yields nothing.
    pub fn into_table(self) -> Option<TypeTable> {
        if self.sink.passed() {
            Some(self.table)
        } else {
            None
        }
    }

    /// Renderable forms of [`TypeAnalysis::diagnostics`].
    pub fn to_diagnostics(&self) -> DiagnosticBag {
        self.diagnostics().iter().map(TypeDiagnostic::to_diagnostic).collect()
    }
}

/// Type checks `program`.
///
/// `symbols` and `registry` come from binding resolution; the registry is
/// extended with any types the checker needs to intern.
pub fn type_check(
    program: &Program,
    symbols: &SymbolTable,
    registry: &mut TypeRegistry,
) -> Result<TypeAnalysis, CheckError> {
    let mut checker = TypeChecker::new(symbols, registry);
    checker.check_program(program)?;
    Ok(checker.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Satisfies,
    Mismatch,
    /// Already reported where it failed.
    Poisoned,
}

#[derive(Debug, Clone, Copy)]
enum Construct {
    If,
    While,
}

/// One depth-first walk over a program. Most callers want [`type_check`].
pub struct TypeChecker<'a> {
    symbols: &'a SymbolTable,
    registry: &'a mut TypeRegistry,
    table: TypeTable,
    sink: Sink,
    /// Record types whose declaration is ill-formed. Values of these types
    /// are typed `ERROR` wherever they appear.
    broken_records: HashSet<TypeId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(symbols: &'a SymbolTable, registry: &'a mut TypeRegistry) -> Self {
        Self {
            symbols,
            registry,
            table: TypeTable::new(),
            sink: Sink::new(),
            broken_records: HashSet::new(),
        }
    }

    /// Ends the walk and hands back its results.
    pub fn finish(self) -> TypeAnalysis {
        info!(
            nodes = self.table.len(),
            errors = self.sink.diagnostics().len(),
            passed = self.sink.passed(),
            "type analysis finished"
        );
        TypeAnalysis {
            table: self.table,
            sink: self.sink,
        }
    }

    fn symbol(&self, ident: &Ident) -> Result<&'a Symbol, CheckError> {
        let symbols: &'a SymbolTable = self.symbols;
        symbols.get(ident.symbol).ok_or_else(|| CheckError::UnresolvedSymbol {
            name: ident.name.clone(),
            symbol: ident.symbol,
        })
    }

    fn record(&mut self, node: NodeId, ty: TypeId) -> TypeId {
        trace!(%node, ty = %self.registry.display(ty), "typed");
        self.table.record(node, ty)
    }

    fn report(&mut self, error: TypeError, span: Span) {
        self.sink.report(error, span);
    }

    fn show(&self, ty: TypeId) -> String {
        self.registry.display(ty).to_string()
    }

    fn is_error(&self, ty: TypeId) -> bool {
        self.registry.is_error(ty)
    }

    /// `ty` itself, or `ERROR` when it is a record whose declaration failed.
    fn usable(&self, ty: TypeId) -> TypeId {
        if self.broken_records.contains(&ty) {
            TypeId::ERROR
        } else {
            ty
        }
    }

    pub fn check_program(&mut self, program: &Program) -> Result<(), CheckError> {
        // Records may be used before their declaration, so broken ones are
        // found up front. The declaration itself reports why.
        for decl in &program.globals {
            if let DeclKind::Record(record) = &decl.kind {
                let ty = self.symbol(&record.name)?.ty;
                if !record_is_well_formed(record) && self.registry.is_record(ty) {
                    self.broken_records.insert(ty);
                }
            }
        }
        for decl in &program.globals {
            self.check_decl(decl)?;
        }
        self.record(program.id, TypeId::VOID);
        Ok(())
    }

    fn check_decl(&mut self, decl: &Decl) -> Result<(), CheckError> {
        let ty = match &decl.kind {
            DeclKind::Var(var) => {
                self.check_var_decl(var)?;
                TypeId::VOID
            }
            DeclKind::Fn(func) => self.check_fn_decl(func)?,
            DeclKind::Record(record) => self.check_record_decl(record)?,
        };
        self.record(decl.id, ty);
        Ok(())
    }

    // Declarations are never used as values; only their annotation is checked.
    fn check_var_decl(&mut self, var: &VarDecl) -> Result<(), CheckError> {
        self.check_type_node(&var.ty)?;
        Ok(())
    }

    fn check_fn_decl(&mut self, func: &FnDecl) -> Result<TypeId, CheckError> {
        let _span = debug_span!("fn", name = %func.name.name).entered();

        for formal in &func.formals {
            self.check_var_decl(&formal.decl)?;
            self.record(formal.id, TypeId::VOID);
        }
        let ret = self.check_type_node(&func.ret)?;
        for stmt in &func.body {
            self.check_stmt(stmt, ret)?;
        }
        Ok(self.symbol(&func.name)?.ty)
    }

    fn check_record_decl(&mut self, record: &RecordDecl) -> Result<TypeId, CheckError> {
        let name = &record.name.name;
        let mut seen = HashSet::new();
        let mut valid = true;

        for field in &record.fields {
            let ty = self.check_type_node(&field.ty)?;
            let field_ty = if !seen.insert(field.name.as_str()) {
                self.report(
                    TypeError::DuplicateField {
                        record: name.clone(),
                        field: field.name.clone(),
                    },
                    field.span,
                );
                TypeId::ERROR
            } else if self.is_error(ty) {
                TypeId::ERROR
            } else if ty == TypeId::INT || ty == TypeId::BOOL || ty == TypeId::STRING {
                ty
            } else {
                self.report(
                    TypeError::InvalidFieldType {
                        record: name.clone(),
                        field: field.name.clone(),
                        found: self.show(ty),
                    },
                    field.span,
                );
                TypeId::ERROR
            };
            valid &= field_ty != TypeId::ERROR;
            self.record(field.id, field_ty);
        }

        self.check_record_shape(record)?;
        if valid {
            Ok(self.symbol(&record.name)?.ty)
        } else {
            Ok(TypeId::ERROR)
        }
    }

    /// The declaration and the record type bound to its name must list the
    /// same fields. Field types are compared only for well-formed
    /// declarations.
    fn check_record_shape(&self, record: &RecordDecl) -> Result<(), CheckError> {
        let symbol = self.symbol(&record.name)?;
        let shape_mismatch = || CheckError::RecordShapeMismatch {
            name: record.name.name.clone(),
        };
        let bound = match self.registry.as_record(symbol.ty) {
            Some(bound) if symbol.kind == SymbolKind::Record => bound,
            _ => return Err(shape_mismatch()),
        };

        let declared: BTreeSet<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
        let expected: BTreeSet<&str> = bound.fields.iter().map(|(name, _)| name.as_str()).collect();
        if declared != expected {
            return Err(shape_mismatch());
        }
        if record_is_well_formed(record) {
            for field in &record.fields {
                if self.table.get(field.id) != bound.field(&field.name) {
                    return Err(shape_mismatch());
                }
            }
        }
        Ok(())
    }

    /// Type annotations are typed with the type they denote.
    fn check_type_node(&mut self, node: &TypeNode) -> Result<TypeId, CheckError> {
        let ty = match &node.kind {
            TypeNodeKind::Int => TypeId::INT,
            TypeNodeKind::Bool => TypeId::BOOL,
            TypeNodeKind::String => TypeId::STRING,
            TypeNodeKind::Void => TypeId::VOID,
            TypeNodeKind::Record(ident) => {
                let symbol = self.symbol(ident)?;
                if symbol.kind == SymbolKind::Record && self.registry.is_record(symbol.ty) {
                    self.usable(symbol.ty)
                } else {
                    self.report(
                        TypeError::NotARecordType {
                            name: ident.name.clone(),
                        },
                        node.span,
                    );
                    TypeId::ERROR
                }
            }
            TypeNodeKind::Fn { formals, ret } => {
                let mut formal_types = Vec::with_capacity(formals.len());
                for formal in formals {
                    formal_types.push(self.check_type_node(formal)?);
                }
                let ret = self.check_type_node(ret)?;
                if self.is_error(ret) || formal_types.iter().any(|t| self.is_error(*t)) {
                    TypeId::ERROR
                } else {
                    self.registry.function(formal_types, ret)
                }
            }
        };
        Ok(self.record(node.id, ty))
    }

    fn check_stmt(&mut self, stmt: &Stmt, current_return: TypeId) -> Result<(), CheckError> {
        let ty = match &stmt.kind {
            StmtKind::VarDecl(var) => {
                self.check_var_decl(var)?;
                TypeId::VOID
            }
            StmtKind::Assign(exp) => {
                let ty = self.check_expr(exp)?;
                if self.is_error(ty) {
                    TypeId::ERROR
                } else {
                    TypeId::VOID
                }
            }
            StmtKind::PostInc(lval) => {
                let ty = self.check_expr(lval)?;
                self.check_unary_operand("++", lval, ty, TypeId::INT)
            }
            StmtKind::PostDec(lval) => {
                let ty = self.check_expr(lval)?;
                self.check_unary_operand("--", lval, ty, TypeId::INT)
            }
            StmtKind::Receive(dst) => self.check_receive(dst)?,
            StmtKind::Report(src) => self.check_report(src)?,
            StmtKind::If { cond, body } => {
                let valid = self.check_condition(cond, Construct::If)?;
                self.check_body(body, current_return)?;
                if valid { TypeId::VOID } else { TypeId::ERROR }
            }
            StmtKind::IfElse { cond, then_body, else_body } => {
                let valid = self.check_condition(cond, Construct::If)?;
                self.check_body(then_body, current_return)?;
                self.check_body(else_body, current_return)?;
                if valid { TypeId::VOID } else { TypeId::ERROR }
            }
            StmtKind::While { cond, body } => {
                let valid = self.check_condition(cond, Construct::While)?;
                self.check_body(body, current_return)?;
                if valid { TypeId::VOID } else { TypeId::ERROR }
            }
            StmtKind::Return(exp) => self.check_return(stmt.span, exp.as_ref(), current_return)?,
            StmtKind::Call(call) => self.check_expr(call)?,
        };
        self.record(stmt.id, ty);
        Ok(())
    }

    fn check_body(&mut self, body: &[Stmt], current_return: TypeId) -> Result<(), CheckError> {
        for stmt in body {
            self.check_stmt(stmt, current_return)?;
        }
        Ok(())
    }

    /// Whether `ty`, the type of `operand`, can stand where `required` is
    /// expected.
    fn operand(&self, operand: &Expr, ty: TypeId, required: TypeId) -> Operand {
        if self.is_error(ty) {
            return Operand::Poisoned;
        }
        let satisfies = match self.registry.as_function(ty) {
            Some(func) => operand.is_call() && func.ret == required,
            None => ty == required,
        };
        if satisfies {
            Operand::Satisfies
        } else {
            Operand::Mismatch
        }
    }

    fn operand_error(&self, op: &str, ty: TypeId, required: TypeId) -> TypeError {
        let op = op.to_string();
        let found = self.show(ty);
        if required == TypeId::BOOL {
            TypeError::LogicalOperand { op, found }
        } else {
            TypeError::ArithmeticOperand { op, found }
        }
    }

    fn require_operand(&mut self, op: BinaryOp, operand: &Expr, ty: TypeId, required: TypeId) {
        if self.operand(operand, ty, required) == Operand::Mismatch {
            let error = self.operand_error(op.as_str(), ty, required);
            self.report(error, operand.span);
        }
    }

    /// `++`, `--`, unary `-` and `!`. Success keeps the operand's type.
    fn check_unary_operand(&mut self, op: &str, operand: &Expr, ty: TypeId, required: TypeId) -> TypeId {
        match self.operand(operand, ty, required) {
            Operand::Satisfies => ty,
            Operand::Poisoned => TypeId::ERROR,
            Operand::Mismatch => {
                let error = self.operand_error(op, ty, required);
                self.report(error, operand.span);
                TypeId::ERROR
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr, construct: Construct) -> Result<bool, CheckError> {
        let ty = self.check_expr(cond)?;
        Ok(match self.operand(cond, ty, TypeId::BOOL) {
            Operand::Satisfies => true,
            Operand::Poisoned => false,
            Operand::Mismatch => {
                let found = self.show(ty);
                let error = match construct {
                    Construct::If => TypeError::IfCondition { found },
                    Construct::While => TypeError::WhileCondition { found },
                };
                self.report(error, cond.span);
                false
            }
        })
    }

    fn check_return(
        &mut self,
        span: Span,
        exp: Option<&Expr>,
        current_return: TypeId,
    ) -> Result<TypeId, CheckError> {
        let ty = match exp {
            Some(exp) => self.check_expr(exp)?,
            None => TypeId::VOID,
        };
        if self.is_error(ty) || self.is_error(current_return) {
            return Ok(TypeId::ERROR);
        }

        let error = if self.registry.is_record(ty) {
            Some(self.return_mismatch(current_return, ty))
        } else if self.registry.is_void(current_return) && !self.registry.is_void(ty) {
            Some(TypeError::ReturnUnexpectedValue { found: self.show(ty) })
        } else if !self.registry.is_void(current_return) && exp.is_none() {
            Some(TypeError::ReturnMissingValue {
                expected: self.show(current_return),
            })
        } else if ty == current_return {
            None
        } else {
            let returns_call = match (exp, self.registry.as_function(ty)) {
                (Some(exp), Some(func)) => exp.is_call() && func.ret == current_return,
                _ => false,
            };
            if returns_call {
                None
            } else {
                Some(self.return_mismatch(current_return, ty))
            }
        };

        match error {
            Some(error) => {
                self.report(error, span);
                Ok(TypeId::ERROR)
            }
            None => Ok(current_return),
        }
    }

    fn return_mismatch(&self, expected: TypeId, found: TypeId) -> TypeError {
        TypeError::ReturnTypeMismatch {
            expected: self.show(expected),
            found: self.show(found),
        }
    }

    fn check_receive(&mut self, dst: &Expr) -> Result<TypeId, CheckError> {
        let ty = self.check_expr(dst)?;
        if self.is_error(ty) {
            return Ok(TypeId::ERROR);
        }
        let error = if self.registry.is_function(ty) {
            TypeError::InputFunction
        } else if let Some(record) = self.registry.as_record(ty) {
            TypeError::InputRecord {
                record: record.name.clone(),
            }
        } else {
            return Ok(ty);
        };
        self.report(error, dst.span);
        Ok(TypeId::ERROR)
    }

    fn check_report(&mut self, src: &Expr) -> Result<TypeId, CheckError> {
        let ty = self.check_expr(src)?;
        if self.is_error(ty) {
            return Ok(TypeId::ERROR);
        }
        let error = if self.registry.is_function(ty) {
            TypeError::OutputFunction
        } else if self.registry.is_void(ty) {
            TypeError::OutputVoid
        } else if let Some(record) = self.registry.as_record(ty) {
            TypeError::OutputRecord {
                record: record.name.clone(),
            }
        } else {
            return Ok(ty);
        };
        self.report(error, src.span);
        Ok(TypeId::ERROR)
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<TypeId, CheckError> {
        let ty = match &expr.kind {
            ExprKind::IntLit(_) => TypeId::INT,
            ExprKind::StrLit(_) => TypeId::STRING,
            ExprKind::BoolLit(_) => TypeId::BOOL,
            ExprKind::Id(ident) => {
                let ty = self.symbol(ident)?.ty;
                self.usable(ty)
            }
            ExprKind::FieldAccess { base, field } => self.check_field_access(expr.span, base, field)?,
            ExprKind::Assign { dst, src } => self.check_assign(expr.span, dst, src)?,
            ExprKind::Call { callee, args } => self.check_call(callee, args)?,
            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand)?;
                match op {
                    UnaryOp::Neg => self.check_unary_operand("-", operand, ty, TypeId::INT),
                    UnaryOp::Not => self.check_unary_operand("!", operand, ty, TypeId::BOOL),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(expr.span, *op, lhs, rhs)?,
            ExprKind::RecordLit { record, fields } => self.check_record_lit(expr.span, record, fields)?,
        };
        Ok(self.record(expr.id, ty))
    }

    fn check_binary(&mut self, span: Span, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<TypeId, CheckError> {
        let left = self.check_expr(lhs)?;
        let right = self.check_expr(rhs)?;

        let (required, result) = match op {
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide => (TypeId::INT, TypeId::INT),
            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                (TypeId::INT, TypeId::BOOL)
            }
            BinaryOp::And | BinaryOp::Or => (TypeId::BOOL, TypeId::BOOL),
            BinaryOp::Equals | BinaryOp::NotEquals => {
                return Ok(self.check_equality(span, lhs, left, rhs, right));
            }
        };

        // The result type is fixed even when an operand is bad, so ancestors
        // do not pile on.
        self.require_operand(op, lhs, left, required);
        self.require_operand(op, rhs, right, required);
        Ok(result)
    }

    fn check_equality(&mut self, span: Span, lhs: &Expr, left: TypeId, rhs: &Expr, right: TypeId) -> TypeId {
        if self.is_error(left) || self.is_error(right) {
            return TypeId::ERROR;
        }

        let left_ret = self.registry.as_function(left).map(|f| f.ret);
        let right_ret = self.registry.as_function(right).map(|f| f.ret);

        // A function-typed side compares by its return type and must be called.
        let uncalled = if left_ret.is_some() && !lhs.is_call() {
            Some((lhs.span, left))
        } else if right_ret.is_some() && !rhs.is_call() {
            Some((rhs.span, right))
        } else {
            None
        };
        if let Some((operand_span, ty)) = uncalled {
            let found = self.show(ty);
            self.report(TypeError::EqualityOperand { found }, operand_span);
        }

        let left_value = left_ret.unwrap_or(left);
        let right_value = right_ret.unwrap_or(right);
        if left_value == right_value {
            TypeId::BOOL
        } else {
            self.report(
                TypeError::EqualityOperator {
                    lhs: self.show(left_value),
                    rhs: self.show(right_value),
                },
                span,
            );
            TypeId::ERROR
        }
    }

    fn check_assign(&mut self, span: Span, dst: &Expr, src: &Expr) -> Result<TypeId, CheckError> {
        let dst_ty = self.check_expr(dst)?;
        let src_ty = self.check_expr(src)?;
        if self.is_error(dst_ty) || self.is_error(src_ty) {
            return Ok(TypeId::ERROR);
        }

        let bad_operand = if self.registry.is_record(dst_ty) && self.registry.is_record(src_ty) {
            Some((dst, dst_ty))
        } else if self.registry.is_function(dst_ty) {
            Some((dst, dst_ty))
        } else if self.registry.is_function(src_ty) && !src.is_call() {
            Some((src, src_ty))
        } else {
            None
        };
        if let Some((operand, ty)) = bad_operand {
            let found = self.show(ty);
            self.report(TypeError::AssignmentOperand { found }, operand.span);
            return Ok(TypeId::ERROR);
        }

        let call_matches = self
            .registry
            .as_function(src_ty)
            .is_some_and(|func| func.ret == dst_ty);
        if call_matches || dst_ty == src_ty {
            return Ok(dst_ty);
        }

        self.report(
            TypeError::AssignmentOperator {
                dst: self.show(dst_ty),
                src: self.show(src_ty),
            },
            span,
        );
        Ok(TypeId::ERROR)
    }

    fn check_call(&mut self, callee: &Ident, args: &[Expr]) -> Result<TypeId, CheckError> {
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(self.check_expr(arg)?);
        }

        let symbol = self.symbol(callee)?;
        let func = match self.registry.as_function(symbol.ty) {
            Some(func) if symbol.kind == SymbolKind::Fn => func.clone(),
            _ => {
                self.report(
                    TypeError::CallNonFunction {
                        name: callee.name.clone(),
                    },
                    callee.span,
                );
                return Ok(TypeId::ERROR);
            }
        };

        let mut failed = false;
        if func.formals.len() != args.len() {
            self.report(
                TypeError::CallArgCount {
                    name: callee.name.clone(),
                    expected: func.formals.len(),
                    found: args.len(),
                },
                callee.span,
            );
            failed = true;
        }
        for (position, ((formal, arg), actual)) in func.formals.iter().zip(args).zip(arg_types).enumerate() {
            if self.is_error(actual) || actual == *formal {
                continue;
            }
            self.report(
                TypeError::CallArgMismatch {
                    name: callee.name.clone(),
                    position,
                    expected: self.show(*formal),
                    found: self.show(actual),
                },
                arg.span,
            );
            failed = true;
        }

        Ok(if failed { TypeId::ERROR } else { self.usable(func.ret) })
    }

    fn check_field_access(&mut self, span: Span, base: &Expr, field: &str) -> Result<TypeId, CheckError> {
        let base_ty = self.check_expr(base)?;
        if self.is_error(base_ty) {
            return Ok(TypeId::ERROR);
        }

        let lookup = self
            .registry
            .as_record(base_ty)
            .map(|record| (record.name.clone(), record.field(field)));
        match lookup {
            Some((_, Some(ty))) => Ok(ty),
            Some((record, None)) => {
                self.report(
                    TypeError::UnknownField {
                        record,
                        field: field.to_string(),
                    },
                    span,
                );
                Ok(TypeId::ERROR)
            }
            None => {
                self.report(
                    TypeError::FieldAccessNonRecord {
                        field: field.to_string(),
                        found: self.show(base_ty),
                    },
                    base.span,
                );
                Ok(TypeId::ERROR)
            }
        }
    }

    fn check_record_lit(&mut self, span: Span, name: &Ident, fields: &[FieldInit]) -> Result<TypeId, CheckError> {
        let mut init_types = Vec::with_capacity(fields.len());
        for init in fields {
            init_types.push(self.check_expr(&init.value)?);
        }

        let symbol = self.symbol(name)?;
        if self.broken_records.contains(&symbol.ty) {
            return Ok(TypeId::ERROR);
        }
        let record = match self.registry.as_record(symbol.ty) {
            Some(record) if symbol.kind == SymbolKind::Record => record.clone(),
            _ => {
                self.report(
                    TypeError::NotARecordType {
                        name: name.name.clone(),
                    },
                    name.span,
                );
                return Ok(TypeId::ERROR);
            }
        };

        let mut failed = false;
        let mut seen = HashSet::new();
        for (init, ty) in fields.iter().zip(init_types) {
            if !seen.insert(init.name.as_str()) {
                self.report(
                    TypeError::DuplicateField {
                        record: record.name.clone(),
                        field: init.name.clone(),
                    },
                    init.span,
                );
                failed = true;
                continue;
            }
            match record.field(&init.name) {
                None => {
                    self.report(
                        TypeError::UnknownField {
                            record: record.name.clone(),
                            field: init.name.clone(),
                        },
                        init.span,
                    );
                    failed = true;
                }
                Some(_) if self.is_error(ty) => failed = true,
                Some(expected) if expected != ty => {
                    self.report(
                        TypeError::FieldTypeMismatch {
                            field: init.name.clone(),
                            expected: self.show(expected),
                            found: self.show(ty),
                        },
                        init.value.span,
                    );
                    failed = true;
                }
                Some(_) => {}
            }
        }

        for (field, _) in &record.fields {
            if !seen.contains(field.as_str()) {
                self.report(
                    TypeError::MissingField {
                        record: record.name.clone(),
                        field: field.clone(),
                    },
                    span,
                );
                failed = true;
            }
        }

        Ok(if failed { TypeId::ERROR } else { symbol.ty })
    }
}

/// A record declaration is well formed when its field names are distinct and
/// every field is annotated `int`, `bool` or `string`.
fn record_is_well_formed(record: &RecordDecl) -> bool {
    let mut seen = HashSet::new();
    record.fields.iter().all(|field| {
        seen.insert(field.name.as_str())
            && matches!(
                field.ty.kind,
                TypeNodeKind::Int | TypeNodeKind::Bool | TypeNodeKind::String
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_program_is_void() {
        let mut registry = TypeRegistry::new();
        let mut b = AstBuilder::new();
        let program = b.program(vec![]);
        let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
        assert!(analysis.passed());
        assert_eq!(analysis.type_of(program.id), Some(TypeId::VOID));
    }

    #[test]
    fn test_reused_node_id_keeps_first_type() {
        let mut registry = TypeRegistry::new();
        let mut b = AstBuilder::new();
        let main_ty = registry.function(vec![], TypeId::VOID);
        let main = b.func("main", main_ty);
        let first = b.int(1);
        let mut second = b.bool(true);
        second.id = first.id;
        let first_id = first.id;
        let report_int = b.report(first);
        let report_bool = b.report(second);
        let ret = b.void_ty();
        let decl = b.fn_decl(&main, vec![], ret, vec![report_int, report_bool]);
        let program = b.program(vec![decl]);

        let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
        assert_eq!(analysis.type_of(first_id), Some(TypeId::INT));
    }

    #[test]
    fn test_checker_interns_function_annotations() {
        let mut registry = TypeRegistry::new();
        let before = registry.len();
        let mut b = AstBuilder::new();
        let cb = b.var("cb", TypeId::ERROR);
        let formal = b.string_ty();
        let ret = b.void_ty();
        let annotation = b.fn_ty(vec![formal], ret);
        let decl = b.global_var(annotation, &cb);
        let program = b.program(vec![decl]);

        let mut checker = TypeChecker::new(b.symbols(), &mut registry);
        checker.check_program(&program).unwrap();
        let analysis = checker.finish();
        assert!(analysis.passed());
        assert_eq!(registry.len(), before + 1);
    }
}
