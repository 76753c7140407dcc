//! Error types for the type-checking pass.
//!
//! [`TypeError`] is the taxonomy of ill-typed constructs. Each variant is
//! reported once at the offending node and the walk continues. [`CheckError`]
//! covers the failures that abort a run: a tree that breaks the binding
//! contract, or driver input that cannot be decoded.

use crate::ast::SymbolId;
use thiserror::Error;

/// A rule violation. The `String` payloads are rendered types or names,
/// captured at the point of failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A `+ - * /`, relational, `-` or `++`/`--` operand that is not int
    #[error("Arithmetic operator applied to invalid operand")]
    ArithmeticOperand { op: String, found: String },

    /// An `&&`, `||` or `!` operand that is not bool
    #[error("Logical operator applied to non-bool operand")]
    LogicalOperand { op: String, found: String },

    /// A function compared with `==`/`!=` without being called
    #[error("Invalid equality operand")]
    EqualityOperand { found: String },

    /// The two sides of `==`/`!=` have different types
    #[error("Invalid equality operation")]
    EqualityOperator { lhs: String, rhs: String },

    /// A function or whole record on a side of `=` where it cannot appear
    #[error("Invalid assignment operand")]
    AssignmentOperand { found: String },

    /// Source and destination of `=` have different types
    #[error("Invalid assignment operation")]
    AssignmentOperator { dst: String, src: String },

    #[error("Non-bool expression used as an if condition")]
    IfCondition { found: String },

    #[error("Non-bool expression used as a while condition")]
    WhileCondition { found: String },

    /// `return;` in a function that returns a value
    #[error("Missing return value")]
    ReturnMissingValue { expected: String },

    /// `return e;` in a void function
    #[error("Return with a value in void function")]
    ReturnUnexpectedValue { found: String },

    /// The returned value does not have the declared return type
    #[error("Bad return value")]
    ReturnTypeMismatch { expected: String, found: String },

    #[error("Attempt to call a non-function")]
    CallNonFunction { name: String },

    #[error("Function call with wrong number of args")]
    CallArgCount { name: String, expected: usize, found: usize },

    /// Argument at `position` (0-based) has the wrong type
    #[error("Type of actual does not match type of formal")]
    CallArgMismatch {
        name: String,
        position: usize,
        expected: String,
        found: String,
    },

    /// `report` applied to a function
    #[error("Attempt to output a function")]
    OutputFunction,

    /// `report` of a call to a void function
    #[error("Attempt to output void")]
    OutputVoid,

    #[error("Attempt to output a record")]
    OutputRecord { record: String },

    /// `receive` into a function name
    #[error("Attempt to read a function")]
    InputFunction,

    #[error("Attempt to read a record")]
    InputRecord { record: String },

    /// A record annotation or literal names something other than a record
    #[error("Name does not denote a record type")]
    NotARecordType { name: String },

    /// A field named twice in a declaration or literal
    #[error("Duplicate field in record")]
    DuplicateField { record: String, field: String },

    /// A field declared with a type other than int, bool or string
    #[error("Invalid record field type")]
    InvalidFieldType {
        record: String,
        field: String,
        found: String,
    },

    #[error("Record has no such field")]
    UnknownField { record: String, field: String },

    #[error("Field access on a non-record value")]
    FieldAccessNonRecord { field: String, found: String },

    /// A record literal initializes a field with a value of the wrong type
    #[error("Field initializer type does not match field type")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A record literal leaves a field out
    #[error("Record construction is missing a field")]
    MissingField { record: String, field: String },
}

impl TypeError {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::ArithmeticOperand { .. } => "E0100",
            TypeError::LogicalOperand { .. } => "E0101",
            TypeError::EqualityOperand { .. } => "E0102",
            TypeError::EqualityOperator { .. } => "E0103",
            TypeError::AssignmentOperand { .. } => "E0104",
            TypeError::AssignmentOperator { .. } => "E0105",
            TypeError::IfCondition { .. } => "E0200",
            TypeError::WhileCondition { .. } => "E0201",
            TypeError::ReturnMissingValue { .. } => "E0300",
            TypeError::ReturnUnexpectedValue { .. } => "E0301",
            TypeError::ReturnTypeMismatch { .. } => "E0302",
            TypeError::CallNonFunction { .. } => "E0400",
            TypeError::CallArgCount { .. } => "E0401",
            TypeError::CallArgMismatch { .. } => "E0402",
            TypeError::OutputFunction => "E0500",
            TypeError::OutputVoid => "E0501",
            TypeError::OutputRecord { .. } => "E0502",
            TypeError::InputFunction => "E0503",
            TypeError::InputRecord { .. } => "E0504",
            TypeError::NotARecordType { .. } => "E0600",
            TypeError::DuplicateField { .. } => "E0601",
            TypeError::InvalidFieldType { .. } => "E0602",
            TypeError::UnknownField { .. } => "E0603",
            TypeError::FieldAccessNonRecord { .. } => "E0604",
            TypeError::FieldTypeMismatch { .. } => "E0605",
            TypeError::MissingField { .. } => "E0606",
        }
    }

    /// Short label placed under the offending span.
    pub fn label(&self) -> String {
        match self {
            TypeError::ArithmeticOperand { op, found } => {
                format!("`{}` expects int operands, found `{}`", op, found)
            }
            TypeError::LogicalOperand { op, found } => {
                format!("`{}` expects bool operands, found `{}`", op, found)
            }
            TypeError::EqualityOperand { found } => {
                format!("function value of type `{}` is compared without being called", found)
            }
            TypeError::EqualityOperator { lhs, rhs } => {
                format!("cannot compare `{}` with `{}`", lhs, rhs)
            }
            TypeError::AssignmentOperand { found } => {
                format!("operand of type `{}` cannot be assigned", found)
            }
            TypeError::AssignmentOperator { dst, src } => {
                format!("cannot assign `{}` to `{}`", src, dst)
            }
            TypeError::IfCondition { found } | TypeError::WhileCondition { found } => {
                format!("expected `bool`, found `{}`", found)
            }
            TypeError::ReturnMissingValue { expected } => {
                format!("function returns `{}`", expected)
            }
            TypeError::ReturnUnexpectedValue { found } => {
                format!("value of type `{}` returned from void function", found)
            }
            TypeError::ReturnTypeMismatch { expected, found } => {
                format!("expected `{}`, found `{}`", expected, found)
            }
            TypeError::CallNonFunction { name } => format!("`{}` is not a function", name),
            TypeError::CallArgCount { name, expected, found } => format!(
                "`{}` takes {} argument{}, {} supplied",
                name,
                expected,
                if *expected == 1 { "" } else { "s" },
                found
            ),
            TypeError::CallArgMismatch { position, expected, found, .. } => format!(
                "argument {} expected `{}`, found `{}`",
                position + 1,
                expected,
                found
            ),
            TypeError::OutputFunction => "functions cannot be reported".to_string(),
            TypeError::OutputVoid => "expression has no value".to_string(),
            TypeError::OutputRecord { record } | TypeError::InputRecord { record } => {
                format!("`{}` is a whole record", record)
            }
            TypeError::InputFunction => "functions cannot be received into".to_string(),
            TypeError::NotARecordType { name } => format!("`{}` is not a record", name),
            TypeError::DuplicateField { record, field } => {
                format!("field `{}` already appears in `{}`", field, record)
            }
            TypeError::InvalidFieldType { field, found, .. } => {
                format!("field `{}` has type `{}`", field, found)
            }
            TypeError::UnknownField { record, field } => {
                format!("`{}` has no field `{}`", record, field)
            }
            TypeError::FieldAccessNonRecord { field, found } => {
                format!("cannot access `{}` on `{}`", field, found)
            }
            TypeError::FieldTypeMismatch { field, expected, found } => {
                format!("field `{}` expects `{}`, found `{}`", field, expected, found)
            }
            TypeError::MissingField { record, field } => {
                format!("`{}` requires field `{}`", record, field)
            }
        }
    }

    /// Optional suggestion for fixing the construct.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            TypeError::EqualityOperand { .. } | TypeError::AssignmentOperand { .. } => {
                Some("functions are only usable as values when they are called")
            }
            TypeError::InvalidFieldType { .. } => {
                Some("record fields must be of type int, bool or string")
            }
            TypeError::OutputRecord { .. } | TypeError::InputRecord { .. } => {
                Some("report or receive the record's fields one at a time")
            }
            _ => None,
        }
    }
}

/// Failures that abort a run and discard its results.
#[derive(Debug, Error)]
pub enum CheckError {
    /// An identifier's symbol id is out of range for the symbol table
    #[error("identifier `{name}` refers to {symbol:?}, which is not in the symbol table")]
    UnresolvedSymbol { name: String, symbol: SymbolId },

    /// A record declaration disagrees with the record type bound to its name
    #[error("record `{name}` is declared with different fields than its bound type")]
    RecordShapeMismatch { name: String },

    #[error("failed to decode resolved unit: {0}")]
    Decode(#[from] serde_json::Error),
}
