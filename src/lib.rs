//! Semantic type checking for Shanty programs.
//!
//! The checker consumes a name-resolved [`Program`], assigns a type from the
//! [`TypeRegistry`] to every node, and reports each ill-typed construct once.

pub mod ast;
pub mod builder;
pub mod diagnostic;
pub mod error;
pub mod sink;
pub mod span;
pub mod symbols;
pub mod type_checker;
pub mod types;


pub use ast::*;
pub use builder::*;
pub use diagnostic::*;
pub use error::*;
pub use sink::*;
pub use span::*;
pub use symbols::*;
pub use type_checker::*;
pub use types::*;
