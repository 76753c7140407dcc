//! # Type Registry
//!
//! Every type the checker manipulates lives in a [`TypeRegistry`] and is
//! addressed by a [`TypeId`]. The registry interns types by shape, so two
//! structurally identical types always share one id and type equality is a
//! plain `==` on ids.
//!
//! ```rust
//! use shanty_typeck::types::{TypeId, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let a = registry.function(vec![TypeId::INT], TypeId::BOOL);
//! let b = registry.function(vec![TypeId::INT], TypeId::BOOL);
//! assert_eq!(a, b);
//! assert_eq!(registry.display(a).to_string(), "(int) -> bool");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle to a canonical type inside a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const STRING: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    /// The error sentinel: a diagnostic has already been issued for the value.
    pub const ERROR: TypeId = TypeId(4);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Bool,
    String,
    Void,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnType {
    pub formals: Vec<TypeId>,
    pub ret: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: String,
    /// Fields in declaration order. Names are unique.
    pub fields: Vec<(String, TypeId)>,
}

impl RecordType {
    pub fn field(&self, name: &str) -> Option<TypeId> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| *ty)
    }
}

/// A canonical type value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Primitive(Primitive),
    Function(FnType),
    Record(RecordType),
    Error,
}

/// Description of a type handed to [`TypeRegistry::canonical`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(Primitive),
    Function { formals: Vec<TypeId>, ret: TypeId },
    Record { name: String, fields: Vec<(String, TypeId)> },
    Error,
}

/// Interning key. Record fields are keyed as a sorted map so that field order
/// does not affect identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Primitive(Primitive),
    Function(Vec<TypeId>, TypeId),
    Record(String, BTreeMap<String, TypeId>),
    Error,
}

/// Owner of every canonical type for one compilation.
///
/// The registry only grows; ids stay valid for its whole lifetime. It is not
/// internally synchronized: checking several units concurrently needs one
/// registry per unit.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<DataType>,
    index: HashMap<TypeKey, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            index: HashMap::new(),
        };
        // Order must match the TypeId constants.
        registry.canonical(TypeShape::Primitive(Primitive::Int));
        registry.canonical(TypeShape::Primitive(Primitive::Bool));
        registry.canonical(TypeShape::Primitive(Primitive::String));
        registry.canonical(TypeShape::Primitive(Primitive::Void));
        registry.canonical(TypeShape::Error);
        registry
    }

    /// Returns the shared id for `shape`, allocating it on first request.
    ///
    /// Duplicate record field names keep their first occurrence.
    pub fn canonical(&mut self, shape: TypeShape) -> TypeId {
        let (key, value) = match shape {
            TypeShape::Primitive(p) => (TypeKey::Primitive(p), DataType::Primitive(p)),
            TypeShape::Error => (TypeKey::Error, DataType::Error),
            TypeShape::Function { formals, ret } => (
                TypeKey::Function(formals.clone(), ret),
                DataType::Function(FnType { formals, ret }),
            ),
            TypeShape::Record { name, fields } => {
                let mut keyed = BTreeMap::new();
                let mut ordered = Vec::with_capacity(fields.len());
                for (field, ty) in fields {
                    if keyed.contains_key(&field) {
                        continue;
                    }
                    keyed.insert(field.clone(), ty);
                    ordered.push((field, ty));
                }
                (
                    TypeKey::Record(name.clone(), keyed),
                    DataType::Record(RecordType { name, fields: ordered }),
                )
            }
        };

        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(value);
        self.index.insert(key, id);
        id
    }

    pub fn function(&mut self, formals: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.canonical(TypeShape::Function { formals, ret })
    }

    pub fn record(&mut self, name: impl Into<String>, fields: Vec<(String, TypeId)>) -> TypeId {
        self.canonical(TypeShape::Record {
            name: name.into(),
            fields,
        })
    }

    /// Looks up a type. Ids from another registry are a caller bug; they
    /// resolve to the error sentinel rather than panicking.
    pub fn get(&self, id: TypeId) -> &DataType {
        self.types.get(id.index()).unwrap_or(&DataType::Error)
    }

    /// Number of distinct types interned so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        id == TypeId::VOID
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.get(id), DataType::Error)
    }

    pub fn as_function(&self, id: TypeId) -> Option<&FnType> {
        match self.get(id) {
            DataType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_record(&self, id: TypeId) -> Option<&RecordType> {
        match self.get(id) {
            DataType::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        self.as_function(id).is_some()
    }

    pub fn is_record(&self, id: TypeId) -> bool {
        self.as_record(id).is_some()
    }

    /// A `Display` adapter for `id`.
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { registry: self, id }
    }
}

/// Renders a type the way it is written in diagnostics.
pub struct TypeDisplay<'a> {
    registry: &'a TypeRegistry,
    id: TypeId,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.registry.get(self.id) {
            DataType::Primitive(p) => f.write_str(p.as_str()),
            DataType::Error => f.write_str("ERROR"),
            DataType::Function(fn_ty) => {
                f.write_str("(")?;
                for (i, formal) in fn_ty.formals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.registry.display(*formal))?;
                }
                write!(f, ") -> {}", self.registry.display(fn_ty.ret))
            }
            DataType::Record(record) => {
                write!(f, "{}{{", record.name)?;
                for (i, (name, ty)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, self.registry.display(*ty))?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitives_are_preinterned() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.canonical(TypeShape::Primitive(Primitive::Int)), TypeId::INT);
        assert_eq!(registry.canonical(TypeShape::Primitive(Primitive::Bool)), TypeId::BOOL);
        assert_eq!(registry.canonical(TypeShape::Primitive(Primitive::String)), TypeId::STRING);
        assert_eq!(registry.canonical(TypeShape::Primitive(Primitive::Void)), TypeId::VOID);
        assert_eq!(registry.canonical(TypeShape::Error), TypeId::ERROR);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_function_interning() {
        let mut registry = TypeRegistry::new();
        let f = registry.function(vec![TypeId::INT, TypeId::BOOL], TypeId::VOID);
        let g = registry.function(vec![TypeId::INT, TypeId::BOOL], TypeId::VOID);
        let h = registry.function(vec![TypeId::BOOL, TypeId::INT], TypeId::VOID);
        assert_eq!(f, g);
        assert_ne!(f, h);
        assert_eq!(registry.as_function(f).map(|t| t.ret), Some(TypeId::VOID));
    }

    #[test]
    fn test_record_field_order_does_not_matter() {
        let mut registry = TypeRegistry::new();
        let a = registry.record(
            "Point",
            vec![("x".to_string(), TypeId::INT), ("y".to_string(), TypeId::BOOL)],
        );
        let b = registry.record(
            "Point",
            vec![("y".to_string(), TypeId::BOOL), ("x".to_string(), TypeId::INT)],
        );
        let other = registry.record(
            "Pair",
            vec![("x".to_string(), TypeId::INT), ("y".to_string(), TypeId::BOOL)],
        );
        assert_eq!(a, b);
        assert_ne!(a, other);
        // Display keeps the first-seen declaration order.
        assert_eq!(registry.display(b).to_string(), "Point{x: int, y: bool}");
    }

    #[test]
    fn test_record_duplicate_fields_keep_first() {
        let mut registry = TypeRegistry::new();
        let r = registry.record(
            "R",
            vec![("a".to_string(), TypeId::INT), ("a".to_string(), TypeId::STRING)],
        );
        let record = registry.as_record(r).cloned();
        assert_eq!(record.and_then(|r| r.field("a")), Some(TypeId::INT));
    }

    #[test]
    fn test_display_nested_function() {
        let mut registry = TypeRegistry::new();
        let inner = registry.function(vec![], TypeId::INT);
        let outer = registry.function(vec![inner, TypeId::STRING], TypeId::BOOL);
        assert_eq!(registry.display(outer).to_string(), "(() -> int, string) -> bool");
        assert_eq!(registry.display(TypeId::ERROR).to_string(), "ERROR");
    }

    #[test]
    fn test_error_is_distinct() {
        let registry = TypeRegistry::new();
        assert!(registry.is_error(TypeId::ERROR));
        assert!(!registry.is_error(TypeId::VOID));
        assert!(!registry.is_function(TypeId::ERROR));
    }
}
