//! # Binding Interface
//!
//! Binding resolution runs before type checking and hands over a
//! [`SymbolTable`]: one [`Symbol`] per declaration, recording what kind of
//! thing it declares and its declared type. Identifiers in the tree point into
//! this table by [`SymbolId`].
//!
//! [`ResolvedUnit`] is the serialized form of a resolved compilation unit used
//! by the `shantyc` driver. Declared types are written structurally as
//! [`TypeSig`] and interned when the unit is resolved against a registry.

use crate::ast::{Program, SymbolId};
use crate::error::CheckError;
use crate::types::{TypeId, TypeRegistry, TypeShape};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Var,
    Fn,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// For functions, the function type; for records, the record type itself.
    pub ty: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: SymbolKind, ty: TypeId) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.into(),
            kind,
            ty,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (SymbolId(i as u32), symbol))
    }
}

/// A structural type description, interned by [`TypeSig::intern`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSig {
    Int,
    Bool,
    String,
    Void,
    Fn {
        formals: Vec<TypeSig>,
        ret: Box<TypeSig>,
    },
    Record {
        name: String,
        fields: Vec<(String, TypeSig)>,
    },
}

impl TypeSig {
    pub fn intern(&self, registry: &mut TypeRegistry) -> TypeId {
        match self {
            TypeSig::Int => TypeId::INT,
            TypeSig::Bool => TypeId::BOOL,
            TypeSig::String => TypeId::STRING,
            TypeSig::Void => TypeId::VOID,
            TypeSig::Fn { formals, ret } => {
                let formals = formals.iter().map(|f| f.intern(registry)).collect();
                let ret = ret.intern(registry);
                registry.function(formals, ret)
            }
            TypeSig::Record { name, fields } => {
                let fields = fields
                    .iter()
                    .map(|(field, sig)| (field.clone(), sig.intern(registry)))
                    .collect();
                registry.canonical(TypeShape::Record {
                    name: name.clone(),
                    fields,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDecl {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeSig,
}

/// A program plus the symbols its identifiers refer to. Symbol ids are
/// indices into `symbols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUnit {
    pub program: Program,
    pub symbols: Vec<SymbolDecl>,
}

impl ResolvedUnit {
    pub fn from_json(input: &str) -> Result<Self, CheckError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Interns every declared type and builds the symbol table.
    pub fn resolve(self, registry: &mut TypeRegistry) -> (Program, SymbolTable) {
        let mut table = SymbolTable::new();
        for decl in &self.symbols {
            let ty = decl.ty.intern(registry);
            table.declare(decl.name.clone(), decl.kind, ty);
        }
        (self.program, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_sig_interning_is_canonical() {
        let mut registry = TypeRegistry::new();
        let sig = TypeSig::Fn {
            formals: vec![TypeSig::Int, TypeSig::Bool],
            ret: Box::new(TypeSig::Void),
        };
        let a = sig.intern(&mut registry);
        let b = registry.function(vec![TypeId::INT, TypeId::BOOL], TypeId::VOID);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_unit_from_json() {
        let json = r#"{
            "program": { "id": 0, "span": { "start": 0, "end": 0 }, "globals": [] },
            "symbols": [
                { "name": "x", "kind": "var", "ty": "int" },
                { "name": "P", "kind": "record",
                  "ty": { "record": { "name": "P", "fields": [["a", "bool"]] } } }
            ]
        }"#;
        let unit = ResolvedUnit::from_json(json).unwrap();
        let mut registry = TypeRegistry::new();
        let (program, symbols) = unit.resolve(&mut registry);

        assert!(program.globals.is_empty());
        assert_eq!(symbols.len(), 2);
        let x = symbols.get(SymbolId(0)).unwrap();
        assert_eq!(x.kind, SymbolKind::Var);
        assert_eq!(x.ty, TypeId::INT);
        let p = symbols.get(SymbolId(1)).unwrap();
        assert_eq!(registry.display(p.ty).to_string(), "P{a: bool}");
    }

    #[test]
    fn test_malformed_unit_is_a_decode_error() {
        let err = ResolvedUnit::from_json("{ \"program\": 3 }").unwrap_err();
        assert!(matches!(err, CheckError::Decode(_)));
    }
}
