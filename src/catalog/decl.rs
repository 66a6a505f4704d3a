//! JSON declarations of a type catalog.
//!
//! ```json
//! { "types": {
//!     "pets::Pet":   { "namespace": "example.com/pets", "name": "Pet",
//!                      "fields": [ { "name": "Name", "type": "string" },
//!                                  { "name": "Owner", "type": { "pointer": "pets::Owner" } } ] },
//!     "pets::Phase": { "namespace": "example.com/pets", "name": "Phase", "underlying": "string" }
//! } }
//! ```
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Catalog;
use crate::error::CatalogError;
use crate::introspect::Field;
use crate::ir::{Shape, TypeId, TypeNode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub types: IndexMap<String, TypeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Present for named non-record types (and record aliases).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying: Option<TypeExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default = "default_exported")]
    pub exported: bool,
}

/// Reference to a type: a builtin, a declaration key, or a composite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Named(String),
    Pointer { pointer: Box<TypeExpr> },
    List { list: Box<TypeExpr> },
    Array { array: Box<TypeExpr>, len: usize },
    Map {
        map: Box<TypeExpr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Box<TypeExpr>>,
    },
    Record { record: Vec<FieldDecl> },
}

fn default_exported() -> bool {
    true
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

impl CatalogFile {
    pub fn from_json_str(src: &str, origin: &str) -> Result<Self, CatalogError> {
        crate::path_de::from_str_with_path(src, origin)
    }

    pub fn from_value(value: serde_json::Value, origin: &str) -> Result<Self, CatalogError> {
        crate::path_de::from_value_with_path(value, origin)
    }
}

impl Catalog {
    /// Build one catalog out of several declaration files.
    pub fn from_files<I>(files: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CatalogFile>,
    {
        let mut decls = IndexMap::<String, TypeDecl>::new();
        for file in files {
            for (key, decl) in file.types {
                if decls.contains_key(&key) {
                    return Err(CatalogError::DuplicateType(key));
                }
                decls.insert(key, decl);
            }
        }
        Self::from_decls(&decls)
    }

    pub fn from_json_str(src: &str) -> Result<Self, CatalogError> {
        Self::from_files([CatalogFile::from_json_str(src, "<inline>")?])
    }

    fn from_decls(decls: &IndexMap<String, TypeDecl>) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();

        // 1) allocate every declaration so references are order independent
        for (key, decl) in decls {
            if decl.underlying.is_some() && !decl.fields.is_empty() {
                return Err(CatalogError::Parse {
                    origin: key.clone(),
                    message: "declares both `fields` and `underlying`".into(),
                });
            }
            let id = catalog.push(TypeNode {
                namespace: decl.namespace.clone(),
                name: decl.name.clone(),
                shape: Shape::Pending,
            });
            catalog.insert_key(key.clone(), id)?;
        }

        // 2) records
        for (key, decl) in decls.iter().filter(|(_, d)| d.underlying.is_none()) {
            let id = catalog.require(key)?;
            let fields = catalog.resolve_fields(&decl.fields)?;
            catalog.set_fields(id, fields);
        }

        // 3) named types, following underlying chains
        let mut visiting = Vec::new();
        for key in decls.keys() {
            catalog.resolve_named(key, decls, &mut visiting)?;
        }
        Ok(catalog)
    }

    /// Resolve a type expression, allocating nodes for builtins and composites.
    pub fn resolve_expr(&mut self, expr: &TypeExpr) -> Result<TypeId, CatalogError> {
        let shape = match expr {
            TypeExpr::Named(name) => match builtin(name) {
                Some(shape) => shape,
                None => return self.require(name),
            },
            TypeExpr::Pointer { pointer } => Shape::Pointer(self.resolve_expr(pointer)?),
            TypeExpr::List { list } => Shape::Slice(self.resolve_expr(list)?),
            TypeExpr::Array { array, len } => Shape::Array {
                elem: self.resolve_expr(array)?,
                len: *len,
            },
            TypeExpr::Map { map, key } => {
                let key = match key {
                    Some(key) => self.resolve_expr(key)?,
                    None => self.string(),
                };
                Shape::Map { key, value: self.resolve_expr(map)? }
            }
            TypeExpr::Record { record } => Shape::Record {
                fields: self.resolve_fields(record)?,
            },
        };
        Ok(self.push(TypeNode::unnamed(shape)))
    }

    fn resolve_fields(&mut self, decls: &[FieldDecl]) -> Result<Vec<Field<TypeId>>, CatalogError> {
        decls
            .iter()
            .map(|f| {
                Ok(Field {
                    name: f.name.clone(),
                    ty: self.resolve_expr(&f.ty)?,
                    tag: f.tag.clone(),
                    exported: f.exported,
                    embedded: f.embedded,
                })
            })
            .collect()
    }

    fn resolve_named(
        &mut self,
        key: &str,
        decls: &IndexMap<String, TypeDecl>,
        visiting: &mut Vec<String>,
    ) -> Result<(), CatalogError> {
        let id = self.require(key)?;
        if !matches!(self.node(id).shape, Shape::Pending) {
            return Ok(());
        }
        let Some(underlying) = decls.get(key).and_then(|d| d.underlying.as_ref()) else {
            return Ok(());
        };
        if visiting.iter().any(|k| k == key) {
            return Err(CatalogError::CyclicUnderlying(key.to_string()));
        }
        visiting.push(key.to_string());
        if let TypeExpr::Named(target) = underlying {
            if decls.contains_key(target) {
                self.resolve_named(target, decls, visiting)?;
            }
        }
        let target = self.resolve_expr(underlying)?;
        let shape = self.node(target).shape.clone();
        self.nodes[id.index()].shape = shape;
        // `{"list": <self>}` and friends never bottom out in a record
        if self.wraps(id, id, &HashMap::new()) {
            return Err(CatalogError::CyclicUnderlying(key.to_string()));
        }
        visiting.pop();
        Ok(())
    }
}

fn builtin(name: &str) -> Option<Shape> {
    let shape = match name {
        "bool" => Shape::Bool,
        "int" => Shape::Int { bits: 0 },
        "int8" => Shape::Int { bits: 8 },
        "int16" => Shape::Int { bits: 16 },
        "int32" => Shape::Int { bits: 32 },
        "int64" => Shape::Int { bits: 64 },
        "uint" => Shape::Uint { bits: 0 },
        "uint8" => Shape::Uint { bits: 8 },
        "uint16" => Shape::Uint { bits: 16 },
        "uint32" => Shape::Uint { bits: 32 },
        "uint64" => Shape::Uint { bits: 64 },
        "float32" => Shape::Float { bits: 32 },
        "float64" => Shape::Float { bits: 64 },
        "complex64" => Shape::Complex { bits: 64 },
        "complex128" => Shape::Complex { bits: 128 },
        "string" => Shape::String,
        "any" => Shape::Opaque,
        _ => return None,
    };
    Some(shape)
}
