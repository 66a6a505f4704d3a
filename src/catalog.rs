//! Arena-backed host type universe.
//!
//! Types are either built programmatically (tests, embedders) or loaded from
//! JSON declarations via [`decl`]. Ids are only meaningful for the catalog
//! that minted them.
pub mod decl;

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::introspect::{Field, TypeKind, TypeUniverse};
use crate::ir::{Shape, TypeId, TypeNode};

pub use decl::{CatalogFile, FieldDecl, TypeDecl, TypeExpr};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    nodes: Vec<TypeNode>,
    keys: IndexMap<String, TypeId>,
    /// (named type, underlying) pairs built through [`Catalog::named`].
    aliases: Vec<(TypeId, TypeId)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    /// Type registered under a declaration key.
    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.keys.get(key).copied()
    }

    /// Same as [`Catalog::lookup`], failing with [`CatalogError::UnknownType`].
    pub fn require(&self, key: &str) -> Result<TypeId, CatalogError> {
        self.lookup(key).ok_or_else(|| CatalogError::UnknownType(key.to_string()))
    }

    /// Declaration keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.keys.iter().map(|(k, id)| (k.as_str(), *id))
    }

    pub fn insert_key(&mut self, key: impl Into<String>, id: TypeId) -> Result<(), CatalogError> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(CatalogError::DuplicateType(key));
        }
        self.keys.insert(key, id);
        Ok(())
    }

    // —— builtins ——

    pub fn bool(&mut self) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Bool))
    }

    pub fn int(&mut self, bits: u8) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Int { bits }))
    }

    pub fn uint(&mut self, bits: u8) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Uint { bits }))
    }

    pub fn float(&mut self, bits: u8) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Float { bits }))
    }

    pub fn complex(&mut self, bits: u8) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Complex { bits }))
    }

    pub fn string(&mut self) -> TypeId {
        self.push(TypeNode::unnamed(Shape::String))
    }

    pub fn opaque(&mut self) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Opaque))
    }

    // —— composites ——

    pub fn pointer(&mut self, to: TypeId) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Pointer(to)))
    }

    pub fn slice(&mut self, of: TypeId) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Slice(of)))
    }

    pub fn array(&mut self, of: TypeId, len: usize) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Array { elem: of, len }))
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Map { key, value }))
    }

    /// A named record with no fields yet; see [`Catalog::set_fields`].
    pub fn record(&mut self, namespace: impl Into<String>, name: impl Into<String>) -> TypeId {
        self.push(TypeNode {
            namespace: namespace.into(),
            name: name.into(),
            shape: Shape::Record { fields: Vec::new() },
        })
    }

    pub fn anonymous_record(&mut self, fields: Vec<Field<TypeId>>) -> TypeId {
        self.push(TypeNode::unnamed(Shape::Record { fields }))
    }

    /// A named type sharing the structure of `underlying`.
    ///
    /// Fields given to `underlying` later through [`Catalog::set_fields`] are
    /// carried over to the named type as well.
    pub fn named(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        underlying: TypeId,
    ) -> TypeId {
        let shape = self.node(underlying).shape.clone();
        let id = self.push(TypeNode { namespace: namespace.into(), name: name.into(), shape });
        self.aliases.push((id, underlying));
        id
    }

    pub fn set_fields(&mut self, record: TypeId, fields: Vec<Field<TypeId>>) {
        self.nodes[record.index()].shape = Shape::Record { fields };

        // aliases are always younger than what they name, so this terminates
        let mut changed = vec![record];
        while let Some(source) = changed.pop() {
            let followers: Vec<TypeId> = self
                .aliases
                .iter()
                .filter(|(_, underlying)| *underlying == source)
                .map(|(alias, _)| *alias)
                .collect();
            for alias in followers {
                let shape = self.nodes[record.index()].shape.clone();
                self.nodes[alias.index()].shape = shape;
                changed.push(alias);
            }
        }
    }

    /// Whether `ty` leads to `target` through pointers, lists, arrays and map
    /// values alone, with `substitutions` applied at every step.
    ///
    /// Such a chain never reaches a record, so walking it would not end.
    pub(crate) fn wraps(
        &self,
        ty: TypeId,
        target: TypeId,
        substitutions: &HashMap<TypeId, TypeId>,
    ) -> bool {
        let mut seen = HashSet::new();
        let mut current = ty;
        while let Some(next) = self.wrapped(current) {
            let substituted = substitutions.get(&next).copied().unwrap_or(next);
            if next == target || substituted == target {
                return true;
            }
            if !seen.insert(substituted) {
                return false;
            }
            current = substituted;
        }
        false
    }

    fn wrapped(&self, ty: TypeId) -> Option<TypeId> {
        match self.node(ty).shape {
            Shape::Pointer(next)
            | Shape::Slice(next)
            | Shape::Array { elem: next, .. }
            | Shape::Map { value: next, .. } => Some(next),
            _ => None,
        }
    }

    fn push(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

impl TypeUniverse for Catalog {
    type Id = TypeId;

    fn kind(&self, ty: TypeId) -> TypeKind {
        self.node(ty).shape.kind()
    }

    fn fields(&self, ty: TypeId) -> &[Field<TypeId>] {
        match &self.node(ty).shape {
            Shape::Record { fields } => fields,
            _ => &[],
        }
    }

    fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.node(ty).shape {
            Shape::Slice(elem) | Shape::Array { elem, .. } => Some(elem),
            Shape::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    fn dereference(&self, ty: TypeId) -> Option<TypeId> {
        match self.node(ty).shape {
            Shape::Pointer(to) => Some(to),
            _ => None,
        }
    }

    fn namespace(&self, ty: TypeId) -> &str {
        &self.node(ty).namespace
    }

    fn local_name(&self, ty: TypeId) -> &str {
        &self.node(ty).name
    }
}
