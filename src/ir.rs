// Arena IR for host types. Nodes reference each other by `TypeId`, so cyclic
// record graphs need no shared ownership.
use std::fmt;

use crate::introspect::{Field, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    Int { bits: u8 },        // 0 = platform width
    Uint { bits: u8 },
    Float { bits: u8 },
    Complex { bits: u8 },
    String,
    Pointer(TypeId),
    Slice(TypeId),
    Array { elem: TypeId, len: usize },
    Map { key: TypeId, value: TypeId },
    Record { fields: Vec<Field<TypeId>> },
    Opaque,
    Pending,                 // allocated, not resolved yet (catalog loading)
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub namespace: String,   // empty for builtins / unnamed types
    pub name: String,
    pub shape: Shape,
}

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Shape {
    pub fn kind(&self) -> TypeKind {
        match self {
            Shape::Bool => TypeKind::Bool,
            Shape::Int { .. } => TypeKind::Int,
            Shape::Uint { .. } => TypeKind::Uint,
            Shape::Float { .. } => TypeKind::Float,
            Shape::Complex { .. } => TypeKind::Complex,
            Shape::String => TypeKind::String,
            Shape::Pointer(_) => TypeKind::Pointer,
            Shape::Slice(_) => TypeKind::Slice,
            Shape::Array { .. } => TypeKind::Array,
            Shape::Map { .. } => TypeKind::Map,
            Shape::Record { .. } => TypeKind::Record,
            Shape::Opaque | Shape::Pending => TypeKind::Opaque,
        }
    }
}

impl TypeNode {
    pub fn unnamed(shape: Shape) -> Self {
        Self { namespace: String::new(), name: String::new(), shape }
    }
}
