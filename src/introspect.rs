//! Capability interface over a host type system.
//!
//! The generator never looks at concrete type representations; it only asks a
//! [`TypeUniverse`] for a type's kind, fields, element/pointee and naming. The
//! bundled [`crate::catalog::Catalog`] is one implementation, but anything that
//! can answer these questions (generated descriptors, an IDL front end, ...)
//! can drive generation.
use std::fmt;
use std::hash::Hash;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Structural kind of a host type, as far as schema synthesis cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    Uint,
    Float,
    Complex,
    String,
    Pointer,
    /// Variable-length sequence.
    Slice,
    /// Fixed-length sequence.
    Array,
    Map,
    Record,
    /// Anything else the host knows about (interfaces, functions, ...).
    Opaque,
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<Id> {
    /// Declared name.
    pub name: String,
    /// Declared type.
    pub ty: Id,
    /// Serialization tag, e.g. `"name,omitempty"`.
    pub tag: Option<String>,
    /// Externally visible. Hidden fields never reach the schema.
    pub exported: bool,
    /// Anonymous/embedded: its fields get promoted into the owner.
    pub embedded: bool,
}

/// Read-only view of a host type graph.
pub trait TypeUniverse {
    /// Identity of a type. Two types with equal ids are the same type.
    type Id: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self, ty: Self::Id) -> TypeKind;

    /// Fields in declaration order; empty for anything that is not a record.
    fn fields(&self, ty: Self::Id) -> &[Field<Self::Id>];

    /// Element of a slice or array, value of a map.
    fn element_type(&self, ty: Self::Id) -> Option<Self::Id>;

    /// Pointee of a pointer, `None` for every other kind.
    fn dereference(&self, ty: Self::Id) -> Option<Self::Id>;

    /// Namespace the type was declared in; empty for builtins and unnamed types.
    fn namespace(&self, ty: Self::Id) -> &str;

    /// Local (unqualified) name; empty for builtins and unnamed types.
    fn local_name(&self, ty: Self::Id) -> &str;

    /// External name of a field.
    fn field_name(&self, field: &Field<Self::Id>) -> String {
        tagged_name(field.tag.as_deref()).unwrap_or(&field.name).to_string()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<Id> Field<Id> {
    pub fn new(name: impl Into<String>, ty: Id) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            exported: true,
            embedded: false,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.exported = false;
        self
    }
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::String => "string",
            Self::Pointer => "pointer",
            Self::Slice => "slice",
            Self::Array => "array",
            Self::Map => "map",
            Self::Record => "record",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Leading token of a tag; trailing comma-separated modifiers are ignored.
fn tagged_name(tag: Option<&str>) -> Option<&str> {
    let token = tag?.split(',').next()?;
    if token.is_empty() { None } else { Some(token) }
}
