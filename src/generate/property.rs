use super::SchemaGenerator;
use crate::introspect::{TypeKind, TypeUniverse};
use crate::schema::{Primitive, PropertyDescriptor};

impl<'u, U: TypeUniverse> SchemaGenerator<'u, U> {
    /// Property schema for a field's declared type.
    ///
    /// Record types are discovered (and registered) on the way and come back
    /// as `$ref`s. Shapes without a schema mapping, fixed-length arrays among
    /// them, come back empty rather than failing.
    pub(super) fn property_for(&mut self, declared: U::Id) -> PropertyDescriptor {
        let u = self.universe;
        let ty = self.substitute(u.dereference(declared).unwrap_or(declared));

        match u.kind(ty) {
            TypeKind::Bool => PropertyDescriptor::primitive(Primitive::Boolean),
            TypeKind::Int | TypeKind::Uint => PropertyDescriptor::primitive(Primitive::Integer),
            TypeKind::Float | TypeKind::Complex => PropertyDescriptor::primitive(Primitive::Number),
            TypeKind::String => PropertyDescriptor::primitive(Primitive::String),
            TypeKind::Slice => match u.element_type(ty) {
                Some(elem) => PropertyDescriptor::array(self.property_for(elem)),
                None => PropertyDescriptor::empty(),
            },
            TypeKind::Map => match u.element_type(ty) {
                Some(value) => {
                    let values = self.property_for(value);
                    PropertyDescriptor::map(values, self.names.map_java_type(ty))
                }
                None => PropertyDescriptor::empty(),
            },
            TypeKind::Record => {
                self.discover(ty);
                PropertyDescriptor::reference(self.names.reference_path(ty), self.names.java_type(ty))
            }
            kind @ (TypeKind::Array | TypeKind::Pointer | TypeKind::Opaque) => {
                tracing::trace!(%kind, "no schema mapping for field shape");
                PropertyDescriptor::empty()
            }
        }
    }

    /// Apply the caller's substitution table (one level).
    pub(super) fn substitute(&self, ty: U::Id) -> U::Id {
        self.substitutions.get(&ty).copied().unwrap_or(ty)
    }
}
