use indexmap::IndexMap;

use super::SchemaGenerator;
use crate::introspect::{TypeKind, TypeUniverse};
use crate::schema::{ObjectDescriptor, PropertyDescriptor};

impl<'u, U: TypeUniverse> SchemaGenerator<'u, U> {
    /// Property set of a record type, fields taken in declaration order.
    ///
    /// Embedded record fields contribute their properties directly. Names
    /// collide last-write-wins: a later field replaces the value of an
    /// earlier one, promoted or not.
    pub(super) fn assemble(&mut self, ty: U::Id) -> ObjectDescriptor {
        let u = self.universe;
        let mut properties = IndexMap::new();

        for field in u.fields(ty) {
            if !field.exported {
                continue;
            }
            let property = self.property_for(field.ty);
            let target = u.dereference(field.ty).unwrap_or(field.ty);

            if field.embedded && u.kind(target) == TypeKind::Record {
                properties.extend(self.promoted(target, &property));
            } else {
                properties.insert(u.field_name(field), property);
            }
        }
        ObjectDescriptor::new(properties)
    }

    /// Properties an embedded record promotes into its owner.
    fn promoted(&self, embedded: U::Id, property: &PropertyDescriptor) -> IndexMap<String, PropertyDescriptor> {
        if !property.is_reference() {
            // substituted by something that is not a record: nothing to promote
            return IndexMap::new();
        }
        self.registry
            .get(self.substitute(embedded))
            .map(|desc| desc.properties.clone())
            .unwrap_or_default()
    }
}
