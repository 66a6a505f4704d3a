use std::hash::Hash;
use std::ops::Index;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::schema::ObjectDescriptor;

/// Memo of record types seen during one run.
///
/// A type is reserved with an empty placeholder *before* its fields are
/// walked, so a field that cycles back to it finds an entry and stops there.
#[derive(Debug)]
pub(crate) struct TypeRegistry<Id> {
    entries: IndexMap<Id, ObjectDescriptor>,
}

impl<Id: Copy + Eq + Hash> TypeRegistry<Id> {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Returns `true` if `ty` was unseen and now holds a placeholder.
    pub fn reserve(&mut self, ty: Id) -> bool {
        match self.entries.entry(ty) {
            Entry::Vacant(slot) => {
                slot.insert(ObjectDescriptor::placeholder());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn complete(&mut self, ty: Id, descriptor: ObjectDescriptor) {
        self.entries.insert(ty, descriptor);
    }

    pub fn get(&self, ty: Id) -> Option<&ObjectDescriptor> {
        self.entries.get(&ty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery order.
    pub fn into_entries(self) -> impl Iterator<Item = (Id, ObjectDescriptor)> {
        self.entries.into_iter()
    }
}

impl<Id: Copy + Eq + Hash> Index<Id> for TypeRegistry<Id> {
    type Output = ObjectDescriptor;

    fn index(&self, ty: Id) -> &ObjectDescriptor {
        &self.entries[&ty]
    }
}
