//! # Component — Type Identity for Plain Data
//!
//! Components are plain data records: a `Transform`, a `Camera`, a marker
//! struct. Any `'static + Send + Sync` type qualifies through the blanket
//! [`Component`] impl.
//!
//! Each component type is assigned a dense [`ComponentId`] the first time a
//! world sees it. Ids index signature bits, so they stay small and stable for
//! the lifetime of the world.

use std::any::TypeId;
use std::collections::HashMap;

/// Marker trait for anything storable as a component.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Dense per-world identifier of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// The bit position of this type in a [`Signature`](super::signature::Signature).
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Maps Rust types to [`ComponentId`]s and remembers their names.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentId>,
    type_ids: Vec<TypeId>,
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `T`, assigning the next free one if `T` is new.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.register_raw(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    pub(crate) fn register_raw(&mut self, type_id: TypeId, name: &'static str) -> ComponentId {
        if let Some(&id) = self.ids.get(&type_id) {
            return id;
        }
        let id = ComponentId::new(self.names.len() as u32);
        self.ids.insert(type_id, id);
        self.type_ids.push(type_id);
        self.names.push(name);
        id
    }

    /// Id of `T` if any world operation has registered it.
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    pub(crate) fn id_of_type(&self, type_id: TypeId) -> Option<ComponentId> {
        self.ids.get(&type_id).copied()
    }

    pub(crate) fn type_id(&self, id: ComponentId) -> Option<TypeId> {
        self.type_ids.get(id.0 as usize).copied()
    }

    /// Full type name recorded for `id`.
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(id.0 as usize).copied()
    }

    /// Number of registered component types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Strip the module path from a type name (`vargr::components::Transform` → `Transform`).
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut reg = ComponentRegistry::new();
        let p = reg.register::<Position>();
        let v = reg.register::<Velocity>();
        assert_eq!(p.index(), 0);
        assert_eq!(v.index(), 1);
        assert_eq!(reg.register::<Position>(), p);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn lookup_without_registering() {
        let mut reg = ComponentRegistry::new();
        assert_eq!(reg.id_of::<Position>(), None);
        let p = reg.register::<Position>();
        assert_eq!(reg.id_of::<Position>(), Some(p));
        assert_eq!(short_type_name(reg.name(p).unwrap()), "Position");
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("vargr::components::Transform"), "Transform");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
