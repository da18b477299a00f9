//! # Storage — One Sparse Set Per Component Type
//!
//! Each component type lives in its own [`ComponentStore<T>`]. A store is a
//! sparse set: components sit packed in a dense `Vec<T>`, and a sparse table
//! indexed by entity slot points into it.
//!
//! ```text
//! sparse:   [ -, 0, -, 2, 1 ]      ← indexed by Entity::index
//! dense:    [ t1, t4, t3 ]         ← packed components
//! entities: [ 1v0, 4v0, 3v2 ]      ← owner of each dense row
//! ```
//!
//! Removal swap-removes the dense row and patches the sparse entry of the
//! moved element, so add/get/remove are all O(1).
//!
//! ## Comparison
//!
//! - **archetype tables**: faster multi-component iteration, but every
//!   add/remove moves the whole entity between tables.
//! - **sparse sets** (this module, EnTT-style): add/remove touch one store
//!   only, which suits worlds where systems attach and detach components
//!   every tick.

use std::any::Any;

use super::entity::Entity;
use crate::error::{EcsError, Result};

/// Packed storage for every `T` in a world.
pub struct ComponentStore<T> {
    dense: Vec<T>,
    entities: Vec<Entity>,
    sparse: Vec<Option<usize>>,
}

impl<T: 'static> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Attach `component` to `entity`.
    ///
    /// Fails with [`EcsError::DuplicateComponent`] if `entity` already holds
    /// a `T`; the existing value is left untouched.
    pub fn add(&mut self, entity: Entity, component: T) -> Result<()> {
        if self.has(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: std::any::type_name::<T>(),
            });
        }
        self.push(entity, component);
        Ok(())
    }

    /// Attach or overwrite, returning the previous value if there was one.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        if let Some(slot) = self.get_mut(entity) {
            return Some(std::mem::replace(slot, component));
        }
        self.push(entity, component);
        None
    }

    fn push(&mut self, entity: Entity, component: T) {
        // A row still owned by an older generation of this slot is stale.
        if self.row(entity.index).is_some() {
            self.remove_row(entity.index);
        }
        let idx = entity.index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        self.sparse[idx] = Some(self.dense.len());
        self.dense.push(component);
        self.entities.push(entity);
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        let row = self.row_of(entity)?;
        Some(&self.dense[row])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let row = self.row_of(entity)?;
        Some(&mut self.dense[row])
    }

    /// Detach and return the component. `None` if `entity` holds no `T`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.row_of(entity)?;
        self.remove_row(entity.index)
    }

    pub fn has(&self, entity: Entity) -> bool {
        self.row_of(entity).is_some()
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Owners of the stored components, in dense (unspecified) order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate `(Entity, &T)` in dense order. Restartable; order carries no
    /// meaning and changes after removals.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterate `(Entity, &mut T)` in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    fn row(&self, index: u32) -> Option<usize> {
        self.sparse.get(index as usize).copied().flatten()
    }

    fn row_of(&self, entity: Entity) -> Option<usize> {
        let row = self.row(entity.index)?;
        (self.entities[row] == entity).then_some(row)
    }

    fn remove_row(&mut self, index: u32) -> Option<T> {
        let row = self.sparse.get_mut(index as usize)?.take()?;
        let value = self.dense.swap_remove(row);
        self.entities.swap_remove(row);
        // Patch the sparse entry of whatever moved into `row`.
        if let Some(&moved) = self.entities.get(row) {
            self.sparse[moved.index as usize] = Some(row);
        }
        Some(value)
    }
}

impl<T: 'static> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentStore`], used by the world for
/// operations that don't know `T` (release, diagnostics, matching).
pub(crate) trait AnyStore: Send + Sync {
    /// Drop `entity`'s component if present.
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn contains(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn entities(&self) -> &[Entity];
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: 'static + Send + Sync> AnyStore for ComponentStore<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.entities.clear();
        self.sparse.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::EntityRegistry;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);

    #[test]
    fn add_then_get_round_trip() {
        let mut reg = EntityRegistry::new();
        let e = reg.enroll();
        let mut store = ComponentStore::new();
        store.add(e, Health(10)).unwrap();
        assert_eq!(store.get(e), Some(&Health(10)));
        assert!(store.has(e));

        assert_eq!(store.remove(e), Some(Health(10)));
        assert_eq!(store.get(e), None);
        assert!(!store.has(e));
    }

    #[test]
    fn duplicate_add_keeps_original() {
        let mut reg = EntityRegistry::new();
        let e = reg.enroll();
        let mut store = ComponentStore::new();
        store.add(e, Health(1)).unwrap();

        let err = store.add(e, Health(2)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { entity, .. } if entity == e));
        assert_eq!(store.get(e), Some(&Health(1)));
    }

    #[test]
    fn remove_absent_is_none() {
        let mut reg = EntityRegistry::new();
        let e = reg.enroll();
        let mut store: ComponentStore<Health> = ComponentStore::new();
        assert_eq!(store.remove(e), None);
    }

    #[test]
    fn swap_remove_keeps_other_rows_addressable() {
        let mut reg = EntityRegistry::new();
        let a = reg.enroll();
        let b = reg.enroll();
        let c = reg.enroll();
        let mut store = ComponentStore::new();
        store.add(a, Health(1)).unwrap();
        store.add(b, Health(2)).unwrap();
        store.add(c, Health(3)).unwrap();

        store.remove(a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b), Some(&Health(2)));
        assert_eq!(store.get(c), Some(&Health(3)));
    }

    #[test]
    fn stale_generation_is_not_visible() {
        let mut reg = EntityRegistry::new();
        let old = reg.enroll();
        let mut store = ComponentStore::new();
        store.add(old, Health(5)).unwrap();
        reg.release(old).unwrap();
        let new = reg.enroll();
        assert_eq!(new.index(), old.index());

        assert_eq!(store.get(new), None);
        // Adding for the new generation replaces the stale row.
        store.add(new, Health(6)).unwrap();
        assert_eq!(store.get(new), Some(&Health(6)));
        assert_eq!(store.get(old), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_replaces() {
        let mut reg = EntityRegistry::new();
        let e = reg.enroll();
        let mut store = ComponentStore::new();
        assert_eq!(store.insert(e, Health(1)), None);
        assert_eq!(store.insert(e, Health(2)), Some(Health(1)));
        assert_eq!(store.get(e), Some(&Health(2)));
    }

    #[test]
    fn iter_is_restartable() {
        let mut reg = EntityRegistry::new();
        let mut store = ComponentStore::new();
        for i in 0..4 {
            store.add(reg.enroll(), Health(i)).unwrap();
        }
        let first: u32 = store.iter().map(|(_, h)| h.0).sum();
        let second: u32 = store.iter().map(|(_, h)| h.0).sum();
        assert_eq!(first, 6);
        assert_eq!(first, second);

        for (_, h) in store.iter_mut() {
            h.0 += 1;
        }
        assert_eq!(store.iter().map(|(_, h)| h.0).sum::<u32>(), 10);
    }

    #[test]
    fn drop_called_on_remove() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut reg = EntityRegistry::new();
        let a = reg.enroll();
        let b = reg.enroll();
        let mut store = ComponentStore::new();
        store.add(a, Tracked).ok();
        store.add(b, Tracked).ok();
        AnyStore::remove_entity(&mut store, a);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 1);
        drop(store);
        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 2);
    }
}
