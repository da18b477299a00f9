//! # World — Entities, Stores, Signatures and Resources
//!
//! The [`World`] is the data half of a scene. It owns:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  entities:   EntityRegistry (generational handles)   │
//! │  components: ComponentRegistry (TypeId → ComponentId)│
//! │  stores:     HashMap<TypeId, Box<dyn AnyStore>>      │
//! │                one ComponentStore<T> per type        │
//! │  signatures: Vec<Signature>                          │
//! │                one bitset per entity slot            │
//! │  resources:  HashMap<TypeId, Box<dyn Any>>           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Signatures are updated on every add/remove/release, so matching an
//! entity against a system's requirements never has to probe the stores.
//!
//! All structural operations validate first and mutate second: when they
//! return an error, the world is exactly as it was before the call.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::{Component, ComponentId, ComponentRegistry};
use super::entity::{Entity, EntityRegistry};
use super::signature::Signature;
use super::storage::{AnyStore, ComponentStore};
use crate::error::{EcsError, Result};

/// Owns every entity, component and resource of one scene.
pub struct World {
    entities: EntityRegistry,
    components: ComponentRegistry,
    stores: HashMap<TypeId, Box<dyn AnyStore>>,
    signatures: Vec<Signature>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    #[cfg(feature = "diagnostics")]
    enrolled_this_tick: u32,
    #[cfg(feature = "diagnostics")]
    released_this_tick: u32,
}

impl World {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a world with room for `capacity` entities before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: EntityRegistry::with_capacity(capacity),
            components: ComponentRegistry::new(),
            stores: HashMap::new(),
            signatures: Vec::with_capacity(capacity),
            resources: HashMap::new(),
            #[cfg(feature = "diagnostics")]
            enrolled_this_tick: 0,
            #[cfg(feature = "diagnostics")]
            released_this_tick: 0,
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Allocate a new entity with no components.
    pub fn enroll(&mut self) -> Entity {
        let entity = self.entities.enroll();
        let idx = entity.index as usize;
        if idx >= self.signatures.len() {
            self.signatures.resize_with(idx + 1, Signature::new);
        }
        self.signatures[idx].clear();
        #[cfg(feature = "diagnostics")]
        {
            self.enrolled_this_tick += 1;
        }
        log::trace!("enrolled entity {}", entity);
        entity
    }

    /// Release `entity` and drop every component it holds.
    ///
    /// Fails with [`EcsError::UnknownEntity`] if the handle is not live.
    pub fn release(&mut self, entity: Entity) -> Result<()> {
        self.ensure_live(entity)?;
        for store in self.stores.values_mut() {
            store.remove_entity(entity);
        }
        self.signatures[entity.index as usize].clear();
        self.entities.release(entity)?;
        #[cfg(feature = "diagnostics")]
        {
            self.released_this_tick += 1;
        }
        log::trace!("released entity {}", entity);
        Ok(())
    }

    /// Release every live entity.
    pub fn release_all(&mut self) {
        for store in self.stores.values_mut() {
            store.clear();
        }
        for sig in &mut self.signatures {
            sig.clear();
        }
        #[cfg(feature = "diagnostics")]
        {
            self.released_this_tick += self.entities.alive_count() as u32;
        }
        self.entities.clear();
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.entities.is_live(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// All live entities in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// The underlying handle allocator.
    pub fn registry(&self) -> &EntityRegistry {
        &self.entities
    }

    fn ensure_live(&self, entity: Entity) -> Result<()> {
        if self.entities.is_live(entity) {
            Ok(())
        } else {
            Err(EcsError::UnknownEntity(entity))
        }
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach `component` to `entity`.
    ///
    /// Fails with [`EcsError::UnknownEntity`] for a dead handle and
    /// [`EcsError::DuplicateComponent`] if a `T` is already attached; in both
    /// cases nothing changes.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.ensure_live(entity)?;
        let id = self.components.register::<T>();
        self.store_or_insert::<T>().add(entity, component)?;
        self.signatures[entity.index as usize].insert(id);
        Ok(())
    }

    /// Attach or overwrite a `T`, returning the previous value.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<Option<T>> {
        self.ensure_live(entity)?;
        let id = self.components.register::<T>();
        let previous = self.store_or_insert::<T>().insert(entity, component);
        self.signatures[entity.index as usize].insert(id);
        Ok(previous)
    }

    /// Detach a `T`. Absent components are not an error: `Ok(None)`.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<Option<T>> {
        self.ensure_live(entity)?;
        let removed = self.store_mut::<T>().and_then(|s| s.remove(entity));
        if removed.is_some() {
            if let Some(id) = self.components.id_of::<T>() {
                self.signatures[entity.index as usize].remove(id);
            }
        }
        Ok(removed)
    }

    /// Detach a `T` that must be present, failing with
    /// [`EcsError::MissingComponent`] otherwise.
    pub fn take<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.remove::<T>(entity)?.ok_or(EcsError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        })
    }

    /// Shared access. `None` if the entity is dead or holds no `T`.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_live(entity) {
            return None;
        }
        self.store::<T>()?.get(entity)
    }

    /// Exclusive access. `None` if the entity is dead or holds no `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_live(entity) {
            return None;
        }
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Shared access to a component that must be present.
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.ensure_live(entity)?;
        self.get::<T>(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        })
    }

    /// Exclusive access to a component that must be present.
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.ensure_live(entity)?;
        self.get_mut::<T>(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        })
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Iterate every `(Entity, &T)`. Order is unspecified.
    pub fn each<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store::<T>().into_iter().flat_map(|s| s.iter())
    }

    /// Iterate every `(Entity, &mut T)`. Order is unspecified.
    pub fn each_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.store_mut::<T>().into_iter().flat_map(|s| s.iter_mut())
    }

    /// The store for `T`, if any `T` was ever attached.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .map(|s| downcast_ref::<T>(s.as_ref()))
    }

    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .map(|s| downcast_mut::<T>(s.as_mut()))
    }

    fn store_or_insert<T: Component>(&mut self) -> &mut ComponentStore<T> {
        let store = self
            .stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        downcast_mut::<T>(store.as_mut())
    }

    /// Temporarily move the store for `T` out of the world.
    ///
    /// Used by system steps so the components of the running signature can be
    /// borrowed independently of the rest of the world. Must be paired with
    /// [`World::restore_store`].
    pub(crate) fn take_store<T: Component>(&mut self) -> Box<ComponentStore<T>> {
        self.components.register::<T>();
        match self.stores.remove(&TypeId::of::<T>()) {
            Some(store) => store.into_any().downcast::<ComponentStore<T>>().unwrap_or_else(|_| {
                panic!(
                    "store type mismatch: expected `{}`",
                    std::any::type_name::<T>()
                )
            }),
            None => Box::new(ComponentStore::new()),
        }
    }

    pub(crate) fn restore_store<T: Component>(&mut self, store: Box<ComponentStore<T>>) {
        self.stores.insert(TypeId::of::<T>(), store);
    }

    // ── Signatures ───────────────────────────────────────────────────

    /// Component type registry of this world.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub(crate) fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    /// Id of `T`, registering it if needed.
    pub fn component_id<T: Component>(&mut self) -> ComponentId {
        self.components.register::<T>()
    }

    /// The set of component types `entity` currently holds.
    pub fn signature_of(&self, entity: Entity) -> Option<&Signature> {
        if !self.entities.is_live(entity) {
            return None;
        }
        self.signatures.get(entity.index as usize)
    }

    /// Every live entity whose signature contains `required`, in ascending
    /// order.
    ///
    /// Candidates come from the smallest store named in `required`, then each
    /// is checked with a bitset containment test.
    pub fn matching(&self, required: &Signature) -> Vec<Entity> {
        if required.is_empty() {
            return self.entities.iter().collect();
        }

        let mut smallest: Option<&dyn AnyStore> = None;
        for id in required.iter() {
            let store = self
                .components
                .type_id(id)
                .and_then(|tid| self.stores.get(&tid));
            match store {
                // A required type nobody holds: nothing can match.
                None => return Vec::new(),
                Some(store) => {
                    if smallest.is_none_or(|s| store.len() < s.len()) {
                        smallest = Some(store.as_ref());
                    }
                }
            }
        }

        let mut matched: Vec<Entity> = smallest
            .map(|store| {
                store
                    .entities()
                    .iter()
                    .copied()
                    .filter(|e| {
                        self.entities.is_live(*e)
                            && self.signatures[e.index as usize].contains_all(required)
                    })
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_unstable();
        matched
    }

    /// `(type name, count)` for every store, sorted by name.
    pub fn store_sizes(&self) -> Vec<(&'static str, usize)> {
        let mut sizes: Vec<_> = self
            .stores
            .iter()
            .map(|(tid, store)| {
                let name = self
                    .components
                    .id_of_type(*tid)
                    .and_then(|id| self.components.name(id))
                    .unwrap_or("<unknown>");
                (name, store.len())
            })
            .collect();
        sizes.sort_by(|a, b| a.0.cmp(b.0));
        sizes
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource (singleton value), replacing any of the same type.
    pub fn insert_resource<R: 'static + Send + Sync>(&mut self, value: R) {
        self.resources.insert(TypeId::of::<R>(), Box::new(value));
    }

    pub fn get_resource<R: 'static + Send + Sync>(&self) -> Option<&R> {
        self.resources
            .get(&TypeId::of::<R>())
            .and_then(|r| r.downcast_ref::<R>())
    }

    pub fn get_resource_mut<R: 'static + Send + Sync>(&mut self) -> Option<&mut R> {
        self.resources
            .get_mut(&TypeId::of::<R>())
            .and_then(|r| r.downcast_mut::<R>())
    }

    pub fn has_resource<R: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<R>())
    }

    /// Remove a resource, taking ownership.
    pub fn remove_resource<R: 'static + Send + Sync>(&mut self) -> Option<R> {
        self.resources
            .remove(&TypeId::of::<R>())
            .and_then(|r| r.downcast::<R>().ok())
            .map(|b| *b)
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Returns `(enrolled, released)` since the last call and resets both.
    #[cfg(feature = "diagnostics")]
    pub(crate) fn take_churn(&mut self) -> (u32, u32) {
        let churn = (self.enrolled_this_tick, self.released_this_tick);
        self.enrolled_this_tick = 0;
        self.released_this_tick = 0;
        churn
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_ref<T: Component>(store: &dyn AnyStore) -> &ComponentStore<T> {
    store.as_any().downcast_ref().unwrap_or_else(|| {
        panic!(
            "store type mismatch: expected `{}`",
            std::any::type_name::<T>()
        )
    })
}

fn downcast_mut<T: Component>(store: &mut dyn AnyStore) -> &mut ComponentStore<T> {
    store.as_any_mut().downcast_mut().unwrap_or_else(|| {
        panic!(
            "store type mismatch: expected `{}`",
            std::any::type_name::<T>()
        )
    })
}

// ── Bundles (tuple spawn) ────────────────────────────────────────────────

/// A group of components attached together by [`World::spawn`].
///
/// Implemented for tuples of up to 8 components.
pub trait Bundle: Send + Sync + 'static {
    /// Type ids of the bundle members, in declaration order.
    fn type_ids() -> Vec<TypeId>;
    /// Attach every member to `entity`.
    fn attach(self, world: &mut World, entity: Entity) -> Result<()>;
}

macro_rules! impl_bundle {
    ($($T:ident),+) => {
        impl<$($T: Component),+> Bundle for ($($T,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$T>()),+]
            }

            #[allow(non_snake_case)]
            fn attach(self, world: &mut World, entity: Entity) -> Result<()> {
                let ($($T,)+) = self;
                $(world.add(entity, $T)?;)+
                Ok(())
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

impl World {
    /// Enroll an entity and attach a bundle of components (tuple).
    ///
    /// A bundle naming the same type twice fails with
    /// [`EcsError::DuplicateComponent`] and leaves no entity behind.
    ///
    /// ```ignore
    /// let e = world.spawn((Transform::default(), Info::new("crate")))?;
    /// ```
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Result<Entity> {
        let entity = self.enroll();
        if let Err(err) = bundle.attach(self, entity) {
            self.release(entity)?;
            return Err(err);
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    #[derive(Debug, PartialEq)]
    struct Marker;

    fn pos(x: f32, y: f32) -> Position {
        Position { x, y }
    }

    #[test]
    fn add_get_remove_round_trip() {
        let mut world = World::new();
        let e = world.enroll();
        world.add(e, pos(1.0, 2.0)).unwrap();
        assert_eq!(world.get::<Position>(e), Some(&pos(1.0, 2.0)));

        assert_eq!(world.remove::<Position>(e).unwrap(), Some(pos(1.0, 2.0)));
        assert_eq!(world.get::<Position>(e), None);
        // Removing again is a no-op.
        assert_eq!(world.remove::<Position>(e).unwrap(), None);
    }

    #[test]
    fn duplicate_component_leaves_existing() {
        let mut world = World::new();
        let e = world.enroll();
        world.add(e, pos(1.0, 1.0)).unwrap();
        let err = world.add(e, pos(9.0, 9.0)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(world.get::<Position>(e), Some(&pos(1.0, 1.0)));
    }

    #[test]
    fn operations_on_released_entity_fail() {
        let mut world = World::new();
        let e = world.enroll();
        world.add(e, Marker).unwrap();
        world.release(e).unwrap();

        assert_eq!(world.add(e, Marker), Err(EcsError::UnknownEntity(e)));
        assert_eq!(world.remove::<Marker>(e), Err(EcsError::UnknownEntity(e)));
        assert_eq!(world.release(e), Err(EcsError::UnknownEntity(e)));
        assert!(world.get::<Marker>(e).is_none());
    }

    #[test]
    fn release_drops_every_component() {
        let mut world = World::new();
        let e = world.spawn((pos(0.0, 0.0), Velocity { dx: 1.0, dy: 1.0 })).unwrap();
        world.release(e).unwrap();
        assert_eq!(world.store::<Position>().unwrap().len(), 0);
        assert_eq!(world.store::<Velocity>().unwrap().len(), 0);

        // The recycled slot starts with an empty signature.
        let again = world.enroll();
        assert_eq!(again.index(), e.index());
        assert!(world.signature_of(again).unwrap().is_empty());
        assert!(world.get::<Position>(again).is_none());
    }

    #[test]
    fn take_and_component_require_presence() {
        let mut world = World::new();
        let e = world.enroll();
        assert!(matches!(
            world.take::<Marker>(e),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(
            world.component::<Marker>(e),
            Err(EcsError::MissingComponent { .. })
        ));
        world.add(e, Marker).unwrap();
        assert_eq!(world.component::<Marker>(e), Ok(&Marker));
        assert_eq!(world.take::<Marker>(e), Ok(Marker));
    }

    #[test]
    fn matching_is_ascending_and_tracks_removal() {
        let mut world = World::new();
        let a = world.spawn((pos(0.0, 0.0), Velocity { dx: 0.0, dy: 0.0 })).unwrap();
        let b = world.spawn((pos(1.0, 0.0),)).unwrap();
        let c = world.spawn((Velocity { dx: 0.0, dy: 0.0 }, pos(2.0, 0.0))).unwrap();

        let p = world.component_id::<Position>();
        let v = world.component_id::<Velocity>();
        let both = Signature::from_ids([p, v]);
        assert_eq!(world.matching(&both), vec![a, c]);
        assert_eq!(world.matching(&Signature::from_ids([p])), vec![a, b, c]);

        world.remove::<Velocity>(a).unwrap();
        assert_eq!(world.matching(&both), vec![c]);
    }

    #[test]
    fn matching_unknown_type_is_empty() {
        let mut world = World::new();
        world.spawn((Marker,)).unwrap();
        let never = world.component_id::<Velocity>();
        assert!(world.matching(&Signature::from_ids([never])).is_empty());
    }

    #[test]
    fn spawn_with_duplicate_types_leaves_nothing() {
        let mut world = World::new();
        let err = world.spawn((pos(0.0, 0.0), pos(1.0, 1.0))).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.store::<Position>().unwrap().len(), 0);
    }

    #[test]
    fn each_visits_all() {
        let mut world = World::new();
        for i in 0..3 {
            world.spawn((pos(i as f32, 0.0),)).unwrap();
        }
        let total: f32 = world.each::<Position>().map(|(_, p)| p.x).sum();
        assert_eq!(total, 3.0);

        for (_, p) in world.each_mut::<Position>() {
            p.y = 5.0;
        }
        assert!(world.each::<Position>().all(|(_, p)| p.y == 5.0));
        assert_eq!(world.each::<Velocity>().count(), 0);
    }

    #[test]
    fn resources() {
        let mut world = World::new();
        world.insert_resource(42u32);
        assert_eq!(world.get_resource::<u32>(), Some(&42));
        *world.get_resource_mut::<u32>().unwrap() = 7;
        assert_eq!(world.remove_resource::<u32>(), Some(7));
        assert!(!world.has_resource::<u32>());
    }

    #[test]
    fn take_and_restore_store() {
        let mut world = World::new();
        let e = world.spawn((pos(3.0, 4.0),)).unwrap();
        let store = world.take_store::<Position>();
        assert!(world.get::<Position>(e).is_none());
        assert_eq!(store.get(e), Some(&pos(3.0, 4.0)));
        world.restore_store(store);
        assert_eq!(world.get::<Position>(e), Some(&pos(3.0, 4.0)));
    }

    #[test]
    fn release_all_clears_world() {
        let mut world = World::new();
        let a = world.spawn((Marker,)).unwrap();
        let b = world.spawn((Marker,)).unwrap();
        world.release_all();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_live(a));
        assert!(!world.is_live(b));
        assert_eq!(world.each::<Marker>().count(), 0);
    }
}
