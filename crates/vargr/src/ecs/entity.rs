//! # Entity — Opaque Handles With Generations
//!
//! An [`Entity`] carries no data of its own. The [`World`](super::world::World)
//! maps it to components, and the [`EntityRegistry`] decides whether a handle
//! is still valid.
//!
//! ## Generational Indices
//!
//! Slots are recycled after release, so a bare index is not enough to tell a
//! live entity from a stale handle:
//!
//! ```text
//! 1. enroll            → Entity { index: 5, generation: 0 }
//! 2. keep a copy       saved = 5v0
//! 3. release 5v0       slot 5 goes on the free list, generation becomes 1
//! 4. enroll            → Entity { index: 5, generation: 1 }
//! 5. use `saved`       5v0 != 5v1, reported as UnknownEntity
//! ```
//!
//! ## Ordering
//!
//! Entities order by `(index, generation)`. Systems visit their matching set
//! in that order, which keeps ticks deterministic regardless of the order
//! components were attached in.

use std::fmt;

use crate::error::{EcsError, Result};

/// A lightweight handle to an entity owned by one [`World`](super::world::World).
///
/// Only valid for the world that created it, and only while its generation
/// matches the slot's current generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Slot index. Recycled after release.
    pub(crate) index: u32,
    /// Bumped every time the slot is released.
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index. Useful for diagnostics and dense tables.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation of this handle.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and releases entity handles. Knows nothing about components;
/// the owning world clears component data on release.
///
/// ```text
/// generations: [0, 1, 0, 2, 0]   ← current generation per slot
/// live:        [T, F, T, F, T]   ← whether the slot is handed out
/// free_list:   [1, 3]            ← slots available for reuse (LIFO)
/// ```
#[derive(Debug, Default)]
pub struct EntityRegistry {
    generations: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with room for `capacity` slots before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocate a fresh handle, reusing a released slot when one exists.
    ///
    /// # Panics
    ///
    /// Panics if all `u32::MAX` slots are in use.
    pub fn enroll(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return Entity {
                index,
                generation: self.generations[index as usize],
            };
        }

        assert!(
            self.generations.len() < u32::MAX as usize,
            "entity handle space exhausted"
        );
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        Entity {
            index,
            generation: 0,
        }
    }

    /// Invalidate `entity`. Its slot becomes reusable with a new generation.
    pub fn release(&mut self, entity: Entity) -> Result<()> {
        if !self.is_live(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let idx = entity.index as usize;
        self.live[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(entity.index);
        Ok(())
    }

    /// `true` while `entity` has been enrolled and not yet released.
    pub fn is_live(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.generations.len() && self.live[idx] && self.generations[idx] == entity.generation
    }

    /// The live handle currently occupying `index`, if any.
    pub fn live_at(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if idx < self.live.len() && self.live[idx] {
            Some(Entity {
                index,
                generation: self.generations[idx],
            })
        } else {
            None
        }
    }

    /// All live handles in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.live.len() as u32).filter_map(|i| self.live_at(i))
    }

    /// Number of live entities.
    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// Number of released slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Total number of slots ever allocated.
    pub fn total_slots(&self) -> usize {
        self.generations.len()
    }

    /// Release every live entity at once.
    pub(crate) fn clear(&mut self) {
        let live: Vec<Entity> = self.iter().collect();
        for entity in live {
            let idx = entity.index as usize;
            self.live[idx] = false;
            self.generations[idx] = self.generations[idx].wrapping_add(1);
            self.free_list.push(entity.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enroll_sequential() {
        let mut reg = EntityRegistry::new();
        let e0 = reg.enroll();
        let e1 = reg.enroll();
        assert_eq!(e0.index, 0);
        assert_eq!(e1.index, 1);
        assert_eq!(e0.generation, 0);
        assert_eq!(e1.generation, 0);
    }

    #[test]
    fn recycle_bumps_generation() {
        let mut reg = EntityRegistry::new();
        let e0 = reg.enroll();
        reg.release(e0).unwrap();
        let reused = reg.enroll();
        assert_eq!(reused.index, 0); // same slot
        assert_eq!(reused.generation, 1); // new generation
        assert_ne!(reused, e0);
    }

    #[test]
    fn stale_handle_detected() {
        let mut reg = EntityRegistry::new();
        let e0 = reg.enroll();
        assert!(reg.is_live(e0));
        reg.release(e0).unwrap();
        assert!(!reg.is_live(e0));

        // Recycling the slot must not revive the old handle.
        let _e0b = reg.enroll();
        assert!(!reg.is_live(e0));
    }

    #[test]
    fn double_release_is_unknown_entity() {
        let mut reg = EntityRegistry::new();
        let e0 = reg.enroll();
        reg.release(e0).unwrap();
        assert_eq!(reg.release(e0), Err(EcsError::UnknownEntity(e0)));
    }

    #[test]
    fn counts_track_lifecycle() {
        let mut reg = EntityRegistry::new();
        assert_eq!(reg.alive_count(), 0);
        let e0 = reg.enroll();
        let _e1 = reg.enroll();
        assert_eq!(reg.alive_count(), 2);
        assert_eq!(reg.total_slots(), 2);

        reg.release(e0).unwrap();
        assert_eq!(reg.alive_count(), 1);
        assert_eq!(reg.free_count(), 1);
        assert_eq!(reg.total_slots(), 2);
    }

    #[test]
    fn iter_is_ascending_and_skips_released() {
        let mut reg = EntityRegistry::new();
        let a = reg.enroll();
        let b = reg.enroll();
        let c = reg.enroll();
        reg.release(b).unwrap();
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut reg = EntityRegistry::new();
        let a = reg.enroll();
        let b = reg.enroll();
        reg.clear();
        assert!(!reg.is_live(a));
        assert!(!reg.is_live(b));
        assert_eq!(reg.alive_count(), 0);
    }

    #[test]
    fn entity_ordering_is_by_index() {
        let mut reg = EntityRegistry::new();
        let a = reg.enroll();
        let b = reg.enroll();
        assert!(a < b);
        assert_eq!(format!("{b}"), "1v0");
        assert_eq!(format!("{b:?}"), "Entity(1v0)");
    }
}
