//! Deferred structural changes.
//!
//! Callbacks run while the stores of their own signature are extracted from
//! the world, so adding or removing components from inside a callback goes
//! through a [`Commands`] buffer instead. The scheduler applies the buffer
//! right after the system step that filled it, in push order, so every later
//! system in the same tick sees the result.
//!
//! If the step fails, its buffer is dropped unapplied.

use std::fmt;

use super::component::Component;
use super::entity::Entity;
use super::hierarchy::Link;
use super::world::World;
use crate::error::Result;

type Command = Box<dyn FnOnce(&mut World) -> Result<()> + Send>;

/// A queue of world mutations applied after the current system step.
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue [`World::add`]. Fails at apply time on a duplicate.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) {
        self.push(move |world| world.add(entity, component));
    }

    /// Queue [`World::insert`], replacing any existing `T`.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) {
        self.push(move |world| world.insert(entity, component).map(drop));
    }

    /// Queue [`World::remove`].
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        self.push(move |world| world.remove::<T>(entity).map(drop));
    }

    /// Queue [`World::release`].
    pub fn release(&mut self, entity: Entity) {
        self.push(move |world| world.release(entity));
    }

    /// Queue a re-link of `child` under `parent` (or to the root with `None`).
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) {
        self.push(move |world| world.insert(child, Link { parent }).map(drop));
    }

    /// Queue an arbitrary world mutation.
    pub fn push<F>(&mut self, command: F)
    where
        F: FnOnce(&mut World) -> Result<()> + Send + 'static,
    {
        self.queue.push(Box::new(command));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every queued command in order, stopping at the first failure.
    /// Commands after a failing one are dropped.
    pub fn apply(self, world: &mut World) -> Result<()> {
        let total = self.queue.len();
        for (i, command) in self.queue.into_iter().enumerate() {
            if let Err(err) = command(world) {
                let dropped = total - i - 1;
                if dropped > 0 {
                    log::warn!("command failed ({err}); dropping {dropped} queued command(s)");
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("queued", &self.queue.len())
            .finish()
    }
}
