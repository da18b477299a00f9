//! Ownership of every [`Scene`] and the choice of which one is active.
//!
//! ```ignore
//! let mut manager = SceneManager::new();
//! manager.add(Scene::new("menu"))?;      // first scene becomes active
//! manager.add(Scene::new("level-1"))?;
//!
//! manager.goto("level-1")?;             // switch at the next tick
//! manager.tick_active(1.0 / 60.0)?;     // ticks level-1
//! ```
//!
//! Switching never destroys the previous scene. It keeps its entities and
//! resumes where it left off when it becomes active again.

use std::fmt;

use crate::ecs::TickReport;
use crate::error::{EcsError, Result};
use crate::scene::Scene;

/// Registry of scenes with at most one active.
#[derive(Default)]
pub struct SceneManager {
    scenes: Vec<Scene>,
    active: Option<String>,
    pending: Option<String>,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `scene`. The first scene added becomes active.
    ///
    /// Fails with [`EcsError::DuplicateScene`] if the name is taken.
    pub fn add(&mut self, scene: Scene) -> Result<()> {
        if self.index_of(scene.name()).is_some() {
            return Err(EcsError::DuplicateScene(scene.name().to_string()));
        }
        log::info!("added scene '{}'", scene.name());
        if self.active.is_none() {
            self.active = Some(scene.name().to_string());
            log::info!("scene '{}' is now active", scene.name());
        }
        self.scenes.push(scene);
        Ok(())
    }

    /// Make `name` the active scene right away.
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        if self.index_of(name).is_none() {
            return Err(EcsError::UnknownScene(name.to_string()));
        }
        if self.active.as_deref() != Some(name) {
            log::info!("scene '{}' is now active", name);
            self.active = Some(name.to_string());
        }
        self.pending = None;
        Ok(())
    }

    /// Queue a switch to `name`, applied at the start of the next
    /// [`tick_active`](Self::tick_active). A later call replaces an earlier one.
    pub fn goto(&mut self, name: &str) -> Result<()> {
        if self.index_of(name).is_none() {
            return Err(EcsError::UnknownScene(name.to_string()));
        }
        self.pending = Some(name.to_string());
        Ok(())
    }

    /// Name of the queued switch, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Name of the active scene.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Scene> {
        let name = self.active.as_deref()?;
        self.get(name)
    }

    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        let idx = self.index_of(self.active.as_deref()?)?;
        self.scenes.get_mut(idx)
    }

    pub fn get(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.name() == name)
    }

    /// Hand back ownership of a scene. If it was active, no scene is active
    /// afterwards; a queued switch to it is dropped.
    pub fn remove(&mut self, name: &str) -> Result<Scene> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| EcsError::UnknownScene(name.to_string()))?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        if self.pending.as_deref() == Some(name) {
            self.pending = None;
        }
        log::info!("removed scene '{}'", name);
        Ok(self.scenes.remove(idx))
    }

    /// Apply any queued switch, then tick the active scene.
    ///
    /// Returns `Ok(None)` when no scene is active.
    pub fn tick_active(&mut self, dt: f32) -> Result<Option<TickReport>> {
        if let Some(target) = self.pending.take() {
            self.set_active(&target)?;
        }
        match self.active_mut() {
            Some(scene) => scene.tick(dt).map(Some),
            None => Ok(None),
        }
    }

    /// Scene names in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(Scene::name)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.name() == name)
    }
}

impl fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneManager")
            .field("active", &self.active)
            .field("pending", &self.pending)
            .field("scene_count", &self.scenes.len())
            .finish()
    }
}
