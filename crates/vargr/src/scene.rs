//! # Scene — One Independent Simulated World
//!
//! A [`Scene`] composes a [`World`] (entities, stores, resources) with a
//! [`Scheduler`] (ordered systems). Scenes share nothing: handles from one
//! scene mean nothing in another.
//!
//! ```ignore
//! let mut scene = Scene::new("level-1");
//! scene.add_plugin(TransformPlugin)?;
//! scene.register(Spin)?;
//!
//! let crate_ = scene.spawn((Info::new("crate"), Transform::from_xyz(0.0, 1.0, 0.0)))?;
//! let lid = scene.spawn((Transform::from_xyz(0.0, 0.5, 0.0),))?;
//! scene.set_parent(lid, Some(crate_))?;
//!
//! scene.tick(1.0 / 60.0)?;
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::components::{Camera, Info, RenderData, Transform};
use crate::config::SceneConfig;
use crate::ecs::{
    Bundle, Component, Entity, EntitySystem, Link, SceneGraph, Scheduler, System, TickReport,
    TransformResolver, World,
};
use crate::error::Result;
use crate::systems::CameraSystem;
use crate::time::Time;

/// Bundles related systems and resources for a scene.
///
/// ```ignore
/// pub struct PhysicsPlugin;
///
/// impl Plugin for PhysicsPlugin {
///     fn build(&self, scene: &mut Scene) -> Result<()> {
///         scene.world_mut().insert_resource(Gravity(-9.81));
///         scene.register(Integrate)
///     }
/// }
/// ```
pub trait Plugin {
    fn build(&self, scene: &mut Scene) -> Result<()>;
}

/// Registers the transform resolver followed by the camera system.
///
/// Add it before any system that reads world matrices.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformPlugin;

impl Plugin for TransformPlugin {
    fn build(&self, scene: &mut Scene) -> Result<()> {
        scene.add_system(TransformResolver);
        scene.register(CameraSystem)
    }
}

/// Entities, components and systems of one world, ticked together.
pub struct Scene {
    name: String,
    config: SceneConfig,
    world: World,
    scheduler: Scheduler,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, SceneConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: SceneConfig) -> Self {
        let mut world = World::with_capacity(config.entity_capacity);
        world.insert_resource(Time::new());
        Self {
            name: name.into(),
            config,
            world,
            scheduler: Scheduler::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The tick timing resource.
    pub fn time(&self) -> Time {
        self.world.get_resource::<Time>().copied().unwrap_or_default()
    }

    // ── Entities and components ──────────────────────────────────────

    pub fn enroll(&mut self) -> Entity {
        self.world.enroll()
    }

    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Result<Entity> {
        self.world.spawn(bundle)
    }

    /// Release `entity`. Children keep their [`Link`] and fail the next
    /// resolve with `DanglingParent` unless re-linked or released too.
    pub fn release(&mut self, entity: Entity) -> Result<()> {
        self.world.release(entity)
    }

    /// Release `entity` and everything below it. Returns how many entities
    /// were released.
    pub fn release_recursive(&mut self, entity: Entity) -> Result<usize> {
        if !self.world.is_live(entity) {
            return Err(crate::error::EcsError::UnknownEntity(entity));
        }

        let mut children: BTreeMap<Entity, Vec<Entity>> = BTreeMap::new();
        for (child, link) in self.world.each::<Link>() {
            if let Some(parent) = link.parent {
                children.entry(parent).or_default().push(child);
            }
        }

        // Visited set guards against cyclic links.
        let mut doomed = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![entity];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            doomed.push(next);
            if let Some(kids) = children.get(&next) {
                stack.extend(kids.iter().copied());
            }
        }

        for e in &doomed {
            self.world.release(*e)?;
        }
        log::trace!("released {} entities under {}", doomed.len(), entity);
        Ok(doomed.len())
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.world.is_live(entity)
    }

    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.world.add(entity, component)
    }

    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<Option<T>> {
        self.world.insert(entity, component)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.world.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.world.get_mut(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<Option<T>> {
        self.world.remove(entity)
    }

    pub fn take<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.world.take(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.world.has::<T>(entity)
    }

    /// Link `child` under `parent`, or make it a root with `None`.
    ///
    /// Only `child` is checked here. Whether `parent` is live and whether the
    /// link closes a cycle is decided at the next transform resolve.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<()> {
        self.world.insert(child, Link { parent }).map(drop)
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Append an entity system after everything registered so far.
    pub fn register<S: EntitySystem>(&mut self, system: S) -> Result<()> {
        self.scheduler.register(&mut self.world, system)
    }

    /// Append a raw whole-world system.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.scheduler.add_system(system);
    }

    pub fn add_plugin(&mut self, plugin: impl Plugin) -> Result<()> {
        plugin.build(self)
    }

    /// Run every system once, in registration order.
    ///
    /// Under [`ErrorPolicy::Abort`](crate::config::ErrorPolicy::Abort) the
    /// first failing system's error is returned; under `Isolate` failures are
    /// listed in the report.
    pub fn tick(&mut self, dt: f32) -> Result<TickReport> {
        if let Some(time) = self.world.get_resource_mut::<Time>() {
            time.advance(dt);
        }
        self.scheduler.tick(&mut self.world, dt, self.config.error_policy)
    }

    /// Resolve transforms outside of a tick.
    pub fn resolve_transforms(&mut self) -> Result<usize> {
        TransformResolver::resolve(&mut self.world)
    }

    /// Validated snapshot of the current hierarchy.
    pub fn scene_graph(&self) -> Result<SceneGraph> {
        SceneGraph::build(&self.world)
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Lowest-id entity whose [`Info`] name is `name`.
    pub fn find_named(&self, name: &str) -> Option<Entity> {
        self.world
            .each::<Info>()
            .filter(|(_, info)| info.name == name)
            .map(|(e, _)| e)
            .min()
    }

    /// Lowest-id camera flagged primary.
    pub fn primary_camera(&self) -> Option<Entity> {
        self.world
            .each::<Camera>()
            .filter(|(_, cam)| cam.primary)
            .map(|(e, _)| e)
            .min()
    }

    /// Entities with [`RenderData`] and [`Transform`] whose [`Info`], if any,
    /// is enabled. Ascending.
    pub fn renderables(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .world
            .each::<RenderData>()
            .map(|(e, _)| e)
            .filter(|e| self.world.has::<Transform>(*e))
            .filter(|e| self.world.get::<Info>(*e).is_none_or(|info| info.enabled))
            .collect();
        out.sort_unstable();
        out
    }

    /// Release every entity, keeping systems and resources.
    pub fn clear(&mut self) {
        self.world.release_all();
    }

    #[cfg(feature = "diagnostics")]
    pub fn diagnostics(&mut self) -> crate::diag::SceneDiagnostics {
        crate::diag::SceneDiagnostics::collect(&self.name, &mut self.world, &self.scheduler)
    }
}
