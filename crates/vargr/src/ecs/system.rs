//! # System — Logic That Runs Every Tick
//!
//! Two flavours of system exist:
//!
//! - A **raw system** is any `FnMut(&mut World, f32) -> Result<()>`. It sees
//!   the whole world and does whatever it wants. The transform resolver is one.
//! - An **entity system** implements [`EntitySystem`]. It declares a
//!   [`ComponentSet`] and receives lifecycle callbacks for every entity that
//!   holds all of those components.
//!
//! [`Matched`] adapts an entity system into a raw one, so the scheduler only
//! ever deals with [`System`].
//!
//! ## One Step of an Entity System
//!
//! ```text
//! matching = world.matching(signature)        frozen, ascending
//! departed = known − matching                 → on_destroy, once each
//! extract signature stores
//! for e in matching:
//!     if e ∉ known: known += e                → on_create, once
//!                                             → on_update
//! restore stores
//! apply Commands buffered during the step
//! ```
//!
//! The matching set is taken before the first callback, so structural
//! changes queued during the step never disturb the running iteration.

use std::collections::BTreeSet;

use super::commands::Commands;
use super::component::Component;
use super::entity::Entity;
use super::query::ComponentSet;
use super::signature::Signature;
use super::world::World;
use crate::error::Result;

/// Something the scheduler can run once per tick.
///
/// Any `FnMut(&mut World, f32) -> Result<()>` implements this trait.
pub trait System {
    fn run(&mut self, world: &mut World, dt: f32) -> Result<()>;
}

impl<F: FnMut(&mut World, f32) -> Result<()>> System for F {
    fn run(&mut self, world: &mut World, dt: f32) -> Result<()> {
        (self)(world, dt)
    }
}

/// A system that acts on every entity matching a typed signature.
///
/// ```ignore
/// struct Spin;
///
/// impl EntitySystem for Spin {
///     type Query = (&'static mut Transform,);
///
///     fn on_update(&mut self, ctx: &mut SystemContext, _: Entity, (t,): (&mut Transform,)) -> Result<()> {
///         t.rotate(Vec3::new(0.0, 90.0 * ctx.dt(), 0.0));
///         Ok(())
///     }
/// }
/// ```
pub trait EntitySystem: 'static {
    /// Components this system requires, e.g. `(&'static A, &'static mut B)`.
    type Query: ComponentSet;

    /// Name used in logs, reports and diagnostics.
    fn name(&self) -> String {
        short_system_name(std::any::type_name::<Self>())
    }

    /// First step in which `entity` matches. Runs before its first `on_update`.
    fn on_create(
        &mut self,
        _ctx: &mut SystemContext<'_>,
        _entity: Entity,
        _items: <Self::Query as ComponentSet>::Item<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// Every step in which `entity` matches.
    fn on_update(
        &mut self,
        ctx: &mut SystemContext<'_>,
        entity: Entity,
        items: <Self::Query as ComponentSet>::Item<'_>,
    ) -> Result<()>;

    /// First step after `entity` stopped matching (component removed or
    /// entity released). Components are no longer available.
    fn on_destroy(&mut self, _ctx: &mut SystemContext<'_>, _entity: Entity) -> Result<()> {
        Ok(())
    }
}

/// What a callback can reach besides its own components.
///
/// The stores of the running signature are extracted, so [`get`](Self::get)
/// of one of those types returns `None`; the callback's `items` argument is
/// the way to reach them. Structural changes go through
/// [`commands`](Self::commands).
pub struct SystemContext<'w> {
    world: &'w mut World,
    commands: &'w mut Commands,
    dt: f32,
}

impl<'w> SystemContext<'w> {
    pub(crate) fn new(world: &'w mut World, commands: &'w mut Commands, dt: f32) -> Self {
        Self {
            world,
            commands,
            dt,
        }
    }

    /// Seconds since the previous tick, as supplied by the caller.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Allocate an entity now. Components for it go through
    /// [`commands`](Self::commands).
    pub fn enroll(&mut self) -> Entity {
        self.world.enroll()
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.world.is_live(entity)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.world.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.world.get_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.world.has::<T>(entity)
    }

    /// Like [`get`](Self::get) but fails with `MissingComponent`.
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.world.component(entity)
    }

    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.world.component_mut(entity)
    }

    pub fn resource<R: 'static + Send + Sync>(&self) -> Option<&R> {
        self.world.get_resource()
    }

    pub fn resource_mut<R: 'static + Send + Sync>(&mut self) -> Option<&mut R> {
        self.world.get_resource_mut()
    }

    /// Structural changes applied once this system step completes.
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }

    /// Read-only view of the rest of the world.
    pub fn world(&self) -> &World {
        self.world
    }
}

/// Runs an [`EntitySystem`] as a [`System`], tracking which entities it has
/// already seen.
pub struct Matched<S: EntitySystem> {
    system: S,
    name: String,
    signature: Signature,
    known: BTreeSet<Entity>,
}

impl<S: EntitySystem> Matched<S> {
    /// Resolve the signature of `system` against `world`'s registry.
    ///
    /// Fails with `SignatureMismatch` for an empty or duplicate-type query.
    pub fn new(system: S, world: &mut World) -> Result<Self> {
        let name = system.name();
        let signature = S::Query::signature(world.components_mut(), &name)?;
        Ok(Self {
            system,
            name,
            signature,
            known: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Entities that have received `on_create` and not yet `on_destroy`.
    pub fn known(&self) -> impl Iterator<Item = Entity> + '_ {
        self.known.iter().copied()
    }

    pub fn inner(&self) -> &S {
        &self.system
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.system
    }

    fn step(
        &mut self,
        ctx: &mut SystemContext<'_>,
        stores: &mut <S::Query as ComponentSet>::Stores,
        matching: &[Entity],
    ) -> Result<()> {
        let departed: Vec<Entity> = self
            .known
            .iter()
            .copied()
            .filter(|e| matching.binary_search(e).is_err())
            .collect();
        for entity in departed {
            self.known.remove(&entity);
            self.system.on_destroy(ctx, entity)?;
        }

        for &entity in matching {
            if !self.known.contains(&entity) {
                let Some(items) = S::Query::fetch(stores, entity) else {
                    continue;
                };
                self.known.insert(entity);
                self.system.on_create(ctx, entity, items)?;
            }
            if let Some(items) = S::Query::fetch(stores, entity) {
                self.system.on_update(ctx, entity, items)?;
            }
        }
        Ok(())
    }
}

impl<S: EntitySystem> System for Matched<S> {
    fn run(&mut self, world: &mut World, dt: f32) -> Result<()> {
        let matching = world.matching(&self.signature);
        let mut commands = Commands::new();
        let mut stores = S::Query::extract(world);
        let result = {
            let mut ctx = SystemContext::new(world, &mut commands, dt);
            self.step(&mut ctx, &mut stores, &matching)
        };
        S::Query::restore(stores, world);

        match result {
            Ok(()) => commands.apply(world),
            Err(err) => {
                if !commands.is_empty() {
                    log::warn!(
                        "system `{}` failed; discarding {} queued command(s)",
                        self.name,
                        commands.len()
                    );
                }
                Err(err)
            }
        }
    }
}

/// Strip the module path from a type name (`game::movement_system` →
/// `movement_system`, `{{closure}}` → `<closure>`).
pub(crate) fn short_system_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if full.contains("{{closure}}") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
