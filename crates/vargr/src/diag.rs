//! Diagnostics snapshot of a scene.
//!
//! Enabled by the `diagnostics` feature flag. [`Scene::diagnostics`] gathers
//! the timings of the most recent tick, entity pool statistics and store
//! sizes into a [`SceneDiagnostics`], which serializes to JSON for whatever
//! tool wants to display it.
//!
//! [`Scene::diagnostics`]: crate::scene::Scene::diagnostics

use serde::Serialize;

use crate::ecs::component::short_type_name;
use crate::ecs::schedule::Scheduler;
use crate::ecs::World;

/// Everything known about a scene after its last tick.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDiagnostics {
    pub scene: String,
    pub tick: u64,
    pub entity_pool: EntityPoolSnapshot,
    pub system_timings: Vec<SystemTimingSnapshot>,
    pub stores: Vec<StoreSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityPoolSnapshot {
    pub total_slots: usize,
    pub free_count: usize,
    pub alive_count: usize,
    pub enrolled_this_tick: u32,
    pub released_this_tick: u32,
    /// Share of slots sitting on the free list, in percent.
    pub fragmentation_pct: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemTimingSnapshot {
    pub name: String,
    pub duration_us: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub component: String,
    pub count: usize,
}

impl SceneDiagnostics {
    /// Gather a snapshot. Resets the world's per-tick churn counters.
    pub(crate) fn collect(name: &str, world: &mut World, scheduler: &Scheduler) -> Self {
        let (enrolled, released) = world.take_churn();
        let registry = world.registry();
        let total = registry.total_slots();
        let fragmentation_pct = if total == 0 {
            0.0
        } else {
            registry.free_count() as f32 / total as f32 * 100.0
        };

        Self {
            scene: name.to_string(),
            tick: scheduler.ticks(),
            entity_pool: EntityPoolSnapshot {
                total_slots: total,
                free_count: registry.free_count(),
                alive_count: registry.alive_count(),
                enrolled_this_tick: enrolled,
                released_this_tick: released,
                fragmentation_pct,
            },
            system_timings: scheduler
                .timings
                .iter()
                .map(|t| SystemTimingSnapshot {
                    name: t.name.clone(),
                    duration_us: t.duration_us,
                })
                .collect(),
            stores: world
                .store_sizes()
                .into_iter()
                .map(|(name, count)| StoreSnapshot {
                    component: short_type_name(name).to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Total time spent in systems during the last tick.
    pub fn systems_us(&self) -> f64 {
        self.system_timings.iter().map(|t| t.duration_us).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
