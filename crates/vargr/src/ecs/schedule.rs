//! # Scheduler — Ordered System Steps
//!
//! A [`Scheduler`] is a `Vec` of named steps. `tick()` runs them in the order
//! they were registered, so a later system always observes what earlier ones
//! wrote during the same tick, and never the reverse.
//!
//! ## Failures
//!
//! What happens when a step returns an error depends on the
//! [`ErrorPolicy`]:
//!
//! - `Abort`: the tick stops at the failing step and the error is returned.
//!   Steps after it do not run.
//! - `Isolate`: the failure is logged and recorded in the [`TickReport`], and
//!   the remaining steps still run.

use super::query::ComponentSet;
use super::signature::Signature;
use super::system::{short_system_name, EntitySystem, Matched, System};
use super::world::World;
use crate::config::ErrorPolicy;
use crate::error::{EcsError, Result};

struct Step {
    name: String,
    signature: Option<Signature>,
    system: Box<dyn System>,
}

/// Per-system timing recorded during the most recent tick.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub(crate) struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// A system that failed during a tick run under [`ErrorPolicy::Isolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FailedStep {
    pub system: String,
    pub error: EcsError,
}

/// Outcome of one [`Scheduler::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// 1-based number of this tick.
    pub tick: u64,
    /// Steps that ran, including failed ones.
    pub systems_run: usize,
    pub failures: Vec<FailedStep>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Holds the ordered system list of one scene.
pub struct Scheduler {
    steps: Vec<Step>,
    ticks: u64,
    #[cfg(feature = "diagnostics")]
    pub(crate) timings: Vec<SystemTiming>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            ticks: 0,
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Append an entity system. Its signature is derived from its `Query`
    /// and checked now, not at its first callback.
    pub fn register<S: EntitySystem>(&mut self, world: &mut World, system: S) -> Result<()> {
        let matched = Matched::new(system, world)?;
        let name = matched.name().to_string();
        let signature = matched.signature().clone();
        log::debug!(
            "registered system `{}` with {} component type(s) at position {}",
            name,
            signature.len(),
            self.steps.len()
        );
        self.steps.push(Step {
            name,
            signature: Some(signature),
            system: Box::new(matched),
        });
        Ok(())
    }

    /// Append a raw system that sees the whole world.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        let name = short_system_name(std::any::type_name::<S>());
        self.add_named(name, system);
    }

    /// Append a raw system under an explicit name.
    pub fn add_named<S: System + 'static>(&mut self, name: impl Into<String>, system: S) {
        let name = name.into();
        log::debug!("registered raw system `{}` at position {}", name, self.steps.len());
        self.steps.push(Step {
            name,
            signature: None,
            system: Box::new(system),
        });
    }

    /// Run every step once, in registration order.
    pub fn tick(&mut self, world: &mut World, dt: f32, policy: ErrorPolicy) -> Result<TickReport> {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        #[cfg(feature = "diagnostics")]
        self.timings.clear();

        for step in &mut self.steps {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            let outcome = step.system.run(world, dt);
            report.systems_run += 1;

            #[cfg(feature = "diagnostics")]
            {
                let duration_us = start.elapsed().as_secs_f64() * 1_000_000.0;
                log::trace!("system `{}` took {:.1}us", step.name, duration_us);
                self.timings.push(SystemTiming {
                    name: step.name.clone(),
                    duration_us,
                });
            }

            if let Err(error) = outcome {
                match policy {
                    ErrorPolicy::Abort => {
                        log::debug!(
                            "tick {} aborted in system `{}`: {}",
                            self.ticks,
                            step.name,
                            error
                        );
                        return Err(error);
                    }
                    ErrorPolicy::Isolate => {
                        log::warn!("system `{}` failed: {}", step.name, error);
                        report.failures.push(FailedStep {
                            system: step.name.clone(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(report)
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    /// Signature of the step at `index`; `None` for raw systems.
    pub fn signature(&self, index: usize) -> Option<&Signature> {
        self.steps.get(index)?.signature.as_ref()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Signature a query type would receive in `world`, without registering a
/// system. Useful for [`World::matching`].
pub fn signature_of<Q: ComponentSet>(world: &mut World) -> Result<Signature> {
    Q::signature(world.components_mut(), std::any::type_name::<Q>())
}
