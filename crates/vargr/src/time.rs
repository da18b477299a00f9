//! Tick timing.
//!
//! The [`Time`] resource is updated by [`Scene::tick`](crate::scene::Scene::tick)
//! from the delta the caller passes in. The runtime never reads a clock of
//! its own, so replaying the same deltas replays the same simulation.

/// Tick timing resource. Inserted by every scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds covered by the current tick.
    delta: f32,
    /// Sum of every delta so far.
    elapsed: f64,
    /// Ticks started so far.
    tick_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called at the start of each tick.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.delta = dt;
        self.elapsed += f64::from(dt);
        self.tick_count += 1;
    }

    /// Delta time in seconds.
    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    /// Total simulated time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
