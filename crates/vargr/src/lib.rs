//! # Vargr — Sparse-Set ECS Runtime
//!
//! Entities with generational handles, one typed store per component type,
//! systems ticked in registration order, and a parent/child transform
//! hierarchy resolved into world matrices every tick.
//!
//! Start with `use vargr::prelude::*`, build a [`Scene`](scene::Scene), and
//! hand it to a [`SceneManager`](scene_manager::SceneManager).
//!
//! Rendering, windowing and asset loading live outside this crate. They
//! consume [`RenderData`](components::RenderData), [`Camera`](components::Camera)
//! matrices and resolved [`Transform`](components::Transform)s.

pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod scene_manager;
pub mod systems;
pub mod time;

#[cfg(feature = "diagnostics")]
pub mod diag;
