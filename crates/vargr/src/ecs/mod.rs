//! # Sparse-Set ECS
//!
//! Entities are generational handles, each component type lives in its own
//! sparse set, and every entity slot carries a signature bitset so systems
//! can match entities without probing stores.
//!
//! ## Module Overview
//!
//! - [`entity`] — Generational entity handles and their allocator
//! - [`component`] — Component trait and dense type ids
//! - [`storage`] — One sparse-set store per component type
//! - [`signature`] — Component-type bitsets
//! - [`world`] — Central container (entities + stores + resources)
//! - [`query`] — Typed component sets with extract/restore
//! - [`system`] — Raw and entity systems, callback context
//! - [`commands`] — Structural changes deferred to the end of a step
//! - [`schedule`] — Ordered system steps and tick reports
//! - [`hierarchy`] — Parent links, scene graph, transform resolution

pub mod commands;
pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod query;
pub mod schedule;
pub mod signature;
pub mod storage;
pub mod system;
pub mod world;

pub use commands::Commands;
pub use component::{Component, ComponentId};
pub use entity::{Entity, EntityRegistry};
pub use hierarchy::{Link, SceneGraph, TransformResolver};
pub use query::ComponentSet;
pub use schedule::{FailedStep, Scheduler, TickReport};
pub use signature::Signature;
pub use storage::ComponentStore;
pub use system::{EntitySystem, Matched, System, SystemContext};
pub use world::{Bundle, World};
