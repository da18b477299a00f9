//! Convenience re-exports — `use vargr::prelude::*` for the common items.

pub use crate::components::{
    BackendHandles, Camera, Info, Link, Material, MaterialHandle, MaterialLibrary, Projection,
    RenderData, StaticMesh, Transform, VertexAttribute,
};
pub use crate::config::{ErrorPolicy, SceneConfig};
pub use crate::ecs::{
    Commands, Entity, EntitySystem, SceneGraph, Scheduler, System, SystemContext, TickReport,
    TransformResolver, World,
};
pub use crate::error::{EcsError, Result};
pub use crate::math::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use crate::scene::{Plugin, Scene, TransformPlugin};
pub use crate::scene_manager::SceneManager;
pub use crate::systems::{CameraSystem, MaterialBindingSystem};
pub use crate::time::Time;
#[cfg(feature = "diagnostics")]
pub use crate::diag::SceneDiagnostics;
