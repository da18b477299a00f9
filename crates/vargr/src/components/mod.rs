//! Built-in component types.

pub mod camera;
pub mod info;
pub mod material;
pub mod render;
pub mod transform;

pub use camera::{Camera, Projection};
pub use info::Info;
pub use material::{Material, MaterialHandle, MaterialLibrary};
pub use render::{BackendHandles, RenderData, StaticMesh, VertexAttribute};
pub use transform::Transform;

pub use crate::ecs::hierarchy::Link;
