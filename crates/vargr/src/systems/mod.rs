//! Built-in entity systems.

mod camera;
mod material;

pub use camera::CameraSystem;
pub use material::MaterialBindingSystem;
