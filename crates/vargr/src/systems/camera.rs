use crate::components::{Camera, Transform};
use crate::ecs::{Entity, EntitySystem, SystemContext};
use crate::error::Result;

/// Derives view and projection matrices for every camera with a transform.
///
/// Reads world matrices, so it must run after the transform resolver.
#[derive(Debug, Default)]
pub struct CameraSystem;

impl EntitySystem for CameraSystem {
    type Query = (&'static Transform, &'static mut Camera);

    fn on_create(
        &mut self,
        _ctx: &mut SystemContext<'_>,
        _entity: Entity,
        (transform, camera): (&Transform, &mut Camera),
    ) -> Result<()> {
        camera.update(transform.world_matrix());
        Ok(())
    }

    fn on_update(
        &mut self,
        _ctx: &mut SystemContext<'_>,
        _entity: Entity,
        (transform, camera): (&Transform, &mut Camera),
    ) -> Result<()> {
        if !camera.is_static {
            camera.update(transform.world_matrix());
        }
        Ok(())
    }
}
