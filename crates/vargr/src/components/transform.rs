//! Local placement of an entity and its resolved matrices.

use serde::{Deserialize, Serialize};

use crate::math::{compose_trs, euler_degrees_to_quat, Mat4, Quat, Vec3};

/// Translation, Euler rotation (degrees) and scale, plus the matrices the
/// [`TransformResolver`](crate::ecs::hierarchy::TransformResolver) derives
/// from them.
///
/// Every setter marks the transform dirty. The derived matrices are only
/// trustworthy after a resolver pass in the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3,
    scale: Vec3,
    #[serde(skip)]
    orientation: Quat,
    #[serde(skip)]
    local: Mat4,
    #[serde(skip)]
    world: Mat4,
    /// Parent world matrix the current `world` was composed with.
    #[serde(skip)]
    parent_world: Mat4,
    #[serde(skip, default = "dirty")]
    dirty: bool,
    #[serde(default)]
    is_static: bool,
}

fn dirty() -> bool {
    true
}

impl Transform {
    pub fn new(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: rotation_degrees,
            scale,
            orientation: Quat::IDENTITY,
            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            parent_world: Mat4::IDENTITY,
            dirty: true,
            is_static: false,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Vec3::ZERO, Vec3::ONE)
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    /// Builder: rotation in degrees, intrinsic XYZ.
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.set_rotation(degrees);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder: flag the transform as never moving after setup.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Euler angles in degrees.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = degrees;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Move by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.set_translation(self.translation + delta);
    }

    /// Add `delta` degrees to each Euler angle.
    pub fn rotate(&mut self, delta: Vec3) {
        self.set_rotation(self.rotation + delta);
    }

    /// Force recomputation on the next resolver pass.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hint for renderers that this entity never moves after setup.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Orientation derived from the Euler angles at the last resolve.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// World-space position at the last resolve.
    pub fn world_translation(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    pub(crate) fn parent_world(&self) -> Mat4 {
        self.parent_world
    }

    /// Rebuild orientation and local matrix from translation/rotation/scale.
    pub(crate) fn recompute_local(&mut self) {
        self.orientation = euler_degrees_to_quat(self.rotation);
        self.local = compose_trs(self.translation, self.orientation, self.scale);
    }

    /// Compose the world matrix under `parent_world` and clear the dirty flag.
    pub(crate) fn compose(&mut self, parent_world: Mat4) {
        self.world = parent_world * self.local;
        self.parent_world = parent_world;
        self.dirty = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}
