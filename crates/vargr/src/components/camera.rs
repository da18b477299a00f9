//! Camera projection parameters and derived matrices.

use serde::{Deserialize, Serialize};

use crate::math::Mat4;

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// A camera. Matrices are filled in by
/// [`CameraSystem`](crate::systems::CameraSystem) from the entity's
/// resolved transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees (perspective only).
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Magnification. Narrows the perspective fov, shrinks the ortho volume.
    pub zoom: f32,
    pub projection: Projection,
    pub primary: bool,
    /// Static cameras compute their matrices once.
    pub is_static: bool,
    view: Mat4,
    projection_matrix: Mat4,
    view_projection: Mat4,
}

impl Camera {
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees,
            aspect,
            near,
            far,
            zoom: 1.0,
            projection: Projection::Perspective,
            primary: false,
            is_static: false,
            view: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        }
    }

    pub fn orthographic(aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic,
            ..Self::perspective(0.0, aspect, near, far)
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Projection matrix from the current parameters.
    pub fn compute_projection(&self) -> Mat4 {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov.to_radians() / zoom, self.aspect, self.near, self.far)
            }
            Projection::Orthographic => {
                let half_h = 1.0 / zoom;
                let half_w = self.aspect / zoom;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    /// Recompute every matrix for a camera placed at `world`.
    pub(crate) fn update(&mut self, world: Mat4) {
        self.view = world.inverse();
        self.projection_matrix = self.compute_projection();
        self.view_projection = self.projection_matrix * self.view;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn view_is_inverse_of_placement() {
        let mut cam = Camera::default();
        let placement = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
        cam.update(placement);
        let origin = cam.view().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
        assert!(cam.view_projection().abs_diff_eq(cam.projection_matrix() * cam.view(), 1e-6));
    }

    #[test]
    fn zoom_shrinks_ortho_volume() {
        let cam = Camera::orthographic(2.0, 0.1, 100.0).with_zoom(2.0);
        let p = cam.compute_projection();
        // half-width = aspect / zoom = 1.0, so x = 1 lands on the right edge.
        let edge = p.project_point3(Vec3::new(1.0, 0.5, -1.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        assert!((edge.y - 1.0).abs() < 1e-5);
    }
}
