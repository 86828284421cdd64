//! Perspective look-at camera and the per-frame uniforms shared by every pipeline.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Camera bound at group 0, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// World-space eye position (w unused).
    pub position: [f32; 4],
}

/// Linear fog bound at group 0, binding 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FogUniform {
    /// rgb = linear fog color, a = 1.0 when enabled.
    pub color: [f32; 4],
    /// x = start distance, y = full-fog distance.
    pub range: [f32; 4],
}

impl FogUniform {
    pub fn new(enabled: bool, color: [f32; 3], near: f32, far: f32) -> Self {
        Self {
            color: [color[0], color[1], color[2], if enabled { 1.0 } else { 0.0 }],
            range: [near, far, 0.0, 0.0],
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// A perspective camera looking from `position` at `target`.
///
/// Near and far are fixed at creation; the water shader reconstructs depth
/// against them, so they are not exposed for mutation.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near,
            far,
        }
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Update the aspect ratio after a viewport change.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Standard-Z perspective: near maps to 0.0, far to 1.0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 7.0, 10.0), Vec3::ZERO, 70.0, 0.1, 100.0)
    }
}
