use glam::{Mat4, Vec3};

/// Perspective camera orbiting a pivot point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub pivot: Vec3,
    pub up: Vec3,

    /// Vertical field of view in degrees.
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,

    /// Linear exposure multiplier applied by the tonemap pass.
    pub exposure: f32,
}

impl Camera {
    /// World-to-view matrix (left-handed, +Z into the screen).
    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position, self.pivot, self.up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            pivot: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
            z_near: 0.1,
            z_far: 1000.0,
            exposure: 1.0,
        }
    }
}
