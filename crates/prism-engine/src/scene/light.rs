use glam::Vec3;

/// Omnidirectional light. Also used for spot lights, whose cone parameters are
/// owned by the light subsystem.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Radiant flux in watts per colour channel.
    pub flux: Vec3,
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            flux: Vec3::splat(100.0),
            radius: 10.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub irradiance: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            irradiance: Vec3::splat(0.03),
        }
    }
}
