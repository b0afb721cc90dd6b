//! Read-only scene snapshot consumed by the renderer once per frame.
//!
//! Loading (meshes, materials, cameras from asset files) lives outside this
//! crate; loaders fill these structs and flip `loaded`.

mod camera;
mod light;

pub use camera::Camera;
pub use light::{DirectionalLight, PointLight};

use glam::{Vec3, Vec4};

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub loaded: bool,

    /// Axis-aligned bounds of all loaded geometry, in world units.
    pub min_bounds: Vec3,
    pub max_bounds: Vec3,

    pub camera: Camera,

    /// Background colour in sRGB (display) space. Alpha is ignored.
    pub sky_color: Vec4,

    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<PointLight>,
    pub ambient_light: DirectionalLight,

    /// Set once `include_point` has seen a point.
    bounds_valid: bool,
}

impl Scene {
    /// Empty, not-yet-loaded scene.
    pub fn new() -> Self {
        Self {
            loaded: false,
            min_bounds: Vec3::ZERO,
            max_bounds: Vec3::ZERO,
            camera: Camera::default(),
            sky_color: Vec4::new(0.53, 0.81, 0.92, 1.0),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            ambient_light: DirectionalLight::default(),
            bounds_valid: false,
        }
    }

    /// Grows the bounds to include `point`.
    ///
    /// The first included point replaces the initial zero bounds.
    pub fn include_point(&mut self, point: Vec3) {
        if self.bounds_valid {
            self.min_bounds = self.min_bounds.min(point);
            self.max_bounds = self.max_bounds.max(point);
        } else {
            self.min_bounds = point;
            self.max_bounds = point;
            self.bounds_valid = true;
        }
    }

    /// Size of the bounding box along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        (self.max_bounds - self.min_bounds).abs()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_point_grows_bounds() {
        let mut scene = Scene::new();
        scene.include_point(Vec3::new(1.0, 2.0, 3.0));
        scene.include_point(Vec3::new(-1.0, 0.0, 5.0));

        assert_eq!(scene.min_bounds, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(scene.max_bounds, Vec3::new(1.0, 2.0, 5.0));
        assert_eq!(scene.extent(), Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn origin_counts_as_a_bounds_point() {
        let mut scene = Scene::new();
        scene.include_point(Vec3::ZERO);
        scene.include_point(Vec3::splat(2.0));

        assert_eq!(scene.min_bounds, Vec3::ZERO);
        assert_eq!(scene.max_bounds, Vec3::splat(2.0));
    }

    #[test]
    fn first_point_replaces_initial_bounds() {
        let mut scene = Scene::new();
        scene.include_point(Vec3::splat(3.0));
        scene.include_point(Vec3::splat(4.0));

        assert_eq!(scene.min_bounds, Vec3::splat(3.0));
        assert_eq!(scene.extent(), Vec3::ONE);
    }
}
