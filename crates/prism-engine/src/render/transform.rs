use std::f32::consts::SQRT_2;

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::scene::Camera;

/// World-to-view scale that fits the scene's bounding box inside the far plane.
///
/// The largest box dimension is normalized to one and the `sqrt(2)` margin
/// keeps the rotated box within `z_far`. Degenerate (zero or non-finite)
/// extents fall back to `1.0`.
pub fn scene_scale(min_bounds: Vec3, max_bounds: Vec3, z_far: f32) -> f32 {
    let extent = (max_bounds - min_bounds).abs().max_element();
    if !(extent > 0.0 && extent.is_finite()) {
        return 1.0;
    }
    1.0 / extent / SQRT_2 * z_far
}

/// Camera view matrix followed by a uniform scene scale.
pub fn scaled_view(camera: &Camera, scale: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(scale)) * camera.matrix()
}

/// Left-handed perspective projection.
///
/// `fov_y` is in degrees. With `homogeneous_depth` the near/far planes map to
/// clip depth `-1`/`1` (OpenGL); otherwise to `0`/`1`.
pub fn projection(fov_y: f32, aspect: f32, z_near: f32, z_far: f32, homogeneous_depth: bool) -> Mat4 {
    let height = 1.0 / (fov_y.to_radians() * 0.5).tan();
    let width = height / aspect;
    let diff = z_far - z_near;

    let (aa, bb) = if homogeneous_depth {
        ((z_far + z_near) / diff, 2.0 * z_far * z_near / diff)
    } else {
        let aa = z_far / diff;
        (aa, z_near * aa)
    };

    Mat4::from_cols(
        Vec4::new(width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, height, 0.0, 0.0),
        Vec4::new(0.0, 0.0, aa, 1.0),
        Vec4::new(0.0, 0.0, -bb, 0.0),
    )
}

/// Upper 3x3 of `view * model`.
///
/// Only correct without non-uniform scaling in `model`: this is not the
/// inverse-transpose.
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip_depth(proj: Mat4, z: f32) -> f32 {
        let p = proj * Vec4::new(0.0, 0.0, z, 1.0);
        p.z / p.w
    }

    #[test]
    fn unit_cube_at_far_100() {
        let s = scene_scale(Vec3::splat(-1.0), Vec3::splat(1.0), 100.0);
        assert!((s - 35.355_34).abs() < 1e-3, "scale = {s}");
    }

    #[test]
    fn scale_shrinks_as_extent_grows() {
        let mut previous = f32::INFINITY;
        for extent in [0.01, 0.5, 1.0, 10.0, 250.0, 1.0e5] {
            let s = scene_scale(Vec3::ZERO, Vec3::new(extent, extent * 0.5, 0.1), 1000.0);
            assert!(s > 0.0);
            assert!(s < previous);
            previous = s;
        }
    }

    #[test]
    fn largest_axis_drives_scale() {
        let a = scene_scale(Vec3::ZERO, Vec3::new(4.0, 1.0, 1.0), 10.0);
        let b = scene_scale(Vec3::ZERO, Vec3::new(1.0, 1.0, 4.0), 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn inverted_bounds_use_absolute_extent() {
        let a = scene_scale(Vec3::splat(1.0), Vec3::splat(-1.0), 100.0);
        let b = scene_scale(Vec3::splat(-1.0), Vec3::splat(1.0), 100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_bounds_fall_back_to_one() {
        assert_eq!(scene_scale(Vec3::ONE, Vec3::ONE, 100.0), 1.0);
        assert_eq!(scene_scale(Vec3::ZERO, Vec3::splat(f32::NAN), 100.0), 1.0);
    }

    #[test]
    fn zero_to_one_depth_matches_glam() {
        let ours = projection(60.0, 16.0 / 9.0, 0.1, 100.0, false);
        let glam = Mat4::perspective_lh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert!(ours.abs_diff_eq(glam, 1e-5));
    }

    #[test]
    fn depth_range_follows_backend_convention() {
        let d3d = projection(45.0, 1.0, 0.5, 50.0, false);
        assert!(clip_depth(d3d, 0.5).abs() < 1e-5);
        assert!((clip_depth(d3d, 50.0) - 1.0).abs() < 1e-5);

        let gl = projection(45.0, 1.0, 0.5, 50.0, true);
        assert!((clip_depth(gl, 0.5) + 1.0).abs() < 1e-5);
        assert!((clip_depth(gl, 50.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn scaled_view_scales_view_space_distance() {
        let camera = Camera::default();
        let unscaled = scaled_view(&camera, 1.0).transform_point3(camera.pivot);
        let scaled = scaled_view(&camera, 3.0).transform_point3(camera.pivot);
        assert!((scaled.z - unscaled.z * 3.0).abs() < 1e-4);
    }

    #[test]
    fn normal_matrix_is_upper_3x3() {
        let view = Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0));
        let model = Mat4::from_rotation_y(0.5);
        let n = normal_matrix(view, model);
        assert!(n.abs_diff_eq(Mat3::from_rotation_y(0.5), 1e-6));
    }
}
