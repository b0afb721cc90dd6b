use glam::{Vec3, Vec4};
use palette::{LinSrgb, Srgb};

/// Background used while no scene is loaded.
pub const NEUTRAL_CLEAR_COLOR: u32 = 0x3030_30ff;

/// Converts a display-space sky colour into the packed linear clear colour of
/// the HDR pass. Tonemapping expects linear input, so the conversion happens
/// before quantization. Alpha is always opaque.
pub fn clear_color_from_sky(sky: Vec4) -> u32 {
    let linear: LinSrgb<f32> = Srgb::new(sky.x, sky.y, sky.z).into_linear();
    pack_linear_rgb(Vec3::new(linear.red, linear.green, linear.blue))
}

/// Clamps to `[0, 1]`, rounds to 8 bits per channel and packs as `0xRRGGBBAA`
/// with `AA = 0xFF`.
pub fn pack_linear_rgb(linear: Vec3) -> u32 {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (quantize(linear.x) << 24) | (quantize(linear.y) << 16) | (quantize(linear.z) << 8) | 0xff
}
