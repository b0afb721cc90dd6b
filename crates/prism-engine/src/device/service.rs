use bitflags::bitflags;
use glam::{Mat3, Mat4};

use super::{
    Caps, FrameBufferHandle, ProgramHandle, Resource, ShaderHandle, TextureFormat, TextureHandle,
    UniformHandle, VertexBufferHandle,
};

/// Render pass index. Passes execute in ascending order within a frame.
pub type ViewId = u16;

bitflags! {
    /// Texture creation + sampler flags.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct TextureFlags: u32 {
        /// Render target that can also be sampled.
        const RT = 1 << 0;
        /// Render target that is never sampled (depth buffers).
        const RT_WRITE_ONLY = 1 << 1;
        const U_CLAMP = 1 << 2;
        const V_CLAMP = 1 << 3;
    }
}

bitflags! {
    /// Which attachments a view clears before its first draw.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

bitflags! {
    /// Per-draw pipeline state.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct StateFlags: u32 {
        const WRITE_R = 1 << 0;
        const WRITE_G = 1 << 1;
        const WRITE_B = 1 << 2;
        const WRITE_A = 1 << 3;
        const WRITE_Z = 1 << 4;
        const DEPTH_TEST_LESS = 1 << 5;
        const CULL_CW = 1 << 6;

        const WRITE_RGB = Self::WRITE_R.bits() | Self::WRITE_G.bits() | Self::WRITE_B.bits();
    }
}

/// Texture size relative to the back buffer.
///
/// Relative textures follow back-buffer resizes without being recreated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BackbufferRatio {
    Equal,
    Half,
    Quarter,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    Sampler,
    Vec4,
    Mat3,
    Mat4,
}

/// Value uploaded with [`GpuService::set_uniform`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Vec4([f32; 4]),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat3(_) => UniformType::Mat3,
            UniformValue::Mat4(_) => UniformType::Mat4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Attrib {
    Position,
    Normal,
    TexCoord0,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttribType {
    Float,
    Uint8,
}

impl AttribType {
    fn size(self) -> u16 {
        match self {
            AttribType::Float => 4,
            AttribType::Uint8 => 1,
        }
    }
}

/// Interleaved vertex layout description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<(Attrib, u8, AttribType)>,
    stride: u16,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `count` components of `ty` for `attrib`.
    pub fn add(mut self, attrib: Attrib, count: u8, ty: AttribType) -> Self {
        self.stride += u16::from(count) * ty.size();
        self.attributes.push((attrib, count, ty));
        self
    }

    #[inline]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    pub fn has(&self, attrib: Attrib) -> bool {
        self.attributes.iter().any(|(a, _, _)| *a == attrib)
    }
}

/// Capability-queryable GPU command submission service.
///
/// Creation calls never fail loudly: they hand back the type's `INVALID`
/// sentinel, and callers are expected to check `is_valid()` before use.
/// `destroy` must accept invalid handles as a no-op.
///
/// Draw state (`set_state`, `set_texture`, `set_uniform`, `set_vertex_buffer`)
/// accumulates until the next `submit`, which consumes it.
pub trait GpuService {
    fn caps(&self) -> &Caps;

    /// Format-support pre-flight for a 2D texture.
    fn is_texture_valid(&self, format: TextureFormat, flags: TextureFlags) -> bool {
        self.caps().texture_valid(format, flags)
    }

    fn create_uniform(&mut self, name: &str, ty: UniformType) -> UniformHandle;

    fn create_vertex_buffer(&mut self, data: &[u8], layout: &VertexLayout) -> VertexBufferHandle;

    fn create_texture_2d(
        &mut self,
        ratio: BackbufferRatio,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> TextureHandle;

    /// Groups `attachments` into a framebuffer. With `destroy_textures`, the
    /// framebuffer takes ownership and destroys them along with itself.
    fn create_frame_buffer(
        &mut self,
        attachments: &[TextureHandle],
        destroy_textures: bool,
    ) -> FrameBufferHandle;

    fn create_shader(&mut self, code: &[u8]) -> ShaderHandle;

    fn create_program(
        &mut self,
        vs: ShaderHandle,
        fs: ShaderHandle,
        destroy_shaders: bool,
    ) -> ProgramHandle;

    /// Returns attachment `index` of `fb`, or the invalid handle.
    fn frame_buffer_texture(&self, fb: FrameBufferHandle, index: u8) -> TextureHandle;

    fn destroy(&mut self, resource: Resource);

    fn set_view_name(&mut self, view: ViewId, name: &str);

    fn set_view_clear(&mut self, view: ViewId, flags: ClearFlags, rgba: u32);

    fn set_view_rect(&mut self, view: ViewId, x: u16, y: u16, width: u16, height: u16);

    /// Binds `fb` as the render target of `view`; the invalid handle selects
    /// the display back buffer.
    fn set_view_frame_buffer(&mut self, view: ViewId, fb: FrameBufferHandle);

    fn set_view_transform(&mut self, view: ViewId, view_mat: &Mat4, proj_mat: &Mat4);

    fn set_state(&mut self, state: StateFlags);

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle);

    fn set_uniform(&mut self, uniform: UniformHandle, value: UniformValue);

    fn set_vertex_buffer(&mut self, stream: u8, vb: VertexBufferHandle);

    fn submit(&mut self, view: ViewId, program: ProgramHandle);

    /// Ends the frame and returns the number of the frame just finished.
    fn frame(&mut self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_stride_sums_components() {
        let layout = VertexLayout::new()
            .add(Attrib::Position, 3, AttribType::Float)
            .add(Attrib::TexCoord0, 2, AttribType::Float);

        assert_eq!(layout.stride(), 20);
        assert!(layout.has(Attrib::TexCoord0));
        assert!(!layout.has(Attrib::Normal));
    }

    #[test]
    fn write_rgb_excludes_alpha_and_depth() {
        assert!(StateFlags::WRITE_RGB.contains(StateFlags::WRITE_G));
        assert!(!StateFlags::WRITE_RGB.contains(StateFlags::WRITE_A));
        assert!(!StateFlags::WRITE_RGB.contains(StateFlags::WRITE_Z));
    }
}
