use bitflags::bitflags;

/// Graphics API implementation behind the GPU service.
///
/// The discriminants index fixed-size per-backend tables (see
/// [`crate::render::shader_dir`]), so `ALL` and `COUNT` must stay in sync with
/// the variant list.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RendererType {
    Noop,
    Direct3D9,
    Direct3D11,
    Direct3D12,
    Gnm,
    Metal,
    OpenGLES,
    OpenGL,
    Vulkan,
    WebGpu,
}

impl RendererType {
    pub const COUNT: usize = 10;

    pub const ALL: [RendererType; Self::COUNT] = [
        RendererType::Noop,
        RendererType::Direct3D9,
        RendererType::Direct3D11,
        RendererType::Direct3D12,
        RendererType::Gnm,
        RendererType::Metal,
        RendererType::OpenGLES,
        RendererType::OpenGL,
        RendererType::Vulkan,
        RendererType::WebGpu,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RendererType::Noop => "Noop",
            RendererType::Direct3D9 => "Direct3D 9",
            RendererType::Direct3D11 => "Direct3D 11",
            RendererType::Direct3D12 => "Direct3D 12",
            RendererType::Gnm => "GNM",
            RendererType::Metal => "Metal",
            RendererType::OpenGLES => "OpenGL ES",
            RendererType::OpenGL => "OpenGL",
            RendererType::Vulkan => "Vulkan",
            RendererType::WebGpu => "WebGPU",
        }
    }
}

/// Texture formats the core asks about.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    Bgra8,
    Rgba8,
    Rgba16F,
    D16,
    D24S8,
    D32,
}

impl TextureFormat {
    pub const COUNT: usize = 6;

    pub const ALL: [TextureFormat; Self::COUNT] = [
        TextureFormat::Bgra8,
        TextureFormat::Rgba8,
        TextureFormat::Rgba16F,
        TextureFormat::D16,
        TextureFormat::D24S8,
        TextureFormat::D32,
    ];

    #[inline]
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D16 | TextureFormat::D24S8 | TextureFormat::D32)
    }
}

bitflags! {
    /// Per-format support bits reported by the backend.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct FormatCaps: u16 {
        const TEXTURE_2D = 1 << 0;
        const TEXTURE_FRAMEBUFFER = 1 << 1;
        const TEXTURE_FRAMEBUFFER_MSAA = 1 << 2;
    }
}

/// Backend capabilities snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Caps {
    /// Active backend.
    pub renderer: RendererType,

    /// Texture V coordinate 0 is the bottom row (OpenGL convention).
    pub origin_bottom_left: bool,

    /// Clip-space depth is `[-1, 1]` instead of `[0, 1]`.
    pub homogeneous_depth: bool,

    formats: [FormatCaps; TextureFormat::COUNT],
}

impl Caps {
    /// Capabilities with no format support at all.
    pub fn new(renderer: RendererType) -> Self {
        Self {
            renderer,
            origin_bottom_left: false,
            homogeneous_depth: false,
            formats: [FormatCaps::empty(); TextureFormat::COUNT],
        }
    }

    /// Capabilities where every format supports every usage.
    pub fn permissive(renderer: RendererType) -> Self {
        Self {
            formats: [FormatCaps::all(); TextureFormat::COUNT],
            ..Self::new(renderer)
        }
    }

    pub fn with_format(mut self, format: TextureFormat, caps: FormatCaps) -> Self {
        self.set_format(format, caps);
        self
    }

    pub fn set_format(&mut self, format: TextureFormat, caps: FormatCaps) {
        self.formats[format as usize] = caps;
    }

    #[inline]
    pub fn format(&self, format: TextureFormat) -> FormatCaps {
        self.formats[format as usize]
    }

    /// Returns whether a 2D texture of `format` can be created with `flags`.
    ///
    /// Render-target flags require framebuffer support; everything else only
    /// needs plain 2D sampling support.
    pub fn texture_valid(&self, format: TextureFormat, flags: super::TextureFlags) -> bool {
        use super::TextureFlags;

        let required = if flags.intersects(TextureFlags::RT | TextureFlags::RT_WRITE_ONLY) {
            FormatCaps::TEXTURE_FRAMEBUFFER
        } else {
            FormatCaps::TEXTURE_2D
        };
        self.format(format).contains(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::TextureFlags;

    #[test]
    fn all_lists_every_renderer_in_index_order() {
        for (i, r) in RendererType::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
    }

    #[test]
    fn render_target_requires_framebuffer_support() {
        let caps = Caps::new(RendererType::Noop)
            .with_format(TextureFormat::Rgba16F, FormatCaps::TEXTURE_2D);

        assert!(caps.texture_valid(TextureFormat::Rgba16F, TextureFlags::U_CLAMP));
        assert!(!caps.texture_valid(TextureFormat::Rgba16F, TextureFlags::RT));
        assert!(!caps.texture_valid(TextureFormat::Rgba16F, TextureFlags::RT_WRITE_ONLY));
    }

    #[test]
    fn unknown_format_is_unsupported() {
        let caps = Caps::new(RendererType::Vulkan);
        assert!(!caps.texture_valid(TextureFormat::D16, TextureFlags::RT_WRITE_ONLY));
        assert_eq!(caps.format(TextureFormat::D16), FormatCaps::empty());
    }
}
