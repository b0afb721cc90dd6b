//! Typed GPU resource handles.
//!
//! Every handle is a `u16` index with `u16::MAX` reserved as the invalid
//! sentinel. Creation calls return the sentinel on failure instead of an error.

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(u16);

        impl $name {
            pub const INVALID: Self = Self(u16::MAX);

            #[inline]
            pub const fn from_index(index: u16) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> u16 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u16::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<$name> for Resource {
            fn from(handle: $name) -> Self {
                Resource::$kind(handle)
            }
        }
    };
}

gpu_handle!(
    /// 2D texture (sampled or render-target attachment).
    TextureHandle => Texture
);
gpu_handle!(
    /// Framebuffer grouping colour/depth attachments.
    FrameBufferHandle => FrameBuffer
);
gpu_handle!(
    /// Static vertex buffer.
    VertexBufferHandle => VertexBuffer
);
gpu_handle!(
    /// Single compiled shader stage.
    ShaderHandle => Shader
);
gpu_handle!(
    /// Linked vertex + fragment program.
    ProgramHandle => Program
);
gpu_handle!(
    /// Named shader uniform (including samplers).
    UniformHandle => Uniform
);

/// Any destroyable resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Resource {
    Texture(TextureHandle),
    FrameBuffer(FrameBufferHandle),
    VertexBuffer(VertexBufferHandle),
    Shader(ShaderHandle),
    Program(ProgramHandle),
    Uniform(UniformHandle),
}

/// Resource category, used for bookkeeping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Texture,
    FrameBuffer,
    VertexBuffer,
    Shader,
    Program,
    Uniform,
}

impl Resource {
    pub fn kind(self) -> ResourceKind {
        match self {
            Resource::Texture(_) => ResourceKind::Texture,
            Resource::FrameBuffer(_) => ResourceKind::FrameBuffer,
            Resource::VertexBuffer(_) => ResourceKind::VertexBuffer,
            Resource::Shader(_) => ResourceKind::Shader,
            Resource::Program(_) => ResourceKind::Program,
            Resource::Uniform(_) => ResourceKind::Uniform,
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            Resource::Texture(h) => h.is_valid(),
            Resource::FrameBuffer(h) => h.is_valid(),
            Resource::VertexBuffer(h) => h.is_valid(),
            Resource::Shader(h) => h.is_valid(),
            Resource::Program(h) => h.is_valid(),
            Resource::Uniform(h) => h.is_valid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_invalid() {
        assert!(!TextureHandle::default().is_valid());
        assert!(!FrameBufferHandle::default().is_valid());
        assert_eq!(ProgramHandle::default(), ProgramHandle::INVALID);
    }

    #[test]
    fn index_zero_is_valid() {
        assert!(UniformHandle::from_index(0).is_valid());
    }

    #[test]
    fn resource_keeps_kind_and_validity() {
        let r: Resource = VertexBufferHandle::from_index(3).into();
        assert_eq!(r.kind(), ResourceKind::VertexBuffer);
        assert!(r.is_valid());

        let r: Resource = ShaderHandle::INVALID.into();
        assert_eq!(r.kind(), ResourceKind::Shader);
        assert!(!r.is_valid());
    }
}
