//! GPU capability + resource service.
//!
//! This module is responsible for:
//! - describing backend capabilities (`Caps`, `RendererType`, format support)
//! - typed resource handles with an explicit invalid sentinel
//! - the `GpuService` contract consumed by the renderer core
//! - a headless recording implementation and a wgpu adapter probe

mod caps;
mod handle;
mod headless;
mod probe;
mod service;

pub use caps::{Caps, FormatCaps, RendererType, TextureFormat};
pub use handle::{
    FrameBufferHandle, ProgramHandle, Resource, ResourceKind, ShaderHandle, TextureHandle,
    UniformHandle, VertexBufferHandle,
};
pub use headless::{DrawCall, HeadlessConfig, HeadlessGpu, ViewState};
pub use probe::probe_caps;
pub use service::{
    Attrib, AttribType, BackbufferRatio, ClearFlags, GpuService, StateFlags, TextureFlags,
    UniformType, UniformValue, VertexLayout, ViewId,
};
