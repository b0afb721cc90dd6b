use anyhow::{Context, Result};

use super::{Caps, FormatCaps, RendererType, TextureFormat};

/// Queries the machine's GPU adapter and builds a [`Caps`] snapshot from it.
///
/// All backends are considered and no surface is needed. Blocks on adapter
/// acquisition via `pollster`.
///
/// wgpu presents a top-left texture origin and `[0, 1]` clip depth on every
/// backend, so those two flags are always `false` here regardless of the
/// native API underneath.
pub fn probe_caps() -> Result<Caps> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .context("failed to find a suitable GPU adapter")?;

    let info = adapter.get_info();
    let mut caps = Caps::new(renderer_type(info.backend));

    for format in TextureFormat::ALL {
        let features = adapter.get_texture_format_features(wgpu_format(format));
        caps.set_format(format, format_caps(&features));
    }

    log::info!(
        "probed adapter \"{}\" ({})",
        info.name,
        caps.renderer.name()
    );
    log::debug!("RGBA16F support: {:?}", caps.format(TextureFormat::Rgba16F));

    Ok(caps)
}

fn renderer_type(backend: wgpu::Backend) -> RendererType {
    match backend {
        wgpu::Backend::Vulkan => RendererType::Vulkan,
        wgpu::Backend::Metal => RendererType::Metal,
        wgpu::Backend::Dx12 => RendererType::Direct3D12,
        wgpu::Backend::Gl => RendererType::OpenGL,
        wgpu::Backend::BrowserWebGpu => RendererType::WebGpu,
        _ => RendererType::Noop,
    }
}

fn wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
        TextureFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba16F => wgpu::TextureFormat::Rgba16Float,
        TextureFormat::D16 => wgpu::TextureFormat::Depth16Unorm,
        TextureFormat::D24S8 => wgpu::TextureFormat::Depth24PlusStencil8,
        TextureFormat::D32 => wgpu::TextureFormat::Depth32Float,
    }
}

fn format_caps(features: &wgpu::TextureFormatFeatures) -> FormatCaps {
    let mut caps = FormatCaps::empty();
    if features
        .allowed_usages
        .contains(wgpu::TextureUsages::TEXTURE_BINDING)
    {
        caps |= FormatCaps::TEXTURE_2D;
    }
    if features
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    {
        caps |= FormatCaps::TEXTURE_FRAMEBUFFER;
        if features
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_X4)
        {
            caps |= FormatCaps::TEXTURE_FRAMEBUFFER_MSAA;
        }
    }
    caps
}
