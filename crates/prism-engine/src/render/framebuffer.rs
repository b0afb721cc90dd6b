use crate::device::{
    BackbufferRatio, FrameBufferHandle, GpuService, TextureFlags, TextureFormat, TextureHandle,
};

/// Creates a back-buffer-sized framebuffer with a colour attachment and,
/// optionally, a depth attachment.
///
/// - colour: RGBA16F when `hdr`, else BGRA8, sampled with clamping
/// - depth: the first of D16, D24S8 the backend supports, else D32
///
/// Returns the invalid handle (with a warning) when the colour format is
/// unsupported or the backend refuses the framebuffer. Attachments created on
/// the way are released in that case.
pub fn create_frame_buffer(gpu: &mut dyn GpuService, hdr: bool, depth: bool) -> FrameBufferHandle {
    let color_flags = TextureFlags::RT | TextureFlags::U_CLAMP | TextureFlags::V_CLAMP;
    let color_format = if hdr {
        TextureFormat::Rgba16F
    } else {
        TextureFormat::Bgra8
    };

    if !gpu.is_texture_valid(color_format, color_flags) {
        log::warn!("colour format {color_format:?} cannot be used as a render target");
        return FrameBufferHandle::INVALID;
    }

    let mut attachments: Vec<TextureHandle> = Vec::with_capacity(2);
    attachments.push(gpu.create_texture_2d(BackbufferRatio::Equal, color_format, color_flags));

    if depth {
        let depth_flags = TextureFlags::RT_WRITE_ONLY;
        let depth_format = [TextureFormat::D16, TextureFormat::D24S8]
            .into_iter()
            .find(|f| gpu.is_texture_valid(*f, depth_flags))
            .unwrap_or(TextureFormat::D32);
        attachments.push(gpu.create_texture_2d(BackbufferRatio::Equal, depth_format, depth_flags));
    }

    let fb = if attachments.iter().all(|t| t.is_valid()) {
        gpu.create_frame_buffer(&attachments, true)
    } else {
        FrameBufferHandle::INVALID
    };

    if !fb.is_valid() {
        log::warn!("failed to create framebuffer");
        for texture in attachments.into_iter().filter(|t| t.is_valid()) {
            gpu.destroy(texture.into());
        }
    }

    fb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Caps, FormatCaps, HeadlessConfig, HeadlessGpu, RendererType, ResourceKind};

    fn caps_without(format: TextureFormat) -> Caps {
        let mut caps = Caps::permissive(RendererType::Noop);
        caps.set_format(format, FormatCaps::TEXTURE_2D);
        caps
    }

    #[test]
    fn hdr_with_depth_prefers_d16() {
        let mut gpu = HeadlessGpu::default();
        let fb = create_frame_buffer(&mut gpu, true, true);

        let attachments = gpu.frame_buffer_attachments(fb);
        assert_eq!(attachments.len(), 2);
        assert_eq!(gpu.texture_format(attachments[0]), Some(TextureFormat::Rgba16F));
        assert_eq!(gpu.texture_format(attachments[1]), Some(TextureFormat::D16));
    }

    #[test]
    fn depth_falls_back_to_d24s8() {
        let mut gpu = HeadlessGpu::with_caps(caps_without(TextureFormat::D16));
        let fb = create_frame_buffer(&mut gpu, true, true);
        let depth = gpu.frame_buffer_texture(fb, 1);
        assert_eq!(gpu.texture_format(depth), Some(TextureFormat::D24S8));
    }

    #[test]
    fn ldr_without_depth_has_single_bgra8_attachment() {
        let mut gpu = HeadlessGpu::default();
        let fb = create_frame_buffer(&mut gpu, false, false);
        let attachments = gpu.frame_buffer_attachments(fb);
        assert_eq!(attachments.len(), 1);
        assert_eq!(gpu.texture_format(attachments[0]), Some(TextureFormat::Bgra8));
    }

    #[test]
    fn unsupported_colour_format_yields_invalid() {
        let mut gpu = HeadlessGpu::with_caps(caps_without(TextureFormat::Rgba16F));
        assert!(!create_frame_buffer(&mut gpu, true, true).is_valid());
        assert_eq!(gpu.live_count(ResourceKind::Texture), 0);
    }

    #[test]
    fn rejected_frame_buffer_releases_attachments() {
        let mut gpu = HeadlessGpu::new(HeadlessConfig {
            reject_frame_buffers: true,
            ..HeadlessConfig::default()
        });
        assert!(!create_frame_buffer(&mut gpu, true, true).is_valid());
        assert_eq!(gpu.created_count(ResourceKind::Texture), 2);
        assert_eq!(gpu.live_count(ResourceKind::Texture), 0);
    }
}
