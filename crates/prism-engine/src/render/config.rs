use std::path::PathBuf;

use crate::device::ViewId;

use super::NEUTRAL_CLEAR_COLOR;

/// Renderer core configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Directory containing `shaders/<backend>/`.
    pub asset_root: PathBuf,

    /// View that performs the tonemap blit. Must be greater than every view
    /// the pipeline renders HDR content into.
    pub blit_view: ViewId,

    /// Use an RGBA16F colour attachment instead of BGRA8.
    pub hdr: bool,

    /// Give the offscreen framebuffer a depth attachment.
    pub depth: bool,

    /// Clear colour used while no scene is loaded (packed RGBA8).
    pub neutral_clear_color: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            blit_view: 199,
            hdr: true,
            depth: true,
            neutral_clear_color: NEUTRAL_CLEAR_COLOR,
        }
    }
}
