use anyhow::Result;
use glam::Mat4;

use prism_engine::device::{ClearFlags, ViewId};
use prism_engine::render::{PipelineCtx, RenderPipeline};

/// The view the forward pass renders into the HDR framebuffer.
pub const FORWARD_VIEW: ViewId = 0;

/// Single-pass forward pipeline.
///
/// Geometry submission belongs to the mesh loader, which this viewer does not
/// ship; the pass only prepares the HDR target and the camera state so the
/// tonemap blit has something to read.
#[derive(Default)]
pub struct ForwardPipeline {
    frames: u64,
}

impl ForwardPipeline {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderPipeline for ForwardPipeline {
    fn on_initialize(&mut self, ctx: &mut PipelineCtx<'_>) -> Result<()> {
        anyhow::ensure!(
            FORWARD_VIEW < ctx.config().blit_view,
            "forward view must run before the blit view"
        );
        ctx.gpu.set_view_name(FORWARD_VIEW, "Forward render pass");
        Ok(())
    }

    fn on_reset(&mut self, ctx: &mut PipelineCtx<'_>) {
        let fb = ctx.frame_buffer();
        if !fb.is_valid() {
            log::warn!("forward pass has no HDR target; output will be empty");
        }
        let (width, height) = (ctx.width(), ctx.height());
        ctx.gpu.set_view_frame_buffer(FORWARD_VIEW, fb);
        ctx.gpu.set_view_rect(FORWARD_VIEW, 0, 0, width, height);
    }

    fn on_render(&mut self, ctx: &mut PipelineCtx<'_>, _dt: f32) {
        let clear = ctx.clear_color();
        ctx.gpu
            .set_view_clear(FORWARD_VIEW, ClearFlags::COLOR | ClearFlags::DEPTH, clear);
        ctx.set_view_projection(FORWARD_VIEW);
        ctx.set_normal_matrix(Mat4::IDENTITY);
        self.frames += 1;
    }

    fn on_shutdown(&mut self, _ctx: &mut PipelineCtx<'_>) {
        log::debug!("forward pipeline rendered {} frames", self.frames);
    }
}
