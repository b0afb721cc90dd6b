use anyhow::Result;
use glam::Mat4;

use crate::device::{FrameBufferHandle, GpuService, UniformValue, ViewId};
use crate::scene::{Camera, Scene};

use super::renderer::{CoreHandles, RenderState};
use super::{RendererConfig, create_frame_buffer, normal_matrix, projection, scaled_view};

/// Pipeline variant plugged into a [`Renderer`](super::Renderer).
///
/// The renderer calls these at fixed points of its own lifecycle:
/// - `on_initialize` at the end of `Renderer::initialize`
/// - `on_reset` at the end of every `Renderer::reset`
/// - `on_render` between the per-frame state update and the tonemap blit
/// - `on_shutdown` first thing in `Renderer::shutdown`, while core resources
///   are still alive
///
/// Implementations bind the HDR framebuffer to their views, set view
/// transforms, and submit all scene geometry. Their views must come before
/// the blit view.
pub trait RenderPipeline {
    fn on_initialize(&mut self, ctx: &mut PipelineCtx<'_>) -> Result<()>;

    fn on_reset(&mut self, ctx: &mut PipelineCtx<'_>);

    fn on_render(&mut self, ctx: &mut PipelineCtx<'_>, dt: f32);

    fn on_shutdown(&mut self, ctx: &mut PipelineCtx<'_>);
}

/// What a pipeline hook can see and do.
///
/// By the time `on_render` runs, the size, scale, time and clear colour are
/// current for the frame.
pub struct PipelineCtx<'a> {
    pub gpu: &'a mut dyn GpuService,
    scene: Option<&'a Scene>,
    state: &'a mut RenderState,
    handles: &'a CoreHandles,
    config: &'a RendererConfig,
}

impl<'a> PipelineCtx<'a> {
    pub(super) fn new(
        gpu: &'a mut dyn GpuService,
        scene: Option<&'a Scene>,
        state: &'a mut RenderState,
        handles: &'a CoreHandles,
        config: &'a RendererConfig,
    ) -> Self {
        Self {
            gpu,
            scene,
            state,
            handles,
            config,
        }
    }

    /// Scene snapshot of the current frame. `None` outside of `on_render`.
    #[inline]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        self.config
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.state.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.state.height
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.state.time
    }

    #[inline]
    pub fn clear_color(&self) -> u32 {
        self.state.clear_color
    }

    #[inline]
    pub fn view_mat(&self) -> Mat4 {
        self.state.view_mat
    }

    #[inline]
    pub fn proj_mat(&self) -> Mat4 {
        self.state.proj_mat
    }

    /// The offscreen HDR framebuffer (may be invalid in degraded mode).
    #[inline]
    pub fn frame_buffer(&self) -> FrameBufferHandle {
        self.state.frame_buffer
    }

    /// Computes the scaled view and the projection for the current camera and
    /// display size, stores them, and applies them to `view`.
    pub fn set_view_projection(&mut self, view: ViewId) {
        let camera = self.scene.map(|s| s.camera).unwrap_or_else(Camera::default);
        let aspect = if self.state.height == 0 {
            1.0
        } else {
            f32::from(self.state.width) / f32::from(self.state.height)
        };

        self.state.view_mat = scaled_view(&camera, self.state.scale);
        self.state.proj_mat = projection(
            camera.fov,
            aspect,
            camera.z_near,
            camera.z_far,
            self.gpu.caps().homogeneous_depth,
        );
        self.gpu
            .set_view_transform(view, &self.state.view_mat, &self.state.proj_mat);
    }

    /// Uploads the normal matrix for `model` under the current view matrix.
    ///
    /// Assumes `model` has no non-uniform scale (see [`normal_matrix`]).
    pub fn set_normal_matrix(&mut self, model: Mat4) {
        let uniform = self.handles.normal_matrix_uniform;
        if !uniform.is_valid() {
            return;
        }
        let normal = normal_matrix(self.state.view_mat, model);
        self.gpu.set_uniform(uniform, UniformValue::Mat3(normal));
    }

    /// Creates an additional back-buffer-sized framebuffer owned by the caller.
    pub fn create_frame_buffer(&mut self, hdr: bool, depth: bool) -> FrameBufferHandle {
        create_frame_buffer(&mut *self.gpu, hdr, depth)
    }
}
