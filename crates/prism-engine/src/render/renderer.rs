use anyhow::{Context, Result};
use glam::Mat4;

use crate::device::{
    Caps, ClearFlags, FormatCaps, FrameBufferHandle, GpuService, ProgramHandle, Resource,
    StateFlags, TextureFormat, TextureHandle, UniformHandle, UniformType, UniformValue,
    VertexBufferHandle, VertexLayout, ViewId,
};
use crate::scene::Scene;
use crate::shading::ShadingSubsystem;

use super::pipeline::{PipelineCtx, RenderPipeline};
use super::{
    PosTexCoord0Vertex, RendererConfig, UNKNOWN_SHADER_DIR, clear_color_from_sky,
    create_frame_buffer, load_program, scene_scale, screen_quad, shader_dir,
};

/// Per-frame state maintained by the core and read by pipeline hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Display size in pixels, as of the last `reset`.
    pub width: u16,
    pub height: u16,

    /// World-to-view uniform scale, recomputed every frame.
    pub scale: f32,

    /// Seconds accumulated over all rendered frames.
    pub time: f32,

    /// Packed RGBA8 clear colour for the HDR pass.
    pub clear_color: u32,

    pub view_mat: Mat4,
    pub proj_mat: Mat4,

    /// Offscreen HDR target. Lives from the first `reset` to `shutdown`.
    pub frame_buffer: FrameBufferHandle,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
            time: 0.0,
            clear_color: 0,
            view_mat: Mat4::IDENTITY,
            proj_mat: Mat4::IDENTITY,
            frame_buffer: FrameBufferHandle::INVALID,
        }
    }
}

/// Core-owned GPU resources besides the framebuffer.
#[derive(Debug, Default)]
pub(crate) struct CoreHandles {
    pub(crate) blit_program: ProgramHandle,
    pub(crate) blit_sampler: UniformHandle,
    pub(crate) normal_matrix_uniform: UniformHandle,
    pub(crate) exposure_vec_uniform: UniformHandle,
    pub(crate) scene_scale_vec_uniform: UniformHandle,
    pub(crate) quad_vb: VertexBufferHandle,
}

/// Destroys `handle` if it is valid. Invalid handles never reach the device.
fn release(gpu: &mut dyn GpuService, handle: impl Into<Resource>) {
    let resource = handle.into();
    if resource.is_valid() {
        gpu.destroy(resource);
    }
}

/// HDR render-pipeline core.
///
/// Lifecycle (single-threaded, driven by the host):
/// `initialize` → `reset`* → (`render` | `reset`)* → `shutdown`.
///
/// The pipeline variant is borrowed for the renderer's lifetime; shading
/// subsystems are owned and initialized in registration order.
pub struct Renderer<'p> {
    config: RendererConfig,
    pipeline: &'p mut dyn RenderPipeline,
    subsystems: Vec<Box<dyn ShadingSubsystem>>,

    state: RenderState,
    handles: CoreHandles,

    /// Registered once per renderer on first `initialize`.
    blit_layout: Option<VertexLayout>,

    warned_blit_skipped: bool,
}

impl<'p> Renderer<'p> {
    pub fn new(config: RendererConfig, pipeline: &'p mut dyn RenderPipeline) -> Self {
        Self {
            config,
            pipeline,
            subsystems: Vec::new(),
            state: RenderState::default(),
            handles: CoreHandles::default(),
            blit_layout: None,
            warned_blit_skipped: false,
        }
    }

    /// Registers a shading subsystem. Must be called before `initialize`.
    pub fn with_subsystem(mut self, subsystem: Box<dyn ShadingSubsystem>) -> Self {
        self.subsystems.push(subsystem);
        self
    }

    /// Whether the backend can run this renderer at all: RGBA16F must be
    /// usable as a multisampled render target. Hosts should refuse to start
    /// otherwise.
    pub fn supported(caps: &Caps) -> bool {
        caps.format(TextureFormat::Rgba16F)
            .contains(FormatCaps::TEXTURE_FRAMEBUFFER_MSAA)
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[inline]
    pub fn frame_buffer(&self) -> FrameBufferHandle {
        self.state.frame_buffer
    }

    /// Creates the blit resources, loads the tonemap program, initializes
    /// subsystems, then hands over to `on_initialize`.
    ///
    /// Shader loading failures are returned; the caller should treat them as
    /// fatal.
    pub fn initialize(&mut self, gpu: &mut dyn GpuService) -> Result<()> {
        let layout = self
            .blit_layout
            .get_or_insert_with(PosTexCoord0Vertex::layout)
            .clone();

        self.handles.blit_sampler = gpu.create_uniform("s_texColor", UniformType::Sampler);
        self.handles.normal_matrix_uniform = gpu.create_uniform("u_normalMatrix", UniformType::Mat3);
        self.handles.exposure_vec_uniform = gpu.create_uniform("u_exposureVec", UniformType::Vec4);
        self.handles.scene_scale_vec_uniform =
            gpu.create_uniform("u_sceneScaleVec", UniformType::Vec4);

        let quad = screen_quad(gpu.caps().origin_bottom_left);
        self.handles.quad_vb = gpu.create_vertex_buffer(bytemuck::cast_slice(&quad), &layout);

        let renderer = gpu.caps().renderer;
        let dir = shader_dir(renderer);
        if dir == UNKNOWN_SHADER_DIR {
            log::warn!("no shader set for backend {}", renderer.name());
        }
        let dir = self.config.asset_root.join(dir);
        self.handles.blit_program =
            load_program(gpu, &dir, "tonemap").context("failed to load tonemap program")?;

        for subsystem in &mut self.subsystems {
            subsystem
                .initialize(gpu)
                .with_context(|| format!("failed to initialize {} subsystem", subsystem.name()))?;
        }

        let mut ctx = PipelineCtx::new(gpu, None, &mut self.state, &self.handles, &self.config);
        self.pipeline.on_initialize(&mut ctx)?;

        log::debug!("renderer initialized ({})", renderer.name());
        Ok(())
    }

    /// Records the new display size and lets the pipeline adapt.
    ///
    /// The framebuffer is created only when none is alive; its attachments are
    /// back-buffer relative, so a resize does not recreate it.
    pub fn reset(&mut self, gpu: &mut dyn GpuService, width: u16, height: u16) {
        if !self.state.frame_buffer.is_valid() {
            self.state.frame_buffer = create_frame_buffer(gpu, self.config.hdr, self.config.depth);
        }
        self.state.width = width;
        self.state.height = height;

        log::debug!("renderer reset to {width}x{height}");

        let mut ctx = PipelineCtx::new(gpu, None, &mut self.state, &self.handles, &self.config);
        self.pipeline.on_reset(&mut ctx);
    }

    /// Renders one frame: updates scale and clear colour from `scene`, runs
    /// the pipeline, then tonemaps the HDR framebuffer to the display.
    pub fn render(&mut self, gpu: &mut dyn GpuService, scene: &Scene, dt: f32) {
        self.state.time += dt;

        if scene.loaded {
            self.state.scale = scene_scale(scene.min_bounds, scene.max_bounds, scene.camera.z_far);
            if self.handles.scene_scale_vec_uniform.is_valid() {
                gpu.set_uniform(
                    self.handles.scene_scale_vec_uniform,
                    UniformValue::Vec4([self.state.scale, 0.0, 0.0, 0.0]),
                );
            }
            self.state.clear_color = clear_color_from_sky(scene.sky_color);
        } else {
            self.state.scale = 1.0;
            self.state.clear_color = self.config.neutral_clear_color;
        }

        let mut ctx = PipelineCtx::new(
            gpu,
            Some(scene),
            &mut self.state,
            &self.handles,
            &self.config,
        );
        self.pipeline.on_render(&mut ctx, dt);

        self.blit_to_screen(gpu, scene, self.config.blit_view);
    }

    /// Releases pipeline resources, then subsystems (in reverse order), then
    /// every core resource that is still valid. Handles are reset to invalid,
    /// so a repeated call destroys nothing.
    pub fn shutdown(&mut self, gpu: &mut dyn GpuService) {
        let mut ctx = PipelineCtx::new(gpu, None, &mut self.state, &self.handles, &self.config);
        self.pipeline.on_shutdown(&mut ctx);

        for subsystem in self.subsystems.iter_mut().rev() {
            subsystem.shutdown(gpu);
        }

        let handles = std::mem::take(&mut self.handles);
        release(gpu, handles.blit_program);
        release(gpu, handles.blit_sampler);
        release(gpu, handles.normal_matrix_uniform);
        release(gpu, handles.exposure_vec_uniform);
        release(gpu, handles.scene_scale_vec_uniform);
        release(gpu, handles.quad_vb);
        release(gpu, std::mem::take(&mut self.state.frame_buffer));

        log::debug!("renderer shut down");
    }

    /// Tonemaps attachment 0 of the HDR framebuffer onto the display.
    ///
    /// Skipped (with a one-time warning) while any required resource is
    /// invalid.
    fn blit_to_screen(&mut self, gpu: &mut dyn GpuService, scene: &Scene, view: ViewId) {
        gpu.set_view_name(view, "Blit to screen + tonemapping");
        gpu.set_view_clear(view, ClearFlags::empty(), 0);
        gpu.set_view_rect(view, 0, 0, self.state.width, self.state.height);
        gpu.set_view_frame_buffer(view, FrameBufferHandle::INVALID);

        let texture = if self.state.frame_buffer.is_valid() {
            gpu.frame_buffer_texture(self.state.frame_buffer, 0)
        } else {
            TextureHandle::INVALID
        };
        let h = &self.handles;
        let ready = texture.is_valid()
            && h.blit_program.is_valid()
            && h.blit_sampler.is_valid()
            && h.exposure_vec_uniform.is_valid()
            && h.quad_vb.is_valid();
        if !ready {
            if !self.warned_blit_skipped {
                log::warn!("tonemap blit skipped: HDR framebuffer or blit resources unavailable");
                self.warned_blit_skipped = true;
            }
            return;
        }

        let exposure = if scene.loaded { scene.camera.exposure } else { 1.0 };

        gpu.set_state(StateFlags::WRITE_RGB);
        gpu.set_texture(0, h.blit_sampler, texture);
        gpu.set_uniform(h.exposure_vec_uniform, UniformValue::Vec4([exposure, 0.0, 0.0, 0.0]));
        gpu.set_vertex_buffer(0, h.quad_vb);
        gpu.submit(view, h.blit_program);
    }
}
