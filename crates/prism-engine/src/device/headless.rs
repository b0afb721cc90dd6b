use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Mat4;

use super::{
    BackbufferRatio, Caps, ClearFlags, FrameBufferHandle, GpuService, ProgramHandle, RendererType,
    Resource, ResourceKind, ShaderHandle, StateFlags, TextureFlags, TextureFormat, TextureHandle,
    UniformHandle, UniformType, UniformValue, VertexBufferHandle, VertexLayout, ViewId,
};

/// Headless device configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub caps: Caps,

    /// Every `create_frame_buffer` call returns the invalid handle.
    pub reject_frame_buffers: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            caps: Caps::permissive(RendererType::Noop),
            reject_frame_buffers: false,
        }
    }
}

/// Recorded per-view state for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub name: String,
    pub clear: ClearFlags,
    pub clear_rgba: u32,
    pub rect: (u16, u16, u16, u16),
    pub frame_buffer: FrameBufferHandle,
    pub view_mat: Mat4,
    pub proj_mat: Mat4,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            name: String::new(),
            clear: ClearFlags::empty(),
            clear_rgba: 0x0000_00ff,
            rect: (0, 0, 0, 0),
            frame_buffer: FrameBufferHandle::INVALID,
            view_mat: Mat4::IDENTITY,
            proj_mat: Mat4::IDENTITY,
        }
    }
}

/// One submitted draw with the state it consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawCall {
    pub view: ViewId,
    pub program: ProgramHandle,
    pub state: StateFlags,
    pub vertex_buffer: VertexBufferHandle,
    pub textures: Vec<(u8, UniformHandle, TextureHandle)>,
    pub uniforms: Vec<(UniformHandle, UniformValue)>,
}

#[derive(Debug, Clone)]
struct TextureInfo {
    format: TextureFormat,
}

/// GPU service that executes nothing and records everything.
///
/// Used as the no-op backend for dry runs and as the device in tests: it
/// tracks live resources per kind, counts creations and destructions, keeps
/// per-view configuration, and records the draws of the frame in progress.
pub struct HeadlessGpu {
    config: HeadlessConfig,

    next_index: HashMap<ResourceKind, u16>,
    live: HashSet<Resource>,
    created: HashMap<ResourceKind, usize>,
    destroyed: HashMap<ResourceKind, usize>,
    invalid_destroys: usize,
    stale_destroys: usize,
    invalid_queries: Cell<usize>,

    textures: HashMap<TextureHandle, TextureInfo>,
    frame_buffers: HashMap<FrameBufferHandle, (Vec<TextureHandle>, bool)>,
    programs: HashMap<ProgramHandle, (ShaderHandle, ShaderHandle, bool)>,
    uniforms: HashMap<UniformHandle, (String, UniformType)>,
    vertex_buffers: HashMap<VertexBufferHandle, (Vec<u8>, u16)>,

    views: BTreeMap<ViewId, ViewState>,
    pending: DrawCall,
    draws: Vec<DrawCall>,
    frame_number: u64,
}

impl HeadlessGpu {
    pub fn new(config: HeadlessConfig) -> Self {
        log::debug!(
            "headless gpu created (renderer = {})",
            config.caps.renderer.name()
        );
        Self {
            config,
            next_index: HashMap::new(),
            live: HashSet::new(),
            created: HashMap::new(),
            destroyed: HashMap::new(),
            invalid_destroys: 0,
            stale_destroys: 0,
            invalid_queries: Cell::new(0),
            textures: HashMap::new(),
            frame_buffers: HashMap::new(),
            programs: HashMap::new(),
            uniforms: HashMap::new(),
            vertex_buffers: HashMap::new(),
            views: BTreeMap::new(),
            pending: DrawCall::default(),
            draws: Vec::new(),
            frame_number: 0,
        }
    }

    pub fn with_caps(caps: Caps) -> Self {
        Self::new(HeadlessConfig {
            caps,
            ..HeadlessConfig::default()
        })
    }

    pub fn is_live(&self, resource: impl Into<Resource>) -> bool {
        self.live.contains(&resource.into())
    }

    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.live.iter().filter(|r| r.kind() == kind).count()
    }

    pub fn created_count(&self, kind: ResourceKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn destroyed_count(&self, kind: ResourceKind) -> usize {
        self.destroyed.get(&kind).copied().unwrap_or(0)
    }

    /// Number of `destroy` calls made with an invalid sentinel.
    pub fn invalid_destroys(&self) -> usize {
        self.invalid_destroys
    }

    /// Number of `destroy` calls made with a handle that was not live.
    pub fn stale_destroys(&self) -> usize {
        self.stale_destroys
    }

    /// Number of attachment lookups made on an invalid framebuffer.
    pub fn invalid_queries(&self) -> usize {
        self.invalid_queries.get()
    }

    pub fn texture_format(&self, texture: TextureHandle) -> Option<TextureFormat> {
        self.textures.get(&texture).map(|t| t.format)
    }

    pub fn frame_buffer_attachments(&self, fb: FrameBufferHandle) -> &[TextureHandle] {
        self.frame_buffers
            .get(&fb)
            .map_or(&[][..], |(attachments, _)| attachments.as_slice())
    }

    pub fn uniform_by_name(&self, name: &str) -> Option<UniformHandle> {
        self.uniforms
            .iter()
            .find(|(_, (n, _))| n == name)
            .map(|(h, _)| *h)
    }

    pub fn vertex_count(&self, vb: VertexBufferHandle) -> Option<usize> {
        self.vertex_buffers
            .get(&vb)
            .map(|(data, stride)| data.len() / usize::from((*stride).max(1)))
    }

    /// Bytes uploaded for `vb`, as passed to `create_vertex_buffer`.
    pub fn vertex_data(&self, vb: VertexBufferHandle) -> Option<&[u8]> {
        self.vertex_buffers.get(&vb).map(|(data, _)| data.as_slice())
    }

    /// Current configuration of `view`. Persists across `frame()` calls.
    pub fn view(&self, view: ViewId) -> Option<&ViewState> {
        self.views.get(&view)
    }

    /// Draws submitted since the last `frame()`, in submission order.
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draws in execution order: ascending view id, then submission order.
    pub fn draws_in_view_order(&self) -> Vec<&DrawCall> {
        let mut ordered: Vec<&DrawCall> = self.draws.iter().collect();
        ordered.sort_by_key(|d| d.view);
        ordered
    }

    fn alloc(&mut self, kind: ResourceKind) -> Option<u16> {
        let next = self.next_index.entry(kind).or_insert(0);
        if *next == u16::MAX {
            log::warn!("headless gpu: {kind:?} handle space exhausted");
            return None;
        }
        let index = *next;
        *next += 1;
        *self.created.entry(kind).or_insert(0) += 1;
        Some(index)
    }

    fn view_mut(&mut self, view: ViewId) -> &mut ViewState {
        self.views.entry(view).or_default()
    }

    fn release(&mut self, resource: Resource) {
        if !resource.is_valid() {
            self.invalid_destroys += 1;
            return;
        }
        if !self.live.remove(&resource) {
            self.stale_destroys += 1;
            log::error!("headless gpu: destroy of non-live resource {resource:?}");
            return;
        }
        *self.destroyed.entry(resource.kind()).or_insert(0) += 1;

        match resource {
            Resource::Texture(h) => {
                self.textures.remove(&h);
            }
            Resource::FrameBuffer(h) => {
                if let Some((attachments, owns)) = self.frame_buffers.remove(&h) {
                    if owns {
                        for t in attachments {
                            self.release(t.into());
                        }
                    }
                }
            }
            Resource::VertexBuffer(h) => {
                self.vertex_buffers.remove(&h);
            }
            Resource::Shader(_) => {}
            Resource::Program(h) => {
                if let Some((vs, fs, owns)) = self.programs.remove(&h) {
                    if owns {
                        self.release(vs.into());
                        self.release(fs.into());
                    }
                }
            }
            Resource::Uniform(h) => {
                self.uniforms.remove(&h);
            }
        }
    }
}

impl Default for HeadlessGpu {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl GpuService for HeadlessGpu {
    fn caps(&self) -> &Caps {
        &self.config.caps
    }

    fn create_uniform(&mut self, name: &str, ty: UniformType) -> UniformHandle {
        let Some(index) = self.alloc(ResourceKind::Uniform) else {
            return UniformHandle::INVALID;
        };
        let handle = UniformHandle::from_index(index);
        self.uniforms.insert(handle, (name.to_owned(), ty));
        self.live.insert(handle.into());
        handle
    }

    fn create_vertex_buffer(&mut self, data: &[u8], layout: &VertexLayout) -> VertexBufferHandle {
        if data.is_empty() || layout.stride() == 0 {
            return VertexBufferHandle::INVALID;
        }
        let Some(index) = self.alloc(ResourceKind::VertexBuffer) else {
            return VertexBufferHandle::INVALID;
        };
        let handle = VertexBufferHandle::from_index(index);
        self.vertex_buffers
            .insert(handle, (data.to_vec(), layout.stride()));
        self.live.insert(handle.into());
        handle
    }

    fn create_texture_2d(
        &mut self,
        _ratio: BackbufferRatio,
        format: TextureFormat,
        flags: TextureFlags,
    ) -> TextureHandle {
        if !self.is_texture_valid(format, flags) {
            return TextureHandle::INVALID;
        }
        let Some(index) = self.alloc(ResourceKind::Texture) else {
            return TextureHandle::INVALID;
        };
        let handle = TextureHandle::from_index(index);
        self.textures.insert(handle, TextureInfo { format });
        self.live.insert(handle.into());
        handle
    }

    fn create_frame_buffer(
        &mut self,
        attachments: &[TextureHandle],
        destroy_textures: bool,
    ) -> FrameBufferHandle {
        if self.config.reject_frame_buffers || attachments.is_empty() {
            return FrameBufferHandle::INVALID;
        }
        if attachments.iter().any(|t| !self.is_live(*t)) {
            return FrameBufferHandle::INVALID;
        }
        let Some(index) = self.alloc(ResourceKind::FrameBuffer) else {
            return FrameBufferHandle::INVALID;
        };
        let handle = FrameBufferHandle::from_index(index);
        self.frame_buffers
            .insert(handle, (attachments.to_vec(), destroy_textures));
        self.live.insert(handle.into());
        handle
    }

    fn create_shader(&mut self, code: &[u8]) -> ShaderHandle {
        if code.is_empty() {
            return ShaderHandle::INVALID;
        }
        let Some(index) = self.alloc(ResourceKind::Shader) else {
            return ShaderHandle::INVALID;
        };
        let handle = ShaderHandle::from_index(index);
        self.live.insert(handle.into());
        handle
    }

    fn create_program(
        &mut self,
        vs: ShaderHandle,
        fs: ShaderHandle,
        destroy_shaders: bool,
    ) -> ProgramHandle {
        if !self.is_live(vs) || !self.is_live(fs) {
            return ProgramHandle::INVALID;
        }
        let Some(index) = self.alloc(ResourceKind::Program) else {
            return ProgramHandle::INVALID;
        };
        let handle = ProgramHandle::from_index(index);
        self.programs.insert(handle, (vs, fs, destroy_shaders));
        self.live.insert(handle.into());
        handle
    }

    fn frame_buffer_texture(&self, fb: FrameBufferHandle, index: u8) -> TextureHandle {
        if !fb.is_valid() {
            self.invalid_queries.set(self.invalid_queries.get() + 1);
            log::error!("headless gpu: attachment lookup on invalid framebuffer");
            return TextureHandle::INVALID;
        }
        self.frame_buffer_attachments(fb)
            .get(usize::from(index))
            .copied()
            .unwrap_or(TextureHandle::INVALID)
    }

    fn destroy(&mut self, resource: Resource) {
        self.release(resource);
    }

    fn set_view_name(&mut self, view: ViewId, name: &str) {
        self.view_mut(view).name = name.to_owned();
    }

    fn set_view_clear(&mut self, view: ViewId, flags: ClearFlags, rgba: u32) {
        let v = self.view_mut(view);
        v.clear = flags;
        v.clear_rgba = rgba;
    }

    fn set_view_rect(&mut self, view: ViewId, x: u16, y: u16, width: u16, height: u16) {
        self.view_mut(view).rect = (x, y, width, height);
    }

    fn set_view_frame_buffer(&mut self, view: ViewId, fb: FrameBufferHandle) {
        self.view_mut(view).frame_buffer = fb;
    }

    fn set_view_transform(&mut self, view: ViewId, view_mat: &Mat4, proj_mat: &Mat4) {
        let v = self.view_mut(view);
        v.view_mat = *view_mat;
        v.proj_mat = *proj_mat;
    }

    fn set_state(&mut self, state: StateFlags) {
        self.pending.state = state;
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        self.pending.textures.push((stage, sampler, texture));
    }

    fn set_uniform(&mut self, uniform: UniformHandle, value: UniformValue) {
        if let Some((name, ty)) = self.uniforms.get(&uniform) {
            if *ty != value.ty() {
                log::warn!("headless gpu: uniform {name} is {ty:?}, got {:?}", value.ty());
            }
        }
        self.pending.uniforms.push((uniform, value));
    }

    fn set_vertex_buffer(&mut self, _stream: u8, vb: VertexBufferHandle) {
        self.pending.vertex_buffer = vb;
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        let mut draw = std::mem::take(&mut self.pending);
        draw.view = view;
        draw.program = program;
        self.draws.push(draw);
    }

    fn frame(&mut self) -> u64 {
        let finished = self.frame_number;
        log::trace!(
            "headless gpu: frame {finished} ({} views, {} draws)",
            self.views.len(),
            self.draws.len()
        );
        self.draws.clear();
        self.pending = DrawCall::default();
        self.frame_number += 1;
        finished
    }
}
