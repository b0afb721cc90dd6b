//! End-to-end lifecycle against the headless device.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};

use prism_engine::device::{
    ClearFlags, GpuService, HeadlessGpu, RendererType, ResourceKind, UniformHandle, UniformType,
    UniformValue,
};
use prism_engine::render::{PipelineCtx, RenderPipeline, Renderer, RendererConfig, shader_dir};
use prism_engine::scene::Scene;
use prism_engine::shading::ShadingSubsystem;

type Log = Rc<RefCell<Vec<String>>>;

/// Minimal forward pipeline: clears the HDR target on view 0 and sets the
/// camera transforms there.
struct Forward {
    log: Log,
    light_uniform: UniformHandle,
}

impl RenderPipeline for Forward {
    fn on_initialize(&mut self, ctx: &mut PipelineCtx<'_>) -> Result<()> {
        self.light_uniform = ctx.gpu.create_uniform("u_forwardLight", UniformType::Vec4);
        self.log.borrow_mut().push("pipeline:init".into());
        Ok(())
    }

    fn on_reset(&mut self, ctx: &mut PipelineCtx<'_>) {
        let (w, h) = (ctx.width(), ctx.height());
        let fb = ctx.frame_buffer();
        ctx.gpu.set_view_name(0, "Forward");
        ctx.gpu.set_view_frame_buffer(0, fb);
        ctx.gpu.set_view_rect(0, 0, 0, w, h);
        self.log.borrow_mut().push("pipeline:reset".into());
    }

    fn on_render(&mut self, ctx: &mut PipelineCtx<'_>, _dt: f32) {
        let clear = ctx.clear_color();
        ctx.gpu
            .set_view_clear(0, ClearFlags::COLOR | ClearFlags::DEPTH, clear);
        ctx.set_view_projection(0);
        ctx.set_normal_matrix(Mat4::IDENTITY);
        self.log.borrow_mut().push(format!("pipeline:render scale={:.3}", ctx.scale()));
    }

    fn on_shutdown(&mut self, ctx: &mut PipelineCtx<'_>) {
        if self.light_uniform.is_valid() {
            ctx.gpu.destroy(self.light_uniform.into());
        }
        self.light_uniform = UniformHandle::INVALID;
        self.log.borrow_mut().push("pipeline:shutdown".into());
    }
}

struct Subsystem {
    name: &'static str,
    log: Log,
}

impl ShadingSubsystem for Subsystem {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, _gpu: &mut dyn GpuService) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:init", self.name));
        Ok(())
    }

    fn shutdown(&mut self, _gpu: &mut dyn GpuService) {
        self.log.borrow_mut().push(format!("{}:shutdown", self.name));
    }
}

fn asset_root(test: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("prism-lifecycle-{}-{test}", std::process::id()));
    let dir = root.join(shader_dir(RendererType::Noop));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("vs_tonemap.bin"), b"vs").unwrap();
    std::fs::write(dir.join("fs_tonemap.bin"), b"fs").unwrap();
    root
}

fn cube_scene() -> Scene {
    let mut scene = Scene::new();
    scene.loaded = true;
    scene.include_point(Vec3::splat(-1.0));
    scene.include_point(Vec3::splat(1.0));
    scene.camera.z_far = 100.0;
    scene.sky_color = Vec4::new(0.0, 0.0, 0.0, 1.0);
    scene
}

#[test]
fn full_frame_loop() {
    let log: Log = Rc::default();
    let mut gpu = HeadlessGpu::default();
    let mut pipeline = Forward {
        log: log.clone(),
        light_uniform: UniformHandle::INVALID,
    };

    let mut renderer = Renderer::new(
        RendererConfig {
            asset_root: asset_root("loop"),
            ..RendererConfig::default()
        },
        &mut pipeline,
    )
    .with_subsystem(Box::new(Subsystem { name: "pbr", log: log.clone() }))
    .with_subsystem(Box::new(Subsystem { name: "lights", log: log.clone() }));

    renderer.initialize(&mut gpu).unwrap();
    renderer.reset(&mut gpu, 1600, 900);

    let scene = cube_scene();
    renderer.render(&mut gpu, &scene, 1.0 / 60.0);

    // HDR view renders into the offscreen target with the scene-derived clear colour.
    let hdr_view = gpu.view(0).unwrap();
    assert_eq!(hdr_view.frame_buffer, renderer.frame_buffer());
    assert_eq!(hdr_view.clear_rgba, 0x0000_00ff);
    assert_eq!(hdr_view.view_mat, renderer.state().view_mat);
    assert_ne!(hdr_view.proj_mat, Mat4::IDENTITY);

    // Tonemap blit is the only draw and executes after every HDR view.
    let ordered = gpu.draws_in_view_order();
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].view, renderer.config().blit_view);

    // Normal matrix and scene scale were uploaded ahead of the blit.
    let normal = gpu.uniform_by_name("u_normalMatrix").unwrap();
    let scale = gpu.uniform_by_name("u_sceneScaleVec").unwrap();
    let uniforms = &ordered[0].uniforms;
    assert!(uniforms.iter().any(|(h, v)| *h == normal && matches!(v, UniformValue::Mat3(_))));
    assert!(uniforms.iter().any(|(h, v)| {
        *h == scale && matches!(v, UniformValue::Vec4([s, ..]) if (s - 35.355).abs() < 1e-2)
    }));
    gpu.frame();

    renderer.shutdown(&mut gpu);
    renderer.shutdown(&mut gpu);
    drop(renderer);

    for kind in [
        ResourceKind::Texture,
        ResourceKind::FrameBuffer,
        ResourceKind::VertexBuffer,
        ResourceKind::Shader,
        ResourceKind::Program,
        ResourceKind::Uniform,
    ] {
        assert_eq!(gpu.live_count(kind), 0, "{kind:?} leaked");
    }
    assert_eq!(gpu.stale_destroys(), 0);
    assert_eq!(gpu.invalid_destroys(), 0);

    let log = log.borrow();
    assert_eq!(
        log[..6],
        [
            "pbr:init",
            "lights:init",
            "pipeline:init",
            "pipeline:reset",
            "pipeline:render scale=35.355",
            "pipeline:shutdown",
        ]
    );
    assert_eq!(log[6..8], ["lights:shutdown", "pbr:shutdown"]);
}

#[test]
fn resize_between_frames_keeps_frame_buffer() {
    let log: Log = Rc::default();
    let mut gpu = HeadlessGpu::default();
    let mut pipeline = Forward {
        log,
        light_uniform: UniformHandle::INVALID,
    };
    let mut renderer = Renderer::new(
        RendererConfig {
            asset_root: asset_root("resize"),
            ..RendererConfig::default()
        },
        &mut pipeline,
    );

    renderer.initialize(&mut gpu).unwrap();
    renderer.reset(&mut gpu, 800, 600);
    let fb = renderer.frame_buffer();

    let scene = cube_scene();
    renderer.render(&mut gpu, &scene, 0.016);
    gpu.frame();
    renderer.reset(&mut gpu, 1920, 1080);
    renderer.render(&mut gpu, &scene, 0.016);

    assert_eq!(renderer.frame_buffer(), fb);
    assert_eq!(gpu.created_count(ResourceKind::FrameBuffer), 1);
    assert_eq!(gpu.view(199).unwrap().rect, (0, 0, 1920, 1080));

    renderer.shutdown(&mut gpu);
}

#[test]
fn hdr_view_keeps_its_target_across_frames() {
    let log: Log = Rc::default();
    let mut gpu = HeadlessGpu::default();
    let mut pipeline = Forward {
        log,
        light_uniform: UniformHandle::INVALID,
    };
    let mut renderer = Renderer::new(
        RendererConfig {
            asset_root: asset_root("frames"),
            ..RendererConfig::default()
        },
        &mut pipeline,
    );

    renderer.initialize(&mut gpu).unwrap();
    renderer.reset(&mut gpu, 1280, 720);

    let scene = cube_scene();
    for _ in 0..3 {
        renderer.render(&mut gpu, &scene, 0.016);
        gpu.frame();
    }
    renderer.render(&mut gpu, &scene, 0.016);

    let hdr_view = gpu.view(0).unwrap();
    assert!(renderer.frame_buffer().is_valid());
    assert_eq!(hdr_view.frame_buffer, renderer.frame_buffer());
    assert_eq!(hdr_view.rect, (0, 0, 1280, 720));
    assert_eq!(gpu.draws_in_view_order().len(), 1);

    renderer.shutdown(&mut gpu);
}
