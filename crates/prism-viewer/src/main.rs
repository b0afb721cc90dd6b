//! Headless dry run of the render pipeline.
//!
//! Drives `initialize → reset → render* → shutdown` against the recording
//! device, optionally with capabilities probed from the real GPU adapter.

mod args;
mod pipeline;
mod shading;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use glam::{Vec3, Vec4};

use prism_engine::device::{Caps, GpuService, HeadlessGpu, RendererType, ResourceKind, probe_caps};
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::render::{Renderer, RendererConfig};
use prism_engine::scene::Scene;
use prism_engine::time::FrameClock;

use args::ViewerArgs;
use pipeline::ForwardPipeline;
use shading::UniformSet;

fn main() -> Result<()> {
    let args = ViewerArgs::parse();

    init_logging(if args.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    });

    let caps = if args.probe {
        probe_caps()?
    } else {
        Caps::permissive(RendererType::Noop)
    };

    anyhow::ensure!(
        Renderer::supported(&caps),
        "{} backend lacks multisampled RGBA16F render targets",
        caps.renderer.name()
    );

    let mut gpu = HeadlessGpu::with_caps(caps);
    run(&args, &mut gpu)
}

fn run(args: &ViewerArgs, gpu: &mut HeadlessGpu) -> Result<()> {
    let scene = build_scene(args.scene_extent());
    let mut pipeline = ForwardPipeline::default();

    let mut renderer = Renderer::new(
        RendererConfig {
            asset_root: args.asset_root.clone(),
            ..RendererConfig::default()
        },
        &mut pipeline,
    )
    .with_subsystem(Box::new(UniformSet::pbr()))
    .with_subsystem(Box::new(UniformSet::lights()));

    renderer.initialize(gpu)?;
    renderer.reset(gpu, args.size.width, args.size.height);

    let mut clock = FrameClock::fixed(Duration::from_micros(16_667));
    for _ in 0..args.frames {
        let ft = clock.tick();
        renderer.render(gpu, &scene, ft.dt);
        let draws = gpu.draws().len();
        let frame = gpu.frame();
        log::debug!("frame {frame}: {draws} draws (dt = {:.4}s)", ft.dt);
    }

    let state = renderer.state().clone();
    log::info!(
        "rendered {} frames at {}x{}, scale {:.3}, clear {:#010x}, t = {:.3}s",
        args.frames,
        state.width,
        state.height,
        state.scale,
        state.clear_color,
        state.time
    );

    renderer.shutdown(gpu);
    drop(renderer);

    let leaked: usize = [
        ResourceKind::Texture,
        ResourceKind::FrameBuffer,
        ResourceKind::VertexBuffer,
        ResourceKind::Shader,
        ResourceKind::Program,
        ResourceKind::Uniform,
    ]
    .into_iter()
    .map(|kind| gpu.live_count(kind))
    .sum();
    if leaked > 0 {
        log::warn!("{leaked} GPU resources still alive after shutdown");
    }

    log::info!(
        "forward pass ran {} times on {}",
        pipeline.frames(),
        gpu.caps().renderer.name()
    );
    Ok(())
}

/// Axis-aligned cube of half-size `extent` seen from a 45 degree angle.
fn build_scene(extent: Option<f32>) -> Scene {
    let mut scene = Scene::new();
    let Some(extent) = extent else {
        return scene;
    };

    scene.include_point(Vec3::splat(-extent));
    scene.include_point(Vec3::splat(extent));
    scene.camera.position = Vec3::new(extent, extent, -extent) * 3.0;
    scene.camera.z_far = 100.0;
    scene.sky_color = Vec4::new(0.53, 0.81, 0.92, 1.0);
    scene.loaded = true;
    scene
}
