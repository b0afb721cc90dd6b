//! HDR render-pipeline core.
//!
//! A `Renderer` owns the offscreen HDR framebuffer and the tonemap blit, keeps
//! per-frame transforms up to date, and calls into a `RenderPipeline` at four
//! lifecycle points. The pipeline does all scene-geometry submission.
//!
//! Convention:
//! - views with ids below `RendererConfig::blit_view` produce HDR output
//! - the blit view reads attachment 0 of the HDR framebuffer and writes the display

mod blit;
mod color;
mod config;
mod framebuffer;
mod pipeline;
mod renderer;
mod shader;
mod transform;

pub use blit::{PosTexCoord0Vertex, screen_quad};
pub use color::{NEUTRAL_CLEAR_COLOR, clear_color_from_sky, pack_linear_rgb};
pub use config::RendererConfig;
pub use framebuffer::create_frame_buffer;
pub use pipeline::{PipelineCtx, RenderPipeline};
pub use renderer::{RenderState, Renderer};
pub use shader::{ShaderStage, UNKNOWN_SHADER_DIR, load_program, shader_dir, shader_path};
pub use transform::{normal_matrix, projection, scaled_view, scene_scale};
