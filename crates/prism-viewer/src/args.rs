//! Command-line flags for the viewer.

use std::path::PathBuf;

use clap::Parser;

/// Display size in pixels, written as `WIDTHxHEIGHT`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "prism-viewer")]
#[command(about = "Headless dry run of the HDR render pipeline", long_about = None)]
pub struct ViewerArgs {
    /// Number of frames to render
    #[arg(long, default_value_t = 3)]
    pub frames: u32,

    /// Display size
    #[arg(long, value_name = "WxH", default_value = "1280x720", value_parser = parse_size)]
    pub size: Size,

    /// Asset root holding the compiled shader directories
    #[arg(long = "assets", value_name = "DIR", default_value = ".")]
    pub asset_root: PathBuf,

    /// Seed device capabilities from the real GPU adapter
    #[arg(long)]
    pub probe: bool,

    /// Half-size of the synthetic scene's bounding cube
    #[arg(long, value_name = "X", default_value_t = 1.0, value_parser = parse_extent)]
    pub scene_extent: f32,

    /// Render an unloaded scene instead of the cube
    #[arg(long, conflicts_with = "scene_extent")]
    pub empty: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl ViewerArgs {
    /// Cube half-size, or `None` when `--empty` asks for an unloaded scene.
    pub fn scene_extent(&self) -> Option<f32> {
        (!self.empty).then_some(self.scene_extent)
    }
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width: u16 = w.parse().map_err(|e| format!("invalid width {w:?}: {e}"))?;
    let height: u16 = h.parse().map_err(|e| format!("invalid height {h:?}: {e}"))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".into());
    }
    Ok(Size { width, height })
}

fn parse_extent(value: &str) -> Result<f32, String> {
    let extent: f32 = value
        .parse()
        .map_err(|e| format!("invalid scene extent {value:?}: {e}"))?;
    if !(extent > 0.0 && extent.is_finite()) {
        return Err("scene extent must be a positive finite number".into());
    }
    Ok(extent)
}
