use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::device::{GpuService, ProgramHandle, RendererType, ShaderHandle};

/// Returned for backends without a compiled shader set.
pub const UNKNOWN_SHADER_DIR: &str = "???";

/// Compiled shader directory per backend, indexed by `RendererType::index`.
const SHADER_DIRS: [&str; RendererType::COUNT] = [
    "shaders/dx9/",   // Noop
    "shaders/dx9/",   // Direct3D9
    "shaders/dx11/",  // Direct3D11
    "shaders/dx11/",  // Direct3D12
    UNKNOWN_SHADER_DIR, // Gnm
    "shaders/metal/", // Metal
    "shaders/essl/",  // OpenGLES
    "shaders/glsl/",  // OpenGL
    "shaders/spirv/", // Vulkan
    UNKNOWN_SHADER_DIR, // WebGpu
];

/// Relative directory holding the shader binaries for `renderer`.
#[inline]
pub fn shader_dir(renderer: RendererType) -> &'static str {
    SHADER_DIRS[renderer.index()]
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn prefix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs",
            ShaderStage::Fragment => "fs",
        }
    }
}

/// `<dir>/<vs|fs>_<name>.bin`
pub fn shader_path(dir: &Path, stage: ShaderStage, name: &str) -> PathBuf {
    dir.join(format!("{}_{}.bin", stage.prefix(), name))
}

fn load_shader(gpu: &mut dyn GpuService, path: &Path) -> Result<ShaderHandle> {
    let code = std::fs::read(path)
        .with_context(|| format!("failed to read shader {}", path.display()))?;

    let shader = gpu.create_shader(&code);
    anyhow::ensure!(shader.is_valid(), "failed to create shader from {}", path.display());
    Ok(shader)
}

/// Loads `vs_<name>.bin` and `fs_<name>.bin` from `dir` and links them.
///
/// The returned program owns both shader stages.
pub fn load_program(gpu: &mut dyn GpuService, dir: &Path, name: &str) -> Result<ProgramHandle> {
    let vs = load_shader(gpu, &shader_path(dir, ShaderStage::Vertex, name))?;
    let fs = match load_shader(gpu, &shader_path(dir, ShaderStage::Fragment, name)) {
        Ok(fs) => fs,
        Err(err) => {
            gpu.destroy(vs.into());
            return Err(err);
        }
    };

    let program = gpu.create_program(vs, fs, true);
    if !program.is_valid() {
        gpu.destroy(vs.into());
        gpu.destroy(fs.into());
        anyhow::bail!("failed to link program {name}");
    }

    log::debug!("loaded program {name} from {}", dir.display());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{HeadlessGpu, ResourceKind};

    fn scratch_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("prism-shader-{}-{test}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn every_backend_has_a_directory() {
        for renderer in RendererType::ALL {
            let dir = shader_dir(renderer);
            assert!(!dir.is_empty());
            assert_eq!(dir, shader_dir(renderer));
        }
    }

    #[test]
    fn backend_families_share_binaries() {
        assert_eq!(shader_dir(RendererType::Noop), "shaders/dx9/");
        assert_eq!(shader_dir(RendererType::Direct3D9), "shaders/dx9/");
        assert_eq!(shader_dir(RendererType::Direct3D11), "shaders/dx11/");
        assert_eq!(shader_dir(RendererType::Direct3D12), "shaders/dx11/");
        assert_eq!(shader_dir(RendererType::Metal), "shaders/metal/");
        assert_eq!(shader_dir(RendererType::OpenGLES), "shaders/essl/");
        assert_eq!(shader_dir(RendererType::OpenGL), "shaders/glsl/");
        assert_eq!(shader_dir(RendererType::Vulkan), "shaders/spirv/");
    }

    #[test]
    fn backends_without_shaders_map_to_sentinel() {
        assert_eq!(shader_dir(RendererType::Gnm), UNKNOWN_SHADER_DIR);
        assert_eq!(shader_dir(RendererType::WebGpu), UNKNOWN_SHADER_DIR);
    }

    #[test]
    fn path_uses_stage_prefix() {
        let p = shader_path(Path::new("shaders/glsl"), ShaderStage::Fragment, "tonemap");
        assert_eq!(p, Path::new("shaders/glsl/fs_tonemap.bin"));
    }

    #[test]
    fn load_program_links_both_stages() {
        let dir = scratch_dir("ok");
        std::fs::write(dir.join("vs_blit.bin"), b"vs").unwrap();
        std::fs::write(dir.join("fs_blit.bin"), b"fs").unwrap();

        let mut gpu = HeadlessGpu::default();
        let program = load_program(&mut gpu, &dir, "blit").unwrap();

        assert!(gpu.is_live(program));
        assert_eq!(gpu.live_count(ResourceKind::Shader), 2);

        gpu.destroy(program.into());
        assert_eq!(gpu.live_count(ResourceKind::Shader), 0);
    }

    #[test]
    fn missing_fragment_stage_releases_vertex_stage() {
        let dir = scratch_dir("missing-fs");
        std::fs::write(dir.join("vs_blit.bin"), b"vs").unwrap();
        let _ = std::fs::remove_file(dir.join("fs_blit.bin"));

        let mut gpu = HeadlessGpu::default();
        let err = load_program(&mut gpu, &dir, "blit").unwrap_err();

        assert!(format!("{err:#}").contains("fs_blit.bin"));
        assert_eq!(gpu.live_count(ResourceKind::Shader), 0);
    }
}
