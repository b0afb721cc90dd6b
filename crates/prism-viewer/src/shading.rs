//! Placeholder shading subsystems.
//!
//! They own the uniforms a PBR material pass and a light list would bind, so
//! the lifecycle ordering is observable in a dry run.

use anyhow::Result;

use prism_engine::device::{GpuService, UniformHandle, UniformType};
use prism_engine::shading::ShadingSubsystem;

/// Owns a fixed set of named uniforms for its lifetime.
pub struct UniformSet {
    name: &'static str,
    uniforms: &'static [(&'static str, UniformType)],
    handles: Vec<UniformHandle>,
}

impl UniformSet {
    pub fn pbr() -> Self {
        Self {
            name: "pbr",
            uniforms: &[
                ("u_baseColorFactor", UniformType::Vec4),
                ("u_metallicRoughnessNormalOcclusionFactor", UniformType::Vec4),
                ("u_emissiveFactorVec", UniformType::Vec4),
                ("s_texBaseColor", UniformType::Sampler),
            ],
            handles: Vec::new(),
        }
    }

    pub fn lights() -> Self {
        Self {
            name: "lights",
            uniforms: &[
                ("u_lightCountVec", UniformType::Vec4),
                ("u_ambientLightIrradiance", UniformType::Vec4),
            ],
            handles: Vec::new(),
        }
    }
}

impl ShadingSubsystem for UniformSet {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, gpu: &mut dyn GpuService) -> Result<()> {
        for (name, ty) in self.uniforms {
            let handle = gpu.create_uniform(name, *ty);
            anyhow::ensure!(handle.is_valid(), "failed to create uniform {name}");
            self.handles.push(handle);
        }
        log::debug!("{} subsystem initialized", self.name);
        Ok(())
    }

    fn shutdown(&mut self, gpu: &mut dyn GpuService) {
        for handle in self.handles.drain(..) {
            gpu.destroy(handle.into());
        }
        log::debug!("{} subsystem shut down", self.name);
    }
}
