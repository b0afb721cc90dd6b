//! Shading subsystems (PBR material set-up, light lists).
//!
//! The renderer core only drives their lifecycle; what they upload and bind is
//! their own business, reached from pipeline hooks.

use anyhow::Result;

use crate::device::GpuService;

/// Lifecycle contract for a shading subsystem.
///
/// `initialize` runs once during `Renderer::initialize`; `shutdown` runs during
/// `Renderer::shutdown`, in reverse subsystem order, after the pipeline's own
/// `on_shutdown`.
pub trait ShadingSubsystem {
    fn name(&self) -> &str;

    fn initialize(&mut self, gpu: &mut dyn GpuService) -> Result<()>;

    fn shutdown(&mut self, gpu: &mut dyn GpuService);
}
