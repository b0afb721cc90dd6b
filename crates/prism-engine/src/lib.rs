//! Prism engine crate.
//!
//! This crate owns the HDR render-pipeline core and the contracts it uses to talk
//! to its collaborators (GPU service, scene snapshot, shading subsystems).

pub mod device;
pub mod logging;
pub mod render;
pub mod scene;
pub mod shading;
pub mod time;
