//! Frame timing.
//!
//! The renderer only consumes a per-frame `dt`; hosts produce it with a
//! `FrameClock`, either from wall-clock time or from a fixed step.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
