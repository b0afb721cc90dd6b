use std::time::{Duration, Instant};

/// Timing snapshot handed to `Renderer::render`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

#[derive(Debug, Clone)]
enum Source {
    /// Measured wall-clock delta, clamped to `[min, max]`.
    Wall {
        last: Instant,
        min: Duration,
        max: Duration,
    },
    /// Constant delta, for headless and deterministic runs.
    Fixed(Duration),
}

/// Produces one `FrameTime` per presented frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
    frame_index: u64,
}

impl FrameClock {
    /// Wall-clock timing with a 0.1 ms floor and a 250 ms ceiling, so a
    /// debugger pause does not produce a multi-second `dt`.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(min: Duration, max: Duration) -> Self {
        debug_assert!(min <= max);
        Self {
            source: Source::Wall {
                last: Instant::now(),
                min,
                max,
            },
            frame_index: 0,
        }
    }

    /// Every tick reports exactly `step`.
    pub fn fixed(step: Duration) -> Self {
        Self {
            source: Source::Fixed(step),
            frame_index: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let dt = match &mut self.source {
            Source::Wall { last, min, max } => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(*last).clamp(*min, *max);
                *last = now;
                dt
            }
            Source::Fixed(step) => *step,
        };

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
