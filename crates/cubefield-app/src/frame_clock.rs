//! Variable-step frame clock.
//!
//! Each redraw asks the clock for the wall time since the previous frame and
//! hands that raw delta to the animation, which decides whether the frame
//! counts as dropped. The clock also keeps a rolling frame rate for the
//! periodic statistics log.

use std::time::{Duration, Instant};

/// Delta reported for the very first frame, before a previous instant exists.
pub const FIRST_FRAME_DELTA: f32 = 1.0 / 60.0;

/// How often [`FrameClock::take_stats`] yields a sample.
pub const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// One frame rate sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    /// Frames presented since startup.
    pub frames: u64,
    /// Frames per second over the last interval.
    pub fps: f64,
}

#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    frame_count: u64,
    window_start: Option<Instant>,
    window_frames: u64,
    fps: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a frame and return seconds since the previous one.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp.
    ///
    /// The delta is not clamped; out-of-range values are handled downstream.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = match self.last_tick.replace(now) {
            Some(previous) => now.saturating_duration_since(previous).as_secs_f32(),
            None => FIRST_FRAME_DELTA,
        };
        self.frame_count += 1;
        self.window_frames += 1;
        self.window_start.get_or_insert(now);
        delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frame rate measured over the last completed interval.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Close the current interval if at least [`STATS_INTERVAL`] has passed
    /// since it opened, measured at the last tick.
    pub fn take_stats(&mut self) -> Option<FrameStats> {
        let (start, now) = (self.window_start?, self.last_tick?);
        let elapsed = now.saturating_duration_since(start);
        if elapsed < STATS_INTERVAL {
            return None;
        }

        self.fps = self.window_frames.saturating_sub(1) as f64 / elapsed.as_secs_f64();
        self.window_start = Some(now);
        self.window_frames = 1;
        Some(FrameStats {
            frames: self.frame_count,
            fps: self.fps,
        })
    }
}
