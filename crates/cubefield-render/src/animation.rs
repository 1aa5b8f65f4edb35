//! Frame-to-frame animation state: elapsed age and camera orbit angle.

use std::f32::consts::TAU;

/// Age is wrapped modulo this many seconds to keep `f32` phase inputs precise.
///
/// Every shader phase is `age × something`; below 2^15 the `f32` spacing stays
/// under 2 ms. Wrapping causes a single visible jump roughly every nine hours.
pub const AGE_WRAP_PERIOD: f64 = 32_768.0;

/// Age step applied instead of an invalid frame delta.
pub const DROPPED_FRAME_AGE_STEP: f64 = 1.0 / 60.0;

/// Largest delta accepted as a real frame, in seconds.
pub const MAX_FRAME_DELTA: f32 = 1.0;

/// Elapsed age and camera rotation, advanced once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationState {
    age: f64,
    camera_angle: f32,
    rotation_speed: f32,
    dropped_frames: u64,
}

impl AnimationState {
    pub fn new(initial_age: f32, camera_angle: f32, rotation_speed: f32) -> Self {
        let mut state = Self {
            age: 0.0,
            camera_angle: 0.0,
            rotation_speed,
            dropped_frames: 0,
        };
        state.age = wrap_age(f64::from(initial_age));
        state.set_camera_angle(camera_angle);
        state
    }

    /// Advance by one frame.
    ///
    /// Deltas outside `[0, MAX_FRAME_DELTA]` (negative, NaN, a backgrounded
    /// window) count as a dropped frame: the camera holds still and age moves
    /// by [`DROPPED_FRAME_AGE_STEP`].
    pub fn advance(&mut self, delta_seconds: f32) {
        if !(0.0..=MAX_FRAME_DELTA).contains(&delta_seconds) {
            self.dropped_frames += 1;
            log::debug!("Dropped frame with delta {delta_seconds}s");
            self.age = wrap_age(self.age + DROPPED_FRAME_AGE_STEP);
            return;
        }

        self.age = wrap_age(self.age + f64::from(delta_seconds));
        self.set_camera_angle(self.camera_angle + self.rotation_speed * delta_seconds);
    }

    /// Age in seconds, as fed to the shaders.
    pub fn age(&self) -> f32 {
        self.age as f32
    }

    /// Camera orbit angle in `[0, 2π)`.
    pub fn camera_angle(&self) -> f32 {
        self.camera_angle
    }

    /// Overwrite the camera angle. Any finite value is normalized.
    pub fn set_camera_angle(&mut self, angle: f32) {
        if angle.is_finite() {
            self.camera_angle = normalize_angle(angle);
        }
    }

    /// Rotate the camera by `delta` radians, e.g. from menu navigation.
    pub fn nudge_camera(&mut self, delta: f32) {
        self.set_camera_angle(self.camera_angle + delta);
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn set_rotation_speed(&mut self, speed: f32) {
        self.rotation_speed = speed;
    }

    /// Number of frames whose delta was rejected.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

fn wrap_age(age: f64) -> f64 {
    age.rem_euclid(AGE_WRAP_PERIOD)
}

/// Map any finite angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_age() {
        let mut state = AnimationState::new(60.0, 0.0, 0.5);
        state.advance(0.25);
        state.advance(0.25);
        assert!((state.age() - 60.5).abs() < 1e-5);
        assert!((state.camera_angle() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_angle_stays_in_range_for_many_deltas() {
        let mut state = AnimationState::new(0.0, 0.0, 5.0);
        for i in 0..10_000 {
            state.advance(0.001 + (i % 97) as f32 * 0.01);
            let angle = state.camera_angle();
            assert!((0.0..TAU).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn test_negative_delta_is_dropped_frame() {
        let mut state = AnimationState::new(60.0, 1.0, 0.5);
        state.advance(-5.0);
        assert_eq!(state.camera_angle(), 1.0);
        assert!((f64::from(state.age()) - (60.0 + DROPPED_FRAME_AGE_STEP)).abs() < 1e-4);
        assert!(state.age().is_finite());
        assert_eq!(state.dropped_frames(), 1);
    }

    #[test]
    fn test_huge_and_nan_deltas_are_dropped() {
        let mut state = AnimationState::new(10.0, 2.0, 0.5);
        state.advance(3600.0);
        state.advance(f32::NAN);
        state.advance(f32::INFINITY);
        assert_eq!(state.camera_angle(), 2.0);
        assert!(state.age() < 10.1);
        assert_eq!(state.dropped_frames(), 3);
    }

    #[test]
    fn test_boundary_deltas_are_accepted() {
        let mut state = AnimationState::new(0.0, 0.0, 1.0);
        state.advance(0.0);
        state.advance(MAX_FRAME_DELTA);
        assert_eq!(state.dropped_frames(), 0);
        assert!((state.camera_angle() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_age_wraps() {
        let mut state = AnimationState::new((AGE_WRAP_PERIOD - 0.5) as f32, 0.0, 0.0);
        state.advance(1.0);
        assert!((state.age() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_nudge_wraps_both_directions() {
        let mut state = AnimationState::new(0.0, 0.05, 0.0);
        state.nudge_camera(-0.1);
        assert!((state.camera_angle() - (TAU - 0.05)).abs() < 1e-5);
        state.nudge_camera(0.1);
        assert!((state.camera_angle() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_angle_ignored() {
        let mut state = AnimationState::new(0.0, 1.5, 0.0);
        state.set_camera_angle(f32::NAN);
        assert_eq!(state.camera_angle(), 1.5);
    }

    #[test]
    fn test_normalize_tiny_negative() {
        let angle = normalize_angle(-1e-9);
        assert!((0.0..TAU).contains(&angle));
    }
}
