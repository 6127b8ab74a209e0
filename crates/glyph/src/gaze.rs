use arena_common::math::angle_degrees;
use glam::Vec3;

/// Result of one gaze evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GazeState {
    /// Viewer is looking away; accumulated time was reset.
    NotLooking,
    /// Viewer is on target; `progress` is accumulated / required, below 1.
    Looking { progress: f32 },
    /// Threshold reached on this tick. Reported exactly once.
    Won,
    /// Already won; the timer no longer accumulates.
    Spent,
}

/// Continuous-gaze timer for one target.
///
/// Any tick spent looking away resets the accumulator, so only an uninterrupted
/// look of `required` seconds wins. The timer never touches its target; it only
/// reports [`GazeState::Won`] and lets the owner decide what to destroy.
#[derive(Debug, Clone)]
pub struct GazeTimer {
    target: Vec3,
    required: f32,
    max_angle_deg: f32,
    gaze_time: f32,
    looking: bool,
    spent: bool,
}

impl GazeTimer {
    pub fn new(target: Vec3, required: f32, max_angle_deg: f32) -> Self {
        Self {
            target,
            required,
            max_angle_deg,
            gaze_time: 0.0,
            looking: false,
            spent: false,
        }
    }

    pub fn tick(&mut self, viewer_position: Vec3, viewer_forward: Vec3, dt: f32) -> GazeState {
        if self.spent {
            return GazeState::Spent;
        }

        let dir = (self.target - viewer_position).normalize_or_zero();
        self.looking = angle_degrees(viewer_forward, dir) < self.max_angle_deg;

        if self.looking {
            self.gaze_time += dt;
        } else {
            self.gaze_time = 0.0;
        }

        if self.gaze_time >= self.required {
            self.spent = true;
            return GazeState::Won;
        }

        if self.looking {
            GazeState::Looking {
                progress: self.gaze_time / self.required,
            }
        } else {
            GazeState::NotLooking
        }
    }

    /// Seconds of uninterrupted gaze so far.
    pub fn gaze_time(&self) -> f32 {
        self.gaze_time
    }

    /// Whether the viewer was on target at the last tick.
    pub fn is_looking(&self) -> bool {
        self.looking
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn required(&self) -> f32 {
        self.required
    }
}
