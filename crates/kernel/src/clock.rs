use std::time::Instant;

/// Unscaled, monotonically increasing time source in seconds.
///
/// Session and gaze timing read this instead of any simulation clock, so a paused
/// or slowed simulation never stalls the menu or the game timers.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real monotonic time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand. Used by the simulator and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: start }
    }

    /// Move forward by `dt` seconds. Negative steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt > 0.0 {
            self.now += dt;
        }
    }

    /// Jump to `t`, never backwards.
    pub fn set(&mut self, t: f64) {
        self.now = self.now.max(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}
