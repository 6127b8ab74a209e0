//! Glyph mini-game: short-lived targets spawned on the arena walls, each won by
//! holding the viewer's gaze on it long enough.
//!
//! # Invariants
//! - The scheduler is the only owner of live targets; timers only report.
//! - Per tick: expiry, then spawning, then gaze evaluation.
//! - A win is forwarded at most once per session.

mod gaze;
mod host;
mod placement;
mod scheduler;

pub use gaze::{GazeState, GazeTimer};
pub use host::{VisualHandle, VisualHost};
pub use placement::{inward_normal, spawn_pose};
pub use scheduler::{GlyphScheduler, GlyphTarget, RETRY_DELAY, SchedulerReport};

pub fn crate_info() -> &'static str {
    "arena-glyph v0.1.0"
}
