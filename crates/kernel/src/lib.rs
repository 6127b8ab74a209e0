//! Session kernel: the Idle → Teaser → Playing → Won lifecycle and the controller
//! that ties gestures, the glyph scheduler and the UI together.
//!
//! # Invariants
//! - State only changes through explicit transitions, each one recorded.
//! - Idle → Teaser → Playing never reverses; Won is terminal until a rebuild.
//! - All timing reads the injected unscaled clock.

pub mod arena;
pub mod clock;
pub mod menu;
pub mod session;
pub mod snapshot;
pub mod ui;

pub use arena::{Arena, TickReport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{Countdown, SessionMachine, SessionState, Transition, TransitionError, Trigger};
pub use snapshot::{ArenaSnapshot, TargetInfo};
pub use ui::{SessionUi, WaitReason};

pub fn crate_info() -> &'static str {
    "arena-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
