//! Hand input: joint poses to pointing gestures, plus the discrete session actions.
//!
//! # Invariants
//! - Classification is a pure function of the current pose.
//! - Missing tracking data biases towards "not pointing", never towards a false start.

pub mod action;
pub mod gesture;
pub mod tracker;

pub use action::Action;
pub use gesture::{Finger, FingerBends, HandPose, Handedness, JointKind, JointPose, PointDetector, classify, pointing_bends};
pub use tracker::{HandTracker, NoHandTracking, StaticHands};

pub fn crate_info() -> &'static str {
    "arena-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
