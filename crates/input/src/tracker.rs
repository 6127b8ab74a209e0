use crate::gesture::{HandPose, Handedness};

/// Source of hand poses, polled once per tick.
///
/// The core only reads from it. An implementation that is not bound to a tracking
/// runtime keeps the session waiting in the menu.
pub trait HandTracker {
    /// Whether a hand-tracking runtime is attached at all.
    fn is_bound(&self) -> bool {
        true
    }

    /// Current pose of one hand. Untracked hands report `tracked == false`.
    fn hand(&self, side: Handedness) -> HandPose;
}

/// Stand-in used when no tracking runtime exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandTracking;

impl HandTracker for NoHandTracking {
    fn is_bound(&self) -> bool {
        false
    }

    fn hand(&self, _side: Handedness) -> HandPose {
        HandPose::untracked()
    }
}

/// Hands set directly by the caller: headless runs, scripted demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticHands {
    pub left: HandPose,
    pub right: HandPose,
}

impl StaticHands {
    pub fn set(&mut self, side: Handedness, pose: HandPose) {
        match side {
            Handedness::Left => self.left = pose,
            Handedness::Right => self.right = pose,
        }
    }
}

impl HandTracker for StaticHands {
    fn hand(&self, side: Handedness) -> HandPose {
        match side {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }
}
