use arena_common::math::{angle_degrees, clamp01};
use arena_common::{GestureConfig, TriggerHand};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::tracker::HandTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// The four fingers that take part in the pointing gesture. The thumb is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Little];

    fn index(self) -> usize {
        self as usize
    }
}

/// Joints sampled per finger, from the fingertip inwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    Tip,
    Intermediate,
    Proximal,
}

impl JointKind {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl JointPose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// One hand as reported by the tracker for a single tick.
///
/// Joint slots are `None` when the tracker could not resolve that joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    pub tracked: bool,
    joints: [[Option<JointPose>; 3]; 4],
}

impl Default for HandPose {
    fn default() -> Self {
        Self::untracked()
    }
}

/// Phalanx lengths used by [`HandPose::synthetic`], in meters.
const SYNTH_PROXIMAL_LEN: f32 = 0.04;
const SYNTH_DISTAL_LEN: f32 = 0.03;
const SYNTH_FINGER_SPACING: f32 = 0.02;

impl HandPose {
    pub fn untracked() -> Self {
        Self {
            tracked: false,
            joints: [[None; 3]; 4],
        }
    }

    /// Tracked hand with no joints resolved yet.
    pub fn tracked() -> Self {
        Self {
            tracked: true,
            ..Self::untracked()
        }
    }

    pub fn joint(&self, finger: Finger, kind: JointKind) -> Option<JointPose> {
        self.joints[finger.index()][kind.index()]
    }

    pub fn set_joint(&mut self, finger: Finger, kind: JointKind, pose: Option<JointPose>) {
        self.joints[finger.index()][kind.index()] = pose;
    }

    pub fn with_joint(mut self, finger: Finger, kind: JointKind, pose: Option<JointPose>) -> Self {
        self.set_joint(finger, kind, pose);
        self
    }

    /// A tracked hand whose fingers are bent by the given joint angles (degrees,
    /// index/middle/ring/little). Used by the simulator and tests.
    pub fn synthetic(bend_degrees: [f32; 4]) -> Self {
        let mut hand = Self::tracked();
        for finger in Finger::ALL {
            let x = finger.index() as f32 * SYNTH_FINGER_SPACING;
            let proximal = Vec3::new(x, 0.0, 0.0);
            let intermediate = proximal + Vec3::Z * SYNTH_PROXIMAL_LEN;
            let bend = bend_degrees[finger.index()].to_radians();
            let tip = intermediate + Vec3::new(0.0, -bend.sin(), bend.cos()) * SYNTH_DISTAL_LEN;
            hand.set_joint(finger, JointKind::Proximal, Some(JointPose::at(proximal)));
            hand.set_joint(finger, JointKind::Intermediate, Some(JointPose::at(intermediate)));
            hand.set_joint(finger, JointKind::Tip, Some(JointPose::at(tip)));
        }
        hand
    }

    /// Index straight, the rest curled.
    pub fn pointing() -> Self {
        Self::synthetic([0.0, 90.0, 90.0, 90.0])
    }

    pub fn open() -> Self {
        Self::synthetic([0.0; 4])
    }

    pub fn fist() -> Self {
        Self::synthetic([90.0; 4])
    }
}

/// Bend ratio per finger: 0 is straight, 1 is fully bent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerBends {
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
    pub little: f32,
}

impl FingerBends {
    pub fn measure(hand: &HandPose, config: &GestureConfig) -> Self {
        let bend = |f| finger_bend(hand, f, config.reference_angle_deg);
        Self {
            index: bend(Finger::Index),
            middle: bend(Finger::Middle),
            ring: bend(Finger::Ring),
            little: bend(Finger::Little),
        }
    }

    pub fn is_pointing(&self, config: &GestureConfig) -> bool {
        self.index < config.straight_max
            && self.middle > config.curled_min
            && self.ring > config.curled_min
            && self.little > config.curled_min
    }
}

/// Normalized curl of one finger from the angle between its distal and proximal
/// segments. Missing joints count as fully bent.
pub fn finger_bend(hand: &HandPose, finger: Finger, reference_deg: f32) -> f32 {
    let joints = (
        hand.joint(finger, JointKind::Tip),
        hand.joint(finger, JointKind::Intermediate),
        hand.joint(finger, JointKind::Proximal),
    );
    let (Some(tip), Some(mid), Some(prox)) = joints else {
        return 1.0;
    };
    let tip_vec = tip.position - mid.position;
    let mid_vec = mid.position - prox.position;
    clamp01(angle_degrees(tip_vec, mid_vec) / reference_deg)
}

/// Whether the hand is making the pointing gesture. Untracked hands never point.
pub fn classify(hand: &HandPose, config: &GestureConfig) -> bool {
    pointing_bends(hand, config).is_some()
}

/// The measured bends when the hand is pointing, `None` otherwise.
pub fn pointing_bends(hand: &HandPose, config: &GestureConfig) -> Option<FingerBends> {
    if !hand.tracked {
        return None;
    }
    let bends = FingerBends::measure(hand, config);
    bends.is_pointing(config).then_some(bends)
}

/// Turns the per-tick pointing signal into a rising edge.
#[derive(Debug, Clone, Default)]
pub struct PointDetector {
    was_pointing: bool,
}

impl PointDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the tracker once. Returns true only on the tick the trigger gesture starts.
    pub fn update(&mut self, tracker: &impl HandTracker, config: &GestureConfig) -> bool {
        let right = self.sample(tracker, Handedness::Right, config);
        let pointing = match config.trigger {
            TriggerHand::Right => right,
            TriggerHand::Either => right || self.sample(tracker, Handedness::Left, config),
        };
        let edge = pointing && !self.was_pointing;
        self.was_pointing = pointing;
        edge
    }

    /// Whether the trigger gesture was held on the last sample.
    pub fn is_pointing(&self) -> bool {
        self.was_pointing
    }

    pub fn reset(&mut self) {
        self.was_pointing = false;
    }

    fn sample(&self, tracker: &impl HandTracker, side: Handedness, config: &GestureConfig) -> bool {
        let hand = tracker.hand(side);
        let Some(bends) = pointing_bends(&hand, config) else {
            tracing::trace!(?side, tracked = hand.tracked, "hand not pointing");
            return false;
        };
        if !self.was_pointing {
            tracing::debug!(
                ?side,
                index = bends.index,
                middle = bends.middle,
                ring = bends.ring,
                little = bends.little,
                "poke edge"
            );
        }
        true
    }
}
