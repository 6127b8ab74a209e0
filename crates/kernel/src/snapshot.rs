use arena_common::{SessionId, TargetId, WallId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::session::SessionState;
use crate::ui::WaitReason;

/// Read-only view of one live glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub id: TargetId,
    pub wall: WallId,
    pub position: Vec3,
    pub deadline: f64,
    pub gaze_time: f32,
    pub looking: bool,
    /// Emission pulse speed the host animates this glyph with.
    pub pulse_speed: f32,
}

/// Point-in-time state of an [`crate::Arena`], for diagnostics and renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub session: SessionId,
    pub state: SessionState,
    pub now: f64,
    /// Remaining teaser seconds while in the teaser.
    pub countdown: Option<u32>,
    pub wait: Option<WaitReason>,
    pub pointing: bool,
    pub live: Vec<TargetInfo>,
    /// Next spawn attempt while the scheduler runs.
    pub next_spawn: Option<f64>,
    /// Number of transitions recorded this session.
    pub transitions: usize,
}

impl ArenaSnapshot {
    pub fn target(&self, id: TargetId) -> Option<&TargetInfo> {
        self.live.iter().find(|t| t.id == id)
    }
}
