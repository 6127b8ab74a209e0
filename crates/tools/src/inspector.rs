use arena_common::{SessionId, TargetId, WallId};
use arena_kernel::{ArenaSnapshot, SessionState, WaitReason};
use glam::Vec3;

/// Session inspector for developer tooling.
///
/// Read-only queries against arena snapshots for debugging and development UI.
pub struct SessionInspector;

impl SessionInspector {
    /// Produce a summary of the session.
    pub fn summary(snapshot: &ArenaSnapshot) -> SessionSummary {
        SessionSummary {
            session: snapshot.session,
            state: snapshot.state,
            now: snapshot.now,
            countdown: snapshot.countdown,
            wait: snapshot.wait,
            live_targets: snapshot.live.len(),
            next_spawn: snapshot.next_spawn,
            transitions: snapshot.transitions,
        }
    }

    /// Details of one live target, with the time it has left.
    pub fn inspect_target(snapshot: &ArenaSnapshot, id: TargetId) -> Option<TargetDetail> {
        snapshot.target(id).map(|t| TargetDetail {
            id,
            wall: t.wall,
            position: t.position,
            remaining: (t.deadline - snapshot.now).max(0.0),
            gaze_time: t.gaze_time,
            looking: t.looking,
        })
    }

    /// Live target ids in spawn order.
    pub fn list_targets(snapshot: &ArenaSnapshot) -> Vec<TargetId> {
        snapshot.live.iter().map(|t| t.id).collect()
    }

    /// The target the viewer is currently locked on, if any.
    pub fn gazed_target(snapshot: &ArenaSnapshot) -> Option<TargetId> {
        snapshot.live.iter().find(|t| t.looking).map(|t| t.id)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session: SessionId,
    pub state: SessionState,
    pub now: f64,
    pub countdown: Option<u32>,
    pub wait: Option<WaitReason>,
    pub live_targets: usize,
    pub next_spawn: Option<f64>,
    pub transitions: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session {}: state={:?} t={:.2} targets={} transitions={}",
            self.session, self.state, self.now, self.live_targets, self.transitions
        )?;
        if let Some(remaining) = self.countdown {
            write!(f, " countdown={remaining}")?;
        }
        if let Some(at) = self.next_spawn {
            write!(f, " next_spawn={at:.2}")?;
        }
        if let Some(reason) = self.wait {
            write!(f, " waiting=\"{reason}\"")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TargetDetail {
    pub id: TargetId,
    pub wall: WallId,
    pub position: Vec3,
    /// Seconds until expiry.
    pub remaining: f64,
    pub gaze_time: f32,
    pub looking: bool,
}

impl std::fmt::Display for TargetDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on {:?} pos=({:.2}, {:.2}, {:.2}) remaining={:.2}s gaze={:.2}s{}",
            self.id,
            self.wall,
            self.position.x,
            self.position.y,
            self.position.z,
            self.remaining,
            self.gaze_time,
            if self.looking { " (looking)" } else { "" }
        )
    }
}
