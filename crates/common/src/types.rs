use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one running session. Regenerated on every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_string()[..8])
    }
}

/// Handle of a spawned glyph target. Ids increase monotonically and are never reused
/// within a session, so the ordering doubles as spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "glyph#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Local +Z axis in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Head pose of the viewer for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for ViewerPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::Z,
        }
    }
}

impl ViewerPose {
    /// Pose at `position` looking straight at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            forward: (target - position).normalize_or_zero(),
        }
    }
}
