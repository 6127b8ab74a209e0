use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The four base walls of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WallId {
    North,
    South,
    East,
    West,
}

impl WallId {
    pub const ALL: [WallId; 4] = [WallId::North, WallId::South, WallId::East, WallId::West];

    pub fn index(self) -> usize {
        match self {
            WallId::North => 0,
            WallId::South => 1,
            WallId::East => 2,
            WallId::West => 3,
        }
    }
}

/// World-space frame of one wall quad.
///
/// `width` runs along `right`, `height` along `up`. `forward` is the quad normal;
/// hosts may hand walls over facing either way, placement works out the inward side
/// from the room anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallFrame {
    pub id: WallId,
    pub center: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub width: f32,
    pub height: f32,
}

/// Room anchor plus the wall slots used for glyph placement.
///
/// A slot is `None` when the host has no wall for it (torn down, not built yet).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Floor-level centre of the room.
    pub anchor: Vec3,
    /// Slots in `WallId::ALL` order.
    pub walls: [Option<WallFrame>; 4],
}

impl RoomLayout {
    /// A layout with no walls at all.
    pub fn empty(anchor: Vec3) -> Self {
        Self {
            anchor,
            walls: [None; 4],
        }
    }

    /// Build the four base walls of a room of `size` (x = width, y = height, z = depth)
    /// whose floor centre sits at `anchor`. Every wall faces into the room.
    pub fn build(size: Vec3, anchor: Vec3) -> Self {
        let half = size * 0.5;
        let wall = |id: WallId, offset: Vec3, forward: Vec3, width: f32| {
            let up = Vec3::Y;
            WallFrame {
                id,
                center: anchor + offset,
                right: up.cross(forward),
                up,
                forward,
                width,
                height: size.y,
            }
        };
        Self {
            anchor,
            walls: [
                Some(wall(WallId::North, Vec3::new(0.0, half.y, half.z), Vec3::NEG_Z, size.x)),
                Some(wall(WallId::South, Vec3::new(0.0, half.y, -half.z), Vec3::Z, size.x)),
                Some(wall(WallId::East, Vec3::new(half.x, half.y, 0.0), Vec3::NEG_X, size.z)),
                Some(wall(WallId::West, Vec3::new(-half.x, half.y, 0.0), Vec3::X, size.z)),
            ],
        }
    }

    /// Where to anchor the room: under the viewer when `around_viewer` and a viewer
    /// position is known, otherwise under `fallback`. Always at `floor_y`.
    pub fn anchor_for(
        viewer: Option<Vec3>,
        fallback: Vec3,
        floor_y: f32,
        around_viewer: bool,
    ) -> Vec3 {
        let base = match viewer {
            Some(v) if around_viewer => v,
            _ if around_viewer => Vec3::ZERO,
            _ => fallback,
        };
        Vec3::new(base.x, floor_y, base.z)
    }

    pub fn wall(&self, id: WallId) -> Option<&WallFrame> {
        self.walls[id.index()].as_ref()
    }

    /// Remove a wall slot (host destroyed the wall).
    pub fn without(mut self, id: WallId) -> Self {
        self.walls[id.index()] = None;
        self
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| w.is_some()).count()
    }

    /// Wall slots the host has not provided.
    pub fn missing(&self) -> Vec<WallId> {
        WallId::ALL
            .into_iter()
            .filter(|id| self.wall(*id).is_none())
            .collect()
    }
}
