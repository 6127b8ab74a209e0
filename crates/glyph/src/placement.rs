use arena_common::math::{look_rotation, sign_non_zero};
use arena_common::{GlyphConfig, Transform, WallFrame};
use glam::Vec3;
use rand::Rng;

/// Largest share of a half-dimension an inset may eat (keeps a 5% strip usable).
const MAX_INSET_SHARE: f32 = 0.45;
/// Smallest half-thickness used for the surface offset.
const MIN_HALF_THICKNESS: f32 = 0.005;

/// Wall normal pointing into the room, decided by which side the anchor is on.
pub fn inward_normal(wall: &WallFrame, anchor: Vec3) -> Vec3 {
    let to_room = anchor - wall.center;
    wall.forward * sign_non_zero(wall.forward.dot(to_room))
}

/// Random glyph pose on `wall`: inside the inset rectangle, pushed off the surface
/// towards the room interior, facing inward.
///
/// `config` is expected to be sanitized.
pub fn spawn_pose(
    wall: &WallFrame,
    anchor: Vec3,
    config: &GlyphConfig,
    rng: &mut impl Rng,
) -> Transform {
    let half_w = wall.width * 0.5 - config.wall_inset[0].clamp(0.0, wall.width * MAX_INSET_SHARE);
    let half_h = wall.height * 0.5 - config.wall_inset[1].clamp(0.0, wall.height * MAX_INSET_SHARE);
    let rx = symmetric(rng, half_w);
    let ry = symmetric(rng, half_h);

    let inward = inward_normal(wall, anchor);
    let half_t = (config.thickness * 0.5).max(MIN_HALF_THICKNESS);
    let offset = half_t + config.embed_epsilon.max(0.0);

    let position = wall.center + wall.right * rx + wall.up * ry + inward * offset;

    let [lo, hi] = config.scale_range;
    let s = if hi > lo { rng.gen_range(lo..=hi) } else { lo };

    Transform {
        position,
        rotation: look_rotation(inward, wall.up),
        scale: Vec3::new(s, s, config.thickness.max(0.01)),
    }
}

fn symmetric(rng: &mut impl Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}
