//! Animation curves for the neon flourishes.
//!
//! Hosts feed these into material parameters (emission, outline width, texture
//! offsets) each frame. Everything here is time in, value out.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

/// Base colour of a glyph before emission.
pub const GLYPH_COLOR: Vec3 = Vec3::new(0.2, 1.0, 0.2);
/// Emissive gain applied on top of [`GLYPH_COLOR`].
pub const GLYPH_EMISSIVE_GAIN: f32 = 3.0;
/// Emission multiplier while the viewer is looking at a glyph.
pub const GAZE_EMISSION_BOOST: f32 = 1.5;

/// Start-title font size at scale 1.
pub const TITLE_FONT_SIZE: f32 = 36.0;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `x` between the two edges.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Emission intensity oscillating between 0 and `intensity`.
pub fn pulse_emission(t: f32, speed: f32, intensity: f32) -> f32 {
    ((t * speed).sin() * 0.5 + 0.5) * intensity
}

/// Emission colour of a live glyph, boosted while it is being looked at.
pub fn glyph_emission(t: f32, pulse_speed: f32, looking: bool) -> Vec3 {
    let boost = if looking { GAZE_EMISSION_BOOST } else { 1.0 };
    GLYPH_COLOR * GLYPH_EMISSIVE_GAIN * pulse_emission(t, pulse_speed, 1.0) * boost
}

/// Breathing scale of the start title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitlePulse {
    phase: f32,
}

impl TitlePulse {
    const MIN: f32 = 0.92;
    const MAX: f32 = 1.10;
    const RATE: f32 = 2.0;

    /// Advance by `dt` and return the new scale.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.phase += dt * Self::RATE;
        self.scale()
    }

    pub fn scale(&self) -> f32 {
        lerp(Self::MIN, Self::MAX, (self.phase.sin() + 1.0) * 0.5)
    }

    pub fn font_size(&self) -> f32 {
        TITLE_FONT_SIZE * self.scale()
    }
}

/// Vertical bob of a floating object around its rest position.
#[derive(Debug, Clone, Copy)]
pub struct FloatBob {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for FloatBob {
    fn default() -> Self {
        Self {
            amplitude: 0.08,
            frequency: 1.1,
        }
    }
}

impl FloatBob {
    pub fn offset(&self, t: f32) -> f32 {
        (t * self.frequency).sin() * self.amplitude
    }

    pub fn position(&self, rest: Vec3, t: f32) -> Vec3 {
        rest + Vec3::Y * self.offset(t)
    }
}

/// Outline width easing in after a start time.
#[derive(Debug, Clone, Copy)]
pub struct OutlineFade {
    pub start: f32,
    pub duration: f32,
    pub target_width: f32,
}

impl OutlineFade {
    pub fn new(start: f32) -> Self {
        Self {
            start,
            duration: 0.12,
            target_width: 2.2,
        }
    }

    pub fn width(&self, t: f32) -> f32 {
        let k = ((t - self.start) / self.duration.max(0.001)).clamp(0.0, 1.0);
        self.target_width * smoothstep(0.0, 1.0, k)
    }
}

/// Linear fade of a core colour to black.
#[derive(Debug, Clone, Copy)]
pub struct CoreFade {
    pub from: Vec3,
    pub duration: f32,
}

impl Default for CoreFade {
    fn default() -> Self {
        Self {
            from: Vec3::splat(0.08),
            duration: 0.25,
        }
    }
}

impl CoreFade {
    pub fn color(&self, elapsed: f32) -> Vec3 {
        let k = (elapsed / self.duration.max(0.001)).clamp(0.0, 1.0);
        self.from.lerp(Vec3::ZERO, k)
    }
}

/// Texture offset scroller with a slow horizontal sway (the "data rain").
#[derive(Debug, Clone, Copy)]
pub struct UvScroller {
    pub speed: Vec2,
    pub sway_variance: f32,
    pub sway_hz: f32,
    uv: Vec2,
}

impl Default for UvScroller {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -1.0), 0.0)
    }
}

impl UvScroller {
    pub fn new(speed: Vec2, sway_variance: f32) -> Self {
        Self {
            speed,
            sway_variance,
            sway_hz: 0.07,
            uv: Vec2::ZERO,
        }
    }

    /// Advance by `dt` at absolute time `t`; returns the offset to apply.
    pub fn advance(&mut self, t: f32, dt: f32) -> Vec2 {
        self.uv += self.speed * dt;
        let sway = self.sway_variance * (t * TAU * self.sway_hz).sin();
        Vec2::new(self.uv.x + sway, self.uv.y)
    }
}
