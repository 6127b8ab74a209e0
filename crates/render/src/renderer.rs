use std::fmt::Write;

use arena_common::ViewerPose;
use arena_common::math::angle_degrees;
use arena_kernel::ArenaSnapshot;
use glam::Vec3;

use crate::fx;

/// Viewer configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_viewer(ViewerPose::default())
    }
}

impl RenderView {
    pub fn from_viewer(viewer: ViewerPose) -> Self {
        Self {
            eye: viewer.position,
            forward: viewer.forward,
            fov_degrees: 90.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a session snapshot and a view, then produces output. It never
/// mutates the session.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given snapshot and view.
    fn render(&self, snapshot: &ArenaSnapshot, view: &RenderView) -> Self::Output;
}

/// Human-readable rendering of a snapshot, for the CLI, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, snapshot: &ArenaSnapshot, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Arena {} (t={:.2}s, state={:?}) ===",
            snapshot.session, snapshot.now, snapshot.state
        );
        if let Some(remaining) = snapshot.countdown {
            let _ = writeln!(out, "Countdown: {remaining}s");
        }
        if let Some(reason) = snapshot.wait {
            let _ = writeln!(out, "Waiting: {reason}");
        }
        let _ = writeln!(
            out,
            "View: eye=({:.1}, {:.1}, {:.1}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        );
        let _ = writeln!(out, "Glyphs: {}", snapshot.live.len());

        let t = snapshot.now as f32;
        for target in &snapshot.live {
            let p = target.position;
            let angle = angle_degrees(view.forward, p - view.eye);
            let glow = fx::glyph_emission(t, target.pulse_speed, target.looking).length();
            let _ = writeln!(
                out,
                "  [{}] {:?} pos=({:.2}, {:.2}, {:.2}) angle={:.1} gaze={:.2}s ttl={:.2}s glow={:.2}{}",
                target.id,
                target.wall,
                p.x,
                p.y,
                p.z,
                angle,
                target.gaze_time,
                (target.deadline - snapshot.now).max(0.0),
                glow,
                if target.looking { " *" } else { "" }
            );
        }

        out
    }
}
