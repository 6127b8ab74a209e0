//! Presentation side of the arena: pure animation curves for the neon flourishes,
//! headless hosts for the scene and the session UI, and a renderer-agnostic
//! interface with a debug text renderer.
//!
//! # Invariants
//! - Renderers read snapshots; they never mutate session state.
//! - Flourish curves are pure functions of time and their parameters.

pub mod fx;
mod headless;
mod renderer;

pub use headless::{HeadlessScene, SceneGlyph, TextPanel};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "arena-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
