use std::collections::BTreeMap;

use arena_common::Transform;
use arena_glyph::{VisualHandle, VisualHost};
use arena_kernel::SessionUi;

/// A glyph materialised by [`HeadlessScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGlyph {
    pub handle: VisualHandle,
    pub pose: Transform,
}

/// In-memory scene: records glyph visuals instead of drawing them.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next: u64,
    glyphs: BTreeMap<VisualHandle, SceneGlyph>,
    spawned: usize,
    destroyed: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &SceneGlyph> {
        self.glyphs.values()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&SceneGlyph> {
        self.glyphs.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Total visuals created over the scene's lifetime.
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl VisualHost for HeadlessScene {
    fn spawn_visual(&mut self, pose: &Transform) -> VisualHandle {
        self.next += 1;
        let handle = VisualHandle(self.next);
        self.glyphs.insert(handle, SceneGlyph { handle, pose: *pose });
        self.spawned += 1;
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if self.glyphs.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            tracing::warn!(?handle, "destroy of unknown visual");
        }
    }
}

/// Text-only session UI. Keeps the current panel contents plus a log of every
/// distinct message shown, in order.
#[derive(Debug, Default)]
pub struct TextPanel {
    menu: Option<String>,
    countdown: Option<u32>,
    win: Option<String>,
    log: Vec<String>,
}

impl TextPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(&self) -> Option<&str> {
        self.menu.as_deref()
    }

    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn win(&self) -> Option<&str> {
        self.win.as_deref()
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    fn record(&mut self, line: String) {
        if self.log.last() != Some(&line) {
            self.log.push(line);
        }
    }
}

impl SessionUi for TextPanel {
    fn show_idle_menu(&mut self, text: &str) {
        if self.menu.as_deref() != Some(text) {
            self.record(format!("[menu] {}", text.replace('\n', " / ")));
        }
        self.menu = Some(text.to_string());
        self.countdown = None;
    }

    fn show_teaser(&mut self, remaining_secs: u32, text: &str) {
        if self.countdown != Some(remaining_secs) {
            self.record(format!("[teaser] {remaining_secs}s"));
        }
        self.menu = Some(text.to_string());
        self.countdown = Some(remaining_secs);
    }

    fn clear_menu(&mut self) {
        if self.menu.is_some() {
            self.record("[menu] cleared".to_string());
        }
        self.menu = None;
        self.countdown = None;
    }

    fn show_win(&mut self, text: &str) {
        self.record(format!("[win] {}", text.replace('\n', " / ")));
        self.win = Some(text.to_string());
    }

    fn hide_win(&mut self) {
        self.win = None;
    }
}
