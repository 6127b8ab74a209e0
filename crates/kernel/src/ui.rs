use serde::{Deserialize, Serialize};

/// Why the menu cannot accept the trigger gesture yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitReason {
    /// No hand-tracking runtime is attached.
    NoHandTracking,
}

impl std::fmt::Display for WaitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitReason::NoHandTracking => write!(f, "no hand tracking subsystem"),
        }
    }
}

/// Receives what the player should see. Push-only: the core never reads back.
pub trait SessionUi {
    /// Menu text while idle: title, trigger hint, live gesture status or a wait reason.
    fn show_idle_menu(&mut self, text: &str);

    /// Teaser countdown, refreshed every tick.
    fn show_teaser(&mut self, remaining_secs: u32, text: &str);

    /// Remove menu text when play begins.
    fn clear_menu(&mut self);

    fn show_win(&mut self, text: &str);

    fn hide_win(&mut self);
}
