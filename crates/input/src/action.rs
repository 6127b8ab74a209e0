/// A discrete command the session accepts besides the gesture itself.
///
/// Operator and developer shortcuts map to these so the menu can always be left,
/// even when no hand tracking is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Same as the trigger gesture: menu to teaser, or teaser straight to play.
    Start,
    /// Dev shortcut: jump straight into play from the menu or the teaser.
    Skip,
    /// Tear everything down and return to the menu.
    Rebuild,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

impl Action {
    /// Map a developer key name to an action.
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "enter" | "return" => Action::Start,
            "space" => Action::Skip,
            "r" | "f5" => Action::Rebuild,
            _ => Action::Noop,
        }
    }
}
