//! Text composition for the idle menu.

use arena_common::{MenuText, TriggerHand};

use crate::ui::WaitReason;

/// Hint line telling the player which hand the trigger listens to.
pub fn trigger_hint(trigger: TriggerHand) -> &'static str {
    match trigger {
        TriggerHand::Right => "(right hand)",
        TriggerHand::Either => "(either hand)",
    }
}

/// One-line gesture status shown under the start text.
pub fn status_line(wait: Option<WaitReason>, pointing: bool) -> String {
    match wait {
        Some(reason) => format!("Waiting: {reason}"),
        None if pointing => "Pointing: yes".to_string(),
        None => "Pointing: no".to_string(),
    }
}

/// Full idle menu: title (left out when empty), start text, trigger hint and status.
pub fn idle_text(
    messages: &MenuText,
    trigger: TriggerHand,
    wait: Option<WaitReason>,
    pointing: bool,
) -> String {
    let body = format!(
        "{}\n{}\n\n{}",
        messages.start,
        trigger_hint(trigger),
        status_line(wait, pointing)
    );
    if messages.title.is_empty() {
        body
    } else {
        format!("{}\n\n{body}", messages.title)
    }
}
