//! Developer Tooling: session inspector.
//!
//! # Invariants
//! - Tools only read snapshots; they never drive the session.

mod inspector;

pub use inspector::{SessionInspector, SessionSummary, TargetDetail};

pub fn crate_info() -> &'static str {
    "arena-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
