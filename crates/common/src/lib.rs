//! Shared types for the neon arena core: ids, transforms, room geometry,
//! angle helpers and the session configuration.
//!
//! # Invariants
//! - Configuration is immutable once a session starts.
//! - Angles follow the engine convention (degrees, 0 for degenerate vectors).

pub mod config;
pub mod math;
pub mod room;
pub mod types;

pub use config::{
    ArenaConfig, ConfigError, GestureConfig, GlyphConfig, MenuText, RoomConfig, TeaserConfig,
    TriggerHand,
};
pub use room::{RoomLayout, WallFrame, WallId};
pub use types::{SessionId, TargetId, Transform, ViewerPose};
