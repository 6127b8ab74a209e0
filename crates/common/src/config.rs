//! Session configuration.
//!
//! Loaded once at session start (YAML or JSON, picked by file extension) and never
//! mutated afterwards. Every field has a default so partial files are fine.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which hand's pointing gesture starts the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerHand {
    #[default]
    Right,
    Either,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Width (x), height (y), depth (z) in meters.
    pub size: Vec3,
    pub floor_y: f32,
    /// Centre the room under the viewer instead of the host origin.
    pub spawn_around_viewer: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            size: Vec3::new(12.0, 3.2, 12.0),
            floor_y: 0.0,
            spawn_around_viewer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub trigger: TriggerHand,
    /// Index bend must be below this to count as straight.
    pub straight_max: f32,
    /// Middle, ring and little bend must be above this to count as curled.
    pub curled_min: f32,
    /// Joint angle that maps to a bend ratio of 1.0.
    pub reference_angle_deg: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerHand::Right,
            straight_max: 0.30,
            curled_min: 0.70,
            reference_angle_deg: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeaserConfig {
    pub enabled: bool,
    pub seconds: f32,
}

impl Default for TeaserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    pub enabled: bool,
    pub spawn_interval: f32,
    pub lifetime: f32,
    pub gaze_seconds: f32,
    pub max_angle_deg: f32,
    /// Uniform glyph scale is sampled in `[min, max]`.
    pub scale_range: [f32; 2],
    /// Inset from wall edges: `[horizontal, vertical]`.
    pub wall_inset: [f32; 2],
    pub one_at_a_time: bool,
    pub thickness: f32,
    /// Extra push off the wall surface on top of half the thickness.
    pub embed_epsilon: f32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval: 2.75,
            lifetime: 5.0,
            gaze_seconds: 3.0,
            max_angle_deg: 10.0,
            scale_range: [0.35, 0.6],
            wall_inset: [0.25, 0.25],
            one_at_a_time: true,
            thickness: 0.06,
            embed_epsilon: 0.01,
        }
    }
}

impl GlyphConfig {
    /// Copy with every value pulled into its usable range.
    pub fn sanitized(&self) -> Self {
        Self {
            enabled: self.enabled,
            spawn_interval: self.spawn_interval.max(0.2),
            lifetime: self.lifetime.max(0.2),
            gaze_seconds: self.gaze_seconds.max(0.1),
            max_angle_deg: self.max_angle_deg.clamp(2.0, 60.0),
            scale_range: [self.scale_range[0].max(0.05), self.scale_range[1].max(0.06)],
            wall_inset: [self.wall_inset[0].max(0.0), self.wall_inset[1].max(0.0)],
            one_at_a_time: self.one_at_a_time,
            thickness: self.thickness.max(0.01),
            embed_epsilon: self.embed_epsilon.max(0.0),
        }
    }
}

/// Text pushed to the session UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuText {
    pub title: String,
    pub start: String,
    /// `{seconds}` is replaced with the remaining whole seconds.
    pub teaser: String,
    pub win: String,
}

impl Default for MenuText {
    fn default() -> Self {
        Self {
            title: "NEON ARENA".into(),
            start: "Poke to start\nIndex finger straight, other fingers curled.".into(),
            teaser: "There is a glitch spot in the room.\n\
                     Point towards it for 3 seconds to find the secret key.\n\n\
                     Game starts in {seconds} seconds..."
                .into(),
            win: "You destroyed the secret shape!\n\nIt contained a secret key that says\nGOBLIN MACHINE!!!"
                .into(),
        }
    }
}

impl MenuText {
    pub fn teaser_text(&self, remaining: u32) -> String {
        self.teaser.replace("{seconds}", &remaining.to_string())
    }
}

/// Everything a session needs, supplied once at start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub room: RoomConfig,
    pub gesture: GestureConfig,
    pub teaser: TeaserConfig,
    pub glyph: GlyphConfig,
    pub messages: MenuText,
    /// Seed for glyph placement; random when absent.
    pub seed: Option<u64>,
}

impl ArenaConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values no clamp can make sense of.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.room.size;
        if !size.is_finite() || size.min_element() <= 0.0 {
            return Err(invalid("room.size", format!("must be positive, got {size}")));
        }
        if !self.room.floor_y.is_finite() {
            return Err(invalid("room.floor_y", "must be finite"));
        }
        positive("teaser.seconds", self.teaser.seconds)?;
        if self.teaser.seconds < 1.0 {
            return Err(invalid("teaser.seconds", "must be at least 1 second"));
        }
        positive("glyph.spawn_interval", self.glyph.spawn_interval)?;
        positive("glyph.lifetime", self.glyph.lifetime)?;
        positive("glyph.gaze_seconds", self.glyph.gaze_seconds)?;
        positive("glyph.max_angle_deg", self.glyph.max_angle_deg)?;
        positive("gesture.reference_angle_deg", self.gesture.reference_angle_deg)?;
        let [lo, hi] = self.glyph.scale_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(invalid(
                "glyph.scale_range",
                format!("expected min <= max, got [{lo}, {hi}]"),
            ));
        }
        let g = &self.gesture;
        if !(0.0..=1.0).contains(&g.straight_max) || !(0.0..=1.0).contains(&g.curled_min) {
            return Err(invalid("gesture", "bend thresholds must lie in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}
