//! Tuning layer — loads the feeder configuration during `GameState::Loading`.
//!
//! Every gameplay constant lives in [`FeedConfig`]. Native builds read
//! `assets/config/feeder.ron`; a missing file means defaults, a broken one
//! means defaults plus a warning. The game never refuses to start over config.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::shared::*;

pub const CONFIG_PATH: &str = "assets/config/feeder.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse feeder config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{field} must be {requirement} (got {value})")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
}

/// Gameplay tuning. Distances are in viewport percent, speeds per tick.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub max_items: usize,
    pub spawn_interval_ms: u64,
    pub fall_speed: f32,
    pub anticipation_radius: f32,
    pub eat_radius: f32,
    /// Applied to `eat_radius` when a dragged item is released.
    pub release_multiplier: f32,
    /// Applied to `eat_radius` for passive eating while still dragging.
    pub auto_eat_fraction: f32,
    pub auto_eat_while_dragging: bool,
    /// Falling items whose y passes this line are recycled to the top.
    pub recycle_line: f32,
    pub spawn_height: f32,
    /// Horizontal inset; spawns land in [margin, 100 - margin).
    pub spawn_margin: f32,
    pub happy_duration_ms: u64,
    /// How close a press must land to an item to pick it up.
    pub grab_radius: f32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_items: 8,
            spawn_interval_ms: 2_000,
            fall_speed: 0.25,
            anticipation_radius: 12.0,
            eat_radius: 8.0,
            release_multiplier: 1.5,
            auto_eat_fraction: 0.8,
            auto_eat_while_dragging: false,
            recycle_line: 110.0,
            spawn_height: -10.0,
            spawn_margin: 10.0,
            happy_duration_ms: 700,
            grab_radius: 7.0,
        }
    }
}

impl FeedConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn happy_duration(&self) -> Duration {
        Duration::from_millis(self.happy_duration_ms)
    }

    pub fn release_eat_radius(&self) -> f32 {
        self.eat_radius * self.release_multiplier
    }

    pub fn auto_eat_radius(&self) -> f32 {
        self.eat_radius * self.auto_eat_fraction
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    requirement: "a positive number",
                    value,
                })
            }
        }

        if self.max_items == 0 {
            return Err(ConfigError::Invalid {
                field: "max_items",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        positive("fall_speed", self.fall_speed)?;
        positive("anticipation_radius", self.anticipation_radius)?;
        positive("eat_radius", self.eat_radius)?;
        positive("release_multiplier", self.release_multiplier)?;
        positive("auto_eat_fraction", self.auto_eat_fraction)?;
        positive("grab_radius", self.grab_radius)?;
        if !(0.0..50.0).contains(&self.spawn_margin) {
            return Err(ConfigError::Invalid {
                field: "spawn_margin",
                requirement: "within [0, 50)",
                value: self.spawn_margin,
            });
        }
        if !self.recycle_line.is_finite() || self.recycle_line <= self.spawn_height {
            return Err(ConfigError::Invalid {
                field: "recycle_line",
                requirement: "below spawn_height",
                value: self.recycle_line,
            });
        }
        Ok(())
    }

    /// Parses and validates a RON document. Missing fields take defaults.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

/// Reads the config file, `Ok(None)` when it does not exist.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_config_file(path: &std::path::Path) -> Result<Option<FeedConfig>, ConfigError> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    FeedConfig::from_ron_str(&source).map(Some)
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeedConfig>()
            .add_systems(OnEnter(GameState::Loading), load_feed_config);
    }
}

/// Populates [`FeedConfig`] and then moves on to the start screen.
fn load_feed_config(
    mut config: ResMut<FeedConfig>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    match load_config_file(std::path::Path::new(CONFIG_PATH)) {
        Ok(Some(loaded)) => {
            info!("[Config] Loaded {}", CONFIG_PATH);
            *config = loaded;
        }
        Ok(None) => info!("[Config] {} not found, using defaults", CONFIG_PATH),
        Err(e) => warn!("[Config] {}. Falling back to defaults.", e),
    }

    info!(
        "[Config] max_items={} spawn_interval={}ms eat_radius={} auto_eat={}",
        config.max_items,
        config.spawn_interval_ms,
        config.eat_radius,
        config.auto_eat_while_dragging
    );
    next_state.set(GameState::StartScreen);
}
