//! # Engine Configuration
//!
//! Every tuning constant of the simulation lives here, grouped per subsystem.
//!
//! ## Presets
//! - `realistic()`: default balance
//! - `arcade()`: wider timing windows, more forgiving catches for the batting side
//! - `simulation()`: tighter timing, sharper fielding
//! - `deterministic()`: no seam or accuracy jitter (tests)
//!
//! ## Usage
//! ```rust
//! use cricket_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let arcade = EngineConfig::arcade();
//! assert!(arcade.shots.window_scale > config.shots.window_scale);
//! ```
//!
//! ## Environment Variables
//! - `CRICKET_CONFIG_PROFILE`: select a preset (realistic, arcade, simulation, deterministic)

mod bowling_config;
mod fielding_config;
mod physics_config;
mod rules_config;
mod shot_config;

pub use bowling_config::BowlingConfig;
pub use fielding_config::FieldingConfig;
pub use physics_config::PhysicsConfig;
pub use rules_config::RulesConfig;
pub use shot_config::ShotConfig;

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::Result;

pub const PROFILE_ENV: &str = "CRICKET_CONFIG_PROFILE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub shots: ShotConfig,
    #[serde(default)]
    pub bowling: BowlingConfig,
    #[serde(default)]
    pub fielding: FieldingConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl EngineConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.shots.window_scale = 1.5;
        cfg.shots.length_mismatch_penalty = 0.1;
        cfg.fielding.catch_base_probability = 0.8;
        cfg.fielding.run_speed_mps = 6.0;
        cfg.bowling.line_sigma_m = 0.3;
        cfg
    }

    pub fn simulation() -> Self {
        let mut cfg = Self::default();
        cfg.shots.window_scale = 0.75;
        cfg.shots.length_mismatch_penalty = 0.35;
        cfg.fielding.catch_base_probability = 0.98;
        cfg.fielding.run_speed_mps = 7.0;
        cfg.fielding.throw_speed_mps = 32.0;
        cfg.bowling.settle_balls = 30;
        cfg
    }

    /// No seam movement, no line/length scatter, no oversteps
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.physics.seam_sigma_mps = 0.0;
        cfg.physics.max_seam_mps = 0.0;
        cfg.bowling.line_sigma_m = 0.0;
        cfg.bowling.length_sigma_m = 0.0;
        cfg.bowling.overstep_chance = 0.0;
        cfg
    }

    pub fn from_profile(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "realistic" | "default" => Some(Self::realistic()),
            "arcade" => Some(Self::arcade()),
            "simulation" => Some(Self::simulation()),
            "deterministic" => Some(Self::deterministic()),
            _ => None,
        }
    }

    pub fn from_env_or_default() -> Self {
        match env::var(PROFILE_ENV) {
            Ok(name) => Self::from_profile(&name).unwrap_or_else(|| {
                log::warn!("Unknown {PROFILE_ENV}='{name}', using realistic preset");
                Self::realistic()
            }),
            Err(_) => Self::realistic(),
        }
    }

    /// Parse a full config; missing sections fall back to defaults and
    /// out-of-range values are clamped.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate();
        Ok(cfg)
    }

    pub fn validate(&mut self) {
        self.physics.validate();
        self.shots.validate();
        self.bowling.validate();
        self.fielding.validate();
        self.rules.validate();
    }
}
