//! Shot timing tuning

use serde::{Deserialize, Serialize};

use crate::error::clamp_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    /// Multiplier on every shot's timing half-window
    pub window_scale: f32,
    /// Timing quality at or above which a shot is "perfect"
    pub perfect_threshold: f32,
    /// Timing quality at or above which a shot is "good"
    pub good_threshold: f32,
    /// Timing quality at or above which a shot is "poor" (below: edged)
    pub poor_threshold: f32,
    /// Quality lost when the ball pitched outside the shot's preferred length
    pub length_mismatch_penalty: f32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            window_scale: 1.0,
            perfect_threshold: 0.8,
            good_threshold: 0.5,
            poor_threshold: 0.2,
            length_mismatch_penalty: 0.25,
        }
    }
}

impl ShotConfig {
    pub fn validate(&mut self) {
        self.window_scale = clamp_config("shots.window_scale", self.window_scale, 0.25, 4.0);
        self.poor_threshold = clamp_config("shots.poor_threshold", self.poor_threshold, 0.0, 1.0);
        self.good_threshold =
            clamp_config("shots.good_threshold", self.good_threshold, self.poor_threshold, 1.0);
        self.perfect_threshold =
            clamp_config("shots.perfect_threshold", self.perfect_threshold, self.good_threshold, 1.0);
        self.length_mismatch_penalty =
            clamp_config("shots.length_mismatch_penalty", self.length_mismatch_penalty, 0.0, 1.0);
    }
}
