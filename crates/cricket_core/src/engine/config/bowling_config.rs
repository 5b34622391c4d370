//! Automatic bowler tuning

use serde::{Deserialize, Serialize};

use crate::error::clamp_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BowlingConfig {
    /// Line error standard deviation at the start of an innings (m)
    pub line_sigma_m: f32,
    /// Length error standard deviation at the start of an innings (m)
    pub length_sigma_m: f32,
    /// Legal balls until the bowler is fully settled
    pub settle_balls: u32,
    /// Fraction of the initial variance left once settled
    pub settled_variance_factor: f32,
    /// Overstep no-ball chance for an unsettled bowler
    pub overstep_chance: f32,
    /// Multiplier on every delivery speed
    pub speed_scale: f32,
}

impl Default for BowlingConfig {
    fn default() -> Self {
        Self {
            line_sigma_m: 0.22,
            length_sigma_m: 0.6,
            settle_balls: 18,
            settled_variance_factor: 0.35,
            overstep_chance: 0.03,
            speed_scale: 1.0,
        }
    }
}

impl BowlingConfig {
    /// Variance multiplier after `legal_balls` of the innings (1.0 → settled factor).
    pub fn variance_factor(&self, legal_balls: u32) -> f32 {
        if self.settle_balls == 0 {
            return self.settled_variance_factor;
        }
        let progress = (legal_balls as f32 / self.settle_balls as f32).min(1.0);
        1.0 - (1.0 - self.settled_variance_factor) * progress
    }

    pub fn validate(&mut self) {
        self.line_sigma_m = clamp_config("bowling.line_sigma_m", self.line_sigma_m, 0.0, 1.0);
        self.length_sigma_m = clamp_config("bowling.length_sigma_m", self.length_sigma_m, 0.0, 3.0);
        self.settle_balls = clamp_config("bowling.settle_balls", self.settle_balls, 0, 300);
        self.settled_variance_factor = clamp_config(
            "bowling.settled_variance_factor",
            self.settled_variance_factor,
            0.0,
            1.0,
        );
        self.overstep_chance = clamp_config("bowling.overstep_chance", self.overstep_chance, 0.0, 0.5);
        self.speed_scale = clamp_config("bowling.speed_scale", self.speed_scale, 0.5, 1.3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_shrinks_then_plateaus() {
        let cfg = BowlingConfig::default();
        let fresh = cfg.variance_factor(0);
        let mid = cfg.variance_factor(9);
        let settled = cfg.variance_factor(18);
        let later = cfg.variance_factor(60);
        assert!((fresh - 1.0).abs() < 1e-6);
        assert!(mid < fresh && mid > settled);
        assert!((settled - cfg.settled_variance_factor).abs() < 1e-6);
        assert!((later - settled).abs() < 1e-6);
    }
}
