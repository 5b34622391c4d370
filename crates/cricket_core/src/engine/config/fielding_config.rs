//! Fielding AI tuning

use serde::{Deserialize, Serialize};

use crate::error::clamp_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldingConfig {
    /// Fielder sprint speed (m/s)
    pub run_speed_mps: f32,
    /// Horizontal catching reach (m)
    pub reach_radius_m: f32,
    /// Highest catchable ball (m)
    pub catch_height_m: f32,
    /// Ground pick-up radius (m)
    pub pickup_radius_m: f32,
    /// Ball must be below this to be gathered off the ground (m)
    pub pickup_height_m: f32,
    /// Flat throw speed (m/s)
    pub throw_speed_mps: f32,
    /// Gather-and-release time before the throw leaves the hand (s)
    pub release_time_s: f32,
    /// Catches needing less reaction than this always stick (s)
    pub catch_min_reaction_s: f32,
    /// Catches needing more reaction than this are always dropped (s)
    pub catch_max_reaction_s: f32,
    /// Catch probability right above the minimum reaction threshold
    pub catch_base_probability: f32,
    /// Number of fielders sent after the ball
    pub chasers: usize,
    /// How far ahead the trajectory is predicted (s)
    pub prediction_horizon_s: f32,
    /// Prediction sample spacing (s)
    pub prediction_step_s: f32,
}

impl Default for FieldingConfig {
    fn default() -> Self {
        Self {
            run_speed_mps: 6.5,
            reach_radius_m: 1.6,
            catch_height_m: 2.8,
            pickup_radius_m: 1.0,
            pickup_height_m: 0.9,
            throw_speed_mps: 28.0,
            release_time_s: 0.6,
            catch_min_reaction_s: 0.4,
            catch_max_reaction_s: 3.0,
            catch_base_probability: 0.95,
            chasers: 2,
            prediction_horizon_s: 8.0,
            prediction_step_s: 0.05,
        }
    }
}

impl FieldingConfig {
    pub fn validate(&mut self) {
        self.run_speed_mps = clamp_config("fielding.run_speed_mps", self.run_speed_mps, 1.0, 12.0);
        self.reach_radius_m = clamp_config("fielding.reach_radius_m", self.reach_radius_m, 0.3, 4.0);
        self.catch_height_m = clamp_config("fielding.catch_height_m", self.catch_height_m, 1.0, 4.0);
        self.pickup_radius_m =
            clamp_config("fielding.pickup_radius_m", self.pickup_radius_m, 0.2, 3.0);
        self.pickup_height_m =
            clamp_config("fielding.pickup_height_m", self.pickup_height_m, 0.1, 2.0);
        self.throw_speed_mps =
            clamp_config("fielding.throw_speed_mps", self.throw_speed_mps, 5.0, 45.0);
        self.release_time_s = clamp_config("fielding.release_time_s", self.release_time_s, 0.0, 3.0);
        self.catch_min_reaction_s =
            clamp_config("fielding.catch_min_reaction_s", self.catch_min_reaction_s, 0.0, 5.0);
        self.catch_max_reaction_s = clamp_config(
            "fielding.catch_max_reaction_s",
            self.catch_max_reaction_s,
            self.catch_min_reaction_s,
            10.0,
        );
        self.catch_base_probability =
            clamp_config("fielding.catch_base_probability", self.catch_base_probability, 0.0, 1.0);
        self.chasers = self.chasers.clamp(1, 11);
        self.prediction_horizon_s =
            clamp_config("fielding.prediction_horizon_s", self.prediction_horizon_s, 1.0, 20.0);
        self.prediction_step_s =
            clamp_config("fielding.prediction_step_s", self.prediction_step_s, 0.01, 0.5);
    }
}
