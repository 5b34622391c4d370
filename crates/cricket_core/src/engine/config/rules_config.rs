//! Laws, match timing and extras tuning

use serde::{Deserialize, Serialize};

use crate::error::clamp_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Overs per innings when the match options do not say
    pub default_overs: u32,
    /// Longest innings accepted
    pub max_overs: u32,
    /// Target chase: smallest offset added to the first-innings score
    pub target_offset_min: u32,
    /// Target chase: largest offset added to the first-innings score
    pub target_offset_max: u32,
    /// Target chase: run rate of the generated first innings
    pub first_innings_run_rate: f32,

    /// Delay before the first automatic delivery of an innings (s)
    pub first_delivery_s: f32,
    /// Delay between a dead ball and the next automatic delivery (s)
    pub between_balls_s: f32,
    /// Hot-seat break between the two innings (s)
    pub innings_break_s: f32,

    /// Time to complete the first run (s)
    pub first_run_s: f32,
    /// Time to complete each further run (s)
    pub next_run_s: f32,
    /// Automatic calling only attempts a run that finishes this far ahead of the throw (s)
    pub call_margin_s: f32,
    /// Most runs the batters will ever attempt on one ball
    pub max_running_runs: u8,

    /// Lateral distance from middle stump beyond which an unplayed ball is a wide (m)
    pub wide_line_m: f32,
    /// Ball above this height at the batter is a no-ball (m)
    pub head_height_m: f32,
    /// Chance a ball beaten by the batter also beats the keeper
    pub bye_chance: f32,
    /// Share of byes that run away to the rope for four
    pub bye_boundary_share: f32,
    /// Chance an unplayed ball on the pads is run as a leg-bye
    pub leg_bye_chance: f32,
    /// Chance the keeper completes a stumping after a charging miss
    pub stumping_chance: f32,

    /// Longest a struck ball may stay live before it is called dead (s)
    pub max_live_ball_s: f32,
    /// Boundary hits are awarded at the rope or after this long (s)
    pub boundary_settle_s: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            default_overs: 5,
            max_overs: 50,
            target_offset_min: 1,
            target_offset_max: 12,
            first_innings_run_rate: 7.5,
            first_delivery_s: 1.5,
            between_balls_s: 2.0,
            innings_break_s: 5.0,
            first_run_s: 3.6,
            next_run_s: 3.0,
            call_margin_s: 0.4,
            max_running_runs: 3,
            wide_line_m: 0.9,
            head_height_m: 2.0,
            bye_chance: 0.08,
            bye_boundary_share: 0.2,
            leg_bye_chance: 0.25,
            stumping_chance: 0.6,
            max_live_ball_s: 15.0,
            boundary_settle_s: 4.0,
        }
    }
}

impl RulesConfig {
    /// Completion time of run number `k` (1-based), measured from contact.
    pub fn run_completion_s(&self, k: u8) -> f32 {
        if k == 0 {
            return 0.0;
        }
        self.first_run_s + (k as f32 - 1.0) * self.next_run_s
    }

    pub fn validate(&mut self) {
        self.max_overs = clamp_config("rules.max_overs", self.max_overs, 1, 50);
        self.default_overs = clamp_config("rules.default_overs", self.default_overs, 1, self.max_overs);
        self.target_offset_max =
            clamp_config("rules.target_offset_max", self.target_offset_max, 0, 100);
        self.target_offset_min =
            clamp_config("rules.target_offset_min", self.target_offset_min, 0, self.target_offset_max);
        self.first_innings_run_rate =
            clamp_config("rules.first_innings_run_rate", self.first_innings_run_rate, 0.0, 36.0);
        self.first_delivery_s = clamp_config("rules.first_delivery_s", self.first_delivery_s, 0.0, 30.0);
        self.between_balls_s = clamp_config("rules.between_balls_s", self.between_balls_s, 0.0, 30.0);
        self.innings_break_s = clamp_config("rules.innings_break_s", self.innings_break_s, 0.0, 120.0);
        self.first_run_s = clamp_config("rules.first_run_s", self.first_run_s, 1.0, 10.0);
        self.next_run_s = clamp_config("rules.next_run_s", self.next_run_s, 1.0, 10.0);
        self.call_margin_s = clamp_config("rules.call_margin_s", self.call_margin_s, 0.0, 3.0);
        self.max_running_runs = clamp_config("rules.max_running_runs", self.max_running_runs, 1, 5);
        self.wide_line_m = clamp_config("rules.wide_line_m", self.wide_line_m, 0.3, 2.0);
        self.head_height_m = clamp_config("rules.head_height_m", self.head_height_m, 1.0, 3.0);
        self.bye_chance = clamp_config("rules.bye_chance", self.bye_chance, 0.0, 1.0);
        self.bye_boundary_share =
            clamp_config("rules.bye_boundary_share", self.bye_boundary_share, 0.0, 1.0);
        self.leg_bye_chance = clamp_config("rules.leg_bye_chance", self.leg_bye_chance, 0.0, 1.0);
        self.stumping_chance = clamp_config("rules.stumping_chance", self.stumping_chance, 0.0, 1.0);
        self.max_live_ball_s = clamp_config("rules.max_live_ball_s", self.max_live_ball_s, 2.0, 60.0);
        self.boundary_settle_s =
            clamp_config("rules.boundary_settle_s", self.boundary_settle_s, 0.5, 20.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_completion_times() {
        let rules = RulesConfig::default();
        assert_eq!(rules.run_completion_s(0), 0.0);
        assert!((rules.run_completion_s(1) - 3.6).abs() < 1e-6);
        assert!((rules.run_completion_s(3) - 9.6).abs() < 1e-5);
    }

    #[test]
    fn test_validate_keeps_offset_range_ordered() {
        let mut rules = RulesConfig { target_offset_min: 40, target_offset_max: 10, ..RulesConfig::default() };
        rules.validate();
        assert!(rules.target_offset_min <= rules.target_offset_max);
    }
}
