//! Match context
//!
//! Everything one batting side's innings needs: mode, target, batting
//! order, who is on strike and the running score. The simulation loop owns
//! it and lends it to the state machine; hot-seat multiplayer keeps one per
//! player.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::RulesConfig;
use super::scheduler::SessionId;
use crate::error::clamp_config;
use crate::models::score::BALLS_PER_OVER;
use crate::models::{Batsman, Score, ROSTER_SIZE};

/// Runs a side could score if every legal ball went for six
const MAX_RUNS_PER_BALL: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    FreePlay,
    TargetChase,
    Multiplayer,
}

impl MatchMode {
    /// Innings number after which the match is over
    pub fn final_innings(&self) -> u8 {
        match self {
            MatchMode::FreePlay => 1,
            MatchMode::TargetChase | MatchMode::Multiplayer => 2,
        }
    }
}

/// Options accepted by `start_match`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Overs per innings; falls back to `rules.default_overs`
    pub overs: Option<u32>,
    pub seed: u64,
    /// Explicit chase target
    pub target: Option<u32>,
    /// First-innings score the chase target is built on
    pub first_innings_runs: Option<u32>,
    pub team_names: [String; 2],
    /// Batting order per side; missing names are generated
    pub batting_orders: [Vec<String>; 2],
    /// Hot-seat player labels
    pub player_names: [String; 2],
    pub auto_bowler: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            overs: None,
            seed: 0,
            target: None,
            first_innings_runs: None,
            team_names: ["Home".to_string(), "Away".to_string()],
            batting_orders: [Vec::new(), Vec::new()],
            player_names: ["Player 1".to_string(), "Player 2".to_string()],
            auto_bowler: true,
        }
    }
}

impl MatchOptions {
    pub fn overs_limit(&self, rules: &RulesConfig) -> u32 {
        match self.overs {
            Some(overs) => clamp_config("options.overs", overs, 1, rules.max_overs),
            None => rules.default_overs,
        }
    }
}

/// Target for a generated chase: first-innings runs plus a random offset,
/// clamped into what the innings can possibly produce.
pub fn chase_target<R: Rng + ?Sized>(
    options: &MatchOptions,
    overs_limit: u32,
    rules: &RulesConfig,
    rng: &mut R,
) -> u32 {
    let ceiling = overs_limit * BALLS_PER_OVER * MAX_RUNS_PER_BALL;
    let raw = match options.target {
        Some(target) => target,
        None => {
            let first = options
                .first_innings_runs
                .unwrap_or_else(|| (overs_limit as f32 * rules.first_innings_run_rate).round() as u32);
            first + rng.gen_range(rules.target_offset_min..=rules.target_offset_max)
        }
    };
    clamp_config("target", raw, 1, ceiling)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub mode: MatchMode,
    pub session: SessionId,
    /// Who is batting (hot-seat label or team name)
    pub player: String,
    pub team: String,
    /// 1-based innings of the match this context plays
    pub current_innings: u8,
    pub striker_index: usize,
    pub non_striker_index: usize,
    /// Next unused batting-order slot
    pub next_batter: usize,
    pub target: Option<u32>,
    pub overs_limit: u32,
    pub is_paused: bool,
    pub batsmen: Vec<Batsman>,
    pub score: Score,
    pub runs_this_over: u32,
    pub wickets_this_over: u8,
    /// Set when the innings is over; the score no longer changes after that
    pub completed: bool,
}

impl MatchContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: MatchMode,
        session: SessionId,
        player: impl Into<String>,
        team: impl Into<String>,
        batting_order: &[String],
        current_innings: u8,
        overs_limit: u32,
        target: Option<u32>,
    ) -> Self {
        let team = team.into();
        Self {
            mode,
            session,
            player: player.into(),
            batsmen: Batsman::roster(&team, batting_order),
            team,
            current_innings,
            striker_index: 0,
            non_striker_index: 1,
            next_batter: 2,
            target,
            overs_limit,
            is_paused: false,
            score: Score::default(),
            runs_this_over: 0,
            wickets_this_over: 0,
            completed: false,
        }
    }

    /// Menu state: free play, nothing bowled
    pub fn idle(overs_limit: u32) -> Self {
        Self::new(MatchMode::FreePlay, SessionId::default(), "", "Home", &[], 1, overs_limit, None)
    }

    pub fn striker(&self) -> &Batsman {
        &self.batsmen[self.striker_index]
    }

    pub fn non_striker(&self) -> &Batsman {
        &self.batsmen[self.non_striker_index]
    }

    pub fn is_chasing(&self) -> bool {
        self.target.is_some()
    }

    pub fn balls_remaining(&self) -> u32 {
        (self.overs_limit * BALLS_PER_OVER).saturating_sub(self.score.legal_balls)
    }

    /// Next batter in the order, if anyone is left
    pub fn take_next_batter(&mut self) -> Option<usize> {
        if self.next_batter >= ROSTER_SIZE {
            return None;
        }
        let idx = self.next_batter;
        self.next_batter += 1;
        Some(idx)
    }

    pub fn batting_runs(&self) -> u32 {
        self.batsmen.iter().map(|b| b.runs).sum()
    }

    /// Scoring and strike invariants that hold in every reachable state
    pub fn invariants_hold(&self) -> bool {
        let runs_ok =
            self.score.runs == self.batting_runs() + self.score.extras.byes + self.score.extras.leg_byes;
        let wickets_ok = self.score.wickets <= crate::models::score::MAX_WICKETS;
        let out_count = self.batsmen.iter().filter(|b| b.is_out).count();
        let pair_ok = self.completed
            || (self.striker_index != self.non_striker_index
                && !self.striker().is_out
                && !self.non_striker().is_out);
        runs_ok && wickets_ok && out_count == self.score.wickets as usize && pair_ok
    }
}
