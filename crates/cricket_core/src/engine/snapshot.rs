//! Read-only view of a live session for the UI layer
//!
//! Everything the front end draws or prints comes from here; it never reads
//! session internals directly.

use serde::{Deserialize, Serialize};

use super::ball::BallState;
use super::bowler::BowlerMode;
use super::fielding::FielderPosition;
use super::match_context::MatchMode;
use super::match_state::{MatchPhase, MatchResult};
use super::scheduler::SessionId;
use crate::models::{Batsman, Score};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    // ========== Session ==========
    pub session: SessionId,
    pub clock_ms: u64,
    pub running: bool,
    pub phase: MatchPhase,
    pub is_paused: bool,

    // ========== Innings ==========
    pub mode: MatchMode,
    pub innings: u8,
    pub player: String,
    pub team: String,
    pub score: Score,
    /// "over.ball"
    pub overs: String,
    pub target: Option<u32>,
    pub overs_limit: u32,
    pub striker: Batsman,
    pub non_striker: Batsman,
    pub batsmen: Vec<Batsman>,

    // ========== Field ==========
    pub ball: BallState,
    pub bowler: BowlerMode,
    pub fielders: Vec<FielderPosition>,

    pub result: Option<MatchResult>,
}

impl MatchSnapshot {
    /// Runs still needed, when chasing
    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.score.total()))
    }
}
