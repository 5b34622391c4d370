//! # Match State Machine
//!
//! The authority on score, strike, overs and innings.
//!
//! ```text
//! AwaitingDelivery → BallInFlight → Resolving
//!     → ScoreApplied / WicketApplied → OverCheck → InningsCheck
//!     → AwaitingDelivery | InningsComplete | MatchComplete
//! ```
//!
//! Only `AwaitingDelivery`, `BallInFlight`, `Resolving`, `InningsComplete`
//! and `MatchComplete` persist between calls. The checks in between run
//! inside `apply_result` and show up as events.
//!
//! ## Strike
//! - Odd runs actually run swap ends; boundaries never do.
//! - The last ball of an over always hands strike to the batter who was the
//!   non-striker for that ball (runs on it do not matter), unless a wicket
//!   moved someone else into that spot.
//! - A new batter takes the end where the wicket fell: the striker's end for
//!   bowled, caught and stumped, the throw's end for a run-out.

use serde::{Deserialize, Serialize};

use super::config::RulesConfig;
use super::events::MatchEvent;
use super::fielding::Runner;
use super::match_context::MatchContext;
use super::shot::BoundaryKind;
use crate::error::{CoreError, Result};
use crate::models::score::BALLS_PER_OVER;
use crate::models::{DismissalType, End};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    AwaitingDelivery,
    BallInFlight,
    Resolving,
    InningsComplete,
    MatchComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKind {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl ExtraKind {
    /// Counts toward the six balls of an over
    pub fn is_legal(&self) -> bool {
        matches!(self, ExtraKind::Bye | ExtraKind::LegBye)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wicket {
    pub dismissal: DismissalType,
    /// Which of the two (as they were when the ball was bowled) is out
    pub batter: Runner,
    /// End the wicket was broken at (run-outs; everything else is the striker's end)
    pub end: End,
}

impl Wicket {
    pub fn of_striker(dismissal: DismissalType) -> Self {
        Self { dismissal, batter: Runner::Striker, end: End::Striker }
    }
}

/// Everything that happened on one ball, as reported to the state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// Runs credited to the striker
    pub bat_runs: u8,
    pub boundary: Option<BoundaryKind>,
    pub extra: Option<ExtraKind>,
    /// Byes / leg-byes, or runs taken on a wide
    pub extra_runs: u8,
    pub wicket: Option<Wicket>,
}

impl DeliveryResult {
    pub fn dot() -> Self {
        Self::default()
    }

    pub fn runs(n: u8) -> Self {
        Self { bat_runs: n, ..Self::default() }
    }

    pub fn boundary(kind: BoundaryKind) -> Self {
        Self { bat_runs: kind.runs(), boundary: Some(kind), ..Self::default() }
    }

    pub fn wicket(wicket: Wicket) -> Self {
        Self { wicket: Some(wicket), ..Self::default() }
    }

    pub fn extra(kind: ExtraKind, extra_runs: u8) -> Self {
        Self { extra: Some(kind), extra_runs, ..Self::default() }
    }

    pub fn is_legal(&self) -> bool {
        self.extra.map(|e| e.is_legal()).unwrap_or(true)
    }

    /// Runs the batters physically ran (decides strike)
    pub fn runs_ran(&self) -> u8 {
        if self.boundary.is_some() {
            0
        } else {
            self.bat_runs + self.extra_runs
        }
    }

    /// Team runs the ball adds, penalties included
    pub fn team_runs(&self) -> u32 {
        let penalty = match self.extra {
            Some(ExtraKind::Wide) | Some(ExtraKind::NoBall) => 1,
            _ => 0,
        };
        let bat = if self.credits_bat() { self.bat_runs as u32 } else { 0 };
        penalty + bat + self.extra_runs as u32
    }

    /// Whether runs off the bat can stand on this kind of ball
    fn credits_bat(&self) -> bool {
        matches!(self.extra, None | Some(ExtraKind::NoBall))
    }

    /// Drop dismissals the laws do not allow on this kind of ball
    fn sanitized(mut self) -> Self {
        let allowed = match (self.extra, self.wicket.map(|w| w.dismissal)) {
            (_, None) => true,
            (Some(ExtraKind::NoBall), Some(d)) => d == DismissalType::RunOut,
            (Some(ExtraKind::Wide), Some(d)) => {
                matches!(d, DismissalType::RunOut | DismissalType::Stumped)
            }
            (_, Some(_)) => true,
        };
        if !allowed {
            log::warn!("{:?} cannot be out {:?}; wicket ignored", self.extra, self.wicket);
            self.wicket = None;
        }
        if !self.credits_bat() && self.bat_runs > 0 {
            log::warn!("{:?} cannot carry bat runs; {} dropped", self.extra, self.bat_runs);
            self.bat_runs = 0;
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsEnd {
    AllOut,
    OversComplete,
    TargetReached,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchResult {
    /// Free play: nothing to chase
    Completed { batting: String, total: u32, wickets: u8 },
    ChaseWon { batting: String, wickets_remaining: u8, balls_remaining: u32 },
    ChaseLost { batting: String, runs_short: u32 },
}

impl MatchResult {
    pub fn summary(&self) -> String {
        match self {
            MatchResult::Completed { batting, total, wickets } => {
                format!("{batting} finished on {total}/{wickets}")
            }
            MatchResult::ChaseWon { batting, wickets_remaining, balls_remaining } => format!(
                "{batting} won with {wickets_remaining} wickets and {balls_remaining} balls to spare"
            ),
            MatchResult::ChaseLost { batting, runs_short } => {
                format!("{batting} fell {runs_short} runs short")
            }
        }
    }

    pub fn chaser_won(&self) -> bool {
        matches!(self, MatchResult::ChaseWon { .. })
    }
}

#[derive(Debug, Clone)]
pub struct MatchStateMachine {
    phase: MatchPhase,
    rules: RulesConfig,
}

impl MatchStateMachine {
    pub fn new(rules: RulesConfig) -> Self {
        Self { phase: MatchPhase::AwaitingDelivery, rules }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    fn reject(&self, command: &'static str) -> CoreError {
        let err = CoreError::invalid(command, self.phase);
        log::warn!("{err}");
        err
    }

    /// Open the innings `ctx` plays
    pub fn begin_innings(&mut self, ctx: &MatchContext) -> Result<MatchEvent> {
        if ctx.completed || self.phase == MatchPhase::BallInFlight || self.phase == MatchPhase::Resolving {
            return Err(self.reject("begin_innings"));
        }
        self.phase = MatchPhase::AwaitingDelivery;
        log::info!(
            "innings {} begins: {} ({} overs{})",
            ctx.current_innings,
            ctx.team,
            ctx.overs_limit,
            ctx.target.map(|t| format!(", target {t}")).unwrap_or_default()
        );
        Ok(MatchEvent::InningsStarted {
            innings: ctx.current_innings,
            team: ctx.team.clone(),
            player: ctx.player.clone(),
            target: ctx.target,
            overs_limit: ctx.overs_limit,
        })
    }

    pub fn begin_delivery(&mut self, ctx: &MatchContext) -> Result<()> {
        if self.phase != MatchPhase::AwaitingDelivery || ctx.is_paused || ctx.completed {
            return Err(self.reject("start_delivery"));
        }
        self.phase = MatchPhase::BallInFlight;
        Ok(())
    }

    pub fn begin_resolving(&mut self) -> Result<()> {
        if self.phase != MatchPhase::BallInFlight {
            return Err(self.reject("resolve"));
        }
        self.phase = MatchPhase::Resolving;
        Ok(())
    }

    /// Ball abandoned before a result (teardown)
    pub fn cancel_delivery(&mut self) {
        if matches!(self.phase, MatchPhase::BallInFlight | MatchPhase::Resolving) {
            self.phase = MatchPhase::AwaitingDelivery;
        }
    }

    /// Deliberate teardown
    pub fn end_match(&mut self) {
        self.phase = MatchPhase::MatchComplete;
    }

    /// Commit one ball. Emits the events in order; rejected (and nothing
    /// changes) unless a ball is being resolved.
    pub fn apply_result(&mut self, ctx: &mut MatchContext, result: &DeliveryResult) -> Result<Vec<MatchEvent>> {
        if self.phase != MatchPhase::Resolving || ctx.completed {
            return Err(self.reject("apply_result"));
        }
        let result = result.sanitized();
        let mut events = Vec::new();

        let striker = ctx.striker_index;
        let non_striker = ctx.non_striker_index;
        let legal = result.is_legal();

        // ---- ScoreApplied ----
        let bat = result.bat_runs as u32;
        let extra_runs = result.extra_runs as u32;
        match result.extra {
            None => {
                ctx.score.runs += bat;
            }
            Some(ExtraKind::NoBall) => {
                ctx.score.extras.no_balls += 1;
                ctx.score.extras.byes += extra_runs;
                ctx.score.runs += bat + extra_runs;
            }
            Some(ExtraKind::Wide) => {
                ctx.score.extras.wides += 1 + extra_runs;
            }
            Some(ExtraKind::Bye) => {
                ctx.score.extras.byes += extra_runs;
                ctx.score.runs += extra_runs;
            }
            Some(ExtraKind::LegBye) => {
                ctx.score.extras.leg_byes += extra_runs;
                ctx.score.runs += extra_runs;
            }
        }

        {
            let b = &mut ctx.batsmen[striker];
            b.runs += bat;
            if result.extra != Some(ExtraKind::Wide) {
                b.balls_faced += 1;
            }
            if bat > 0 {
                match result.boundary {
                    Some(BoundaryKind::Four) => b.fours += 1,
                    Some(BoundaryKind::Six) => b.sixes += 1,
                    None => {}
                }
            }
        }
        if legal {
            ctx.score.legal_balls += 1;
        }
        ctx.runs_this_over += result.team_runs();

        events.push(MatchEvent::ScoreApplied {
            innings: ctx.current_innings,
            score: ctx.score,
            striker: ctx.batsmen[striker].clone(),
            runs: result.team_runs(),
            extra: result.extra,
            boundary: result.boundary,
            legal,
        });

        let over_done = legal && ctx.score.legal_balls % BALLS_PER_OVER == 0;

        // Who stands where once the ball is dead
        let (mut at_striker_end, mut at_bowler_end) = (striker, non_striker);
        if result.runs_ran() % 2 == 1 && !over_done {
            std::mem::swap(&mut at_striker_end, &mut at_bowler_end);
        }

        // ---- WicketApplied ----
        if let Some(wicket) = result.wicket {
            let out = match wicket.batter {
                Runner::Striker => striker,
                Runner::NonStriker => non_striker,
            };
            let survivor = if out == striker { non_striker } else { striker };
            let end = match wicket.dismissal {
                DismissalType::RunOut => wicket.end,
                _ => End::Striker,
            };

            ctx.batsmen[out].is_out = true;
            ctx.batsmen[out].dismissal_type = Some(wicket.dismissal);
            ctx.score.wickets += 1;
            ctx.wickets_this_over += 1;

            let incoming = if ctx.score.all_out() { None } else { ctx.take_next_batter() };
            if let Some(new) = incoming {
                match end {
                    End::Striker => {
                        at_striker_end = new;
                        at_bowler_end = survivor;
                    }
                    End::Bowler => {
                        at_bowler_end = new;
                        at_striker_end = survivor;
                    }
                }
            }

            log::info!(
                "wicket: {} {} for {} ({})",
                ctx.batsmen[out].name,
                wicket.dismissal,
                ctx.batsmen[out].runs,
                ctx.score
            );
            events.push(MatchEvent::WicketApplied {
                innings: ctx.current_innings,
                score: ctx.score,
                batsman: ctx.batsmen[out].clone(),
                dismissal: wicket.dismissal,
                end,
                incoming: incoming.map(|i| ctx.batsmen[i].clone()),
            });
        }

        // ---- OverCheck ----
        if over_done {
            std::mem::swap(&mut at_striker_end, &mut at_bowler_end);
            log::debug!("over {} complete: {} runs", ctx.score.completed_overs(), ctx.runs_this_over);
            events.push(MatchEvent::OverComplete {
                innings: ctx.current_innings,
                score: ctx.score,
                over: ctx.score.completed_overs(),
                runs_in_over: ctx.runs_this_over,
                wickets_in_over: ctx.wickets_this_over,
            });
            ctx.runs_this_over = 0;
            ctx.wickets_this_over = 0;
        }

        if !ctx.score.all_out() {
            ctx.striker_index = at_striker_end;
            ctx.non_striker_index = at_bowler_end;
        }

        // ---- InningsCheck ----
        let finished = if ctx.score.all_out() {
            Some(InningsEnd::AllOut)
        } else if ctx.target.map(|t| ctx.score.total() >= t).unwrap_or(false) {
            Some(InningsEnd::TargetReached)
        } else if ctx.score.legal_balls >= ctx.overs_limit * BALLS_PER_OVER {
            Some(InningsEnd::OversComplete)
        } else {
            None
        };

        match finished {
            None => self.phase = MatchPhase::AwaitingDelivery,
            Some(reason) => {
                ctx.completed = true;
                log::info!("innings {} complete ({reason:?}): {}", ctx.current_innings, ctx.score);
                events.push(MatchEvent::InningsComplete {
                    innings: ctx.current_innings,
                    score: ctx.score,
                    reason,
                });

                if reason == InningsEnd::TargetReached || ctx.current_innings >= ctx.mode.final_innings() {
                    let result = Self::result_for(ctx);
                    log::info!("match complete: {}", result.summary());
                    events.push(MatchEvent::MatchComplete { result });
                    self.phase = MatchPhase::MatchComplete;
                } else {
                    self.phase = MatchPhase::InningsComplete;
                }
            }
        }

        Ok(events)
    }

    fn result_for(ctx: &MatchContext) -> MatchResult {
        let batting = if ctx.player.is_empty() { ctx.team.clone() } else { ctx.player.clone() };
        match ctx.target {
            None => MatchResult::Completed { batting, total: ctx.score.total(), wickets: ctx.score.wickets },
            Some(target) if ctx.score.total() >= target => MatchResult::ChaseWon {
                batting,
                wickets_remaining: crate::models::score::MAX_WICKETS - ctx.score.wickets,
                balls_remaining: ctx.balls_remaining(),
            },
            Some(target) => MatchResult::ChaseLost { batting, runs_short: target - ctx.score.total() },
        }
    }
}
