//! Scripted batter for headless matches
//!
//! Reads the length of each ball as it comes down, picks a stroke that suits
//! it and plays it with some timing error. Seeded, so a headless match is
//! reproducible end to end.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::engine::ball::BallState;
use crate::engine::ball_prediction::BallPrediction;
use crate::engine::live_match::LiveMatchSession;
use crate::engine::match_state::MatchPhase;
use crate::engine::physics_constants::ball::{GRAVITY, RADIUS_M};
use crate::engine::shot::{PitchLength, ShotCategory, ShotType};

/// Share of balls outside the stumps the batter lets go
const LEAVE_CHANCE: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Plan {
    Leave,
    Play { shot: ShotType, trigger_m: f32, power: f32 },
}

#[derive(Debug, Clone)]
pub struct AutoBatter {
    rng: ChaCha8Rng,
    /// 0 = blocks everything, 1 = swings at everything
    aggression: f32,
    /// Spread of the trigger distance around the ideal (m)
    timing_sigma_m: f32,
    /// Plan for the delivery with this number
    plan: Option<(u64, Plan)>,
}

impl AutoBatter {
    pub fn new(seed: u64, aggression: f32, timing_sigma_m: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            aggression: aggression.clamp(0.0, 1.0),
            timing_sigma_m: if timing_sigma_m.is_finite() { timing_sigma_m.max(0.0) } else { 0.0 },
            plan: None,
        }
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    /// Look at the ball and play when it is time. Returns the stroke if one
    /// was played this call.
    pub fn act(&mut self, session: &mut LiveMatchSession) -> Option<ShotType> {
        if session.phase() != MatchPhase::BallInFlight || session.context().is_paused {
            return None;
        }
        let ball = session.ball();
        if ball.has_been_hit || session.pending_shot().is_some() || ball.distance_to_bat() < 0.0 {
            return None;
        }

        let delivery = session.delivery_count();
        let plan = match self.plan {
            Some((n, plan)) if n == delivery => plan,
            _ => {
                let on_stumps = BallPrediction::will_hit_stumps(ball, &session.config().physics);
                let plan = self.choose(read_length(ball), on_stumps);
                self.plan = Some((delivery, plan));
                plan
            }
        };

        match plan {
            Plan::Play { shot, trigger_m, power } if ball.distance_to_bat() <= trigger_m => {
                match session.submit_shot(shot, power) {
                    Ok(()) => Some(shot),
                    Err(e) => {
                        log::debug!("auto batter: {e}");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn choose(&mut self, length: PitchLength, on_stumps: bool) -> Plan {
        if !on_stumps && self.rng.gen::<f32>() < LEAVE_CHANCE * (1.0 - self.aggression) {
            return Plan::Leave;
        }
        let attacking = self.rng.gen::<f32>() < self.aggression;
        let candidates: Vec<ShotType> = ShotType::ALL
            .iter()
            .copied()
            .filter(|s| {
                let p = s.profile();
                p.suits(length) && (p.category == ShotCategory::Defensive) != attacking
            })
            .collect();
        let Some(shot) = candidates.choose(&mut self.rng).copied() else {
            return Plan::Leave;
        };
        let error = Normal::new(0.0, self.timing_sigma_m).map(|n| n.sample(&mut self.rng)).unwrap_or(0.0);
        let trigger_m = shot.profile().ideal_distance_m + error;
        let power = 0.5 + 0.5 * self.aggression;
        Plan::Play { shot, trigger_m, power }
    }
}

/// Where the ball has pitched or, still in the air, where it will
fn read_length(ball: &BallState) -> PitchLength {
    if let Some(p) = ball.pitch_point {
        return PitchLength::classify(Some(p.z));
    }
    let (y, vy, vz) = (ball.position.y - RADIUS_M, ball.velocity.y, ball.velocity.z);
    let disc = vy * vy + 2.0 * GRAVITY * y.max(0.0);
    let t = (vy + disc.sqrt()) / GRAVITY;
    PitchLength::classify(Some(ball.position.z + vz * t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::delivery::{Delivery, DeliveryType};
    use crate::engine::match_context::{MatchMode, MatchOptions};
    use crate::engine::timestep::HEADLESS_FRAME_DT;

    #[test]
    fn test_reads_length_before_pitching() {
        let cfg = EngineConfig::deterministic();
        let mut session = LiveMatchSession::new(cfg);
        session
            .start_match(MatchMode::FreePlay, MatchOptions { auto_bowler: false, ..MatchOptions::default() })
            .unwrap();
        session.start_delivery(Some(Delivery::nominal(DeliveryType::Bouncer))).unwrap();
        assert_eq!(read_length(session.ball()), PitchLength::Short);
    }

    #[test]
    fn test_plays_one_shot_per_ball() {
        let mut session = LiveMatchSession::new(EngineConfig::deterministic());
        session
            .start_match(MatchMode::FreePlay, MatchOptions { auto_bowler: false, ..MatchOptions::default() })
            .unwrap();
        session.start_delivery(Some(Delivery::nominal(DeliveryType::Straight))).unwrap();
        let mut batter = AutoBatter::new(3, 1.0, 0.0);
        let mut played = 0;
        for _ in 0..3600 {
            if batter.act(&mut session).is_some() {
                played += 1;
            }
            session.tick(HEADLESS_FRAME_DT);
            if session.phase() == MatchPhase::AwaitingDelivery {
                break;
            }
        }
        assert_eq!(played, 1);
        assert_eq!(session.context().score.legal_balls, 1);
    }
}
