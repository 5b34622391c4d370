//! Fielding AI
//!
//! Owns the eleven fielders. After contact the best-placed fielders chase
//! the predicted interception point, one of them may get a chance to take a
//! catch, and whoever gathers the ball starts the race between the return
//! throw and the batters running.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ball::BallState;
use super::ball_prediction::{BallPrediction, InterceptKind, Reach};
use super::config::{FieldingConfig, PhysicsConfig, RulesConfig};
use super::physics_constants::{
    distance_from_center, field, ground_distance, pitch, polar_from_striker,
};
use crate::error::{CoreError, Result};
use crate::models::End;

// ============================================================
// Roles
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FielderRole {
    WicketKeeper,
    Bowler,
    Slip,
    Point,
    Cover,
    MidOff,
    MidOn,
    MidWicket,
    SquareLeg,
    FineLeg,
    ThirdMan,
}

impl FielderRole {
    pub const ALL: [FielderRole; 11] = [
        FielderRole::WicketKeeper,
        FielderRole::Bowler,
        FielderRole::Slip,
        FielderRole::Point,
        FielderRole::Cover,
        FielderRole::MidOff,
        FielderRole::MidOn,
        FielderRole::MidWicket,
        FielderRole::SquareLeg,
        FielderRole::FineLeg,
        FielderRole::ThirdMan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FielderRole::WicketKeeper => "wicket_keeper",
            FielderRole::Bowler => "bowler",
            FielderRole::Slip => "slip",
            FielderRole::Point => "point",
            FielderRole::Cover => "cover",
            FielderRole::MidOff => "mid_off",
            FielderRole::MidOn => "mid_on",
            FielderRole::MidWicket => "mid_wicket",
            FielderRole::SquareLeg => "square_leg",
            FielderRole::FineLeg => "fine_leg",
            FielderRole::ThirdMan => "third_man",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FielderRole::WicketKeeper => 0,
            FielderRole::Bowler => 1,
            FielderRole::Slip => 2,
            FielderRole::Point => 3,
            FielderRole::Cover => 4,
            FielderRole::MidOff => 5,
            FielderRole::MidOn => 6,
            FielderRole::MidWicket => 7,
            FielderRole::SquareLeg => 8,
            FielderRole::FineLeg => 9,
            FielderRole::ThirdMan => 10,
        }
    }

    /// Standard pace-bowling field
    pub fn default_home(&self) -> Vector3<f32> {
        match self {
            FielderRole::WicketKeeper => Vector3::new(0.0, 0.0, -14.0),
            FielderRole::Bowler => Vector3::new(0.5, 0.0, 17.0),
            FielderRole::Slip => Vector3::new(2.0, 0.0, -14.5),
            FielderRole::Point => polar_from_striker(1.75, 24.0),
            FielderRole::Cover => polar_from_striker(1.0, 30.0),
            FielderRole::MidOff => polar_from_striker(0.3, 32.0),
            FielderRole::MidOn => polar_from_striker(-0.3, 32.0),
            FielderRole::MidWicket => polar_from_striker(-1.1, 30.0),
            FielderRole::SquareLeg => polar_from_striker(-1.65, 28.0),
            FielderRole::FineLeg => polar_from_striker(-2.7, 45.0),
            FielderRole::ThirdMan => polar_from_striker(2.6, 45.0),
        }
    }
}

impl fmt::Display for FielderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FielderRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FielderRole::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown fielder role: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FielderPosition {
    pub role: FielderRole,
    pub home_position: Vector3<f32>,
    pub current_position: Vector3<f32>,
    pub pursuit_target: Option<Vector3<f32>>,
}

impl FielderPosition {
    fn at_home(role: FielderRole) -> Self {
        let home = role.default_home();
        Self { role, home_position: home, current_position: home, pursuit_target: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldingEvent {
    Caught { fielder: FielderRole, reaction_s: f32 },
    Dropped { fielder: FielderRole, reaction_s: f32 },
    /// Ball gathered; `after_s` is measured from contact
    Fielded { fielder: FielderRole, position: Vector3<f32>, after_s: f32 },
}

/// Chance of holding a catch that needed `reaction_s` of running to get to.
pub fn catch_probability(reaction_s: f32, cfg: &FieldingConfig) -> f32 {
    if reaction_s <= cfg.catch_min_reaction_s {
        return 1.0;
    }
    if reaction_s >= cfg.catch_max_reaction_s {
        return 0.0;
    }
    let span = cfg.catch_max_reaction_s - cfg.catch_min_reaction_s;
    cfg.catch_base_probability * (cfg.catch_max_reaction_s - reaction_s) / span
}

#[derive(Debug, Clone, Copy)]
struct CatchPlan {
    fielder: usize,
    reaction_s: f32,
}

// ============================================================
// FieldingAI
// ============================================================

#[derive(Debug, Clone)]
pub struct FieldingAI {
    config: FieldingConfig,
    fielders: Vec<FielderPosition>,
    manual_placement: bool,
    prediction: BallPrediction,
    chasers: Vec<usize>,
    catch_plan: Option<CatchPlan>,
    catchable: bool,
    may_gather: bool,
    contact_time_s: f32,
    settled: bool,
}

impl FieldingAI {
    pub fn new(config: FieldingConfig) -> Self {
        Self {
            config,
            fielders: FielderRole::ALL.iter().map(|r| FielderPosition::at_home(*r)).collect(),
            manual_placement: false,
            prediction: BallPrediction::new(),
            chasers: Vec::new(),
            catch_plan: None,
            catchable: false,
            may_gather: true,
            contact_time_s: 0.0,
            settled: false,
        }
    }

    pub fn config(&self) -> &FieldingConfig {
        &self.config
    }

    pub fn fielders(&self) -> &[FielderPosition] {
        &self.fielders
    }

    pub fn fielder(&self, role: FielderRole) -> &FielderPosition {
        &self.fielders[role.index()]
    }

    pub fn positions(&self) -> Vec<Vector3<f32>> {
        self.fielders.iter().map(|f| f.current_position).collect()
    }

    pub fn is_manual_placement(&self) -> bool {
        self.manual_placement
    }

    /// Place a fielder by hand. The placement holds across deliveries until
    /// `reset_placement`. Positions too close to the striker or past the rope
    /// are pulled back into the legal area.
    pub fn set_fielder_position(&mut self, role: FielderRole, position: Vector3<f32>) -> Result<Vector3<f32>> {
        if !position.x.is_finite() || !position.z.is_finite() {
            let err = CoreError::ConfigurationOutOfRange {
                field: "fielder.position",
                value: f64::NAN,
                min: -(field::BOUNDARY_RADIUS_M as f64),
                max: field::BOUNDARY_RADIUS_M as f64,
            };
            log::warn!("{err}");
            return Err(err);
        }

        let mut p = Vector3::new(position.x, 0.0, position.z);

        let from_striker = (p.x * p.x + p.z * p.z).sqrt();
        if from_striker < field::MIN_FIELDER_DISTANCE_M {
            let dir = if from_striker > 1e-3 { p / from_striker } else { Vector3::new(0.0, 0.0, 1.0) };
            p = dir * field::MIN_FIELDER_DISTANCE_M;
            log::warn!("{} too close to the striker ({from_striker:.1}m), moved out", role);
        }

        let limit = field::BOUNDARY_RADIUS_M - 1.0;
        let from_center = distance_from_center(&p);
        if from_center > limit {
            let center = Vector3::new(0.0, 0.0, pitch::CENTER_Z);
            p = center + (p - center) * (limit / from_center);
            log::warn!("{} beyond the rope ({from_center:.1}m), pulled in", role);
        }

        let fielder = &mut self.fielders[role.index()];
        fielder.home_position = p;
        fielder.current_position = p;
        fielder.pursuit_target = None;
        self.manual_placement = true;
        Ok(p)
    }

    /// Back to the standard field
    pub fn reset_placement(&mut self) {
        self.fielders = FielderRole::ALL.iter().map(|r| FielderPosition::at_home(*r)).collect();
        self.manual_placement = false;
        self.reset_for_delivery();
    }

    /// Everyone walks back to their (possibly hand-placed) home position
    pub fn reset_for_delivery(&mut self) {
        for f in &mut self.fielders {
            f.current_position = f.home_position;
            f.pursuit_target = None;
        }
        self.chasers.clear();
        self.catch_plan = None;
        self.catchable = false;
        self.may_gather = true;
        self.settled = false;
        self.prediction.invalidate();
    }

    fn reach(&self) -> Reach {
        Reach {
            speed_mps: self.config.run_speed_mps,
            radius_m: self.config.reach_radius_m,
            catch_height_m: self.config.catch_height_m,
            pickup_height_m: self.config.pickup_height_m,
            can_catch: self.catchable,
        }
    }

    /// Ball has left the bat: pick chasers and, for a skied ball, the catcher.
    ///
    /// `may_gather` is false for balls already given as boundaries; fielders
    /// still chase but never field them.
    pub fn on_contact(&mut self, ball: &BallState, physics: &PhysicsConfig, catchable: bool, may_gather: bool) {
        self.prediction.invalidate();
        self.contact_time_s = ball.elapsed_s;
        self.catchable = catchable;
        self.may_gather = may_gather;
        self.settled = false;
        self.catch_plan = None;

        let reach = self.reach();
        let (horizon, step) = (self.config.prediction_horizon_s, self.config.prediction_step_s);

        let mut intercepts = Vec::with_capacity(self.fielders.len());
        for (i, f) in self.fielders.iter().enumerate() {
            if let Some(hit) =
                self.prediction.find_intercept(ball, physics, horizon, step, &f.current_position, &reach)
            {
                intercepts.push((i, hit));
            }
        }
        intercepts.sort_by(|a, b| a.1.time_s.total_cmp(&b.1.time_s));

        if catchable {
            self.catch_plan = intercepts
                .iter()
                .find(|(_, hit)| hit.kind == InterceptKind::Catch)
                .map(|(i, hit)| CatchPlan {
                    fielder: *i,
                    reaction_s: ground_distance(&self.fielders[*i].current_position, &hit.point)
                        / self.config.run_speed_mps,
                });
        }

        self.chasers = intercepts.iter().map(|(i, _)| *i).take(self.config.chasers).collect();
        if self.chasers.is_empty() {
            let rest = self.resting_point(ball, physics);
            let mut by_distance: Vec<usize> = (0..self.fielders.len()).collect();
            by_distance.sort_by(|a, b| {
                ground_distance(&self.fielders[*a].current_position, &rest)
                    .total_cmp(&ground_distance(&self.fielders[*b].current_position, &rest))
            });
            self.chasers = by_distance.into_iter().take(self.config.chasers).collect();
        }
        if let Some(plan) = self.catch_plan {
            if !self.chasers.contains(&plan.fielder) {
                self.chasers.insert(0, plan.fielder);
            }
            log::debug!(
                "{} under it, reaction {:.2}s",
                self.fielders[plan.fielder].role,
                plan.reaction_s
            );
        }
    }

    /// Last predicted point: where the ball stops or leaves the field
    fn resting_point(&mut self, ball: &BallState, physics: &PhysicsConfig) -> Vector3<f32> {
        self.prediction
            .predict(ball, physics, self.config.prediction_horizon_s, self.config.prediction_step_s)
            .last()
            .map(|p| p.position)
            .unwrap_or(ball.position)
    }

    /// Move the chasers and check for a catch or a pick-up.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ball: &BallState,
        physics: &PhysicsConfig,
        rng: &mut R,
    ) -> Option<FieldingEvent> {
        if self.settled || !ball.has_been_hit || !ball.is_active {
            return None;
        }

        let reach = self.reach();
        let (horizon, step) = (self.config.prediction_horizon_s, self.config.prediction_step_s);
        let rest = self.resting_point(ball, physics);

        for &i in &self.chasers {
            let from = self.fielders[i].current_position;
            let target = self
                .prediction
                .find_intercept(ball, physics, horizon, step, &from, &reach)
                .map(|hit| hit.point)
                .unwrap_or(rest);
            let target = Vector3::new(target.x, 0.0, target.z);

            let f = &mut self.fielders[i];
            f.pursuit_target = Some(target);
            let to = target - f.current_position;
            let dist = to.norm();
            let stride = self.config.run_speed_mps * dt;
            if dist <= stride {
                f.current_position = target;
            } else if dist > 0.0 {
                f.current_position += to * (stride / dist);
            }
        }

        for &i in &self.chasers {
            let f = &self.fielders[i];
            let gap = ground_distance(&f.current_position, &ball.position);

            if let Some(plan) = self.catch_plan.filter(|p| p.fielder == i) {
                if ball.is_airborne_after_contact()
                    && gap <= self.config.reach_radius_m
                    && ball.position.y <= self.config.catch_height_m
                {
                    let p = catch_probability(plan.reaction_s, &self.config);
                    let role = f.role;
                    if rng.gen::<f32>() < p {
                        self.settled = true;
                        log::debug!("caught by {role} (p={p:.2})");
                        return Some(FieldingEvent::Caught { fielder: role, reaction_s: plan.reaction_s });
                    }
                    self.catch_plan = None;
                    self.catchable = false;
                    self.prediction.invalidate();
                    log::debug!("dropped by {role} (p={p:.2})");
                    return Some(FieldingEvent::Dropped { fielder: role, reaction_s: plan.reaction_s });
                }
            }

            if self.may_gather
                && !ball.is_airborne_after_contact()
                && gap <= self.config.pickup_radius_m
                && ball.position.y <= self.config.pickup_height_m
            {
                self.settled = true;
                return Some(FieldingEvent::Fielded {
                    fielder: f.role,
                    position: f.current_position,
                    after_s: ball.elapsed_s - self.contact_time_s,
                });
            }
        }
        None
    }
}

// ============================================================
// Running between the wickets
// ============================================================

/// Batter relative to the roles they had when the ball was bowled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runner {
    Striker,
    NonStriker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOut {
    pub end: End,
    pub runner: Runner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettlement {
    pub completed: u8,
    pub run_out: Option<RunOut>,
}

/// Return throw against the batters' running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunRace {
    /// End the throw goes to (the nearer set of stumps)
    pub throw_end: End,
    /// When the throw breaks the wicket, seconds after contact
    pub throw_arrival_s: f32,
}

impl RunRace {
    pub fn new(fielded_at: &Vector3<f32>, fielded_after_s: f32, cfg: &FieldingConfig) -> Self {
        let striker_end = Vector3::zeros();
        let bowler_end = Vector3::new(0.0, 0.0, pitch::LENGTH_M);
        let to_striker = ground_distance(fielded_at, &striker_end);
        let to_bowler = ground_distance(fielded_at, &bowler_end);
        let (throw_end, distance) =
            if to_striker <= to_bowler { (End::Striker, to_striker) } else { (End::Bowler, to_bowler) };
        Self {
            throw_end,
            throw_arrival_s: fielded_after_s + cfg.release_time_s + distance / cfg.throw_speed_mps,
        }
    }

    /// Most runs automatic calling will attempt
    pub fn safe_runs(&self, rules: &RulesConfig) -> u8 {
        (1..=rules.max_running_runs)
            .rev()
            .find(|k| rules.run_completion_s(*k) + rules.call_margin_s <= self.throw_arrival_s)
            .unwrap_or(0)
    }

    /// Outcome of attempting `attempted` runs. A run still in progress when
    /// the throw arrives is a run-out of whoever is heading for that end.
    pub fn settle(&self, attempted: u8, rules: &RulesConfig) -> RunSettlement {
        let completed = (0..=attempted)
            .rev()
            .find(|k| rules.run_completion_s(*k) <= self.throw_arrival_s)
            .unwrap_or(0);
        if completed >= attempted {
            return RunSettlement { completed: attempted, run_out: None };
        }

        // On odd runs the striker heads for the bowler's end
        let run = completed + 1;
        let runner = match (self.throw_end, run % 2 == 1) {
            (End::Bowler, true) | (End::Striker, false) => Runner::Striker,
            (End::Striker, true) | (End::Bowler, false) => Runner::NonStriker,
        };
        RunSettlement { completed, run_out: Some(RunOut { end: self.throw_end, runner }) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::{integrate_step, StepKind};
    use crate::engine::config::EngineConfig;
    use crate::engine::timestep::SUBSTEP_DT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn struck(vel: Vector3<f32>) -> BallState {
        BallState {
            position: Vector3::new(0.0, 0.8, pitch::BAT_PLANE_Z),
            velocity: vel,
            is_active: true,
            is_moving: true,
            has_been_hit: true,
            ..BallState::default()
        }
    }

    fn play_out(ai: &mut FieldingAI, mut ball: BallState, physics: &PhysicsConfig, seed: u64) -> Vec<FieldingEvent> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        let frame = 4.0 * SUBSTEP_DT;
        for _ in 0..900 {
            for _ in 0..4 {
                if integrate_step(&mut ball.position, &mut ball.velocity, SUBSTEP_DT, physics) == StepKind::Bounced {
                    ball.bounces_since_contact += 1;
                }
            }
            ball.elapsed_s += frame;
            if let Some(ev) = ai.update(frame, &ball, physics, &mut rng) {
                let done = !matches!(ev, FieldingEvent::Dropped { .. });
                events.push(ev);
                if done {
                    break;
                }
            }
        }
        events
    }

    #[test]
    fn test_default_field_is_legal() {
        let ai = FieldingAI::new(FieldingConfig::default());
        assert_eq!(ai.fielders().len(), 11);
        for f in ai.fielders() {
            let from_striker = (f.home_position.x.powi(2) + f.home_position.z.powi(2)).sqrt();
            assert!(from_striker >= field::MIN_FIELDER_DISTANCE_M, "{}", f.role);
            assert!(distance_from_center(&f.home_position) < field::BOUNDARY_RADIUS_M, "{}", f.role);
            assert_eq!(ai.fielder(f.role).role, f.role);
        }
    }

    #[test]
    fn test_manual_placement_survives_delivery_reset() {
        let mut ai = FieldingAI::new(FieldingConfig::default());
        let spot = Vector3::new(10.0, 0.0, 20.0);
        ai.set_fielder_position(FielderRole::Cover, spot).unwrap();
        ai.reset_for_delivery();
        assert_eq!(ai.fielder(FielderRole::Cover).current_position, spot);
        assert!(ai.is_manual_placement());

        ai.reset_placement();
        assert_eq!(ai.fielder(FielderRole::Cover).current_position, FielderRole::Cover.default_home());
        assert!(!ai.is_manual_placement());
    }

    #[test]
    fn test_placement_clamped_into_legal_area() {
        let mut ai = FieldingAI::new(FieldingConfig::default());
        let close = ai.set_fielder_position(FielderRole::Slip, Vector3::new(0.5, 0.0, 0.5)).unwrap();
        assert!(((close.x.powi(2) + close.z.powi(2)).sqrt() - field::MIN_FIELDER_DISTANCE_M).abs() < 1e-3);

        let far = ai.set_fielder_position(FielderRole::FineLeg, Vector3::new(0.0, 0.0, 200.0)).unwrap();
        assert!(distance_from_center(&far) < field::BOUNDARY_RADIUS_M);

        assert!(ai.set_fielder_position(FielderRole::Point, Vector3::new(f32::NAN, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_catch_probability_thresholds() {
        let cfg = FieldingConfig::default();
        assert_eq!(catch_probability(0.1, &cfg), 1.0);
        assert_eq!(catch_probability(cfg.catch_max_reaction_s + 0.1, &cfg), 0.0);
        let mid = catch_probability(1.5, &cfg);
        let late = catch_probability(2.5, &cfg);
        assert!(mid > late && late > 0.0 && mid < cfg.catch_base_probability);
    }

    #[test]
    fn test_skied_ball_is_taken_when_reaction_trivial() {
        let physics = EngineConfig::default().physics;
        let mut cfg = FieldingConfig::default();
        cfg.catch_min_reaction_s = 5.0;
        cfg.catch_max_reaction_s = 6.0;
        let mut ai = FieldingAI::new(cfg);

        let ball = struck(Vector3::new(0.0, 12.0, 18.0));
        ai.on_contact(&ball, &physics, true, true);
        let events = play_out(&mut ai, ball, &physics, 1);
        assert!(matches!(events.last(), Some(FieldingEvent::Caught { .. })), "{events:?}");
    }

    #[test]
    fn test_hopeless_catch_is_dropped() {
        let physics = EngineConfig::default().physics;
        let mut cfg = FieldingConfig::default();
        cfg.catch_min_reaction_s = 0.0;
        cfg.catch_max_reaction_s = 0.0;
        let mut ai = FieldingAI::new(cfg);

        let ball = struck(Vector3::new(0.0, 12.0, 18.0));
        ai.on_contact(&ball, &physics, true, true);
        let events = play_out(&mut ai, ball, &physics, 1);
        assert!(events.iter().any(|e| matches!(e, FieldingEvent::Dropped { .. })), "{events:?}");
        assert!(!events.iter().any(|e| matches!(e, FieldingEvent::Caught { .. })));
    }

    #[test]
    fn test_ground_ball_is_fielded_not_caught() {
        let physics = EngineConfig::default().physics;
        let mut ai = FieldingAI::new(FieldingConfig::default());
        let mut ball = struck(Vector3::new(10.0, 0.0, 12.0));
        ball.position.y = crate::engine::physics_constants::ball::RADIUS_M;
        ball.bounces_since_contact = 1;
        ai.on_contact(&ball, &physics, false, true);
        let events = play_out(&mut ai, ball, &physics, 2);
        assert!(matches!(events.last(), Some(FieldingEvent::Fielded { .. })), "{events:?}");
    }

    #[test]
    fn test_boundary_ball_never_fielded() {
        let physics = EngineConfig::default().physics;
        let mut ai = FieldingAI::new(FieldingConfig::default());
        let mut ball = struck(Vector3::new(0.0, 0.0, 6.0));
        ball.position.y = crate::engine::physics_constants::ball::RADIUS_M;
        ball.bounces_since_contact = 1;
        ai.on_contact(&ball, &physics, false, false);
        assert!(play_out(&mut ai, ball, &physics, 3).is_empty());
    }

    #[test]
    fn test_run_race_safe_runs_grow_with_distance() {
        let cfg = FieldingConfig::default();
        let rules = RulesConfig::default();
        let close = RunRace::new(&Vector3::new(3.0, 0.0, 8.0), 1.0, &cfg);
        let deep = RunRace::new(&Vector3::new(40.0, 0.0, 40.0), 6.0, &cfg);
        assert_eq!(close.safe_runs(&rules), 0);
        assert!(deep.safe_runs(&rules) >= 1);
        assert!(deep.settle(deep.safe_runs(&rules), &rules).run_out.is_none());
    }

    #[test]
    fn test_run_out_picks_batter_heading_to_throw_end() {
        let rules = RulesConfig::default();
        // Second run under way when the throw lands at the striker's end
        let race = RunRace { throw_end: End::Striker, throw_arrival_s: rules.run_completion_s(1) + 0.5 };
        let s = race.settle(2, &rules);
        assert_eq!(s.completed, 1);
        assert_eq!(s.run_out, Some(RunOut { end: End::Striker, runner: Runner::Striker }));

        let race = RunRace { throw_end: End::Striker, throw_arrival_s: 1.0 };
        let s = race.settle(1, &rules);
        assert_eq!(s.completed, 0);
        assert_eq!(s.run_out, Some(RunOut { end: End::Striker, runner: Runner::NonStriker }));
    }
}
