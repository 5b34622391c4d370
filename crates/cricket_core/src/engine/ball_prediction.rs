//! Ball Prediction
//!
//! Forward-simulates a free ball with the same substep integrator the
//! physics engine runs, so fielders chase where the ball will actually go.
//! Predictions are cached until the ball's position or velocity changes.

use nalgebra::Vector3;

use super::ball::{hits_stumps, integrate_step, BallState, StepKind};
use super::config::PhysicsConfig;
use super::physics_constants::{distance_from_center, field, ground_distance};
use super::timestep::SUBSTEP_DT;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedPoint {
    /// Seconds from now
    pub time_s: f32,
    pub position: Vector3<f32>,
    /// No bounce since the bat (still catchable)
    pub on_the_full: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Catch,
    Pickup,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    pub kind: InterceptKind,
    pub time_s: f32,
    pub point: Vector3<f32>,
}

/// Reach limits a fielder works with
#[derive(Debug, Clone, Copy)]
pub struct Reach {
    pub speed_mps: f32,
    pub radius_m: f32,
    pub catch_height_m: f32,
    pub pickup_height_m: f32,
    /// Off for balls that are not going to hand (ground balls, boundaries)
    pub can_catch: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BallPrediction {
    samples: Vec<PredictedPoint>,
    cache_valid: bool,
    last_position: Vector3<f32>,
    last_velocity: Vector3<f32>,
}

impl BallPrediction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.cache_valid = false;
    }

    /// Sampled path, `step_s` apart, up to `horizon_s` or until the ball
    /// stops or leaves the field.
    pub fn predict(
        &mut self,
        state: &BallState,
        cfg: &PhysicsConfig,
        horizon_s: f32,
        step_s: f32,
    ) -> &[PredictedPoint] {
        if !self.cache_valid
            || self.last_position != state.position
            || self.last_velocity != state.velocity
        {
            self.recalculate(state, cfg, horizon_s, step_s);
        }
        &self.samples
    }

    fn recalculate(&mut self, state: &BallState, cfg: &PhysicsConfig, horizon_s: f32, step_s: f32) {
        self.samples.clear();
        self.last_position = state.position;
        self.last_velocity = state.velocity;
        self.cache_valid = true;

        let substeps_per_sample = ((step_s / SUBSTEP_DT).round() as usize).max(1);
        let sample_count = (horizon_s / step_s).ceil() as usize;

        let mut pos = state.position;
        let mut vel = state.velocity;
        let mut on_the_full = state.bounces_since_contact == 0;
        let mut t = 0.0f32;

        'outer: for _ in 0..sample_count {
            for _ in 0..substeps_per_sample {
                let kind = integrate_step(&mut pos, &mut vel, SUBSTEP_DT, cfg);
                t += SUBSTEP_DT;
                if kind == StepKind::Bounced {
                    on_the_full = false;
                }
                if kind == StepKind::Stopped {
                    self.samples.push(PredictedPoint { time_s: t, position: pos, on_the_full });
                    break 'outer;
                }
            }
            self.samples.push(PredictedPoint { time_s: t, position: pos, on_the_full });
            if distance_from_center(&pos) >= field::BOUNDARY_RADIUS_M {
                break;
            }
        }
    }

    /// Earliest point a fielder standing at `from` can reach the ball.
    ///
    /// A catch needs the ball on the full and below `catch_height_m`; a
    /// pick-up needs it bounced and below `pickup_height_m`.
    pub fn find_intercept(
        &mut self,
        state: &BallState,
        cfg: &PhysicsConfig,
        horizon_s: f32,
        step_s: f32,
        from: &Vector3<f32>,
        reach: &Reach,
    ) -> Option<Intercept> {
        let samples = self.predict(state, cfg, horizon_s, step_s);
        for p in samples {
            if distance_from_center(&p.position) >= field::BOUNDARY_RADIUS_M {
                return None;
            }
            let run = ground_distance(from, &p.position);
            if run > reach.speed_mps * p.time_s + reach.radius_m {
                continue;
            }
            if p.on_the_full {
                if reach.can_catch && p.position.y <= reach.catch_height_m {
                    return Some(Intercept { kind: InterceptKind::Catch, time_s: p.time_s, point: p.position });
                }
            } else if p.position.y <= reach.pickup_height_m {
                return Some(Intercept { kind: InterceptKind::Pickup, time_s: p.time_s, point: p.position });
            }
        }
        None
    }

    /// Where an unstruck ball will be when it reaches the stumps, if it does
    pub fn stumps_crossing(state: &BallState, cfg: &PhysicsConfig) -> Option<Vector3<f32>> {
        let mut pos = state.position;
        let mut vel = state.velocity;
        for _ in 0..(4.0 / SUBSTEP_DT) as usize {
            let prev = pos;
            if integrate_step(&mut pos, &mut vel, SUBSTEP_DT, cfg) == StepKind::Stopped {
                return None;
            }
            if prev.z > 0.0 && pos.z <= 0.0 {
                let t = prev.z / (prev.z - pos.z);
                return Some(prev + (pos - prev) * t);
            }
        }
        None
    }

    pub fn will_hit_stumps(state: &BallState, cfg: &PhysicsConfig) -> bool {
        Self::stumps_crossing(state, cfg).map(|p| hits_stumps(&p)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::{BallEvent, BallPhysicsEngine};
    use crate::engine::config::EngineConfig;
    use crate::engine::delivery::{Delivery, DeliveryType};

    fn reach() -> Reach {
        Reach { speed_mps: 6.5, radius_m: 1.6, catch_height_m: 2.8, pickup_height_m: 0.9, can_catch: true }
    }

    fn struck(vx: f32, vy: f32, vz: f32) -> BallState {
        BallState {
            position: Vector3::new(0.0, 0.8, 1.4),
            velocity: Vector3::new(vx, vy, vz),
            is_active: true,
            is_moving: true,
            has_been_hit: true,
            ..BallState::default()
        }
    }

    #[test]
    fn test_cache_reused_until_ball_changes() {
        let cfg = PhysicsConfig::default();
        let mut pred = BallPrediction::new();
        let state = struck(0.0, 8.0, 20.0);
        let first = pred.predict(&state, &cfg, 3.0, 0.05).to_vec();
        assert!(!first.is_empty());
        assert_eq!(pred.predict(&state, &cfg, 3.0, 0.05), first.as_slice());

        let moved = struck(5.0, 8.0, 20.0);
        assert_ne!(pred.predict(&moved, &cfg, 3.0, 0.05), first.as_slice());
    }

    #[test]
    fn test_lofted_ball_can_be_caught_under_it() {
        let cfg = PhysicsConfig::default();
        let mut pred = BallPrediction::new();
        let state = struck(0.0, 12.0, 18.0);
        let samples = pred.predict(&state, &cfg, 6.0, 0.05).to_vec();
        let landing = samples.iter().find(|p| !p.on_the_full).map(|p| p.position).unwrap();

        let fielder = Vector3::new(0.0, 0.0, landing.z);
        let hit = pred.find_intercept(&state, &cfg, 6.0, 0.05, &fielder, &reach()).unwrap();
        assert_eq!(hit.kind, InterceptKind::Catch);
    }

    #[test]
    fn test_ground_ball_is_picked_up() {
        let cfg = PhysicsConfig::default();
        let mut pred = BallPrediction::new();
        let mut state = struck(0.0, 0.0, 15.0);
        state.position.y = crate::engine::physics_constants::ball::RADIUS_M;
        state.bounces_since_contact = 1;
        let fielder = Vector3::new(3.0, 0.0, 25.0);
        let hit = pred.find_intercept(&state, &cfg, 8.0, 0.05, &fielder, &reach()).unwrap();
        assert_eq!(hit.kind, InterceptKind::Pickup);
    }

    #[test]
    fn test_stumps_prediction_matches_simulation() {
        let cfg = EngineConfig::deterministic();
        for t in DeliveryType::ALL {
            let mut eng = BallPhysicsEngine::new(cfg.physics.clone(), 1);
            eng.start_delivery(&Delivery::nominal(t)).unwrap();
            let predicted = BallPrediction::will_hit_stumps(eng.state(), &cfg.physics);

            let mut hit = false;
            for _ in 0..200 {
                eng.tick(1.0 / 60.0);
                if eng.take_events().iter().any(|e| matches!(e, BallEvent::HitStumps { .. })) {
                    hit = true;
                }
                if !eng.state().is_moving {
                    break;
                }
            }
            assert_eq!(predicted, hit, "{t}");
        }
    }
}
