//! Ball physics
//!
//! This module contains:
//! - `BallState`: the ball as every other subsystem sees it
//! - `BallPhysicsEngine`: launch, fixed-substep integration, bounce and
//!   collision detection against bat plane, stumps, boundary and fielders
//! - `ExitTrajectory`: the velocity a contact puts on the ball
//!
//! The engine is the only writer of `BallState`.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::engine::config::PhysicsConfig;
use crate::engine::delivery::Delivery;
use crate::engine::physics_constants::{ball, distance_from_center, field, pitch, stumps};
use crate::engine::timestep::{MAX_FRAME_DT, SUBSTEP_DT};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    /// A delivery is in progress (launch → dead ball)
    pub is_active: bool,
    pub is_moving: bool,
    /// Delivery clock time of the last bounce (s)
    pub last_bounce_time: Option<f32>,
    pub has_been_hit: bool,
    /// Seconds since release
    pub elapsed_s: f32,
    /// Where the ball first pitched, if it has
    pub pitch_point: Option<Vector3<f32>>,
    pub bounces_since_contact: u8,
}

impl Default for BallState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            is_active: false,
            is_moving: false,
            last_bounce_time: None,
            has_been_hit: false,
            elapsed_s: 0.0,
            pitch_point: None,
            bounces_since_contact: 0,
        }
    }
}

impl BallState {
    /// Distance (z) still to travel before the ball reaches the bat
    #[inline]
    pub fn distance_to_bat(&self) -> f32 {
        self.position.z - pitch::BAT_PLANE_Z
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    /// Struck and not yet grounded
    #[inline]
    pub fn is_airborne_after_contact(&self) -> bool {
        self.has_been_hit && self.bounces_since_contact == 0
    }
}

/// Velocity imparted by the bat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitTrajectory {
    /// 0 = straight back past the bowler, +π/2 = square off side, ±π = fine behind
    pub azimuth_rad: f32,
    /// Above horizontal
    pub elevation_rad: f32,
    pub speed_mps: f32,
}

impl ExitTrajectory {
    pub fn velocity(&self) -> Vector3<f32> {
        let horizontal = self.speed_mps * self.elevation_rad.cos();
        Vector3::new(
            horizontal * self.azimuth_rad.sin(),
            self.speed_mps * self.elevation_rad.sin(),
            horizontal * self.azimuth_rad.cos(),
        )
    }
}

/// Things the ball ran into during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallEvent {
    Pitched { position: Vector3<f32>, time_s: f32 },
    CrossedBatPlane { position: Vector3<f32> },
    HitStumps { position: Vector3<f32> },
    PassedStumps { position: Vector3<f32> },
    CrossedBoundary { position: Vector3<f32>, on_the_full: bool },
    Gathered { fielder: usize, position: Vector3<f32> },
    Stopped { position: Vector3<f32> },
}

/// Result of one integration substep
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StepKind {
    Airborne,
    Bounced,
    Rolling,
    Stopped,
}

#[inline]
fn on_pitch(p: &Vector3<f32>) -> bool {
    p.x.abs() <= 1.52 && p.z >= -pitch::POPPING_CREASE_M && p.z <= pitch::LENGTH_M + 1.22
}

/// Advance a free ball by one substep: gravity + quadratic drag in the air,
/// restitution on landing, exponential damping when rolling.
pub(crate) fn integrate_step(
    pos: &mut Vector3<f32>,
    vel: &mut Vector3<f32>,
    dt: f32,
    cfg: &PhysicsConfig,
) -> StepKind {
    let radius = ball::RADIUS_M;
    let grounded = pos.y <= radius + 1e-4 && vel.y.abs() < 1e-4;

    if grounded {
        vel.y = 0.0;
        pos.y = radius;
        let m = cfg.roll_multiplier(dt);
        vel.x *= m;
        vel.z *= m;
        if (vel.x * vel.x + vel.z * vel.z).sqrt() < cfg.stop_speed_mps {
            *vel = Vector3::zeros();
            return StepKind::Stopped;
        }
        pos.x += vel.x * dt;
        pos.z += vel.z * dt;
        return StepKind::Rolling;
    }

    let speed = vel.norm();
    let accel = *vel * (-cfg.drag_k * speed) + Vector3::new(0.0, -cfg.gravity, 0.0);
    *vel += accel * dt;
    *pos += *vel * dt;

    if pos.y <= radius && vel.y < 0.0 {
        pos.y = radius;
        let restitution =
            if on_pitch(pos) { cfg.pitch_restitution } else { cfg.outfield_restitution };
        let rebound = -vel.y * restitution;
        vel.x *= cfg.bounce_friction;
        vel.z *= cfg.bounce_friction;
        vel.y = if rebound < cfg.min_bounce_vy_mps { 0.0 } else { rebound };
        return StepKind::Bounced;
    }

    StepKind::Airborne
}

/// Interpolate the point where segment `a→b` crosses the plane `z = plane`.
#[inline]
fn crossing(a: &Vector3<f32>, b: &Vector3<f32>, plane: f32) -> Vector3<f32> {
    let dz = b.z - a.z;
    if dz.abs() < 1e-6 {
        return *b;
    }
    let t = ((plane - a.z) / dz).clamp(0.0, 1.0);
    a + (b - a) * t
}

#[inline]
pub(crate) fn hits_stumps(at: &Vector3<f32>) -> bool {
    at.x.abs() <= stumps::HALF_WIDTH_M + ball::RADIUS_M
        && at.y <= stumps::HEIGHT_M + ball::RADIUS_M
}

pub struct BallPhysicsEngine {
    state: BallState,
    config: PhysicsConfig,
    rng: ChaCha8Rng,
    accumulator: f32,
    halted_at_bat: bool,
    bat_plane_crossed: bool,
    stumps_resolved: bool,
    events: Vec<BallEvent>,
}

impl BallPhysicsEngine {
    pub fn new(config: PhysicsConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(1);
        Self {
            state: BallState::default(),
            config,
            rng,
            accumulator: 0.0,
            halted_at_bat: false,
            bat_plane_crossed: false,
            stumps_resolved: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &BallState {
        &self.state
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Simulated time buffered but not yet integrated
    pub fn pending_time(&self) -> f32 {
        self.accumulator
    }

    pub fn take_events(&mut self) -> Vec<BallEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reseed the seam stream (new match)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.rng.set_stream(1);
    }

    /// Drop any delivery in progress
    pub fn reset(&mut self) {
        self.state = BallState::default();
        self.accumulator = 0.0;
        self.halted_at_bat = false;
        self.bat_plane_crossed = false;
        self.stumps_resolved = false;
        self.events.clear();
    }

    /// Release a delivery from the bowling crease.
    ///
    /// Rejected while another delivery is still active.
    pub fn start_delivery(&mut self, delivery: &Delivery) -> Result<()> {
        if self.state.is_active {
            let err = CoreError::invalid("start_delivery", "ball already active");
            log::warn!("{err}");
            return Err(err);
        }

        self.reset();
        let (position, velocity) = launch_for(delivery, &self.config);
        self.state.position = position;
        self.state.velocity = velocity;
        self.state.is_active = true;
        self.state.is_moving = true;

        log::debug!(
            "delivery launched: {} line={:.2} length={:.2} speed={:.1}km/h",
            delivery.delivery_type,
            delivery.target_line,
            delivery.target_length,
            delivery.speed_kmh()
        );
        Ok(())
    }

    /// Integrate `dt` seconds. Returns whether the ball is still moving.
    ///
    /// Integration pauses right after the ball crosses the bat plane so the
    /// caller can resolve the stroke before the ball travels on to the
    /// stumps; the leftover time stays buffered for the next call.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.state.is_active || !self.state.is_moving {
            self.accumulator = 0.0;
            return self.state.is_moving;
        }

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        while self.accumulator >= SUBSTEP_DT {
            self.accumulator -= SUBSTEP_DT;
            self.step(SUBSTEP_DT);

            if !self.state.is_moving {
                self.accumulator = 0.0;
                break;
            }
            if self.halted_at_bat {
                self.halted_at_bat = false;
                break;
            }
        }
        self.state.is_moving
    }

    fn step(&mut self, dt: f32) {
        let prev = self.state.position;
        let mut pos = self.state.position;
        let mut vel = self.state.velocity;
        let kind = integrate_step(&mut pos, &mut vel, dt, &self.config);
        self.state.elapsed_s += dt;

        if kind == StepKind::Bounced {
            self.on_bounce(&pos, &mut vel);
        }

        self.state.position = pos;
        self.state.velocity = vel;

        if !self.state.has_been_hit {
            self.check_crease(&prev, &pos);
        } else if distance_from_center(&pos) >= field::BOUNDARY_RADIUS_M {
            self.events.push(BallEvent::CrossedBoundary {
                position: pos,
                on_the_full: self.state.bounces_since_contact == 0,
            });
            self.halt();
            return;
        }

        if kind == StepKind::Stopped {
            self.state.is_moving = false;
            self.events.push(BallEvent::Stopped { position: pos });
        }
    }

    fn on_bounce(&mut self, pos: &Vector3<f32>, vel: &mut Vector3<f32>) {
        self.state.last_bounce_time = Some(self.state.elapsed_s);
        if self.state.has_been_hit {
            self.state.bounces_since_contact = self.state.bounces_since_contact.saturating_add(1);
            return;
        }
        if self.state.pitch_point.is_none() {
            self.state.pitch_point = Some(*pos);
            vel.x += self.seam_movement();
            self.events.push(BallEvent::Pitched { position: *pos, time_s: self.state.elapsed_s });
        }
    }

    /// Bounded sideways movement off the seam
    fn seam_movement(&mut self) -> f32 {
        let sigma = self.config.seam_sigma_mps;
        let bound = self.config.max_seam_mps;
        if sigma <= 0.0 || bound <= 0.0 {
            return 0.0;
        }
        match Normal::new(0.0, sigma) {
            Ok(normal) => normal.sample(&mut self.rng).clamp(-bound, bound),
            Err(_) => 0.0,
        }
    }

    fn check_crease(&mut self, prev: &Vector3<f32>, pos: &Vector3<f32>) {
        if !self.bat_plane_crossed && prev.z > pitch::BAT_PLANE_Z && pos.z <= pitch::BAT_PLANE_Z {
            self.bat_plane_crossed = true;
            self.halted_at_bat = true;
            let at = crossing(prev, pos, pitch::BAT_PLANE_Z);
            self.events.push(BallEvent::CrossedBatPlane { position: at });
        }

        if !self.stumps_resolved && prev.z > 0.0 && pos.z <= 0.0 {
            self.stumps_resolved = true;
            let at = crossing(prev, pos, 0.0);
            if hits_stumps(&at) {
                self.events.push(BallEvent::HitStumps { position: at });
                self.halt();
            } else {
                self.events.push(BallEvent::PassedStumps { position: at });
            }
        }
    }

    fn halt(&mut self) {
        self.state.velocity = Vector3::zeros();
        self.state.is_moving = false;
        self.accumulator = 0.0;
    }

    /// Send the ball off the bat
    pub fn apply_contact(&mut self, trajectory: &ExitTrajectory) -> Result<()> {
        if !self.state.is_active || self.state.has_been_hit {
            let err = CoreError::invalid("apply_contact", "no unstruck ball in play");
            log::warn!("{err}");
            return Err(err);
        }
        self.state.has_been_hit = true;
        self.state.bounces_since_contact = 0;
        self.state.velocity = trajectory.velocity();
        self.state.position.y = self.state.position.y.max(ball::RADIUS_M + 0.01);
        self.state.is_moving = true;
        Ok(())
    }

    /// A fielder (or keeper) has the ball in hand
    pub fn gather(&mut self, fielder: usize) {
        if !self.state.is_active {
            return;
        }
        self.events.push(BallEvent::Gathered { fielder, position: self.state.position });
        self.halt();
    }

    /// Ball is dead; the next delivery may start
    pub fn finish(&mut self) {
        self.state.is_active = false;
        self.halt();
    }
}

/// Release point and velocity for a delivery.
///
/// Direction in the ground plane is fixed by release point and target line.
/// Drag acts along the velocity, so it never bends that heading. The vertical
/// launch speed is bisected against the same substep integrator the engine
/// uses, which makes the pitching spot a deterministic function of
/// `target_length`.
pub fn launch_for(delivery: &Delivery, cfg: &PhysicsConfig) -> (Vector3<f32>, Vector3<f32>) {
    let release = Vector3::new(delivery.release_x(), pitch::RELEASE_HEIGHT_M, pitch::BOWLING_CREASE_Z);
    let heading = Vector3::new(delivery.target_line - release.x, 0.0, -release.z);
    let heading = heading / heading.norm();
    let horizontal = heading * delivery.speed.max(1.0);
    let target_z = delivery.target_length.clamp(-1.0, pitch::BOWLING_CREASE_Z - 2.0);

    let landing_z = |vy: f32| -> f32 {
        let mut pos = release;
        let mut vel = horizontal + Vector3::new(0.0, vy, 0.0);
        for _ in 0..2400 {
            if integrate_step(&mut pos, &mut vel, SUBSTEP_DT, cfg) == StepKind::Bounced {
                return pos.z;
            }
        }
        pos.z
    };

    // Longer hang time (larger vy) carries the ball further toward the batter (smaller z).
    let (mut lo, mut hi) = (-30.0f32, 15.0f32);
    for _ in 0..32 {
        let mid = (lo + hi) / 2.0;
        if landing_z(mid) > target_z {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let vy = (lo + hi) / 2.0;
    (release, horizontal + Vector3::new(0.0, vy, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::delivery::DeliveryType;

    fn engine() -> BallPhysicsEngine {
        BallPhysicsEngine::new(EngineConfig::deterministic().physics, 7)
    }

    fn run_until<F: Fn(&BallEvent) -> bool>(eng: &mut BallPhysicsEngine, pred: F) -> Option<BallEvent> {
        for _ in 0..600 {
            eng.tick(1.0 / 60.0);
            for ev in eng.take_events() {
                if pred(&ev) {
                    return Some(ev);
                }
            }
            if !eng.state().is_moving {
                break;
            }
        }
        None
    }

    #[test]
    fn test_second_delivery_rejected_while_active() {
        let mut eng = engine();
        eng.start_delivery(&Delivery::nominal(DeliveryType::Straight)).unwrap();
        let before = eng.state().clone();
        assert!(eng.start_delivery(&Delivery::nominal(DeliveryType::Bouncer)).is_err());
        assert_eq!(eng.state(), &before);
    }

    #[test]
    fn test_pitches_at_target_length() {
        for t in DeliveryType::ALL {
            let d = Delivery::nominal(t);
            let mut eng = engine();
            eng.start_delivery(&d).unwrap();
            let pitched = run_until(&mut eng, |e| matches!(e, BallEvent::Pitched { .. }));
            match pitched {
                Some(BallEvent::Pitched { position, .. }) => {
                    assert!(
                        (position.z - d.target_length).abs() < 0.25,
                        "{t}: pitched at {} wanted {}",
                        position.z,
                        d.target_length
                    );
                }
                other => panic!("{t}: never pitched: {other:?}"),
            }
        }
    }

    #[test]
    fn test_tick_halts_at_bat_plane() {
        let mut eng = engine();
        eng.start_delivery(&Delivery::nominal(DeliveryType::Straight)).unwrap();
        let ev = run_until(&mut eng, |e| matches!(e, BallEvent::CrossedBatPlane { .. }));
        assert!(ev.is_some());
        let z = eng.state().position.z;
        assert!(z <= pitch::BAT_PLANE_Z && z > pitch::BAT_PLANE_Z - 0.5, "z={z}");
    }

    #[test]
    fn test_wide_line_passes_stumps() {
        let mut eng = engine();
        let mut d = Delivery::nominal(DeliveryType::Straight);
        d.target_line = 0.7;
        eng.start_delivery(&d).unwrap();
        let ev = run_until(&mut eng, |e| {
            matches!(e, BallEvent::PassedStumps { .. } | BallEvent::HitStumps { .. })
        });
        assert!(matches!(ev, Some(BallEvent::PassedStumps { .. })), "{ev:?}");
    }

    #[test]
    fn test_bouncer_clears_stumps() {
        let mut eng = engine();
        eng.start_delivery(&Delivery::nominal(DeliveryType::Bouncer)).unwrap();
        let ev = run_until(&mut eng, |e| {
            matches!(e, BallEvent::PassedStumps { .. } | BallEvent::HitStumps { .. })
        });
        assert!(matches!(ev, Some(BallEvent::PassedStumps { .. })), "{ev:?}");
    }

    #[test]
    fn test_seam_is_reproducible_under_seed() {
        let cfg = EngineConfig::default().physics;
        let d = Delivery::nominal(DeliveryType::Straight);
        let mut a = BallPhysicsEngine::new(cfg.clone(), 99);
        let mut b = BallPhysicsEngine::new(cfg, 99);
        a.start_delivery(&d).unwrap();
        b.start_delivery(&d).unwrap();
        for _ in 0..40 {
            a.tick(1.0 / 60.0);
            b.tick(1.0 / 60.0);
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_seam_movement_is_bounded() {
        let cfg = EngineConfig::default().physics;
        let mut eng = BallPhysicsEngine::new(cfg.clone(), 3);
        for _ in 0..500 {
            assert!(eng.seam_movement().abs() <= cfg.max_seam_mps);
        }
    }

    #[test]
    fn test_contact_redirects_and_boundary_detected() {
        let mut eng = engine();
        eng.start_delivery(&Delivery::nominal(DeliveryType::Straight)).unwrap();
        run_until(&mut eng, |e| matches!(e, BallEvent::CrossedBatPlane { .. }));
        let six = ExitTrajectory { azimuth_rad: 0.0, elevation_rad: 0.7, speed_mps: 40.0 };
        eng.apply_contact(&six).unwrap();
        assert!(eng.state().has_been_hit);
        assert!(eng.apply_contact(&six).is_err());

        let ev = run_until(&mut eng, |e| matches!(e, BallEvent::CrossedBoundary { .. }));
        assert!(matches!(ev, Some(BallEvent::CrossedBoundary { on_the_full: true, .. })), "{ev:?}");
    }

    #[test]
    fn test_finish_frees_engine_for_next_delivery() {
        let mut eng = engine();
        let d = Delivery::nominal(DeliveryType::Yorker);
        eng.start_delivery(&d).unwrap();
        eng.finish();
        assert!(!eng.state().is_active);
        assert!(eng.start_delivery(&d).is_ok());
    }

    #[test]
    fn test_rolling_ball_comes_to_rest() {
        let cfg = PhysicsConfig::default();
        let mut pos = Vector3::new(0.0, ball::RADIUS_M, 5.0);
        let mut vel = Vector3::new(0.0, 0.0, 10.0);
        let mut stopped = false;
        for _ in 0..(240 * 30) {
            if integrate_step(&mut pos, &mut vel, SUBSTEP_DT, &cfg) == StepKind::Stopped {
                stopped = true;
                break;
            }
        }
        assert!(stopped);
        // v0 / k_roll bounds the roll distance
        assert!(pos.z - 5.0 < 10.0 / cfg.roll_k_1ps + 0.5);
    }
}
