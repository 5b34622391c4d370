//! Shot resolution
//!
//! Turns the batter's input (or the lack of one) into a `ContactOutcome`
//! when the ball reaches the bat plane. Timing is judged on the ball's
//! distance from the bat when the input arrived; the discrete outcome is a
//! weighted draw from the shot category's table for that timing bucket.

use nalgebra::Vector3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::f32::consts::PI;

use super::ball::{BallState, ExitTrajectory};
use super::ball_prediction::BallPrediction;
use super::config::{PhysicsConfig, ShotConfig};
use super::shot::{
    outcome_weights, BoundaryKind, ContactKind, ContactOutcome, PitchLength, ShotAttempt,
    ShotOutcome, ShotType, TimingBucket,
};
use crate::error::{CoreError, Result};

/// Furthest a ball can pass from middle stump and still meet a blocking bat (m)
const BAT_REACH_M: f32 = 0.6;
/// Unplayed balls below this height at the bat strike the pads (m)
const PAD_HEIGHT_M: f32 = 0.55;

#[derive(Debug, Clone)]
pub struct ShotResolver {
    config: ShotConfig,
    attempt: Option<ShotAttempt>,
}

impl ShotResolver {
    pub fn new(config: ShotConfig) -> Self {
        Self { config, attempt: None }
    }

    pub fn config(&self) -> &ShotConfig {
        &self.config
    }

    /// Forget the previous ball's input
    pub fn begin_delivery(&mut self) {
        self.attempt = None;
    }

    pub fn pending(&self) -> Option<&ShotAttempt> {
        self.attempt.as_ref()
    }

    /// Register the batter's shot for the ball in flight.
    ///
    /// Only the first input of a delivery counts. Input with no live ball, or
    /// after the ball has gone past the bat, is rejected.
    pub fn submit(&mut self, shot_type: ShotType, power: f32, ball: &BallState) -> Result<ShotAttempt> {
        let reason = if !ball.is_active {
            Some("no ball in play")
        } else if ball.has_been_hit || ball.distance_to_bat() < 0.0 {
            Some("ball already past the bat")
        } else if self.attempt.is_some() {
            Some("shot already played this delivery")
        } else {
            None
        };
        if let Some(reason) = reason {
            let err = CoreError::invalid("submit_shot", reason);
            log::warn!("{err}");
            return Err(err);
        }

        let profile = shot_type.profile();
        let attempt = ShotAttempt {
            shot_type,
            timing_offset: ball.distance_to_bat() - profile.ideal_distance_m,
            power: power.clamp(0.0, 1.0),
        };
        log::debug!("shot {} offset {:+.2}m", shot_type, attempt.timing_offset);
        self.attempt = Some(attempt);
        Ok(attempt)
    }

    /// 1.0 at the ideal moment, 0.0 at the window edge. `None` outside the window.
    pub fn timing_quality(&self, attempt: &ShotAttempt, length: PitchLength) -> Option<f32> {
        let profile = attempt.shot_type.profile();
        let half = profile.half_window_m * self.config.window_scale;
        if attempt.timing_offset.abs() > half {
            return None;
        }
        let mut quality = 1.0 - attempt.timing_offset.abs() / half;
        if !profile.suits(length) {
            quality -= self.config.length_mismatch_penalty;
        }
        Some(quality.clamp(0.0, 1.0))
    }

    pub fn bucket(&self, quality: f32) -> TimingBucket {
        if quality >= self.config.perfect_threshold {
            TimingBucket::Perfect
        } else if quality >= self.config.good_threshold {
            TimingBucket::Good
        } else if quality >= self.config.poor_threshold {
            TimingBucket::Poor
        } else {
            TimingBucket::Edge
        }
    }

    /// Resolve the ball at the bat plane.
    ///
    /// `fielders` are current fielder positions; catchable mishits are aimed
    /// at the one that best matches the shot's direction.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        ball: &BallState,
        physics: &PhysicsConfig,
        fielders: &[Vector3<f32>],
        rng: &mut R,
    ) -> ContactOutcome {
        let Some(attempt) = self.attempt.take() else {
            return self.default_block(ball, physics, rng);
        };

        let length = PitchLength::classify(ball.pitch_point.map(|p| p.z));
        let Some(quality) = self.timing_quality(&attempt, length) else {
            log::debug!("{} outside its window: swing and miss", attempt.shot_type);
            return ContactOutcome::missed(Some(attempt.shot_type), None);
        };
        let bucket = self.bucket(quality);

        let profile = attempt.shot_type.profile();
        let weights = outcome_weights(profile.category, bucket);
        let drawn = WeightedIndex::new(weights)
            .map(|dist| ShotOutcome::COLUMNS[dist.sample(rng)])
            .unwrap_or(ShotOutcome::Dot);

        log::debug!("{} timed {:?} (q={:.2}) -> {:?}", attempt.shot_type, bucket, quality, drawn);
        self.outcome_for(drawn, &attempt, bucket, fielders, physics, rng)
    }

    fn outcome_for<R: Rng + ?Sized>(
        &self,
        drawn: ShotOutcome,
        attempt: &ShotAttempt,
        bucket: TimingBucket,
        fielders: &[Vector3<f32>],
        physics: &PhysicsConfig,
        rng: &mut R,
    ) -> ContactOutcome {
        let profile = attempt.shot_type.profile();
        let power = 0.85 + 0.15 * attempt.power;
        let azimuth = rng.gen_range(profile.azimuth.0..=profile.azimuth.1);

        let mut outcome = ContactOutcome {
            kind: ContactKind::Struck,
            shot: Some(attempt.shot_type),
            timing: Some(bucket),
            runs_scored: 0,
            boundary: None,
            is_catchable: false,
            is_caught: false,
            is_missed: false,
            exit_trajectory: None,
        };

        let trajectory = match drawn {
            ShotOutcome::Miss => {
                return ContactOutcome::missed(Some(attempt.shot_type), Some(bucket));
            }
            ShotOutcome::Dot => ExitTrajectory {
                azimuth_rad: azimuth,
                elevation_rad: rng.gen_range(0.02..0.12),
                speed_mps: rng.gen_range(6.0..10.0) * power,
            },
            ShotOutcome::One | ShotOutcome::Two | ShotOutcome::Three => {
                let runs = drawn.running_runs();
                outcome.runs_scored = runs;
                let (lo, hi) = match runs {
                    1 => (13.0, 17.0),
                    2 => (19.0, 23.0),
                    _ => (24.0, 27.0),
                };
                ExitTrajectory {
                    azimuth_rad: azimuth,
                    elevation_rad: rng.gen_range(0.03..0.15),
                    speed_mps: rng.gen_range(lo..hi) * power,
                }
            }
            ShotOutcome::Four => {
                outcome.boundary = Some(BoundaryKind::Four);
                outcome.runs_scored = 4;
                ExitTrajectory {
                    azimuth_rad: azimuth,
                    elevation_rad: rng.gen_range(0.02..0.08),
                    speed_mps: rng.gen_range(34.0..40.0),
                }
            }
            ShotOutcome::Six => {
                outcome.boundary = Some(BoundaryKind::Six);
                outcome.runs_scored = 6;
                ExitTrajectory {
                    azimuth_rad: azimuth,
                    elevation_rad: rng.gen_range(0.55..0.75),
                    speed_mps: rng.gen_range(38.0..44.0),
                }
            }
            ShotOutcome::CatchableMishit => {
                outcome.is_catchable = true;
                outcome.runs_scored = 1;
                mishit_toward(profile.azimuth_center(), fielders, physics, rng)
            }
        };
        outcome.exit_trajectory = Some(trajectory);
        outcome
    }

    /// No shot offered: the batter blocks, pads up or lets it go.
    fn default_block<R: Rng + ?Sized>(
        &self,
        ball: &BallState,
        physics: &PhysicsConfig,
        rng: &mut R,
    ) -> ContactOutcome {
        if BallPrediction::will_hit_stumps(ball, physics) || ball.position.x.abs() > BAT_REACH_M {
            return ContactOutcome::missed(None, None);
        }

        let (kind, trajectory) = if ball.position.y < PAD_HEIGHT_M {
            (
                ContactKind::Padded,
                ExitTrajectory {
                    azimuth_rad: rng.gen_range(-1.2..-0.4),
                    elevation_rad: 0.05,
                    speed_mps: rng.gen_range(2.0..4.0),
                },
            )
        } else {
            (
                ContactKind::Blocked,
                ExitTrajectory {
                    azimuth_rad: rng.gen_range(-0.4..0.4),
                    elevation_rad: -0.1,
                    speed_mps: rng.gen_range(3.0..5.0),
                },
            )
        };

        ContactOutcome {
            kind,
            shot: None,
            timing: None,
            runs_scored: 0,
            boundary: None,
            is_catchable: false,
            is_caught: false,
            is_missed: false,
            exit_trajectory: Some(trajectory),
        }
    }
}

/// Skied ball aimed to come down near the fielder whose bearing is closest
/// to the shot's direction.
fn mishit_toward<R: Rng + ?Sized>(
    shot_azimuth: f32,
    fielders: &[Vector3<f32>],
    physics: &PhysicsConfig,
    rng: &mut R,
) -> ExitTrajectory {
    let angle_gap = |a: f32, b: f32| {
        let d = (a - b).rem_euclid(2.0 * PI);
        d.min(2.0 * PI - d)
    };

    let (azimuth, range) = fielders
        .iter()
        .map(|f| (f.x.atan2(f.z), (f.x * f.x + f.z * f.z).sqrt()))
        .filter(|(_, dist)| *dist >= 8.0)
        .min_by(|a, b| angle_gap(a.0, shot_azimuth).total_cmp(&angle_gap(b.0, shot_azimuth)))
        .unwrap_or((shot_azimuth, 25.0));

    let elevation = rng.gen_range(0.75..1.05f32);
    let range = (range + rng.gen_range(-4.0..4.0)).clamp(6.0, 60.0);
    ExitTrajectory {
        azimuth_rad: azimuth + rng.gen_range(-0.12..0.12),
        elevation_rad: elevation,
        speed_mps: (range * physics.gravity / (2.0 * elevation).sin()).sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::{BallEvent, BallPhysicsEngine};
    use crate::engine::config::EngineConfig;
    use crate::engine::delivery::{Delivery, DeliveryType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ball_at(distance_to_bat: f32) -> BallState {
        BallState {
            position: Vector3::new(0.0, 0.8, crate::engine::physics_constants::pitch::BAT_PLANE_Z + distance_to_bat),
            velocity: Vector3::new(0.0, 0.0, -30.0),
            is_active: true,
            is_moving: true,
            pitch_point: Some(Vector3::new(0.0, 0.036, 6.0)),
            ..BallState::default()
        }
    }

    fn at_bat(delivery: Delivery) -> (BallState, PhysicsConfig) {
        let cfg = EngineConfig::deterministic().physics;
        let mut eng = BallPhysicsEngine::new(cfg.clone(), 5);
        eng.start_delivery(&delivery).unwrap();
        for _ in 0..200 {
            eng.tick(1.0 / 60.0);
            if eng.take_events().iter().any(|e| matches!(e, BallEvent::CrossedBatPlane { .. })) {
                break;
            }
        }
        (eng.state().clone(), cfg)
    }

    #[test]
    fn test_shot_rejected_without_live_ball() {
        let mut resolver = ShotResolver::new(ShotConfig::default());
        let idle = BallState::default();
        let err = resolver.submit(ShotType::CoverDrive, 1.0, &idle).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStateTransition { .. }));
        assert!(resolver.pending().is_none());
    }

    #[test]
    fn test_only_first_input_counts() {
        let mut resolver = ShotResolver::new(ShotConfig::default());
        let ball = ball_at(4.0);
        resolver.submit(ShotType::StraightDrive, 1.0, &ball).unwrap();
        assert!(resolver.submit(ShotType::Slog, 1.0, &ball).is_err());
        assert_eq!(resolver.pending().unwrap().shot_type, ShotType::StraightDrive);
    }

    #[test]
    fn test_early_swing_misses() {
        let mut resolver = ShotResolver::new(ShotConfig::default());
        let ball = ball_at(15.0);
        resolver.submit(ShotType::Pull, 1.0, &ball).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = resolver.resolve(&ball, &PhysicsConfig::default(), &[], &mut rng);
        assert!(out.is_missed);
        assert_eq!(out.kind, ContactKind::Missed);
    }

    #[test]
    fn test_timing_quality_and_buckets() {
        let resolver = ShotResolver::new(ShotConfig::default());
        let ideal = ShotAttempt { shot_type: ShotType::StraightDrive, timing_offset: 0.0, power: 1.0 };
        assert_eq!(resolver.timing_quality(&ideal, PitchLength::Good), Some(1.0));
        assert_eq!(resolver.bucket(1.0), TimingBucket::Perfect);

        // Pull to a full ball loses the mismatch penalty
        let pull = ShotAttempt { shot_type: ShotType::Pull, timing_offset: 0.0, power: 1.0 };
        let q = resolver.timing_quality(&pull, PitchLength::Full).unwrap();
        assert!((q - 0.75).abs() < 1e-6);
        assert_eq!(resolver.bucket(0.1), TimingBucket::Edge);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let fielders = [Vector3::new(20.0, 0.0, 30.0), Vector3::new(-25.0, 0.0, 10.0)];
        let run = |seed| {
            let mut resolver = ShotResolver::new(ShotConfig::default());
            let ball = ball_at(4.0);
            resolver.submit(ShotType::LoftedDrive, 0.8, &ball).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            resolver.resolve(&ball, &PhysicsConfig::default(), &fielders, &mut rng)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_perfect_drives_find_the_boundary() {
        let mut boundaries = 0;
        for seed in 0..200 {
            let mut resolver = ShotResolver::new(ShotConfig::default());
            let ball = ball_at(4.0);
            resolver.submit(ShotType::CoverDrive, 1.0, &ball).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = resolver.resolve(&ball, &PhysicsConfig::default(), &[], &mut rng);
            assert!(!out.is_catchable, "perfect timing never skies the ball");
            if out.boundary.is_some() {
                boundaries += 1;
            }
        }
        assert!(boundaries > 60, "boundaries={boundaries}");
    }

    #[test]
    fn test_mishit_heads_for_nearest_bearing_fielder() {
        let fielders = [Vector3::new(0.0, 0.0, 40.0), Vector3::new(-30.0, 0.0, 0.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let t = mishit_toward(-1.5, &fielders, &PhysicsConfig::default(), &mut rng);
        assert!((t.azimuth_rad + PI / 2.0).abs() < 0.2, "az={}", t.azimuth_rad);
    }

    #[test]
    fn test_no_input_on_stumps_is_a_miss() {
        let (ball, physics) = at_bat(Delivery::nominal(DeliveryType::Straight));
        let mut resolver = ShotResolver::new(ShotConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = resolver.resolve(&ball, &physics, &[], &mut rng);
        assert_eq!(
            out.is_missed,
            BallPrediction::will_hit_stumps(&ball, &physics),
            "unplayed ball is only let through when it is heading for the stumps"
        );
    }

    #[test]
    fn test_no_input_on_bouncer_is_blocked() {
        let (ball, physics) = at_bat(Delivery::nominal(DeliveryType::Bouncer));
        let mut resolver = ShotResolver::new(ShotConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = resolver.resolve(&ball, &physics, &[], &mut rng);
        assert_eq!(out.kind, ContactKind::Blocked);
        assert_eq!(out.runs_scored, 0);
    }
}
