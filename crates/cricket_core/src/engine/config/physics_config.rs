//! Ball physics tuning

use serde::{Deserialize, Serialize};

use crate::error::clamp_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity (m/s²)
    pub gravity: f32,
    /// Quadratic drag coefficient (1/m): a = -k·|v|·v
    pub drag_k: f32,
    /// Vertical restitution on the pitch
    pub pitch_restitution: f32,
    /// Vertical restitution on the outfield
    pub outfield_restitution: f32,
    /// Horizontal speed retained through a bounce
    pub bounce_friction: f32,
    /// Ground roll damping (1/s); per-step multiplier is exp(-k·dt)
    pub roll_k_1ps: f32,
    /// Below this speed a rolling ball is stopped (m/s)
    pub stop_speed_mps: f32,
    /// Below this vertical speed a bounce turns into a roll (m/s)
    pub min_bounce_vy_mps: f32,
    /// Standard deviation of seam movement off the pitch (m/s sideways)
    pub seam_sigma_mps: f32,
    /// Hard bound on seam movement (m/s sideways)
    pub max_seam_mps: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            drag_k: 0.006,
            pitch_restitution: 0.5,
            outfield_restitution: 0.35,
            bounce_friction: 0.85,
            roll_k_1ps: 0.35,
            stop_speed_mps: 0.3,
            min_bounce_vy_mps: 1.0,
            seam_sigma_mps: 0.35,
            max_seam_mps: 0.9,
        }
    }
}

impl PhysicsConfig {
    /// Per-substep velocity multiplier for a rolling ball
    #[inline]
    pub fn roll_multiplier(&self, dt: f32) -> f32 {
        (-self.roll_k_1ps * dt).exp()
    }

    pub fn validate(&mut self) {
        self.gravity = clamp_config("physics.gravity", self.gravity, 1.0, 30.0);
        self.drag_k = clamp_config("physics.drag_k", self.drag_k, 0.0, 0.05);
        self.pitch_restitution =
            clamp_config("physics.pitch_restitution", self.pitch_restitution, 0.0, 0.95);
        self.outfield_restitution =
            clamp_config("physics.outfield_restitution", self.outfield_restitution, 0.0, 0.95);
        self.bounce_friction =
            clamp_config("physics.bounce_friction", self.bounce_friction, 0.1, 1.0);
        self.roll_k_1ps = clamp_config("physics.roll_k_1ps", self.roll_k_1ps, 0.01, 5.0);
        self.stop_speed_mps = clamp_config("physics.stop_speed_mps", self.stop_speed_mps, 0.01, 2.0);
        self.min_bounce_vy_mps =
            clamp_config("physics.min_bounce_vy_mps", self.min_bounce_vy_mps, 0.1, 5.0);
        self.max_seam_mps = clamp_config("physics.max_seam_mps", self.max_seam_mps, 0.0, 3.0);
        self.seam_sigma_mps =
            clamp_config("physics.seam_sigma_mps", self.seam_sigma_mps, 0.0, self.max_seam_mps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_multiplier_decays() {
        let cfg = PhysicsConfig::default();
        let m = cfg.roll_multiplier(1.0);
        assert!(m < 1.0 && m > 0.6, "m={m}");
    }

    #[test]
    fn test_validate_clamps_restitution() {
        let mut cfg = PhysicsConfig { pitch_restitution: 1.4, ..PhysicsConfig::default() };
        cfg.validate();
        assert!((cfg.pitch_restitution - 0.95).abs() < 1e-6);
    }
}
