//! Ground and ball geometry
//!
//! Coordinate frame (meters):
//! - origin at the base of the striker's middle stump
//! - `+z` runs down the pitch toward the bowler
//! - `+y` is up
//! - `+x` is the off side of a right-handed batter (camera right when
//!   looking down the pitch from behind the stumps)

// ============================================================
// Pitch
// ============================================================
pub mod pitch {
    /// Stump to stump (22 yards)
    pub const LENGTH_M: f32 = 20.12;

    /// Popping crease distance in front of each set of stumps
    pub const POPPING_CREASE_M: f32 = 1.22;

    /// Bowling crease at the bowler's end (z)
    pub const BOWLING_CREASE_Z: f32 = LENGTH_M - POPPING_CREASE_M;

    /// Midpoint of the pitch; the boundary is measured from here
    pub const CENTER_Z: f32 = LENGTH_M / 2.0;

    /// Plane (z) where the bat meets the ball
    pub const BAT_PLANE_Z: f32 = 1.4;

    /// Release height of a typical pace bowler
    pub const RELEASE_HEIGHT_M: f32 = 2.1;
}

// ============================================================
// Stumps
// ============================================================
pub mod stumps {
    /// Half the width of three stumps plus bails
    pub const HALF_WIDTH_M: f32 = 0.114;

    /// Height to the top of the bails
    pub const HEIGHT_M: f32 = 0.711;

    /// Bowler's end stumps (z)
    pub const BOWLER_END_Z: f32 = super::pitch::LENGTH_M;
}

// ============================================================
// Ball
// ============================================================
pub mod ball {
    /// Cricket ball radius (m)
    pub const RADIUS_M: f32 = 0.036;

    /// Gravity (m/s²)
    pub const GRAVITY: f32 = 9.81;
}

// ============================================================
// Field
// ============================================================
pub mod field {
    /// Boundary rope radius from the pitch center
    pub const BOUNDARY_RADIUS_M: f32 = 65.0;

    /// Fielders may not be placed closer than this to the striker
    pub const MIN_FIELDER_DISTANCE_M: f32 = 3.0;
}

use nalgebra::Vector3;

/// Horizontal distance between two points (ignores height)
#[inline]
pub fn ground_distance(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

/// Horizontal distance from the pitch center
#[inline]
pub fn distance_from_center(p: &Vector3<f32>) -> f32 {
    (p.x.powi(2) + (p.z - pitch::CENTER_Z).powi(2)).sqrt()
}

/// Point on the ground at azimuth `theta` (0 = straight down the ground,
/// `+π/2` = square on the off side) and `distance` from the striker.
#[inline]
pub fn polar_from_striker(theta: f32, distance: f32) -> Vector3<f32> {
    Vector3::new(distance * theta.sin(), 0.0, distance * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bowling_crease_position() {
        assert!((pitch::BOWLING_CREASE_Z - 18.9).abs() < 1e-4);
    }

    #[test]
    fn test_polar_straight_and_square() {
        let straight = polar_from_striker(0.0, 30.0);
        assert!(straight.x.abs() < 1e-4 && (straight.z - 30.0).abs() < 1e-4);

        let point = polar_from_striker(std::f32::consts::FRAC_PI_2, 25.0);
        assert!((point.x - 25.0).abs() < 1e-4 && point.z.abs() < 1e-3);
    }

    #[test]
    fn test_ground_distance_ignores_height() {
        let a = Vector3::new(0.0, 10.0, 0.0);
        let b = Vector3::new(3.0, 0.0, 4.0);
        assert!((ground_distance(&a, &b) - 5.0).abs() < 1e-5);
    }
}
