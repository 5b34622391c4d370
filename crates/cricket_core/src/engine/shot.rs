//! Shot catalogue
//!
//! Every shot a batter can play, with its timing window, the arc of the
//! field it goes to and the outcome weights per timing bucket.
//!
//! Azimuth convention matches `physics_constants::polar_from_striker`:
//! 0 is straight back past the bowler, +π/2 square on the off side,
//! -π/2 square on the leg side, ±π fine behind the keeper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ball::ExitTrajectory;

// ============================================================
// Shot types
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    ForwardDefence,
    BackfootDefence,
    LegGlance,
    Flick,
    StraightDrive,
    CoverDrive,
    OnDrive,
    SquareCut,
    LateCut,
    UpperCut,
    Pull,
    Hook,
    LoftedDrive,
    InsideOut,
    Sweep,
    ReverseSweep,
    Scoop,
    Slog,
    Helicopter,
    Charge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotCategory {
    Defensive,
    Drive,
    Cut,
    Pull,
    Lofted,
    Sweep,
    Power,
}

/// Where the ball pitched relative to the striker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchLength {
    Full,
    Good,
    Short,
}

impl PitchLength {
    /// Full tosses (never pitched) count as full
    pub fn classify(pitched_at_z: Option<f32>) -> Self {
        match pitched_at_z {
            None => PitchLength::Full,
            Some(z) if z < 4.0 => PitchLength::Full,
            Some(z) if z <= 8.0 => PitchLength::Good,
            Some(_) => PitchLength::Short,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotProfile {
    pub category: ShotCategory,
    /// Exit azimuth range (rad)
    pub azimuth: (f32, f32),
    /// Ball distance-to-bat at which the ideal shot is started (m)
    pub ideal_distance_m: f32,
    /// Half-width of the timing window around the ideal distance (m)
    pub half_window_m: f32,
    /// Lengths the shot is built for; empty means any
    pub prefers: &'static [PitchLength],
    /// Batter is out of the crease when playing it
    pub leaves_crease: bool,
}

impl ShotProfile {
    pub fn suits(&self, length: PitchLength) -> bool {
        self.prefers.is_empty() || self.prefers.contains(&length)
    }

    pub fn azimuth_center(&self) -> f32 {
        (self.azimuth.0 + self.azimuth.1) / 2.0
    }
}

const FULL: &[PitchLength] = &[PitchLength::Full];
const UP: &[PitchLength] = &[PitchLength::Full, PitchLength::Good];
const BACK: &[PitchLength] = &[PitchLength::Good, PitchLength::Short];
const SHORT: &[PitchLength] = &[PitchLength::Short];
const ANY: &[PitchLength] = &[];

impl ShotType {
    pub const ALL: [ShotType; 20] = [
        ShotType::ForwardDefence,
        ShotType::BackfootDefence,
        ShotType::LegGlance,
        ShotType::Flick,
        ShotType::StraightDrive,
        ShotType::CoverDrive,
        ShotType::OnDrive,
        ShotType::SquareCut,
        ShotType::LateCut,
        ShotType::UpperCut,
        ShotType::Pull,
        ShotType::Hook,
        ShotType::LoftedDrive,
        ShotType::InsideOut,
        ShotType::Sweep,
        ShotType::ReverseSweep,
        ShotType::Scoop,
        ShotType::Slog,
        ShotType::Helicopter,
        ShotType::Charge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotType::ForwardDefence => "forward_defence",
            ShotType::BackfootDefence => "backfoot_defence",
            ShotType::LegGlance => "leg_glance",
            ShotType::Flick => "flick",
            ShotType::StraightDrive => "straight_drive",
            ShotType::CoverDrive => "cover_drive",
            ShotType::OnDrive => "on_drive",
            ShotType::SquareCut => "square_cut",
            ShotType::LateCut => "late_cut",
            ShotType::UpperCut => "upper_cut",
            ShotType::Pull => "pull",
            ShotType::Hook => "hook",
            ShotType::LoftedDrive => "lofted_drive",
            ShotType::InsideOut => "inside_out",
            ShotType::Sweep => "sweep",
            ShotType::ReverseSweep => "reverse_sweep",
            ShotType::Scoop => "scoop",
            ShotType::Slog => "slog",
            ShotType::Helicopter => "helicopter",
            ShotType::Charge => "charge",
        }
    }

    pub fn profile(&self) -> ShotProfile {
        use ShotCategory::*;
        let p = |category: ShotCategory,
                 azimuth: (f32, f32),
                 ideal_distance_m: f32,
                 half_window_m: f32,
                 prefers: &'static [PitchLength],
                 leaves_crease: bool| {
            ShotProfile { category, azimuth, ideal_distance_m, half_window_m, prefers, leaves_crease }
        };
        match self {
            ShotType::ForwardDefence => p(Defensive, (-0.3, 0.3), 3.0, 3.0, UP, false),
            ShotType::BackfootDefence => p(Defensive, (-0.4, 0.4), 2.5, 3.0, BACK, false),
            ShotType::LegGlance => p(Drive, (-2.8, -2.2), 2.5, 2.0, ANY, false),
            ShotType::Flick => p(Drive, (-1.4, -0.9), 3.5, 2.0, UP, false),
            ShotType::StraightDrive => p(Drive, (-0.15, 0.15), 4.0, 2.2, UP, false),
            ShotType::CoverDrive => p(Drive, (0.6, 1.1), 4.0, 2.2, UP, false),
            ShotType::OnDrive => p(Drive, (-0.6, -0.25), 4.0, 2.2, UP, false),
            ShotType::SquareCut => p(Cut, (1.3, 1.8), 3.0, 1.8, BACK, false),
            ShotType::LateCut => p(Cut, (2.2, 2.7), 2.0, 1.6, BACK, false),
            ShotType::UpperCut => p(Cut, (2.0, 2.6), 3.0, 1.6, SHORT, false),
            ShotType::Pull => p(Pull, (-1.8, -1.2), 4.5, 2.0, SHORT, false),
            ShotType::Hook => p(Pull, (-2.3, -1.7), 4.5, 1.8, SHORT, false),
            ShotType::LoftedDrive => p(Lofted, (-0.3, 0.3), 5.0, 1.8, UP, false),
            ShotType::InsideOut => p(Lofted, (0.5, 1.0), 5.0, 1.6, UP, true),
            ShotType::Sweep => p(Sweep, (-1.8, -1.3), 4.0, 2.0, FULL, false),
            ShotType::ReverseSweep => p(Sweep, (1.4, 1.9), 4.0, 1.8, FULL, false),
            ShotType::Scoop => p(Sweep, (-3.1, -2.8), 3.0, 1.5, FULL, false),
            ShotType::Slog => p(Power, (-1.0, -0.4), 5.0, 1.5, ANY, false),
            ShotType::Helicopter => p(Power, (-0.5, 0.2), 4.0, 1.5, FULL, false),
            ShotType::Charge => p(Power, (-0.4, 0.4), 5.5, 1.5, ANY, true),
        }
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShotType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown shot type: {s}"))
    }
}

// ============================================================
// Timing
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingBucket {
    Perfect,
    Good,
    Poor,
    Edge,
}

impl TimingBucket {
    pub fn index(&self) -> usize {
        match self {
            TimingBucket::Perfect => 0,
            TimingBucket::Good => 1,
            TimingBucket::Poor => 2,
            TimingBucket::Edge => 3,
        }
    }
}

// ============================================================
// Outcome tables
// ============================================================

/// Discrete outcome drawn from a weight table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotOutcome {
    Dot,
    One,
    Two,
    Three,
    Four,
    Six,
    CatchableMishit,
    Miss,
}

impl ShotOutcome {
    /// Column order of every weight table
    pub const COLUMNS: [ShotOutcome; 8] = [
        ShotOutcome::Dot,
        ShotOutcome::One,
        ShotOutcome::Two,
        ShotOutcome::Three,
        ShotOutcome::Four,
        ShotOutcome::Six,
        ShotOutcome::CatchableMishit,
        ShotOutcome::Miss,
    ];

    pub fn running_runs(&self) -> u8 {
        match self {
            ShotOutcome::One => 1,
            ShotOutcome::Two => 2,
            ShotOutcome::Three => 3,
            _ => 0,
        }
    }
}

pub type OutcomeWeights = [u32; 8];

/// Weight tables, one row per timing bucket (Perfect, Good, Poor, Edge).
/// Columns: dot, 1, 2, 3, four, six, catchable mishit, miss.
pub fn outcome_weights(category: ShotCategory, bucket: TimingBucket) -> OutcomeWeights {
    const DEFENSIVE: [OutcomeWeights; 4] = [
        [70, 25, 5, 0, 0, 0, 0, 0],
        [78, 18, 2, 0, 0, 0, 0, 2],
        [80, 8, 0, 0, 0, 0, 5, 7],
        [60, 5, 0, 0, 0, 0, 15, 20],
    ];
    const DRIVE: [OutcomeWeights; 4] = [
        [8, 20, 15, 5, 45, 5, 0, 2],
        [18, 28, 18, 5, 20, 0, 6, 5],
        [30, 25, 10, 0, 5, 0, 18, 12],
        [25, 10, 0, 0, 0, 0, 35, 30],
    ];
    const CUT: [OutcomeWeights; 4] = [
        [8, 15, 15, 5, 50, 5, 0, 2],
        [18, 25, 18, 5, 22, 0, 7, 5],
        [30, 22, 8, 0, 5, 0, 20, 15],
        [25, 8, 0, 0, 0, 0, 35, 32],
    ];
    const PULL: [OutcomeWeights; 4] = [
        [5, 15, 10, 5, 38, 25, 0, 2],
        [12, 20, 15, 5, 25, 10, 8, 5],
        [22, 18, 10, 0, 5, 5, 25, 15],
        [20, 8, 0, 0, 0, 0, 40, 32],
    ];
    const LOFTED: [OutcomeWeights; 4] = [
        [0, 8, 10, 5, 25, 50, 0, 2],
        [5, 12, 10, 5, 25, 25, 13, 5],
        [10, 12, 5, 0, 10, 5, 43, 15],
        [10, 5, 0, 0, 0, 0, 55, 30],
    ];
    const SWEEP: [OutcomeWeights; 4] = [
        [8, 25, 20, 5, 35, 5, 0, 2],
        [15, 28, 15, 5, 20, 0, 10, 7],
        [25, 22, 5, 0, 5, 0, 25, 18],
        [25, 8, 0, 0, 0, 0, 35, 32],
    ];
    const POWER: [OutcomeWeights; 4] = [
        [0, 5, 5, 5, 20, 60, 0, 5],
        [3, 8, 5, 5, 22, 30, 15, 12],
        [5, 8, 5, 0, 8, 5, 44, 25],
        [5, 0, 0, 0, 0, 0, 50, 45],
    ];

    let table = match category {
        ShotCategory::Defensive => &DEFENSIVE,
        ShotCategory::Drive => &DRIVE,
        ShotCategory::Cut => &CUT,
        ShotCategory::Pull => &PULL,
        ShotCategory::Lofted => &LOFTED,
        ShotCategory::Sweep => &SWEEP,
        ShotCategory::Power => &POWER,
    };
    table[bucket.index()]
}

// ============================================================
// Attempt / outcome
// ============================================================

/// A shot as the batter played it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotAttempt {
    pub shot_type: ShotType,
    /// Ball distance-to-bat at input minus the shot's ideal distance (m, +early)
    pub timing_offset: f32,
    /// 0..=1
    pub power: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Four,
    Six,
}

impl BoundaryKind {
    pub fn runs(&self) -> u8 {
        match self {
            BoundaryKind::Four => 4,
            BoundaryKind::Six => 6,
        }
    }
}

/// How bat (or pad) met ball
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Struck,
    /// No shot offered, ball smothered by the bat
    Blocked,
    /// No shot offered, ball struck the pads
    Padded,
    /// Bat and ball never met
    Missed,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactOutcome {
    pub kind: ContactKind,
    pub shot: Option<ShotType>,
    pub timing: Option<TimingBucket>,
    /// Runs the stroke is worth if the batters complete them
    pub runs_scored: u8,
    pub boundary: Option<BoundaryKind>,
    /// In the air toward a fielder
    pub is_catchable: bool,
    /// Set once a fielder holds it
    pub is_caught: bool,
    pub is_missed: bool,
    pub exit_trajectory: Option<ExitTrajectory>,
}

impl ContactOutcome {
    pub fn missed(shot: Option<ShotType>, timing: Option<TimingBucket>) -> Self {
        Self {
            kind: ContactKind::Missed,
            shot,
            timing,
            runs_scored: 0,
            boundary: None,
            is_catchable: false,
            is_caught: false,
            is_missed: true,
            exit_trajectory: None,
        }
    }

    pub fn leaves_crease(&self) -> bool {
        self.shot.map(|s| s.profile().leaves_crease).unwrap_or(false)
    }
}
