//! Deliveries and their nominal shapes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Straight,
    Bouncer,
    Yorker,
    /// Slants across toward the leg side (camera left)
    AngledLeft,
    /// Slants across toward the off side (camera right)
    AngledRight,
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 5] = [
        DeliveryType::Straight,
        DeliveryType::Bouncer,
        DeliveryType::Yorker,
        DeliveryType::AngledLeft,
        DeliveryType::AngledRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Straight => "straight",
            DeliveryType::Bouncer => "bouncer",
            DeliveryType::Yorker => "yorker",
            DeliveryType::AngledLeft => "angled_left",
            DeliveryType::AngledRight => "angled_right",
        }
    }

    pub fn shape(&self) -> DeliveryShape {
        match self {
            DeliveryType::Straight => DeliveryShape {
                release_x: 0.3,
                line: (-0.05, 0.1),
                length: (4.5, 7.5),
                speed: (33.0, 38.0),
            },
            DeliveryType::Bouncer => DeliveryShape {
                release_x: 0.3,
                line: (-0.1, 0.1),
                length: (11.0, 12.5),
                speed: (36.0, 40.0),
            },
            DeliveryType::Yorker => DeliveryShape {
                release_x: 0.3,
                line: (-0.05, 0.05),
                length: (0.4, 1.2),
                speed: (35.0, 39.0),
            },
            DeliveryType::AngledLeft => DeliveryShape {
                release_x: 1.0,
                line: (-0.35, -0.15),
                length: (4.0, 7.0),
                speed: (32.0, 37.0),
            },
            DeliveryType::AngledRight => DeliveryShape {
                release_x: -1.0,
                line: (0.15, 0.4),
                length: (4.0, 7.0),
                speed: (32.0, 37.0),
            },
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryType::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown delivery type: {s}"))
    }
}

/// Nominal envelope of a delivery type: ranges the bowler aims inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeliveryShape {
    /// Lateral release point (m)
    pub release_x: f32,
    /// Line at the striker's stumps (m, +off)
    pub line: (f32, f32),
    /// Pitching distance from the striker's stumps (m)
    pub length: (f32, f32),
    /// Release speed (m/s)
    pub speed: (f32, f32),
}

impl DeliveryShape {
    pub fn midpoint(&self) -> (f32, f32, f32) {
        (
            (self.line.0 + self.line.1) / 2.0,
            (self.length.0 + self.length.1) / 2.0,
            (self.speed.0 + self.speed.1) / 2.0,
        )
    }
}

/// One ball, as aimed by the bowler
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub delivery_type: DeliveryType,
    /// Lateral offset from middle stump where the ball arrives at the stumps (m, +off)
    pub target_line: f32,
    /// Distance from the striker's stumps where the ball pitches (m)
    pub target_length: f32,
    /// Release speed (m/s)
    pub speed: f32,
    /// Front foot over the popping crease at release
    #[serde(default)]
    pub overstep: bool,
}

impl Delivery {
    /// The bowler's stock version of a delivery type
    pub fn nominal(delivery_type: DeliveryType) -> Self {
        let (line, length, speed) = delivery_type.shape().midpoint();
        Self { delivery_type, target_line: line, target_length: length, speed, overstep: false }
    }

    pub fn release_x(&self) -> f32 {
        self.delivery_type.shape().release_x
    }

    /// Speed in km/h for display
    pub fn speed_kmh(&self) -> f32 {
        self.speed * 3.6
    }
}
