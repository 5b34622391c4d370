use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROSTER_SIZE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissalType {
    Bowled,
    Caught,
    RunOut,
    Stumped,
}

impl DismissalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DismissalType::Bowled => "bowled",
            DismissalType::Caught => "caught",
            DismissalType::RunOut => "run-out",
            DismissalType::Stumped => "stumped",
        }
    }

    /// Credited to the bowler (everything except a run-out)
    pub fn is_bowlers_wicket(&self) -> bool {
        !matches!(self, DismissalType::RunOut)
    }
}

impl fmt::Display for DismissalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either end of the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum End {
    /// Where the striker faces
    Striker,
    /// Where the bowler delivers from
    Bowler,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batsman {
    pub name: String,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
    pub dismissal_type: Option<DismissalType>,
    /// 1-based batting order
    pub batting_position: u8,
}

impl Batsman {
    pub fn new(name: impl Into<String>, batting_position: u8) -> Self {
        Self {
            name: name.into(),
            runs: 0,
            balls_faced: 0,
            fours: 0,
            sixes: 0,
            is_out: false,
            dismissal_type: None,
            batting_position,
        }
    }

    /// Eleven batters in order. Missing names become "<team> 7" and so on.
    pub fn roster(team: &str, names: &[String]) -> Vec<Batsman> {
        (0..ROSTER_SIZE)
            .map(|i| {
                let name = names
                    .get(i)
                    .filter(|n| !n.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("{team} {}", i + 1));
                Batsman::new(name, (i + 1) as u8)
            })
            .collect()
    }

    pub fn strike_rate(&self) -> f32 {
        if self.balls_faced == 0 {
            0.0
        } else {
            self.runs as f32 * 100.0 / self.balls_faced as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_fills_missing_names() {
        let names = vec!["Ada".to_string(), " ".to_string()];
        let roster = Batsman::roster("Home", &names);
        assert_eq!(roster.len(), ROSTER_SIZE);
        assert_eq!(roster[0].name, "Ada");
        assert_eq!(roster[1].name, "Home 2");
        assert_eq!(roster[10].batting_position, 11);
    }

    #[test]
    fn test_dismissal_labels() {
        assert_eq!(DismissalType::RunOut.to_string(), "run-out");
        assert!(!DismissalType::RunOut.is_bowlers_wicket());
        assert!(DismissalType::Stumped.is_bowlers_wicket());
        assert_eq!(serde_json::to_string(&DismissalType::RunOut).unwrap(), "\"run-out\"");
    }
}
