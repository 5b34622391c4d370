//! Innings score
//!
//! `runs` is everything credited off the bat plus byes and leg-byes, so it
//! always equals the batters' runs plus those two extras. Wides and no-balls
//! go to the team total only; `total()` is what targets are measured in.

use serde::{Deserialize, Serialize};

pub const BALLS_PER_OVER: u32 = 6;
pub const MAX_WICKETS: u8 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub byes: u32,
    pub leg_byes: u32,
    pub wides: u32,
    pub no_balls: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.byes + self.leg_byes + self.wides + self.no_balls
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub runs: u32,
    pub wickets: u8,
    pub legal_balls: u32,
    pub extras: Extras,
}

impl Score {
    /// Team total including wides and no-balls
    pub fn total(&self) -> u32 {
        self.runs + self.extras.wides + self.extras.no_balls
    }

    pub fn completed_overs(&self) -> u32 {
        self.legal_balls / BALLS_PER_OVER
    }

    pub fn balls_this_over(&self) -> u32 {
        self.legal_balls % BALLS_PER_OVER
    }

    /// Cricket notation: "3.4" is three overs and four balls
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.completed_overs(), self.balls_this_over())
    }

    pub fn all_out(&self) -> bool {
        self.wickets >= MAX_WICKETS
    }

    /// Runs per six legal balls
    pub fn run_rate(&self) -> f32 {
        if self.legal_balls == 0 {
            return 0.0;
        }
        self.total() as f32 * BALLS_PER_OVER as f32 / self.legal_balls as f32
    }

    /// Rate needed to reach `target` in the balls left of `overs_limit`
    pub fn required_rate(&self, target: u32, overs_limit: u32) -> Option<f32> {
        let needed = target.saturating_sub(self.total());
        let balls_left = (overs_limit * BALLS_PER_OVER).saturating_sub(self.legal_balls);
        if needed == 0 || balls_left == 0 {
            return None;
        }
        Some(needed as f32 * BALLS_PER_OVER as f32 / balls_left as f32)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} ov)", self.total(), self.wickets, self.overs_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_adds_wides_and_no_balls() {
        let s = Score {
            runs: 40,
            wickets: 2,
            legal_balls: 20,
            extras: Extras { byes: 2, leg_byes: 1, wides: 3, no_balls: 1 },
        };
        assert_eq!(s.total(), 44);
        assert_eq!(s.extras.total(), 7);
        assert_eq!(s.overs_display(), "3.2");
        assert_eq!(s.to_string(), "44/2 (3.2 ov)");
    }

    #[test]
    fn test_rates() {
        let s = Score { runs: 30, legal_balls: 24, ..Score::default() };
        assert!((s.run_rate() - 7.5).abs() < 1e-6);
        let req = s.required_rate(61, 8).unwrap();
        assert!((req - 7.75).abs() < 1e-5);
        assert!(s.required_rate(20, 8).is_none());
        assert_eq!(Score::default().run_rate(), 0.0);
    }
}
