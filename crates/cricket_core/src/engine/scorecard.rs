//! Scorecard
//!
//! A read-mirror of the match built only from `MatchEvent`s: batting
//! figures, extras, runs per over and the fall of wickets. Nothing here is
//! recomputed from the rules; if an event did not say it, the card does not
//! know it. Batters appear on the card once an event names them.

use serde::{Deserialize, Serialize};

use super::events::{MatchEvent, MatchListener};
use super::match_state::{InningsEnd, MatchResult};
use crate::error::Result;
use crate::models::{Batsman, DismissalType, Extras, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverSummary {
    /// 1-based
    pub over: u32,
    pub runs: u32,
    pub wickets: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub wicket: u8,
    /// Team total when the wicket fell
    pub total: u32,
    pub batsman: String,
    pub dismissal: DismissalType,
    /// "over.ball"
    pub overs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsCard {
    pub innings: u8,
    pub team: String,
    pub player: String,
    pub target: Option<u32>,
    pub overs_limit: u32,
    /// In batting order
    pub batting: Vec<Batsman>,
    pub score: Score,
    pub overs: Vec<OverSummary>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub ended: Option<InningsEnd>,
}

impl InningsCard {
    fn new(innings: u8, team: &str, player: &str, target: Option<u32>, overs_limit: u32) -> Self {
        Self {
            innings,
            team: team.to_string(),
            player: player.to_string(),
            target,
            overs_limit,
            batting: Vec::new(),
            score: Score::default(),
            overs: Vec::new(),
            fall_of_wickets: Vec::new(),
            ended: None,
        }
    }

    fn upsert(&mut self, batter: &Batsman) {
        match self.batting.iter_mut().find(|b| b.batting_position == batter.batting_position) {
            Some(existing) => *existing = batter.clone(),
            None => {
                self.batting.push(batter.clone());
                self.batting.sort_by_key(|b| b.batting_position);
            }
        }
    }

    pub fn extras(&self) -> &Extras {
        &self.score.extras
    }

    pub fn run_rate(&self) -> f32 {
        self.score.run_rate()
    }

    pub fn required_rate(&self) -> Option<f32> {
        if self.ended.is_some() {
            return None;
        }
        self.target.and_then(|t| self.score.required_rate(t, self.overs_limit))
    }

    pub fn batter(&self, name: &str) -> Option<&Batsman> {
        self.batting.iter().find(|b| b.name == name)
    }

    /// Most expensive over so far
    pub fn most_expensive_over(&self) -> Option<&OverSummary> {
        self.overs.iter().max_by_key(|o| (o.runs, std::cmp::Reverse(o.over)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorecardTracker {
    pub innings: Vec<InningsCard>,
    pub result: Option<MatchResult>,
}

impl ScorecardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.innings.clear();
        self.result = None;
    }

    pub fn current(&self) -> Option<&InningsCard> {
        self.innings.last()
    }

    pub fn innings_card(&self, innings: u8) -> Option<&InningsCard> {
        self.innings.iter().find(|c| c.innings == innings)
    }

    fn card_mut(&mut self, innings: u8) -> Option<&mut InningsCard> {
        let card = self.innings.iter_mut().rev().find(|c| c.innings == innings);
        if card.is_none() {
            log::debug!("scorecard: event for innings {innings} before it started, ignored");
        }
        card
    }

    pub fn apply(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::InningsStarted { innings, team, player, target, overs_limit } => {
                self.innings.push(InningsCard::new(*innings, team, player, *target, *overs_limit));
            }
            MatchEvent::ScoreApplied { innings, score, striker, .. } => {
                if let Some(card) = self.card_mut(*innings) {
                    card.score = *score;
                    card.upsert(striker);
                }
            }
            MatchEvent::WicketApplied { innings, score, batsman, dismissal, incoming, .. } => {
                if let Some(card) = self.card_mut(*innings) {
                    card.score = *score;
                    card.upsert(batsman);
                    if let Some(new) = incoming {
                        card.upsert(new);
                    }
                    card.fall_of_wickets.push(FallOfWicket {
                        wicket: score.wickets,
                        total: score.total(),
                        batsman: batsman.name.clone(),
                        dismissal: *dismissal,
                        overs: score.overs_display(),
                    });
                }
            }
            MatchEvent::OverComplete { innings, score, over, runs_in_over, wickets_in_over } => {
                if let Some(card) = self.card_mut(*innings) {
                    card.score = *score;
                    card.overs.push(OverSummary { over: *over, runs: *runs_in_over, wickets: *wickets_in_over });
                }
            }
            MatchEvent::InningsComplete { innings, score, reason } => {
                if let Some(card) = self.card_mut(*innings) {
                    card.score = *score;
                    card.ended = Some(*reason);
                }
            }
            MatchEvent::MatchComplete { result } => {
                self.result = Some(result.clone());
            }
        }
    }

    /// Plain-text card, one innings after another
    pub fn render(&self) -> String {
        let mut out = String::new();
        for card in &self.innings {
            out.push_str(&format!("Innings {}: {} ({})\n", card.innings, card.team, card.player));
            for b in &card.batting {
                let how = match (b.is_out, b.dismissal_type) {
                    (true, Some(d)) => d.as_str().to_string(),
                    _ => "not out".to_string(),
                };
                out.push_str(&format!(
                    "  {:<20} {:<8} {:>4} ({} b, {}x4, {}x6)\n",
                    b.name, how, b.runs, b.balls_faced, b.fours, b.sixes
                ));
            }
            let e = card.extras();
            out.push_str(&format!(
                "  Extras {} (b {}, lb {}, w {}, nb {})\n",
                e.total(),
                e.byes,
                e.leg_byes,
                e.wides,
                e.no_balls
            ));
            out.push_str(&format!("  Total  {}  RR {:.2}\n", card.score, card.run_rate()));
            if !card.fall_of_wickets.is_empty() {
                let fow: Vec<String> = card
                    .fall_of_wickets
                    .iter()
                    .map(|f| format!("{}-{} ({}, {} ov)", f.wicket, f.total, f.batsman, f.overs))
                    .collect();
                out.push_str(&format!("  FoW: {}\n", fow.join(", ")));
            }
        }
        if let Some(result) = &self.result {
            out.push_str(&result.summary());
            out.push('\n');
        }
        out
    }
}

impl MatchListener for ScorecardTracker {
    fn on_event(&mut self, event: &MatchEvent) -> Result<()> {
        self.apply(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::RulesConfig;
    use crate::engine::fielding::Runner;
    use crate::engine::match_context::{MatchContext, MatchMode};
    use crate::engine::match_state::{DeliveryResult, ExtraKind, MatchStateMachine, Wicket};
    use crate::engine::scheduler::SessionId;
    use crate::engine::shot::BoundaryKind;
    use crate::models::End;

    fn drive(results: &[DeliveryResult], overs: u32, target: Option<u32>) -> (ScorecardTracker, MatchContext) {
        let mode = if target.is_some() { MatchMode::TargetChase } else { MatchMode::FreePlay };
        let innings = if target.is_some() { 2 } else { 1 };
        let mut ctx = MatchContext::new(mode, SessionId(1), "P1", "Home", &[], innings, overs, target);
        let mut sm = MatchStateMachine::new(RulesConfig::default());
        let mut card = ScorecardTracker::new();
        card.apply(&sm.begin_innings(&ctx).unwrap());
        for r in results {
            if sm.begin_delivery(&ctx).is_err() {
                break;
            }
            sm.begin_resolving().unwrap();
            for e in sm.apply_result(&mut ctx, r).unwrap() {
                card.apply(&e);
            }
        }
        (card, ctx)
    }

    #[test]
    fn test_card_mirrors_context() {
        let results = [
            DeliveryResult::boundary(BoundaryKind::Four),
            DeliveryResult::runs(1),
            DeliveryResult::extra(ExtraKind::Wide, 0),
            DeliveryResult::extra(ExtraKind::Bye, 2),
            DeliveryResult::wicket(Wicket::of_striker(DismissalType::Bowled)),
            DeliveryResult::boundary(BoundaryKind::Six),
            DeliveryResult::runs(2),
        ];
        let (card, ctx) = drive(&results, 5, None);
        let inn = card.current().unwrap();
        assert_eq!(inn.score, ctx.score);
        assert_eq!(inn.extras().wides, 1);
        assert_eq!(inn.extras().byes, 2);
        assert_eq!(inn.overs.len(), 1);
        assert_eq!(inn.overs[0].runs, 4 + 1 + 1 + 2 + 6 + 2);
        assert_eq!(inn.overs[0].wickets, 1);
        for b in &inn.batting {
            let live = &ctx.batsmen[(b.batting_position - 1) as usize];
            assert_eq!(b, live);
        }
        let mirrored: u32 = inn.batting.iter().map(|b| b.runs).sum();
        assert_eq!(mirrored + inn.extras().byes + inn.extras().leg_byes, inn.score.runs);
    }

    #[test]
    fn test_fall_of_wickets_records_over_and_ball() {
        let mut results = vec![DeliveryResult::runs(2); 7];
        results.push(DeliveryResult {
            bat_runs: 0,
            wicket: Some(Wicket { dismissal: DismissalType::RunOut, batter: Runner::NonStriker, end: End::Bowler }),
            ..DeliveryResult::default()
        });
        let (card, _) = drive(&results, 5, None);
        let fow = &card.current().unwrap().fall_of_wickets;
        assert_eq!(fow.len(), 1);
        assert_eq!(fow[0].wicket, 1);
        assert_eq!(fow[0].total, 14);
        assert_eq!(fow[0].overs, "1.2");
        assert_eq!(fow[0].dismissal, DismissalType::RunOut);
    }

    #[test]
    fn test_chase_result_and_required_rate() {
        let (card, _) = drive(&[DeliveryResult::runs(2)], 2, Some(20));
        let inn = card.current().unwrap();
        let rr = inn.required_rate().unwrap();
        assert!((rr - 18.0 * 6.0 / 11.0).abs() < 1e-4);
        assert!(card.result.is_none());

        let (card, _) = drive(&[DeliveryResult::boundary(BoundaryKind::Six); 4], 2, Some(20));
        assert!(card.result.as_ref().is_some_and(|r| r.chaser_won()));
        assert_eq!(card.current().unwrap().ended, Some(InningsEnd::TargetReached));
        assert!(card.current().unwrap().required_rate().is_none());
        assert!(card.render().contains("won"));
    }

    #[test]
    fn test_events_before_innings_are_ignored() {
        let mut card = ScorecardTracker::new();
        card.apply(&MatchEvent::OverComplete {
            innings: 1,
            score: Score::default(),
            over: 1,
            runs_in_over: 3,
            wickets_in_over: 0,
        });
        assert!(card.innings.is_empty());
    }
}
