//! Whole matches through the live session, ticked the way a front end would

use std::cell::RefCell;
use std::rc::Rc;

use cricket_core::engine::timestep::HEADLESS_FRAME_DT;
use cricket_core::{
    AutoBatter, EngineConfig, LiveMatchSession, MatchEvent, MatchMode, MatchOptions, MatchPhase, Result,
};
use sha2::{Digest, Sha256};

const FRAME_LIMIT: usize = 2_000_000;

fn options(seed: u64, overs: u32) -> MatchOptions {
    MatchOptions { seed, overs: Some(overs), ..MatchOptions::default() }
}

/// Drive a match to the end, checking the scoring invariants every frame
fn run_to_end(session: &mut LiveMatchSession, batter: &mut AutoBatter) -> Vec<MatchEvent> {
    let mut events = Vec::new();
    for _ in 0..FRAME_LIMIT {
        if session.phase() == MatchPhase::MatchComplete {
            break;
        }
        batter.act(session);
        events.extend(session.tick(HEADLESS_FRAME_DT));
        for ctx in session.contexts() {
            assert!(ctx.invariants_hold(), "{ctx:?}");
        }
    }
    events
}

#[test]
fn free_play_innings_completes() {
    let mut session = LiveMatchSession::new(EngineConfig::default());
    session.start_match(MatchMode::FreePlay, options(21, 2)).unwrap();
    let mut batter = AutoBatter::new(21, 0.7, 0.5);
    let events = run_to_end(&mut session, &mut batter);

    assert_eq!(session.phase(), MatchPhase::MatchComplete);
    let score = session.context().score;
    assert!(score.legal_balls == 12 || score.wickets == 10, "{score}");
    let overs = events.iter().filter(|e| matches!(e, MatchEvent::OverComplete { .. })).count();
    assert_eq!(overs as u32, score.legal_balls / 6);
    assert!(matches!(events.last(), Some(MatchEvent::MatchComplete { .. })));
    assert_eq!(session.scorecard().current().map(|c| c.score), Some(score));
}

#[test]
fn target_chase_ends_when_target_reached_or_innings_over() {
    let mut session = LiveMatchSession::new(EngineConfig::arcade());
    let opts = MatchOptions { target: Some(12), ..options(8, 3) };
    session.start_match(MatchMode::TargetChase, opts).unwrap();
    let mut batter = AutoBatter::new(8, 0.9, 0.4);
    run_to_end(&mut session, &mut batter);

    let ctx = session.context();
    let result = session.result().cloned().unwrap();
    if result.chaser_won() {
        assert!(ctx.score.total() >= 12);
    } else {
        assert!(ctx.score.total() < 12);
        assert!(ctx.score.wickets == 10 || ctx.score.legal_balls == 18);
    }
}

#[test]
fn hot_seat_switches_sides_after_break() {
    let mut session = LiveMatchSession::new(EngineConfig::default());
    session.start_match(MatchMode::Multiplayer, options(3, 1)).unwrap();
    let mut batter = AutoBatter::new(3, 0.6, 0.5);

    let mut saw_break = false;
    for _ in 0..FRAME_LIMIT {
        if session.phase() == MatchPhase::InningsComplete {
            saw_break = true;
            assert_eq!(session.contexts().len(), 1);
        }
        if session.phase() == MatchPhase::MatchComplete {
            break;
        }
        batter.act(&mut session);
        session.tick(HEADLESS_FRAME_DT);
    }

    assert!(saw_break);
    let contexts = session.contexts();
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[1].target, Some(contexts[0].score.total().max(1)));
    assert_eq!(contexts[1].player, "Player 2");
    assert_eq!(session.scorecard().innings.len(), 2);
}

#[test]
fn every_listener_sees_every_event() {
    let mut session = LiveMatchSession::new(EngineConfig::default());
    let counts: Vec<Rc<RefCell<usize>>> = (0..3).map(|_| Rc::new(RefCell::new(0))).collect();
    for c in &counts {
        let c = Rc::clone(c);
        session.subscribe(Box::new(move |_: &MatchEvent| -> Result<()> {
            *c.borrow_mut() += 1;
            Ok(())
        }));
    }
    session.subscribe(Box::new(|_: &MatchEvent| -> Result<()> {
        Err(cricket_core::CoreError::Listener("offline".into()))
    }));

    session.start_match(MatchMode::FreePlay, options(4, 1)).unwrap();
    let mut batter = AutoBatter::new(4, 0.5, 0.5);
    run_to_end(&mut session, &mut batter);

    let seen = session.history().len();
    assert!(seen > 6);
    for c in &counts {
        assert_eq!(*c.borrow(), seen);
    }
}

#[test]
fn same_seed_same_inputs_same_snapshots() {
    fn digest(seed: u64) -> String {
        let mut session = LiveMatchSession::new(EngineConfig::default());
        session.start_match(MatchMode::FreePlay, options(seed, 1)).unwrap();
        let mut batter = AutoBatter::new(seed, 0.6, 0.5);
        let mut hasher = Sha256::new();
        for frame in 0..FRAME_LIMIT {
            if session.phase() == MatchPhase::MatchComplete {
                break;
            }
            batter.act(&mut session);
            session.tick(HEADLESS_FRAME_DT);
            if frame % 30 == 0 {
                hasher.update(serde_json::to_vec(&session.snapshot()).unwrap());
            }
        }
        hasher.update(serde_json::to_vec(&session.snapshot()).unwrap());
        format!("{:x}", hasher.finalize())
    }

    assert_eq!(digest(77), digest(77));
}

#[test]
fn restarting_mid_match_drops_old_tasks() {
    let mut session = LiveMatchSession::new(EngineConfig::default());
    session.start_match(MatchMode::FreePlay, options(1, 2)).unwrap();
    for _ in 0..600 {
        session.tick(HEADLESS_FRAME_DT);
    }
    let first = session.session_id();
    session.start_match(MatchMode::FreePlay, options(2, 2)).unwrap();
    assert_ne!(session.session_id(), first);
    assert_eq!(session.delivery_count(), 0);
    assert_eq!(session.context().score, cricket_core::Score::default());
    assert_eq!(session.scorecard().innings.len(), 1);
}
