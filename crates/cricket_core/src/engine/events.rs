//! Match events and their delivery
//!
//! The state machine emits a `MatchEvent` for every scoring change; the
//! `EventBus` hands each one to every subscriber. A subscriber that returns
//! an error or panics is logged and skipped, the rest are still notified.

use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::match_state::{ExtraKind, InningsEnd, MatchResult};
use super::shot::BoundaryKind;
use crate::error::{CoreError, Result};
use crate::models::{Batsman, DismissalType, End, Score};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    InningsStarted {
        innings: u8,
        team: String,
        player: String,
        target: Option<u32>,
        overs_limit: u32,
    },
    ScoreApplied {
        innings: u8,
        score: Score,
        /// Batter who faced the ball, with the ball counted
        striker: Batsman,
        /// Team runs added by the ball, extras included
        runs: u32,
        extra: Option<ExtraKind>,
        boundary: Option<BoundaryKind>,
        legal: bool,
    },
    WicketApplied {
        innings: u8,
        score: Score,
        batsman: Batsman,
        dismissal: DismissalType,
        end: End,
        incoming: Option<Batsman>,
    },
    OverComplete {
        innings: u8,
        score: Score,
        /// 1-based number of the over just finished
        over: u32,
        runs_in_over: u32,
        wickets_in_over: u8,
    },
    InningsComplete {
        innings: u8,
        score: Score,
        reason: InningsEnd,
    },
    MatchComplete {
        result: MatchResult,
    },
}

impl MatchEvent {
    /// Name the UI subscribes by
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchEvent::InningsStarted { .. } => "innings-started",
            MatchEvent::ScoreApplied { .. } => "score-changed",
            MatchEvent::WicketApplied { .. } => "wicket-fallen",
            MatchEvent::OverComplete { .. } => "over-complete",
            MatchEvent::InningsComplete { .. } => "innings-complete",
            MatchEvent::MatchComplete { .. } => "match-complete",
        }
    }

    pub fn score(&self) -> Option<&Score> {
        match self {
            MatchEvent::ScoreApplied { score, .. }
            | MatchEvent::WicketApplied { score, .. }
            | MatchEvent::OverComplete { score, .. }
            | MatchEvent::InningsComplete { score, .. } => Some(score),
            MatchEvent::InningsStarted { .. } | MatchEvent::MatchComplete { .. } => None,
        }
    }
}

/// Anything that wants to hear about the match
pub trait MatchListener {
    fn on_event(&mut self, event: &MatchEvent) -> Result<()>;
}

impl<F> MatchListener for F
where
    F: FnMut(&MatchEvent) -> Result<()>,
{
    fn on_event(&mut self, event: &MatchEvent) -> Result<()> {
        self(event)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn MatchListener>)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listeners.len()).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn MatchListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver to every listener. Returns the failures, already logged.
    pub fn publish(&mut self, event: &MatchEvent) -> Vec<CoreError> {
        let mut failures = Vec::new();
        for (id, listener) in &mut self.listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));
            let err = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(panic) => {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "listener panicked".to_string());
                    CoreError::Listener(msg)
                }
            };
            log::warn!("listener {} failed on {}: {err}", id.0, event.as_str());
            failures.push(err);
        }
        failures
    }
}
