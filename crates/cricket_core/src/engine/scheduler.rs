//! Scheduled transitions
//!
//! Anything that happens "a little later" (the next automatic delivery, the
//! run-out verdict when the throw lands, the innings break) is a task keyed
//! by match time. Tasks carry the session they were created in; once that
//! session is torn down they are dropped instead of fired.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one match session. A new id is issued by every `start_match`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledAction {
    /// Bowl the next ball if the automatic bowler is on
    AutoDelivery,
    /// Commit the result held back while the throw was in the air
    ApplyPendingResult,
    /// Hand over to the second hot-seat player
    BeginNextInnings,
    /// Walk the field back and clear the dead ball
    ResetField,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub session: SessionId,
    pub due_ms: u64,
    pub action: ScheduledAction,
}

#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: BTreeMap<(u64, u64), ScheduledTask>,
    seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, session: SessionId, due_ms: u64, action: ScheduledAction) {
        self.seq += 1;
        self.tasks.insert((due_ms, self.seq), ScheduledTask { session, due_ms, action });
        log::trace!("scheduled {action:?} at {due_ms}ms (session {session})");
    }

    /// Drop every pending task of one kind
    pub fn cancel(&mut self, action: ScheduledAction) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, t| t.action != action);
        before - self.tasks.len()
    }

    pub fn contains(&self, action: ScheduledAction) -> bool {
        self.tasks.values().any(|t| t.action == action)
    }

    /// Earliest task due at or before `now_ms` for the `current` session.
    /// Tasks left over from an older session are discarded on the way.
    pub fn pop_due(&mut self, now_ms: u64, current: SessionId) -> Option<ScheduledTask> {
        loop {
            let (&key, task) = self.tasks.iter().next()?;
            if task.due_ms > now_ms {
                return None;
            }
            let task = *task;
            self.tasks.remove(&key);
            if task.session == current {
                return Some(task);
            }
            log::debug!("dropped stale {:?} from session {}", task.action, task.session);
        }
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks.keys().next().map(|(due, _)| *due)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_in_time_then_insertion_order() {
        let s = SessionId(1);
        let mut q = TaskQueue::new();
        q.schedule(s, 500, ScheduledAction::ResetField);
        q.schedule(s, 200, ScheduledAction::AutoDelivery);
        q.schedule(s, 200, ScheduledAction::ApplyPendingResult);

        assert!(q.pop_due(100, s).is_none());
        assert_eq!(q.pop_due(300, s).unwrap().action, ScheduledAction::AutoDelivery);
        assert_eq!(q.pop_due(300, s).unwrap().action, ScheduledAction::ApplyPendingResult);
        assert!(q.pop_due(300, s).is_none());
        assert_eq!(q.next_due_ms(), Some(500));
    }

    #[test]
    fn test_stale_session_tasks_are_dropped() {
        let old = SessionId(1);
        let new = old.next();
        let mut q = TaskQueue::new();
        q.schedule(old, 10, ScheduledAction::BeginNextInnings);
        q.schedule(new, 20, ScheduledAction::AutoDelivery);

        let t = q.pop_due(100, new).unwrap();
        assert_eq!(t.session, new);
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancel_by_action() {
        let s = SessionId(3);
        let mut q = TaskQueue::new();
        q.schedule(s, 10, ScheduledAction::AutoDelivery);
        q.schedule(s, 20, ScheduledAction::AutoDelivery);
        q.schedule(s, 30, ScheduledAction::ResetField);
        assert_eq!(q.cancel(ScheduledAction::AutoDelivery), 2);
        assert!(!q.contains(ScheduledAction::AutoDelivery));
        assert_eq!(q.len(), 1);
    }
}
