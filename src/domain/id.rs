//! Task identifiers
//!
//! Ids are plain unsigned integers. New ids come from an [`IdSource`] owned by
//! whoever creates tasks, so tests can swap the clock-seeded source for a
//! deterministic counter.
//!
//! Lookups are lenient: anything implementing [`TaskKey`] can be used to find
//! a task, and a key that does not parse is simply a miss.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parses an id from loose user input
    ///
    /// Accepts surrounding whitespace and integral float notation
    /// (`"42"`, `" 42 "`, `"42.0"`, `"4.2e1"`).
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Some(Self(n));
        }
        s.parse::<f64>().ok().and_then(Self::from_f64)
    }

    /// Converts an integral, non-negative float into an id
    ///
    /// `u64::MAX as f64` rounds up to 2^64, so the bound is exclusive.
    pub fn from_f64(value: f64) -> Option<Self> {
        const LIMIT: f64 = 18_446_744_073_709_551_616.0;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < LIMIT {
            Some(Self(value as u64))
        } else {
            None
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Anything that can be used to look up a task
///
/// Returns `None` when the key cannot be interpreted as an id.
pub trait TaskKey {
    fn task_id(&self) -> Option<TaskId>;
}

impl TaskKey for TaskId {
    fn task_id(&self) -> Option<TaskId> {
        Some(*self)
    }
}

impl TaskKey for u64 {
    fn task_id(&self) -> Option<TaskId> {
        Some(TaskId(*self))
    }
}

impl TaskKey for i64 {
    fn task_id(&self) -> Option<TaskId> {
        u64::try_from(*self).ok().map(TaskId)
    }
}

impl TaskKey for f64 {
    fn task_id(&self) -> Option<TaskId> {
        TaskId::from_f64(*self)
    }
}

impl TaskKey for str {
    fn task_id(&self) -> Option<TaskId> {
        TaskId::parse_lenient(self)
    }
}

impl TaskKey for String {
    fn task_id(&self) -> Option<TaskId> {
        TaskId::parse_lenient(self)
    }
}

impl<K: TaskKey + ?Sized> TaskKey for &K {
    fn task_id(&self) -> Option<TaskId> {
        (**self).task_id()
    }
}

/// Source of fresh task ids
pub trait IdSource {
    /// Returns an id that has not been handed out before, or `None` once
    /// the id space is used up
    fn next_id(&mut self) -> Option<TaskId>;

    /// Records an id that already exists (e.g. loaded from disk) so that
    /// future ids do not collide with it
    fn observe(&mut self, id: TaskId);
}

/// Clock-seeded, strictly increasing ids (microseconds since the epoch)
#[derive(Debug, Default)]
pub struct ClockIds {
    last: u64,
}

impl ClockIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for ClockIds {
    fn next_id(&mut self) -> Option<TaskId> {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        self.last = now.max(self.last.checked_add(1)?);
        Some(TaskId(self.last))
    }

    fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.0);
    }
}

/// Deterministic counter, mostly for tests
#[derive(Debug)]
pub struct SequentialIds {
    /// `None` once `u64::MAX` has been handed out or observed
    next: Option<u64>,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self { next: Some(first) }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<TaskId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(TaskId(id))
    }

    fn observe(&mut self, id: TaskId) {
        self.next = match (self.next, id.0.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
    }
}
