use chrono::{DateTime, Utc};
use lectern_core::{Lecture, NotificationKey};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A reminder that has been announced and is still shown in the banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingLesson {
    pub lecture: Lecture,
    pub notification_key: NotificationKey,
    /// Whole minutes (rounded up) until the lecture starts, measured when the
    /// reminder was first seen. `None` when the time could not be parsed or
    /// the lecture has already started.
    pub minutes_left: Option<i64>,
}

impl UpcomingLesson {
    pub fn new(lecture: Lecture, now: DateTime<Utc>) -> Self {
        let minutes_left = lecture.scheduled_at().and_then(|at| minutes_until(at, now));
        Self {
            notification_key: lecture.notification_key(),
            lecture,
            minutes_left,
        }
    }

    /// Banner badge text: `"12m"`, or `"Soon"` when the countdown is unknown.
    pub fn countdown_label(&self) -> String {
        match self.minutes_left {
            Some(m) => format!("{m}m"),
            None => "Soon".to_string(),
        }
    }
}

pub fn minutes_until(at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    let secs = (at - now).num_seconds();
    if secs <= 0 {
        return None;
    }
    Some((secs + 59) / 60)
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Candidates were filtered and new reminders emitted.
    Applied { fetched: usize, notified: usize },
    /// The fetch failed; nothing changed.
    Failed,
    /// The run was torn down while the fetch was in flight; the result was dropped.
    Discarded,
}

/// Liveness of one scheduler run.
///
/// Each poll captures the flag of the run that started it and checks it before
/// touching engine state, so results that land after teardown are ignored.
#[derive(Debug, Clone)]
pub struct ActiveFlag(Arc<AtomicBool>);

impl ActiveFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for ActiveFlag {
    fn default() -> Self {
        Self::new()
    }
}
