use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lectern_core::toast::DEFAULT_TOAST_DURATION;
use lectern_core::{Lecture, NotificationKey, Toast, ToastSink};
use lectern_store::UpcomingSource;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::{ActiveFlag, PollOutcome, UpcomingLesson};

#[derive(Debug, Default)]
struct ReminderState {
    /// Keys already announced. Grows for the life of the engine.
    seen: HashSet<NotificationKey>,
    /// Banner entries in the order they were announced.
    upcoming: Vec<UpcomingLesson>,
}

/// Dedup and banner bookkeeping for "starting soon" reminders.
///
/// The seen-key set and the banner list sit behind one mutex so the
/// check-then-insert on a key and the matching list append happen together,
/// even when polls overlap on a multi-threaded runtime.
pub struct ReminderEngine {
    source: Arc<dyn UpcomingSource>,
    toasts: Arc<dyn ToastSink>,
    toast_duration: Duration,
    state: Mutex<ReminderState>,
    upcoming_tx: watch::Sender<Vec<UpcomingLesson>>,
}

impl ReminderEngine {
    pub fn new(source: Arc<dyn UpcomingSource>, toasts: Arc<dyn ToastSink>) -> Self {
        let (upcoming_tx, _) = watch::channel(Vec::new());
        Self {
            source,
            toasts,
            toast_duration: DEFAULT_TOAST_DURATION,
            state: Mutex::new(ReminderState::default()),
            upcoming_tx,
        }
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// Fetch the upcoming feed once and announce every lecture not seen before.
    ///
    /// `active` is the flag of the run that issued this poll. If it has been
    /// cleared by the time the fetch resolves, the result is dropped.
    pub async fn poll_once(&self, active: &ActiveFlag) -> PollOutcome {
        let result = self.source.fetch_upcoming().await;

        if !active.is_active() {
            debug!("poll resolved after teardown, discarding result");
            return PollOutcome::Discarded;
        }

        match result {
            Ok(candidates) => {
                let fetched = candidates.len();
                match self.apply(candidates, Utc::now(), active) {
                    Some(notified) => PollOutcome::Applied { fetched, notified },
                    None => PollOutcome::Discarded,
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch upcoming reminders");
                PollOutcome::Failed
            }
        }
    }

    /// Filter candidates against the seen set, in the order received.
    ///
    /// Returns the number of new reminders recorded, or `None` if the run went
    /// inactive before the state lock was taken.
    pub(crate) fn apply(
        &self,
        candidates: Vec<Lecture>,
        now: DateTime<Utc>,
        active: &ActiveFlag,
    ) -> Option<usize> {
        let announced: Vec<Lecture> = {
            let mut state = self.lock_state();
            if !active.is_active() {
                return None;
            }

            let mut announced = Vec::new();
            for lecture in candidates {
                let key = lecture.notification_key();
                if !state.seen.insert(key.clone()) {
                    continue;
                }
                info!(key = %key, lesson = %lecture.lesson_name, "new upcoming lecture");
                state.upcoming.push(UpcomingLesson::new(lecture.clone(), now));
                announced.push(lecture);
            }

            if !announced.is_empty() {
                self.upcoming_tx.send_replace(state.upcoming.clone());
            }
            announced
        };

        // Toasts go out after the lock is released; a stop in between suppresses the rest.
        for lecture in &announced {
            if !active.is_active() {
                debug!("run stopped while announcing, remaining toasts suppressed");
                break;
            }
            self.toasts
                .show(Toast::reminder(lecture).with_duration(self.toast_duration));
        }
        Some(announced.len())
    }

    /// Clear the banner. Seen keys are kept, so dismissed lectures stay quiet.
    pub fn dismiss_all(&self) {
        let mut state = self.lock_state();
        let cleared = state.upcoming.len();
        state.upcoming.clear();
        self.upcoming_tx.send_replace(Vec::new());
        info!(cleared, "upcoming lessons dismissed");
    }

    /// Snapshot of the banner entries.
    pub fn upcoming(&self) -> Vec<UpcomingLesson> {
        self.lock_state().upcoming.clone()
    }

    /// Watch the banner; a new value is published whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<UpcomingLesson>> {
        self.upcoming_tx.subscribe()
    }

    pub fn has_seen(&self, key: &NotificationKey) -> bool {
        self.lock_state().seen.contains(key)
    }

    pub fn seen_count(&self) -> usize {
        self.lock_state().seen.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, ReminderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
