//! `lectern-reminders` — polling reminder engine for lectures starting soon.
//!
//! # Overview
//!
//! [`PollScheduler`] ticks on a fixed interval and asks the
//! [`ReminderEngine`] to fetch the upcoming feed. Every lecture is keyed by
//! its [`NotificationKey`](lectern_core::NotificationKey) (`"{id}-{time}"`).
//! A key announces at most once for the life of the engine: the first sighting
//! raises a toast and adds a banner entry; later sightings are ignored, even
//! after the banner is dismissed.
//!
//! | Event              | Effect                                              |
//! |--------------------|-----------------------------------------------------|
//! | New key in feed    | Toast shown, banner entry appended                  |
//! | Known key in feed  | Nothing                                             |
//! | Fetch fails        | Warning logged, state untouched, polling continues  |
//! | Dismiss all        | Banner cleared, seen keys kept                      |
//! | Scheduler stopped  | Polls still in flight are discarded                 |

pub mod engine;
pub mod scheduler;
pub mod types;

pub use engine::ReminderEngine;
pub use scheduler::PollScheduler;
pub use types::{minutes_until, ActiveFlag, PollOutcome, UpcomingLesson};
