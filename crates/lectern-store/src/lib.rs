//! `lectern-store` — client for the remote lecture record service.
//!
//! [`HttpLectureStore`] speaks the service's REST dialect; [`LectureBook`]
//! mirrors the collection locally and drives the add/edit/delete workflow,
//! reporting each outcome as a toast.

pub mod book;
pub mod client;
pub mod error;

pub use book::{LectureBook, LoadingFlag, SubmitOutcome};
pub use client::{HttpLectureStore, LectureStore, UpcomingResponse, UpcomingSource};
pub use error::{Result, StoreError};
