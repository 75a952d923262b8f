//! `lectern-core` — domain types shared by the store client, the reminder
//! engine and the dashboard binary.

pub mod config;
pub mod error;
pub mod toast;
pub mod types;
pub mod validation;

pub use config::LecternConfig;
pub use error::{LecternError, Result};
pub use toast::{Toast, ToastLevel, ToastSink, ToastTray};
pub use types::{
    parse_lecture_time, FormErrors, FormField, Lecture, LectureFields, LectureForm, LectureId,
    NotificationKey,
};
pub use validation::validate_form;
