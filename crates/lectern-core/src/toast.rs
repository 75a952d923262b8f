//! Transient user-facing notifications.
//!
//! Both the lecture store workflow and the reminder engine report outcomes as
//! [`Toast`]s pushed into a [`ToastSink`]. How a toast is shown (terminal line,
//! desktop popup, test log) is up to the sink.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::Lecture;

/// How long a toast stays visible unless configured otherwise.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "success",
            ToastLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    /// Display time before the toast dismisses itself.
    pub duration: Duration,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message)
    }

    /// The reminder announcement for a lecture that is about to start.
    pub fn reminder(lecture: &Lecture) -> Self {
        Self::info(format!(
            "Reminder: \"{}\" by {} starts soon!",
            lecture.lesson_name, lecture.teacher_name
        ))
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Destination for toasts.
///
/// `show` is fire-and-forget: implementations must not block the caller on
/// user interaction.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

impl<T: ToastSink + ?Sized> ToastSink for Arc<T> {
    fn show(&self, toast: Toast) {
        (**self).show(toast)
    }
}

/// Visible toasts, each expiring after its own duration.
#[derive(Debug, Default)]
pub struct ToastTray {
    items: Vec<(Toast, Instant)>,
}

impl ToastTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast, now: Instant) {
        let expires_at = now + toast.duration;
        self.items.push((toast, expires_at));
    }

    /// Drop expired toasts and return the ones still on screen, oldest first.
    pub fn visible(&mut self, now: Instant) -> Vec<&Toast> {
        self.items.retain(|(_, expires_at)| *expires_at > now);
        self.items.iter().map(|(toast, _)| toast).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
