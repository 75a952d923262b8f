use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use lectern_core::{Toast, ToastLevel, ToastSink, ToastTray};

use crate::render::toast_line;

/// Prints toasts as they arrive and remembers them until they expire.
#[derive(Debug, Default)]
pub struct TerminalToasts {
    tray: Mutex<ToastTray>,
}

impl TerminalToasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts still within their display window, oldest first.
    pub fn recent(&self) -> Vec<Toast> {
        self.recent_at(Instant::now())
    }

    fn recent_at(&self, now: Instant) -> Vec<Toast> {
        let mut tray = self.tray.lock().unwrap_or_else(PoisonError::into_inner);
        tray.visible(now).into_iter().cloned().collect()
    }

    fn record(&self, toast: Toast, now: Instant) {
        self.tray
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast, now);
    }
}

impl ToastSink for TerminalToasts {
    fn show(&self, toast: Toast) {
        let line = toast_line(&toast);
        match toast.level {
            ToastLevel::Error => eprintln!("{line}"),
            ToastLevel::Info | ToastLevel::Success => println!("{line}"),
        }
        self.record(toast, Instant::now());
    }
}
