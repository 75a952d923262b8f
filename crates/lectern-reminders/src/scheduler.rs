use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::ReminderEngine;
use crate::types::{ActiveFlag, PollOutcome};

struct PollRun {
    active: ActiveFlag,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives [`ReminderEngine::poll_once`] on a fixed interval.
///
/// Each tick spawns its poll, so a slow fetch never delays the next tick and
/// polls may overlap. The engine's dedup keeps overlapping results correct.
pub struct PollScheduler {
    engine: Arc<ReminderEngine>,
    interval: Duration,
    immediate: bool,
    run: Option<PollRun>,
}

impl PollScheduler {
    pub fn new(engine: Arc<ReminderEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            immediate: false,
            run: None,
        }
    }

    /// Poll once as soon as the scheduler starts instead of waiting a full interval.
    pub fn immediate_first_poll(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn engine(&self) -> &Arc<ReminderEngine> {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Start polling. Calling this while already running does nothing.
    pub fn start(&mut self) {
        if self.run.is_some() {
            warn!("reminder scheduler already running");
            return;
        }

        let active = ActiveFlag::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.engine),
            self.interval,
            self.immediate,
            active.clone(),
            shutdown_rx,
        ));
        info!(
            interval_secs = self.interval.as_secs(),
            immediate = self.immediate,
            "reminder scheduler started"
        );
        self.run = Some(PollRun {
            active,
            shutdown_tx,
            handle,
        });
    }

    /// Stop polling. Fetches still in flight finish but their results are dropped.
    pub async fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        run.active.deactivate();
        let _ = run.shutdown_tx.send(true);
        if let Err(e) = run.handle.await {
            warn!(error = %e, "reminder scheduler task ended abnormally");
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            run.active.deactivate();
            run.handle.abort();
        }
    }
}

async fn run_loop(
    engine: Arc<ReminderEngine>,
    period: Duration,
    immediate: bool,
    active: ActiveFlag,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = if immediate {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("reminder scheduler shutting down");
                    break;
                }
            }
            _ = ticker.tick() => {
                let engine = Arc::clone(&engine);
                let active = active.clone();
                tokio::spawn(async move {
                    match engine.poll_once(&active).await {
                        PollOutcome::Applied { fetched, notified } => {
                            debug!(fetched, notified, "reminder poll complete");
                        }
                        PollOutcome::Discarded => debug!("reminder poll discarded"),
                        PollOutcome::Failed => {}
                    }
                });
            }
        }
    }
}
