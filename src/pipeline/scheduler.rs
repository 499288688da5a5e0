// src/pipeline/scheduler.rs

//! Periodic sync cycles aligned to wall-clock boundaries.
//!
//! With the default 30 minute interval a cycle fires at every `:00` and
//! `:30`. The wait for each cycle is measured against the wall clock again,
//! so a clock correction or a long cycle only shifts one firing. The
//! scheduler runs on its own task; the query path never waits on it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::pipeline::Synchronizer;
use crate::utils::clock::Clock;

/// First boundary at or after `now` for a period of `interval_minutes`.
///
/// Boundaries are multiples of the interval counted from midnight UTC.
pub fn next_boundary(now: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
    let step = i64::from(interval_minutes.max(1)) * 60;
    let secs = now.timestamp();
    let on_boundary = secs.rem_euclid(step) == 0 && now.timestamp_subsec_nanos() == 0;
    if on_boundary {
        return now;
    }
    let next = (secs.div_euclid(step) + 1) * step;
    DateTime::from_timestamp(next, 0).unwrap_or(now)
}

/// Recurring full resync.
pub struct SyncScheduler {
    synchronizer: Arc<Synchronizer>,
    clock: Arc<dyn Clock>,
    interval_minutes: u32,
}

impl SyncScheduler {
    pub fn new(synchronizer: Arc<Synchronizer>, clock: Arc<dyn Clock>, interval_minutes: u32) -> Self {
        Self {
            synchronizer,
            clock,
            interval_minutes: interval_minutes.max(1),
        }
    }

    /// Spawn the scheduler task on the current runtime.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut stop_rx) = watch::channel(false);

        log::info!(
            "Scheduler started: first cycle at {}, then every {} minutes",
            next_boundary(self.clock.now(), self.interval_minutes).to_rfc3339(),
            self.interval_minutes
        );

        let Self {
            synchronizer,
            clock,
            interval_minutes,
        } = self;
        let period = ChronoDuration::minutes(i64::from(interval_minutes));

        let task = tokio::spawn(async move {
            let mut last_fired: Option<DateTime<Utc>> = None;

            loop {
                let now = clock.now();
                let mut target = next_boundary(now, interval_minutes);
                // Never fire the same boundary twice.
                if let Some(last) = last_fired.filter(|last| target <= *last) {
                    target = last + period;
                }
                let delay = (target - now).to_std().unwrap_or(Duration::ZERO);
                log::debug!("Next sync cycle at {}", target.to_rfc3339());

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        // Failures are aggregated and logged by the cycle itself.
                        let _ = synchronizer.run_cycle().await;
                        last_fired = Some(target);
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            log::info!("Scheduler stopped");
        });

        SchedulerHandle { shutdown, task }
    }
}

/// Handle to a running scheduler.
///
/// Dropping the handle also stops the scheduler once its current cycle
/// finishes.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the scheduler and wait for it to exit. A cycle in progress
    /// runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            log::error!("Scheduler task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
