//! Cleanup schedules for the conversation store.
//!
//! Three independent triggers feed one channel: once at startup, every five
//! minutes, and at the next local midnight followed by every 24 hours. The
//! consumer runs the same reconcile for each of them.

use std::time::Duration;

use chrono::Local;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use uketsuke_shared::time::{DAY_MS, millis_until_next_local_midnight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTrigger {
    Startup,
    Interval,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSchedule {
    pub interval: Duration,
    /// Delay before the first daily run
    pub first_daily: Duration,
    pub daily: Duration,
}

impl CleanupSchedule {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

    /// Five-minute interval plus a daily run anchored at local midnight.
    pub fn anchored_at_local_midnight() -> Self {
        let until_midnight = millis_until_next_local_midnight(Local::now()).max(0) as u64;
        Self {
            interval: Self::DEFAULT_INTERVAL,
            first_daily: Duration::from_millis(until_midnight),
            daily: Duration::from_millis(DAY_MS as u64),
        }
    }
}

pub struct CleanupScheduler;

impl CleanupScheduler {
    /// Spawn the schedule. It stops once the receiver is dropped.
    pub fn spawn(
        schedule: CleanupSchedule,
    ) -> (JoinHandle<()>, mpsc::UnboundedReceiver<CleanupTrigger>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            if tx.send(CleanupTrigger::Startup).is_err() {
                return;
            }

            let start = Instant::now();
            let mut interval =
                tokio::time::interval_at(start + schedule.interval, schedule.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut next_daily = start + schedule.first_daily;
            let daily = tokio::time::sleep_until(next_daily);
            tokio::pin!(daily);

            loop {
                let trigger = tokio::select! {
                    _ = interval.tick() => CleanupTrigger::Interval,
                    _ = &mut daily => {
                        next_daily += schedule.daily;
                        daily.as_mut().reset(next_daily);
                        CleanupTrigger::Daily
                    }
                };
                tracing::debug!("Cleanup triggered: {:?}", trigger);
                if tx.send(trigger).is_err() {
                    break;
                }
            }
        });
        (handle, rx)
    }
}
