//! Periodic tick driver: delayed queue, autobroadcast and mute sweep.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{AutoBroadcaster, DelayedBroadcastQueue};
use crate::config::SharedConfig;
use crate::moderation::MuteStore;
use crate::state::{Broadcaster, Roster};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Queued broadcasts released this tick.
    pub delivered: usize,
    /// Whether an autobroadcast went out.
    pub broadcast_sent: bool,
    /// Records removed, when a sweep ran this tick.
    pub swept: Option<usize>,
}

pub struct PeriodicScheduler {
    queue: Arc<DelayedBroadcastQueue>,
    rotation: Arc<AutoBroadcaster>,
    mutes: Arc<MuteStore>,
    roster: Arc<dyn Roster>,
    broadcaster: Arc<dyn Broadcaster>,
    ticks: AtomicU64,
    config: SharedConfig,
}

impl PeriodicScheduler {
    pub fn new(
        config: SharedConfig,
        queue: Arc<DelayedBroadcastQueue>,
        rotation: Arc<AutoBroadcaster>,
        mutes: Arc<MuteStore>,
        roster: Arc<dyn Roster>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            queue,
            rotation,
            mutes,
            roster,
            broadcaster,
            ticks: AtomicU64::new(0),
            config,
        }
    }

    /// Run one tick. Each step is isolated: a panicking step is logged and
    /// the remaining steps still run.
    pub fn tick(&self) -> TickReport {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let mut report = TickReport::default();

        if let Some(delivered) = isolate("delayed_queue", || {
            let due = self.queue.tick();
            for text in &due {
                self.broadcaster.broadcast(text);
            }
            due.len()
        }) {
            report.delivered = delivered;
        }

        if let Some(sent) = isolate("autobroadcast", || {
            match self.rotation.advance(self.roster.as_ref()) {
                Some(text) => {
                    let reached = self.broadcaster.broadcast(&text);
                    debug!(reached, "Autobroadcast sent");
                    true
                }
                None => false,
            }
        }) {
            report.broadcast_sent = sent;
        }

        let sweep_every = self.config.read().moderation.sweep_interval_ticks;
        if sweep_every > 0 && tick % sweep_every == 0 {
            report.swept = isolate("mute_sweep", || {
                let removed = self.mutes.sweep_expired();
                if removed > 0 {
                    info!(removed = removed, "Expired mutes removed");
                }
                removed
            });
        }

        report
    }

    /// Send the next rotation message immediately.
    pub fn fire_broadcast_now(&self) -> bool {
        match self.rotation.fire_now(self.roster.as_ref()) {
            Some(text) => {
                self.broadcaster.broadcast(&text);
                true
            }
            None => false,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Drive [`tick`](Self::tick) at `server.ticks_per_second`.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let tps = self.config.read().server.ticks_per_second.max(1);
        let period = Duration::from_millis(1000 / u64::from(tps)).max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.tick();
            }
        })
    }
}

fn isolate<T>(step: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            error!(step, "Scheduler step panicked");
            None
        }
    }
}
