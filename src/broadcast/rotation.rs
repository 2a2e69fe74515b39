//! Autobroadcast rotation.

use chrono::{Timelike, Utc};
use parking_lot::Mutex;
use rand::Rng;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::debug;

use crate::chat::format::colorize;
use crate::config::{AutoBroadcastConfig, Config, SharedConfig};
use crate::state::Roster;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RotationState {
    tick_accumulator: u64,
    current_index: usize,
}

/// Picks and renders rotation messages on the configured cadence.
///
/// State starts at zero on every process start.
pub struct AutoBroadcaster {
    state: Mutex<RotationState>,
    memory: MemoryGauge,
    config: SharedConfig,
}

impl AutoBroadcaster {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            state: Mutex::new(RotationState::default()),
            memory: MemoryGauge::new(),
            config,
        }
    }

    /// Advance one tick. Returns the rendered message when one is due.
    ///
    /// Does nothing (not even counting) while disabled or without messages.
    pub fn advance(&self, roster: &dyn Roster) -> Option<String> {
        let config = self.config.read().clone();
        let rotation = &config.auto_broadcast;
        if !rotation.enabled || rotation.messages.is_empty() {
            return None;
        }

        let due_at = rotation
            .interval_secs
            .saturating_mul(u64::from(config.server.ticks_per_second))
            .max(1);

        let message = {
            let mut state = self.state.lock();
            state.tick_accumulator += 1;
            if state.tick_accumulator < due_at {
                return None;
            }
            state.tick_accumulator = 0;
            select(&mut state, rotation)
        };
        Some(render(&message, &config, roster, self.memory.usage_mb()))
    }

    /// Select and render a message now, outside the cadence.
    ///
    /// Advances the round-robin index but leaves the tick accumulator alone.
    pub fn fire_now(&self, roster: &dyn Roster) -> Option<String> {
        let config = self.config.read().clone();
        if config.auto_broadcast.messages.is_empty() {
            return None;
        }
        let message = select(&mut self.state.lock(), &config.auto_broadcast);
        Some(render(&message, &config, roster, self.memory.usage_mb()))
    }

    pub fn tick_accumulator(&self) -> u64 {
        self.state.lock().tick_accumulator
    }

    pub fn current_index(&self) -> usize {
        self.state.lock().current_index
    }
}

fn select(state: &mut RotationState, rotation: &AutoBroadcastConfig) -> String {
    let len = rotation.messages.len();
    let index = if rotation.randomize {
        rand::thread_rng().gen_range(0..len)
    } else {
        // A reload may have shortened the list.
        let index = state.current_index % len;
        state.current_index = (index + 1) % len;
        index
    };
    debug!(index, of = len, random = rotation.randomize, "Autobroadcast selected");
    rotation.messages[index].clone()
}

fn render(message: &str, config: &Config, roster: &dyn Roster, memory: (u64, u64)) -> String {
    let now = Utc::now();
    let (memory_used, memory_max) = memory;
    let text = message
        .replace("{online}", &roster.online_count().to_string())
        .replace("{max_online}", &roster.max_online().to_string())
        .replace("{server_name}", &config.server.name)
        .replace("{memory_used}", &memory_used.to_string())
        .replace("{memory_max}", &memory_max.to_string())
        .replace("{uptime_hours}", &now.hour().to_string())
        .replace("{uptime_minutes}", &now.minute().to_string())
        .replace("{tps}", &format!("{:.1}", f64::from(config.server.ticks_per_second)));

    if config.auto_broadcast.show_prefix {
        colorize(&format!("{}{}", config.auto_broadcast.prefix, text))
    } else {
        colorize(&text)
    }
}

const MB: u64 = 1024 * 1024;

/// Process and host memory for the `{memory_*}` placeholders.
struct MemoryGauge {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl MemoryGauge {
    fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Resident set size of this process and total system memory, in MB.
    /// A value the platform cannot report is 0.
    fn usage_mb(&self) -> (u64, u64) {
        let mut system = self.system.lock();
        system.refresh_memory();
        let used = self.pid.map_or(0, |pid| {
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            system.process(pid).map_or(0, |p| p.memory())
        });
        (used / MB, system.total_memory() / MB)
    }
}
