//! Per-principal chat throttle.
//!
//! Flood and cooldown are `governor` token buckets, one pair per principal:
//! - flood: `flood_threshold` messages per `flood_time_window_secs`, burstable
//! - cooldown: one message per `message_cooldown_secs`
//!
//! Repeat detection compares the trimmed, lowercased text of consecutive
//! accepted messages. Checks run flood, repeat, cooldown; a message refused
//! by the repeat check never spends the cooldown.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;

use crate::config::AntiSpamConfig;
use crate::state::PrincipalId;

/// Why the throttle refused a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamKind {
    Cooldown { remaining_secs: u64 },
    Repeated,
    Flood,
}

/// Replenish period and burst a bucket was built with.
type Shape = (Duration, NonZeroU32);

struct Bucket {
    limiter: DefaultDirectRateLimiter,
    shape: Shape,
}

impl Bucket {
    fn new(shape: Shape) -> Option<Self> {
        let quota = Quota::with_period(shape.0)?.allow_burst(shape.1);
        Some(Self {
            limiter: RateLimiter::direct(quota),
            shape,
        })
    }

    fn allows(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Current bucket for `shape`, rebuilt when a reload changed the limits.
fn bucket(slot: &mut Option<Bucket>, shape: Option<Shape>) -> Option<&Bucket> {
    let Some(shape) = shape else {
        *slot = None;
        return None;
    };
    if slot.as_ref().is_none_or(|b| b.shape != shape) {
        *slot = Bucket::new(shape);
    }
    slot.as_ref()
}

fn flood_shape(config: &AntiSpamConfig) -> Option<Shape> {
    let burst = NonZeroU32::new(u32::try_from(config.flood_threshold).unwrap_or(u32::MAX))?;
    let period = Duration::from_secs(config.flood_time_window_secs) / burst.get();
    (!period.is_zero()).then_some((period, burst))
}

fn cooldown_shape(config: &AntiSpamConfig) -> Option<Shape> {
    let period = Duration::from_secs(config.message_cooldown_secs);
    (!period.is_zero()).then_some((period, nonzero!(1u32)))
}

#[derive(Default)]
struct SpamState {
    flood: Option<Bucket>,
    cooldown: Option<Bucket>,
    last_accepted: Option<Instant>,
    last_text: Option<String>,
    repeat_count: u32,
}

#[derive(Default)]
pub struct SpamGuard {
    states: DashMap<PrincipalId, SpamState>,
}

impl SpamGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `text` from `id` may be delivered now.
    pub fn check(&self, id: &PrincipalId, text: &str, config: &AntiSpamConfig) -> Result<(), SpamKind> {
        if !config.enable_anti_spam && !config.enable_anti_flood {
            return Ok(());
        }
        let mut entry = self.states.entry(*id).or_default();
        let state = entry.value_mut();

        if config.enable_anti_flood
            && let Some(flood) = bucket(&mut state.flood, flood_shape(config))
            && !flood.allows()
        {
            return Err(SpamKind::Flood);
        }
        if !config.enable_anti_spam {
            return Ok(());
        }

        let normalized = text.trim().to_lowercase();
        let repeats = if state.last_text.as_deref() == Some(normalized.as_str()) {
            state.repeat_count + 1
        } else {
            1
        };
        if repeats > config.max_repeated_messages {
            return Err(SpamKind::Repeated);
        }

        if let Some(cooldown) = bucket(&mut state.cooldown, cooldown_shape(config))
            && !cooldown.allows()
        {
            let elapsed = state.last_accepted.map(|t| t.elapsed()).unwrap_or_default();
            let remaining = cooldown.shape.0.saturating_sub(elapsed);
            return Err(SpamKind::Cooldown {
                remaining_secs: (remaining.as_secs_f64().ceil() as u64).max(1),
            });
        }

        state.last_text = Some(normalized);
        state.repeat_count = repeats;
        state.last_accepted = Some(Instant::now());
        Ok(())
    }

    /// Drop all state for `id` (disconnect).
    pub fn forget(&self, id: &PrincipalId) {
        self.states.remove(id);
    }

    pub fn tracked(&self) -> usize {
        self.states.len()
    }
}
