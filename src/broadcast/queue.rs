//! Tick-ordered deferred delivery.

use std::collections::VecDeque;

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedBroadcast {
    text: String,
    remaining_ticks: i64,
}

/// FIFO of rendered broadcasts with strict head-of-line blocking.
///
/// Only the head's counter advances per tick, so a later entry with a
/// shorter delay still waits for everything queued before it. Nothing is
/// ever dropped.
#[derive(Debug, Default)]
pub struct DelayedBroadcastQueue {
    entries: Mutex<VecDeque<QueuedBroadcast>>,
}

impl DelayedBroadcastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`, due after `delay_ticks` ticks of being at the head.
    pub fn enqueue(&self, text: impl Into<String>, delay_ticks: i64) {
        self.entries.lock().push_back(QueuedBroadcast {
            text: text.into(),
            remaining_ticks: delay_ticks,
        });
    }

    /// Advance one tick and return everything now due, in order.
    pub fn tick(&self) -> Vec<String> {
        let mut entries = self.entries.lock();
        let mut due = Vec::new();

        if let Some(head) = entries.front_mut() {
            head.remaining_ticks -= 1;
        }
        while entries.front().is_some_and(|head| head.remaining_ticks <= 0) {
            if let Some(head) = entries.pop_front() {
                due.push(head.text);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
