use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::notify::ChannelId;
use crate::process::{Pid, Process};

/// A process that becomes known to the scheduler at `at_ms`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Arrival {
    pub at_ms: u64,
    pub pid: Pid,
    pub channel: ChannelId,
    pub total_time_ms: u64,
}

impl Arrival {
    pub fn new(at_ms: u64, pid: Pid, channel: ChannelId, total_time_ms: u64) -> Arrival {
        Arrival { at_ms: at_ms, pid: pid, channel: channel, total_time_ms: total_time_ms }
    }

    pub fn into_process(self) -> Process {
        Process::new(self.pid, self.channel, self.total_time_ms)
    }
}

// Arrival ordering {{{
impl Ord for Arrival {
    fn cmp(&self, other: &Arrival) -> Ordering {
        // Flipped so that BinaryHeap pops the earliest arrival first; equal
        // times pop in pid order.
        other.at_ms.cmp(&self.at_ms)
            .then_with(|| other.pid.cmp(&self.pid))
            .then_with(|| other.total_time_ms.cmp(&self.total_time_ms))
            .then_with(|| other.channel.cmp(&self.channel))
    }
}
impl PartialOrd for Arrival {
    fn partial_cmp(&self, other: &Arrival) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
// Arrival ordering }}}

/// Pending arrivals, earliest first.
#[derive(Debug, Default)]
pub struct Arrivals {
    heap: BinaryHeap<Arrival>,
}

impl Arrivals {
    pub fn new() -> Arrivals {
        Arrivals { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, arrival: Arrival) {
        self.heap.push(arrival);
    }

    /// Pops the next arrival if it is due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Arrival> {
        match self.heap.peek() {
            Some(a) if a.at_ms <= now => self.heap.pop(),
            _ => None,
        }
    }

    pub fn next_at(&self) -> Option<u64> {
        self.heap.peek().map(|a| a.at_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl FromIterator<Arrival> for Arrivals {
    fn from_iter<I: IntoIterator<Item = Arrival>>(iter: I) -> Arrivals {
        Arrivals { heap: iter.into_iter().collect() }
    }
}
