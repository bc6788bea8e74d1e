use std::collections::vec_deque::{Iter, IterMut};
use std::collections::VecDeque;

use log::error;

use crate::error::{EnqueueCause, EnqueueError};
use crate::process::{Pid, Process};

/// Processes waiting for the CPU, in arrival order.
///
/// The queue owns its records outright. Every removal hands the record back
/// by value, so a process is reachable either from here or from the CPU
/// slot, never both.
///
/// An optional limit caps how many records may wait at once, like a bounded
/// request buffer.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<Process>,
    limit: Option<usize>,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue { queue: VecDeque::new(), limit: None }
    }

    pub fn with_limit(limit: usize) -> ReadyQueue {
        ReadyQueue { queue: VecDeque::new(), limit: Some(limit) }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Appends at the tail. If the queue is at its limit or cannot grow, the
    /// record comes back inside the error.
    pub fn enqueue(&mut self, process: Process) -> Result<(), EnqueueError> {
        if let Some(limit) = self.limit {
            if self.queue.len() >= limit {
                return Err(EnqueueError { process: process, source: EnqueueCause::AtLimit(limit) });
            }
        }
        if let Err(e) = self.queue.try_reserve(1) {
            return Err(EnqueueError { process: process, source: EnqueueCause::Alloc(e) });
        }
        self.queue.push_back(process);
        Ok(())
    }

    pub fn dequeue_head(&mut self) -> Option<Process> {
        self.queue.pop_front()
    }

    /// Takes the record with the given pid out of the queue wherever it sits.
    ///
    /// Asking for a pid that is not queued means the caller lost track of a
    /// record; that is logged and nothing is removed.
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let removed = self.remove_where(|p| p.pid() == pid);
        if removed.is_none() {
            error!("ready queue: pid {} is not queued, nothing removed", pid);
        }
        removed
    }

    pub fn remove_where<F>(&mut self, pred: F) -> Option<Process>
        where F: FnMut(&Process) -> bool
    {
        let idx = self.queue.iter().position(pred)?;
        self.queue.remove(idx)
    }

    /// Scans the whole queue and removes the record with the smallest key.
    /// On equal keys the record nearest the head wins.
    pub fn select_and_remove_min<K, F>(&mut self, key_fn: F) -> Option<Process>
        where K: Ord, F: Fn(&Process) -> K
    {
        let mut best: Option<(usize, K)> = None;
        for (idx, p) in self.queue.iter().enumerate() {
            let key = key_fn(p);
            let better = match best {
                Some((_, ref k)) => key < *k,
                None => true,
            };
            if better {
                best = Some((idx, key));
            }
        }
        let (idx, _) = best?;
        self.queue.remove(idx)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.iter().any(|p| p.pid() == pid)
    }

    pub fn pids(&self) -> Vec<Pid> {
        self.queue.iter().map(|p| p.pid()).collect()
    }

    pub fn iter(&self) -> Iter<'_, Process> {
        self.queue.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, Process> {
        self.queue.iter_mut()
    }
}

impl<'a> IntoIterator for &'a ReadyQueue {
    type Item = &'a Process;
    type IntoIter = Iter<'a, Process>;

    fn into_iter(self) -> Iter<'a, Process> {
        self.queue.iter()
    }
}
