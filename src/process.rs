use crate::notify::ChannelId;

pub type Pid = usize;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProcessStatus {
    Waiting, Running, Terminated
}

/// Scheduling state of one simulated process (its PCB).
///
/// Only `Process::new` creates records, so priority, elapsed time and slice
/// bookkeeping always start from their defaults.
#[derive(Debug)]
pub struct Process {
    pid: Pid,
    channel: ChannelId,
    total_time_ms: u64,
    elapsed_time_ms: u64,
    priority: usize,
    slice_start_ms: u64,
    time_in_slice_ms: u64,
    status: ProcessStatus,
}

impl Process {
    pub fn new(pid: Pid, channel: ChannelId, total_time_ms: u64) -> Process {
        Process {
            pid: pid,
            channel: channel,
            total_time_ms: total_time_ms,
            elapsed_time_ms: 0,
            priority: 0,
            slice_start_ms: 0,
            time_in_slice_ms: 0,
            status: ProcessStatus::Waiting,
        }
    }

    pub fn pid(&self) -> Pid { self.pid }
    pub fn channel(&self) -> ChannelId { self.channel }
    pub fn total_time_ms(&self) -> u64 { self.total_time_ms }
    pub fn elapsed_time_ms(&self) -> u64 { self.elapsed_time_ms }
    pub fn priority(&self) -> usize { self.priority }
    pub fn slice_start_ms(&self) -> u64 { self.slice_start_ms }
    pub fn time_in_slice_ms(&self) -> u64 { self.time_in_slice_ms }
    pub fn status(&self) -> ProcessStatus { self.status }

    pub fn remaining_ms(&self) -> u64 {
        self.total_time_ms.saturating_sub(self.elapsed_time_ms)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_time_ms >= self.total_time_ms
    }

    /// Charges one tick of CPU time to the process and its current slice.
    pub(crate) fn run_for(&mut self, tick_ms: u64) {
        self.elapsed_time_ms += tick_ms;
        self.time_in_slice_ms += tick_ms;
    }

    pub(crate) fn start_slice(&mut self, now: u64) {
        self.slice_start_ms = now;
        self.time_in_slice_ms = 0;
        self.status = ProcessStatus::Running;
    }

    pub(crate) fn yield_cpu(&mut self) {
        self.time_in_slice_ms = 0;
        self.status = ProcessStatus::Waiting;
    }

    /// Takes back a tick charged by `run_for` and puts the process back in
    /// the running state it had before, for a tick that has to be failed.
    pub(crate) fn undo_tick(&mut self, tick_ms: u64, time_in_slice_ms: u64, priority: usize) {
        self.elapsed_time_ms = self.elapsed_time_ms.saturating_sub(tick_ms);
        self.time_in_slice_ms = time_in_slice_ms.saturating_sub(tick_ms);
        self.priority = priority;
        self.status = ProcessStatus::Running;
    }

    pub(crate) fn terminate(&mut self) {
        self.status = ProcessStatus::Terminated;
    }

    pub(crate) fn set_priority(&mut self, priority: usize) {
        self.priority = priority;
    }
}
