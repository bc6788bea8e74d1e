use std::mem;

use crate::process::Process;

#[derive(Debug)]
pub enum CpuState {
    Idle, Busy(Process)
}

/// The single CPU slot. Holds at most one process, by value.
#[derive(Debug)]
pub struct Cpu {
    pub state: CpuState,
    pub total_busy_time: u64,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu { state: CpuState::Idle, total_busy_time: 0 }
    }

    pub fn is_idle(&self) -> bool {
        match self.state {
            CpuState::Idle => true,
            CpuState::Busy(_) => false,
        }
    }

    pub fn running(&self) -> Option<&Process> {
        match self.state {
            CpuState::Busy(ref p) => Some(p),
            CpuState::Idle => None,
        }
    }

    pub fn running_mut(&mut self) -> Option<&mut Process> {
        match self.state {
            CpuState::Busy(ref mut p) => Some(p),
            CpuState::Idle => None,
        }
    }

    /// Empties the slot and hands back whatever was running.
    pub fn take(&mut self) -> Option<Process> {
        match mem::replace(&mut self.state, CpuState::Idle) {
            CpuState::Busy(p) => Some(p),
            CpuState::Idle => None,
        }
    }

    /// Puts `process` on the CPU and opens a fresh slice at `now`.
    /// Whatever occupied the slot before is returned to the caller.
    pub fn dispatch(&mut self, mut process: Process, now: u64) -> Option<Process> {
        process.start_slice(now);
        self.restore(process)
    }

    /// Puts a record back as it is, without opening a new slice.
    pub(crate) fn restore(&mut self, process: Process) -> Option<Process> {
        match mem::replace(&mut self.state, CpuState::Busy(process)) {
            CpuState::Busy(p) => Some(p),
            CpuState::Idle => None,
        }
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}
