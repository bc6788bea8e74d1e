use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::notify::Notifier;
use crate::queue::ReadyQueue;

use super::{dispatch, retire, run_current, Policy, PolicyKind, Tick};

/// First come, first served. A process keeps the CPU until it finishes.
#[derive(Debug)]
pub struct Fifo {
    pub tick_ms: u64,
}

impl Fifo {
    pub fn new(tick_ms: u64) -> Fifo {
        Fifo { tick_ms: tick_ms }
    }
}

impl Policy for Fifo {
    fn kind(&self) -> PolicyKind { PolicyKind::Fifo }

    fn tick(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu, notifier: &mut dyn Notifier)
        -> Result<Tick, SchedError>
    {
        let mut tick = Tick::default();
        if let Some(true) = run_current(cpu, self.tick_ms) {
            tick.completed = retire(cpu, now, notifier);
        }
        if cpu.is_idle() {
            tick.dispatched = dispatch(cpu, rq.dequeue_head(), now);
        }
        Ok(tick)
    }
}
