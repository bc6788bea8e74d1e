use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::notify::Notifier;
use crate::queue::ReadyQueue;

use super::{dispatch, preempt, retire, run_current, Policy, PolicyKind, Tick};

/// Round robin with a fixed quantum. Preemption sends no notification; only
/// completion does.
#[derive(Debug)]
pub struct RoundRobin {
    pub tick_ms: u64,
    pub quantum_ms: u64,
}

impl RoundRobin {
    pub fn new(tick_ms: u64, quantum_ms: u64) -> RoundRobin {
        RoundRobin { tick_ms: tick_ms, quantum_ms: quantum_ms }
    }
}

impl Policy for RoundRobin {
    fn kind(&self) -> PolicyKind { PolicyKind::RoundRobin }

    fn tick(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu, notifier: &mut dyn Notifier)
        -> Result<Tick, SchedError>
    {
        let mut tick = Tick::default();
        match run_current(cpu, self.tick_ms) {
            Some(true) => tick.completed = retire(cpu, now, notifier),
            Some(false) => {
                let expired = cpu.running().map_or(false, |p| p.time_in_slice_ms() >= self.quantum_ms);
                if expired {
                    tick.preempted = preempt(cpu, rq, now, self.tick_ms, None)?;
                }
            }
            None => {}
        }
        if cpu.is_idle() {
            tick.dispatched = dispatch(cpu, rq.dequeue_head(), now);
        }
        Ok(tick)
    }
}
