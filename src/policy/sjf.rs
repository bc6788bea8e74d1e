use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::notify::Notifier;
use crate::queue::ReadyQueue;

use super::{dispatch, retire, run_current, Policy, PolicyKind, Tick};

/// Non-preemptive shortest job first.
///
/// Picks by *total* requested time, not remaining time, so a steady supply of
/// short jobs can starve a long one indefinitely.
#[derive(Debug)]
pub struct Sjf {
    pub tick_ms: u64,
}

impl Sjf {
    pub fn new(tick_ms: u64) -> Sjf {
        Sjf { tick_ms: tick_ms }
    }
}

impl Policy for Sjf {
    fn kind(&self) -> PolicyKind { PolicyKind::Sjf }

    fn tick(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu, notifier: &mut dyn Notifier)
        -> Result<Tick, SchedError>
    {
        let mut tick = Tick::default();
        if let Some(true) = run_current(cpu, self.tick_ms) {
            tick.completed = retire(cpu, now, notifier);
        }
        if cpu.is_idle() {
            let next = rq.select_and_remove_min(|p| p.total_time_ms());
            tick.dispatched = dispatch(cpu, next, now);
        }
        Ok(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Outbox;
    use crate::policy::testutil::{admit, running};
    use crate::process::Process;

    #[test]
    fn shortest_total_goes_first() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut sjf = Sjf::new(100);
        admit(&mut rq, &[800, 300, 500, 200]);

        let mut order = Vec::new();
        let mut now = 0;
        while !(rq.is_empty() && cpu.is_idle()) {
            if let Some(pid) = sjf.tick(now, &mut rq, &mut cpu, &mut out).unwrap().dispatched {
                order.push(pid);
            }
            now += 100;
        }
        assert_eq!(order, vec![3, 1, 2, 0]);
        assert_eq!(out.sent.len(), 4);
    }

    #[test]
    fn running_job_is_not_preempted_by_shorter_arrival() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut sjf = Sjf::new(100);
        admit(&mut rq, &[1000]);
        sjf.tick(0, &mut rq, &mut cpu, &mut out).unwrap();

        rq.enqueue(Process::new(1, 1, 100)).unwrap();
        for now in (100..1000).step_by(100) {
            let t = sjf.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
            assert!(t.dispatched.is_none());
            assert_eq!(running(&cpu), Some(0));
        }
        let t = sjf.tick(1000, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(t.completed, Some(0));
        assert_eq!(t.dispatched, Some(1));
    }

    #[test]
    fn equal_totals_keep_queue_order() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        admit(&mut rq, &[400, 200, 200]);
        let t = Sjf::new(100).tick(0, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(t.dispatched, Some(1));
        assert_eq!(rq.pids(), vec![0, 2]);
    }
}
