use log::info;

use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::notify::Notifier;
use crate::queue::ReadyQueue;

use super::{dispatch, preempt, retire, run_current, Policy, PolicyKind, Tick};

/// Multilevel feedback queue over a single ready queue.
///
/// Level 0 is the highest priority and has the shortest quantum. A process
/// that uses its whole quantum drops one level, down to the last. Every
/// `boost_interval_ms` all processes, running or waiting, go back to level 0.
/// Within a level the earliest enqueued process runs first.
#[derive(Debug)]
pub struct Mlfq {
    pub tick_ms: u64,
    quanta_ms: Vec<u64>,
    pub boost_interval_ms: u64,
    boost_timer_ms: u64,
}

impl Mlfq {
    /// `quanta_ms[level]` is the quantum of that level. Callers are expected
    /// to pass a non-empty, strictly increasing table (see
    /// `SchedulerParams::validate`).
    pub fn new(tick_ms: u64, quanta_ms: Vec<u64>, boost_interval_ms: u64) -> Mlfq {
        Mlfq {
            tick_ms: tick_ms,
            quanta_ms: quanta_ms,
            boost_interval_ms: boost_interval_ms,
            boost_timer_ms: 0,
        }
    }

    pub fn levels(&self) -> usize {
        self.quanta_ms.len()
    }

    pub fn lowest_level(&self) -> usize {
        self.levels().saturating_sub(1)
    }

    /// Quantum for `level`; levels past the table use the last entry.
    pub fn quantum_ms(&self, level: usize) -> u64 {
        match self.quanta_ms.get(level.min(self.lowest_level())) {
            Some(&q) => q,
            None => u64::MAX,
        }
    }

    pub fn boost_timer_ms(&self) -> u64 {
        self.boost_timer_ms
    }

    fn boost(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu) {
        if let Some(p) = cpu.running_mut() {
            p.set_priority(0);
        }
        for p in rq.iter_mut() {
            p.set_priority(0);
        }
        self.boost_timer_ms = 0;
        info!("t={} priority boost, {} waiting", now, rq.len());
    }
}

impl Policy for Mlfq {
    fn kind(&self) -> PolicyKind { PolicyKind::Mlfq }

    fn tick(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu, notifier: &mut dyn Notifier)
        -> Result<Tick, SchedError>
    {
        let mut tick = Tick::default();
        self.boost_timer_ms += self.tick_ms;

        match run_current(cpu, self.tick_ms) {
            Some(true) => tick.completed = retire(cpu, now, notifier),
            Some(false) => {
                let lowest = self.lowest_level();
                let demote_to = cpu.running().and_then(|p| {
                    if p.time_in_slice_ms() >= self.quantum_ms(p.priority()) {
                        Some((p.priority() + 1).min(lowest))
                    } else {
                        None
                    }
                });
                if let Some(level) = demote_to {
                    match preempt(cpu, rq, now, self.tick_ms, Some(level)) {
                        Ok(pid) => tick.preempted = pid,
                        Err(e) => {
                            self.boost_timer_ms -= self.tick_ms;
                            return Err(e);
                        }
                    }
                }
            }
            None => {}
        }

        if self.boost_timer_ms >= self.boost_interval_ms {
            self.boost(now, rq, cpu);
            tick.boosted = true;
        }

        if cpu.is_idle() {
            let next = rq.select_and_remove_min(|p| p.priority());
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
    use crate::process::{Process, ProcessStatus};

    fn mlfq() -> Mlfq {
        Mlfq::new(100, vec![250, 500, 1000], 5000)
    }

    #[test]
    fn quantum_follows_level() {
        let m = mlfq();
        assert_eq!(m.levels(), 3);
        assert_eq!(m.quantum_ms(0), 250);
        assert_eq!(m.quantum_ms(1), 500);
        assert_eq!(m.quantum_ms(2), 1000);
        assert_eq!(m.quantum_ms(7), 1000);
    }

    #[test]
    fn cpu_bound_process_sinks_to_last_level() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = Mlfq::new(100, vec![250, 500, 1000], 1_000_000);
        admit(&mut rq, &[100_000]);

        let mut now = 0;
        let mut demotions = Vec::new();
        while now <= 4000 {
            let t = m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
            if t.preempted.is_some() {
                demotions.push((now, cpu.running().unwrap().priority()));
            }
            now += 100;
        }
        // 250 ms quantum is only noticed at the 300 ms tick.
        assert_eq!(demotions[0], (300, 1));
        assert_eq!(demotions[1], (800, 2));
        assert_eq!(demotions[2], (1800, 2));
        assert!(demotions.iter().all(|&(_, level)| level <= 2));
    }

    #[test]
    fn higher_priority_waits_less() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = mlfq();
        admit(&mut rq, &[10_000]);

        for now in (0..300).step_by(100) {
            m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
        }
        rq.enqueue(Process::new(1, 1, 10_000)).unwrap();
        let t = m.tick(300, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(t.preempted, Some(0));
        assert_eq!(t.dispatched, Some(1));
        assert_eq!(rq.iter().next().unwrap().priority(), 1);
    }

    #[test]
    fn boost_resets_running_and_waiting() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = Mlfq::new(100, vec![100, 200, 400], 1000);
        admit(&mut rq, &[50_000, 50_000, 50_000]);

        let mut boosted_at = None;
        for now in (0..1000).step_by(100) {
            let t = m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
            if t.boosted {
                boosted_at = Some(now);
                assert_eq!(m.boost_timer_ms(), 0);
                assert!(cpu.running().map_or(true, |p| p.priority() == 0));
                assert!(rq.iter().all(|p| p.priority() == 0));
            } else {
                assert!(m.boost_timer_ms() < 1000);
            }
        }
        // the first call already counts as one elapsed tick
        assert_eq!(boosted_at, Some(900));
    }

    #[test]
    fn same_tick_demotion_is_undone_by_boost() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = Mlfq::new(100, vec![300, 600], 400);
        admit(&mut rq, &[50_000]);

        for now in (0..300).step_by(100) {
            m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
        }
        let t = m.tick(300, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(t.preempted, Some(0));
        assert!(t.boosted);
        assert_eq!(running(&cpu), Some(0));
        assert_eq!(cpu.running().unwrap().priority(), 0);
    }

    #[test]
    fn failed_demotion_leaves_level_and_boost_timer_alone() {
        let mut rq = ReadyQueue::with_limit(1);
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = mlfq();
        admit(&mut rq, &[10_000]);
        for now in (0..300).step_by(100) {
            m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
        }
        rq.enqueue(Process::new(1, 1, 10_000)).unwrap();
        let timer = m.boost_timer_ms();

        assert!(m.tick(300, &mut rq, &mut cpu, &mut out).is_err());
        assert_eq!(m.boost_timer_ms(), timer);
        {
            let p = cpu.running().unwrap();
            assert_eq!(p.pid(), 0);
            assert_eq!(p.priority(), 0);
            assert_eq!(p.elapsed_time_ms(), 200);
            assert_eq!(p.time_in_slice_ms(), 200);
            assert_eq!(p.status(), ProcessStatus::Running);
        }

        rq.set_limit(None);
        let t = m.tick(300, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(t.preempted, Some(0));
        assert_eq!(t.dispatched, Some(1));
        assert_eq!(rq.iter().next().unwrap().priority(), 1);
        assert_eq!(m.boost_timer_ms(), timer + 100);
    }

    #[test]
    fn completion_is_notified_once_and_frees_cpu() {
        let mut rq = ReadyQueue::new();
        let mut cpu = Cpu::new();
        let mut out = Outbox::new();
        let mut m = mlfq();
        admit(&mut rq, &[200]);

        for now in (0..=200).step_by(100) {
            m.tick(now, &mut rq, &mut cpu, &mut out).unwrap();
        }
        assert!(cpu.is_idle());
        assert_eq!(out.sent.len(), 1);
        assert_eq!(out.sent[0].1.time_ms, 200);
        m.tick(300, &mut rq, &mut cpu, &mut out).unwrap();
        assert_eq!(out.sent.len(), 1);
    }
}
