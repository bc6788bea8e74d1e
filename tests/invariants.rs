use std::collections::HashMap;

use proptest::prelude::*;

use schedsim::{Arrival, PolicyKind, Process, ReadyQueue, SchedulerParams, Simulation};

const TICK: u64 = 100;

fn policy_kind() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Fifo),
        Just(PolicyKind::Sjf),
        Just(PolicyKind::RoundRobin),
        Just(PolicyKind::Mlfq),
    ]
}

fn arrivals() -> impl Strategy<Value = Vec<Arrival>> {
    prop::collection::vec((0u64..30, 1u64..40), 1..12).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(pid, (at, total))| Arrival::new(at * TICK, pid, pid as u32, total * TICK))
            .collect()
    })
}

fn params(policy: PolicyKind) -> SchedulerParams {
    SchedulerParams {
        policy: policy,
        tick_ms: TICK,
        rr_quantum_ms: 300,
        mlfq_quanta_ms: vec![200, 400, 800],
        mlfq_boost_interval_ms: 2000,
        ready_queue_limit: None,
    }
}

proptest! {
    #[test]
    fn min_selection_takes_first_minimum(keys in prop::collection::vec(0u64..5, 0..20)) {
        let mut rq = ReadyQueue::new();
        for (pid, &k) in keys.iter().enumerate() {
            rq.enqueue(Process::new(pid, 0, k)).unwrap();
        }
        let expected = keys.iter().min().and_then(|m| keys.iter().position(|k| k == m));
        let got = rq.select_and_remove_min(|p| p.total_time_ms()).map(|p| p.pid());
        prop_assert_eq!(got, expected);
        prop_assert_eq!(rq.len(), keys.len().saturating_sub(1));
    }

    #[test]
    fn every_tick_keeps_scheduler_invariants(kind in policy_kind(), arrivals in arrivals()) {
        let p = params(kind);
        let totals: HashMap<usize, u64> = arrivals.iter().map(|a| (a.pid, a.total_time_ms)).collect();
        let mut sim = Simulation::new(&p, arrivals.clone()).unwrap();
        let mut elapsed: HashMap<usize, u64> = HashMap::new();
        let mut completed: HashMap<usize, usize> = HashMap::new();

        let mut ticks = 0;
        while !sim.is_finished() {
            prop_assert!(ticks < 10_000);
            let before = sim.cpu.running().map(|r| (r.pid(), r.elapsed_time_ms()));
            let t = sim.step().unwrap();
            ticks += 1;

            // mutual exclusion
            if let Some(r) = sim.cpu.running() {
                prop_assert!(!sim.rq.contains(r.pid()));
            }
            let alive = sim.rq.len() + if sim.cpu.is_idle() { 0 } else { 1 };
            prop_assert_eq!(alive, sim.metrics.n_admitted - sim.metrics.n_completed);

            // elapsed never goes backwards
            for q in sim.rq.iter().chain(sim.cpu.running()) {
                let last = elapsed.insert(q.pid(), q.elapsed_time_ms()).unwrap_or(0);
                prop_assert!(q.elapsed_time_ms() >= last);
                prop_assert!(q.elapsed_time_ms() < q.total_time_ms());
            }

            // completion fires once, the first tick elapsed reaches total
            if let Some(pid) = t.completed {
                *completed.entry(pid).or_insert(0) += 1;
                let (was_running, prev) = before.unwrap();
                prop_assert_eq!(was_running, pid);
                prop_assert!(prev < totals[&pid]);
                prop_assert!(prev + TICK >= totals[&pid]);
            }

            match kind {
                PolicyKind::RoundRobin => {
                    if let Some(r) = sim.cpu.running() {
                        prop_assert!(r.time_in_slice_ms() <= p.rr_quantum_ms);
                    }
                }
                PolicyKind::Mlfq => {
                    for q in sim.rq.iter().chain(sim.cpu.running()) {
                        prop_assert!(q.priority() < p.mlfq_quanta_ms.len());
                    }
                    if t.boosted {
                        for q in sim.rq.iter().chain(sim.cpu.running()) {
                            prop_assert_eq!(q.priority(), 0);
                        }
                    }
                }
                PolicyKind::Sjf => {
                    if t.dispatched.is_some() {
                        let chosen = sim.cpu.running().unwrap().total_time_ms();
                        prop_assert!(sim.rq.iter().all(|q| q.total_time_ms() >= chosen));
                    }
                }
                PolicyKind::Fifo => {
                    prop_assert!(t.preempted.is_none());
                }
            }
        }

        prop_assert_eq!(completed.len(), totals.len());
        prop_assert!(completed.values().all(|&n| n == 1));
    }
}
