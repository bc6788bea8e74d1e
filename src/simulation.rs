use std::collections::HashMap;

use log::debug;
use rustc_serialize::json;
use rustc_serialize::{Encodable, Encoder};

use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::event::{Arrival, Arrivals};
use crate::notify::Outbox;
use crate::params::SchedulerParams;
use crate::policy::{self, Policy, PolicyKind, Tick};
use crate::process::Pid;
use crate::queue::ReadyQueue;

#[derive(Debug, Clone, PartialEq)]
pub struct SystemMetrics {
    pub policy: PolicyKind,
    /// Simulated time covered so far.
    pub time: u64,
    pub ticks: u64,
    pub n_admitted: usize,
    pub n_started: usize,
    pub n_completed: usize,
    pub sum_turnaround: u64,
    pub sum_response: u64,
    pub total_busy_time: u64,
    pub dispatches: usize,
    pub preemptions: usize,
    pub boosts: usize,
}

impl SystemMetrics {
    pub fn new(policy: PolicyKind) -> SystemMetrics {
        SystemMetrics {
            policy: policy, time: 0, ticks: 0, n_admitted: 0, n_started: 0, n_completed: 0,
            sum_turnaround: 0, sum_response: 0, total_busy_time: 0,
            dispatches: 0, preemptions: 0, boosts: 0,
        }
    }

    pub fn mean_turnaround(&self) -> f64 {
        mean(self.sum_turnaround, self.n_completed)
    }

    pub fn mean_response(&self) -> f64 {
        mean(self.sum_response, self.n_started)
    }

    pub fn utilisation(&self) -> f64 {
        if self.time == 0 { 0.0 } else { self.total_busy_time as f64 / self.time as f64 }
    }

    pub fn to_json(&self) -> Result<String, json::EncoderError> {
        json::encode(self)
    }
}

fn mean(sum: u64, n: usize) -> f64 {
    if n == 0 { 0.0 } else { sum as f64 / n as f64 }
}

impl Encodable for SystemMetrics {
    fn encode<S: Encoder>(&self, s: &mut S) -> Result<(), S::Error> {
        s.emit_struct("SystemMetrics", 15, |s| {
            s.emit_struct_field("policy", 0, |s| self.policy.to_string().encode(s))?;
            s.emit_struct_field("time", 1, |s| self.time.encode(s))?;
            s.emit_struct_field("ticks", 2, |s| self.ticks.encode(s))?;
            s.emit_struct_field("n_admitted", 3, |s| self.n_admitted.encode(s))?;
            s.emit_struct_field("n_started", 4, |s| self.n_started.encode(s))?;
            s.emit_struct_field("n_completed", 5, |s| self.n_completed.encode(s))?;
            s.emit_struct_field("sum_turnaround", 6, |s| self.sum_turnaround.encode(s))?;
            s.emit_struct_field("sum_response", 7, |s| self.sum_response.encode(s))?;
            s.emit_struct_field("total_busy_time", 8, |s| self.total_busy_time.encode(s))?;
            s.emit_struct_field("dispatches", 9, |s| self.dispatches.encode(s))?;
            s.emit_struct_field("preemptions", 10, |s| self.preemptions.encode(s))?;
            s.emit_struct_field("boosts", 11, |s| self.boosts.encode(s))?;
            s.emit_struct_field("mean_turnaround", 12, |s| self.mean_turnaround().encode(s))?;
            s.emit_struct_field("mean_response", 13, |s| self.mean_response().encode(s))?;
            s.emit_struct_field("utilisation", 14, |s| self.utilisation().encode(s))
        })
    }
}

/// Drives one policy tick by tick over a fixed set of arrivals.
pub struct Simulation {
    tick_ms: u64,
    now: u64,
    policy: Box<dyn Policy>,
    pub rq: ReadyQueue,
    pub cpu: Cpu,
    outbox: Outbox,
    arrivals: Arrivals,
    arrived_at: HashMap<Pid, u64>,
    unstarted: HashMap<Pid, u64>,
    pub metrics: SystemMetrics,
}

impl Simulation {
    pub fn new<I>(params: &SchedulerParams, arrivals: I) -> Result<Simulation, SchedError>
        where I: IntoIterator<Item = Arrival>
    {
        let policy = policy::build(params)?;
        Ok(Simulation {
            tick_ms: params.tick_ms,
            now: 0,
            metrics: SystemMetrics::new(policy.kind()),
            policy: policy,
            rq: match params.ready_queue_limit {
                Some(limit) => ReadyQueue::with_limit(limit),
                None => ReadyQueue::new(),
            },
            cpu: Cpu::new(),
            outbox: Outbox::new(),
            arrivals: arrivals.into_iter().collect(),
            arrived_at: HashMap::new(),
            unstarted: HashMap::new(),
        })
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_finished(&self) -> bool {
        self.arrivals.is_empty() && self.rq.is_empty() && self.cpu.is_idle()
    }

    /// Admits what has arrived, runs the policy for the current tick and
    /// advances the clock.
    pub fn step(&mut self) -> Result<Tick, SchedError> {
        let now = self.now;
        while let Some(a) = self.arrivals.pop_due(now) {
            if let Err(e) = self.rq.enqueue(a.into_process()) {
                // keep it pending so a later step can admit it
                self.arrivals.push(a);
                return Err(e.into());
            }
            self.arrived_at.insert(a.pid, a.at_ms);
            self.unstarted.insert(a.pid, a.at_ms);
            self.metrics.n_admitted += 1;
            debug!("t={} admitted pid {} ({} ms)", now, a.pid, a.total_time_ms);
        }

        let tick = self.policy.tick(now, &mut self.rq, &mut self.cpu, &mut self.outbox)?;

        if let Some(pid) = tick.dispatched {
            self.metrics.dispatches += 1;
            if let Some(at) = self.unstarted.remove(&pid) {
                self.metrics.sum_response += now - at;
                self.metrics.n_started += 1;
            }
        }
        if tick.preempted.is_some() {
            self.metrics.preemptions += 1;
        }
        if tick.boosted {
            self.metrics.boosts += 1;
        }
        for (_, c) in self.outbox.drain() {
            if let Some(at) = self.arrived_at.remove(&c.pid) {
                self.metrics.sum_turnaround += c.time_ms - at;
                self.metrics.n_completed += 1;
            }
        }

        self.now += self.tick_ms;
        self.metrics.ticks += 1;
        self.metrics.time = self.now;
        self.metrics.total_busy_time = self.cpu.total_busy_time;
        Ok(tick)
    }

    /// Steps until everything admitted has finished or `max_ticks` ran out.
    pub fn run(&mut self, max_ticks: u64) -> Result<&SystemMetrics, SchedError> {
        let mut ticks = 0;
        while !self.is_finished() && ticks < max_ticks {
            self.step()?;
            ticks += 1;
        }
        Ok(&self.metrics)
    }
}

pub fn run<I>(params: &SchedulerParams, arrivals: I, max_ticks: u64) -> Result<SystemMetrics, SchedError>
    where I: IntoIterator<Item = Arrival>
{
    let mut sim = Simulation::new(params, arrivals)?;
    sim.run(max_ticks)?;
    Ok(sim.metrics)
}
