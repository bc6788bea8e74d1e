//! Scheduling policies.
//!
//! Each policy is invoked once per tick. It first charges the tick to the
//! running process (retiring or preempting it as its rules say) and then,
//! if the CPU is free, picks the next process from the ready queue.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::cpu::Cpu;
use crate::error::SchedError;
use crate::notify::{Completion, Notifier};
use crate::params::SchedulerParams;
use crate::process::{Pid, Process};
use crate::queue::ReadyQueue;

pub mod fifo;
pub mod mlfq;
pub mod rr;
pub mod sjf;

pub use self::fifo::Fifo;
pub use self::mlfq::Mlfq;
pub use self::rr::RoundRobin;
pub use self::sjf::Sjf;

/// What a policy did during one tick.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct Tick {
    pub completed: Option<Pid>,
    pub preempted: Option<Pid>,
    pub dispatched: Option<Pid>,
    pub boosted: bool,
}

pub trait Policy {
    fn kind(&self) -> PolicyKind;

    fn tick(&mut self, now: u64, rq: &mut ReadyQueue, cpu: &mut Cpu, notifier: &mut dyn Notifier)
        -> Result<Tick, SchedError>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PolicyKind {
    Fifo, Sjf, RoundRobin, Mlfq
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<PolicyKind, String> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" | "fcfs" => Ok(PolicyKind::Fifo),
            "sjf" => Ok(PolicyKind::Sjf),
            "rr" | "round-robin" => Ok(PolicyKind::RoundRobin),
            "mlfq" => Ok(PolicyKind::Mlfq),
            _ => Err(format!("unknown policy `{}`", s)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Sjf => "sjf",
            PolicyKind::RoundRobin => "rr",
            PolicyKind::Mlfq => "mlfq",
        };
        f.write_str(name)
    }
}

pub fn build(params: &SchedulerParams) -> Result<Box<dyn Policy>, SchedError> {
    params.validate()?;
    let policy: Box<dyn Policy> = match params.policy {
        PolicyKind::Fifo => Box::new(Fifo::new(params.tick_ms)),
        PolicyKind::Sjf => Box::new(Sjf::new(params.tick_ms)),
        PolicyKind::RoundRobin => Box::new(RoundRobin::new(params.tick_ms, params.rr_quantum_ms)),
        PolicyKind::Mlfq => Box::new(Mlfq::new(
            params.tick_ms,
            params.mlfq_quanta_ms.clone(),
            params.mlfq_boost_interval_ms,
        )),
    };
    Ok(policy)
}

/// Charges one tick to the running process, if any. Returns whether the
/// process has now used up its total time.
fn run_current(cpu: &mut Cpu, tick_ms: u64) -> Option<bool> {
    let p = cpu.running_mut()?;
    p.run_for(tick_ms);
    let done = p.is_complete();
    cpu.total_busy_time += tick_ms;
    Some(done)
}

/// Takes the finished process off the CPU, tells its owner and drops it.
/// A failed delivery is logged; the process is retired regardless.
fn retire(cpu: &mut Cpu, now: u64, notifier: &mut dyn Notifier) -> Option<Pid> {
    let mut p = cpu.take()?;
    p.terminate();
    let pid = p.pid();
    info!("t={} pid {} done after {} ms", now, pid, p.elapsed_time_ms());
    if let Err(e) = notifier.notify(p.channel(), Completion::done(pid, now)) {
        warn!("t={} completion for pid {} not delivered: {}", now, pid, e);
    }
    Some(pid)
}

/// Moves the running process back to the tail of the ready queue, dropping
/// it to `level` first if one is given. If the queue cannot take it, the
/// tick charged to it is undone, it goes back on the CPU as it was and the
/// tick fails.
fn preempt(cpu: &mut Cpu, rq: &mut ReadyQueue, now: u64, tick_ms: u64, level: Option<usize>)
    -> Result<Option<Pid>, SchedError>
{
    let mut p = match cpu.take() {
        Some(p) => p,
        None => return Ok(None),
    };
    let (slice, priority) = (p.time_in_slice_ms(), p.priority());
    if let Some(level) = level {
        p.set_priority(level);
    }
    p.yield_cpu();
    let pid = p.pid();
    if let Err(e) = rq.enqueue(p) {
        let source = e.source.clone();
        let mut p = e.into_process();
        p.undo_tick(tick_ms, slice, priority);
        cpu.restore(p);
        cpu.total_busy_time = cpu.total_busy_time.saturating_sub(tick_ms);
        warn!("t={} pid {} could not be re-enqueued: {}", now, pid, source);
        return Err(SchedError::Enqueue { now: now, pid: pid, source: source });
    }
    debug!("t={} pid {} preempted, {} waiting", now, pid, rq.len());
    Ok(Some(pid))
}

fn dispatch(cpu: &mut Cpu, next: Option<Process>, now: u64) -> Option<Pid> {
    let p = next?;
    let pid = p.pid();
    debug!("t={} pid {} dispatched (priority {})", now, pid, p.priority());
    cpu.dispatch(p, now);
    Some(pid)
}
