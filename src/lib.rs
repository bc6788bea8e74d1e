//! Tick-driven CPU scheduling simulator.
//!
//! A `ReadyQueue` of waiting processes and a single `Cpu` slot are handed to
//! one `Policy` per tick (FIFO, SJF, round robin or MLFQ), which retires,
//! preempts and dispatches processes and notifies owners on completion.

pub mod cpu;
pub mod error;
pub mod event;
pub mod notify;
pub mod params;
pub mod policy;
pub mod process;
pub mod queue;
pub mod simulation;
pub mod workload;

pub use crate::cpu::{Cpu, CpuState};
pub use crate::error::{EnqueueCause, EnqueueError, SchedError};
pub use crate::event::Arrival;
pub use crate::notify::{ChannelId, Completion, CompletionKind, Mailboxes, Notifier, NotifyError, Outbox};
pub use crate::params::{ParamsError, SchedulerParams, WorkloadParams};
pub use crate::policy::{Fifo, Mlfq, Policy, PolicyKind, RoundRobin, Sjf, Tick};
pub use crate::process::{Pid, Process, ProcessStatus};
pub use crate::queue::ReadyQueue;
pub use crate::simulation::{Simulation, SystemMetrics};
