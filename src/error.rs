use std::collections::TryReserveError;

use thiserror::Error;

use crate::params::ParamsError;
use crate::process::{Pid, Process};

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum EnqueueCause {
    #[error("ready queue is at its limit of {0} records")]
    AtLimit(usize),
    #[error(transparent)]
    Alloc(#[from] TryReserveError),
}

/// A record the ready queue could not take. The record travels back to the
/// caller so it is never dropped on the floor.
#[derive(Debug, Error)]
#[error("ready queue could not admit pid {}", .process.pid())]
pub struct EnqueueError {
    pub process: Process,
    #[source]
    pub source: EnqueueCause,
}

impl EnqueueError {
    pub fn into_process(self) -> Process {
        self.process
    }
}

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("tick at {now} ms failed: could not re-enqueue pid {pid}")]
    Enqueue {
        now: u64,
        pid: Pid,
        #[source]
        source: EnqueueCause,
    },
    #[error("admission failed")]
    Admit(#[from] EnqueueError),
    #[error(transparent)]
    Params(#[from] ParamsError),
}
