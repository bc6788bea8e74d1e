use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_serialize::json;
use rustc_serialize::{Decodable, Decoder};
use thiserror::Error;

use crate::policy::PolicyKind;

pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_RR_QUANTUM_MS: u64 = 500;
pub const DEFAULT_MLFQ_QUANTA_MS: [u64; 3] = [250, 500, 1000];
pub const DEFAULT_MLFQ_BOOST_INTERVAL_MS: u64 = 5000;

/// Longest service time a generated workload may ask for: one day.
pub const MAX_SERVICE_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decoding parameters")]
    Decode(#[from] json::DecoderError),
    #[error("tick_ms must be positive")]
    ZeroTick,
    #[error("rr_quantum_ms must be positive")]
    ZeroQuantum,
    #[error("mlfq_quanta_ms needs at least one level")]
    NoLevels,
    #[error("mlfq_quanta_ms must be positive and strictly increasing, got {0:?}")]
    QuantaNotIncreasing(Vec<u64>),
    #[error("mlfq_boost_interval_ms must be positive")]
    ZeroBoostInterval,
    #[error("ready_queue_limit must be positive when set")]
    ZeroQueueLimit,
    #[error("workload needs a positive service mean")]
    ZeroServiceMean,
    #[error("service times must be at most {} ms, got mean {mean} and minimum {min}", MAX_SERVICE_MS)]
    ServiceOutOfRange { mean: f64, min: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerParams {
    pub policy: PolicyKind,
    pub tick_ms: u64,
    pub rr_quantum_ms: u64,
    pub mlfq_quanta_ms: Vec<u64>,
    pub mlfq_boost_interval_ms: u64,
    /// Most processes that may wait at once; unbounded when `None`.
    pub ready_queue_limit: Option<usize>,
}

impl Default for SchedulerParams {
    fn default() -> SchedulerParams {
        SchedulerParams {
            policy: PolicyKind::Fifo,
            tick_ms: DEFAULT_TICK_MS,
            rr_quantum_ms: DEFAULT_RR_QUANTUM_MS,
            mlfq_quanta_ms: DEFAULT_MLFQ_QUANTA_MS.to_vec(),
            mlfq_boost_interval_ms: DEFAULT_MLFQ_BOOST_INTERVAL_MS,
            ready_queue_limit: None,
        }
    }
}

impl SchedulerParams {
    pub fn from_json(s: &str) -> Result<SchedulerParams, ParamsError> {
        let params: SchedulerParams = json::decode(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<SchedulerParams, ParamsError> {
        SchedulerParams::from_json(&read(path.as_ref())?)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.tick_ms == 0 {
            return Err(ParamsError::ZeroTick);
        }
        if self.rr_quantum_ms == 0 {
            return Err(ParamsError::ZeroQuantum);
        }
        if self.mlfq_quanta_ms.is_empty() {
            return Err(ParamsError::NoLevels);
        }
        let increasing = self.mlfq_quanta_ms[0] > 0 &&
            self.mlfq_quanta_ms.windows(2).all(|w| w[0] < w[1]);
        if !increasing {
            return Err(ParamsError::QuantaNotIncreasing(self.mlfq_quanta_ms.clone()));
        }
        if self.mlfq_boost_interval_ms == 0 {
            return Err(ParamsError::ZeroBoostInterval);
        }
        if self.ready_queue_limit == Some(0) {
            return Err(ParamsError::ZeroQueueLimit);
        }
        Ok(())
    }
}

// Every field is optional in the JSON document.
impl Decodable for SchedulerParams {
    fn decode<D: Decoder>(d: &mut D) -> Result<SchedulerParams, D::Error> {
        d.read_struct("SchedulerParams", 6, |d| {
            let dflt = SchedulerParams::default();
            let policy: Option<String> = d.read_struct_field("policy", 0, Decodable::decode)?;
            let policy = match policy {
                Some(name) => match name.parse::<PolicyKind>() {
                    Ok(kind) => kind,
                    Err(e) => return Err(d.error(&e)),
                },
                None => dflt.policy,
            };
            let tick_ms: Option<u64> = d.read_struct_field("tick_ms", 1, Decodable::decode)?;
            let rr_quantum_ms: Option<u64> = d.read_struct_field("rr_quantum_ms", 2, Decodable::decode)?;
            let mlfq_quanta_ms: Option<Vec<u64>> =
                d.read_struct_field("mlfq_quanta_ms", 3, Decodable::decode)?;
            let mlfq_boost_interval_ms: Option<u64> =
                d.read_struct_field("mlfq_boost_interval_ms", 4, Decodable::decode)?;
            let ready_queue_limit: Option<usize> =
                d.read_struct_field("ready_queue_limit", 5, Decodable::decode)?;
            Ok(SchedulerParams {
                policy: policy,
                tick_ms: tick_ms.unwrap_or(dflt.tick_ms),
                rr_quantum_ms: rr_quantum_ms.unwrap_or(dflt.rr_quantum_ms),
                mlfq_quanta_ms: mlfq_quanta_ms.unwrap_or(dflt.mlfq_quanta_ms),
                mlfq_boost_interval_ms: mlfq_boost_interval_ms.unwrap_or(dflt.mlfq_boost_interval_ms),
                ready_queue_limit: ready_queue_limit.or(dflt.ready_queue_limit),
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadParams {
    pub n_processes: usize,
    pub arrival_window_ms: u64,
    pub service_mean_ms: f64,
    pub service_min_ms: u64,
}

impl Default for WorkloadParams {
    fn default() -> WorkloadParams {
        WorkloadParams {
            n_processes: 10,
            arrival_window_ms: 5000,
            service_mean_ms: 1500.0,
            service_min_ms: 100,
        }
    }
}

impl WorkloadParams {
    pub fn from_json(s: &str) -> Result<WorkloadParams, ParamsError> {
        let params: WorkloadParams = json::decode(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<WorkloadParams, ParamsError> {
        WorkloadParams::from_json(&read(path.as_ref())?)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.service_mean_ms > 0.0) {
            return Err(ParamsError::ZeroServiceMean);
        }
        if !(self.service_mean_ms <= MAX_SERVICE_MS as f64) || self.service_min_ms > MAX_SERVICE_MS {
            return Err(ParamsError::ServiceOutOfRange {
                mean: self.service_mean_ms,
                min: self.service_min_ms,
            });
        }
        Ok(())
    }
}

impl Decodable for WorkloadParams {
    fn decode<D: Decoder>(d: &mut D) -> Result<WorkloadParams, D::Error> {
        d.read_struct("WorkloadParams", 4, |d| {
            let dflt = WorkloadParams::default();
            let n_processes: Option<usize> = d.read_struct_field("n_processes", 0, Decodable::decode)?;
            let arrival_window_ms: Option<u64> =
                d.read_struct_field("arrival_window_ms", 1, Decodable::decode)?;
            let service_mean_ms: Option<f64> =
                d.read_struct_field("service_mean_ms", 2, Decodable::decode)?;
            let service_min_ms: Option<u64> = d.read_struct_field("service_min_ms", 3, Decodable::decode)?;
            Ok(WorkloadParams {
                n_processes: n_processes.unwrap_or(dflt.n_processes),
                arrival_window_ms: arrival_window_ms.unwrap_or(dflt.arrival_window_ms),
                service_mean_ms: service_mean_ms.unwrap_or(dflt.service_mean_ms),
                service_min_ms: service_min_ms.unwrap_or(dflt.service_min_ms),
            })
        })
    }
}

fn read(path: &Path) -> Result<String, ParamsError> {
    fs::read_to_string(path).map_err(|e| ParamsError::Io { path: path.to_path_buf(), source: e })
}
