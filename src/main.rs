use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use schedsim::{simulation, workload, PolicyKind, SchedulerParams, WorkloadParams};

/// Runs a generated workload through one scheduling policy and prints the
/// resulting metrics as JSON.
#[derive(Parser, Debug)]
#[command(name = "schedsim", version)]
struct Args {
    /// fifo, sjf, rr or mlfq; overrides the config file
    #[arg(short, long)]
    policy: Option<PolicyKind>,

    /// Scheduler parameters (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workload parameters (JSON)
    #[arg(short, long)]
    workload: Option<PathBuf>,

    /// Overrides the number of generated processes
    #[arg(short = 'n', long)]
    processes: Option<usize>,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut params = match args.config {
        Some(ref path) => SchedulerParams::load(path)
            .with_context(|| format!("loading scheduler config {}", path.display()))?,
        None => SchedulerParams::default(),
    };
    if let Some(policy) = args.policy {
        params.policy = policy;
    }
    let mut wl = match args.workload {
        Some(ref path) => WorkloadParams::load(path)
            .with_context(|| format!("loading workload {}", path.display()))?,
        None => WorkloadParams::default(),
    };
    if let Some(n) = args.processes {
        wl.n_processes = n;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let arrivals = workload::generate(&wl, params.tick_ms, &mut rng);
    info!("{} processes under {}, tick {} ms", arrivals.len(), params.policy, params.tick_ms);

    let metrics = simulation::run(&params, arrivals, args.max_ticks)?;
    println!("{}", metrics.to_json()?);
    Ok(())
}
