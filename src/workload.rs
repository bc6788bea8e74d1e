use rand::Rng;

use crate::event::Arrival;
use crate::notify::ChannelId;
use crate::params::{WorkloadParams, MAX_SERVICE_MS};

/// Draws `n_processes` arrivals: arrival times uniform over the window,
/// service times exponential around the configured mean. Service times are
/// rounded up to whole ticks and capped at `MAX_SERVICE_MS`, whatever the
/// parameters say. Each process gets its own channel.
pub fn generate<R: Rng>(params: &WorkloadParams, tick_ms: u64, rng: &mut R) -> Vec<Arrival> {
    let tick_ms = tick_ms.max(1);
    let mut arrivals = Vec::with_capacity(params.n_processes);
    for pid in 0..params.n_processes {
        let at_ms = if params.arrival_window_ms == 0 {
            0
        } else {
            rng.gen_range(0..params.arrival_window_ms)
        };
        let service = sample_exp(params.service_mean_ms, rng)
            .max(params.service_min_ms as f64)
            .min(MAX_SERVICE_MS as f64);
        let ticks = (service / tick_ms as f64).ceil().max(1.0) as u64;
        arrivals.push(Arrival::new(at_ms, pid, pid as ChannelId, ticks.saturating_mul(tick_ms)));
    }
    arrivals
}

// Inverse-CDF draw from an exponential distribution.
fn sample_exp<R: Rng>(mean: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    -mean * (1.0 - u).ln()
}
