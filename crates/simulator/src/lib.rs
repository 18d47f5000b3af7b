use std::time::Instant;

use log::info;
use quantum::{QuantumWalk, WalkConfig, WalkResult};
use rng::ONDRng;

mod ensemble;
pub mod output;
mod sweep;
pub use ensemble::{ensemble_distribution, run_trajectory};
pub use sweep::{decoherence_sweep, spread, SweepRow};

/// Time `steps` full walk steps on a single seeded trajectory. Returns the
/// elapsed wall-clock seconds.
pub fn benchmark(config: &WalkConfig, steps: usize) -> WalkResult<f64> {
    let mut walk = QuantumWalk::with_rng(config.clone(), Box::new(ONDRng::new(b"benchmark")))?;

    let start = Instant::now();
    for _ in 0..steps {
        walk.step()?;
    }
    let elapsed = start.elapsed().as_secs_f64();

    info!(
        "benchmark: {} particles, {} positions^{}, {:?}, {} steps -> {:.3} s",
        config.num_particles,
        config.num_positions,
        config.dimension,
        config.topology,
        steps,
        elapsed
    );
    Ok(elapsed)
}
