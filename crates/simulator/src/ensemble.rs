use quantum::{Distribution, QuantumWalk, WalkConfig, WalkError, WalkResult};
use rayon::prelude::*;
use rng::ONDRng;

/// One trajectory: a fresh walk on its own forked stream, stepped `steps`
/// times, then measured.
pub fn run_trajectory(
    config: &WalkConfig,
    steps: usize,
    seed: &str,
    index: usize,
) -> WalkResult<Distribution> {
    let rng = ONDRng::fork(seed, "traj", index);
    let mut walk = QuantumWalk::with_rng(config.clone(), Box::new(rng))?;
    for _ in 0..steps {
        walk.step()?;
    }
    Ok(walk.measure())
}

/// Mean position distribution over `trajectories` independent walks.
///
/// Trajectories run in parallel; each walk stays on one thread. Results are
/// summed in trajectory order, so the output only depends on `seed`.
pub fn ensemble_distribution(
    config: &WalkConfig,
    steps: usize,
    trajectories: usize,
    seed: &str,
) -> WalkResult<Distribution> {
    if trajectories == 0 {
        return Err(WalkError::InvalidArgument(
            "ensemble needs at least one trajectory".into(),
        ));
    }
    config.validate()?;

    let runs: Vec<Distribution> = (0..trajectories)
        .into_par_iter()
        .map(|t| run_trajectory(config, steps, seed, t))
        .collect::<WalkResult<Vec<_>>>()?;

    let mut mean = Distribution {
        shape: runs[0].shape.clone(),
        values: vec![0.0; runs[0].len()],
    };
    for run in &runs {
        for (m, p) in mean.values.iter_mut().zip(&run.values) {
            *m += p;
        }
    }
    for m in &mut mean.values {
        *m /= trajectories as f64;
    }

    Ok(mean)
}
