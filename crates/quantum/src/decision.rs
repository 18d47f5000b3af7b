use log::{info, warn};

use crate::error::{WalkError, WalkResult};
use crate::measurement::Distribution;

/// Boost for positions with above-average utility during feedback.
pub const FEEDBACK_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Flat position index.
    pub position: usize,
    /// Utility-weighted probability of the chosen position.
    pub score: f64,
    /// Whether the score reached the threshold within the feedback budget.
    pub threshold_met: bool,
    /// Feedback rounds that were run before deciding.
    pub rounds: usize,
}

/// Pick a position from utility-weighted probabilities.
///
/// Scores are `p(x) · utility(x, p(x))`. While the best score stays below
/// `threshold`, up to `feedback_iterations` rounds of
/// [`feedback_adjustment`] are applied. Without a hit, the best adjusted
/// score wins anyway.
pub fn quantum_decision_making<U>(
    probabilities: &Distribution,
    utility: U,
    threshold: f64,
    feedback_iterations: usize,
) -> WalkResult<Decision>
where
    U: Fn(usize, f64) -> f64,
{
    if probabilities.is_empty() {
        return Err(WalkError::InvalidArgument(
            "cannot decide over an empty distribution".into(),
        ));
    }

    let utilities: Vec<f64> = probabilities
        .values
        .iter()
        .enumerate()
        .map(|(pos, &p)| utility(pos, p))
        .collect();
    if let Some(bad) = utilities.iter().position(|u| !u.is_finite()) {
        return Err(WalkError::InvalidArgument(format!(
            "utility for position {} is {}",
            bad, utilities[bad]
        )));
    }

    let mut scores = Distribution {
        shape: probabilities.shape.clone(),
        values: probabilities
            .values
            .iter()
            .zip(&utilities)
            .map(|(p, u)| p * u)
            .collect(),
    };

    for round in 0..feedback_iterations {
        if let Some(best) = scores.argmax() {
            if scores.values[best] >= threshold {
                info!(
                    "decision: position {} with score {:.4}",
                    best, scores.values[best]
                );
                return Ok(Decision {
                    position: best,
                    score: scores.values[best],
                    threshold_met: true,
                    rounds: round,
                });
            }
        }
        feedback_adjustment(&mut scores.values, &utilities)?;
    }

    let best = scores.argmax().unwrap_or(0);
    let threshold_met = scores.values[best] >= threshold;
    if !threshold_met {
        warn!(
            "decision threshold {} not met, falling back to position {} ({:.4})",
            threshold, best, scores.values[best]
        );
    }
    Ok(Decision {
        position: best,
        score: scores.values[best],
        threshold_met,
        rounds: feedback_iterations,
    })
}

/// Add [`FEEDBACK_STEP`] to scores whose utility is above the mean, subtract
/// half of it elsewhere, then divide by the new sum.
pub fn feedback_adjustment(scores: &mut [f64], utilities: &[f64]) -> WalkResult<()> {
    if scores.len() != utilities.len() || scores.is_empty() {
        return Err(WalkError::InvalidArgument(format!(
            "{} scores vs {} utilities",
            scores.len(),
            utilities.len()
        )));
    }

    let mean = utilities.iter().sum::<f64>() / utilities.len() as f64;
    let mut adjusted: Vec<f64> = scores
        .iter()
        .zip(utilities)
        .map(|(&s, &u)| {
            if u > mean {
                s + FEEDBACK_STEP
            } else {
                s - FEEDBACK_STEP * 0.5
            }
        })
        .collect();

    let total: f64 = adjusted.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(WalkError::Normalization(format!(
            "feedback scores sum to {}",
            total
        )));
    }
    for s in &mut adjusted {
        *s /= total;
    }
    scores.copy_from_slice(&adjusted);
    Ok(())
}
