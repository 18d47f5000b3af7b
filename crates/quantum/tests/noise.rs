use lattice::{StateTensor, C64};
use quantum::noise::{apply_decoherence, simulate_decoherence};
use quantum::{QuantumWalk, WalkConfig, WalkError};
use rng::ONDRng;

fn c(re: f64, im: f64) -> C64 {
    C64::new(re, im)
}

/// Configurations 1 and 2 carry weights 0.2 and 0.8; 0 and 3 are empty.
fn uneven() -> StateTensor {
    let mut t = StateTensor::zeros(4, &[4]);
    t.set(1, 0, c(0.2f64.sqrt(), 0.0));
    t.set(2, 1, c(0.0, 0.4f64.sqrt()));
    t.set(2, 2, c(0.4f64.sqrt(), 0.0));
    t
}

fn max_diff(a: &StateTensor, b: &StateTensor) -> f64 {
    a.data
        .iter()
        .zip(&b.data)
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

#[test]
fn zero_rate_leaves_state() {
    let mut rng = ONDRng::new(b"noise");
    let before = uneven();

    let mut psi = before.clone();
    apply_decoherence(&mut psi, 0.0, &mut rng).unwrap();
    assert!(max_diff(&psi, &before) < 1e-12);

    simulate_decoherence(&mut psi, 0.0, &mut rng).unwrap();
    assert!(max_diff(&psi, &before) < 1e-12);
}

#[test]
fn full_rate_keeps_slice_weights() {
    let mut rng = ONDRng::new(b"noise");
    let before = uneven();
    let mut psi = before.clone();

    apply_decoherence(&mut psi, 1.0, &mut rng).unwrap();

    assert!(max_diff(&psi, &before) > 1e-6);
    assert!((psi.norm_sqr() - 1.0).abs() < 1e-12);
    assert!((psi.slice_norm_sqr(1) - 0.2).abs() < 1e-12);
    assert!((psi.slice_norm_sqr(2) - 0.8).abs() < 1e-12);
    assert_eq!(psi.slice_norm_sqr(0), 0.0);
    assert_eq!(psi.slice_norm_sqr(3), 0.0);
    // every element of a populated slice was kicked
    assert!(psi.slice(1).iter().all(|v| v.norm() > 0.0));
}

#[test]
fn dephasing_changes_phases_and_normalizes() {
    let mut rng = ONDRng::new(b"dephase");
    let before = uneven();
    let mut psi = before.clone();

    simulate_decoherence(&mut psi, 1.0, &mut rng).unwrap();

    assert!((psi.norm_sqr() - 1.0).abs() < 1e-12);
    assert!(max_diff(&psi, &before) > 1e-6);
    // each slice is scaled by one complex factor, so positions inside a
    // slice keep their relative magnitudes
    let ratio = psi.get(2, 1).norm() / psi.get(2, 2).norm();
    assert!((ratio - 1.0).abs() < 1e-12);
    // damping is at most exp(-0.05) per slice before renormalizing
    let w1 = psi.slice_norm_sqr(1);
    assert!(w1 > 0.2 * (-0.1f64).exp() - 1e-12 && w1 < 0.2 * (0.1f64).exp() + 1e-12);
    assert_eq!(psi.slice_norm_sqr(0), 0.0);
}

#[test]
fn invalid_rates_are_rejected() {
    let mut rng = ONDRng::new(b"noise");
    let before = uneven();
    let mut psi = before.clone();

    for rate in [-0.1, 1.5, f64::NAN] {
        assert!(matches!(
            apply_decoherence(&mut psi, rate, &mut rng),
            Err(WalkError::InvalidArgument(_))
        ));
        assert!(matches!(
            simulate_decoherence(&mut psi, rate, &mut rng),
            Err(WalkError::InvalidArgument(_))
        ));
    }
    assert_eq!(psi, before);
}

#[test]
fn zero_norm_state_is_a_normalization_error() {
    let mut rng = ONDRng::new(b"noise");
    let mut psi = StateTensor::zeros(4, &[3]);

    assert!(matches!(
        apply_decoherence(&mut psi, 0.5, &mut rng),
        Err(WalkError::Normalization(_))
    ));
    assert!(matches!(
        simulate_decoherence(&mut psi, 0.5, &mut rng),
        Err(WalkError::Normalization(_))
    ));
    assert_eq!(psi, StateTensor::zeros(4, &[3]));
}

#[test]
fn same_seed_same_noise() {
    let mut a = uneven();
    let mut b = uneven();
    apply_decoherence(&mut a, 0.5, &mut ONDRng::new(b"twin")).unwrap();
    apply_decoherence(&mut b, 0.5, &mut ONDRng::new(b"twin")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn walk_decoherence_is_atomic() {
    let mut w = QuantumWalk::with_rng(WalkConfig::new(5, 2), Box::new(ONDRng::new(b"walk")))
        .unwrap();
    w.step().unwrap();
    let before = w.state().clone();

    assert!(w.apply_decoherence(2.0).is_err());
    assert!(w.simulate_decoherence(-1.0).is_err());
    assert_eq!(w.state(), &before);

    w.simulate_decoherence(0.5).unwrap();
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-12);
}
