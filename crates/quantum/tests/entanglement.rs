use lattice::{StateTensor, C64};
use quantum::entanglement::{self, TeleportationOutcome};
use quantum::{
    ControlOp, OperationType, QuantumWalk, UnknownOperationPolicy, WalkConfig, WalkError,
};
use rng::ONDRng;

fn walk(cfg: WalkConfig) -> QuantumWalk {
    QuantumWalk::with_rng(cfg, Box::new(ONDRng::new(b"entangle"))).unwrap()
}

fn stepped(cfg: WalkConfig, steps: usize) -> QuantumWalk {
    let mut w = walk(cfg);
    for _ in 0..steps {
        w.step().unwrap();
    }
    w
}

fn c(re: f64, im: f64) -> C64 {
    C64::new(re, im)
}

#[test]
fn generate_entanglement_couples_single_excitations() {
    let mut w = walk(WalkConfig::new(4, 2));
    w.generate_entanglement(&[0, 1]).unwrap();

    let s = w.state();
    for (cfg, pos) in [(1, 0), (1, 1), (2, 0), (2, 1)] {
        assert!((s.get(cfg, pos).re - 0.5).abs() < 1e-12, "{:?}", (cfg, pos));
    }
    assert!((s.norm_sqr() - 1.0).abs() < 1e-12);
}

#[test]
fn generate_entanglement_validates_arguments() {
    let mut w = walk(WalkConfig::new(4, 2));
    let before = w.state().clone();

    for bad in [&[0][..], &[0, 1, 1][..], &[0, 2][..], &[1, 1][..]] {
        let err = w.generate_entanglement(bad).unwrap_err();
        assert!(matches!(err, WalkError::InvalidArgument(_)), "{:?}", bad);
    }
    assert_eq!(w.state(), &before);
}

#[test]
fn generate_entanglement_zero_norm_leaves_state() {
    let mut t = StateTensor::zeros(4, &[2]);
    t.set(1, 0, c(1.0, 0.0));
    t.set(2, 0, c(-1.0, 0.0));
    let before = t.clone();

    let err = entanglement::generate_entanglement(&mut t, 2, &[0, 1]).unwrap_err();
    assert!(matches!(err, WalkError::Normalization(_)));
    assert_eq!(t, before);
}

#[test]
fn propagate_skips_disjoint_slices() {
    let mut w = walk(WalkConfig::new(4, 2));
    let before = w.state().clone();
    w.propagate_entanglement().unwrap();
    for (a, b) in before.data.iter().zip(&w.state().data) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn propagate_rotates_overlapping_slices() {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let mut t = StateTensor::zeros(4, &[2]);
    t.set(1, 0, c(s, 0.0));
    t.set(2, 0, c(0.0, s));

    entanglement::propagate_entanglement(&mut t).unwrap();

    assert!((t.norm_sqr() - 1.0).abs() < 1e-12);
    assert!((t.get(1, 0).norm() - s).abs() < 1e-12);
    assert!((t.get(2, 0).norm() - s).abs() < 1e-12);
    assert_eq!(t.get(0, 0).norm(), 0.0);
}

#[test]
fn propagate_keeps_norm_after_walking() {
    let mut w = stepped(WalkConfig::new(5, 2), 4);
    w.propagate_entanglement().unwrap();
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-9);
}

#[test]
fn identity_filter_preserves_relative_amplitudes() {
    let mut w = stepped(WalkConfig::new(5, 2), 3);
    let before = w.state().clone();

    w.entanglement_filtering(|_| 1.0).unwrap();
    for (a, b) in before.data.iter().zip(&w.state().data) {
        assert!((a - b).norm() < 1e-12);
    }

    // a constant factor hits every slice equally often
    w.entanglement_filtering(|_| 3.0).unwrap();
    for (a, b) in before.data.iter().zip(&w.state().data) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn filter_can_suppress_overlapping_pairs() {
    let mut w = stepped(WalkConfig::new(5, 2), 3);
    w.entanglement_filtering(|x| if x > 0.05 { 0.5 } else { 1.0 })
        .unwrap();
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-12);
}

#[test]
fn filter_rejects_non_finite_factor() {
    let mut w = stepped(WalkConfig::new(5, 2), 2);
    let before = w.state().clone();
    let err = w.entanglement_filtering(|_| f64::INFINITY).unwrap_err();
    assert!(matches!(err, WalkError::InvalidArgument(_)));
    assert_eq!(w.state(), &before);
}

#[test]
fn swap_and_cnot_sequence() {
    let mut w = walk(WalkConfig::new(4, 2));
    let applied = w
        .dynamic_entanglement_generation(&[ControlOp::swap(0, 1)])
        .unwrap();
    assert_eq!(applied, 1);
    let s = std::f64::consts::FRAC_1_SQRT_2;
    assert!((w.state().get(1, 1).re - s).abs() < 1e-12);
    assert!((w.state().get(2, 0).re - s).abs() < 1e-12);

    let mut w = walk(WalkConfig::new(4, 2));
    w.dynamic_entanglement_generation(&[ControlOp::cnot(0, 1, c(1.0, 0.0))])
        .unwrap();
    // slice 2 gained a copy of slice 1: weights 1 : 2 before renormalizing
    let a = w.state().slice_norm_sqr(1);
    let b = w.state().slice_norm_sqr(2);
    assert!((b - 2.0 * a).abs() < 1e-12, "a = {}, b = {}", a, b);
    assert!((a + b - 1.0).abs() < 1e-12);
}

#[test]
fn unknown_operations_follow_policy() {
    let seq = vec![
        ControlOp::named(0, 1, "TOFFOLI", None),
        ControlOp::named(0, 1, "SWAP", None),
    ];
    assert_eq!(seq[0].operation, OperationType::Unknown("TOFFOLI".into()));
    assert_eq!(seq[1].operation, OperationType::Swap);

    let mut lenient = walk(WalkConfig::new(4, 2));
    assert_eq!(lenient.dynamic_entanglement_generation(&seq).unwrap(), 1);

    let strict_cfg = WalkConfig::new(4, 2).with_unknown_operation(UnknownOperationPolicy::Fail);
    let mut strict = walk(strict_cfg);
    let before = strict.state().clone();
    let err = strict.dynamic_entanglement_generation(&seq).unwrap_err();
    assert!(matches!(err, WalkError::InvalidArgument(_)));
    assert_eq!(strict.state(), &before);
}

#[test]
fn control_sequence_checks_particles_first() {
    let mut w = walk(WalkConfig::new(4, 2));
    let before = w.state().clone();
    let seq = [ControlOp::swap(0, 1), ControlOp::cnot(0, 5, c(1.0, 0.0))];
    assert!(w.dynamic_entanglement_generation(&seq).is_err());
    assert_eq!(w.state(), &before);
}

#[test]
fn error_correction_heuristic() {
    let mut w = walk(WalkConfig::new(3, 3));
    let corrected = w.quantum_error_correction_scheme().unwrap();

    // position weights after coupling are 3 : 3 : 2, so no corrective flip
    assert!(!corrected);
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-12);
    let p = w.measure();
    assert!((p.values[0] - 3.0 / 8.0).abs() < 1e-12);
    assert!((p.values[2] - 2.0 / 8.0).abs() < 1e-12);
    // the bit flip on particle 1 moved configuration 2 to 0
    assert!(w.state().slice_norm_sqr(0) > 0.0);
    assert_eq!(w.state().slice_norm_sqr(2), 0.0);
}

#[test]
fn error_correction_needs_three_particles() {
    let mut w = walk(WalkConfig::new(4, 2));
    assert!(matches!(
        w.quantum_error_correction_scheme(),
        Err(WalkError::InvalidArgument(_))
    ));
}

#[test]
fn teleportation_on_uniform_bell_weights() {
    let mut w = walk(WalkConfig::new(2, 2));
    let outcome = w.quantum_teleportation_protocol(0, 1).unwrap();
    assert_eq!(
        outcome,
        TeleportationOutcome {
            x_applied: false,
            z_applied: false
        }
    );
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-12);
    assert!(w.quantum_teleportation_protocol(1, 1).is_err());
}
