use lattice::{Edge, TopologyKind, C64};
use quantum::gates::{hadamard, rotation};
use quantum::shift::periodic_shift;
use quantum::{CoinType, QuantumWalk, WalkConfig, WalkError};
use rng::ONDRng;

fn walk(cfg: WalkConfig) -> QuantumWalk {
    QuantumWalk::with_rng(cfg, Box::new(ONDRng::new(b"coin-shift"))).unwrap()
}

fn max_diff(a: &[C64], b: &[C64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
}

#[test]
fn hadamard_coin_is_an_involution() {
    for particles in 1..=3 {
        let mut w = walk(WalkConfig::new(5, particles));
        let before = w.state().data.clone();
        w.apply_coin().unwrap();
        assert!(max_diff(&before, &w.state().data) > 0.1);
        w.apply_coin().unwrap();
        assert!(max_diff(&before, &w.state().data) < 1e-12);
    }
}

#[test]
fn coin_preserves_norm_on_grid() {
    let cfg = WalkConfig::new(3, 2)
        .with_topology(TopologyKind::Grid)
        .with_dimension(2)
        .with_coin(CoinType::Conjugate);
    let mut w = walk(cfg);
    w.apply_coin().unwrap();
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-12);
}

#[test]
fn line_shift_is_a_circular_convolution() {
    let mut w = walk(WalkConfig::new(7, 1));
    w.apply_coin().unwrap();
    let before = w.state().clone();
    w.shift().unwrap();

    let n = 7;
    let mut raw = Vec::new();
    for c in 0..2 {
        for p in 0..n {
            let left = before.get(c, (p + n - 1) % n);
            let right = before.get(c, (p + 1) % n);
            raw.push((left + right) * 0.5);
        }
    }
    let norm = raw.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt();
    let expected: Vec<C64> = raw.iter().map(|v| *v / norm).collect();

    assert!(max_diff(&expected, &w.state().data) < 1e-12);
    assert!(max_diff(&periodic_shift(&before).data, &raw) < 1e-15);
}

#[test]
fn coin_and_shift_keep_probability_one() {
    let mut w = walk(WalkConfig::new(9, 2));
    for _ in 0..25 {
        w.apply_coin().unwrap();
        w.shift().unwrap();
        let p = w.measure();
        assert!((p.total() - 1.0).abs() < 1e-9, "total = {}", p.total());
    }
}

#[test]
fn network_shift_is_the_raw_adjacency_product() {
    let mut w = walk(WalkConfig::new(4, 2));
    let ring: Vec<Edge> = vec![(0, 1), (1, 2), (2, 3), (3, 0)];
    w.update_topology(TopologyKind::Network, Some(&ring)).unwrap();
    w.apply_coin().unwrap();
    let before = w.state().clone();

    w.shift().unwrap();

    let mut expected_norm = 0.0;
    for c in 0..before.configs() {
        for i in 0..4 {
            let sum = before.get(c, (i + 3) % 4) + before.get(c, (i + 1) % 4);
            assert!((w.state().get(c, i) - sum).norm() < 1e-12);
            expected_norm += sum.norm_sqr();
        }
    }
    assert!((w.state().norm_sqr() - expected_norm).abs() < 1e-12);
}

#[test]
fn network_change_requires_edges() {
    let mut w = walk(WalkConfig::new(4, 2));
    let before = w.state().clone();
    let err = w.update_topology(TopologyKind::Network, None).unwrap_err();
    assert!(matches!(err, WalkError::InvalidTopology(_)));
    assert_eq!(w.state(), &before);
    assert_eq!(w.topology().kind(), TopologyKind::Line);
}

#[test]
fn multi_coin_needs_custom_coin() {
    let mut w = walk(WalkConfig::new(4, 2));
    let before = w.state().clone();
    assert_eq!(w.apply_multi_coin(), Err(WalkError::MissingCoin));
    assert_eq!(w.state(), &before);

    w.set_custom_coin(hadamard()).unwrap();
    w.apply_multi_coin().unwrap();
    assert_ne!(w.state(), &before);
}

#[test]
fn multi_coin_with_matching_coins_is_plain_coin() {
    // odd configurations always use the conjugate Hadamard
    let mut a = walk(WalkConfig::new(4, 2).with_coin(CoinType::Conjugate));
    let mut b = walk(WalkConfig::new(4, 2));
    b.set_custom_coin(quantum::gates::conjugate_hadamard()).unwrap();

    a.apply_coin().unwrap();
    b.apply_multi_coin().unwrap();
    assert!(max_diff(&a.state().data, &b.state().data) < 1e-12);
}

#[test]
fn custom_coin_rejects_nan() {
    let mut w = walk(WalkConfig::new(4, 2));
    let mut bad = hadamard();
    bad[0][1] = C64::new(f64::NAN, 0.0);
    assert!(matches!(
        w.set_custom_coin(bad),
        Err(WalkError::InvalidArgument(_))
    ));
}

#[test]
fn time_dependent_coin_uses_step_counter() {
    let cfg = WalkConfig::new(5, 1)
        .with_coin(CoinType::Custom)
        .with_decoherence_rate(0.0);
    let mut w = walk(cfg);
    w.set_time_dependent_coin(|t| rotation(t as f64 * 0.5));

    // step 0 resolves to the identity rotation
    let before = w.state().clone();
    w.apply_coin().unwrap();
    assert_eq!(w.state(), &before);

    w.step().unwrap();
    w.step().unwrap();
    assert_eq!(w.steps(), 2);
    assert!((w.state().norm_sqr() - 1.0).abs() < 1e-9);
}

#[test]
fn time_dependent_dynamics_every_fifth_step() {
    let mut w = walk(WalkConfig::new(5, 1));
    assert!(!w.apply_time_dependent_dynamics(3));
    assert!(!w.custom_coin().is_set());
    assert!(w.apply_time_dependent_dynamics(10));
    assert!(w.custom_coin().is_set());
}

#[test]
fn adapt_coin_switches_to_pauli_x() {
    let mut w = walk(WalkConfig::new(4, 1));
    assert!(!w.adapt_coin_operation(|_| false));
    assert_eq!(w.coin_type(), CoinType::Hadamard);

    assert!(w.adapt_coin_operation(|s| s.norm_sqr() > 0.5));
    assert_eq!(w.coin_type(), CoinType::Custom);

    w.apply_coin().unwrap();
    // X moves the single particle from configuration 1 to 0
    assert!((w.state().get(0, 0).re - 1.0).abs() < 1e-12);
    assert_eq!(w.state().get(1, 0).norm(), 0.0);
}

#[test]
fn neighbour_shift_matches_dense_adjacency() {
    let mut rng = ONDRng::new(b"regular");
    let graph = lattice::Graph::random_regular(3, 8, &mut rng).unwrap();
    let a = graph.adjacency_matrix();

    let mut psi = lattice::StateTensor::zeros(4, &[8]);
    for (k, v) in psi.data.iter_mut().enumerate() {
        *v = C64::new(k as f64 * 0.1, 1.0 - k as f64 * 0.05);
    }

    let out = quantum::shift::adjacency_shift(&psi, &graph);
    for c in 0..4 {
        for i in 0..8 {
            let mut expected = C64::new(0.0, 0.0);
            for j in 0..8 {
                expected += psi.get(c, j) * a.read(i, j);
            }
            assert!((out.get(c, i) - expected).norm() < 1e-12);
        }
    }
}
