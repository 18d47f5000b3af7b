use num_complex::Complex64;

pub type C64 = Complex64;

/// 2x2 coin acting on one particle's two-level register.
pub type Coin = [[C64; 2]; 2];

pub fn hadamard() -> Coin {
    let s = 1.0 / 2.0_f64.sqrt();
    [
        [C64::new(s, 0.0), C64::new(s, 0.0)],
        [C64::new(s, 0.0), C64::new(-s, 0.0)],
    ]
}

/// [[1, -1], [1, 1]] / sqrt(2), the alternate coin for odd configurations.
pub fn conjugate_hadamard() -> Coin {
    let s = 1.0 / 2.0_f64.sqrt();
    [
        [C64::new(s, 0.0), C64::new(-s, 0.0)],
        [C64::new(s, 0.0), C64::new(s, 0.0)],
    ]
}

pub fn pauli_x() -> Coin {
    let z = C64::new(0.0, 0.0);
    let o = C64::new(1.0, 0.0);
    [[z, o], [o, z]]
}

pub fn pauli_z() -> Coin {
    let z = C64::new(0.0, 0.0);
    let o = C64::new(1.0, 0.0);
    let m = C64::new(-1.0, 0.0);
    [[o, z], [z, m]]
}

/// Real rotation [[cos t, sin t], [-sin t, cos t]].
pub fn rotation(theta: f64) -> Coin {
    let c = theta.cos();
    let s = theta.sin();
    [
        [C64::new(c, 0.0), C64::new(s, 0.0)],
        [C64::new(-s, 0.0), C64::new(c, 0.0)],
    ]
}

/// Bell basis change, rows |Φ+>, |Ψ+>, |Ψ->, |Φ->.
pub fn bell_transform() -> [[C64; 4]; 4] {
    let z = C64::new(0.0, 0.0);
    let s = C64::new(1.0 / 2.0_f64.sqrt(), 0.0);
    let m = -s;
    [
        [s, z, z, s],
        [z, s, s, z],
        [z, s, m, z],
        [s, z, z, m],
    ]
}

pub fn is_finite(u: &Coin) -> bool {
    u.iter()
        .flatten()
        .all(|v| v.re.is_finite() && v.im.is_finite())
}

/// Largest entry of |U†U - I|.
pub fn unitarity_defect(u: &Coin) -> f64 {
    let mut worst = 0.0f64;
    for i in 0..2 {
        for j in 0..2 {
            let mut acc = C64::new(0.0, 0.0);
            for k in 0..2 {
                acc += u[k][i].conj() * u[k][j];
            }
            let target = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((acc - target).norm());
        }
    }
    worst
}
