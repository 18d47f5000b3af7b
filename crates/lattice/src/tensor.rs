use num_complex::Complex64;

use crate::error::{LatticeError, LatticeResult};

pub type C64 = Complex64;

/// Dense joint amplitude array.
///
/// Axis 0 is the configuration index (`2^num_particles` entries), the
/// remaining axes are the position shape, stored row-major. A "slice" is the
/// contiguous block of positions belonging to one configuration index.
#[derive(Clone, Debug, PartialEq)]
pub struct StateTensor {
    pub data: Vec<C64>,
    configs: usize,
    shape: Vec<usize>,
    slice_len: usize,
}

impl StateTensor {
    pub fn zeros(configs: usize, shape: &[usize]) -> Self {
        let slice_len = shape.iter().product::<usize>();
        Self {
            data: vec![C64::new(0.0, 0.0); configs * slice_len],
            configs,
            shape: shape.to_vec(),
            slice_len,
        }
    }

    /// Particle `i` starts in configuration `1 << i`, at coordinate `i` on the
    /// first position axis (all other axes at 0), with amplitude
    /// `1/sqrt(num_particles)`.
    pub fn seeded(num_particles: usize, shape: &[usize]) -> LatticeResult<Self> {
        let first = shape.first().copied().unwrap_or(0);
        if num_particles == 0 || num_particles > first {
            return Err(LatticeError::SeedOutOfRange {
                particles: num_particles,
                positions: first,
            });
        }

        let mut t = Self::zeros(1 << num_particles, shape);
        let amp = C64::new(1.0 / (num_particles as f64).sqrt(), 0.0);
        let stride = t.axis_stride(0);
        for i in 0..num_particles {
            t.set(1 << i, i * stride, amp);
        }
        Ok(t)
    }

    #[inline]
    fn idx(&self, c: usize, p: usize) -> usize {
        c * self.slice_len + p
    }

    pub fn get(&self, c: usize, p: usize) -> C64 {
        self.data[self.idx(c, p)]
    }

    pub fn set(&mut self, c: usize, p: usize, v: C64) {
        let i = self.idx(c, p);
        self.data[i] = v;
    }

    pub fn configs(&self) -> usize {
        self.configs
    }

    pub fn position_shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of positions in one slice.
    pub fn slice_len(&self) -> usize {
        self.slice_len
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn slice(&self, c: usize) -> &[C64] {
        let start = c * self.slice_len;
        &self.data[start..start + self.slice_len]
    }

    pub fn slice_mut(&mut self, c: usize) -> &mut [C64] {
        let start = c * self.slice_len;
        &mut self.data[start..start + self.slice_len]
    }

    /// Mutable views of two distinct slices. `a` and `b` must differ.
    pub fn slice_pair_mut(&mut self, a: usize, b: usize) -> (&mut [C64], &mut [C64]) {
        assert!(a != b, "slice_pair_mut needs two distinct slices");
        let n = self.slice_len;
        if a < b {
            let (lo, hi) = self.data.split_at_mut(b * n);
            (&mut lo[a * n..(a + 1) * n], &mut hi[..n])
        } else {
            let (lo, hi) = self.data.split_at_mut(a * n);
            (&mut hi[..n], &mut lo[b * n..(b + 1) * n])
        }
    }

    pub fn swap_slices(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (x, y) = self.slice_pair_mut(a, b);
        x.swap_with_slice(y);
    }

    pub fn scale_slice(&mut self, c: usize, factor: C64) {
        for v in self.slice_mut(c) {
            *v *= factor;
        }
    }

    pub fn scale(&mut self, factor: C64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    pub fn norm_sqr(&self) -> f64 {
        self.data.iter().map(|v| v.norm_sqr()).sum()
    }

    pub fn slice_norm_sqr(&self, c: usize) -> f64 {
        self.slice(c).iter().map(|v| v.norm_sqr()).sum()
    }

    /// `<slice a | slice b>`, conjugating the first argument.
    pub fn overlap(&self, a: usize, b: usize) -> C64 {
        self.slice(a)
            .iter()
            .zip(self.slice(b))
            .map(|(x, y)| x.conj() * y)
            .sum()
    }

    /// Rescale the whole tensor to unit squared magnitude. Returns the norm
    /// that was divided out.
    pub fn normalize(&mut self) -> LatticeResult<f64> {
        let norm = checked_norm(self.norm_sqr())?;
        let inv = 1.0 / norm;
        for v in &mut self.data {
            *v *= inv;
        }
        Ok(norm)
    }

    /// Rescale one slice to unit squared magnitude.
    pub fn normalize_slice(&mut self, c: usize) -> LatticeResult<f64> {
        let norm = checked_norm(self.slice_norm_sqr(c))?;
        let inv = 1.0 / norm;
        for v in self.slice_mut(c) {
            *v *= inv;
        }
        Ok(norm)
    }

    /// Row-major stride of a position axis, in slice elements.
    pub fn axis_stride(&self, axis: usize) -> usize {
        self.shape[axis + 1..].iter().product()
    }

    /// Flat position offset of a coordinate tuple.
    pub fn flat_position(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&x, &n) in coords.iter().zip(&self.shape) {
            if x >= n {
                return None;
            }
            flat = flat * n + x;
        }
        Some(flat)
    }

    pub fn coords(&self, mut flat: usize) -> Vec<usize> {
        let mut out = vec![0; self.shape.len()];
        for (axis, &n) in self.shape.iter().enumerate().rev() {
            out[axis] = flat % n;
            flat /= n;
        }
        out
    }

    /// Flat position reached from `flat` by moving `forward` (or backward)
    /// one step along `axis`, wrapping around.
    pub fn periodic_neighbor(&self, flat: usize, axis: usize, forward: bool) -> usize {
        let n = self.shape[axis];
        let stride = self.axis_stride(axis);
        let x = (flat / stride) % n;
        let y = if forward { (x + 1) % n } else { (x + n - 1) % n };
        flat - x * stride + y * stride
    }

    /// Same layout with every amplitude zeroed.
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.configs, &self.shape)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.re.is_finite() && v.im.is_finite())
    }
}

fn checked_norm(norm_sqr: f64) -> LatticeResult<f64> {
    if !norm_sqr.is_finite() {
        return Err(LatticeError::NonFinite);
    }
    if norm_sqr == 0.0 {
        return Err(LatticeError::ZeroNorm);
    }
    Ok(norm_sqr.sqrt())
}
