use faer::Mat;
use lattice::StateTensor;

/// Consumer of square matrices, e.g. a heatmap renderer.
pub trait HeatmapSink {
    fn render(&mut self, title: &str, matrix: &Mat<f64>);
}

/// Pairwise particle "entanglement": overlap magnitude between the
/// single-excitation slices `1 << i` and `1 << j`, zero on the diagonal.
pub fn entanglement_matrix(psi: &StateTensor, num_particles: usize) -> Mat<f64> {
    let mut m = Mat::<f64>::zeros(num_particles, num_particles);
    for i in 0..num_particles {
        for j in 0..num_particles {
            if i != j {
                m.write(i, j, psi.overlap(1 << i, 1 << j).norm());
            }
        }
    }
    m
}

pub fn visualize_entanglement<S>(psi: &StateTensor, num_particles: usize, sink: &mut S)
where
    S: HeatmapSink + ?Sized,
{
    let m = entanglement_matrix(psi, num_particles);
    sink.render("Entanglement Between Particles", &m);
}
