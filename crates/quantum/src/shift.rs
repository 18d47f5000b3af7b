use lattice::{Graph, StateTensor, Topology, C64};

use crate::error::WalkResult;

/// Topology-aware position transition. Overwrites `psi` on success.
///
/// Line/grid output is renormalized (the averaging is contractive); network
/// output is the raw adjacency product.
pub fn shift(psi: &mut StateTensor, topology: &Topology) -> WalkResult<()> {
    match topology {
        Topology::Periodic { .. } => {
            let mut next = periodic_shift(psi);
            next.normalize()?;
            *psi = next;
        }
        Topology::Network(graph) => {
            *psi = adjacency_shift(psi, graph);
        }
    }
    Ok(())
}

/// Forward plus backward circular shift along every position axis, summed
/// and divided by `2 * dimension`.
pub fn periodic_shift(psi: &StateTensor) -> StateTensor {
    let dims = psi.position_shape().len();
    let mut next = psi.zeros_like();
    if dims == 0 {
        return next;
    }
    let weight = 1.0 / (2 * dims) as f64;

    for c in 0..psi.configs() {
        let src = psi.slice(c);
        let dst = next.slice_mut(c);
        for (p, out) in dst.iter_mut().enumerate() {
            let mut acc = C64::new(0.0, 0.0);
            for axis in 0..dims {
                acc += src[psi.periodic_neighbor(p, axis, false)];
                acc += src[psi.periodic_neighbor(p, axis, true)];
            }
            *out = acc * weight;
        }
    }
    next
}

/// `A · slice` for every configuration, with `A` the 0/1 adjacency matrix of
/// `graph`, summed over neighbour lists.
pub fn adjacency_shift(psi: &StateTensor, graph: &Graph) -> StateTensor {
    let mut next = psi.zeros_like();

    for c in 0..psi.configs() {
        let src = psi.slice(c);
        let dst = next.slice_mut(c);
        for (i, out) in dst.iter_mut().enumerate().take(graph.node_count()) {
            *out = graph.neighbors(i).iter().map(|&j| src[j]).sum();
        }
    }
    next
}
