//! Position-space connectivity: implicit periodic line/grid or an explicit graph.

use std::collections::{BTreeMap, BTreeSet};

use faer::Mat;
use log::debug;
use rng::{shuffle, RandomSource};
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, LatticeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    Line,
    Grid,
    Network,
}

pub type Edge = (usize, usize);

const MAX_PAIRING_ATTEMPTS: usize = 1000;

/// Undirected graph over nodes `0..nodes`, adjacency kept as sorted neighbor lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    neighbors: Vec<Vec<usize>>,
}

impl Graph {
    fn empty(nodes: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); nodes],
        }
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        if !self.neighbors[a].contains(&b) {
            self.neighbors[a].push(b);
            self.neighbors[a].sort_unstable();
        }
        if !self.neighbors[b].contains(&a) {
            self.neighbors[b].push(a);
            self.neighbors[b].sort_unstable();
        }
    }

    /// Graph from an edge list. Only the listed labels become nodes; they are
    /// renumbered densely in ascending label order.
    pub fn from_edges(edges: &[Edge]) -> LatticeResult<Self> {
        if edges.is_empty() {
            return Err(LatticeError::InvalidGraph("edge list is empty".into()));
        }
        let labels: BTreeSet<usize> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
        let index: BTreeMap<usize, usize> = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| (label, i))
            .collect();

        let mut g = Self::empty(index.len());
        for (a, b) in edges {
            g.add_edge(index[a], index[b]);
        }
        Ok(g)
    }

    pub fn path(nodes: usize) -> Self {
        let mut g = Self::empty(nodes);
        for i in 1..nodes {
            g.add_edge(i - 1, i);
        }
        g
    }

    pub fn complete(nodes: usize) -> Self {
        let mut g = Self::empty(nodes);
        for i in 0..nodes {
            for j in i + 1..nodes {
                g.add_edge(i, j);
            }
        }
        g
    }

    /// Uniform-ish random `degree`-regular simple graph via the pairing model:
    /// shuffle `degree` stubs per node, pair them up, retry on loops or
    /// repeated edges.
    pub fn random_regular<R>(degree: usize, nodes: usize, rng: &mut R) -> LatticeResult<Self>
    where
        R: RandomSource + ?Sized,
    {
        if degree >= nodes {
            return Err(LatticeError::InvalidGraph(format!(
                "degree {} needs more than {} nodes",
                degree, nodes
            )));
        }
        if (degree * nodes) % 2 != 0 {
            return Err(LatticeError::InvalidGraph(format!(
                "degree * nodes must be even, got {} * {}",
                degree, nodes
            )));
        }

        let mut stubs: Vec<usize> = (0..nodes)
            .flat_map(|n| std::iter::repeat(n).take(degree))
            .collect();

        'attempt: for attempt in 0..MAX_PAIRING_ATTEMPTS {
            shuffle(&mut stubs, rng, b"REGULAR_GRAPH");
            let mut g = Self::empty(nodes);
            for pair in stubs.chunks(2) {
                let (a, b) = (pair[0], pair[1]);
                if a == b || g.neighbors[a].contains(&b) {
                    continue 'attempt;
                }
                g.add_edge(a, b);
            }
            debug!(
                "random {}-regular graph on {} nodes after {} attempts",
                degree,
                nodes,
                attempt + 1
            );
            return Ok(g);
        }

        Err(LatticeError::InvalidGraph(format!(
            "no simple {}-regular pairing found on {} nodes",
            degree, nodes
        )))
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        let loops = (0..self.node_count())
            .filter(|&n| self.neighbors[n].contains(&n))
            .count();
        let ends: usize = self.neighbors.iter().map(Vec::len).sum();
        (ends - loops) / 2 + loops
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        a < self.node_count() && self.neighbors[a].contains(&b)
    }

    /// Dense symmetric 0/1 adjacency matrix.
    pub fn adjacency_matrix(&self) -> Mat<f64> {
        let n = self.node_count();
        let mut a = Mat::<f64>::zeros(n, n);
        for (i, row) in self.neighbors.iter().enumerate() {
            for &j in row {
                a.write(i, j, 1.0);
            }
        }
        a
    }
}

/// Connectivity owned by a walk. Replaced wholesale on topology changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    /// Line or grid with wraparound on every axis.
    Periodic {
        kind: TopologyKind,
        num_positions: usize,
        dimension: usize,
    },
    Network(Graph),
}

impl Topology {
    pub fn build<R>(
        kind: TopologyKind,
        num_positions: usize,
        dimension: usize,
        degree: usize,
        rng: &mut R,
    ) -> LatticeResult<Self>
    where
        R: RandomSource + ?Sized,
    {
        match kind {
            TopologyKind::Line | TopologyKind::Grid => Ok(Topology::Periodic {
                kind,
                num_positions,
                dimension,
            }),
            TopologyKind::Network => Ok(Topology::Network(Graph::random_regular(
                degree,
                num_positions,
                rng,
            )?)),
        }
    }

    pub fn line(num_positions: usize) -> Self {
        Topology::Periodic {
            kind: TopologyKind::Line,
            num_positions,
            dimension: 1,
        }
    }

    pub fn kind(&self) -> TopologyKind {
        match self {
            Topology::Periodic { kind, .. } => *kind,
            Topology::Network(_) => TopologyKind::Network,
        }
    }

    /// Shape of the position axes of the state tensor.
    pub fn position_shape(&self) -> Vec<usize> {
        match self {
            Topology::Periodic {
                num_positions,
                dimension,
                ..
            } => vec![*num_positions; *dimension],
            Topology::Network(g) => vec![g.node_count()],
        }
    }

    /// Total number of positions (grid cells or graph nodes).
    pub fn node_count(&self) -> usize {
        self.position_shape().iter().product()
    }

    pub fn graph(&self) -> Option<&Graph> {
        match self {
            Topology::Network(g) => Some(g),
            Topology::Periodic { .. } => None,
        }
    }
}
