use std::collections::BTreeMap;

use faer::Mat;
use lattice::{Edge, Graph, StateTensor, Topology, TopologyKind, C64};
use log::debug;
use rng::{EntropyRng, RandomSource};
use serde::{Deserialize, Serialize};

use crate::circuit::{self, CircuitBackend, CircuitSpec, Counts, NoiseKind};
use crate::coin::{self, CoinType, CustomCoin};
use crate::config::WalkConfig;
use crate::decision::{self, Decision};
use crate::dynamics::{self, InterferenceStrategy, MemoryBuffer};
use crate::entanglement::{self, ControlOp, TeleportationOutcome};
use crate::error::{WalkError, WalkResult};
use crate::gates::{self, conjugate_hadamard, Coin};
use crate::measurement::{self, Basis, Distribution};
use crate::noise;
use crate::shift;
use crate::visualize::{self, HeatmapSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    MaximizeEntanglement,
    MinimizeResourceUse,
}

/// Discrete-time walk of entangled particles.
///
/// Owns the state tensor, its topology, the coin registry, the memory buffer
/// and the random source. Every fallible operation leaves the walk as it was
/// when it returns an error.
pub struct QuantumWalk {
    config: WalkConfig,
    topology: Topology,
    state: StateTensor,
    coin: CoinType,
    custom_coin: CustomCoin,
    memory: MemoryBuffer,
    steps: u64,
    rng: Box<dyn RandomSource + Send>,
}

impl QuantumWalk {
    /// Walk drawing from OS entropy.
    pub fn new(config: WalkConfig) -> WalkResult<Self> {
        Self::with_rng(config, Box::new(EntropyRng::new()))
    }

    pub fn with_rng(config: WalkConfig, mut rng: Box<dyn RandomSource + Send>) -> WalkResult<Self> {
        config.validate()?;
        let topology = Topology::build(
            config.topology,
            config.num_positions,
            config.dimension,
            config.network_degree,
            &mut rng,
        )?;
        let state = StateTensor::seeded(config.num_particles, &topology.position_shape())?;
        debug!(
            "walk: {} particles, {:?} topology, position shape {:?}",
            config.num_particles,
            topology.kind(),
            topology.position_shape()
        );

        Ok(Self {
            coin: config.coin,
            memory: MemoryBuffer::new(config.memory_window),
            config,
            topology,
            state,
            custom_coin: CustomCoin::None,
            steps: 0,
            rng,
        })
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self) -> &StateTensor {
        &self.state
    }

    pub fn num_particles(&self) -> usize {
        self.config.num_particles
    }

    /// Completed `step()` calls.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn coin_type(&self) -> CoinType {
        self.coin
    }

    pub fn custom_coin(&self) -> &CustomCoin {
        &self.custom_coin
    }

    pub fn memory(&self) -> &MemoryBuffer {
        &self.memory
    }

    // ---- coin registry ----

    pub fn set_coin_type(&mut self, coin: CoinType) {
        self.coin = coin;
    }

    pub fn set_custom_coin(&mut self, u: Coin) -> WalkResult<()> {
        if !gates::is_finite(&u) {
            return Err(WalkError::InvalidArgument(
                "custom coin has non-finite entries".into(),
            ));
        }
        debug!("custom coin fixed, unitarity defect {:.3e}", gates::unitarity_defect(&u));
        self.custom_coin = CustomCoin::Fixed(u);
        Ok(())
    }

    pub fn set_time_dependent_coin<F>(&mut self, f: F)
    where
        F: Fn(u64) -> Coin + Send + 'static,
    {
        self.custom_coin = CustomCoin::TimeDependent(Box::new(f));
    }

    pub fn clear_custom_coin(&mut self) {
        self.custom_coin = CustomCoin::None;
    }

    fn resolve_custom(&self) -> WalkResult<Coin> {
        let u = self
            .custom_coin
            .resolve(self.steps)
            .ok_or(WalkError::MissingCoin)?;
        if !gates::is_finite(&u) {
            return Err(WalkError::InvalidArgument(
                "custom coin resolved to non-finite entries".into(),
            ));
        }
        Ok(u)
    }

    fn active_coin(&self) -> WalkResult<Coin> {
        match self.coin.builtin() {
            Some(u) => Ok(u),
            None => self.resolve_custom(),
        }
    }

    /// When `condition` holds for the current state, switch to the custom
    /// coin and register Pauli-X as that coin. Returns whether it switched.
    pub fn adapt_coin_operation<F>(&mut self, condition: F) -> bool
    where
        F: Fn(&StateTensor) -> bool,
    {
        if !condition(&self.state) {
            return false;
        }
        self.coin = CoinType::Custom;
        self.custom_coin = CustomCoin::Fixed(gates::pauli_x());
        debug!("coin adapted to Pauli-X");
        true
    }

    /// Every fifth time step registers the rotation by `time_step` radians
    /// as the custom coin. Returns whether a coin was registered.
    pub fn apply_time_dependent_dynamics(&mut self, time_step: u64) -> bool {
        if time_step % 5 != 0 {
            return false;
        }
        self.custom_coin = CustomCoin::Fixed(gates::rotation(time_step as f64));
        true
    }

    // ---- step cycle ----

    pub fn apply_coin(&mut self) -> WalkResult<()> {
        let u = self.active_coin()?;
        coin::apply_coin(&mut self.state, self.config.num_particles, &u);
        Ok(())
    }

    /// Even configurations use the custom coin, odd ones the conjugate
    /// Hadamard.
    pub fn apply_multi_coin(&mut self) -> WalkResult<()> {
        let even = self.resolve_custom()?;
        let odd = conjugate_hadamard();
        coin::apply_multi_coin(&mut self.state, self.config.num_particles, &even, &odd);
        Ok(())
    }

    pub fn shift(&mut self) -> WalkResult<()> {
        shift::shift(&mut self.state, &self.topology)
    }

    pub fn apply_decoherence(&mut self, rate: f64) -> WalkResult<()> {
        noise::apply_decoherence(&mut self.state, rate, &mut self.rng)
    }

    pub fn simulate_decoherence(&mut self, rate: f64) -> WalkResult<()> {
        noise::simulate_decoherence(&mut self.state, rate, &mut self.rng)
    }

    /// Coin, shift, then decoherence at the configured rate.
    pub fn step(&mut self) -> WalkResult<()> {
        let snapshot = self.state.clone();
        match self.run_cycle() {
            Ok(()) => {
                self.steps += 1;
                Ok(())
            }
            Err(err) => {
                self.state = snapshot;
                Err(err)
            }
        }
    }

    fn run_cycle(&mut self) -> WalkResult<()> {
        self.apply_coin()?;
        self.shift()?;
        self.apply_decoherence(self.config.decoherence_rate)
    }

    // ---- measurement ----

    pub fn measure(&self) -> Distribution {
        measurement::measure(&self.state)
    }

    pub fn measure_in_basis(&self, basis: Basis) -> WalkResult<Distribution> {
        measurement::measure_in_basis(&self.state, basis)
    }

    pub fn entanglement_based_measurement(&mut self) -> BTreeMap<usize, usize> {
        measurement::entanglement_based_measurement(&self.state, &mut self.rng)
    }

    /// Density matrix `ψψ†` of the flattened state.
    pub fn perform_state_tomography(&self) -> Mat<C64> {
        let flat = &self.state.data;
        let n = flat.len();
        let mut rho = Mat::<C64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                rho.write(i, j, flat[i] * flat[j].conj());
            }
        }
        rho
    }

    // ---- entanglement ----

    pub fn generate_entanglement(&mut self, particles: &[usize]) -> WalkResult<()> {
        entanglement::generate_entanglement(&mut self.state, self.config.num_particles, particles)
    }

    pub fn propagate_entanglement(&mut self) -> WalkResult<()> {
        entanglement::propagate_entanglement(&mut self.state)
    }

    pub fn entanglement_filtering<F>(&mut self, filter: F) -> WalkResult<()>
    where
        F: Fn(f64) -> f64,
    {
        entanglement::entanglement_filtering(&mut self.state, filter)
    }

    pub fn dynamic_entanglement_generation(&mut self, sequence: &[ControlOp]) -> WalkResult<usize> {
        entanglement::dynamic_entanglement_generation(
            &mut self.state,
            self.config.num_particles,
            sequence,
            self.config.unknown_operation,
        )
    }

    pub fn quantum_error_correction_scheme(&mut self) -> WalkResult<bool> {
        entanglement::quantum_error_correction_scheme(&mut self.state, self.config.num_particles)
    }

    pub fn quantum_teleportation_protocol(
        &mut self,
        sender: usize,
        receiver: usize,
    ) -> WalkResult<TeleportationOutcome> {
        entanglement::quantum_teleportation_protocol(
            &mut self.state,
            self.config.num_particles,
            sender,
            receiver,
        )
    }

    pub fn optimize_entanglement_resources(&mut self, goal: OptimizationGoal) -> WalkResult<()> {
        match goal {
            OptimizationGoal::MaximizeEntanglement => self.apply_multi_coin(),
            OptimizationGoal::MinimizeResourceUse => self.apply_coin(),
        }
    }

    pub fn entanglement_matrix(&self) -> Mat<f64> {
        visualize::entanglement_matrix(&self.state, self.config.num_particles)
    }

    pub fn visualize_entanglement<S>(&self, sink: &mut S)
    where
        S: HeatmapSink + ?Sized,
    {
        visualize::visualize_entanglement(&self.state, self.config.num_particles, sink);
    }

    // ---- auxiliary dynamics ----

    pub fn integrate_memory_effects(&mut self, strength: f64) -> WalkResult<()> {
        dynamics::integrate_memory_effects(&mut self.state, &mut self.memory, strength)
    }

    pub fn simulate_particle_interactions(&mut self, strength: f64) -> WalkResult<()> {
        dynamics::simulate_particle_interactions(&mut self.state, self.config.num_particles, strength)
    }

    pub fn control_entanglement_temporally<F>(&mut self, control: F, time_steps: usize) -> WalkResult<()>
    where
        F: Fn(usize) -> f64,
    {
        dynamics::control_entanglement_temporally(&mut self.state, control, time_steps)
    }

    pub fn manage_quantum_interference(&mut self, strategy: InterferenceStrategy) -> usize {
        dynamics::manage_quantum_interference(&mut self.state, strategy)
    }

    pub fn measurement_driven_walk(&mut self) -> usize {
        dynamics::measurement_driven_walk(&mut self.state)
    }

    pub fn quantum_decision_making<U>(
        &self,
        utility: U,
        threshold: f64,
        feedback_iterations: usize,
    ) -> WalkResult<Decision>
    where
        U: Fn(usize, f64) -> f64,
    {
        decision::quantum_decision_making(&self.measure(), utility, threshold, feedback_iterations)
    }

    // ---- external circuit boundary ----

    pub fn construct_quantum_circuit(&self) -> CircuitSpec {
        circuit::construct_quantum_circuit(&self.state, self.config.num_particles)
    }

    pub fn simulate_noise_effects<B>(&self, kinds: &[NoiseKind], backend: &mut B) -> WalkResult<Counts>
    where
        B: CircuitBackend + ?Sized,
    {
        circuit::simulate_noise_effects(&self.state, self.config.num_particles, kinds, backend)
    }

    // ---- topology ----

    /// Replace the topology. `Network` needs an edge list, `Line` becomes a
    /// periodic line over the current node count, `Grid` rebuilds the
    /// configured grid.
    pub fn update_topology(&mut self, kind: TopologyKind, connections: Option<&[Edge]>) -> WalkResult<()> {
        let topology = match kind {
            TopologyKind::Network => {
                let edges = connections.ok_or_else(|| {
                    WalkError::InvalidTopology("network topology requires an edge list".into())
                })?;
                Topology::Network(Graph::from_edges(edges)?)
            }
            TopologyKind::Line => Topology::line(self.topology.node_count()),
            TopologyKind::Grid => Topology::Periodic {
                kind: TopologyKind::Grid,
                num_positions: self.config.num_positions,
                dimension: self.config.dimension,
            },
        };
        self.replace_topology(topology)
    }

    /// Complete graph over the current node count when `criteria` holds for
    /// the current distribution, a periodic line otherwise.
    pub fn adjust_topology_dynamically<F>(&mut self, criteria: F) -> WalkResult<()>
    where
        F: Fn(&Distribution) -> bool,
    {
        let nodes = self.topology.node_count();
        let topology = if criteria(&self.measure()) {
            Topology::Network(Graph::complete(nodes))
        } else {
            Topology::line(nodes)
        };
        self.replace_topology(topology)
    }

    /// Swap in a new topology together with a matching tensor. Amplitudes
    /// survive when the flattened position count is unchanged; otherwise the
    /// tensor is reseeded. The memory buffer is dropped either way.
    fn replace_topology(&mut self, topology: Topology) -> WalkResult<()> {
        let shape = topology.position_shape();
        let nodes: usize = shape.iter().product();
        let state = if nodes == self.state.slice_len() {
            let mut t = StateTensor::zeros(self.state.configs(), &shape);
            t.data.copy_from_slice(&self.state.data);
            t
        } else {
            StateTensor::seeded(self.config.num_particles, &shape)?
        };

        debug!(
            "topology {:?} -> {:?}, position shape {:?}",
            self.topology.kind(),
            topology.kind(),
            shape
        );
        self.topology = topology;
        self.state = state;
        self.memory.clear();
        Ok(())
    }
}
