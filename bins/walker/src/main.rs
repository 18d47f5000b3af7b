use clap::{Parser, ValueEnum};
use log::info;

use lattice::TopologyKind;
use quantum::{Basis, CoinType, Distribution, QuantumWalk, WalkConfig, WalkResult};
use rng::ONDRng;
use simulator::{benchmark, ensemble_distribution, output::write_distribution, spread};

/// Entangled multi-particle quantum walk
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Positions per axis (nodes for network topologies)
    #[arg(long, default_value_t = 16)]
    positions: usize,

    /// Number of walking particles
    #[arg(long, default_value_t = 2)]
    particles: usize,

    /// Lattice dimension (grid topology only)
    #[arg(long, default_value_t = 1)]
    dimension: usize,

    #[arg(long, value_enum, default_value_t = Topology::Line)]
    topology: Topology,

    /// Node degree of the random regular network
    #[arg(long, default_value_t = 3)]
    degree: usize,

    #[arg(long, value_enum, default_value_t = Coin::Hadamard)]
    coin: Coin,

    /// Per-element decoherence probability applied every step
    #[arg(long, default_value_t = 0.01)]
    rate: f64,

    /// Number of walk steps
    #[arg(long, default_value_t = 20)]
    steps: usize,

    /// Independent trajectories to average (1 = single walk)
    #[arg(long, default_value_t = 1)]
    trajectories: usize,

    /// RNG seed; omit for an entropy-seeded single walk
    #[arg(long)]
    seed: Option<String>,

    /// Also report the Bell-basis total for a single walk
    #[arg(long)]
    bell: bool,

    /// Output CSV path for the final distribution
    #[arg(long)]
    out: Option<String>,

    /// Number of Rayon worker threads (0 = Rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Time the configured walk instead of reporting its distribution
    #[arg(long)]
    benchmark: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Topology {
    Line,
    Grid,
    Network,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Coin {
    Hadamard,
    Conjugate,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.threads > 0 {
        if let Err(err) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
        {
            eprintln!("failed to build Rayon thread pool: {}", err);
            std::process::exit(1);
        }
    }

    if let Err(err) = run(&args) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

fn config(args: &Args) -> WalkConfig {
    let topology = match args.topology {
        Topology::Line => TopologyKind::Line,
        Topology::Grid => TopologyKind::Grid,
        Topology::Network => TopologyKind::Network,
    };
    let coin = match args.coin {
        Coin::Hadamard => CoinType::Hadamard,
        Coin::Conjugate => CoinType::Conjugate,
    };
    WalkConfig {
        network_degree: args.degree,
        ..WalkConfig::new(args.positions, args.particles)
            .with_dimension(args.dimension)
            .with_topology(topology)
            .with_coin(coin)
            .with_decoherence_rate(args.rate)
    }
}

fn run(args: &Args) -> WalkResult<()> {
    let cfg = config(args);
    cfg.validate()?;

    if args.benchmark {
        let secs = benchmark(&cfg, args.steps)?;
        println!("Benchmark: {} steps -> {:.3} s", args.steps, secs);
        return Ok(());
    }

    let dist = if args.trajectories > 1 {
        let seed = args.seed.as_deref().unwrap_or("walker");
        ensemble_distribution(&cfg, args.steps, args.trajectories, seed)?
    } else {
        single_walk(args, cfg)?
    };

    report(&dist);

    if let Some(path) = &args.out {
        if let Err(err) = write_distribution(path, &dist) {
            eprintln!("Failed to write CSV to {}: {}", path, err);
        } else {
            info!("distribution written to {}", path);
        }
    }
    Ok(())
}

fn single_walk(args: &Args, cfg: WalkConfig) -> WalkResult<Distribution> {
    let mut walk = match &args.seed {
        Some(seed) => QuantumWalk::with_rng(cfg, Box::new(ONDRng::new(seed.as_bytes())))?,
        None => QuantumWalk::new(cfg)?,
    };
    for _ in 0..args.steps {
        walk.step()?;
    }

    if args.bell {
        let bell = walk.measure_in_basis(Basis::Bell)?;
        println!("Bell-basis total = {:.6}", bell.total());
    }
    Ok(walk.measure())
}

fn report(dist: &Distribution) {
    println!("shape = {:?}", dist.shape);
    println!("total = {:.6}", dist.total());
    println!("entropy = {:.4} bits", dist.entropy());
    println!("P(origin) = {:.4}", dist.values.first().copied().unwrap_or(0.0));
    println!("spread = {:.4}", spread(dist));
    if let Some(best) = dist.argmax() {
        println!("most likely position = {} (p = {:.4})", best, dist.values[best]);
    }
}
