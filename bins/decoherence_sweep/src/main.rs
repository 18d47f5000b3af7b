use clap::Parser;
use log::info;

use lattice::TopologyKind;
use quantum::WalkConfig;
use simulator::{decoherence_sweep, output::write_sweep};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ensemble spreading vs decoherence rate")]
struct Args {
    /// Positions per axis
    #[arg(long, default_value_t = 16)]
    positions: usize,

    /// Number of walking particles
    #[arg(long, default_value_t = 2)]
    particles: usize,

    /// Grid dimension (1 = periodic line)
    #[arg(long, default_value_t = 1)]
    dimension: usize,

    /// Comma-separated list of decoherence rates
    #[arg(long, default_value = "0,0.01,0.05,0.1,0.2,0.5")]
    rates: String,

    /// Walk steps per trajectory
    #[arg(long, default_value_t = 20)]
    steps: usize,

    /// Trajectories averaged per rate
    #[arg(long, default_value_t = 16)]
    trajectories: usize,

    /// RNG seed
    #[arg(long, default_value = "sweep")]
    seed: String,

    /// Number of Rayon worker threads (0 = Rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Output CSV path
    #[arg(long, default_value = "decoherence_sweep.csv")]
    out: String,
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

    let rates = parse_list(&args.rates);
    if rates.is_empty() {
        eprintln!("rates must contain at least one number");
        std::process::exit(1);
    }

    let topology = if args.dimension > 1 {
        TopologyKind::Grid
    } else {
        TopologyKind::Line
    };
    let cfg = WalkConfig::new(args.positions, args.particles)
        .with_dimension(args.dimension)
        .with_topology(topology);

    info!(
        "sweeping {} rates: {} trajectories x {} steps, seed '{}'",
        rates.len(),
        args.trajectories,
        args.steps,
        args.seed
    );
    let rows = match decoherence_sweep(&cfg, &rates, args.steps, args.trajectories, &args.seed) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    for r in &rows {
        println!(
            "rate={:<6}  H={:.4}  P(0)={:.4}  spread={:.4}",
            r.rate, r.entropy, r.origin, r.spread
        );
    }

    if let Err(err) = write_sweep(&args.out, &rows) {
        eprintln!("Failed to write CSV to {}: {}", args.out, err);
        std::process::exit(1);
    }
    info!("sweep written to {}", args.out);
}

fn parse_list(input: &str) -> Vec<f64> {
    input
        .split(',')
        .filter_map(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                t.parse::<f64>().ok()
            }
        })
        .collect()
}
