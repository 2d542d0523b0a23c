mod app;
mod headless;
mod report;

use anyhow::{ensure, Result};
use clap::Parser;
use gonogo_experiment::{Sequencer, TaskConfig};
use gonogo_timing::HighPrecisionClock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use app::App;
use headless::{run_headless, SimulatedParticipant};
use report::{log_config, Report};

/// Go/No-Go response inhibition task
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Run without a window, driven by a simulated participant
    #[arg(long)]
    headless: bool,

    /// Seed for the trial order (and the simulated participant)
    #[arg(long)]
    seed: Option<u64>,

    /// Chance the simulated participant clicks on a NOGO trial
    #[arg(long, default_value_t = 0.1)]
    commission_rate: f64,

    /// Chance the simulated participant misses a GO trial
    #[arg(long, default_value_t = 0.05)]
    omission_rate: f64,
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(
        (0.0..=1.0).contains(&args.commission_rate),
        "--commission-rate must be within 0..=1, got {}",
        args.commission_rate
    );
    ensure!(
        (0.0..=1.0).contains(&args.omission_rate),
        "--omission-rate must be within 0..=1, got {}",
        args.omission_rate
    );

    let config = TaskConfig::default();
    config.validate()?;
    log_config(&config)?;
    let clock = HighPrecisionClock::new();
    let mut sequencer = Sequencer::new(config, clock.clone(), rng_for(args.seed));

    if args.headless {
        let participant = SimulatedParticipant::new(
            rng_for(args.seed.map(|s| s.wrapping_add(1))),
            args.commission_rate,
            args.omission_rate,
        );
        let summary = run_headless(&mut sequencer, &clock, participant)?;
        println!("{}", Report::new(sequencer.results(), &summary));
        return Ok(());
    }

    App::new(sequencer).run()
}
