use anyhow::{Context, Result};
use clap::Parser;
use formica_lib::app::Simulation;
use formica_lib::model::config::SimConfig;
use formica_lib::model::metrics::init_logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "formica.toml")]
    config: PathBuf,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Override the world seed from the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log a summary every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Pretty-print the final JSON report
    #[arg(long)]
    pretty: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = SimConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    tracing::info!(fingerprint = %config.fingerprint(), ticks = args.ticks, "Starting run");

    let mut sim = Simulation::from_config(&config)?.with_report_every(args.report_every);
    let report = sim.run(args.ticks)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
