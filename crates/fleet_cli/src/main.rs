use std::error::Error;
use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use fleet_core::config::TrackerConfig;
use fleet_core::destinations::demo_destinations;
use fleet_core::geo::{distance_km, eta_minutes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod replay;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "fleet",
    about = "Delivery fleet tracker tools",
    long_about = "Inspect the demo destination pool, replay a simulated delivery\n\
                  against a manual clock, and print the effective tracker configuration."
)]
struct Cli {
    #[command(flatten)]
    tuning: Tuning,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct Tuning {
    /// Constant vehicle speed in km/h
    #[arg(long, global = true, env = "FLEET_SPEED_KMH", default_value_t = 35.0)]
    speed_kmh: f64,
    /// Seconds spent at the destination before returning
    #[arg(long, global = true, env = "FLEET_DWELL_SECS", default_value_t = 30.0)]
    dwell_secs: f64,
}

impl Tuning {
    fn config(&self) -> Result<TrackerConfig, Box<dyn Error>> {
        let config = TrackerConfig::default()
            .with_speed_kmh(self.speed_kmh)
            .with_dwell_secs(self.dwell_secs);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List demo destinations with distance and drive time from the depot
    Destinations,
    /// Replay one delivery, printing a JSON line per poll until the van is back
    Replay(replay::ReplayArgs),
    /// Print the effective configuration as JSON
    Config,
}

// ── commands ───────────────────────────────────────────────────────

fn print_destinations(config: &TrackerConfig, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:<26} {:>9} {:>10} {:>9} {:>8}",
        "destination", "lat", "lng", "km", "eta_min"
    )?;
    for destination in demo_destinations() {
        let km = distance_km(config.depot.coordinate, destination.coordinate);
        writeln!(
            out,
            "{:<26} {:>9.4} {:>10.4} {:>9.2} {:>8.1}",
            destination.name,
            destination.coordinate.lat,
            destination.coordinate.lng,
            km,
            eta_minutes(km, config.speed_kmh)
        )?;
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.tuning.config()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Destinations => print_destinations(&config, &mut out)?,
        Commands::Replay(args) => {
            let summary = replay::run(config, &args, &mut out)?;
            tracing::info!(
                delivery_id = %summary.delivery_id,
                destination = %summary.destination,
                frames = summary.frames,
                trip_secs = summary.trip_secs,
                "replay finished"
            );
        }
        Commands::Config => {
            serde_json::to_writer_pretty(&mut out, &config)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
