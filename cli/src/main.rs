//! `kiosk-sim`: run the kiosk simulator headless and print events as JSON
//!
//! ```text
//! kiosk-sim [seed] [minutes] [frequency]
//! ```
//!
//! Every published event is written to stdout as one JSON line. Logs go to
//! stderr and honour `RUST_LOG`.

use anyhow::{bail, Context};
use kiosk_simulator_core_rs::{EventKind, SettingsPatch, Simulator, SimulatorConfig};
use std::io::Write;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_MINUTES: u64 = 60;
const MS_PER_MINUTE: u64 = 60_000;

struct Args {
    seed: u64,
    minutes: u64,
    frequency: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);

    let seed = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid seed: {raw}"))?,
        None => DEFAULT_SEED,
    };
    let minutes = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid minutes: {raw}"))?,
        None => DEFAULT_MINUTES,
    };
    let frequency = args.next();

    if args.next().is_some() {
        bail!("usage: kiosk-sim [seed] [minutes] [frequency]");
    }

    Ok(Args {
        seed,
        minutes,
        frequency,
    })
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = parse_args()?;

    let mut sim = Simulator::new(SimulatorConfig {
        rng_seed: args.seed,
        ..Default::default()
    })?;

    for kind in EventKind::ALL {
        sim.subscribe(kind, |event| {
            let line = serde_json::to_string(event)
                .map_err(|e| kiosk_simulator_core_rs::HandlerError::new(e.to_string()))?;
            let mut out = std::io::stdout().lock();
            writeln!(out, "{line}")
                .map_err(|e| kiosk_simulator_core_rs::HandlerError::new(e.to_string()))
        });
    }

    // Unknown frequencies fall back to medium inside the settings parser
    let patch = SettingsPatch {
        order_frequency: args.frequency.map(Into::into),
        ..Default::default()
    };

    tracing::info!(seed = args.seed, minutes = args.minutes, "starting kiosk simulation");
    sim.start(patch);

    for _ in 0..args.minutes {
        sim.advance(MS_PER_MINUTE);
    }

    sim.stop();

    let stats = sim.stats();
    tracing::info!(
        total = stats.total,
        pending = stats.pending,
        in_progress = stats.in_progress,
        completed = stats.completed,
        picked_up = stats.picked_up,
        transfers = sim.balancer_stats().transfers_today,
        "simulation finished"
    );

    Ok(())
}
