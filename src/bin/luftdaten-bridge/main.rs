mod args;

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::Args;
use chrono_tz::Tz;
use clap::Parser as _;
use luftdaten_bridge::{
    accessory::{LuftdatenAccessory, Service},
    poller::{DeviceEndpoint, FeedPoller},
    state::{SensorState, SharedSensorState, lock},
};
use serde::Serialize;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct Report {
    updated_at: Option<String>,
    staleness: i32,
    services: Vec<Service>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let poll_interval = Duration::from_secs(args.interval_secs);

    let state = SensorState::shared();
    let endpoint = DeviceEndpoint::new(&args.host)
        .with_port(args.port)
        .with_interval(poll_interval);

    let poller = FeedPoller::new(endpoint, state.clone()).context("failed to build HTTP client")?;
    let accessory = LuftdatenAccessory::new(&args.name, &args.host, state.clone());

    accessory.identify();
    let handle = poller.start();

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the immediate tick so the first report follows the first poll.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = build_report(&accessory, &state, args.timezone);
                let line = serde_json::to_string(&report).context("failed to serialize report")?;
                println!("{line}");
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                info!("shutting down");
                break;
            }
        }
    }

    handle.stop().await;

    Ok(())
}

fn build_report(
    accessory: &LuftdatenAccessory,
    state: &SharedSensorState,
    timezone: Tz,
) -> Report {
    let (updated_at, staleness) = {
        let state = lock(state);
        (
            state
                .measurement()
                .updated_at
                .map(|at| at.with_timezone(&timezone).to_rfc3339()),
            state.staleness(),
        )
    };

    Report {
        updated_at,
        staleness,
        services: accessory.services(),
    }
}
