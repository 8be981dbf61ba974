//! poolctl: pool/spa controller daemon.
//!
//! Reads one command path per line on stdin (`/mode/set/spa`, `/valve/0/status`,
//! ...) and answers with one JSON object per line on stdout.  Logs go to
//! stderr.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LinuxI2cBus     TimerDelay     LogEventSink   JsonFileConfig  │
//! │  (BusPort)       (DelayPort)    (EventSink)    (ConfigPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  PlanEngine · Reconciler · Equipment · SharedBus       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  console thread ─▶ command task ─▶ plan runner · monitor       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
mod console;

// ── Imports ───────────────────────────────────────────────────
use std::time::Duration;

use anyhow::{Context, Result};
use async_io_mini::Timer;
use log::{info, warn};
use serde::Serialize;

use console::{Input, INPUT_CHANNEL, PLAN_CHANNEL};
use poolctl::adapters::config_file::{JsonFileConfig, DEFAULT_CONFIG_PATH};
use poolctl::adapters::i2c::LinuxI2cBus;
use poolctl::adapters::log_sink::LogEventSink;
use poolctl::adapters::time::TimerDelay;
use poolctl::app::commands::AppCommand;
use poolctl::app::ports::ConfigPort;
use poolctl::app::service::{Controller, ModeSet, Response};
use poolctl::config::SystemConfig;

type App = Controller<LinuxI2cBus, TimerDelay, LogEventSink>;

// ── Entry point ───────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  poolctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── Configuration ─────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let store = JsonFileConfig::new(config_path);
    let config = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    info!(
        "Bus {} @ {:#04x}, status every {}s",
        config.bus_path, config.slave_address, config.status_interval_secs
    );

    // ── Hardware ──────────────────────────────────────────────
    let bus = LinuxI2cBus::open(&config.bus_path, config.slave_address)
        .with_context(|| format!("opening {}", config.bus_path))?;
    let app: App = Controller::new(bus, TimerDelay::new(), LogEventSink::new(), &config);

    let _reader = console::spawn_reader().context("spawning console reader")?;

    // ── Executor ──────────────────────────────────────────────
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor.spawn(plan_runner(&app)).detach();
    executor.spawn(command_loop(&app)).detach();
    executor
        .spawn(monitor(
            &app,
            Duration::from_secs(config.status_interval_secs.into()),
        ))
        .detach();
    if let Some(mode) = config.startup_mode.as_deref() {
        executor.spawn(start_mode(&app, mode)).detach();
    }

    info!("System ready.");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    Ok(())
}

// ── Tasks ─────────────────────────────────────────────────────

/// Claim a mode and queue it for the plan runner.
async fn start_mode(app: &App, name: &str) -> ModeSet {
    match app.accept_mode(name) {
        Ok(plan) => {
            PLAN_CHANNEL.send(plan).await;
            ModeSet::accepted()
        }
        Err(e) => ModeSet::rejected(e),
    }
}

/// Runs accepted plans one at a time.  Outcomes reach the log via the
/// event sink.
async fn plan_runner(app: &App) {
    loop {
        let plan = PLAN_CHANNEL.receive().await;
        let _ = app.run_mode(plan).await;
    }
}

/// One JSON reply per console line.  Mode changes reply as soon as the
/// plan is accepted; every other command replies when it completes.
async fn command_loop(app: &App) {
    loop {
        let line = match INPUT_CHANNEL.receive().await {
            Input::Line(line) => line,
            Input::Closed => {
                info!("Console closed; continuing headless");
                return;
            }
        };
        match line.parse::<AppCommand>() {
            Ok(AppCommand::SetMode(name)) => {
                reply(&Response::ModeSet(start_mode(app, &name).await));
            }
            Ok(cmd) => reply(&app.handle(cmd).await),
            Err(e) => reply(&Response::Error {
                error: e.to_string(),
            }),
        }
    }
}

/// Periodic mode check and temperature report.
async fn monitor(app: &App, interval: Duration) {
    loop {
        app.telemetry().await;
        Timer::after(interval).await;
    }
}

fn reply(value: &impl Serialize) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("reply encode failed: {}", e),
    }
}
