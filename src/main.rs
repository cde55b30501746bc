//! Lock console: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  MqttAdapter       ConsoleSink     KvStoreAdapter            │
//! │  (Transport)       (EventSink)     (Storage)                 │
//! │  JsonConfigAdapter (Config)                                  │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │            AppService (pure logic)                   │    │
//! │  │  Classifier · Enrollment session · Registry          │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  Console loop: one consumer over LINK + OPERATOR channels    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use lockconsole::Error;
use lockconsole::adapters::config_file::JsonConfigAdapter;
use lockconsole::adapters::console_sink::ConsoleSink;
use lockconsole::adapters::kv_store::KvStoreAdapter;
use lockconsole::adapters::mqtt::MqttAdapter;
use lockconsole::app::commands::AppCommand;
use lockconsole::app::ports::ConfigPort;
use lockconsole::app::service::AppService;
use lockconsole::channels::{Inbound, next_inbound, send_operator_command};
use lockconsole::config::ConsoleConfig;

const USAGE: &str =
    "connect | disconnect | add-rfid <name> | add-finger <name> | list | clear | quit";

/// Operator console for the ESP32 door lock.
#[derive(Parser, Debug)]
#[command(name = "lockconsole", version, about)]
struct Args {
    /// JSON config file (defaults are used when it does not exist).
    #[arg(short = 'c', long = "config", default_value = "lockconsole.json")]
    config: PathBuf,

    /// Registry store file (overrides `store_path` from the config).
    #[arg(long = "store", conflicts_with = "memory")]
    store: Option<PathBuf>,

    /// Keep the registry in memory only; nothing is written to disk.
    #[arg(long = "memory")]
    memory: bool,

    /// Broker host (overrides the config).
    #[arg(long = "broker")]
    broker: Option<String>,

    /// Broker port (overrides the config).
    #[arg(long = "port")]
    port: Option<u16>,

    /// Write the effective config to `--config` and exit.
    #[arg(long = "write-default-config")]
    write_default_config: bool,
}

fn main() -> Result<()> {
    // ── 1. Logging (stderr; stdout belongs to the operator log) ──
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("lockconsole v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config_file = JsonConfigAdapter::new(&args.config);
    let config = load_config(&config_file, &args)?;

    if args.write_default_config {
        config_file
            .save(&config)
            .map_err(Error::from)
            .with_context(|| format!("writing {}", args.config.display()))?;
        println!("Wrote {}", args.config.display());
        return Ok(());
    }

    // ── 3. Registry store ─────────────────────────────────────
    let store_path = args
        .store
        .clone()
        .or_else(|| config.store_path.as_ref().map(PathBuf::from));
    let store = match store_path {
        Some(path) if !args.memory => KvStoreAdapter::open(&path)
            .map_err(Error::from)
            .with_context(|| format!("opening store {}", path.display()))?,
        _ => KvStoreAdapter::in_memory(),
    };

    // ── 4. Core + adapters ────────────────────────────────────
    let mut app = AppService::new(&config, store);
    let mut sink = ConsoleSink::stdout();
    let mut mqtt = MqttAdapter::new(&config);
    info!(
        "Registry: {} users, broker {}:{}",
        app.registry().len(),
        config.broker_host,
        config.broker_port
    );

    spawn_operator_input()?;
    println!("Commands: {USAGE}");

    // ── 5. Console loop ───────────────────────────────────────
    app.handle_command(AppCommand::Connect, &mut mqtt, &mut sink);
    loop {
        match next_inbound() {
            Inbound::Link(event) => app.handle_link_event(event, &mut mqtt, &mut sink),
            Inbound::Operator(AppCommand::Quit) => {
                app.handle_command(AppCommand::Disconnect, &mut mqtt, &mut sink);
                break;
            }
            Inbound::Operator(cmd) => app.handle_command(cmd, &mut mqtt, &mut sink),
        }
    }

    info!("lockconsole: bye");
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(file: &JsonConfigAdapter, args: &Args) -> Result<ConsoleConfig> {
    let mut config = file
        .load()
        .map_err(Error::from)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(host) = &args.broker {
        config.broker_host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.broker_port = port;
    }
    config.validate().map_err(Error::from)?;
    Ok(config)
}

/// Read operator lines from stdin and feed parsed commands to the loop.
/// End of input quits.
fn spawn_operator_input() -> Result<()> {
    thread::Builder::new()
        .name("operator-input".into())
        .spawn(|| {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Console: stdin read failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match AppCommand::parse(&line) {
                    Ok(cmd) => {
                        let quit = cmd == AppCommand::Quit;
                        send_operator_command(cmd);
                        if quit {
                            return;
                        }
                    }
                    Err(e) => eprintln!("{e} ({USAGE})"),
                }
            }
            send_operator_command(AppCommand::Quit);
        })
        .context("spawning operator input thread")?;
    Ok(())
}
