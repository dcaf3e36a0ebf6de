//! Door controller emulator binary.
//!
//! # Usage
//!
//! ```bash
//! # Default timings
//! doorkey
//!
//! # Timings and limits from a file, chatty link logging
//! doorkey --config device.toml --log-level debug
//! ```
//!
//! Each stdin line is a sequence of keys (`0`-`9`, `=`, `+`, `-`). `m`
//! toggles the occupancy sensor, `q` quits. The display is printed to stdout
//! whenever it settles; logs go to stderr.

mod input;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use doorkey_core::{DeviceConfig, Occupancy, constants::DISPLAY_COLUMNS};
use doorkey_emulator::{Emulator, PanelEvent, render_screen};
use doorkey_hardware::mock::DisplaySnapshot;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, sleep_until};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::input::{Action, parse_line};

/// Delay before a changed display is printed, so that a screen drawn in
/// several writes shows up once.
const SCREEN_SETTLE: Duration = Duration::from_millis(25);

/// Two-node door controller emulator
#[derive(Parser, Debug)]
#[command(name = "doorkey")]
#[command(about = "Interactive emulator for the two-node door controller")]
#[command(version)]
struct Args {
    /// Device configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with the doorway occupied
    #[arg(long)]
    occupied: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DeviceConfig::default(),
    };

    let mut emulator = Emulator::builder()
        .with_config(config)
        .with_initial_occupancy(Occupancy::from(args.occupied))
        .start()?;
    println!("keys: 0-9 = + -   m: toggle motion   q: quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<DisplaySnapshot> = None;
    let mut printed: Option<DisplaySnapshot> = None;
    let mut settle_at = Instant::now();

    'session: loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                for action in parse_line(&line) {
                    match action {
                        Action::Key(key) => emulator.keypad.send_input(key).await?,
                        Action::ToggleMotion => match emulator.motion.toggle() {
                            Occupancy::Occupied => println!("motion: occupied"),
                            Occupancy::Vacant => println!("motion: vacant"),
                        },
                        Action::Quit => break 'session,
                    }
                }
            }
            Some(event) = emulator.next_event() => match event {
                PanelEvent::Screen(snapshot) => {
                    if pending.is_none() {
                        settle_at = Instant::now() + SCREEN_SETTLE;
                    }
                    pending = Some(snapshot);
                }
                other => println!("{other}"),
            },
            _ = sleep_until(settle_at), if pending.is_some() => {
                if let Some(snapshot) = pending.take()
                    && printed.as_ref() != Some(&snapshot)
                {
                    println!("{}", render_screen(&snapshot, DISPLAY_COLUMNS));
                    printed = Some(snapshot);
                }
            }
        }

        if emulator.is_finished() {
            break;
        }
    }

    let report = emulator.shutdown().await?;
    if let Err(e) = report.control_result
        && !e.is_link_closed()
    {
        anyhow::bail!("control node stopped: {e}");
    }
    if let Err(e) = report.interface_result
        && !e.is_disconnected()
    {
        anyhow::bail!("interface node stopped: {e}");
    }
    Ok(())
}
