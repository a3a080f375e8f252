//! phasewatch - three-phase meter aggregation host
//!
//! Reads host events (channel configuration and value batches) as JSON lines
//! and publishes an aggregation frame after every processing pass.
//!
//! # Usage
//!
//! ```bash
//! # Live stream from the simulator
//! meter-simulation --count 60 | phasewatch --stdin --emit-frames
//!
//! # Replay a recording at 200 ms per event
//! phasewatch --replay session.jsonl --delay-ms 200
//!
//! # Show the effective configuration
//! phasewatch --profile extended --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `PHASEWATCH_CONFIG`: Path to the TOML configuration
//! - `PHASEWATCH_PROFILE`: Layout profile override (same as `--profile`)
//! - `RUST_LOG`: Logging level (default: info)
//!
//! Logs go to stderr; with `--emit-frames` stdout carries one JSON frame per line.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use phasewatch::pipeline::{
    EventSource, FrameObserver, MonitorCoordinator, ProcessingLoop, ReplaySource, StdinSource,
};
use phasewatch::{AggregationFrame, Channel, LayoutProfile, MonitorConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "phasewatch")]
#[command(about = "Three-phase power meter telemetry aggregation")]
#[command(version)]
struct CliArgs {
    /// Read host events from stdin (JSON lines)
    /// Use with simulator: meter-simulation | phasewatch --stdin
    #[arg(long, conflicts_with = "replay")]
    stdin: bool,

    /// Replay host events from a JSON-lines file
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Delay between replayed events in milliseconds (0 = no delay)
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Path to the TOML configuration (overrides PHASEWATCH_CONFIG and ./phasewatch.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Channel layout profile (basic, standard, extended)
    #[arg(long, env = "PHASEWATCH_PROFILE")]
    profile: Option<LayoutProfile>,

    /// Write every published frame to stdout as a JSON line
    #[arg(long)]
    emit_frames: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Emit logs as JSON objects instead of plain text
    #[arg(long)]
    log_json: bool,
}

// ============================================================================
// Frame Observers
// ============================================================================

/// Writes each frame as one JSON line to stdout.
struct JsonLinesObserver {
    out: Mutex<std::io::Stdout>,
}

impl FrameObserver for JsonLinesObserver {
    fn on_frame(&self, frame: &Arc<AggregationFrame>) {
        let json = match serde_json::to_string(frame.as_ref()) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize frame {}: {}", frame.sequence, e);
                return;
            }
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{}", json).and_then(|_| out.flush()) {
            warn!("Failed to write frame {}: {}", frame.sequence, e);
        }
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}

/// Logs a one-line summary per frame.
struct LogObserver;

impl FrameObserver for LogObserver {
    fn on_frame(&self, frame: &Arc<AggregationFrame>) {
        info!(
            "#{} [{}] U {:.1}/{:.1}/{:.1} {} | I {:.2} {} | P {:.2} {} | THD {:.1}{}",
            frame.sequence,
            frame.status,
            frame.reading(Channel::U1),
            frame.reading(Channel::U2),
            frame.reading(Channel::U3),
            Channel::U1.unit(),
            frame.derived.current_total,
            Channel::I1.unit(),
            frame.derived.phase_power_total,
            Channel::P1.unit(),
            frame.derived.dominant_thd,
            Channel::ThdI1.unit(),
        );
    }

    fn name(&self) -> &str {
        "log"
    }
}

// ============================================================================
// Main
// ============================================================================

fn load_config(args: &CliArgs) -> Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::load(),
    };

    if let Some(profile) = args.profile {
        config.engine.profile = profile;
        config.engine.slots.clear();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run<S: EventSource>(
    mut source: S,
    config: &MonitorConfig,
    emit_frames: bool,
    cancel_token: CancellationToken,
) -> Result<()> {
    let mut coordinator = MonitorCoordinator::with_system_clock(config);
    if emit_frames {
        coordinator.subscribe(Box::new(JsonLinesObserver {
            out: Mutex::new(std::io::stdout()),
        }));
    } else {
        coordinator.subscribe(Box::new(LogObserver));
    }

    let mut processing = ProcessingLoop::new(coordinator, cancel_token);
    let stats = processing.run(&mut source).await;

    if stats.pipeline.status == phasewatch::MonitorStatus::Unconfigured {
        warn!("Input ended without a channel configuration");
    }
    Ok(())
}

/// Logs go to stderr so stdout stays free for frames.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);
    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!(
        "phasewatch {} | profile: {} | {} channels | history: {} points",
        env!("CARGO_PKG_VERSION"),
        config.engine.profile,
        config.engine.layout().len(),
        config.history.capacity
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    if let Some(path) = &args.replay {
        let source = ReplaySource::from_file(path, args.delay_ms)
            .with_context(|| format!("Failed to load replay file {}", path.display()))?;
        info!("Input: replay of {} events from {}", source.remaining(), path.display());
        run(source, &config, args.emit_frames, cancel_token).await?;
    } else {
        if !args.stdin {
            info!("No input selected, reading stdin (use --replay <FILE> for recordings)");
        }
        run(StdinSource::stdin(), &config, args.emit_frames, cancel_token).await?;
    }

    info!("phasewatch shutdown complete");
    Ok(())
}
