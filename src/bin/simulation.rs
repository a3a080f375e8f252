//! Three-Phase Meter Simulation
//!
//! Generates a realistic three-phase power meter stream as phasewatch host
//! events (JSON lines). Simulates:
//! - Grid voltage around the nominal phase voltage
//! - Slowly cycling, unbalanced phase loads
//! - Harmonic distortion and power factor noise
//! - Host quirks: batches before configuration, dropped datapoints
//!
//! # Usage
//! ```bash
//! ./meter-simulation --count 120 --interval-ms 0 | ./phasewatch --stdin
//! ```

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, Write};
use std::time::Duration;

use phasewatch::config::defaults::{NOMINAL_PHASE_VOLTAGE, SIMULATION_INTERVAL_MS};
use phasewatch::{Channel, ChannelLayout, HostEvent, LayoutProfile, ValueBatch};

// ============================================================================
// Load Constants
// ============================================================================

/// Mean phase current (A)
const BASE_CURRENT: f64 = 10.0;
/// Amplitude of the slow load cycle (A)
const LOAD_SWING: f64 = 3.0;
/// Load cycle period in samples
const LOAD_PERIOD: f64 = 120.0;
/// Per-phase load imbalance factors
const PHASE_IMBALANCE: [f64; 3] = [1.0, 1.1, 0.9];
/// Mean power factor
const BASE_POWER_FACTOR: f64 = 0.95;
/// Mean current THD (%)
const BASE_CURRENT_THD: f64 = 4.0;
/// Mean voltage THD (%)
const BASE_VOLTAGE_THD: f64 = 1.8;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "meter-simulation")]
#[command(about = "Three-phase meter stream simulation for phasewatch testing")]
#[command(version = "1.0")]
struct Args {
    /// Channel layout profile the simulated host delivers (basic, standard, extended)
    #[arg(long, default_value = "standard")]
    profile: LayoutProfile,

    /// Number of value batches to emit
    #[arg(short, long, default_value = "60")]
    count: u64,

    /// Delay between batches in milliseconds (0 = as fast as possible)
    #[arg(long, default_value_t = SIMULATION_INTERVAL_MS)]
    interval_ms: u64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Batches emitted before the channel configuration
    #[arg(long, default_value = "0")]
    batches_before_config: u64,

    /// Probability that a datapoint is missing from a batch (0.0-1.0)
    #[arg(long, default_value = "0.0")]
    drop_rate: f64,
}

// ============================================================================
// Meter Model
// ============================================================================

struct MeterSimulator {
    layout: ChannelLayout,
    ids: Vec<String>,
    rng: StdRng,
    voltage_noise: Normal<f64>,
    current_noise: Normal<f64>,
    pf_noise: Normal<f64>,
    thd_noise: Normal<f64>,
    drop_rate: f64,
    interval_hours: f64,
    energy_kwh: f64,
    sample: u64,
}

impl MeterSimulator {
    fn new(args: &Args) -> Result<Self, Box<dyn std::error::Error>> {
        let layout = ChannelLayout::from_profile(args.profile);
        let ids = layout
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| format!("dp{:02}.{}", i, slot.channel.label().replace(' ', "_")))
            .collect();
        let rng = match args.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        // Energy accrues at 1 s per batch when running unthrottled.
        let interval_ms = if args.interval_ms == 0 { 1000 } else { args.interval_ms };

        Ok(Self {
            layout,
            ids,
            rng,
            voltage_noise: Normal::new(0.0, 1.5)?,
            current_noise: Normal::new(0.0, 0.3)?,
            pf_noise: Normal::new(0.0, 0.01)?,
            thd_noise: Normal::new(0.0, 0.4)?,
            drop_rate: args.drop_rate.clamp(0.0, 1.0),
            interval_hours: interval_ms as f64 / 3_600_000.0,
            energy_kwh: 0.0,
            sample: 0,
        })
    }

    fn configuration(&self) -> HostEvent {
        HostEvent::Configuration {
            ids: self.ids.clone(),
        }
    }

    fn next_batch(&mut self) -> HostEvent {
        let phase = self.sample as f64 * std::f64::consts::TAU / LOAD_PERIOD;
        self.sample += 1;

        let mut voltages = [0.0; 3];
        let mut currents = [0.0; 3];
        let mut pfs = [0.0; 3];
        let mut powers = [0.0; 3];
        for k in 0..3 {
            voltages[k] = NOMINAL_PHASE_VOLTAGE + self.voltage_noise.sample(&mut self.rng);
            let load = BASE_CURRENT + LOAD_SWING * (phase + k as f64).sin();
            currents[k] = (load * PHASE_IMBALANCE[k] + self.current_noise.sample(&mut self.rng)).max(0.0);
            pfs[k] = (BASE_POWER_FACTOR + self.pf_noise.sample(&mut self.rng)).clamp(0.0, 1.0);
            powers[k] = voltages[k] * currents[k] * pfs[k] / 1000.0;
        }
        let total: f64 = powers.iter().sum();
        self.energy_kwh += total * self.interval_hours;

        let mut batch = ValueBatch::new();
        for (slot, id) in self.layout.slots().iter().zip(&self.ids) {
            if self.drop_rate > 0.0 && self.rng.gen_bool(self.drop_rate) {
                continue;
            }
            let value = match slot.channel {
                Channel::U1 => voltages[0],
                Channel::U2 => voltages[1],
                Channel::U3 => voltages[2],
                Channel::I1 => currents[0],
                Channel::I2 => currents[1],
                Channel::I3 => currents[2],
                Channel::P1 => powers[0],
                Channel::P2 => powers[1],
                Channel::P3 => powers[2],
                Channel::PTotal | Channel::ActivePower => total,
                Channel::PMax => powers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Channel::PMin => powers.iter().copied().fold(f64::INFINITY, f64::min),
                Channel::ThdI1 | Channel::ThdI2 | Channel::ThdI3 => {
                    (BASE_CURRENT_THD + self.thd_noise.sample(&mut self.rng)).abs()
                }
                Channel::ThdU1n | Channel::ThdU2n | Channel::ThdU3n => {
                    (BASE_VOLTAGE_THD + self.thd_noise.sample(&mut self.rng) / 2.0).abs()
                }
                Channel::ActiveEnergy => self.energy_kwh,
                Channel::Pf1 => pfs[0],
                Channel::Pf2 => pfs[1],
                Channel::Pf3 => pfs[2],
                Channel::PfTotal => pfs.iter().sum::<f64>() / 3.0,
            };
            batch = batch.with(id.clone(), round3(value));
        }

        HostEvent::Values { batch }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut sim = MeterSimulator::new(&args)?;

    eprintln!(
        "Simulating {} batches | profile: {} ({} channels) | interval: {} ms | drop rate: {:.2}",
        args.count,
        args.profile,
        sim.layout.len(),
        args.interval_ms,
        sim.drop_rate
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let interval = Duration::from_millis(args.interval_ms);
    let mut configured = false;

    for n in 0..args.count {
        if !configured && n >= args.batches_before_config {
            writeln!(out, "{}", serde_json::to_string(&sim.configuration())?)?;
            configured = true;
        }
        writeln!(out, "{}", serde_json::to_string(&sim.next_batch())?)?;
        out.flush()?;

        if !interval.is_zero() && n + 1 < args.count {
            std::thread::sleep(interval);
        }
    }

    if !configured {
        writeln!(out, "{}", serde_json::to_string(&sim.configuration())?)?;
    }
    out.flush()?;
    Ok(())
}
