use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pokip8_core::CLOCK_SPEED;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Steps per second unless told otherwise
const DEFAULT_CLOCK: u64 = NANOS_PER_SECOND / CLOCK_SPEED;
/// Window pixels per physical display pixel unless told otherwise
const DEFAULT_SCALE: u32 = 8;

/// How the host runs the interpreter
#[derive(Parser, Debug, PartialEq)]
#[command(name = "pokip8", version, about = "A Chip-8 interpreter", long_about = None)]
pub struct Config {
    #[arg(help = "Path to the ROM file to run")]
    pub rom: PathBuf,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_CLOCK,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Interpreter steps per second"
    )]
    pub clock: u64,

    #[arg(short, long, default_value_t = DEFAULT_SCALE, help = "Window pixels per display pixel")]
    pub scale: u32,

    #[arg(long, help = "Run this many steps without a window, then print the last frame")]
    pub headless: Option<u64>,
}

impl Config {
    /// Wall-clock time per interpreter step
    pub fn cycle_time(&self) -> Duration {
        Duration::from_nanos(NANOS_PER_SECOND / self.clock)
    }
}
