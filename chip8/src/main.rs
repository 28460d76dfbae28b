use std::error::Error;
use std::fs::File;
use std::io::BufReader;

use clap::Parser;
use log::info;

use pokip8_core::Chip8;

mod config;
mod headless;
#[cfg(feature = "sdl")]
mod keymap;
mod latest;
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
mod menu;
#[cfg(feature = "sdl")]
mod run;
#[cfg(feature = "sdl")]
mod screen;

use config::Config;

/// Steps to run without a window when no count is given
#[cfg(not(feature = "sdl"))]
const DEFAULT_HEADLESS_CYCLES: u64 = 1000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Config::parse();
    info!("{:?}", config);

    let mut chip8 = Chip8::new();
    let file = File::open(&config.rom)?;
    let mut reader = BufReader::new(file);
    chip8.load_rom(&mut reader)?;

    #[cfg(feature = "sdl")]
    {
        match config.headless {
            Some(cycles) => headless::run(&mut chip8, cycles),
            None => run::run(chip8, &config)?,
        }
    }
    #[cfg(not(feature = "sdl"))]
    {
        headless::run(
            &mut chip8,
            config.headless.unwrap_or(DEFAULT_HEADLESS_CYCLES),
        );
    }
    Ok(())
}
