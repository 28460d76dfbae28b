use std::io;

use thiserror::Error;

/// Errors the host can hit while preparing an interpreter.
/// Running programs never error; malformed programs are tolerated instead.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is {size} bytes but at most {max} fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program: {0}")]
    Io(#[from] io::Error),
}
