pub use chip8::Chip8;
pub use constants::CLOCK_SPEED;
pub use error::Chip8Error;
pub use instruction::Instruction;
pub use state::{GraphicsPlane, Keypad, State};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
