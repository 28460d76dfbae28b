use std::io::Read;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{KEY_COUNT, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::state::{GraphicsPlane, Keypad, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `pressed_keys` with public interfaces for manipulating them
///  - the random source behind `Cxkk`
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - stepping the CPU, one instruction and one timer tick at a time
/// - inspecting its graphics plane and draw flag for presentation by the host
pub struct Chip8 {
    state: State,
    pressed_keys: Keypad,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// An interpreter whose random numbers are fully determined by `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            pressed_keys: [false; KEY_COUNT],
            rng,
        }
    }

    /// Returns to the power-on state: font loaded, pc at the program start, everything else
    /// cleared. Any loaded program is lost.
    pub fn reset(&mut self) {
        self.state = State::new();
        self.pressed_keys = [false; KEY_COUNT];
    }

    /// Copy a program into memory at the program start
    ///
    /// # Arguments
    /// * `program` the program's bytes
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = usize::from(PROGRAM_START);
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        info!("loaded {} byte program at {:03X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Load a program from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), Chip8Error> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The graphics plane as drawn so far
    pub fn graphics(&self) -> &GraphicsPlane {
        &self.state.graphics
    }

    /// Returns whether anything was drawn since the last call, and clears the flag
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::replace(&mut self.state.draw_flag, false)
    }

    /// Whether the sound timer is running; the host beeps while it is
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        let key = usize::from(key);
        if key >= KEY_COUNT {
            return;
        }
        self.pressed_keys[key] = true;
        if let Some(register) = self.state.register_needing_key.take() {
            self.state.v[register] = key as u8;
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        if let Some(pressed) = self.pressed_keys.get_mut(usize::from(key)) {
            *pressed = false;
        }
    }

    /// Advances the CPU by a single step
    /// - skips execution while awaiting a keypress
    /// - gets and executes the next opcode; unknown opcodes are stepped over
    /// - decrements the timers
    pub fn step(&mut self) {
        if self.state.register_needing_key.is_none() {
            let op = self.state.fetch();
            match Instruction::decode(op) {
                Some(instruction) => {
                    trace!(
                        "{:03X} {:04X} {:?} v{:02X?} i{:03X}",
                        self.state.pc,
                        op,
                        instruction,
                        self.state.v,
                        self.state.i
                    );
                    instruction.execute(&mut self.state, &self.pressed_keys, &mut self.rng);
                }
                None => {
                    debug!("ignoring unknown opcode {:04X} at {:03X}", op, self.state.pc);
                    self.state.advance();
                }
            }
        }
        self.state.tick_timers();
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
