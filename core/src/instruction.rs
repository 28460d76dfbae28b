use rand::Rng;

use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::{Keypad, State};

/// A decoded Chip-8 instruction.
///
/// Register operands are indices into `State::v`; `addr` operands are 12-bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1nnn`
    Jump { addr: u16 },
    /// `2nnn`
    Call { addr: u16 },
    /// `3xkk`
    SkipEqual { x: usize, kk: u8 },
    /// `4xkk`
    SkipNotEqual { x: usize, kk: u8 },
    /// `5xy0`
    SkipRegistersEqual { x: usize, y: usize },
    /// `6xkk`
    Load { x: usize, kk: u8 },
    /// `7xkk`
    Add { x: usize, kk: u8 },
    /// `8xy0`
    Move { x: usize, y: usize },
    /// `8xy1`
    Or { x: usize, y: usize },
    /// `8xy2`
    And { x: usize, y: usize },
    /// `8xy3`
    Xor { x: usize, y: usize },
    /// `8xy4`
    AddRegisters { x: usize, y: usize },
    /// `8xy5`
    Sub { x: usize, y: usize },
    /// `8xy6`
    ShiftRight { x: usize, y: usize },
    /// `8xy7`
    SubReversed { x: usize, y: usize },
    /// `8xyE`
    ShiftLeft { x: usize, y: usize },
    /// `9xy0`
    SkipRegistersNotEqual { x: usize, y: usize },
    /// `Annn`
    LoadIndex { addr: u16 },
    /// `Bnnn`
    JumpOffset { addr: u16 },
    /// `Cxkk`
    Random { x: usize, kk: u8 },
    /// `Dxyn`
    Draw { x: usize, y: usize, n: u8 },
    /// `Ex9E`
    SkipKeyPressed { x: usize },
    /// `ExA1`
    SkipKeyReleased { x: usize },
    /// `Fx07`
    LoadDelay { x: usize },
    /// `Fx0A`
    WaitKey { x: usize },
    /// `Fx15`
    SetDelay { x: usize },
    /// `Fx18`
    SetSound { x: usize },
    /// `Fx1E`
    AddIndex { x: usize },
    /// `Fx29`
    LoadFont { x: usize },
    /// `Fx33`
    StoreBcd { x: usize },
    /// `Fx55`
    StoreRegisters { x: usize },
    /// `Fx65`
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Selects the Instruction for an opcode by its operation class.
    /// Returns `None` for opcodes outside the instruction set.
    pub fn decode(op: u16) -> Option<Self> {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.nnn());
        let instruction = match op.class() {
            0x00E0 => Clear,
            0x00EE => Return,
            0x1000 => Jump { addr },
            0x2000 => Call { addr },
            0x3000 => SkipEqual { x, kk },
            0x4000 => SkipNotEqual { x, kk },
            0x5000 => SkipRegistersEqual { x, y },
            0x6000 => Load { x, kk },
            0x7000 => Add { x, kk },
            0x8000 => Move { x, y },
            0x8001 => Or { x, y },
            0x8002 => And { x, y },
            0x8003 => Xor { x, y },
            0x8004 => AddRegisters { x, y },
            0x8005 => Sub { x, y },
            0x8006 => ShiftRight { x, y },
            0x8007 => SubReversed { x, y },
            0x800E => ShiftLeft { x, y },
            0x9000 => SkipRegistersNotEqual { x, y },
            0xA000 => LoadIndex { addr },
            0xB000 => JumpOffset { addr },
            0xC000 => Random { x, kk },
            0xD000 => Draw { x, y, n },
            0xE09E => SkipKeyPressed { x },
            0xE0A1 => SkipKeyReleased { x },
            0xF007 => LoadDelay { x },
            0xF00A => WaitKey { x },
            0xF015 => SetDelay { x },
            0xF018 => SetSound { x },
            0xF01E => AddIndex { x },
            0xF029 => LoadFont { x },
            0xF033 => StoreBcd { x },
            0xF055 => StoreRegisters { x },
            0xF065 => LoadRegisters { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// Applies the instruction to `state`, including its program counter update
    pub fn execute(self, state: &mut State, pressed_keys: &Keypad, rng: &mut impl Rng) {
        use Instruction::*;

        match self {
            Clear => clr(state),
            Return => rts(state),
            Jump { addr } => jump(state, addr),
            Call { addr } => call(state, addr),
            SkipEqual { x, kk } => ske(state, x, kk),
            SkipNotEqual { x, kk } => skne(state, x, kk),
            SkipRegistersEqual { x, y } => skre(state, x, y),
            Load { x, kk } => load(state, x, kk),
            Add { x, kk } => add(state, x, kk),
            Move { x, y } => mv(state, x, y),
            Or { x, y } => or(state, x, y),
            And { x, y } => and(state, x, y),
            Xor { x, y } => xor(state, x, y),
            AddRegisters { x, y } => addr(state, x, y),
            Sub { x, y } => sub(state, x, y),
            ShiftRight { x, y } => shr(state, x, y),
            SubReversed { x, y } => subn(state, x, y),
            ShiftLeft { x, y } => shl(state, x, y),
            SkipRegistersNotEqual { x, y } => skrne(state, x, y),
            LoadIndex { addr } => loadi(state, addr),
            JumpOffset { addr } => jumpi(state, addr),
            Random { x, kk } => rand(state, x, kk, rng),
            Draw { x, y, n } => draw(state, x, y, n),
            SkipKeyPressed { x } => skpr(state, x, pressed_keys),
            SkipKeyReleased { x } => skup(state, x, pressed_keys),
            LoadDelay { x } => moved(state, x),
            WaitKey { x } => keyd(state, x),
            SetDelay { x } => loads(state, x),
            SetSound { x } => ld(state, x),
            AddIndex { x } => addi(state, x),
            LoadFont { x } => ldspr(state, x),
            StoreBcd { x } => bcd(state, x),
            StoreRegisters { x } => stor(state, x),
            LoadRegisters { x } => read(state, x),
        }
    }
}
