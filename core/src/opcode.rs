/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian in memory. Which bits select the
/// operation depends on the leading nibble, so every opcode is first reduced to its *class* by
/// masking it with one of four patterns:
/// - `0xFFFF` the whole word is the operation (`00E0`, `00EE`)
/// - `0xF000` only the leading nibble; the rest is operands (`1nnn`, `6xkk`, `Dxyn`, ...)
/// - `0xF00F` leading and trailing nibbles (`5xy0`, `8xy4`, `9xy0`, ...)
/// - `0xF0FF` leading nibble and low byte (`Ex9E`, `Fx33`, ...)
///
/// The nibbles left over by the mask carry the operands:
/// - `[_nnn]` a 12-bit address
/// - `[__kk]` an 8-bit immediate compared with or assigned to Vx
/// - `[_x__]` the register Vx, or the range V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a 4-bit immediate (sprite height)
pub trait Opcode {
    /// The Opcode's operation class: the opcode masked down to its selecting bits.
    fn class(&self) -> u16;

    /// The Opcode's component nibbles, most significant first.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// Index of the register named by the second nibble.
    /// `[_x__]`
    fn x(&self) -> usize;

    /// Index of the register named by the third nibble.
    /// `[__y_]`
    fn y(&self) -> usize;

    /// The Opcode's fourth nibble.
    /// `[___n]`
    fn n(&self) -> u8;

    /// The Opcode's least significant byte.
    /// `[__kk]`
    fn kk(&self) -> u8;

    /// The Opcode without its most significant nibble.
    /// `[_nnn]`
    fn nnn(&self) -> u16;
}

/// Mask selecting the bits that identify an operation, keyed by the leading nibble
fn class_mask(leading: u16) -> u16 {
    match leading {
        0x0 => 0xFFFF,
        0x5 | 0x8 | 0x9 => 0xF00F,
        0xE | 0xF => 0xF0FF,
        _ => 0xF000,
    }
}

impl Opcode for u16 {
    fn class(&self) -> u16 {
        self & class_mask(self >> 12)
    }

    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            (self >> 12) as u8,
            self.x() as u8,
            self.y() as u8,
            self.n(),
        )
    }

    fn x(&self) -> usize {
        usize::from((self & 0x0F00) >> 8)
    }

    fn y(&self) -> usize {
        usize::from((self & 0x00F0) >> 4)
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}
