/// Nanoseconds per CPU cycle; the interpreter is paced at 500Hz by the host
pub const CLOCK_SPEED: u64 = 2_000_000;

/// Width of the logical graphics plane in pixels
pub const DISPLAY_WIDTH: usize = 64;
/// Height of the logical graphics plane in pixels
pub const DISPLAY_HEIGHT: usize = 32;

/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;
/// Number of V registers (V0..VF)
pub const REGISTER_COUNT: usize = 16;
/// Number of return addresses the call stack can hold
pub const STACK_SIZE: usize = 16;
/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// Address that programs are loaded at and that the program counter starts from
pub const PROGRAM_START: u16 = 0x200;
/// Largest program that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Address of the first font sprite
pub const FONT_START: u16 = 0x000;
/// Bytes per font sprite
pub const FONT_SPRITE_SIZE: u16 = 5;

/// # Sprite sheet
/// The hexadecimal digits 0..F, five rows of four pixels each.
/// Each byte is a row; only its high nibble is drawn.
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
#[rustfmt::skip]
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
