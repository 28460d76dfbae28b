use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_START, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, SPRITE_SHEET, STACK_SIZE,
};

/// The graphics plane is indexed as [y][x]; each cell is 0 (unset) or 1 (set)
pub type GraphicsPlane = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A graphics plane with every pixel unset
pub const BLANK_PLANE: GraphicsPlane = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of the keys 0..F
pub type Keypad = [bool; KEY_COUNT];

/// Program counter and memory addresses stay inside the 4K address space
const ADDRESS_MASK: u16 = (MEMORY_SIZE - 1) as u16;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, always inside memory
///
/// Stack
/// - 16 return addresses
/// - (sp) the next free slot; `0 <= sp <= 16`
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per executed step
///
/// ## Memory
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the font sprites
///     - programs are loaded at 0x200
/// - 64x32 graphics plane
///
/// ## Input
/// - Emulation halts while `register_needing_key` waits for a key press
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub graphics: GraphicsPlane,
    pub draw_flag: bool,
    pub register_needing_key: Option<usize>,
}

impl State {
    /// Power-on state: font loaded, everything else zeroed, pc at the program start
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = usize::from(FONT_START);
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            graphics: BLANK_PLANE,
            draw_flag: false,
            register_needing_key: None,
        }
    }

    /// Reads the byte at `addr`, wrapping addresses past the end of memory
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr & ADDRESS_MASK)]
    }

    /// Writes the byte at `addr`, wrapping addresses past the end of memory
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[usize::from(addr & ADDRESS_MASK)] = value;
    }

    /// The big-endian opcode the pc points at
    pub fn fetch(&self) -> u16 {
        u16::from(self.read(self.pc)) << 8 | u16::from(self.read(self.pc.wrapping_add(1)))
    }

    /// Moves on to the next instruction
    pub fn advance(&mut self) {
        self.jump(self.pc.wrapping_add(2));
    }

    /// Moves past the next instruction if `condition` holds, otherwise onto it
    pub fn skip_if(&mut self, condition: bool) {
        self.advance();
        if condition {
            self.advance();
        }
    }

    pub fn jump(&mut self, addr: u16) {
        self.pc = addr & ADDRESS_MASK;
    }

    /// Saves a return address; false if the stack is already full
    pub fn push(&mut self, addr: u16) -> bool {
        if self.sp >= STACK_SIZE {
            return false;
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        true
    }

    /// Pops the most recent return address, if any
    pub fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.stack[self.sp])
    }

    /// Decrements each non-zero timer once
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_font_and_program_start() {
        let state = State::new();
        assert_eq!(state.memory[0..80], SPRITE_SHEET[..]);
        assert_eq!(state.pc, PROGRAM_START);
        assert!(state.memory[80..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_fetch_is_big_endian() {
        let mut state = State::new();
        state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(state.fetch(), 0xAABB);
    }

    #[test]
    fn test_fetch_wraps_at_end_of_memory() {
        let mut state = State::new();
        state.pc = 0xFFF;
        state.memory[0xFFF] = 0x12;
        state.memory[0x000] = 0x34;
        assert_eq!(state.fetch(), 0x1234);
    }

    #[test]
    fn test_advance_wraps_pc() {
        let mut state = State::new();
        state.pc = 0xFFE;
        state.advance();
        assert_eq!(state.pc, 0x000);
    }

    #[test]
    fn test_memory_access_wraps() {
        let mut state = State::new();
        state.write(0x1005, 0xAB);
        assert_eq!(state.memory[0x005], 0xAB);
        assert_eq!(state.read(0x1005), 0xAB);
    }

    #[test]
    fn test_stack_guards_overflow() {
        let mut state = State::new();
        for addr in 0..STACK_SIZE as u16 {
            assert!(state.push(addr));
        }
        assert!(!state.push(0xFFF));
        assert_eq!(state.sp, STACK_SIZE);
    }

    #[test]
    fn test_stack_guards_underflow() {
        let mut state = State::new();
        assert_eq!(state.pop(), None);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut state = State::new();
        state.delay_timer = 1;
        state.tick_timers();
        state.tick_timers();
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
    }
}
