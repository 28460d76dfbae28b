use log::warn;
use rand::Rng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SPRITE_SIZE, FONT_START};
use crate::state::{Keypad, State, BLANK_PLANE};

/// Index of the flag register
const VF: usize = 0xF;

/// Writes an ALU result and its flag.
/// The flag goes last so that it wins when Vx is VF.
fn store_with_flag(state: &mut State, x: usize, value: u8, flag: bool) {
    state.v[x] = value;
    state.v[VF] = u8::from(flag);
    state.advance();
}

/// clear
pub fn clr(state: &mut State) {
    state.graphics = BLANK_PLANE;
    state.draw_flag = true;
    state.advance();
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) {
    match state.pop() {
        Some(addr) => state.jump(addr),
        None => {
            warn!("return with an empty stack at {:03X}; ignoring", state.pc);
            state.advance();
        }
    }
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) {
    state.jump(addr);
}

/// STACK.push(PC + 2); PC = addr
pub fn call(state: &mut State, addr: u16) {
    let return_addr = state.pc.wrapping_add(2);
    if state.push(return_addr) {
        state.jump(addr);
    } else {
        warn!("call to {:03X} overflows the stack at {:03X}; ignoring", addr, state.pc);
        state.advance();
    }
}

/// if Vx == kk then pc += 2
pub fn ske(state: &mut State, x: usize, kk: u8) {
    let condition = state.v[x] == kk;
    state.skip_if(condition);
}

/// if Vx != kk then pc += 2
pub fn skne(state: &mut State, x: usize, kk: u8) {
    let condition = state.v[x] != kk;
    state.skip_if(condition);
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: usize, y: usize) {
    let condition = state.v[x] == state.v[y];
    state.skip_if(condition);
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: usize, y: usize) {
    let condition = state.v[x] != state.v[y];
    state.skip_if(condition);
}

/// Vx = kk
pub fn load(state: &mut State, x: usize, kk: u8) {
    state.v[x] = kk;
    state.advance();
}

/// Vx += kk
/// Overflow wraps and VF is left alone
pub fn add(state: &mut State, x: usize, kk: u8) {
    state.v[x] = state.v[x].wrapping_add(kk);
    state.advance();
}

/// Vx = Vy
pub fn mv(state: &mut State, x: usize, y: usize) {
    state.v[x] = state.v[y];
    state.advance();
}

/// Vx |= Vy
pub fn or(state: &mut State, x: usize, y: usize) {
    state.v[x] |= state.v[y];
    state.advance();
}

/// Vx &= Vy
pub fn and(state: &mut State, x: usize, y: usize) {
    state.v[x] &= state.v[y];
    state.advance();
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: usize, y: usize) {
    state.v[x] ^= state.v[y];
    state.advance();
}

/// Vx += Vy; VF = overflow
pub fn addr(state: &mut State, x: usize, y: usize) {
    let (res, carry) = state.v[x].overflowing_add(state.v[y]);
    store_with_flag(state, x, res, carry);
}

/// Vx -= Vy; VF = !underflow
/// Equal operands don't borrow, so VF = 1 when Vx == Vy
pub fn sub(state: &mut State, x: usize, y: usize) {
    let (res, borrow) = state.v[x].overflowing_sub(state.v[y]);
    store_with_flag(state, x, res, !borrow);
}

/// Vx = Vy - Vx; VF = !underflow
/// As with `sub`, VF = 1 when Vx == Vy
pub fn subn(state: &mut State, x: usize, y: usize) {
    let (res, borrow) = state.v[y].overflowing_sub(state.v[x]);
    store_with_flag(state, x, res, !borrow);
}

/// Vx = Vy >> 1; VF = bit shifted out
pub fn shr(state: &mut State, x: usize, y: usize) {
    let source = state.v[y];
    store_with_flag(state, x, source >> 1, source & 0x1 == 0x1);
}

/// Vx = Vy << 1; VF = bit shifted out
pub fn shl(state: &mut State, x: usize, y: usize) {
    let source = state.v[y];
    store_with_flag(state, x, source << 1, source & 0x80 == 0x80);
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
    state.advance();
}

/// PC = V0 + addr
pub fn jumpi(state: &mut State, addr: u16) {
    let target = addr + u16::from(state.v[0x0]);
    state.jump(target);
}

/// Vx = rand_byte & kk
pub fn rand(state: &mut State, x: usize, kk: u8, rng: &mut impl Rng) {
    let rand_byte: u8 = rng.gen();
    state.v[x] = rand_byte & kk;
    state.advance();
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n-byte sprite at memory I.. onto the graphics plane at (Vx, Vy).
/// The starting position wraps around the plane; rows and columns that would run
/// past the right or bottom edge are clipped.
/// Sets VF if any pixel was erased
pub fn draw(state: &mut State, x: usize, y: usize, n: u8) {
    let left = usize::from(state.v[x]) % DISPLAY_WIDTH;
    let top = usize::from(state.v[y]) % DISPLAY_HEIGHT;
    let mut collision = 0;

    for row in 0..usize::from(n) {
        let py = top + row;
        if py >= DISPLAY_HEIGHT {
            break;
        }
        let sprite = state.read(state.i.wrapping_add(row as u16));
        for bit in 0..8 {
            let px = left + bit;
            if px >= DISPLAY_WIDTH {
                break;
            }
            let pixel_value = (sprite >> (7 - bit)) & 1;
            collision |= pixel_value & state.graphics[py][px];
            state.graphics[py][px] ^= pixel_value;
        }
    }

    state.v[VF] = collision;
    state.draw_flag = true;
    state.advance();
}

/// Keys are named by the low nibble of Vx
fn key_of(state: &State, x: usize) -> usize {
    usize::from(state.v[x] & 0xF)
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State, x: usize, pressed_keys: &Keypad) {
    let condition = pressed_keys[key_of(state, x)];
    state.skip_if(condition);
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State, x: usize, pressed_keys: &Keypad) {
    let condition = !pressed_keys[key_of(state, x)];
    state.skip_if(condition);
}

/// Vx = DT
pub fn moved(state: &mut State, x: usize) {
    state.v[x] = state.delay_timer;
    state.advance();
}

/// await keypress for Vx
pub fn keyd(state: &mut State, x: usize) {
    state.register_needing_key = Some(x);
    state.advance();
}

/// DT = Vx
pub fn loads(state: &mut State, x: usize) {
    state.delay_timer = state.v[x];
    state.advance();
}

/// ST = Vx
pub fn ld(state: &mut State, x: usize) {
    state.sound_timer = state.v[x];
    state.advance();
}

/// I += Vx
pub fn addi(state: &mut State, x: usize) {
    state.i = state.i.wrapping_add(u16::from(state.v[x]));
    state.advance();
}

/// I = address of the font sprite for the digit in Vx
/// See constants::SPRITE_SHEET for the sprites
pub fn ldspr(state: &mut State, x: usize) {
    state.i = FONT_START + u16::from(state.v[x] & 0xF) * FONT_SPRITE_SIZE;
    state.advance();
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &mut State, x: usize) {
    let value = state.v[x];
    let digits = [value / 100, value / 10 % 10, value % 10];
    for (offset, digit) in digits.iter().enumerate() {
        state.write(state.i.wrapping_add(offset as u16), *digit);
    }
    state.advance();
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State, x: usize) {
    for register in 0..=x {
        state.write(state.i.wrapping_add(register as u16), state.v[register]);
    }
    state.advance();
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State, x: usize) {
    for register in 0..=x {
        state.v[register] = state.read(state.i.wrapping_add(register as u16));
    }
    state.advance();
}
