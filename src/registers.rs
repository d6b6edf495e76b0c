//! Register file and control state: V0-VF, I, PC, the two timers and the
//! call stack.

use crate::memory::{CHIP8_ADDR_MASK, CHIP8_PROGRAM_ADDR};

/// how deep subroutine calls can nest
pub const CHIP8_STACK_DEPTH: usize = 16;

/// index of the register several opcodes use as a carry/borrow/collision flag
pub const VF: usize = 0xf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    stack: [u16; CHIP8_STACK_DEPTH],
    // -1 is empty, 15 is full
    sp: i8,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; CHIP8_STACK_DEPTH],
            sp: -1,
        }
    }

    /// read Vx; x comes from a nibble so only the low four bits count
    pub fn v(&self, x: usize) -> u8 {
        self.v[x & 0xf]
    }

    pub fn set_v(&mut self, x: usize, value: u8) {
        self.v[x & 0xf] = value;
    }

    /// all of V0-VF at once
    pub fn v_all(&self) -> &[u8; 16] {
        &self.v
    }

    /// Move on to the next instruction. Anything outside the program area
    /// (including running off the end of RAM) sends us back to 0x200.
    pub fn advance_pc(&mut self) {
        if self.pc >= CHIP8_PROGRAM_ADDR && self.pc < CHIP8_ADDR_MASK {
            self.pc += 2;
        } else {
            self.pc = CHIP8_PROGRAM_ADDR;
        }
    }

    /// Push a return address. A full stack drops the push rather than
    /// stopping the machine; returns whether the address was stored.
    pub fn push(&mut self, addr: u16) -> bool {
        if self.sp < CHIP8_STACK_DEPTH as i8 - 1 {
            self.sp += 1;
            self.stack[self.sp as usize] = addr;
            true
        } else {
            log::warn!("stack overflow, dropping return address {:03x}", addr);
            false
        }
    }

    /// Pop a return address, or 0x200 if there's nothing to return to.
    pub fn pop(&mut self) -> u16 {
        if self.sp > -1 {
            let addr = self.stack[self.sp as usize];
            self.sp -= 1;
            addr
        } else {
            log::warn!("stack underflow, returning to {:03x}", CHIP8_PROGRAM_ADDR);
            CHIP8_PROGRAM_ADDR
        }
    }

    /// number of return addresses currently stored
    pub fn stack_depth(&self) -> usize {
        (self.sp + 1) as usize
    }

    /// one 60Hz tick of both timers
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let r = Registers::new();
        assert_eq!(r.pc, 0x200);
        assert_eq!(r.stack_depth(), 0);
        assert_eq!(r.v_all(), &[0; 16]);
    }

    #[test]
    fn test_advance_pc() {
        let mut r = Registers::new();
        r.advance_pc();
        assert_eq!(r.pc, 0x202);
        r.pc = 0xffe;
        r.advance_pc();
        assert_eq!(r.pc, 0x1000);
    }

    #[test]
    fn test_advance_pc_resets_outside_program_area() {
        let mut r = Registers::new();
        r.pc = 0x1ff;
        r.advance_pc();
        assert_eq!(r.pc, 0x200);
        r.pc = 0xfff;
        r.advance_pc();
        assert_eq!(r.pc, 0x200);
        r.pc = 0x10fe;
        r.advance_pc();
        assert_eq!(r.pc, 0x200);
    }

    #[test]
    fn test_stack_order() {
        let mut r = Registers::new();
        for n in 0..16u16 {
            assert!(r.push(0x300 + n * 2));
        }
        assert_eq!(r.stack_depth(), 16);
        for n in (0..16u16).rev() {
            assert_eq!(r.pop(), 0x300 + n * 2);
        }
        assert_eq!(r.stack_depth(), 0);
    }

    #[test]
    fn test_stack_overflow_drops_push() {
        let mut r = Registers::new();
        for n in 0..16u16 {
            r.push(n);
        }
        assert!(!r.push(0xabc));
        assert_eq!(r.stack_depth(), 16);
        assert_eq!(r.pop(), 15);
    }

    #[test]
    fn test_stack_underflow_returns_program_start() {
        let mut r = Registers::new();
        for n in 0..16u16 {
            r.push(0x400 + n);
        }
        for _ in 0..16 {
            r.pop();
        }
        assert_eq!(r.pop(), 0x200);
        assert_eq!(r.stack_depth(), 0);
    }

    #[test]
    fn test_tick_timers_stops_at_zero() {
        let mut r = Registers::new();
        r.delay_timer = 2;
        r.sound_timer = 1;
        r.tick_timers();
        assert_eq!((r.delay_timer, r.sound_timer), (1, 0));
        r.tick_timers();
        r.tick_timers();
        assert_eq!((r.delay_timer, r.sound_timer), (0, 0));
    }

    #[test]
    fn test_register_index_masked() {
        let mut r = Registers::new();
        r.set_v(0x1f, 9);
        assert_eq!(r.v(VF), 9);
    }
}
