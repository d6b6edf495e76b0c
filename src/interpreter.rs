/// # interpreter
///
/// The machine itself: RAM, registers, screen, keypad and a random source,
/// driven one fetch/decode/execute cycle at a time by `step()`.
///
/// The interpreter never sleeps, never blocks and never touches a device.
/// Timers only move when the driver calls `tick_timers()`, and the one
/// instruction that would block (LD Vx, K) parks the machine in
/// `MachineState::AwaitingKey` until the driver calls `deliver_key()`.
use crate::error::Chip8Error;
use crate::framebuffer::{Framebuffer, CHIP8_SCREEN_HEIGHT, CHIP8_SCREEN_WIDTH};
use crate::input::{Keypad, CHIP8_KEY_COUNT};
use crate::instruction::{AluOp, Instruction};
use crate::memory::{self, MemoryMap, CHIP8_ADDR_MASK, CHIP8_FONT_GLYPH_BYTES};
use crate::registers::{Registers, VF};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// whether the machine can take another step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    /// blocked on LD Vx, K; the key will land in V`register`
    AwaitingKey { register: usize },
}

/// what a call to `step()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// nothing ran; the machine is waiting for a key
    Blocked,
}

impl Step {
    /// the screen changed in a way the driver should show
    pub fn drew(&self) -> bool {
        matches!(self, Step::Executed(Instruction::Draw { .. }))
    }
}

pub struct Chip8Interpreter {
    memory: memory::Chip8MemoryMap,
    registers: Registers,
    framebuffer: Framebuffer,
    keypad: Keypad,
    rng: StdRng,
    state: MachineState,
    // the last instruction word fetched, and where from
    ir: u16,
    ir_addr: u16,
}

impl Chip8Interpreter {
    /// a fresh machine with its random source seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// a fresh machine whose RND sequence is fixed by `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8Interpreter {
            memory: memory::Chip8MemoryMap::new(),
            registers: Registers::new(),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            rng,
            state: MachineState::Running,
            ir: 0,
            ir_addr: memory::CHIP8_PROGRAM_ADDR,
        }
    }

    /// load a chip8 program at 0x200, returning how many bytes made it in
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let len = self.memory.load_program(reader)?;
        log::info!("loaded {} byte program at {:03x}", len, self.memory.program_addr());
        Ok(len)
    }

    pub fn memory(&self) -> &memory::Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut memory::Chip8MemoryMap {
        &mut self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// the instruction register: the word most recently fetched
    pub fn ir(&self) -> u16 {
        self.ir
    }

    /// the sound timer is running, so something should be making a noise
    pub fn sound_active(&self) -> bool {
        self.registers.sound_timer > 0
    }

    /// mark a key as down for the next instruction cycle
    pub fn press_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.set_pressed(key)
    }

    /// one 60Hz tick of the delay and sound timers
    pub fn tick_timers(&mut self) {
        self.registers.tick_timers();
    }

    /// Hand a key to a machine blocked on LD Vx, K. Returns false and does
    /// nothing if the machine isn't waiting.
    pub fn deliver_key(&mut self, key: u8) -> Result<bool, Chip8Error> {
        let register = match self.state {
            MachineState::AwaitingKey { register } => register,
            MachineState::Running => return Ok(false),
        };
        if key as usize >= CHIP8_KEY_COUNT {
            return Err(Chip8Error::InvalidKey(key));
        }
        self.keypad.clear_all();
        self.keypad.set_pressed(key)?;
        self.registers.set_v(register, key);
        self.state = MachineState::Running;
        log::debug!("key {:x} delivered to V{:X}", key, register);
        Ok(true)
    }

    /// one full fetch/decode/execute cycle
    pub fn step(&mut self) -> Result<Step, Chip8Error> {
        if let MachineState::AwaitingKey { .. } = self.state {
            return Ok(Step::Blocked);
        }
        self.fetch()?;
        let instruction = self.decode_execute()?;
        Ok(Step::Executed(instruction))
    }

    /// read the instruction word at PC into the instruction register and move
    /// PC along
    pub fn fetch(&mut self) -> Result<u16, Chip8Error> {
        let pc = self.registers.pc & CHIP8_ADDR_MASK;
        self.ir = self.memory.read_word(pc)?;
        self.ir_addr = pc;
        self.registers.advance_pc();
        Ok(self.ir)
    }

    /// decode and run whatever is in the instruction register; keys are
    /// released afterwards whatever the instruction was
    pub fn decode_execute(&mut self) -> Result<Instruction, Chip8Error> {
        let pc = self.ir_addr;
        let instruction = Instruction::decode(self.ir, pc)?;
        log::trace!("{:03x}: {:04x}  {}", pc, self.ir, instruction);
        self.execute(instruction)?;
        self.keypad.clear_all();
        Ok(instruction)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.advance_pc();
        }
    }

    /// memory address `offset` bytes past I, kept inside 4K
    fn index_addr(&self, offset: usize) -> u16 {
        (self.registers.i.wrapping_add(offset as u16)) & CHIP8_ADDR_MASK
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        let r = &mut self.registers;
        match instruction {
            Instruction::ClearScreen => self.framebuffer.clear(),
            Instruction::Return => r.pc = r.pop(),
            Instruction::Jump(nnn) => r.pc = nnn,
            Instruction::Call(nnn) => {
                let ret = r.pc;
                r.push(ret);
                r.pc = nnn;
            }
            Instruction::SkipEqByte { x, kk } => {
                let eq = r.v(x) == kk;
                self.skip_if(eq);
            }
            Instruction::SkipNeByte { x, kk } => {
                let ne = r.v(x) != kk;
                self.skip_if(ne);
            }
            Instruction::SkipEqReg { x, y } => {
                let eq = r.v(x) == r.v(y);
                self.skip_if(eq);
            }
            Instruction::SkipNeReg { x, y } => {
                let ne = r.v(x) != r.v(y);
                self.skip_if(ne);
            }
            Instruction::LoadByte { x, kk } => r.set_v(x, kk),
            Instruction::AddByte { x, kk } => r.set_v(x, r.v(x).wrapping_add(kk)),
            Instruction::Alu { op, x, y } => self.alu(op, x, y),
            Instruction::LoadIndex(nnn) => r.i = nnn,
            Instruction::JumpV0(nnn) => r.pc = nnn + r.v(0) as u16,
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.gen();
                self.registers.set_v(x, byte & kk);
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n)?,
            Instruction::SkipKeyPressed { x } => {
                let pressed = self.keypad.is_pressed(r.v(x));
                self.skip_if(pressed);
            }
            Instruction::SkipKeyReleased { x } => {
                let pressed = self.keypad.is_pressed(r.v(x));
                self.skip_if(!pressed);
            }
            Instruction::LoadDelay { x } => r.set_v(x, r.delay_timer),
            Instruction::WaitKey { x } => {
                self.state = MachineState::AwaitingKey { register: x };
            }
            Instruction::SetDelay { x } => r.delay_timer = r.v(x),
            Instruction::SetSound { x } => r.sound_timer = r.v(x),
            Instruction::AddIndex { x } => r.i = r.i.wrapping_add(r.v(x) as u16),
            Instruction::LoadFont { x } => {
                let glyph = r.v(x) as u16;
                // no such glyph, leave I alone
                if glyph < 16 {
                    r.i = memory::CHIP8_FONT_ADDR + glyph * CHIP8_FONT_GLYPH_BYTES;
                }
            }
            Instruction::StoreBcd { x } => {
                let vx = r.v(x);
                for (offset, digit) in [vx / 100, (vx / 10) % 10, vx % 10].into_iter().enumerate() {
                    let addr = self.index_addr(offset);
                    self.memory.write_byte(addr, digit)?;
                }
            }
            Instruction::StoreRegisters { x } => {
                for offset in 0..=x {
                    let addr = self.index_addr(offset);
                    self.memory.write_byte(addr, self.registers.v(offset))?;
                }
            }
            Instruction::LoadRegisters { x } => {
                for offset in 0..=x {
                    let addr = self.index_addr(offset);
                    let value = self.memory.read_byte(addr)?;
                    self.registers.set_v(offset, value);
                }
            }
            Instruction::Ignored(word) => {
                log::warn!("ignoring undefined instruction {:04x}", word);
            }
        }
        Ok(())
    }

    /// 8XYn. Flags come from the operands as they were before the operation.
    /// VF is written before Vx, so when x is F the result is what's left.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        let r = &mut self.registers;
        let (vx, vy) = (r.v(x), r.v(y));
        let (result, flag) = match op {
            AluOp::Mov => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }
            AluOp::Sub => (vx.wrapping_sub(vy), Some((vx > vy) as u8)),
            AluOp::ShiftRight => (vx >> 1, Some(vx & 0x01)),
            AluOp::SubReversed => (vy.wrapping_sub(vx), Some((vy > vx) as u8)),
            AluOp::ShiftLeft => (vx << 1, Some(vx >> 7)),
        };
        if let Some(flag) = flag {
            r.set_v(VF, flag);
        }
        r.set_v(x, result);
    }

    /// DXYn: n sprite rows from I, XOR'd onto the screen at (Vx, Vy)
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Result<(), Chip8Error> {
        let x0 = self.registers.v(x) as usize % CHIP8_SCREEN_WIDTH;
        let y0 = self.registers.v(y) as usize % CHIP8_SCREEN_HEIGHT;
        self.registers.set_v(VF, 0);

        let mut rows = Vec::with_capacity(n as usize);
        for row in 0..n as usize {
            rows.push(self.memory.read_byte(self.index_addr(row))?);
        }
        if self.framebuffer.draw(x0, y0, &rows) {
            self.registers.set_v(VF, 1);
        }
        log::debug!("drew {} rows at ({}, {})", n, x0, y0);
        Ok(())
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
