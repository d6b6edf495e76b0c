//! The CHIP-8 instruction set: turning a 16-bit word into something the
//! interpreter can match on.
//!
//! Field names follow the usual CHIP-8 notation:
//!
//! * `nnn` -- low 12 bits, an address
//! * `n`   -- low nibble
//! * `x`   -- second nibble, a register
//! * `y`   -- third nibble, a register
//! * `kk`  -- low byte, an immediate
use crate::error::Chip8Error;
use std::fmt;

/// the 8XYn register-to-register operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Mov,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReversed,
    ShiftLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,
    Return,
    Jump(u16),
    Call(u16),
    SkipEqByte { x: usize, kk: u8 },
    SkipNeByte { x: usize, kk: u8 },
    SkipEqReg { x: usize, y: usize },
    SkipNeReg { x: usize, y: usize },
    LoadByte { x: usize, kk: u8 },
    AddByte { x: usize, kk: u8 },
    Alu { op: AluOp, x: usize, y: usize },
    LoadIndex(u16),
    JumpV0(u16),
    Random { x: usize, kk: u8 },
    Draw { x: usize, y: usize, n: u8 },
    SkipKeyPressed { x: usize },
    SkipKeyReleased { x: usize },
    LoadDelay { x: usize },
    WaitKey { x: usize },
    SetDelay { x: usize },
    SetSound { x: usize },
    AddIndex { x: usize },
    LoadFont { x: usize },
    StoreBcd { x: usize },
    StoreRegisters { x: usize },
    LoadRegisters { x: usize },
    /// a known family with an operand pattern nothing defines; runs as a no-op
    Ignored(u16),
}

impl Instruction {
    /// Decode one instruction word. Only the 0x0 family can fail: anything
    /// but CLS/RET there would be a machine-code call we can't make.
    pub fn decode(word: u16, pc: u16) -> Result<Instruction, Chip8Error> {
        let nnn = word & 0x0fff;
        let n = (word & 0x000f) as u8;
        let x = ((word & 0x0f00) >> 8) as usize;
        let y = ((word & 0x00f0) >> 4) as usize;
        let kk = (word & 0x00ff) as u8;

        let instruction = match word >> 12 {
            0x0 => match nnn {
                0x0e0 => Instruction::ClearScreen,
                0x0ee => Instruction::Return,
                _ => return Err(Chip8Error::UnknownInstruction { opcode: word, pc }),
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipEqByte { x, kk },
            0x4 => Instruction::SkipNeByte { x, kk },
            0x5 if n == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadByte { x, kk },
            0x7 => Instruction::AddByte { x, kk },
            0x8 => match AluOp::from_nibble(n) {
                Some(op) => Instruction::Alu { op, x, y },
                None => Instruction::Ignored(word),
            },
            0x9 if n == 0 => Instruction::SkipNeReg { x, y },
            0xa => Instruction::LoadIndex(nnn),
            0xb => Instruction::JumpV0(nnn),
            0xc => Instruction::Random { x, kk },
            0xd => Instruction::Draw { x, y, n },
            0xe => match kk {
                0x9e => Instruction::SkipKeyPressed { x },
                0xa1 => Instruction::SkipKeyReleased { x },
                _ => Instruction::Ignored(word),
            },
            0xf => match kk {
                0x07 => Instruction::LoadDelay { x },
                0x0a => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1e => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFont { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => Instruction::Ignored(word),
            },
            // 5xyn / 9xyn with a non-zero n
            _ => Instruction::Ignored(word),
        };
        Ok(instruction)
    }
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<AluOp> {
        match n {
            0x0 => Some(AluOp::Mov),
            0x1 => Some(AluOp::Or),
            0x2 => Some(AluOp::And),
            0x3 => Some(AluOp::Xor),
            0x4 => Some(AluOp::Add),
            0x5 => Some(AluOp::Sub),
            0x6 => Some(AluOp::ShiftRight),
            0x7 => Some(AluOp::SubReversed),
            0xe => Some(AluOp::ShiftLeft),
            _ => None,
        }
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            AluOp::Mov => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::ShiftRight => "SHR",
            AluOp::SubReversed => "SUBN",
            AluOp::ShiftLeft => "SHL",
        }
    }
}

/// Cowgod-style assembly, handy in trace logs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(nnn) => write!(f, "JP {:03X}", nnn),
            Instruction::Call(nnn) => write!(f, "CALL {:03X}", nnn),
            Instruction::SkipEqByte { x, kk } => write!(f, "SE V{:X}, {:02X}", x, kk),
            Instruction::SkipNeByte { x, kk } => write!(f, "SNE V{:X}, {:02X}", x, kk),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadByte { x, kk } => write!(f, "LD V{:X}, {:02X}", x, kk),
            Instruction::AddByte { x, kk } => write!(f, "ADD V{:X}, {:02X}", x, kk),
            Instruction::Alu { op, x, y } => write!(f, "{} V{:X}, V{:X}", op.mnemonic(), x, y),
            Instruction::LoadIndex(nnn) => write!(f, "LD I, {:03X}", nnn),
            Instruction::JumpV0(nnn) => write!(f, "JP V0, {:03X}", nnn),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, {:02X}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            Instruction::SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipKeyReleased { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadFont { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Instruction::Ignored(word) => write!(f, "DW {:04X}", word),
        }
    }
}
