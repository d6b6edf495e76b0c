use std::io;
use thiserror::Error;

/// Everything that can go wrong inside the machine. Only `UnknownInstruction`
/// is raised by well-formed engine code; the others guard the accessors.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown instruction {opcode:04x} at {pc:03x}")]
    UnknownInstruction { opcode: u16, pc: u16 },

    #[error("address {0:#06x} is outside the 4K address space")]
    AddressOutOfRange(usize),

    #[error("key {0:#04x} is not on the hex keypad")]
    InvalidKey(u8),

    #[error(transparent)]
    Io(#[from] io::Error),
}
