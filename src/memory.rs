use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the machine's RAM
pub trait MemoryMap {
    /// read one byte; addresses past the end of RAM are an error, not a wrap
    fn read_byte(&self, addr: u16) -> Result<u8, Chip8Error>;

    /// write one byte
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error>;

    /// how many bytes are addressable
    fn len(&self) -> usize;

    /// get a big-endian two-byte word (instructions); a word starting on the
    /// last byte takes its low byte from the start of RAM
    fn read_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let hi = self.read_byte(addr)? as u16;
        let next = (addr as usize + 1) % self.len().max(1);
        let lo = self.read_byte(next as u16)? as u16;
        Ok((hi << 8) | lo)
    }

    /// write a chunk of bytes; anything that would run off the end of RAM is
    /// dropped and the number of bytes actually written is returned
    fn write(&mut self, data: &[u8], addr: u16) -> Result<usize, Chip8Error> {
        let room = self.len().saturating_sub(addr as usize);
        let fits = data.len().min(room);
        for (offset, byte) in data[..fits].iter().enumerate() {
            self.write_byte(addr + offset as u16, *byte)?;
        }
        Ok(fits)
    }

    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        let written = self.write(buf.as_slice(), addr)?;
        if written < len {
            log::warn!(
                "program is {} bytes but only {} fit below {:#05x}; the rest was dropped",
                len,
                written,
                self.len()
            );
        }
        Ok(written)
    }
}

/// Defines the CHIP-8 memory map as this machine uses it:
///   0x0000-0x004f  hex font, 16 glyphs of 5 bytes
///   0x0050-0x01ff  unused (was the interpreter on the COSMAC VIP)
///   0x0200-0x0fff  program
///
/// nothing below 0x200 is write-protected; programs *should* leave it alone
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Chip8Error::AddressOutOfRange(addr as usize))
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        let byte = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(Chip8Error::AddressOutOfRange(addr as usize))?;
        *byte = value;
        Ok(())
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// mask that confines a computed address to the 12-bit address space
pub const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the font lives; glyph n starts at n * CHIP8_FONT_GLYPH_BYTES
pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

impl Chip8MemoryMap {
    /// initialises RAM with the font baked in and everything else zeroed
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
        }
    }

    /// where `load_program` puts things
    pub fn program_addr(&self) -> u16 {
        self.program_addr
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.write_any(reader, self.program_addr)
    }

    /// r/o view of the whole of RAM
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert!(m.bytes[0x50..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_font_at_zero() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F is the last one
        assert_eq!(m.bytes[0x4b..0x50], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_write_any_data_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 0x308)?, 8);
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_write_byte() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0xfff, 0xab)?;
        assert_eq!(m.read_byte(0xfff)?, 0xab);
        Ok(())
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut m = Chip8MemoryMap::new();
        assert!(matches!(
            m.read_byte(0x1000),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        ));
        assert!(m.write_byte(0xffff, 1).is_err());
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200).unwrap();
        assert_eq!(m.read_word(0x204).unwrap(), 0x0405);
    }

    #[test]
    fn test_read_word_wraps_low_byte_only() {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0xfff, 0x12).unwrap();
        // low byte comes from the first font byte
        assert_eq!(m.read_word(0xfff).unwrap(), 0x12f0);
        assert!(matches!(
            m.read_word(0x1000),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        ));
    }

    #[test]
    fn test_write_too_much_truncates() {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0xaa; 8];
        assert_eq!(dst.write_any(&mut src, 4092).unwrap(), 4);
        assert_eq!(dst.bytes[4092..], [0xaa; 4]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_program(&mut prog)?;
        assert_eq!(dst.read_word(0x200)?, 0x00e0);
        // the font is untouched
        assert_eq!(dst.read_byte(0)?, 0xF0);
        Ok(())
    }

    #[test]
    fn test_full_program_fits() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0x11u8; 0x1000 - 0x200];
        let mut src: &[u8] = &prog;
        assert_eq!(dst.load_program(&mut src).unwrap(), 0xe00);
    }
}
