use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the machine's RAM
pub trait MemoryMap {
    /// how many bytes are addressable
    fn size(&self) -> usize;

    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.write(buf.as_slice(), addr)
    }

    /// write a chunk of bytes into "RAM"; all or nothing
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        let capacity = self.size().saturating_sub(addr as usize);
        if addr as usize > self.size() || data.len() > capacity {
            return Err(Chip8Error::LoadOutOfBounds {
                offset: addr,
                len: data.len(),
                capacity,
            });
        }
        self.get_rw_slice(addr, data.len()).copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes); wraps at the top of memory
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// single byte; addresses beyond the end of memory wrap around
    fn read_byte(&self, addr: u16) -> u8 {
        let a = addr as usize % self.size();
        self.get_ro_slice(a as u16, 1)[0]
    }

    /// single byte; addresses beyond the end of memory wrap around
    fn write_byte(&mut self, addr: u16, value: u8) {
        let a = addr as usize % self.size();
        self.get_rw_slice(a as u16, 1)[0] = value;
    }

    /// get a r/w slice of the underlying memory; panics if out of range
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory; panics if out of range
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x01ff  interpreter (only the font lives here for us)
///   0x0200-0x0fff  program
///
/// the stack and display are kept outside addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit sprites start
pub const CHIP8_FONT_ADDR: u16 = 0x050;

/// bytes per hex digit sprite
pub const CHIP8_FONT_HEIGHT: u16 = 5;

impl Chip8MemoryMap {
    /// initialises CHIP-8 with contemporary memory contents
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        };
        mm.reset();
        mm
    }

    /// zero everything, then put the font back
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        let font = self.font_addr as usize;
        self.bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.write_any(reader, self.program_addr)
    }

    /// address of the sprite for the low nibble of `digit`
    pub fn font_sprite_addr(&self, digit: u8) -> u16 {
        self.font_addr + (digit as u16 & 0xf) * CHIP8_FONT_HEIGHT
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
