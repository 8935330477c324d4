use std::fmt;
use std::io;
use thiserror::Error;

/// conditions that stop the interpreter dead; once one of these is raised
/// the interpreter sits in `State::Halted` until it is reset
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unknown opcode 0x{opcode:04x}")]
    UnknownOpcode { opcode: u16 },
    #[error("stack overflow: CALL with all 16 slots in use")]
    StackOverflow,
    #[error("stack underflow: RET with an empty stack")]
    StackUnderflow,
}

/// what the host gets to look at after a halt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub fault: Fault,
    /// the opcode being executed when it all went wrong
    pub opcode: u16,
    /// where that opcode was fetched from
    pub pc: u16,
    /// instructions executed since the last reset, including the faulting one
    pub cycles: u64,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (opcode 0x{:04x} at 0x{:03x}, cycle {})",
            self.fault, self.opcode, self.pc, self.cycles
        )
    }
}

#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program of {len} bytes does not fit at 0x{offset:03x} ({capacity} bytes available)")]
    LoadOutOfBounds {
        offset: u16,
        len: usize,
        capacity: usize,
    },
    #[error("interpreter halted: {0}")]
    Halted(Diagnostics),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("sound device: {0}")]
    Sound(String),
}
