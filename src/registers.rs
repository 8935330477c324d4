use crate::error::Fault;
use crate::memory::CHIP8_PROGRAM_ADDR;

/// VF doubles up as carry / borrow / collision flag
pub const VF: usize = 0xf;

/// how many return addresses fit on the stack
pub const STACK_DEPTH: usize = 16;

/// The CHIP-8 register file. Data registers are plain u8 so every write has
/// to wrap explicitly; I and PC are u16 although only 12 bits are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Registers::new();
    }

    /// number of return addresses currently stacked
    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        let slot = self.stack.get_mut(self.sp).ok_or(Fault::StackOverflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// the flag register, for readability at call sites
    pub fn set_flag(&mut self, set: bool) {
        self.v[VF] = set as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[VF]
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
        assert_eq!(r.i, 0);
        assert_eq!(r.v, [0; 16]);
        assert_eq!(r.stack_pointer(), 0);
    }

    #[test]
    fn test_push_pop_lifo() -> Result<(), Fault> {
        let mut r = Registers::new();
        r.push(0x202)?;
        r.push(0x306)?;
        assert_eq!(r.stack_pointer(), 2);
        assert_eq!(r.pop()?, 0x306);
        assert_eq!(r.pop()?, 0x202);
        assert_eq!(r.stack_pointer(), 0);
        Ok(())
    }

    #[test]
    fn test_overflow() -> Result<(), Fault> {
        let mut r = Registers::new();
        for n in 0..STACK_DEPTH as u16 {
            r.push(n)?;
        }
        assert_eq!(r.push(0xfff), Err(Fault::StackOverflow));
        assert_eq!(r.stack_pointer(), STACK_DEPTH);
        assert_eq!(r.pop()?, 15);
        Ok(())
    }

    #[test]
    fn test_underflow() {
        let mut r = Registers::new();
        assert_eq!(r.pop(), Err(Fault::StackUnderflow));
        assert_eq!(r.stack_pointer(), 0);
    }

    #[test]
    fn test_reset() -> Result<(), Fault> {
        let mut r = Registers::new();
        r.v[3] = 9;
        r.pc = 0x400;
        r.push(0x222)?;
        r.reset();
        assert_eq!(r, Registers::new());
        Ok(())
    }
}
