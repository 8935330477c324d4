//! Decoding of 16-bit opcode words into `Instruction`s, and the reverse trip
//! into assembler mnemonics for listings and traces.
use crate::error::Fault;
use std::fmt;

/// a register number, 0x0-0xf
pub type Reg = u8;

/// The base CHIP-8 instruction set. Field names follow the usual opcode
/// notation: `x`/`y` registers, `kk` byte, `n` nibble, `nnn` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn: machine code routine on the COSMAC; ignored
    Sys(u16),
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeByte(Reg, u8),
    /// 4xkk
    SneByte(Reg, u8),
    /// 5xy0
    SeReg(Reg, Reg),
    /// 6xkk
    LdByte(Reg, u8),
    /// 7xkk
    AddByte(Reg, u8),
    /// 8xy0
    LdReg(Reg, Reg),
    /// 8xy1
    Or(Reg, Reg),
    /// 8xy2
    And(Reg, Reg),
    /// 8xy3
    Xor(Reg, Reg),
    /// 8xy4
    AddReg(Reg, Reg),
    /// 8xy5
    Sub(Reg, Reg),
    /// 8xy6
    Shr(Reg, Reg),
    /// 8xy7
    Subn(Reg, Reg),
    /// 8xyE
    Shl(Reg, Reg),
    /// 9xy0
    SneReg(Reg, Reg),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(Reg, u8),
    /// Dxyn
    Drw(Reg, Reg, u8),
    /// Ex9E
    Skp(Reg),
    /// ExA1
    Sknp(Reg),
    /// Fx07
    LdRegDt(Reg),
    /// Fx0A
    LdKey(Reg),
    /// Fx15
    LdDtReg(Reg),
    /// Fx18
    LdStReg(Reg),
    /// Fx1E
    AddI(Reg),
    /// Fx29
    LdFont(Reg),
    /// Fx33
    LdBcd(Reg),
    /// Fx55
    StoreRegs(Reg),
    /// Fx65
    LoadRegs(Reg),
}

impl TryFrom<u16> for Instruction {
    type Error = Fault;

    fn try_from(opcode: u16) -> Result<Self, Self::Error> {
        use Instruction::*;

        let x = ((opcode >> 8) & 0xf) as Reg;
        let y = ((opcode >> 4) & 0xf) as Reg;
        let n = (opcode & 0xf) as u8;
        let kk = (opcode & 0xff) as u8;
        let nnn = opcode & 0xfff;

        let instruction = match opcode >> 12 {
            0x0 => match nnn {
                0x0e0 => Cls,
                0x0ee => Ret,
                _ => Sys(nnn),
            },
            0x1 => Jp(nnn),
            0x2 => Call(nnn),
            0x3 => SeByte(x, kk),
            0x4 => SneByte(x, kk),
            0x5 if n == 0 => SeReg(x, y),
            0x6 => LdByte(x, kk),
            0x7 => AddByte(x, kk),
            0x8 => match n {
                0x0 => LdReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => Shr(x, y),
                0x7 => Subn(x, y),
                0xe => Shl(x, y),
                _ => return Err(Fault::UnknownOpcode { opcode }),
            },
            0x9 if n == 0 => SneReg(x, y),
            0xa => LdI(nnn),
            0xb => JpV0(nnn),
            0xc => Rnd(x, kk),
            0xd => Drw(x, y, n),
            0xe => match kk {
                0x9e => Skp(x),
                0xa1 => Sknp(x),
                _ => return Err(Fault::UnknownOpcode { opcode }),
            },
            0xf => match kk {
                0x07 => LdRegDt(x),
                0x0a => LdKey(x),
                0x15 => LdDtReg(x),
                0x18 => LdStReg(x),
                0x1e => AddI(x),
                0x29 => LdFont(x),
                0x33 => LdBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return Err(Fault::UnknownOpcode { opcode }),
            },
            _ => return Err(Fault::UnknownOpcode { opcode }),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sys(a) => write!(f, "SYS 0x{:03X}", a),
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP 0x{:03X}", a),
            Call(a) => write!(f, "CALL 0x{:03X}", a),
            SeByte(x, kk) => write!(f, "SE V{:X}, 0x{:02X}", x, kk),
            SneByte(x, kk) => write!(f, "SNE V{:X}, 0x{:02X}", x, kk),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, kk) => write!(f, "LD V{:X}, 0x{:02X}", x, kk),
            AddByte(x, kk) => write!(f, "ADD V{:X}, 0x{:02X}", x, kk),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, 0x{:03X}", a),
            JpV0(a) => write!(f, "JP V0, 0x{:03X}", a),
            Rnd(x, kk) => write!(f, "RND V{:X}, 0x{:02X}", x, kk),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdRegDt(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdDtReg(x) => write!(f, "LD DT, V{:X}", x),
            LdStReg(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdFont(x) => write!(f, "LD F, V{:X}", x),
            LdBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// Walk a program image two bytes at a time, as if it were all code.
/// `base` is the address the first byte will be loaded at. Words that aren't
/// instructions (usually sprite data) come back as `Err(word)`. A trailing
/// odd byte is padded with zero.
pub fn disassemble(
    program: &[u8],
    base: u16,
) -> impl Iterator<Item = (u16, Result<Instruction, u16>)> + '_ {
    program.chunks(2).enumerate().map(move |(n, pair)| {
        let word = u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]);
        let addr = base.wrapping_add(2 * n as u16);
        (addr, Instruction::try_from(word).map_err(|_| word))
    })
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_table() -> Result<(), Fault> {
        let cases = [
            (0x00E0, Cls),
            (0x00EE, Ret),
            (0x0123, Sys(0x123)),
            (0x1234, Jp(0x234)),
            (0x2456, Call(0x456)),
            (0x342A, SeByte(4, 0x2A)),
            (0x4A75, SneByte(0xA, 0x75)),
            (0x5AE0, SeReg(0xA, 0xE)),
            (0x63F5, LdByte(3, 0xF5)),
            (0x7B12, AddByte(0xB, 0x12)),
            (0x8590, LdReg(5, 9)),
            (0x8101, Or(1, 0)),
            (0x8642, And(6, 4)),
            (0x87F3, Xor(7, 0xF)),
            (0x8264, AddReg(2, 6)),
            (0x8C45, Sub(0xC, 4)),
            (0x8106, Shr(1, 0)),
            (0x86D7, Subn(6, 0xD)),
            (0x8E0E, Shl(0xE, 0)),
            (0x9990, SneReg(9, 9)),
            (0xA568, LdI(0x568)),
            (0xBABC, JpV0(0xABC)),
            (0xC5AF, Rnd(5, 0xAF)),
            (0xD7B0, Drw(7, 0xB, 0)),
            (0xE49E, Skp(4)),
            (0xECA1, Sknp(0xC)),
            (0xF907, LdRegDt(9)),
            (0xFD0A, LdKey(0xD)),
            (0xF315, LdDtReg(3)),
            (0xF718, LdStReg(7)),
            (0xF91E, AddI(9)),
            (0xFF29, LdFont(0xF)),
            (0xF533, LdBcd(5)),
            (0xF655, StoreRegs(6)),
            (0xF165, LoadRegs(1)),
        ];
        for (opcode, expected) in cases {
            assert_eq!(Instruction::try_from(opcode)?, expected, "0x{:04x}", opcode);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_opcodes() {
        for opcode in [0x5121, 0x8008, 0x800F, 0x9AB1, 0xE09F, 0xF0FF, 0xF000] {
            assert_eq!(
                Instruction::try_from(opcode),
                Err(Fault::UnknownOpcode { opcode }),
                "0x{:04x}",
                opcode
            );
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(LdByte(0, 0x0a).to_string(), "LD V0, 0x0A");
        assert_eq!(Drw(1, 2, 5).to_string(), "DRW V1, V2, 5");
        assert_eq!(Jp(0x2a4).to_string(), "JP 0x2A4");
        assert_eq!(StoreRegs(0xe).to_string(), "LD [I], VE");
    }

    #[test]
    fn test_disassemble_listing() {
        let listing: Vec<_> = disassemble(&[0x60, 0x0a, 0xff, 0xff, 0x12], 0x200).collect();
        assert_eq!(
            listing,
            vec![
                (0x200, Ok(LdByte(0, 0x0a))),
                (0x202, Err(0xffff)),
                (0x204, Ok(Jp(0x200))),
            ]
        );
    }
}
