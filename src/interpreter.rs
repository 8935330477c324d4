//! # interpreter
//!
//! The execution engine. It owns the whole machine state (memory, register
//! file, timers, frame buffer and keypad) and advances it one instruction
//! per `step`. It never schedules itself: a host calls `step` some number of
//! times, then `tick` once, then flushes the frame buffer if it changed.
//!
//! ```text
//!            FX0A, no key down
//!   Running -------------------> WaitingForKey
//!      ^  \                          |
//!      |   \ fault                   | key down: Vx := key, PC += 2
//!      |    v                        |
//!      |   Halted  (until reset)     |
//!      `-----------------------------'
//! ```

use crate::config::Quirks;
use crate::display::FrameBuffer;
use crate::error::{Chip8Error, Diagnostics, Fault};
use crate::input::Keypad;
use crate::instruction::{Instruction, Reg};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::registers::{Registers, VF};
use crate::timer::Timers;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use tracing::{debug, error, trace, warn};

/// where the interpreter is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// blocked on FX0A; the key goes into the register when it arrives
    WaitingForKey(Reg),
    /// something fatal happened; see `diagnostics`
    Halted,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: Registers,
    timers: Timers,
    frame: FrameBuffer,
    keypad: Keypad,
    quirks: Quirks,
    rng: StdRng,
    state: State,
    cycles: u64,
    diagnostics: Option<Diagnostics>,
}

impl Chip8Interpreter {
    /// a freshly reset machine; `rng_seed` pins down what RND produces
    pub fn new(quirks: Quirks, rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            timers: Timers::new(),
            frame: FrameBuffer::new(),
            keypad: Keypad::new(),
            quirks,
            rng,
            state: State::Running,
            cycles: 0,
            diagnostics: None,
        }
    }

    /// back to power-on state: font only in memory, everything else zeroed,
    /// PC at 0x200. Quirks and the random number generator carry over.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers.reset();
        self.timers.reset();
        self.frame.reset();
        self.keypad.release_all();
        self.state = State::Running;
        self.cycles = 0;
        self.diagnostics = None;
        debug!("interpreter reset");
    }

    /// copy `bytes` into memory at `offset`; nothing is written unless it all fits
    pub fn load(&mut self, bytes: &[u8], offset: u16) -> Result<(), Chip8Error> {
        self.memory.write(bytes, offset)?;
        debug!(len = bytes.len(), offset, "loaded image");
        Ok(())
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        self.memory.load_program(reader)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// what went wrong, once halted
    pub fn diagnostics(&self) -> Option<Diagnostics> {
        self.diagnostics
    }

    /// instructions executed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// hand over the frame buffer if it changed since the last time, and
    /// consider it flushed
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if !self.frame.is_dirty() {
            return None;
        }
        self.frame.mark_clean();
        Some(&self.frame)
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    /// count both timers down; call at 60Hz
    pub fn tick(&mut self) {
        self.timers.tick();
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// Run one instruction, or check once for the key FX0A is waiting on.
    /// Does nothing at all once halted.
    pub fn step(&mut self) -> State {
        match self.state {
            State::Halted => return self.state,
            State::WaitingForKey(x) => {
                if let Some(key) = self.keypad.first_pressed() {
                    debug!(key, "key arrived");
                    self.registers.v[x as usize] = key;
                    self.advance(false);
                    self.state = State::Running;
                }
                return self.state;
            }
            State::Running => {}
        }

        let pc = self.registers.pc;
        let opcode = self.memory.get_word(pc);
        self.cycles += 1;

        let result = Instruction::try_from(opcode).and_then(|instruction| {
            trace!("{:03x}: {:04x} {}", pc, opcode, instruction);
            self.execute(instruction)
        });
        if let Err(fault) = result {
            self.halt(fault, opcode, pc);
        }
        self.state
    }

    fn halt(&mut self, fault: Fault, opcode: u16, pc: u16) {
        let diagnostics = Diagnostics {
            fault,
            opcode,
            pc,
            cycles: self.cycles,
        };
        error!(%diagnostics, "halting");
        self.diagnostics = Some(diagnostics);
        self.state = State::Halted;
    }

    /// move on to the next instruction, or the one after if `skip`
    fn advance(&mut self, skip: bool) {
        let step = if skip { 4 } else { 2 };
        self.registers.pc = self.registers.pc.wrapping_add(step);
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), Fault> {
        use Instruction::*;

        let r = &mut self.registers;
        let v = |r: &Registers, n: Reg| r.v[n as usize];

        match instruction {
            Sys(addr) => {
                warn!("ignoring SYS 0x{:03x}", addr);
                self.advance(false);
            }
            Cls => {
                self.frame.clear();
                self.advance(false);
            }
            Ret => {
                r.pc = r.pop()?;
            }
            Jp(nnn) => r.pc = nnn,
            Call(nnn) => {
                r.push(r.pc.wrapping_add(2))?;
                r.pc = nnn;
            }
            SeByte(x, kk) => {
                let skip = v(r, x) == kk;
                self.advance(skip);
            }
            SneByte(x, kk) => {
                let skip = v(r, x) != kk;
                self.advance(skip);
            }
            SeReg(x, y) => {
                let skip = v(r, x) == v(r, y);
                self.advance(skip);
            }
            SneReg(x, y) => {
                let skip = v(r, x) != v(r, y);
                self.advance(skip);
            }
            LdByte(x, kk) => {
                r.v[x as usize] = kk;
                self.advance(false);
            }
            AddByte(x, kk) => {
                r.v[x as usize] = v(r, x).wrapping_add(kk);
                self.advance(false);
            }
            LdReg(x, y) => {
                r.v[x as usize] = v(r, y);
                self.advance(false);
            }
            Or(x, y) => {
                let vy = v(r, y);
                r.v[x as usize] |= vy;
                self.advance(false);
            }
            And(x, y) => {
                let vy = v(r, y);
                r.v[x as usize] &= vy;
                self.advance(false);
            }
            Xor(x, y) => {
                let vy = v(r, y);
                r.v[x as usize] ^= vy;
                self.advance(false);
            }
            // the flag is written last, so it wins when x is VF
            AddReg(x, y) => {
                let (sum, carry) = v(r, x).overflowing_add(v(r, y));
                r.v[x as usize] = sum;
                r.set_flag(carry);
                self.advance(false);
            }
            Sub(x, y) => {
                let (vx, vy) = (v(r, x), v(r, y));
                r.v[x as usize] = vx.wrapping_sub(vy);
                r.set_flag(vx >= vy);
                self.advance(false);
            }
            Subn(x, y) => {
                let (vx, vy) = (v(r, x), v(r, y));
                r.v[x as usize] = vy.wrapping_sub(vx);
                r.set_flag(vy >= vx);
                self.advance(false);
            }
            // shifts work on Vx in place; y is ignored
            Shr(x, _) => {
                let vx = v(r, x);
                r.v[x as usize] = vx >> 1;
                r.v[VF] = vx & 0x01;
                self.advance(false);
            }
            Shl(x, _) => {
                let vx = v(r, x);
                r.v[x as usize] = vx << 1;
                r.v[VF] = vx >> 7;
                self.advance(false);
            }
            LdI(nnn) => {
                r.i = nnn;
                self.advance(false);
            }
            JpV0(nnn) => r.pc = nnn.wrapping_add(v(r, 0) as u16),
            Rnd(x, kk) => {
                r.v[x as usize] = self.rng.gen::<u8>() & kk;
                self.advance(false);
            }
            Drw(x, y, n) => {
                let mut rows = [0u8; 15];
                for (offset, row) in rows.iter_mut().enumerate().take(n as usize) {
                    *row = self.memory.read_byte(r.i.wrapping_add(offset as u16));
                }
                let collision = self.frame.draw_sprite(
                    v(r, x),
                    v(r, y),
                    &rows[..n as usize],
                    self.quirks.sprite_edge,
                );
                r.set_flag(collision);
                self.advance(false);
            }
            Skp(x) => {
                let skip = self.keypad.is_pressed(v(r, x));
                self.advance(skip);
            }
            Sknp(x) => {
                let skip = !self.keypad.is_pressed(v(r, x));
                self.advance(skip);
            }
            LdRegDt(x) => {
                r.v[x as usize] = self.timers.delay;
                self.advance(false);
            }
            LdKey(x) => match self.keypad.first_pressed() {
                Some(key) => {
                    r.v[x as usize] = key;
                    self.advance(false);
                }
                None => {
                    debug!(register = x, "waiting for key");
                    self.state = State::WaitingForKey(x);
                }
            },
            LdDtReg(x) => {
                self.timers.delay = v(r, x);
                self.advance(false);
            }
            LdStReg(x) => {
                self.timers.sound = v(r, x);
                self.advance(false);
            }
            AddI(x) => {
                let sum = r.i as usize + v(r, x) as usize;
                r.i = sum as u16;
                r.set_flag(sum >= self.memory.size());
                self.advance(false);
            }
            LdFont(x) => {
                r.i = self.memory.font_sprite_addr(v(r, x));
                self.advance(false);
            }
            LdBcd(x) => {
                let vx = v(r, x);
                let i = r.i;
                self.memory.write_byte(i, vx / 100);
                self.memory.write_byte(i.wrapping_add(1), vx / 10 % 10);
                self.memory.write_byte(i.wrapping_add(2), vx % 10);
                self.advance(false);
            }
            StoreRegs(x) => {
                for n in 0..=x {
                    self.memory
                        .write_byte(r.i.wrapping_add(n as u16), v(r, n));
                }
                if self.quirks.index_advance {
                    r.i = r.i.wrapping_add(x as u16 + 1);
                }
                self.advance(false);
            }
            LoadRegs(x) => {
                for n in 0..=x {
                    r.v[n as usize] = self.memory.read_byte(r.i.wrapping_add(n as u16));
                }
                if self.quirks.index_advance {
                    r.i = r.i.wrapping_add(x as u16 + 1);
                }
                self.advance(false);
            }
        }
        Ok(())
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new(Quirks::default(), None)
    }
}
