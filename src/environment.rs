use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{Control, Input};
use crate::interpreter::{Chip8Interpreter, State};
use crate::memory::CHIP8_PROGRAM_ADDR;
use crate::sound::Sound;
use spin_sleep::LoopHelper;
use std::io;
use tracing::{debug, info};

/// whether the main loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Sets everything up and runs the main loop. Per frame:
///
/// * poll input into the keypad
/// * `cycles_per_frame` instructions
/// * one timer tick
/// * start or stop the tone
/// * redraw, if anything was drawn
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    // kept so a reset can reload it
    program: Vec<u8>,
    beeping: bool,
    frames: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        Environment {
            interpreter: Chip8Interpreter::new(config.quirks, config.rng_seed),
            display,
            input,
            sound,
            config,
            program: Vec::new(),
            beeping: false,
            frames: 0,
        }
    }

    /// load a program at 0x200 and remember it for resets
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.interpreter.load(&program, CHIP8_PROGRAM_ADDR)?;
        self.program = program;
        Ok(())
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Chip8Interpreter {
        &mut self.interpreter
    }

    /// frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// power-cycle the machine and reload the program
    pub fn reset(&mut self) -> Result<(), Chip8Error> {
        info!("resetting");
        self.interpreter.reset();
        self.interpreter.load(&self.program, CHIP8_PROGRAM_ADDR)?;
        self.set_beeping(false)
    }

    /// One frame's worth of work. A halt is reported as an error after the
    /// frame has been drawn, so the screen shows what the program last did.
    pub fn run_frame(&mut self) -> Result<Flow, Chip8Error> {
        match self.input.poll(self.interpreter.keypad_mut())? {
            Control::Quit => return Ok(Flow::Quit),
            Control::Reset => self.reset()?,
            Control::Continue => {}
        }

        for _ in 0..self.config.cycles_per_frame {
            if self.interpreter.step() == State::Halted {
                break;
            }
        }
        self.interpreter.tick();
        self.set_beeping(self.interpreter.sound_active())?;

        if let Some(frame) = self.interpreter.take_frame() {
            self.display.draw(frame)?;
        }
        self.frames += 1;

        match self.interpreter.diagnostics() {
            Some(diagnostics) => Err(Chip8Error::Halted(diagnostics)),
            None => Ok(Flow::Continue),
        }
    }

    /// run frames at the configured rate until the user quits, the program
    /// halts, or `max_frames` have gone by
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<(), Chip8Error> {
        let mut loop_helper = LoopHelper::builder().build_with_target_rate(self.config.frame_rate);
        info!(
            fps = self.config.frame_rate,
            cycles_per_frame = self.config.cycles_per_frame,
            "starting main loop"
        );
        let result = loop {
            loop_helper.loop_start();
            if max_frames.map_or(false, |max| self.frames >= max) {
                debug!(frames = self.frames, "frame limit reached");
                break Ok(());
            }
            match self.run_frame() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break Ok(()),
                Err(e) => break Err(e),
            }
            loop_helper.loop_sleep();
        };
        self.set_beeping(false)?;
        info!(frames = self.frames, cycles = self.interpreter.cycles(), "main loop finished");
        result
    }

    fn set_beeping(&mut self, on: bool) -> Result<(), Chip8Error> {
        if on == self.beeping {
            return Ok(());
        }
        let result = if on { self.sound.beep() } else { self.sound.stop() };
        result.map_err(|e| Chip8Error::Sound(e.to_string()))?;
        self.beeping = on;
        Ok(())
    }
}
