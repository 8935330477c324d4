//! A CHIP-8 interpreter.
//!
//! ## Design
//!
//! * the interpreter owns the machine state and runs one instruction per
//!   `step`; it has no idea about wall-clock time
//! * the environment drives it: n steps, one 60Hz timer tick, redraw if dirty
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//! * quirks that differ between interpreters are config, not code
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter(config.quirks)
//!  |    |-- memory (font, program)
//!  |    |-- registers, stack, timers
//!  |    |-- frame buffer, keypad
//!  |    `-- instruction decode
//!  `-- main loop
//!       |-- input.poll(keypad)
//!       |-- for _ in 0..cycles_per_frame { interpreter.step() }
//!       |-- interpreter.tick(); beep / stop
//!       |-- if let Some(frame) = interpreter.take_frame() { display.draw(frame) }
//!       `-- sleep until next frame
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod timer;

pub use config::{Config, Quirks, SpriteEdge};
pub use environment::{Environment, Flow};
pub use error::{Chip8Error, Diagnostics, Fault};
pub use interpreter::{Chip8Interpreter, State};
