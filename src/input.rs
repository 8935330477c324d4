use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

/// the hex keypad, left-hand side of a qwerty keyboard:
///   1 2 3 C      1 2 3 4
///   4 5 6 D  ->  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses, so a press is held down for this many polls
const TERM_HOLD_FRAMES: u8 = 6;

/// State of the 16 keys. The host writes it; the interpreter only reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// out of range keys are ignored
    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = pressed;
        }
    }

    /// only the low nibble of `key` is looked at
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xf) as usize]
    }

    /// lowest numbered key currently down
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; 16];
    }
}

/// what the user wants the host to do next, besides carrying on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Reset,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// bring the keypad up to date with whatever the user has been doing
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error>;
}

/// simple implementation of Input, using crossterm events from the terminal
pub struct TermInput {
    held: [u8; 16],
    keymap: HashMap<char, u8>,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            held: [0; 16],
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn read_events(&mut self) -> Result<Control, io::Error> {
        let mut control = Control::Continue;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.held[mapped_key as usize] = TERM_HOLD_FRAMES,
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => control = Control::Quit,
                    KeyCode::F(5) => control = Control::Reset,
                    other => debug!("ignoring key {:?}", other),
                }
            }
        }
        Ok(control)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error> {
        for h in self.held.iter_mut() {
            *h = h.saturating_sub(1);
        }
        let control = self.read_events()?;
        for (key, &h) in self.held.iter().enumerate() {
            keypad.set(key as u8, h > 0);
        }
        Ok(control)
    }
}

/// dummy Input implementation for testing; plays back one set of held keys
/// per poll, then asks to quit
pub struct DummyInput {
    frames: VecDeque<Vec<u8>>,
    repeat: bool,
}

impl DummyInput {
    /// `frames[n]` is the keys held down during the n-th poll
    pub fn scripted(frames: Vec<Vec<u8>>) -> Self {
        DummyInput {
            frames: frames.into(),
            repeat: false,
        }
    }

    /// hold the same keys down forever
    pub fn holding(keys: &[u8]) -> Self {
        DummyInput {
            frames: VecDeque::from(vec![Vec::from(keys)]),
            repeat: true,
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error> {
        let keys = match (self.repeat, self.frames.pop_front()) {
            (_, None) => return Ok(Control::Quit),
            (true, Some(keys)) => {
                self.frames.push_back(keys.clone());
                keys
            }
            (false, Some(keys)) => keys,
        };
        keypad.release_all();
        for k in keys {
            keypad.set(k, true);
        }
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_first_pressed() {
        let mut k = Keypad::new();
        assert_eq!(k.first_pressed(), None);
        k.set(0xc, true);
        k.set(0x3, true);
        assert_eq!(k.first_pressed(), Some(0x3));
        k.set(0x3, false);
        assert_eq!(k.first_pressed(), Some(0xc));
    }

    #[test]
    fn test_keypad_ignores_out_of_range() {
        let mut k = Keypad::new();
        k.set(0x10, true);
        assert_eq!(k, Keypad::new());
        // only the low nibble counts when reading
        k.set(0x1, true);
        assert!(k.is_pressed(0x21));
    }

    #[test]
    fn test_keymap_covers_every_key() {
        let mut seen = [false; 16];
        for (_, k) in CHIP8_CONVENTIONAL_KEYMAP {
            seen[k as usize] = true;
        }
        assert_eq!(seen, [true; 16]);
    }

    #[test]
    fn test_dummy_scripted() -> Result<(), io::Error> {
        let mut i = DummyInput::scripted(vec![vec![], vec![5, 9]]);
        let mut k = Keypad::new();
        assert_eq!(i.poll(&mut k)?, Control::Continue);
        assert_eq!(k.first_pressed(), None);
        assert_eq!(i.poll(&mut k)?, Control::Continue);
        assert!(k.is_pressed(5) && k.is_pressed(9));
        assert_eq!(i.poll(&mut k)?, Control::Quit);
        Ok(())
    }

    #[test]
    fn test_dummy_holding() -> Result<(), io::Error> {
        let mut i = DummyInput::holding(&[2]);
        let mut k = Keypad::new();
        for _ in 0..3 {
            assert_eq!(i.poll(&mut k)?, Control::Continue);
            assert_eq!(k.first_pressed(), Some(2));
        }
        Ok(())
    }
}
