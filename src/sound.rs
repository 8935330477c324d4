use beep::beep;
use std::error::Error;

/// Something that can make the sound timer's tone. The host calls `beep`
/// when the sound timer goes nonzero and `stop` when it runs out.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker
pub struct SimpleBeep;

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        Ok(())
    }
}

/// says nothing, but remembers what it was asked to do
#[derive(Default)]
pub struct Mute {
    pub is_beeping: bool,
    pub beeps: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        self.beeps += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_tracks_state() -> Result<(), Box<dyn Error>> {
        let mut m = Mute::new();
        m.beep()?;
        assert!(m.is_beeping);
        m.stop()?;
        assert!(!m.is_beeping);
        assert_eq!(m.beeps, 1);
        Ok(())
    }
}
