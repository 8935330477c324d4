/// The delay and sound timers. Both count down once per `tick` and stop at
/// zero; the host is expected to tick at 60Hz.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Timers::new();
    }

    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// the tone should be playing
    pub fn sound_active(&self) -> bool {
        self.sound != 0
    }
}
