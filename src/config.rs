/// What happens to the parts of a sprite that hang off the edge of the
/// screen. The starting coordinate always wraps; this only governs the pixels
/// after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteEdge {
    /// carry on from the opposite edge
    #[default]
    Wrap,
    /// drop them
    Clip,
}

/// Behaviour that differs between the COSMAC VIP interpreter and the ones
/// that came after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    pub sprite_edge: SpriteEdge,
    /// FX55/FX65 leave I pointing just past the block they transferred
    pub index_advance: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            sprite_edge: SpriteEdge::Wrap,
            index_advance: true,
        }
    }
}

/// everything the environment needs to know to set up and drive a machine
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub quirks: Quirks,
    /// instructions run between timer ticks; 10 at 60Hz is ~600 instructions/s
    pub cycles_per_frame: u32,
    /// timer ticks (and screen refreshes) per second
    pub frame_rate: f64,
    /// how many terminal cells each CHIP-8 pixel gets
    pub scale: u16,
    /// fixes the RND sequence; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            cycles_per_frame: 10,
            frame_rate: 60.0,
            scale: 1,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.quirks.sprite_edge, SpriteEdge::Wrap);
        assert!(c.quirks.index_advance);
        assert_eq!(c.cycles_per_frame, 10);
        assert_eq!(c.frame_rate, 60.0);
        assert_eq!(c.rng_seed, None);
    }
}
