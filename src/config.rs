//! Sticky per-strand animation attributes.

use alloc::vec;
use alloc::vec::Vec;
use smart_leds::RGB8;
use smart_leds::colors;

/// Animation attributes for one strand.
///
/// The config is sticky: attribute ops overwrite individual fields and the
/// result persists across animation changes. Every animation build reads
/// the config as it stands at that moment, so an attribute set long before
/// an animation is selected still shapes that animation.
#[derive(Debug, Clone, PartialEq)]
pub struct StrandConfig {
    /// Seconds between animation frames.
    pub speed: f32,
    /// Color cycle. Never empty; the first entry is the primary color.
    pub colors: Vec<RGB8>,
    /// Tail length in pixels for comet-style animations.
    pub tail_length: u32,
    /// Whether comet-style animations reverse at the strand end.
    pub bounce: bool,
    /// Lit block size for chase-style animations.
    pub size: u32,
    /// Gap between lit blocks for chase-style animations.
    pub spacing: u32,
    /// Pulse period in seconds.
    pub period: u32,
    /// Number of simultaneously lit sparkles.
    pub num_sparkles: u32,
    /// Hue step for rainbow-style animations.
    pub step: u32,
}

impl StrandConfig {
    /// The primary color, i.e. the first entry of the cycle.
    ///
    /// The colors list is never empty, so this always resolves.
    pub fn color(&self) -> RGB8 {
        self.colors[0]
    }
}

impl Default for StrandConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            colors: vec![colors::RED],
            tail_length: 1,
            bounce: false,
            size: 1,
            spacing: 1,
            period: 1,
            num_sparkles: 1,
            step: 1,
        }
    }
}

/// Lookup of a strand's current config.
///
/// The parser resolves sequence entries against the targeted strand's
/// config at parse time; this trait is the seam that makes the lookup
/// testable without a full display.
pub trait ConfigSource {
    /// Returns the config of the given strand, or `None` if the index does
    /// not currently resolve to a strand.
    fn strand_config(&self, strand: u32) -> Option<&StrandConfig>;
}
