//! Animation selection and the engine seam.
//!
//! The crate never colors pixels itself. [`AnimationEngine`] is the factory
//! seam a platform implements over its animation library; [`Animation`] is
//! one running instance rendering into a strand's slice of the shared
//! frame. [`SequencePlayer`] cycles a strand through several instances on a
//! dwell timer.

use alloc::vec::Vec;
use smart_leds::RGB8;

use crate::COLOR_OFF;
use crate::config::StrandConfig;
use crate::time::{TimeDuration, TimeInstant};

/// The animations a strand can run.
///
/// Closed set: wire names resolve through [`AnimationKind::from_name`] and
/// everything downstream dispatches on the variant, never on strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationKind {
    Blink,
    Solid,
    ColorCycle,
    Chase,
    Comet,
    Pulse,
    Rainbow,
    RainbowChase,
    RainbowComet,
    RainbowSparkle,
    Sparkle,
    SparklePulse,
}

/// Wire names for every kind, lowercase.
const KIND_NAMES: &[(&str, AnimationKind)] = &[
    ("blink", AnimationKind::Blink),
    ("solid", AnimationKind::Solid),
    ("color_cycle", AnimationKind::ColorCycle),
    ("chase", AnimationKind::Chase),
    ("comet", AnimationKind::Comet),
    ("pulse", AnimationKind::Pulse),
    ("rainbow", AnimationKind::Rainbow),
    ("rainbow_chase", AnimationKind::RainbowChase),
    ("rainbow_comet", AnimationKind::RainbowComet),
    ("rainbow_sparkle", AnimationKind::RainbowSparkle),
    ("sparkle", AnimationKind::Sparkle),
    ("sparkle_pulse", AnimationKind::SparklePulse),
];

impl AnimationKind {
    /// Resolves a wire name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        KIND_NAMES
            .iter()
            .find(|(wire, _)| wire.eq_ignore_ascii_case(name))
            .map(|&(_, kind)| kind)
    }

    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Blink => "blink",
            AnimationKind::Solid => "solid",
            AnimationKind::ColorCycle => "color_cycle",
            AnimationKind::Chase => "chase",
            AnimationKind::Comet => "comet",
            AnimationKind::Pulse => "pulse",
            AnimationKind::Rainbow => "rainbow",
            AnimationKind::RainbowChase => "rainbow_chase",
            AnimationKind::RainbowComet => "rainbow_comet",
            AnimationKind::RainbowSparkle => "rainbow_sparkle",
            AnimationKind::Sparkle => "sparkle",
            AnimationKind::SparklePulse => "sparkle_pulse",
        }
    }
}

/// One running animation instance.
///
/// Implementations render into the pixels they are handed and nothing
/// else. Honoring the configured frame pacing (`speed`) is the instance's
/// concern; the display calls `tick` on every idle loop cycle.
pub trait Animation {
    /// Renders the next frame into the strand's pixels.
    fn tick(&mut self, pixels: &mut [RGB8]);
}

/// Factory for animation instances.
///
/// Builds cannot fail: the kind is a closed enum and the config has been
/// validated upstream. Handle any library quirks internally.
pub trait AnimationEngine {
    /// The instance type this engine produces.
    type Animation: Animation;

    /// Builds a fresh instance of `kind` from a config snapshot.
    fn build(&self, kind: AnimationKind, config: &StrandConfig) -> Self::Animation;
}

/// Cycles a strand through a list of animations on a dwell timer.
///
/// Entries play in order and wrap around. Advancing zero-fills the pixels
/// first so nothing from the previous entry survives into the next one.
/// With no dwell interval the first entry plays until the next directive
/// replaces the selection.
pub struct SequencePlayer<A, I: TimeInstant> {
    entries: Vec<(AnimationKind, A)>,
    dwell: Option<I::Duration>,
    current: usize,
    entered_at: Option<I>,
}

impl<A: Animation, I: TimeInstant> SequencePlayer<A, I> {
    /// Creates a player over a non-empty entry list.
    ///
    /// An `interval_secs` that rounds below one millisecond disables
    /// auto-advance.
    pub(crate) fn new(entries: Vec<(AnimationKind, A)>, interval_secs: f32) -> Self {
        let millis = if interval_secs > 0.0 {
            (interval_secs * 1000.0) as u64
        } else {
            0
        };
        let dwell = if millis > 0 {
            Some(I::Duration::from_millis(millis))
        } else {
            None
        };

        Self {
            entries,
            dwell,
            current: 0,
            entered_at: None,
        }
    }

    /// The kind currently playing.
    pub fn current_kind(&self) -> AnimationKind {
        self.entries[self.current].0
    }

    /// Number of entries in the cycle.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether a dwell interval is set.
    pub fn auto_advances(&self) -> bool {
        self.dwell.is_some()
    }

    /// Advances the dwell schedule, then renders the current entry.
    ///
    /// The dwell clock starts at the first tick, not at directive time, so
    /// the first entry gets its full interval on screen.
    pub(crate) fn tick(&mut self, now: I, pixels: &mut [RGB8]) {
        if let Some(dwell) = self.dwell {
            match self.entered_at {
                None => self.entered_at = Some(now),
                Some(entered) => {
                    if now.duration_since(entered) >= dwell {
                        self.current = (self.current + 1) % self.entries.len();
                        pixels.fill(COLOR_OFF);
                        self.entered_at = Some(now);
                    }
                }
            }
        }

        self.entries[self.current].1.tick(pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use smart_leds::colors;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            TestDuration(millis)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0 - earlier.0)
        }
    }

    // Fill paints every pixel; Noop leaves the slice alone, which makes the
    // auto-clear on advance observable.
    enum TestAnimation {
        Fill(RGB8),
        Noop,
    }

    impl Animation for TestAnimation {
        fn tick(&mut self, pixels: &mut [RGB8]) {
            if let TestAnimation::Fill(color) = self {
                pixels.fill(*color);
            }
        }
    }

    #[test]
    fn resolves_known_names() {
        assert_eq!(AnimationKind::from_name("blink"), Some(AnimationKind::Blink));
        assert_eq!(AnimationKind::from_name("rainbow_comet"), Some(AnimationKind::RainbowComet));
        assert_eq!(AnimationKind::from_name("Sparkle"), Some(AnimationKind::Sparkle));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(AnimationKind::from_name("strobe"), None);
        assert_eq!(AnimationKind::from_name(""), None);
    }

    #[test]
    fn round_trips_wire_names() {
        for (wire, kind) in KIND_NAMES {
            assert_eq!(kind.as_str(), *wire);
            assert_eq!(AnimationKind::from_name(wire), Some(*kind));
        }
    }

    #[test]
    fn player_without_interval_never_advances() {
        let entries = vec![
            (AnimationKind::Blink, TestAnimation::Fill(colors::RED)),
            (AnimationKind::Solid, TestAnimation::Fill(colors::BLUE)),
        ];
        let mut player = SequencePlayer::<_, TestInstant>::new(entries, 0.0);
        let mut pixels = [COLOR_OFF; 4];

        player.tick(TestInstant(0), &mut pixels);
        player.tick(TestInstant(60_000), &mut pixels);

        assert_eq!(player.current_kind(), AnimationKind::Blink);
        assert!(!player.auto_advances());
        assert!(pixels.iter().all(|&p| p == colors::RED));
    }

    #[test]
    fn player_advances_after_dwell() {
        let entries = vec![
            (AnimationKind::Blink, TestAnimation::Fill(colors::RED)),
            (AnimationKind::Solid, TestAnimation::Fill(colors::BLUE)),
        ];
        let mut player = SequencePlayer::<_, TestInstant>::new(entries, 1.0);
        let mut pixels = [COLOR_OFF; 4];

        player.tick(TestInstant(0), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Blink);

        player.tick(TestInstant(999), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Blink);
        assert!(pixels.iter().all(|&p| p == colors::RED));

        player.tick(TestInstant(1000), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Solid);
        assert!(pixels.iter().all(|&p| p == colors::BLUE));
    }

    #[test]
    fn advance_clears_stale_pixels() {
        let entries = vec![
            (AnimationKind::Blink, TestAnimation::Fill(colors::RED)),
            (AnimationKind::Solid, TestAnimation::Noop),
        ];
        let mut player = SequencePlayer::<_, TestInstant>::new(entries, 1.0);
        let mut pixels = [COLOR_OFF; 4];

        player.tick(TestInstant(0), &mut pixels);
        assert!(pixels.iter().all(|&p| p == colors::RED));

        // The Noop entry paints nothing, so only the auto-clear can explain
        // the pixels going dark.
        player.tick(TestInstant(1500), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Solid);
        assert!(pixels.iter().all(|&p| p == COLOR_OFF));
    }

    #[test]
    fn player_wraps_around() {
        let entries = vec![
            (AnimationKind::Blink, TestAnimation::Fill(colors::RED)),
            (AnimationKind::Solid, TestAnimation::Fill(colors::BLUE)),
        ];
        let mut player = SequencePlayer::<_, TestInstant>::new(entries, 1.0);
        let mut pixels = [COLOR_OFF; 4];

        player.tick(TestInstant(0), &mut pixels);
        player.tick(TestInstant(1000), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Solid);

        player.tick(TestInstant(2000), &mut pixels);
        assert_eq!(player.current_kind(), AnimationKind::Blink);
        assert!(pixels.iter().all(|&p| p == colors::RED));
    }

    #[test]
    fn sub_millisecond_interval_disables_auto_advance() {
        let entries = vec![(AnimationKind::Blink, TestAnimation::Noop)];
        let player = SequencePlayer::<_, TestInstant>::new(entries, 0.0004);
        assert!(!player.auto_advances());
    }
}
