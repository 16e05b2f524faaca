//! Per-strand state machine.
//!
//! A [`Strand`] owns no pixels. It holds a range into the display's shared
//! frame and is handed the matching slice for the duration of a call, so
//! the buffer has exactly one owner and strands can never alias each
//! other's pixels.

use alloc::vec::Vec;
use core::ops::Range;
use smart_leds::RGB8;

use crate::COLOR_OFF;
use crate::animation::{Animation, AnimationEngine, AnimationKind, SequencePlayer};
use crate::command::{AttributeOp, Name};
use crate::config::StrandConfig;
use crate::time::TimeInstant;

/// The externally visible selection of one strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrandState {
    /// No automatic animation. Pixels change only through direct writes.
    Manual,
    /// A single animation is running.
    Animating(AnimationKind),
    /// A sequence is cycling; the payload is the kind currently on screen.
    Sequencing(AnimationKind),
}

/// Errors that can occur while applying a directive to a strand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrandError {
    /// An attribute value is outside what this strand can apply.
    InvalidAttributeValue(&'static str),
    /// An animation name did not resolve to a supported kind.
    UnknownAnimation(Name),
    /// A direct pixel write addressed a pixel beyond the strand.
    PixelOutOfRange { index: u32, len: usize },
}

impl core::fmt::Display for StrandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StrandError::InvalidAttributeValue(attribute) => {
                write!(f, "invalid value for attribute '{}'", attribute)
            }
            StrandError::UnknownAnimation(name) => {
                write!(f, "unknown animation '{}'", name)
            }
            StrandError::PixelOutOfRange { index, len } => {
                write!(f, "pixel {} is beyond strand length {}", index, len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StrandError {}

/// What a strand is currently running.
enum Selection<A, I: TimeInstant> {
    Manual,
    Animating { kind: AnimationKind, animation: A },
    Sequencing(SequencePlayer<A, I>),
}

/// One LED strand: a range of the shared frame, a sticky config, and the
/// active selection.
///
/// # Type Parameters
/// * `A` - Animation instance type produced by the engine
/// * `I` - Time instant type
pub struct Strand<A, I: TimeInstant> {
    range: Range<usize>,
    config: StrandConfig,
    selection: Selection<A, I>,
}

impl<A: Animation, I: TimeInstant> Strand<A, I> {
    /// Creates a manual strand with default config over the given range.
    pub(crate) fn new(range: Range<usize>) -> Self {
        Self {
            range,
            config: StrandConfig::default(),
            selection: Selection::Manual,
        }
    }

    /// This strand's pixel range inside the shared frame.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Number of pixels in this strand.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the strand covers zero pixels.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The sticky attribute set.
    pub fn config(&self) -> &StrandConfig {
        &self.config
    }

    /// The current selection.
    pub fn state(&self) -> StrandState {
        match &self.selection {
            Selection::Manual => StrandState::Manual,
            Selection::Animating { kind, .. } => StrandState::Animating(*kind),
            Selection::Sequencing(player) => StrandState::Sequencing(player.current_kind()),
        }
    }

    /// Whether ticks should reach this strand.
    pub fn is_active(&self) -> bool {
        !matches!(self.selection, Selection::Manual)
    }

    /// Applies one directive atomically.
    ///
    /// Every op is validated before anything mutates: a failing op leaves
    /// config, selection, and pixels exactly as they were. On success the
    /// attribute ops land in the config in document order, then at most
    /// one mode change runs. Direct pixel writes take precedence over a
    /// sequence, which takes precedence over a plain animation select.
    ///
    /// Crossing the manual/automatic boundary in either direction
    /// zero-fills the range before the new mode's first write.
    pub(crate) fn handle<E>(
        &mut self,
        ops: &[AttributeOp],
        engine: &E,
        pixels: &mut [RGB8],
    ) -> Result<(), StrandError>
    where
        E: AnimationEngine<Animation = A>,
    {
        let mut manual: Option<&[(u32, RGB8)]> = None;
        let mut sequence: Option<(Vec<(AnimationKind, &StrandConfig)>, f32)> = None;
        let mut animation: Option<AnimationKind> = None;

        for op in ops {
            match op {
                AttributeOp::SetPixelColors(writes) => {
                    for &(index, _) in writes.iter() {
                        if index as usize >= pixels.len() {
                            return Err(StrandError::PixelOutOfRange {
                                index,
                                len: pixels.len(),
                            });
                        }
                    }
                    manual = Some(writes);
                }
                AttributeOp::SetSequence(specs, interval) => {
                    if specs.is_empty() {
                        return Err(StrandError::InvalidAttributeValue("animations"));
                    }
                    let mut plan = Vec::with_capacity(specs.len());
                    for spec in specs {
                        let kind = AnimationKind::from_name(&spec.name)
                            .ok_or_else(|| StrandError::UnknownAnimation(spec.name.clone()))?;
                        plan.push((kind, &spec.config));
                    }
                    sequence = Some((plan, *interval));
                }
                AttributeOp::SetAnimation(name) => {
                    let kind = AnimationKind::from_name(name)
                        .ok_or_else(|| StrandError::UnknownAnimation(name.clone()))?;
                    animation = Some(kind);
                }
                AttributeOp::SetColors(colors) if colors.is_empty() => {
                    return Err(StrandError::InvalidAttributeValue("colors"));
                }
                _ => {}
            }
        }

        // Past this point nothing can fail.
        for op in ops {
            op.store_into(&mut self.config);
        }

        if let Some(writes) = manual {
            pixels.fill(COLOR_OFF);
            for &(index, color) in writes {
                pixels[index as usize] = color;
            }
            self.selection = Selection::Manual;
        } else if let Some((plan, interval)) = sequence {
            let mut entries = Vec::with_capacity(plan.len());
            for (kind, config) in plan {
                entries.push((kind, engine.build(kind, config)));
            }
            if !self.is_active() {
                pixels.fill(COLOR_OFF);
            }
            self.selection = Selection::Sequencing(SequencePlayer::new(entries, interval));
        } else if let Some(kind) = animation {
            if !self.is_active() {
                pixels.fill(COLOR_OFF);
            }
            self.selection = Selection::Animating {
                kind,
                animation: engine.build(kind, &self.config),
            };
        }

        Ok(())
    }

    /// Advances one animation frame. Manual strands never tick.
    pub(crate) fn tick(&mut self, now: I, pixels: &mut [RGB8]) {
        match &mut self.selection {
            Selection::Manual => {}
            Selection::Animating { animation, .. } => animation.tick(pixels),
            Selection::Sequencing(player) => player.tick(now, pixels),
        }
    }
}
