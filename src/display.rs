//! Shared-frame display coordinator.
//!
//! The [`Display`] owns the one pixel frame the whole device renders from,
//! splits it into per-strand slices, routes parsed commands to strands, and
//! pushes the frame out through a [`StripDriver`] whenever it changes.

use alloc::vec;
use alloc::vec::Vec;
use smart_leds::RGB8;

use crate::COLOR_OFF;
use crate::animation::AnimationEngine;
use crate::command::{Command, Directive, ReconfigureCommand};
use crate::config::{ConfigSource, StrandConfig};
use crate::strand::{Strand, StrandError, StrandState};
use crate::time::{TimeInstant, TimeSource};

/// Hardware interface for the physical LED strip.
///
/// Implementations push a flat pixel frame to the strip and reshape the
/// output when the logical geometry changes. The methods are infallible;
/// an implementation that can fail owns its own retry policy.
pub trait StripDriver {
    /// Reshapes the output for a new geometry.
    ///
    /// `lanes` holds the strand lengths in index order; `total` is their
    /// sum and the length of every subsequent [`write`](Self::write) frame.
    fn configure(&mut self, total: usize, lanes: &[usize], brightness: f32);

    /// Tears down the current output before a reconfigure.
    fn release(&mut self);

    /// Pushes one full frame to the strip.
    fn write(&mut self, frame: &[RGB8]);
}

/// Errors that can occur while applying a command to the display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A directive targeted a strand the current geometry does not have.
    IndexOutOfBounds { index: u32, strands: usize },

    /// A reconfigure described zero pixels in total.
    EmptyConfiguration,

    /// Reconfigure strand indices did not form `0..n`.
    NonContiguousStrands { expected: u32, found: u32 },

    /// A strand rejected its directive.
    Strand(StrandError),
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::IndexOutOfBounds { index, strands } => {
                write!(f, "strand {} does not exist ({} configured)", index, strands)
            }
            DisplayError::EmptyConfiguration => {
                write!(f, "configuration describes zero pixels")
            }
            DisplayError::NonContiguousStrands { expected, found } => {
                write!(f, "strand indices must be contiguous: expected {}, found {}", expected, found)
            }
            DisplayError::Strand(err) => {
                write!(f, "strand error: {}", err)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DisplayError {}

impl From<StrandError> for DisplayError {
    fn from(err: StrandError) -> Self {
        DisplayError::Strand(err)
    }
}

/// Coordinates every strand over one shared pixel frame.
///
/// The display starts with no geometry; until the first reconfigure command
/// arrives every directive is out of bounds. A reconfigure lays out the
/// strands back to back in index order inside a single flat frame, so the
/// strip driver always receives one contiguous buffer.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `E` - Animation engine building the effect instances
/// * `D` - Strip driver implementation type
/// * `T` - Time source implementation type
pub struct Display<'t, I: TimeInstant, E: AnimationEngine, D: StripDriver, T: TimeSource<I>> {
    driver: D,
    engine: E,
    time_source: &'t T,
    brightness: f32,
    frame: Vec<RGB8>,
    strands: Vec<Strand<E::Animation, I>>,
    active: Vec<usize>,
}

impl<'t, I, E, D, T> Display<'t, I, E, D, T>
where
    I: TimeInstant,
    E: AnimationEngine,
    D: StripDriver,
    T: TimeSource<I>,
{
    /// Creates a display with no strands and an empty frame.
    pub fn new(driver: D, engine: E, time_source: &'t T) -> Self {
        Self {
            driver,
            engine,
            time_source,
            brightness: 1.0,
            frame: Vec::new(),
            strands: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Total number of pixels across all strands.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Whether no geometry has been configured.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Number of configured strands.
    pub fn strand_count(&self) -> usize {
        self.strands.len()
    }

    /// Global brightness passed to the driver, in `0.0..=1.0`.
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Indices of the strands currently running an animation or sequence.
    pub fn active_strands(&self) -> &[usize] {
        &self.active
    }

    /// The state of strand `index`, if it exists.
    pub fn strand_state(&self, index: u32) -> Option<StrandState> {
        self.strands.get(index as usize).map(Strand::state)
    }

    /// The current frame contents.
    pub fn frame(&self) -> &[RGB8] {
        &self.frame
    }

    /// Applies one parsed command.
    ///
    /// Directive batches keep going past a failing directive so one bad
    /// strand cannot block its siblings; the first error is returned after
    /// the rest of the batch ran. If any directive landed, the frame is
    /// flushed to the strip exactly once.
    ///
    /// # Errors
    /// * `IndexOutOfBounds` - A directive named a strand outside the geometry
    /// * `EmptyConfiguration` - A reconfigure described zero pixels
    /// * `NonContiguousStrands` - Reconfigure indices did not form `0..n`
    /// * `Strand` - A strand rejected its directive
    pub fn apply(&mut self, command: &Command) -> Result<(), DisplayError> {
        match command {
            Command::Reconfigure(reconfigure) => self.reconfigure(reconfigure),
            Command::Directives(directives) => self.run_directives(directives),
        }
    }

    /// Advances every active strand by one animation frame.
    ///
    /// Time is sampled once so all strands share the same instant. Does
    /// nothing, and touches neither clock nor strip, when no strand is
    /// active.
    pub fn tick(&mut self) {
        if self.active.is_empty() {
            return;
        }

        let now = self.time_source.now();
        let Self { strands, frame, active, .. } = self;
        for &index in active.iter() {
            let strand = &mut strands[index];
            let range = strand.range();
            strand.tick(now, &mut frame[range]);
        }

        self.driver.write(&self.frame);
    }

    /// Replaces the geometry. The old frame and all strand state are
    /// discarded only after the new layout validates.
    fn reconfigure(&mut self, command: &ReconfigureCommand) -> Result<(), DisplayError> {
        for (position, &(index, _)) in command.strands.iter().enumerate() {
            if index != position as u32 {
                return Err(DisplayError::NonContiguousStrands {
                    expected: position as u32,
                    found: index,
                });
            }
        }

        let total: usize = command.strands.iter().map(|&(_, len)| len as usize).sum();
        if total == 0 {
            return Err(DisplayError::EmptyConfiguration);
        }

        let brightness = command.brightness.clamp(0.0, 1.0);

        self.driver.release();

        let mut lanes = Vec::with_capacity(command.strands.len());
        let mut strands = Vec::with_capacity(command.strands.len());
        let mut start = 0;
        for &(_, len) in &command.strands {
            let len = len as usize;
            lanes.push(len);
            strands.push(Strand::new(start..start + len));
            start += len;
        }

        self.driver.configure(total, &lanes, brightness);

        self.brightness = brightness;
        self.frame = vec![COLOR_OFF; total];
        self.strands = strands;
        self.active.clear();
        self.driver.write(&self.frame);
        Ok(())
    }

    fn run_directives(&mut self, directives: &[Directive]) -> Result<(), DisplayError> {
        let mut first_error = None;
        let mut applied = false;

        for directive in directives {
            match self.run_directive(directive) {
                Ok(()) => applied = true,
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if applied {
            self.refresh_active();
            self.driver.write(&self.frame);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn run_directive(&mut self, directive: &Directive) -> Result<(), DisplayError> {
        let index = directive.strand as usize;
        if index >= self.strands.len() {
            return Err(DisplayError::IndexOutOfBounds {
                index: directive.strand,
                strands: self.strands.len(),
            });
        }

        let Self { strands, frame, engine, .. } = self;
        let strand = &mut strands[index];
        let range = strand.range();
        strand.handle(&directive.ops, engine, &mut frame[range])?;
        Ok(())
    }

    fn refresh_active(&mut self) {
        self.active.clear();
        for (index, strand) in self.strands.iter().enumerate() {
            if strand.is_active() {
                self.active.push(index);
            }
        }
    }
}

impl<'t, I, E, D, T> ConfigSource for Display<'t, I, E, D, T>
where
    I: TimeInstant,
    E: AnimationEngine,
    D: StripDriver,
    T: TimeSource<I>,
{
    fn strand_config(&self, strand: u32) -> Option<&StrandConfig> {
        self.strands.get(strand as usize).map(Strand::config)
    }
}
