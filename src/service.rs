//! Cooperative protocol loop.
//!
//! One [`LinkService`] call services the bus or, when the bus is quiet,
//! advances the animations. The device needs no interrupts and no second
//! core; calling [`poll_once`](LinkService::poll_once) from the main loop
//! is the whole scheduler. Receiving a message stalls animations for the
//! duration of the transfer, which is invisible at animation timescales.

use embedded_hal::delay::DelayNs;

use crate::animation::AnimationEngine;
use crate::bus::{BusRequest, TargetBus};
use crate::command::Command;
use crate::display::{Display, DisplayError, StripDriver};
use crate::frame::{AssembleError, FrameAssembler};
use crate::parse::{self, ParseError};
use crate::time::{TimeInstant, TimeSource};

/// Default status byte served to controller reads.
///
/// The alternating bit pattern is easy to pick out on a logic analyzer
/// when checking that the device answers at all.
pub const DEFAULT_STATUS: u8 = 0xAA;

/// Why an inbound message never changed the display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The frames did not assemble into JSON.
    Assemble(AssembleError),
    /// The JSON did not parse into a command.
    Parse(ParseError),
    /// The display rejected the command.
    Display(DisplayError),
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::Assemble(err) => write!(f, "assembly failed: {}", err),
            LinkError::Parse(err) => write!(f, "parse failed: {}", err),
            LinkError::Display(err) => write!(f, "display rejected command: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinkError {}

impl From<AssembleError> for LinkError {
    fn from(err: AssembleError) -> Self {
        LinkError::Assemble(err)
    }
}

impl From<ParseError> for LinkError {
    fn from(err: ParseError) -> Self {
        LinkError::Parse(err)
    }
}

impl From<DisplayError> for LinkError {
    fn from(err: DisplayError) -> Self {
        LinkError::Display(err)
    }
}

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// A command was decoded and applied cleanly.
    CommandApplied,
    /// A message arrived but was dropped, or was only partially applied;
    /// the attached error says why.
    CommandDropped(LinkError),
    /// The controller read the status byte.
    StatusServed,
    /// No bus traffic; animations advanced.
    Ticked,
}

/// Drives the wire protocol against one display.
///
/// # Type Parameters
/// * `B` - Target bus implementation type
/// * `D` - Delay provider pacing the inter-frame reads
pub struct LinkService<B: TargetBus, D: DelayNs> {
    bus: B,
    delay: D,
    assembler: FrameAssembler,
    status: u8,
}

impl<B: TargetBus, D: DelayNs> LinkService<B, D> {
    /// Creates a service with the default frame budget and status byte.
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            assembler: FrameAssembler::default(),
            status: DEFAULT_STATUS,
        }
    }

    /// Replaces the frame budget.
    pub fn with_assembler(mut self, assembler: FrameAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Replaces the status byte served to controller reads.
    pub fn with_status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    /// The status byte currently served to controller reads.
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Runs one cycle: service the bus if the controller is talking,
    /// otherwise advance the animations.
    ///
    /// A bad message never takes the loop down. Assembly, parse, and
    /// apply failures are logged, reported in the returned [`Activity`],
    /// and the next cycle proceeds as if nothing happened.
    pub fn poll_once<'t, I, E, O, T>(&mut self, display: &mut Display<'t, I, E, O, T>) -> Activity
    where
        I: TimeInstant,
        E: AnimationEngine,
        O: StripDriver,
        T: TimeSource<I>,
    {
        match self.bus.poll() {
            Some(BusRequest::Write) => self.receive(display),
            Some(BusRequest::Read) => {
                self.bus.respond(&[self.status]);
                trace!("status byte served");
                Activity::StatusServed
            }
            None => {
                display.tick();
                Activity::Ticked
            }
        }
    }

    /// Never returns; polls forever.
    pub fn run<'t, I, E, O, T>(&mut self, display: &mut Display<'t, I, E, O, T>) -> !
    where
        I: TimeInstant,
        E: AnimationEngine,
        O: StripDriver,
        T: TimeSource<I>,
    {
        loop {
            self.poll_once(display);
        }
    }

    fn receive<'t, I, E, O, T>(&mut self, display: &mut Display<'t, I, E, O, T>) -> Activity
    where
        I: TimeInstant,
        E: AnimationEngine,
        O: StripDriver,
        T: TimeSource<I>,
    {
        let Self { bus, delay, assembler, .. } = self;
        let value = match assembler.assemble(|buffer| bus.read_frame(buffer), delay) {
            Ok(value) => value,
            Err(err) => {
                warn!("message dropped: frames did not decode");
                return Activity::CommandDropped(err.into());
            }
        };

        let command = match parse::parse_message(&value, display) {
            Ok(command) => command,
            Err(err) => {
                warn!("message dropped: not a valid command");
                return Activity::CommandDropped(err.into());
            }
        };

        match display.apply(&command) {
            Ok(()) => {
                match &command {
                    Command::Reconfigure(_) => info!(
                        "display reconfigured: {} strands, {} pixels",
                        display.strand_count(),
                        display.len(),
                    ),
                    Command::Directives(_) => debug!("command applied"),
                }
                Activity::CommandApplied
            }
            Err(err) => {
                warn!("display rejected command");
                Activity::CommandDropped(err.into())
            }
        }
    }
}
